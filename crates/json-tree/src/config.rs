//! Tree configuration.
//!
//! `TreeConfig` carries the display flags and host callbacks threaded through
//! every level of the render. `TreeDisplayConfig` is its serializable subset,
//! loaded from the application's YAML config.

use crate::actions::{ActionDescriptor, ActionRegistry};
use crate::node_type::NodeType;
use crate::path::{NodePath, PathSegment};
use crate::value::TreeValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub type Classifier = Arc<dyn Fn(&TreeValue) -> NodeType + Send + Sync>;
pub type PathBuilder = Arc<dyn Fn(&NodePath, &PathSegment) -> NodePath + Send + Sync>;
pub type LengthFn = Arc<dyn Fn(NodeType, &TreeValue) -> usize + Send + Sync>;
pub type IconFn = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;
pub type AbsolutePathFn = Arc<dyn Fn(&NodePath) -> String + Send + Sync>;
/// Resolves the actions for a node from its key and path.
pub type ActionResolver = Arc<dyn Fn(&str, &NodePath) -> Vec<ActionDescriptor> + Send + Sync>;

/// Initial expansion of a node, evaluated once per path.
#[derive(Clone)]
pub enum ExpandPredicate {
    Static(bool),
    /// Expand nodes whose path has at most this many segments.
    Depth(usize),
    Custom(Arc<dyn Fn(&NodePath, &TreeValue) -> bool + Send + Sync>),
}

impl ExpandPredicate {
    pub fn custom(f: impl Fn(&NodePath, &TreeValue) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn evaluate(&self, path: &NodePath, data: &TreeValue) -> bool {
        match self {
            Self::Static(expand) => *expand,
            Self::Depth(depth) => path.len() <= *depth,
            Self::Custom(f) => f(path, data),
        }
    }
}

impl Default for ExpandPredicate {
    fn default() -> Self {
        Self::Static(false)
    }
}

impl fmt::Debug for ExpandPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(expand) => write!(f, "Static({expand})"),
            Self::Depth(depth) => write!(f, "Depth({depth})"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Display flags and callbacks for a `TreeView`.
#[derive(Clone)]
pub struct TreeConfig {
    pub expand: ExpandPredicate,
    pub classifier: Classifier,
    pub path_builder: PathBuilder,
    pub length: LengthFn,
    /// Draw `node_icon` / `info_icon` next to keys.
    pub use_node_icons: bool,
    pub node_icon: Option<IconFn>,
    pub info_icon: Option<IconFn>,
    /// Draw expanded composites as an indented, bordered block.
    pub use_indented_block: bool,
    /// Enables the action bar and on-select dispatch.
    pub use_actions: bool,
    /// Adds copy-path to the action bar.
    pub enable_copy_to_clipboard: bool,
    /// Clicking a label toggles expansion instead of selecting.
    pub expand_with_labels: bool,
    pub font_size: Option<String>,
    /// Every row reserves an indicator slot.
    pub inspector_tree: bool,
    /// Clicking a `componentId` key triggers label actions.
    pub debugger_tree: bool,
    pub actions: ActionRegistry,
    /// Actions shown in a hovered row's action bar.
    pub visible_actions: Option<ActionResolver>,
    /// Actions dispatched on label click (filtered by `on_select`).
    pub on_select_actions: Option<ActionResolver>,
    pub absolute_path: Option<AbsolutePathFn>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            expand: ExpandPredicate::default(),
            classifier: Arc::new(NodeType::of),
            path_builder: Arc::new(|path: &NodePath, segment: &PathSegment| {
                path.child(segment.clone())
            }),
            length: Arc::new(|_: NodeType, data: &TreeValue| data.entry_count()),
            use_node_icons: false,
            node_icon: None,
            info_icon: None,
            use_indented_block: false,
            use_actions: false,
            enable_copy_to_clipboard: false,
            expand_with_labels: false,
            font_size: None,
            inspector_tree: false,
            debugger_tree: false,
            actions: ActionRegistry::default(),
            visible_actions: None,
            on_select_actions: None,
            absolute_path: None,
        }
    }
}

impl TreeConfig {
    pub fn from_display(display: &TreeDisplayConfig) -> Self {
        Self {
            expand: match display.expand_depth {
                Some(depth) => ExpandPredicate::Depth(depth),
                None => ExpandPredicate::Static(false),
            },
            use_node_icons: display.use_node_icons,
            use_indented_block: display.use_indented_block,
            use_actions: display.use_actions,
            enable_copy_to_clipboard: display.enable_copy_to_clipboard,
            expand_with_labels: display.expand_with_labels,
            font_size: display.font_size.clone(),
            inspector_tree: display.inspector_tree,
            debugger_tree: display.debugger_tree,
            ..Self::default()
        }
    }

    pub fn with_expand(mut self, expand: ExpandPredicate) -> Self {
        self.expand = expand;
        self
    }

    pub fn with_classifier(
        mut self,
        f: impl Fn(&TreeValue) -> NodeType + Send + Sync + 'static,
    ) -> Self {
        self.classifier = Arc::new(f);
        self
    }

    pub fn with_length(
        mut self,
        f: impl Fn(NodeType, &TreeValue) -> usize + Send + Sync + 'static,
    ) -> Self {
        self.length = Arc::new(f);
        self
    }

    pub fn with_node_icons(
        mut self,
        node_icon: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
        info_icon: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.use_node_icons = true;
        self.node_icon = Some(Arc::new(node_icon));
        self.info_icon = Some(Arc::new(info_icon));
        self
    }

    pub fn with_actions(mut self, actions: ActionRegistry) -> Self {
        self.use_actions = true;
        self.actions = actions;
        self
    }

    pub fn with_visible_actions(
        mut self,
        f: impl Fn(&str, &NodePath) -> Vec<ActionDescriptor> + Send + Sync + 'static,
    ) -> Self {
        self.visible_actions = Some(Arc::new(f));
        self
    }

    pub fn with_on_select_actions(
        mut self,
        f: impl Fn(&str, &NodePath) -> Vec<ActionDescriptor> + Send + Sync + 'static,
    ) -> Self {
        self.on_select_actions = Some(Arc::new(f));
        self
    }

    pub fn classify(&self, data: &TreeValue) -> NodeType {
        (self.classifier)(data)
    }

    pub fn child_path(&self, path: &NodePath, segment: &PathSegment) -> NodePath {
        (self.path_builder)(path, segment)
    }

    pub fn entry_count(&self, node_type: NodeType, data: &TreeValue) -> usize {
        (self.length)(node_type, data)
    }

    pub fn absolute_path_of(&self, path: &NodePath) -> String {
        match &self.absolute_path {
            Some(f) => f(path),
            None => path.to_string(),
        }
    }

    /// Actions for the hovered row. Defaults to the registry actions scoped
    /// to the node's type.
    pub fn resolve_visible_actions(
        &self,
        node: &str,
        path: &NodePath,
        node_type: NodeType,
    ) -> Vec<ActionDescriptor> {
        match &self.visible_actions {
            Some(f) => f(node, path),
            None => self.actions.actions_for(node_type),
        }
    }

    /// On-select actions for a label click.
    pub fn resolve_on_select_actions(
        &self,
        node: &str,
        path: &NodePath,
        node_type: NodeType,
    ) -> Vec<ActionDescriptor> {
        let actions = match &self.on_select_actions {
            Some(f) => f(node, path),
            None => self.actions.actions_for(node_type),
        };
        actions.into_iter().filter(|a| a.on_select).collect()
    }
}

impl fmt::Debug for TreeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeConfig")
            .field("expand", &self.expand)
            .field("use_node_icons", &self.use_node_icons)
            .field("use_indented_block", &self.use_indented_block)
            .field("use_actions", &self.use_actions)
            .field("enable_copy_to_clipboard", &self.enable_copy_to_clipboard)
            .field("expand_with_labels", &self.expand_with_labels)
            .field("font_size", &self.font_size)
            .field("inspector_tree", &self.inspector_tree)
            .field("debugger_tree", &self.debugger_tree)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

/// Serializable display options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeDisplayConfig {
    /// Expand nodes down to this depth on first render. Unset keeps
    /// everything collapsed.
    pub expand_depth: Option<usize>,
    pub use_indented_block: bool,
    pub use_node_icons: bool,
    pub use_actions: bool,
    pub enable_copy_to_clipboard: bool,
    pub expand_with_labels: bool,
    pub font_size: Option<String>,
    pub inspector_tree: bool,
    pub debugger_tree: bool,
}
