//! Recursive tree renderer and event handling.
//!
//! `TreeView` owns the only local UI state, the expand/collapse flag per
//! path. Everything else is recomputed on each `render` pass from the data,
//! the config and the host's selection/hover state.

use crate::actions::{ActionBar, ActionControlKind, Clipboard, MemoryClipboard};
use crate::config::TreeConfig;
use crate::error::TreeError;
use crate::indicator::NodeIndicator;
use crate::node_type::NodeType;
use crate::path::NodePath;
use crate::selection::{NodeRef, SelectionHost};
use crate::value::TreeValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Type name plus, for composites, the pluralized child count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeLabel {
    pub name: &'static str,
    pub count: Option<String>,
}

impl TypeLabel {
    fn for_node(node_type: NodeType, entry_count: usize) -> Option<Self> {
        node_type.shows_label().then(|| Self {
            name: node_type.as_str(),
            count: node_type.count_label(entry_count),
        })
    }
}

/// Styling of a node's key badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStyle {
    Selected,
    Hovered,
    Outline,
}

impl KeyStyle {
    fn resolve(selected: bool, hovered: bool) -> Self {
        if hovered {
            Self::Hovered
        } else if selected {
            Self::Selected
        } else {
            Self::Outline
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Self::Selected => "color-primary",
            Self::Hovered => "hovered-node",
            Self::Outline => "node-key-outline",
        }
    }
}

/// One rendered row and its rendered children.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedNode {
    /// `None` for the root, which renders only its value view.
    pub key: Option<String>,
    pub path: NodePath,
    pub node_type: NodeType,
    pub type_label: Option<TypeLabel>,
    /// Inline value for leaves and empty composites.
    pub value: Option<String>,
    pub children: Vec<RenderedNode>,
    pub entry_count: usize,
    /// Non-empty Object/Array/Map.
    pub expandable: bool,
    pub expanded: bool,
    pub indicator: Option<NodeIndicator>,
    pub selected: bool,
    pub hovered: bool,
    pub key_style: KeyStyle,
    pub indented_block: bool,
    pub node_icon: Option<String>,
    pub info_icon: Option<String>,
    pub action_bar: Option<ActionBar>,
    pub font_size: Option<String>,
}

impl RenderedNode {
    /// Find a rendered node by path.
    pub fn find(&self, path: &NodePath) -> Option<&RenderedNode> {
        if &self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(path))
    }

    /// All rendered nodes in display order, root first.
    pub fn walk(&self) -> Vec<&RenderedNode> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.walk());
        }
        nodes
    }
}

/// Stateful tree view: expansion state plus event handlers.
pub struct TreeView {
    config: TreeConfig,
    expansion: HashMap<NodePath, bool>,
    clipboard: Arc<dyn Clipboard>,
}

impl TreeView {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            expansion: HashMap::new(),
            clipboard: Arc::new(MemoryClipboard::new()),
        }
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Local expansion flag, if the path has been rendered or toggled.
    pub fn expansion_of(&self, path: &NodePath) -> Option<bool> {
        self.expansion.get(path).copied()
    }

    /// Render the whole tree.
    pub fn render(&mut self, data: &TreeValue, host: &dyn SelectionHost) -> RenderedNode {
        self.render_node(data, &NodePath::root(), host)
    }

    fn render_node(
        &mut self,
        data: &TreeValue,
        path: &NodePath,
        host: &dyn SelectionHost,
    ) -> RenderedNode {
        let node_type = self.config.classify(data);
        let entry_count = self.config.entry_count(node_type, data);
        let expandable = node_type.is_composite() && entry_count > 0;

        let Some(key) = path.last().map(ToString::to_string) else {
            return RenderedNode {
                key: None,
                path: path.clone(),
                node_type,
                type_label: None,
                value: (!expandable).then(|| data.preview()),
                children: if expandable {
                    self.render_children(data, path, host)
                } else {
                    Vec::new()
                },
                entry_count,
                expandable,
                expanded: expandable,
                indicator: None,
                selected: false,
                hovered: false,
                key_style: KeyStyle::Outline,
                indented_block: false,
                node_icon: None,
                info_icon: None,
                action_bar: None,
                font_size: None,
            };
        };

        let parent = path.parent_segment().map(ToString::to_string);
        let is_selection_target = host
            .selected_node()
            .is_some_and(|selected| selected.matches(&key, parent.as_deref()));

        let expanded = if expandable {
            let predicate = &self.config.expand;
            let state = self
                .expansion
                .entry(path.clone())
                .or_insert_with(|| predicate.evaluate(path, data));
            if is_selection_target && !*state {
                debug!(%path, "opening selected node");
                *state = true;
            }
            *state
        } else {
            false
        };

        let selected = expanded && is_selection_target;
        let hovered = host
            .hovered_node()
            .is_some_and(|hovered| hovered.matches_exactly(&key, parent.as_deref()));

        let (node_icon, info_icon) = if self.config.use_node_icons {
            (
                self.config.node_icon.as_ref().and_then(|f| f(&key)),
                self.config.info_icon.as_ref().and_then(|f| f(&key)),
            )
        } else {
            (None, None)
        };

        let action_bar = (self.config.use_actions && hovered).then(|| {
            let visible = self.config.resolve_visible_actions(&key, path, node_type);
            ActionBar::build(&key, &visible, self.config.enable_copy_to_clipboard)
        });

        let children = if expanded {
            self.render_children(data, path, host)
        } else {
            Vec::new()
        };

        RenderedNode {
            path: path.clone(),
            node_type,
            type_label: TypeLabel::for_node(node_type, entry_count),
            value: (!expandable).then(|| data.preview()),
            children,
            entry_count,
            expandable,
            expanded,
            indicator: (self.config.inspector_tree || node_type.is_composite())
                .then(|| NodeIndicator::new(node_type, expanded, expandable)),
            selected,
            hovered,
            key_style: KeyStyle::resolve(selected, hovered),
            indented_block: self.config.use_indented_block && expanded,
            node_icon,
            info_icon,
            action_bar,
            font_size: self.config.font_size.clone(),
            key: Some(key),
        }
    }

    fn render_children(
        &mut self,
        data: &TreeValue,
        path: &NodePath,
        host: &dyn SelectionHost,
    ) -> Vec<RenderedNode> {
        let mut children = Vec::with_capacity(data.entry_count());
        for (segment, child) in data.children() {
            let child_path = self.config.child_path(path, &segment);
            children.push(self.render_node(child, &child_path, host));
        }
        children
    }

    fn current_expansion(&self, path: &NodePath, data: &TreeValue) -> bool {
        self.expansion
            .get(path)
            .copied()
            .unwrap_or_else(|| self.config.expand.evaluate(path, data))
    }

    fn resolve<'a>(
        root: &'a TreeValue,
        path: &NodePath,
    ) -> Result<(&'a TreeValue, String), TreeError> {
        let key = path.last().ok_or(TreeError::RootNode)?.to_string();
        let data = root.at(path).ok_or_else(|| TreeError::NodeNotFound {
            path: path.clone(),
        })?;
        Ok((data, key))
    }

    fn is_expandable(&self, data: &TreeValue) -> bool {
        let node_type = self.config.classify(data);
        node_type.is_composite() && self.config.entry_count(node_type, data) > 0
    }

    /// Indicator activation. Opening a node selects it, closing it clears
    /// the selection. Returns the new expansion state.
    ///
    /// Leaves and empty composites never expand: the call returns `false`
    /// and leaves the host untouched.
    pub fn toggle(
        &mut self,
        root: &TreeValue,
        path: &NodePath,
        host: &mut dyn SelectionHost,
    ) -> Result<bool, TreeError> {
        let (data, _) = Self::resolve(root, path)?;
        if !self.is_expandable(data) {
            return Ok(false);
        }
        let expanded = self.current_expansion(path, data);
        if expanded {
            host.update_selected_node(None);
        } else {
            host.update_selected_node(NodeRef::from_path(path));
        }
        self.expansion.insert(path.clone(), !expanded);
        debug!(%path, expanded = !expanded, "toggled node");
        Ok(!expanded)
    }

    /// Click on a node's key label.
    ///
    /// Only non-empty composites react, plus `componentId` keys in debugger
    /// mode. With `expand_with_labels` the click toggles; with `use_actions`
    /// the on-select actions are dispatched and, unless labels toggle, the
    /// node is selected and opened. Returns whether anything happened.
    pub fn click_label(
        &mut self,
        root: &TreeValue,
        path: &NodePath,
        host: &mut dyn SelectionHost,
    ) -> Result<bool, TreeError> {
        let (data, key) = Self::resolve(root, path)?;
        let node_type = self.config.classify(data);
        let expandable = self.is_expandable(data);
        let debugger_trigger = self.config.debugger_tree && key == "componentId";
        if !expandable && !debugger_trigger {
            return Ok(false);
        }

        if self.config.expand_with_labels {
            self.toggle(root, path, host)?;
        }

        if self.config.use_actions {
            let actions = self.config.resolve_on_select_actions(&key, path, node_type);
            debug!(%path, actions = actions.len(), "dispatching on-select actions");
            for action in &actions {
                action.dispatch(data, &key);
            }
            if !self.config.expand_with_labels {
                host.update_selected_node(NodeRef::from_path(path));
                if expandable {
                    self.expansion.insert(path.clone(), true);
                }
            }
        }

        Ok(self.config.expand_with_labels || self.config.use_actions)
    }

    /// Pointer entered a node's row.
    pub fn hover(&self, path: &NodePath, host: &mut dyn SelectionHost) {
        host.update_hovered_node(NodeRef::from_path(path));
    }

    /// Pointer left the row.
    pub fn leave(&self, host: &mut dyn SelectionHost) {
        host.update_hovered_node(None);
    }

    /// Activate an action bar control for the node at `path`.
    pub fn dispatch_action(
        &self,
        root: &TreeValue,
        path: &NodePath,
        kind: &ActionControlKind,
    ) -> Result<(), TreeError> {
        let (data, key) = Self::resolve(root, path)?;
        match kind {
            ActionControlKind::CopyPath => {
                self.clipboard
                    .write_text(&self.config.absolute_path_of(path));
            }
            ActionControlKind::CopyValue => match self.config.actions.copy_value_action() {
                Some(action) => action.dispatch(data, &key),
                None => self.clipboard.write_text(&copy_text(data)),
            },
            ActionControlKind::Custom(name) => {
                let node_type = self.config.classify(data);
                let action = self
                    .config
                    .resolve_visible_actions(&key, path, node_type)
                    .into_iter()
                    .find(|action| &action.name == name)
                    .ok_or_else(|| TreeError::UnknownAction {
                        name: name.clone(),
                        path: path.clone(),
                    })?;
                action.dispatch(data, &key);
            }
        }
        Ok(())
    }
}

fn copy_text(data: &TreeValue) -> String {
    match data {
        TreeValue::String(s) => s.clone(),
        other => serde_json::to_string_pretty(&other.to_json())
            .unwrap_or_else(|_| other.preview()),
    }
}


// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::config::ExpandPredicate;
    use crate::selection::InspectorState;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn arb_leaf() -> impl Strategy<Value = TreeValue> {
        prop_oneof![
            "[a-z ]{0,8}".prop_map(TreeValue::String),
            (-1e6f64..1e6).prop_map(TreeValue::Number),
            any::<bool>().prop_map(TreeValue::Boolean),
            Just(TreeValue::Null),
            Just(TreeValue::Undefined),
            "[a-z]{1,6}".prop_map(TreeValue::Function),
            (0i64..1_893_456_000).prop_map(|secs| {
                TreeValue::Date(Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
            }),
        ]
    }

    /// Nested values, empty composites included.
    fn arb_value() -> impl Strategy<Value = TreeValue> {
        arb_leaf().prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::btree_map("[a-z]{1,4}", inner.clone(), 0..4)
                    .prop_map(|entries| TreeValue::Object(entries.into_iter().collect())),
                prop::collection::vec(inner.clone(), 0..4).prop_map(TreeValue::Array),
                prop::collection::btree_map("[A-Z]{1,4}", inner, 0..4).prop_map(|entries| {
                    TreeValue::Map(
                        entries
                            .into_iter()
                            .map(|(key, value)| (TreeValue::String(key), value))
                            .collect(),
                    )
                }),
            ]
        })
    }

    fn arb_predicate() -> impl Strategy<Value = ExpandPredicate> {
        prop_oneof![
            any::<bool>().prop_map(ExpandPredicate::Static),
            (0usize..4).prop_map(ExpandPredicate::Depth),
            Just(ExpandPredicate::custom(|path, _| path.len() % 2 == 0)),
        ]
    }

    fn view_for(expand: ExpandPredicate) -> TreeView {
        TreeView::new(TreeConfig {
            inspector_tree: true,
            ..TreeConfig::default().with_expand(expand)
        })
    }

    proptest! {
        #[test]
        fn primitives_never_draw_a_glyph(value in arb_value(), expand in arb_predicate()) {
            let mut view = view_for(expand);
            let rendered = view.render(&value, &InspectorState::new());
            for node in rendered.walk() {
                if !node.node_type.is_composite() {
                    prop_assert_eq!(node.indicator.and_then(|i| i.glyph()), None);
                    prop_assert!(!node.expandable);
                }
            }
        }

        #[test]
        fn empty_composites_never_expand(value in arb_value(), expand in arb_predicate()) {
            let mut view = view_for(expand);
            let mut host = InspectorState::new();
            let rendered = view.render(&value, &host);

            let mut closed = Vec::new();
            for node in rendered.walk() {
                if node.entry_count == 0 {
                    prop_assert!(!node.expandable);
                    prop_assert!(!node.expanded);
                    if node.key.is_some() {
                        closed.push(node.path.clone());
                    }
                }
            }

            // Neither selection nor toggling opens them.
            for path in &closed {
                host.select_path(path);
                view.render(&value, &host);
                prop_assert_eq!(view.toggle(&value, path, &mut host), Ok(false));
                prop_assert_ne!(view.expansion_of(path), Some(true));
            }
        }
    }
}
