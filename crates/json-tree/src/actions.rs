//! Node actions: registry, action bar view model, clipboard.
//!
//! The host supplies an `ActionRegistry` of descriptors grouped by scope.
//! The first action of the `All` group, when present, replaces the built-in
//! copy-value behaviour.

use crate::node_type::NodeType;
use crate::value::TreeValue;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Callback invoked with the node's data and key.
pub type DispatchFn = Arc<dyn Fn(&TreeValue, &str) + Send + Sync>;

const DEFAULT_ICON_SIZE: u32 = 12;

/// A single host-defined action.
#[derive(Clone)]
pub struct ActionDescriptor {
    pub name: String,
    /// Icon name, resolved to `assets/images/icons/{icon}.svg` unless `src`
    /// is set. Actions without an icon are not drawn in the action bar.
    pub icon: Option<String>,
    pub src: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Dispatched when the node's label is clicked.
    pub on_select: bool,
    dispatch: DispatchFn,
}

impl ActionDescriptor {
    pub fn new(
        name: impl Into<String>,
        dispatch: impl Fn(&TreeValue, &str) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            icon: None,
            src: None,
            width: DEFAULT_ICON_SIZE,
            height: DEFAULT_ICON_SIZE,
            on_select: false,
            dispatch: Arc::new(dispatch),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn on_select(mut self) -> Self {
        self.on_select = true;
        self
    }

    pub fn dispatch(&self, data: &TreeValue, node: &str) {
        (self.dispatch)(data, node);
    }

    /// Image source for the icon, if the action has one.
    pub fn icon_src(&self) -> Option<String> {
        self.icon.as_ref()?;
        Some(self.src.clone().unwrap_or_else(|| {
            format!(
                "assets/images/icons/{}.svg",
                self.icon.as_deref().unwrap_or_default()
            )
        }))
    }
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("name", &self.name)
            .field("icon", &self.icon)
            .field("on_select", &self.on_select)
            .finish_non_exhaustive()
    }
}

/// Which nodes an action group applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionScope {
    All,
    Type(NodeType),
}

impl ActionScope {
    fn applies_to(self, node_type: NodeType) -> bool {
        match self {
            Self::All => true,
            Self::Type(t) => t == node_type,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActionGroup {
    pub scope: ActionScope,
    pub actions: Vec<ActionDescriptor>,
}

/// Host-provided list of action groups.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    groups: Vec<ActionGroup>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action to the group for `scope`, creating the group if needed.
    pub fn register(&mut self, scope: ActionScope, action: ActionDescriptor) {
        match self.groups.iter_mut().find(|g| g.scope == scope) {
            Some(group) => group.actions.push(action),
            None => self.groups.push(ActionGroup {
                scope,
                actions: vec![action],
            }),
        }
    }

    pub fn with_action(mut self, scope: ActionScope, action: ActionDescriptor) -> Self {
        self.register(scope, action);
        self
    }

    pub fn groups(&self) -> &[ActionGroup] {
        &self.groups
    }

    /// The host's copy-value action: first action of the `All` group.
    pub fn copy_value_action(&self) -> Option<&ActionDescriptor> {
        self.groups
            .iter()
            .find(|g| g.scope == ActionScope::All)
            .and_then(|g| g.actions.first())
    }

    /// Every action whose scope covers `node_type`, in registration order.
    pub fn actions_for(&self, node_type: NodeType) -> Vec<ActionDescriptor> {
        self.groups
            .iter()
            .filter(|g| g.scope.applies_to(node_type))
            .flat_map(|g| g.actions.iter().cloned())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.actions.is_empty())
    }
}

/// Destination for copy-value and copy-path.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str);
}

/// Clipboard that keeps the last copied text in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) {
        *self
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(text.to_string());
    }
}

/// What an action bar control does when activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionControlKind {
    CopyPath,
    CopyValue,
    /// A host action, by name.
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionControl {
    pub kind: ActionControlKind,
    pub tooltip: String,
    pub icon_src: Option<String>,
    pub width: u32,
    pub height: u32,
}

/// Controls revealed on a hovered row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionBar {
    pub controls: Vec<ActionControl>,
}

impl ActionBar {
    /// Copy-path (optional), copy-value, then every visible action that has
    /// an icon.
    pub fn build(node: &str, visible: &[ActionDescriptor], copy_path: bool) -> Self {
        let mut controls = Vec::with_capacity(visible.len() + 2);
        if copy_path {
            controls.push(ActionControl {
                kind: ActionControlKind::CopyPath,
                tooltip: "Copy path".to_string(),
                icon_src: None,
                width: DEFAULT_ICON_SIZE,
                height: DEFAULT_ICON_SIZE,
            });
        }
        controls.push(ActionControl {
            kind: ActionControlKind::CopyValue,
            tooltip: "Copy value".to_string(),
            icon_src: None,
            width: DEFAULT_ICON_SIZE,
            height: DEFAULT_ICON_SIZE,
        });
        controls.extend(visible.iter().filter_map(|action| {
            let icon_src = action.icon_src()?;
            Some(ActionControl {
                kind: ActionControlKind::Custom(action.name.clone()),
                tooltip: format!("{} {}", action.name, node),
                icon_src: Some(icon_src),
                width: action.width,
                height: action.height,
            })
        }));
        Self { controls }
    }

    pub fn kinds(&self) -> Vec<&ActionControlKind> {
        self.controls.iter().map(|c| &c.kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str) -> ActionDescriptor {
        ActionDescriptor::new(name, |_, _| {})
    }

    #[test]
    fn test_registry_groups_by_scope() {
        let registry = ActionRegistry::new()
            .with_action(ActionScope::All, noop("copy"))
            .with_action(ActionScope::Type(NodeType::Array), noop("chart"))
            .with_action(ActionScope::All, noop("inspect"));

        assert_eq!(registry.groups().len(), 2);
        assert_eq!(registry.copy_value_action().map(|a| a.name.as_str()), Some("copy"));

        let names = |t| {
            registry
                .actions_for(t)
                .into_iter()
                .map(|a| a.name)
                .collect::<Vec<_>>()
        };
        assert_eq!(names(NodeType::Array), vec!["copy", "inspect", "chart"]);
        assert_eq!(names(NodeType::String), vec!["copy", "inspect"]);
    }

    #[test]
    fn test_action_bar_layout() {
        let visible = vec![
            noop("Delete").with_icon("trash"),
            noop("Hidden"),
            noop("Open").with_src("https://cdn/open.svg").with_icon("open"),
        ];
        let bar = ActionBar::build("users", &visible, true);
        assert_eq!(
            bar.kinds(),
            vec![
                &ActionControlKind::CopyPath,
                &ActionControlKind::CopyValue,
                &ActionControlKind::Custom("Delete".into()),
                &ActionControlKind::Custom("Open".into()),
            ]
        );
        assert_eq!(bar.controls[2].tooltip, "Delete users");
        assert_eq!(
            bar.controls[2].icon_src.as_deref(),
            Some("assets/images/icons/trash.svg")
        );
        assert_eq!(bar.controls[3].icon_src.as_deref(), Some("https://cdn/open.svg"));

        let without_path = ActionBar::build("users", &[], false);
        assert_eq!(without_path.kinds(), vec![&ActionControlKind::CopyValue]);
    }

    #[test]
    fn test_dispatch_passes_data_and_node() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let action = ActionDescriptor::new("log", move |data, node| {
            sink.lock().unwrap().push(format!("{node}={}", data.preview()));
        });
        action.dispatch(&TreeValue::from(7i64), "count");
        assert_eq!(*seen.lock().unwrap(), vec!["count=7".to_string()]);
    }

    #[test]
    fn test_memory_clipboard() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.contents(), None);
        clipboard.write_text("users[0]");
        assert_eq!(clipboard.contents().as_deref(), Some("users[0]"));
    }
}
