//! Selection and hover state.
//!
//! The state is owned by the host; the tree only reads it while rendering
//! and writes it through `SelectionHost` when the user toggles, clicks or
//! hovers a node. There is at most one selected and one hovered node.

use crate::path::NodePath;
use serde::{Deserialize, Serialize};

/// Identity of a node for selection/hover purposes: its key plus its
/// parent's key, so same-named nodes under different parents stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub node: String,
    pub parent: Option<String>,
}

impl NodeRef {
    pub fn new(node: impl Into<String>, parent: Option<String>) -> Self {
        Self {
            node: node.into(),
            parent,
        }
    }

    /// Build from a node path. `None` for the root, which has no key.
    pub fn from_path(path: &NodePath) -> Option<Self> {
        let node = path.last()?.to_string();
        let parent = path.parent_segment().map(ToString::to_string);
        Some(Self { node, parent })
    }

    /// Selection match: the node key must match, and the parent key too
    /// when both sides carry one.
    pub fn matches(&self, node: &str, parent: Option<&str>) -> bool {
        match (self.parent.as_deref(), parent) {
            (Some(own), Some(other)) => own == other && self.node == node,
            _ => self.node == node,
        }
    }

    /// Hover match: node and parent must both be equal.
    pub fn matches_exactly(&self, node: &str, parent: Option<&str>) -> bool {
        self.node == node && self.parent.as_deref() == parent
    }
}

/// Read/write access to the host's selection and hover state.
pub trait SelectionHost {
    fn selected_node(&self) -> Option<&NodeRef>;

    fn hovered_node(&self) -> Option<&NodeRef>;

    /// Replace the selection. `None` clears it.
    fn update_selected_node(&mut self, node: Option<NodeRef>);

    /// Replace the hovered node. `None` clears it.
    fn update_hovered_node(&mut self, node: Option<NodeRef>);
}

/// In-memory `SelectionHost` for hosts without their own store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectorState {
    selected: Option<NodeRef>,
    hovered: Option<NodeRef>,
}

impl InspectorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the node at `path` (no-op for the root).
    pub fn select_path(&mut self, path: &NodePath) {
        self.update_selected_node(NodeRef::from_path(path));
    }

    /// Hover the node at `path` (no-op for the root).
    pub fn hover_path(&mut self, path: &NodePath) {
        self.update_hovered_node(NodeRef::from_path(path));
    }
}

impl SelectionHost for InspectorState {
    fn selected_node(&self) -> Option<&NodeRef> {
        self.selected.as_ref()
    }

    fn hovered_node(&self) -> Option<&NodeRef> {
        self.hovered.as_ref()
    }

    fn update_selected_node(&mut self, node: Option<NodeRef>) {
        tracing::trace!(?node, "selection changed");
        self.selected = node;
    }

    fn update_hovered_node(&mut self, node: Option<NodeRef>) {
        self.hovered = node;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        let path = NodePath::parse("queries.users.data").unwrap();
        assert_eq!(
            NodeRef::from_path(&path),
            Some(NodeRef::new("data", Some("users".into())))
        );
        assert_eq!(
            NodeRef::from_path(&NodePath::parse("top").unwrap()),
            Some(NodeRef::new("top", None))
        );
        assert_eq!(NodeRef::from_path(&NodePath::root()), None);
    }

    #[test]
    fn test_selection_match_scoped_by_parent() {
        let selected = NodeRef::new("data", Some("users".into()));
        assert!(selected.matches("data", Some("users")));
        assert!(!selected.matches("data", Some("orders")));
        // A top-level candidate has no parent to compare.
        assert!(selected.matches("data", None));
        assert!(!selected.matches("meta", Some("users")));
    }

    #[test]
    fn test_hover_match_is_exact() {
        let hovered = NodeRef::new("data", Some("users".into()));
        assert!(hovered.matches_exactly("data", Some("users")));
        assert!(!hovered.matches_exactly("data", Some("orders")));
        assert!(!hovered.matches_exactly("data", None));
    }

    #[test]
    fn test_selection_is_exclusive() {
        let mut state = InspectorState::new();
        state.select_path(&NodePath::parse("a.b").unwrap());
        state.select_path(&NodePath::parse("c").unwrap());
        assert_eq!(state.selected_node(), Some(&NodeRef::new("c", None)));

        state.update_selected_node(None);
        assert_eq!(state.selected_node(), None);
    }
}
