//! Expand/collapse affordance shown in front of a node's key.

use crate::node_type::NodeType;

/// View model of the node indicator. Activating it maps to
/// `TreeView::toggle`; the indicator keeps no state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeIndicator {
    /// Only composite types draw a glyph.
    pub visible: bool,
    pub expanded: bool,
    /// False for empty composites, which have nothing to expand.
    pub enabled: bool,
}

impl NodeIndicator {
    pub fn new(node_type: NodeType, expanded: bool, expandable: bool) -> Self {
        Self {
            visible: node_type.is_composite(),
            expanded,
            enabled: expandable,
        }
    }

    pub fn glyph(&self) -> Option<&'static str> {
        if !self.visible {
            return None;
        }
        Some(if self.expanded { "▾" } else { "▸" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_have_no_glyph() {
        for node_type in [
            NodeType::String,
            NodeType::Number,
            NodeType::Boolean,
            NodeType::Null,
            NodeType::Undefined,
            NodeType::Function,
            NodeType::Date,
        ] {
            assert_eq!(NodeIndicator::new(node_type, false, false).glyph(), None);
        }
    }

    #[test]
    fn test_composite_glyphs() {
        assert_eq!(NodeIndicator::new(NodeType::Object, true, true).glyph(), Some("▾"));
        assert_eq!(NodeIndicator::new(NodeType::Map, false, true).glyph(), Some("▸"));
        assert!(!NodeIndicator::new(NodeType::Array, false, false).enabled);
    }
}
