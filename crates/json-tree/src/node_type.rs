//! NodeType - closed classification of tree values.

use crate::value::TreeValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a node, used for labels, expansion and action scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Function,
    Date,
    Object,
    Array,
    Map,
}

impl NodeType {
    /// Default classifier.
    pub fn of(value: &TreeValue) -> Self {
        match value {
            TreeValue::String(_) => Self::String,
            TreeValue::Number(_) => Self::Number,
            TreeValue::Boolean(_) => Self::Boolean,
            TreeValue::Null => Self::Null,
            TreeValue::Undefined => Self::Undefined,
            TreeValue::Function(_) => Self::Function,
            TreeValue::Date(_) => Self::Date,
            TreeValue::Object(_) => Self::Object,
            TreeValue::Array(_) => Self::Array,
            TreeValue::Map(_) => Self::Map,
        }
    }

    /// Object, Array and Map have children; everything else is a leaf.
    pub fn is_composite(self) -> bool {
        matches!(self, Self::Object | Self::Array | Self::Map)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Null => "Null",
            Self::Undefined => "Undefined",
            Self::Function => "Function",
            Self::Date => "Date",
            Self::Object => "Object",
            Self::Array => "Array",
            Self::Map => "Map",
        }
    }

    /// Null and Undefined render without a type label.
    pub fn shows_label(self) -> bool {
        !matches!(self, Self::Null | Self::Undefined)
    }

    /// Pluralized child count for composites, e.g. "1 entry" or "3 items".
    ///
    /// Only exactly one is singular; zero is plural.
    pub fn count_label(self, count: usize) -> Option<String> {
        let (singular, plural) = match self {
            Self::Object => ("entry", "entries"),
            Self::Array | Self::Map => ("item", "items"),
            _ => return None,
        };
        let noun = if count == 1 { singular } else { plural };
        Some(format!("{count} {noun}"))
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn count_label_is_singular_only_for_one(count in 0usize..100_000) {
            for node_type in [NodeType::Object, NodeType::Array, NodeType::Map] {
                let label = node_type.count_label(count).unwrap_or_default();
                let singular = label.ends_with(" entry") || label.ends_with(" item");
                prop_assert_eq!(singular, count == 1);
                let prefix = format!("{count} ");
                prop_assert!(label.starts_with(&prefix));
            }
        }

        #[test]
        fn leaves_have_no_count_label(count in any::<usize>()) {
            for node_type in [
                NodeType::String,
                NodeType::Number,
                NodeType::Boolean,
                NodeType::Null,
                NodeType::Undefined,
                NodeType::Function,
                NodeType::Date,
            ] {
                prop_assert_eq!(node_type.count_label(count), None);
            }
        }
    }
}
