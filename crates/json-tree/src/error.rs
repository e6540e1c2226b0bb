//! Error types for path parsing and tree events.

use crate::path::NodePath;
use thiserror::Error;

/// Errors produced while parsing an absolute node path such as `a.b[0].c`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Two separators in a row, or a leading/trailing separator.
    #[error("Empty path segment at position {position}")]
    EmptySegment {
        /// Byte offset in the input.
        position: usize,
    },

    /// A `[` without its matching `]` (or closing quote).
    #[error("Unterminated bracket starting at position {position}")]
    Unterminated {
        /// Byte offset of the opening bracket.
        position: usize,
    },

    /// Bracket content that is neither a quoted key nor an unsigned integer.
    #[error("Invalid index '{index}' at position {position}")]
    InvalidIndex {
        /// Byte offset of the opening bracket.
        position: usize,
        /// The raw bracket content.
        index: String,
    },

    /// A character that cannot appear at this position.
    #[error("Unexpected '{ch}' at position {position}")]
    UnexpectedChar {
        /// The offending character.
        ch: char,
        /// Byte offset in the input.
        position: usize,
    },
}

/// Errors raised by host-driven tree events (toggle, actions).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The path does not resolve to a node in the data.
    #[error("No node at path '{path}'")]
    NodeNotFound { path: NodePath },

    /// The root has no key, so it cannot be selected or acted upon.
    #[error("The root node has no key")]
    RootNode,

    /// The action is not offered for this node.
    #[error("Action '{name}' is not available for '{path}'")]
    UnknownAction { name: String, path: NodePath },
}

impl TreeError {
    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NodeNotFound { .. } => "NODE_NOT_FOUND",
            Self::RootNode => "ROOT_NODE",
            Self::UnknownAction { .. } => "UNKNOWN_ACTION",
        }
    }
}
