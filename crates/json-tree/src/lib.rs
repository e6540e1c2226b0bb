//! JSON Tree - Headless model of an interactive JSON tree inspector.
//!
//! This crate turns an arbitrary value into a view tree that a host UI
//! (terminal, web, egui) can paint:
//! - `TreeValue` - Polymorphic data (JSON plus Undefined/Function/Date/Map)
//! - `NodeType` - Closed classification of every value
//! - `NodePath` - Path-based node identity
//! - `TreeView` - Expand/collapse state, click/hover/toggle handling
//! - `SelectionHost` - Host-owned selection and hover state
//! - `ActionRegistry` - Per-node actions (copy value, copy path, custom)
//!
//! # Architecture
//!
//! ```text
//! TreeValue ──► TreeView::render(config, host) ──► RenderedNode
//!                  ▲                                   │
//!                  │ toggle / click_label / hover      ▼
//!              SelectionHost  ◄──────────────────  host UI
//! ```
//!
//! Rendering is a pure function of the data, the `TreeConfig`, the local
//! expansion map, and the host's selection/hover state. All side effects
//! leave the view through `SelectionHost` or an action's dispatch.
//!
//! # Example
//!
//! ```
//! use json_tree::{InspectorState, NodePath, TreeConfig, TreeValue, TreeView};
//!
//! let data = TreeValue::from(serde_json::json!({ "user": { "name": "Ada" } }));
//! let mut view = TreeView::new(TreeConfig::default());
//! let mut host = InspectorState::new();
//!
//! let path = NodePath::parse("user").unwrap();
//! view.toggle(&data, &path, &mut host).unwrap();
//!
//! let root = view.render(&data, &host);
//! assert!(root.children[0].expanded);
//! assert_eq!(root.children[0].children[0].value.as_deref(), Some("\"Ada\""));
//! ```

mod actions;
mod config;
mod error;
mod indicator;
mod node_type;
mod path;
mod render;
mod selection;
pub mod text;
mod value;

// Re-exports
pub use actions::{
    ActionBar, ActionControl, ActionControlKind, ActionDescriptor, ActionGroup, ActionRegistry,
    ActionScope, Clipboard, MemoryClipboard,
};
pub use config::{ExpandPredicate, TreeConfig, TreeDisplayConfig};
pub use error::{PathError, TreeError};
pub use indicator::NodeIndicator;
pub use node_type::NodeType;
pub use path::{NodePath, PathSegment};
pub use render::{KeyStyle, RenderedNode, TreeView, TypeLabel};
pub use selection::{InspectorState, NodeRef, SelectionHost};
pub use value::TreeValue;
