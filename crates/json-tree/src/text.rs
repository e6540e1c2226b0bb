//! Plain-text painter for rendered trees.
//!
//! Draws one line per visible row, two spaces of indent per level:
//!
//! ```text
//! ▾ users Object 2 entries
//!     name String "Ada"
//! > ▸ tags Array 3 items
//! ```
//!
//! Selected rows are prefixed with `>`, hovered rows with `~`, and a hovered
//! row's action bar is appended in brackets.

use crate::actions::ActionControlKind;
use crate::render::RenderedNode;

/// Paint a rendered tree as text.
pub fn paint(root: &RenderedNode) -> String {
    let mut out = String::new();
    if root.key.is_none() {
        if let Some(value) = &root.value {
            out.push_str(value);
            out.push('\n');
        }
        for child in &root.children {
            paint_row(child, 0, &mut out);
        }
    } else {
        paint_row(root, 0, &mut out);
    }
    out
}

fn paint_row(node: &RenderedNode, depth: usize, out: &mut String) {
    let marker = if node.hovered {
        "~ "
    } else if node.selected {
        "> "
    } else {
        "  "
    };
    let glyph = node.indicator.and_then(|i| i.glyph()).unwrap_or(" ");

    out.push_str(marker);
    out.push_str(&"  ".repeat(depth));
    out.push_str(glyph);
    out.push(' ');
    if let Some(icon) = &node.node_icon {
        out.push_str(&format!("[{icon}] "));
    }
    out.push_str(node.key.as_deref().unwrap_or_default());
    if let Some(label) = &node.type_label {
        out.push(' ');
        out.push_str(label.name);
        if let Some(count) = &label.count {
            out.push(' ');
            out.push_str(count);
        }
    }
    if let Some(value) = &node.value {
        out.push(' ');
        out.push_str(value);
    }
    if let Some(bar) = &node.action_bar {
        let names: Vec<&str> = bar
            .controls
            .iter()
            .map(|control| match &control.kind {
                ActionControlKind::CopyPath => "copy path",
                ActionControlKind::CopyValue => "copy value",
                ActionControlKind::Custom(name) => name.as_str(),
            })
            .collect();
        out.push_str(&format!("  [{}]", names.join(" | ")));
    }
    out.push('\n');

    for child in &node.children {
        paint_row(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExpandPredicate, TreeConfig};
    use crate::path::NodePath;
    use crate::render::TreeView;
    use crate::selection::InspectorState;
    use crate::value::TreeValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_paint_tree() {
        let data = TreeValue::from(json!({
            "user": { "name": "Ada", "tags": ["a", "b", "c"] },
            "active": true,
            "none": null
        }));
        let mut view = TreeView::new(TreeConfig {
            use_actions: true,
            enable_copy_to_clipboard: true,
            ..TreeConfig::default().with_expand(ExpandPredicate::Depth(1))
        });
        let mut host = InspectorState::new();
        host.select_path(&NodePath::parse("user").unwrap());
        host.hover_path(&NodePath::parse("active").unwrap());

        let painted = paint(&view.render(&data, &host));
        assert_eq!(
            painted,
            [
                "> ▾ user Object 2 entries",
                "      name String \"Ada\"",
                "    ▸ tags Array 3 items",
                "~   active Boolean true  [copy path | copy value]",
                "    none null",
                "",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_paint_primitive_root() {
        let mut view = TreeView::new(TreeConfig::default());
        let painted = paint(&view.render(&TreeValue::from(42i64), &InspectorState::new()));
        assert_eq!(painted, "42\n");
    }
}
