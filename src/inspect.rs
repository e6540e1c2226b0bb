//! Render a JSON document as a text tree.

use json_tree::{
    text, ExpandPredicate, InspectorState, NodePath, PathError, TreeConfig, TreeDisplayConfig,
    TreeError, TreeValue, TreeView,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[derive(Debug, Clone, Default)]
pub struct InspectOptions {
    /// Open every composite node, overriding `expand_depth`.
    pub expand_all: bool,
    pub select: Option<String>,
    pub hover: Option<String>,
}

/// Parse `document`, apply selection and hover, and paint the tree.
pub fn inspect_document(
    document: &str,
    display: &TreeDisplayConfig,
    options: &InspectOptions,
) -> Result<String, InspectError> {
    let data = TreeValue::from(serde_json::from_str::<serde_json::Value>(document)?);

    let mut config = TreeConfig::from_display(display);
    if options.expand_all {
        config = config.with_expand(ExpandPredicate::Static(true));
    }

    let mut state = InspectorState::new();
    if let Some(select) = &options.select {
        state.select_path(&existing_path(&data, select)?);
    }
    if let Some(hover) = &options.hover {
        state.hover_path(&existing_path(&data, hover)?);
    }

    let mut view = TreeView::new(config);
    let rendered = view.render(&data, &state);
    Ok(text::paint(&rendered))
}

fn existing_path(data: &TreeValue, raw: &str) -> Result<NodePath, InspectError> {
    let path = NodePath::parse(raw)?;
    if path.is_empty() {
        return Err(TreeError::RootNode.into());
    }
    if data.at(&path).is_none() {
        return Err(TreeError::NodeNotFound { path }.into());
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOCUMENT: &str = r#"{"user": {"name": "Ada", "langs": ["en", "fr"]}, "active": true}"#;

    #[test]
    fn test_collapsed_by_default() {
        let painted =
            inspect_document(DOCUMENT, &TreeDisplayConfig::default(), &InspectOptions::default())
                .unwrap();
        assert_eq!(painted, "  ▸ user Object 2 entries\n    active Boolean true\n");
    }

    #[test]
    fn test_expand_all_and_select() {
        let options = InspectOptions {
            expand_all: true,
            select: Some("user.langs".into()),
            hover: None,
        };
        let painted = inspect_document(DOCUMENT, &TreeDisplayConfig::default(), &options).unwrap();
        assert_eq!(
            painted,
            [
                "  ▾ user Object 2 entries",
                "      name String \"Ada\"",
                ">   ▾ langs Array 2 items",
                "        0 String \"en\"",
                "        1 String \"fr\"",
                "    active Boolean true",
                "",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_unknown_paths_are_rejected() {
        let options = InspectOptions {
            select: Some("user.email".into()),
            ..InspectOptions::default()
        };
        let err = inspect_document(DOCUMENT, &TreeDisplayConfig::default(), &options).unwrap_err();
        assert!(matches!(err, InspectError::Tree(TreeError::NodeNotFound { .. })));

        let err = inspect_document("{oops", &TreeDisplayConfig::default(), &InspectOptions::default())
            .unwrap_err();
        assert!(matches!(err, InspectError::Json(_)));
    }
}
