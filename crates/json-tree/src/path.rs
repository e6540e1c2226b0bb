//! NodePath - positional node identity.
//!
//! A path is the ordered sequence of keys/indices from the root and includes
//! the node's own key as its last segment. Paths print in the absolute form
//! used by copy-path (`users[0].name`, `meta["a.b"]`) and parse back.
//! Inside brackets, `"` and `\` are escaped with a backslash.

use crate::error::PathError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a path: an object/map key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl PathSegment {
    fn is_plain_key(key: &str) -> bool {
        !key.is_empty() && !key.contains(['.', '[', ']', '"'])
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Path from the root to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(Vec<PathSegment>);

impl NodePath {
    /// The empty path, addressing the root value.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: impl IntoIterator<Item = PathSegment>) -> Self {
        Self(segments.into_iter().collect())
    }

    /// Path of a direct child.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The node's own key.
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// The key of the node's parent (second-to-last segment).
    pub fn parent_segment(&self) -> Option<&PathSegment> {
        self.0.len().checked_sub(2).and_then(|i| self.0.get(i))
    }

    /// Parse an absolute path such as `users[0].name` or `meta["a.b"]`.
    ///
    /// The empty string is the root path.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        let mut key = String::new();
        let mut after_bracket = false;
        let mut chars = input.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '.' => {
                    if key.is_empty() && !after_bracket {
                        return Err(PathError::EmptySegment { position: pos });
                    }
                    if !key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    }
                    if chars.peek().is_none() {
                        return Err(PathError::EmptySegment { position: pos + 1 });
                    }
                    after_bracket = false;
                }
                '[' => {
                    if !key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    }
                    let segment = if matches!(chars.peek(), Some((_, '"'))) {
                        chars.next();
                        let mut quoted = String::new();
                        loop {
                            match chars.next() {
                                Some((_, '"')) => break,
                                Some((_, '\\')) => match chars.next() {
                                    Some((_, ch)) => quoted.push(ch),
                                    None => return Err(PathError::Unterminated { position: pos }),
                                },
                                Some((_, ch)) => quoted.push(ch),
                                None => return Err(PathError::Unterminated { position: pos }),
                            }
                        }
                        PathSegment::Key(quoted)
                    } else {
                        let mut digits = String::new();
                        while let Some(&(_, ch)) = chars.peek() {
                            if ch == ']' {
                                break;
                            }
                            digits.push(ch);
                            chars.next();
                        }
                        let index = digits.parse::<usize>().map_err(|_| PathError::InvalidIndex {
                            position: pos,
                            index: digits.clone(),
                        })?;
                        PathSegment::Index(index)
                    };
                    match chars.next() {
                        Some((_, ']')) => {}
                        _ => return Err(PathError::Unterminated { position: pos }),
                    }
                    segments.push(segment);
                    after_bracket = true;
                }
                ']' => return Err(PathError::UnexpectedChar { ch: c, position: pos }),
                _ => {
                    if after_bracket {
                        return Err(PathError::UnexpectedChar { ch: c, position: pos });
                    }
                    key.push(c);
                }
            }
        }

        if !key.is_empty() {
            segments.push(PathSegment::Key(key));
        }
        Ok(Self(segments))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) if PathSegment::is_plain_key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Key(key) => {
                    f.write_str("[\"")?;
                    for ch in key.chars() {
                        if matches!(ch, '"' | '\\') {
                            f.write_str("\\")?;
                        }
                        write!(f, "{ch}")?;
                    }
                    f.write_str("\"]")?;
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<PathSegment> for NodePath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self::from_segments(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> PathSegment {
        PathSegment::Key(k.to_string())
    }

    #[test]
    fn test_parse_dotted_and_indexed() {
        let path = NodePath::parse("users[0].address.city").unwrap();
        assert_eq!(
            path.segments(),
            &[key("users"), PathSegment::Index(0), key("address"), key("city")]
        );
    }

    #[test]
    fn test_parse_quoted_key() {
        let path = NodePath::parse(r#"meta["a.b"][2]"#).unwrap();
        assert_eq!(path.segments(), &[key("meta"), key("a.b"), PathSegment::Index(2)]);
    }

    #[test]
    fn test_parse_root() {
        assert!(NodePath::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            NodePath::parse("a..b"),
            Err(PathError::EmptySegment { position: 2 })
        );
        assert_eq!(NodePath::parse(".a"), Err(PathError::EmptySegment { position: 0 }));
        assert_eq!(NodePath::parse("a."), Err(PathError::EmptySegment { position: 2 }));
        assert_eq!(NodePath::parse("a[1"), Err(PathError::Unterminated { position: 1 }));
        assert!(matches!(
            NodePath::parse("a[x]"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert_eq!(
            NodePath::parse("a[0]b"),
            Err(PathError::UnexpectedChar { ch: 'b', position: 4 })
        );
    }

    #[test]
    fn test_display_quotes_awkward_keys() {
        let path = NodePath::from_segments([key("data"), key("x.y"), PathSegment::Index(3)]);
        assert_eq!(path.to_string(), r#"data["x.y"][3]"#);
        assert_eq!(NodePath::parse(&path.to_string()).unwrap(), path);
    }

    #[test]
    fn test_quotes_and_backslashes_round_trip() {
        let path = NodePath::from_segments([
            key("meta"),
            key(r#"say "hi""#),
            key(r"dir\sub.json"),
            key(r"C:\tmp"),
        ]);
        assert_eq!(
            path.to_string(),
            r#"meta["say \"hi\""]["dir\\sub.json"].C:\tmp"#
        );
        assert_eq!(NodePath::parse(&path.to_string()).unwrap(), path);

        assert_eq!(
            NodePath::parse(r#"a["open\"#),
            Err(PathError::Unterminated { position: 1 })
        );
    }

    #[test]
    fn test_empty_key_is_addressable() {
        let path = NodePath::from_segments([key("meta"), key("")]);
        assert_eq!(path.to_string(), r#"meta[""]"#);
        assert_eq!(NodePath::parse(r#"meta[""]"#).unwrap(), path);
    }

    #[test]
    fn test_parent_segment() {
        let path = NodePath::parse("a.b.c").unwrap();
        assert_eq!(path.last(), Some(&key("c")));
        assert_eq!(path.parent_segment(), Some(&key("b")));
        assert_eq!(NodePath::parse("a").unwrap().parent_segment(), None);
    }
}
