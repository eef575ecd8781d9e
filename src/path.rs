//! Paths locating a value inside one submission.
//!
//! A [`FieldPath`] starts at a field name and may descend into list elements
//! and record keys, e.g. `signatures[1].signature`. Validation messages are
//! keyed by these paths.

use std::fmt::{self, Display};

/// A segment of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A field name or record key (e.g. `email`, `signature`).
    Key(String),
    /// A list element (e.g. `[0]`).
    Index(usize),
}

/// A path to a submitted value.
///
/// # Example
///
/// ```rust
/// use formkit::FieldPath;
///
/// let path = FieldPath::field("signatures").push_index(1).push_key("signature");
/// assert_eq!(path.to_string(), "signatures[1].signature");
/// assert_eq!(path.field_name(), Some("signatures"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Creates a path pointing at a top-level field.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Key(name.into())],
        }
    }

    /// Returns a new path with a record key appended.
    pub fn push_key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    /// Returns a new path with a list index appended.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// True for the empty path, which points at no field.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The top-level field this path belongs to, if any.
    pub fn field_name(&self) -> Option<&str> {
        match self.segments.first() {
            Some(PathSegment::Key(name)) => Some(name),
            _ => None,
        }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path() {
        let path = FieldPath::default();
        assert!(path.is_root());
        assert_eq!(path.to_string(), "");
        assert_eq!(path.field_name(), None);
    }

    #[test]
    fn test_field_path() {
        let path = FieldPath::field("email");
        assert_eq!(path.to_string(), "email");
        assert_eq!(path.field_name(), Some("email"));
        assert!(!path.is_root());
    }

    #[test]
    fn test_nested_signature_path() {
        let path = FieldPath::field("sign-here")
            .push_index(0)
            .push_key("signature");
        assert_eq!(path.to_string(), "sign-here[0].signature");
        assert_eq!(path.field_name(), Some("sign-here"));
    }

    #[test]
    fn test_path_immutability() {
        let base = FieldPath::field("colors");
        let first = base.push_index(0);
        let second = base.push_index(1);

        assert_eq!(base.to_string(), "colors");
        assert_eq!(first.to_string(), "colors[0]");
        assert_eq!(second.to_string(), "colors[1]");
    }
}
