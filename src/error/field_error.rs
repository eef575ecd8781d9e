//! Per-field validation errors.
//!
//! [`FieldError`] describes one failed rule on one submitted value and
//! [`FieldErrors`] accumulates every failure of a submission attempt.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use stillwater::prelude::*;

use crate::path::FieldPath;

/// A single validation failure.
///
/// # Example
///
/// ```rust
/// use formkit::{FieldError, FieldPath};
///
/// let error = FieldError::new(FieldPath::field("email"), "must be a valid email address")
///     .with_code("invalid_email")
///     .with_expected("email address");
///
/// assert_eq!(error.code, "invalid_email");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// Where in the submission the failure occurred.
    pub path: FieldPath,
    /// Human-readable message, safe to show to a public submitter.
    pub message: String,
    /// Description of what was expected.
    pub expected: Option<String>,
    /// Machine-readable error code (e.g. `required`).
    pub code: String,
}

impl FieldError {
    /// Creates an error with the default `validation_error` code.
    pub fn new(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            expected: None,
            code: "validation_error".to_string(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.message)?;
        } else {
            write!(f, "{}: {}", self.path, self.message)?;
        }
        if let Some(ref expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldError {}

/// A non-empty collection of validation failures.
///
/// `FieldErrors` implements `Semigroup`, so failures from independent field
/// checks combine into one report:
///
/// ```rust
/// use formkit::{FieldError, FieldErrors, FieldPath};
/// use stillwater::prelude::*;
///
/// let name = FieldErrors::single(FieldError::new(FieldPath::field("name"), "is required"));
/// let email = FieldErrors::single(FieldError::new(FieldPath::field("email"), "is invalid"));
///
/// assert_eq!(name.combine(email).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldErrors(NonEmptyVec<FieldError>);

impl FieldErrors {
    pub fn single(error: FieldError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Builds a collection from a vec, returning `None` when it is empty.
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn first(&self) -> &FieldError {
        self.0.head()
    }

    /// Returns every error recorded against the named top-level field.
    pub fn for_field(&self, name: &str) -> Vec<&FieldError> {
        self.0
            .iter()
            .filter(|e| e.path.field_name() == Some(name))
            .collect()
    }

    pub fn with_code(&self, code: &str) -> Vec<&FieldError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Groups messages by top-level field name, in the order fields failed.
    ///
    /// This is the shape handed back to public submitters.
    pub fn by_field(&self) -> IndexMap<String, Vec<String>> {
        let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();
        for error in self.0.iter() {
            let key = error.path.field_name().unwrap_or_default().to_string();
            grouped.entry(key).or_default().push(error.message.clone());
        }
        grouped
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0.into_vec()
    }
}

impl Semigroup for FieldErrors {
    fn combine(self, other: Self) -> Self {
        FieldErrors(self.0.combine(other.0))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "submission rejected with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<FieldErrors>();
    assert_sync::<FieldErrors>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_defaults() {
        let error = FieldError::new(FieldPath::field("name"), "is required");

        assert_eq!(error.code, "validation_error");
        assert!(error.expected.is_none());
        assert_eq!(error.to_string(), "name: is required");
    }

    #[test]
    fn test_field_error_display_with_expected() {
        let error = FieldError::new(FieldPath::field("age"), "must be a number")
            .with_code("invalid_number")
            .with_expected("numeric value");

        assert_eq!(
            error.to_string(),
            "age: must be a number (expected: numeric value)"
        );
    }

    #[test]
    fn test_from_vec_rejects_empty() {
        assert!(FieldErrors::from_vec(Vec::new()).is_none());
    }

    #[test]
    fn test_by_field_groups_nested_paths() {
        let errors = FieldErrors::single(FieldError::new(
            FieldPath::field("sig").push_index(0),
            "missing image",
        ))
        .combine(FieldErrors::single(FieldError::new(
            FieldPath::field("email"),
            "is invalid",
        )))
        .combine(FieldErrors::single(FieldError::new(
            FieldPath::field("sig").push_index(2),
            "missing image",
        )));

        let grouped = errors.by_field();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["sig"].len(), 2);
        assert_eq!(grouped.keys().next().map(String::as_str), Some("sig"));
    }

    #[test]
    fn test_with_code_and_for_field() {
        let errors = FieldErrors::single(
            FieldError::new(FieldPath::field("a"), "x").with_code("required"),
        )
        .combine(FieldErrors::single(
            FieldError::new(FieldPath::field("b"), "y").with_code("invalid_option"),
        ));

        assert_eq!(errors.with_code("required").len(), 1);
        assert_eq!(errors.for_field("b").len(), 1);
        assert!(errors.for_field("c").is_empty());
    }

    #[test]
    fn test_display_lists_every_error() {
        let errors = FieldErrors::single(FieldError::new(FieldPath::field("name"), "is required"))
            .combine(FieldErrors::single(FieldError::new(
                FieldPath::field("email"),
                "is invalid",
            )));
        let display = errors.to_string();

        assert!(display.contains("2 error(s)"));
        assert!(display.contains("name: is required"));
        assert!(display.contains("email: is invalid"));
    }
}
