//! The operation-level error taxonomy.

use crate::error::FieldErrors;
use crate::id::{FieldId, FormId, SubmissionId};
use crate::storage::StorageError;

/// Errors returned by schema edits, reorders and submissions.
///
/// Definition, ownership and storage errors carry diagnostic detail for
/// admin callers. Public callers should only ever see
/// [`FormsError::public_message`] and, for rejected submissions, the
/// field-keyed messages of [`FieldErrors::by_field`].
#[derive(Debug, thiserror::Error)]
pub enum FormsError {
    #[error("unknown field type '{0}'")]
    UnknownFieldType(String),

    #[error("invalid field definition: {0}")]
    InvalidFieldDefinition(String),

    #[error("invalid form definition: {0}")]
    InvalidFormDefinition(String),

    #[error("form {0} not found")]
    FormNotFound(FormId),

    #[error("field {field} not found on form {form}")]
    FieldNotFound { form: FormId, field: FieldId },

    #[error("field {field} belongs to form {owner}, not form {form}")]
    FieldOwnershipMismatch {
        form: FormId,
        field: FieldId,
        owner: FormId,
    },

    #[error("invalid reorder batch: {0}")]
    InvalidBatch(String),

    /// The form is missing, inactive or expired. Deliberately
    /// indistinguishable from a missing form.
    #[error("form not found")]
    FormNotSubmittable,

    #[error("{0}")]
    ValidationFailed(FieldErrors),

    #[error("submission {0} not found")]
    SubmissionNotFound(SubmissionId),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl FormsError {
    /// Text that may be shown to an unauthenticated submitter.
    pub fn public_message(&self) -> &'static str {
        match self {
            FormsError::FormNotSubmittable | FormsError::FormNotFound(_) => "form not found",
            FormsError::ValidationFailed(_) => "the submission contains invalid fields",
            _ => "the submission could not be processed",
        }
    }

    /// The per-field errors of a rejected submission.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            FormsError::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FormsError>;
