//! Error types.
//!
//! [`FieldError`]/[`FieldErrors`] describe why a submission was rejected;
//! [`FormsError`] is the failure type of every operation.

mod field_error;
mod forms_error;

pub use field_error::{FieldError, FieldErrors};
pub use forms_error::{FormsError, Result};
