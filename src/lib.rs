//! # Formkit
//!
//! Operator-defined forms with typed fields, public submissions and
//! storage-backed normalization of uploads and signatures.
//!
//! ## Overview
//!
//! An operator builds a form's [`FormSchema`] field by field. At submission
//! time the live schema is compiled into a [`ValidationPlan`], which checks
//! every field and accumulates ALL failures through stillwater's
//! `Validation` type: a submission is either accepted whole or rejected with
//! every error at once. Accepted file and signature payloads are written to
//! a [`Storage`] backend before the [`FormSubmission`] is recorded, so a
//! rejected submission never leaves stored files behind.
//!
//! ## Core Types
//!
//! - [`FieldTypeRegistry`]: the closed set of field types and their capabilities
//! - [`FormSchema`]: a form's ordered field list
//! - [`ValidationPlan`]: per-field rules compiled from a schema
//! - [`SubmissionNormalizer`](normalize::SubmissionNormalizer): writes payloads to storage
//! - [`FieldReorderer`](reorder::FieldReorderer): all-or-nothing reorder batches
//! - [`FormService`]: the admin and public operations over an in-process store
//!
//! ## Example
//!
//! ```rust
//! use formkit::{FieldDefinition, FormService, FormsConfig, MemoryStorage};
//! use formkit::{NewForm, OperatorId, SubmissionInput};
//! use serde_json::json;
//!
//! let service = FormService::new(MemoryStorage::default(), FormsConfig::default());
//! let form = service
//!     .create_form(&OperatorId::new("admin"), NewForm::new("Event RSVP"))
//!     .unwrap();
//! service
//!     .create_field(form.id, &FieldDefinition::new("Name", "text").required())
//!     .unwrap();
//! service
//!     .create_field(
//!         form.id,
//!         &FieldDefinition::new("Meal", "radio")
//!             .with_option("Vegetarian", "veg")
//!             .with_option("Fish", "fish"),
//!     )
//!     .unwrap();
//!
//! // Every failing field is reported.
//! let input = SubmissionInput::new("198.51.100.1".parse().unwrap())
//!     .with_value("meal", json!("beef"));
//! let err = service.submit(&form.slug, input).unwrap_err();
//! let errors = err.field_errors().unwrap();
//! assert_eq!(errors.len(), 2);
//! assert_eq!(err.public_message(), "the submission contains invalid fields");
//!
//! let input = SubmissionInput::new("198.51.100.1".parse().unwrap())
//!     .with_value("name", json!("Ada"))
//!     .with_value("meal", json!("veg"));
//! assert!(service.submit(&form.slug, input).is_ok());
//! ```

pub mod config;
pub mod error;
pub mod form;
pub mod id;
pub mod normalize;
pub mod path;
pub mod plan;
pub mod registry;
pub mod reorder;
pub mod schema;
pub mod service;
pub mod storage;
pub mod submission;

pub use config::{ConfigError, FormsConfig, DEFAULT_MAX_UPLOAD_BYTES};
pub use error::{FieldError, FieldErrors, FormsError};
pub use form::{Form, FormUpdate, NewForm, PublicForm};
pub use id::{FieldId, FormId, OperatorId, SubmissionId};
pub use normalize::{NormalizedSubmission, SubmissionNormalizer};
pub use path::{FieldPath, PathSegment};
pub use plan::{
    AcceptedValue, DecodedSignature, PlannedField, SubmissionInput, UploadedFile,
    ValidatedSubmission, ValidationOutcome, ValidationPlan,
};
pub use registry::{Capabilities, FieldType, FieldTypeRegistry, ValueShape};
pub use reorder::{FieldReorderer, ReorderEntry};
pub use schema::{FieldConfig, FieldDefinition, FieldOption, FormField, FormSchema, SignatureConfig};
pub use service::FormService;
pub use storage::{LocalDiskStorage, MemoryStorage, Storage, StorageError, StoredRef};
pub use submission::{FieldValue, FormSubmission, SignatureRecord, SubmissionStatus};

/// Type alias for per-field validation results.
pub type ValidationResult<T> = stillwater::Validation<T, FieldErrors>;
