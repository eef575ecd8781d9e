//! Turning accepted values into their persisted form.
//!
//! [`SubmissionNormalizer`] consumes a [`ValidatedSubmission`], so it can only
//! run after every field passed. Uploaded files and decoded signature images
//! are written to [`Storage`] under generated names that carry nothing of the
//! submitted content; the persisted value keeps only the [`StoredRef`].

use chrono::NaiveDate;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::config::FormsConfig;
use crate::error::FormsError;
use crate::plan::{AcceptedValue, DecodedSignature, UploadedFile, ValidatedSubmission};
use crate::storage::{Storage, StoredRef};
use crate::submission::{FieldValue, SignatureRecord};

/// The persisted data of one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSubmission {
    pub data: IndexMap<String, FieldValue>,
    pub submitter_email: Option<String>,
}

/// Writes file and signature payloads to storage and converts every
/// accepted value to a [`FieldValue`].
///
/// # Example
///
/// ```rust
/// use formkit::normalize::SubmissionNormalizer;
/// use formkit::{FieldDefinition, FieldValue, FormId, FormSchema, FormsConfig, MemoryStorage};
/// use formkit::{SubmissionInput, ValidationPlan};
/// use serde_json::json;
///
/// let config = FormsConfig::default();
/// let mut schema = FormSchema::new(FormId::new());
/// schema.add_field(&FieldDefinition::new("Signature", "signature"), &config).unwrap();
///
/// let input = SubmissionInput::new("192.0.2.7".parse().unwrap()).with_value(
///     "signature",
///     json!([{ "signature": "data:image/png;base64,aGVsbG8=", "printed_name": "Jane Doe" }]),
/// );
/// let validated = ValidationPlan::compile(&schema, &config)
///     .validate(&input)
///     .into_result()
///     .unwrap();
///
/// let storage = MemoryStorage::default();
/// let today = chrono::NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
/// let normalized = SubmissionNormalizer::new(&storage, &config)
///     .normalize(validated, today)
///     .unwrap();
///
/// let records = normalized.data["signature"].as_signatures().unwrap();
/// assert!(records[0].signature.as_str().starts_with("signatures/"));
/// assert_eq!(records[0].date, "2026-05-01");
/// assert_eq!(storage.len(), 1);
/// ```
pub struct SubmissionNormalizer<'a, S: Storage + ?Sized> {
    storage: &'a S,
    config: &'a FormsConfig,
}

impl<'a, S: Storage + ?Sized> SubmissionNormalizer<'a, S> {
    pub fn new(storage: &'a S, config: &'a FormsConfig) -> Self {
        Self { storage, config }
    }

    /// Normalizes every value. `today` fills in signature dates the
    /// submitter left out.
    ///
    /// Each file and each signature entry costs exactly one storage write.
    /// A storage failure aborts with [`FormsError::Storage`]; objects already
    /// written are left in place.
    pub fn normalize(
        &self,
        validated: ValidatedSubmission,
        today: NaiveDate,
    ) -> Result<NormalizedSubmission, FormsError> {
        let mut data = IndexMap::with_capacity(validated.values.len());
        for (name, value) in validated.values {
            let normalized = self.normalize_value(&name, value, today)?;
            data.insert(name, normalized);
        }
        Ok(NormalizedSubmission {
            data,
            submitter_email: validated.submitter_email,
        })
    }

    fn normalize_value(
        &self,
        field: &str,
        value: AcceptedValue,
        today: NaiveDate,
    ) -> Result<FieldValue, FormsError> {
        Ok(match value {
            AcceptedValue::Text(s) => FieldValue::Text(s),
            AcceptedValue::Number(n) => FieldValue::Number(n),
            AcceptedValue::Date(d) => FieldValue::Date(d),
            AcceptedValue::Choice(s) => FieldValue::Choice(s),
            AcceptedValue::Choices(list) => FieldValue::Choices(list),
            AcceptedValue::File(file) => FieldValue::File(self.store_file(field, &file)?),
            AcceptedValue::Signatures(entries) => FieldValue::Signatures(
                entries
                    .into_iter()
                    .map(|entry| self.store_signature(field, entry, today))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    fn store_file(&self, field: &str, file: &UploadedFile) -> Result<StoredRef, FormsError> {
        let name = match file.extension() {
            Some(ext) => format!("{}/{}.{}", self.config.upload_area, Uuid::new_v4(), ext),
            None => format!("{}/{}", self.config.upload_area, Uuid::new_v4()),
        };
        let stored = self.storage.store(&file.bytes, &name)?;
        tracing::debug!(field = field, path = %stored, bytes = file.len(), "stored uploaded file");
        Ok(stored)
    }

    fn store_signature(
        &self,
        field: &str,
        entry: DecodedSignature,
        today: NaiveDate,
    ) -> Result<SignatureRecord, FormsError> {
        let name = format!(
            "{}/{}.{}",
            self.config.signature_area,
            Uuid::new_v4(),
            self.config.signature_extension
        );
        let stored = self.storage.store(&entry.image, &name)?;
        tracing::debug!(field = field, path = %stored, bytes = entry.image.len(), "stored signature image");
        Ok(SignatureRecord {
            signature: stored,
            printed_name: entry.printed_name,
            date: entry
                .date
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
        })
    }
}
