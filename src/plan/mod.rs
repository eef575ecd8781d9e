//! Compiling a form schema into a submission validation plan.
//!
//! A [`ValidationPlan`] is built from the live schema at submission time, so
//! it always reflects the current fields. Applying it to a
//! [`SubmissionInput`] checks every field, accumulating all failures, and
//! yields either every accepted value or every error: a submission is never
//! partially accepted. Input keys that match no field are ignored.
//!
//! # Example
//!
//! ```rust
//! use formkit::{FieldDefinition, FormId, FormSchema, FormsConfig, SubmissionInput, ValidationPlan};
//! use serde_json::json;
//!
//! let config = FormsConfig::default();
//! let mut schema = FormSchema::new(FormId::new());
//! schema.add_field(&FieldDefinition::new("Email", "email").required(), &config).unwrap();
//! schema.add_field(&FieldDefinition::new("Age", "number"), &config).unwrap();
//!
//! let plan = ValidationPlan::compile(&schema, &config);
//! let input = SubmissionInput::new("198.51.100.4".parse().unwrap())
//!     .with_value("age", json!("not a number"));
//!
//! let errors = plan.validate(&input).into_result().unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```

mod input;
mod rules;
mod signature;

pub use input::{AcceptedValue, DecodedSignature, SubmissionInput, UploadedFile, ValidatedSubmission};

use indexmap::IndexMap;
use rayon::prelude::*;
use stillwater::Validation;

use crate::config::FormsConfig;
use crate::error::{FieldError, FieldErrors};
use crate::path::FieldPath;
use crate::registry::FieldType;
use crate::schema::FormSchema;
use crate::ValidationResult;

use rules::{FieldRule, RawValue};

/// Either every accepted value or every failure of one submission.
pub type ValidationOutcome = ValidationResult<ValidatedSubmission>;

/// The rules of one field within a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedField {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    rule: FieldRule,
}

impl PlannedField {
    /// Checks this field against the input. `None` means the field was
    /// optional and absent, so it contributes no value.
    fn check(&self, input: &SubmissionInput) -> Option<ValidationResult<AcceptedValue>> {
        let path = FieldPath::field(&self.name);
        let raw = self
            .lookup(input)
            .filter(|raw| !raw.is_blank());

        match raw {
            Some(raw) => Some(self.rule.check(raw, &path)),
            None if self.required => Some(Validation::Failure(FieldErrors::single(
                FieldError::new(path, format!("{} is required", self.label))
                    .with_code("required")
                    .with_expected("value"),
            ))),
            None => None,
        }
    }

    fn lookup<'a>(&self, input: &'a SubmissionInput) -> Option<RawValue<'a>> {
        if self.rule.reads_files() {
            if let Some(file) = input.files.get(&self.name) {
                return Some(RawValue::File(file));
            }
        }
        input.values.get(&self.name).map(RawValue::Value)
    }
}

/// Per-field rules derived from a schema, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationPlan {
    fields: Vec<PlannedField>,
}

impl ValidationPlan {
    pub fn compile(schema: &FormSchema, config: &FormsConfig) -> Self {
        let ordered = schema.fields_ordered();
        let fields: Vec<PlannedField> = ordered
            .iter()
            .map(|field| PlannedField {
                name: field.name.clone(),
                label: field.label.clone(),
                field_type: field.field_type,
                required: field.is_required,
                rule: FieldRule::for_field(field, config),
            })
            .collect();

        Self { fields }
    }

    pub fn fields(&self) -> &[PlannedField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Applies every field rule to `input`.
    ///
    /// Fields are checked in parallel; accepted values and errors are
    /// reported in schema order.
    pub fn validate(&self, input: &SubmissionInput) -> ValidationOutcome {
        let results: Vec<_> = self
            .fields
            .par_iter()
            .map(|field| (field.name.as_str(), field.check(input)))
            .collect();

        let mut values = IndexMap::new();
        let mut errors = Vec::new();
        for (name, result) in results {
            match result {
                Some(Validation::Success(value)) => {
                    values.insert(name.to_string(), value);
                }
                Some(Validation::Failure(e)) => errors.extend(e),
                None => {}
            }
        }

        if let Some(errors) = FieldErrors::from_vec(errors) {
            return Validation::Failure(errors);
        }

        let submitter_email = self.submitter_email(&values);

        Validation::Success(ValidatedSubmission {
            values,
            submitter_email,
        })
    }

    /// The first email-type field that carries a value, in schema order,
    /// else the value of a field named `email`.
    fn submitter_email(&self, values: &IndexMap<String, AcceptedValue>) -> Option<String> {
        let text = |name: &str| match values.get(name) {
            Some(AcceptedValue::Text(email)) => Some(email.clone()),
            _ => None,
        };
        self.fields
            .iter()
            .filter(|f| f.field_type == FieldType::Email)
            .find_map(|f| text(&f.name))
            .or_else(|| text("email"))
    }
}
