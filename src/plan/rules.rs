//! Type-specific rules applied to present values.

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::OnceLock;
use stillwater::Validation;

use crate::config::FormsConfig;
use crate::error::{FieldError, FieldErrors};
use crate::path::FieldPath;
use crate::registry::ValueShape;
use crate::schema::FormField;
use crate::ValidationResult;

use super::input::{AcceptedValue, UploadedFile};
use super::signature::decode_entry;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static pattern compiles"))
}

fn date_pattern() -> &'static Regex {
    static DATE: OnceLock<Regex> = OnceLock::new();
    DATE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static pattern compiles"))
}

/// A raw value as found in the submission.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RawValue<'a> {
    Value(&'a Value),
    File(&'a UploadedFile),
}

impl RawValue<'_> {
    /// Missing-equivalent values: null, blank text, empty lists, empty files.
    pub(crate) fn is_blank(&self) -> bool {
        match self {
            RawValue::Value(Value::Null) => true,
            RawValue::Value(Value::String(s)) => s.trim().is_empty(),
            RawValue::Value(Value::Array(items)) => items.is_empty(),
            RawValue::Value(_) => false,
            RawValue::File(file) => file.is_empty(),
        }
    }
}

/// The check a field's value must pass once present.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldRule {
    Text,
    Email,
    Number,
    Date,
    File { max_bytes: u64 },
    Choice { allowed: Vec<String> },
    Choices { allowed: Vec<String> },
    Signature,
}

impl FieldRule {
    /// Picks the rule from the field type's value shape.
    pub(crate) fn for_field(field: &FormField, config: &FormsConfig) -> Self {
        let allowed = || {
            field
                .options()
                .iter()
                .map(|option| option.value.clone())
                .collect::<Vec<_>>()
        };
        match field.field_type.capabilities().shape {
            ValueShape::Text => FieldRule::Text,
            ValueShape::Email => FieldRule::Email,
            ValueShape::Number => FieldRule::Number,
            ValueShape::Date => FieldRule::Date,
            ValueShape::SingleOption => FieldRule::Choice { allowed: allowed() },
            ValueShape::OptionList => FieldRule::Choices { allowed: allowed() },
            ValueShape::StoredFile => FieldRule::File {
                max_bytes: config.max_upload_bytes,
            },
            ValueShape::SignatureList => FieldRule::Signature,
        }
    }

    /// Whether this rule reads from uploaded files rather than values.
    pub(crate) fn reads_files(&self) -> bool {
        matches!(self, FieldRule::File { .. })
    }

    pub(crate) fn check(&self, raw: RawValue<'_>, path: &FieldPath) -> ValidationResult<AcceptedValue> {
        let result = match (self, raw) {
            (FieldRule::File { max_bytes }, RawValue::File(file)) => check_file(file, *max_bytes, path),
            (FieldRule::File { .. }, RawValue::Value(_)) => Err(FieldErrors::single(
                type_error(path, "must be an uploaded file", "file"),
            )),
            (_, RawValue::File(_)) => Err(FieldErrors::single(type_error(
                path,
                "must not be a file upload",
                "value",
            ))),
            (FieldRule::Text, RawValue::Value(value)) => check_text(value, path).map(AcceptedValue::Text),
            (FieldRule::Email, RawValue::Value(value)) => check_email(value, path),
            (FieldRule::Number, RawValue::Value(value)) => check_number(value, path),
            (FieldRule::Date, RawValue::Value(value)) => check_date(value, path),
            (FieldRule::Choice { allowed }, RawValue::Value(value)) => check_choice(value, allowed, path),
            (FieldRule::Choices { allowed }, RawValue::Value(value)) => check_choices(value, allowed, path),
            (FieldRule::Signature, RawValue::Value(value)) => check_signatures(value, path),
        };
        match result {
            Ok(value) => Validation::Success(value),
            Err(errors) => Validation::Failure(errors),
        }
    }
}

type RuleResult<T> = Result<T, FieldErrors>;

fn type_error(path: &FieldPath, message: &str, expected: &str) -> FieldError {
    FieldError::new(path.clone(), message)
        .with_code("invalid_type")
        .with_expected(expected)
}

/// Scalar JSON values rendered as text; lists and records are rejected.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn check_text(value: &Value, path: &FieldPath) -> RuleResult<String> {
    scalar_text(value).ok_or_else(|| FieldErrors::single(type_error(path, "must be text", "text")))
}

fn check_email(value: &Value, path: &FieldPath) -> RuleResult<AcceptedValue> {
    let text = check_text(value, path)?;
    if email_pattern().is_match(&text) {
        Ok(AcceptedValue::Text(text))
    } else {
        Err(FieldErrors::single(
            FieldError::new(path.clone(), "must be a valid email address")
                .with_code("invalid_email")
                .with_expected("email address"),
        ))
    }
}

fn check_number(value: &Value, path: &FieldPath) -> RuleResult<AcceptedValue> {
    let parsed = match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => parse_number(s.trim()),
        _ => None,
    };
    parsed.map(AcceptedValue::Number).ok_or_else(|| {
        FieldErrors::single(
            FieldError::new(path.clone(), "must be a number")
                .with_code("invalid_number")
                .with_expected("numeric value"),
        )
    })
}

fn parse_number(s: &str) -> Option<Number> {
    if let Ok(int) = s.parse::<i64>() {
        return Some(Number::from(int));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

fn check_date(value: &Value, path: &FieldPath) -> RuleResult<AcceptedValue> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| date_pattern().is_match(s))
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .map(AcceptedValue::Date)
        .ok_or_else(|| {
            FieldErrors::single(
                FieldError::new(path.clone(), "must be a valid date")
                    .with_code("invalid_date")
                    .with_expected("date as YYYY-MM-DD"),
            )
        })
}

fn check_file(file: &UploadedFile, max_bytes: u64, path: &FieldPath) -> RuleResult<AcceptedValue> {
    if file.len() as u64 > max_bytes {
        return Err(FieldErrors::single(
            FieldError::new(
                path.clone(),
                format!("may not be larger than {} kilobytes", max_bytes / 1024),
            )
            .with_code("file_too_large")
            .with_expected(format!("at most {} bytes", max_bytes)),
        ));
    }
    Ok(AcceptedValue::File(file.clone()))
}

fn invalid_option(path: &FieldPath) -> FieldError {
    FieldError::new(path.clone(), "the selected option is invalid")
        .with_code("invalid_option")
        .with_expected("one of the configured options")
}

fn check_choice(value: &Value, allowed: &[String], path: &FieldPath) -> RuleResult<AcceptedValue> {
    match scalar_text(value) {
        Some(choice) if allowed.contains(&choice) => Ok(AcceptedValue::Choice(choice)),
        Some(_) => Err(FieldErrors::single(invalid_option(path))),
        None => Err(FieldErrors::single(type_error(
            path,
            "must be a single option",
            "option value",
        ))),
    }
}

fn check_choices(value: &Value, allowed: &[String], path: &FieldPath) -> RuleResult<AcceptedValue> {
    let items = value.as_array().ok_or_else(|| {
        FieldErrors::single(type_error(path, "must be a list of options", "list"))
    })?;

    let mut chosen = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (i, item) in items.iter().enumerate() {
        match scalar_text(item) {
            Some(choice) if allowed.contains(&choice) => chosen.push(choice),
            _ => errors.push(invalid_option(&path.push_index(i))),
        }
    }

    match FieldErrors::from_vec(errors) {
        Some(errors) => Err(errors),
        None => Ok(AcceptedValue::Choices(chosen)),
    }
}

fn check_signatures(value: &Value, path: &FieldPath) -> RuleResult<AcceptedValue> {
    let entries = value.as_array().ok_or_else(|| {
        FieldErrors::single(type_error(
            path,
            "signature is required and must be a list",
            "list of signatures",
        ))
    })?;

    let mut decoded = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        match decode_entry(entry, &path.push_index(i)) {
            Ok(signature) => decoded.push(signature),
            Err(error) => errors.push(error),
        }
    }

    match FieldErrors::from_vec(errors) {
        Some(errors) => Err(errors),
        None => Ok(AcceptedValue::Signatures(decoded)),
    }
}
