//! Persisted submissions and their typed values.

use std::fmt::{self, Display};
use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::id::{FormId, SubmissionId};
use crate::storage::StoredRef;

/// Review state of a submission. New submissions are `pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Reviewed,
    Spam,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Reviewed => "reviewed",
            SubmissionStatus::Spam => "spam",
        }
    }
}

impl Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubmissionStatus::Pending),
            "reviewed" => Ok(SubmissionStatus::Reviewed),
            "spam" => Ok(SubmissionStatus::Spam),
            other => Err(format!("unknown submission status '{}'", other)),
        }
    }
}

/// One stored signature capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub signature: StoredRef,
    pub printed_name: Option<String>,
    /// The date the submitter gave, or the submission date.
    pub date: String,
}

/// A normalized field value as persisted in [`FormSubmission::data`].
///
/// Binary payloads never appear here, only [`StoredRef`]s to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    Date(NaiveDate),
    Choice(String),
    Choices(Vec<String>),
    File(StoredRef),
    Signatures(Vec<SignatureRecord>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_signatures(&self) -> Option<&[SignatureRecord]> {
        match self {
            FieldValue::Signatures(records) => Some(records),
            _ => None,
        }
    }

    pub fn as_stored(&self) -> Option<&StoredRef> {
        match self {
            FieldValue::File(stored) => Some(stored),
            _ => None,
        }
    }
}

/// One respondent's accepted, normalized values for a form.
///
/// `data` keys are the field names that existed when the submission was
/// made; later schema edits do not migrate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub id: SubmissionId,
    pub form_id: FormId,
    pub data: IndexMap<String, FieldValue>,
    pub submitter_ip: IpAddr,
    pub submitter_email: Option<String>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}
