//! Raw submission input and the values a plan accepts from it.

use std::collections::HashMap;
use std::net::IpAddr;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// A binary uploaded alongside a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Client-supplied file name. Only its extension is ever reused.
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The lowercased extension of the client file name, if it is a short
    /// alphanumeric token.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.file_name.rsplit_once('.')?;
        let valid = !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then(|| ext.to_ascii_lowercase())
    }
}

/// Everything a public submitter sent for one form.
///
/// Keys that match no field are ignored by validation.
///
/// # Example
///
/// ```rust
/// use formkit::{SubmissionInput, UploadedFile};
/// use serde_json::json;
///
/// let input = SubmissionInput::new("203.0.113.9".parse().unwrap())
///     .with_value("name", json!("Ada"))
///     .with_file("cv", UploadedFile::new("cv.pdf", b"%PDF-1.7".to_vec()));
/// assert!(input.values.contains_key("name"));
/// ```
#[derive(Debug, Clone)]
pub struct SubmissionInput {
    pub values: Map<String, Value>,
    pub files: HashMap<String, UploadedFile>,
    /// Origin address of the request.
    pub submitter_ip: IpAddr,
}

impl SubmissionInput {
    pub fn new(submitter_ip: IpAddr) -> Self {
        Self {
            values: Map::new(),
            files: HashMap::new(),
            submitter_ip,
        }
    }

    /// Builds an input from a decoded JSON body.
    pub fn from_values(submitter_ip: IpAddr, values: Map<String, Value>) -> Self {
        Self {
            values,
            files: HashMap::new(),
            submitter_ip,
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn with_file(mut self, name: impl Into<String>, file: UploadedFile) -> Self {
        self.files.insert(name.into(), file);
        self
    }
}

/// One decoded signature capture, not yet written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSignature {
    pub image: Vec<u8>,
    pub printed_name: Option<String>,
    pub date: Option<String>,
}

/// A value that passed its field's rule.
#[derive(Debug, Clone, PartialEq)]
pub enum AcceptedValue {
    Text(String),
    Number(serde_json::Number),
    Date(NaiveDate),
    Choice(String),
    Choices(Vec<String>),
    File(UploadedFile),
    Signatures(Vec<DecodedSignature>),
}

/// The accepted values of a submission that passed every rule, keyed by
/// field name in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub values: IndexMap<String, AcceptedValue>,
    /// Value of the form's email field, when it had one and it was filled.
    pub submitter_email: Option<String>,
}
