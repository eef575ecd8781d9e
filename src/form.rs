//! Forms and their public availability window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FormsConfig;
use crate::error::FormsError;
use crate::id::{FormId, OperatorId};
use crate::schema::{random_suffix, slugify, FormField};

/// An operator-defined form.
///
/// The slug is assigned at creation and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    pub id: FormId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: OperatorId,
    pub created_at: DateTime<Utc>,
}

impl Form {
    /// A form accepts public traffic while it is active and not past its
    /// expiry.
    pub fn is_submittable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.map_or(true, |expires| expires > now)
    }

    pub fn is_submittable(&self) -> bool {
        self.is_submittable_at(Utc::now())
    }
}

/// Attributes of a form to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewForm {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl NewForm {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            is_active: true,
            expires_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }
}

/// Replacement attributes of an existing form. The slug is not among them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormUpdate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Form> for FormUpdate {
    fn from(form: &Form) -> Self {
        Self {
            title: form.title.clone(),
            description: form.description.clone(),
            is_active: form.is_active,
            expires_at: form.expires_at,
        }
    }
}

/// Trims and bounds a form title.
pub(crate) fn checked_title(title: &str, config: &FormsConfig) -> Result<String, FormsError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(FormsError::InvalidFormDefinition("title is required".to_string()));
    }
    if title.chars().count() > config.max_title_len {
        return Err(FormsError::InvalidFormDefinition(format!(
            "title exceeds {} characters",
            config.max_title_len
        )));
    }
    Ok(title.to_string())
}

/// A fresh slug candidate: the slugged title plus a random suffix.
///
/// Titles that slug to nothing (`"!!!"`) fall back to `"form"`.
pub(crate) fn generate_slug(title: &str, config: &FormsConfig) -> String {
    let base = slugify(title);
    let base = if base.is_empty() { "form".to_string() } else { base };
    format!("{}-{}", base, random_suffix(config.slug_suffix_len))
}

/// What a public requester is shown: the form header and its fields in
/// display order, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicForm {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub fields: Vec<FormField>,
}
