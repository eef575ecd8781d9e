//! Field definitions and stored fields.

use serde::{Deserialize, Serialize};

use crate::config::FormsConfig;
use crate::error::FormsError;
use crate::id::{FieldId, FormId};
use crate::registry::{FieldType, FieldTypeRegistry};

use super::slug::slugify;

/// One selectable choice of a select, radio or checkbox field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Display flags of a signature field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignatureConfig {
    #[serde(default)]
    pub show_date: bool,
    #[serde(default)]
    pub show_print_name: bool,
}

/// Type-specific configuration stored with a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldConfig {
    /// No extra configuration.
    Plain,
    /// The ordered option list of a choice field.
    Choices { options: Vec<FieldOption> },
    /// Signature display flags.
    Signature(SignatureConfig),
}

impl FieldConfig {
    /// Option list, empty for non-choice fields.
    pub fn options(&self) -> &[FieldOption] {
        match self {
            FieldConfig::Choices { options } => options,
            _ => &[],
        }
    }

    pub fn signature(&self) -> Option<&SignatureConfig> {
        match self {
            FieldConfig::Signature(config) => Some(config),
            _ => None,
        }
    }
}

/// A field as stored on a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub id: FieldId,
    pub form_id: FormId,
    pub label: String,
    /// Storage key of submitted values, derived from the label.
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub is_required: bool,
    pub config: FieldConfig,
    /// Zero-based position within the form.
    pub order: u32,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
}

impl FormField {
    pub fn options(&self) -> &[FieldOption] {
        self.config.options()
    }
}

/// Operator-supplied description of a field to create or update.
///
/// The type is carried as its wire tag so an unsupported type is reported
/// as a definition error rather than a decoding error.
///
/// # Example
///
/// ```rust
/// use formkit::FieldDefinition;
///
/// let definition = FieldDefinition::new("Favourite colour", "radio")
///     .required()
///     .with_option("Red", "red")
///     .with_option("Blue", "blue");
/// assert_eq!(definition.options.as_ref().map(Vec::len), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default)]
    pub signature_config: Option<SignatureConfig>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
}

impl FieldDefinition {
    pub fn new(label: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            field_type: field_type.into(),
            ..Self::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn with_option(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.options
            .get_or_insert_with(Vec::new)
            .push(FieldOption::new(label, value));
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_signature_config(mut self, config: SignatureConfig) -> Self {
        self.signature_config = Some(config);
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    /// Checks the definition and derives everything a stored field needs
    /// except its id, order and final (collision-free) name.
    pub(crate) fn resolve(&self, config: &FormsConfig) -> Result<ResolvedDefinition, FormsError> {
        let label = self.label.trim();
        if label.is_empty() {
            return Err(FormsError::InvalidFieldDefinition(
                "label is required".to_string(),
            ));
        }
        if label.chars().count() > config.max_label_len {
            return Err(FormsError::InvalidFieldDefinition(format!(
                "label must be at most {} characters",
                config.max_label_len
            )));
        }

        let field_type = FieldTypeRegistry::resolve(&self.field_type)
            .map_err(|e| FormsError::InvalidFieldDefinition(e.to_string()))?;

        let base_name = slugify(label);
        if base_name.is_empty() {
            return Err(FormsError::InvalidFieldDefinition(
                "label must contain at least one letter or digit".to_string(),
            ));
        }

        let caps = field_type.capabilities();
        let field_config = if caps.needs_signature_normalization {
            FieldConfig::Signature(self.signature_config.unwrap_or_default())
        } else if caps.needs_options {
            FieldConfig::Choices {
                options: self.options.clone().unwrap_or_default(),
            }
        } else {
            FieldConfig::Plain
        };

        Ok(ResolvedDefinition {
            label: label.to_string(),
            base_name,
            field_type,
            is_required: self.is_required,
            config: field_config,
            placeholder: self.placeholder.clone(),
            help_text: self.help_text.clone(),
        })
    }
}

/// A checked definition, ready to be placed on a schema.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedDefinition {
    pub label: String,
    pub base_name: String,
    pub field_type: FieldType,
    pub is_required: bool,
    pub config: FieldConfig,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
}
