//! The catalog of supported field types.
//!
//! Every field type maps to exactly one [`Capabilities`] entry. The plan
//! compiler and the normalizer dispatch on those capabilities rather than on
//! the type itself, so a new field type is one row in [`CATALOG`].

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormsError;

/// The closed set of field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Number,
    Date,
    Select,
    Radio,
    Checkbox,
    File,
    Signature,
}

/// The shape a submitted value takes once accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    /// Free text.
    Text,
    /// Text that must parse as an email address.
    Email,
    /// A numeric value.
    Number,
    /// A calendar date.
    Date,
    /// Exactly one configured option value.
    SingleOption,
    /// A list of configured option values.
    OptionList,
    /// One uploaded binary, stored by reference.
    StoredFile,
    /// A list of signature captures, stored by reference.
    SignatureList,
}

/// Behavioral flags implied by a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capabilities {
    pub shape: ValueShape,
    pub needs_options: bool,
    pub is_multi_value: bool,
    pub needs_file_storage: bool,
    pub needs_signature_normalization: bool,
}

impl Capabilities {
    const fn scalar(shape: ValueShape) -> Self {
        Self {
            shape,
            needs_options: false,
            is_multi_value: false,
            needs_file_storage: false,
            needs_signature_normalization: false,
        }
    }

    const fn choice(multi: bool) -> Self {
        Self {
            shape: if multi {
                ValueShape::OptionList
            } else {
                ValueShape::SingleOption
            },
            needs_options: true,
            is_multi_value: multi,
            needs_file_storage: false,
            needs_signature_normalization: false,
        }
    }
}

/// One row per field type: wire tag, variant, capabilities.
const CATALOG: [(&str, FieldType, Capabilities); 10] = [
    ("text", FieldType::Text, Capabilities::scalar(ValueShape::Text)),
    ("textarea", FieldType::Textarea, Capabilities::scalar(ValueShape::Text)),
    ("email", FieldType::Email, Capabilities::scalar(ValueShape::Email)),
    ("number", FieldType::Number, Capabilities::scalar(ValueShape::Number)),
    ("date", FieldType::Date, Capabilities::scalar(ValueShape::Date)),
    ("select", FieldType::Select, Capabilities::choice(false)),
    ("radio", FieldType::Radio, Capabilities::choice(false)),
    ("checkbox", FieldType::Checkbox, Capabilities::choice(true)),
    (
        "file",
        FieldType::File,
        Capabilities {
            shape: ValueShape::StoredFile,
            needs_options: false,
            is_multi_value: false,
            needs_file_storage: true,
            needs_signature_normalization: false,
        },
    ),
    (
        "signature",
        FieldType::Signature,
        Capabilities {
            shape: ValueShape::SignatureList,
            needs_options: false,
            is_multi_value: true,
            needs_file_storage: true,
            needs_signature_normalization: true,
        },
    ),
];

/// Pure lookups over the field type catalog.
///
/// # Example
///
/// ```rust
/// use formkit::{FieldType, FieldTypeRegistry};
///
/// let caps = FieldTypeRegistry::capabilities_of("checkbox").unwrap();
/// assert!(caps.needs_options && caps.is_multi_value);
///
/// assert!(FieldTypeRegistry::capabilities_of("slider").is_err());
/// assert_eq!(FieldTypeRegistry::resolve("file").unwrap(), FieldType::File);
/// ```
pub struct FieldTypeRegistry;

impl FieldTypeRegistry {
    /// Resolves a wire tag to its field type.
    ///
    /// # Errors
    ///
    /// Returns [`FormsError::UnknownFieldType`] for tags outside the catalog.
    pub fn resolve(tag: &str) -> Result<FieldType, FormsError> {
        CATALOG
            .iter()
            .find(|(t, _, _)| *t == tag)
            .map(|(_, field_type, _)| *field_type)
            .ok_or_else(|| FormsError::UnknownFieldType(tag.to_string()))
    }

    /// Returns the capability set for a wire tag.
    ///
    /// # Errors
    ///
    /// Returns [`FormsError::UnknownFieldType`] for tags outside the catalog.
    pub fn capabilities_of(tag: &str) -> Result<Capabilities, FormsError> {
        CATALOG
            .iter()
            .find(|(t, _, _)| *t == tag)
            .map(|(_, _, caps)| *caps)
            .ok_or_else(|| FormsError::UnknownFieldType(tag.to_string()))
    }

    /// Returns the capability set for an already-resolved type.
    pub fn capabilities(field_type: FieldType) -> Capabilities {
        Self::entry(field_type).2
    }

    /// The wire tag of a field type.
    pub fn tag(field_type: FieldType) -> &'static str {
        Self::entry(field_type).0
    }

    /// Every registered type, in catalog order.
    pub fn types() -> impl Iterator<Item = FieldType> {
        CATALOG.iter().map(|(_, field_type, _)| *field_type)
    }

    fn entry(field_type: FieldType) -> &'static (&'static str, FieldType, Capabilities) {
        let row = match field_type {
            FieldType::Text => 0,
            FieldType::Textarea => 1,
            FieldType::Email => 2,
            FieldType::Number => 3,
            FieldType::Date => 4,
            FieldType::Select => 5,
            FieldType::Radio => 6,
            FieldType::Checkbox => 7,
            FieldType::File => 8,
            FieldType::Signature => 9,
        };
        &CATALOG[row]
    }
}

impl FieldType {
    pub fn capabilities(self) -> Capabilities {
        FieldTypeRegistry::capabilities(self)
    }

    pub fn as_str(self) -> &'static str {
        FieldTypeRegistry::tag(self)
    }
}

impl FromStr for FieldType {
    type Err = FormsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldTypeRegistry::resolve(s)
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
