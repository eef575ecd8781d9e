//! The ordered field list of one form.
//!
//! [`FormSchema`] owns a form's fields and keeps their `order` values a
//! contiguous permutation of `0..len` across add and remove. Field names are
//! slugs of their labels, suffixed (`name-2`, `name-3`) when two labels
//! would otherwise share a storage key.
//!
//! # Example
//!
//! ```rust
//! use formkit::{FieldDefinition, FormId, FormSchema, FormsConfig};
//!
//! let config = FormsConfig::default();
//! let mut schema = FormSchema::new(FormId::new());
//! schema.add_field(&FieldDefinition::new("Name", "text").required(), &config).unwrap();
//! schema.add_field(&FieldDefinition::new("Email", "email"), &config).unwrap();
//!
//! let names: Vec<_> = schema.fields_ordered().iter().map(|f| f.name.as_str()).collect();
//! assert_eq!(names, ["name", "email"]);
//! ```

mod field;
mod slug;

pub use field::{FieldConfig, FieldDefinition, FieldOption, FormField, SignatureConfig};
pub use slug::{disambiguate, random_suffix, slugify};

use serde::{Deserialize, Serialize};

use crate::config::FormsConfig;
use crate::error::FormsError;
use crate::id::{FieldId, FormId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSchema {
    form_id: FormId,
    fields: Vec<FormField>,
}

impl FormSchema {
    pub fn new(form_id: FormId) -> Self {
        Self {
            form_id,
            fields: Vec::new(),
        }
    }

    pub fn form_id(&self) -> FormId {
        self.form_id
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, id: FieldId) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.field(id).is_some()
    }

    /// Field ids in storage order (not display order).
    pub fn field_ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.fields.iter().map(|f| f.id)
    }

    /// Appends a field at `order = len`.
    ///
    /// # Errors
    ///
    /// Returns [`FormsError::InvalidFieldDefinition`] for an empty or
    /// unsluggable label or an unsupported type.
    pub fn add_field(
        &mut self,
        definition: &FieldDefinition,
        config: &FormsConfig,
    ) -> Result<&FormField, FormsError> {
        let resolved = definition.resolve(config)?;
        let name = self.free_name(&resolved.base_name, None);
        let order = u32::try_from(self.fields.len()).map_err(|_| {
            FormsError::InvalidFieldDefinition("form has too many fields".to_string())
        })?;

        let index = self.fields.len();
        self.fields.push(FormField {
            id: FieldId::new(),
            form_id: self.form_id,
            label: resolved.label,
            name,
            field_type: resolved.field_type,
            is_required: resolved.is_required,
            config: resolved.config,
            order,
            placeholder: resolved.placeholder,
            help_text: resolved.help_text,
        });
        Ok(&self.fields[index])
    }

    /// Replaces a field's definition, keeping its id and order.
    ///
    /// The name is re-derived from the new label, so renaming a field
    /// changes the key its future values are stored under.
    ///
    /// # Errors
    ///
    /// [`FormsError::FieldNotFound`] if the field is not on this schema,
    /// [`FormsError::InvalidFieldDefinition`] for a malformed definition.
    pub fn update_field(
        &mut self,
        id: FieldId,
        definition: &FieldDefinition,
        config: &FormsConfig,
    ) -> Result<&FormField, FormsError> {
        let index = self.index_of(id)?;
        let resolved = definition.resolve(config)?;
        let name = self.free_name(&resolved.base_name, Some(id));

        let field = &mut self.fields[index];
        field.label = resolved.label;
        field.name = name;
        field.field_type = resolved.field_type;
        field.is_required = resolved.is_required;
        field.config = resolved.config;
        field.placeholder = resolved.placeholder;
        field.help_text = resolved.help_text;
        Ok(&self.fields[index])
    }

    /// Deletes a field and closes the gap it leaves in the ordering.
    ///
    /// # Errors
    ///
    /// [`FormsError::FieldNotFound`] if the field is not on this schema.
    pub fn remove_field(&mut self, id: FieldId) -> Result<FormField, FormsError> {
        let index = self.index_of(id)?;
        let removed = self.fields.remove(index);
        for field in &mut self.fields {
            if field.order > removed.order {
                field.order -= 1;
            }
        }
        Ok(removed)
    }

    /// Fields sorted ascending by `order`. Equal orders (possible after a
    /// caller-supplied reorder) keep insertion order.
    pub fn fields_ordered(&self) -> Vec<&FormField> {
        let mut ordered: Vec<&FormField> = self.fields.iter().collect();
        ordered.sort_by_key(|f| f.order);
        ordered
    }

    /// Overwrites one field's order without any contiguity check.
    pub(crate) fn set_order(&mut self, id: FieldId, order: u32) -> bool {
        match self.fields.iter_mut().find(|f| f.id == id) {
            Some(field) => {
                field.order = order;
                true
            }
            None => false,
        }
    }

    fn index_of(&self, id: FieldId) -> Result<usize, FormsError> {
        self.fields
            .iter()
            .position(|f| f.id == id)
            .ok_or(FormsError::FieldNotFound {
                form: self.form_id,
                field: id,
            })
    }

    fn free_name(&self, base: &str, exclude: Option<FieldId>) -> String {
        disambiguate(base, |candidate| {
            self.fields
                .iter()
                .any(|f| Some(f.id) != exclude && f.name == candidate)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FieldType;

    fn schema_with(labels: &[&str]) -> FormSchema {
        let config = FormsConfig::default();
        let mut schema = FormSchema::new(FormId::new());
        for label in labels {
            schema
                .add_field(&FieldDefinition::new(*label, "text"), &config)
                .unwrap();
        }
        schema
    }

    fn orders(schema: &FormSchema) -> Vec<(String, u32)> {
        schema
            .fields_ordered()
            .iter()
            .map(|f| (f.label.clone(), f.order))
            .collect()
    }

    #[test]
    fn test_add_assigns_sequential_order() {
        let schema = schema_with(&["A", "B", "C"]);
        assert_eq!(
            orders(&schema),
            vec![("A".into(), 0), ("B".into(), 1), ("C".into(), 2)]
        );
    }

    #[test]
    fn test_add_sets_owner() {
        let schema = schema_with(&["A"]);
        assert_eq!(schema.fields_ordered()[0].form_id, schema.form_id());
    }

    #[test]
    fn test_duplicate_labels_get_suffixed_names() {
        let schema = schema_with(&["Name", "Name", "name"]);
        let names: Vec<_> = schema
            .fields_ordered()
            .iter()
            .map(|f| f.name.clone())
            .collect();
        assert_eq!(names, vec!["name", "name-2", "name-3"]);
    }

    #[test]
    fn test_remove_compacts_order() {
        let mut schema = schema_with(&["A", "B", "C", "D"]);
        let b = schema.fields_ordered()[1].id;
        let removed = schema.remove_field(b).unwrap();
        assert_eq!(removed.label, "B");
        assert_eq!(
            orders(&schema),
            vec![("A".into(), 0), ("C".into(), 1), ("D".into(), 2)]
        );
    }

    #[test]
    fn test_remove_unknown_field() {
        let mut schema = schema_with(&["A"]);
        let err = schema.remove_field(FieldId::new()).unwrap_err();
        assert!(matches!(err, FormsError::FieldNotFound { .. }));
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_update_rederives_name_and_keeps_order() {
        let config = FormsConfig::default();
        let mut schema = schema_with(&["A", "B"]);
        let b = schema.fields_ordered()[1].id;

        let updated = schema
            .update_field(b, &FieldDefinition::new("Work Email", "email"), &config)
            .unwrap();
        assert_eq!(updated.name, "work-email");
        assert_eq!(updated.field_type, FieldType::Email);
        assert_eq!(updated.order, 1);
        assert_eq!(updated.id, b);
    }

    #[test]
    fn test_update_to_own_name_is_not_a_collision() {
        let config = FormsConfig::default();
        let mut schema = schema_with(&["Name"]);
        let id = schema.fields_ordered()[0].id;

        let updated = schema
            .update_field(id, &FieldDefinition::new("Name", "textarea"), &config)
            .unwrap();
        assert_eq!(updated.name, "name");
    }

    #[test]
    fn test_update_invalid_definition_leaves_field_untouched() {
        let config = FormsConfig::default();
        let mut schema = schema_with(&["Name"]);
        let id = schema.fields_ordered()[0].id;

        let err = schema
            .update_field(id, &FieldDefinition::new("Name", "slider"), &config)
            .unwrap_err();
        assert!(matches!(err, FormsError::InvalidFieldDefinition(_)));
        assert_eq!(schema.field(id).unwrap().field_type, FieldType::Text);
    }

    #[test]
    fn test_update_unknown_field() {
        let config = FormsConfig::default();
        let mut schema = schema_with(&["Name"]);
        let err = schema
            .update_field(FieldId::new(), &FieldDefinition::new("X", "text"), &config)
            .unwrap_err();
        assert!(matches!(err, FormsError::FieldNotFound { .. }));
    }

    #[test]
    fn test_fields_ordered_follows_order_not_storage() {
        let mut schema = schema_with(&["A", "B", "C"]);
        let ids: Vec<_> = schema.field_ids().collect();
        schema.set_order(ids[0], 2);
        schema.set_order(ids[2], 0);
        let labels: Vec<_> = schema
            .fields_ordered()
            .iter()
            .map(|f| f.label.clone())
            .collect();
        assert_eq!(labels, vec!["C", "B", "A"]);
    }
}
