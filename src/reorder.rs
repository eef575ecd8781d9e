//! Batch reordering of a form's fields.
//!
//! A batch is checked in full before anything is written: one bad entry
//! rejects the whole batch and leaves every field where it was. Orders in an
//! accepted batch are written as given; the reorderer does not check that
//! they form a permutation.

use serde::{Deserialize, Serialize};

use crate::error::FormsError;
use crate::id::{FieldId, FormId};
use crate::schema::FormSchema;

/// One `{field_id, order}` pair of a reorder request.
///
/// `order` is signed so that negative values from a client surface as a
/// rejected batch rather than a decoding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderEntry {
    pub field_id: FieldId,
    pub order: i64,
}

impl ReorderEntry {
    pub fn new(field_id: FieldId, order: i64) -> Self {
        Self { field_id, order }
    }
}

/// Applies reorder batches to one schema.
///
/// `owner_of` resolves the form a field id belongs to, across all forms,
/// so that a foreign field is reported as an ownership mismatch rather than
/// as unknown.
///
/// # Example
///
/// ```rust
/// use formkit::reorder::{FieldReorderer, ReorderEntry};
/// use formkit::{FieldDefinition, FormId, FormSchema, FormsConfig};
///
/// let config = FormsConfig::default();
/// let form = FormId::new();
/// let mut schema = FormSchema::new(form);
/// let a = schema.add_field(&FieldDefinition::new("A", "text"), &config).unwrap().id;
/// let b = schema.add_field(&FieldDefinition::new("B", "text"), &config).unwrap().id;
///
/// FieldReorderer::new(|_| Some(form))
///     .apply(&mut schema, &[ReorderEntry::new(a, 1), ReorderEntry::new(b, 0)])
///     .unwrap();
///
/// let names: Vec<_> = schema.fields_ordered().iter().map(|f| f.name.as_str()).collect();
/// assert_eq!(names, ["b", "a"]);
/// ```
pub struct FieldReorderer<F> {
    owner_of: F,
}

impl<F> FieldReorderer<F>
where
    F: Fn(FieldId) -> Option<FormId>,
{
    pub fn new(owner_of: F) -> Self {
        Self { owner_of }
    }

    /// Checks every entry of `batch` against `schema` without mutating it.
    ///
    /// # Errors
    ///
    /// - [`FormsError::InvalidBatch`] for an empty batch, an unknown field
    ///   id or an order outside `0..=u32::MAX`
    /// - [`FormsError::FieldOwnershipMismatch`] for a field of another form
    pub fn check(&self, schema: &FormSchema, batch: &[ReorderEntry]) -> Result<Vec<(FieldId, u32)>, FormsError> {
        if batch.is_empty() {
            return Err(FormsError::InvalidBatch("batch is empty".to_string()));
        }

        let form = schema.form_id();
        batch
            .iter()
            .map(|entry| {
                if !schema.contains(entry.field_id) {
                    return Err(match (self.owner_of)(entry.field_id) {
                        Some(owner) if owner != form => FormsError::FieldOwnershipMismatch {
                            form,
                            field: entry.field_id,
                            owner,
                        },
                        _ => FormsError::InvalidBatch(format!(
                            "field {} does not exist",
                            entry.field_id
                        )),
                    });
                }
                let order = u32::try_from(entry.order).map_err(|_| {
                    FormsError::InvalidBatch(format!(
                        "order {} for field {} is not a non-negative integer",
                        entry.order, entry.field_id
                    ))
                })?;
                Ok((entry.field_id, order))
            })
            .collect()
    }

    /// Checks the batch, then overwrites every referenced field's order.
    pub fn apply(&self, schema: &mut FormSchema, batch: &[ReorderEntry]) -> Result<(), FormsError> {
        let checked = self.check(schema, batch)?;
        for (field_id, order) in checked {
            schema.set_order(field_id, order);
        }
        tracing::debug!(form_id = %schema.form_id(), entries = batch.len(), "applied reorder batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormsConfig;
    use crate::schema::FieldDefinition;

    fn schema_with(labels: &[&str]) -> (FormSchema, Vec<FieldId>) {
        let config = FormsConfig::default();
        let mut schema = FormSchema::new(FormId::new());
        let ids = labels
            .iter()
            .map(|label| schema.add_field(&FieldDefinition::new(*label, "text"), &config).unwrap().id)
            .collect();
        (schema, ids)
    }

    fn orders(schema: &FormSchema, ids: &[FieldId]) -> Vec<u32> {
        ids.iter().map(|id| schema.field(*id).unwrap().order).collect()
    }

    #[test]
    fn test_apply_overwrites_orders() {
        let (mut schema, ids) = schema_with(&["A", "B", "C"]);
        let form = schema.form_id();
        FieldReorderer::new(|_| Some(form))
            .apply(
                &mut schema,
                &[
                    ReorderEntry::new(ids[0], 2),
                    ReorderEntry::new(ids[1], 0),
                    ReorderEntry::new(ids[2], 1),
                ],
            )
            .unwrap();
        assert_eq!(orders(&schema, &ids), [2, 0, 1]);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let (mut schema, _) = schema_with(&["A"]);
        let result = FieldReorderer::new(|_| None).apply(&mut schema, &[]);
        assert!(matches!(result, Err(FormsError::InvalidBatch(_))));
    }

    #[test]
    fn test_negative_order_rejects_whole_batch() {
        let (mut schema, ids) = schema_with(&["A", "B"]);
        let result = FieldReorderer::new(|_| None).apply(
            &mut schema,
            &[ReorderEntry::new(ids[0], 1), ReorderEntry::new(ids[1], -1)],
        );
        assert!(matches!(result, Err(FormsError::InvalidBatch(_))));
        assert_eq!(orders(&schema, &ids), [0, 1]);
    }

    #[test]
    fn test_order_beyond_u32_rejected() {
        let (mut schema, ids) = schema_with(&["A"]);
        let result = FieldReorderer::new(|_| None)
            .apply(&mut schema, &[ReorderEntry::new(ids[0], i64::from(u32::MAX) + 1)]);
        assert!(matches!(result, Err(FormsError::InvalidBatch(_))));
    }

    #[test]
    fn test_foreign_field_is_ownership_mismatch() {
        let (mut schema, ids) = schema_with(&["A", "B"]);
        let other_form = FormId::new();
        let foreign = FieldId::new();
        let result = FieldReorderer::new(|id| (id == foreign).then_some(other_form)).apply(
            &mut schema,
            &[ReorderEntry::new(ids[0], 1), ReorderEntry::new(foreign, 0)],
        );
        match result {
            Err(FormsError::FieldOwnershipMismatch { field, owner, .. }) => {
                assert_eq!(field, foreign);
                assert_eq!(owner, other_form);
            }
            other => panic!("expected ownership mismatch, got {:?}", other),
        }
        assert_eq!(orders(&schema, &ids), [0, 1]);
    }

    #[test]
    fn test_unknown_field_is_invalid_batch() {
        let (mut schema, ids) = schema_with(&["A"]);
        let result = FieldReorderer::new(|_| None).apply(
            &mut schema,
            &[ReorderEntry::new(ids[0], 0), ReorderEntry::new(FieldId::new(), 1)],
        );
        assert!(matches!(result, Err(FormsError::InvalidBatch(_))));
    }

    #[test]
    fn test_duplicate_orders_are_not_rejected() {
        let (mut schema, ids) = schema_with(&["A", "B"]);
        let form = schema.form_id();
        FieldReorderer::new(|_| Some(form))
            .apply(
                &mut schema,
                &[ReorderEntry::new(ids[0], 0), ReorderEntry::new(ids[1], 0)],
            )
            .unwrap();
        assert_eq!(orders(&schema, &ids), [0, 0]);
    }

    #[test]
    fn test_entry_deserializes_from_json() {
        let id = FieldId::new();
        let entry: ReorderEntry =
            serde_json::from_value(serde_json::json!({ "field_id": id.to_string(), "order": 3 })).unwrap();
        assert_eq!(entry, ReorderEntry::new(id, 3));
    }
}
