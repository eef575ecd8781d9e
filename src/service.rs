//! The operations exposed to admin and public callers.
//!
//! [`FormService`] holds forms, their schemas and their submissions in
//! process, behind a single [`RwLock`]. Every operation that touches several
//! rows (field delete compaction, a reorder batch, a form's cascade delete)
//! runs under one write guard, so concurrent callers never observe a
//! half-applied change.
//!
//! Submissions take the lock only to look up the form and, at the end, to
//! insert the record. Validation and storage writes run unlocked, so
//! submissions to the same form proceed in parallel.
//!
//! # Example
//!
//! ```rust
//! use formkit::{FieldDefinition, FormService, FormsConfig, MemoryStorage, NewForm, OperatorId};
//! use formkit::SubmissionInput;
//! use serde_json::json;
//!
//! let service = FormService::new(MemoryStorage::default(), FormsConfig::default());
//! let operator = OperatorId::new("admin-1");
//!
//! let form = service.create_form(&operator, NewForm::new("Contact us")).unwrap();
//! service
//!     .create_field(form.id, &FieldDefinition::new("Email", "email").required())
//!     .unwrap();
//!
//! let input = SubmissionInput::new("203.0.113.5".parse().unwrap())
//!     .with_value("email", json!("ada@example.org"));
//! let id = service.submit(&form.slug, input).unwrap();
//!
//! let stored = service.submission(form.id, id).unwrap();
//! assert_eq!(stored.submitter_email.as_deref(), Some("ada@example.org"));
//! ```

use std::collections::HashMap;

use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::config::FormsConfig;
use crate::error::{FormsError, Result};
use crate::form::{checked_title, generate_slug, Form, FormUpdate, NewForm, PublicForm};
use crate::id::{FieldId, FormId, OperatorId, SubmissionId};
use crate::normalize::SubmissionNormalizer;
use crate::plan::{SubmissionInput, ValidationPlan};
use crate::reorder::{FieldReorderer, ReorderEntry};
use crate::schema::{FieldDefinition, FormField, FormSchema};
use crate::storage::{Storage, StoredRef};
use crate::submission::{FormSubmission, SubmissionStatus};

/// Attempts at drawing an unused slug suffix before giving up.
const SLUG_ATTEMPTS: usize = 16;

#[derive(Debug, Clone)]
struct FormEntry {
    form: Form,
    schema: FormSchema,
}

#[derive(Debug, Default)]
struct Store {
    forms: IndexMap<FormId, FormEntry>,
    field_owners: HashMap<FieldId, FormId>,
    slugs: HashMap<String, FormId>,
    submissions: IndexMap<SubmissionId, FormSubmission>,
}

impl Store {
    fn entry(&self, form_id: FormId) -> Result<&FormEntry> {
        self.forms.get(&form_id).ok_or(FormsError::FormNotFound(form_id))
    }

    fn entry_mut(&mut self, form_id: FormId) -> Result<&mut FormEntry> {
        self.forms
            .get_mut(&form_id)
            .ok_or(FormsError::FormNotFound(form_id))
    }

    /// The form behind `slug`, if the public may currently see it.
    fn submittable(&self, slug: &str) -> Result<&FormEntry> {
        self.slugs
            .get(slug)
            .and_then(|id| self.forms.get(id))
            .filter(|entry| entry.form.is_submittable_at(Utc::now()))
            .ok_or(FormsError::FormNotSubmittable)
    }

    fn owned_submission(&self, form_id: FormId, id: SubmissionId) -> Result<&FormSubmission> {
        self.submissions
            .get(&id)
            .filter(|s| s.form_id == form_id)
            .ok_or(FormsError::SubmissionNotFound(id))
    }
}

/// In-process form builder and submission store.
pub struct FormService<S: Storage> {
    storage: S,
    config: FormsConfig,
    store: RwLock<Store>,
}

impl<S: Storage> FormService<S> {
    pub fn new(storage: S, config: FormsConfig) -> Self {
        Self {
            storage,
            config,
            store: RwLock::new(Store::default()),
        }
    }

    pub fn config(&self) -> &FormsConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Public URL of a stored file or signature image.
    pub fn public_url_for(&self, path: &StoredRef) -> String {
        self.storage.public_url_for(path)
    }

    // ---- forms -------------------------------------------------------

    /// Creates a form owned by `operator` with a fresh, unique slug.
    pub fn create_form(&self, operator: &OperatorId, new_form: NewForm) -> Result<Form> {
        let title = checked_title(&new_form.title, &self.config)?;
        let mut store = self.store.write();

        let slug = (0..SLUG_ATTEMPTS)
            .map(|_| generate_slug(&title, &self.config))
            .find(|candidate| !store.slugs.contains_key(candidate))
            .ok_or_else(|| {
                FormsError::InvalidFormDefinition("could not allocate a unique slug".to_string())
            })?;

        let form = Form {
            id: FormId::new(),
            title,
            slug: slug.clone(),
            description: new_form.description,
            is_active: new_form.is_active,
            expires_at: new_form.expires_at,
            created_by: operator.clone(),
            created_at: Utc::now(),
        };
        store.slugs.insert(slug, form.id);
        store.forms.insert(
            form.id,
            FormEntry {
                form: form.clone(),
                schema: FormSchema::new(form.id),
            },
        );

        tracing::info!(form_id = %form.id, slug = %form.slug, operator = %operator, "created form");
        Ok(form)
    }

    /// Replaces a form's attributes. The slug is kept.
    pub fn update_form(&self, form_id: FormId, update: FormUpdate) -> Result<Form> {
        let title = checked_title(&update.title, &self.config)?;
        let mut store = self.store.write();
        let entry = store.entry_mut(form_id)?;

        entry.form.title = title;
        entry.form.description = update.description;
        entry.form.is_active = update.is_active;
        entry.form.expires_at = update.expires_at;

        tracing::info!(form_id = %form_id, is_active = update.is_active, "updated form");
        Ok(entry.form.clone())
    }

    /// Deletes a form together with its fields and submissions.
    ///
    /// Stored files of the deleted submissions are not removed.
    pub fn delete_form(&self, form_id: FormId) -> Result<()> {
        let mut store = self.store.write();
        let entry = store
            .forms
            .shift_remove(&form_id)
            .ok_or(FormsError::FormNotFound(form_id))?;

        store.slugs.remove(&entry.form.slug);
        for field_id in entry.schema.field_ids() {
            store.field_owners.remove(&field_id);
        }
        let before = store.submissions.len();
        store.submissions.retain(|_, s| s.form_id != form_id);

        tracing::info!(
            form_id = %form_id,
            fields = entry.schema.len(),
            submissions = before - store.submissions.len(),
            "deleted form"
        );
        Ok(())
    }

    pub fn form(&self, form_id: FormId) -> Result<Form> {
        Ok(self.store.read().entry(form_id)?.form.clone())
    }

    /// All forms, oldest first.
    pub fn forms(&self) -> Vec<Form> {
        self.store
            .read()
            .forms
            .values()
            .map(|entry| entry.form.clone())
            .collect()
    }

    /// A snapshot of a form's schema.
    pub fn schema(&self, form_id: FormId) -> Result<FormSchema> {
        Ok(self.store.read().entry(form_id)?.schema.clone())
    }

    /// A form's fields in display order.
    pub fn fields(&self, form_id: FormId) -> Result<Vec<FormField>> {
        let store = self.store.read();
        let entry = store.entry(form_id)?;
        Ok(entry.schema.fields_ordered().into_iter().cloned().collect())
    }

    // ---- fields ------------------------------------------------------

    /// Appends a field to the end of a form.
    pub fn create_field(&self, form_id: FormId, definition: &FieldDefinition) -> Result<FormField> {
        let mut store = self.store.write();
        let field = store
            .entry_mut(form_id)?
            .schema
            .add_field(definition, &self.config)?
            .clone();
        store.field_owners.insert(field.id, form_id);

        tracing::info!(
            form_id = %form_id,
            field_id = %field.id,
            name = %field.name,
            field_type = %field.field_type,
            order = field.order,
            "created field"
        );
        Ok(field)
    }

    pub fn update_field(
        &self,
        form_id: FormId,
        field_id: FieldId,
        definition: &FieldDefinition,
    ) -> Result<FormField> {
        let mut store = self.store.write();
        let entry = store.entry_mut(form_id)?;
        let previous = entry
            .schema
            .field(field_id)
            .map(|f| f.name.clone())
            .ok_or(FormsError::FieldNotFound {
                form: form_id,
                field: field_id,
            })?;
        let field = entry
            .schema
            .update_field(field_id, definition, &self.config)?
            .clone();

        if previous != field.name {
            tracing::warn!(
                form_id = %form_id,
                field_id = %field_id,
                from = %previous,
                to = %field.name,
                "field renamed; earlier submissions keep the old key"
            );
        }
        tracing::info!(form_id = %form_id, field_id = %field_id, "updated field");
        Ok(field)
    }

    /// Deletes a field and compacts the order of the fields after it.
    pub fn delete_field(&self, form_id: FormId, field_id: FieldId) -> Result<()> {
        let mut store = self.store.write();
        let removed = store.entry_mut(form_id)?.schema.remove_field(field_id)?;
        store.field_owners.remove(&field_id);

        tracing::info!(form_id = %form_id, field_id = %field_id, order = removed.order, "deleted field");
        Ok(())
    }

    /// Applies a reorder batch as one unit and returns the fields in their
    /// new display order.
    pub fn reorder_fields(&self, form_id: FormId, batch: &[ReorderEntry]) -> Result<Vec<FormField>> {
        let mut guard = self.store.write();
        let Store {
            forms, field_owners, ..
        } = &mut *guard;
        let entry = forms
            .get_mut(&form_id)
            .ok_or(FormsError::FormNotFound(form_id))?;

        let reorderer = FieldReorderer::new(|id: FieldId| field_owners.get(&id).copied());
        if let Err(err) = reorderer.apply(&mut entry.schema, batch) {
            tracing::warn!(form_id = %form_id, error = %err, "rejected reorder batch");
            return Err(err);
        }
        Ok(entry.schema.fields_ordered().into_iter().cloned().collect())
    }

    // ---- public ------------------------------------------------------

    /// The form behind `slug`, for rendering to a public requester.
    ///
    /// Inactive, expired and unknown slugs all fail with
    /// [`FormsError::FormNotSubmittable`].
    pub fn public_form(&self, slug: &str) -> Result<PublicForm> {
        let store = self.store.read();
        let entry = store.submittable(slug)?;
        Ok(PublicForm {
            title: entry.form.title.clone(),
            slug: entry.form.slug.clone(),
            description: entry.form.description.clone(),
            fields: entry.schema.fields_ordered().into_iter().cloned().collect(),
        })
    }

    /// Validates, normalizes and records one public submission.
    ///
    /// Every field is validated before any storage write, so a rejected
    /// submission leaves no stored files and no record. Identical payloads
    /// submitted twice produce two submissions.
    ///
    /// # Errors
    ///
    /// - [`FormsError::FormNotSubmittable`] for unknown, inactive or expired
    ///   forms
    /// - [`FormsError::ValidationFailed`] with every field error
    /// - [`FormsError::Storage`] if a file or signature write fails
    pub fn submit(&self, slug: &str, input: SubmissionInput) -> Result<SubmissionId> {
        let (form_id, schema) = {
            let store = self.store.read();
            let entry = store.submittable(slug).map_err(|err| {
                tracing::warn!(slug = slug, "submission to unavailable form");
                err
            })?;
            (entry.form.id, entry.schema.clone())
        };

        let plan = ValidationPlan::compile(&schema, &self.config);
        let validated = plan.validate(&input).into_result().map_err(|errors| {
            tracing::warn!(form_id = %form_id, errors = errors.len(), "rejected submission");
            FormsError::ValidationFailed(errors)
        })?;

        let now = Utc::now();
        let normalized = SubmissionNormalizer::new(&self.storage, &self.config)
            .normalize(validated, now.date_naive())?;

        let submission = FormSubmission {
            id: SubmissionId::new(),
            form_id,
            data: normalized.data,
            submitter_ip: input.submitter_ip,
            submitter_email: normalized.submitter_email,
            status: SubmissionStatus::Pending,
            created_at: now,
        };
        let id = submission.id;

        let mut store = self.store.write();
        if !store.forms.contains_key(&form_id) {
            tracing::warn!(form_id = %form_id, "form deleted while submission was processed");
            return Err(FormsError::FormNotSubmittable);
        }
        store.submissions.insert(id, submission);

        tracing::info!(form_id = %form_id, submission_id = %id, "recorded submission");
        Ok(id)
    }

    // ---- submissions -------------------------------------------------

    /// A form's submissions, newest first.
    pub fn submissions(&self, form_id: FormId) -> Result<Vec<FormSubmission>> {
        let store = self.store.read();
        store.entry(form_id)?;
        Ok(store
            .submissions
            .values()
            .rev()
            .filter(|s| s.form_id == form_id)
            .cloned()
            .collect())
    }

    /// One submission of a form. A submission of another form is reported
    /// as not found.
    pub fn submission(&self, form_id: FormId, id: SubmissionId) -> Result<FormSubmission> {
        let store = self.store.read();
        store.entry(form_id)?;
        store.owned_submission(form_id, id).cloned()
    }

    pub fn update_submission_status(
        &self,
        form_id: FormId,
        id: SubmissionId,
        status: SubmissionStatus,
    ) -> Result<FormSubmission> {
        let mut store = self.store.write();
        store.entry(form_id)?;
        store.owned_submission(form_id, id)?;
        let submission = store
            .submissions
            .get_mut(&id)
            .ok_or(FormsError::SubmissionNotFound(id))?;
        submission.status = status;

        tracing::info!(form_id = %form_id, submission_id = %id, status = %status, "updated submission status");
        Ok(submission.clone())
    }

    pub fn delete_submission(&self, form_id: FormId, id: SubmissionId) -> Result<()> {
        let mut store = self.store.write();
        store.entry(form_id)?;
        store.owned_submission(form_id, id)?;
        store.submissions.shift_remove(&id);

        tracing::info!(form_id = %form_id, submission_id = %id, "deleted submission");
        Ok(())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<FormService<crate::storage::MemoryStorage>>();
    assert_sync::<FormService<crate::storage::MemoryStorage>>();
};
