//! Tests for concurrent access to the form service.

use formkit::{
    FieldDefinition, FormService, FormsConfig, MemoryStorage, NewForm, OperatorId, ReorderEntry,
    SubmissionInput,
};
use serde_json::json;
use std::sync::Arc;
use std::thread;

fn service() -> Arc<FormService<MemoryStorage>> {
    Arc::new(FormService::new(MemoryStorage::default(), FormsConfig::default()))
}

#[test]
fn test_concurrent_submissions() {
    let service = service();
    let form = service
        .create_form(&OperatorId::new("op"), NewForm::new("Busy"))
        .unwrap();
    service
        .create_field(form.id, &FieldDefinition::new("Name", "text").required())
        .unwrap();
    service
        .create_field(form.id, &FieldDefinition::new("Signature", "signature"))
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = Arc::clone(&service);
            let slug = form.slug.clone();
            thread::spawn(move || {
                let input = SubmissionInput::new("192.0.2.1".parse().unwrap())
                    .with_value("name", json!(format!("User{}", i)))
                    .with_value("signature", json!([{ "signature": "aGVsbG8=" }]));
                service.submit(&slug, input).unwrap()
            })
        })
        .collect();

    let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(ids.len(), 16);
    assert_eq!(service.submissions(form.id).unwrap().len(), 16);
    assert_eq!(service.storage().len(), 16);
}

#[test]
fn test_concurrent_deletes_keep_order_contiguous() {
    let service = service();
    let form = service
        .create_form(&OperatorId::new("op"), NewForm::new("Shrinking"))
        .unwrap();
    let ids: Vec<_> = (0..20)
        .map(|i| {
            service
                .create_field(form.id, &FieldDefinition::new(format!("Field {}", i), "text"))
                .unwrap()
                .id
        })
        .collect();

    let handles: Vec<_> = ids
        .iter()
        .step_by(2)
        .copied()
        .map(|id| {
            let service = Arc::clone(&service);
            let form_id = form.id;
            thread::spawn(move || service.delete_field(form_id, id).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let orders: Vec<_> = service
        .fields(form.id)
        .unwrap()
        .iter()
        .map(|f| f.order)
        .collect();
    assert_eq!(orders, (0..10).collect::<Vec<u32>>());
}

#[test]
fn test_concurrent_reorders_never_interleave() {
    let service = service();
    let form = service
        .create_form(&OperatorId::new("op"), NewForm::new("Shuffled"))
        .unwrap();
    let ids: Vec<_> = (0..5)
        .map(|i| {
            service
                .create_field(form.id, &FieldDefinition::new(format!("F{}", i), "text"))
                .unwrap()
                .id
        })
        .collect();

    let forward: Vec<_> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| ReorderEntry::new(*id, i as i64))
        .collect();
    let backward: Vec<_> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| ReorderEntry::new(*id, (ids.len() - 1 - i) as i64))
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = Arc::clone(&service);
            let batch = if i % 2 == 0 { forward.clone() } else { backward.clone() };
            let form_id = form.id;
            thread::spawn(move || {
                service.reorder_fields(form_id, &batch).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let order: Vec<_> = service.fields(form.id).unwrap().iter().map(|f| f.id).collect();
    let reversed: Vec<_> = ids.iter().rev().copied().collect();
    assert!(order == ids || order == reversed);
}
