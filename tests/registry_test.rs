//! Tests for the field type catalog.

use formkit::{FieldType, FieldTypeRegistry, FormsError, ValueShape};

#[test]
fn test_every_tag_resolves() {
    let tags = [
        "text", "textarea", "email", "number", "date", "select", "radio", "checkbox", "file",
        "signature",
    ];
    for tag in tags {
        let field_type = FieldTypeRegistry::resolve(tag).unwrap();
        assert_eq!(field_type.as_str(), tag);
    }
    assert_eq!(FieldTypeRegistry::types().count(), tags.len());
}

#[test]
fn test_unknown_tag_fails() {
    let result = FieldTypeRegistry::capabilities_of("rating");
    match result {
        Err(FormsError::UnknownFieldType(tag)) => assert_eq!(tag, "rating"),
        other => panic!("expected UnknownFieldType, got {:?}", other),
    }
}

#[test]
fn test_choice_capabilities() {
    let select = FieldTypeRegistry::capabilities_of("select").unwrap();
    assert!(select.needs_options);
    assert!(!select.is_multi_value);
    assert_eq!(select.shape, ValueShape::SingleOption);

    let checkbox = FieldType::Checkbox.capabilities();
    assert!(checkbox.needs_options);
    assert!(checkbox.is_multi_value);
    assert_eq!(checkbox.shape, ValueShape::OptionList);
}

#[test]
fn test_storage_capabilities() {
    let file = FieldType::File.capabilities();
    assert!(file.needs_file_storage);
    assert!(!file.needs_signature_normalization);

    let signature = FieldType::Signature.capabilities();
    assert!(signature.needs_file_storage);
    assert!(signature.needs_signature_normalization);
    assert!(signature.is_multi_value);
}

#[test]
fn test_scalar_types_need_nothing() {
    for field_type in [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Email,
        FieldType::Number,
        FieldType::Date,
    ] {
        let caps = field_type.capabilities();
        assert!(!caps.needs_options, "{}", field_type);
        assert!(!caps.needs_file_storage, "{}", field_type);
        assert!(!caps.is_multi_value, "{}", field_type);
    }
}
