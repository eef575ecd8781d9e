//! Decoding of signature capture entries.
//!
//! An entry arrives either as a record or as a JSON string encoding that
//! record. Its `signature` member holds a base64 image, optionally behind a
//! `data:image/...;base64,` prefix.

use std::sync::OnceLock;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::FieldError;
use crate::path::FieldPath;

use super::input::DecodedSignature;

/// Standard alphabet; trailing `=` padding is optional.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

fn data_uri_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| {
        Regex::new(r"^data:image/[\w.+-]+;base64,").expect("static pattern compiles")
    })
}

/// Decodes one list element of a signature field.
pub(crate) fn decode_entry(entry: &Value, path: &FieldPath) -> Result<DecodedSignature, FieldError> {
    let record = as_record(entry).ok_or_else(|| missing_image(path))?;

    let payload = record
        .get("signature")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| missing_image(path))?;

    let image = decode_image(payload).ok_or_else(|| {
        FieldError::new(
            path.push_key("signature"),
            "signature image could not be decoded",
        )
        .with_code("undecodable_signature")
        .with_expected("base64 encoded image")
    })?;

    Ok(DecodedSignature {
        image,
        printed_name: optional_text(&record, "printed_name"),
        date: optional_text(&record, "date"),
    })
}

/// Accepts a record directly or a string holding a JSON record.
fn as_record(entry: &Value) -> Option<Map<String, Value>> {
    match entry {
        Value::Object(record) => Some(record.clone()),
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Object(record)) => Some(record),
            _ => None,
        },
        _ => None,
    }
}

fn decode_image(payload: &str) -> Option<Vec<u8>> {
    let stripped = data_uri_prefix().replace(payload, "");
    let compact: String = stripped.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64.decode(compact).ok().filter(|bytes| !bytes.is_empty())
}

fn optional_text(record: &Map<String, Value>, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn missing_image(path: &FieldPath) -> FieldError {
    FieldError::new(
        path.clone(),
        "each signature must contain a valid signature image",
    )
    .with_code("invalid_signature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // "hello" in base64
    const HELLO: &str = "aGVsbG8=";

    fn path() -> FieldPath {
        FieldPath::field("sig").push_index(0)
    }

    #[test]
    fn test_decodes_record_with_data_uri() {
        let entry = json!({
            "signature": format!("data:image/png;base64,{HELLO}"),
            "printed_name": "Jane Doe",
            "date": "2026-01-02"
        });
        let decoded = decode_entry(&entry, &path()).unwrap();
        assert_eq!(decoded.image, b"hello");
        assert_eq!(decoded.printed_name.as_deref(), Some("Jane Doe"));
        assert_eq!(decoded.date.as_deref(), Some("2026-01-02"));
    }

    #[test]
    fn test_padding_is_optional() {
        let entry = json!({ "signature": "data:image/png;base64,aGVsbG8" });
        assert_eq!(decode_entry(&entry, &path()).unwrap().image, b"hello");

        let entry = json!({ "signature": "aGk" });
        assert_eq!(decode_entry(&entry, &path()).unwrap().image, b"hi");
    }

    #[test]
    fn test_decodes_json_string_wrapper() {
        let inner = json!({ "signature": HELLO }).to_string();
        let decoded = decode_entry(&Value::String(inner), &path()).unwrap();
        assert_eq!(decoded.image, b"hello");
        assert_eq!(decoded.printed_name, None);
        assert_eq!(decoded.date, None);
    }

    #[test]
    fn test_blank_optional_members_become_none() {
        let entry = json!({ "signature": HELLO, "printed_name": "  ", "date": null });
        let decoded = decode_entry(&entry, &path()).unwrap();
        assert_eq!(decoded.printed_name, None);
        assert_eq!(decoded.date, None);
    }

    #[test]
    fn test_missing_image() {
        let err = decode_entry(&json!({ "printed_name": "Jane" }), &path()).unwrap_err();
        assert_eq!(err.code, "invalid_signature");
        assert_eq!(err.path.to_string(), "sig[0]");

        let err = decode_entry(&json!({ "signature": "" }), &path()).unwrap_err();
        assert_eq!(err.code, "invalid_signature");
    }

    #[test]
    fn test_unparseable_string_entry() {
        let err = decode_entry(&json!("not json"), &path()).unwrap_err();
        assert_eq!(err.code, "invalid_signature");
    }

    #[test]
    fn test_non_record_entry() {
        let err = decode_entry(&json!(42), &path()).unwrap_err();
        assert_eq!(err.code, "invalid_signature");
    }

    #[test]
    fn test_undecodable_payload() {
        let err =
            decode_entry(&json!({ "signature": "data:image/png;base64,@@@" }), &path()).unwrap_err();
        assert_eq!(err.code, "undecodable_signature");
        assert_eq!(err.path.to_string(), "sig[0].signature");
    }
}
