//! Field coercion. Every read of an untyped payload field goes through here.

use serde_json::{Map, Value};

/// Coerces a raw field into trimmed text.
///
/// `None`, `null`, and blank strings become `""`. Numbers and booleans use their
/// JSON text. Arrays and objects are not scalars and also become `""`.
pub fn coerce_text(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | Some(Value::Array(_)) | Some(Value::Object(_)) | None => String::new(),
    }
}

/// Same as [`coerce_text`] but maps the empty result to `None`.
pub fn coerce_optional(raw: Option<&Value>) -> Option<String> {
    let text = coerce_text(raw);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Returns the coerced text of the first candidate key that yields non-empty text.
pub fn first_present(obj: &Map<String, Value>, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find_map(|key| coerce_optional(obj.get(*key)))
}

/// Returns the raw value under the first candidate key that is present and not `null`.
pub fn first_value<'a>(obj: &'a Map<String, Value>, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|key| obj.get(*key))
        .find(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_and_null_are_empty() {
        assert_eq!(coerce_text(None), "");
        assert_eq!(coerce_text(Some(&Value::Null)), "");
        assert_eq!(coerce_text(Some(&json!(""))), "");
    }

    #[test]
    fn test_string_is_trimmed() {
        assert_eq!(coerce_text(Some(&json!("  Acme Corp \n"))), "Acme Corp");
    }

    #[test]
    fn test_scalars_use_their_text() {
        assert_eq!(coerce_text(Some(&json!(3.9))), "3.9");
        assert_eq!(coerce_text(Some(&json!(2021))), "2021");
        assert_eq!(coerce_text(Some(&json!(true))), "true");
    }

    #[test]
    fn test_containers_are_not_scalars() {
        assert_eq!(coerce_text(Some(&json!(["a"]))), "");
        assert_eq!(coerce_text(Some(&json!({"a": 1}))), "");
    }

    #[test]
    fn test_coerce_optional_maps_blank_to_none() {
        assert_eq!(coerce_optional(Some(&json!("   "))), None);
        assert_eq!(coerce_optional(Some(&json!("B.S."))), Some("B.S.".to_string()));
    }

    #[test]
    fn test_first_present_skips_blank_candidates() {
        let obj = json!({"name": " ", "company_name": "Acme"});
        let obj = obj.as_object().unwrap();
        assert_eq!(
            first_present(obj, &["name", "company_name"]),
            Some("Acme".to_string())
        );
        assert_eq!(first_present(obj, &["title"]), None);
    }

    #[test]
    fn test_first_value_skips_null() {
        let obj = json!({"description": null, "details": "x"});
        let obj = obj.as_object().unwrap();
        assert_eq!(first_value(obj, &["description", "details"]), Some(&json!("x")));
    }
}
