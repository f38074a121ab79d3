use serde_json::Value;
use tracing::warn;

use crate::backend_client::ChatReply;
use crate::models::Identity;

/// Pulls the raw payload out of a chat reply. `updated_json` may arrive as an
/// object or as a JSON-encoded string; anything undecodable is dropped.
pub fn extract_updated_payload(reply: &ChatReply) -> Option<Value> {
    match reply.updated_json.as_ref()? {
        Value::Null => None,
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) if parsed.is_object() => Some(parsed),
            Ok(_) => {
                warn!("Chat update decoded to a non-object; ignoring");
                None
            }
            Err(e) => {
                warn!(error = %e, "Chat update is not valid JSON; ignoring");
                None
            }
        },
        other => Some(other.clone()),
    }
}

/// A chat update only replaces the document when it still names the person.
pub fn is_complete_identity(identity: &Identity) -> bool {
    !identity.name.is_empty() && !identity.email.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(updated_json: Option<Value>) -> ChatReply {
        ChatReply {
            message: "Updated".to_string(),
            updated_json,
        }
    }

    #[test]
    fn test_object_update_is_passed_through() {
        let payload = json!({"name": "Jo", "email": "jo@example.com"});
        assert_eq!(extract_updated_payload(&reply(Some(payload.clone()))), Some(payload));
    }

    #[test]
    fn test_string_update_is_decoded() {
        let encoded = json!(r#"{"name": "Jo", "email": "jo@example.com"}"#);
        assert_eq!(
            extract_updated_payload(&reply(Some(encoded))),
            Some(json!({"name": "Jo", "email": "jo@example.com"}))
        );
    }

    #[test]
    fn test_missing_or_broken_update_is_dropped() {
        assert_eq!(extract_updated_payload(&reply(None)), None);
        assert_eq!(extract_updated_payload(&reply(Some(Value::Null))), None);
        assert_eq!(extract_updated_payload(&reply(Some(json!("{broken")))), None);
        assert_eq!(extract_updated_payload(&reply(Some(json!("\"just text\"")))), None);
    }

    #[test]
    fn test_identity_needs_name_and_email() {
        let mut identity = Identity {
            name: "Jo".to_string(),
            ..Default::default()
        };
        assert!(!is_complete_identity(&identity));
        identity.email = "jo@example.com".to_string();
        assert!(is_complete_identity(&identity));
    }
}
