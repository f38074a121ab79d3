//! Resume assembler. Builds a whole [`ResumeDocument`] from a raw payload of unknown shape.
//!
//! Total over its input: `{}`, `null`, arrays, numbers and garbage strings all
//! produce a fully defaulted document.

use std::borrow::Cow;

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{Identity, ResumeDocument, SectionKind};
use crate::normalize::aliases::{self, AliasTable};
use crate::normalize::coercion::{coerce_optional, first_value};
use crate::normalize::section::normalize_section;

const IDENTITY_KEYS: &[&str] = &["name", "email", "phone", "address"];
const BASIC_INFO_KEY: &str = "basic_info";
const ENVELOPE_KEY: &str = "data";

pub fn assemble_resume(raw: &Value) -> ResumeDocument {
    let root = resolve_payload(raw);
    let Some(obj) = root.as_object() else {
        debug!("Resume payload is not an object; using an empty document");
        return ResumeDocument::default();
    };

    let section = |table: &AliasTable| normalize_section(section_value(obj, table), table);

    ResumeDocument {
        identity: assemble_identity(obj),
        projects: section(&aliases::PROJECTS),
        jobs: section(&aliases::JOBS),
        research: section(&aliases::RESEARCH),
        education: section(&aliases::EDUCATION),
    }
}

/// Strips transport wrapping: a JSON-encoded string is parsed, and a `data`
/// envelope is unwrapped when the top level carries no resume keys.
pub fn resolve_payload(raw: &Value) -> Cow<'_, Value> {
    match raw {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) if !parsed.is_string() => Cow::Owned(resolve_payload(&parsed).into_owned()),
            _ => Cow::Owned(Value::Null),
        },
        Value::Object(obj) if !has_resume_keys(obj) => match obj.get(ENVELOPE_KEY) {
            Some(inner) if inner.is_object() || inner.is_string() => resolve_payload(inner),
            _ => Cow::Borrowed(raw),
        },
        _ => Cow::Borrowed(raw),
    }
}

/// The payload key currently carrying `kind`, if any.
pub fn section_key(obj: &Map<String, Value>, kind: SectionKind) -> Option<&'static str> {
    aliases::for_kind(kind)
        .payload_keys
        .iter()
        .copied()
        .find(|key| obj.get(*key).is_some_and(|v| !v.is_null()))
}

fn section_value<'a>(obj: &'a Map<String, Value>, table: &AliasTable) -> Option<&'a Value> {
    first_value(obj, table.payload_keys)
}

fn assemble_identity(obj: &Map<String, Value>) -> Identity {
    let basic = obj.get(BASIC_INFO_KEY).and_then(Value::as_object);
    let field = |key: &str| {
        coerce_optional(obj.get(key))
            .or_else(|| basic.and_then(|b| coerce_optional(b.get(key))))
            .unwrap_or_default()
    };

    Identity {
        name: field("name"),
        email: field("email"),
        phone: field("phone"),
        address: field("address"),
    }
}

fn has_resume_keys(obj: &Map<String, Value>) -> bool {
    IDENTITY_KEYS
        .iter()
        .chain(std::iter::once(&BASIC_INFO_KEY))
        .chain(
            SectionKind::ALL
                .iter()
                .flat_map(|k| aliases::for_kind(*k).payload_keys.iter()),
        )
        .any(|key| obj.contains_key(*key))
}
