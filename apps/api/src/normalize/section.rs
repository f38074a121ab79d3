//! Section normalizer. One raw section in, an ordered list of canonical entities out.
//!
//! A section arrives either as a JSON array or as an object keyed `<type><N>`
//! (`project1`, `project2`, ...). The shape is resolved once into a
//! [`SectionForm`]; nothing downstream looks at the raw shape again.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::{CanonicalEntity, SectionKind};
use crate::normalize::aliases::AliasTable;
use crate::normalize::coercion::{coerce_optional, coerce_text, first_present, first_value};
use crate::normalize::description::decode_description;

/// Where an entity lives inside its raw section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryLocator {
    Position(usize),
    Key(String),
}

/// A raw section after shape detection.
#[derive(Debug)]
pub enum SectionForm<'a> {
    List(&'a [Value]),
    /// Already ordered by numeric key suffix.
    Map(Vec<(&'a String, &'a Value)>),
    Absent,
}

impl<'a> SectionForm<'a> {
    pub fn ingest(raw: Option<&'a Value>, kind: SectionKind) -> Self {
        match raw {
            None | Some(Value::Null) => SectionForm::Absent,
            Some(Value::Array(items)) => SectionForm::List(items),
            Some(Value::Object(map)) => SectionForm::Map(order_by_key_suffix(map)),
            Some(other) => {
                warn!(
                    section = kind.chunk_key(),
                    shape = shape_name(other),
                    "Section is neither a list nor a keyed map; treating as empty"
                );
                SectionForm::Absent
            }
        }
    }

    /// Entries in canonical order, each with its raw location.
    pub fn entries(&self) -> Vec<(EntryLocator, &'a Value)> {
        match self {
            SectionForm::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (EntryLocator::Position(i), v))
                .collect(),
            SectionForm::Map(entries) => entries
                .iter()
                .map(|(k, v)| (EntryLocator::Key((*k).clone()), *v))
                .collect(),
            SectionForm::Absent => Vec::new(),
        }
    }
}

/// Normalizes one section. Cardinality is preserved: one record per raw entry.
pub fn normalize_section(raw: Option<&Value>, aliases: &AliasTable) -> Vec<CanonicalEntity> {
    SectionForm::ingest(raw, aliases.kind)
        .entries()
        .into_iter()
        .map(|(_, value)| normalize_entity(value, aliases))
        .collect()
}

/// Normalizes a single raw entry through the section's alias table.
pub fn normalize_entity(value: &Value, aliases: &AliasTable) -> CanonicalEntity {
    match value {
        Value::Object(obj) => CanonicalEntity {
            display_name: first_present(obj, aliases.display_name).unwrap_or_default(),
            role: aliases.role.resolve(obj),
            duration: first_present(obj, aliases.duration).unwrap_or_default(),
            extra: collect_extra(Some(obj), aliases),
            description: decode_description(first_value(obj, aliases.description)),
        },
        Value::Array(_) => {
            debug!(section = aliases.kind.chunk_key(), "List entry is a nested array");
            CanonicalEntity {
                extra: collect_extra(None, aliases),
                ..Default::default()
            }
        }
        scalar => CanonicalEntity {
            display_name: coerce_text(Some(scalar)),
            extra: collect_extra(None, aliases),
            ..Default::default()
        },
    }
}

/// Numeric suffix of a map key: `project12` → 12. `None` when there is none.
pub fn key_suffix(key: &str) -> Option<u64> {
    let stem_len = key.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let digits = &key[stem_len..];
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Ascending numeric suffix; suffix-less keys last. The sort is stable, so ties
/// keep the payload's key order.
fn order_by_key_suffix(map: &Map<String, Value>) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by_key(|(key, _)| match key_suffix(key) {
        Some(n) => (0u8, n),
        None => (1u8, 0),
    });
    entries
}

fn collect_extra(
    obj: Option<&Map<String, Value>>,
    aliases: &AliasTable,
) -> std::collections::BTreeMap<String, Option<String>> {
    aliases
        .extra
        .iter()
        .map(|key| {
            let value = obj.and_then(|o| coerce_optional(o.get(*key)));
            (key.to_string(), value)
        })
        .collect()
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
