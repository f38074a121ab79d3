//! Chunk addressing: one entity of one section, by `(section, index)`.
//!
//! Indices are positions in the normalized sequence, so a keyed map like
//! `{job2, job1}` exposes `job1` as index 0.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{ResumeDocument, SectionKind};
use crate::normalize::{section_key, EntryLocator, SectionForm};
use crate::session::SessionError;

const DESCRIPTION_KEY: &str = "description";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRef {
    pub id: usize,
    pub name: String,
}

/// Chunk listing keyed the way the backend's chunk-edit API names sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunksByType {
    pub projects: Vec<ChunkRef>,
    pub jobs: Vec<ChunkRef>,
    pub researches: Vec<ChunkRef>,
    pub educations: Vec<ChunkRef>,
}

impl ChunksByType {
    pub fn from_document(doc: &ResumeDocument) -> Self {
        let list = |kind: SectionKind| {
            doc.section(kind)
                .iter()
                .enumerate()
                .map(|(id, entity)| ChunkRef {
                    id,
                    name: entity.display_name.clone(),
                })
                .collect()
        };
        Self {
            projects: list(SectionKind::Projects),
            jobs: list(SectionKind::Jobs),
            researches: list(SectionKind::Research),
            educations: list(SectionKind::Education),
        }
    }

    pub fn get(&self, kind: SectionKind) -> &[ChunkRef] {
        match kind {
            SectionKind::Projects => &self.projects,
            SectionKind::Jobs => &self.jobs,
            SectionKind::Research => &self.researches,
            SectionKind::Education => &self.educations,
        }
    }
}

/// Replaces the `description` of the raw entry behind chunk `(kind, index)`.
pub fn rewrite_description(
    raw: &mut Value,
    kind: SectionKind,
    index: usize,
    description: Value,
) -> Result<(), SessionError> {
    let not_found = || SessionError::ChunkNotFound {
        section: kind.chunk_key(),
        index,
    };

    let obj = raw.as_object_mut().ok_or_else(not_found)?;
    let key = section_key(obj, kind).ok_or_else(not_found)?;
    let locator = SectionForm::ingest(obj.get(key), kind)
        .entries()
        .into_iter()
        .nth(index)
        .map(|(locator, _)| locator)
        .ok_or_else(not_found)?;

    let section = obj.get_mut(key).ok_or_else(not_found)?;
    let entry = match &locator {
        EntryLocator::Position(i) => section.get_mut(*i),
        EntryLocator::Key(k) => section.get_mut(k.as_str()),
    }
    .ok_or_else(not_found)?;

    match entry {
        Value::Object(fields) => {
            fields.insert(DESCRIPTION_KEY.to_string(), description);
            Ok(())
        }
        _ => Err(SessionError::ChunkNotEditable {
            section: kind.chunk_key(),
            index,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::assemble_resume;
    use serde_json::json;

    #[test]
    fn test_listing_uses_normalized_order() {
        let doc = assemble_resume(&json!({
            "jobs": {"job2": {"name": "Globex"}, "job1": {"name": "Acme"}},
            "researchs": [{"title": "Pruning"}]
        }));
        let chunks = ChunksByType::from_document(&doc);
        assert_eq!(
            chunks.jobs,
            vec![
                ChunkRef { id: 0, name: "Acme".to_string() },
                ChunkRef { id: 1, name: "Globex".to_string() }
            ]
        );
        assert_eq!(chunks.get(SectionKind::Research).len(), 1);
        assert!(chunks.projects.is_empty());
    }

    #[test]
    fn test_listing_serializes_with_backend_keys() {
        let value = serde_json::to_value(ChunksByType::default()).unwrap();
        assert_eq!(
            value,
            json!({"projects": [], "jobs": [], "researches": [], "educations": []})
        );
    }

    #[test]
    fn test_rewrite_keyed_entry_by_normalized_index() {
        let mut raw = json!({"jobs": {"job2": {"name": "Globex"}, "job1": {"name": "Acme"}}});
        rewrite_description(&mut raw, SectionKind::Jobs, 1, json!(["Shipped"])).unwrap();
        assert_eq!(raw["jobs"]["job2"]["description"], json!(["Shipped"]));
        assert!(raw["jobs"]["job1"].get("description").is_none());
    }

    #[test]
    fn test_rewrite_list_entry() {
        let mut raw = json!({"educations": [{"name": "MIT", "description": "old"}]});
        rewrite_description(&mut raw, SectionKind::Education, 0, json!("new")).unwrap();
        assert_eq!(raw["educations"][0]["description"], json!("new"));
    }

    #[test]
    fn test_rewrite_out_of_range() {
        let mut raw = json!({"projects": [{"name": "A"}]});
        let err = rewrite_description(&mut raw, SectionKind::Projects, 3, json!("x")).unwrap_err();
        assert!(matches!(
            err,
            SessionError::ChunkNotFound { section: "projects", index: 3 }
        ));

        let mut empty = Value::Null;
        assert!(rewrite_description(&mut empty, SectionKind::Jobs, 0, json!("x")).is_err());
    }

    #[test]
    fn test_rewrite_scalar_entry_is_not_editable() {
        let mut raw = json!({"projects": ["Bare title"]});
        let err = rewrite_description(&mut raw, SectionKind::Projects, 0, json!("x")).unwrap_err();
        assert!(matches!(err, SessionError::ChunkNotEditable { .. }));
    }
}
