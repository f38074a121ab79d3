use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The four entity sections a resume carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Projects,
    Jobs,
    Research,
    Education,
}

impl SectionKind {
    /// Render order for every output target.
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Projects,
        SectionKind::Jobs,
        SectionKind::Research,
        SectionKind::Education,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            SectionKind::Projects => "Projects",
            SectionKind::Jobs => "Work Experience",
            SectionKind::Research => "Research",
            SectionKind::Education => "Education",
        }
    }

    /// Key used by the backend's chunk-edit API.
    pub fn chunk_key(&self) -> &'static str {
        match self {
            SectionKind::Projects => "projects",
            SectionKind::Jobs => "jobs",
            SectionKind::Research => "researches",
            SectionKind::Education => "educations",
        }
    }

    /// Accepts the chunk key, the canonical name, and the singular spellings.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "projects" | "project" => Some(SectionKind::Projects),
            "jobs" | "job" | "work_experience" => Some(SectionKind::Jobs),
            "researches" | "research" | "researchs" => Some(SectionKind::Research),
            "educations" | "education" => Some(SectionKind::Education),
            _ => None,
        }
    }
}

/// Canonical form of a description field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DescriptionValue {
    /// Non-empty list of non-blank bullet strings.
    Bullets(Vec<String>),
    Paragraph(String),
    /// Backend advisory text. Shown, but styled apart from real content.
    Note(String),
    #[default]
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// One normalized resume item. Same shape for every section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEntity {
    pub display_name: String,
    pub role: Option<String>,
    pub duration: String,
    pub extra: BTreeMap<String, Option<String>>,
    pub description: DescriptionValue,
}

impl CanonicalEntity {
    pub fn extra_text(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_deref())
    }
}

/// The only resume shape the rendering layer ever sees.
///
/// Built fresh for every raw payload and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub identity: Identity,
    pub projects: Vec<CanonicalEntity>,
    pub jobs: Vec<CanonicalEntity>,
    pub research: Vec<CanonicalEntity>,
    pub education: Vec<CanonicalEntity>,
}

impl ResumeDocument {
    pub fn section(&self, kind: SectionKind) -> &[CanonicalEntity] {
        match kind {
            SectionKind::Projects => &self.projects,
            SectionKind::Jobs => &self.jobs,
            SectionKind::Research => &self.research,
            SectionKind::Education => &self.education,
        }
    }

    pub fn entity_count(&self) -> usize {
        SectionKind::ALL.iter().map(|k| self.section(*k).len()).sum()
    }
}
