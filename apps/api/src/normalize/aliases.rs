//! Alias tables: which raw field names feed each canonical field, per section.
//!
//! The backend has shipped several schema revisions (`title` vs `name`,
//! `company_name` vs `name`, `research_duration` vs `duration`, ...) with no
//! version marker, so every table accepts the superset of names seen so far.
//! Candidates are tried in order; the first one yielding non-empty text wins.

use serde_json::{Map, Value};

use crate::models::SectionKind;
use crate::normalize::coercion::first_present;

/// How a section resolves its `role` field.
#[derive(Debug, Clone, Copy)]
pub enum RoleRule {
    FirstOf(&'static [&'static str]),
    /// `"{primary}, {secondary}"`, or whichever side is present.
    Composite {
        primary: &'static [&'static str],
        secondary: &'static [&'static str],
    },
}

impl RoleRule {
    pub fn resolve(&self, obj: &Map<String, Value>) -> Option<String> {
        match self {
            RoleRule::FirstOf(candidates) => first_present(obj, candidates),
            RoleRule::Composite { primary, secondary } => {
                match (first_present(obj, primary), first_present(obj, secondary)) {
                    (Some(p), Some(s)) => Some(format!("{p}, {s}")),
                    (Some(p), None) => Some(p),
                    (None, Some(s)) => Some(s),
                    (None, None) => None,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AliasTable {
    pub kind: SectionKind,
    /// Top-level payload keys that may carry this section.
    pub payload_keys: &'static [&'static str],
    pub display_name: &'static [&'static str],
    pub role: RoleRule,
    pub duration: &'static [&'static str],
    pub description: &'static [&'static str],
    /// Scalars kept in `extra` under their raw name.
    pub extra: &'static [&'static str],
}

pub const PROJECTS: AliasTable = AliasTable {
    kind: SectionKind::Projects,
    payload_keys: &["projects"],
    display_name: &["name", "title", "project_name"],
    role: RoleRule::FirstOf(&["position", "role"]),
    duration: &["duration", "project_duration"],
    description: &["description"],
    extra: &["keywords"],
};

pub const JOBS: AliasTable = AliasTable {
    kind: SectionKind::Jobs,
    payload_keys: &["jobs", "work_experience"],
    display_name: &["name", "company_name", "company"],
    role: RoleRule::FirstOf(&["position", "role"]),
    duration: &["duration", "job_duration"],
    description: &["description"],
    extra: &["keywords"],
};

pub const RESEARCH: AliasTable = AliasTable {
    kind: SectionKind::Research,
    payload_keys: &["researches", "research", "researchs"],
    display_name: &["name", "title"],
    role: RoleRule::FirstOf(&["position", "role"]),
    duration: &["duration", "research_duration"],
    description: &["description"],
    extra: &["keywords"],
};

pub const EDUCATION: AliasTable = AliasTable {
    kind: SectionKind::Education,
    payload_keys: &["educations", "education"],
    display_name: &["name", "school_name", "school"],
    role: RoleRule::Composite {
        primary: &["degree"],
        secondary: &["major"],
    },
    duration: &["duration", "education_duration"],
    description: &["description"],
    extra: &["gpa", "coursework", "degree", "major"],
};

pub fn for_kind(kind: SectionKind) -> &'static AliasTable {
    match kind {
        SectionKind::Projects => &PROJECTS,
        SectionKind::Jobs => &JOBS,
        SectionKind::Research => &RESEARCH,
        SectionKind::Education => &EDUCATION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_for_kind_round_trips() {
        for kind in SectionKind::ALL {
            assert_eq!(for_kind(kind).kind, kind);
        }
    }

    #[test]
    fn test_composite_role_joins_degree_and_major() {
        let obj = json!({"degree": "B.S.", "major": "Computer Science"});
        assert_eq!(
            EDUCATION.role.resolve(obj.as_object().unwrap()),
            Some("B.S., Computer Science".to_string())
        );
    }

    #[test]
    fn test_composite_role_uses_present_side() {
        let obj = json!({"major": "Physics"});
        assert_eq!(
            EDUCATION.role.resolve(obj.as_object().unwrap()),
            Some("Physics".to_string())
        );
        assert_eq!(EDUCATION.role.resolve(&Map::new()), None);
    }

    #[test]
    fn test_project_role_prefers_position() {
        let obj = json!({"position": "Lead", "role": "Member"});
        assert_eq!(
            PROJECTS.role.resolve(obj.as_object().unwrap()),
            Some("Lead".to_string())
        );
        let obj = json!({"role": "Member"});
        assert_eq!(
            PROJECTS.role.resolve(obj.as_object().unwrap()),
            Some("Member".to_string())
        );
    }
}
