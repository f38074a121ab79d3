//! HTML fragments for the resume body. Every interpolated string is escaped.

use crate::models::{CanonicalEntity, DescriptionValue, Identity, ResumeDocument, SectionKind};

pub const NOTE_STYLE: &str = "font-style: italic; color: #666;";

/// Inner markup of the resume: header plus every non-empty section.
pub fn render_body(doc: &ResumeDocument) -> String {
    let mut html = render_header(&doc.identity);
    for kind in SectionKind::ALL {
        html.push_str(&render_section(kind, doc.section(kind)));
    }
    html
}

pub fn render_description(description: &DescriptionValue) -> String {
    match description {
        DescriptionValue::Bullets(items) => {
            let mut html = String::from("<ul>");
            for item in items {
                html.push_str(&format!("<li>{}</li>", escape_html(item)));
            }
            html.push_str("</ul>");
            html
        }
        DescriptionValue::Paragraph(text) => {
            format!("<p class=\"description\">{}</p>", escape_html(text))
        }
        DescriptionValue::Note(text) => format!(
            "<p class=\"note\" style=\"{NOTE_STYLE}\">{}</p>",
            escape_html(text)
        ),
        DescriptionValue::Empty => String::new(),
    }
}

fn render_header(identity: &Identity) -> String {
    let mut html = String::new();
    if !identity.name.is_empty() {
        html.push_str(&format!("<h1>{}</h1>", escape_html(&identity.name)));
    }

    let contact: Vec<String> = [
        ("Email", &identity.email),
        ("Phone", &identity.phone),
        ("Address", &identity.address),
    ]
    .iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(label, value)| format!("{label}: {}", escape_html(value)))
    .collect();
    if !contact.is_empty() {
        html.push_str(&format!(
            "<p class=\"contact-info\">{}</p>",
            contact.join(" | ")
        ));
    }
    html
}

fn render_section(kind: SectionKind, entities: &[CanonicalEntity]) -> String {
    if entities.is_empty() {
        return String::new();
    }
    let mut html = format!(
        "<section data-section=\"{}\"><h2>{}</h2>",
        kind.chunk_key(),
        kind.heading()
    );
    for entity in entities {
        html.push_str(&render_entity(kind, entity));
    }
    html.push_str("</section>");
    html
}

fn render_entity(kind: SectionKind, entity: &CanonicalEntity) -> String {
    let mut html = format!("<div class=\"{}\">", entry_class(kind));

    if !entity.display_name.is_empty() {
        html.push_str(&format!("<h3>{}</h3>", escape_html(&entity.display_name)));
    }

    let role = entity.role.as_deref().unwrap_or_default();
    if !role.is_empty() || !entity.duration.is_empty() {
        html.push_str("<div class=\"position-duration\">");
        if !role.is_empty() {
            html.push_str(&format!("<span class=\"position\">{}</span>", escape_html(role)));
        }
        if !entity.duration.is_empty() {
            html.push_str(&format!(
                "<span class=\"duration\">{}</span>",
                escape_html(&entity.duration)
            ));
        }
        html.push_str("</div>");
    }

    if kind == SectionKind::Education {
        if let Some(gpa) = entity.extra_text("gpa") {
            html.push_str(&format!("<p class=\"gpa\">GPA: {}</p>", escape_html(gpa)));
        }
        if let Some(coursework) = entity.extra_text("coursework") {
            html.push_str(&format!(
                "<p class=\"coursework\">Coursework: {}</p>",
                escape_html(coursework)
            ));
        }
    }

    html.push_str(&render_description(&entity.description));
    html.push_str("</div>");
    html
}

fn entry_class(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Projects => "project-entry",
        SectionKind::Jobs => "work-entry",
        SectionKind::Research => "research-entry",
        SectionKind::Education => "education-entry",
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str, description: DescriptionValue) -> CanonicalEntity {
        CanonicalEntity {
            display_name: name.to_string(),
            description,
            ..Default::default()
        }
    }

    #[test]
    fn test_bullets_render_as_list_items_only() {
        let html = render_description(&DescriptionValue::Bullets(vec![
            "a".to_string(),
            "b".to_string(),
        ]));
        assert_eq!(html.matches("<li>").count(), 2);
        assert_eq!(html.matches("<p").count(), 0);
    }

    #[test]
    fn test_note_is_styled_apart() {
        let html = render_description(&DescriptionValue::Note(
            "Please provide more specific details about your role".to_string(),
        ));
        assert!(html.starts_with("<p class=\"note\""));
        assert!(html.contains("font-style: italic"));
        assert!(!html.contains("<li>"));
    }

    #[test]
    fn test_empty_description_renders_nothing() {
        assert_eq!(render_description(&DescriptionValue::Empty), "");
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render_description(&DescriptionValue::Paragraph(
            "<script>alert('x')</script> & co".to_string(),
        ));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; co"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let doc = ResumeDocument {
            jobs: vec![entity("Acme", DescriptionValue::Empty)],
            ..Default::default()
        };
        let html = render_body(&doc);
        assert!(html.contains("<h2>Work Experience</h2>"));
        assert!(!html.contains("<h2>Projects</h2>"));
        assert!(!html.contains("<h2>Research</h2>"));
        assert!(!html.contains("<h2>Education</h2>"));
    }

    #[test]
    fn test_sections_follow_fixed_order() {
        let doc = ResumeDocument {
            education: vec![entity("MIT", DescriptionValue::Empty)],
            projects: vec![entity("Compiler", DescriptionValue::Empty)],
            jobs: vec![entity("Acme", DescriptionValue::Empty)],
            ..Default::default()
        };
        let html = render_body(&doc);
        let projects = html.find("Projects").unwrap();
        let jobs = html.find("Work Experience").unwrap();
        let education = html.find("Education").unwrap();
        assert!(projects < jobs && jobs < education);
    }

    #[test]
    fn test_blank_fields_leave_no_empty_markup() {
        let doc = ResumeDocument {
            research: vec![entity("", DescriptionValue::Empty)],
            ..Default::default()
        };
        let html = render_body(&doc);
        assert!(!html.contains("<h1>"));
        assert!(!html.contains("contact-info"));
        assert!(!html.contains("<h3>"));
        assert!(!html.contains("position-duration"));
        assert!(html.contains("<div class=\"research-entry\"></div>"));
    }

    #[test]
    fn test_contact_line_skips_missing_parts() {
        let identity = Identity {
            name: "Jo".to_string(),
            email: "jo@example.com".to_string(),
            address: "Seoul".to_string(),
            ..Default::default()
        };
        let html = render_header(&identity);
        assert!(html.contains("Email: jo@example.com | Address: Seoul"));
        assert!(!html.contains("Phone"));
    }

    #[test]
    fn test_education_extras() {
        let mut edu = entity("State University", DescriptionValue::Empty);
        edu.role = Some("B.S., CS".to_string());
        edu.extra.insert("gpa".to_string(), Some("3.9".to_string()));
        edu.extra.insert("coursework".to_string(), None);
        let html = render_entity(SectionKind::Education, &edu);
        assert!(html.contains("<span class=\"position\">B.S., CS</span>"));
        assert!(html.contains("GPA: 3.9"));
        assert!(!html.contains("Coursework"));
    }
}
