// Render/export adapter.
// Consumes a normalized ResumeDocument only; never looks at raw payloads.

pub mod handlers;
pub mod markup;

use serde::{Deserialize, Serialize};

use crate::models::ResumeDocument;

pub use markup::escape_html;

/// Output flavour of [`render_document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderTarget {
    /// The live preview DOM fragment.
    #[default]
    Preview,
    /// Standalone A4 document for the browser's print dialog.
    Print,
    /// Standalone US-letter document handed to a PDF library.
    PdfSource,
    /// Bare inner markup, the exact payload the backend converter receives.
    DocxSource,
}

const BASE_CSS: &str = "\
body { font-family: 'Arial', sans-serif; line-height: 1.5; color: #333; margin: 0; background-color: white; }
h1 { font-size: 1.8rem; margin-bottom: 0.5rem; color: #1a1a1a; text-align: center; }
h2 { font-size: 1.4rem; margin-bottom: 0.75rem; border-bottom: 1px solid #eaeaea; padding-bottom: 0.35rem; color: #2980b9; }
h3 { font-size: 1.1rem; margin-bottom: 0.5rem; color: #444; }
p { margin-bottom: 0.8rem; }
ul { padding-left: 1.5rem; margin-bottom: 1rem; }
li { margin-bottom: 0.35rem; }
.contact-info { text-align: center; }
.position-duration { display: flex; justify-content: space-between; }
.project-entry, .work-entry, .research-entry, .education-entry { margin-bottom: 20px; page-break-inside: avoid; }
";

const PRINT_PAGE_CSS: &str = "@page { size: A4; margin: 2cm; }\n@media print { body { padding: 0; } }\n";

const PDF_PAGE_CSS: &str = "@page { size: letter; margin: 1in; }\n";

pub fn render_document(doc: &ResumeDocument, target: RenderTarget) -> String {
    let body = markup::render_body(doc);
    match target {
        RenderTarget::Preview => {
            format!("<div class=\"resume-document\" id=\"resume-preview\">{body}</div>")
        }
        RenderTarget::DocxSource => body,
        RenderTarget::Print => standalone(doc, &body, PRINT_PAGE_CSS),
        RenderTarget::PdfSource => standalone(doc, &body, PDF_PAGE_CSS),
    }
}

fn standalone(doc: &ResumeDocument, body: &str, page_css: &str) -> String {
    let title = if doc.identity.name.is_empty() {
        "Resume".to_string()
    } else {
        format!("{} - Resume", escape_html(&doc.identity.name))
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{page_css}{BASE_CSS}</style>\n</head>\n<body>\n<div class=\"resume-document\">{body}</div>\n</body>\n</html>\n"
    )
}
