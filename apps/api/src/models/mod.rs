pub mod resume;

pub use resume::{CanonicalEntity, DescriptionValue, Identity, ResumeDocument, SectionKind};
