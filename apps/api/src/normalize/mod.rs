// Resume normalization pipeline.
// Raw payload → assembler → section normalizer (×4) → coercion / description decoder.
// Everything here is synchronous and side-effect free apart from tracing.

pub mod aliases;
pub mod assembler;
pub mod coercion;
pub mod description;
pub mod section;

pub use assembler::{assemble_resume, resolve_payload, section_key};
pub use section::{EntryLocator, SectionForm};
