//! Core data model for the ETD batch converter.
//!
//! Value types shared across the pipeline crates: parsed author names, the
//! per-submission unit of work, and the controlled vocabulary of academic
//! majors. Nothing in here performs I/O.

mod name;
mod record;
mod vocabulary;

pub use name::{NONE_SENTINEL, NormalizedName, title_case};
pub use record::{RawSubmission, SubmissionRecord};
pub use vocabulary::MajorVocabulary;
