//! Validation stage of the ETD batch converter.
//!
//! Checks each transformed document's `major` field against the controlled
//! vocabulary and writes the legacy `invalidmajors.csv` report. Validation
//! is a pure read: it labels records, it never mutates documents or aborts
//! the run.

mod check;
mod report;
mod vocabulary;

pub use check::{INVALID_MAJOR, ValidationPolicy, check_major};
pub use report::{InvalidMajorRow, write_invalid_majors};
pub use vocabulary::load_vocabulary;
