//! Transform stage of the ETD batch converter.
//!
//! Covers the external schema-transform boundary (Saxon XSLT invoked as a
//! separate process), the heuristic major extraction from PDF text, and
//! injection of derived fields into the transformed documents.

mod engine;
mod error;
mod inject;
mod major;

pub use engine::{SaxonTransform, SchemaTransform};
pub use error::{Result, TransformError};
pub use inject::inject_field;
pub use major::find_major;
