//! Ingestion for the ETD batch converter.
//!
//! Three concerns live here, all feeding the transform stage:
//! - unpacking the nested batch archive into [`etd_model::RawSubmission`]s,
//! - rendering PDF front matter to plain text,
//! - parsing the vendor bibliographic XML into a
//!   [`etd_model::NormalizedName`].

mod archive;
mod error;
mod metadata;
mod pdf;

pub use archive::{read_batch, read_batch_bytes};
pub use error::{IngestError, Result};
pub use metadata::normalize;
pub use pdf::{DEFAULT_PAGE_COUNT, default_pages, extract_text};
