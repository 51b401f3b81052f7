use thiserror::Error;

/// Ingestion failures, split by pipeline consequence: `ArchiveFormat` is
/// fatal to the whole batch, the others abort only the one submission.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive format error: {0}")]
    ArchiveFormat(String),
    #[error("text extraction error: {0}")]
    TextExtraction(String),
    #[error("metadata error: {0}")]
    Metadata(String),
    #[error("{submission}: no member matching {marker}")]
    MissingEntry { submission: String, marker: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
