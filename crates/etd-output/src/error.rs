use thiserror::Error;

/// Merge failures. All of these are fatal to the whole merge: partial
/// output would not validate against the target schema.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("merge structure error: {0}")]
    Structure(String),
    #[error("malformed fragment: {0}")]
    Malformed(String),
    #[error("xml write error: {0}")]
    Write(String),
}

pub type Result<T> = std::result::Result<T, MergeError>;
