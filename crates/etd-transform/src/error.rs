use std::process::ExitStatus;

use thiserror::Error;

/// Failures in the transform stage. All of these are fatal to the one
/// submission being transformed, never to the batch.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to launch transform process: {0}")]
    Launch(#[source] std::io::Error),
    #[error("transform process exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("malformed xml: {0}")]
    Malformed(String),
    #[error("xml write error: {0}")]
    Write(String),
}

pub type Result<T> = std::result::Result<T, TransformError>;
