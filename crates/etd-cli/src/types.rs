//! Result types shared between the pipeline and the summary printer.

use std::path::PathBuf;

/// Outcome of a batch run.
#[derive(Debug)]
pub struct BatchResult {
    /// The batch archive that was processed.
    pub archive: PathBuf,
    /// Merged XML output path, when one was written.
    pub output: Option<PathBuf>,
    /// Invalid-majors report path, when one was written.
    pub report: Option<PathBuf>,
    /// Per-submission summaries in output order.
    pub submissions: Vec<SubmissionSummary>,
    /// Submissions dropped from the batch, with the reason each failed.
    pub errors: Vec<String>,
    /// True when any submission was dropped.
    pub has_errors: bool,
}

/// One row of the batch summary table.
#[derive(Debug)]
pub struct SubmissionSummary {
    /// Submission archive name inside the batch.
    pub filename: String,
    /// Author surname used as the sort key.
    pub surname: String,
    /// Majors extracted from the thesis PDF.
    pub majors: String,
    /// False when the majors failed controlled-list validation.
    pub valid: bool,
}
