//! The `invalidmajors.csv` report.

use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use etd_model::SubmissionRecord;
use serde::Serialize;
use tracing::info;

/// One failing submission. Serialization order and header names match the
/// legacy ingest system's expectations.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidMajorRow {
    pub title: String,
    #[serde(rename = "lname")]
    pub surname: String,
    #[serde(rename = "fname")]
    pub given_name: String,
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "PDFname")]
    pub pdf_name: String,
    pub majors: String,
}

impl InvalidMajorRow {
    /// Build a report row, coercing absent name parts to the display
    /// sentinel.
    pub fn from_record(record: &SubmissionRecord) -> Self {
        Self {
            title: record.name.title_or_sentinel().to_string(),
            surname: record.name.surname_or_sentinel().to_string(),
            given_name: record.name.given_name_or_sentinel().to_string(),
            filename: record.filename.clone(),
            pdf_name: record.pdf_name.clone(),
            majors: record.majors.clone(),
        }
    }
}

/// Header row, written even when no submission failed.
const HEADER: [&str; 6] = ["title", "lname", "fname", "Filename", "PDFname", "majors"];

/// Write the invalid-majors report: header row always, then one row per
/// submission whose validation failed, in input order. Returns the number
/// of rows written.
pub fn write_invalid_majors(path: &Path, records: &[SubmissionRecord]) -> Result<usize> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("create report: {}", path.display()))?;
    writer.write_record(HEADER).context("write report header")?;

    let mut rows = 0usize;
    for record in records {
        if record.majors_error.is_none() {
            continue;
        }
        writer
            .serialize(InvalidMajorRow::from_record(record))
            .with_context(|| format!("write report row for {}", record.filename))?;
        rows += 1;
    }
    writer.flush().context("flush report")?;

    info!(rows, path = %path.display(), "wrote invalid-majors report");
    Ok(rows)
}
