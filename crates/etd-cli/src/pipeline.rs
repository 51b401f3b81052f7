//! Batch processing pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Unpack**: Read the nested batch archive into raw submissions
//! 2. **Process**: Per submission, extract PDF text, parse metadata, run the
//!    schema transform, and inject the derived `major` and `rights_holder`
//!    fields
//! 3. **Validate**: Check each document's majors against the controlled list
//! 4. **Output**: Sort by surname, write the invalid-majors report, and merge
//!    every surviving document into the batch XML
//!
//! A submission that fails in stage 2 is dropped from the batch and reported;
//! the rest of the batch keeps going. Stage 1 and stage 4 failures are fatal.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use etd_ingest::{IngestError, extract_text, normalize, read_batch};
use etd_model::{MajorVocabulary, RawSubmission, SubmissionRecord};
use etd_output::write_merged;
use etd_transform::{SchemaTransform, find_major, inject_field};
use etd_validate::{ValidationPolicy, check_major, write_invalid_majors};

// ============================================================================
// Stage 1: Unpack
// ============================================================================

/// Read the batch archive into raw submissions.
///
/// The archive must be a zip whose entries are themselves zip files, one per
/// submission. Anything else is fatal to the run.
pub fn unpack(archive: &Path) -> Result<Vec<RawSubmission>> {
    if archive
        .extension()
        .is_none_or(|ext| !ext.eq_ignore_ascii_case("zip"))
    {
        bail!(
            "{} is not a .zip file; the batch must be uploaded as a zip of submission zips",
            archive.display()
        );
    }
    let submissions =
        read_batch(archive).with_context(|| format!("unpack batch {}", archive.display()))?;
    info!(submissions = submissions.len(), "unpacked batch archive");
    Ok(submissions)
}

// ============================================================================
// Stage 2: Process
// ============================================================================

/// Inputs shared by every submission in the process stage.
pub struct ProcessOptions<'a> {
    /// Schema transform executing the vendor-to-target stylesheet.
    pub transform: &'a dyn SchemaTransform,
    /// Zero-based PDF page indices scanned for major declarations. Empty
    /// disables PDF text extraction.
    pub pages: Vec<usize>,
}

/// Result of the process stage.
pub struct ProcessResult {
    /// Fully processed submissions, in archive order.
    pub records: Vec<SubmissionRecord>,
    /// One entry per dropped submission.
    pub errors: Vec<String>,
}

/// Process every submission, isolating failures to the submission that
/// raised them.
pub fn process(submissions: &[RawSubmission], options: &ProcessOptions<'_>) -> ProcessResult {
    let mut records = Vec::with_capacity(submissions.len());
    let mut errors = Vec::new();

    let progress = ProgressBar::new(submissions.len() as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        progress.set_style(style.progress_chars("=> "));
    }

    for submission in submissions {
        progress.set_message(submission.id.clone());
        match process_submission(submission, options) {
            Ok(record) => records.push(record),
            Err(error) => {
                warn!(submission = %submission.id, %error, "submission dropped");
                errors.push(format!("{}: {error:#}", submission.id));
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!(
        processed = records.len(),
        dropped = errors.len(),
        "processed submissions"
    );
    ProcessResult { records, errors }
}

fn process_submission(
    submission: &RawSubmission,
    options: &ProcessOptions<'_>,
) -> Result<SubmissionRecord> {
    let (filename, xml_bytes) = required_member(submission, ".xml")?;
    let (pdf_name, pdf_bytes) = required_member(submission, ".pdf")?;

    let name = normalize(xml_bytes).with_context(|| format!("parse metadata in {filename}"))?;
    let pdf_text = extract_text(pdf_bytes, &options.pages)
        .with_context(|| format!("extract text from {pdf_name}"))?;

    let transformed = options
        .transform
        .transform(xml_bytes)
        .with_context(|| format!("schema transform of {filename}"))?;

    let majors = find_major(pdf_text.lines());
    let transformed = inject_field(&transformed, "major", &majors).context("inject major")?;
    let rights_holder = name.rights_holder();
    let transformed =
        inject_field(&transformed, "rights_holder", &rights_holder).context("inject rights_holder")?;

    debug!(submission = %submission.id, majors = %majors, "submission processed");
    Ok(SubmissionRecord {
        filename: filename.to_string(),
        pdf_name: pdf_name.to_string(),
        source_xml: xml_bytes.to_vec(),
        name,
        pdf_text,
        transformed_xml: transformed,
        majors,
        majors_error: None,
    })
}

fn required_member<'a>(
    submission: &'a RawSubmission,
    marker: &str,
) -> std::result::Result<(&'a str, &'a [u8]), IngestError> {
    submission
        .member_with_extension(marker)
        .ok_or_else(|| IngestError::MissingEntry {
            submission: submission.id.clone(),
            marker: marker.to_string(),
        })
}

// ============================================================================
// Stage 3: Validate
// ============================================================================

/// Result of the validate stage.
pub struct ValidateResult {
    /// Submissions whose majors failed the controlled-list check.
    pub invalid: usize,
    /// Documents that could not be checked at all.
    pub errors: Vec<String>,
}

/// Label every record whose majors are not in the controlled vocabulary.
///
/// Validation never drops a record: flagged submissions stay in the merge
/// and are listed in the report for manual review.
pub fn validate(
    records: &mut [SubmissionRecord],
    vocabulary: &MajorVocabulary,
    policy: ValidationPolicy,
) -> ValidateResult {
    let mut invalid = 0usize;
    let mut errors = Vec::new();

    for record in records.iter_mut() {
        match check_major(&record.transformed_xml, vocabulary, policy) {
            Ok(Some(label)) => {
                warn!(
                    filename = %record.filename,
                    majors = %record.majors,
                    "major not in controlled list"
                );
                record.majors_error = Some(label.to_string());
                invalid += 1;
            }
            Ok(None) => {}
            Err(error) => errors.push(format!("{}: {error:#}", record.filename)),
        }
    }

    info!(checked = records.len(), invalid, "validated majors");
    ValidateResult { invalid, errors }
}

// ============================================================================
// Stage 4: Output
// ============================================================================

/// Result of the output stage.
pub struct OutputResult {
    /// Merged XML path, `None` on a dry run.
    pub output: Option<PathBuf>,
    /// Report path, `None` on a dry run.
    pub report: Option<PathBuf>,
    /// Rows written to the report.
    pub invalid_rows: usize,
}

/// Sort the batch, write the invalid-majors report, and merge every record
/// into the batch XML.
pub fn output(
    records: &mut Vec<SubmissionRecord>,
    output_path: &Path,
    report_path: &Path,
    dry_run: bool,
) -> Result<OutputResult> {
    if records.is_empty() {
        bail!("no submissions survived processing; nothing to merge");
    }
    sort_records(records);

    if dry_run {
        info!("dry run: skipping output files");
        return Ok(OutputResult {
            output: None,
            report: None,
            invalid_rows: 0,
        });
    }

    let invalid_rows =
        write_invalid_majors(report_path, records).context("write invalid-majors report")?;
    let fragments: Vec<Vec<u8>> = records
        .iter()
        .map(|record| record.transformed_xml.clone())
        .collect();
    write_merged(output_path, &fragments)
        .with_context(|| format!("write merged output {}", output_path.display()))?;

    Ok(OutputResult {
        output: Some(output_path.to_path_buf()),
        report: Some(report_path.to_path_buf()),
        invalid_rows,
    })
}

/// Stable sort by author surname, ascending. Records without a surname sort
/// under the display sentinel, matching the report's rendering of them.
pub fn sort_records(records: &mut [SubmissionRecord]) {
    records.sort_by(|a, b| {
        a.name
            .surname_or_sentinel()
            .cmp(b.name.surname_or_sentinel())
    });
}
