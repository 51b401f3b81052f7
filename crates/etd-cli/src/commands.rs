use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span};

use etd_transform::{SaxonTransform, SchemaTransform};
use etd_validate::{ValidationPolicy, load_vocabulary};

use crate::cli::{BatchArgs, MajorsArgs};
use crate::pipeline::{
    OutputResult, ProcessOptions, ProcessResult, ValidateResult, output, process, unpack, validate,
};
use crate::summary::apply_table_style;
use crate::types::{BatchResult, SubmissionSummary};

pub fn run_majors(args: &MajorsArgs) -> Result<()> {
    let vocabulary = load_vocabulary(&args.majors_list).context("load majors list")?;
    let mut table = Table::new();
    table.set_header(vec!["Major"]);
    apply_table_style(&mut table);
    for major in vocabulary.iter() {
        table.add_row(vec![major]);
    }
    println!("{table}");
    println!("{} majors", vocabulary.len());
    Ok(())
}

pub fn run_batch(args: &BatchArgs) -> Result<BatchResult> {
    let engine = SaxonTransform::new(&args.saxon_jar, &args.stylesheet);
    run_batch_with(args, &engine)
}

/// Batch run with the schema transform supplied by the caller, so tests can
/// substitute a local double for Saxon.
pub fn run_batch_with(args: &BatchArgs, transform: &dyn SchemaTransform) -> Result<BatchResult> {
    let batch_span = info_span!("batch", archive = %args.archive.display());
    let _batch_guard = batch_span.enter();
    let batch_start = Instant::now();

    let vocabulary = load_vocabulary(&args.majors_list).context("load majors list")?;
    let policy = if args.validate_all_majors {
        ValidationPolicy::AllValues
    } else {
        ValidationPolicy::FirstValue
    };

    // =========================================================================
    // Stage 1: Unpack
    // =========================================================================
    let unpack_span = info_span!("unpack", archive = %args.archive.display());
    let submissions = unpack_span.in_scope(|| unpack(&args.archive))?;

    // =========================================================================
    // Stage 2: Process
    // =========================================================================
    let options = ProcessOptions {
        transform,
        pages: (0..args.pdf_pages).collect(),
    };
    let process_span = info_span!("process", submissions = submissions.len());
    let process_start = Instant::now();
    let ProcessResult {
        mut records,
        errors,
    } = process_span.in_scope(|| process(&submissions, &options));
    info!(
        duration_ms = process_start.elapsed().as_millis() as u64,
        "process stage complete"
    );

    // =========================================================================
    // Stage 3: Validate
    // =========================================================================
    let validate_span = info_span!("validate", records = records.len());
    let ValidateResult {
        invalid,
        errors: validate_errors,
    } = validate_span.in_scope(|| validate(&mut records, &vocabulary, policy));

    // =========================================================================
    // Stage 4: Output
    // =========================================================================
    let output_span = info_span!("output", records = records.len());
    let OutputResult {
        output: output_path,
        report: report_path,
        invalid_rows: _,
    } = output_span.in_scope(|| {
        output(&mut records, &args.output, &args.report, args.dry_run)
    })?;

    let submissions = records
        .iter()
        .map(|record| SubmissionSummary {
            filename: record.filename.clone(),
            surname: record.name.surname_or_sentinel().to_string(),
            majors: record.majors.clone(),
            valid: record.majors_error.is_none(),
        })
        .collect();

    let mut all_errors = errors;
    all_errors.extend(validate_errors);
    let has_errors = !all_errors.is_empty();
    info!(
        duration_ms = batch_start.elapsed().as_millis() as u64,
        records = records.len(),
        invalid,
        dropped = all_errors.len(),
        "batch complete"
    );

    Ok(BatchResult {
        archive: args.archive.clone(),
        output: output_path,
        report: report_path,
        submissions,
        errors: all_errors,
        has_errors,
    })
}
