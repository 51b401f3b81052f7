//! Controlled-vocabulary loading.

use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use etd_model::MajorVocabulary;
use tracing::debug;

/// Load the institutional majors list: a headerless, single-column CSV of
/// canonical major names. Loaded once at startup; the resulting
/// [`MajorVocabulary`] is read-only for the pipeline's lifetime.
pub fn load_vocabulary(path: &Path) -> Result<MajorVocabulary> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("read majors list: {}", path.display()))?;

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("read majors record: {}", path.display()))?;
        if let Some(first) = record.get(0) {
            entries.push(first.to_string());
        }
    }

    let vocabulary = MajorVocabulary::new(entries);
    debug!(
        majors = vocabulary.len(),
        path = %path.display(),
        "loaded controlled vocabulary"
    );
    Ok(vocabulary)
}
