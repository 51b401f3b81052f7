//! PDF front-matter text extraction.

use lopdf::Document;

use crate::error::{IngestError, Result};

/// Number of leading pages rendered by default. Dissertation front matter
/// (title page, committee page, abstract) fits comfortably in this range.
pub const DEFAULT_PAGE_COUNT: usize = 8;

/// Zero-based indices of the default page range.
pub fn default_pages() -> Vec<usize> {
    (0..DEFAULT_PAGE_COUNT).collect()
}

/// Render the given zero-based pages of a PDF to plain text, preserving line
/// breaks for downstream line-based matching.
///
/// An empty page selection is a caller-selectable no-op and returns an empty
/// string. Indices past the end of the document are silently skipped.
/// Corrupt streams fail with [`IngestError::TextExtraction`], which aborts
/// only the one submission, never the batch.
pub fn extract_text(pdf_bytes: &[u8], pages: &[usize]) -> Result<String> {
    if pages.is_empty() {
        return Ok(String::new());
    }

    let document = Document::load_mem(pdf_bytes)
        .map_err(|error| IngestError::TextExtraction(format!("open pdf: {error}")))?;

    // lopdf numbers pages from 1.
    let available = document.get_pages();
    let mut page_numbers: Vec<u32> = pages
        .iter()
        .filter_map(|index| u32::try_from(index + 1).ok())
        .filter(|number| available.contains_key(number))
        .collect();
    page_numbers.sort_unstable();
    page_numbers.dedup();

    if page_numbers.is_empty() {
        return Ok(String::new());
    }

    document
        .extract_text(&page_numbers)
        .map_err(|error| IngestError::TextExtraction(format!("extract text: {error}")))
}
