//! Per-submission unit-of-work types.

use std::collections::BTreeMap;

use crate::name::NormalizedName;

/// One inner vendor package: the archive entry name plus the raw bytes of
/// its members keyed by member name. Created by the unpacker, consumed
/// immediately by the extraction steps, never persisted.
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
    /// Source archive entry name.
    pub id: String,
    /// Member name to raw bytes.
    pub files: BTreeMap<String, Vec<u8>>,
}

impl RawSubmission {
    /// First member whose name contains the given extension marker
    /// (e.g. ".pdf"). Matching is by substring, per the vendor's naming
    /// convention; unrecognized members are simply never asked for.
    pub fn member_with_extension(&self, marker: &str) -> Option<(&str, &[u8])> {
        self.files
            .iter()
            .find(|(name, _)| name.contains(marker))
            .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
    }
}

/// The unit of work carried through the pipeline. Each stage owns the record
/// exclusively while processing it; injection steps replace
/// `transformed_xml` wholesale rather than editing it in place.
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
    /// Bibliographic XML member name (the report's `Filename` column).
    pub filename: String,
    /// PDF member name.
    pub pdf_name: String,
    /// Raw bibliographic XML, retained verbatim.
    pub source_xml: Vec<u8>,
    /// Name parts parsed from the bibliographic XML.
    pub name: NormalizedName,
    /// Plain-text rendering of the PDF front matter.
    pub pdf_text: String,
    /// Schema-transformed XML. Exactly one per submission.
    pub transformed_xml: Vec<u8>,
    /// Semicolon-joined majors derived from the PDF text.
    pub majors: String,
    /// Set when the majors failed vocabulary validation.
    pub majors_error: Option<String>,
}
