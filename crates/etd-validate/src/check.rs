//! Major-field validation against the controlled vocabulary.

use anyhow::{Result, anyhow};
use etd_model::MajorVocabulary;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Label attached to a submission whose major failed validation.
pub const INVALID_MAJOR: &str = "Invalid Major";

/// How many of a document's major values are checked.
///
/// The extraction heuristic supports multiple semicolon-joined majors, but
/// the observed reference behavior only ever judged the first value. Which
/// is correct is an open question, so both are supported; `FirstValue` is
/// the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Check only the first `value` found (observed behavior).
    #[default]
    FirstValue,
    /// Flag the document if any value is unknown.
    AllValues,
}

/// Check a transformed document's `major` field against the vocabulary.
///
/// An absent field (or one with no values) passes; absence is not an error.
/// Returns [`INVALID_MAJOR`] when the checked value(s) are not in the
/// vocabulary. Never mutates the document.
pub fn check_major(
    xml: &[u8],
    vocabulary: &MajorVocabulary,
    policy: ValidationPolicy,
) -> Result<Option<&'static str>> {
    let values = major_values(xml)?;
    let invalid = match policy {
        ValidationPolicy::FirstValue => values
            .first()
            .is_some_and(|value| !vocabulary.contains(value)),
        ValidationPolicy::AllValues => values.iter().any(|value| !vocabulary.contains(value)),
    };
    Ok(invalid.then_some(INVALID_MAJOR))
}

/// Texts of all `value` children of `major` fields, in document order.
fn major_values(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut values = Vec::new();
    let mut field_depth = 0usize;
    let mut in_major = false;
    let mut in_value = false;
    let mut current = String::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|error| anyhow!("parse transformed document: {error}"))?;
        match event {
            Event::Start(start) => {
                if start.name().as_ref() == b"field" {
                    field_depth += 1;
                    in_major = start
                        .attributes()
                        .flatten()
                        .any(|a| a.key.as_ref() == b"name" && a.value.as_ref() == b"major");
                } else if in_major && start.name().as_ref() == b"value" {
                    in_value = true;
                    current.clear();
                }
            }
            Event::Text(text) => {
                if in_value {
                    let decoded = text
                        .xml_content()
                        .map_err(|error| anyhow!("decode value text: {error}"))?;
                    current.push_str(&decoded);
                }
            }
            Event::GeneralRef(entity) => {
                if in_value && let Some(ch) = entity_char(entity.as_ref()) {
                    current.push(ch);
                }
            }
            Event::End(end) => {
                if in_value && end.name().as_ref() == b"value" {
                    values.push(current.clone());
                    in_value = false;
                } else if end.name().as_ref() == b"field" && field_depth > 0 {
                    field_depth -= 1;
                    in_major = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(values)
}

/// Predefined entities and numeric character references.
fn entity_char(raw: &[u8]) -> Option<char> {
    match raw {
        b"amp" => Some('&'),
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"apos" => Some('\''),
        b"quot" => Some('"'),
        _ => {
            let text = std::str::from_utf8(raw).ok()?;
            let digits = text.strip_prefix('#')?;
            let code = if let Some(hex) = digits
                .strip_prefix('x')
                .or_else(|| digits.strip_prefix('X'))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                digits.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
