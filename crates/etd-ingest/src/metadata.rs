//! Bibliographic XML parsing.
//!
//! The vendor delivers ProQuest `DISS_submission` documents. Only the four
//! name-related fields are pulled out here; the raw XML itself is kept
//! verbatim on the record for the schema transform.

use std::collections::BTreeMap;

use etd_model::NormalizedName;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{IngestError, Result};

/// Declarative mapping from document paths to name fields. The first
/// occurrence of each path wins (multi-author documents credit the first
/// author, matching the target schema).
const FIELD_PATHS: &[(&str, &str)] = &[
    ("title", "DISS_submission/DISS_description/DISS_title"),
    (
        "surname",
        "DISS_submission/DISS_authorship/DISS_author/DISS_name/DISS_surname",
    ),
    (
        "given_name",
        "DISS_submission/DISS_authorship/DISS_author/DISS_name/DISS_fname",
    ),
    (
        "middle_name",
        "DISS_submission/DISS_authorship/DISS_author/DISS_name/DISS_middle",
    ),
];

/// Parse a submission's bibliographic XML into a [`NormalizedName`].
///
/// Missing or empty elements stay `None`; coercion to a display sentinel is
/// deferred to sort/report time. Malformed XML fails the one submission with
/// [`IngestError::Metadata`].
pub fn normalize(xml: &[u8]) -> Result<NormalizedName> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut collected: BTreeMap<&'static str, String> = BTreeMap::new();
    let mut done: Vec<&'static str> = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|error| IngestError::Metadata(format!("parse bibliographic xml: {error}")))?;
        match event {
            Event::Start(start) => {
                path.push(String::from_utf8_lossy(start.name().as_ref()).into_owned());
            }
            Event::Text(text) => {
                if let Some(field) = active_field(&path, &done) {
                    let value = text.xml_content().map_err(|error| {
                        IngestError::Metadata(format!("decode text: {error}"))
                    })?;
                    collected.entry(field).or_default().push_str(&value);
                }
            }
            Event::GeneralRef(entity) => {
                if let Some(field) = active_field(&path, &done) {
                    if let Some(ch) = entity_char(entity.as_ref()) {
                        collected.entry(field).or_default().push(ch);
                    }
                }
            }
            Event::End(_) => {
                let joined = path.join("/");
                for (field, field_path) in FIELD_PATHS {
                    if *field_path == joined && collected.contains_key(field) {
                        done.push(field);
                    }
                }
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let mut take = |field: &str| -> Option<String> {
        collected
            .remove(field)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    Ok(NormalizedName {
        title: take("title"),
        surname: take("surname"),
        given_name: take("given_name"),
        middle_name: take("middle_name"),
    })
}

/// Field whose mapped path is the current element or one of its ancestors,
/// excluding fields already finalized.
fn active_field(path: &[String], done: &[&'static str]) -> Option<&'static str> {
    let joined = path.join("/");
    FIELD_PATHS
        .iter()
        .find(|(field, field_path)| {
            !done.contains(field)
                && (joined == *field_path
                    || joined
                        .strip_prefix(field_path)
                        .is_some_and(|rest| rest.starts_with('/')))
        })
        .map(|(field, _)| *field)
}

/// Resolve a general entity reference to its character, covering the five
/// predefined entities and numeric character references.
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

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DISS_submission>
  <DISS_authorship>
    <DISS_author>
      <DISS_name>
        <DISS_surname>Smith</DISS_surname>
        <DISS_fname>jane</DISS_fname>
        <DISS_middle>Q</DISS_middle>
      </DISS_name>
    </DISS_author>
  </DISS_authorship>
  <DISS_description>
    <DISS_title>Adaptive Widgets in the Wild</DISS_title>
  </DISS_description>
</DISS_submission>"#;

    #[test]
    fn test_normalize_all_fields() {
        let name = normalize(SAMPLE.as_bytes()).unwrap();
        assert_eq!(name.title.as_deref(), Some("Adaptive Widgets in the Wild"));
        assert_eq!(name.surname.as_deref(), Some("Smith"));
        assert_eq!(name.given_name.as_deref(), Some("jane"));
        assert_eq!(name.middle_name.as_deref(), Some("Q"));
    }

    #[test]
    fn test_normalize_missing_middle_name_is_none() {
        let xml = r#"<DISS_submission>
  <DISS_authorship><DISS_author><DISS_name>
    <DISS_surname>Adams</DISS_surname>
    <DISS_fname>John</DISS_fname>
  </DISS_name></DISS_author></DISS_authorship>
  <DISS_description><DISS_title>T</DISS_title></DISS_description>
</DISS_submission>"#;
        let name = normalize(xml.as_bytes()).unwrap();
        assert_eq!(name.surname.as_deref(), Some("Adams"));
        assert_eq!(name.middle_name, None);
    }

    #[test]
    fn test_normalize_first_author_wins() {
        let xml = r#"<DISS_submission>
  <DISS_authorship>
    <DISS_author><DISS_name><DISS_surname>First</DISS_surname></DISS_name></DISS_author>
    <DISS_author><DISS_name><DISS_surname>Second</DISS_surname></DISS_name></DISS_author>
  </DISS_authorship>
</DISS_submission>"#;
        let name = normalize(xml.as_bytes()).unwrap();
        assert_eq!(name.surname.as_deref(), Some("First"));
    }

    #[test]
    fn test_normalize_decodes_entities() {
        let xml = r#"<DISS_submission>
  <DISS_description><DISS_title>Bits &amp; Pieces</DISS_title></DISS_description>
</DISS_submission>"#;
        let name = normalize(xml.as_bytes()).unwrap();
        assert_eq!(name.title.as_deref(), Some("Bits & Pieces"));
    }

    #[test]
    fn test_normalize_malformed_xml_fails() {
        let error = normalize(b"<DISS_submission><DISS_title></oops>").unwrap_err();
        assert!(matches!(error, IngestError::Metadata(_)));
    }

    #[test]
    fn test_normalize_empty_elements_are_none() {
        let xml = r#"<DISS_submission>
  <DISS_authorship><DISS_author><DISS_name>
    <DISS_surname>  </DISS_surname>
  </DISS_name></DISS_author></DISS_authorship>
</DISS_submission>"#;
        let name = normalize(xml.as_bytes()).unwrap();
        assert_eq!(name.surname, None);
    }
}
