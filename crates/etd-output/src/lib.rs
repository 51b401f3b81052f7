//! Batch output: merging transformed documents into one file.
//!
//! The first fragment supplies the structural root (wrapper element and its
//! namespace declarations); every fragment, the first included, must hold
//! exactly one inner `document` element. The later fragments' documents are
//! appended to the root in input order. The result is
//! serialized with an XML declaration and the legacy `iso-8859-1` encoding
//! the downstream ingestion system requires.

mod error;

use std::io::Cursor;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::info;

pub use error::{MergeError, Result};

/// Declared encoding of the merged document. A binding external-interface
/// requirement of the target ingestion system, not a stylistic choice.
pub const OUTPUT_ENCODING: &str = "iso-8859-1";

/// Merge transformed fragments into a single well-formed document.
///
/// Fails with [`MergeError::Structure`] when the input is empty or when any
/// fragment does not hold exactly one `document` element; the merged root
/// carries exactly one `document` child per input fragment.
pub fn merge_documents(fragments: &[Vec<u8>]) -> Result<Vec<u8>> {
    let (root, rest) = fragments
        .split_first()
        .ok_or_else(|| MergeError::Structure("no fragments to merge".to_string()))?;

    let mut writer = Writer::new(Cursor::new(Vec::new()));
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some(OUTPUT_ENCODING), None)),
    )?;
    emit(&mut writer, Event::Text(BytesText::from_escaped("\n")))?;

    write_root_fragment(&mut writer, root, rest)?;

    let serialized = writer.into_inner().into_inner();
    let text = String::from_utf8(serialized)
        .map_err(|error| MergeError::Malformed(format!("non-utf8 fragment content: {error}")))?;
    Ok(encode_latin1(&text))
}

/// Merge and write to `path`.
pub fn write_merged(path: &Path, fragments: &[Vec<u8>]) -> Result<()> {
    let merged = merge_documents(fragments)?;
    std::fs::write(path, &merged)?;
    info!(
        documents = fragments.len(),
        bytes = merged.len(),
        path = %path.display(),
        "wrote merged output"
    );
    Ok(())
}

/// Copy the first fragment, splicing the other fragments' inner documents
/// in just before the root end tag. The first fragment itself must hold
/// exactly one `document` element, like every other fragment.
fn write_root_fragment(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    root: &[u8],
    rest: &[Vec<u8>],
) -> Result<()> {
    let mut reader = Reader::from_reader(root);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut count = 0usize;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|error| MergeError::Malformed(error.to_string()))?;
        match event {
            // The merged output carries its own declaration.
            Event::Decl(_) => {}
            Event::Start(start) => {
                depth += 1;
                if depth == 2 && start.name().as_ref() == b"document" {
                    count += 1;
                }
                emit(writer, Event::Start(start))?;
            }
            Event::Empty(empty) => {
                if depth == 1 && empty.name().as_ref() == b"document" {
                    count += 1;
                }
                emit(writer, Event::Empty(empty))?;
            }
            Event::End(end) => {
                if depth == 1 {
                    for fragment in rest {
                        append_inner_document(writer, fragment)?;
                    }
                }
                depth -= 1;
                emit(writer, Event::End(end))?;
            }
            Event::Eof => break,
            other => emit(writer, other)?,
        }
        buf.clear();
    }

    if count != 1 {
        return Err(MergeError::Structure(format!(
            "fragment holds {count} document elements, expected exactly 1"
        )));
    }
    Ok(())
}

/// Copy the single `/documents/document` element of a fragment into the
/// writer. Exactly one such element must exist.
fn append_inner_document(writer: &mut Writer<Cursor<Vec<u8>>>, xml: &[u8]) -> Result<()> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut copy_buf = Vec::new();
    let mut depth = 0usize;
    let mut count = 0usize;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|error| MergeError::Malformed(error.to_string()))?;
        match event {
            Event::Start(start) => {
                depth += 1;
                if depth == 1 {
                    if start.name().as_ref() != b"documents" {
                        return Err(MergeError::Structure(
                            "fragment root is not a documents element".to_string(),
                        ));
                    }
                } else if depth == 2 && start.name().as_ref() == b"document" {
                    count += 1;
                    if count == 1 {
                        emit(writer, Event::Start(start))?;
                        copy_subtree(&mut reader, writer, &mut copy_buf)?;
                        depth -= 1;
                    }
                }
            }
            Event::Empty(empty) => {
                if depth == 1 && empty.name().as_ref() == b"document" {
                    count += 1;
                    if count == 1 {
                        emit(writer, Event::Empty(empty))?;
                    }
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if count != 1 {
        return Err(MergeError::Structure(format!(
            "fragment holds {count} document elements, expected exactly 1"
        )));
    }
    Ok(())
}

/// Copy events up to and including the end tag matching an already-copied
/// start tag.
fn copy_subtree(
    reader: &mut Reader<&[u8]>,
    writer: &mut Writer<Cursor<Vec<u8>>>,
    buf: &mut Vec<u8>,
) -> Result<()> {
    let mut depth = 1usize;
    loop {
        let event = reader
            .read_event_into(buf)
            .map_err(|error| MergeError::Malformed(error.to_string()))?;
        match event {
            Event::Start(start) => {
                depth += 1;
                emit(writer, Event::Start(start))?;
            }
            Event::End(end) => {
                depth -= 1;
                emit(writer, Event::End(end))?;
                if depth == 0 {
                    buf.clear();
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(MergeError::Malformed(
                    "unterminated document element".to_string(),
                ));
            }
            other => emit(writer, other)?,
        }
        buf.clear();
    }
}

fn emit(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|error| MergeError::Write(error.to_string()))
}

/// Encode serialized XML into the legacy single-byte charset. Markup stays
/// ASCII; characters outside Latin-1 become numeric character references.
fn encode_latin1(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let code = ch as u32;
        if code <= 0xFF {
            out.push(code as u8);
        } else {
            out.extend_from_slice(format!("&#{code};").as_bytes());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_latin1_passes_ascii_through() {
        assert_eq!(encode_latin1("<a>b</a>"), b"<a>b</a>");
    }

    #[test]
    fn test_encode_latin1_maps_high_latin1_to_single_bytes() {
        assert_eq!(encode_latin1("caf\u{e9}"), b"caf\xe9");
    }

    #[test]
    fn test_encode_latin1_references_non_latin1() {
        assert_eq!(encode_latin1("\u{2014}"), b"&#8212;");
    }
}
