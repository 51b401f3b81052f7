//! Derived-field injection into transformed documents.
//!
//! The target schema carries per-document metadata as
//! `<fields><field name=".." type="string"><value>..</value></field></fields>`.
//! Injection rewrites the document stream: existing fields with the target
//! name are dropped, and a freshly built field is appended to the first
//! `fields` container.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, TransformError};

/// Replace or create the named schema field in a transformed document.
///
/// Idempotent per field name: any existing `field` with the same name
/// directly under a `fields` container is removed, so re-running replaces
/// rather than duplicates. The new field is declared `type="string"` and
/// holds one `value` child per non-empty trimmed `;`-separated part of
/// `value`, in split order. All other content passes through untouched.
pub fn inject_field(xml: &[u8], field_name: &str, value: &str) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();
    let mut skip_buf = Vec::new();
    // Names of currently open elements, excluding skipped subtrees.
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut injected = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|error| TransformError::Malformed(error.to_string()))?;
        match event {
            Event::Start(start) => {
                let inside_fields = open.last().is_some_and(|name| name == b"fields");
                if inside_fields && is_named_field(&start, field_name) {
                    skip_subtree(&mut reader, &mut skip_buf)?;
                } else {
                    open.push(start.name().as_ref().to_vec());
                    emit(&mut writer, Event::Start(start))?;
                }
            }
            Event::Empty(empty) => {
                let inside_fields = open.last().is_some_and(|name| name == b"fields");
                if inside_fields && is_named_field(&empty, field_name) {
                    // Dropped; replacement is appended at the container end.
                } else if empty.name().as_ref() == b"fields" && !injected {
                    // Self-closed container: expand it to hold the new field.
                    emit(&mut writer, Event::Start(empty))?;
                    write_field(&mut writer, field_name, value)?;
                    emit(&mut writer, Event::End(BytesEnd::new("fields")))?;
                    injected = true;
                } else {
                    emit(&mut writer, Event::Empty(empty))?;
                }
            }
            Event::End(end) => {
                if !injected
                    && end.name().as_ref() == b"fields"
                    && open.last().is_some_and(|name| name == b"fields")
                {
                    write_field(&mut writer, field_name, value)?;
                    injected = true;
                }
                open.pop();
                emit(&mut writer, Event::End(end))?;
            }
            Event::Eof => break,
            other => emit(&mut writer, other)?,
        }
        buf.clear();
    }

    if !injected {
        return Err(TransformError::Malformed(
            "document has no fields container".to_string(),
        ));
    }
    Ok(writer.into_inner().into_inner())
}

fn emit(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|error| TransformError::Write(error.to_string()))
}

/// `field` element carrying a `name` attribute equal to `field_name`.
fn is_named_field(element: &BytesStart<'_>, field_name: &str) -> bool {
    if element.name().as_ref() != b"field" {
        return false;
    }
    element.attributes().flatten().any(|attribute| {
        attribute.key.as_ref() == b"name" && attribute.value.as_ref() == field_name.as_bytes()
    })
}

/// Consume events up to and including the end tag matching an already-read
/// start tag.
fn skip_subtree(reader: &mut Reader<&[u8]>, buf: &mut Vec<u8>) -> Result<()> {
    let mut depth = 1usize;
    loop {
        let event = reader
            .read_event_into(buf)
            .map_err(|error| TransformError::Malformed(error.to_string()))?;
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    buf.clear();
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(TransformError::Malformed(
                    "unterminated field element".to_string(),
                ));
            }
            _ => {}
        }
        buf.clear();
    }
}

/// Append `<field type="string" name="..">` with one `value` per non-empty
/// trimmed `;`-separated part.
fn write_field(writer: &mut Writer<Cursor<Vec<u8>>>, field_name: &str, value: &str) -> Result<()> {
    let mut field = BytesStart::new("field");
    field.push_attribute(("type", "string"));
    field.push_attribute(("name", field_name));
    emit(writer, Event::Start(field))?;
    for part in value.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        emit(writer, Event::Start(BytesStart::new("value")))?;
        emit(writer, Event::Text(BytesText::new(part)))?;
        emit(writer, Event::End(BytesEnd::new("value")))?;
    }
    emit(writer, Event::End(BytesEnd::new("field")))
}
