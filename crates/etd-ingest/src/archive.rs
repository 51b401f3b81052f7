//! Nested-archive unpacker for vendor submission batches.

use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use etd_model::RawSubmission;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Read a top-level batch archive whose entries are themselves zip archives,
/// one per submission, in entry order.
///
/// The whole batch fails with [`IngestError::ArchiveFormat`] if the outer
/// archive is malformed or empty, or if any entry is not itself a valid
/// archive. There is no partial-success mode at this stage; a bad entry
/// means the vendor delivery is broken.
pub fn read_batch(path: &Path) -> Result<Vec<RawSubmission>> {
    let data = fs::read(path)?;
    read_batch_bytes(&data)
}

/// Same contract as [`read_batch`], for an archive already in memory.
pub fn read_batch_bytes(data: &[u8]) -> Result<Vec<RawSubmission>> {
    let mut outer = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|error| IngestError::ArchiveFormat(format!("open batch archive: {error}")))?;

    let mut submissions = Vec::new();
    for index in 0..outer.len() {
        let mut entry = outer
            .by_index(index)
            .map_err(|error| IngestError::ArchiveFormat(format!("read entry {index}: {error}")))?;
        if entry.is_dir() {
            continue;
        }
        let id = entry.name().to_string();
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|error| IngestError::ArchiveFormat(format!("{id}: {error}")))?;
        submissions.push(read_submission(&id, &bytes)?);
    }

    if submissions.is_empty() {
        return Err(IngestError::ArchiveFormat(
            "batch archive contains no submissions".to_string(),
        ));
    }
    Ok(submissions)
}

/// Unpack one inner submission archive into member-name -> bytes.
fn read_submission(id: &str, data: &[u8]) -> Result<RawSubmission> {
    let mut inner = zip::ZipArchive::new(Cursor::new(data)).map_err(|error| {
        IngestError::ArchiveFormat(format!("{id}: entry is not a valid archive: {error}"))
    })?;

    let mut files = BTreeMap::new();
    for index in 0..inner.len() {
        let mut member = inner.by_index(index).map_err(|error| {
            IngestError::ArchiveFormat(format!("{id}: read member {index}: {error}"))
        })?;
        if member.is_dir() {
            continue;
        }
        let name = member.name().to_string();
        let mut bytes = Vec::new();
        member
            .read_to_end(&mut bytes)
            .map_err(|error| IngestError::ArchiveFormat(format!("{id}/{name}: {error}")))?;
        files.insert(name, bytes);
    }

    debug!(submission = %id, member_count = files.len(), "unpacked submission");
    Ok(RawSubmission {
        id: id.to_string(),
        files,
    })
}
