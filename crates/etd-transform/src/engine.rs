//! External schema-transform boundary.
//!
//! The vendor-to-target mapping is an XSLT 2.0 stylesheet executed by Saxon.
//! The core only needs transformed XML bytes back, so the engine is a small
//! trait with one production implementation that shells out to `java -jar`
//! with an explicit argument vector.

use std::path::PathBuf;
use std::process::Command;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::error::{Result, TransformError};

/// Seam for the external schema mapping. Tests substitute a local double so
/// the pipeline can run without a JVM.
pub trait SchemaTransform {
    /// Map vendor bibliographic XML into the target publication schema.
    fn transform(&self, input_xml: &[u8]) -> Result<Vec<u8>>;
}

/// Saxon-based transform invoked as a separate process. Paths are passed as
/// discrete arguments; no shell ever sees them, so entry names cannot
/// smuggle options in.
#[derive(Debug, Clone)]
pub struct SaxonTransform {
    java: PathBuf,
    jar: PathBuf,
    stylesheet: PathBuf,
}

impl SaxonTransform {
    pub fn new(jar: impl Into<PathBuf>, stylesheet: impl Into<PathBuf>) -> Self {
        Self {
            java: PathBuf::from("java"),
            jar: jar.into(),
            stylesheet: stylesheet.into(),
        }
    }

    /// Override the `java` executable (default: resolved from `PATH`).
    #[must_use]
    pub fn with_java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = java.into();
        self
    }
}

impl SchemaTransform for SaxonTransform {
    fn transform(&self, input_xml: &[u8]) -> Result<Vec<u8>> {
        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("input.xml");
        let output_path = workdir.path().join("output.xml");
        std::fs::write(&input, input_xml)?;

        let output = Command::new(&self.java)
            .arg("-jar")
            .arg(&self.jar)
            .arg("-o")
            .arg(&output_path)
            .arg(&input)
            .arg(&self.stylesheet)
            .output()
            .map_err(TransformError::Launch)?;

        if !output.status.success() {
            return Err(TransformError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let transformed = std::fs::read(&output_path)?;
        check_well_formed(&transformed)?;
        debug!(
            input_len = input_xml.len(),
            output_len = transformed.len(),
            "schema transform complete"
        );
        Ok(transformed)
    }
}

/// Reject transform output that is not a single well-formed document before
/// it reaches injection and merging.
fn check_well_formed(xml: &[u8]) -> Result<()> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut saw_element = false;
    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|error| TransformError::Malformed(error.to_string()))?;
        match event {
            Event::Start(_) | Event::Empty(_) => saw_element = true,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    if saw_element {
        Ok(())
    } else {
        Err(TransformError::Malformed(
            "transform produced no document element".to_string(),
        ))
    }
}
