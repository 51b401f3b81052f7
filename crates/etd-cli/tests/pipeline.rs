//! End-to-end pipeline tests with a local stylesheet double standing in for
//! Saxon, so no JVM is needed.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use etd_cli::cli::BatchArgs;
use etd_cli::commands::run_batch_with;
use etd_cli::pipeline::{output, validate};
use etd_model::{MajorVocabulary, NormalizedName, SubmissionRecord};
use etd_transform::SchemaTransform;
use etd_validate::ValidationPolicy;

/// Stand-in for the Saxon stylesheet: maps the vendor surname into a
/// minimal target-schema document.
struct StylesheetDouble;

impl SchemaTransform for StylesheetDouble {
    fn transform(&self, input_xml: &[u8]) -> etd_transform::Result<Vec<u8>> {
        let text = String::from_utf8_lossy(input_xml);
        let surname = text_between(&text, "<DISS_surname>", "</DISS_surname>").unwrap_or("NONE");
        Ok(format!(
            "<documents><document><fields>\
             <field type=\"string\" name=\"author1_lname\"><value>{surname}</value></field>\
             </fields></document></documents>"
        )
        .into_bytes())
    }
}

fn text_between<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = text.find(open)? + open.len();
    let end = text[start..].find(close)? + start;
    Some(&text[start..end])
}

fn vendor_xml(surname: &str) -> Vec<u8> {
    format!(
        "<DISS_submission>\
         <DISS_description><DISS_title>{surname} Thesis</DISS_title></DISS_description>\
         <DISS_authorship><DISS_author><DISS_name>\
         <DISS_surname>{surname}</DISS_surname><DISS_fname>Pat</DISS_fname>\
         </DISS_name></DISS_author></DISS_authorship>\
         </DISS_submission>"
    )
    .into_bytes()
}

fn zip_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, bytes) in members {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Write a batch archive holding one inner zip per submission. Each
/// submission gets a vendor XML member and a placeholder PDF member.
fn write_batch(dir: &Path, surnames: &[&str]) -> PathBuf {
    let inner: Vec<(String, Vec<u8>)> = surnames
        .iter()
        .map(|surname| {
            let xml = vendor_xml(surname);
            let members = [
                (format!("{surname}_DATA.xml"), xml),
                (format!("{surname}.pdf"), b"%PDF-1.4 placeholder".to_vec()),
            ];
            let refs: Vec<(&str, &[u8])> = members
                .iter()
                .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
                .collect();
            (format!("{surname}.zip"), zip_bytes(&refs))
        })
        .collect();
    let members: Vec<(&str, &[u8])> = inner
        .iter()
        .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
        .collect();

    let path = dir.join("batch.zip");
    fs::write(&path, zip_bytes(&members)).unwrap();
    path
}

fn batch_args(dir: &Path, archive: PathBuf) -> BatchArgs {
    let majors_list = dir.join("majors.csv");
    fs::write(&majors_list, "Statistics\nComputer Science\n").unwrap();
    BatchArgs {
        archive,
        output: dir.join("outfile.xml"),
        report: dir.join("invalidmajors.csv"),
        majors_list,
        stylesheet: dir.join("transform.xsl"),
        saxon_jar: dir.join("saxon9.jar"),
        // Placeholder PDFs are not parseable, so text extraction stays off.
        pdf_pages: 0,
        validate_all_majors: false,
        dry_run: false,
    }
}

/// Texts of `author1_lname` values, in document order.
fn lname_values(xml: &[u8]) -> Vec<String> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut values = Vec::new();
    let mut in_lname = false;
    let mut in_value = false;
    let mut current = String::new();
    loop {
        match reader.read_event_into(&mut buf).unwrap() {
            Event::Start(e) if e.name().as_ref() == b"field" => {
                in_lname = e
                    .try_get_attribute("name")
                    .unwrap()
                    .is_some_and(|attr| attr.value.as_ref() == b"author1_lname");
            }
            Event::Start(e) if e.name().as_ref() == b"value" && in_lname => {
                in_value = true;
                current.clear();
            }
            Event::Text(e) if in_value => current.push_str(&e.xml_content().unwrap()),
            Event::End(e) if e.name().as_ref() == b"value" && in_value => {
                in_value = false;
                values.push(current.clone());
            }
            Event::End(e) if e.name().as_ref() == b"field" => in_lname = false,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    values
}

fn document_count(xml: &[u8]) -> usize {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut count = 0usize;
    loop {
        match reader.read_event_into(&mut buf).unwrap() {
            Event::Start(e) => {
                depth += 1;
                if depth == 2 && e.name().as_ref() == b"document" {
                    count += 1;
                }
            }
            Event::End(_) => depth -= 1,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    count
}

#[test]
fn test_batch_sorts_by_surname_and_merges() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_batch(dir.path(), &["Smith", "Adams", "Zorn"]);
    let args = batch_args(dir.path(), archive);

    let result = run_batch_with(&args, &StylesheetDouble).unwrap();

    assert!(!result.has_errors);
    assert!(result.errors.is_empty());
    let surnames: Vec<&str> = result
        .submissions
        .iter()
        .map(|s| s.surname.as_str())
        .collect();
    assert_eq!(surnames, ["Adams", "Smith", "Zorn"]);

    let merged = fs::read(result.output.as_ref().unwrap()).unwrap();
    assert_eq!(document_count(&merged), 3);
    assert_eq!(lname_values(&merged), ["Adams", "Smith", "Zorn"]);

    // No majors were extracted, so nothing failed validation.
    let report = fs::read_to_string(result.report.as_ref().unwrap()).unwrap();
    assert_eq!(
        report.trim_end(),
        "title,lname,fname,Filename,PDFname,majors"
    );
}

#[test]
fn test_batch_summaries_use_member_names() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_batch(dir.path(), &["Adams"]);
    let args = batch_args(dir.path(), archive);

    let result = run_batch_with(&args, &StylesheetDouble).unwrap();

    assert_eq!(result.submissions.len(), 1);
    assert_eq!(result.submissions[0].filename, "Adams_DATA.xml");
    assert!(result.submissions[0].valid);
}

#[test]
fn test_submission_without_pdf_is_dropped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let adams_xml = vendor_xml("Adams");
    let smith_xml = vendor_xml("Smith");
    let adams = zip_bytes(&[
        ("Adams_DATA.xml", adams_xml.as_slice()),
        ("Adams.pdf", b"%PDF-1.4 placeholder".as_slice()),
    ]);
    let smith = zip_bytes(&[("Smith_DATA.xml", smith_xml.as_slice())]);
    let batch = zip_bytes(&[("Adams.zip", adams.as_slice()), ("Smith.zip", smith.as_slice())]);
    let archive = dir.path().join("batch.zip");
    fs::write(&archive, batch).unwrap();
    let args = batch_args(dir.path(), archive);

    let result = run_batch_with(&args, &StylesheetDouble).unwrap();

    assert!(result.has_errors);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("Smith.zip"));
    assert_eq!(result.submissions.len(), 1);
    assert_eq!(result.submissions[0].surname, "Adams");

    let merged = fs::read(result.output.as_ref().unwrap()).unwrap();
    assert_eq!(document_count(&merged), 1);
}

#[test]
fn test_batch_with_no_survivors_fails() {
    let dir = tempfile::tempdir().unwrap();
    let smith_xml = vendor_xml("Smith");
    let smith = zip_bytes(&[("Smith_DATA.xml", smith_xml.as_slice())]);
    let batch = zip_bytes(&[("Smith.zip", smith.as_slice())]);
    let archive = dir.path().join("batch.zip");
    fs::write(&archive, batch).unwrap();
    let args = batch_args(dir.path(), archive);

    let error = run_batch_with(&args, &StylesheetDouble).unwrap_err();
    assert!(error.to_string().contains("no submissions survived"));
}

#[test]
fn test_non_zip_archive_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("batch.tar");
    fs::write(&archive, b"not a zip").unwrap();
    let args = batch_args(dir.path(), archive);

    let error = run_batch_with(&args, &StylesheetDouble).unwrap_err();
    assert!(error.to_string().contains(".zip"));
}

#[test]
fn test_dry_run_writes_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_batch(dir.path(), &["Adams", "Smith"]);
    let mut args = batch_args(dir.path(), archive);
    args.dry_run = true;

    let result = run_batch_with(&args, &StylesheetDouble).unwrap();

    assert!(result.output.is_none());
    assert!(result.report.is_none());
    assert_eq!(result.submissions.len(), 2);
    assert!(!dir.path().join("outfile.xml").exists());
    assert!(!dir.path().join("invalidmajors.csv").exists());
}

// ---------------------------------------------------------------------------
// Validate and output stages driven directly, bypassing PDF extraction.
// ---------------------------------------------------------------------------

fn record(surname: &str, majors: &str) -> SubmissionRecord {
    // One value element per semicolon-separated major, as injection emits.
    let values: String = majors
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| format!("<value>{part}</value>"))
        .collect();
    let transformed = format!(
        "<documents><document><fields>\
         <field type=\"string\" name=\"author1_lname\"><value>{surname}</value></field>\
         <field type=\"string\" name=\"major\">{values}</field>\
         </fields></document></documents>"
    )
    .into_bytes();
    SubmissionRecord {
        filename: format!("{surname}_DATA.xml"),
        pdf_name: format!("{surname}.pdf"),
        source_xml: Vec::new(),
        name: NormalizedName {
            title: Some(format!("{surname} Thesis")),
            surname: Some(surname.to_string()),
            given_name: Some("Pat".to_string()),
            middle_name: None,
        },
        pdf_text: String::new(),
        transformed_xml: transformed,
        majors: majors.to_string(),
        majors_error: None,
    }
}

#[test]
fn test_invalid_major_is_reported_but_still_merged() {
    let dir = tempfile::tempdir().unwrap();
    let vocabulary = MajorVocabulary::new(["Statistics"]);
    let mut records = vec![
        record("Smith", "Basket Weaving"),
        record("Adams", "Statistics"),
    ];

    let outcome = validate(&mut records, &vocabulary, ValidationPolicy::FirstValue);
    assert_eq!(outcome.invalid, 1);
    assert!(outcome.errors.is_empty());

    let output_path = dir.path().join("outfile.xml");
    let report_path = dir.path().join("invalidmajors.csv");
    let result = output(&mut records, &output_path, &report_path, false).unwrap();
    assert_eq!(result.invalid_rows, 1);

    // The flagged submission stays in the merge; the report is the only
    // place it is singled out.
    let merged = fs::read(&output_path).unwrap();
    assert_eq!(document_count(&merged), 2);
    assert_eq!(lname_values(&merged), ["Adams", "Smith"]);

    let report = fs::read_to_string(&report_path).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("Smith Thesis,Smith,Pat,"));
    assert!(lines[1].ends_with(",Basket Weaving"));
}

#[test]
fn test_validate_all_values_policy_flags_any_unknown() {
    let vocabulary = MajorVocabulary::new(["Statistics", "Mathematics"]);
    let mut records = vec![record("Lee", "Statistics; Basket Weaving")];

    // First-value policy accepts the record.
    let outcome = validate(&mut records, &vocabulary, ValidationPolicy::FirstValue);
    assert_eq!(outcome.invalid, 0);

    // All-values policy rejects it.
    records[0].majors_error = None;
    let outcome = validate(&mut records, &vocabulary, ValidationPolicy::AllValues);
    assert_eq!(outcome.invalid, 1);
}
