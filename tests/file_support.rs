//! Multi-format extraction through the registry and the CLI: PDF and DOCX
//! fixtures are built in memory so no binary files live in the repo.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use docsift_core::Error;
use docsift::registry::ProcessorRegistry;
use tempfile::TempDir;

fn docsift_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.push("docsift");
    path
}

/// Minimal valid PDF with a single text run. Object offsets are computed
/// while writing so the xref table is exact.
fn minimal_pdf_with_text(phrase: &str) -> Vec<u8> {
    let stream = format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET", phrase);
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let o1 = out.len();
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    let o2 = out.len();
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    let o3 = out.len();
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    let o4 = out.len();
    out.extend_from_slice(
        format!(
            "4 0 obj << /Length {} >> stream\n{}\nendstream endobj\n",
            stream.len(),
            stream
        )
        .as_bytes(),
    );
    let o5 = out.len();
    out.extend_from_slice(
        b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
    );
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in [o1, o2, o3, o4, o5] {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

/// Minimal docx: a zip holding `word/document.xml` with one paragraph per
/// entry of `paragraphs`.
fn minimal_docx(paragraphs: &[&str]) -> Vec<u8> {
    use std::io::Write;
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        let xml = format!(
            "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{}</w:body></w:document>",
            body
        );
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

fn run_docsift(args: &[&str]) -> (String, String, bool) {
    let binary = docsift_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg("/nonexistent/docsift.toml")
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run docsift binary at {:?}: {}", binary, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn docx_paragraphs_become_lines() {
    let tmp = TempDir::new().unwrap();
    let path = write(
        tmp.path(),
        "memo.docx",
        &minimal_docx(&["Quarterly memo", "Revenue grew."]),
    );
    let content = ProcessorRegistry::with_defaults()
        .process_document(&path)
        .unwrap();
    assert_eq!(content.file_type, "docx");
    assert!(content.text.contains("Quarterly memo\nRevenue grew."));
    assert_eq!(content.metadata["paragraph_count"], "2");
}

#[test]
fn docx_without_document_xml_fails_extraction() {
    use std::io::Write;
    let tmp = TempDir::new().unwrap();
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.start_file("readme.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"not a word file").unwrap();
        zip.finish().unwrap();
    }
    let path = write(tmp.path(), "fake.docx", &buf);
    let err = ProcessorRegistry::with_defaults()
        .process_document(&path)
        .unwrap_err();
    assert!(matches!(err, Error::ExtractionFailed { .. }));
}

#[test]
fn pdf_text_is_extracted() {
    let tmp = TempDir::new().unwrap();
    let path = write(
        tmp.path(),
        "report.pdf",
        &minimal_pdf_with_text("pdf test phrase"),
    );
    let content = ProcessorRegistry::with_defaults()
        .process_document(&path)
        .unwrap();
    assert_eq!(content.file_type, "pdf");
    assert!(content.text.contains("pdf test phrase"), "got: {:?}", content.text);
}

#[test]
fn corrupt_pdf_fails_extraction() {
    let tmp = TempDir::new().unwrap();
    let path = write(tmp.path(), "broken.pdf", b"%PDF-1.4\nthis is not a pdf");
    assert!(matches!(
        ProcessorRegistry::with_defaults().process_document(&path),
        Err(Error::ExtractionFailed { .. })
    ));
}

#[test]
fn cli_searches_docx_and_pdf() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "memo.docx", &minimal_docx(&["office test phrase"]));
    write(tmp.path(), "report.pdf", &minimal_pdf_with_text("office test phrase"));
    write(tmp.path(), "notes.txt", b"nothing relevant\n");

    let (stdout, stderr, success) =
        run_docsift(&["search", "office test", tmp.path().to_str().unwrap()]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("memo.docx"));
    assert!(stdout.contains("report.pdf"));
    assert!(!stdout.contains("notes.txt"));
}

#[test]
fn cli_converts_docx_to_markdown() {
    let tmp = TempDir::new().unwrap();
    let input = write(tmp.path(), "memo.docx", &minimal_docx(&["Hello from Word"]));
    let output = tmp.path().join("memo.md");
    let (_, stderr, success) = run_docsift(&[
        "convert",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
    ]);
    assert!(success, "convert failed: {}", stderr);
    let md = fs::read_to_string(&output).unwrap();
    assert!(md.contains("Hello from Word"));
    assert!(md.contains("memo.docx"));
}
