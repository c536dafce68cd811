//! DOCX processor: reads `word/document.xml` out of the OOXML zip and
//! collects `<w:t>` runs, one output line per `<w:p>` paragraph.

use std::io::Read;
use std::path::Path;

use docsift_core::models::DocumentContent;
use quick_xml::events::Event;

use super::{base_metadata, extension_of, ExtractError, FormatProcessor};

/// Maximum decompressed bytes read from `word/document.xml` (zip-bomb guard).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

pub struct DocxProcessor;

impl FormatProcessor for DocxProcessor {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["docx"]
    }

    fn read(&self, path: &Path) -> Result<DocumentContent, ExtractError> {
        let bytes = std::fs::read(path)?;
        let xml = read_document_xml(&bytes)?;
        let (text, paragraphs) = extract_paragraphs(&xml)?;
        let mut metadata = base_metadata(path, bytes.len() as u64, &text);
        metadata.insert("paragraph_count".to_string(), paragraphs.to_string());
        Ok(DocumentContent::new(text, extension_of(path), metadata))
    }
}

fn read_document_xml(bytes: &[u8]) -> Result<Vec<u8>, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractError::Ooxml("word/document.xml not found".to_string()))?;
    let mut out = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut out)
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    if out.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Ooxml(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }
    Ok(out)
}

/// Returns the text (paragraphs joined by `\n`) and the number of non-empty
/// paragraphs.
fn extract_paragraphs(xml: &[u8]) -> Result<(String, usize), ExtractError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::Text(te)) if in_text => {
                let text = te
                    .unescape()
                    .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if !current.trim().is_empty() {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"tab" => current.push('\t'),
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    if !current.trim().is_empty() {
        paragraphs.push(current);
    }
    let count = paragraphs.len();
    Ok((paragraphs.join("\n"), count))
}
