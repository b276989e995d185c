//! Resume file reading: `.txt`, `.pdf`, `.docx`/`.doc` into plain text.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Text file is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Word document extraction failed: {0}")]
    Docx(String),

    #[error("No text could be extracted from '{0}'")]
    Empty(String),

    #[error("Resume extraction task failed: {0}")]
    Worker(String),
}

/// `read_resume_file` on the blocking pool. PDF and DOCX parsing are CPU-bound,
/// and a panic inside pdf-extract surfaces as `ExtractError::Worker`.
pub async fn read_resume_upload(file_name: String, bytes: Vec<u8>) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || read_resume_file(&file_name, &bytes))
        .await
        .map_err(|e| ExtractError::Worker(e.to_string()))?
}

/// Reads an uploaded resume into plain text, dispatching on the file extension.
pub fn read_resume_file(file_name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "txt" => String::from_utf8(bytes.to_vec())?,
        "pdf" => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::Pdf(e.to_string()))?,
        "docx" | "doc" => read_docx(bytes)?,
        other => {
            let shown = if other.is_empty() { file_name } else { other };
            return Err(ExtractError::UnsupportedFormat(shown.to_string()));
        }
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ExtractError::Empty(file_name.to_string()));
    }

    debug!("Read {} chars from {file_name}", text.len());
    Ok(text)
}

/// Joins the paragraphs of `word/document.xml`, one per line.
fn read_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Docx(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;

    // Whitespace inside runs is significant ("Senior " + "Engineer"), so no trimming here.
    let mut reader = Reader::from_str(&xml);

    let mut buf = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:p" => current.clear(),
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:tab" => current.push('\t'),
            Ok(Event::Text(e)) => {
                current.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => {
                let line = current.trim();
                if !line.is_empty() {
                    paragraphs.push(line.to_string());
                }
                current.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}
