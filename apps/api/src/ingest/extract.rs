//! Text extraction from uploaded CV files.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type '{0}'. Upload a PDF, DOCX or plain-text file")]
    UnsupportedType(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Could not read DOCX: {0}")]
    Docx(String),

    #[error("File is not valid UTF-8 text")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("No text could be extracted from the document")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

impl DocumentKind {
    /// Picks the extractor from the MIME type, falling back to the file extension.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Result<Self, ExtractError> {
        match content_type.map(|c| c.split(';').next().unwrap_or(c).trim()) {
            Some("application/pdf") => return Ok(DocumentKind::Pdf),
            Some(DOCX_MIME) => return Ok(DocumentKind::Docx),
            Some("text/plain") | Some("text/markdown") => return Ok(DocumentKind::PlainText),
            _ => {}
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();
        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            "txt" | "md" => Ok(DocumentKind::PlainText),
            "" => Err(ExtractError::UnsupportedType(
                content_type.unwrap_or("unknown").to_string(),
            )),
            other => Err(ExtractError::UnsupportedType(format!(".{other}"))),
        }
    }
}

/// Paragraph text of a Word document, one line per paragraph.
fn extract_docx(data: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(data).map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for paragraph_child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = paragraph_child {
                    for run_child in run.children {
                        if let docx_rs::RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

/// Extracts text from a document. PDF and DOCX parsing is CPU-bound; call it from
/// `spawn_blocking` when running on the async runtime.
pub fn extract_text(kind: DocumentKind, data: &[u8]) -> Result<String, ExtractError> {
    let text = match kind {
        // pdf-extract panics on some malformed documents instead of returning an error
        DocumentKind::Pdf => std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data))
            .map_err(|_| ExtractError::Pdf("malformed document".to_string()))?
            .map_err(|e| ExtractError::Pdf(e.to_string()))?,
        DocumentKind::Docx => extract_docx(data)?,
        DocumentKind::PlainText => String::from_utf8(data.to_vec())?,
    };
    let text = normalize_extracted(&text);
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}

/// Unifies line endings, trims trailing spaces, and squeezes runs of blank
/// lines that PDF extraction tends to produce down to one.
pub fn normalize_extracted(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() && out.last().is_some_and(|prev| prev.is_empty()) {
            continue;
        }
        out.push(if line.trim().is_empty() { "" } else { line });
    }
    out.join("\n").trim().to_string()
}
