use bytes::Bytes;

use crate::error::{Error, Result};
use crate::services::extractor::html;
use crate::utils::office::{self, OfficeError, ZIP_MAGIC};

const PDF_MAGIC: &[u8] = b"%PDF";

/// A file received through a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    Docx,
    Pptx,
    PlainText,
    Html,
}

impl DocumentKind {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            "txt" | "md" | "csv" => Some(Self::PlainText),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

/// Turns uploaded documents into plain text.
#[derive(Clone)]
pub struct DocumentService {
    max_upload_bytes: usize,
}

impl DocumentService {
    pub fn new(max_upload_bytes: usize) -> Self {
        Self { max_upload_bytes }
    }

    pub async fn extract_text(&self, file: &UploadedFile) -> Result<String> {
        if file.data.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty.".to_string()));
        }
        if file.data.len() > self.max_upload_bytes {
            return Err(Error::BadRequest(format!(
                "Uploaded file exceeds the {} MB size limit.",
                self.max_upload_bytes / (1024 * 1024)
            )));
        }

        let kind = file
            .extension()
            .as_deref()
            .and_then(DocumentKind::from_extension)
            .ok_or_else(|| {
                Error::BadRequest(format!("Unsupported file type: {}", file.filename))
            })?;

        let text = match kind {
            DocumentKind::Pdf => {
                if !file.data.starts_with(PDF_MAGIC) {
                    return Err(Error::BadRequest(
                        "File has a .pdf extension but is not a PDF.".to_string(),
                    ));
                }
                let data = file.data.clone();
                tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
                    .await
                    .map_err(|e| Error::Internal(format!("PDF extraction task failed: {}", e)))?
                    .map_err(|e| Error::BadRequest(format!("Could not read PDF: {}", e)))?
            }
            DocumentKind::Docx => office_text(file, "DOCX", office::docx_text).await?,
            DocumentKind::Pptx => office_text(file, "PPTX", office::pptx_text).await?,
            DocumentKind::PlainText => String::from_utf8_lossy(&file.data).into_owned(),
            DocumentKind::Html => html::page_text(&String::from_utf8_lossy(&file.data)),
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(Error::BadRequest("No text extracted from file.".to_string()));
        }

        tracing::info!(filename = %file.filename, bytes = file.data.len(), chars = text.len(), "Extracted document text");
        Ok(text)
    }
}

/// Office packages are zip archives; the XML walk runs off the async threads.
async fn office_text(
    file: &UploadedFile,
    label: &'static str,
    read: fn(&[u8]) -> std::result::Result<String, OfficeError>,
) -> Result<String> {
    if !file.data.starts_with(ZIP_MAGIC) {
        return Err(Error::BadRequest(format!(
            "File has a .{} extension but is not a {} document.",
            label.to_ascii_lowercase(),
            label
        )));
    }
    let data = file.data.clone();
    tokio::task::spawn_blocking(move || read(&data))
        .await
        .map_err(|e| Error::Internal(format!("{} extraction task failed: {}", label, e)))?
        .map_err(|e| Error::BadRequest(format!("Could not read {}: {}", label, e)))
}
