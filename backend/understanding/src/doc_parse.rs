//! PDF Text Extraction
//!
//! Opens a PDF with `lopdf` and pulls the text of every page, in page order.

use std::path::Path;

use billscope_core::{BillError, DocumentText, TextExtractor};
use lopdf::Document;
use tracing::{debug, info, warn};

/// Extracts page text from PDF files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Opens a PDF document and returns the text of each page.
    ///
    /// The document is dropped before this function returns, whichever
    /// branch is taken.
    pub fn parse_pdf(path: &Path) -> Result<DocumentText, BillError> {
        info!("Parsing PDF document: {}", path.display());

        let doc = Document::load(path).map_err(|e| {
            BillError::Extraction(format!("cannot open {}: {e}", path.display()))
        })?;

        // BTreeMap keyed by 1-based page number, so iteration is in page order.
        let pages = doc.get_pages();
        let mut texts = Vec::with_capacity(pages.len());

        for &page_number in pages.keys() {
            let text = doc.extract_text(&[page_number]).map_err(|e| {
                warn!(page = page_number, error = %e, "Failed to extract page text");
                BillError::Extraction(format!(
                    "page {page_number} of {} could not be decoded: {e}",
                    path.display()
                ))
            })?;
            texts.push(text);
        }

        let text = DocumentText { pages: texts };
        debug!(
            pages = text.page_count(),
            chars = text.char_count(),
            "Extracted PDF text"
        );
        Ok(text)
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<DocumentText, BillError> {
        Self::parse_pdf(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::text_pdf;
    use billscope_core::ErrorKind;

    fn write_pdf(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn extracts_single_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(&dir, "bill.pdf", &text_pdf(&["Bill to reduce tax."]));

        let text = PdfExtractor.extract(&path).unwrap();
        assert_eq!(text.page_count(), 1);
        assert!(text.text().contains("Bill to reduce tax."));
    }

    #[test]
    fn preserves_page_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(&dir, "multi.pdf", &text_pdf(&["Alpha clause", "Omega clause"]));

        let text = PdfExtractor.extract(&path).unwrap();
        assert_eq!(text.page_count(), 2);
        assert!(text.pages[0].contains("Alpha"));
        assert!(text.pages[1].contains("Omega"));

        let joined = text.text();
        assert!(joined.find("Alpha").unwrap() < joined.find("Omega").unwrap());
        assert!(joined.chars().count() <= text.pages.iter().map(|p| p.chars().count()).sum());
    }

    #[test]
    fn rejects_non_pdf_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(&dir, "fake.pdf", b"this is plainly not a pdf");

        let err = PdfExtractor.extract(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Extraction);
    }

    #[test]
    fn one_unreadable_page_fails_the_document() {
        let mut doc = Document::load_mem(&text_pdf(&["Section one of the bill.", "Section two."]))
            .unwrap();
        let second_page = doc.get_pages()[&2];
        doc.get_object_mut(second_page)
            .and_then(|page| page.as_dict_mut())
            .unwrap()
            .set("Contents", lopdf::Object::Reference((9999, 0)));
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(&dir, "broken.pdf", &bytes);

        let err = PdfExtractor.extract(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert!(err.to_string().contains("page 2"));
    }

    #[test]
    fn missing_file_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PdfExtractor
            .extract(&dir.path().join("absent.pdf"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Extraction);
    }
}
