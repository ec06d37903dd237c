use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Structured analysis of a bill as returned by the language model.
///
/// All four fields are required; a reply missing any of them is rejected
/// at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub key_points: Vec<String>,
    pub arguments_for: Vec<String>,
    pub arguments_against: Vec<String>,
}

/// A file received from a client, held in memory for the duration of one request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// True when the filename ends in `.pdf`, ignoring case.
    pub fn has_pdf_extension(&self) -> bool {
        self.filename.to_ascii_lowercase().ends_with(".pdf")
    }

    /// Final path component of the client-supplied filename.
    ///
    /// Both `/` and `\` count as separators so a name like `../../etc/x.pdf`
    /// or `C:\tmp\x.pdf` reduces to `x.pdf`.
    pub fn basename(&self) -> &str {
        let name = self
            .filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.filename);
        match name {
            "" | "." | ".." => "upload.pdf",
            other => other,
        }
    }

    /// Name of the plain-text report written for this upload.
    pub fn report_file_name(&self) -> String {
        format!("analysis_{}.txt", self.basename())
    }

    pub fn signature(&self) -> ContentSignature {
        ContentSignature::of(&self.bytes)
    }
}

/// Identifies a single analysis request.
///
/// Generated fresh for every upload; names the temporary buffer file and is
/// attached to every log event for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic signature of an uploaded document's bytes (UUID v5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentSignature(Uuid);

impl ContentSignature {
    pub fn of(bytes: &[u8]) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, bytes))
    }
}

impl fmt::Display for ContentSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Text extracted from a document, one entry per page in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentText {
    pub pages: Vec<String>,
}

impl DocumentText {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All pages concatenated without separators.
    pub fn text(&self) -> String {
        self.pages.concat()
    }

    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| p.chars().count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(UploadedDocument::new("bill.pdf", vec![]).has_pdf_extension());
        assert!(UploadedDocument::new("BILL.PDF", vec![]).has_pdf_extension());
        assert!(!UploadedDocument::new("notes.txt", vec![]).has_pdf_extension());
        assert!(!UploadedDocument::new("pdf", vec![]).has_pdf_extension());
    }

    #[test]
    fn basename_strips_directories() {
        assert_eq!(UploadedDocument::new("../../etc/bill.pdf", vec![]).basename(), "bill.pdf");
        assert_eq!(UploadedDocument::new(r"C:\tmp\bill.pdf", vec![]).basename(), "bill.pdf");
        assert_eq!(UploadedDocument::new("bill.pdf", vec![]).basename(), "bill.pdf");
        assert_eq!(UploadedDocument::new("dir/", vec![]).basename(), "upload.pdf");
    }

    #[test]
    fn report_name_follows_upload_name() {
        let doc = UploadedDocument::new("bill.pdf", vec![]);
        assert_eq!(doc.report_file_name(), "analysis_bill.pdf.txt");
    }

    #[test]
    fn signature_depends_only_on_bytes() {
        let a = UploadedDocument::new("a.pdf", b"%PDF-1.4 same".to_vec());
        let b = UploadedDocument::new("b.pdf", b"%PDF-1.4 same".to_vec());
        let c = UploadedDocument::new("a.pdf", b"%PDF-1.4 other".to_vec());
        assert_eq!(a.signature(), b.signature());
        assert_ne!(a.signature(), c.signature());
    }

    #[test]
    fn document_text_concatenates_in_order() {
        let doc = DocumentText {
            pages: vec!["first ".into(), "second".into()],
        };
        assert_eq!(doc.text(), "first second");
        assert_eq!(doc.char_count(), doc.text().chars().count());
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn analysis_result_requires_all_keys() {
        let ok: Result<AnalysisResult, _> = serde_json::from_str(
            r#"{"summary":"S","key_points":["A"],"arguments_for":["B"],"arguments_against":["C"]}"#,
        );
        assert!(ok.is_ok());
        let missing: Result<AnalysisResult, _> =
            serde_json::from_str(r#"{"summary":"S","key_points":["A"],"arguments_for":["B"]}"#);
        assert!(missing.is_err());
    }
}
