//! Document understanding for Billscope.
//!
//! Turns uploaded PDFs into plain text ready for prompting.

pub mod doc_parse;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use doc_parse::PdfExtractor;
