pub mod error;
pub mod traits;
pub mod types;

pub use error::{BillError, ErrorKind};
pub use traits::{
    ContentBlock, LlmProvider, LlmRequest, LlmResponse, TextExtractor, TokenUsage,
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
};
pub use types::{AnalysisResult, ContentSignature, DocumentText, RequestId, UploadedDocument};
