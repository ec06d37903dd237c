use serde::Serialize;
use thiserror::Error;

/// Top-level error type for the Billscope analysis pipeline.
#[derive(Debug, Error)]
pub enum BillError {
    #[error("failed to extract text from PDF: {0}")]
    Extraction(String),

    #[error("LLM provider error ({provider}): {message}")]
    RemoteCall { provider: String, message: String },

    #[error("failed to parse analysis result: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid upload: {0}")]
    Validation(String),

    #[error("rate limit exceeded for {identity}")]
    RateLimited { identity: String, retry_after_secs: u64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of a [`BillError`], used for logging and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Extraction,
    RemoteCall,
    Parse,
    Io,
    Validation,
    RateLimited,
    Internal,
}

impl BillError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BillError::Extraction(_) => ErrorKind::Extraction,
            BillError::RemoteCall { .. } => ErrorKind::RemoteCall,
            BillError::Parse(_) => ErrorKind::Parse,
            BillError::Io(_) => ErrorKind::Io,
            BillError::Validation(_) => ErrorKind::Validation,
            BillError::RateLimited { .. } => ErrorKind::RateLimited,
            BillError::Other(_) => ErrorKind::Internal,
        }
    }

    /// Whether the error was raised before any processing began
    /// (as opposed to a failure inside the pipeline).
    pub fn is_client_error(&self) -> bool {
        matches!(self, BillError::Validation(_) | BillError::RateLimited { .. })
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Extraction => "extraction",
            ErrorKind::RemoteCall => "remote_call",
            ErrorKind::Parse => "parse",
            ErrorKind::Io => "io",
            ErrorKind::Validation => "validation",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}
