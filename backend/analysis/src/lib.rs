//! Billscope analysis pipeline.
//!
//! extract → prompt → remote call → parse → persist, with the uploaded file
//! buffered to a temporary path that is removed on every exit path.

pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod report;

pub use parser::{extract_json_object, parse_analysis};
pub use pipeline::{AnalysisOutcome, AnalysisPipeline, PipelineSettings};
pub use prompt::{build_prompt, truncate_chars, MAX_BILL_CHARS, SYSTEM_PROMPT};
pub use report::{render_report, save_report};
