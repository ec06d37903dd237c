//! Parsing of model replies into [`AnalysisResult`] records.

use billscope_core::{AnalysisResult, BillError, LlmResponse};
use tracing::{debug, error};

/// Returns the slice from the first `{` to the last `}` (inclusive).
///
/// Fails when either brace is missing or the last `}` precedes the first `{`.
pub fn extract_json_object(text: &str) -> Result<&str, BillError> {
    let start = text
        .find('{')
        .ok_or_else(|| BillError::Parse("no '{' in model reply".into()))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| BillError::Parse("no '}' in model reply".into()))?;
    if end < start {
        return Err(BillError::Parse("'}' appears before '{' in model reply".into()));
    }
    Ok(&text[start..=end])
}

/// Parses the first text block of `response` as an analysis record.
///
/// Every key must be present with the right shape; anything else fails.
pub fn parse_analysis(response: &LlmResponse) -> Result<AnalysisResult, BillError> {
    let text = response
        .first_text()
        .ok_or_else(|| BillError::Parse("model reply has no text content".into()))?;

    let json = extract_json_object(text).inspect_err(|e| {
        error!(error = %e, "Failed to locate JSON object in analysis reply");
    })?;

    let analysis: AnalysisResult = serde_json::from_str(json).map_err(|e| {
        error!(error = %e, "Failed to parse analysis result as JSON");
        BillError::Parse(e.to_string())
    })?;

    debug!(
        key_points = analysis.key_points.len(),
        arguments_for = analysis.arguments_for.len(),
        arguments_against = analysis.arguments_against.len(),
        "Parsed analysis"
    );
    Ok(analysis)
}
