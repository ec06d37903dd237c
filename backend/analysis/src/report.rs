//! Plain-text analysis reports.

use std::fmt::Write as _;
use std::path::Path;

use billscope_core::{AnalysisResult, BillError};
use tokio::fs;
use tracing::{error, info};

/// Renders the four-section report layout.
pub fn render_report(analysis: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "{}", analysis.summary);

    for (heading, items) in [
        ("Key Points", &analysis.key_points),
        ("Arguments For", &analysis.arguments_for),
        ("Arguments Against", &analysis.arguments_against),
    ] {
        let _ = writeln!(out, "\n{heading}:");
        for item in items {
            let _ = writeln!(out, "- {item}");
        }
    }
    out
}

/// Writes the report to `path`, replacing any existing file.
pub async fn save_report(analysis: &AnalysisResult, path: &Path) -> Result<(), BillError> {
    fs::write(path, render_report(analysis)).await.map_err(|e| {
        error!(path = %path.display(), error = %e, "Error saving analysis to file");
        BillError::Io(e)
    })?;
    info!(path = %path.display(), "Analysis saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            summary: "S".into(),
            key_points: vec!["A".into(), "A2".into()],
            arguments_for: vec!["B".into()],
            arguments_against: vec!["C".into()],
        }
    }

    #[test]
    fn renders_four_sections() {
        let expected = "Summary:\nS\n\nKey Points:\n- A\n- A2\n\nArguments For:\n- B\n\nArguments Against:\n- C\n";
        assert_eq!(render_report(&sample()), expected);
    }

    #[test]
    fn empty_lists_keep_their_headings() {
        let analysis = AnalysisResult {
            summary: "Nothing to see.".into(),
            key_points: vec![],
            arguments_for: vec![],
            arguments_against: vec![],
        };
        let text = render_report(&analysis);
        assert!(text.contains("Key Points:\n\nArguments For:\n\nArguments Against:\n"));
    }

    #[tokio::test]
    async fn save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis_bill.pdf.txt");
        std::fs::write(&path, "stale contents that are much longer than the report").unwrap();

        save_report(&sample(), &path).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), render_report(&sample()));
    }

    #[tokio::test]
    async fn unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("report.txt");
        let err = save_report(&sample(), &path).await.unwrap_err();
        assert_eq!(err.kind(), billscope_core::ErrorKind::Io);
    }
}
