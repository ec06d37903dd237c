use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tempfile::NamedTempFile;
use tracing::{error, info, instrument, warn};

use billscope_core::{
    AnalysisResult, BillError, LlmProvider, LlmRequest, RequestId, TextExtractor, UploadedDocument,
};

use crate::parser::parse_analysis;
use crate::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::providers::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::report::save_report;

/// Knobs the pipeline needs from configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub max_tokens: u32,
    /// Directory that receives `analysis_<name>.txt` reports.
    pub output_dir: PathBuf,
    /// Directory for buffered uploads.
    pub temp_dir: PathBuf,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            output_dir: PathBuf::from("."),
            temp_dir: std::env::temp_dir(),
        }
    }
}

/// Result of one successful pipeline run.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub request_id: RequestId,
    pub analysis: AnalysisResult,
    pub report_path: PathBuf,
    pub page_count: usize,
    pub elapsed: Duration,
}

/// The single-pass bill analysis pipeline.
///
/// Owns no per-request state; one instance is shared by all requests.
pub struct AnalysisPipeline {
    extractor: Arc<dyn TextExtractor>,
    provider: Arc<dyn LlmProvider>,
    settings: PipelineSettings,
}

impl AnalysisPipeline {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        provider: Arc<dyn LlmProvider>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            extractor,
            provider,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Buffers an upload to a temporary file, runs the pipeline on it, and
    /// removes the temporary file whatever the outcome.
    pub async fn analyze_upload(
        &self,
        document: &UploadedDocument,
    ) -> Result<AnalysisOutcome, BillError> {
        self.analyze_upload_with_id(RequestId::new(), document).await
    }

    /// Same as [`Self::analyze_upload`] under a caller-assigned request id.
    #[instrument(skip(self, document), fields(filename = %document.filename, bytes = document.bytes.len()))]
    pub async fn analyze_upload_with_id(
        &self,
        request_id: RequestId,
        document: &UploadedDocument,
    ) -> Result<AnalysisOutcome, BillError> {
        let start = Instant::now();

        // NamedTempFile deletes on drop, covering early returns and panics.
        let buffer = self.buffer_upload(request_id, &document.bytes).await?;
        let report_path = self.settings.output_dir.join(document.report_file_name());

        let result = self.process(buffer.path(), &report_path).await;

        let temp_path = buffer.path().to_path_buf();
        if let Err(e) = buffer.close() {
            warn!(path = %temp_path.display(), error = %e, "Failed to remove buffered upload");
        }

        let (analysis, page_count) = result.inspect_err(|e| {
            error!(request_id = %request_id, kind = %e.kind(), "Error processing file");
        })?;

        let elapsed = start.elapsed();
        info!(
            request_id = %request_id,
            elapsed_secs = %format!("{:.2}", elapsed.as_secs_f64()),
            "File processed"
        );

        Ok(AnalysisOutcome {
            request_id,
            analysis,
            report_path,
            page_count,
            elapsed,
        })
    }

    /// Runs the pipeline on a PDF already on disk. Nothing is buffered or deleted.
    #[instrument(skip(self))]
    pub async fn analyze_file(&self, pdf_path: &Path) -> Result<AnalysisOutcome, BillError> {
        let start = Instant::now();
        let name = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());
        let report_path = self
            .settings
            .output_dir
            .join(UploadedDocument::new(name, Vec::new()).report_file_name());

        let (analysis, page_count) = self.process(pdf_path, &report_path).await?;
        Ok(AnalysisOutcome {
            request_id: RequestId::new(),
            analysis,
            report_path,
            page_count,
            elapsed: start.elapsed(),
        })
    }

    async fn buffer_upload(
        &self,
        request_id: RequestId,
        bytes: &[u8],
    ) -> Result<NamedTempFile, BillError> {
        let buffer = tempfile::Builder::new()
            .prefix(&format!("upload_{request_id}_"))
            .suffix(".pdf")
            .tempfile_in(&self.settings.temp_dir)?;
        tokio::fs::write(buffer.path(), bytes).await?;
        Ok(buffer)
    }

    async fn process(
        &self,
        pdf_path: &Path,
        report_path: &Path,
    ) -> Result<(AnalysisResult, usize), BillError> {
        let extractor = Arc::clone(&self.extractor);
        let path = pdf_path.to_path_buf();
        let document = tokio::task::spawn_blocking(move || extractor.extract(&path))
            .await
            .map_err(|e| BillError::Other(anyhow!("extraction task failed: {e}")))?
            .inspect_err(|e| error!(error = %e, "Error reading PDF"))?;

        let request = LlmRequest {
            model: self.settings.model.clone(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: build_prompt(&document.text()),
            max_tokens: self.settings.max_tokens,
        };

        let response = self.provider.complete(&request).await.map_err(|e| {
            error!(provider = %self.provider.name(), error = %e, "Error analysing bill with provider");
            BillError::RemoteCall {
                provider: self.provider.name().to_string(),
                message: format!("{e:#}"),
            }
        })?;
        info!(
            provider = %response.provider,
            model = %response.model,
            latency_ms = response.latency_ms,
            "Response created"
        );

        let analysis = parse_analysis(&response)?;
        save_report(&analysis, report_path).await?;
        Ok((analysis, document.page_count()))
    }
}
