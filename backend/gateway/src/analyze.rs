//! `POST /api/analyze/`: upload a bill PDF, get the structured analysis back.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::{error, info, warn};

use billscope_analysis::save_report;
use billscope_core::{AnalysisResult, BillError, RequestId, UploadedDocument};
use billscope_logging::{AnalysisEvent, EventLogger};

use crate::error::{ApiError, NO_FILE_DETAIL, ONLY_PDF_DETAIL};
use crate::identity::ClientIdentity;
use crate::server::GatewayState;

/// Multipart field carrying the PDF.
pub const FILE_FIELD: &str = "file";

pub async fn analyze_bill(
    State(state): State<GatewayState>,
    client: ClientIdentity,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    let request_id = RequestId::new();
    let rid = request_id.to_string();
    let document = read_upload(&mut multipart).await?;

    info!(request_id = %rid, client = client.as_str(), filename = %document.filename, "Received file");
    EventLogger::log_event(
        &rid,
        AnalysisEvent::Received {
            filename: document.filename.clone(),
            bytes: document.bytes.len(),
        },
    );

    if !document.has_pdf_extension() {
        return Err(fail(&rid, &document, BillError::Validation(ONLY_PDF_DETAIL.into())));
    }

    if let Some(hit) = cached(&state, &rid, &document).await? {
        return Ok(Json(hit));
    }

    match state.pipeline.analyze_upload_with_id(request_id, &document).await {
        Ok(outcome) => {
            if let Some(cache) = &state.cache {
                cache.insert(document.signature(), outcome.analysis.clone()).await;
            }
            EventLogger::log_event(
                &rid,
                AnalysisEvent::Completed {
                    filename: document.filename.clone(),
                    page_count: outcome.page_count,
                    elapsed_ms: outcome.elapsed.as_millis() as u64,
                    cached: false,
                },
            );
            Ok(Json(outcome.analysis))
        }
        Err(e) => Err(fail(&rid, &document, e)),
    }
}

/// Serves a cached analysis, still writing the report under this upload's name.
async fn cached(
    state: &GatewayState,
    rid: &str,
    document: &UploadedDocument,
) -> Result<Option<AnalysisResult>, ApiError> {
    let Some(cache) = &state.cache else {
        return Ok(None);
    };
    let Some(hit) = cache.get(&document.signature()).await else {
        return Ok(None);
    };

    let report_path = state
        .pipeline
        .settings()
        .output_dir
        .join(document.report_file_name());
    if let Err(e) = save_report(&hit, &report_path).await {
        return Err(fail(rid, document, e));
    }

    EventLogger::log_event(
        rid,
        AnalysisEvent::Completed {
            filename: document.filename.clone(),
            page_count: 0,
            elapsed_ms: 0,
            cached: true,
        },
    );
    Ok(Some(hit))
}

fn fail(rid: &str, document: &UploadedDocument, err: BillError) -> ApiError {
    if err.is_client_error() {
        warn!(request_id = %rid, filename = %document.filename, error = %err, "Rejected upload");
    } else {
        error!(request_id = %rid, kind = %err.kind(), "Failed to analyse upload");
    }
    EventLogger::log_event(
        rid,
        AnalysisEvent::Failed {
            filename: document.filename.clone(),
            error_kind: err.kind().to_string(),
            message: err.to_string(),
        },
    );
    ApiError::from(err)
}

async fn read_upload(multipart: &mut Multipart) -> Result<UploadedDocument, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        return Ok(UploadedDocument::new(filename, bytes.to_vec()));
    }
    Err(ApiError::BadRequest(NO_FILE_DETAIL.into()))
}
