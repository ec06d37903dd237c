//! Main HTTP Gateway Server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use billscope_analysis::AnalysisPipeline;
use billscope_config::BillscopeConfig;

use crate::cache::ResponseCache;
use crate::rate_limit::{self, RateLimiter};
use crate::{analyze, control_ui, health_api};

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub pipeline: Arc<AnalysisPipeline>,
    /// `None` disables rate limiting.
    pub rate_limiter: Option<RateLimiter>,
    /// `None` disables response caching.
    pub cache: Option<ResponseCache>,
    pub frontend_dir: Option<PathBuf>,
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl GatewayState {
    pub fn new(pipeline: Arc<AnalysisPipeline>, config: &BillscopeConfig) -> Self {
        let rate_limiter = config
            .rate_limit
            .enabled
            .then(|| RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window_secs));
        let cache = config
            .cache
            .enabled
            .then(|| ResponseCache::new(config.cache.ttl_secs, config.cache.max_entries));

        Self {
            pipeline,
            rate_limiter,
            cache,
            frontend_dir: config.server.frontend_dir.clone(),
            cors_origins: config.server.cors_origins.clone(),
            max_upload_bytes: config.server.max_upload_bytes,
        }
    }
}

/// Builds the full application router.
pub fn build_router(state: GatewayState) -> Router {
    let mut analyze_routes = Router::new()
        .route("/api/analyze/", post(analyze::analyze_bill))
        .route("/api/analyze", post(analyze::analyze_bill));
    if let Some(limiter) = state.rate_limiter.clone() {
        analyze_routes = analyze_routes
            .route_layer(middleware::from_fn_with_state(limiter, rate_limit::enforce));
    }
    let analyze_routes = analyze_routes.layer(DefaultBodyLimit::max(state.max_upload_bytes));

    let mut app = Router::new()
        .route("/", get(control_ui::index))
        .route("/api/health", get(health_api::get_health))
        .merge(analyze_routes);
    if let Some(dir) = &state.frontend_dir {
        app = app.merge(control_ui::asset_router(dir));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.cors_origins))
        .with_state(state)
}

/// Credentialed CORS for the configured origins. A wildcard cannot be
/// combined with credentials, so `*` entries are dropped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Starts the Axum HTTP server and runs until Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Gateway HTTP server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down gateway");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use billscope_analysis::providers::MockProvider;
    use billscope_analysis::PipelineSettings;
    use billscope_understanding::fixtures::text_pdf;
    use billscope_understanding::PdfExtractor;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const REPLY: &str = r#"Here is the analysis:
{"summary":"Cuts income tax.","key_points":["Lowers the basic rate"],"arguments_for":["More take-home pay"],"arguments_against":["Reduces revenue"]}
Let me know if you need more."#;

    struct Harness {
        temp: tempfile::TempDir,
        out: tempfile::TempDir,
        provider: Arc<MockProvider>,
        app: Router,
    }

    impl Harness {
        fn new(provider: MockProvider) -> Self {
            Self::with_config(provider, BillscopeConfig::default())
        }

        fn with_config(provider: MockProvider, config: BillscopeConfig) -> Self {
            let temp = tempfile::tempdir().unwrap();
            let out = tempfile::tempdir().unwrap();
            let provider = Arc::new(provider);
            let pipeline = AnalysisPipeline::new(
                Arc::new(PdfExtractor),
                provider.clone(),
                PipelineSettings {
                    output_dir: out.path().to_path_buf(),
                    temp_dir: temp.path().to_path_buf(),
                    ..PipelineSettings::default()
                },
            );
            let app = build_router(GatewayState::new(Arc::new(pipeline), &config));
            Self {
                temp,
                out,
                provider,
                app,
            }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap()
                .to_vec();
            (status, headers, body)
        }

        fn temp_is_empty(&self) -> bool {
            std::fs::read_dir(self.temp.path()).unwrap().next().is_none()
        }
    }

    fn upload(filename: &str, bytes: &[u8], client: &str) -> Request<Body> {
        let boundary = "billscope-test-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/analyze/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .header("x-forwarded-for", client)
            .body(Body::from(body))
            .unwrap()
    }

    fn json_body(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    fn bill() -> Vec<u8> {
        text_pdf(&["Bill to reduce tax."])
    }

    #[tokio::test]
    async fn analyzes_uploaded_bill() {
        let h = Harness::new(MockProvider::new("mock").with_response(REPLY));

        let (status, _, body) = h.send(upload("bill.pdf", &bill(), "198.51.100.1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json_body(&body),
            json!({
                "summary": "Cuts income tax.",
                "key_points": ["Lowers the basic rate"],
                "arguments_for": ["More take-home pay"],
                "arguments_against": ["Reduces revenue"]
            })
        );

        let report = std::fs::read_to_string(h.out.path().join("analysis_bill.pdf.txt")).unwrap();
        assert_eq!(
            report,
            "Summary:\nCuts income tax.\n\nKey Points:\n- Lowers the basic rate\n\nArguments For:\n- More take-home pay\n\nArguments Against:\n- Reduces revenue\n"
        );
        assert!(h.temp_is_empty());
        assert!(h.provider.last_request().unwrap().user_prompt.contains("Bill to reduce tax."));
    }

    #[tokio::test]
    async fn rejects_non_pdf_without_remote_call() {
        let h = Harness::new(MockProvider::new("mock").with_response(REPLY));

        let (status, _, body) = h.send(upload("notes.txt", b"just notes", "198.51.100.2")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body), json!({ "detail": "Only PDF files are allowed" }));
        assert_eq!(h.provider.calls(), 0);
        assert!(h.temp_is_empty());
    }

    #[tokio::test]
    async fn uppercase_extension_is_accepted() {
        let h = Harness::new(MockProvider::new("mock").with_response(REPLY));
        let (status, _, _) = h.send(upload("BILL.PDF", &bill(), "198.51.100.3")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(h.out.path().join("analysis_BILL.PDF.txt").exists());
    }

    #[tokio::test]
    async fn missing_file_field_is_bad_request() {
        let h = Harness::new(MockProvider::new("mock").with_response(REPLY));
        let boundary = "b";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"comment\"\r\n\r\nhello\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/analyze/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, _, body) = h.send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["detail"], "No file provided");
    }

    #[tokio::test]
    async fn sixth_request_in_a_minute_is_limited() {
        let h = Harness::new(MockProvider::new("mock").with_response(REPLY));

        for _ in 0..5 {
            let (status, _, _) = h.send(upload("bill.pdf", &bill(), "203.0.113.9")).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, headers, body) = h.send(upload("bill.pdf", &bill(), "203.0.113.9")).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json_body(&body), json!({ "detail": "Too Many Requests" }));
        let retry_after: u64 = headers[header::RETRY_AFTER].to_str().unwrap().parse().unwrap();
        assert!((1..=60).contains(&retry_after));
        assert_eq!(h.provider.calls(), 5);

        let (status, _, _) = h.send(upload("bill.pdf", &bill(), "203.0.113.10")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn rate_limit_can_be_disabled() {
        let mut config = BillscopeConfig::default();
        config.rate_limit.enabled = false;
        let h = Harness::with_config(MockProvider::new("mock").with_response(REPLY), config);

        for _ in 0..7 {
            let (status, _, _) = h.send(upload("notes.txt", b"x", "203.0.113.11")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn provider_failure_is_generic_500() {
        let h = Harness::new(MockProvider::new("mock").failing("upstream overloaded"));

        let (status, _, body) = h.send(upload("bill.pdf", &bill(), "198.51.100.4")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(&body),
            json!({ "detail": "An error occurred while processing the file" })
        );
        assert!(h.temp_is_empty());
        assert!(!h.out.path().join("analysis_bill.pdf.txt").exists());
    }

    #[tokio::test]
    async fn unparseable_reply_is_generic_500() {
        let h = Harness::new(MockProvider::new("mock").with_response("I cannot help with that."));
        let (status, _, _) = h.send(upload("bill.pdf", &bill(), "198.51.100.5")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(h.temp_is_empty());
    }

    #[tokio::test]
    async fn cache_serves_repeat_uploads() {
        let mut config = BillscopeConfig::default();
        config.cache.enabled = true;
        let h = Harness::with_config(MockProvider::new("mock").with_response(REPLY), config);

        let pdf = bill();
        let (first, _, first_body) = h.send(upload("bill.pdf", &pdf, "198.51.100.6")).await;
        let (second, _, second_body) = h.send(upload("copy.pdf", &pdf, "198.51.100.6")).await;

        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);
        assert_eq!(first_body, second_body);
        assert_eq!(h.provider.calls(), 1);
        assert!(h.out.path().join("analysis_copy.pdf.txt").exists());
    }

    #[tokio::test]
    async fn root_without_frontend_returns_welcome() {
        let h = Harness::new(MockProvider::new("mock"));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, _, body) = h.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body), json!({ "message": "Welcome to the PDF Analyzer API" }));
    }

    #[tokio::test]
    async fn serves_frontend_build() {
        let ui = tempfile::tempdir().unwrap();
        std::fs::write(ui.path().join("index.html"), "<html>bills</html>").unwrap();
        std::fs::write(ui.path().join("favicon.ico"), [0u8, 0, 1, 0]).unwrap();
        std::fs::create_dir(ui.path().join("static")).unwrap();
        std::fs::write(ui.path().join("static").join("app.js"), "console.log(1)").unwrap();

        let mut config = BillscopeConfig::default();
        config.server.frontend_dir = Some(ui.path().to_path_buf());
        let h = Harness::with_config(MockProvider::new("mock"), config);

        let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, _, body) = h.send(get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<html>bills</html>");

        let (status, _, body) = h.send(get("/favicon.ico")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, [0u8, 0, 1, 0]);

        let (status, _, body) = h.send(get("/static/app.js")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"console.log(1)");

        let (status, _, _) = h.send(get("/static/missing.js")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // `/static` maps to the build's `static/` folder, not the build root.
        std::fs::write(ui.path().join("manifest.json"), "{}").unwrap();
        let (status, _, _) = h.send(get("/static/manifest.json")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_service() {
        let h = Harness::new(MockProvider::new("mock"));
        let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let (status, _, body) = h.send(request).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "billscope");
    }

    #[tokio::test]
    async fn cors_allows_configured_origin_with_credentials() {
        let h = Harness::new(MockProvider::new("mock"));
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/analyze/")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let (_, headers, _) = h.send(request).await;
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }
}
