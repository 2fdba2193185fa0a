//! HTTP Server for the mecgen API.
//!
//! Provides REST endpoints for CSV conversion and XML structure comparison.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/convert`    | Upload CSV, get MEC XML              |
//! | POST   | `/api/compare`    | Upload two XML files, get a diff     |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::{header, Method},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{collections::HashMap, convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{CompareResponse, ConvertResponse};
use crate::config::ServerConfig;
use crate::error::{PipelineError, ServerError, ServerResult};
use crate::transform::pipeline::{compare_documents, convert_bytes, ConvertOptions};

/// Build the application router.
pub fn router(config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/convert", post(convert_csv))
        .route("/api/compare", post(compare_xml))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 mecgen server running on http://localhost:{}", config.port);
    println!("   POST /api/convert - Upload CSV file");
    println!("   POST /api/compare - Compare sample and generated XML");
    println!("   GET  /api/logs    - SSE log stream");
    println!("   GET  /health      - Health check");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "mecgen",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "convert": "POST /api/convert",
            "compare": "POST /api/compare",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Named parts of a multipart body, files as bytes.
struct Upload {
    parts: HashMap<String, Vec<u8>>,
    file_names: HashMap<String, String>,
}

impl Upload {
    async fn read(mut multipart: Multipart) -> ServerResult<Self> {
        let mut parts = HashMap::new();
        let mut file_names = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();
            if let Some(file_name) = field.file_name() {
                file_names.insert(name.clone(), file_name.to_string());
            }
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
            parts.insert(name, bytes.to_vec());
        }

        Ok(Self { parts, file_names })
    }

    fn take(&mut self, name: &str) -> ServerResult<Vec<u8>> {
        self.parts
            .remove(name)
            .ok_or_else(|| ServerError::BadRequest(format!("No '{}' file provided", name)))
    }

    fn take_text(&mut self, name: &str) -> ServerResult<String> {
        let bytes = self.take(name)?;
        String::from_utf8(bytes)
            .map_err(|_| ServerError::BadRequest(format!("'{}' is not valid UTF-8", name)))
    }

    fn flag(&self, name: &str) -> bool {
        self.parts
            .get(name)
            .map(|v| matches!(String::from_utf8_lossy(v).trim(), "true" | "1" | "on"))
            .unwrap_or(false)
    }

    fn file_name(&self, name: &str) -> &str {
        self.file_names.get(name).map(String::as_str).unwrap_or("unknown")
    }
}

/// Run a blocking pipeline step off the async executor.
async fn run_blocking<T, F>(job: F) -> ServerResult<T>
where
    F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    result.map_err(|e| {
        log_error(e.to_string());
        ServerError::from(e)
    })
}

/// Convert CSV endpoint
async fn convert_csv(multipart: Multipart) -> ServerResult<Json<ConvertResponse>> {
    let mut upload = Upload::read(multipart).await?;
    let bytes = upload.take("file")?;
    let options = ConvertOptions {
        skip_validation: upload.flag("skipValidation"),
        allow_violations: upload.flag("allowViolations"),
    };

    println!("\n{}", "=".repeat(70));
    println!("📄 NEW UPLOAD: {} ({} bytes)", upload.file_name("file"), bytes.len());
    println!("{}\n", "=".repeat(70));

    let result = run_blocking(move || convert_bytes(&bytes, &options)).await?;

    Ok(Json(ConvertResponse::from(result)))
}

/// Compare XML structure endpoint
async fn compare_xml(multipart: Multipart) -> ServerResult<Json<CompareResponse>> {
    let mut upload = Upload::read(multipart).await?;
    let sample = upload.take_text("sample")?;
    let generated = upload.take_text("generated")?;

    let diff = run_blocking(move || compare_documents(&sample, &generated)).await?;

    Ok(Json(CompareResponse::from(diff)))
}
