use crate::config::ProxyConfig;
use crate::error::{CONTENT_REQUIRED, MISSING_FIELDS};
use crate::humanizer::HumanizerClient;
use crate::langflow::LangflowClient;
use crate::orchestrator::Orchestrator;
use crate::{BlogError, GenerateBlogForm, GenerationRequest, HumanizeResult, publish};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, warn};

type SharedState = Arc<AppState>;

const UNEXPECTED_FORMAT_MESSAGE: &str = "Unexpected response format from AI service";
const GENERATION_FAILED_MESSAGE: &str = "Blog generation failed";
const HUMANIZE_FAILED_MESSAGE: &str = "Humanization failed";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
}

#[derive(Debug)]
pub enum WebError {
    Io(std::io::Error),
    Client(BlogError),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::Io(err) => write!(f, "io error: {err}"),
            WebError::Client(err) => write!(f, "client setup failed: {err}"),
        }
    }
}

impl std::error::Error for WebError {}

impl From<std::io::Error> for WebError {
    fn from(value: std::io::Error) -> Self {
        WebError::Io(value)
    }
}

impl From<BlogError> for WebError {
    fn from(value: BlogError) -> Self {
        WebError::Client(value)
    }
}

pub async fn serve(config: ProxyConfig) -> Result<(), WebError> {
    if config.langflow.token.is_none() {
        warn!("no Langflow token configured; generation requests will be unauthenticated");
    }
    let generator = LangflowClient::new(config.langflow.clone())?;
    let humanizer = HumanizerClient::new(&config.humanizer);
    let orchestrator = Orchestrator::new(Arc::new(generator), Arc::new(humanizer))
        .with_min_humanize_duration(config.humanizer.min_duration);
    let state = Arc::new(AppState { orchestrator });
    let router = build_router(state);
    info!(
        %config.addr,
        langflow = %config.langflow.endpoint(),
        humanizer = %config.humanizer.analyze_url(),
        "Binding HTTP listener"
    );
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// Classifies a failure, keeping upstream detail out of the response.
    fn classify(err: BlogError, fallback: &str) -> Self {
        match err {
            BlogError::Validation(message) => Self::bad_request(message),
            BlogError::ContentExtraction { raw } => {
                error!(%raw, "raw upstream body without expected content");
                Self::internal(UNEXPECTED_FORMAT_MESSAGE)
            }
            other => {
                error!(err = %other, "upstream call failed");
                Self::internal(fallback)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/generate-blog", post(generate_blog))
        .route("/api/humanize", post(humanize))
        .route("/api/publish", post(publish_blog))
        .route("/healthz", get(health))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "blogsmith" }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlogPayload {
    pub blog: String,
}

async fn generate_blog(
    State(state): State<SharedState>,
    body: Result<Json<GenerateBlogForm>, JsonRejection>,
) -> Result<Json<BlogPayload>, ApiError> {
    let Json(form) = body.map_err(|rejection| {
        warn!(%rejection, "unreadable generation body");
        ApiError::bad_request(MISSING_FIELDS)
    })?;
    let request = GenerationRequest::from_form(&form)
        .map_err(|err| ApiError::classify(err, GENERATION_FAILED_MESSAGE))?;
    let content = state
        .orchestrator
        .request_generation(&request)
        .await
        .map_err(|err| ApiError::classify(err, GENERATION_FAILED_MESSAGE))?;
    Ok(Json(BlogPayload {
        blog: content.raw_text,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HumanizeBody {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

async fn humanize(
    State(state): State<SharedState>,
    body: Result<Json<HumanizeBody>, JsonRejection>,
) -> Result<Json<HumanizeResult>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        warn!(%rejection, "unreadable humanize body");
        ApiError::bad_request(CONTENT_REQUIRED)
    })?;
    let result = state
        .orchestrator
        .request_humanization(&body.content, &body.keywords)
        .await
        .map_err(|err| ApiError::classify(err, HUMANIZE_FAILED_MESSAGE))?;
    Ok(Json(result))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublishBody {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublishPayload {
    pub html: String,
}

async fn publish_blog(
    body: Result<Json<PublishBody>, JsonRejection>,
) -> Result<Json<PublishPayload>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        warn!(%rejection, "unreadable publish body");
        ApiError::bad_request(CONTENT_REQUIRED)
    })?;
    if body.content.trim().is_empty() {
        return Err(ApiError::bad_request(CONTENT_REQUIRED));
    }
    let document = publish(&body.content, &body.keywords, &body.urls);
    Ok(Json(PublishPayload {
        html: document.into_html(),
    }))
}
