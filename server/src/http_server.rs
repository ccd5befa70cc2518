use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use anyhow::Context;
use localchat_core::{
    extract_reply, ChatRequest, ChatResponse, ChatResult, ErrorResponse, GenerationError,
    GeneratorRef,
};
use std::future::Future;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

pub const MISSING_MESSAGES: &str = "Please provide a \"messages\" field.";
pub const MODEL_LOADING: &str = "Model is still loading, please try again later.";
pub const INFERENCE_FAILED: &str = "Error processing your request.";

/// Characters of each message and response body echoed to the log
const PREVIEW_CHARS: usize = 20;

/// Error type for HTTP server
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotReady,
    Inference(GenerationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotReady => (StatusCode::SERVICE_UNAVAILABLE, MODEL_LOADING.to_string()),
            Self::Inference(e) => {
                error!(error = %e, "Inference error");
                (StatusCode::INTERNAL_SERVER_ERROR, INFERENCE_FAILED.to_string())
            }
        };
        let body = ErrorResponse { error: message };
        log_response_body(&body);
        (status, Json(body)).into_response()
    }
}

/// First `PREVIEW_CHARS` characters of `text`
pub fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

fn log_response_body<T: serde::Serialize>(body: &T) {
    let json = serde_json::to_string(body).unwrap_or_default();
    info!(" < Response: {}", preview(&json));
}

/// Build the router with all routes and layers
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/chat", post(handle_chat))
        .layer(middleware::from_fn(log_requests))
        .layer(cors)
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve<S>(listener: TcpListener, state: AppState, shutdown: S) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let app = router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run HTTP server: {}", e))
}

/// Serve while `load` produces the generator.
///
/// Requests get 503 until loading completes. A load failure stops the server
/// and is returned; a shutdown during loading returns `Ok` without ever
/// marking the model ready.
pub async fn run_server<L, S>(
    listener: TcpListener,
    state: AppState,
    load: L,
    shutdown: S,
) -> anyhow::Result<()>
where
    L: Future<Output = ChatResult<GeneratorRef>>,
    S: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    let model = state.model.clone();
    let mut server = tokio::spawn(serve(listener, state, shutdown));

    tokio::select! {
        finished = &mut server => {
            finished.context("HTTP server task panicked")??;
            info!("Server stopped before the model finished loading");
            return Ok(());
        }
        loaded = load => match loaded {
            Ok(generator) => {
                model.mark_ready(generator);
                info!("Server is running on http://{}", addr);
            }
            Err(e) => {
                error!(error = %e, "Failed to load model");
                model.mark_failed(e.to_string());
                server.abort();
                return Err(anyhow::anyhow!("Failed to load model: {}", e));
            }
        }
    }

    server.await.context("HTTP server task panicked")??;
    Ok(())
}

/// Resolves on ctrl-c
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Logs every request line, final status and elapsed time
async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    info!("Incoming Request: {} {}", method, uri);

    let response = next.run(req).await;

    info!(
        " < Response Status: {} ({}ms)",
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    response
}

/// Health check handler
async fn health() -> impl IntoResponse {
    "localchat server is running"
}

/// Handler for chat requests
async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let generator = state.model.generator().ok_or(ApiError::NotReady)?;

    let Json(request) = payload.map_err(|rejection| {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    let messages = request
        .messages
        .ok_or_else(|| ApiError::BadRequest(MISSING_MESSAGES.to_string()))?;

    for message in &messages {
        info!(" > {}: {}", message.role, preview(&message.content));
    }

    let result = generator
        .generate(&messages, &state.options)
        .await
        .map_err(ApiError::Inference)?;

    let body = ChatResponse {
        response: extract_reply(&result),
    };
    log_response_body(&body);
    Ok(Json(body))
}
