use crate::agent::{ AgentError, DebateAgent };
use crate::cli::Args;
use std::error::Error;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use axum::{
    routing::{ delete, get, post },
    Router,
    extract::{ Path, State },
    response::IntoResponse,
    http::StatusCode,
    Json,
};
use chrono::Utc;
use governor::{RateLimiter, Quota, state::{InMemoryState, NotKeyed}, clock::DefaultClock};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use log::{info, warn, error};

lazy_static! {
    static ref REQUEST_LIMITER: RateLimiter<NotKeyed, InMemoryState, DefaultClock> =
        RateLimiter::direct(Quota::per_second(NonZeroU32::new(10).unwrap()));
}

#[derive(Deserialize)]
pub struct ChatRequest {
    /// Omitted on the first message of a session; the server then mints one.
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    session_id: String,
    reply: String,
    timestamp: i64,
}

#[derive(Serialize)]
struct ApiError {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Clone)]
struct AppState {
    agent: Arc<DebateAgent>,
}

pub async fn serve(
    addr: &str,
    agent: Arc<DebateAgent>,
    args: &Args,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;

    let app_state = AppState { agent };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/history/{session_id}", get(history_handler))
        .route("/api/session/{session_id}", delete(end_session_handler))
        .route("/api/health", get(health_handler))
        .layer(cors)
        .with_state(app_state);

    if args.enable_tls && args.tls_cert_path.is_some() && args.tls_key_path.is_some() {
        let cert_path = args.tls_cert_path.as_ref().unwrap();
        let key_path = args.tls_key_path.as_ref().unwrap();

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            cert_path,
            key_path
        ).await?;

        info!("HTTPS server listening on: https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await?;
    } else {
        if args.enable_tls {
            error!("--enable-tls was set but certificate/key paths are incomplete.");
            return Err("Missing TLS certificate or key path".into());
        }
        info!("HTTP server listening on: http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    if REQUEST_LIMITER.check().is_err() {
        warn!("Request rate limit exceeded. Rejecting chat request.");
        return (StatusCode::TOO_MANY_REQUESTS, Json(ApiError {
            error: "Too many requests".into(),
        })).into_response();
    }

    let session_id = req
        .session_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match state.agent.process_message(&session_id, &req.message).await {
        Ok(reply) => (StatusCode::OK, Json(ChatResponse {
            session_id,
            reply,
            timestamp: Utc::now().timestamp(),
        })).into_response(),
        Err(e @ AgentError::InputTooLong { .. }) => {
            (StatusCode::BAD_REQUEST, Json(ApiError { error: e.to_string() })).into_response()
        }
        Err(e @ AgentError::RemoteCall(_)) => {
            error!("Chat request for session '{}' failed: {}", session_id, e);
            (StatusCode::BAD_GATEWAY, Json(ApiError { error: e.to_string() })).into_response()
        }
    }
}

async fn history_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.agent.history(&session_id).await {
        Some(conversation) => (StatusCode::OK, Json(conversation)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(ApiError {
            error: format!("Unknown session: {}", session_id),
        })).into_response(),
    }
}

async fn end_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    if state.agent.end_session(&session_id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(ApiError {
            error: format!("Unknown session: {}", session_id),
        })).into_response()
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}
