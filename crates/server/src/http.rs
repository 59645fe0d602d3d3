//! REST surface: session lifecycle, the chat endpoint, and liveness probes.
//! Everything beyond `serde` deserialization and status-code mapping is
//! delegated to `mdgate-gateway`.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::metrics::metrics_handler;
use crate::state::AppState;
use mdgate_gateway::GetOutcome;
use mdgate_upstream::UpstreamClient;

pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.config.server.cors_origins, state.config.server.cors_enabled);

    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id", delete(delete_session))
        .route("/api/chat/:session_id", post(chat))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .with_state(state)
}

fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    if origins.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| {
            o.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin = %o, "invalid CORS origin, skipping");
                None
            })
        })
        .collect();

    if parsed.is_empty() {
        tracing::error!("all configured CORS origins are invalid, falling back to localhost");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
        .allow_credentials(true)
}

#[derive(Debug, Deserialize)]
struct CreateSessionRequest {
    user_id: Option<String>,
    metadata: Option<serde_json::Value>,
}

async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let session = state
        .gate
        .create(request.user_id, request.metadata)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(serde_json::json!({
        "session_id": session.id,
        "created_at": session.created_at,
    })))
}

/// Mirrors the session-identifier contract: 1-64 chars, `[A-Za-z0-9_-]+`.
fn validate_session_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<serde_json::Value>, StatusCode> {
    if !validate_session_id(&id) {
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.gate.get(&id).await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)? {
        GetOutcome::Found(session) => Ok(Json(serde_json::json!({
            "session_id": session.id,
            "created_at": session.created_at,
            "last_activity": session.last_activity,
            "request_count": session.request_count,
            "turn_count": session.context.len(),
        }))),
        GetOutcome::NotFound | GetOutcome::Expired => Err(StatusCode::NOT_FOUND),
    }
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    if !validate_session_id(&id) {
        return StatusCode::BAD_REQUEST;
    }

    match state.gate.delete(&id).await {
        Ok(true) => StatusCode::NO_CONTENT,
        Ok(false) => StatusCode::NOT_FOUND,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    query: String,
}

async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    if !validate_session_id(&session_id) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "answer": "That session ID isn't valid.",
                "error": { "code": "PROCESSING_ERROR", "message": "session_id must be 1-64 characters of [A-Za-z0-9_-]" },
            })),
        );
    }

    if request.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "answer": "Your query can't be empty.",
                "error": { "code": "PROCESSING_ERROR", "message": "query cannot be empty or whitespace only" },
            })),
        );
    }

    if request.query.len() > state.config.server.max_query_length {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "answer": "Your query is too long.",
                "error": { "code": "PROCESSING_ERROR", "message": "query exceeds max_query_length" },
            })),
        );
    }

    let started = std::time::Instant::now();
    match state.orchestrator.process_chat(&session_id, &request.query).await {
        Ok(response) => {
            crate::metrics::record_chat_request(&response.response_type, "success");
            crate::metrics::record_chat_latency(started.elapsed().as_millis() as f64);
            (StatusCode::OK, Json(serde_json::to_value(response).unwrap()))
        }
        Err(envelope) => {
            let status = status_for_error_code(envelope.error.code.as_str());
            crate::metrics::record_chat_request("error", envelope.error.code.as_str());
            crate::metrics::record_chat_latency(started.elapsed().as_millis() as f64);
            (status, Json(serde_json::to_value(envelope).unwrap()))
        }
    }
}

fn status_for_error_code(code: &str) -> StatusCode {
    match code {
        "SESSION_NOT_FOUND" => StatusCode::NOT_FOUND,
        "SESSION_EXPIRED" => StatusCode::GONE,
        "RATE_LIMITED" => StatusCode::TOO_MANY_REQUESTS,
        "NO_SYMBOL" | "NO_INDICATOR" | "MISSING_CURRENCIES" | "PROCESSING_ERROR" => StatusCode::BAD_REQUEST,
        "MCP_ERROR" => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthBody> {
    Json(HealthBody {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let upstream_ok = state.upstream.health_check().await;
    let status_code = if upstream_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (
        status_code,
        Json(serde_json::json!({
            "status": if upstream_ok { "ready" } else { "not_ready" },
            "checks": { "upstream": { "status": if upstream_ok { "ok" } else { "unreachable" } } },
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_for_error_code_maps_rate_limited_to_429() {
        assert_eq!(status_for_error_code("RATE_LIMITED"), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status_for_error_code("SESSION_NOT_FOUND"), StatusCode::NOT_FOUND);
        assert_eq!(status_for_error_code("INTERNAL_ERROR"), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validate_session_id_accepts_uuid_like_ids() {
        assert!(validate_session_id("a1b2c3d4-e5f6-4789-a012-3456789abcde"));
        assert!(validate_session_id("user_123"));
    }

    #[test]
    fn validate_session_id_rejects_empty_oversized_and_invalid_charset() {
        assert!(!validate_session_id(""));
        assert!(!validate_session_id(&"a".repeat(65)));
        assert!(validate_session_id(&"a".repeat(64)));
        assert!(!validate_session_id("not a valid id!"));
        assert!(!validate_session_id("has/slash"));
    }
}
