//! HTTP route handlers for the chat frontend.

pub mod chat;
pub mod status;

use std::sync::Arc;

use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use esrs_core::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "esrs_session";

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.allowed_origin);
    Router::new()
        .nest("/api", api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(chat::routes())
        .merge(status::routes())
}

/// Credentialed CORS for the single frontend origin.
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Invalid ESRS_ALLOWED_ORIGIN {:?}, cross-origin calls disabled", origin);
            layer
        }
    }
}

/// Session id from the request cookie, if it holds a valid UUID.
///
/// Any other value is treated as no session, so the caller issues a fresh id.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| uuid::Uuid::parse_str(value.trim()).ok())
        .map(|id| id.to_string())
}

/// Attach the session cookie to a response.
pub fn with_session_cookie(mut response: Response, id: &str) -> Response {
    let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; Secure; SameSite=None");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(SET_COOKIE, value);
    }
    response
}

/// Map a core error to an HTTP response.
pub fn error_response(e: &Error) -> Response {
    let status = match e {
        Error::EmptyInput(_) => StatusCode::BAD_REQUEST,
        Error::IndexUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request failed: {}", e);
    }
    (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
}
