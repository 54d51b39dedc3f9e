//! Conversation routes: chat, session check, reset.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use esrs_core::Error;
use serde::Deserialize;

use super::{error_response, session_id, with_session_cookie};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(chat))
        .route("/check_session", get(check_session))
        .route("/reset", post(reset))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// POST /api/chat: classify the first message of a session, answer the rest.
async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Response {
    let id = session_id(&headers).unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let conversation = state.sessions.get(&id).unwrap_or_default();

    let worker = state.clone();
    let worker_id = id.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut conversation = conversation;
        let reply = worker
            .assistant
            .handle_message(&worker_id, &mut conversation, &req.message);
        (reply, conversation)
    })
    .await;

    match result {
        Ok((Ok(reply), conversation)) => {
            state.sessions.put(&id, conversation);
            with_session_cookie(Json(reply).into_response(), &id)
        }
        Ok((Err(e), _)) => error_response(&e),
        Err(e) => error_response(&Error::Internal(format!("chat worker failed: {e}"))),
    }
}

/// GET /api/check_session
async fn check_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let profile = session_id(&headers)
        .and_then(|id| state.sessions.get(&id))
        .and_then(|conversation| conversation.profile);

    match profile {
        Some(profile) => Json(serde_json::json!({
            "initialized": true,
            "nace_sector": profile.industry_code,
            "esrs_sector": profile.sector_label,
        })),
        None => Json(serde_json::json!({ "initialized": false })),
    }
}

/// POST /api/reset
async fn reset(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<serde_json::Value> {
    if let Some(id) = session_id(&headers) {
        state.sessions.remove(&id);
    }
    Json(serde_json::json!({ "status": "success" }))
}

#[cfg(test)]
mod tests {
    use super::super::build_router;
    use crate::test_support::{app_state, body_json, post_json};
    use axum::body::Body;
    use axum::http::header::{COOKIE, SET_COOKIE};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn cookie_of(response: &axum::response::Response) -> String {
        let raw = response.headers()[SET_COOKIE].to_str().unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_first_message_then_question() {
        let state = app_state(&["B06", "- Disclose **category 11**"]);
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(post_json("/api/chat", r#"{"message": "We operate offshore oil drilling platforms"}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = cookie_of(&response);
        assert!(cookie.starts_with("esrs_session="));

        let body = body_json(response).await;
        assert_eq!(body["is_first_message"], true);
        assert_eq!(body["nace_sector"], "B06");
        assert_eq!(body["esrs_sector"], "Oil & Gas Company");
        assert_eq!(body["context"], "");

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/chat",
                r#"{"message": "What are Scope 3 emissions requirements?"}"#,
                Some(&cookie),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["is_first_message"], false);
        assert!(body["answer"].as_str().unwrap().contains("<strong>category 11</strong>"));
        assert!(body["context"].as_str().unwrap().contains("Scope 3"));
        assert!(body.get("nace_sector").is_none());

        let check = app
            .oneshot(
                Request::get("/api/check_session")
                    .header(COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(check).await;
        assert_eq!(body["initialized"], true);
        assert_eq!(body["nace_sector"], "B06");
    }

    #[tokio::test]
    async fn test_reset_clears_session() {
        let state = app_state(&["H49.4"]);
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(post_json("/api/chat", r#"{"message": "We run a trucking fleet"}"#, None))
            .await
            .unwrap();
        let cookie = cookie_of(&response);
        assert_eq!(state.sessions.len(), 1);

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/reset")
                    .header(COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await["status"], "success");
        assert_eq!(state.sessions.len(), 0);

        let check = app
            .oneshot(
                Request::get("/api/check_session")
                    .header(COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(check).await["initialized"], false);
    }

    #[tokio::test]
    async fn test_gateway_failure_is_not_a_server_error() {
        let state = app_state(&[]);
        let app = build_router(state.clone());

        let response = app
            .oneshot(post_json("/api/chat", r#"{"message": "We grow wheat"}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = cookie_of(&response);
        let body = body_json(response).await;
        assert!(body["answer"].as_str().unwrap().starts_with("I'm sorry"));
        assert!(body.get("nace_sector").is_none());

        let id = cookie.trim_start_matches("esrs_session=");
        assert!(!state.sessions.get(id).unwrap().is_initialized());
    }

    #[tokio::test]
    async fn test_forged_session_cookie_gets_fresh_id() {
        let state = app_state(&["B06"]);
        let app = build_router(state.clone());

        let response = app
            .oneshot(post_json(
                "/api/chat",
                r#"{"message": "We operate offshore oil drilling platforms"}"#,
                Some("esrs_session=admin"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = cookie_of(&response);
        let id = cookie.trim_start_matches("esrs_session=");
        assert_ne!(id, "admin");
        assert!(uuid::Uuid::parse_str(id).is_ok());
        assert!(state.sessions.get("admin").is_none());
        assert!(state.sessions.get(id).unwrap().is_initialized());
    }

    #[tokio::test]
    async fn test_empty_message_is_bad_request() {
        let app = build_router(app_state(&["B06"]));
        let response = app
            .oneshot(post_json("/api/chat", r#"{"message": "  "}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }
}
