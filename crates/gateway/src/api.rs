//! The tutoring API: `POST /api/chat` and `POST /api/clear-pdf`.
//!
//! Field names on the wire are camelCase to match the browser client.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use robotutor_agent::ChatTurn;
use robotutor_core::error::Error;

use crate::SharedState;

/// Success message returned by `/api/clear-pdf`.
pub const CLEARED_MESSAGE: &str = "PDF and conversation history cleared";

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub level: Option<LevelField>,
    #[serde(default)]
    pub document_prompt: bool,
    #[serde(default)]
    pub pdf_data: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// The client sends the level as `"3"` or `3`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LevelField {
    Number(i64),
    Text(String),
}

impl LevelField {
    fn into_text(self) -> String {
        match self {
            LevelField::Number(n) => n.to_string(),
            LevelField::Text(s) => s,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub has_annotations: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(e: Error) -> ApiError {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(status = status.as_u16(), error = %e, "Request failed");
    } else {
        warn!(status = status.as_u16(), error = %e, "Request rejected");
    }
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

fn bad_json(rejection: JsonRejection) -> ApiError {
    warn!(error = %rejection.body_text(), "Malformed request body");
    let status = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorResponse {
            error: rejection.body_text(),
        }),
    )
}

// ── Router ────────────────────────────────────────────────────────────────

/// Routes under `/api`.
pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/clear-pdf", post(clear_handler))
        .with_state(state)
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn chat_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(payload) = payload.map_err(bad_json)?;
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let reply = state
        .tutor
        .chat(ChatTurn {
            prompt: payload.prompt,
            level: payload.level.map(LevelField::into_text),
            document_prompt: payload.document_prompt,
            pdf_data: payload.pdf_data,
            file_name: payload.file_name,
            session_id: payload.session_id,
            referer,
        })
        .await
        .map_err(api_error)?;

    info!(
        turn = reply.turn.as_str(),
        has_annotations = reply.has_annotations,
        response_len = reply.text.len(),
        "Chat response sent"
    );

    Ok(Json(ChatResponse {
        success: true,
        response: reply.text,
        has_annotations: reply.has_annotations,
    }))
}

async fn clear_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ClearRequest>, JsonRejection>,
) -> Result<Json<ClearResponse>, ApiError> {
    let Json(payload) = payload.map_err(bad_json)?;
    state
        .tutor
        .clear(payload.session_id.as_deref())
        .await
        .map_err(api_error)?;

    Ok(Json(ClearResponse {
        success: true,
        message: CLEARED_MESSAGE.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayState;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use robotutor_agent::Tutor;
    use robotutor_core::error::ProviderError;
    use robotutor_core::provider::{Completion, CompletionRequest, Provider};
    use robotutor_core::session::SessionStore;
    use robotutor_memory::InMemorySessionStore;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    /// Mock provider: fixed reply or fixed error, records requests.
    struct MockProvider {
        reply: std::result::Result<Completion, ProviderError>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockProvider {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(Completion::text(text)),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(error: ProviderError) -> Self {
            Self {
                reply: Err(error),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> std::result::Result<Completion, ProviderError> {
            self.requests.lock().unwrap().push(request);
            self.reply.clone()
        }
    }

    fn test_state(provider: Arc<MockProvider>) -> (SharedState, Arc<InMemorySessionStore>) {
        let store = Arc::new(InMemorySessionStore::new());
        let tutor = Tutor::new(provider, store.clone(), "mock-model");
        (Arc::new(GatewayState::new(Arc::new(tutor))), store)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn chat_returns_response() {
        let provider = Arc::new(MockProvider::ok("Osmosis is diffusion of water."));
        let (state, store) = test_state(provider.clone());
        let app = api_router(state);

        let response = app
            .oneshot(post_json(
                "/chat",
                serde_json::json!({
                    "prompt": "What is osmosis?",
                    "level": "1",
                    "documentPrompt": false,
                    "sessionId": "abc123"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: ChatResponse = body_json(response).await;
        assert!(json.success);
        assert_eq!(json.response, "Osmosis is diffusion of water.");
        assert!(!json.has_annotations);
        assert_eq!(
            store.get("abc123").await.unwrap().conversation_history.len(),
            2
        );
    }

    #[tokio::test]
    async fn chat_accepts_numeric_level_and_forwards_referer() {
        let provider = Arc::new(MockProvider::ok("ok"));
        let (state, _) = test_state(provider.clone());
        let app = api_router(state);

        let mut req = post_json(
            "/chat",
            serde_json::json!({"prompt": "Hi", "level": 4}),
        );
        req.headers_mut()
            .insert(header::REFERER, "http://localhost:5173/".parse().unwrap());

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0].level.value(), 4);
        assert_eq!(
            requests[0].referer.as_deref(),
            Some("http://localhost:5173/")
        );
    }

    #[tokio::test]
    async fn chat_without_prompt_is_400() {
        let provider = Arc::new(MockProvider::ok("unused"));
        let (state, store) = test_state(provider.clone());
        let app = api_router(state);

        let response = app
            .oneshot(post_json(
                "/chat",
                serde_json::json!({"level": "2", "sessionId": "abc123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json: ErrorResponse = body_json(response).await;
        assert_eq!(json.error, "Prompt and level are required");
        assert!(provider.requests.lock().unwrap().is_empty());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn chat_with_bad_level_is_400() {
        let (state, _) = test_state(Arc::new(MockProvider::ok("unused")));
        let app = api_router(state);

        let response = app
            .oneshot(post_json(
                "/chat",
                serde_json::json!({"prompt": "Hi", "level": "7"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_with_malformed_body_is_400() {
        let (state, _) = test_state(Arc::new(MockProvider::ok("unused")));
        let app = api_router(state);

        let req = Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json: ErrorResponse = body_json(response).await;
        assert!(!json.error.is_empty());
    }

    #[tokio::test]
    async fn upstream_status_passes_through() {
        let provider = Arc::new(MockProvider::failing(ProviderError::Upstream {
            status: 429,
            body: "rate limited".into(),
        }));
        let (state, store) = test_state(provider);
        let app = api_router(state);

        let response = app
            .oneshot(post_json(
                "/chat",
                serde_json::json!({"prompt": "Hi", "level": "1", "sessionId": "abc123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let json: ErrorResponse = body_json(response).await;
        assert!(json.error.contains("429"));
        let record = store.get("abc123").await.unwrap();
        assert!(record.conversation_history.is_empty());
    }

    #[tokio::test]
    async fn malformed_upstream_reply_is_500() {
        let provider = Arc::new(MockProvider::failing(ProviderError::MalformedResponse(
            "no choices".into(),
        )));
        let (state, _) = test_state(provider);
        let app = api_router(state);

        let response = app
            .oneshot(post_json(
                "/chat",
                serde_json::json!({"prompt": "Hi", "level": "1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn clear_without_session_is_400() {
        let (state, _) = test_state(Arc::new(MockProvider::ok("unused")));

        for body in [serde_json::json!({}), serde_json::json!({"sessionId": ""})] {
            let response = api_router(state.clone())
                .oneshot(post_json("/clear-pdf", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let json: ErrorResponse = body_json(response).await;
            assert_eq!(json.error, "Session ID is required");
        }
    }

    #[tokio::test]
    async fn clear_resets_session() {
        let (state, store) = test_state(Arc::new(MockProvider::ok("answer")));

        let response = api_router(state.clone())
            .oneshot(post_json(
                "/chat",
                serde_json::json!({"prompt": "Hi", "level": "3", "sessionId": "abc123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = api_router(state)
            .oneshot(post_json(
                "/clear-pdf",
                serde_json::json!({"sessionId": "abc123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: ClearResponse = body_json(response).await;
        assert!(json.success);
        assert_eq!(json.message, CLEARED_MESSAGE);
        assert!(store.get("abc123").await.is_none());
    }

    #[tokio::test]
    async fn clear_unknown_session_still_succeeds() {
        let (state, _) = test_state(Arc::new(MockProvider::ok("unused")));
        let response = api_router(state)
            .oneshot(post_json(
                "/clear-pdf",
                serde_json::json!({"sessionId": "never-seen"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
