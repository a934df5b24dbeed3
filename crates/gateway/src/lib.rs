//! HTTP gateway for RoboTutor.
//!
//! Exposes the tutoring API (`/api/chat`, `/api/clear-pdf`), a health
//! check, and optionally the static client UI.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::{Router, extract::State, http::HeaderValue, response::Json, routing::get};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use robotutor_agent::Tutor;
use robotutor_config::{AppConfig, GatewayConfig};
use robotutor_core::session::SessionStore;
use robotutor_memory::InMemorySessionStore;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub tutor: Arc<Tutor>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl GatewayState {
    pub fn new(tutor: Arc<Tutor>) -> Self {
        Self {
            tutor,
            started_at: chrono::Utc::now(),
        }
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the router with all gateway routes and layers.
///
/// Layers applied:
/// - Request body limit (`gateway.body_limit_mb`, PDFs arrive inline)
/// - CORS (any origin unless `gateway.allowed_origins` is set)
/// - HTTP trace logging
///
/// When `gateway.static_dir` is set, unmatched paths are served from it.
pub fn build_router(state: SharedState, config: &GatewayConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_handler))
        .with_state(state.clone())
        .nest("/api", api::api_router(state));

    if let Some(dir) = &config.static_dir {
        info!(dir = %dir, "Serving static files");
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(DefaultBodyLimit::max(config.body_limit_mb * 1024 * 1024))
        .layer(cors_layer(&config.allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new().allow_headers(Any).allow_methods(Any);
    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

/// Start the gateway HTTP server.
///
/// Builds the provider, session store, and tutor once and shares them via
/// `Arc` across all requests. Runs until Ctrl-C or SIGTERM.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider = robotutor_providers::build_from_config(&config)?;
    let sessions = Arc::new(InMemorySessionStore::with_history_limit(
        config.session.history_limit,
    ));
    let tutor = Arc::new(Tutor::from_config(&config, provider, sessions));
    let state = Arc::new(GatewayState::new(tutor));

    let app = build_router(state, &config.gateway);

    info!(
        addr = %addr,
        model = %config.provider.model,
        api_key = config.has_api_key(),
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received");
}

// --- Handlers ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions: usize,
    pub provider: String,
    pub uptime_secs: i64,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime = chrono::Utc::now() - state.started_at;
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        sessions: state.tutor.sessions().len().await,
        provider: state.tutor.provider_name().into(),
        uptime_secs: uptime.num_seconds(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use robotutor_core::error::ProviderError;
    use robotutor_core::provider::{Completion, CompletionRequest, Provider};
    use tower::ServiceExt;

    struct EchoProvider;

    #[async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
            let last = request.messages.last().map(|m| m.text()).unwrap_or_default();
            Ok(Completion::text(format!("echo: {last}")))
        }
    }

    fn test_state() -> SharedState {
        let tutor = Tutor::new(
            Arc::new(EchoProvider),
            Arc::new(InMemorySessionStore::new()),
            "mock-model",
        );
        Arc::new(GatewayState::new(Arc::new(tutor)))
    }

    fn chat_request(session: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"prompt": "Hello", "level": "1", "sessionId": session})
                    .to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state(), &GatewayConfig::default());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.status, "ok");
        assert_eq!(json.sessions, 0);
        assert_eq!(json.provider, "echo");
    }

    #[tokio::test]
    async fn health_counts_sessions() {
        let state = test_state();
        let config = GatewayConfig::default();

        let response = build_router(state.clone(), &config)
            .oneshot(chat_request("s1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = build_router(state, &config).oneshot(req).await.unwrap();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.sessions, 1);
    }

    #[tokio::test]
    async fn api_routes_are_nested() {
        let app = build_router(test_state(), &GatewayConfig::default());
        let response = app.oneshot(chat_request("s1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: api::ChatResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.response, "echo: Hello");
    }

    #[tokio::test]
    async fn cors_allows_any_origin_by_default() {
        let app = build_router(test_state(), &GatewayConfig::default());
        let mut req = chat_request("s1");
        req.headers_mut()
            .insert("origin", "http://localhost:5173".parse().unwrap());

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn cors_restricts_to_configured_origins() {
        let config = GatewayConfig {
            allowed_origins: vec!["https://tutor.example.com".into()],
            ..GatewayConfig::default()
        };
        let app = build_router(test_state(), &config);
        let mut req = chat_request("s1");
        req.headers_mut()
            .insert("origin", "https://tutor.example.com".parse().unwrap());

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "https://tutor.example.com"
        );
    }

    #[tokio::test]
    async fn body_limit_rejects_oversized_payloads() {
        let config = GatewayConfig {
            body_limit_mb: 1,
            ..GatewayConfig::default()
        };
        let app = build_router(test_state(), &config);
        let big = "A".repeat(2 * 1024 * 1024);
        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"prompt": "Hi", "level": "1", "pdfData": big}).to_string(),
            ))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn static_dir_serves_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>RoboTutor</h1>").unwrap();
        let config = GatewayConfig {
            static_dir: Some(dir.path().to_string_lossy().into_owned()),
            ..GatewayConfig::default()
        };
        let app = build_router(test_state(), &config);

        let req = Request::builder()
            .uri("/index.html")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<h1>RoboTutor</h1>");
    }

    #[tokio::test]
    async fn unknown_path_without_static_dir_is_404() {
        let app = build_router(test_state(), &GatewayConfig::default());
        let req = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
