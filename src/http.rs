use crate::{
    alert::WebhookPayload,
    config::Config,
    metrics::{self, METRICS_HANDLE},
    relay::Relay,
};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use hyper::StatusCode;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};

/// Header carrying the shared webhook secret, when one is configured
pub const TOKEN_HEADER: &str = "x-webhook-token";

#[derive(Clone)]
pub struct AppState {
    config: Config,
    relay: Arc<Relay>,
}

impl AppState {
    /// Create the shared application state
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let relay = Arc::new(Relay::new(config.clone())?);

        Ok(Self { config, relay })
    }
}

/// Creates an Axum Web Server
pub async fn create_server(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting the web server");

    let state = AppState::new(config.clone())?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.http.host, config.http.port)
        .parse()
        .expect("Unable to parse address");

    tracing::info!("Listening on {}", addr);

    axum_server::bind(addr)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await?;

    Ok(())
}

/// Create the router for the application
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook/sms", post(webhook))
        .route("/metrics", get(render_metrics))
        .with_state(state)
}

/// This is the handler for the /health path
async fn health() -> impl IntoResponse {
    metrics::record_http_request("/health");
    let _timer = metrics::http_request_timer("/health");

    Json(json!({"status": "ok"}))
}

/// This is the handler for the /webhook/sms path. The token check runs
/// before the body is parsed; no alert is read on an unauthorized request.
#[tracing::instrument(skip_all)]
async fn webhook(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    metrics::record_http_request("/webhook/sms");
    let _timer = metrics::http_request_timer("/webhook/sms");

    if let Some(secret) = &state.config.webhook.secret {
        let token = headers
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if token != secret {
            tracing::warn!("Unauthorized webhook access attempt");
            metrics::record_webhook_rejected("unauthorized");

            return (StatusCode::FORBIDDEN, "Unauthorized webhook access").into_response();
        }
    }

    let payload: WebhookPayload = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Error parsing webhook payload: {}", e);
            metrics::record_webhook_rejected("malformed");

            return (
                StatusCode::BAD_REQUEST,
                format!("Invalid payload format: {e}"),
            )
                .into_response();
        }
    };

    tracing::info!("Received webhook with status: {}", payload.status);

    let result = state.relay.process(&payload).await;
    metrics::record_webhook_processed();

    Json(json!({"status": "Webhook processed", "sms_sent": result.sent})).into_response()
}

/// This is the handler for the /metrics path
async fn render_metrics() -> impl IntoResponse {
    metrics::record_http_request("/metrics");
    let _timer = metrics::http_request_timer("/metrics");

    match METRICS_HANDLE.get() {
        Some(Some(handle)) => (StatusCode::OK, handle.render()),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to get the metrics handle".to_string(),
        ),
    }
}
