use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;

use crate::client::ChatEngine;
use crate::codec::recover_type;
use crate::config::Config;
use crate::error::{RedChatError, Result};
use crate::services::reporter::ErrorReporter;

/// Header carrying the caller identity, set by the authenticating proxy.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
    pub request_timeout: Duration,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(chat_socket))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

fn caller_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

async fn chat_socket(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    let Some(caller) = caller_id(&headers) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "missing user id"})),
        )
            .into_response();
    };
    let Some(ws) = ws else {
        return (
            StatusCode::UPGRADE_REQUIRED,
            Json(json!({"error": "websocket upgrade required"})),
        )
            .into_response();
    };
    ws.on_upgrade(move |socket| serve_socket(socket, state, caller))
}

async fn serve_socket(mut socket: WebSocket, state: AppState, caller_id: String) {
    tracing::info!(caller_id, "chat connection opened");
    while let Some(frame) = socket.recv().await {
        let bytes = match frame {
            Ok(Message::Text(text)) => text.into_bytes(),
            Ok(Message::Binary(bytes)) => bytes,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(err) => {
                tracing::warn!(caller_id, error = %err, "chat connection error");
                break;
            }
        };
        let reply = process_frame(&state, &caller_id, &bytes).await;
        let text = String::from_utf8_lossy(&reply).into_owned();
        if socket.send(Message::Text(text)).await.is_err() {
            break;
        }
    }
    tracing::info!(caller_id, "chat connection closed");
}

/// Runs one envelope through the engine under the request deadline.
pub async fn process_frame(state: &AppState, caller_id: &str, bytes: &[u8]) -> Vec<u8> {
    match tokio::time::timeout(state.request_timeout, state.engine.handle(caller_id, bytes)).await
    {
        Ok(reply) => reply,
        Err(_) => {
            let err = RedChatError::Store(format!(
                "request exceeded {}ms",
                state.request_timeout.as_millis()
            ));
            ErrorReporter::new().report("deadline", recover_type(bytes), &err)
        }
    }
}

pub async fn run(config: Config) -> Result<()> {
    run_with_shutdown(config, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            futures::future::pending::<()>().await;
        }
    })
    .await
}

pub async fn run_with_shutdown<F>(config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let engine = Arc::new(ChatEngine::from_config(&config).await?);
    let state = AppState {
        engine,
        request_timeout: config.request_timeout(),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RedChatError::Runtime(e.to_string()))?;
    tracing::info!(%addr, "redchatd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| RedChatError::Runtime(e.to_string()))?;

    Ok(())
}
