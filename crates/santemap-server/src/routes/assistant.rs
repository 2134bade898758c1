//! Proxy endpoints for the AI completion gateway.
//!
//! The chat endpoint re-streams the upstream completion to the caller in
//! the same wire format it consumes: `data: <json>` delta lines closed
//! by `data: [DONE]`. Upstream 429/402 statuses pass through unchanged
//! so the client can show their specific messages.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::StreamExt;

use santemap_assistant::{AssemblerEvent, GatewayError};
use santemap_schema::ChatMessage;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub image: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/image", post(analyze_image))
}

fn gateway_error_response(error: GatewayError) -> Response {
    let status = match &error {
        GatewayError::Status { status } => match status.as_u16() {
            429 => StatusCode::TOO_MANY_REQUESTS,
            402 => StatusCode::PAYMENT_REQUIRED,
            _ => StatusCode::BAD_GATEWAY,
        },
        GatewayError::InvalidImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({ "error": error.user_message() }))).into_response()
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    let events = match state.assistant.stream_chat(&request.messages).await {
        Ok(events) => events,
        Err(error) => {
            tracing::warn!("chat proxy request failed: {error}");
            return gateway_error_response(error);
        }
    };

    let body_stream = async_stream::stream! {
        tokio::pin!(events);
        // Updates carry the full content so far; re-emit only the suffix
        // each one appends.
        let mut sent = 0usize;
        while let Some(event) = events.next().await {
            match event {
                Ok(AssemblerEvent::Update(content)) => {
                    let delta = content[sent..].to_string();
                    sent = content.len();
                    if delta.is_empty() {
                        continue;
                    }
                    let frame = json!({ "choices": [{ "delta": { "content": delta } }] });
                    yield Ok::<String, Infallible>(format!("data: {frame}\n"));
                }
                Ok(AssemblerEvent::Finished) => {
                    yield Ok("data: [DONE]\n".to_string());
                    break;
                }
                Err(error) => {
                    tracing::warn!("chat proxy stream aborted: {error}");
                    break;
                }
            }
        }
    };

    (
        [(header::CONTENT_TYPE, "text/event-stream")],
        Body::from_stream(body_stream),
    )
        .into_response()
}

async fn analyze_image(
    State(state): State<AppState>,
    Json(request): Json<ImageRequest>,
) -> Response {
    match state
        .assistant
        .analyze_image(&request.image, request.description.as_deref())
        .await
    {
        Ok(analysis) => Json(json!({ "analysis": analysis })).into_response(),
        Err(error) => {
            tracing::warn!("image analysis failed: {error}");
            gateway_error_response(error)
        }
    }
}
