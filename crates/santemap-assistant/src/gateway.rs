//! HTTP client for the AI completion gateway.
//!
//! Two endpoints: a streaming chat completion (SSE-style `data:` lines)
//! and a non-streaming image analysis. All failures of a send are
//! converted into a single transcript entry with a user-facing message;
//! the caller never needs a separate error channel.

use std::pin::Pin;

use base64::Engine;
use futures_core::Stream;
use reqwest::StatusCode;
use santemap_schema::ChatMessage;
use serde_json::json;
use thiserror::Error;
use tokio_stream::StreamExt;

use crate::sse::{AssemblerEvent, SseAssembler};
use crate::transcript::{Transcript, TranscriptError};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("assistant gateway error ({status})")]
    Status { status: StatusCode },
    #[error("assistant gateway unreachable: {0}")]
    Transport(String),
    #[error("assistant response missing analysis field")]
    MissingAnalysis,
    #[error("invalid image payload: {0}")]
    InvalidImage(String),
}

impl GatewayError {
    /// French user-facing text shown in the transcript. 429 and 402
    /// carry specific meanings; other statuses collapse to a generic
    /// communication error; transport failures pass their message
    /// through.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { status } => match status.as_u16() {
                429 => "Trop de requêtes pour le moment. Merci de patienter quelques instants \
                        avant de réessayer."
                    .to_string(),
                402 => "Le service d'assistance est momentanément indisponible. Veuillez \
                        réessayer plus tard."
                    .to_string(),
                _ => "Erreur de communication avec l'assistant. Veuillez réessayer.".to_string(),
            },
            Self::Transport(detail) => detail.clone(),
            Self::MissingAnalysis | Self::InvalidImage(_) => {
                "L'analyse de l'image a échoué. Veuillez réessayer.".to_string()
            }
        }
    }
}

type EventStream = Pin<Box<dyn Stream<Item = Result<AssemblerEvent, GatewayError>> + Send>>;

#[derive(Debug, Clone)]
pub struct AssistantGateway {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl AssistantGateway {
    pub fn new(api_base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.api_base);
        let mut req = self.client.post(url).header("content-type", "application/json");
        if let Some(key) = &self.api_key {
            req = req.header("authorization", format!("Bearer {key}"));
        }
        req
    }

    /// Open a streaming chat completion and return the assembled events.
    /// The body is `{ "messages": [...] }`; the response is consumed
    /// chunk by chunk through an [`SseAssembler`].
    pub async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<EventStream, GatewayError> {
        let resp = match self.post("/chat").json(&json!({ "messages": messages })).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return Err(GatewayError::Transport(
                    "Le service d'assistance ne répond pas (délai dépassé).".into(),
                ));
            }
            Err(e) => return Err(GatewayError::Transport(e.to_string())),
        };

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(GatewayError::Status { status });
        }

        let byte_stream = resp.bytes_stream();
        let stream = async_stream::stream! {
            tokio::pin!(byte_stream);
            let mut assembler = SseAssembler::new();

            while let Some(chunk) = byte_stream.next().await {
                match chunk {
                    Ok(bytes) => {
                        for event in assembler.feed(&bytes) {
                            let finished = event == AssemblerEvent::Finished;
                            yield Ok(event);
                            if finished {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(GatewayError::Transport(e.to_string()));
                        return;
                    }
                }
            }

            for event in assembler.finish() {
                yield Ok(event);
            }
        };

        Ok(Box::pin(stream))
    }

    /// Send one user message and stream the assistant's reply into the
    /// transcript. Every gateway failure becomes a transcript entry; the
    /// only propagated error is a send while a turn is already open.
    pub async fn send_message(
        &self,
        transcript: &mut Transcript,
        text: &str,
    ) -> Result<(), TranscriptError> {
        transcript.begin_turn(text)?;
        let messages: Vec<ChatMessage> = transcript.messages().to_vec();

        let mut stream = match self.stream_chat(&messages).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("chat request failed: {e}");
                transcript.fail(e.user_message());
                return Ok(());
            }
        };

        while let Some(event) = stream.next().await {
            match event {
                Ok(AssemblerEvent::Update(content)) => transcript.apply_update(&content),
                Ok(AssemblerEvent::Finished) => break,
                Err(e) => {
                    tracing::warn!("chat stream aborted: {e}");
                    transcript.fail(e.user_message());
                    return Ok(());
                }
            }
        }

        transcript.complete();
        Ok(())
    }

    /// Non-streaming image analysis. The payload must be decodable
    /// base64; the response must carry an `analysis` text field.
    pub async fn analyze_image(
        &self,
        image_base64: &str,
        description: Option<&str>,
    ) -> Result<String, GatewayError> {
        base64::engine::general_purpose::STANDARD
            .decode(image_base64)
            .map_err(|e| GatewayError::InvalidImage(e.to_string()))?;

        let body = json!({ "image": image_base64, "description": description });
        let resp = match self.post("/analyze-image").json(&body).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return Err(GatewayError::Transport(
                    "Le service d'assistance ne répond pas (délai dépassé).".into(),
                ));
            }
            Err(e) => return Err(GatewayError::Transport(e.to_string())),
        };

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(GatewayError::Status { status });
        }

        let value: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        value
            .get("analysis")
            .and_then(|a| a.as_str())
            .map(str::to_string)
            .ok_or(GatewayError::MissingAnalysis)
    }
}
