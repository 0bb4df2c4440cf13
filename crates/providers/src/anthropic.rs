//! Anthropic Messages API adapter.
//!
//! The dialect differs from the flat-array one in three ways that matter
//! here: the system prompt is a top-level `system` field, `max_tokens` is
//! mandatory, and images must be embedded base64 blocks. Remote image URLs
//! degrade to a text placeholder instead of failing the whole request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sidecar_core::completion::{CompletionResponse, TokenUsage};
use sidecar_core::content::{ContentPart, ImageSource};
use sidecar_core::conversation::Role;
use sidecar_core::error::ProviderError;
use sidecar_core::provider::{Provider, ProviderRequest};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::openai::map_status;

const DEFAULT_API_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const REMOTE_IMAGE_PLACEHOLDER: &str =
    "[image omitted: remote URLs are not supported by this provider]";

/// Adapter for the Anthropic Messages API.
pub struct AnthropicProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_URL.to_string(),
            client: crate::openai::http_client(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }

    /// Split the conversation into the top-level `system` string and the
    /// user/assistant message list. Any stray system-role messages join the
    /// system string rather than the array (the API rejects them inline).
    fn build_body(request: &ProviderRequest, stream: bool) -> WireRequest {
        let mut system_parts: Vec<String> = Vec::new();
        if let Some(system) = &request.context.system_prompt {
            system_parts.push(system.clone());
        }

        let mut messages = Vec::with_capacity(request.context.messages.len());
        for msg in &request.context.messages {
            match msg.role {
                Role::System => system_parts.push(msg.text()),
                Role::User => messages.push(WireMessage {
                    role: "user",
                    content: Self::build_blocks(&msg.parts),
                }),
                Role::Assistant => messages.push(WireMessage {
                    role: "assistant",
                    content: Self::build_blocks(&msg.parts),
                }),
            }
        }

        WireRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: if system_parts.is_empty() {
                None
            } else {
                Some(system_parts.join("\n\n"))
            },
            messages,
            temperature: request.temperature,
            stop_sequences: request.stop.clone(),
            stream,
        }
    }

    fn build_blocks(parts: &[ContentPart]) -> Vec<WireBlock> {
        parts
            .iter()
            .map(|part| match part {
                ContentPart::Text { text } => WireBlock::Text { text: text.clone() },
                ContentPart::Image { source } => match source {
                    ImageSource::Base64 { media_type, data } => WireBlock::Image {
                        source: WireImageSource {
                            kind: "base64",
                            media_type: media_type.clone(),
                            data: data.clone(),
                        },
                    },
                    ImageSource::Url { url } => {
                        trace!(%url, "degrading remote image to text placeholder");
                        WireBlock::Text {
                            text: REMOTE_IMAGE_PLACEHOLDER.to_string(),
                        }
                    }
                },
            })
            .collect()
    }

    async fn send(
        &self,
        request: &ProviderRequest,
        stream: bool,
    ) -> std::result::Result<reqwest::Response, ProviderError> {
        let body = Self::build_body(request, stream);
        debug!(provider = "anthropic", model = %body.model, stream, "dispatching completion");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(provider = "anthropic", status = status.as_u16(), "completion request failed");
            return Err(map_status(status.as_u16(), message));
        }

        Ok(response)
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let response = self.send(&request, false).await?;

        let body: WireResponse = response.json().await.map_err(|e| ProviderError::ApiError {
            status_code: 200,
            message: format!("failed to parse response: {e}"),
        })?;

        let text = body
            .content
            .iter()
            .filter_map(|block| match block {
                WireResponseBlock::Text { text } => Some(text.as_str()),
                WireResponseBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(CompletionResponse {
            text,
            model: body.model,
            usage: body.usage.map(|u| TokenUsage {
                prompt: u.input_tokens,
                completion: u.output_tokens,
                total: u.input_tokens + u.output_tokens,
            }),
            finish_reason: body.stop_reason,
        })
    }

    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<
        mpsc::Receiver<std::result::Result<String, ProviderError>>,
        ProviderError,
    > {
        let response = self.send(&request, true).await?;
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let mut response = response;
            let mut buffer = String::new();

            loop {
                let chunk = match response.chunk().await {
                    Ok(Some(chunk)) => chunk,
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].trim().to_string();
                    buffer.drain(..=pos);

                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };

                    match serde_json::from_str::<StreamEvent>(data) {
                        Ok(event) => match event {
                            StreamEvent::ContentBlockDelta { delta } => {
                                if let StreamDelta::TextDelta { text } = delta {
                                    if !text.is_empty() && tx.send(Ok(text)).await.is_err() {
                                        return;
                                    }
                                }
                            }
                            StreamEvent::MessageStop => return,
                            StreamEvent::Other => {}
                        },
                        Err(e) => trace!(error = %e, "skipping unparseable stream event"),
                    }
                }
            }
        });

        Ok(rx)
    }
}

#[derive(Serialize)]
struct WireRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: Vec<WireBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Text { text: String },
    Image { source: WireImageSource },
}

#[derive(Serialize)]
struct WireImageSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: String,
    data: String,
}

#[derive(Deserialize)]
struct WireResponse {
    model: String,
    content: Vec<WireResponseBlock>,
    stop_reason: Option<String>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireResponseBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct WireUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockDelta { delta: StreamDelta },
    MessageStop,
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamDelta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidecar_core::conversation::{ChatMessage, ConversationContext};

    fn request_with(context: ConversationContext) -> ProviderRequest {
        ProviderRequest {
            model: "claude-3-5-sonnet-20241022".into(),
            context,
            temperature: 0.3,
            max_tokens: None,
            stop: vec![],
        }
    }

    #[test]
    fn system_prompt_goes_top_level() {
        let mut ctx = ConversationContext::new().with_system("Be terse.");
        ctx.push(ChatMessage::user_text("hi"));

        let body =
            serde_json::to_value(AnthropicProvider::build_body(&request_with(ctx), false))
                .unwrap();

        assert_eq!(body["system"], "Be terse.");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"][0]["type"], "text");
        assert_eq!(messages[0]["content"][0]["text"], "hi");
    }

    #[test]
    fn max_tokens_defaults_when_unset() {
        let mut ctx = ConversationContext::new();
        ctx.push(ChatMessage::user_text("hi"));

        let body =
            serde_json::to_value(AnthropicProvider::build_body(&request_with(ctx), false))
                .unwrap();
        assert_eq!(body["max_tokens"], 4096);
    }

    #[test]
    fn base64_image_becomes_image_block() {
        let blocks = AnthropicProvider::build_blocks(&[ContentPart::image(
            "data:image/png;base64,iVBORw0KGgo=",
        )]);
        let json = serde_json::to_value(&blocks).unwrap();

        assert_eq!(json[0]["type"], "image");
        assert_eq!(json[0]["source"]["type"], "base64");
        assert_eq!(json[0]["source"]["media_type"], "image/png");
        assert_eq!(json[0]["source"]["data"], "iVBORw0KGgo=");
    }

    #[test]
    fn remote_image_degrades_to_placeholder() {
        let blocks = AnthropicProvider::build_blocks(&[
            ContentPart::text("see slide"),
            ContentPart::image("https://example.com/slide.png"),
        ]);
        let json = serde_json::to_value(&blocks).unwrap();

        assert_eq!(json[1]["type"], "text");
        assert_eq!(json[1]["text"], REMOTE_IMAGE_PLACEHOLDER);
    }

    #[test]
    fn inline_system_messages_fold_into_system_field() {
        let mut ctx = ConversationContext::new().with_system("First.");
        ctx.push(ChatMessage {
            role: Role::System,
            parts: vec![ContentPart::text("Second.")],
        });
        ctx.push(ChatMessage::user_text("hi"));

        let body = AnthropicProvider::build_body(&request_with(ctx), false);
        assert_eq!(body.system.as_deref(), Some("First.\n\nSecond."));
        assert_eq!(body.messages.len(), 1);
    }

    #[test]
    fn response_parsing_computes_total_usage() {
        let raw = r#"{
            "model": "claude-3-5-sonnet-20241022",
            "content": [{"type": "text", "text": "Hello."}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 20, "output_tokens": 3}
        }"#;
        let body: WireResponse = serde_json::from_str(raw).unwrap();
        let usage = body.usage.unwrap();
        assert_eq!(usage.input_tokens + usage.output_tokens, 23);
        assert_eq!(body.stop_reason.as_deref(), Some("end_turn"));
    }

    #[test]
    fn stream_events_parse() {
        let delta = r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#;
        assert!(matches!(
            serde_json::from_str::<StreamEvent>(delta).unwrap(),
            StreamEvent::ContentBlockDelta {
                delta: StreamDelta::TextDelta { .. }
            }
        ));

        let stop = r#"{"type":"message_stop"}"#;
        assert!(matches!(
            serde_json::from_str::<StreamEvent>(stop).unwrap(),
            StreamEvent::MessageStop
        ));

        let ping = r#"{"type":"ping"}"#;
        assert!(matches!(
            serde_json::from_str::<StreamEvent>(ping).unwrap(),
            StreamEvent::Other
        ));
    }
}
