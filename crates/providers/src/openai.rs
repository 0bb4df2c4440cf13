//! OpenAI-compatible chat completions adapter.
//!
//! Speaks the flat-message-array dialect: the system prompt rides as a
//! leading system-role message and images go out as `image_url` blocks.
//! Also covers self-hosted gateways and proxies that mirror this API,
//! which is why the provider name is injectable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sidecar_core::completion::{CompletionResponse, TokenUsage};
use sidecar_core::content::ContentPart;
use sidecar_core::conversation::{ConversationContext, Role};
use sidecar_core::error::ProviderError;
use sidecar_core::provider::{Provider, ProviderRequest};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("client builds from static configuration")
}

/// Adapter for OpenAI and API-compatible backends.
pub struct OpenAiCompatProvider {
    name: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_API_URL.to_string(),
            client: http_client(),
        }
    }

    /// Point at a compatible backend (proxy, gateway, test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Translate the conversation into the wire message array. The system
    /// prompt becomes the first message; part order inside each message is
    /// preserved.
    fn build_messages(context: &ConversationContext) -> Vec<WireMessage> {
        let mut messages = Vec::with_capacity(context.messages.len() + 1);

        if let Some(system) = &context.system_prompt {
            messages.push(WireMessage {
                role: "system",
                content: WireContent::Text(system.clone()),
            });
        }

        for msg in &context.messages {
            let role = match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            messages.push(WireMessage {
                role,
                content: Self::build_content(&msg.parts),
            });
        }

        messages
    }

    /// A single text part collapses to a plain string; anything else is the
    /// block-array form. Data URLs and remote URLs both travel as `image_url`.
    fn build_content(parts: &[ContentPart]) -> WireContent {
        if let [ContentPart::Text { text }] = parts {
            return WireContent::Text(text.clone());
        }

        WireContent::Parts(
            parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => WirePart::Text { text: text.clone() },
                    ContentPart::Image { source } => WirePart::ImageUrl {
                        image_url: WireImageUrl {
                            url: source.as_url(),
                        },
                    },
                })
                .collect(),
        )
    }

    fn build_body(request: &ProviderRequest, stream: bool) -> WireRequest {
        WireRequest {
            model: request.model.clone(),
            messages: Self::build_messages(&request.context),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stop: request.stop.clone(),
            stream,
        }
    }

    async fn send(
        &self,
        request: &ProviderRequest,
        stream: bool,
    ) -> std::result::Result<reqwest::Response, ProviderError> {
        let body = Self::build_body(request, stream);
        debug!(provider = %self.name, model = %body.model, stream, "dispatching completion");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
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
            warn!(provider = %self.name, status = status.as_u16(), "completion request failed");
            return Err(map_status(status.as_u16(), message));
        }

        Ok(response)
    }
}

/// Map HTTP failure statuses to provider errors. Shared by both adapters.
pub(crate) fn map_status(status: u16, message: String) -> ProviderError {
    match status {
        429 => ProviderError::RateLimited {
            retry_after_secs: 5,
        },
        401 | 403 => ProviderError::AuthenticationFailed(message),
        _ => ProviderError::ApiError {
            status_code: status,
            message,
        },
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_remote_image_urls(&self) -> bool {
        true
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

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 200,
                message: "response contained no choices".into(),
            })?;

        Ok(CompletionResponse {
            text: choice.message.content.unwrap_or_default(),
            model: body.model,
            usage: body.usage.map(|u| TokenUsage {
                prompt: u.prompt_tokens,
                completion: u.completion_tokens,
                total: u.total_tokens,
            }),
            finish_reason: choice.finish_reason,
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

                // SSE events are newline-delimited; hold back any partial line.
                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].trim().to_string();
                    buffer.drain(..=pos);

                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    if data == "[DONE]" {
                        return;
                    }

                    match serde_json::from_str::<StreamChunk>(data) {
                        Ok(chunk) => {
                            let fragment = chunk
                                .choices
                                .into_iter()
                                .next()
                                .and_then(|c| c.delta.content);
                            if let Some(text) = fragment {
                                if !text.is_empty() && tx.send(Ok(text)).await.is_err() {
                                    return;
                                }
                            }
                        }
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
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: WireContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<WirePart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WirePart {
    Text { text: String },
    ImageUrl { image_url: WireImageUrl },
}

#[derive(Serialize)]
struct WireImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct WireResponse {
    model: String,
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Deserialize)]
struct StreamDelta {
    content: Option<String>,
}
