//! Provider trait — the abstraction over remote LLM backends.
//!
//! A Provider owns its wire translation in both directions: it turns the
//! provider-agnostic `ConversationContext` into its API's message shape and
//! normalizes the reply into `CompletionResponse`. The router dispatches to
//! whichever provider is active without knowing any wire details, so adding
//! a provider never touches router control flow.

use crate::completion::CompletionResponse;
use crate::conversation::ConversationContext;
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A fully resolved request: the router has already filled in the model and
/// per-provider defaults from `CompletionOptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use.
    pub model: String,

    /// The conversation to translate and send.
    pub context: ConversationContext,

    /// Sampling temperature.
    pub temperature: f32,

    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Stop sequences.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

/// The core Provider trait.
///
/// Every remote backend implements this. Failures propagate unmodified to
/// the caller; providers perform no retries (that policy belongs to an
/// external error-handling collaborator).
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai", "anthropic").
    fn name(&self) -> &str;

    /// Whether this provider's API can fetch remote image URLs itself.
    /// Adapters for providers that cannot must degrade URL image parts to a
    /// text placeholder instead of failing the request.
    fn supports_remote_image_urls(&self) -> bool {
        false
    }

    /// Send a request and get a complete, normalized response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError>;

    /// Send a streaming request and get an ordered, append-only sequence of
    /// text fragments. Concatenating all fragments must equal what a
    /// non-streaming call would have returned for equivalent input.
    ///
    /// Default implementation calls `complete()` and yields the whole text
    /// as one fragment.
    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<String, ProviderError>>,
        ProviderError,
    > {
        let response = self.complete(request).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        let _ = tx.send(Ok(response.text)).await;
        Ok(rx)
    }
}
