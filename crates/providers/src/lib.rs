//! Provider adapters and LLM routing for Sidecar.
//!
//! Two wire dialects are supported: OpenAI-compatible chat completions
//! (which also covers proxies and self-hosted gateways) and the Anthropic
//! Messages API. `LlmRouter` sits in front of both, handling provider and
//! model selection, response caching, and de-duplication of concurrent
//! identical requests.

pub mod anthropic;
pub mod cache;
pub mod openai;
pub mod router;

pub use anthropic::AnthropicProvider;
pub use cache::ResponseCache;
pub use openai::OpenAiCompatProvider;
pub use router::{default_model_for, LlmRouter};
