//! Completion request options and the normalized response shape.

use serde::{Deserialize, Serialize};

/// Caller-supplied knobs for a single completion. All optional: the router
/// fills in the active model and per-provider defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Override the router's active model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature (0.0 = deterministic).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Stop sequences.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

/// Token usage, normalized across providers regardless of their field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt: u32,
    pub completion: u32,
    pub total: u32,
}

/// A normalized, complete (non-streaming) LLM response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated text.
    pub text: String,

    /// Which model actually responded (may differ from requested).
    pub model: String,

    /// Token usage, when the provider reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,

    /// Provider finish reason (`stop`, `length`, `end_turn`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Rough token count estimate (4 chars ≈ 1 token).
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_is_empty() {
        let opts = CompletionOptions::default();
        assert!(opts.model.is_none());
        assert!(opts.stop_sequences.is_empty());
        // Empty options serialize to an empty object — stable cache keys.
        assert_eq!(serde_json::to_string(&opts).unwrap(), "{}");
    }

    #[test]
    fn usage_totals() {
        let usage = TokenUsage {
            prompt: 10,
            completion: 5,
            total: 15,
        };
        assert_eq!(usage.prompt + usage.completion, usage.total);
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("12345678901234567890"), 5);
    }
}
