//! Playbook domain types.
//!
//! A playbook is a named response profile: the system prompt template plus
//! the formatting policy for one class of conversation. The catalog itself
//! (seeding, lookup, detection) lives in `sidecar-playbooks`.

use serde::{Deserialize, Serialize};

/// Response tone requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Casual,
    Technical,
    Persuasive,
    Confident,
}

/// Formatting policy for responses produced under a playbook.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    pub include_code: bool,
    pub include_complexity: bool,
    pub use_star_method: bool,
    pub include_metrics: bool,
    pub tone: Tone,
    /// Soft cap on response length, in characters.
    pub max_length: u32,
}

/// How much weight each signal source carries for this playbook. Consumed
/// by capture collaborators when deciding what to feed the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextPriority {
    pub screen: f32,
    pub audio: f32,
    pub history: f32,
}

/// A named response profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playbook {
    /// Stable key. Unknown ids resolve to the general playbook on lookup.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Keywords whose substring hits drive detection scoring.
    pub detection_patterns: Vec<String>,
    /// Copied verbatim into the assembled conversation's system prompt.
    pub system_prompt: String,
    pub response_format: ResponseFormat,
    pub context_priority: ContextPriority,
}

/// Option-per-field overrides for shallow-merge customization. A `None`
/// field keeps the existing value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaybookOverrides {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub detection_patterns: Option<Vec<String>>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub response_format: Option<ResponseFormat>,
    #[serde(default)]
    pub context_priority: Option<ContextPriority>,
}

impl Playbook {
    /// Apply overrides, replacing whole fields (shallow merge).
    pub fn merged(&self, overrides: PlaybookOverrides) -> Playbook {
        Playbook {
            id: self.id.clone(),
            name: overrides.name.unwrap_or_else(|| self.name.clone()),
            description: overrides
                .description
                .unwrap_or_else(|| self.description.clone()),
            detection_patterns: overrides
                .detection_patterns
                .unwrap_or_else(|| self.detection_patterns.clone()),
            system_prompt: overrides
                .system_prompt
                .unwrap_or_else(|| self.system_prompt.clone()),
            response_format: overrides.response_format.unwrap_or(self.response_format),
            context_priority: overrides
                .context_priority
                .unwrap_or(self.context_priority),
        }
    }
}
