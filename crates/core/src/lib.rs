//! # Sidecar Core
//!
//! Domain types, traits, and error definitions for the Sidecar meeting-copilot.
//! This crate has **zero framework dependencies** — it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The pipeline is: raw transcript/screen signals → classification → playbook
//! selection → prompt assembly → provider dispatch. Every seam between those
//! stages is a type or trait defined here. Implementations live in their
//! respective crates, so the dependency graph points inward on core.

pub mod classification;
pub mod completion;
pub mod content;
pub mod conversation;
pub mod error;
pub mod playbook;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use classification::{
    ContextAnalysis, ContextSample, Intent, KeyMoment, MeetingPhase, MeetingType, MomentKind,
    Prediction, PredictionKind,
};
pub use completion::{CompletionOptions, CompletionResponse, TokenUsage};
pub use content::{ContentPart, ImageSource};
pub use conversation::{ChatMessage, ConversationContext, Role};
pub use error::{Error, ProviderError, Result};
pub use playbook::{ContextPriority, Playbook, PlaybookOverrides, ResponseFormat, Tone};
pub use provider::{Provider, ProviderRequest};
