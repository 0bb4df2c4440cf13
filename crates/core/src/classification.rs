//! Classification domain types.
//!
//! These are the value objects the context classifier produces and the UI
//! layer consumes for live suggestions. The wire casing (SCREAMING_SNAKE)
//! matches what the settings/overlay surfaces already expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw text sample with its capture time. Ephemeral — owned by the
/// caller's rolling history, never persisted by this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSample {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ContextSample {
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The kind of conversation the user is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingType {
    TechnicalInterview,
    BehavioralInterview,
    SalesCall,
    VcPitch,
    GeneralMeeting,
    Unknown,
}

/// Where in the conversation we are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingPhase {
    Intro,
    MainDiscussion,
    QAndA,
    Closing,
}

/// The kind of a detected key moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MomentKind {
    Question,
    Objection,
    Decision,
    /// Part of the fixed contract; no current heuristic emits it.
    Transition,
}

/// A notable sentence in the recent transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMoment {
    pub kind: MomentKind,
    /// The sentence that triggered detection.
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Fixed heuristic constant per category, not a computed probability.
    pub confidence: f32,
    /// Category-specific refinement (TECHNICAL, RESISTANCE, AGREEMENT, ...).
    pub subtype: String,
}

/// The kind of a "what's likely next" prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredictionKind {
    NextQuestion,
    NextObjection,
}

/// A heuristic prediction of what the other party will do next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub kind: PredictionKind,
    pub content: String,
    /// Likelihood estimate in [0, 1].
    pub probability: f32,
    /// How ready the copilot is to answer it, in [0, 1].
    pub preparedness: f32,
}

/// An actionable intent spotted in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    ScheduleMeeting,
    SendEmail,
}

/// The full output of one classification pass. Total — produced for every
/// input, with the general type and confidence 0 when nothing matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextAnalysis {
    pub meeting_type: MeetingType,
    /// Classification confidence in [0, 1].
    pub confidence: f32,
    pub phase: MeetingPhase,
    /// Moments in detection order.
    pub moments: Vec<KeyMoment>,
    /// Zero or one prediction per classified type.
    pub predictions: Vec<Prediction>,
    /// One suggestion per triggering moment/prediction, in detection order.
    pub suggestions: Vec<String>,
}
