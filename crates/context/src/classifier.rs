//! Meeting-type classification, phase detection, predictions, suggestions.
//!
//! Scoring model: +1 per keyword substring hit (case-insensitive), +3 per
//! matching required pattern (patterns signal stronger intent than
//! bag-of-words), plus fixed per-type contextual boosts. The winner needs a
//! score above 2; anything at or below that falls back to the general type.

use crate::moments;
use regex_lite::Regex;
use sidecar_core::classification::{
    ContextAnalysis, Intent, KeyMoment, MeetingPhase, MeetingType, MomentKind, Prediction,
    PredictionKind,
};
use tracing::debug;

/// A single detection rule: keywords, optional stronger patterns, one type.
struct DetectionRule {
    meeting_type: MeetingType,
    keywords: &'static [&'static str],
    patterns: Vec<Regex>,
}

/// Score a rule must exceed for its type to win; at or below, the
/// conservative fallback to the general type applies.
const FALLBACK_SCORE: u32 = 2;

/// Divisor turning a raw score into a confidence, capped at 1.0.
const CONFIDENCE_SCALE: f32 = 5.0;

/// The context classifier. Stateless — create one and reuse it. For
/// incremental transcripts, wrap it in a [`crate::StreamingAnalyzer`].
pub struct ContextClassifier {
    rules: Vec<DetectionRule>,
}

impl Default for ContextClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextClassifier {
    /// Build the classifier with its fixed rule table.
    pub fn new() -> Self {
        let rule = |meeting_type, keywords, patterns: &[&str]| DetectionRule {
            meeting_type,
            keywords,
            patterns: patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){p}")).expect("static pattern compiles"))
                .collect(),
        };

        Self {
            rules: vec![
                rule(
                    MeetingType::TechnicalInterview,
                    &[
                        "algorithm",
                        "complexity",
                        "optimize",
                        "implement",
                        "database",
                        "system design",
                        "big o",
                        "latency",
                        "throughput",
                    ],
                    &["how would you", "write a function", "design a"],
                ),
                rule(
                    MeetingType::BehavioralInterview,
                    &[
                        "situation",
                        "task",
                        "action",
                        "result",
                        "tell me about a time",
                        "conflict",
                        "challenge",
                        "weakness",
                        "strength",
                    ],
                    &["tell me about", "describe a"],
                ),
                rule(
                    MeetingType::SalesCall,
                    &[
                        "pricing",
                        "roi",
                        "contract",
                        "timeline",
                        "budget",
                        "stakeholder",
                        "implementation",
                        "cost",
                        "value proposition",
                    ],
                    &["too expensive", "not sure", "send me a"],
                ),
                rule(
                    MeetingType::VcPitch,
                    &[
                        "market size",
                        "traction",
                        "burn rate",
                        "valuation",
                        "go-to-market",
                        "cac",
                        "ltv",
                        "seed",
                        "series a",
                    ],
                    &[],
                ),
                rule(
                    MeetingType::GeneralMeeting,
                    &[
                        "agenda",
                        "action items",
                        "follow up",
                        "next steps",
                        "sync",
                        "update",
                    ],
                    &[],
                ),
            ],
        }
    }

    /// Run one full classification pass. Total: never fails, always returns
    /// a value from the fixed enums.
    pub fn analyze(&self, transcript: &str, screen_text: &str) -> ContextAnalysis {
        let combined = if screen_text.is_empty() {
            transcript.to_string()
        } else {
            format!("{transcript} {screen_text}")
        };

        let (meeting_type, confidence) = self.classify(&combined, screen_text);
        let phase = Self::detect_phase(&combined);
        let moments = moments::detect_key_moments(&combined);
        let predictions = Self::predict_next(meeting_type, &moments);
        let suggestions = Self::suggestions(meeting_type, &moments, &predictions);

        debug!(?meeting_type, confidence, ?phase, moments = moments.len(), "classified context");

        ContextAnalysis {
            meeting_type,
            confidence,
            phase,
            moments,
            predictions,
            suggestions,
        }
    }

    /// Score every rule and pick the winner, with the conservative fallback
    /// to the general type when the best score is too weak to trust.
    fn classify(&self, combined: &str, screen_text: &str) -> (MeetingType, f32) {
        let text = combined.to_lowercase();
        let screen = screen_text.to_lowercase();

        let mut best = MeetingType::Unknown;
        let mut max_score = 0u32;

        for rule in &self.rules {
            let mut score = 0u32;

            for keyword in rule.keywords {
                if text.contains(keyword) {
                    score += 1;
                }
            }

            // Patterns imply stronger intent than bag-of-words
            for pattern in &rule.patterns {
                if pattern.is_match(&text) {
                    score += 3;
                }
            }

            // Context-specific boosts
            match rule.meeting_type {
                MeetingType::TechnicalInterview
                    if text.contains("code")
                        || screen.contains("function")
                        || screen.contains("class") =>
                {
                    score += 2;
                }
                MeetingType::VcPitch
                    if screen.contains("traction") || screen.contains("revenue") =>
                {
                    score += 2;
                }
                _ => {}
            }

            if score > max_score {
                max_score = score;
                best = rule.meeting_type;
            }
        }

        let confidence = (max_score as f32 / CONFIDENCE_SCALE).min(1.0);
        let meeting_type = if max_score > FALLBACK_SCORE {
            best
        } else {
            MeetingType::GeneralMeeting
        };

        (meeting_type, confidence)
    }

    /// Phase lookup in priority order: intro → Q&A → closing → default.
    /// Pure: identical input always yields identical output.
    pub fn detect_phase(text: &str) -> MeetingPhase {
        let lower = text.to_lowercase();
        if lower.contains("agenda") || lower.contains("welcome") {
            MeetingPhase::Intro
        } else if lower.contains("any questions") || lower.contains("ask me anything") {
            MeetingPhase::QAndA
        } else if lower.contains("next steps") || lower.contains("thank you for time") {
            MeetingPhase::Closing
        } else {
            MeetingPhase::MainDiscussion
        }
    }

    /// Zero or one heuristic prediction per classified type.
    fn predict_next(meeting_type: MeetingType, moments: &[KeyMoment]) -> Vec<Prediction> {
        let mut predictions = Vec::new();

        match meeting_type {
            MeetingType::TechnicalInterview => {
                let complexity_asked = moments
                    .iter()
                    .any(|m| m.text.contains("complexity") || m.text.contains("Big O"));
                if !complexity_asked {
                    predictions.push(Prediction {
                        kind: PredictionKind::NextQuestion,
                        content: "What is the time and space complexity?".into(),
                        probability: 0.8,
                        preparedness: 0.9,
                    });
                }
            }
            MeetingType::BehavioralInterview => {
                predictions.push(Prediction {
                    kind: PredictionKind::NextQuestion,
                    content: "What was the result of your actions?".into(),
                    probability: 0.7,
                    preparedness: 1.0,
                });
            }
            MeetingType::SalesCall => {
                predictions.push(Prediction {
                    kind: PredictionKind::NextObjection,
                    content: "Budget/Pricing concerns".into(),
                    probability: 0.6,
                    preparedness: 0.8,
                });
            }
            _ => {}
        }

        predictions
    }

    /// One suggestion per triggering moment, then one per high-probability
    /// prediction, in detection order.
    fn suggestions(
        meeting_type: MeetingType,
        moments: &[KeyMoment],
        predictions: &[Prediction],
    ) -> Vec<String> {
        let mut suggestions = Vec::new();

        for moment in moments {
            match moment.kind {
                MomentKind::Question => {
                    if meeting_type == MeetingType::BehavioralInterview {
                        suggestions
                            .push("Use STAR method: Situation, Task, Action, Result".into());
                    }
                    if meeting_type == MeetingType::TechnicalInterview {
                        suggestions.push("Clarify constraints before coding.".into());
                    }
                }
                MomentKind::Objection => {
                    suggestions.push("Acknowledge the concern, then pivot to value.".into());
                }
                MomentKind::Decision | MomentKind::Transition => {}
            }
        }

        for prediction in predictions {
            if prediction.probability > 0.7 {
                suggestions.push(format!("Prepare for: {}", prediction.content));
            }
        }

        suggestions
    }

    /// Actionable intents spotted in the transcript.
    pub fn extract_intents(transcript: &str) -> Vec<Intent> {
        let lower = transcript.to_lowercase();
        let mut intents = Vec::new();
        if lower.contains("schedule") || lower.contains("calendar") {
            intents.push(Intent::ScheduleMeeting);
        }
        if lower.contains("send") && lower.contains("email") {
            intents.push(Intent::SendEmail);
        }
        intents
    }
}
