//! Key-moment detection over recent sentences.
//!
//! Only the last few sentence segments matter: a moment is something the
//! user should react to *now*. Segmentation uses UAX #29 sentence
//! boundaries, not naive period-splitting, so abbreviations and decimal
//! points don't produce phantom moments.
//!
//! Per-category confidences are fixed heuristic constants, not computed
//! probabilities.

use chrono::Utc;
use regex_lite::Regex;
use sidecar_core::classification::{KeyMoment, MomentKind};
use unicode_segmentation::UnicodeSegmentation;

/// How many trailing sentence segments to scan.
const RECENT_SENTENCES: usize = 3;

/// Fixed confidence for each detected question.
pub const QUESTION_CONFIDENCE: f32 = 0.8;
/// Fixed confidence for each detected objection.
pub const OBJECTION_CONFIDENCE: f32 = 0.85;
/// Fixed confidence for each detected decision.
pub const DECISION_CONFIDENCE: f32 = 0.9;

/// Scan the last [`RECENT_SENTENCES`] segments of `text` for questions,
/// objections, and decisions, in detection order.
pub fn detect_key_moments(text: &str) -> Vec<KeyMoment> {
    let sentences: Vec<&str> = text.unicode_sentences().collect();
    let recent = sentences
        .iter()
        .skip(sentences.len().saturating_sub(RECENT_SENTENCES));

    let mut moments = Vec::new();

    for segment in recent {
        let lower = segment.to_lowercase();
        let trimmed = segment.trim();

        // Questions: terminal "?" or a leading interrogative
        if trimmed.ends_with('?')
            || lower.starts_with("how")
            || lower.starts_with("what")
            || lower.starts_with("why")
        {
            moments.push(KeyMoment {
                kind: MomentKind::Question,
                text: trimmed.to_string(),
                timestamp: Utc::now(),
                confidence: QUESTION_CONFIDENCE,
                subtype: classify_question(trimmed),
            });
        }

        // Objections: resistance phrases
        if lower.contains("too expensive") || lower.contains("not sure") || lower.contains("concerns")
        {
            moments.push(KeyMoment {
                kind: MomentKind::Objection,
                text: trimmed.to_string(),
                timestamp: Utc::now(),
                confidence: OBJECTION_CONFIDENCE,
                subtype: "RESISTANCE".into(),
            });
        }

        // Decisions: agreement phrases
        if lower.contains("sounds good") || lower.contains("let's do it") || lower.contains("agree")
        {
            moments.push(KeyMoment {
                kind: MomentKind::Decision,
                text: trimmed.to_string(),
                timestamp: Utc::now(),
                confidence: DECISION_CONFIDENCE,
                subtype: "AGREEMENT".into(),
            });
        }
    }

    moments
}

/// Refine a question into a coarse subtype.
fn classify_question(question: &str) -> String {
    let technical = Regex::new("(?i)how|implement|code|complexity").expect("static pattern");
    let behavioral = Regex::new("(?i)tell me about|situation|example").expect("static pattern");

    if technical.is_match(question) {
        "TECHNICAL".into()
    } else if behavioral.is_match(question) {
        "BEHAVIORAL".into()
    } else {
        "GENERAL".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objection_scenario_has_fixed_confidence() {
        let moments = detect_key_moments("That seems too expensive for our budget right now");
        let objection = moments
            .iter()
            .find(|m| m.kind == MomentKind::Objection)
            .expect("objection detected");
        assert_eq!(objection.confidence, OBJECTION_CONFIDENCE);
        assert_eq!(objection.subtype, "RESISTANCE");
    }

    #[test]
    fn question_by_terminal_mark() {
        let moments = detect_key_moments("The demo went well. Could we revisit the roadmap?");
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].kind, MomentKind::Question);
        assert_eq!(moments[0].confidence, QUESTION_CONFIDENCE);
        assert_eq!(moments[0].subtype, "GENERAL");
    }

    #[test]
    fn question_by_interrogative_word() {
        let moments = detect_key_moments("What happens when the cache fills up");
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].kind, MomentKind::Question);
    }

    #[test]
    fn question_subtypes() {
        let technical = detect_key_moments("How would you implement this?");
        assert_eq!(technical[0].subtype, "TECHNICAL");

        let behavioral = detect_key_moments("Tell me about a situation like that?");
        assert_eq!(behavioral[0].subtype, "BEHAVIORAL");
    }

    #[test]
    fn decision_detection() {
        let moments = detect_key_moments("Sounds good, let's move forward.");
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].kind, MomentKind::Decision);
        assert_eq!(moments[0].confidence, DECISION_CONFIDENCE);
        assert_eq!(moments[0].subtype, "AGREEMENT");
    }

    #[test]
    fn only_last_three_sentences_scanned() {
        let text = "Is this in scope? Filler one. Filler two. Filler three. Filler four.";
        // The question is the 1st of 5 sentences — outside the window.
        assert!(detect_key_moments(text).is_empty());
    }

    #[test]
    fn decimal_points_do_not_split_sentences() {
        // Naive period-splitting would cut "2.5" in half and shift the
        // three-sentence window off the trailing decision.
        let text =
            "Latency dropped to 2.5 ms in staging. The budget is set. Sounds good to me.";
        let moments = detect_key_moments(text);
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].kind, MomentKind::Decision);
    }

    #[test]
    fn one_sentence_can_yield_multiple_moments() {
        let moments = detect_key_moments("I agree, but is it too expensive?");
        let kinds: Vec<MomentKind> = moments.iter().map(|m| m.kind).collect();
        assert!(kinds.contains(&MomentKind::Question));
        assert!(kinds.contains(&MomentKind::Objection));
        assert!(kinds.contains(&MomentKind::Decision));
    }

    #[test]
    fn empty_text_yields_no_moments() {
        assert!(detect_key_moments("").is_empty());
    }
}
