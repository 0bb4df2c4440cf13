//! Incremental classification over a rolling transcript.
//!
//! Transcription collaborators deliver text in small chunks. The analyzer
//! keeps a bounded rolling history (oldest chunk dropped past the cap) and
//! re-runs a full classification over the concatenated history on every
//! push — no incremental/delta classification.

use crate::classifier::ContextClassifier;
use sidecar_core::classification::{ContextAnalysis, ContextSample};
use std::collections::VecDeque;

/// Maximum retained transcript chunks.
const HISTORY_LIMIT: usize = 50;

/// Stateful wrapper around [`ContextClassifier`] for streaming input.
pub struct StreamingAnalyzer {
    classifier: ContextClassifier,
    history: VecDeque<ContextSample>,
    limit: usize,
}

impl Default for StreamingAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingAnalyzer {
    /// Create an analyzer with the default history cap.
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    /// Create an analyzer with a custom history cap.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            classifier: ContextClassifier::new(),
            history: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Feed one transcript chunk and re-classify the whole history.
    /// Empty chunks are ignored and produce no analysis.
    pub fn push(&mut self, chunk: &str, screen_text: &str) -> Option<ContextAnalysis> {
        if chunk.is_empty() {
            return None;
        }

        self.history.push_back(ContextSample::now(chunk));
        if self.history.len() > self.limit {
            self.history.pop_front();
        }

        let full = self
            .history
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Some(self.classifier.analyze(&full, screen_text))
    }

    /// Number of retained chunks.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Discard all retained history.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}
