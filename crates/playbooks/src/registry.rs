//! The playbook registry: lookup, upsert, customize, detect.

use crate::catalog;
use sidecar_core::playbook::{Playbook, PlaybookOverrides};
use std::collections::HashMap;
use tracing::debug;

/// Holds every known playbook. Construct once at startup and pass by
/// reference; all lookups are total.
pub struct PlaybookRegistry {
    playbooks: HashMap<String, Playbook>,
}

impl Default for PlaybookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybookRegistry {
    /// Create a registry seeded with the fixed five-entry catalog.
    pub fn new() -> Self {
        let mut playbooks = HashMap::new();
        for playbook in catalog::seed() {
            playbooks.insert(playbook.id.clone(), playbook);
        }
        Self { playbooks }
    }

    /// Look up a playbook by id. Unknown ids resolve to the general
    /// playbook — never `None`, never a panic.
    pub fn get(&self, id: &str) -> &Playbook {
        self.playbooks.get(id).unwrap_or_else(|| {
            self.playbooks
                .get(catalog::GENERAL_MEETING)
                .expect("general playbook is always seeded")
        })
    }

    /// Insert or replace a playbook under its own id.
    pub fn upsert(&mut self, playbook: Playbook) {
        self.playbooks.insert(playbook.id.clone(), playbook);
    }

    /// Shallow-merge overrides onto the playbook at `id` (resolved with the
    /// usual fallback), store the result, and return it.
    pub fn customize(&mut self, id: &str, overrides: PlaybookOverrides) -> Playbook {
        let updated = self.get(id).merged(overrides);
        self.playbooks.insert(updated.id.clone(), updated.clone());
        updated
    }

    /// Pick the best playbook for the given context text and optional
    /// detected-application hint.
    ///
    /// A developer-tool hint short-circuits to the technical-interview
    /// playbook. Otherwise each non-general playbook is scored by substring
    /// hits of its detection patterns, in declaration order; a strictly
    /// greater score is required to displace the current best, so ties go
    /// to the first-declared playbook. Zero hits → general.
    pub fn detect(&self, context_text: &str, app_hint: Option<&str>) -> &Playbook {
        if let Some(app) = app_hint {
            let app = app.to_lowercase();
            if catalog::DEVELOPER_APPS.iter().any(|dev| app.contains(dev)) {
                debug!(app = %app, "developer app hint — short-circuit to technical interview");
                return self.get(catalog::TECHNICAL_INTERVIEW);
            }
        }

        let text = match app_hint {
            Some(app) => format!("{context_text} {app}").to_lowercase(),
            None => context_text.to_lowercase(),
        };

        let mut best: Option<&Playbook> = None;
        let mut max_hits = 0usize;

        for id in catalog::DETECTION_ORDER {
            let Some(playbook) = self.playbooks.get(id) else {
                continue;
            };
            let hits = playbook
                .detection_patterns
                .iter()
                .filter(|pattern| text.contains(pattern.as_str()))
                .count();
            if hits > max_hits {
                max_hits = hits;
                best = Some(playbook);
            }
        }

        match best {
            Some(playbook) if max_hits > 0 => {
                debug!(playbook = %playbook.id, hits = max_hits, "playbook detected");
                playbook
            }
            _ => self.get(catalog::GENERAL_MEETING),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidecar_core::playbook::{ContextPriority, ResponseFormat, Tone};

    #[test]
    fn unknown_id_resolves_to_general() {
        let registry = PlaybookRegistry::new();
        let pb = registry.get("definitely_not_a_playbook");
        assert_eq!(pb.id, catalog::GENERAL_MEETING);
    }

    #[test]
    fn known_ids_resolve_to_themselves() {
        let registry = PlaybookRegistry::new();
        for id in catalog::DETECTION_ORDER {
            assert_eq!(registry.get(id).id, id);
        }
    }

    #[test]
    fn detect_is_pure() {
        let registry = PlaybookRegistry::new();
        let text = "our pricing beats every competitor on cost";
        let a = registry.detect(text, None).id.clone();
        let b = registry.detect(text, None).id.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn developer_app_hint_short_circuits() {
        let registry = PlaybookRegistry::new();
        // Text screams sales, but the editor hint wins.
        let pb = registry.detect(
            "pricing budget discount contract deal",
            Some("Visual Studio Code"),
        );
        assert_eq!(pb.id, catalog::TECHNICAL_INTERVIEW);

        let pb = registry.detect("", Some("iTerm2 terminal"));
        assert_eq!(pb.id, catalog::TECHNICAL_INTERVIEW);
    }

    #[test]
    fn non_developer_hint_counts_toward_patterns() {
        let registry = PlaybookRegistry::new();
        // The hint text itself carries a detection pattern.
        let pb = registry.detect("quarterly check-in", Some("Salesforce pricing dashboard"));
        assert_eq!(pb.id, catalog::SALES_CALL);
    }

    #[test]
    fn keyword_hits_pick_best_match() {
        let registry = PlaybookRegistry::new();
        let pb = registry.detect("our mrr and arr support this valuation for the round", None);
        assert_eq!(pb.id, catalog::VC_PITCH);
    }

    #[test]
    fn zero_hits_falls_back_to_general() {
        let registry = PlaybookRegistry::new();
        let pb = registry.detect("nice weather today", None);
        assert_eq!(pb.id, catalog::GENERAL_MEETING);
    }

    #[test]
    fn ties_break_by_declaration_order() {
        let registry = PlaybookRegistry::new();
        // One hit each for technical ("algorithm") and sales ("pricing").
        // Technical is declared first and must win the tie.
        let pb = registry.detect("the algorithm behind our pricing", None);
        assert_eq!(pb.id, catalog::TECHNICAL_INTERVIEW);
    }

    #[test]
    fn upsert_adds_custom_playbook() {
        let mut registry = PlaybookRegistry::new();
        registry.upsert(Playbook {
            id: "standup".into(),
            name: "Standup Helper".into(),
            description: "Daily standup notes".into(),
            detection_patterns: vec!["yesterday".into(), "blockers".into()],
            system_prompt: "Summarize blockers.".into(),
            response_format: ResponseFormat {
                include_code: false,
                include_complexity: false,
                use_star_method: false,
                include_metrics: false,
                tone: Tone::Casual,
                max_length: 400,
            },
            context_priority: ContextPriority {
                screen: 0.2,
                audio: 0.8,
                history: 0.0,
            },
        });
        assert_eq!(registry.get("standup").name, "Standup Helper");
    }

    #[test]
    fn customize_shallow_merges_and_persists() {
        let mut registry = PlaybookRegistry::new();
        let updated = registry.customize(
            catalog::SALES_CALL,
            PlaybookOverrides {
                system_prompt: Some("Close harder.".into()),
                ..Default::default()
            },
        );
        assert_eq!(updated.system_prompt, "Close harder.");
        // Untouched fields survive
        assert_eq!(updated.name, "Sales Copilot");
        // And the change sticks
        assert_eq!(registry.get(catalog::SALES_CALL).system_prompt, "Close harder.");
    }

    #[test]
    fn customize_unknown_id_customizes_the_fallback() {
        let mut registry = PlaybookRegistry::new();
        let updated = registry.customize(
            "missing",
            PlaybookOverrides {
                name: Some("Renamed".into()),
                ..Default::default()
            },
        );
        // Resolution falls back to general before merging.
        assert_eq!(updated.id, catalog::GENERAL_MEETING);
        assert_eq!(registry.get(catalog::GENERAL_MEETING).name, "Renamed");
    }
}
