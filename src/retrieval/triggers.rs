//! Trigger detection: which entities does a piece of text talk about?
//!
//! Each [`SemanticTrigger`] maps an entity name to a keyword set and a surface
//! cap. Keywords match as case-insensitive substrings of the whole text; one hit
//! activates the entity. Several entities may activate from the same word.
//!
//! Entity names compare case-insensitively; the registry's spelling is the
//! canonical one reported back to callers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::insight::assess::normalize;

/// Whether two entity names refer to the same entity.
pub fn same_entity(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn default_max_surface() -> usize {
    3
}

/// Static trigger configuration for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticTrigger {
    pub entity: String,
    pub keywords: Vec<String>,
    /// How many insights tied to this entity may sit in the surface layer.
    #[serde(default = "default_max_surface")]
    pub max_surface_insights: usize,
}

impl SemanticTrigger {
    pub fn new(entity: &str, keywords: &[&str], max_surface_insights: usize) -> Self {
        Self {
            entity: entity.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            max_surface_insights,
        }
    }
}

/// The built-in trigger table.
pub fn default_triggers() -> Vec<SemanticTrigger> {
    vec![
        SemanticTrigger::new(
            "A",
            &["trust", "relationship", "trustworthy", "lucky", "word is enough"],
            3,
        ),
        SemanticTrigger::new(
            "N",
            &["boundaries", "parenting", "school", "hygiene", "anger", "structure"],
            3,
        ),
        SemanticTrigger::new("X", &["voice", "trauma", "inadequacy", "scanning", "x's voice"], 2),
        SemanticTrigger::new(
            "trauma_responses",
            &["activation", "triggered", "nervous system", "shutdown", "scanning", "trauma"],
            3,
        ),
    ]
}

/// Outcome of trigger detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TriggerMatch {
    /// Activated entities, in registry order.
    pub entities: Vec<String>,
    /// Every keyword that matched, sorted and deduplicated.
    pub keywords: Vec<String>,
}

impl TriggerMatch {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Immutable entity → keywords → cap table, built once at startup.
#[derive(Debug, Clone)]
pub struct TriggerRegistry {
    triggers: Vec<SemanticTrigger>,
}

impl TriggerRegistry {
    /// Normalize keywords (lowercase, trimmed, non-empty, unique) and merge
    /// repeated entity entries; the first entry's cap wins.
    pub fn new(triggers: Vec<SemanticTrigger>) -> Self {
        let mut merged: Vec<SemanticTrigger> = Vec::new();
        for trigger in triggers {
            let entity = trigger.entity.trim().to_string();
            let keywords = trigger
                .keywords
                .iter()
                .map(|k| normalize(k.trim()))
                .filter(|k| !k.is_empty());

            match merged.iter_mut().find(|t| same_entity(&t.entity, &entity)) {
                Some(existing) => {
                    for k in keywords {
                        if !existing.keywords.contains(&k) {
                            existing.keywords.push(k);
                        }
                    }
                }
                None => {
                    let mut unique: Vec<String> = Vec::new();
                    for k in keywords {
                        if !unique.contains(&k) {
                            unique.push(k);
                        }
                    }
                    merged.push(SemanticTrigger {
                        entity,
                        keywords: unique,
                        max_surface_insights: trigger.max_surface_insights,
                    });
                }
            }
        }
        Self { triggers: merged }
    }

    pub fn triggers(&self) -> &[SemanticTrigger] {
        &self.triggers
    }

    /// Surface cap for an entity, if it has a trigger.
    pub fn cap_for(&self, entity: &str) -> Option<usize> {
        self.triggers
            .iter()
            .find(|t| same_entity(&t.entity, entity))
            .map(|t| t.max_surface_insights)
    }

    /// Activated entities and matched keywords for `text`.
    pub fn detect(&self, text: &str) -> TriggerMatch {
        if text.trim().is_empty() {
            return TriggerMatch::default();
        }
        let haystack = normalize(text);

        let mut entities = Vec::new();
        let mut keywords = BTreeSet::new();
        for trigger in &self.triggers {
            let mut hit = false;
            for keyword in &trigger.keywords {
                if haystack.contains(keyword.as_str()) {
                    keywords.insert(keyword.clone());
                    hit = true;
                }
            }
            if hit {
                entities.push(trigger.entity.clone());
            }
        }

        TriggerMatch {
            entities,
            keywords: keywords.into_iter().collect(),
        }
    }
}

impl Default for TriggerRegistry {
    fn default() -> Self {
        Self::new(default_triggers())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_activates_entity() {
        let registry = TriggerRegistry::default();
        let m = registry.detect("I'm worried about trusting A");
        assert_eq!(m.entities, vec!["A"]);
        assert_eq!(m.keywords, vec!["trust"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let registry = TriggerRegistry::default();
        let m = registry.detect("PARENTING is hard");
        assert_eq!(m.entities, vec!["N"]);
    }

    #[test]
    fn overlapping_keywords_activate_several_entities() {
        let registry = TriggerRegistry::default();
        let m = registry.detect("the trauma keeps me scanning the room");
        assert_eq!(m.entities, vec!["X", "trauma_responses"]);
        assert_eq!(m.keywords, vec!["scanning", "trauma"]);
    }

    #[test]
    fn blank_input_activates_nothing() {
        let registry = TriggerRegistry::default();
        assert!(registry.detect("").is_empty());
        assert!(registry.detect("   \n\t").is_empty());
    }

    #[test]
    fn curly_apostrophe_matches_phrase_keyword() {
        let registry = TriggerRegistry::default();
        let m = registry.detect("X\u{2019}s voice again");
        assert_eq!(m.entities, vec!["X"]);
        assert!(m.keywords.contains(&"x's voice".to_string()));
    }

    #[test]
    fn registry_normalizes_and_merges() {
        let registry = TriggerRegistry::new(vec![
            SemanticTrigger::new(" work ", &["Deadline", "deadline", " "], 1),
            SemanticTrigger::new("work", &["manager"], 5),
        ]);
        assert_eq!(registry.triggers().len(), 1);
        assert_eq!(registry.triggers()[0].keywords, vec!["deadline", "manager"]);
        assert_eq!(registry.cap_for("work"), Some(1));
        assert_eq!(registry.cap_for("play"), None);
    }

    #[test]
    fn entity_names_ignore_case() {
        let registry = TriggerRegistry::new(vec![
            SemanticTrigger::new("Work", &["deadline"], 2),
            SemanticTrigger::new("work", &["manager"], 5),
        ]);
        assert_eq!(registry.triggers().len(), 1);
        assert_eq!(registry.triggers()[0].entity, "Work");
        assert_eq!(registry.cap_for("WORK"), Some(2));

        let m = registry.detect("my manager moved the deadline");
        assert_eq!(m.entities, vec!["Work"]);
        assert!(same_entity(&m.entities[0], " work "));
        assert!(!same_entity(&m.entities[0], "play"));
    }
}
