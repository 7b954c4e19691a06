//! Crisis-language detection.
//!
//! Two rules, either suffices:
//! - any configured phrase occurs as a case-insensitive substring;
//! - a long message carries enough intensifiers ("really", "so", ...), also
//!   matched as substrings so stretched spellings like "sooooo" still count.

use crate::config::CrisisConfig;
use crate::insight::assess::normalize;

#[derive(Debug, Clone)]
pub struct CrisisDetector {
    phrases: Vec<String>,
    intensity_markers: Vec<String>,
    intensity_threshold: usize,
    intensity_min_length: usize,
}

impl CrisisDetector {
    pub fn new(config: &CrisisConfig) -> Self {
        let clean = |items: &[String]| {
            items
                .iter()
                .map(|p| normalize(p.trim()))
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
        };
        Self {
            phrases: clean(&config.phrases),
            intensity_markers: clean(&config.intensity_markers),
            intensity_threshold: config.intensity_threshold,
            intensity_min_length: config.intensity_min_length,
        }
    }

    pub fn is_crisis(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let haystack = normalize(text);

        if self.phrases.iter().any(|p| haystack.contains(p.as_str())) {
            return true;
        }

        if self.intensity_threshold == 0 || text.chars().count() <= self.intensity_min_length {
            return false;
        }
        let intensity = self
            .intensity_markers
            .iter()
            .filter(|m| haystack.contains(m.as_str()))
            .count();
        intensity >= self.intensity_threshold
    }
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self::new(&CrisisConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrases_fire() {
        let detector = CrisisDetector::default();
        assert!(detector.is_crisis("everything is falling apart"));
        assert!(detector.is_crisis("I CAN'T HANDLE this"));
        assert!(detector.is_crisis("I can\u{2019}t handle this"));
        assert!(detector.is_crisis("it's all too much"));
    }

    #[test]
    fn substring_matches_are_accepted() {
        // "panicked" contains "panic"; the bias is toward firing
        assert!(CrisisDetector::default().is_crisis("I panicked at school"));
    }

    #[test]
    fn calm_text_does_not_fire() {
        let detector = CrisisDetector::default();
        assert!(!detector.is_crisis("I'm worried about trusting A"));
        assert!(!detector.is_crisis(""));
        assert!(!detector.is_crisis("   "));
    }

    #[test]
    fn long_intense_message_fires() {
        let detector = CrisisDetector::default();
        let text = "I am really tired today and everything feels completely wrong, \
                    nothing I try seems to help and I do not know what to do next";
        assert!(text.chars().count() > 100);
        assert!(detector.is_crisis(text));
    }

    #[test]
    fn short_intense_message_does_not_fire() {
        let detector = CrisisDetector::default();
        assert!(!detector.is_crisis("really completely fine"));
    }

    #[test]
    fn stretched_intensifiers_fire() {
        let detector = CrisisDetector::default();
        let text = "I'm sooooo tired of all of this and it is reallyyyy getting to me today, \
                    I do not know how to keep going on like this anymore";
        assert!(text.chars().count() > 100);
        assert!(detector.is_crisis(text));
    }
}
