use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::retrieval::triggers::SemanticTrigger;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StrataConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub retrieval: RetrievalConfig,
    pub crisis: CrisisConfig,
    /// Entity trigger table. Replaces the built-in table when present.
    pub triggers: Vec<SemanticTrigger>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

/// Ranking and layering constants.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Deep-layer cap when the caller passes none.
    pub default_max_insights: usize,
    pub surface_limit: usize,
    pub mid_limit: usize,
    /// Insights at most this old keep full temporal weight.
    pub recency_window_days: i64,
    /// Insights at most this old qualify for mid.
    pub mid_window_days: i64,
    /// Exponential decay rate per day past the recency window.
    pub decay_rate: f64,
    /// Temporal weight never drops below this.
    pub decay_floor: f64,
    /// Recent insights at or above this effectiveness qualify for surface.
    pub surface_effectiveness: f64,
    /// Entity-matched insights at or above this composite score qualify for surface.
    pub surface_min_score: f64,
    /// Insights at or above this effectiveness qualify for mid.
    pub mid_effectiveness: f64,
    /// Non-anchor insights strictly above this effectiveness join the crisis surface.
    pub crisis_effectiveness: f64,
    /// Bonus per additional matched entity or theme.
    pub match_bonus: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CrisisConfig {
    /// Any one of these phrases (case-insensitive substring) signals crisis.
    pub phrases: Vec<String>,
    /// Intensifiers (case-insensitive substrings) counted for the long-message rule.
    pub intensity_markers: Vec<String>,
    /// Intensifier count that signals crisis in a long message.
    pub intensity_threshold: usize,
    /// Minimum message length (chars, exclusive) for the intensifier rule.
    pub intensity_min_length: usize,
}

impl Default for StrataConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            retrieval: RetrievalConfig::default(),
            crisis: CrisisConfig::default(),
            triggers: crate::retrieval::triggers::default_triggers(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_strata_dir()
            .join("insights.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_max_insights: 50,
            surface_limit: 3,
            mid_limit: 8,
            recency_window_days: 30,
            mid_window_days: 90,
            decay_rate: 0.02,
            decay_floor: 0.1,
            surface_effectiveness: 0.7,
            surface_min_score: 0.5,
            mid_effectiveness: 0.4,
            crisis_effectiveness: 0.8,
            match_bonus: 0.25,
        }
    }
}

impl Default for CrisisConfig {
    fn default() -> Self {
        let phrases = [
            "crisis",
            "emergency",
            "panic",
            "overwhelmed",
            "can't handle",
            "falling apart",
            "breaking down",
            "too much",
            "spiral",
        ];
        let markers = ["really", "so", "very", "extremely", "completely"];
        Self {
            phrases: phrases.iter().map(|s| s.to_string()).collect(),
            intensity_markers: markers.iter().map(|s| s.to_string()).collect(),
            intensity_threshold: 2,
            intensity_min_length: 100,
        }
    }
}

/// Returns `~/.strata/`, or `./.strata` when no home directory is known.
pub fn default_strata_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".strata")
}

/// Returns the default config file path: `~/.strata/config.toml`
pub fn default_config_path() -> PathBuf {
    default_strata_dir().join("config.toml")
}

impl StrataConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            StrataConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides (STRATA_DB, STRATA_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("STRATA_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("STRATA_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Reject constants that would make ranking meaningless.
    pub fn validate(&self) -> Result<()> {
        let r = &self.retrieval;
        for (name, value) in [
            ("surface_effectiveness", r.surface_effectiveness),
            ("mid_effectiveness", r.mid_effectiveness),
            ("crisis_effectiveness", r.crisis_effectiveness),
            ("decay_floor", r.decay_floor),
        ] {
            ensure!(
                (0.0..=1.0).contains(&value),
                "retrieval.{name} must be within [0, 1], got {value}"
            );
        }
        ensure!(r.decay_rate >= 0.0, "retrieval.decay_rate must not be negative");
        ensure!(r.match_bonus >= 0.0, "retrieval.match_bonus must not be negative");
        ensure!(
            r.surface_min_score >= 0.0,
            "retrieval.surface_min_score must not be negative"
        );
        ensure!(
            r.recency_window_days >= 0 && r.mid_window_days >= r.recency_window_days,
            "retrieval windows must satisfy 0 <= recency_window_days <= mid_window_days"
        );
        for trigger in &self.triggers {
            ensure!(!trigger.entity.trim().is_empty(), "trigger entity must not be blank");
        }
        Ok(())
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = StrataConfig::default();
        config.validate().unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.retrieval.surface_limit, 3);
        assert_eq!(config.retrieval.mid_limit, 8);
        assert_eq!(config.retrieval.decay_rate, 0.02);
        assert_eq!(config.triggers.len(), 4);
        assert!(config.storage.db_path.ends_with("insights.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[logging]
level = "debug"

[storage]
db_path = "/tmp/test.db"

[retrieval]
surface_limit = 5

[[triggers]]
entity = "work"
keywords = ["deadline", "manager"]
max_surface_insights = 1
"#;
        let config: StrataConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.retrieval.surface_limit, 5);
        // defaults still apply for unset fields
        assert_eq!(config.retrieval.mid_limit, 8);
        assert_eq!(config.crisis.intensity_threshold, 2);
        assert_eq!(config.triggers.len(), 1);
        assert_eq!(config.triggers[0].entity, "work");
        assert_eq!(config.triggers[0].max_surface_insights, 1);
    }

    #[test]
    fn invalid_thresholds_rejected() {
        let mut config = StrataConfig::default();
        config.retrieval.crisis_effectiveness = 1.5;
        assert!(config.validate().is_err());

        let mut config = StrataConfig::default();
        config.retrieval.mid_window_days = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = StrataConfig::default();
        std::env::set_var("STRATA_DB", "/tmp/override.db");
        std::env::set_var("STRATA_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.logging.level, "trace");

        std::env::remove_var("STRATA_DB");
        std::env::remove_var("STRATA_LOG_LEVEL");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = StrataConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.retrieval, RetrievalConfig::default());
    }
}
