//! Core insight type definitions.
//!
//! Defines [`InsightType`] (the four insight categories), [`Insight`] (a stored
//! record), and [`NewInsight`] (a candidate accepted by the write path).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::InsightError;

/// The four insight categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    /// Timeless core truth. Never decays, always surfaced in crisis mode.
    Anchor,
    /// A shift in understanding.
    Breakthrough,
    /// Something tried, with an effectiveness attached.
    Strategy,
    /// Plain observation.
    Observation,
}

impl InsightType {
    pub const ALL: [InsightType; 4] = [
        Self::Anchor,
        Self::Breakthrough,
        Self::Strategy,
        Self::Observation,
    ];

    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anchor => "anchor",
            Self::Breakthrough => "breakthrough",
            Self::Strategy => "strategy",
            Self::Observation => "observation",
        }
    }

    /// Whether the temporal weight of this type decays with age.
    pub fn decays(&self) -> bool {
        match self {
            Self::Anchor => false,
            Self::Breakthrough | Self::Strategy | Self::Observation => true,
        }
    }

    /// Effectiveness assigned when the caller supplies none, if fixed by type.
    pub fn default_effectiveness(&self) -> Option<f64> {
        match self {
            Self::Anchor => Some(1.0),
            Self::Breakthrough | Self::Strategy | Self::Observation => None,
        }
    }

    /// Rendering label used by the conversation formatter.
    pub fn is_key(&self) -> bool {
        matches!(self, Self::Anchor | Self::Breakthrough)
    }
}

impl std::fmt::Display for InsightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InsightType {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anchor" => Ok(Self::Anchor),
            "breakthrough" => Ok(Self::Breakthrough),
            "strategy" => Ok(Self::Strategy),
            "observation" => Ok(Self::Observation),
            _ => Err(InsightError::Validation(format!("unknown insight type: {s}"))),
        }
    }
}

/// An insight record, matching the `insights` table schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// UUID v7 (time-sortable) primary key.
    pub id: String,
    /// Immutable text. Corrections are new insights that supersede this one.
    pub content: String,
    /// Entity names this insight is tied to.
    #[serde(default)]
    pub entities: BTreeSet<String>,
    /// Theme tags.
    #[serde(default)]
    pub themes: BTreeSet<String>,
    pub insight_type: InsightType,
    /// In `[0.0, 1.0]`.
    pub effectiveness_score: f64,
    /// Creation time, used for recency weighting.
    pub timestamp: DateTime<Utc>,
    /// Free-form label (early/middle/recent/current). Not used in scoring.
    pub growth_stage: String,
    /// ID of the insight this one replaced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<String>,
    /// ID of the replacement. Set means excluded from default retrieval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Insight {
    pub fn is_superseded(&self) -> bool {
        self.superseded_by.is_some()
    }

    /// Whole days between creation and `now`, never negative.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.timestamp).num_days().max(0)
    }
}

/// A candidate insight for [`crate::insight::lifecycle::add_insight`].
///
/// Missing fields are filled by the write path: id (UUID v7), timestamp (the
/// engine clock), type (breakthrough detection), and effectiveness (type
/// default or content assessment).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewInsight {
    pub content: String,
    pub entities: Vec<String>,
    pub themes: Vec<String>,
    pub insight_type: Option<InsightType>,
    pub effectiveness_score: Option<f64>,
    pub growth_stage: Option<String>,
    pub source_file: Option<String>,
    pub context: Option<String>,
    pub id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewInsight {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.entities.push(entity.into());
        self
    }

    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.themes.push(theme.into());
        self
    }

    pub fn kind(mut self, insight_type: InsightType) -> Self {
        self.insight_type = Some(insight_type);
        self
    }

    pub fn effectiveness(mut self, score: f64) -> Self {
        self.effectiveness_score = Some(score);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
