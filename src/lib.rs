//! Layered insight retrieval over a local SQLite store.
//!
//! Strata stores short text "insights" tagged with entities and themes and, given
//! free-text input, returns the ones worth bringing up now in three layers of
//! decreasing immediacy:
//!
//! | Layer | Holds | Cap |
//! |-------|-------|-----|
//! | **Surface** | entity-matched anchors, recent effective insights, strong matches | 3, plus a per-entity cap |
//! | **Mid** | other relevant insights: recent, moderately effective, or theme matches | 8 |
//! | **Deep** | everything else, in rank order | `max_insights` |
//!
//! When the input reads as distress, crisis mode drops the caps and puts every
//! anchor and every highly effective insight in the surface layer.
//!
//! # Insight types
//!
//! | Type | Decays | Default effectiveness |
//! |------|--------|-----------------------|
//! | **Anchor** | never | 1.0 |
//! | **Breakthrough** | yes | assessed from content |
//! | **Strategy** | yes | assessed from content |
//! | **Observation** | yes | assessed from content |
//!
//! # Modules
//!
//! - [`config`]: TOML configuration with environment overrides
//! - [`db`]: SQLite open, pragmas, and schema
//! - [`insight`]: insight records, storage, lifecycle, and statistics
//! - [`retrieval`]: trigger and crisis detection, scoring, layering, and the engine
//! - [`clock`]: injectable time source
//! - [`error`]: library error type

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod insight;
pub mod retrieval;
