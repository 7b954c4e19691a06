//! The read path: query text in, three ranked layers out.
//!
//! [`triggers`] and [`crisis`] inspect the query independently, [`scorer`]
//! weights and orders every candidate, [`layering`] partitions the ranked list,
//! and [`engine`] ties them to a store and a clock.

pub mod crisis;
pub mod engine;
pub mod format;
pub mod layering;
pub mod scorer;
pub mod triggers;

pub use engine::{InsightEngine, RetrievalResult, RetrieveOptions};
