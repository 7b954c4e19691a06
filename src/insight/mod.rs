pub mod assess;
pub mod lifecycle;
pub mod stats;
pub mod store;
pub mod types;
