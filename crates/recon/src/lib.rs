//! `metrodb-recon` — vocabulary reconciliation engine.
//!
//! Pure engine crate: receives materialized entity lists, returns
//! classified reports. No CLI or IO dependencies. The matching
//! computation is total and side-effect-free; the only mutation point
//! is the reference merger, which works on its own copy.

pub mod engine;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod strategy;
pub mod uniqueness;

pub use engine::reconcile;
pub use merge::{merge, MergeOutcome};
pub use model::{Direction, MatchOutcome, MatchReason, ReconciliationReport};
