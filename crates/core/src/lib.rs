//! `metrodb-core` — shared entity and reference model.
//!
//! Plain data types used by the reconciliation engine, the store and
//! vocabulary adapters, and the CLI. No I/O, no matching logic.

pub mod dimension;
pub mod entity;
pub mod vocabulary;

pub use dimension::DimensionVector;
pub use entity::{
    CanonicalEntity, EntityType, ExternalEntity, ExternalReference, Identifier, LocalizedName,
    RefKind, SymbolRendering,
};
pub use vocabulary::Vocabulary;
