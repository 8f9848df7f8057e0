//! `metrodb-io` — store and vocabulary adapters.
//!
//! Everything that touches concrete syntax lives here: the canonical
//! YAML store, the SI digital framework and QUDT Turtle files, and
//! the UCUM essence XML. Adapters hand the engine fully typed entity
//! lists; every produced external entity has a non-empty uri and
//! absent optional fields are `None`.

pub mod error;
pub mod qudt;
pub mod si;
pub mod store;
pub mod turtle;
pub mod ucum;

pub use error::IoError;
