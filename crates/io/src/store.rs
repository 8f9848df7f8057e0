//! Canonical YAML store.
//!
//! One file per entity type under a store directory. Each file is an
//! optional leading `#` comment header, a `schema_version`, and an
//! `entities` sequence. Writes preserve the header verbatim, and
//! fields this tool does not interpret round-trip through the
//! entity's flattened `extra` map — a write that only adds references
//! leaves everything else intact.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use metrodb_core::{CanonicalEntity, EntityType};

use crate::error::IoError;

pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Header written for a collection that does not exist yet.
const DEFAULT_HEADER: &str = "# metrodb canonical store\n";

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default = "schema_version_default")]
    schema_version: u32,
    #[serde(default)]
    entities: Vec<CanonicalEntity>,
}

fn schema_version_default() -> u32 {
    STORE_SCHEMA_VERSION
}

/// Load one collection. A missing file is an empty collection, a
/// malformed file is an error.
pub fn load_collection(dir: &Path, entity_type: EntityType) -> Result<Vec<CanonicalEntity>, IoError> {
    let path = dir.join(entity_type.file_name());
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(&path).map_err(|e| IoError::Read {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    let file: StoreFile = serde_yaml::from_str(&text).map_err(|e| IoError::StoreParse {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    Ok(file.entities)
}

/// Load every collection present under `dir`.
pub fn load_store(dir: &Path) -> Result<BTreeMap<EntityType, Vec<CanonicalEntity>>, IoError> {
    let mut store = BTreeMap::new();
    for entity_type in EntityType::ALL {
        store.insert(entity_type, load_collection(dir, entity_type)?);
    }
    Ok(store)
}

/// Write one collection back, keeping the existing file's comment
/// header verbatim (or the default header for a new file).
pub fn write_collection(
    dir: &Path,
    entity_type: EntityType,
    entities: &[CanonicalEntity],
) -> Result<(), IoError> {
    let path = dir.join(entity_type.file_name());

    let header = match fs::read_to_string(&path) {
        Ok(existing) => comment_header(&existing),
        Err(_) => DEFAULT_HEADER.to_string(),
    };

    let file = StoreFile {
        schema_version: STORE_SCHEMA_VERSION,
        entities: entities.to_vec(),
    };
    let body = serde_yaml::to_string(&file).map_err(|e| IoError::Write {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;

    fs::write(&path, format!("{header}{body}")).map_err(|e| IoError::Write {
        path: path.display().to_string(),
        detail: e.to_string(),
    })
}

/// The leading comment block of a store file: every line up to the
/// first non-comment, non-blank line.
fn comment_header(text: &str) -> String {
    let mut header = String::new();
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') || trimmed.is_empty() {
            header.push_str(line);
            header.push('\n');
        } else {
            break;
        }
    }
    header
}
