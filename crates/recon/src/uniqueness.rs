//! Auxiliary uniqueness checker.
//!
//! `short` uniqueness is a soft invariant of the canonical store: the
//! reconciliation engine never enforces it, this checker reports
//! violations for a human to resolve. Near-identical identifiers are
//! listed as well, using edit distance purely for reporting.

use std::collections::BTreeMap;

use serde::Serialize;

use metrodb_core::CanonicalEntity;

use crate::normalize::levenshtein;

/// Identifier pairs at or under this edit distance are worth a look.
const SIMILARITY_MAX_DISTANCE: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateShort {
    pub short: String,
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarIdentifiers {
    pub a: String,
    pub b: String,
    pub distance: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UniquenessFindings {
    pub duplicate_shorts: Vec<DuplicateShort>,
    pub similar_identifiers: Vec<SimilarIdentifiers>,
}

impl UniquenessFindings {
    pub fn is_clean(&self) -> bool {
        self.duplicate_shorts.is_empty() && self.similar_identifiers.is_empty()
    }
}

/// Scan one collection for duplicate short codes and near-identical
/// identifiers. Findings are report data, not errors.
pub fn check_collection(entities: &[CanonicalEntity]) -> UniquenessFindings {
    let mut by_short: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entity in entities {
        if let Some(short) = &entity.short {
            by_short
                .entry(short.to_lowercase())
                .or_default()
                .push(entity.primary_id().unwrap_or("(no id)").to_string());
        }
    }

    let duplicate_shorts = by_short
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(short, ids)| DuplicateShort { short, ids })
        .collect();

    let ids: Vec<&str> = entities.iter().filter_map(|e| e.primary_id()).collect();
    let mut similar_identifiers = Vec::new();
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            if a == b {
                continue;
            }
            let distance = levenshtein(a, b);
            if distance <= SIMILARITY_MAX_DISTANCE {
                similar_identifiers.push(SimilarIdentifiers {
                    a: (*a).to_string(),
                    b: (*b).to_string(),
                    distance,
                });
            }
        }
    }

    UniquenessFindings { duplicate_shorts, similar_identifiers }
}
