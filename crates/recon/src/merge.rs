//! Reference merger: idempotent injection of proposed references.
//!
//! Works on its own copy of the persisted entities; the collections
//! used for matching are never touched. Never removes or reorders
//! existing references, and never writes a second reference with the
//! same (authority, uri) pair — repeated merges of the same report
//! change nothing.

use std::collections::HashMap;

use metrodb_core::{CanonicalEntity, ExternalReference, Vocabulary};

use crate::model::MissingReferenceGroup;

/// What a merge did. `entities` is the updated copy to persist.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub entities: Vec<CanonicalEntity>,
    pub added: usize,
    pub skipped_existing: usize,
    pub skipped_potential: usize,
    /// Group identifiers with no entity in the store. Skipped, never fatal;
    /// the caller logs them.
    pub unknown_ids: Vec<String>,
}

impl MergeOutcome {
    pub fn changed(&self) -> bool {
        self.added > 0
    }
}

/// Apply missing-reference groups to a copy of `canonicals`.
///
/// Proposals with a potential reason (symbol, partial substring) are
/// dropped unless `include_potential` is set. Entities are addressed
/// by their primary identifier; unknown identifiers are collected,
/// not raised.
pub fn merge(
    groups: &[MissingReferenceGroup],
    canonicals: &[CanonicalEntity],
    vocabulary: Vocabulary,
    include_potential: bool,
) -> MergeOutcome {
    let mut entities = canonicals.to_vec();
    let authority = vocabulary.authority();

    let index: HashMap<String, usize> = entities
        .iter()
        .enumerate()
        .filter_map(|(slot, e)| e.primary_id().map(|id| (id.to_string(), slot)))
        .collect();

    let mut outcome = MergeOutcome {
        entities: Vec::new(),
        added: 0,
        skipped_existing: 0,
        skipped_potential: 0,
        unknown_ids: Vec::new(),
    };

    for group in groups {
        let Some(&slot) = index.get(&group.canonical_id) else {
            outcome.unknown_ids.push(group.canonical_id.clone());
            continue;
        };

        for proposal in &group.proposals {
            if proposal.reason.is_potential() && !include_potential {
                outcome.skipped_potential += 1;
                continue;
            }
            if entities[slot].has_reference(authority, &proposal.uri) {
                outcome.skipped_existing += 1;
                continue;
            }
            entities[slot].references.push(ExternalReference {
                uri: proposal.uri.clone(),
                authority: authority.to_string(),
                kind: proposal.reason.ref_kind(),
            });
            outcome.added += 1;
        }
    }

    outcome.entities = entities;
    outcome
}
