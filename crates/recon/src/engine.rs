//! Reconciliation engine: forward and reverse classification passes.
//!
//! Two independent passes produce symmetric but not mirror-identical
//! results. The reverse pass trusts existing references for the
//! authority under test without re-validating their URIs against the
//! snapshot — idempotence over drift detection; a stale reference is
//! reported as matched. Known limitation, not a defect.

use std::collections::{HashMap, HashSet};

use metrodb_core::{CanonicalEntity, EntityType, ExternalEntity, Vocabulary};

use crate::model::{
    Candidate, Direction, DirectionCounts, FromExternalEntry, MatchOutcome, MatchReason,
    MissingReferenceGroup, ReconMeta, ReconSummary, ReconciliationReport, ReferenceProposal,
    ToExternalEntry,
};
use crate::strategy::{applies, cascade};

/// Classify `externals` against `canonicals` for one entity type.
///
/// Total: no match is `Unmatched`, an unknown entity-type string
/// yields an empty report. Inputs are never mutated, and identical
/// inputs produce identical reports in identical order; ties among
/// equally-ranked candidates keep input order, earliest first.
pub fn reconcile(
    entity_type: &str,
    externals: &[ExternalEntity],
    canonicals: &[CanonicalEntity],
    vocabulary: Vocabulary,
    direction: Direction,
) -> ReconciliationReport {
    let parsed = EntityType::from_str_loose(entity_type);
    let meta = ReconMeta {
        authority: vocabulary.authority().to_string(),
        entity_type: parsed
            .map(|t| t.to_string())
            .unwrap_or_else(|| entity_type.to_string()),
        direction,
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let mut summary = ReconSummary {
        external_total: externals.len(),
        canonical_total: canonicals.len(),
        ..Default::default()
    };

    let Some(ty) = parsed else {
        return ReconciliationReport {
            meta,
            from_external: Vec::new(),
            to_external: Vec::new(),
            missing_references: Vec::new(),
            summary,
        };
    };

    let mut groups = GroupCollector::default();

    let from_external = if matches!(direction, Direction::Forward | Direction::Both) {
        forward_pass(ty, externals, canonicals, &mut groups)
    } else {
        Vec::new()
    };

    let to_external = if matches!(direction, Direction::Reverse | Direction::Both) {
        reverse_pass(ty, externals, canonicals, vocabulary.authority(), &mut groups)
    } else {
        Vec::new()
    };

    summary.from_external = count_outcomes(from_external.iter().map(|e| &e.outcome));
    summary.to_external = count_outcomes(to_external.iter().map(|e| &e.outcome));
    summary.proposals = groups.proposal_count();

    ReconciliationReport {
        meta,
        from_external,
        to_external,
        missing_references: groups.groups,
        summary,
    }
}

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

/// External → canonical. Every qualifying canonical entity is kept as
/// a candidate; the engine never silently drops extras.
fn forward_pass(
    ty: EntityType,
    externals: &[ExternalEntity],
    canonicals: &[CanonicalEntity],
    groups: &mut GroupCollector,
) -> Vec<FromExternalEntry> {
    let mut entries = Vec::with_capacity(externals.len());

    for external in externals {
        let mut outcome = MatchOutcome::Unmatched;

        for strategy in cascade(ty) {
            let hits: Vec<&CanonicalEntity> = canonicals
                .iter()
                .filter(|c| applies(*strategy, c, external))
                .collect();
            if hits.is_empty() {
                continue;
            }

            let reason = strategy.reason();
            let mut seen = HashSet::new();
            let mut candidates = Vec::new();
            for canonical in &hits {
                let key = (
                    canonical.primary_id().map(str::to_string),
                    external.uri.clone(),
                );
                if key.0.is_some() && !seen.insert(key) {
                    continue;
                }
                candidates.push(candidate(canonical, &external.uri, &external.label));
                if reason != MatchReason::IdentifierExact {
                    groups.add(canonical, &external.uri, reason);
                }
            }

            outcome = classify(reason, candidates);
            break;
        }

        entries.push(FromExternalEntry {
            uri: external.uri.clone(),
            label: external.label.clone(),
            outcome,
        });
    }

    entries
}

/// Canonical → external. A recorded reference for the authority under
/// test short-circuits to `Matched`, the uri resolved from the
/// reference itself rather than a re-scan.
fn reverse_pass(
    ty: EntityType,
    externals: &[ExternalEntity],
    canonicals: &[CanonicalEntity],
    authority: &str,
    groups: &mut GroupCollector,
) -> Vec<ToExternalEntry> {
    let by_uri: HashMap<&str, &ExternalEntity> =
        externals.iter().map(|e| (e.uri.as_str(), e)).collect();

    let mut entries = Vec::with_capacity(canonicals.len());

    for canonical in canonicals {
        let outcome = if let Some(reference) = canonical.reference_for_authority(authority) {
            let external_label = by_uri
                .get(reference.uri.as_str())
                .map(|e| e.label.clone())
                .unwrap_or_default();
            MatchOutcome::Matched {
                reason: MatchReason::IdentifierExact,
                already_referenced: true,
                candidates: vec![Candidate {
                    canonical_id: canonical.primary_id().map(str::to_string),
                    canonical_label: canonical.display_label().to_string(),
                    external_uri: reference.uri.clone(),
                    external_label,
                }],
            }
        } else {
            scan_externals(ty, canonical, externals, groups)
        };

        entries.push(ToExternalEntry {
            canonical_id: canonical.primary_id().map(str::to_string),
            label: canonical.display_label().to_string(),
            outcome,
        });
    }

    entries
}

fn scan_externals(
    ty: EntityType,
    canonical: &CanonicalEntity,
    externals: &[ExternalEntity],
    groups: &mut GroupCollector,
) -> MatchOutcome {
    for strategy in cascade(ty) {
        let hits: Vec<&ExternalEntity> = externals
            .iter()
            .filter(|e| applies(*strategy, canonical, e))
            .collect();
        if hits.is_empty() {
            continue;
        }

        let reason = strategy.reason();
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for external in &hits {
            if !seen.insert(external.uri.clone()) {
                continue;
            }
            candidates.push(candidate(canonical, &external.uri, &external.label));
            if reason != MatchReason::IdentifierExact {
                groups.add(canonical, &external.uri, reason);
            }
        }

        return classify(reason, candidates);
    }

    MatchOutcome::Unmatched
}

// ---------------------------------------------------------------------------
// Classification helpers
// ---------------------------------------------------------------------------

fn classify(reason: MatchReason, candidates: Vec<Candidate>) -> MatchOutcome {
    if reason.is_potential() {
        MatchOutcome::Potential { reason, candidates }
    } else {
        MatchOutcome::Matched {
            reason,
            already_referenced: reason == MatchReason::IdentifierExact,
            candidates,
        }
    }
}

fn candidate(canonical: &CanonicalEntity, uri: &str, label: &str) -> Candidate {
    Candidate {
        canonical_id: canonical.primary_id().map(str::to_string),
        canonical_label: canonical.display_label().to_string(),
        external_uri: uri.to_string(),
        external_label: label.to_string(),
    }
}

fn count_outcomes<'a>(outcomes: impl Iterator<Item = &'a MatchOutcome>) -> DirectionCounts {
    let mut counts = DirectionCounts::default();
    for outcome in outcomes {
        match outcome {
            MatchOutcome::Matched { already_referenced: true, .. } => counts.matched += 1,
            MatchOutcome::Matched { already_referenced: false, .. } => {
                counts.missing_reference += 1
            }
            MatchOutcome::Potential { .. } => counts.potential += 1,
            MatchOutcome::Unmatched => counts.unmatched += 1,
        }
    }
    counts
}

/// Accumulates proposals grouped per canonical entity, suppressing
/// duplicate (canonical id, uri) pairs across both passes. Entities
/// without identifiers cannot be addressed by the merger and are not
/// collected.
#[derive(Default)]
struct GroupCollector {
    groups: Vec<MissingReferenceGroup>,
    index: HashMap<String, usize>,
    seen: HashSet<(String, String)>,
}

impl GroupCollector {
    fn add(&mut self, canonical: &CanonicalEntity, uri: &str, reason: MatchReason) {
        let Some(id) = canonical.primary_id() else {
            return;
        };
        if !self.seen.insert((id.to_string(), uri.to_string())) {
            return;
        }
        let slot = match self.index.get(id) {
            Some(&slot) => slot,
            None => {
                self.groups.push(MissingReferenceGroup {
                    canonical_id: id.to_string(),
                    canonical_label: canonical.display_label().to_string(),
                    proposals: Vec::new(),
                });
                let slot = self.groups.len() - 1;
                self.index.insert(id.to_string(), slot);
                slot
            }
        };
        self.groups[slot]
            .proposals
            .push(ReferenceProposal { uri: uri.to_string(), reason });
    }

    fn proposal_count(&self) -> usize {
        self.seen.len()
    }
}
