use serde::Serialize;

use metrodb_core::RefKind;

// ---------------------------------------------------------------------------
// Match reasons
// ---------------------------------------------------------------------------

/// Why a candidate pairing was proposed. Carried in every outcome so
/// no shared lookup table is needed to recover "why did this match".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    IdentifierExact,
    SymbolExact,
    LabelExact,
    NameNormalized,
    DimensionVectorExact,
    MultiplierExact,
    PartialSubstring,
}

impl MatchReason {
    /// Symbol and substring matches are always treated as potential,
    /// even when textually exact: symbol collisions across unrelated
    /// quantities are common. Persisting them requires explicit opt-in.
    pub fn is_potential(&self) -> bool {
        matches!(self, Self::SymbolExact | Self::PartialSubstring)
    }

    /// Reference kind the merger writes for this reason.
    pub fn ref_kind(&self) -> RefKind {
        if self.is_potential() {
            RefKind::Informative
        } else {
            RefKind::Normative
        }
    }
}

impl std::fmt::Display for MatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdentifierExact => write!(f, "identifier_exact"),
            Self::SymbolExact => write!(f, "symbol_exact"),
            Self::LabelExact => write!(f, "label_exact"),
            Self::NameNormalized => write!(f, "name_normalized"),
            Self::DimensionVectorExact => write!(f, "dimension_vector_exact"),
            Self::MultiplierExact => write!(f, "multiplier_exact"),
            Self::PartialSubstring => write!(f, "partial_substring"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// One proposed counterpart pairing. Both sides are carried so the
/// same shape serves forward and reverse entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Canonical-side identifier, when the entity has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_id: Option<String>,
    pub canonical_label: String,
    pub external_uri: String,
    pub external_label: String,
}

/// Classification of one subject entity against the other collection.
///
/// `Matched` with `already_referenced: false` is the missing-reference
/// bucket: an exact-strategy pairing the canonical record does not yet
/// record. Multiple equally-ranked candidates are all kept; the caller
/// decides what to persist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched {
        reason: MatchReason,
        already_referenced: bool,
        candidates: Vec<Candidate>,
    },
    Potential {
        reason: MatchReason,
        candidates: Vec<Candidate>,
    },
    Unmatched,
}

impl MatchOutcome {
    pub fn is_unmatched(&self) -> bool {
        matches!(self, Self::Unmatched)
    }
}

/// Forward-pass entry: one external entity classified against the
/// canonical collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FromExternalEntry {
    pub uri: String,
    pub label: String,
    pub outcome: MatchOutcome,
}

/// Reverse-pass entry: one canonical entity classified against the
/// external collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToExternalEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_id: Option<String>,
    pub label: String,
    pub outcome: MatchOutcome,
}

// ---------------------------------------------------------------------------
// Missing-reference groups
// ---------------------------------------------------------------------------

/// A reference the canonical record could gain, with the reason it was
/// proposed. Potential reasons are persisted only behind the merge
/// opt-in flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceProposal {
    pub uri: String,
    pub reason: MatchReason,
}

/// Proposals grouped under the canonical entity they belong to. When
/// several external entities map to one canonical entity, they appear
/// here as one group rather than repeated top-level entries, so a
/// merge writes each reference exactly once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingReferenceGroup {
    pub canonical_id: String,
    pub canonical_label: String,
    pub proposals: Vec<ReferenceProposal>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Which passes `reconcile` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Reverse,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconMeta {
    pub authority: String,
    pub entity_type: String,
    pub direction: Direction,
    pub engine_version: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirectionCounts {
    pub matched: usize,
    pub missing_reference: usize,
    pub potential: usize,
    pub unmatched: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconSummary {
    pub external_total: usize,
    pub canonical_total: usize,
    pub from_external: DirectionCounts,
    pub to_external: DirectionCounts,
    /// Distinct (canonical id, uri) reference proposals across both passes.
    pub proposals: usize,
}

/// Built fresh per (entity type, vocabulary) pair; immutable once
/// returned. Entry order equals input iteration order of the
/// respective source list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub meta: ReconMeta,
    pub from_external: Vec<FromExternalEntry>,
    pub to_external: Vec<ToExternalEntry>,
    pub missing_references: Vec<MissingReferenceGroup>,
    pub summary: ReconSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn potential_policy() {
        assert!(MatchReason::SymbolExact.is_potential());
        assert!(MatchReason::PartialSubstring.is_potential());
        assert!(!MatchReason::LabelExact.is_potential());
        assert!(!MatchReason::IdentifierExact.is_potential());
        assert!(!MatchReason::DimensionVectorExact.is_potential());
        assert!(!MatchReason::MultiplierExact.is_potential());
    }

    #[test]
    fn ref_kind_per_reason() {
        assert_eq!(MatchReason::LabelExact.ref_kind(), RefKind::Normative);
        assert_eq!(MatchReason::SymbolExact.ref_kind(), RefKind::Informative);
    }

    #[test]
    fn reason_tags_are_snake_case() {
        assert_eq!(MatchReason::NameNormalized.to_string(), "name_normalized");
        assert_eq!(
            serde_json::to_string(&MatchReason::DimensionVectorExact).unwrap(),
            "\"dimension_vector_exact\""
        );
    }
}
