//! Matching strategy set.
//!
//! Each entity type has a fixed, ordered list of strategies. The
//! engine evaluates them top to bottom and the first strategy that
//! produces any candidate wins — first-applicable-wins, not best
//! score. Most specific and reliable strategies come first.

use metrodb_core::{CanonicalEntity, EntityType, ExternalEntity};

use crate::model::MatchReason;
use crate::normalize::normalize_name;

/// Absolute tolerance for prefix multiplier equality.
pub const MULTIPLIER_TOLERANCE: f64 = 1e-10;

/// Labels this short collide too easily to substring-match.
pub const PARTIAL_MIN_LABEL_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// An existing reference on the canonical entity carries the
    /// external entity's uri. Detects already-linked pairs; always
    /// first, independent of direction.
    IdentifierExact,
    /// Case-insensitive equality with a canonical symbol's ascii or
    /// unicode rendering. Units and prefixes only.
    SymbolExact,
    /// Case-insensitive equality between the external label and a
    /// canonical name, or between label/alt label and the short code.
    LabelExact,
    /// Equality after `normalize_name` on both sides.
    NameNormalized,
    /// All seven exponents equal. Dimensions only, outranking labels:
    /// labels in dimensional vocabularies are unreliable.
    DimensionVectorExact,
    /// Scale factor equal within absolute tolerance. Prefixes only.
    MultiplierExact,
    /// One label contains the other. Never more than a potential match.
    PartialSubstring,
}

impl Strategy {
    pub fn reason(&self) -> MatchReason {
        match self {
            Self::IdentifierExact => MatchReason::IdentifierExact,
            Self::SymbolExact => MatchReason::SymbolExact,
            Self::LabelExact => MatchReason::LabelExact,
            Self::NameNormalized => MatchReason::NameNormalized,
            Self::DimensionVectorExact => MatchReason::DimensionVectorExact,
            Self::MultiplierExact => MatchReason::MultiplierExact,
            Self::PartialSubstring => MatchReason::PartialSubstring,
        }
    }
}

/// The ordered cascade for one entity type.
pub fn cascade(entity_type: EntityType) -> &'static [Strategy] {
    use Strategy::*;
    match entity_type {
        EntityType::Unit => &[
            IdentifierExact,
            SymbolExact,
            LabelExact,
            NameNormalized,
            PartialSubstring,
        ],
        EntityType::Prefix => &[
            IdentifierExact,
            SymbolExact,
            LabelExact,
            NameNormalized,
            MultiplierExact,
            PartialSubstring,
        ],
        EntityType::Dimension => &[
            IdentifierExact,
            DimensionVectorExact,
            LabelExact,
            NameNormalized,
            PartialSubstring,
        ],
        EntityType::Quantity | EntityType::UnitSystem => &[
            IdentifierExact,
            LabelExact,
            NameNormalized,
            PartialSubstring,
        ],
    }
}

/// Does `strategy` pair this canonical entity with this external one?
pub fn applies(strategy: Strategy, canonical: &CanonicalEntity, external: &ExternalEntity) -> bool {
    match strategy {
        Strategy::IdentifierExact => {
            canonical.references.iter().any(|r| r.uri == external.uri)
        }
        Strategy::SymbolExact => match &external.symbol {
            Some(symbol) => canonical.symbols.iter().any(|s| {
                opt_eq_ci(s.ascii.as_deref(), symbol) || opt_eq_ci(s.unicode.as_deref(), symbol)
            }),
            None => false,
        },
        Strategy::LabelExact => {
            let label = external.label.as_str();
            let against_names = canonical.names.iter().any(|n| eq_ci(&n.value, label));
            let against_short = canonical.short.as_deref().is_some_and(|short| {
                eq_ci(short, label)
                    || external.alt_label.as_deref().is_some_and(|alt| eq_ci(short, alt))
            });
            against_names || against_short
        }
        Strategy::NameNormalized => {
            let norm_label = normalize_name(&external.label);
            !norm_label.is_empty()
                && canonical
                    .names
                    .iter()
                    .any(|n| normalize_name(&n.value) == norm_label)
        }
        Strategy::DimensionVectorExact => {
            match (&canonical.dimension_exponents, &external.dimension_exponents) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        Strategy::MultiplierExact => match (canonical.multiplier(), external.multiplier) {
            (Some(a), Some(b)) => (a - b).abs() <= MULTIPLIER_TOLERANCE,
            _ => false,
        },
        Strategy::PartialSubstring => {
            let label = external.label.as_str();
            canonical.names.iter().map(|n| n.value.as_str())
                .chain(canonical.short.as_deref())
                .any(|name| partial_overlap(name, label))
        }
    }
}

fn eq_ci(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn opt_eq_ci(a: Option<&str>, b: &str) -> bool {
    a.is_some_and(|a| eq_ci(a, b))
}

/// One string contains the other, case-insensitively. Both must be
/// longer than three characters (not bytes) to avoid trivial
/// collisions.
fn partial_overlap(a: &str, b: &str) -> bool {
    if a.chars().count() < PARTIAL_MIN_LABEL_LEN || b.chars().count() < PARTIAL_MIN_LABEL_LEN {
        return false;
    }
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrodb_core::{
        DimensionVector, ExternalReference, LocalizedName, RefKind, SymbolRendering,
    };

    fn unit(names: &[&str], short: Option<&str>, ascii: Option<&str>) -> CanonicalEntity {
        CanonicalEntity {
            names: names
                .iter()
                .map(|n| LocalizedName { value: (*n).into(), lang: Some("en".into()) })
                .collect(),
            short: short.map(Into::into),
            symbols: ascii
                .map(|a| {
                    vec![SymbolRendering { ascii: Some(a.into()), ..Default::default() }]
                })
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    fn ext(uri: &str, label: &str) -> ExternalEntity {
        ExternalEntity { uri: uri.into(), label: label.into(), ..Default::default() }
    }

    #[test]
    fn identifier_exact_needs_recorded_uri() {
        let mut canonical = unit(&["metre"], None, None);
        let external = ext("https://x/units/metre", "metre");
        assert!(!applies(Strategy::IdentifierExact, &canonical, &external));

        canonical.references.push(ExternalReference {
            uri: "https://x/units/metre".into(),
            authority: "x".into(),
            kind: RefKind::Normative,
        });
        assert!(applies(Strategy::IdentifierExact, &canonical, &external));
    }

    #[test]
    fn symbol_exact_case_insensitive() {
        let canonical = unit(&["metre"], None, Some("m"));
        let mut external = ext("https://x/u/m", "whatever");
        external.symbol = Some("M".into());
        assert!(applies(Strategy::SymbolExact, &canonical, &external));

        external.symbol = None;
        assert!(!applies(Strategy::SymbolExact, &canonical, &external));
    }

    #[test]
    fn symbol_exact_checks_unicode_rendering() {
        let canonical = CanonicalEntity {
            symbols: vec![SymbolRendering {
                ascii: Some("ohm".into()),
                unicode: Some("Ω".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut external = ext("https://x/u/ohm", "ohm");
        external.symbol = Some("Ω".into());
        assert!(applies(Strategy::SymbolExact, &canonical, &external));
    }

    #[test]
    fn label_exact_against_names_and_short() {
        let canonical = unit(&["metre"], Some("meter"), None);
        assert!(applies(Strategy::LabelExact, &canonical, &ext("u", "Metre")));
        assert!(applies(Strategy::LabelExact, &canonical, &ext("u", "METER")));
        assert!(!applies(Strategy::LabelExact, &canonical, &ext("u", "second")));

        // alt label against the short code
        let mut external = ext("u", "unrelated");
        external.alt_label = Some("meter".into());
        assert!(applies(Strategy::LabelExact, &canonical, &external));
    }

    #[test]
    fn name_normalized() {
        let canonical = unit(&["newton metre"], None, None);
        assert!(applies(Strategy::NameNormalized, &canonical, &ext("u", "Newton-Metre")));
        assert!(!applies(Strategy::NameNormalized, &canonical, &ext("u", "newton second")));
        // empty-normalizing labels never match
        assert!(!applies(Strategy::NameNormalized, &canonical, &ext("u", "()")));
    }

    #[test]
    fn dimension_vector_exact_requires_both_sides() {
        let vector = DimensionVector { length: 1, ..Default::default() };
        let canonical = CanonicalEntity {
            dimension_exponents: Some(vector),
            ..Default::default()
        };
        let mut external = ext("d", "length");
        assert!(!applies(Strategy::DimensionVectorExact, &canonical, &external));

        external.dimension_exponents = Some(vector);
        assert!(applies(Strategy::DimensionVectorExact, &canonical, &external));

        external.dimension_exponents =
            Some(DimensionVector { length: 2, ..Default::default() });
        assert!(!applies(Strategy::DimensionVectorExact, &canonical, &external));
    }

    #[test]
    fn multiplier_within_tolerance() {
        let kilo = CanonicalEntity {
            base: Some(10),
            power: Some(3),
            ..Default::default()
        };
        let mut external = ext("p", "kilo");
        external.multiplier = Some(1000.0);
        assert!(applies(Strategy::MultiplierExact, &kilo, &external));

        external.multiplier = Some(1000.5);
        assert!(!applies(Strategy::MultiplierExact, &kilo, &external));

        external.multiplier = None;
        assert!(!applies(Strategy::MultiplierExact, &kilo, &external));
    }

    #[test]
    fn partial_substring_needs_length() {
        let canonical = unit(&["metre"], None, None);
        assert!(applies(Strategy::PartialSubstring, &canonical, &ext("u", "millimetre")));
        assert!(applies(Strategy::PartialSubstring, &canonical, &ext("u", "metr")));

        // short strings collide trivially; refuse them
        let volt = unit(&["volt"], Some("V"), None);
        assert!(!applies(Strategy::PartialSubstring, &volt, &ext("u", "V")));
        assert!(!applies(Strategy::PartialSubstring, &volt, &ext("u", "olt")));
    }

    #[test]
    fn partial_substring_length_counts_characters() {
        // "ΩΩ" is four bytes but only two characters; it must be
        // refused like any other two-character label.
        let canonical = unit(&["ΩΩΩΩ"], None, None);
        assert!(!applies(Strategy::PartialSubstring, &canonical, &ext("u", "ΩΩ")));
        assert!(applies(Strategy::PartialSubstring, &canonical, &ext("u", "ΩΩΩΩΩ")));
    }

    #[test]
    fn cascade_order_per_type() {
        assert_eq!(cascade(EntityType::Unit)[0], Strategy::IdentifierExact);
        assert_eq!(cascade(EntityType::Unit)[1], Strategy::SymbolExact);
        // dimension-vector equality outranks labels for dimensions
        assert_eq!(cascade(EntityType::Dimension)[1], Strategy::DimensionVectorExact);
        // no symbol strategy for quantities or unit systems
        assert!(!cascade(EntityType::Quantity).contains(&Strategy::SymbolExact));
        assert!(!cascade(EntityType::UnitSystem).contains(&Strategy::SymbolExact));
        // multiplier check is prefix-only
        assert!(cascade(EntityType::Prefix).contains(&Strategy::MultiplierExact));
        assert!(!cascade(EntityType::Unit).contains(&Strategy::MultiplierExact));
    }
}
