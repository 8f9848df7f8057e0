use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dimension::DimensionVector;

// ---------------------------------------------------------------------------
// Entity kind
// ---------------------------------------------------------------------------

/// The five canonical collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Unit,
    Prefix,
    Quantity,
    Dimension,
    UnitSystem,
}

impl EntityType {
    pub const ALL: [EntityType; 5] = [
        EntityType::Unit,
        EntityType::Prefix,
        EntityType::Quantity,
        EntityType::Dimension,
        EntityType::UnitSystem,
    ];

    /// Permissive parse: singular, plural, and kebab-case spellings all
    /// accepted; anything else is `None`, never an error.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "unit" | "units" => Some(Self::Unit),
            "prefix" | "prefixes" => Some(Self::Prefix),
            "quantity" | "quantities" => Some(Self::Quantity),
            "dimension" | "dimensions" => Some(Self::Dimension),
            "unit_system" | "unit_systems" | "unit-system" | "unit-systems" => {
                Some(Self::UnitSystem)
            }
            _ => None,
        }
    }

    /// Collection name used in reports and store file names.
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Unit => "units",
            Self::Prefix => "prefixes",
            Self::Quantity => "quantities",
            Self::Dimension => "dimensions",
            Self::UnitSystem => "unit_systems",
        }
    }

    /// Store file holding this collection.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Unit => "units.yaml",
            Self::Prefix => "prefixes.yaml",
            Self::Quantity => "quantities.yaml",
            Self::Dimension => "dimensions.yaml",
            Self::UnitSystem => "unit_systems.yaml",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unit => write!(f, "unit"),
            Self::Prefix => write!(f, "prefix"),
            Self::Quantity => write!(f, "quantity"),
            Self::Dimension => write!(f, "dimension"),
            Self::UnitSystem => write!(f, "unit_system"),
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical side
// ---------------------------------------------------------------------------

/// One entry of an entity's identifier list. `kind` scopes `id` within
/// the issuing authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// Renderings of one symbol. Units and prefixes only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolRendering {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ascii: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unicode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latex: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    #[default]
    Normative,
    Informative,
}

impl std::fmt::Display for RefKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normative => write!(f, "normative"),
            Self::Informative => write!(f, "informative"),
        }
    }
}

/// A recorded correspondence to an external vocabulary entry.
///
/// Invariant: an entity never carries two references with the same
/// (authority, uri) pair. The merger enforces this; the store does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalReference {
    pub uri: String,
    pub authority: String,
    #[serde(rename = "type", default)]
    pub kind: RefKind,
}

/// A record of the canonical metrology database.
///
/// One shape covers all five entity types; fields that only apply to
/// some types (`symbols`, `dimension_exponents`, `base`/`power`) stay
/// `None`/empty elsewhere. Fields this tool does not interpret are
/// captured in `extra` and round-trip through the store untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalEntity {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<Identifier>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<LocalizedName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<SymbolRendering>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_exponents: Option<DimensionVector>,
    /// Prefix scale: multiplier = base^power.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<ExternalReference>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl CanonicalEntity {
    /// First identifier id; the key the engine and merger group by.
    pub fn primary_id(&self) -> Option<&str> {
        self.identifiers.first().map(|i| i.id.as_str())
    }

    /// Best human-readable handle: short code, else first name, else id.
    pub fn display_label(&self) -> &str {
        if let Some(short) = &self.short {
            return short;
        }
        if let Some(name) = self.names.first() {
            return &name.value;
        }
        self.primary_id().unwrap_or("(unnamed)")
    }

    pub fn has_reference(&self, authority: &str, uri: &str) -> bool {
        self.references
            .iter()
            .any(|r| r.authority == authority && r.uri == uri)
    }

    /// First recorded reference issued by `authority`, if any.
    pub fn reference_for_authority(&self, authority: &str) -> Option<&ExternalReference> {
        self.references.iter().find(|r| r.authority == authority)
    }

    /// Prefix scale factor, when `base` and `power` are both present.
    pub fn multiplier(&self) -> Option<f64> {
        match (self.base, self.power) {
            (Some(base), Some(power)) => Some((base as f64).powi(power)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// External side
// ---------------------------------------------------------------------------

/// A record sourced from a third-party vocabulary. Produced by the
/// adapters; `uri` is always non-empty, absent fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalEntity {
    pub uri: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_exponents: Option<DimensionVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
}
