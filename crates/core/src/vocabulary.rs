use serde::{Deserialize, Serialize};

/// The external vocabularies this tool reconciles against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Vocabulary {
    SiDigitalFramework,
    Qudt,
    Ucum,
}

impl Vocabulary {
    pub const ALL: [Vocabulary; 3] = [
        Vocabulary::SiDigitalFramework,
        Vocabulary::Qudt,
        Vocabulary::Ucum,
    ];

    /// The `authority` string recorded in external references.
    pub fn authority(&self) -> &'static str {
        match self {
            Self::SiDigitalFramework => "si-digital-framework",
            Self::Qudt => "qudt",
            Self::Ucum => "ucum",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "si" | "si-digital-framework" => Some(Self::SiDigitalFramework),
            "qudt" => Some(Self::Qudt),
            "ucum" => Some(Self::Ucum),
            _ => None,
        }
    }
}

impl std::fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.authority())
    }
}
