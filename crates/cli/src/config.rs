//! Optional `metrodb.toml` configuration.
//!
//! Lets a store directory pin its vocabulary source files so `check`
//! and `update` can be run without `--source`:
//!
//! ```toml
//! [sources]
//! si = "sources/si-reference-point.ttl"
//! qudt = "vocab-unit.ttl"
//! ucum = "ucum-essence.xml"
//! ```
//!
//! Relative paths resolve against the config file's directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use metrodb_core::Vocabulary;

pub const CONFIG_FILE_NAME: &str = "metrodb.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub sources: Sources,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sources {
    pub si: Option<PathBuf>,
    pub qudt: Option<PathBuf>,
    pub ucum: Option<PathBuf>,
}

impl CliConfig {
    pub fn from_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// Look for `metrodb.toml` inside the store directory. Absent is
    /// not an error; a present but malformed file is.
    pub fn discover(store_dir: &Path) -> Result<Option<(PathBuf, Self)>, String> {
        let path = store_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let config = Self::from_toml(&text)
            .map_err(|e| format!("invalid {}: {e}", path.display()))?;
        Ok(Some((path, config)))
    }

    /// Configured source path for a vocabulary, resolved against the
    /// config file's directory.
    pub fn source_for(&self, config_path: &Path, vocabulary: Vocabulary) -> Option<PathBuf> {
        let raw = match vocabulary {
            Vocabulary::SiDigitalFramework => self.sources.si.as_ref(),
            Vocabulary::Qudt => self.sources.qudt.as_ref(),
            Vocabulary::Ucum => self.sources.ucum.as_ref(),
        }?;
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        Some(base.join(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sources_table() {
        let config = CliConfig::from_toml(
            "[sources]\nsi = \"si.ttl\"\nucum = \"ucum-essence.xml\"\n",
        )
        .unwrap();
        assert_eq!(config.sources.si.as_deref(), Some(Path::new("si.ttl")));
        assert_eq!(config.sources.qudt, None);
    }

    #[test]
    fn empty_config_is_valid() {
        let config = CliConfig::from_toml("").unwrap();
        assert!(config.sources.si.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CliConfig::from_toml("[sinks]\nsi = \"x\"\n").is_err());
    }

    #[test]
    fn source_paths_resolve_against_config_dir() {
        let config = CliConfig::from_toml("[sources]\nqudt = \"vocab/unit.ttl\"\n").unwrap();
        let resolved = config
            .source_for(Path::new("/data/store/metrodb.toml"), Vocabulary::Qudt)
            .unwrap();
        assert_eq!(resolved, Path::new("/data/store/vocab/unit.ttl"));
        assert!(config
            .source_for(Path::new("/data/store/metrodb.toml"), Vocabulary::Ucum)
            .is_none());
    }
}
