// metrodb CLI - reconcile a canonical metrology store against
// external vocabularies (SI digital framework, QUDT, UCUM).

mod config;
mod exit_codes;
mod report;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use metrodb_core::{EntityType, ExternalEntity, Vocabulary};
use metrodb_io::{qudt, si, store, ucum, IoError};
use metrodb_recon::model::{Direction, ReconciliationReport};
use metrodb_recon::uniqueness::{check_collection, UniquenessFindings};
use metrodb_recon::{merge, reconcile};

use config::CliConfig;
use exit_codes::{EXIT_ERROR, EXIT_FINDINGS, EXIT_STORE, EXIT_SUCCESS, EXIT_USAGE, EXIT_VOCAB};

#[derive(Parser)]
#[command(name = "metrodb")]
#[command(about = "Canonical metrology store reconciliation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify vocabulary entries against the store and report findings
    #[command(after_help = "\
Examples:
  metrodb check qudt --store db/ --source vocab-unit.ttl
  metrodb check si --store db/ --type prefixes
  metrodb check ucum --store db/ --source ucum-essence.xml --json
  metrodb check qudt --store db/ --source vocab-unit.ttl --output report.json

Exits 0 when there is nothing to resolve, 5 when missing references
were found. Without --source, the source path comes from the store's
metrodb.toml.")]
    Check {
        /// Vocabulary to reconcile against
        vocab: VocabArg,

        /// Canonical store directory
        #[arg(long)]
        store: PathBuf,

        /// Vocabulary source file (default: [sources] in metrodb.toml)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Restrict to one entity type
        /// (units, prefixes, quantities, dimensions, unit-systems)
        #[arg(long = "type", value_name = "TYPE")]
        entity_type: Option<String>,

        /// Which passes to run
        #[arg(long, value_enum, default_value = "both")]
        direction: DirectionArg,

        /// Output JSON to stdout instead of the human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Merge missing references into the store
    #[command(after_help = "\
Examples:
  metrodb update qudt --store db/ --source vocab-unit.ttl
  metrodb update qudt --store db/ --source vocab-unit.ttl --dry-run
  metrodb update ucum --store db/ --source ucum-essence.xml --include-potential
  metrodb update si --store db/ --type units

Running update twice with the same inputs is a no-op: references
already present are never duplicated.")]
    Update {
        /// Vocabulary to reconcile against
        vocab: VocabArg,

        /// Canonical store directory
        #[arg(long)]
        store: PathBuf,

        /// Vocabulary source file (default: [sources] in metrodb.toml)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Restrict to one entity type
        #[arg(long = "type", value_name = "TYPE")]
        entity_type: Option<String>,

        /// Also persist symbol and substring matches (as informative)
        #[arg(long)]
        include_potential: bool,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Check store invariants: short-code uniqueness, near-identical ids
    #[command(after_help = "\
Examples:
  metrodb validate --store db/
  metrodb validate --store db/ --json

Exits 5 when findings are present.")]
    Validate {
        /// Canonical store directory
        #[arg(long)]
        store: PathBuf,

        /// Output JSON to stdout instead of the human summary
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VocabArg {
    /// SI digital framework (Turtle)
    #[value(alias = "si-digital-framework")]
    Si,
    /// QUDT (Turtle)
    Qudt,
    /// UCUM essence (XML)
    Ucum,
}

impl VocabArg {
    fn vocabulary(self) -> Vocabulary {
        match self {
            Self::Si => Vocabulary::SiDigitalFramework,
            Self::Qudt => Vocabulary::Qudt,
            Self::Ucum => Vocabulary::Ucum,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DirectionArg {
    Forward,
    Reverse,
    Both,
}

impl DirectionArg {
    fn direction(self) -> Direction {
        match self {
            Self::Forward => Direction::Forward,
            Self::Reverse => Direction::Reverse,
            Self::Both => Direction::Both,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            vocab,
            store,
            source,
            entity_type,
            direction,
            json,
            output,
        } => cmd_check(vocab, store, source, entity_type, direction, json, output),
        Commands::Update {
            vocab,
            store,
            source,
            entity_type,
            include_potential,
            dry_run,
        } => cmd_update(vocab, store, source, entity_type, include_potential, dry_run),
        Commands::Validate { store, json } => cmd_validate(store, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// JSON shape for `check --json` / `check --output`.
#[derive(Serialize)]
struct CheckOutput {
    vocabulary: String,
    source: String,
    reports: Vec<ReconciliationReport>,
}

fn cmd_check(
    vocab: VocabArg,
    store_dir: PathBuf,
    source: Option<PathBuf>,
    entity_type: Option<String>,
    direction: DirectionArg,
    json: bool,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let vocabulary = vocab.vocabulary();
    let source_path = resolve_source(&store_dir, source, vocabulary)?;
    let externals = load_vocabulary(vocabulary, &source_path)?;
    let explicit_type = entity_type.is_some();
    let types = selected_types(entity_type.as_deref())?;

    let mut reports = Vec::new();
    for ty in types {
        let canonicals = store::load_collection(&store_dir, ty)?;
        let for_type = externals.get(&ty).map(Vec::as_slice).unwrap_or(&[]);
        // Skip types absent on both sides unless one was asked for.
        if !explicit_type && for_type.is_empty() && canonicals.is_empty() {
            continue;
        }
        reports.push(reconcile(
            ty.plural(),
            for_type,
            &canonicals,
            vocabulary,
            direction.direction(),
        ));
    }

    let check = CheckOutput {
        vocabulary: vocabulary.authority().to_string(),
        source: source_path.display().to_string(),
        reports,
    };

    if json || output.is_some() {
        let json_str = serde_json::to_string_pretty(&check)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        if let Some(ref path) = output {
            fs::write(path, &json_str)
                .map_err(|e| CliError::general(format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }
        if json {
            println!("{json_str}");
        }
    }
    if !json {
        for r in &check.reports {
            print!("{}", report::render_report(r));
        }
    }

    match findings_error(&check.reports) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Exit-5 error when any report carries proposals, with a hint the
/// user can actually act on: a plain `update` merges nothing when all
/// remaining proposals are potential matches, so those point at
/// `--include-potential` instead.
fn findings_error(reports: &[ReconciliationReport]) -> Option<CliError> {
    let mut normative = 0usize;
    let mut potential = 0usize;
    for proposal in reports
        .iter()
        .flat_map(|r| &r.missing_references)
        .flat_map(|g| &g.proposals)
    {
        if proposal.reason.is_potential() {
            potential += 1;
        } else {
            normative += 1;
        }
    }

    let total = normative + potential;
    if total == 0 {
        return None;
    }
    let hint = if normative > 0 {
        "run `metrodb update` to merge them"
    } else {
        "potential matches only; run `metrodb update --include-potential` to merge them"
    };
    Some(CliError {
        code: EXIT_FINDINGS,
        message: format!("{total} missing reference(s) found"),
        hint: Some(hint.to_string()),
    })
}

fn cmd_update(
    vocab: VocabArg,
    store_dir: PathBuf,
    source: Option<PathBuf>,
    entity_type: Option<String>,
    include_potential: bool,
    dry_run: bool,
) -> Result<(), CliError> {
    let vocabulary = vocab.vocabulary();
    let source_path = resolve_source(&store_dir, source, vocabulary)?;
    let externals = load_vocabulary(vocabulary, &source_path)?;
    let types = selected_types(entity_type.as_deref())?;

    let mut total_added = 0;
    for ty in types {
        let canonicals = store::load_collection(&store_dir, ty)?;
        let for_type = externals.get(&ty).map(Vec::as_slice).unwrap_or(&[]);
        if for_type.is_empty() && canonicals.is_empty() {
            continue;
        }

        let recon = reconcile(ty.plural(), for_type, &canonicals, vocabulary, Direction::Both);
        let outcome = merge(
            &recon.missing_references,
            &canonicals,
            vocabulary,
            include_potential,
        );

        for id in &outcome.unknown_ids {
            eprintln!("warning: no entity with identifier '{id}' in {}", ty.file_name());
        }

        print!("{}", report::render_merge(ty, &outcome, dry_run));

        if outcome.changed() && !dry_run {
            store::write_collection(&store_dir, ty, &outcome.entities)?;
            eprintln!("wrote {}", store_dir.join(ty.file_name()).display());
        }
        total_added += outcome.added;
    }

    if total_added == 0 {
        println!("store already up to date");
    }

    Ok(())
}

/// JSON shape for `validate --json`, keyed by plural type name.
#[derive(Serialize)]
struct ValidateOutput {
    findings: BTreeMap<String, UniquenessFindings>,
}

fn cmd_validate(store_dir: PathBuf, json: bool) -> Result<(), CliError> {
    let mut findings = BTreeMap::new();
    let mut clean = true;

    for ty in EntityType::ALL {
        let entities = store::load_collection(&store_dir, ty)?;
        let result = check_collection(&entities);
        clean &= result.is_clean();
        if !json {
            print!("{}", report::render_findings(ty, &result));
        }
        findings.insert(ty.plural().to_string(), result);
    }

    if json {
        let json_str = serde_json::to_string_pretty(&ValidateOutput { findings })
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    if !clean {
        return Err(CliError {
            code: EXIT_FINDINGS,
            message: "uniqueness findings present".to_string(),
            hint: None,
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn resolve_source(
    store_dir: &Path,
    explicit: Option<PathBuf>,
    vocabulary: Vocabulary,
) -> Result<PathBuf, CliError> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    match CliConfig::discover(store_dir).map_err(CliError::general)? {
        Some((config_path, cli_config)) => cli_config
            .source_for(&config_path, vocabulary)
            .ok_or_else(|| {
                CliError::usage(format!("no source configured for {vocabulary}")).with_hint(
                    format!("pass --source FILE or add it to {}", config_path.display()),
                )
            }),
        None => Err(CliError::usage(format!(
            "no --source given and no {} in {}",
            config::CONFIG_FILE_NAME,
            store_dir.display()
        ))
        .with_hint("pass --source FILE or add a [sources] entry to metrodb.toml")),
    }
}

fn load_vocabulary(
    vocabulary: Vocabulary,
    path: &Path,
) -> Result<BTreeMap<EntityType, Vec<ExternalEntity>>, CliError> {
    let text = fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_VOCAB,
        message: format!("cannot read {}: {e}", path.display()),
        hint: None,
    })?;
    let source = path.display().to_string();
    let parsed = match vocabulary {
        Vocabulary::SiDigitalFramework => si::parse(&text, &source),
        Vocabulary::Qudt => qudt::parse(&text, &source),
        Vocabulary::Ucum => ucum::parse(&text, &source),
    };
    parsed.map_err(CliError::from)
}

fn selected_types(arg: Option<&str>) -> Result<Vec<EntityType>, CliError> {
    match arg {
        None => Ok(EntityType::ALL.to_vec()),
        Some(s) => EntityType::from_str_loose(s).map(|ty| vec![ty]).ok_or_else(|| {
            CliError::usage(format!("unknown entity type: \"{s}\"")).with_hint(
                "expected one of: units, prefixes, quantities, dimensions, unit-systems",
            )
        }),
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let code = match &err {
            IoError::VocabParse { .. } => EXIT_VOCAB,
            _ => EXIT_STORE,
        };
        Self { code, message: err.to_string(), hint: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_filter_accepts_loose_names() {
        assert_eq!(selected_types(None).unwrap().len(), 5);
        assert_eq!(selected_types(Some("unit")).unwrap(), vec![EntityType::Unit]);
        assert_eq!(
            selected_types(Some("unit-systems")).unwrap(),
            vec![EntityType::UnitSystem]
        );
        let err = selected_types(Some("frobnicators")).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
        assert!(err.hint.is_some());
    }

    #[test]
    fn vocab_arg_maps_to_authority() {
        assert_eq!(VocabArg::Si.vocabulary().authority(), "si-digital-framework");
        assert_eq!(VocabArg::Qudt.vocabulary().authority(), "qudt");
        assert_eq!(VocabArg::Ucum.vocabulary().authority(), "ucum");
    }

    #[test]
    fn io_errors_map_to_registry_codes() {
        let store_err: CliError = IoError::StoreParse {
            path: "units.yaml".into(),
            detail: "bad yaml".into(),
        }
        .into();
        assert_eq!(store_err.code, EXIT_STORE);

        let vocab_err: CliError = IoError::VocabParse {
            source: "vocab-unit.ttl".into(),
            detail: "bad turtle".into(),
        }
        .into();
        assert_eq!(vocab_err.code, EXIT_VOCAB);
    }

    #[test]
    fn findings_hint_distinguishes_potential_only() {
        use metrodb_core::{CanonicalEntity, Identifier, LocalizedName, SymbolRendering};

        let metre = CanonicalEntity {
            identifiers: vec![Identifier {
                id: "NISTu1".into(),
                kind: "nist".into(),
            }],
            names: vec![LocalizedName {
                value: "metre".into(),
                lang: Some("en".into()),
            }],
            symbols: vec![SymbolRendering {
                ascii: Some("m".into()),
                ..Default::default()
            }],
            ..Default::default()
        };

        // a label match is normative: plain `update` resolves it
        let by_label = ExternalEntity {
            uri: "http://qudt.org/vocab/unit/M".into(),
            label: "metre".into(),
            ..Default::default()
        };
        let report = reconcile(
            "units",
            std::slice::from_ref(&by_label),
            std::slice::from_ref(&metre),
            Vocabulary::Qudt,
            Direction::Both,
        );
        let err = findings_error(std::slice::from_ref(&report)).unwrap();
        assert_eq!(err.code, EXIT_FINDINGS);
        assert!(!err.hint.as_deref().unwrap().contains("--include-potential"));

        // a bare symbol match is potential: plain `update` skips it, so
        // the hint must point at --include-potential
        let by_symbol = ExternalEntity {
            uri: "http://qudt.org/vocab/unit/MilliMystery".into(),
            label: "mystery".into(),
            symbol: Some("m".into()),
            ..Default::default()
        };
        let report = reconcile(
            "units",
            std::slice::from_ref(&by_symbol),
            std::slice::from_ref(&metre),
            Vocabulary::Qudt,
            Direction::Both,
        );
        let err = findings_error(std::slice::from_ref(&report)).unwrap();
        assert_eq!(err.code, EXIT_FINDINGS);
        assert!(err.hint.as_deref().unwrap().contains("--include-potential"));

        assert!(findings_error(&[]).is_none());
    }

    #[test]
    fn missing_source_is_a_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_source(dir.path(), None, Vocabulary::Qudt).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
    }

    #[test]
    fn configured_source_resolves() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(config::CONFIG_FILE_NAME),
            "[sources]\nqudt = \"vocab-unit.ttl\"\n",
        )
        .unwrap();
        let path = resolve_source(dir.path(), None, Vocabulary::Qudt).unwrap();
        assert_eq!(path, dir.path().join("vocab-unit.ttl"));

        let err = resolve_source(dir.path(), None, Vocabulary::Ucum).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
    }
}
