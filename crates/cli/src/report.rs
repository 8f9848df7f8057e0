//! Human-readable rendering of reports.
//!
//! Rendered as plain text for stdout; `--json` callers serialize the
//! report structs directly instead.

use std::fmt::Write as _;

use metrodb_core::EntityType;
use metrodb_recon::merge::MergeOutcome;
use metrodb_recon::model::{DirectionCounts, ReconciliationReport};
use metrodb_recon::uniqueness::UniquenessFindings;

pub fn render_report(report: &ReconciliationReport) -> String {
    let mut out = String::new();
    let meta = &report.meta;
    let s = &report.summary;

    let _ = writeln!(out, "== {} ({}) ==", meta.entity_type, meta.authority);
    let _ = writeln!(
        out,
        "external: {}  canonical: {}",
        s.external_total, s.canonical_total
    );
    if !report.from_external.is_empty() {
        let _ = writeln!(out, "from external: {}", counts_line(&s.from_external));
    }
    if !report.to_external.is_empty() {
        let _ = writeln!(out, "to external:   {}", counts_line(&s.to_external));
    }

    if report.missing_references.is_empty() {
        let _ = writeln!(out, "no missing references");
    } else {
        let _ = writeln!(
            out,
            "missing references ({} across {} entities):",
            s.proposals,
            report.missing_references.len()
        );
        for group in &report.missing_references {
            let _ = writeln!(
                out,
                "  {} ({})",
                group.canonical_id, group.canonical_label
            );
            for proposal in &group.proposals {
                let _ = writeln!(out, "    <- {}  [{}]", proposal.uri, proposal.reason);
            }
        }
    }

    out
}

fn counts_line(counts: &DirectionCounts) -> String {
    format!(
        "{} matched, {} missing reference, {} potential, {} unmatched",
        counts.matched, counts.missing_reference, counts.potential, counts.unmatched
    )
}

pub fn render_merge(entity_type: EntityType, outcome: &MergeOutcome, dry_run: bool) -> String {
    let mut line = format!(
        "{}: {} reference(s) added, {} already present",
        entity_type.plural(),
        outcome.added,
        outcome.skipped_existing
    );
    if outcome.skipped_potential > 0 {
        let _ = write!(
            line,
            ", {} potential skipped (use --include-potential)",
            outcome.skipped_potential
        );
    }
    if dry_run && outcome.added > 0 {
        line.push_str(" [dry run]");
    }
    line.push('\n');
    line
}

pub fn render_findings(entity_type: EntityType, findings: &UniquenessFindings) -> String {
    let mut out = String::new();
    if findings.is_clean() {
        let _ = writeln!(out, "{}: ok", entity_type.plural());
        return out;
    }
    let _ = writeln!(out, "{}:", entity_type.plural());
    for dup in &findings.duplicate_shorts {
        let _ = writeln!(
            out,
            "  duplicate short '{}': {}",
            dup.short,
            dup.ids.join(", ")
        );
    }
    for pair in &findings.similar_identifiers {
        let _ = writeln!(
            out,
            "  similar identifiers: '{}' / '{}' (distance {})",
            pair.a, pair.b, pair.distance
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use metrodb_core::Vocabulary;
    use metrodb_recon::model::Direction;
    use metrodb_recon::reconcile;
    use metrodb_recon::uniqueness::{DuplicateShort, SimilarIdentifiers};

    #[test]
    fn empty_report_renders_totals() {
        let report = reconcile("units", &[], &[], Vocabulary::Qudt, Direction::Both);
        let text = render_report(&report);
        assert!(text.starts_with("== units (qudt) ==\n"));
        assert!(text.contains("external: 0  canonical: 0"));
        assert!(text.contains("no missing references"));
    }

    #[test]
    fn findings_listed_per_kind() {
        let findings = UniquenessFindings {
            duplicate_shorts: vec![DuplicateShort {
                short: "m".into(),
                ids: vec!["si:metre".into(), "imp:mile".into()],
            }],
            similar_identifiers: vec![SimilarIdentifiers {
                a: "si:metre".into(),
                b: "si:meter".into(),
                distance: 1,
            }],
        };
        let text = render_findings(EntityType::Unit, &findings);
        assert!(text.contains("duplicate short 'm': si:metre, imp:mile"));
        assert!(text.contains("'si:metre' / 'si:meter' (distance 1)"));
    }

    #[test]
    fn clean_findings_render_ok() {
        let text = render_findings(EntityType::Prefix, &UniquenessFindings::default());
        assert_eq!(text, "prefixes: ok\n");
    }
}
