//! Name normalization and edit distance.
//!
//! `normalize_name` backs the normalized-name matching strategy;
//! `levenshtein` is used only when reporting near-identical
//! identifiers to a human, never for matching decisions.

/// Canonical text form for name comparison.
///
/// Lower-cases, maps `-`/`_` to spaces, strips parentheses and
/// brackets, drops the standalone word "of", and collapses whitespace.
/// The standalone word "per" becomes a `/` spliced without surrounding
/// spaces, so "metre per second" and a literal "metre/second" land on
/// the same form. Pure and total: empty input yields an empty string.
pub fn normalize_name(s: &str) -> String {
    let mapped: String = s
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .filter(|c| !matches!(c, '(' | ')' | '[' | ']'))
        .collect();

    let mut out = String::new();
    for word in mapped.split_whitespace().filter(|w| *w != "of") {
        if word == "per" || word == "/" {
            out.push('/');
            continue;
        }
        if !(out.is_empty() || out.ends_with('/')) {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Classic Levenshtein edit distance, O(|a|·|b|) time and space.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut dist = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in dist.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        dist[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            dist[i][j] = (dist[i - 1][j] + 1)
                .min(dist[i][j - 1] + 1)
                .min(dist[i - 1][j - 1] + cost);
        }
    }

    dist[a.len()][b.len()]
}
