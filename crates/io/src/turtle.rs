//! Minimal Turtle reader for the SI reference point and QUDT vocab
//! files.
//!
//! Not a general RDF parser: handles `@prefix`/`PREFIX` declarations,
//! subject blocks with `;`-separated predicate lists, `,`-separated
//! objects, IRIs, prefixed names, and string literals with language
//! tags or datatypes. Blank-node and collection structures are
//! skipped, not modeled. Anything outside that shape is a parse error
//! for the vocabulary being read, never a panic.

use std::collections::HashMap;

use crate::error::IoError;

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum TurtleObject {
    Iri(String),
    Literal { value: String, lang: Option<String> },
}

impl TurtleObject {
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal { value, .. } => Some(value),
            Self::Iri(_) => None,
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            Self::Literal { .. } => None,
        }
    }
}

/// All predicate/object pairs sharing one subject.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurtleBlock {
    pub subject: String,
    pub predicates: Vec<(String, TurtleObject)>,
}

impl TurtleBlock {
    /// Objects whose predicate has this local name (part after the
    /// last `#` or `/`).
    pub fn objects<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a TurtleObject> + 'a {
        self.predicates
            .iter()
            .filter(move |(p, _)| local_name(p) == local)
            .map(|(_, o)| o)
    }

    /// First literal under the predicate, preferring the requested
    /// language tag, then untagged, then anything.
    pub fn literal<'a>(&'a self, local: &'a str, lang: Option<&str>) -> Option<&'a str> {
        let literals: Vec<(&str, Option<&str>)> = self
            .objects(local)
            .filter_map(|o| match o {
                TurtleObject::Literal { value, lang } => Some((value.as_str(), lang.as_deref())),
                TurtleObject::Iri(_) => None,
            })
            .collect();

        if let Some(want) = lang {
            if let Some((v, _)) = literals.iter().find(|(_, l)| *l == Some(want)) {
                return Some(v);
            }
        }
        if let Some((v, _)) = literals.iter().find(|(_, l)| l.is_none()) {
            return Some(v);
        }
        literals.first().map(|(v, _)| *v)
    }

    /// `rdf:type` object IRIs.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.objects("type").filter_map(|o| o.as_iri())
    }

    pub fn has_type(&self, local: &str) -> bool {
        self.types().any(|t| local_name(t) == local)
    }
}

/// The part of an IRI after the last `#` or `/`.
pub fn local_name(uri: &str) -> &str {
    uri.rsplit(['#', '/']).next().unwrap_or(uri)
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Iri(String),
    Word(String),
    Literal { value: String, lang: Option<String> },
    Dot,
    Semi,
    Comma,
    Open(char),
    Close(char),
}

fn lex(text: &str, source: &str) -> Result<Vec<Token>, IoError> {
    let err = |detail: &str| IoError::VocabParse {
        source: source.to_string(),
        detail: detail.to_string(),
    };

    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '<' => {
                let start = i + 1;
                let mut j = start;
                while j < chars.len() && chars[j] != '>' {
                    j += 1;
                }
                if j == chars.len() {
                    return Err(err("unterminated IRI"));
                }
                tokens.push(Token::Iri(chars[start..j].iter().collect()));
                i = j + 1;
            }
            '"' => {
                let triple = chars[i..].starts_with(&['"', '"', '"']);
                let (value, after) = if triple {
                    read_string(&chars, i + 3, "\"\"\"").ok_or_else(|| err("unterminated literal"))?
                } else {
                    read_string(&chars, i + 1, "\"").ok_or_else(|| err("unterminated literal"))?
                };
                i = after;

                // optional @lang or ^^datatype suffix
                let mut lang = None;
                if i < chars.len() && chars[i] == '@' {
                    let start = i + 1;
                    let mut j = start;
                    while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '-') {
                        j += 1;
                    }
                    lang = Some(chars[start..j].iter().collect::<String>());
                    i = j;
                } else if chars[i..].starts_with(&['^', '^']) {
                    i += 2;
                    // datatype IRI or prefixed name, consumed and dropped
                    if i < chars.len() && chars[i] == '<' {
                        while i < chars.len() && chars[i] != '>' {
                            i += 1;
                        }
                        i += 1;
                    } else {
                        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != ';' {
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Literal { value, lang });
            }
            ';' => {
                tokens.push(Token::Semi);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '(' | '[' => {
                tokens.push(Token::Open(c));
                i += 1;
            }
            ')' | ']' => {
                tokens.push(Token::Close(c));
                i += 1;
            }
            _ => {
                let start = i;
                let mut j = i;
                while j < chars.len()
                    && !chars[j].is_whitespace()
                    && !matches!(chars[j], ';' | ',' | '"' | '<' | '(' | ')' | '[' | ']')
                {
                    j += 1;
                }
                let mut word: String = chars[start..j].iter().collect();
                i = j;
                // a trailing '.' terminates the statement unless it is
                // part of a number like 1.5
                if word.ends_with('.') && !word[..word.len() - 1].ends_with(|c: char| c.is_ascii_digit())
                {
                    word.pop();
                    if !word.is_empty() {
                        tokens.push(Token::Word(word));
                    }
                    tokens.push(Token::Dot);
                } else if word == "." {
                    tokens.push(Token::Dot);
                } else {
                    tokens.push(Token::Word(word));
                }
            }
        }
    }

    Ok(tokens)
}

/// Read a quoted string body starting at `start`, returning the value
/// and the index just past the terminator.
fn read_string(chars: &[char], start: usize, terminator: &str) -> Option<(String, usize)> {
    let term: Vec<char> = terminator.chars().collect();
    let mut value = String::new();
    let mut i = start;
    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() {
            let escaped = match chars[i + 1] {
                'n' => '\n',
                't' => '\t',
                other => other,
            };
            value.push(escaped);
            i += 2;
            continue;
        }
        if chars[i..].starts_with(&term) {
            return Some((value, i + term.len()));
        }
        value.push(chars[i]);
        i += 1;
    }
    None
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse Turtle text into subject blocks, in document order.
pub fn parse(text: &str, source: &str) -> Result<Vec<TurtleBlock>, IoError> {
    let err = |detail: String| IoError::VocabParse {
        source: source.to_string(),
        detail,
    };

    let tokens = lex(text, source)?;
    let mut prefixes: HashMap<String, String> = HashMap::new();
    let mut blocks: Vec<TurtleBlock> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut i = 0;

    while i < tokens.len() {
        // prefix declarations
        if let Token::Word(w) = &tokens[i] {
            let keyword = w.to_lowercase();
            if keyword == "@prefix" || keyword == "prefix" || keyword == "@base" || keyword == "base"
            {
                if keyword.ends_with("base") {
                    // base IRI declarations are consumed and ignored
                    i += 2;
                    if i < tokens.len() && tokens[i] == Token::Dot {
                        i += 1;
                    }
                    continue;
                }
                let name = match tokens.get(i + 1) {
                    Some(Token::Word(n)) => n.trim_end_matches(':').to_string(),
                    other => return Err(err(format!("bad prefix name: {other:?}"))),
                };
                let iri = match tokens.get(i + 2) {
                    Some(Token::Iri(iri)) => iri.clone(),
                    other => return Err(err(format!("bad prefix iri: {other:?}"))),
                };
                prefixes.insert(name, iri);
                i += 3;
                if i < tokens.len() && tokens[i] == Token::Dot {
                    i += 1;
                }
                continue;
            }
        }

        // subject
        let subject = match &tokens[i] {
            Token::Iri(iri) => iri.clone(),
            Token::Word(w) => expand(w, &prefixes),
            Token::Dot => {
                i += 1;
                continue;
            }
            other => return Err(err(format!("expected subject, found {other:?}"))),
        };
        i += 1;

        let slot = match index.get(&subject) {
            Some(&slot) => slot,
            None => {
                blocks.push(TurtleBlock { subject: subject.clone(), predicates: Vec::new() });
                let slot = blocks.len() - 1;
                index.insert(subject, slot);
                slot
            }
        };

        // predicate lists until the statement's closing dot
        loop {
            let predicate = match tokens.get(i) {
                Some(Token::Iri(iri)) => iri.clone(),
                Some(Token::Word(w)) if w == "a" => {
                    "http://www.w3.org/1999/02/22-rdf-syntax-ns#type".to_string()
                }
                Some(Token::Word(w)) => expand(w, &prefixes),
                Some(Token::Dot) | None => {
                    i += 1;
                    break;
                }
                other => return Err(err(format!("expected predicate, found {other:?}"))),
            };
            i += 1;

            // objects
            loop {
                match tokens.get(i) {
                    Some(Token::Iri(iri)) => {
                        blocks[slot]
                            .predicates
                            .push((predicate.clone(), TurtleObject::Iri(iri.clone())));
                        i += 1;
                    }
                    Some(Token::Literal { value, lang }) => {
                        blocks[slot].predicates.push((
                            predicate.clone(),
                            TurtleObject::Literal { value: value.clone(), lang: lang.clone() },
                        ));
                        i += 1;
                    }
                    Some(Token::Word(w)) => {
                        let object = if w.contains(':') {
                            TurtleObject::Iri(expand(w, &prefixes))
                        } else {
                            // bare number or boolean
                            TurtleObject::Literal { value: w.clone(), lang: None }
                        };
                        blocks[slot].predicates.push((predicate.clone(), object));
                        i += 1;
                    }
                    Some(Token::Open(open)) => {
                        // skip blank-node or collection structure
                        i = skip_bracketed(&tokens, i, *open)
                            .ok_or_else(|| err("unbalanced bracket".to_string()))?;
                    }
                    other => return Err(err(format!("expected object, found {other:?}"))),
                }

                if tokens.get(i) == Some(&Token::Comma) {
                    i += 1;
                    continue;
                }
                break;
            }

            match tokens.get(i) {
                Some(Token::Semi) => {
                    i += 1;
                    // tolerate `;` immediately before the closing dot
                    if tokens.get(i) == Some(&Token::Dot) {
                        i += 1;
                        break;
                    }
                }
                Some(Token::Dot) | None => {
                    i += 1;
                    break;
                }
                other => return Err(err(format!("expected ';' or '.', found {other:?}"))),
            }
        }
    }

    Ok(blocks)
}

fn expand(word: &str, prefixes: &HashMap<String, String>) -> String {
    if let Some((prefix, local)) = word.split_once(':') {
        if let Some(base) = prefixes.get(prefix) {
            return format!("{base}{local}");
        }
    }
    word.to_string()
}

fn skip_bracketed(tokens: &[Token], open_at: usize, open: char) -> Option<usize> {
    let close = if open == '(' { ')' } else { ']' };
    let mut depth = 0;
    let mut i = open_at;
    while i < tokens.len() {
        match &tokens[i] {
            Token::Open(c) if *c == open => depth += 1,
            Token::Close(c) if *c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
@prefix si: <http://si-digital-framework.org/SI/units/> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix skos: <http://www.w3.org/2004/02/skos/core#> .

# the base unit of length
si:metre a si:MeasurementUnit ;
    rdfs:label "metre"@en , "mètre"@fr ;
    skos:altLabel "meter"@en ;
    si:hasSymbol "m" .

si:second a si:MeasurementUnit ;
    rdfs:label "second"@en ;
    si:hasSymbol "s" .
"#;

    #[test]
    fn parses_subject_blocks_in_order() {
        let blocks = parse(SAMPLE, "sample.ttl").unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].subject, "http://si-digital-framework.org/SI/units/metre");
        assert_eq!(blocks[1].subject, "http://si-digital-framework.org/SI/units/second");
    }

    #[test]
    fn expands_types_and_literals() {
        let blocks = parse(SAMPLE, "sample.ttl").unwrap();
        let metre = &blocks[0];
        assert!(metre.has_type("MeasurementUnit"));
        assert_eq!(metre.literal("label", Some("en")), Some("metre"));
        assert_eq!(metre.literal("altLabel", Some("en")), Some("meter"));
        assert_eq!(metre.literal("hasSymbol", None), Some("m"));
    }

    #[test]
    fn language_preference() {
        let blocks = parse(SAMPLE, "sample.ttl").unwrap();
        assert_eq!(blocks[0].literal("label", Some("fr")), Some("mètre"));
        // unknown language falls back to the first literal
        assert_eq!(blocks[0].literal("label", Some("de")), Some("metre"));
    }

    #[test]
    fn datatyped_and_bare_numbers() {
        let text = r#"
@prefix ex: <http://example.org/> .
ex:kilo ex:multiplier "1000.0"^^<http://www.w3.org/2001/XMLSchema#double> ;
    ex:power 3 .
"#;
        let blocks = parse(text, "numbers.ttl").unwrap();
        assert_eq!(blocks[0].literal("multiplier", None), Some("1000.0"));
        assert_eq!(blocks[0].literal("power", None), Some("3"));
    }

    #[test]
    fn blank_nodes_are_skipped_not_fatal() {
        let text = r#"
@prefix ex: <http://example.org/> .
ex:thing ex:prop [ ex:inner "x" ] ;
    ex:label "thing" .
"#;
        let blocks = parse(text, "bn.ttl").unwrap();
        assert_eq!(blocks[0].literal("label", None), Some("thing"));
    }

    #[test]
    fn merges_repeated_subjects() {
        let text = r#"
@prefix ex: <http://example.org/> .
ex:a ex:p "one" .
ex:a ex:q "two" .
"#;
        let blocks = parse(text, "merge.ttl").unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].literal("p", None), Some("one"));
        assert_eq!(blocks[0].literal("q", None), Some("two"));
    }

    #[test]
    fn unterminated_literal_is_an_error() {
        let err = parse("ex:a ex:p \"oops", "bad.ttl").unwrap_err();
        assert!(matches!(err, IoError::VocabParse { .. }), "got {err:?}");
    }

    #[test]
    fn local_name_extraction() {
        assert_eq!(local_name("http://www.w3.org/2000/01/rdf-schema#label"), "label");
        assert_eq!(local_name("http://si-digital-framework.org/SI/units/metre"), "metre");
        assert_eq!(local_name("plain"), "plain");
    }
}
