use std::fmt;

/// Adapter-level failures. A malformed vocabulary source is fatal for
/// that vocabulary only; the engine itself never raises.
#[derive(Debug)]
pub enum IoError {
    /// File read error (store or vocabulary source).
    Read { path: String, detail: String },
    /// Canonical store file failed to deserialize.
    StoreParse { path: String, detail: String },
    /// External vocabulary source failed to parse.
    VocabParse { source: String, detail: String },
    /// Store write error.
    Write { path: String, detail: String },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, detail } => write!(f, "cannot read {path}: {detail}"),
            Self::StoreParse { path, detail } => {
                write!(f, "malformed store file {path}: {detail}")
            }
            Self::VocabParse { source, detail } => {
                write!(f, "malformed vocabulary source {source}: {detail}")
            }
            Self::Write { path, detail } => write!(f, "cannot write {path}: {detail}"),
        }
    }
}

impl std::error::Error for IoError {}
