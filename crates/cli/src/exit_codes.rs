//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts and CI jobs
//! rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Domain    | Description                                    |
//! |------|-----------|------------------------------------------------|
//! | 0    | Universal | Success                                        |
//! | 1    | Universal | General error (unspecified)                    |
//! | 2    | Universal | CLI usage error (bad args, unknown type)       |
//! | 3    | store     | Canonical store unreadable or malformed        |
//! | 4    | vocab     | Vocabulary source unreadable or malformed      |
//! | 5    | findings  | Check/validate found something to resolve      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant below
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown entity type or vocabulary.
pub const EXIT_USAGE: u8 = 2;

/// Canonical store error - a YAML collection cannot be read, parsed,
/// or written back.
pub const EXIT_STORE: u8 = 3;

/// Vocabulary error - the external source file cannot be read or its
/// Turtle/XML content is malformed.
pub const EXIT_VOCAB: u8 = 4;

/// Findings present - `check` found missing references, or
/// `validate` found uniqueness violations. Like `diff(1)`, a nonzero
/// exit here means "there is something to look at", not "it broke".
pub const EXIT_FINDINGS: u8 = 5;
