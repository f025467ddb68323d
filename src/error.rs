//! Error types
//!
//! Only fatal conditions live here. Per-entry problems (unreadable files,
//! symlink cycles, truncation) are recorded on the tree nodes instead, so the
//! rendered artifact describes what could not be captured.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Syntax problems found while compiling a single ignore rule.
#[derive(Debug, Error)]
pub enum RuleSyntaxError {
    #[error("trailing backslash escapes nothing")]
    TrailingBackslash,
    #[error("unterminated character class")]
    UnterminatedClass,
    #[error("pattern is empty after removing qualifiers")]
    EmptyPattern,
    #[error("compiled pattern rejected: {0}")]
    Regex(#[from] regex::Error),
}

/// Invalid configuration, detected before traversal starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{origin}:{line}: invalid ignore rule `{pattern}`: {reason}")]
    InvalidRule {
        origin: String,
        line: usize,
        pattern: String,
        #[source]
        reason: RuleSyntaxError,
    },

    #[error("invalid include pattern `{pattern}`: {source}")]
    InvalidInclude {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("cannot read ignore file {}: {source}", path.display())]
    IgnoreFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Fatal errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScribeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("root path not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("root path is not a directory: {}", .0.display())]
    RootNotADirectory(PathBuf),

    #[error("cannot resolve root path {}: {source}", path.display())]
    RootUnresolvable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T, E = ScribeError> = std::result::Result<T, E>;
