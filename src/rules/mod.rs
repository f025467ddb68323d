//! Ignore rules in the style of `.gitignore`
//!
//! Rules are compiled once into an immutable [`PatternSet`] and passed down
//! explicitly to everything that needs a decision.
//!
//! - Blank lines and `#` comments are skipped
//! - `!` negates, a trailing `/` restricts a rule to directories
//! - Patterns containing `/` are anchored to the scan root, others match the
//!   basename at any depth
//! - The last matching rule wins

mod include;
mod rule;
mod set;
mod wildmatch;

pub use include::IncludeFilter;
pub use rule::{IgnoreRule, RuleOrigin};
pub use set::{DEFAULT_RULES, PatternSet, PatternSetBuilder};
pub use wildmatch::escape_literal;

/// Ignore file looked up in the scan root when none is given explicitly.
pub const IGNORE_FILE_NAME: &str = ".trscrignore";

/// Last component of a `/`-separated relative path.
pub(crate) fn basename(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}
