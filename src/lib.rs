//! treescribe - a directory tree with the contents of every file embedded
//!
//! A scan walks a root directory, drops whatever the gitignore-style rules
//! exclude, loads each remaining file as text (or a binary/truncated/unreadable
//! marker) and renders one deterministic artifact.

pub mod content;
pub mod error;
pub mod output;
pub mod rules;
pub mod scan;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use content::{DEFAULT_MAX_FILE_SIZE, Payload};
pub use error::{ConfigError, Result, RuleSyntaxError, ScribeError};
pub use output::{OutputConfig, TreeFormatter, render, to_json, write_json};
pub use rules::{
    IGNORE_FILE_NAME, IgnoreRule, IncludeFilter, PatternSet, PatternSetBuilder, RuleOrigin,
};
pub use scan::{check_root, scan};
pub use tree::{
    NodeKind, NodeStatus, TreeNode, TreeWalker, Walk, WalkEntry, WalkerConfig, relative_within,
};
