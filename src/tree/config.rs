//! Configuration types for tree walking

use std::path::PathBuf;

use crate::content::DEFAULT_MAX_FILE_SIZE;
use crate::rules::{IncludeFilter, PatternSet};

/// Everything a scan needs, built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    pub root: PathBuf,
    pub rules: PatternSet,
    pub include: IncludeFilter,
    /// Maximum number of content bytes embedded per file.
    pub max_file_size: u64,
    pub follow_symlinks: bool,
    pub max_depth: Option<usize>,
    /// Read file contents at all (off for tree-only output).
    pub load_content: bool,
    /// Number of parallel workers for content loading.
    /// 0 = auto-detect (use all available cores)
    /// 1 = sequential (no parallelism)
    /// N = use N worker threads
    pub parallel_workers: usize,
}

impl WalkerConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            rules: PatternSet::default(),
            include: IncludeFilter::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            follow_symlinks: false,
            max_depth: None,
            load_content: true,
            parallel_workers: 0,
        }
    }
}
