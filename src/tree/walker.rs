//! TreeWalker - lazy depth-first traversal of the scan root
//!
//! Entries come out in pre-order, directories first and then by name, so the
//! sequence alone is enough to rebuild the tree. Each directory is listed
//! once, filtered against the ignore rules and the include filter, sorted,
//! and pushed as a frame; nothing below a pruned directory is ever read.

use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};
use std::vec;

use super::config::WalkerConfig;
use super::node::{NodeKind, NodeStatus};
use super::utils::{compare_entries, join_relative, root_name};

/// One visited entry, yielded in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    /// Root-relative with `/` separators; empty for the root.
    pub relative: String,
    pub name: String,
    /// 0 for the root.
    pub depth: usize,
    pub kind: NodeKind,
    pub status: NodeStatus,
    /// Set once the walker has listed this directory's children.
    pub descended: bool,
}

impl WalkEntry {
    /// Regular files whose content should be loaded.
    pub fn is_loadable(&self) -> bool {
        self.kind == NodeKind::File && self.status.is_ok()
    }
}

/// Builds [`Walk`] iterators over a configured root.
pub struct TreeWalker<'a> {
    config: &'a WalkerConfig,
}

impl<'a> TreeWalker<'a> {
    pub fn new(config: &'a WalkerConfig) -> Self {
        Self { config }
    }

    /// Lazily walk the tree. The root is always the first entry.
    pub fn entries(&self) -> Walk<'a> {
        let root = &self.config.root;
        Walk {
            config: self.config,
            pending_root: Some(WalkEntry {
                path: root.clone(),
                relative: String::new(),
                name: root_name(root),
                depth: 0,
                kind: NodeKind::Dir,
                status: NodeStatus::Ok,
                descended: false,
            }),
            stack: Vec::new(),
        }
    }
}

/// A listed directory whose children are still being yielded.
struct Frame {
    /// Resolved path, tracked only when following symlinks.
    canonical: Option<PathBuf>,
    children: vec::IntoIter<WalkEntry>,
}

/// Pre-order iterator over the visible entries of a tree.
///
/// Memory use is one sorted listing per level of the current path.
pub struct Walk<'a> {
    config: &'a WalkerConfig,
    pending_root: Option<WalkEntry>,
    stack: Vec<Frame>,
}

impl Iterator for Walk<'_> {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<WalkEntry> {
        if let Some(root) = self.pending_root.take() {
            return Some(self.enter(root));
        }

        loop {
            let frame = self.stack.last_mut()?;
            match frame.children.next() {
                Some(entry) if entry.kind.is_dir() && entry.status.is_ok() => {
                    return Some(self.enter(entry));
                }
                Some(entry) => return Some(entry),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl Walk<'_> {
    /// Yield a directory, pushing a frame for its children when it is descended.
    fn enter(&mut self, mut entry: WalkEntry) -> WalkEntry {
        let canonical = if self.config.follow_symlinks {
            match fs::canonicalize(&entry.path) {
                Ok(path) => Some(path),
                Err(e) => {
                    log::warn!("cannot resolve {}: {}", entry.path.display(), e);
                    entry.status = NodeStatus::Unreadable(e.to_string());
                    return entry;
                }
            }
        } else {
            None
        };

        if let Some(resolved) = &canonical {
            if self.stack.iter().any(|f| f.canonical.as_ref() == Some(resolved)) {
                log::warn!(
                    "symlink cycle at {} (resolves to {})",
                    entry.path.display(),
                    resolved.display()
                );
                entry.status = NodeStatus::CycleDetected;
                return entry;
            }
        }

        let at_max_depth = self
            .config
            .max_depth
            .is_some_and(|max| entry.depth > 0 && entry.depth >= max);
        if at_max_depth {
            return entry;
        }

        match self.list_children(&entry.path, &entry.relative, entry.depth + 1) {
            Ok(children) => {
                self.stack.push(Frame {
                    canonical,
                    children: children.into_iter(),
                });
                entry.descended = true;
            }
            Err(e) => {
                log::warn!("cannot read directory {}: {}", entry.path.display(), e);
                entry.status = NodeStatus::Unreadable(e.to_string());
            }
        }
        entry
    }

    /// List, filter and sort the visible children of one directory.
    fn list_children(
        &self,
        dir: &Path,
        parent: &str,
        depth: usize,
    ) -> std::io::Result<Vec<WalkEntry>> {
        let mut listed = Vec::new();

        for dir_entry in fs::read_dir(dir)? {
            let dir_entry = match dir_entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let os_name = dir_entry.file_name();
            let name = os_name.to_string_lossy().into_owned();
            let relative = join_relative(parent, &name);
            let (kind, status) = self.classify(&dir_entry);
            let is_dir = kind.is_dir();

            if let Some(rule) = self.config.rules.decide(&relative, is_dir) {
                if !rule.is_negation {
                    log::debug!("excluded {} by {}", relative, rule);
                    continue;
                }
            }
            if !is_dir && !self.config.include.accepts_file(&relative) {
                log::debug!("excluded {} by include filter", relative);
                continue;
            }

            listed.push((
                os_name,
                WalkEntry {
                    path: dir_entry.path(),
                    relative,
                    name,
                    depth,
                    kind,
                    status,
                    descended: false,
                },
            ));
        }

        listed.sort_by(|(a_name, a), (b_name, b)| {
            compare_entries(a.kind.is_dir(), a_name, b.kind.is_dir(), b_name)
        });
        Ok(listed.into_iter().map(|(_, entry)| entry).collect())
    }

    fn classify(&self, entry: &DirEntry) -> (NodeKind, NodeStatus) {
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => return (NodeKind::File, NodeStatus::Unreadable(e.to_string())),
        };

        if !file_type.is_symlink() {
            return (kind_of(file_type.is_dir(), file_type.is_file()), NodeStatus::Ok);
        }

        let target = fs::read_link(entry.path())
            .map(|t| t.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !self.config.follow_symlinks {
            return (NodeKind::Symlink { target }, NodeStatus::Ok);
        }

        match fs::metadata(entry.path()) {
            Ok(meta) => (kind_of(meta.is_dir(), meta.is_file()), NodeStatus::Ok),
            Err(e) => {
                log::warn!("broken symlink {}: {}", entry.path().display(), e);
                (NodeKind::Symlink { target }, NodeStatus::Unreadable(e.to_string()))
            }
        }
    }
}

fn kind_of(is_dir: bool, is_file: bool) -> NodeKind {
    if is_dir {
        NodeKind::Dir
    } else if is_file {
        NodeKind::File
    } else {
        NodeKind::Special
    }
}
