//! Scan orchestration: walk, load contents in parallel, assemble the tree

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;

use crate::content::{self, Payload};
use crate::error::{Result, ScribeError};
use crate::tree::{NodeKind, TreeNode, TreeWalker, WalkEntry, WalkerConfig};

/// Check that the scan root exists and is a directory.
pub fn check_root(root: &Path) -> Result<()> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ScribeError::RootNotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ScribeError::RootNotFound(root.to_path_buf()))
        }
        Err(source) => Err(ScribeError::RootUnresolvable {
            path: root.to_path_buf(),
            source,
        }),
    }
}

/// Walk `config.root` and build the complete tree.
///
/// Entries are collected in display order first; file contents are then
/// loaded on a worker pool and joined back by index, so the result does not
/// depend on scheduling.
pub fn scan(config: &WalkerConfig) -> Result<TreeNode> {
    let started = Instant::now();
    check_root(&config.root)?;

    let entries: Vec<WalkEntry> = TreeWalker::new(config).entries().collect();
    let payloads = if config.load_content {
        load_payloads(&entries, config.max_file_size, config.parallel_workers)
    } else {
        vec![None; entries.len()]
    };

    let tree = assemble(entries, payloads, config.include.is_active())
        .ok_or_else(|| ScribeError::RootNotFound(config.root.clone()))?;

    let (dirs, files) = tree.counts();
    log::info!(
        "scanned {} directories, {} files in {}",
        dirs,
        files,
        humantime::format_duration(started.elapsed())
    );
    Ok(tree)
}

/// Load one payload per loadable file, indexed like `entries`.
fn load_payloads(
    entries: &[WalkEntry],
    max_file_size: u64,
    workers: usize,
) -> Vec<Option<Payload>> {
    let mut payloads: Vec<Option<Payload>> = entries
        .iter()
        .map(|e| match e.kind {
            NodeKind::Special => Some(Payload::Unreadable {
                reason: "not a regular file".to_string(),
            }),
            _ => None,
        })
        .collect();

    let file_indices: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.is_loadable().then_some(i))
        .collect();

    let load_all = || -> Vec<(usize, Payload)> {
        file_indices
            .par_iter()
            .map(|&i| (i, content::load(&entries[i].path, max_file_size)))
            .collect()
    };

    let loaded = match workers {
        0 => load_all(),
        1 => file_indices
            .iter()
            .map(|&i| (i, content::load(&entries[i].path, max_file_size)))
            .collect(),
        n => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
            Ok(pool) => pool.install(load_all),
            Err(e) => {
                log::warn!("cannot build a pool of {} workers, using the global pool: {}", n, e);
                load_all()
            }
        },
    };

    for (i, payload) in loaded {
        payloads[i] = Some(payload);
    }
    payloads
}

/// Rebuild the tree from pre-order entries.
///
/// With `prune_empty` set, descended directories left without children are
/// dropped (an include filter removed everything below them). Directories cut
/// off by `max_depth` are kept.
fn assemble(
    entries: Vec<WalkEntry>,
    payloads: Vec<Option<Payload>>,
    prune_empty: bool,
) -> Option<TreeNode> {
    let mut stack: Vec<(TreeNode, bool)> = Vec::new();

    for (entry, content) in entries.into_iter().zip(payloads) {
        while stack.len() > entry.depth {
            close_top(&mut stack, prune_empty);
        }
        let node = TreeNode {
            name: entry.name,
            path: entry.relative,
            kind: entry.kind,
            status: entry.status,
            content,
            children: Vec::new(),
        };
        stack.push((node, entry.descended));
    }

    while stack.len() > 1 {
        close_top(&mut stack, prune_empty);
    }
    stack.pop().map(|(root, _)| root)
}

fn close_top(stack: &mut Vec<(TreeNode, bool)>, prune_empty: bool) {
    let Some((node, descended)) = stack.pop() else {
        return;
    };
    if prune_empty && descended && node.is_dir() && node.children.is_empty() {
        log::debug!("dropping {}: nothing included below it", node.path);
        return;
    }
    if let Some((parent, _)) = stack.last_mut() {
        parent.children.push(node);
    }
}
