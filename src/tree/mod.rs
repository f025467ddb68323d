//! Directory tree walking
//!
//! - `TreeWalker` yields a lazy, deterministic pre-order [`Walk`] of the
//!   visible entries under a root
//! - `TreeNode` is the materialized tree handed to the renderers

mod config;
mod node;
mod utils;
mod walker;

pub use config::WalkerConfig;
pub use node::{NodeKind, NodeStatus, TreeNode};
pub use utils::{format_size, relative_within, root_name};
pub use walker::{TreeWalker, Walk, WalkEntry};
