//! Tree formatting and display
//!
//! - `config` - Output configuration types
//! - `utils` - Connectors, fences and styled lines
//! - `tree` - Text rendering, plain or colored
//! - `json` - JSON output

mod config;
mod json;
mod tree;
mod utils;

pub use config::OutputConfig;
pub use json::{to_json, write_json};
pub use tree::{TreeFormatter, render};
pub use utils::{LineStyle, RenderedLine, continuation_prefix, fence_for};
