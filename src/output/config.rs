//! Output configuration types

/// Configuration for output formatting.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
    /// Emit file payloads below each file line. Off renders the bare tree.
    pub show_content: bool,
    /// Append a human-readable size to file lines.
    pub show_size: bool,
    pub show_summary: bool,
}

impl OutputConfig {
    pub fn tree_only() -> Self {
        Self {
            show_content: false,
            ..Self::default()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_color: false,
            show_content: true,
            show_size: false,
            show_summary: true,
        }
    }
}
