//! Tree formatter for buffered output
//!
//! `TreeFormatter` lays a complete `TreeNode` out into styled lines once and
//! then either joins them into a string or writes them with colors. Both
//! paths share the layout, so colored and plain output differ only in escape
//! codes.

use std::io;

use termcolor::WriteColor;

use crate::content::Payload;
use crate::tree::{NodeKind, NodeStatus, TreeNode, format_size};

use super::config::OutputConfig;
use super::utils::{
    LineStyle, RenderedLine, connector, content_lines, continuation_prefix, fence_for,
    write_rendered_line,
};

/// Formatter for buffered tree output.
pub struct TreeFormatter {
    config: OutputConfig,
}

impl TreeFormatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn format(&self, node: &TreeNode) -> String {
        let mut output = String::new();
        for line in self.layout(node) {
            line.push_plain(&mut output);
        }
        output
    }

    /// Write the tree through a color-capable writer.
    ///
    /// Colors are only emitted when `use_color` is set.
    pub fn print<W: WriteColor>(&self, node: &TreeNode, out: &mut W) -> io::Result<()> {
        for line in self.layout(node) {
            if self.config.use_color {
                write_rendered_line(out, &line)?;
            } else {
                let mut plain = String::new();
                line.push_plain(&mut plain);
                out.write_all(plain.as_bytes())?;
            }
        }
        Ok(())
    }

    /// Every output line, in order.
    pub fn layout(&self, root: &TreeNode) -> Vec<RenderedLine> {
        let mut lines = vec![RenderedLine::new(
            "",
            format!("{}/", root.name),
            LineStyle::Root,
        )];
        self.push_status(root, "", &mut lines);
        self.push_children(&root.children, "", &mut lines);

        if self.config.show_summary {
            let (dirs, files) = root.counts();
            lines.push(RenderedLine::new("", "", LineStyle::Summary));
            lines.push(RenderedLine::new(
                "",
                format!("{} directories, {} files", dirs, files),
                LineStyle::Summary,
            ));
        }
        lines
    }

    fn push_children(&self, children: &[TreeNode], prefix: &str, lines: &mut Vec<RenderedLine>) {
        for (i, child) in children.iter().enumerate() {
            let is_last = i == children.len() - 1;
            let (label, style) = self.label(child);
            lines.push(RenderedLine::new(
                format!("{}{}", prefix, connector(is_last)),
                label,
                style,
            ));

            let cont = continuation_prefix(prefix, is_last);
            self.push_status(child, &cont, lines);
            if child.is_dir() {
                self.push_children(&child.children, &cont, lines);
            } else if self.config.show_content {
                if let Some(payload) = &child.content {
                    push_payload(payload, &cont, lines);
                }
            }
        }
    }

    fn label(&self, node: &TreeNode) -> (String, LineStyle) {
        match &node.kind {
            NodeKind::Dir => (format!("{}/", node.name), LineStyle::Dir),
            NodeKind::Symlink { target } => {
                (format!("{} -> {}", node.name, target), LineStyle::Symlink)
            }
            NodeKind::File | NodeKind::Special => {
                let size = node
                    .content
                    .as_ref()
                    .and_then(Payload::original_size)
                    .filter(|_| self.config.show_size);
                match size {
                    Some(bytes) => (
                        format!("{} ({})", node.name, format_size(bytes)),
                        LineStyle::File,
                    ),
                    None => (node.name.clone(), LineStyle::File),
                }
            }
        }
    }

    fn push_status(&self, node: &TreeNode, prefix: &str, lines: &mut Vec<RenderedLine>) {
        let marker = match &node.status {
            NodeStatus::Ok => return,
            NodeStatus::Unreadable(reason) if node.is_dir() => {
                format!("[unreadable directory: {}]", reason)
            }
            NodeStatus::Unreadable(reason) => format!("[unreadable: {}]", reason),
            NodeStatus::CycleDetected => {
                "[cycle detected: link leads back to an enclosing directory]".to_string()
            }
        };
        lines.push(RenderedLine::new(prefix, marker, LineStyle::Error));
    }
}

fn push_payload(payload: &Payload, prefix: &str, lines: &mut Vec<RenderedLine>) {
    match payload {
        Payload::Text { text, .. } => push_fenced(text, prefix, lines),
        Payload::Truncated {
            text,
            shown,
            original_size,
        } => {
            push_fenced(text, prefix, lines);
            lines.push(RenderedLine::new(
                prefix,
                format!("[truncated: showing first {} of {} bytes]", shown, original_size),
                LineStyle::Marker,
            ));
        }
        Payload::Binary { size } => lines.push(RenderedLine::new(
            prefix,
            format!("[binary file, {} bytes]", size),
            LineStyle::Marker,
        )),
        Payload::Unreadable { reason } => lines.push(RenderedLine::new(
            prefix,
            format!("[unreadable: {}]", reason),
            LineStyle::Error,
        )),
    }
}

fn push_fenced(text: &str, prefix: &str, lines: &mut Vec<RenderedLine>) {
    let fence = fence_for(text);
    lines.push(RenderedLine::new(prefix, fence.clone(), LineStyle::Fence));
    for line in content_lines(text) {
        lines.push(RenderedLine::new(prefix, line, LineStyle::Content));
    }
    lines.push(RenderedLine::new(prefix, fence, LineStyle::Fence));
}

/// Render a tree as plain text with default settings.
pub fn render(node: &TreeNode) -> String {
    TreeFormatter::new(OutputConfig::default()).format(node)
}
