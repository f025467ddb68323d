//! Shared utility functions for output formatting

use std::io::{self, Write};

use termcolor::{Color, ColorSpec, WriteColor};

/// Connector drawn in front of a child entry.
pub fn connector(is_last: bool) -> &'static str {
    if is_last { "└── " } else { "├── " }
}

/// Calculate the continuation prefix for lines below an entry.
pub fn continuation_prefix(prefix: &str, is_last: bool) -> String {
    if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}│   ", prefix)
    }
}

/// A backtick fence longer than any backtick run inside `text` (at least 3).
pub fn fence_for(text: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

/// Split file content into display lines.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. Other control characters are
/// shown in caret notation (`^[` for ESC) so embedded content cannot move the
/// cursor or restyle the terminal.
pub fn content_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => lines.push(std::mem::take(&mut current)),
            '\r' => {
                chars.next_if_eq(&'\n');
                lines.push(std::mem::take(&mut current));
            }
            '\t' => current.push(c),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                current.push('^');
                current.push(char::from(c as u8 ^ 0x40));
            }
            c if c.is_control() => current.push(char::REPLACEMENT_CHARACTER),
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// How a rendered line is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Root,
    Dir,
    File,
    Symlink,
    Fence,
    Content,
    Marker,
    Error,
    Summary,
}

impl LineStyle {
    /// Terminal color for this style; `None` means default text.
    pub fn color_spec(&self) -> Option<ColorSpec> {
        let mut spec = ColorSpec::new();
        match self {
            LineStyle::Root | LineStyle::Dir => spec.set_fg(Some(Color::Blue)).set_bold(true),
            LineStyle::Symlink => spec.set_fg(Some(Color::Cyan)),
            LineStyle::Fence => spec.set_fg(Some(Color::Black)).set_intense(true),
            LineStyle::Marker => spec.set_fg(Some(Color::Yellow)),
            LineStyle::Error => spec.set_fg(Some(Color::Red)),
            LineStyle::File | LineStyle::Content | LineStyle::Summary => return None,
        };
        Some(spec)
    }
}

/// One output line: tree-drawing prefix plus styled text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub prefix: String,
    pub text: String,
    pub style: LineStyle,
}

impl RenderedLine {
    pub fn new(prefix: impl Into<String>, text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            prefix: prefix.into(),
            text: text.into(),
            style,
        }
    }

    /// Append the plain-text form, without trailing blanks on empty lines.
    pub fn push_plain(&self, output: &mut String) {
        if self.text.is_empty() {
            output.push_str(self.prefix.trim_end());
        } else {
            output.push_str(&self.prefix);
            output.push_str(&self.text);
        }
        output.push('\n');
    }
}

/// Write a rendered line, coloring only the text after the prefix.
pub fn write_rendered_line<W: WriteColor>(out: &mut W, line: &RenderedLine) -> io::Result<()> {
    if line.text.is_empty() {
        return writeln!(out, "{}", line.prefix.trim_end());
    }
    write!(out, "{}", line.prefix)?;
    match line.style.color_spec() {
        Some(spec) => {
            out.set_color(&spec)?;
            write!(out, "{}", line.text)?;
            out.reset()?;
        }
        None => write!(out, "{}", line.text)?,
    }
    writeln!(out)
}
