//! Translation of gitignore-style globs into regular expressions
//!
//! Only the body of a rule goes through here; negation, directory-only and
//! anchoring qualifiers are stripped by the rule parser first.

use crate::error::RuleSyntaxError;

/// Translate a glob into an anchored, dot-matches-newline regex source.
///
/// - `*` matches any run of characters except `/`
/// - `?` matches one character except `/`
/// - `[...]` is a character class (`!` or `^` negates, `a-z` ranges)
/// - `**` spanning a whole segment matches across segments:
///   `**/x` any leading directories, `x/**` everything below, `a/**/b` zero
///   or more directories in between. Any other `**` behaves like `*`.
/// - `\c` matches `c` literally
pub fn to_regex(glob: &str) -> Result<String, RuleSyntaxError> {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::with_capacity(glob.len() * 2 + 8);
    out.push_str("(?s)^");

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                let run = chars[i..].iter().take_while(|&&c| c == '*').count();
                let next = i + run;
                let starts_segment = i == 0 || chars[i - 1] == '/';
                let ends_segment = next == chars.len() || chars[next] == '/';

                if run >= 2 && starts_segment && ends_segment {
                    if next == chars.len() {
                        out.push_str(".*");
                        i = next;
                    } else {
                        out.push_str("(?:.*/)?");
                        i = next + 1;
                    }
                } else {
                    out.push_str("[^/]*");
                    i = next;
                }
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            '[' => {
                i = push_class(&chars, i, &mut out)?;
            }
            '\\' => {
                let escaped = chars
                    .get(i + 1)
                    .ok_or(RuleSyntaxError::TrailingBackslash)?;
                push_literal(&mut out, *escaped);
                i += 2;
            }
            c => {
                push_literal(&mut out, c);
                i += 1;
            }
        }
    }

    out.push('$');
    Ok(out)
}

/// Escape a literal path so that it matches only itself when used as a glob.
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '?' | '[' | ' ') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Characters that must be escaped inside a regex character class.
fn push_class_char(class: &mut String, c: char) {
    if matches!(c, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
        class.push('\\');
    }
    class.push(c);
}

/// Consume a `[...]` class starting at `start`, returning the index just past
/// the closing bracket.
fn push_class(chars: &[char], start: usize, out: &mut String) -> Result<usize, RuleSyntaxError> {
    let mut i = start + 1;
    let mut class = String::from("[");

    if matches!(chars.get(i), Some('!') | Some('^')) {
        // Negated classes still never match the separator.
        class.push_str("^/");
        i += 1;
    }

    // A `]` directly after the opening bracket is a literal member.
    let body_start = i;
    loop {
        let c = *chars.get(i).ok_or(RuleSyntaxError::UnterminatedClass)?;
        match c {
            ']' if i > body_start => break,
            '\\' => {
                let escaped = chars.get(i + 1).ok_or(RuleSyntaxError::UnterminatedClass)?;
                push_class_char(&mut class, *escaped);
                i += 2;
            }
            '-' if i > body_start && chars.get(i + 1).is_some_and(|&n| n != ']') => {
                class.push('-');
                i += 1;
            }
            _ => {
                push_class_char(&mut class, c);
                i += 1;
            }
        }
    }

    class.push(']');
    out.push_str(&class);
    Ok(i + 1)
}
