//! A single compiled ignore rule

use std::fmt;
use std::path::PathBuf;

use regex::Regex;

use crate::error::RuleSyntaxError;

use super::basename;
use super::wildmatch::to_regex;

/// Where a rule came from, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOrigin {
    BuiltIn,
    File(PathBuf),
    CommandLine,
    Inline,
}

impl fmt::Display for RuleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleOrigin::BuiltIn => write!(f, "<built-in>"),
            RuleOrigin::File(path) => write!(f, "{}", path.display()),
            RuleOrigin::CommandLine => write!(f, "<command line>"),
            RuleOrigin::Inline => write!(f, "<inline>"),
        }
    }
}

/// One line of an ignore file after parsing.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    /// Glob body with `!`, leading `/` and trailing `/` removed.
    pub pattern: String,
    pub is_negation: bool,
    pub directory_only: bool,
    /// Matched against the whole relative path instead of the basename.
    pub anchored_to_root: bool,
    pub source_order: usize,
    pub origin: RuleOrigin,
    /// 1-based line within the origin.
    pub line: usize,
    regex: Regex,
}

impl IgnoreRule {
    /// Parse a raw ignore-file line.
    ///
    /// Returns `Ok(None)` for blank lines, comments and a lone `!`.
    pub fn parse(
        raw: &str,
        source_order: usize,
        origin: RuleOrigin,
        line: usize,
    ) -> Result<Option<Self>, RuleSyntaxError> {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if raw.starts_with('#') {
            return Ok(None);
        }

        let text = trim_trailing_spaces(raw);
        if text.is_empty() {
            return Ok(None);
        }

        let (is_negation, text) = match text.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        // A bare `!` negates nothing; git skips it like a blank line.
        if text.is_empty() {
            return Ok(None);
        }

        let (directory_only, text) = match text.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let anchored_to_root = text.contains('/');
        let text = text.strip_prefix('/').unwrap_or(text);
        if text.is_empty() {
            return Err(RuleSyntaxError::EmptyPattern);
        }

        let regex = Regex::new(&to_regex(text)?)?;

        Ok(Some(Self {
            pattern: text.to_string(),
            is_negation,
            directory_only,
            anchored_to_root,
            source_order,
            origin,
            line,
            regex,
        }))
    }

    /// Whether this rule's pattern applies to `relative` (ignoring negation).
    pub fn is_match(&self, relative: &str, is_dir: bool) -> bool {
        if self.directory_only && !is_dir {
            return false;
        }
        if self.anchored_to_root {
            self.regex.is_match(relative)
        } else {
            self.regex.is_match(basename(relative))
        }
    }
}

impl fmt::Display for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negation {
            write!(f, "!")?;
        }
        if self.anchored_to_root && !self.pattern.contains('/') {
            write!(f, "/")?;
        }
        write!(f, "{}", self.pattern)?;
        if self.directory_only {
            write!(f, "/")?;
        }
        Ok(())
    }
}

/// Drop trailing spaces unless the last one is backslash-escaped.
fn trim_trailing_spaces(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b' ' {
        let backslashes = bytes[..end - 1]
            .iter()
            .rev()
            .take_while(|&&b| b == b'\\')
            .count();
        if backslashes % 2 == 1 {
            break;
        }
        end -= 1;
    }
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Option<IgnoreRule> {
        IgnoreRule::parse(line, 0, RuleOrigin::Inline, 1).unwrap()
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        assert!(parse("").is_none());
        assert!(parse("   ").is_none());
        assert!(parse("# a comment").is_none());
        assert!(parse("\r").is_none());
        assert!(parse("!").is_none());
        assert!(parse("!  ").is_none());
    }

    #[test]
    fn test_escaped_hash_and_bang_are_patterns() {
        let rule = parse(r"\#file").unwrap();
        assert!(!rule.is_negation);
        assert!(rule.is_match("#file", false));

        let rule = parse(r"\!important").unwrap();
        assert!(!rule.is_negation);
        assert!(rule.is_match("!important", false));
    }

    #[test]
    fn test_qualifiers() {
        let rule = parse("!build/").unwrap();
        assert!(rule.is_negation);
        assert!(rule.directory_only);
        assert!(!rule.anchored_to_root, "a trailing slash alone does not anchor");
        assert_eq!(rule.pattern, "build");

        let rule = parse("/root.txt").unwrap();
        assert!(rule.anchored_to_root);
        assert_eq!(rule.pattern, "root.txt");

        let rule = parse("doc/*.md").unwrap();
        assert!(rule.anchored_to_root);
    }

    #[test]
    fn test_directory_only_rule_ignores_files() {
        let rule = parse("build/").unwrap();
        assert!(rule.is_match("build", true));
        assert!(rule.is_match("nested/build", true));
        assert!(!rule.is_match("build", false));
    }

    #[test]
    fn test_unanchored_rule_matches_basename_at_any_depth() {
        let rule = parse("*.log").unwrap();
        assert!(rule.is_match("debug.log", false));
        assert!(rule.is_match("a/b/c/debug.log", false));
        assert!(!rule.is_match("debug.log.txt", false));
    }

    #[test]
    fn test_anchored_rule_matches_from_root_only() {
        let rule = parse("/root.txt").unwrap();
        assert!(rule.is_match("root.txt", false));
        assert!(!rule.is_match("sub/root.txt", false));

        let rule = parse("doc/frotz").unwrap();
        assert!(rule.is_match("doc/frotz", true));
        assert!(!rule.is_match("a/doc/frotz", true));
    }

    #[test]
    fn test_trailing_spaces() {
        let rule = parse("name   ").unwrap();
        assert_eq!(rule.pattern, "name");

        let rule = parse(r"name\ ").unwrap();
        assert!(rule.is_match("name ", false));
        assert!(!rule.is_match("name", false));
    }

    #[test]
    fn test_crlf_line_endings() {
        let rule = parse("*.tmp\r").unwrap();
        assert!(rule.is_match("x.tmp", false));
    }

    #[test]
    fn test_invalid_rules() {
        assert!(matches!(
            IgnoreRule::parse("foo\\", 0, RuleOrigin::Inline, 1),
            Err(RuleSyntaxError::TrailingBackslash)
        ));
        assert!(matches!(
            IgnoreRule::parse("[oops", 0, RuleOrigin::Inline, 1),
            Err(RuleSyntaxError::UnterminatedClass)
        ));
        assert!(matches!(
            IgnoreRule::parse("/", 0, RuleOrigin::Inline, 1),
            Err(RuleSyntaxError::EmptyPattern)
        ));
        assert!(matches!(
            IgnoreRule::parse("[z-a]", 0, RuleOrigin::Inline, 1),
            Err(RuleSyntaxError::Regex(_))
        ));
    }

    #[test]
    fn test_display_round_trips_qualifiers() {
        assert_eq!(parse("!build/").unwrap().to_string(), "!build/");
        assert_eq!(parse("/root.txt").unwrap().to_string(), "/root.txt");
        assert_eq!(parse("doc/*.md").unwrap().to_string(), "doc/*.md");
    }
}
