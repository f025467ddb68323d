//! Ordered, immutable rule sets and the include/exclude decision

use std::fs;
use std::io;
use std::path::Path;

use crate::error::ConfigError;

use super::rule::{IgnoreRule, RuleOrigin};
use super::wildmatch::escape_literal;

/// Rules every scan starts with. User rules come later and can override them.
pub const DEFAULT_RULES: &[&str] = &[".git/"];

/// An ordered sequence of ignore rules.
///
/// The decision for a path is made by the last rule whose pattern matches it;
/// a path no rule matches is included.
#[derive(Debug, Clone)]
pub struct PatternSet {
    rules: Vec<IgnoreRule>,
}

impl PatternSet {
    pub fn builder() -> PatternSetBuilder {
        PatternSetBuilder::new()
    }

    /// Compile rule lines into a set, without built-in defaults.
    pub fn compile<I, S>(lines: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = PatternSetBuilder::new();
        for (i, line) in lines.into_iter().enumerate() {
            builder.add_line(RuleOrigin::Inline, i + 1, line.as_ref())?;
        }
        Ok(builder.build())
    }

    /// A set with no rules at all; nothing is excluded.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Whether `relative` is excluded. Only the path itself is considered;
    /// use [`PatternSet::matches_path_or_parents`] to account for excluded
    /// ancestors.
    pub fn matches(&self, relative: &str, is_dir: bool) -> bool {
        self.decide(relative, is_dir)
            .is_some_and(|rule| !rule.is_negation)
    }

    /// The rule that decides `relative`, if any matches.
    pub fn decide(&self, relative: &str, is_dir: bool) -> Option<&IgnoreRule> {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.is_match(relative, is_dir))
    }

    /// Whether `relative` or any of its ancestor directories is excluded.
    ///
    /// This is the answer a traversal gives: once a directory is excluded its
    /// subtree is never visited, so negations below it have no effect.
    pub fn matches_path_or_parents(&self, relative: &str, is_dir: bool) -> bool {
        let ancestor_excluded = relative
            .match_indices('/')
            .any(|(i, _)| self.matches(&relative[..i], true));
        ancestor_excluded || self.matches(relative, is_dir)
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for PatternSet {
    /// The built-in defaults only.
    fn default() -> Self {
        PatternSetBuilder::new().with_defaults().build()
    }
}

/// Accumulates rules from several sources in order.
#[derive(Debug, Default)]
pub struct PatternSetBuilder {
    rules: Vec<IgnoreRule>,
}

impl PatternSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the built-in default rules.
    pub fn with_defaults(mut self) -> Self {
        for (i, line) in DEFAULT_RULES.iter().enumerate() {
            // Defaults are static and known to parse.
            if let Err(e) = self.add_line(RuleOrigin::BuiltIn, i + 1, line) {
                log::error!("built-in rule `{}` rejected: {}", line, e);
            }
        }
        self
    }

    /// Parse and append one line. Blank lines and comments are skipped.
    pub fn add_line(
        &mut self,
        origin: RuleOrigin,
        line: usize,
        text: &str,
    ) -> Result<&mut Self, ConfigError> {
        let order = self.rules.len();
        match IgnoreRule::parse(text, order, origin.clone(), line) {
            Ok(Some(rule)) => {
                log::debug!("rule #{} from {}:{}: {}", order, origin, line, rule);
                self.rules.push(rule);
            }
            Ok(None) => {}
            Err(reason) => {
                return Err(ConfigError::InvalidRule {
                    origin: origin.to_string(),
                    line,
                    pattern: text.to_string(),
                    reason,
                });
            }
        }
        Ok(self)
    }

    /// Append every line of `text`, numbering lines from 1.
    pub fn add_lines(&mut self, origin: RuleOrigin, text: &str) -> Result<&mut Self, ConfigError> {
        for (i, line) in text.lines().enumerate() {
            self.add_line(origin.clone(), i + 1, line)?;
        }
        Ok(self)
    }

    /// Append the rules of an ignore file.
    ///
    /// A missing file is only an error when `required` is set.
    pub fn add_file(&mut self, path: &Path, required: bool) -> Result<&mut Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => self.add_lines(RuleOrigin::File(path.to_path_buf()), &text),
            Err(e) if e.kind() == io::ErrorKind::NotFound && !required => {
                log::debug!("no ignore file at {}", path.display());
                Ok(self)
            }
            Err(source) => Err(ConfigError::IgnoreFile {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Append a built-in rule excluding exactly one root-relative path.
    pub fn exclude_path(&mut self, relative: &str) -> Result<&mut Self, ConfigError> {
        let line = format!("/{}", escape_literal(relative));
        self.add_line(RuleOrigin::BuiltIn, 0, &line)
    }

    pub fn build(self) -> PatternSet {
        PatternSet { rules: self.rules }
    }
}
