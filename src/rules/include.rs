//! Allow-list filtering of files by glob

use glob::Pattern;

use crate::error::ConfigError;

use super::basename;

/// Optional allow-list applied to files after ignore rules.
///
/// Patterns ending in `/` name directories: a file must sit somewhere below a
/// matching directory. Other patterns name files and are tried against both
/// the relative path and the basename. With no patterns every file passes.
#[derive(Debug, Clone, Default)]
pub struct IncludeFilter {
    file_patterns: Vec<Pattern>,
    dir_patterns: Vec<Pattern>,
}

impl IncludeFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::default();
        for raw in patterns {
            let raw = raw.as_ref();
            let (target, text) = match raw.strip_suffix('/') {
                Some(dir) => (&mut filter.dir_patterns, dir),
                None => (&mut filter.file_patterns, raw),
            };
            let pattern = Pattern::new(text).map_err(|source| ConfigError::InvalidInclude {
                pattern: raw.to_string(),
                source,
            })?;
            target.push(pattern);
        }
        Ok(filter)
    }

    pub fn is_active(&self) -> bool {
        !self.file_patterns.is_empty() || !self.dir_patterns.is_empty()
    }

    /// Whether the file at `relative` passes the filter.
    pub fn accepts_file(&self, relative: &str) -> bool {
        if !self.is_active() {
            return true;
        }

        let name = basename(relative);
        let file_ok = self.file_patterns.is_empty()
            || self
                .file_patterns
                .iter()
                .any(|p| p.matches(relative) || p.matches(name));

        let dir_ok = self.dir_patterns.is_empty()
            || relative.match_indices('/').any(|(i, _)| {
                let dir = &relative[..i];
                self.dir_patterns
                    .iter()
                    .any(|p| p.matches(dir) || p.matches(basename(dir)))
            });

        file_ok && dir_ok
    }
}
