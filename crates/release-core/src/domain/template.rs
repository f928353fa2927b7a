//! Version templates: `prefix*suffix` patterns for synthesized versions.

use std::fmt;

use serde::Serialize;

use super::error::{ReleaseError, Result};

/// Wildcard marking where the build number goes.
pub const WILDCARD: char = '*';

/// A version pattern with exactly one [`WILDCARD`].
///
/// `"release-*-final"` splits into prefix `"release-"` and suffix `"-final"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionTemplate {
    prefix: String,
    suffix: String,
}

impl VersionTemplate {
    /// Parse a pattern, rejecting anything without exactly one wildcard.
    pub fn parse(pattern: &str) -> Result<Self> {
        let wildcards = pattern.matches(WILDCARD).count();
        if wildcards != 1 {
            return Err(ReleaseError::InvalidTemplate(format!(
                "'{}' must include exactly one '{}' (found {})",
                pattern, WILDCARD, wildcards
            )));
        }
        let (prefix, suffix) = pattern
            .split_once(WILDCARD)
            .ok_or_else(|| ReleaseError::InvalidTemplate(pattern.to_string()))?;
        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Substitute `n` for the wildcard.
    pub fn render(&self, n: impl fmt::Display) -> String {
        format!("{}{}{}", self.prefix, n, self.suffix)
    }

    /// The part of `tag` between prefix and suffix, if the tag fits the template.
    pub fn middle<'a>(&self, tag: &'a str) -> Option<&'a str> {
        if tag.len() < self.prefix.len() + self.suffix.len() {
            return None;
        }
        tag.strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())
    }
}

impl fmt::Display for VersionTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, WILDCARD, self.suffix)
    }
}
