//! Version bumping: pick the next free version for a template.
//!
//! Every existing tag that fits `prefix…suffix` contributes the first digit
//! run of its middle part. The next version is one past the largest of those,
//! or `0` when nothing fits. Gaps are never filled: `v1, v2, v4` bumps to `v5`.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{Result, VersionTemplate};

fn digit_run() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("static regex"))
}

/// Computes the next free version for a [`VersionTemplate`].
pub struct VersionBumper;

impl VersionBumper {
    /// Lowest version above every existing tag that fits `template`.
    ///
    /// Pure: the result depends only on the template and the tag set, and is
    /// never one of `existing_tags`. Build numbers are unbounded decimals.
    pub fn bump<I, S>(template: &VersionTemplate, existing_tags: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags: Vec<S> = existing_tags.into_iter().collect();
        let max_existing = tags
            .iter()
            .filter_map(|tag| Self::build_number(template, tag.as_ref()))
            .max_by(|a, b| compare_decimal(a, b));

        let next = match max_existing {
            Some(n) => increment_decimal(n),
            None => "0".to_string(),
        };
        Ok(template.render(next))
    }

    /// Parse `pattern` and bump it.
    pub fn bump_pattern<I, S>(pattern: &str, existing_tags: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let template = VersionTemplate::parse(pattern)?;
        Self::bump(&template, existing_tags)
    }

    /// Build number carried by `tag` as canonical decimal digits (no leading
    /// zeros), if the tag fits the template.
    fn build_number<'a>(template: &VersionTemplate, tag: &'a str) -> Option<&'a str> {
        let middle = template.middle(tag)?;
        let digits = digit_run().find(middle)?.as_str();
        let trimmed = digits.trim_start_matches('0');
        Some(if trimmed.is_empty() { "0" } else { trimmed })
    }
}

/// Numeric order of two canonical ASCII decimals.
fn compare_decimal(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// `n + 1` for a canonical ASCII decimal of any length.
fn increment_decimal(n: &str) -> String {
    let mut digits = n.as_bytes().to_vec();
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return String::from_utf8_lossy(&digits).into_owned();
        }
    }
    let mut carried = String::with_capacity(digits.len() + 1);
    carried.push('1');
    carried.push_str(&String::from_utf8_lossy(&digits));
    carried
}
