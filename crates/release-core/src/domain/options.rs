//! Run options: validated configuration for one release invocation.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::error::{ReleaseError, Result};
use super::template::VersionTemplate;

/// What triggered the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Trigger {
    /// A tag push
    Tag(String),
    /// A plain commit, identified by sha
    Commit(String),
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Tag(tag) => write!(f, "tag {}", tag),
            Trigger::Commit(sha) => write!(f, "commit {}", sha),
        }
    }
}

/// How the release version of a commit-triggered build is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSpec {
    /// Use the configured version as-is
    Literal(String),
    /// Synthesize the next free version from a template
    Bump(VersionTemplate),
}

/// Raw option values as collected from flags and environment.
///
/// Every field is optional here; [`RunOptions::resolve`] decides what is
/// required.
#[derive(Debug, Clone, Default)]
pub struct OptionInputs {
    pub token: Option<String>,
    pub version: Option<String>,
    pub commit: Option<String>,
    pub tag: Option<String>,
    pub repo: Option<String>,
    pub files: Vec<PathBuf>,
    pub dry_run: bool,
    pub bump_version: bool,
}

/// Resolved configuration for one invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub token: String,
    pub repo: String,
    pub trigger: Trigger,
    pub version: VersionSpec,
    pub dry_run: bool,
    pub files: Vec<PathBuf>,
}

// The token must never end up in logs.
impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("token", &"<redacted>")
            .field("repo", &self.repo)
            .field("trigger", &self.trigger)
            .field("version", &self.version)
            .field("dry_run", &self.dry_run)
            .field("files", &self.files)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl RunOptions {
    /// Validate raw inputs.
    ///
    /// Checks (in order):
    /// 1. token present
    /// 2. version present, and a valid template when bumping
    /// 3. repo present
    /// 4. a non-empty tag, else a non-blank commit sha
    pub fn resolve(inputs: OptionInputs) -> Result<Self> {
        let token = non_empty(inputs.token).ok_or_else(|| {
            ReleaseError::Configuration(
                "github token must be provided through --token or environment ${GITHUB_TOKEN}"
                    .to_string(),
            )
        })?;

        let version = non_empty(inputs.version)
            .ok_or_else(|| ReleaseError::Configuration("--version must be provided".to_string()))?;
        let version = if inputs.bump_version {
            VersionSpec::Bump(VersionTemplate::parse(&version)?)
        } else {
            VersionSpec::Literal(version)
        };

        let repo = non_empty(inputs.repo).ok_or_else(|| {
            ReleaseError::Configuration(
                "repository must be provided through --repo or environment ${TRAVIS_REPO_SLUG}"
                    .to_string(),
            )
        })?;

        // Only an empty tag counts as no tag; a tag always wins over a commit.
        let tag = inputs.tag.filter(|t| !t.is_empty());
        let trigger = match (tag, non_empty(inputs.commit)) {
            (Some(tag), _) => Trigger::Tag(tag),
            (None, Some(sha)) => Trigger::Commit(sha),
            (None, None) => {
                return Err(ReleaseError::Configuration(
                    "either a tag (--tag / ${TRAVIS_TAG}) or a commit (--commit / ${TRAVIS_COMMIT}) must be provided"
                        .to_string(),
                ))
            }
        };

        Ok(Self {
            token,
            repo,
            trigger,
            version,
            dry_run: inputs.dry_run,
            files: inputs.files,
        })
    }
}
