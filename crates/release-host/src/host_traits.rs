//! Release hosting capability definitions
//!
//! `ReleaseHost` is the only surface the release engine talks to:
//! - read side: token scopes, release listing, release lookup, commit lookup
//! - write side: release creation and asset upload
//!
//! The trait is async and backend-agnostic. `GithubReleaseHost` implements it
//! over the GitHub REST API; `fakes::MemoryReleaseHost` implements it in memory
//! for tests.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Result type for host operations
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Content type used when none can be derived from a file name.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// A published release on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Tag the release is attached to (e.g. "v1.2.3")
    pub tag_name: String,
    /// Opaque address used for follow-up lookups
    pub url: String,
    /// Upload endpoint, possibly an RFC 6570 template
    #[serde(default)]
    pub upload_url: String,
    /// Assets already attached, in host order
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A single file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// File base name, unique within one release
    pub name: String,
    /// MIME type the asset was uploaded with
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

/// A commit, as far as release decisions care about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
}

/// Request body for creating a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRelease {
    /// Tag (and release name) to create
    pub tag_name: String,
    /// Commit the tag should point at when it does not exist yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_commitish: Option<String>,
}

impl NewRelease {
    /// Release for a tag that already exists on the remote.
    pub fn for_tag(tag: &str) -> Self {
        Self {
            tag_name: tag.to_string(),
            target_commitish: None,
        }
    }

    /// Release whose tag is created at the given commit.
    pub fn at_commit(version: &str, sha: &str) -> Self {
        Self {
            tag_name: version.to_string(),
            target_commitish: Some(sha.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// ReleaseHost
// ---------------------------------------------------------------------------

/// Release hosting service.
///
/// Guarantees expected by callers:
/// - `get_release(url)` returns the release with its assets populated.
/// - `create_release` fails if the tag already has a release.
/// - `upload_asset` fails if the release already carries an asset of that name.
#[async_trait]
pub trait ReleaseHost: Send + Sync {
    /// OAuth scopes granted to the configured token.
    async fn scopes(&self) -> HostResult<BTreeSet<String>>;

    /// All releases of `repo` (`owner/name`), every page.
    async fn list_releases(&self, repo: &str) -> HostResult<Vec<Release>>;

    /// Fetch a release by the address found in [`Release::url`].
    async fn get_release(&self, address: &str) -> HostResult<Release>;

    /// Create a release in `repo`.
    async fn create_release(&self, repo: &str, release: &NewRelease) -> HostResult<Release>;

    /// Fetch a commit by sha.
    async fn get_commit(&self, repo: &str, sha: &str) -> HostResult<Commit>;

    /// Upload a local file as an asset of the release at `address`.
    async fn upload_asset(
        &self,
        address: &str,
        path: &Path,
        name: &str,
        content_type: &str,
    ) -> HostResult<Asset>;
}
