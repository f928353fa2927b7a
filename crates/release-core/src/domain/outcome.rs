//! Results of a release run.

use std::fmt;
use std::path::PathBuf;

use release_host::Release;
use serde::Serialize;

/// What happened to one file handed to the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadStatus {
    /// Uploaded (or would have been, under dry-run)
    Uploaded { content_type: String },
    /// An asset with this name is already on the release
    AlreadyExists,
}

/// Per-file entry of an [`UploadReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetUpload {
    pub path: PathBuf,
    pub name: String,
    #[serde(flatten)]
    pub status: UploadStatus,
}

/// Per-file results of one upload batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub dry_run: bool,
    pub assets: Vec<AssetUpload>,
}

impl UploadReport {
    /// Names that were (or would have been) uploaded.
    pub fn uploaded(&self) -> Vec<&str> {
        self.assets
            .iter()
            .filter(|a| matches!(a.status, UploadStatus::Uploaded { .. }))
            .map(|a| a.name.as_str())
            .collect()
    }

    /// Names skipped because the release already had them.
    pub fn skipped(&self) -> Vec<&str> {
        self.assets
            .iter()
            .filter(|a| a.status == UploadStatus::AlreadyExists)
            .map(|a| a.name.as_str())
            .collect()
    }
}

/// The decision taken for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Tag already released; missing assets uploaded
    UploadedExisting { tag: String, report: UploadReport },
    /// Release-shaped tag without a release; release created
    CreatedFromTag {
        tag: String,
        release: Option<Release>,
    },
    /// Tag does not look like a release version
    SkippedNonReleaseTag { tag: String },
    /// Commit message does not carry the deploy marker
    SkippedNoMarker { sha: String },
    /// Commit carried the marker; release created
    CreatedFromCommit {
        version: String,
        release: Option<Release>,
    },
}

impl Outcome {
    /// Short machine-friendly name, used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::UploadedExisting { .. } => "uploaded_existing",
            Outcome::CreatedFromTag { .. } => "created_from_tag",
            Outcome::SkippedNonReleaseTag { .. } => "skipped_non_release_tag",
            Outcome::SkippedNoMarker { .. } => "skipped_no_marker",
            Outcome::CreatedFromCommit { .. } => "created_from_commit",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::UploadedExisting { tag, report } => write!(
                f,
                "release {}: uploaded {} asset(s), {} already present",
                tag,
                report.uploaded().len(),
                report.skipped().len()
            ),
            Outcome::CreatedFromTag { tag, .. } => write!(f, "created release {}", tag),
            Outcome::SkippedNonReleaseTag { tag } => {
                write!(f, "tag {} is not a release version, nothing to do", tag)
            }
            Outcome::SkippedNoMarker { sha } => {
                write!(f, "commit {} has no deploy marker, nothing to do", sha)
            }
            Outcome::CreatedFromCommit { version, .. } => {
                write!(f, "created release {}", version)
            }
        }
    }
}
