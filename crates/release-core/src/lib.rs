//! ci-release Core Library
//!
//! Decides whether a CI build should publish a release, synthesizes release
//! versions from templates, and uploads build artifacts without duplicates.
//!
//! ## Key Components
//!
//! - `ReleaseEngine`: trigger classification and the release decision
//! - `VersionBumper`: next free version for a `prefix*suffix` template
//! - `AssetUploader`: idempotent asset upload
//! - `RunOptions`: validated configuration for one invocation

pub mod bumper;
pub mod domain;
pub mod engine;
pub mod obs;
pub mod telemetry;
pub mod uploader;

pub use bumper::VersionBumper;
pub use domain::{
    AssetUpload, OptionInputs, Outcome, ReleaseError, Result, RunOptions, Trigger, UploadReport,
    UploadStatus, VersionSpec, VersionTemplate,
};
pub use engine::{has_deploy_marker, is_release_tag, ReleaseEngine, DEPLOY_MARKER};
pub use telemetry::init_tracing;
pub use uploader::{content_type_for, AssetUploader};

/// ci-release version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
