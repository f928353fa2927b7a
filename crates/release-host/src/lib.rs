//! Release-Host: release hosting backends for ci-release
//!
//! This crate owns every conversation with the service that stores releases.
//! The release engine only sees the [`ReleaseHost`] trait.
//!
//! ## Key Components
//!
//! - `ReleaseHost`: capability trait (scopes, releases, commits, uploads)
//! - `GithubReleaseHost`: GitHub REST implementation
//! - `fakes::MemoryReleaseHost`: in-memory implementation for tests

mod error;
pub mod fakes;
pub mod github;
pub mod host_traits;

pub use error::HostError;
pub use github::{GithubConfig, GithubReleaseHost, DEFAULT_API_URL};
pub use host_traits::{
    Asset, Commit, HostResult, NewRelease, Release, ReleaseHost, DEFAULT_CONTENT_TYPE,
};
