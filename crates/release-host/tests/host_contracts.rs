//! Contract tests for ReleaseHost.
//!
//! These tests pin the behaviour the release engine relies on, exercised
//! against the in-memory fake.

use std::path::Path;

use release_host::fakes::{HostCall, MemoryReleaseHost};
use release_host::{HostError, NewRelease, ReleaseHost};

const REPO: &str = "stevedores-org/widget";

#[tokio::test]
async fn default_host_grants_repo_scope() {
    let host = MemoryReleaseHost::new();
    let scopes = host.scopes().await.unwrap();

    assert!(scopes.contains("repo"));
}

#[tokio::test]
async fn list_releases_is_scoped_to_repo() {
    let host = MemoryReleaseHost::new()
        .with_release(REPO, "v1", &[])
        .with_release("other/repo", "v9", &[]);

    let tags: Vec<String> = host
        .list_releases(REPO)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.tag_name)
        .collect();

    assert_eq!(tags, vec!["v1".to_string()]);
}

#[tokio::test]
async fn get_release_returns_assets() {
    let host = MemoryReleaseHost::new().with_release(REPO, "v1", &["a.tar.gz", "b.zip"]);
    let url = host.release(REPO, "v1").unwrap().url;

    let release = host.get_release(&url).await.unwrap();
    let names: Vec<&str> = release.assets.iter().map(|a| a.name.as_str()).collect();

    assert_eq!(names, vec!["a.tar.gz", "b.zip"]);
}

#[tokio::test]
async fn get_release_unknown_address_is_not_found() {
    let host = MemoryReleaseHost::new();
    let err = host.get_release("memory://nowhere").await.unwrap_err();

    assert!(matches!(err, HostError::NotFound(_)));
}

#[tokio::test]
async fn create_release_rejects_duplicate_tag() {
    let host = MemoryReleaseHost::new().with_release(REPO, "v1", &[]);
    let err = host
        .create_release(REPO, &NewRelease::for_tag("v1"))
        .await
        .unwrap_err();

    assert!(matches!(err, HostError::Api { status: 422, .. }));
}

#[tokio::test]
async fn create_release_is_visible_in_listing() {
    let host = MemoryReleaseHost::new();
    let created = host
        .create_release(REPO, &NewRelease::at_commit("build-3", "abc123"))
        .await
        .unwrap();

    assert_eq!(created.tag_name, "build-3");
    let listed = host.list_releases(REPO).await.unwrap();
    assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn get_commit_returns_message() {
    let host = MemoryReleaseHost::new().with_commit(REPO, "abc123", "fix: things");
    let commit = host.get_commit(REPO, "abc123").await.unwrap();

    assert_eq!(commit.sha, "abc123");
    assert_eq!(commit.message, "fix: things");
}

#[tokio::test]
async fn upload_asset_rejects_duplicate_name() {
    let host = MemoryReleaseHost::new().with_release(REPO, "v1", &["app.bin"]);
    let url = host.release(REPO, "v1").unwrap().url;

    let err = host
        .upload_asset(&url, Path::new("dist/app.bin"), "app.bin", "application/octet-stream")
        .await
        .unwrap_err();

    assert!(matches!(err, HostError::Api { status: 422, .. }));
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let host = MemoryReleaseHost::new().with_commit(REPO, "abc", "msg");
    host.scopes().await.unwrap();
    host.get_commit(REPO, "abc").await.unwrap();
    host.create_release(REPO, &NewRelease::for_tag("v2"))
        .await
        .unwrap();

    let calls = host.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], HostCall::Scopes);
    assert!(matches!(&calls[1], HostCall::GetCommit { sha, .. } if sha == "abc"));
    assert_eq!(host.mutations().len(), 1);
}
