//! In-memory fake for the release host (testing only)
//!
//! `MemoryReleaseHost` satisfies the `ReleaseHost` contract without any
//! network access and records every call so tests can assert on what reached
//! the host (and what did not).

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::HostError;
use crate::host_traits::*;

/// One call observed by [`MemoryReleaseHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Scopes,
    ListReleases {
        repo: String,
    },
    GetRelease {
        address: String,
    },
    CreateRelease {
        repo: String,
        tag_name: String,
        target_commitish: Option<String>,
    },
    GetCommit {
        repo: String,
        sha: String,
    },
    UploadAsset {
        address: String,
        name: String,
        content_type: String,
    },
}

impl HostCall {
    /// Whether this call changes state on the host.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            HostCall::CreateRelease { .. } | HostCall::UploadAsset { .. }
        )
    }
}

#[derive(Debug, Default)]
struct HostState {
    scopes: BTreeSet<String>,
    /// (repo, release), oldest first
    releases: Vec<(String, Release)>,
    commits: HashMap<(String, String), Commit>,
    failing_uploads: HashSet<String>,
    calls: Vec<HostCall>,
    next_id: u64,
}

impl HostState {
    fn insert_release(&mut self, repo: &str, tag: &str) -> Release {
        self.next_id += 1;
        let url = format!("memory://{}/releases/{}", repo, self.next_id);
        let release = Release {
            tag_name: tag.to_string(),
            upload_url: format!("{}/assets", url),
            url,
            assets: Vec::new(),
        };
        self.releases.push((repo.to_string(), release.clone()));
        release
    }

    fn release_mut(&mut self, address: &str) -> Option<&mut Release> {
        self.releases
            .iter_mut()
            .map(|(_, r)| r)
            .find(|r| r.url == address)
    }
}

/// In-memory release host.
///
/// Starts with the `repo` scope and no releases. Duplicate tags and duplicate
/// asset names are rejected with a 422, like the GitHub API does.
#[derive(Debug)]
pub struct MemoryReleaseHost {
    state: Mutex<HostState>,
}

impl Default for MemoryReleaseHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryReleaseHost {
    pub fn new() -> Self {
        let state = HostState {
            scopes: BTreeSet::from(["repo".to_string()]),
            ..HostState::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Replace the granted scopes.
    pub fn with_scopes(self, scopes: &[&str]) -> Self {
        self.state.lock().unwrap().scopes = scopes.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Seed an existing release with the given asset names.
    pub fn with_release(self, repo: &str, tag: &str, assets: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let url = state.insert_release(repo, tag).url;
            let release = state.release_mut(&url).unwrap();
            release.assets = assets
                .iter()
                .map(|name| Asset {
                    name: name.to_string(),
                    content_type: DEFAULT_CONTENT_TYPE.to_string(),
                })
                .collect();
        }
        self
    }

    /// Seed a commit.
    pub fn with_commit(self, repo: &str, sha: &str, message: &str) -> Self {
        self.state.lock().unwrap().commits.insert(
            (repo.to_string(), sha.to_string()),
            Commit {
                sha: sha.to_string(),
                message: message.to_string(),
            },
        );
        self
    }

    /// Make every upload of an asset with this name fail.
    pub fn fail_uploads_named(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_uploads
            .insert(name.to_string());
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls that would have changed host state.
    pub fn mutations(&self) -> Vec<HostCall> {
        self.calls().into_iter().filter(HostCall::is_mutation).collect()
    }

    /// Current state of the release tagged `tag` in `repo`.
    pub fn release(&self, repo: &str, tag: &str) -> Option<Release> {
        let state = self.state.lock().unwrap();
        state
            .releases
            .iter()
            .find(|(r, rel)| r == repo && rel.tag_name == tag)
            .map(|(_, rel)| rel.clone())
    }

    fn record(&self, call: HostCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl ReleaseHost for MemoryReleaseHost {
    async fn scopes(&self) -> HostResult<BTreeSet<String>> {
        self.record(HostCall::Scopes);
        Ok(self.state.lock().unwrap().scopes.clone())
    }

    async fn list_releases(&self, repo: &str) -> HostResult<Vec<Release>> {
        self.record(HostCall::ListReleases {
            repo: repo.to_string(),
        });
        let state = self.state.lock().unwrap();
        // newest first, like the GitHub listing
        Ok(state
            .releases
            .iter()
            .rev()
            .filter(|(r, _)| r == repo)
            .map(|(_, rel)| rel.clone())
            .collect())
    }

    async fn get_release(&self, address: &str) -> HostResult<Release> {
        self.record(HostCall::GetRelease {
            address: address.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        state
            .release_mut(address)
            .map(|r| r.clone())
            .ok_or_else(|| HostError::NotFound(format!("release {}", address)))
    }

    async fn create_release(&self, repo: &str, release: &NewRelease) -> HostResult<Release> {
        self.record(HostCall::CreateRelease {
            repo: repo.to_string(),
            tag_name: release.tag_name.clone(),
            target_commitish: release.target_commitish.clone(),
        });
        let mut state = self.state.lock().unwrap();
        let exists = state
            .releases
            .iter()
            .any(|(r, rel)| r == repo && rel.tag_name == release.tag_name);
        if exists {
            return Err(HostError::Api {
                status: 422,
                message: format!("release for tag {} already exists", release.tag_name),
            });
        }
        Ok(state.insert_release(repo, &release.tag_name))
    }

    async fn get_commit(&self, repo: &str, sha: &str) -> HostResult<Commit> {
        self.record(HostCall::GetCommit {
            repo: repo.to_string(),
            sha: sha.to_string(),
        });
        let state = self.state.lock().unwrap();
        state
            .commits
            .get(&(repo.to_string(), sha.to_string()))
            .cloned()
            .ok_or_else(|| HostError::NotFound(format!("commit {} in {}", sha, repo)))
    }

    async fn upload_asset(
        &self,
        address: &str,
        _path: &Path,
        name: &str,
        content_type: &str,
    ) -> HostResult<Asset> {
        self.record(HostCall::UploadAsset {
            address: address.to_string(),
            name: name.to_string(),
            content_type: content_type.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        if state.failing_uploads.contains(name) {
            return Err(HostError::Http(format!("upload of {} interrupted", name)));
        }
        let release = state
            .release_mut(address)
            .ok_or_else(|| HostError::NotFound(format!("release {}", address)))?;
        if release.assets.iter().any(|a| a.name == name) {
            return Err(HostError::Api {
                status: 422,
                message: format!("asset {} already exists", name),
            });
        }
        let asset = Asset {
            name: name.to_string(),
            content_type: content_type.to_string(),
        };
        release.assets.push(asset.clone());
        Ok(asset)
    }
}
