//! GitHub REST backend for [`ReleaseHost`].
//!
//! Talks to `api.github.com` (or a GitHub Enterprise API root) with a personal
//! access token. Listing follows pages until a short page is returned, and
//! uploads go to the release's `upload_url` with the template suffix removed.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::HostError;
use crate::host_traits::*;

/// Public GitHub API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const PER_PAGE: usize = 100;

/// GitHub connection settings
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// API root, without trailing slash
    pub api_url: String,
    /// Personal access token
    pub token: String,
    /// User agent sent with every request (GitHub rejects requests without one)
    pub user_agent: String,
}

impl GithubConfig {
    /// Config for the public GitHub API.
    pub fn new(token: &str) -> Self {
        GithubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.to_string(),
            user_agent: format!("ci-release/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Point at another API root, e.g. a GitHub Enterprise instance.
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    message: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(serde::Serialize)]
struct CreateReleaseBody<'a> {
    tag_name: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_commitish: Option<&'a str>,
}

/// GitHub release host
pub struct GithubReleaseHost {
    config: GithubConfig,
    http: reqwest::Client,
}

impl GithubReleaseHost {
    pub fn new(config: GithubConfig) -> HostResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(GithubReleaseHost { config, http })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(method = %method, url = %url, "github request");
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("token {}", self.config.token))
            .header(ACCEPT, "application/vnd.github+json")
    }

    fn repo_url(&self, repo: &str, rest: &str) -> String {
        format!("{}/repos/{}/{}", self.config.api_url, repo, rest)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> HostResult<T> {
        let response = check_status(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }
}

async fn check_status(response: Response) -> HostResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = api_error_message(&body);
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(HostError::NotFound(format!("{} ({})", url, message)));
    }
    Err(HostError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Prefer GitHub's `{"message": ...}` error field over the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Parse the comma-separated `X-OAuth-Scopes` header.
fn parse_scopes(header: Option<&str>) -> BTreeSet<String> {
    header
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strip the RFC 6570 suffix from an upload URL:
/// `.../assets{?name,label}` -> `.../assets`.
fn upload_endpoint(upload_url: &str) -> &str {
    match upload_url.find('{') {
        Some(idx) => &upload_url[..idx],
        None => upload_url,
    }
}

#[async_trait]
impl ReleaseHost for GithubReleaseHost {
    async fn scopes(&self) -> HostResult<BTreeSet<String>> {
        let url = format!("{}/user", self.config.api_url);
        let response = check_status(self.request(Method::GET, &url).send().await?).await?;
        let header = response
            .headers()
            .get("x-oauth-scopes")
            .and_then(|v| v.to_str().ok());
        Ok(parse_scopes(header))
    }

    async fn list_releases(&self, repo: &str) -> HostResult<Vec<Release>> {
        let url = self.repo_url(repo, "releases");
        let mut releases = Vec::new();
        let mut page = 1usize;
        loop {
            let request = self
                .request(Method::GET, &url)
                .query(&[("per_page", PER_PAGE), ("page", page)]);
            let batch: Vec<Release> = self.send_json(request).await?;
            let done = batch.len() < PER_PAGE;
            releases.extend(batch);
            if done {
                break;
            }
            page += 1;
        }
        debug!(repo = %repo, count = releases.len(), "listed releases");
        Ok(releases)
    }

    async fn get_release(&self, address: &str) -> HostResult<Release> {
        self.send_json(self.request(Method::GET, address)).await
    }

    async fn create_release(&self, repo: &str, release: &NewRelease) -> HostResult<Release> {
        let body = CreateReleaseBody {
            tag_name: &release.tag_name,
            name: &release.tag_name,
            target_commitish: release.target_commitish.as_deref(),
        };
        let request = self
            .request(Method::POST, &self.repo_url(repo, "releases"))
            .json(&body);
        self.send_json(request).await
    }

    async fn get_commit(&self, repo: &str, sha: &str) -> HostResult<Commit> {
        let url = self.repo_url(repo, &format!("commits/{}", sha));
        let response: CommitResponse = self.send_json(self.request(Method::GET, &url)).await?;
        Ok(Commit {
            sha: response.sha,
            message: response.commit.message,
        })
    }

    async fn upload_asset(
        &self,
        address: &str,
        path: &Path,
        name: &str,
        content_type: &str,
    ) -> HostResult<Asset> {
        let release = self.get_release(address).await?;
        if release.upload_url.is_empty() {
            return Err(HostError::Decode(format!(
                "release {} has no upload_url",
                release.tag_name
            )));
        }
        let bytes = tokio::fs::read(path).await?;
        let request = self
            .request(Method::POST, upload_endpoint(&release.upload_url))
            .query(&[("name", name)])
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        self.send_json(request).await
    }
}
