//! Release decision engine.
//!
//! One run classifies the trigger, reads the host state it needs, and then
//! does at most one of: upload assets to an existing release, create a
//! release, or nothing.
//!
//! - Tag builds: an already released tag gets its missing assets uploaded; an
//!   unreleased tag shaped like `v1`, `v1.2.3` gets a release; anything else
//!   is ignored.
//! - Commit builds: only a commit whose message is exactly the deploy marker
//!   gets a release, named by the literal version or the next bumped one.
//!
//! Under dry-run every read and decision still happens, but `create_release`
//! and `upload_asset` never reach the host.

use std::sync::OnceLock;

use regex::Regex;
use release_host::{NewRelease, Release, ReleaseHost};
use tracing::Instrument;

use crate::bumper::VersionBumper;
use crate::domain::{Outcome, ReleaseError, Result, RunOptions, Trigger, VersionSpec};
use crate::obs::{emit_decision, emit_release_created, emit_version_bumped, run_span};
use crate::uploader::AssetUploader;

/// Commit message that asks for a release.
pub const DEPLOY_MARKER: &str = "[try deploy github]";

/// A token needs one of these scopes to create releases and upload assets.
pub const REQUIRED_SCOPES: [&str; 2] = ["public_repo", "repo"];

fn release_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^v[0-9]+(\.[0-9]+)*").expect("static regex"))
}

/// Whether `tag` looks like a release version (`v` followed by digits).
pub fn is_release_tag(tag: &str) -> bool {
    release_tag_pattern().is_match(tag)
}

/// Whether a commit message is the deploy marker and nothing else.
pub fn has_deploy_marker(message: &str) -> bool {
    message.trim() == DEPLOY_MARKER
}

/// Decides and executes the release action for one build.
pub struct ReleaseEngine<H> {
    host: H,
}

impl<H> ReleaseEngine<H>
where
    H: ReleaseHost,
{
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Run the release decision for `options`.
    pub async fn run(&self, options: &RunOptions) -> Result<Outcome> {
        let span = run_span(&options.repo, &options.trigger.to_string());
        async {
            self.check_auth().await?;
            match &options.trigger {
                Trigger::Tag(tag) => self.run_for_tag(options, tag).await,
                Trigger::Commit(sha) => self.run_for_commit(options, sha).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn check_auth(&self) -> Result<()> {
        let scopes = self.host.scopes().await?;
        if REQUIRED_SCOPES.iter().any(|s| scopes.contains(*s)) {
            return Ok(());
        }
        Err(ReleaseError::Authorization(
            "token cannot create releases or upload assets; it needs the repo or public_repo scope"
                .to_string(),
        ))
    }

    async fn run_for_tag(&self, options: &RunOptions, tag: &str) -> Result<Outcome> {
        let releases = self.host.list_releases(&options.repo).await?;

        if let Some(release) = releases.into_iter().find(|r| r.tag_name == tag) {
            emit_decision(
                "uploaded_existing",
                "build is for a published release, uploading assets",
            );
            let report = AssetUploader::new(&self.host, options.dry_run)
                .upload(&release.url, &options.files)
                .await?;
            return Ok(Outcome::UploadedExisting {
                tag: tag.to_string(),
                report,
            });
        }

        if !is_release_tag(tag) {
            emit_decision(
                "skipped_non_release_tag",
                "tag does not look like a release version",
            );
            return Ok(Outcome::SkippedNonReleaseTag {
                tag: tag.to_string(),
            });
        }

        emit_decision(
            "created_from_tag",
            "tag looks like a release version, creating release",
        );
        let release = self
            .create_release(&options.repo, NewRelease::for_tag(tag), options.dry_run)
            .await?;
        Ok(Outcome::CreatedFromTag {
            tag: tag.to_string(),
            release,
        })
    }

    async fn run_for_commit(&self, options: &RunOptions, sha: &str) -> Result<Outcome> {
        let commit = self.host.get_commit(&options.repo, sha).await?;

        if !has_deploy_marker(&commit.message) {
            emit_decision("skipped_no_marker", "commit message is not the deploy marker");
            return Ok(Outcome::SkippedNoMarker {
                sha: sha.to_string(),
            });
        }

        emit_decision(
            "created_from_commit",
            "commit message is the deploy marker, creating release",
        );
        let version = self.resolve_version(options).await?;
        let release = self
            .create_release(
                &options.repo,
                NewRelease::at_commit(&version, sha),
                options.dry_run,
            )
            .await?;
        Ok(Outcome::CreatedFromCommit { version, release })
    }

    async fn resolve_version(&self, options: &RunOptions) -> Result<String> {
        match &options.version {
            VersionSpec::Literal(version) => Ok(version.clone()),
            VersionSpec::Bump(template) => {
                let releases = self.host.list_releases(&options.repo).await?;
                let version =
                    VersionBumper::bump(template, releases.iter().map(|r| r.tag_name.as_str()))?;
                emit_version_bumped(&template.to_string(), &version, releases.len());
                Ok(version)
            }
        }
    }

    async fn create_release(
        &self,
        repo: &str,
        request: NewRelease,
        dry_run: bool,
    ) -> Result<Option<Release>> {
        emit_release_created(&request.tag_name, dry_run);
        if dry_run {
            return Ok(None);
        }
        Ok(Some(self.host.create_release(repo, &request).await?))
    }
}
