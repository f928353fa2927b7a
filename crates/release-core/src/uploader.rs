//! Idempotent asset upload.
//!
//! The release manifest is read once per batch. Files whose base name is
//! already attached are skipped, everything else is uploaded in input order.
//! A failed upload stops the batch; earlier uploads stay on the release.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use release_host::{ReleaseHost, DEFAULT_CONTENT_TYPE};

use crate::domain::{AssetUpload, ReleaseError, Result, UploadReport, UploadStatus};
use crate::obs::{emit_asset_skipped, emit_asset_uploaded};

/// MIME type for `path` derived from its extension.
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

/// Final path component as a UTF-8 asset name.
fn asset_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            ReleaseError::Configuration(format!(
                "cannot derive an asset name from '{}'",
                path.display()
            ))
        })
}

/// Uploads files to a release, skipping names it already carries.
pub struct AssetUploader<'a, H: ?Sized> {
    host: &'a H,
    dry_run: bool,
}

impl<'a, H> AssetUploader<'a, H>
where
    H: ReleaseHost + ?Sized,
{
    pub fn new(host: &'a H, dry_run: bool) -> Self {
        Self { host, dry_run }
    }

    /// Upload every file in `files` that the release at `release_address`
    /// does not already carry.
    pub async fn upload(&self, release_address: &str, files: &[PathBuf]) -> Result<UploadReport> {
        let mut seen_paths = HashSet::new();
        let files: Vec<&PathBuf> = files.iter().filter(|p| seen_paths.insert(*p)).collect();

        let release = self.host.get_release(release_address).await?;
        let mut existing: HashSet<String> = release.assets.into_iter().map(|a| a.name).collect();

        let mut report = UploadReport {
            dry_run: self.dry_run,
            assets: Vec::with_capacity(files.len()),
        };

        for path in files {
            let name = asset_name(path)?;
            if existing.contains(&name) {
                emit_asset_skipped(&release.tag_name, &name);
                report.assets.push(AssetUpload {
                    path: path.clone(),
                    name,
                    status: UploadStatus::AlreadyExists,
                });
                continue;
            }

            let content_type = content_type_for(path);
            emit_asset_uploaded(&release.tag_name, &name, &content_type, self.dry_run);
            if !self.dry_run {
                self.host
                    .upload_asset(release_address, path, &name, &content_type)
                    .await?;
            }
            existing.insert(name.clone());
            report.assets.push(AssetUpload {
                path: path.clone(),
                name,
                status: UploadStatus::Uploaded { content_type },
            });
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use release_host::fakes::{HostCall, MemoryReleaseHost};

    const REPO: &str = "stevedores-org/widget";

    fn host_with(assets: &[&str]) -> (MemoryReleaseHost, String) {
        let host = MemoryReleaseHost::new().with_release(REPO, "v1.0", assets);
        let url = host.release(REPO, "v1.0").unwrap().url;
        (host, url)
    }

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn content_type_falls_back_to_octet_stream() {
        assert_eq!(content_type_for(Path::new("dist/app.zip")), "application/zip");
        assert_eq!(content_type_for(Path::new("notes.txt")), "text/plain");
        assert_eq!(
            content_type_for(Path::new("dist/artifact.unknownext")),
            DEFAULT_CONTENT_TYPE
        );
        assert_eq!(content_type_for(Path::new("Makefile")), DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn existing_asset_is_not_uploaded() {
        let (host, url) = host_with(&["artifact.bin"]);
        let uploader = AssetUploader::new(&host, false);

        let report = uploader
            .upload(&url, &paths(&["build/out/artifact.bin"]))
            .await
            .unwrap();

        assert_eq!(report.skipped(), vec!["artifact.bin"]);
        assert!(host.mutations().is_empty());
    }

    #[tokio::test]
    async fn manifest_is_read_once() {
        let (host, url) = host_with(&[]);
        let uploader = AssetUploader::new(&host, false);

        uploader
            .upload(&url, &paths(&["a.zip", "b.zip", "c.zip"]))
            .await
            .unwrap();

        let reads = host
            .calls()
            .into_iter()
            .filter(|c| matches!(c, HostCall::GetRelease { .. }))
            .count();
        assert_eq!(reads, 1);
    }

    #[tokio::test]
    async fn duplicate_paths_are_processed_once() {
        let (host, url) = host_with(&[]);
        let uploader = AssetUploader::new(&host, false);

        let report = uploader
            .upload(&url, &paths(&["dist/a.zip", "dist/a.zip"]))
            .await
            .unwrap();

        assert_eq!(report.assets.len(), 1);
        assert_eq!(host.mutations().len(), 1);
    }

    #[tokio::test]
    async fn same_base_name_from_two_dirs_uploads_once() {
        let (host, url) = host_with(&[]);
        let uploader = AssetUploader::new(&host, false);

        let report = uploader
            .upload(&url, &paths(&["linux/tool.tar.gz", "mac/tool.tar.gz"]))
            .await
            .unwrap();

        assert_eq!(report.uploaded(), vec!["tool.tar.gz"]);
        assert_eq!(report.skipped(), vec!["tool.tar.gz"]);
        assert_eq!(host.mutations().len(), 1);
    }

    #[tokio::test]
    async fn uploads_follow_input_order_with_content_types() {
        let (host, url) = host_with(&[]);
        let uploader = AssetUploader::new(&host, false);

        uploader
            .upload(&url, &paths(&["z.zip", "a.weird"]))
            .await
            .unwrap();

        let uploads: Vec<(String, String)> = host
            .mutations()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::UploadAsset {
                    name, content_type, ..
                } => Some((name, content_type)),
                _ => None,
            })
            .collect();
        assert_eq!(
            uploads,
            vec![
                ("z.zip".to_string(), "application/zip".to_string()),
                ("a.weird".to_string(), DEFAULT_CONTENT_TYPE.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn second_run_uploads_nothing() {
        let (host, url) = host_with(&[]);
        let files = paths(&["dist/a.zip", "dist/b.tar.gz"]);

        let first = AssetUploader::new(&host, false)
            .upload(&url, &files)
            .await
            .unwrap();
        let second = AssetUploader::new(&host, false)
            .upload(&url, &files)
            .await
            .unwrap();

        assert_eq!(first.uploaded().len(), 2);
        assert!(second.uploaded().is_empty());
        assert_eq!(second.skipped().len(), 2);
        assert_eq!(host.release(REPO, "v1.0").unwrap().assets.len(), 2);
    }

    #[tokio::test]
    async fn dry_run_reports_without_uploading() {
        let (host, url) = host_with(&["old.zip"]);
        let uploader = AssetUploader::new(&host, true);

        let report = uploader
            .upload(&url, &paths(&["old.zip", "new.zip"]))
            .await
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.uploaded(), vec!["new.zip"]);
        assert!(host.mutations().is_empty());
    }

    #[tokio::test]
    async fn failed_upload_keeps_earlier_uploads() {
        let (host, url) = host_with(&[]);
        let host = host.fail_uploads_named("second.zip");
        let uploader = AssetUploader::new(&host, false);

        let err = uploader
            .upload(&url, &paths(&["first.zip", "second.zip", "third.zip"]))
            .await
            .unwrap_err();

        assert!(matches!(err, ReleaseError::Host(_)));
        let names: Vec<String> = host
            .release(REPO, "v1.0")
            .unwrap()
            .assets
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["first.zip".to_string()]);
    }

    #[tokio::test]
    async fn path_without_file_name_is_rejected() {
        let (host, url) = host_with(&[]);
        let uploader = AssetUploader::new(&host, false);

        let err = uploader.upload(&url, &paths(&[".."])).await.unwrap_err();
        assert!(err.is_configuration());
    }
}
