//! Structured observability hooks for release runs.
//!
//! This module provides:
//! - A run-scoped tracing span via `run_span`
//! - Emission functions for decisions, created releases, bumped versions and assets
//!
//! Events are emitted at `info!` level. Dry-run events carry `dry_run = true`
//! so logs read the same whether or not the mutation actually happened.

use tracing::info;

/// Span tagged with repo and trigger, covering one whole run.
///
/// Attach it with `tracing::Instrument` so it stays current across awaits.
///
/// # Example
///
/// ```ignore
/// engine_future.instrument(run_span("owner/repo", "tag v1.2.3")).await
/// ```
pub fn run_span(repo: &str, trigger: &str) -> tracing::Span {
    tracing::info_span!("ci_release.run", repo = %repo, trigger = %trigger)
}

/// Emit event: the engine settled on an outcome.
pub fn emit_decision(outcome: &str, reason: &str) {
    info!(event = "release.decision", outcome = %outcome, reason = %reason);
}

/// Emit event: a release was created (or would have been, under dry-run).
pub fn emit_release_created(tag: &str, dry_run: bool) {
    info!(event = "release.created", tag = %tag, dry_run = dry_run);
}

/// Emit event: a version was synthesized from a template.
pub fn emit_version_bumped(template: &str, version: &str, existing: usize) {
    info!(
        event = "release.version_bumped",
        template = %template,
        version = %version,
        existing_releases = existing,
    );
}

/// Emit event: an asset already exists on the release.
pub fn emit_asset_skipped(tag: &str, name: &str) {
    info!(event = "asset.skipped", tag = %tag, name = %name, "already exists, skipping");
}

/// Emit event: an asset is being uploaded.
pub fn emit_asset_uploaded(tag: &str, name: &str, content_type: &str, dry_run: bool) {
    info!(
        event = "asset.uploaded",
        tag = %tag,
        name = %name,
        content_type = %content_type,
        dry_run = dry_run,
    );
}
