//! ci-release - GitHub release publication for CI builds
//!
//! Run once per build. Tag builds upload assets to their release (creating it
//! for `v1.2.3`-style tags); commit builds whose message is exactly
//! `[try deploy github]` create a release named by `--version`, or by the next
//! free version of a `*` template with `--bump-version`.
//!
//! Exit code is 0 for every decision, including "nothing to do", and 1 for
//! configuration, authorization and GitHub errors.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use release_core::{OptionInputs, Outcome, ReleaseEngine, RunOptions};
use release_host::{GithubConfig, GithubReleaseHost, DEFAULT_API_URL};
use tracing::{debug, Level};

#[derive(Parser, Debug)]
#[command(name = "ci-release")]
#[command(author = "Stevedores Org")]
#[command(about = "Create GitHub releases and upload assets from CI builds", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// GitHub token with the repo or public_repo scope
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Release version, or a template containing one '*' with --bump-version
    #[arg(long)]
    version: Option<String>,

    /// Commit sha of the build
    #[arg(long, env = "TRAVIS_COMMIT")]
    commit: Option<String>,

    /// Tag of the build (empty for commit builds)
    #[arg(long, env = "TRAVIS_TAG")]
    tag: Option<String>,

    /// Repository slug (owner/name)
    #[arg(long, env = "TRAVIS_REPO_SLUG")]
    repo: Option<String>,

    /// File to upload as a release asset (repeatable)
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Decide and log, but never create releases or upload assets
    #[arg(long)]
    dry_run: bool,

    /// Synthesize the next free version from the --version template
    #[arg(long)]
    bump_version: bool,

    /// Return errors with their full context chain instead of a one-line message
    #[arg(long)]
    debug: bool,

    /// GitHub API root (for GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines and a JSON outcome
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn inputs(&self) -> OptionInputs {
        OptionInputs {
            token: self.token.clone(),
            version: self.version.clone(),
            commit: self.commit.clone(),
            tag: self.tag.clone(),
            repo: self.repo.clone(),
            files: self.files.clone(),
            dry_run: self.dry_run,
            bump_version: self.bump_version,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            // Bad option syntax is a configuration error: exit 1, not clap's 2.
            e.print().ok();
            process::exit(1);
        }
    };

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    release_core::init_tracing(cli.json, level);

    match run(&cli).await {
        Ok(outcome) => {
            print_outcome(&outcome, cli.json)?;
            Ok(())
        }
        Err(err) if cli.debug => Err(err),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<Outcome> {
    let options = RunOptions::resolve(cli.inputs())?;
    debug!(?options, "resolved options");

    let config = GithubConfig::new(&options.token).with_api_url(&cli.api_url);
    let host = GithubReleaseHost::new(config).context("failed to build GitHub client")?;
    let engine = ReleaseEngine::new(host);

    let outcome = engine
        .run(&options)
        .await
        .with_context(|| format!("release run for {} failed", options.trigger))?;
    Ok(outcome)
}

fn print_outcome(outcome: &Outcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(outcome)?);
    } else {
        println!("{}", outcome);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        let mut argv = vec!["ci-release"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv)
    }

    #[test]
    fn equals_syntax_and_repeated_files() {
        let cli = parse(&[
            "--token=abc",
            "--version=nightly-*",
            "--tag=v1.0",
            "--commit=deadbeef",
            "--repo=stevedores-org/widget",
            "--file=dist/a.zip",
            "--file=dist/b.zip",
            "--dry-run",
            "--bump-version",
        ])
        .unwrap();

        let inputs = cli.inputs();
        assert_eq!(inputs.token.as_deref(), Some("abc"));
        assert_eq!(inputs.version.as_deref(), Some("nightly-*"));
        assert_eq!(inputs.tag.as_deref(), Some("v1.0"));
        assert_eq!(
            inputs.files,
            vec![PathBuf::from("dist/a.zip"), PathBuf::from("dist/b.zip")]
        );
        assert!(inputs.dry_run);
        assert!(inputs.bump_version);
    }

    #[test]
    fn version_is_a_value_not_a_flag() {
        let cli = parse(&["--version", "v2.0.0"]).unwrap();
        assert_eq!(cli.version.as_deref(), Some("v2.0.0"));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = parse(&["--frobnicate"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn value_option_without_value_is_rejected() {
        assert!(parse(&["--file"]).is_err());
    }

    #[test]
    fn flags_default_off() {
        let cli = parse(&["--version=v1"]).unwrap();
        assert!(!cli.dry_run);
        assert!(!cli.bump_version);
        assert!(!cli.debug);
        assert!(cli.files.is_empty());
    }

    #[test]
    fn debug_and_logging_flags() {
        let cli = parse(&["--debug", "-v", "--json"]).unwrap();
        assert!(cli.debug);
        assert!(cli.verbose);
        assert!(cli.json);
    }

    #[test]
    fn json_outcome_is_single_line() {
        let outcome = Outcome::SkippedNonReleaseTag {
            tag: "latest".to_string(),
        };
        let line = serde_json::to_string(&outcome).unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("skipped_non_release_tag"));
    }
}
