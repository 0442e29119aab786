//! pkgsweep - delete old GitHub Packages versions per a retention policy.
//!
//! One package (`--package-name`) or several (`--package-names`, comma
//! delimited) are swept strictly one after another, with an anti-flood
//! pause between packages. Any failure aborts the run with a non-zero
//! exit and the error message on stderr.

use anyhow::{bail, Context, Result};
use clap::Parser;
use regex::Regex;
use std::time::Duration;
use tracing::{info, Level};

use pkgsweep_core::{sweep_package, GithubClient, RawPolicy, RetentionPolicy, DEFAULT_ENDPOINT};

mod telemetry;

/// Pause between successive packages in a multi-package run.
const PACKAGE_DELAY_MS: u64 = 15_000;

#[derive(Parser)]
#[command(name = "pkgsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Retention sweeper for GitHub Packages", long_about = None)]
struct Cli {
    /// Package to sweep
    #[arg(long)]
    package_name: Option<String>,

    /// Comma-delimited list of packages to sweep sequentially
    #[arg(long)]
    package_names: Option<String>,

    /// User or organization owning the package(s)
    #[arg(long)]
    owner: String,

    /// Package ecosystem: container, npm, maven, rubygems, docker, nuget
    #[arg(long)]
    package_type: String,

    /// Delete this many of the oldest versions (-1 for all)
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    num_old_versions_to_delete: i64,

    /// Keep at least this many of the newest versions (-1 to disable)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    min_versions_to_keep: i64,

    /// Never delete versions whose label matches this pattern
    #[arg(long)]
    ignore_versions: Option<String>,

    /// Only consider versions whose label matches this pattern
    #[arg(long)]
    include_versions: Option<String>,

    /// Only delete pre-release versions
    #[arg(long)]
    delete_only_pre_release_versions: bool,

    /// Only delete untagged versions (container packages)
    #[arg(long)]
    delete_only_untagged_versions: bool,

    /// Comma-delimited version ids to delete, bypassing selection
    #[arg(long)]
    package_version_ids: Option<String>,

    /// API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Compute the selection but delete nothing
    #[arg(long)]
    dry_run: bool,

    /// Pause between packages in a multi-package run, in milliseconds
    #[arg(long, default_value_t = PACKAGE_DELAY_MS)]
    package_delay_ms: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Packages to sweep, in caller order.
    fn package_list(&self) -> Result<Vec<String>> {
        if let Some(names) = &self.package_names {
            let names: Vec<String> = names
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !names.is_empty() {
                return Ok(names);
            }
        }
        if let Some(name) = &self.package_name {
            return Ok(vec![name.clone()]);
        }
        bail!("--package-name or --package-names is mandatory");
    }

    /// Build a validated policy for one package.
    fn policy_for(&self, package_name: &str) -> Result<RetentionPolicy> {
        let version_ids = match &self.package_version_ids {
            Some(ids) => ids
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<u64>()
                        .with_context(|| format!("invalid version id: {s}"))
                })
                .collect::<Result<Vec<u64>>>()?,
            None => Vec::new(),
        };

        let ignore_versions = self
            .ignore_versions
            .as_deref()
            .map(Regex::new)
            .transpose()
            .context("invalid --ignore-versions pattern")?;
        let include_versions = self
            .include_versions
            .as_deref()
            .map(Regex::new)
            .transpose()
            .context("invalid --include-versions pattern")?;

        let raw = RawPolicy {
            version_ids,
            owner: self.owner.clone(),
            package_name: package_name.to_string(),
            package_type: self.package_type.clone(),
            num_to_delete: self.num_old_versions_to_delete,
            min_to_keep: self.min_versions_to_keep,
            ignore_versions,
            include_versions,
            prerelease_only: self.delete_only_pre_release_versions,
            untagged_only: self.delete_only_untagged_versions,
            token: self.token.clone(),
            verbose: self.verbose,
            dry_run: self.dry_run,
        };

        Ok(RetentionPolicy::validate(raw)?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    telemetry::init_tracing(cli.json, level);

    let endpoint =
        std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    let client = GithubClient::new(endpoint, &cli.token);

    let packages = cli.package_list()?;
    let last = packages.len() - 1;

    for (index, package) in packages.iter().enumerate() {
        let policy = cli.policy_for(package)?;
        let report = sweep_package(&client, &policy)
            .await
            .with_context(|| format!("sweep failed for package {package}"))?;

        if report.dry_run {
            info!(
                "dry run: {} versions of {} would be deleted",
                report.selected.len(),
                report.package
            );
        } else {
            info!(
                "{} versions of {} deleted",
                report.deleted, report.package
            );
        }

        if index < last {
            tokio::time::sleep(Duration::from_millis(cli.package_delay_ms)).await;
        }
    }

    Ok(())
}
