//! Retention policy input, validation, and normalization.
//!
//! [`RawPolicy`] is what the caller hands over; [`RetentionPolicy`] is
//! the fully normalized, immutable form the engine runs on. The only
//! way to obtain a `RetentionPolicy` is [`RetentionPolicy::validate`],
//! a pure function that either rejects the input or returns a policy
//! with every normalization rule already applied.

use regex::Regex;
use std::str::FromStr;

use crate::error::{Result, SweepError};
use crate::registry::{PackageRef, PackageType};

/// Labels matching this pattern are final releases (`1.2.3`, `10`,
/// `0.4.0.1`). Prerelease-only mode excludes them from deletion.
const FINAL_RELEASE_PATTERN: &str = r"^(0|[1-9]\d*)((\.(0|[1-9]\d*))*)$";

/// Unvalidated retention parameters, as collected from the CLI or any
/// other caller.
#[derive(Debug, Clone, Default)]
pub struct RawPolicy {
    /// Explicit version ids to delete. When non-empty the selection
    /// pipeline is bypassed entirely.
    pub version_ids: Vec<u64>,
    /// User or organization owning the package.
    pub owner: String,
    /// Package to sweep.
    pub package_name: String,
    /// Package ecosystem, e.g. "container" or "npm".
    pub package_type: String,
    /// How many of the oldest versions to delete. -1 means unbounded.
    pub num_to_delete: i64,
    /// Keep at least this many of the newest versions. -1 disables the
    /// floor and defers to `num_to_delete`.
    pub min_to_keep: i64,
    /// Versions whose label matches are never deleted.
    pub ignore_versions: Option<Regex>,
    /// When set, only versions whose label matches are considered.
    pub include_versions: Option<Regex>,
    /// Restrict deletion to prerelease labels.
    pub prerelease_only: bool,
    /// Restrict deletion to untagged versions (container packages only).
    pub untagged_only: bool,
    /// API token.
    pub token: String,
    /// Emit per-stage record listings during selection.
    pub verbose: bool,
    /// Compute the selection but delete nothing.
    pub dry_run: bool,
}

/// A validated, normalized retention policy. Read-only for the rest of
/// the run.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    pub version_ids: Vec<u64>,
    pub target: PackageRef,
    pub num_to_delete: i64,
    pub min_to_keep: i64,
    pub ignore_versions: Option<Regex>,
    pub include_versions: Option<Regex>,
    pub untagged_only: bool,
    pub token: String,
    pub verbose: bool,
    pub dry_run: bool,
}

impl RetentionPolicy {
    /// Validate and normalize raw parameters.
    ///
    /// Normalization rules, applied in order:
    /// 1. `untagged_only` is forced off unless the package type is
    ///    tag-capable.
    /// 2. `num_to_delete > 1` combined with a keep floor, prerelease
    ///    mode, or untagged mode is rejected as ambiguous. Values in
    ///    `{-1, 0, 1}` bypass this check (preserved behavior).
    /// 3. Package name and type must be non-empty; the type must be a
    ///    known ecosystem.
    /// 4. Prerelease mode forces a keep floor of at least 0 and sets
    ///    the ignore pattern to final-release labels.
    /// 5. Untagged mode forces a keep floor of at least 0.
    /// 6. Any keep floor (`min_to_keep >= 0`) zeroes `num_to_delete`.
    pub fn validate(raw: RawPolicy) -> Result<RetentionPolicy> {
        if raw.package_type.is_empty() {
            return Err(SweepError::Config(
                "package type must not be empty".to_string(),
            ));
        }
        let package_type = PackageType::from_str(&raw.package_type).map_err(SweepError::Config)?;

        let untagged_only = raw.untagged_only && package_type.supports_tags();

        if raw.num_to_delete > 1
            && (raw.min_to_keep >= 0 || raw.prerelease_only || untagged_only)
        {
            return Err(SweepError::Config(
                "num-old-versions-to-delete cannot be combined with min-versions-to-keep, \
                 prerelease-only, or untagged-only"
                    .to_string(),
            ));
        }

        if raw.package_name.is_empty() {
            return Err(SweepError::Config(
                "package name must not be empty".to_string(),
            ));
        }

        let mut min_to_keep = raw.min_to_keep;
        let mut num_to_delete = raw.num_to_delete;
        let mut ignore_versions = raw.ignore_versions;

        if raw.prerelease_only {
            min_to_keep = min_to_keep.max(0);
            // The only safe exclusion in prerelease mode is "everything
            // that is a final release"; a caller-supplied pattern is
            // overridden.
            ignore_versions = Some(
                Regex::new(FINAL_RELEASE_PATTERN)
                    .map_err(|e| SweepError::Config(format!("invalid final-release pattern: {e}")))?,
            );
        }

        if untagged_only {
            min_to_keep = min_to_keep.max(0);
        }

        if min_to_keep >= 0 {
            num_to_delete = 0;
        }

        Ok(RetentionPolicy {
            version_ids: raw.version_ids,
            target: PackageRef {
                owner: raw.owner,
                package_name: raw.package_name,
                package_type,
            },
            num_to_delete,
            min_to_keep,
            ignore_versions,
            include_versions: raw.include_versions,
            untagged_only,
            token: raw.token,
            verbose: raw.verbose,
            dry_run: raw.dry_run,
        })
    }

    /// Whether the policy carries everything a full version fetch needs:
    /// owner, package name, a sane delete count, and credentials.
    pub fn has_fetch_query(&self) -> bool {
        !self.target.owner.is_empty() && self.num_to_delete >= -1 && !self.token.is_empty()
    }
}
