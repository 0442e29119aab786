//! Registry abstractions for pkgsweep.
//!
//! [`RegistryClient`] is the seam between the retention engine and the
//! HTTP transport: one method lists a page of version metadata, one
//! deletes a single version. The trait is async and backend-agnostic;
//! an in-memory fake is provided for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::RegistryError;

/// Page size for version listing, and the stride between anti-flood
/// pauses while deleting.
pub const RATE_LIMIT: usize = 100;

/// Pause between successive API calls so the upstream rate limiter is
/// never tripped.
pub const API_DELAY: Duration = Duration::from_millis(2500);

/// One published version of a package, as fetched from the registry.
/// Immutable once fetched; instances never survive past a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Registry-assigned id, unique per package.
    pub id: u64,
    /// Version label: semver-like for most ecosystems, a digest for
    /// untagged container versions.
    pub name: String,
    /// Publication timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether at least one registry tag currently points at this
    /// version. Always `false` for non-container packages.
    pub tagged: bool,
}

/// Identifies the package a sweep operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    /// User or organization owning the package.
    pub owner: String,
    /// Package name within the owner's namespace.
    pub package_name: String,
    /// Registry ecosystem the package belongs to.
    pub package_type: PackageType,
}

/// GitHub package ecosystems. Only `Container` versions can carry tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    Container,
    Npm,
    Maven,
    Rubygems,
    Docker,
    Nuget,
}

impl PackageType {
    /// Whether versions of this type can be tagged at all.
    pub fn supports_tags(&self) -> bool {
        matches!(self, PackageType::Container)
    }

    /// Path segment used by the Packages REST API.
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::Container => "container",
            PackageType::Npm => "npm",
            PackageType::Maven => "maven",
            PackageType::Rubygems => "rubygems",
            PackageType::Docker => "docker",
            PackageType::Nuget => "nuget",
        }
    }
}

impl std::str::FromStr for PackageType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "container" => Ok(PackageType::Container),
            "npm" => Ok(PackageType::Npm),
            "maven" => Ok(PackageType::Maven),
            "rubygems" => Ok(PackageType::Rubygems),
            "docker" => Ok(PackageType::Docker),
            "nuget" => Ok(PackageType::Nuget),
            other => Err(format!("unknown package type: {other}")),
        }
    }
}

impl std::fmt::Display for PackageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Version metadata source and deletion sink.
///
/// Guarantees expected from implementations:
/// - `list_page` returns at most `page_size` records; a shorter page
///   signals the end of the listing.
/// - `delete_version` returns `Ok(false)` for a soft failure (the API
///   answered, the version was not deleted) and `Err` only when the
///   call itself failed.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Fetch one page of version metadata, pages starting at 1.
    async fn list_page(
        &self,
        target: &PackageRef,
        page_size: usize,
        page: usize,
    ) -> std::result::Result<Vec<VersionRecord>, RegistryError>;

    /// Delete a single version by id.
    async fn delete_version(
        &self,
        target: &PackageRef,
        version_id: u64,
    ) -> std::result::Result<bool, RegistryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_package_type_round_trip() {
        for s in ["container", "npm", "maven", "rubygems", "docker", "nuget"] {
            let t = PackageType::from_str(s).unwrap();
            assert_eq!(t.to_string(), s);
        }
    }

    #[test]
    fn test_package_type_case_insensitive() {
        assert_eq!(
            PackageType::from_str("Container").unwrap(),
            PackageType::Container
        );
    }

    #[test]
    fn test_unknown_package_type_rejected() {
        assert!(PackageType::from_str("gem").is_err());
    }

    #[test]
    fn test_only_container_supports_tags() {
        assert!(PackageType::Container.supports_tags());
        assert!(!PackageType::Npm.supports_tags());
        assert!(!PackageType::Docker.supports_tags());
    }
}
