//! pkgsweep core library
//!
//! Retention-policy engine for GitHub Packages: fetches every version
//! of a package through the paginated REST API, applies a layered
//! filter / sort / truncate pipeline to pick the versions to delete,
//! and deletes them sequentially with partial-failure accounting.

pub mod delete;
pub mod error;
pub mod fakes;
pub mod fetch;
pub mod github;
pub mod policy;
pub mod registry;
pub mod run;
pub mod select;

pub use delete::delete_versions;
pub use error::{RegistryError, Result, SweepError};
pub use fetch::fetch_all;
pub use github::{GithubClient, DEFAULT_ENDPOINT};
pub use policy::{RawPolicy, RetentionPolicy};
pub use registry::{PackageRef, PackageType, RegistryClient, VersionRecord, API_DELAY, RATE_LIMIT};
pub use run::{sweep_package, RunReport};
pub use select::select_versions;
