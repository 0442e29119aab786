//! GitHub Packages REST client.
//!
//! Thin transport layer implementing [`RegistryClient`] against the
//! `/users/{owner}/packages` endpoints. The base endpoint is injected
//! at construction so an enterprise deployment can be targeted; the
//! core never reads process environment itself.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::RegistryError;
use crate::registry::{PackageRef, PackageType, RegistryClient, VersionRecord};

/// Public GitHub API endpoint; overridable for GitHub Enterprise.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com";

/// Raw version entry as returned by the list-versions endpoint. Only
/// the fields the sweep needs are kept.
#[derive(Debug, Deserialize)]
struct ApiVersion {
    id: u64,
    name: String,
    created_at: DateTime<Utc>,
    metadata: Option<ApiVersionMetadata>,
}

#[derive(Debug, Deserialize)]
struct ApiVersionMetadata {
    container: Option<ApiContainerMetadata>,
}

#[derive(Debug, Deserialize)]
struct ApiContainerMetadata {
    #[serde(default)]
    tags: Vec<String>,
}

impl ApiVersion {
    /// Normalize into a [`VersionRecord`]. The `tagged` flag only ever
    /// goes true for container packages with at least one tag.
    fn into_record(self, package_type: PackageType) -> VersionRecord {
        let tagged = package_type.supports_tags()
            && self
                .metadata
                .as_ref()
                .and_then(|m| m.container.as_ref())
                .map(|c| !c.tags.is_empty())
                .unwrap_or(false);

        VersionRecord {
            id: self.id,
            name: self.name,
            created_at: self.created_at,
            tagged,
        }
    }
}

/// Authenticated client for the GitHub Packages API.
pub struct GithubClient {
    endpoint: String,
    token: String,
    http: reqwest::Client,
}

impl GithubClient {
    /// Create a client against the given endpoint.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("pkgsweep/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to create HTTP client");

        GithubClient {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token: token.into(),
            http,
        }
    }

    fn versions_url(&self, target: &PackageRef) -> String {
        format!(
            "{}/users/{}/packages/{}/{}/versions",
            self.endpoint, target.owner, target.package_type, target.package_name
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn status_error(response: reqwest::Response) -> RegistryError {
        let status = response.status().as_u16();
        let message = match response.text().await {
            Ok(body) if !body.is_empty() => body,
            _ => "no response body".to_string(),
        };
        RegistryError::Status { status, message }
    }
}

#[async_trait]
impl RegistryClient for GithubClient {
    async fn list_page(
        &self,
        target: &PackageRef,
        page_size: usize,
        page: usize,
    ) -> std::result::Result<Vec<VersionRecord>, RegistryError> {
        let url = self.versions_url(target);
        debug!(url = %url, page = page, per_page = page_size, "listing package versions");

        let response = self
            .request(self.http.get(&url))
            .query(&[("per_page", page_size), ("page", page)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let versions: Vec<ApiVersion> = response
            .json()
            .await
            .map_err(|e| RegistryError::Decode(e.to_string()))?;

        Ok(versions
            .into_iter()
            .map(|v| v.into_record(target.package_type))
            .collect())
    }

    async fn delete_version(
        &self,
        target: &PackageRef,
        version_id: u64,
    ) -> std::result::Result<bool, RegistryError> {
        let url = format!("{}/{}", self.versions_url(target), version_id);
        debug!(url = %url, "deleting package version");

        let response = self.request(self.http.delete(&url)).send().await?;
        let status = response.status();

        if status.as_u16() == 204 {
            Ok(true)
        } else if status.is_success() {
            // The API answered but did not delete; soft failure.
            Ok(false)
        } else {
            Err(Self::status_error(response).await)
        }
    }
}
