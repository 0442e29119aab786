//! In-memory fake registry for testing.
//!
//! [`FakeRegistry`] satisfies the [`RegistryClient`] contract without
//! any network: versions are scripted up front, served in pages, and
//! failures (hard or soft) are injected per page or per id. Call
//! counters let tests assert exactly how many API calls a code path
//! issued.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::error::RegistryError;
use crate::registry::{PackageRef, RegistryClient, VersionRecord};

/// Build a test [`VersionRecord`] created `age_secs` seconds ago.
pub fn version(id: u64, name: &str, age_secs: i64, tagged: bool) -> VersionRecord {
    VersionRecord {
        id,
        name: name.to_string(),
        created_at: Utc::now() - Duration::seconds(age_secs),
        tagged,
    }
}

#[derive(Debug, Default)]
struct FakeState {
    versions: Vec<VersionRecord>,
    fail_on_page: Option<usize>,
    hard_fail_ids: HashSet<u64>,
    soft_fail_ids: HashSet<u64>,
    list_calls: usize,
    delete_calls: usize,
    deleted_ids: Vec<u64>,
}

/// Scripted in-memory registry backed by a `Mutex<FakeState>`.
#[derive(Debug, Default)]
pub struct FakeRegistry {
    state: Mutex<FakeState>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry with versions, served page-by-page in the
    /// order given.
    pub fn with_versions(versions: Vec<VersionRecord>) -> Self {
        let registry = Self::new();
        registry.state.lock().unwrap().versions = versions;
        registry
    }

    /// Make the given 1-based page fail hard.
    pub fn fail_on_page(&self, page: usize) {
        self.state.lock().unwrap().fail_on_page = Some(page);
    }

    /// Make deletion of `id` fail hard.
    pub fn fail_delete_of(&self, id: u64) {
        self.state.lock().unwrap().hard_fail_ids.insert(id);
    }

    /// Make deletion of `id` report a soft non-success result.
    pub fn soft_fail_delete_of(&self, id: u64) {
        self.state.lock().unwrap().soft_fail_ids.insert(id);
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.state.lock().unwrap().delete_calls
    }

    /// Ids successfully deleted, in deletion order.
    pub fn deleted_ids(&self) -> Vec<u64> {
        self.state.lock().unwrap().deleted_ids.clone()
    }
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn list_page(
        &self,
        _target: &PackageRef,
        page_size: usize,
        page: usize,
    ) -> std::result::Result<Vec<VersionRecord>, RegistryError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;

        if state.fail_on_page == Some(page) {
            return Err(RegistryError::Status {
                status: 500,
                message: "scripted page failure".to_string(),
            });
        }

        let start = (page - 1) * page_size;
        let end = (start + page_size).min(state.versions.len());
        if start >= state.versions.len() {
            return Ok(Vec::new());
        }
        Ok(state.versions[start..end].to_vec())
    }

    async fn delete_version(
        &self,
        _target: &PackageRef,
        version_id: u64,
    ) -> std::result::Result<bool, RegistryError> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls += 1;

        if state.hard_fail_ids.contains(&version_id) {
            return Err(RegistryError::Status {
                status: 500,
                message: format!("scripted delete failure for {version_id}"),
            });
        }
        if state.soft_fail_ids.contains(&version_id) {
            return Ok(false);
        }

        state.deleted_ids.push(version_id);
        Ok(true)
    }
}
