//! The retention selection pipeline.
//!
//! Combines explicit id overrides, include/exclude label filters, a
//! stable chronological sort, the untagged-only filter, and count
//! truncation into the final ordered deletion batch.

use tracing::info;

use crate::error::{Result, SweepError};
use crate::fetch::fetch_all;
use crate::policy::RetentionPolicy;
use crate::registry::{RegistryClient, VersionRecord, RATE_LIMIT};

/// Compact `[id] name` listing for verbose diagnostics.
fn listing(records: &[VersionRecord]) -> String {
    records
        .iter()
        .map(|r| format!("[{}] {}", r.id, r.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Select the version ids to delete under `policy`, oldest first.
///
/// Explicit ids short-circuit everything, including the fetch. The
/// remaining stages run in a fixed order; the sort is always performed
/// in memory over the fully concatenated record set, so the result is
/// independent of the order pages came back in.
pub async fn select_versions(
    client: &dyn RegistryClient,
    policy: &RetentionPolicy,
) -> Result<Vec<u64>> {
    if !policy.version_ids.is_empty() {
        return Ok(policy.version_ids.clone());
    }

    if !policy.has_fetch_query() {
        return Err(SweepError::Config(
            "cannot query package versions: owner, package name, delete count, and token \
             are all required unless explicit version ids are given"
                .to_string(),
        ));
    }

    let mut records = fetch_all(client, &policy.target, RATE_LIMIT).await?;

    if policy.verbose {
        info!("{} versions: {}", records.len(), listing(&records));
    }

    if let Some(include) = &policy.include_versions {
        records.retain(|r| include.is_match(&r.name));
        if policy.verbose {
            info!(
                "{} versions after include filter ({include}): {}",
                records.len(),
                listing(&records)
            );
        }
    }

    if let Some(ignore) = &policy.ignore_versions {
        records.retain(|r| !ignore.is_match(&r.name));
        if policy.verbose {
            info!(
                "{} versions after ignore filter ({ignore}): {}",
                records.len(),
                listing(&records)
            );
        }
    }

    // Oldest first; ids break creation-time ties deterministically.
    records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    if policy.untagged_only {
        records.retain(|r| !r.tagged);
    }

    let eligible = records.len() as i64;
    let to_delete = if policy.min_to_keep < 0 {
        if policy.num_to_delete == -1 {
            eligible
        } else {
            eligible.min(policy.num_to_delete)
        }
    } else {
        eligible - policy.min_to_keep
    };

    if to_delete <= 0 {
        return Ok(Vec::new());
    }

    records.truncate(to_delete as usize);

    if policy.verbose {
        info!(
            "{} versions to be deleted: {}",
            records.len(),
            listing(&records)
        );
    }

    Ok(records.into_iter().map(|r| r.id).collect())
}
