//! Per-package sweep orchestration.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::delete::delete_versions;
use crate::error::{Result, SweepError};
use crate::policy::RetentionPolicy;
use crate::registry::RegistryClient;
use crate::select::select_versions;

/// Outcome of one package sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Package the sweep ran against.
    pub package: String,
    /// Version ids selected for deletion, oldest first.
    pub selected: Vec<u64>,
    /// How many ids were actually processed by the deleter.
    pub deleted: usize,
    /// Whether deletion was skipped.
    pub dry_run: bool,
}

/// Run the full sweep for one package: select, then delete.
///
/// Policy validation already happened at construction; what remains
/// here is the token presence check and the zero-work short-circuit
/// (`num_to_delete == 0` with no keep floor means nothing was asked
/// for, so no network call is made at all). In dry-run mode the
/// selection is still computed, for logging and verification, but
/// nothing is deleted.
pub async fn sweep_package(
    client: &dyn RegistryClient,
    policy: &RetentionPolicy,
) -> Result<RunReport> {
    info!(
        "deleting versions for package {}...",
        policy.target.package_name
    );

    if policy.token.is_empty() {
        return Err(SweepError::Config("no token found".to_string()));
    }

    if policy.num_to_delete == 0 && policy.min_to_keep < 0 {
        info!("number of versions to delete is 0, no versions will be deleted");
        return Ok(RunReport {
            package: policy.target.package_name.clone(),
            selected: Vec::new(),
            deleted: 0,
            dry_run: policy.dry_run,
        });
    }

    let selected = select_versions(client, policy).await?;

    if policy.verbose {
        let ids = selected
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        info!("ids to be deleted: {ids}");
    }

    let deleted = if policy.dry_run {
        0
    } else {
        delete_versions(client, &policy.target, &selected).await?
    };

    Ok(RunReport {
        package: policy.target.package_name.clone(),
        selected,
        deleted,
        dry_run: policy.dry_run,
    })
}
