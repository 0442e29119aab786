//! Sequential, rate-limited batch deletion.

use tracing::{info, warn};

use crate::error::SweepError;
use crate::registry::{PackageRef, RegistryClient, API_DELAY, RATE_LIMIT};

/// Delete `ids` one by one against `target`, in the given order.
///
/// Returns the number of ids processed. A delete call that answers with
/// a non-success result is logged and skipped; a call that fails hard
/// aborts the remaining batch and reports how many ids had been
/// processed (the failing one included) so the caller can reconcile.
/// Already-deleted versions are never rolled back. Every
/// [`RATE_LIMIT`]-th call, counted from zero, is followed by the
/// anti-flood delay.
pub async fn delete_versions(
    client: &dyn RegistryClient,
    target: &PackageRef,
    ids: &[u64],
) -> std::result::Result<usize, SweepError> {
    if ids.is_empty() {
        return Ok(0);
    }

    let mut cursor = 0;
    for (index, id) in ids.iter().enumerate() {
        cursor = index;
        let deleted = client
            .delete_version(target, *id)
            .await
            .map_err(|e| SweepError::Delete {
                message: e.to_string(),
                deleted: index + 1,
            })?;

        if !deleted {
            warn!(version_id = id, "version not deleted");
        }

        if index % RATE_LIMIT == 0 {
            tokio::time::sleep(API_DELAY).await;
        }
    }

    info!("total versions deleted till now: {}", cursor + 1);
    Ok(cursor + 1)
}
