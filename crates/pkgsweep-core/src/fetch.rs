//! Full version listing across the paginated API.

use tracing::debug;

use crate::error::{Result, SweepError};
use crate::registry::{PackageRef, RegistryClient, VersionRecord, API_DELAY};

/// Fetch every version of `target`, page by page.
///
/// Pages are requested starting at 1 and concatenated; a page shorter
/// than `page_size` ends the listing. Between non-final pages the task
/// sleeps for [`API_DELAY`] so the upstream rate limiter stays quiet.
/// Any single page failure aborts the whole fetch; no partial list is
/// ever returned and no retry is attempted here.
pub async fn fetch_all(
    client: &dyn RegistryClient,
    target: &PackageRef,
    page_size: usize,
) -> Result<Vec<VersionRecord>> {
    let mut versions = Vec::new();
    let mut page = 1;

    loop {
        let batch = client
            .list_page(target, page_size, page)
            .await
            .map_err(|e| SweepError::Fetch(e.to_string()))?;
        let done = batch.len() < page_size;

        debug!(page = page, count = batch.len(), "fetched version page");
        versions.extend(batch);
        page += 1;

        if done {
            break;
        }
        tokio::time::sleep(API_DELAY).await;
    }

    Ok(versions)
}
