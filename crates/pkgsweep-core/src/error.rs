//! Error taxonomy for pkgsweep.
//!
//! Two layers: [`RegistryError`] covers the HTTP transport against the
//! Packages API, [`SweepError`] is the domain taxonomy surfaced to the
//! orchestration boundary. Nothing in the core retries; every error
//! propagates upward unchanged.

/// Errors produced by a single registry API call.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The request never produced an HTTP response.
    #[error("http transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        RegistryError::Transport(err.to_string())
    }
}

/// pkgsweep domain errors.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    /// Invalid, ambiguous, or missing retention parameters.
    /// Raised before any network call is attempted.
    #[error("invalid retention policy: {0}")]
    Config(String),

    /// A page fetch failed. The whole selection aborts; callers never
    /// see a partially fetched version list.
    #[error("list versions API failed: {0}")]
    Fetch(String),

    /// A delete call failed hard. `deleted` is the number of ids
    /// processed before the abort, the failing call included, so the
    /// caller can reconcile the partially applied batch.
    #[error("delete version API failed: {message} ({deleted} versions processed before the failure)")]
    Delete { message: String, deleted: usize },
}

/// Result type for pkgsweep core operations.
pub type Result<T> = std::result::Result<T, SweepError>;
