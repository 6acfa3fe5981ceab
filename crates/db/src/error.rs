//! Error type returned by the threshold repository.
//!
//! Storage faults never cross the repository boundary as bare
//! [`sqlx::Error`] values: each is tagged with the operation that failed and
//! keeps the driver error as its `source()`.

use dx_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum ThresholdRepoError {
    /// Filtered read failed. No partial results are returned.
    #[error("An error occurred while trying to retrieve the thresholds")]
    Read(#[source] sqlx::Error),

    /// The reconcile transaction failed and was rolled back.
    #[error("An error occurred while trying to upsert the thresholds")]
    Reconcile(#[source] sqlx::Error),

    /// A submitted value would be rounded by storage. Nothing was written.
    #[error(transparent)]
    Invalid(#[from] CoreError),
}
