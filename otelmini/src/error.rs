//! Error and result types shared across the SDK.

use std::result::Result;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during SDK operations `export()`, `force_flush()`
/// and `shutdown()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OTelSdkError {
    /// Shutdown has already been invoked.
    ///
    /// Shutdown is idempotent, but seeing this error suggests another part of
    /// the application is shutting the pipeline down earlier than intended.
    #[error("Shutdown already invoked")]
    AlreadyShutdown,

    /// Operation timed out before completing. The operation may still finish;
    /// remaining items are discarded on the caller's side.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Operation failed due to an internal error. The message is for logging
    /// only and carries no stable structure.
    #[error("Operation failed: {0}")]
    InternalFailure(String),
}

/// A specialized `Result` for SDK lifecycle operations.
pub type OTelSdkResult = Result<(), OTelSdkError>;

/// Terminal outcome of one `export` call.
///
/// Exporters run their own retry loop internally; by the time a result
/// surfaces here the batch has either been accepted by the collector or is
/// being dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportResult {
    /// The batch was delivered.
    Success,
    /// The batch could not be delivered and will be dropped.
    Failure,
}

impl ExportResult {
    /// Returns true for [`ExportResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, ExportResult::Success)
    }
}
