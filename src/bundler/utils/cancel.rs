//! Cancellation support for long-running stage operations.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::bundler::error::{Error, Result};

/// Runs `operation` until it finishes or `token` is cancelled.
///
/// Cancellation wins ties, so an already-cancelled token never starts work
/// that has side effects beyond its first poll.
pub async fn cancellable<T, F>(token: &CancellationToken, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Error::Cancelled),
        result = operation => result,
    }
}

/// Returns [`Error::Cancelled`] if `token` has been cancelled.
pub fn check(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}
