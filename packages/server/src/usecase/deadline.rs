//! Time bounds for calls to external collaborators.

use std::{future::Future, time::Duration};

use crate::domain::ChatError;

/// Await `future` for at most `limit`.
///
/// An elapsed deadline becomes `ChatError::Timeout` naming `operation`.
pub async fn bounded<F>(
    limit: Duration,
    operation: &'static str,
    future: F,
) -> Result<F::Output, ChatError>
where
    F: Future,
{
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| ChatError::Timeout { operation })
}
