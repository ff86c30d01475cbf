//! Error Envelope.
//!
//! Every inbound event handler runs inside [`guarded`]. A failure (or a panic)
//! is logged with the full internal detail and turned into a single generic
//! `error` event for the originating connection only. Other connections, and
//! later events on the same connection, are unaffected.

use std::{any::Any, future::Future, panic::AssertUnwindSafe};

use futures_util::FutureExt;

use crate::domain::{ChatError, ConnectionId, OutboundEvent, RoomRegistry, SubjectId};

/// Run one handler, reporting its failure to the caller's connection.
///
/// Returns `None` when the handler failed.
pub async fn guarded<F, T>(
    handler: &'static str,
    connection_id: &ConnectionId,
    subject_id: &SubjectId,
    registry: &dyn RoomRegistry,
    future: F,
) -> Option<T>
where
    F: Future<Output = Result<T, ChatError>>,
{
    let error = match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(value)) => return Some(value),
        Ok(Err(error)) => error,
        Err(payload) => ChatError::UnexpectedError(format!(
            "handler panicked: {}",
            panic_message(&*payload)
        )),
    };

    report(handler, connection_id, subject_id, registry, &error).await;
    None
}

/// Log a failure and deliver its client-facing form.
pub async fn report(
    handler: &'static str,
    connection_id: &ConnectionId,
    subject_id: &SubjectId,
    registry: &dyn RoomRegistry,
    error: &ChatError,
) {
    match error {
        ChatError::UnexpectedError(_) | ChatError::PersistenceError(_) => tracing::error!(
            handler,
            connection_id = %connection_id,
            subject_id = %subject_id,
            error_kind = error.kind(),
            "Handler failed: {}",
            error
        ),
        _ => tracing::warn!(
            handler,
            connection_id = %connection_id,
            subject_id = %subject_id,
            error_kind = error.kind(),
            "Handler failed: {}",
            error
        ),
    }

    let delivered = registry
        .send_to(
            connection_id,
            OutboundEvent::Error {
                error_kind: error.kind(),
                client_message: error.client_message(),
            },
        )
        .await;
    if !delivered {
        tracing::debug!(
            "Connection '{}' is gone; error event for '{}' dropped",
            connection_id,
            handler
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
