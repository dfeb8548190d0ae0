use async_trait::async_trait;

use crate::domain::{ChannelInfo, DeletionEvent, PeerId, ResolvedUser};

/// Failure at the transport boundary.
///
/// Flood-wait is its own variant because the pipeline handles it differently
/// from every other failure: it is backpressure, not an error, and carries
/// the mandatory wait before the call may be retried.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("flood wait: retry after {seconds}s")]
    FloodWait { seconds: u64 },

    #[error("entity not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("transport error: {0}")]
    Other(String),
}

/// A finite, forward-only, non-restartable producer.
///
/// The transport is the source of truth for ordering; consumers pull items
/// one at a time and never reorder. `Ok(None)` means the sequence is
/// exhausted; an `Err` mid-stream is fatal to the sequence.
#[async_trait]
pub trait Feed<T>: Send {
    async fn next(&mut self) -> Result<Option<T>, TransportError>;
}

/// Port over the Telegram session client.
///
/// The live MTProto client and the login flow live outside this workspace;
/// adapters (replay dumps, test doubles) implement this same surface.
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// Resolve the target channel's identity.
    async fn channel_info(&self) -> Result<ChannelInfo, TransportError>;

    /// Resolve one peer to its profile fields.
    async fn get_user(&self, id: PeerId) -> Result<ResolvedUser, TransportError>;

    /// Lazily list up to `limit` channel participants.
    async fn participants(
        &self,
        limit: usize,
    ) -> Result<Box<dyn Feed<ResolvedUser>>, TransportError>;

    /// Stream the admin log, filtered to deletion actions, newest first as
    /// the server returns them.
    async fn deletion_log(&self) -> Result<Box<dyn Feed<DeletionEvent>>, TransportError>;

    /// Release the underlying connection. Must be safe to call exactly once
    /// per run, on success and failure paths alike.
    async fn disconnect(&self);
}
