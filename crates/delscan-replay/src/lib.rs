//! Replay transport: runs the pipeline over a previously exported admin-log
//! dump instead of a live session.
//!
//! This crate implements the `delscan-core` TransportClient port from a JSON
//! file, which makes offline re-processing and end-to-end testing possible
//! without credentials. The dump shape mirrors what the live client sees:
//! channel identity, a participant listing, a user directory for entity
//! resolution, and the ordered deletion entries.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

use delscan_core::domain::{ChannelInfo, DeletionEvent, PeerId, ResolvedUser};
use delscan_core::ports::{Feed, TransportClient, TransportError};
use delscan_core::Result;

#[derive(Debug, Deserialize)]
struct Dump {
    channel: ChannelInfo,
    #[serde(default)]
    participants: Vec<ResolvedUser>,
    /// Directory backing `get_entity`-style lookups, keyed by peer id.
    #[serde(default)]
    users: HashMap<i64, ResolvedUser>,
    #[serde(default)]
    events: Vec<DeletionEvent>,
}

/// TransportClient over a JSON admin-log dump.
pub struct ReplayTransport {
    channel: ChannelInfo,
    participants: Vec<ResolvedUser>,
    users: HashMap<i64, ResolvedUser>,
    /// Taken on first `deletion_log` call; the log is single-pass like the
    /// live one.
    events: Mutex<Option<Vec<DeletionEvent>>>,
}

impl ReplayTransport {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let dump: Dump = serde_json::from_slice(&bytes)?;
        Ok(Self {
            channel: dump.channel,
            participants: dump.participants,
            users: dump.users,
            events: Mutex::new(Some(dump.events)),
        })
    }
}

struct VecFeed<T> {
    items: VecDeque<T>,
}

#[async_trait]
impl<T: Send> Feed<T> for VecFeed<T> {
    async fn next(&mut self) -> std::result::Result<Option<T>, TransportError> {
        Ok(self.items.pop_front())
    }
}

#[async_trait]
impl TransportClient for ReplayTransport {
    async fn channel_info(&self) -> std::result::Result<ChannelInfo, TransportError> {
        Ok(self.channel.clone())
    }

    async fn get_user(&self, id: PeerId) -> std::result::Result<ResolvedUser, TransportError> {
        self.users
            .get(&id.0)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(format!("peer {} not in dump", id.0)))
    }

    async fn participants(
        &self,
        limit: usize,
    ) -> std::result::Result<Box<dyn Feed<ResolvedUser>>, TransportError> {
        Ok(Box::new(VecFeed {
            items: self.participants.iter().take(limit).cloned().collect(),
        }))
    }

    async fn deletion_log(
        &self,
    ) -> std::result::Result<Box<dyn Feed<DeletionEvent>>, TransportError> {
        let events = self
            .events
            .lock()
            .await
            .take()
            .ok_or_else(|| TransportError::Other("deletion log already consumed".into()))?;
        Ok(Box::new(VecFeed {
            items: events.into(),
        }))
    }

    async fn disconnect(&self) {}
}
