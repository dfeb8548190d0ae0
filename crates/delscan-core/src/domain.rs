use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric Telegram peer id (user or channel; the admin log does not always
/// distinguish, and the identity cache keys both uniformly).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PeerId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i32);

/// Profile fields as returned by entity resolution or a participant listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedUser {
    pub id: PeerId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub is_channel: bool,
}

/// Authoritative cache entry for one peer: either the resolved profile or a
/// marker recording why resolution failed. Immutable once produced.
///
/// `Failed` is declared first so untagged deserialization only picks it when
/// an `error` field is actually present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserProfile {
    Failed { id: PeerId, error: String },
    Resolved(ResolvedUser),
}

impl UserProfile {
    pub fn failed(id: PeerId, error: impl Into<String>) -> Self {
        Self::Failed {
            id,
            error: error.into(),
        }
    }

    pub fn id(&self) -> PeerId {
        match self {
            Self::Failed { id, .. } => *id,
            Self::Resolved(u) => u.id,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl From<ResolvedUser> for UserProfile {
    fn from(u: ResolvedUser) -> Self {
        Self::Resolved(u)
    }
}

/// Structured sender reference on a message snapshot, mirroring the raw
/// shapes the admin log can carry: a user peer, a channel peer (posts made
/// as the channel), or a bare numeric id from older layers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeerRef {
    User { user_id: PeerId },
    Channel { channel_id: PeerId },
    Bare(PeerId),
}

impl PeerRef {
    pub fn id(&self) -> PeerId {
        match *self {
            Self::User { user_id } => user_id,
            Self::Channel { channel_id } => channel_id,
            Self::Bare(id) => id,
        }
    }
}

/// Media attached to a deleted message, reduced to its kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    Document,
    Sticker,
    Voice,
    Contact,
    Geo,
    Poll,
    Webpage,
}

/// Pre-deletion snapshot of a message, as preserved in the admin log entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageSnapshot {
    pub id: MessageId,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub media: Option<MediaKind>,
    /// Structured sender reference, when the layer provides one.
    #[serde(default)]
    pub from: Option<PeerRef>,
    /// Legacy flat sender field, still populated by some layers.
    #[serde(default)]
    pub sender_id: Option<PeerId>,
}

/// Raw admin-log entry, filtered to deletions by the transport. Produced by
/// the transport, consumed read-only by the event processor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeletionEvent {
    pub deleted: bool,
    #[serde(default)]
    pub old: Option<MessageSnapshot>,
    /// The acting admin. The wire name is `user_id` in the admin log.
    #[serde(default, alias = "user_id")]
    pub admin_id: Option<PeerId>,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SenderInfo {
    pub user_id: Option<PeerId>,
    pub user_info: Option<UserProfile>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleterInfo {
    pub admin_id: Option<PeerId>,
    pub admin_info: Option<UserProfile>,
}

/// One reconstructed deletion, computed once per raw event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeletionRecord {
    pub id: MessageId,
    pub date: DateTime<Utc>,
    pub text: Option<String>,
    pub has_media: bool,
    pub media_type: Option<MediaKind>,
    pub original_sender: SenderInfo,
    pub deleted_by: DeleterInfo,
    pub action_date: DateTime<Utc>,
    pub is_self_deletion: bool,
}

/// Running aggregate over all records produced in one run. Monotonic: counters
/// only ever increase, and nothing resets mid-run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: u64,
    pub with_media: u64,
    pub with_text: u64,
    pub users_found: u64,
    pub self_deletions: u64,
}

impl Statistics {
    pub fn record(&mut self, rec: &DeletionRecord) {
        self.total += 1;
        if rec.text.as_deref().is_some_and(|t| !t.is_empty()) {
            self.with_text += 1;
        }
        if rec.has_media {
            self.with_media += 1;
        }
        if rec.original_sender.user_id.is_some() {
            self.users_found += 1;
        }
        if rec.is_self_deletion {
            self.self_deletions += 1;
        }
    }
}

/// Identity of the channel under scrape.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: i64,
    pub title: String,
}
