use std::collections::{BTreeSet, HashMap};

use tokio::sync::Mutex;

use crate::domain::{
    DeleterInfo, DeletionEvent, DeletionRecord, MessageSnapshot, PeerId, PeerRef, SenderInfo,
    Statistics,
};
use crate::enrich::BatchEnricher;

/// Turns a window of raw admin-log events into deletion records.
///
/// The throughput lever lives here: identifiers from the whole window are
/// collected into one set and resolved with a single enricher call, so N
/// events cost one lookup batch instead of N.
pub struct EventProcessor {
    enricher: BatchEnricher,
    stats: Mutex<Statistics>,
}

impl EventProcessor {
    pub fn new(enricher: BatchEnricher) -> Self {
        Self {
            enricher,
            stats: Mutex::new(Statistics::default()),
        }
    }

    pub async fn stats(&self) -> Statistics {
        self.stats.lock().await.clone()
    }

    /// Process one window of events, in arrival order. Events without a
    /// pre-deletion snapshot are dropped silently; a malformed event yields
    /// at most a record with unresolved identities, never an error.
    pub async fn process(&self, events: &[DeletionEvent]) -> Vec<DeletionRecord> {
        struct Pending<'a> {
            event: &'a DeletionEvent,
            old: &'a MessageSnapshot,
            sender_id: Option<PeerId>,
            admin_id: Option<PeerId>,
        }

        let mut pending = Vec::new();
        let mut wanted = BTreeSet::new();
        for event in events {
            let Some(old) = event.old.as_ref().filter(|_| event.deleted) else {
                continue;
            };
            let sender_id = original_sender_id(event, old);
            let admin_id = event.admin_id;
            wanted.extend(sender_id);
            wanted.extend(admin_id);
            pending.push(Pending {
                event,
                old,
                sender_id,
                admin_id,
            });
        }

        let profiles = if wanted.is_empty() {
            HashMap::new()
        } else {
            self.enricher.resolve_many(&wanted).await
        };

        let mut records = Vec::with_capacity(pending.len());
        let mut stats = self.stats.lock().await;
        for p in pending {
            let record = DeletionRecord {
                id: p.old.id,
                date: p.old.date,
                text: p.old.text.clone(),
                has_media: p.old.media.is_some(),
                media_type: p.old.media.clone(),
                original_sender: SenderInfo {
                    user_id: p.sender_id,
                    user_info: p.sender_id.and_then(|id| profiles.get(&id).cloned()),
                },
                deleted_by: DeleterInfo {
                    admin_id: p.admin_id,
                    admin_info: p.admin_id.and_then(|id| profiles.get(&id).cloned()),
                },
                action_date: p.event.date,
                is_self_deletion: is_self_deletion(p.sender_id, p.admin_id),
            };
            stats.record(&record);
            records.push(record);
        }
        records
    }
}

/// Priority-ordered fallback chain for the original sender: structured user
/// ref, structured channel ref, bare id, then the legacy flat field, then the
/// acting admin recorded on the event itself. First match wins.
fn original_sender_id(event: &DeletionEvent, old: &MessageSnapshot) -> Option<PeerId> {
    match old.from {
        Some(PeerRef::User { user_id }) => Some(user_id),
        Some(PeerRef::Channel { channel_id }) => Some(channel_id),
        Some(PeerRef::Bare(id)) => Some(id),
        None => old.sender_id.or(event.admin_id),
    }
}

/// A deletion counts as self-deletion only when both identities are known
/// and equal. A missing side yields false, not unknown.
fn is_self_deletion(sender: Option<PeerId>, admin: Option<PeerId>) -> bool {
    matches!((sender, admin), (Some(s), Some(a)) if s == a)
}
