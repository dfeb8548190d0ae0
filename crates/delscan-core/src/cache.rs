use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{PeerId, UserProfile};

/// Run-scoped identity cache shared across all lookup paths.
///
/// Grows unboundedly for the lifetime of one run; there is no eviction.
/// Concurrent resolutions may race on the same id, in which case the last
/// writer wins — profiles are eventually-consistent snapshots, so that is
/// acceptable.
#[derive(Debug, Default)]
pub struct UserCache {
    inner: Mutex<HashMap<PeerId, UserProfile>>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: PeerId) -> Option<UserProfile> {
        self.inner.lock().await.get(&id).cloned()
    }

    pub async fn put(&self, profile: UserProfile) {
        self.inner.lock().await.insert(profile.id(), profile);
    }

    /// Split `ids` into hits and misses under a single lock acquisition.
    pub async fn partition(
        &self,
        ids: impl IntoIterator<Item = PeerId>,
    ) -> (HashMap<PeerId, UserProfile>, Vec<PeerId>) {
        let inner = self.inner.lock().await;
        let mut hits = HashMap::new();
        let mut misses = Vec::new();
        for id in ids {
            match inner.get(&id) {
                Some(profile) => {
                    hits.insert(id, profile.clone());
                }
                None => misses.push(id),
            }
        }
        (hits, misses)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Full copy of the cache contents, for the report.
    pub async fn snapshot(&self) -> HashMap<PeerId, UserProfile> {
        self.inner.lock().await.clone()
    }
}
