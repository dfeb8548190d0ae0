use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::cache::UserCache;
use crate::domain::{PeerId, UserProfile};
use crate::ratelimit::RateLimiter;
use crate::resolve::UserResolver;

/// Deduplicated, rate-limited batch resolution of peer ids.
///
/// One `resolve_many` call serves a whole processing window: ids already in
/// the cache are answered from it, the rest are resolved in fixed-size chunks
/// with concurrent fan-out inside each chunk and one rate-limit admission per
/// chunk. Chunks run strictly sequentially.
pub struct BatchEnricher {
    cache: Arc<UserCache>,
    resolver: UserResolver,
    limiter: Arc<RateLimiter>,
    chunk_size: usize,
}

impl BatchEnricher {
    pub fn new(
        cache: Arc<UserCache>,
        resolver: UserResolver,
        limiter: Arc<RateLimiter>,
        chunk_size: usize,
    ) -> Self {
        Self {
            cache,
            resolver,
            limiter,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Total: the returned mapping covers every requested id, with error
    /// variants standing in for ids that could not be resolved.
    pub async fn resolve_many(&self, ids: &BTreeSet<PeerId>) -> HashMap<PeerId, UserProfile> {
        let (mut results, uncached) = self.cache.partition(ids.iter().copied()).await;

        for chunk in uncached.chunks(self.chunk_size) {
            let mut inflight = JoinSet::new();
            for &id in chunk {
                let resolver = self.resolver.clone();
                inflight.spawn(async move { (id, resolver.resolve(id).await) });
            }

            // One resolution failing (or even panicking) must not take its
            // siblings down with it. Error markers are cached like resolved
            // profiles so a dead peer is not re-resolved every window.
            while let Some(joined) = inflight.join_next().await {
                if let Ok((id, profile)) = joined {
                    self.cache.put(profile.clone()).await;
                    results.insert(id, profile);
                }
            }
            for &id in chunk {
                results
                    .entry(id)
                    .or_insert_with(|| UserProfile::failed(id, "resolution task failed"));
            }

            self.limiter.admit().await;
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{ChannelInfo, DeletionEvent, ResolvedUser};
    use crate::ports::{Feed, TransportClient, TransportError};

    /// Transport double: resolves even ids, rejects odd ones, counts calls.
    struct Directory {
        calls: AtomicUsize,
    }

    impl Directory {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TransportClient for Directory {
        async fn channel_info(&self) -> Result<ChannelInfo, TransportError> {
            unreachable!("not used by the enricher")
        }

        async fn get_user(&self, id: PeerId) -> Result<ResolvedUser, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if id.0 % 2 == 0 {
                Ok(ResolvedUser {
                    id,
                    username: Some(format!("user{}", id.0)),
                    first_name: None,
                    last_name: None,
                    phone: None,
                    is_bot: false,
                    is_channel: false,
                })
            } else {
                Err(TransportError::NotFound(format!("peer {}", id.0)))
            }
        }

        async fn participants(
            &self,
            _limit: usize,
        ) -> Result<Box<dyn Feed<ResolvedUser>>, TransportError> {
            unreachable!("not used by the enricher")
        }

        async fn deletion_log(&self) -> Result<Box<dyn Feed<DeletionEvent>>, TransportError> {
            unreachable!("not used by the enricher")
        }

        async fn disconnect(&self) {}
    }

    fn enricher(chunk_size: usize) -> (BatchEnricher, Arc<Directory>, Arc<RateLimiter>) {
        let transport = Arc::new(Directory::new());
        let cache = Arc::new(UserCache::new());
        let limiter = Arc::new(RateLimiter::new());
        let enricher = BatchEnricher::new(
            cache,
            UserResolver::new(transport.clone()),
            limiter.clone(),
            chunk_size,
        );
        (enricher, transport, limiter)
    }

    fn ids(range: std::ops::Range<i64>) -> BTreeSet<PeerId> {
        range.map(PeerId).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn cached_ids_never_hit_the_transport() {
        let (enricher, transport, _) = enricher(10);
        for id in 0..4 {
            enricher
                .cache
                .put(UserProfile::failed(PeerId(id), "seeded"))
                .await;
        }

        let out = enricher.resolve_many(&ids(0..4)).await;
        assert_eq!(out.len(), 4);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn output_covers_every_requested_id_including_failures() {
        let (enricher, _, _) = enricher(10);

        let requested = ids(0..7);
        let out = enricher.resolve_many(&requested).await;

        let returned: BTreeSet<PeerId> = out.keys().copied().collect();
        assert_eq!(returned, requested);
        assert!(out[&PeerId(2)].is_resolved());
        assert!(!out[&PeerId(3)].is_resolved());
        // Both outcomes are written back to the cache.
        assert_eq!(enricher.cache.len().await, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_resolutions_are_cached_and_not_retried() {
        let (enricher, transport, _) = enricher(10);

        let unresolvable = ids(1..2);
        let first = enricher.resolve_many(&unresolvable).await;
        let second = enricher.resolve_many(&unresolvable).await;

        assert!(!first[&PeerId(1)].is_resolved());
        assert_eq!(second[&PeerId(1)], first[&PeerId(1)]);
        // The error marker came out of the cache the second time.
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(enricher.cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_yields_empty_output() {
        let (enricher, transport, limiter) = enricher(10);
        let out = enricher.resolve_many(&BTreeSet::new()).await;
        assert!(out.is_empty());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
        assert_eq!(limiter.in_window().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_is_paid_per_chunk_not_per_id() {
        let (enricher, transport, limiter) = enricher(10);

        let out = enricher.resolve_many(&ids(0..25)).await;

        assert_eq!(out.len(), 25);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 25);
        // 25 uncached ids at chunk size 10 is three fan-out rounds, and the
        // limiter records exactly one admission per round.
        assert_eq!(limiter.in_window().await, 3);
    }
}
