use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tracing::{error, info, warn};

use crate::cache::UserCache;
use crate::config::ScrapeConfig;
use crate::domain::{ChannelInfo, Statistics};
use crate::enrich::BatchEnricher;
use crate::ports::TransportClient;
use crate::process::EventProcessor;
use crate::ratelimit::RateLimiter;
use crate::report::Report;
use crate::resolve::UserResolver;
use crate::Result;

/// What a finished run looks like to the caller.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub channel: ChannelInfo,
    pub statistics: Statistics,
    pub cached_users: usize,
    pub report_path: PathBuf,
}

/// Drives one scrape run end to end.
///
/// All run-scoped state (identity cache, rate window, statistics) lives on
/// this object; nothing is process-global. One `Scraper` is one run — the
/// deletion log is a single-pass sequence and there is no resume.
pub struct Scraper {
    transport: Arc<dyn TransportClient>,
    cfg: ScrapeConfig,
    cache: Arc<UserCache>,
    limiter: Arc<RateLimiter>,
    processor: EventProcessor,
}

impl Scraper {
    pub fn new(transport: Arc<dyn TransportClient>, cfg: ScrapeConfig) -> Self {
        let cache = Arc::new(UserCache::new());
        let limiter = Arc::new(RateLimiter::new());
        let enricher = BatchEnricher::new(
            cache.clone(),
            UserResolver::new(transport.clone()),
            limiter.clone(),
            cfg.chunk_size,
        );
        Self {
            transport,
            cfg,
            cache,
            limiter,
            processor: EventProcessor::new(enricher),
        }
    }

    /// Run to completion and write the report.
    ///
    /// The transport is released on every exit path, exactly once. On a fatal
    /// error nothing is persisted: reporting is all-or-nothing.
    pub async fn run(&self) -> Result<RunSummary> {
        let outcome = self.run_inner().await;
        self.transport.disconnect().await;
        if let Err(e) = &outcome {
            error!(error = %e, "scrape failed");
        }
        outcome
    }

    async fn run_inner(&self) -> Result<RunSummary> {
        let channel = self.transport.channel_info().await?;
        info!(channel = %channel.title, id = channel.id, "target resolved");

        self.precache_participants().await;

        let mut log = self.transport.deletion_log().await?;
        let mut window = Vec::with_capacity(self.cfg.window_size);
        let mut messages = Vec::new();
        while let Some(event) = log.next().await? {
            window.push(event);
            if window.len() >= self.cfg.window_size {
                messages.extend(self.processor.process(&window).await);
                window.clear();
                info!(
                    processed = self.processor.stats().await.total,
                    "processed window"
                );
                self.limiter.admit().await;
            }
        }
        // The log is exhausted; a trailing partial window still counts.
        if !window.is_empty() {
            messages.extend(self.processor.process(&window).await);
        }

        let statistics = self.processor.stats().await;
        let report = Report::assemble(
            &channel,
            statistics.clone(),
            self.cache.snapshot().await,
            messages,
            Local::now(),
        );
        let cached_users = report.user_cache.len();
        let report_path = report.write_to(&self.cfg.output_dir)?;
        info!(path = %report_path.display(), "report written");

        Ok(RunSummary {
            channel,
            statistics,
            cached_users,
            report_path,
        })
    }

    /// Best effort: seed the identity cache from the participant listing so
    /// most lookups never leave the process. Any failure here is logged and
    /// the run proceeds with whatever was cached.
    async fn precache_participants(&self) {
        let mut feed = match self.transport.participants(self.cfg.participant_limit).await {
            Ok(feed) => feed,
            Err(e) => {
                warn!(error = %e, "participant listing unavailable, skipping pre-cache");
                return;
            }
        };

        let mut seeded = 0usize;
        loop {
            match feed.next().await {
                Ok(Some(user)) => {
                    self.cache.put(user.into()).await;
                    seeded += 1;
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, seeded, "participant pre-cache incomplete, continuing");
                    break;
                }
            }
        }
        info!(seeded, "participants pre-cached");
    }
}
