use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Window the occupancy check looks back over.
const WINDOW: Duration = Duration::from_secs(60);
/// Hard cap on remembered timestamps; oldest are evicted first.
const WINDOW_CAP: usize = 100;

const DELAY_HOT: Duration = Duration::from_millis(800);
const DELAY_WARM: Duration = Duration::from_millis(300);
const DELAY_COLD: Duration = Duration::from_millis(50);

const OCCUPANCY_HOT: usize = 90;
const OCCUPANCY_WARM: usize = 60;

/// Adaptive pacing over a sliding 60-second window of recent requests.
///
/// `admit` never fails and never busy-waits; it sleeps for a duration scaled
/// to how busy the last minute was, then records the request. Entries are
/// purged lazily at the start of each call, never eagerly.
#[derive(Debug, Default)]
pub struct RateLimiter {
    window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay the caller according to current window occupancy, then record
    /// the current timestamp into the window.
    pub async fn admit(&self) {
        let delay = {
            let mut window = self.window.lock().await;
            let now = Instant::now();
            while window
                .front()
                .is_some_and(|t| now.duration_since(*t) > WINDOW)
            {
                window.pop_front();
            }
            delay_for(window.len())
        };

        sleep(delay).await;

        let mut window = self.window.lock().await;
        if window.len() == WINDOW_CAP {
            window.pop_front();
        }
        window.push_back(Instant::now());
    }

    /// Current window occupancy (post-eviction occupancy is only computed on
    /// `admit`; this reads the raw count, which is enough for progress logs
    /// and tests).
    pub async fn in_window(&self) -> usize {
        self.window.lock().await.len()
    }
}

fn delay_for(occupancy: usize) -> Duration {
    if occupancy > OCCUPANCY_HOT {
        DELAY_HOT
    } else if occupancy > OCCUPANCY_WARM {
        DELAY_WARM
    } else {
        DELAY_COLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_tiers_match_occupancy_thresholds() {
        assert_eq!(delay_for(0), DELAY_COLD);
        assert_eq!(delay_for(60), DELAY_COLD);
        assert_eq!(delay_for(61), DELAY_WARM);
        assert_eq!(delay_for(90), DELAY_WARM);
        assert_eq!(delay_for(91), DELAY_HOT);
    }

    #[tokio::test(start_paused = true)]
    async fn admit_records_one_timestamp_per_call() {
        let limiter = RateLimiter::new();
        for _ in 0..5 {
            limiter.admit().await;
        }
        assert_eq!(limiter.in_window().await, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_older_than_the_window_are_evicted_on_admit() {
        let limiter = RateLimiter::new();
        limiter.admit().await;
        limiter.admit().await;
        assert_eq!(limiter.in_window().await, 2);

        tokio::time::advance(Duration::from_secs(61)).await;
        limiter.admit().await;
        // The two stale entries were purged before the new one was recorded.
        assert_eq!(limiter.in_window().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn window_never_exceeds_the_cap() {
        let limiter = RateLimiter::new();
        for _ in 0..WINDOW_CAP + 10 {
            limiter.admit().await;
        }
        assert_eq!(limiter.in_window().await, WINDOW_CAP);
    }

    #[tokio::test(start_paused = true)]
    async fn busy_window_slows_admission() {
        let limiter = RateLimiter::new();
        for _ in 0..OCCUPANCY_WARM + 1 {
            limiter.admit().await;
        }

        let before = Instant::now();
        limiter.admit().await;
        // 61 entries in the window puts us in the middle tier.
        assert_eq!(before.elapsed(), DELAY_WARM);
    }
}
