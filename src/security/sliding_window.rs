//! Sliding window rate limiter.
//!
//! Records the instant of every admission and only admits a new event when
//! fewer than `limit` admissions fall inside the trailing window. Unlike a
//! fixed bucket, a burst of `2 * limit` can never straddle a window edge.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// A single sliding-window counter.
///
/// Purge, check and append happen under one lock, so concurrent callers can
/// never both take the last slot.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    /// Maximum admissions per window.
    limit: u32,

    /// Window duration.
    window: Duration,

    /// Admission instants, oldest first.
    timestamps: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            timestamps: Mutex::new(VecDeque::with_capacity(limit.min(1024) as usize)),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Try to take one slot now.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Try to take one slot at `now`. Denial has no side effect.
    pub fn try_acquire_at(&self, now: Instant) -> bool {
        let mut timestamps = self.purged(now);

        if timestamps.len() < self.limit as usize {
            timestamps.push_back(now);
            true
        } else {
            false
        }
    }

    /// Slots left in the current window. Never admits.
    pub fn remaining(&self) -> u32 {
        self.remaining_at(Instant::now())
    }

    pub fn remaining_at(&self, now: Instant) -> u32 {
        let timestamps = self.purged(now);
        self.limit.saturating_sub(timestamps.len() as u32)
    }

    /// Time until a slot frees up; zero when one is available.
    pub fn retry_after(&self) -> Duration {
        self.retry_after_at(Instant::now())
    }

    pub fn retry_after_at(&self, now: Instant) -> Duration {
        let timestamps = self.purged(now);

        if timestamps.len() < self.limit as usize {
            return Duration::ZERO;
        }

        // The oldest admission leaves the window first.
        match timestamps.front() {
            Some(oldest) => match oldest.checked_add(self.window) {
                Some(frees_at) => frees_at.saturating_duration_since(now),
                None => self.window,
            },
            None => Duration::ZERO,
        }
    }

    /// Lock the queue and drop every instant older than `now - window`.
    fn purged(&self, now: Instant) -> MutexGuard<'_, VecDeque<Instant>> {
        let mut timestamps = self
            .timestamps
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(cutoff) = now.checked_sub(self.window) {
            while let Some(front) = timestamps.front() {
                if *front < cutoff {
                    timestamps.pop_front();
                } else {
                    break;
                }
            }
        }

        timestamps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_admits_up_to_limit_then_denies() {
        let limiter = SlidingWindowLimiter::new(5, Duration::from_secs(60));
        let now = Instant::now();

        for _ in 0..5 {
            assert!(limiter.try_acquire_at(now));
        }
        assert!(!limiter.try_acquire_at(now));
        assert_eq!(limiter.remaining_at(now), 0);
    }

    #[test]
    fn test_window_slides_past_oldest_admission() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(1));
        let t0 = Instant::now();

        assert!(limiter.try_acquire_at(t0));
        assert!(limiter.try_acquire_at(t0 + Duration::from_millis(100)));
        assert!(!limiter.try_acquire_at(t0 + Duration::from_millis(200)));
        // t=0 has left the window, t=100ms has not.
        assert!(limiter.try_acquire_at(t0 + Duration::from_millis(1050)));
        assert!(!limiter.try_acquire_at(t0 + Duration::from_millis(1060)));
    }

    #[test]
    fn test_denial_does_not_record() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(1));
        let t0 = Instant::now();

        assert!(limiter.try_acquire_at(t0));
        for ms in [100, 200, 300] {
            assert!(!limiter.try_acquire_at(t0 + Duration::from_millis(ms)));
        }
        // Had denials been recorded, the window would still be full here.
        assert!(limiter.try_acquire_at(t0 + Duration::from_millis(1001)));
    }

    #[test]
    fn test_remaining_is_idempotent() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(10));
        let now = Instant::now();
        assert!(limiter.try_acquire_at(now));

        for _ in 0..10 {
            assert_eq!(limiter.remaining_at(now), 2);
        }
        assert!(limiter.try_acquire_at(now));
        assert!(limiter.try_acquire_at(now));
        assert!(!limiter.try_acquire_at(now));
    }

    #[test]
    fn test_remaining_recovers_after_window() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(1));
        let t0 = Instant::now();
        limiter.try_acquire_at(t0);
        limiter.try_acquire_at(t0);

        assert_eq!(limiter.remaining_at(t0 + Duration::from_millis(500)), 0);
        assert_eq!(limiter.remaining_at(t0 + Duration::from_millis(1001)), 2);
    }

    #[test]
    fn test_retry_after_tracks_oldest_entry() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(1));
        let t0 = Instant::now();

        assert_eq!(limiter.retry_after_at(t0), Duration::ZERO);
        limiter.try_acquire_at(t0);
        limiter.try_acquire_at(t0 + Duration::from_millis(400));

        assert_eq!(
            limiter.retry_after_at(t0 + Duration::from_millis(600)),
            Duration::from_millis(400)
        );
    }

    #[test]
    fn test_retry_after_with_unbounded_window() {
        let limiter = SlidingWindowLimiter::new(1, Duration::MAX);
        let t0 = Instant::now();

        assert!(limiter.try_acquire_at(t0));
        assert!(!limiter.try_acquire_at(t0 + Duration::from_secs(1)));
        assert_eq!(limiter.retry_after_at(t0 + Duration::from_secs(1)), Duration::MAX);
    }

    #[test]
    fn test_concurrent_acquire_admits_exactly_limit() {
        const LIMIT: u32 = 25;
        const THREADS: u32 = 64;

        let limiter = Arc::new(SlidingWindowLimiter::new(LIMIT, Duration::from_secs(3600)));
        let admitted = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let limiter = limiter.clone();
                let admitted = admitted.clone();
                std::thread::spawn(move || {
                    if limiter.try_acquire() {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), LIMIT);
        assert_eq!(limiter.remaining(), 0);
    }

    #[test]
    fn test_concurrent_acquire_below_limit_admits_all() {
        let limiter = Arc::new(SlidingWindowLimiter::new(100, Duration::from_secs(3600)));

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || limiter.try_acquire())
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(admitted, 40);
        assert_eq!(limiter.remaining(), 60);
    }
}
