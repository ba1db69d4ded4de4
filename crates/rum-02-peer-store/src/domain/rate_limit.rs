//! # Leaky Bucket Rate Limiter
//!
//! One bucket per key. Each `add` consumes remaining capacity; capacity
//! refills continuously at `rate` units per second up to `capacity`.
//! Refill is computed lazily from the elapsed time on each access.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::adapters::SystemClock;
use crate::domain::config::RateLimitConfig;
use crate::ports::outbound::Clock;

#[derive(Debug, Clone)]
struct LeakyBucket {
    remaining: f64,
    last_refill: Instant,
    last_access: Instant,
}

impl LeakyBucket {
    fn full(capacity: u64, now: Instant) -> Self {
        Self {
            remaining: capacity as f64,
            last_refill: now,
            last_access: now,
        }
    }

    fn refilled(&self, rate: f64, capacity: u64, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        (self.remaining + elapsed * rate).min(capacity as f64)
    }
}

/// Per-peer leaky buckets keyed by peer id string.
pub struct LeakyBucketCollector {
    buckets: DashMap<String, LeakyBucket>,
    rate: f64,
    capacity: u64,
    clock: Arc<dyn Clock>,
}

impl LeakyBucketCollector {
    pub fn new(rate: f64, capacity: u64) -> Self {
        Self {
            buckets: DashMap::new(),
            rate,
            capacity,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.blocks_per_second as f64, config.capacity())
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Consume up to `units`; returns how many were accepted.
    pub fn add(&self, key: &str, units: u64) -> u64 {
        let now = self.clock.now();
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| LeakyBucket::full(self.capacity, now));

        let available = bucket.refilled(self.rate, self.capacity, now);
        let accepted = units.min(available.floor() as u64);
        bucket.remaining = available - accepted as f64;
        bucket.last_refill = now;
        bucket.last_access = now;
        accepted
    }

    /// Whole units left; full capacity for unseen keys.
    pub fn remaining(&self, key: &str) -> u64 {
        let now = self.clock.now();
        match self.buckets.get(key) {
            Some(bucket) => bucket.refilled(self.rate, self.capacity, now).floor() as u64,
            None => self.capacity,
        }
    }

    /// Drop buckets not touched for `max_idle`. Returns the count removed.
    pub fn cleanup(&self, max_idle: Duration) -> usize {
        let now = self.clock.now();
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_access) <= max_idle);
        let removed = before - self.buckets.len();
        if removed > 0 {
            tracing::debug!("[rum-02] removed {} idle rate limit buckets", removed);
        }
        removed
    }
}
