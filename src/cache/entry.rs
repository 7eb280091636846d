//! Cache Entry Module
//!
//! Defines the structure for individual memoized results with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single memoized value and its timing metadata.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the value was computed and written
    pub inserted_at: Instant,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry written at `now` with optional TTL.
    ///
    /// A TTL too large to represent as an `Instant` never expires.
    pub fn new(value: V, now: Instant, ttl: Option<Duration>) -> Self {
        Self {
            value,
            inserted_at: now,
            expires_at: ttl.and_then(|ttl| now.checked_add(ttl)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`, so a
    /// read performed exactly `ttl` after insertion is a miss.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Age ==
    /// Time elapsed since the entry was written.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.inserted_at)
    }

    // == Time To Live ==
    /// Returns remaining TTL, or None if no expiration is set.
    ///
    /// `Some(Duration::ZERO)` once expired.
    pub fn ttl_remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(now))
    }
}
