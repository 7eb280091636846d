//! Memo Cache Module
//!
//! Main memoization engine combining HashMap storage with insertion-order
//! tracking, FIFO capacity eviction and lazy TTL expiry.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::entry::CacheEntry;
use crate::cache::order::InsertionOrder;
use crate::cache::CacheStats;

// == Cache State ==
/// Everything guarded by the cache lock.
#[derive(Debug)]
struct CacheState<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Insertion order, oldest first
    order: InsertionOrder<K>,
    /// Keys whose computation is running outside the lock
    in_flight: HashSet<K>,
    /// Performance statistics
    stats: CacheStats,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    // == Lazy Sweep ==
    /// Drops expired entries from the oldest end, stopping at the first live one.
    ///
    /// TTL is fixed per cache, so expiry order equals insertion order.
    fn sweep_expired(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        while let Some(oldest) = self.order.peek_oldest() {
            let expired = self
                .entries
                .get(oldest)
                .map_or(true, |entry| entry.is_expired(now));
            if !expired {
                break;
            }
            if let Some(key) = self.order.pop_oldest() {
                if self.entries.remove(&key).is_some() {
                    self.stats.record_expiration();
                    removed += 1;
                }
            }
        }
        removed
    }

    // == Evict Oldest ==
    /// Removes the oldest-inserted entry. Returns the evicted key.
    fn evict_oldest(&mut self) -> Option<K> {
        let key = self.order.pop_oldest()?;
        self.entries.remove(&key);
        self.stats.record_eviction();
        Some(key)
    }

    fn remove(&mut self, key: &K) {
        self.entries.remove(key);
        self.order.remove(key);
    }
}

// == Memo Cache ==
/// Keyed, time-and-size-bounded cache around a fallible computation.
///
/// - `capacity`: at most this many entries are held; inserting past it evicts
///   the oldest insertion (FIFO, reads do not refresh position).
/// - `ttl`: entries stop being returned once `ttl` has elapsed since they were
///   written and are removed by the next access.
///
/// The lock only guards bookkeeping. Computations run outside it, so misses on
/// different keys proceed in parallel and a computation may call back into the
/// same cache for another key. Callers missing on a key that is already being
/// computed wait for that result instead of computing it again.
pub struct MemoCache<K, V> {
    state: Mutex<CacheState<K, V>>,
    /// Signalled whenever an in-flight computation finishes
    settled: Condvar,
    capacity: Option<usize>,
    ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
}

/// Clears a key's in-flight marker when its computation ends, including by
/// panic, and wakes any callers waiting on it.
struct InFlight<'a, K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone + Debug,
{
    cache: &'a MemoCache<K, V>,
    key: K,
}

impl<K, V> Drop for InFlight<'_, K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone + Debug,
{
    fn drop(&mut self) {
        self.cache.lock().in_flight.remove(&self.key);
        self.cache.settled.notify_all();
    }
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone + Debug,
{
    // == Constructor ==
    /// Creates a new cache. `Some(0)` and a zero TTL mean "unbounded".
    pub fn new(capacity: Option<usize>, ttl: Option<Duration>) -> Self {
        Self::with_clock(capacity, ttl, SystemClock)
    }

    /// Creates a cache from the numeric knobs used in configuration:
    /// `0` entries = unbounded, `0` seconds = no expiry.
    pub fn from_limits(max_entries: usize, max_age_secs: u64) -> Self {
        Self::new(Some(max_entries), Some(Duration::from_secs(max_age_secs)))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(
        capacity: Option<usize>,
        ttl: Option<Duration>,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                order: InsertionOrder::new(),
                in_flight: HashSet::new(),
                stats: CacheStats::new(),
            }),
            settled: Condvar::new(),
            capacity: capacity.filter(|&c| c > 0),
            ttl: ttl.filter(|t| !t.is_zero()),
            clock: Arc::new(clock),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<K, V>> {
        // No computation runs under the lock and every critical section leaves
        // the state consistent, so a poisoned lock is safe to reuse.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Get Or Compute ==
    /// Returns the cached value for `key`, or runs `compute` and caches its
    /// result.
    ///
    /// `compute` is invoked at most once, only on a miss, and without holding
    /// the cache lock. If it fails the error is returned unchanged and nothing
    /// is written, so the next call with the same key computes again.
    ///
    /// `compute` may use this cache for other keys, but must not ask for
    /// `key` itself: that call would wait on its own computation forever.
    pub fn get_or_compute<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let mut guard = self.lock();
        loop {
            let state = &mut *guard;
            let now = self.clock.now();

            if self.ttl.is_some() {
                let removed = state.sweep_expired(now);
                if removed > 0 {
                    debug!("Lazy sweep: removed {} expired entries", removed);
                }
            }

            if let Some(entry) = state.entries.get(&key) {
                if !entry.is_expired(now) {
                    debug!(
                        "Found cached result for {:?} (age {:?}, ttl remaining {:?})",
                        key,
                        entry.age(now),
                        entry.ttl_remaining(now)
                    );
                    let value = entry.value.clone();
                    state.stats.record_hit();
                    return Ok(value);
                }
                state.remove(&key);
                state.stats.record_expiration();
            }

            if !state.in_flight.contains(&key) {
                break;
            }
            debug!("Waiting for in-flight computation of {:?}", key);
            guard = self
                .settled
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }

        guard.stats.record_miss();
        guard.in_flight.insert(key.clone());
        drop(guard);

        let marker = InFlight {
            cache: self,
            key: key.clone(),
        };
        let value = compute()?;
        debug!("No cached result, writing through: {:?}: {:?}", key, value);

        {
            let mut state = self.lock();
            let written_at = self.clock.now();
            state
                .entries
                .insert(key.clone(), CacheEntry::new(value.clone(), written_at, self.ttl));
            state.order.push(key);

            if let Some(capacity) = self.capacity {
                while state.entries.len() > capacity {
                    match state.evict_oldest() {
                        Some(evicted) => debug!("Evicted oldest entry {:?}", evicted),
                        None => break,
                    }
                }
            }

            let total = state.entries.len();
            state.stats.set_total_entries(total);
        }
        drop(marker);

        Ok(value)
    }

    // == Contains ==
    /// Returns true if `key` is present and unexpired. Does not sweep.
    pub fn contains(&self, key: &K) -> bool {
        let now = self.clock.now();
        self.lock()
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}
