//! Memo of searches known to return nothing.
//!
//! Two independent pools, one per case-sensitivity mode, each a bounded FIFO
//! of search strings. A pool hit lets the service answer "not found" without
//! a store round-trip. Pools are guarded separately so a miss in one mode
//! never waits on the other.
//!
//! Reads tolerate staleness: a false negative only costs one redundant query.

use std::collections::{HashSet, VecDeque};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Default pool capacity (entries per case mode).
pub const DEFAULT_CAPACITY: usize = 1_000_000;

/// What to do when a pool is full and a new entry arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Drop the single oldest entry.
    #[default]
    EvictOldest,
    /// Empty the whole pool.
    Reset,
}

impl std::str::FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "evict_oldest" | "evict-oldest" | "fifo" => Ok(Self::EvictOldest),
            "reset" => Ok(Self::Reset),
            other => Err(format!(
                "invalid overflow policy {other} (expected evict_oldest|reset)"
            )),
        }
    }
}

/// Counters for monitoring the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NegativeCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub recorded: u64,
    pub evicted: u64,
    pub resets: u64,
}

impl NegativeCacheStats {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct Pool {
    order: VecDeque<String>,
    members: HashSet<String>,
}

impl Pool {
    fn len(&self) -> usize {
        self.order.len()
    }

    fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}

/// Bounded negative-result cache, shared by reference across requests.
#[derive(Debug)]
pub struct NegativeCache {
    case_sensitive: Mutex<Pool>,
    case_insensitive: Mutex<Pool>,
    capacity: usize,
    policy: OverflowPolicy,
    stats: Mutex<NegativeCacheStats>,
}

impl Default for NegativeCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, OverflowPolicy::default())
    }
}

impl NegativeCache {
    /// A capacity of zero disables recording.
    #[must_use]
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            case_sensitive: Mutex::new(Pool::default()),
            case_insensitive: Mutex::new(Pool::default()),
            capacity,
            policy,
            stats: Mutex::new(NegativeCacheStats::default()),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(0, OverflowPolicy::default())
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    fn pool(&self, case_sensitive: bool) -> &Mutex<Pool> {
        if case_sensitive {
            &self.case_sensitive
        } else {
            &self.case_insensitive
        }
    }

    /// Is `searchable` a known-empty search in the given mode?
    pub fn contains(&self, searchable: &str, case_sensitive: bool) -> bool {
        let hit = self.pool(case_sensitive).lock().members.contains(searchable);
        let mut stats = self.stats.lock();
        if hit {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        hit
    }

    /// Remember that `searchable` returned nothing in the given mode.
    ///
    /// Append and eviction happen under one lock, so concurrent misses never
    /// evict twice for one insert or lose an entry.
    pub fn record(&self, searchable: &str, case_sensitive: bool) {
        if self.capacity == 0 {
            return;
        }

        let mut evicted = 0;
        let mut reset = false;
        {
            let mut pool = self.pool(case_sensitive).lock();
            if pool.members.contains(searchable) {
                return;
            }
            if pool.len() >= self.capacity {
                match self.policy {
                    OverflowPolicy::EvictOldest => {
                        if let Some(oldest) = pool.order.pop_front() {
                            pool.members.remove(&oldest);
                            evicted = 1;
                        }
                    }
                    OverflowPolicy::Reset => {
                        evicted = pool.len();
                        pool.clear();
                        reset = true;
                    }
                }
            }
            pool.order.push_back(searchable.to_string());
            pool.members.insert(searchable.to_string());
        }

        let mut stats = self.stats.lock();
        stats.recorded += 1;
        stats.evicted += evicted as u64;
        if reset {
            stats.resets += 1;
        }
    }

    /// Entries held per pool: `(case_sensitive, case_insensitive)`.
    pub fn sizes(&self) -> (usize, usize) {
        (
            self.case_sensitive.lock().len(),
            self.case_insensitive.lock().len(),
        )
    }

    pub fn stats(&self) -> NegativeCacheStats {
        self.stats.lock().clone()
    }
}
