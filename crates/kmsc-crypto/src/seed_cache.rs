//! In-memory cache of derived seeds, keyed by handle.
//!
//! Lets an application re-derive a controller identity within the process
//! lifetime without re-supplying the secret. The cache is an optimization,
//! not a source of truth: a miss (never cached, cleared, or evicted) means
//! "re-derive from the secret", never an error.
//!
//! # Semantics
//!
//! - Bounded by `max_entries`; inserting a new handle at capacity evicts the
//!   least recently used entry. `get` refreshes recency.
//! - Concurrent `set`/`get`/`delete` on one handle are last-write-wins.
//! - Inserts are serialized so the bound holds under concurrent writers.
//! - Seeds are zeroized when an entry is dropped.
//! - Constructed explicitly and shared through `Arc`; there is no global.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use kmsc_core::Handle;
use parking_lot::Mutex;

use crate::seed::Seed;

// =============================================================================
// Configuration
// =============================================================================

/// Default capacity of a seed cache.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Configuration for the seed cache.
#[derive(Debug, Clone)]
pub struct SeedCacheConfig {
    /// Maximum number of cached seeds. `0` disables caching entirely.
    pub max_entries: usize,
}

impl Default for SeedCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl SeedCacheConfig {
    /// Load configuration from the environment.
    ///
    /// - `KMSC_SEED_CACHE_MAX_ENTRIES` (default: 100)
    pub fn from_env() -> Self {
        Self {
            max_entries: std::env::var("KMSC_SEED_CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_ENTRIES),
        }
    }
}

// =============================================================================
// Cache statistics
// =============================================================================

#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub evictions: u64,
}

// =============================================================================
// Seed cache
// =============================================================================

struct CachedSeed {
    seed: Seed,
    /// Logical clock value of the last insert or hit.
    last_used: u64,
}

/// Bounded LRU cache from [`Handle`] to [`Seed`].
pub struct SeedCache {
    entries: DashMap<Handle, CachedSeed>,
    /// Held across the capacity check, eviction and insert of `set`.
    insert_lock: Mutex<()>,
    clock: AtomicU64,
    config: SeedCacheConfig,
    stats: CacheStats,
}

impl SeedCache {
    /// Create a cache with the given configuration.
    pub fn new(config: SeedCacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            insert_lock: Mutex::new(()),
            clock: AtomicU64::new(0),
            config,
            stats: CacheStats::default(),
        }
    }

    /// Create a cache holding at most `max_entries` seeds.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self::new(SeedCacheConfig { max_entries })
    }

    /// Look up the seed cached for `handle`.
    pub fn get(&self, handle: &Handle) -> Option<Seed> {
        match self.entries.get_mut(handle) {
            Some(mut entry) => {
                entry.last_used = self.tick();
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(handle = %handle, "seed cache hit");
                Some(entry.seed.clone())
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(handle = %handle, "seed cache miss");
                None
            }
        }
    }

    /// Store `seed` under `handle`, replacing any previous value.
    pub fn set(&self, handle: Handle, seed: Seed) {
        if self.config.max_entries == 0 {
            return;
        }
        let _guard = self.insert_lock.lock();
        if !self.entries.contains_key(&handle) {
            while self.entries.len() >= self.config.max_entries {
                if !self.evict_lru() {
                    break;
                }
            }
        }
        let last_used = self.tick();
        self.entries.insert(handle, CachedSeed { seed, last_used });
        self.stats.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Remove the seed cached for `handle`. Returns true if one was removed.
    pub fn delete(&self, handle: &Handle) -> bool {
        self.entries.remove(handle).is_some()
    }

    /// True if a seed is cached for `handle` (does not refresh recency).
    pub fn contains(&self, handle: &Handle) -> bool {
        self.entries.contains_key(handle)
    }

    /// Number of cached seeds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity.
    pub fn max_entries(&self) -> usize {
        self.config.max_entries
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Evict the least recently used entry. False if the cache was empty.
    fn evict_lru(&self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|e| e.last_used)
            .map(|e| e.key().clone());

        let Some(handle) = oldest else {
            return false;
        };
        if self.entries.remove(&handle).is_some() {
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(handle = %handle, "seed cache evicted least recently used entry");
        }
        true
    }
}

impl Default for SeedCache {
    fn default() -> Self {
        Self::new(SeedCacheConfig::default())
    }
}

impl std::fmt::Debug for SeedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedCache")
            .field("len", &self.entries.len())
            .field("max_entries", &self.config.max_entries)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
