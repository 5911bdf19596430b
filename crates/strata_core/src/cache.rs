//! # Tile Cache
//!
//! Bounded, thread-safe LRU memo of generated tiles.
//!
//! The cache is never authoritative: every tile can be regenerated
//! bit-identically, so eviction only costs time.
//!
//! ## Concurrency
//!
//! One `parking_lot::Mutex` guards the LRU list; statistics are atomics so
//! reading them never takes the lock. Generation happens outside the lock.
//! When two threads miss on the same key, both generate and the first
//! [`TileCache::insert`] wins.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::layer::ChunkKey;
use crate::tile::FieldTile;

/// Cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found a tile.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Tiles dropped to stay within capacity.
    pub evictions: u64,
    /// Inserts discarded because the key was already present.
    pub duplicates: u64,
    /// Tiles currently resident.
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups that hit, 0 when nothing was looked up.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of `Arc<FieldTile>` keyed by [`ChunkKey`].
pub struct TileCache {
    entries: Mutex<LruCache<ChunkKey, Arc<FieldTile>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    duplicates: AtomicU64,
}

impl TileCache {
    /// Creates a cache holding at most `capacity` tiles.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
        }
    }

    /// Looks up a tile and marks it most recently used.
    pub fn get(&self, key: &ChunkKey) -> Option<Arc<FieldTile>> {
        let found = self.entries.lock().get(key).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("cache hit {}", key);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Stores a tile, replacing any previous one for the key.
    pub fn put(&self, key: ChunkKey, tile: Arc<FieldTile>) {
        let displaced = self.entries.lock().push(key.clone(), tile);
        if let Some((old_key, _)) = displaced {
            if old_key != key {
                self.record_eviction(&old_key);
            }
        }
    }

    /// Stores a tile unless one is already present, and returns the stored tile.
    ///
    /// The first writer for a key wins; later tiles are dropped.
    pub fn insert(&self, key: ChunkKey, tile: Arc<FieldTile>) -> Arc<FieldTile> {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&key) {
            let existing = Arc::clone(existing);
            drop(entries);
            self.duplicates.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("discarding duplicate tile for {}", key);
            return existing;
        }
        let displaced = entries.push(key, Arc::clone(&tile));
        drop(entries);
        if let Some((old_key, _)) = displaced {
            self.record_eviction(&old_key);
        }
        tile
    }

    /// Drops a tile. Returns it if it was resident.
    pub fn remove(&self, key: &ChunkKey) -> Option<Arc<FieldTile>> {
        self.entries.lock().pop(key)
    }

    /// Returns true if a tile is resident, without touching recency.
    #[must_use]
    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.entries.lock().contains(key)
    }

    /// Number of resident tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if no tile is resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Maximum number of resident tiles.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Drops every tile. Counters are kept.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    fn record_eviction(&self, key: &ChunkKey) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("evicted {}", key);
    }
}

impl std::fmt::Debug for TileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileCache")
            .field("stats", &self.stats())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CellPos;
    use crate::tile::ElementKind;

    fn tile(value: f32) -> Arc<FieldTile> {
        Arc::new(FieldTile::filled(2, 2, ElementKind::Float32, CellPos::default(), value))
    }

    fn cache(capacity: usize) -> TileCache {
        TileCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn test_get_after_put() {
        let cache = cache(4);
        let key = ChunkKey::new("elevation", 0, 0, 0);
        assert!(cache.get(&key).is_none());
        cache.put(key.clone(), tile(1.0));
        assert_eq!(cache.get(&key).unwrap().get(0, 0).unwrap(), 1.0);

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
        assert!((stats.hit_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_lru_eviction_order() {
        let cache = cache(2);
        let a = ChunkKey::new("l", 0, 0, 0);
        let b = ChunkKey::new("l", 1, 0, 0);
        let c = ChunkKey::new("l", 2, 0, 0);
        cache.put(a.clone(), tile(0.0));
        cache.put(b.clone(), tile(1.0));
        // Touch `a` so `b` is least recently used.
        assert!(cache.get(&a).is_some());
        cache.put(c.clone(), tile(2.0));

        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity(), 2);
    }

    #[test]
    fn test_insert_first_writer_wins() {
        let cache = cache(4);
        let key = ChunkKey::new("elevation", 3, 3, 0);
        let first = cache.insert(key.clone(), tile(1.0));
        let second = cache.insert(key.clone(), tile(2.0));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.get(1, 1).unwrap(), 1.0);
        assert_eq!(cache.stats().duplicates, 1);
    }

    #[test]
    fn test_put_overwrites_without_eviction() {
        let cache = cache(4);
        let key = ChunkKey::new("elevation", 0, 0, 0);
        cache.put(key.clone(), tile(1.0));
        cache.put(key.clone(), tile(2.0));
        assert_eq!(cache.get(&key).unwrap().get(0, 0).unwrap(), 2.0);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = cache(4);
        let key = ChunkKey::new("elevation", 0, 0, 0);
        cache.put(key.clone(), tile(1.0));
        cache.put(ChunkKey::new("elevation", 0, 1, 0), tile(1.0));
        assert!(cache.remove(&key).is_some());
        assert!(cache.remove(&key).is_none());
        cache.clear();
        assert!(cache.is_empty());
    }
}
