//! # World Engine
//!
//! Registry of layers plus the cache-checked dispatch that serves tiles and
//! single cells.
//!
//! ## Request flow
//!
//! ```text
//! get_cell(x, y, id)
//!   -> bounds check (outside world => None)
//!   -> WorldConfig::local_index
//!   -> get_chunk(id, cx, cy, 0)
//!        -> cache hit?            => shared tile
//!        -> push onto this thread's generation stack (cycle guard)
//!        -> Layer::generate_chunk (may call back into the engine)
//!        -> footprint check
//!        -> TileCache::insert     => first writer wins
//! ```
//!
//! The engine is `Send + Sync`. Layers run on the caller's thread; nothing
//! here spawns threads except [`WorldEngine::prime`].

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread::ThreadId;
use std::time::Instant;

use parking_lot::Mutex;

use crate::cache::{CacheStats, TileCache};
use crate::config::WorldConfig;
use crate::coords::ChunkCoord;
use crate::error::{GenError, GenResult};
use crate::layer::{ChunkKey, Layer};
use crate::seed::{SeedStream, WorldSeed};
use crate::tile::FieldTile;

/// Builder for [`WorldEngine`].
///
/// Layers are registered in dependency order; a layer may only read layers
/// registered before it.
pub struct WorldEngineBuilder {
    config: WorldConfig,
    layers: Vec<Arc<dyn Layer>>,
}

impl WorldEngineBuilder {
    /// Registers a layer.
    #[must_use]
    pub fn layer(self, layer: impl Layer + 'static) -> Self {
        self.shared_layer(Arc::new(layer))
    }

    /// Registers an already shared layer.
    #[must_use]
    pub fn shared_layer(mut self, layer: Arc<dyn Layer>) -> Self {
        self.layers.push(layer);
        self
    }

    /// Validates the configuration and freezes the registry.
    ///
    /// # Errors
    ///
    /// [`GenError::Configuration`] for an invalid world config or a
    /// duplicate layer id.
    pub fn build(self) -> GenResult<WorldEngine> {
        self.config.validate()?;
        let capacity = NonZeroUsize::new(self.config.cache_capacity).ok_or_else(|| {
            GenError::Configuration("cache capacity must be positive".to_owned())
        })?;

        let mut layers: HashMap<Arc<str>, Arc<dyn Layer>> = HashMap::with_capacity(self.layers.len());
        let mut order = Vec::with_capacity(self.layers.len());
        for layer in self.layers {
            let id: Arc<str> = Arc::from(layer.id());
            if id.is_empty() {
                return Err(GenError::Configuration("layer id must not be empty".to_owned()));
            }
            if layers.contains_key(&id) {
                return Err(GenError::Configuration(format!("duplicate layer id '{id}'")));
            }
            order.push(Arc::clone(&id));
            layers.insert(id, layer);
        }

        tracing::info!(
            "World engine ready: {}x{} cells, seed {}, chunk {} (+{} halo), {} layer(s): {}",
            self.config.width,
            self.config.height,
            self.config.seed,
            self.config.chunk_size,
            self.config.chunk_overlap,
            order.len(),
            order.iter().map(|id| &**id).collect::<Vec<&str>>().join(", ")
        );

        Ok(WorldEngine {
            seed: WorldSeed::new(self.config.seed),
            config: self.config,
            layers,
            order,
            cache: TileCache::new(capacity),
            generating: Mutex::new(HashMap::new()),
        })
    }
}

/// The deterministic chunked generation engine.
pub struct WorldEngine {
    config: WorldConfig,
    seed: WorldSeed,
    layers: HashMap<Arc<str>, Arc<dyn Layer>>,
    order: Vec<Arc<str>>,
    cache: TileCache,
    /// Per-thread stack of keys currently being generated.
    generating: Mutex<HashMap<ThreadId, Vec<ChunkKey>>>,
}

impl WorldEngine {
    /// Starts building an engine for `config`.
    #[must_use]
    pub fn builder(config: WorldConfig) -> WorldEngineBuilder {
        WorldEngineBuilder {
            config,
            layers: Vec::new(),
        }
    }

    /// The world configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The master seed.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Opens the seed stream for a layer at a chunk.
    #[must_use]
    pub fn stream(&self, layer_id: &str, chunk: ChunkCoord) -> SeedStream {
        self.seed.stream(layer_id, chunk.x, chunk.y)
    }

    /// Looks up a registered layer.
    #[must_use]
    pub fn layer(&self, layer_id: &str) -> Option<Arc<dyn Layer>> {
        self.layers.get(layer_id).cloned()
    }

    /// Registered layer ids in registration order.
    #[must_use]
    pub fn layer_ids(&self) -> Vec<&str> {
        self.order.iter().map(|id| &**id).collect()
    }

    /// Returns true if a layer with this id is registered.
    #[must_use]
    pub fn has_layer(&self, layer_id: &str) -> bool {
        self.layers.contains_key(layer_id)
    }

    /// Returns the tile of `layer_id` for a chunk, generating it on a miss.
    ///
    /// # Errors
    ///
    /// - [`GenError::UnknownLayer`] if the id is not registered.
    /// - [`GenError::CyclicDependency`] if the layer is already being
    ///   generated further up this thread's call chain.
    /// - [`GenError::TileShape`] if the layer returns a tile of the wrong size.
    /// - [`GenError::TileKind`] if the tile's element type is not the one the
    ///   layer declares.
    /// - Anything the layer itself returns.
    pub fn get_chunk(
        &self,
        layer_id: &str,
        chunk_x: i32,
        chunk_y: i32,
        lod: u8,
    ) -> GenResult<Arc<FieldTile>> {
        let (id, layer) = self
            .layers
            .get_key_value(layer_id)
            .ok_or_else(|| GenError::UnknownLayer(layer_id.to_owned()))?;
        let key = ChunkKey::new(Arc::clone(id), chunk_x, chunk_y, lod);

        if let Some(tile) = self.cache.get(&key) {
            return Ok(tile);
        }

        let _guard = self.enter(&key)?;
        let started = Instant::now();
        let tile = layer.generate_chunk(self, key.chunk(), lod)?;

        let expected = self.config.tile_extent();
        if tile.width() != expected || tile.height() != expected {
            return Err(GenError::TileShape {
                layer: layer_id.to_owned(),
                expected,
                actual_width: tile.width(),
                actual_height: tile.height(),
            });
        }
        if tile.kind() != layer.element_kind() {
            return Err(GenError::TileKind {
                layer: layer_id.to_owned(),
                expected: layer.element_kind(),
                actual: tile.kind(),
            });
        }

        tracing::debug!("Generated {} in {:?}", key, started.elapsed());
        Ok(self.cache.insert(key, Arc::new(tile)))
    }

    /// Reads one cell of a layer at full resolution.
    ///
    /// Returns `Ok(None)` for cells outside `[0, width) x [0, height)`.
    ///
    /// # Errors
    ///
    /// [`GenError::UnknownLayer`] for an unregistered id (checked before
    /// bounds), plus anything [`Self::get_chunk`] returns.
    pub fn get_cell(&self, world_x: i64, world_y: i64, layer_id: &str) -> GenResult<Option<f32>> {
        if !self.has_layer(layer_id) {
            return Err(GenError::UnknownLayer(layer_id.to_owned()));
        }
        if !self.config.contains(world_x, world_y) {
            return Ok(None);
        }
        let (chunk, local_x, local_y) = self.config.local_index(world_x, world_y);
        let tile = self.get_chunk(layer_id, chunk.x, chunk.y, 0)?;
        tile.get(local_x, local_y).map(Some)
    }

    /// Generates full-resolution tiles for `chunks` on `workers` threads.
    ///
    /// Returns how many of the requested chunks are resident afterwards
    /// (fewer than requested if the cache is smaller than the batch).
    ///
    /// # Errors
    ///
    /// [`GenError::UnknownLayer`], or the first error any worker hit.
    pub fn prime(&self, layer_id: &str, chunks: &[ChunkCoord], workers: usize) -> GenResult<usize> {
        if !self.has_layer(layer_id) {
            return Err(GenError::UnknownLayer(layer_id.to_owned()));
        }
        let workers = workers.clamp(1, chunks.len().max(1));
        let started = Instant::now();

        let (sender, receiver) = crossbeam_channel::unbounded::<ChunkCoord>();
        for &chunk in chunks {
            // Receiver is alive until the end of this function.
            let _ = sender.send(chunk);
        }
        drop(sender);

        let first_error: Mutex<Option<GenError>> = Mutex::new(None);
        std::thread::scope(|scope| {
            for _ in 0..workers {
                let receiver = receiver.clone();
                let first_error = &first_error;
                scope.spawn(move || {
                    for chunk in receiver.iter() {
                        if first_error.lock().is_some() {
                            break;
                        }
                        if let Err(err) = self.get_chunk(layer_id, chunk.x, chunk.y, 0) {
                            let mut slot = first_error.lock();
                            if slot.is_none() {
                                *slot = Some(err);
                            }
                            break;
                        }
                    }
                });
            }
        });

        if let Some(err) = first_error.into_inner() {
            return Err(err);
        }

        let resident = chunks
            .iter()
            .filter(|chunk| self.cache.contains(&ChunkKey::new(layer_id, chunk.x, chunk.y, 0)))
            .count();
        tracing::info!(
            "Primed {}/{} '{}' chunks on {} worker(s) in {:?}",
            resident,
            chunks.len(),
            layer_id,
            workers,
            started.elapsed()
        );
        Ok(resident)
    }

    /// Cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drops one cached tile. Returns true if it was resident.
    pub fn evict(&self, layer_id: &str, chunk_x: i32, chunk_y: i32, lod: u8) -> bool {
        self.cache
            .remove(&ChunkKey::new(layer_id, chunk_x, chunk_y, lod))
            .is_some()
    }

    /// Drops every cached tile.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn enter(&self, key: &ChunkKey) -> GenResult<GenerationGuard<'_>> {
        let thread = std::thread::current().id();
        let mut generating = self.generating.lock();
        let stack = generating.entry(thread).or_default();

        if stack.iter().any(|pending| pending.layer == key.layer) {
            let chain = stack
                .iter()
                .chain(std::iter::once(key))
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");
            tracing::warn!("Cyclic layer dependency: {}", chain);
            return Err(GenError::CyclicDependency {
                layer: key.layer.to_string(),
                chain,
            });
        }

        stack.push(key.clone());
        Ok(GenerationGuard {
            generating: &self.generating,
            thread,
        })
    }
}

impl std::fmt::Debug for WorldEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldEngine")
            .field("config", &self.config)
            .field("layers", &self.layer_ids())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Pops the key pushed by [`WorldEngine::enter`], also on error paths.
struct GenerationGuard<'a> {
    generating: &'a Mutex<HashMap<ThreadId, Vec<ChunkKey>>>,
    thread: ThreadId,
}

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        let mut generating = self.generating.lock();
        if let Some(stack) = generating.get_mut(&self.thread) {
            stack.pop();
            if stack.is_empty() {
                generating.remove(&self.thread);
            }
        }
    }
}
