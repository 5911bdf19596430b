//! # Generation Error Types
//!
//! All errors that can occur while configuring the engine or generating chunks.
//!
//! Reading a cell outside the world is NOT an error: `get_cell` returns
//! `Ok(None)` for it.

use thiserror::Error;

use crate::tile::ElementKind;

/// Errors that can occur in the generation engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenError {
    /// Malformed or out-of-range world or layer parameters.
    ///
    /// Raised at engine construction, never during generation.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Tile index outside the tile buffer.
    ///
    /// Always a bug in the caller's coordinate math.
    #[error("tile index ({x}, {y}) out of range for {width}x{height} tile")]
    OutOfRange {
        /// Requested local X.
        x: i64,
        /// Requested local Y.
        y: i64,
        /// Tile width (halo included).
        width: usize,
        /// Tile height (halo included).
        height: usize,
    },

    /// A layer id that is not in the registry.
    #[error("unknown layer: {0}")]
    UnknownLayer(String),

    /// A layer asked, directly or through other layers, for its own output.
    #[error("cyclic layer dependency on '{layer}': {chain}")]
    CyclicDependency {
        /// The layer that was requested twice.
        layer: String,
        /// The generation chain that led back to it.
        chain: String,
    },

    /// A layer produced a tile that does not match the configured footprint.
    #[error("layer '{layer}' produced a {actual_width}x{actual_height} tile, expected {expected}x{expected}")]
    TileShape {
        /// The offending layer.
        layer: String,
        /// Expected edge length (`chunk_size + 2 * overlap`).
        expected: usize,
        /// Width of the produced tile.
        actual_width: usize,
        /// Height of the produced tile.
        actual_height: usize,
    },

    /// A layer produced a tile whose element type differs from the one it declares.
    #[error("layer '{layer}' produced a {actual:?} tile, declared {expected:?}")]
    TileKind {
        /// The offending layer.
        layer: String,
        /// Declared element type.
        expected: ElementKind,
        /// Element type of the produced tile.
        actual: ElementKind,
    },

    /// A configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(String),
}

/// Result type for generation operations.
pub type GenResult<T> = Result<T, GenError>;
