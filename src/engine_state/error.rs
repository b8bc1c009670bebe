//! # Terrain Errors
//!
//! Error types surfaced by the terrain engine. Missing neighbors during structure placement or
//! circuit propagation are not errors: those paths defer or skip and never produce a value of
//! this type.

use cgmath::Point3;
use thiserror::Error;

/// Errors produced by configuration loading, block addressing and world searches.
#[derive(Error, Debug)]
pub enum TerrainError {
    /// A configuration value failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read.
    #[error("Failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// The configuration file was not valid JSON for `EngineConfig`.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A local block position fell outside the `[0, N)` cube of its area.
    #[error("Block index out of bounds: local position {position:?} in an area of size {size}")]
    BlockIndexOutOfBounds {
        /// Offending local position.
        position: Point3<i32>,
        /// Side length of the area.
        size: usize,
    },

    /// The area required by an operation has not been spawned yet.
    #[error("Area {0:?} is not loaded")]
    AreaNotLoaded(Point3<i32>),

    /// A search walked further than its step bound allows.
    #[error("Search exceeded {steps} steps")]
    SearchExceeded {
        /// Number of steps taken before giving up.
        steps: usize,
    },

    /// A block name did not match any known block type.
    #[error("Unknown block type: {0}")]
    UnknownBlock(String),
}

/// Result type for terrain operations.
pub type TerrainResult<T> = Result<T, TerrainError>;
