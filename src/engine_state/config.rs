//! # Engine Configuration
//!
//! Startup parameters of the terrain engine, deserialized from JSON with `serde`. Every field has
//! a default so a partial file (or `{}`) is a valid configuration.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use super::error::{TerrainError, TerrainResult};
use super::voxels::{area::DEFAULT_AREA_SIZE, block::block_type::BlockType};

/// Terrain shape and materials.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Seed of the height noise and every hash-based choice.
    pub seed: u32,
    /// World y at or below which every block is solid.
    pub sea_level: i32,
    /// World y reached by the terrain where the noise is 1.
    pub sky_level: i32,
    /// Frequency applied to world x/z before sampling the height noise.
    pub noise_frequency: f64,
    /// Top block of each column.
    pub surface_block: BlockType,
    /// Band of blocks right below the surface.
    pub subsurface_block: BlockType,
    /// Thickness of the subsurface band.
    pub subsurface_depth: i32,
    /// Everything deeper.
    pub deep_block: BlockType,
    /// Probability for a deep block to be replaced by tin.
    pub tin_chance: f64,
    /// Probability for a deep block to be replaced by a gem.
    pub gem_chance: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            seed: 42,
            sea_level: 4,
            sky_level: 28,
            noise_frequency: 0.02,
            surface_block: BlockType::GRASS,
            subsurface_block: BlockType::DIRT,
            subsurface_depth: 3,
            deep_block: BlockType::STONE,
            tin_chance: 0.02,
            gem_chance: 0.004,
        }
    }
}

/// Tree generation and deferred-placement parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// Minimum trunk height in blocks.
    pub base_trunk_height: i32,
    /// Minimum leaf radius.
    pub base_crown_radius: i32,
    /// Upper bound of the noise added to trunk height and crown radius.
    pub noise_range: i32,
    /// Probability for a surface column to grow a tree.
    pub tree_chance: f64,
    /// Ticks a structure may wait for missing neighbors before it is parked as stalled.
    pub max_retries: u32,
}

impl Default for StructureConfig {
    fn default() -> Self {
        StructureConfig {
            base_trunk_height: 3,
            base_crown_radius: 1,
            noise_range: 2,
            tree_chance: 0.02,
            max_retries: 600,
        }
    }
}

/// Area spawning around observers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Half-width, in areas, of the cube kept around each observer.
    pub view_range: i32,
    /// Half-width, in areas, of the cube around the origin spawned at startup.
    pub initial_spawn_extent: i32,
    /// Upper bound of area creations per tick.
    pub max_creations_per_tick: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        SpawnConfig {
            view_range: 2,
            initial_spawn_extent: 1,
            max_creations_per_tick: 10,
        }
    }
}

/// Circuit tick periods.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitConfig {
    /// Seconds between logic ticks.
    pub logic_period_secs: f64,
    /// Seconds between power passes.
    pub power_period_secs: f64,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        CircuitConfig {
            logic_period_secs: 1.0,
            power_period_secs: 3.0,
        }
    }
}

impl CircuitConfig {
    /// Logic tick period.
    pub fn logic_period(&self) -> Duration {
        Duration::from_secs_f64(self.logic_period_secs)
    }

    /// Power pass period.
    pub fn power_period(&self) -> Duration {
        Duration::from_secs_f64(self.power_period_secs)
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Side length `N` of every area.
    pub area_size: usize,
    /// Worker threads for generation and meshing. `0` runs every task inline.
    pub worker_threads: usize,
    /// Whether this node builds meshes.
    pub meshing_enabled: bool,
    /// Terrain shape.
    pub terrain: TerrainConfig,
    /// Trees and deferred placement.
    pub structures: StructureConfig,
    /// Spawning.
    pub spawn: SpawnConfig,
    /// Circuits.
    pub circuits: CircuitConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            area_size: DEFAULT_AREA_SIZE,
            worker_threads: 4,
            meshing_enabled: true,
            terrain: TerrainConfig::default(),
            structures: StructureConfig::default(),
            spawn: SpawnConfig::default(),
            circuits: CircuitConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> TerrainResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> TerrainResult<Self> {
        let json = std::fs::read_to_string(path)?;
        EngineConfig::from_json_str(&json)
    }

    /// Checks the invariants the engine relies on.
    ///
    /// # Errors
    /// Returns `TerrainError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> TerrainResult<()> {
        // Packed vertices and heightmap bytes hold positions up to and including N.
        if !(1..=u8::MAX as usize).contains(&self.area_size) {
            return Err(invalid(format!(
                "area_size must be within 1..=255, got {}",
                self.area_size
            )));
        }
        if self.terrain.sea_level > self.terrain.sky_level {
            return Err(invalid(format!(
                "sea_level {} is above sky_level {}",
                self.terrain.sea_level, self.terrain.sky_level
            )));
        }
        if self.terrain.subsurface_depth < 0 {
            return Err(invalid("subsurface_depth must not be negative".to_string()));
        }
        if self.spawn.max_creations_per_tick == 0 {
            return Err(invalid("max_creations_per_tick must be positive".to_string()));
        }
        if self.spawn.view_range < 0 || self.spawn.initial_spawn_extent < 0 {
            return Err(invalid("spawn ranges must not be negative".to_string()));
        }
        if !(self.circuits.logic_period_secs > 0.0 && self.circuits.power_period_secs > 0.0) {
            return Err(invalid("circuit periods must be positive".to_string()));
        }
        if self.structures.base_trunk_height < 1
            || self.structures.base_crown_radius < 0
            || self.structures.noise_range < 0
        {
            return Err(invalid("structure dimensions out of range".to_string()));
        }
        Ok(())
    }
}

fn invalid(message: String) -> TerrainError {
    TerrainError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.area_size, 16);
        assert_eq!(config.terrain.seed, 42);
        assert_eq!(config.circuits.logic_period(), Duration::from_secs(1));
        assert_eq!(config.circuits.power_period(), Duration::from_secs(3));
    }

    #[test]
    fn nested_fields_override_individually() {
        let config = EngineConfig::from_json_str(
            r#"{ "area_size": 8, "terrain": { "sea_level": 2, "surface_block": "stone" },
                 "spawn": { "view_range": 4 } }"#,
        )
        .unwrap();
        assert_eq!(config.area_size, 8);
        assert_eq!(config.terrain.sea_level, 2);
        assert_eq!(config.terrain.sky_level, 28);
        assert_eq!(config.terrain.surface_block, BlockType::STONE);
        assert_eq!(config.spawn.view_range, 4);
        assert_eq!(config.spawn.max_creations_per_tick, 10);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for json in [
            r#"{ "area_size": 0 }"#,
            r#"{ "area_size": 256 }"#,
            r#"{ "terrain": { "sea_level": 40, "sky_level": 10 } }"#,
            r#"{ "spawn": { "max_creations_per_tick": 0 } }"#,
            r#"{ "circuits": { "logic_period_secs": 0.0 } }"#,
        ] {
            assert!(
                matches!(EngineConfig::from_json_str(json), Err(TerrainError::InvalidConfig(_))),
                "{json}"
            );
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ area_size: "),
            Err(TerrainError::ConfigParse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            EngineConfig::from_path("/nonexistent/terrain.json"),
            Err(TerrainError::ConfigIo(_))
        ));
    }
}
