//! # Unified Configuration System
//!
//! All tuning values for the collision pass live here. Every structure is
//! serializable, so a whole [`SimulationConfig`] can be loaded from a TOML or
//! RON file through the [`Config`] trait.
//!
//! ## Configuration Categories
//!
//! - **Physics Config**: tolerances and strengths used by classification and resolution
//! - **Spatial Config**: broad-phase grid sizing
//! - **Engine Config**: logging and debug behavior

use serde::{Serialize, Deserialize};

// Re-export from the config module for convenience
pub use crate::config::{Config, ConfigError};

/// # Physics Configuration
///
/// Tuning for the collision pass. Distances are world units, durations are ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Vertical band in which a rider counts as resting on a platform
    pub platform_tolerance: f32,
    /// Maximum horizontal distance between centers for a mount attempt
    pub mount_tolerance: f32,
    /// Positional correction constant, also the gain of pressure pushes
    pub pressure_strength: f32,
    /// Added to the overlap depth so corrections always make progress
    pub separation_bias: f32,
    /// Fraction of the `[tmin, tmax]` interval used to estimate collision normals
    pub collision_window: f32,
    /// Strength factor between an unmounted mount and a non-mount
    pub unmounted_mount_factor: f32,
    /// Vertical weighting of the overlap shape when one side can carry the other
    pub table_flatten: f32,
    /// Terrain grid cell size; no entity moves more than this per axis per tick
    pub terrain_cell_size: f32,
    /// Length of the post-dismount cooldown
    pub dismount_cooldown_ticks: u32,
}

impl PhysicsConfig {
    /// Create a physics configuration with default tuning
    pub fn new() -> Self {
        Self {
            platform_tolerance: 0.5,
            mount_tolerance: 0.75,
            pressure_strength: 0.25,
            separation_bias: 1.0,
            collision_window: 0.1,
            unmounted_mount_factor: 0.75,
            table_flatten: 0.5,
            terrain_cell_size: 1.0,
            dismount_cooldown_ticks: 30,
        }
    }

    /// Set the platform tolerance band
    pub fn with_platform_tolerance(mut self, tolerance: f32) -> Self {
        self.platform_tolerance = tolerance;
        self
    }

    /// Set the pressure strength
    pub fn with_pressure_strength(mut self, strength: f32) -> Self {
        self.pressure_strength = strength;
        self
    }

    /// Set the terrain cell size used for anti-tunneling
    pub fn with_terrain_cell_size(mut self, size: f32) -> Self {
        self.terrain_cell_size = size;
        self
    }

    /// Set the dismount cooldown length
    pub fn with_dismount_cooldown(mut self, ticks: u32) -> Self {
        self.dismount_cooldown_ticks = ticks;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("platform_tolerance", self.platform_tolerance),
            ("mount_tolerance", self.mount_tolerance),
            ("terrain_cell_size", self.terrain_cell_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        let unit = [
            ("collision_window", self.collision_window),
            ("unmounted_mount_factor", self.unmounted_mount_factor),
            ("table_flatten", self.table_flatten),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be within [0, 1], got {value}")));
            }
        }

        if self.pressure_strength < 0.0 || self.separation_bias < 0.0 {
            return Err(ConfigError::Invalid("pressure terms cannot be negative".to_string()));
        }

        Ok(())
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Spatial Configuration
///
/// Sizing of the uniform grid used for broad-phase candidate queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Edge length of one grid bucket
    pub cell_size: f32,
}

impl SpatialConfig {
    /// Create a spatial configuration
    pub fn new() -> Self {
        Self { cell_size: 4.0 }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        Ok(())
    }
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Engine Configuration
///
/// Logging and debug behavior shared by applications driving the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the engine
    pub log_level: String,
    /// Whether to enable debug features
    pub debug_mode: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable debug mode
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Simulation Configuration
///
/// Top-level configuration that encompasses all collision subsystems.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Collision pass tuning
    pub physics: PhysicsConfig,
    /// Broad-phase configuration
    pub spatial: SpatialConfig,
}

impl SimulationConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate()?;
        self.spatial.validate()?;
        Ok(())
    }
}

impl Config for SimulationConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
        assert_eq!(PhysicsConfig::default().pressure_strength, 0.25);
    }

    #[test]
    fn test_rejects_non_positive_cell_size() {
        let config = PhysicsConfig::new().with_terrain_cell_size(0.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_window_outside_unit_range() {
        let config = PhysicsConfig { collision_window: 1.5, ..PhysicsConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults_for_missing_fields() {
        let config: SimulationConfig = toml::from_str(
            "[physics]\nplatform_tolerance = 0.25\n\n[engine]\nlog_level = \"debug\"\n",
        )
        .unwrap();
        assert_eq!(config.physics.platform_tolerance, 0.25);
        assert_eq!(config.physics.dismount_cooldown_ticks, 30);
        assert_eq!(config.engine.log_level, "debug");
        assert_eq!(config.spatial, SpatialConfig::default());
    }
}
