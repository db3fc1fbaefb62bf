//! # Core Engine Module
//!
//! Tuning shared by every collision subsystem: contact thresholds and
//! correction gains, broad-phase bucket size, log level.

pub mod config;

pub use config::{Config, ConfigError, EngineConfig, PhysicsConfig, SimulationConfig, SpatialConfig};
