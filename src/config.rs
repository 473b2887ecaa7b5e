//! Simulation configuration parsing from walksim.toml files

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::game::animation::AnimationConfig;
use crate::game::camera::CameraConfig;
use crate::game::constants::{character, jump, physics};
use crate::game::movement::MovementConfig;
use crate::game::stamina::StaminaConfig;

/// Physics stepping section
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration in m/s²
    pub gravity: f32,
    /// Fixed sub-step in seconds
    pub timestep: f32,
    pub max_substeps: u32,
    /// Wall-clock deltas above this are clamped
    pub max_frame_delta: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: physics::DEFAULT_GRAVITY,
            timestep: physics::TIMESTEP,
            max_substeps: physics::MAX_SUBSTEPS,
            max_frame_delta: physics::MAX_FRAME_DELTA,
        }
    }
}

/// Jump and ground probe section
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct JumpConfig {
    pub velocity: f32,
    pub cooldown: f32,
    pub probe_distance: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            velocity: jump::VELOCITY,
            cooldown: jump::COOLDOWN_SECS,
            probe_distance: jump::GROUND_PROBE_DISTANCE,
        }
    }
}

/// Character selection and spawn points
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CharactersConfig {
    /// "Blocky" or "MilkAnimated"
    pub initial: String,
    /// Body centre of the box rig
    pub blocky_spawn: [f32; 3],
    /// Bottom centre of the skinned body
    pub skinned_spawn: [f32; 3],
}

impl Default for CharactersConfig {
    fn default() -> Self {
        Self {
            initial: "Blocky".to_string(),
            blocky_spawn: character::BLOCKY_SPAWN,
            skinned_spawn: character::SKINNED_SPAWN,
        }
    }
}

/// Simulation configuration from walksim.toml. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    pub physics: PhysicsConfig,
    pub stamina: StaminaConfig,
    pub movement: MovementConfig,
    pub jump: JumpConfig,
    pub camera: CameraConfig,
    pub animation: AnimationConfig,
    pub characters: CharactersConfig,
}

impl SimConfig {
    /// Load simulation configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }
}

/// Errors that can occur when loading simulation configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),
}
