//! Demo configuration, read from a RON file.
//!
//! Every field has a default, so a config file only needs the values it
//! changes (or can be absent altogether).

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::{CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR, CAMERA_OFFSET};
use crate::input::KeyBindings;
use crate::physics::GRAVITY;
use crate::simulation::{StepMode, FIXED_TIMESTEP, MAX_SUBSTEPS};
use crate::terrain::{TerrainPlacement, TERRAIN_ASSET_PATH};

/// Config file name inside the asset folder.
pub const CONFIG_FILE: &str = "driving.ron";

/// Where the car starts (dropped from high up).
pub const SPAWN_POSITION: Vec3 = Vec3::new(0.0, 1000.0, 0.0);

/// Speed scalar the car starts with. Only affects wheel spin.
pub const INITIAL_SPEED: f32 = 0.1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,

    pub gravity: Vec3,
    pub timestep: f32,
    pub step_mode: StepMode,
    pub max_substeps: u32,

    pub spawn_position: Vec3,
    pub initial_speed: f32,

    pub camera_offset: Vec3,
    pub camera_fov_degrees: f32,
    pub camera_near: f32,
    pub camera_far: f32,

    pub terrain_asset: String,
    pub terrain: TerrainPlacement,

    pub bindings: KeyBindings,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            window_title: "Driving Demo".to_string(),
            window_width: 1280,
            window_height: 720,
            gravity: Vec3::new(0.0, GRAVITY, 0.0),
            timestep: FIXED_TIMESTEP,
            step_mode: StepMode::PerFrame,
            max_substeps: MAX_SUBSTEPS,
            spawn_position: SPAWN_POSITION,
            initial_speed: INITIAL_SPEED,
            camera_offset: CAMERA_OFFSET,
            camera_fov_degrees: CAMERA_FOV_DEGREES,
            camera_near: CAMERA_NEAR,
            camera_far: CAMERA_FAR,
            terrain_asset: TERRAIN_ASSET_PATH.to_string(),
            terrain: TerrainPlacement::default(),
            bindings: KeyBindings::default(),
        }
    }
}

impl SimConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, String> {
        let config: SimConfig =
            ron::from_str(text).map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file.
    ///
    /// Returns:
    /// - Ok(config) if the file exists and parses
    /// - Err(message) if it is missing, malformed, or has unusable values
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_ron_str(&text).map_err(|e| format!("{}: {}", path.display(), e))
    }

    /// Load `path`, falling back to defaults on any error.
    ///
    /// Nothing is logged here: this runs before the app's logger exists, so
    /// the returned [`ConfigSource`] is logged later with [`ConfigSource::log`].
    pub fn load_or_default(path: &Path) -> (Self, ConfigSource) {
        match Self::load(path) {
            Ok(config) => (config, ConfigSource::File(path.to_path_buf())),
            Err(reason) => (Self::default(), ConfigSource::Defaults { reason }),
        }
    }

    pub fn to_ron_string(&self) -> Result<String, String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| format!("Failed to serialize config: {}", e))
    }

    fn validate(&self) -> Result<(), String> {
        if !(self.timestep > 0.0 && self.timestep.is_finite()) {
            return Err(format!("timestep must be positive, got {}", self.timestep));
        }
        if self.camera_near <= 0.0 || self.camera_far <= self.camera_near {
            return Err(format!(
                "camera clip planes must satisfy 0 < near < far, got {} / {}",
                self.camera_near, self.camera_far
            ));
        }
        Ok(())
    }
}

/// Where the active config came from.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults { reason: String },
}

impl ConfigSource {
    pub fn is_file(&self) -> bool {
        matches!(self, ConfigSource::File(_))
    }

    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {:?}", path),
            ConfigSource::Defaults { reason } => warn!("Using default config: {}", reason),
        }
    }
}
