//! Application configuration.
//!
//! The defaults are compiled in from `assets/config.json`. A user file at
//! `<config dir>/glclock/config.json` may override any subset of the keys; it is merged over
//! the defaults key by key before deserializing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use glam::Vec3;
use serde::Deserialize;

use crate::{CoreError, clock::Hand, color::hex_to_vec3};

pub const DEFAULT_CONFIG_JSON: &str = include_str!("assets/config.json");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub samples: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FaceConfig {
    pub color: String,
    pub radius: f32,
    pub line_length: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HandConfig {
    pub color: String,
    pub length: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HandsConfig {
    pub half_width: f32,
    pub second: HandConfig,
    pub minute: HandConfig,
    pub hour: HandConfig,
}

impl HandsConfig {
    pub fn get(&self, hand: Hand) -> &HandConfig {
        match hand {
            Hand::Second => &self.second,
            Hand::Minute => &self.minute,
            Hand::Hour => &self.hour,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShaderPaths {
    pub circle_vertex: PathBuf,
    pub circle_fragment: PathBuf,
    pub triangle_vertex: PathBuf,
    pub triangle_fragment: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClockConfig {
    pub window: WindowConfig,
    pub frame_period_ms: u64,
    pub clear_color: String,
    pub face: FaceConfig,
    pub hands: HandsConfig,
    pub shaders: ShaderPaths,
}

/// Colors from [`ClockConfig`] parsed into vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub clear: Vec3,
    pub face: Vec3,
    pub hands: [Vec3; 3],
}

impl ClockConfig {
    /// Parses the compiled-in defaults.
    pub fn defaults() -> Result<Self, CoreError> {
        Ok(serde_json::from_str(DEFAULT_CONFIG_JSON)?)
    }

    /// Parses the defaults with `overrides` (a JSON object, possibly partial) merged over them.
    pub fn with_overrides(overrides: &str) -> Result<Self, CoreError> {
        let mut base: serde_json::Value = serde_json::from_str(DEFAULT_CONFIG_JSON)?;
        let overrides: serde_json::Value = serde_json::from_str(overrides)?;
        merge(&mut base, overrides);
        Ok(serde_json::from_value(base)?)
    }

    /// Where the user override file lives, if the platform has a config directory.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("glclock").join("config.json"))
    }

    /// Loads the defaults and applies the override file at `path` when it exists. A missing
    /// file is not an error; an unreadable or malformed one is logged and skipped.
    pub fn load_from(path: Option<&Path>) -> Result<Self, CoreError> {
        let Some(path) = path.filter(|p| p.exists()) else {
            return Self::defaults();
        };

        let result = std::fs::read_to_string(path)
            .map_err(CoreError::from)
            .and_then(|text| Self::with_overrides(&text));

        match result {
            Ok(config) => {
                log::info!("Loaded config overrides from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                log::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::defaults()
            }
        }
    }

    /// Loads the configuration from the user's config directory.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(Self::user_config_path().as_deref())
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_period_ms)
    }

    /// Parses every configured color.
    pub fn palette(&self) -> Result<Palette, CoreError> {
        Ok(Palette {
            clear: hex_to_vec3(&self.clear_color)?,
            face: hex_to_vec3(&self.face.color)?,
            hands: [
                hex_to_vec3(&self.hands.second.color)?,
                hex_to_vec3(&self.hands.minute.color)?,
                hex_to_vec3(&self.hands.hour.color)?,
            ],
        })
    }
}

fn merge(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
