//! Tuning constants, frame-rate coupling and window settings.
//!
//! Every field has a default equal to the arcade handling the game ships with,
//! so a JSON file only needs to name the values it overrides.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Vehicle handling constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    pub start_position: Vec3,
    /// Resting height of the car body above the road
    pub ground_height: f32,
    pub normal_max_speed: f32,
    pub nitro_max_speed: f32,
    pub acceleration: f32,
    pub nitro_acceleration: f32,
    /// Per-frame multiplier applied while coasting
    pub deceleration: f32,
    pub turn_speed: f32,
    pub base_drift_factor: f32,
    pub drift_drift_factor: f32,
    pub base_tilt_factor: f32,
    pub drift_tilt_factor: f32,
    pub tilt_smoothing: f32,
    /// Reverse top speed as a fraction of forward top speed
    pub reverse_ratio: f32,
    /// Height gained per unit of speed
    pub bounce: f32,
    /// Fraction of max speed above which turning slides the car sideways
    pub slide_threshold: f32,
    pub slide_scale: f32,
    pub drift_slide_multiplier: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            start_position: Vec3::new(0.0, 0.2, 0.0),
            ground_height: 0.2,
            normal_max_speed: 0.3,
            nitro_max_speed: 0.4,
            acceleration: 0.03,
            nitro_acceleration: 0.06,
            deceleration: 0.95,
            turn_speed: 0.05,
            base_drift_factor: 0.90,
            drift_drift_factor: 0.75,
            base_tilt_factor: 0.2,
            drift_tilt_factor: 0.4,
            tilt_smoothing: 0.1,
            reverse_ratio: 0.6,
            bounce: 0.05,
            slide_threshold: 0.5,
            slide_scale: 0.02,
            drift_slide_multiplier: 2.0,
        }
    }
}

/// Chase camera constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Camera position relative to the car before heading rotation
    pub offset: Vec3,
    /// Look-at point relative to the car before heading rotation
    pub look_offset: Vec3,
    pub smoothing: f32,
    /// Multiplier turning |velocity| into camera pull-back
    pub speed_pull: f32,
    pub speed_drop: f32,
    pub speed_pullback: f32,
    pub shake_amplitude: f32,
    pub shake_frequency: f32,
    pub initial_eye: Vec3,
    pub fov_y_degrees: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 0.0, -2.5),
            look_offset: Vec3::new(0.0, 0.0, 2.0),
            smoothing: 0.15,
            speed_pull: 0.5,
            speed_drop: 0.2,
            speed_pullback: 0.5,
            shake_amplitude: 0.01,
            shake_frequency: 30.0,
            initial_eye: Vec3::new(0.0, 2.0, 6.0),
            fov_y_degrees: 60.0,
        }
    }
}

/// How per-frame constants relate to the elapsed frame time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Integration {
    /// Constants apply once per rendered frame, whatever its duration
    FrameLocked,
    /// Constants are re-derived so that motion matches `reference_fps` at any frame rate
    DeltaScaled { reference_fps: f32 },
}

impl Default for Integration {
    fn default() -> Self {
        Integration::FrameLocked
    }
}

impl Integration {
    /// Number of reference frames covered by `delta` seconds
    fn frames(&self, delta: f32) -> f32 {
        match *self {
            Integration::FrameLocked => 1.0,
            Integration::DeltaScaled { reference_fps } => delta.max(0.0) * reference_fps,
        }
    }

    /// Interpolation weight for a one-step blend factor `k`
    pub fn blend(&self, k: f32, delta: f32) -> f32 {
        match self {
            Integration::FrameLocked => k,
            Integration::DeltaScaled { .. } => 1.0 - (1.0 - k).powf(self.frames(delta)),
        }
    }

    /// Multiplier for a per-frame decay factor `d`
    pub fn decay(&self, d: f32, delta: f32) -> f32 {
        match self {
            Integration::FrameLocked => d,
            Integration::DeltaScaled { .. } => d.powf(self.frames(delta)),
        }
    }

    /// Scale for a per-frame increment such as a turn step or a translation
    pub fn step(&self, amount: f32, delta: f32) -> f32 {
        amount * self.frames(delta)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "citydrive".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub vehicle: VehicleTuning,
    pub camera: CameraTuning,
    pub integration: Integration,
    pub window: WindowConfig,
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: format!("must be positive, got {value}") })
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: format!("must be in (0, 1], got {value}") })
    }
}

impl DriveConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: DriveConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), "loaded drive config");
        Ok(config)
    }

    /// Loads the file named by `CITYDRIVE_CONFIG`, or the defaults when it is unset
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var("CITYDRIVE_CONFIG") {
            Ok(path) => Self::load(path),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.vehicle;
        positive("vehicle.normal_max_speed", v.normal_max_speed)?;
        positive("vehicle.nitro_max_speed", v.nitro_max_speed)?;
        unit_interval("vehicle.acceleration", v.acceleration)?;
        unit_interval("vehicle.nitro_acceleration", v.nitro_acceleration)?;
        unit_interval("vehicle.deceleration", v.deceleration)?;
        positive("vehicle.turn_speed", v.turn_speed)?;
        unit_interval("vehicle.base_drift_factor", v.base_drift_factor)?;
        unit_interval("vehicle.drift_drift_factor", v.drift_drift_factor)?;
        positive("vehicle.base_tilt_factor", v.base_tilt_factor)?;
        positive("vehicle.drift_tilt_factor", v.drift_tilt_factor)?;
        unit_interval("vehicle.tilt_smoothing", v.tilt_smoothing)?;
        unit_interval("vehicle.reverse_ratio", v.reverse_ratio)?;

        let c = &self.camera;
        unit_interval("camera.smoothing", c.smoothing)?;
        if !(c.fov_y_degrees > 1.0 && c.fov_y_degrees < 179.0) {
            return Err(ConfigError::Invalid {
                field: "camera.fov_y_degrees",
                reason: format!("must be between 1 and 179 degrees, got {}", c.fov_y_degrees),
            });
        }

        if let Integration::DeltaScaled { reference_fps } = self.integration {
            positive("integration.reference_fps", reference_fps)?;
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid {
                field: "window",
                reason: "width and height must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
