use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::{error::SettingsError, sink::MIN_QUEUE_CAPACITY};

const ENV_PREFIX: &str = "APP__";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    /// Exponential smoothing factor for the cursor, in `(0, 1]`.
    pub smoothing: f32,
    pub pinch_threshold_px: f32,
    /// Frame width the pinch distance is scaled against.
    pub pinch_calibration_width: f32,
    pub drag_threshold_px: f32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            smoothing: 0.5,
            pinch_threshold_px: 50.0,
            pinch_calibration_width: 640.0,
            drag_threshold_px: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub width: u32,
    pub height: u32,
    pub device_index: u32,
    pub use_depth_camera: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            device_index: 0,
            use_depth_camera: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoopSettings {
    /// Sleep after a cycle that found no frame.
    pub poll_interval_ms: u64,
    /// Sleep after a processed frame.
    pub cycle_interval_ms: u64,
    pub stop_timeout_ms: u64,
    pub event_queue_capacity: usize,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            cycle_interval_ms: 10,
            stop_timeout_ms: 2000,
            event_queue_capacity: 64,
        }
    }
}

impl LoopSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackingSettings {
    pub gestures: GestureSettings,
    pub camera: CameraSettings,
    pub engine: LoopSettings,
}

impl TrackingSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let gestures = &self.gestures;
        if !(gestures.smoothing > 0.0 && gestures.smoothing <= 1.0) {
            return Err(invalid(
                "gestures.smoothing",
                format!("must be in (0, 1], got {}", gestures.smoothing),
            ));
        }
        for (field, value) in [
            ("gestures.pinch_threshold_px", gestures.pinch_threshold_px),
            (
                "gestures.pinch_calibration_width",
                gestures.pinch_calibration_width,
            ),
            ("gestures.drag_threshold_px", gestures.drag_threshold_px),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(invalid(
                "camera",
                format!(
                    "dimensions must be non-zero, got {}x{}",
                    self.camera.width, self.camera.height
                ),
            ));
        }
        if self.engine.event_queue_capacity < MIN_QUEUE_CAPACITY {
            return Err(invalid(
                "engine.event_queue_capacity",
                format!(
                    "must be at least {MIN_QUEUE_CAPACITY}, got {}",
                    self.engine.event_queue_capacity
                ),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> SettingsError {
    SettingsError::Invalid { field, reason }
}

pub fn parse_settings(raw: &str) -> Result<TrackingSettings, SettingsError> {
    Ok(toml::from_str(raw)?)
}

/// Loads settings from an optional TOML file, applies `APP__SECTION__KEY`
/// environment overrides and validates the result.
pub fn load_settings(path: Option<&Path>) -> Result<TrackingSettings, SettingsError> {
    let mut settings = match path {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            parse_settings(&raw)?
        }
        None => TrackingSettings::default(),
    };

    apply_env_overrides(&mut settings, std::env::vars())?;
    settings.validate()?;
    Ok(settings)
}

pub fn apply_env_overrides(
    settings: &mut TrackingSettings,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<(), SettingsError> {
    for (key, value) in vars {
        let Some(name) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };

        match name.to_ascii_uppercase().as_str() {
            "GESTURES__SMOOTHING" => settings.gestures.smoothing = parse_value(&key, &value)?,
            "GESTURES__PINCH_THRESHOLD_PX" => {
                settings.gestures.pinch_threshold_px = parse_value(&key, &value)?
            }
            "GESTURES__PINCH_CALIBRATION_WIDTH" => {
                settings.gestures.pinch_calibration_width = parse_value(&key, &value)?
            }
            "GESTURES__DRAG_THRESHOLD_PX" => {
                settings.gestures.drag_threshold_px = parse_value(&key, &value)?
            }
            "CAMERA__WIDTH" => settings.camera.width = parse_value(&key, &value)?,
            "CAMERA__HEIGHT" => settings.camera.height = parse_value(&key, &value)?,
            "CAMERA__DEVICE_INDEX" => settings.camera.device_index = parse_value(&key, &value)?,
            "CAMERA__USE_DEPTH_CAMERA" => {
                settings.camera.use_depth_camera = parse_value(&key, &value)?
            }
            "ENGINE__POLL_INTERVAL_MS" => {
                settings.engine.poll_interval_ms = parse_value(&key, &value)?
            }
            "ENGINE__CYCLE_INTERVAL_MS" => {
                settings.engine.cycle_interval_ms = parse_value(&key, &value)?
            }
            "ENGINE__STOP_TIMEOUT_MS" => settings.engine.stop_timeout_ms = parse_value(&key, &value)?,
            "ENGINE__EVENT_QUEUE_CAPACITY" => {
                settings.engine.event_queue_capacity = parse_value(&key, &value)?
            }
            _ => {}
        }
    }
    Ok(())
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SettingsError> {
    value
        .trim()
        .parse()
        .map_err(|_| SettingsError::InvalidOverride {
            key: key.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
