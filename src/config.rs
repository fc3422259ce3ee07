//! Bridge configuration
//!
//! Supports multiple profiles (debug, release) with different settings. The
//! loaded configuration doubles as the settings store the gesture engine
//! reads from.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::camera::Camera2D;
use crate::input::{EventMapPreset, GestureMode, PanAnchor};
use crate::settings::{
    DEFAULT_LONG_PRESS_MS, DEFAULT_MOVE_THRESHOLD, DEFAULT_PING_MS, DEFAULT_SENSITIVITY, SettingValue,
    SettingsProvider, names,
};

/// Prefix of environment overrides, e.g. `TOUCH_BRIDGE_GESTURES__MODE=split`
pub const ENV_PREFIX: &str = "TOUCH_BRIDGE";

/// Environment variable selecting the profile for [`BridgeConfig::load_from_env`]
pub const PROFILE_VAR: &str = "TOUCH_BRIDGE_PROFILE";

pub const DEFAULT_PROFILE: &str = "release";

/// Camera gesture behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub mode: GestureMode,
    /// 0 (stiff) to 100 (reacts to the smallest pinch)
    pub zoom_sensitivity: f64,
    pub pan_sensitivity: f64,
    pub pan_anchor: PanAnchor,
    /// Keep gestures off after one finger of a gesture lifts, until all do
    pub lock_after_release: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            mode: GestureMode::default(),
            zoom_sensitivity: DEFAULT_SENSITIVITY,
            pan_sensitivity: DEFAULT_SENSITIVITY,
            pan_anchor: PanAnchor::default(),
            lock_after_release: true,
        }
    }
}

/// Hold timers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay before a held touch becomes a right click
    pub long_press_ms: u64,
    /// Delay before a held right click is reported
    pub ping_ms: u64,
    /// Pixels of travel that cancel both timers
    pub long_press_move_threshold: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            ping_ms: DEFAULT_PING_MS,
            long_press_move_threshold: DEFAULT_MOVE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub event_map: EventMapPreset,
}

/// Reference camera used by `replay` and `window`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 3.0,
        }
    }
}

impl CameraConfig {
    pub fn build(&self) -> Camera2D {
        Camera2D::new(self.width, self.height)
            .with_zoom_limits(self.min_zoom, self.max_zoom)
            .with_zoom(self.zoom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Verbose engine logging; forces the filter to `debug`
    pub debug_mode: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            debug_mode: false,
        }
    }
}

impl LoggingConfig {
    /// Filter directive to install
    pub fn effective_filter(&self) -> &str {
        if self.debug_mode { "debug" } else { &self.filter }
    }
}

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// The active profile (debug, release, etc.)
    pub profile: String,
    #[serde(default)]
    pub gestures: GestureConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Loads configuration for a profile
    ///
    /// Sources, later ones winning:
    /// 1. config/{profile}.toml, looked up next to the executable, then in ./config
    /// 2. Environment variables with prefix TOUCH_BRIDGE_ (e.g. TOUCH_BRIDGE_TIMING__PING_MS=1500)
    ///
    /// The result is validated before it is returned.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        let dir = Self::find_config_dir().unwrap_or_else(|| PathBuf::from("config"));
        Self::load_from_dir(&dir, profile)
    }

    /// Loads a profile from an explicit config directory
    pub fn load_from_dir(dir: &Path, profile: &str) -> Result<Self, ConfigError> {
        let profile_path = dir.join(profile);
        let config = Config::builder()
            .add_source(File::from(profile_path.as_path()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override("profile", profile)?
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Loads configuration using TOUCH_BRIDGE_PROFILE, defaulting to "release"
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let profile = std::env::var(PROFILE_VAR).unwrap_or_else(|_| DEFAULT_PROFILE.to_string());
        Self::load(&profile)
    }

    /// Compiled-in defaults, no files or environment involved
    pub fn builtin(profile: &str) -> Self {
        Self {
            profile: profile.to_string(),
            gestures: GestureConfig::default(),
            timing: TimingConfig::default(),
            dispatch: DispatchConfig::default(),
            camera: CameraConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Rejects values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("gestures.zoom_sensitivity", self.gestures.zoom_sensitivity),
            ("gestures.pan_sensitivity", self.gestures.pan_sensitivity),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Message(format!("{name} must be within 0..=100, got {value}")));
            }
        }
        if self.timing.long_press_ms == 0 || self.timing.ping_ms == 0 {
            return Err(ConfigError::Message("hold timeouts must be positive".to_string()));
        }
        if !(self.timing.long_press_move_threshold >= 0.0) {
            return Err(ConfigError::Message(
                "timing.long_press_move_threshold must not be negative".to_string(),
            ));
        }
        let camera = &self.camera;
        if camera.width <= 0.0 || camera.height <= 0.0 {
            return Err(ConfigError::Message(format!(
                "camera viewport must be positive, got {}x{}",
                camera.width, camera.height
            )));
        }
        if !(camera.min_zoom > 0.0 && camera.min_zoom <= camera.zoom && camera.zoom <= camera.max_zoom) {
            return Err(ConfigError::Message(format!(
                "camera zoom {} must lie within {}..={} with a positive minimum",
                camera.zoom, camera.min_zoom, camera.max_zoom
            )));
        }
        Ok(())
    }

    /// Finds the config directory next to the executable or in the working directory
    pub fn find_config_dir() -> Option<PathBuf> {
        if let Ok(exe_path) = std::env::current_exe()
            && let Some(exe_dir) = exe_path.parent()
        {
            let config_dir = exe_dir.join("config");
            if config_dir.exists() {
                return Some(config_dir);
            }
        }

        let cwd_config = PathBuf::from("config");
        cwd_config.exists().then_some(cwd_config)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::load(DEFAULT_PROFILE).unwrap_or_else(|_| Self::builtin(DEFAULT_PROFILE))
    }
}

impl SettingsProvider for BridgeConfig {
    fn get(&self, name: &str) -> Option<SettingValue> {
        let value = match name {
            names::GESTURE_MODE => self.gestures.mode.as_str().into(),
            names::ZOOM_THRESHOLD => self.gestures.zoom_sensitivity.into(),
            names::PAN_THRESHOLD => self.gestures.pan_sensitivity.into(),
            names::PAN_ANCHOR => self.gestures.pan_anchor.as_str().into(),
            names::LOCK_GESTURES_AFTER_RELEASE => self.gestures.lock_after_release.into(),
            names::RIGHT_CLICK_TIMEOUT => self.timing.long_press_ms.into(),
            names::LONG_PRESS_TIMEOUT => self.timing.ping_ms.into(),
            names::LONG_PRESS_MOVE_THRESHOLD => self.timing.long_press_move_threshold.into(),
            names::DEBUG_MODE => self.logging.debug_mode.into(),
            _ => return None,
        };
        Some(value)
    }
}
