//! Settings collaborator: named values the gesture engine reads on every sample
//!
//! The host's settings storage is out of reach; the engine only needs
//! [`SettingsProvider::get`]. Typed accessors with defaults come from
//! [`SettingsExt`], which every provider gets for free.

use std::collections::HashMap;
use std::time::Duration;

use crate::input::{GestureMode, HoldTiming, PanAnchor};

/// Setting names understood by the engine
pub mod names {
    pub const GESTURE_MODE: &str = "gestureMode";
    pub const ZOOM_THRESHOLD: &str = "zoomThreshold";
    pub const PAN_THRESHOLD: &str = "panThreshold";
    /// Long-press promotion delay in milliseconds
    pub const RIGHT_CLICK_TIMEOUT: &str = "canvasRightClickTimeout";
    /// Ping delay in milliseconds
    pub const LONG_PRESS_TIMEOUT: &str = "canvasLongPressTimeout";
    pub const LONG_PRESS_MOVE_THRESHOLD: &str = "longPressMoveThreshold";
    pub const PAN_ANCHOR: &str = "panAnchor";
    pub const LOCK_GESTURES_AFTER_RELEASE: &str = "lockGesturesAfterRelease";
    pub const DEBUG_MODE: &str = "debugMode";
}

pub const DEFAULT_SENSITIVITY: f64 = 100.0;
pub const DEFAULT_LONG_PRESS_MS: u64 = 400;
pub const DEFAULT_PING_MS: u64 = 1000;
pub const DEFAULT_MOVE_THRESHOLD: f64 = 10.0;

/// A single stored value
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SettingValue {
    /// Booleans as-is; text `"on"`/`"off"` and `"true"`/`"false"` are accepted
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(s) => match s.as_str() {
                "on" | "true" => Some(true),
                "off" | "false" => Some(false),
                _ => None,
            },
            Self::Number(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.parse().ok(),
            Self::Bool(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u64> for SettingValue {
    fn from(value: u64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Read access to the host's settings storage
pub trait SettingsProvider {
    /// Current value of `name`, `None` when unset
    fn get(&self, name: &str) -> Option<SettingValue>;
}

impl SettingsProvider for HashMap<String, SettingValue> {
    fn get(&self, name: &str) -> Option<SettingValue> {
        HashMap::get(self, name).cloned()
    }
}

impl<S: SettingsProvider + ?Sized> SettingsProvider for &S {
    fn get(&self, name: &str) -> Option<SettingValue> {
        (**self).get(name)
    }
}

impl<S: SettingsProvider + ?Sized> SettingsProvider for Box<S> {
    fn get(&self, name: &str) -> Option<SettingValue> {
        (**self).get(name)
    }
}

/// Provider with nothing stored; every accessor yields its default
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSettings;

impl SettingsProvider for DefaultSettings {
    fn get(&self, _name: &str) -> Option<SettingValue> {
        None
    }
}

/// Typed accessors over any [`SettingsProvider`]
///
/// Unset or ill-typed values fall back to the documented defaults.
pub trait SettingsExt: SettingsProvider {
    fn gesture_mode(&self) -> GestureMode {
        self.get(names::GESTURE_MODE)
            .and_then(|v| v.as_str().and_then(|s| s.parse().ok()))
            .unwrap_or_default()
    }

    /// Zoom sensitivity, clamped to 0–100
    fn zoom_sensitivity(&self) -> f64 {
        self.number_or(names::ZOOM_THRESHOLD, DEFAULT_SENSITIVITY)
            .clamp(0.0, 100.0)
    }

    /// Pan sensitivity, clamped to 0–100
    fn pan_sensitivity(&self) -> f64 {
        self.number_or(names::PAN_THRESHOLD, DEFAULT_SENSITIVITY)
            .clamp(0.0, 100.0)
    }

    fn long_press_timeout(&self) -> Duration {
        millis(self.number_or(names::RIGHT_CLICK_TIMEOUT, DEFAULT_LONG_PRESS_MS as f64))
    }

    fn ping_timeout(&self) -> Duration {
        millis(self.number_or(names::LONG_PRESS_TIMEOUT, DEFAULT_PING_MS as f64))
    }

    fn long_press_move_threshold(&self) -> f64 {
        self.number_or(names::LONG_PRESS_MOVE_THRESHOLD, DEFAULT_MOVE_THRESHOLD)
            .max(0.0)
    }

    fn pan_anchor(&self) -> PanAnchor {
        self.get(names::PAN_ANCHOR)
            .and_then(|v| v.as_str().and_then(|s| s.parse().ok()))
            .unwrap_or_default()
    }

    fn lock_gestures_after_release(&self) -> bool {
        self.get(names::LOCK_GESTURES_AFTER_RELEASE)
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }

    fn debug_mode(&self) -> bool {
        self.get(names::DEBUG_MODE)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Hold timers and their movement tolerance
    fn hold_timing(&self) -> HoldTiming {
        HoldTiming {
            long_press: self.long_press_timeout(),
            ping: self.ping_timeout(),
            move_threshold: self.long_press_move_threshold(),
        }
    }

    fn number_or(&self, name: &str, default: f64) -> f64 {
        self.get(name)
            .and_then(|v| v.as_f64())
            .filter(|n| n.is_finite())
            .unwrap_or(default)
    }
}

impl<S: SettingsProvider + ?Sized> SettingsExt for S {}

fn millis(ms: f64) -> Duration {
    Duration::from_millis(ms.max(0.0).round() as u64)
}

/// Override layer on top of a base provider
///
/// An override wins over the base value for the same name until it is
/// cleared. Booleans may be overridden with `"on"`/`"off"` text.
#[derive(Debug, Clone, Default)]
pub struct LayeredSettings<S> {
    base: S,
    overrides: HashMap<String, SettingValue>,
}

impl<S: SettingsProvider> LayeredSettings<S> {
    pub fn new(base: S) -> Self {
        Self {
            base,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, name: &str, value: impl Into<SettingValue>) -> Self {
        self.set_override(name, value);
        self
    }

    pub fn set_override(&mut self, name: &str, value: impl Into<SettingValue>) {
        self.overrides.insert(name.to_string(), value.into());
    }

    /// Drop the override for `name`, returning it
    pub fn clear_override(&mut self, name: &str) -> Option<SettingValue> {
        self.overrides.remove(name)
    }

    pub fn is_overridden(&self, name: &str) -> bool {
        self.overrides.contains_key(name)
    }

    pub fn base(&self) -> &S {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut S {
        &mut self.base
    }
}

impl<S: SettingsProvider> SettingsProvider for LayeredSettings<S> {
    fn get(&self, name: &str) -> Option<SettingValue> {
        self.overrides
            .get(name)
            .cloned()
            .or_else(|| self.base.get(name))
    }
}
