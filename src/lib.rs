//! Touch Bridge
//!
//! Translates raw touch input into synthetic pointer events and camera
//! gestures (pinch-zoom, multi-finger pan, window scrolling) for hosts that
//! only understand mouse input.

/// Build-time information (rustc, target, timestamp)
pub mod build_info;

/// Camera collaborator and the reference 2D camera
pub mod camera;

/// Profiles loaded from files and environment
pub mod config;

/// Health checks used by `touch-bridge check`
pub mod health;

/// Touch tracking, gestures and synthetic event dispatch
pub mod input;

/// Recorded touch traces
pub mod replay;

/// Settings collaborator consulted on every sample
pub mod settings;
