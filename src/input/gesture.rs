//! Multi-touch gesture state and the math behind it
//!
//! Everything that turns finger positions into a zoom level or a camera
//! center lives here as pure functions. The registry owns one
//! [`ZoomGesture`] and one [`PanGesture`] and drives them from touch counts.

use std::fmt;
use std::str::FromStr;

use glam::{DAffine2, DVec2};
use serde::{Deserialize, Serialize};

use super::vectors;
use crate::camera::CameraAdapter;

/// Touches needed for a zoom gesture
pub const ZOOM_MIN_TOUCHES: usize = 2;

/// Axes whose world extent is below this share of the larger axis are
/// ignored by [`zoom_factor`]
const MIN_AXIS_SHARE: f64 = 0.2;

const EPSILON: f64 = 1e-9;

/// Lifecycle of one gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum GestureStatus {
    #[default]
    None,
    /// Enough touches, movement still under the activation threshold
    Waiting,
    /// Threshold crossed; stays here until the touch count drops
    Active,
}

/// How two-finger input is split between zoom and pan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureMode {
    /// No camera gestures at all
    Off,
    /// Two fingers zoom and pan together
    #[default]
    Combined,
    /// Two fingers zoom, three or more pan
    Split,
}

impl GestureMode {
    /// Touches needed for a pan gesture in this mode
    pub fn pan_min_touches(self) -> usize {
        match self {
            Self::Split => 3,
            Self::Combined | Self::Off => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Combined => "combined",
            Self::Split => "split",
        }
    }
}

impl fmt::Display for GestureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GestureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "combined" | "combined-zoom-pan" => Ok(Self::Combined),
            "split" | "split-zoom-then-pan" => Ok(Self::Split),
            other => Err(format!("unknown gesture mode `{other}`")),
        }
    }
}

/// Which touches a pan gesture follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanAnchor {
    /// The world point under the first finger stays under it
    #[default]
    FirstTouch,
    /// Corrections of all participating fingers are averaged
    Centroid,
}

impl PanAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstTouch => "first-touch",
            Self::Centroid => "centroid",
        }
    }
}

impl fmt::Display for PanAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanAnchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-touch" => Ok(Self::FirstTouch),
            "centroid" => Ok(Self::Centroid),
            other => Err(format!("unknown pan anchor `{other}`")),
        }
    }
}

/// Pinch-zoom state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoomGesture {
    pub status: GestureStatus,
    /// Screen positions of the two fingers when the gesture started waiting
    pub initiating: Option<[DVec2; 2]>,
    /// World points under the initiating positions, fixed at activation
    pub activation_world: Option<[DVec2; 2]>,
    /// Camera zoom when the gesture activated
    pub base_zoom: Option<f64>,
}

impl ZoomGesture {
    /// Start waiting from `coords`; no-op unless the gesture is idle
    pub fn initiate(&mut self, coords: [DVec2; 2]) {
        if self.status == GestureStatus::None {
            self.initiating = Some(coords);
            self.status = GestureStatus::Waiting;
        }
    }

    /// Returns true if the fingers spread or pinched past `threshold` pixels
    pub fn exceeds_threshold(&self, current: [DVec2; 2], threshold: f64) -> bool {
        let Some(initiating) = self.initiating else {
            return false;
        };
        let initial = vectors::distance(initiating[0], initiating[1]);
        let now = vectors::distance(current[0], current[1]);
        (now - initial).abs() > threshold
    }

    /// Commit the gesture, anchoring it to where the initiating positions
    /// sit in the world under `camera`
    pub fn activate<C: CameraAdapter + ?Sized>(&mut self, current: [DVec2; 2], camera: &C) {
        let reference = self.initiating.unwrap_or(current);
        self.activation_world = Some(reference.map(|p| camera.screen_to_world(p)));
        self.base_zoom = Some(camera.current_zoom());
        self.status = GestureStatus::Active;
    }

    /// Absolute zoom for the current finger positions, if active
    pub fn target_zoom(&self, current: [DVec2; 2]) -> Option<f64> {
        if self.status != GestureStatus::Active {
            return None;
        }
        zoom_factor(current, self.activation_world?)
    }

    pub fn is_active(&self) -> bool {
        self.status == GestureStatus::Active
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Multi-finger pan state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanGesture {
    pub status: GestureStatus,
    /// Screen position of the pan reference point when waiting began
    pub initiating: Option<DVec2>,
}

impl PanGesture {
    pub fn initiate(&mut self, reference: DVec2) {
        if self.status == GestureStatus::None {
            self.initiating = Some(reference);
            self.status = GestureStatus::Waiting;
        }
    }

    /// Activate once the reference point has travelled past `threshold`
    ///
    /// Returns true while the gesture is active.
    pub fn update(&mut self, reference: DVec2, threshold: f64) -> bool {
        if self.status == GestureStatus::Waiting
            && let Some(initiating) = self.initiating
            && vectors::distance(reference, initiating) > threshold
        {
            self.status = GestureStatus::Active;
        }
        self.is_active()
    }

    pub fn is_active(&self) -> bool {
        self.status == GestureStatus::Active
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Pixel distance the fingers must spread or pinch before zoom activates
///
/// `sensitivity` runs 0–100; 0 disables zoom entirely.
pub fn zoom_threshold_px(sensitivity: f64) -> f64 {
    if sensitivity <= 0.0 {
        f64::INFINITY
    } else if sensitivity > 80.0 {
        50.0 - sensitivity / 2.0
    } else if sensitivity > 30.0 {
        90.0 - sensitivity
    } else {
        360.0 - 10.0 * sensitivity
    }
}

/// Pixel distance the pan reference must travel before pan activates
pub fn pan_threshold_px(sensitivity: f64) -> f64 {
    if sensitivity <= 0.0 {
        f64::INFINITY
    } else if sensitivity > 50.0 {
        80.0 - sensitivity * 4.0 / 5.0
    } else if sensitivity > 20.0 {
        140.0 - 2.0 * sensitivity
    } else {
        300.0 - 10.0 * sensitivity
    }
}

/// Absolute zoom that maps `reference_world` onto the `current` screen
/// positions
///
/// Each axis gives its own ratio of screen extent to world extent, weighted by
/// how much of the current finger spread lies along it. An axis whose world
/// extent is negligible next to the other is left out so nearly horizontal or
/// vertical fingers don't feed noise into the estimate. Falls back to the
/// plain distance ratio when no axis is usable; `None` when the reference
/// points coincide.
pub fn zoom_factor(current: [DVec2; 2], reference_world: [DVec2; 2]) -> Option<f64> {
    let screen = vectors::abs(current[1] - current[0]);
    let world = vectors::abs(reference_world[1] - reference_world[0]);
    let cutoff = world.max_element() * MIN_AXIS_SHARE;

    let mut weighted = 0.0;
    let mut weight = 0.0;
    for axis in 0..2 {
        if world[axis] > EPSILON && world[axis] >= cutoff {
            weighted += screen[axis] * (screen[axis] / world[axis]);
            weight += screen[axis];
        }
    }
    if weight > EPSILON {
        return Some(weighted / weight);
    }

    let world_distance = vectors::distance(reference_world[0], reference_world[1]);
    (world_distance > EPSILON)
        .then(|| vectors::distance(current[0], current[1]) / world_distance)
}

/// Point whose travel decides pan activation
pub fn pan_reference(currents: &[DVec2], anchor: PanAnchor) -> Option<DVec2> {
    match anchor {
        PanAnchor::FirstTouch => currents.first().copied(),
        PanAnchor::Centroid => vectors::centroid(currents),
    }
}

/// World offset between where the fingers are now and where they started
///
/// `touches` holds `(current screen position, world point at touch start)`
/// pairs in registry order; `transform` is the view as it will be after any
/// pending zoom.
pub fn pan_correction(
    transform: &DAffine2,
    touches: &[(DVec2, DVec2)],
    anchor: PanAnchor,
) -> Option<DVec2> {
    let inverse = transform.inverse();
    let correction = |(current, world): &(DVec2, DVec2)| inverse.transform_point2(*current) - *world;
    match anchor {
        PanAnchor::FirstTouch => touches.first().map(correction),
        PanAnchor::Centroid => {
            let corrections: Vec<DVec2> = touches.iter().map(correction).collect();
            vectors::centroid(&corrections)
        }
    }
}

/// Camera center that cancels `correction`
pub fn pan_target<C: CameraAdapter + ?Sized>(camera: &C, correction: DVec2) -> DVec2 {
    camera.screen_to_world(camera.screen_center()) - correction
}
