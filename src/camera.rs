//! Camera collaborator: the view the gesture engine pans and zooms
//!
//! The engine never owns the host's camera. It talks to it through
//! [`CameraAdapter`]; [`Camera2D`] is an in-memory implementation used by the
//! binary, the replay runner and the tests.

use glam::{DAffine2, DVec2};

/// Target view for a single camera update
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanRequest {
    /// World point to put at the middle of the viewport
    pub center: Option<DVec2>,
    /// Absolute zoom level
    pub zoom: Option<f64>,
}

/// Interface the host's camera exposes to the gesture engine
pub trait CameraAdapter {
    /// World → screen transform for the current view
    fn transform(&self) -> DAffine2;

    /// World → screen transform as it would be at `zoom`, keeping the
    /// current center
    fn transform_with_zoom(&self, zoom: f64) -> DAffine2;

    fn current_zoom(&self) -> f64;

    /// Apply a new view
    fn pan(&mut self, request: PanRequest);

    /// Screen-space center of the viewport
    fn screen_center(&self) -> DVec2;

    /// Zoom rounded to the precision the host stores it with
    fn round_zoom(&self, zoom: f64) -> f64;

    /// Zoom as [`CameraAdapter::pan`] would store it
    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom
    }

    /// Returns false while the host refuses zoom changes
    fn zoom_allowed(&self) -> bool {
        true
    }

    /// Returns false while the host refuses pan changes
    fn pan_allowed(&self) -> bool {
        true
    }

    fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        self.transform().inverse().transform_point2(screen)
    }

    fn world_to_screen(&self, world: DVec2) -> DVec2 {
        self.transform().transform_point2(world)
    }
}

/// Reference camera: a viewport looking at a world center with a uniform zoom
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2D {
    /// World point shown at the middle of the viewport
    pub center: DVec2,
    pub zoom: f64,
    /// Viewport size in screen pixels
    pub viewport: DVec2,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Decimal places kept by [`CameraAdapter::round_zoom`]
    pub zoom_precision: u32,
    pub zoom_locked: bool,
    pub pan_locked: bool,
}

impl Camera2D {
    /// Camera whose world coordinates match screen coordinates at zoom 1
    pub fn new(width: f64, height: f64) -> Self {
        let viewport = DVec2::new(width, height);
        Self {
            center: viewport * 0.5,
            zoom: 1.0,
            viewport,
            min_zoom: 0.1,
            max_zoom: 3.0,
            zoom_precision: 2,
            zoom_locked: false,
            pan_locked: false,
        }
    }

    pub fn with_center(mut self, center: DVec2) -> Self {
        self.center = center;
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_zoom_limits(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    fn transform_for(&self, zoom: f64) -> DAffine2 {
        DAffine2::from_scale_angle_translation(
            DVec2::splat(zoom),
            0.0,
            self.viewport * 0.5 - self.center * zoom,
        )
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl CameraAdapter for Camera2D {
    fn transform(&self) -> DAffine2 {
        self.transform_for(self.zoom)
    }

    fn transform_with_zoom(&self, zoom: f64) -> DAffine2 {
        self.transform_for(zoom)
    }

    fn current_zoom(&self) -> f64 {
        self.zoom
    }

    fn pan(&mut self, request: PanRequest) {
        if let Some(center) = request.center
            && !self.pan_locked
        {
            self.center = center;
        }
        if let Some(zoom) = request.zoom
            && !self.zoom_locked
        {
            self.zoom = self.clamp_zoom(zoom);
        }
    }

    fn screen_center(&self) -> DVec2 {
        self.viewport * 0.5
    }

    fn round_zoom(&self, zoom: f64) -> f64 {
        let scale = 10f64.powi(self.zoom_precision as i32);
        (zoom * scale).round() / scale
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    fn zoom_allowed(&self) -> bool {
        !self.zoom_locked
    }

    fn pan_allowed(&self) -> bool {
        !self.pan_locked
    }
}
