//! Touch registry: the per-surface state machine behind every raw sample
//!
//! The registry is the only place touch points are created or destroyed. It
//! routes samples by active touch count:
//!
//! - 1 touch: click/drag passthrough (left button, right after a long press)
//! - 2 touches: zoom, or zoom and pan together, depending on the gesture mode
//! - 3–4 touches: pan
//!
//! Window surfaces skip zoom and pan and scroll the touched element instead.

use std::time::{Duration, Instant};

use glam::DVec2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::dispatcher::{EventMap, EventSink, Forwarder, SyntheticDispatcher};
use super::error::InputError;
use super::events::{Envelope, LogicalEventKind, PointerKind, RawEventKind, RawSample, TargetId, TouchId};
use super::gesture::{
    self, GestureMode, GestureStatus, PanGesture, ZOOM_MIN_TOUCHES, ZoomGesture,
};
use super::handler::GestureActivity;
use super::intent::TouchContext;
use super::state::InputModality;
use super::timers::{TimerQueue, TimerTask};
use super::touch::TouchPoint;
use crate::camera::{CameraAdapter, PanRequest};
use crate::settings::{SettingsExt, SettingsProvider};

/// Most touches that still drive a pan or scroll
const MAX_GESTURE_TOUCHES: usize = 4;

/// Kind of surface a registry observes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceKind {
    /// The main scene: zoom and pan gestures
    #[default]
    Canvas,
    /// Floating windows: multi-finger scrolling
    Window,
}

impl SurfaceKind {
    fn event_map(self) -> EventMap {
        match self {
            Self::Canvas => EventMap::canvas(),
            Self::Window => EventMap::window(),
        }
    }
}

/// A touch held still long enough in secondary-click state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldEvent {
    pub id: TouchId,
    /// Screen position of the touch
    pub position: DVec2,
    /// World point under the touch
    pub world: DVec2,
    pub held_for: Duration,
}

/// Scrollable element on a window surface
pub trait ScrollTarget {
    /// Scroll offset of the scrollable element containing `target`, `None`
    /// when nothing there scrolls
    fn scroll_top(&self, target: TargetId) -> Option<f64>;

    fn set_scroll_top(&mut self, target: TargetId, value: f64);
}

type HoldObserver = Box<dyn FnMut(HoldEvent)>;

/// Tracks the touches of one surface and turns them into synthetic events
/// and camera updates
pub struct TouchRegistry<C, S, K> {
    surface: SurfaceKind,
    camera: C,
    settings: S,
    sink: K,
    dispatcher: SyntheticDispatcher,
    touches: IndexMap<TouchId, TouchPoint>,
    timers: TimerQueue<TimerTask>,
    gestures_enabled: bool,
    locked: bool,
    zoom: ZoomGesture,
    pan: PanGesture,
    forced_zoom_threshold: Option<f64>,
    forced_pan_threshold: Option<f64>,
    hold_observer: Option<HoldObserver>,
    scroll_target: Option<Box<dyn ScrollTarget>>,
    scroll_start: Option<f64>,
    modality: InputModality,
    activity: GestureActivity,
    last_seen: Option<Instant>,
}

impl<C, S, K> TouchRegistry<C, S, K>
where
    C: CameraAdapter,
    S: SettingsProvider,
    K: EventSink,
{
    pub fn new(surface: SurfaceKind, camera: C, settings: S, sink: K) -> Self {
        Self {
            surface,
            camera,
            settings,
            sink,
            dispatcher: SyntheticDispatcher::new(surface.event_map()),
            touches: IndexMap::new(),
            timers: TimerQueue::new(),
            gestures_enabled: true,
            locked: false,
            zoom: ZoomGesture::default(),
            pan: PanGesture::default(),
            forced_zoom_threshold: None,
            forced_pan_threshold: None,
            hold_observer: None,
            scroll_target: None,
            scroll_start: None,
            modality: InputModality::default(),
            activity: GestureActivity::new(),
            last_seen: None,
        }
    }

    /// Registry for the main scene
    pub fn canvas(camera: C, settings: S, sink: K) -> Self {
        Self::new(SurfaceKind::Canvas, camera, settings, sink)
    }

    /// Registry for floating windows
    pub fn window(camera: C, settings: S, sink: K) -> Self {
        Self::new(SurfaceKind::Window, camera, settings, sink)
    }

    pub fn with_event_map(mut self, map: EventMap) -> Self {
        self.dispatcher = SyntheticDispatcher::new(map);
        self
    }

    pub fn with_scroll_target(mut self, target: Box<dyn ScrollTarget>) -> Self {
        self.scroll_target = Some(target);
        self
    }

    /// Inject the side effect run when a secondary click is held still
    pub fn on_hold(&mut self, observer: impl FnMut(HoldEvent) + 'static) {
        self.hold_observer = Some(Box::new(observer));
    }

    /// Feed one platform sample
    ///
    /// Returns true if the sample was consumed into touch tracking. Synthetic
    /// envelopes and non-touch pointers are never tracked; bad samples are
    /// logged and dropped.
    pub fn handle(&mut self, envelope: &Envelope) -> bool {
        if envelope.is_synthetic() {
            trace!(id = %envelope.original.id, "Ignoring synthetic sample");
            return false;
        }
        let sample = &envelope.original;
        self.modality = self.modality.observe(sample.pointer);
        if sample.pointer != PointerKind::Touch {
            return false;
        }

        self.poll_timers(sample.timestamp);
        self.last_seen = Some(sample.timestamp);

        let result = match sample.kind {
            RawEventKind::Down => self.on_down(sample),
            RawEventKind::Move => self.on_move(sample),
            RawEventKind::Up => self.on_up(sample),
            RawEventKind::Cancel => {
                self.cancel_all();
                Ok(())
            }
        };
        self.activity.set(self.is_gesture_active());

        match result {
            Ok(()) => true,
            Err(error @ InputError::UnknownTouch(_)) => {
                warn!(%error, "Dropping sample");
                false
            }
            Err(error) => {
                debug!(%error, "Dropping sample");
                false
            }
        }
    }

    /// Fire every timer due at `now`, in deadline order
    ///
    /// Returns the number of timers that fired.
    pub fn poll_timers(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        while let Some((_, task)) = self.timers.pop_due(now) {
            fired += 1;
            match task {
                TimerTask::LongPress(id) => self.on_long_press(id, now),
                TimerTask::Ping(id) => self.on_ping(id, now),
                TimerTask::Deferred(event) => self.sink.dispatch(event),
            }
        }
        fired
    }

    /// When the host should call [`Self::poll_timers`] next
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Drop every touch as if the platform cancelled all contacts
    ///
    /// Forwarding touches get a cancel event. Afterwards the registry matches
    /// a fresh one, apart from the external gesture enable flag.
    pub fn cancel_all(&mut self) {
        let now = self.clock();
        let mut forwarder = Forwarder {
            dispatcher: &self.dispatcher,
            sink: &mut self.sink,
            timers: &mut self.timers,
            now,
        };
        for (_, mut touch) in self.touches.drain(..) {
            touch.end(&mut forwarder, LogicalEventKind::Cancel);
            touch.destroy(forwarder.timers);
        }
        self.timers.clear();
        self.reset_gestures();
        self.locked = false;
        self.scroll_start = None;
        self.activity.set(false);
        debug!("All touches cancelled");
    }

    /// Forward a logical event for a tracked touch under its current context
    pub fn forward(&mut self, id: TouchId, kind: LogicalEventKind) -> Result<(), InputError> {
        let now = self.clock();
        let touch = self.touches.get_mut(&id).ok_or(InputError::UnknownTouch(id))?;
        let mut forwarder = Forwarder {
            dispatcher: &self.dispatcher,
            sink: &mut self.sink,
            timers: &mut self.timers,
            now,
        };
        match kind {
            LogicalEventKind::End | LogicalEventKind::Cancel => touch.end(&mut forwarder, kind),
            LogicalEventKind::Start | LogicalEventKind::Move => touch.forward(&mut forwarder, kind),
        };
        Ok(())
    }

    /// Suspend zoom, pan and scroll handling; touches are still tracked
    pub fn disable_gestures(&mut self) {
        if self.gestures_enabled {
            self.gestures_enabled = false;
            debug!("Gestures disabled");
        }
    }

    pub fn enable_gestures(&mut self) {
        if !self.gestures_enabled {
            self.gestures_enabled = true;
            debug!("Gestures enabled");
        }
    }

    /// Override the zoom sensitivity setting (calibration); `None` restores it
    pub fn force_zoom_threshold(&mut self, sensitivity: Option<f64>) {
        self.forced_zoom_threshold = sensitivity;
    }

    /// Override the pan sensitivity setting (calibration); `None` restores it
    pub fn force_pan_threshold(&mut self, sensitivity: Option<f64>) {
        self.forced_pan_threshold = sensitivity;
    }

    pub fn surface(&self) -> SurfaceKind {
        self.surface
    }

    pub fn active_count(&self) -> usize {
        self.touches.len()
    }

    pub fn touch(&self, id: TouchId) -> Option<&TouchPoint> {
        self.touches.get(&id)
    }

    /// Active touch ids, first touch first
    pub fn touch_ids(&self) -> impl Iterator<Item = TouchId> + '_ {
        self.touches.keys().copied()
    }

    pub fn zoom_gesture(&self) -> &ZoomGesture {
        &self.zoom
    }

    pub fn pan_gesture(&self) -> &PanGesture {
        &self.pan
    }

    /// Returns true while a zoom, pan or scroll is in progress
    pub fn is_gesture_active(&self) -> bool {
        self.zoom.is_active() || self.pan.is_active() || self.scroll_start.is_some()
    }

    /// Returns true if the external flag allows gestures
    pub fn gestures_enabled(&self) -> bool {
        self.gestures_enabled
    }

    /// Returns true while gestures are locked after a finger lifted
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Shared flag mirroring [`Self::is_gesture_active`] for interception points
    pub fn activity(&self) -> GestureActivity {
        self.activity.clone()
    }

    pub fn modality(&self) -> InputModality {
        self.modality
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut S {
        &mut self.settings
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    fn on_down(&mut self, sample: &RawSample) -> Result<(), InputError> {
        let position = sample.require_position()?;
        if self.touches.contains_key(&sample.id) {
            trace!(id = %sample.id, "Repeated down, treating as move");
            return self.on_move(sample);
        }

        let count = self.touches.len() + 1;
        let context = TouchContext::classify(count);
        let now = sample.timestamp;
        let timing = self.settings.hold_timing();

        let mut forwarder = Forwarder {
            dispatcher: &self.dispatcher,
            sink: &mut self.sink,
            timers: &mut self.timers,
            now,
        };
        if count >= 2 {
            // Releases any held primary click, which also ends host drags
            for touch in self.touches.values_mut() {
                touch.change_context(TouchContext::ZoomPanGesture, &mut forwarder);
                touch.cancel_hold_timers(forwarder.timers);
            }
        }

        let mut touch = TouchPoint::create(
            sample,
            position,
            context,
            &self.camera,
            forwarder.timers,
            &timing,
        );
        touch.forward(&mut forwarder, LogicalEventKind::Start);
        debug!(id = %sample.id, count, context = context.name(), "Touch added");
        self.touches.insert(sample.id, touch);

        if self.surface == SurfaceKind::Canvas {
            if count == ZOOM_MIN_TOUCHES
                && let Some(pair) = self.first_two()
            {
                self.zoom.initiate(pair);
            }
            if count == self.settings.gesture_mode().pan_min_touches()
                && let Some(reference) = self.pan_reference()
            {
                self.pan.initiate(reference);
            }
        }
        Ok(())
    }

    fn on_move(&mut self, sample: &RawSample) -> Result<(), InputError> {
        let position = sample.require_position()?;
        let threshold = self.settings.long_press_move_threshold();
        let Some(touch) = self.touches.get_mut(&sample.id) else {
            debug!(id = %sample.id, "Move before down, creating touch");
            return self.on_down(sample);
        };

        touch.update(position, sample.screen_position, sample.modifiers, sample.target);
        if touch.moved_beyond(threshold) && !touch.hold_timers_cancelled() {
            trace!(id = %touch.id, "Moved too far for a long press");
            touch.cancel_hold_timers(&mut self.timers);
        }
        let mut forwarder = Forwarder {
            dispatcher: &self.dispatcher,
            sink: &mut self.sink,
            timers: &mut self.timers,
            now: sample.timestamp,
        };
        touch.forward(&mut forwarder, LogicalEventKind::Move);

        if self.gestures_allowed() {
            self.run_gestures();
        }
        Ok(())
    }

    fn on_up(&mut self, sample: &RawSample) -> Result<(), InputError> {
        let mut touch = self
            .touches
            .shift_remove(&sample.id)
            .ok_or(InputError::UnknownTouch(sample.id))?;
        if let Some(position) = sample.position
            && position != touch.current
        {
            touch.update(position, sample.screen_position, sample.modifiers, sample.target);
        }

        let mut forwarder = Forwarder {
            dispatcher: &self.dispatcher,
            sink: &mut self.sink,
            timers: &mut self.timers,
            now: sample.timestamp,
        };
        touch.end(&mut forwarder, LogicalEventKind::End);
        touch.destroy(forwarder.timers);

        let remaining = self.touches.len();
        debug!(id = %sample.id, remaining, "Touch removed");
        self.scroll_start = None;
        if remaining == 0 {
            if self.locked && self.settings.debug_mode() {
                info!("Gestures unlocked");
            }
            self.locked = false;
            self.reset_gestures();
            return Ok(());
        }

        if self.settings.lock_gestures_after_release() && !self.locked {
            self.locked = true;
            if self.settings.debug_mode() {
                info!(remaining, "Gestures locked until every touch lifts");
            }
        }
        if remaining < ZOOM_MIN_TOUCHES {
            self.zoom.reset();
        }
        if remaining < self.settings.gesture_mode().pan_min_touches() {
            self.pan.reset();
        }
        Ok(())
    }

    fn on_long_press(&mut self, id: TouchId, now: Instant) {
        let threshold = self.settings.long_press_move_threshold();
        let count = self.touches.len();
        let Some(touch) = self.touches.get_mut(&id) else {
            return;
        };
        touch.long_press_fired();
        if touch.context != TouchContext::PrimaryClick || touch.moved_beyond(threshold) || count >= 2 {
            trace!(%id, "Long press no longer applies");
            return;
        }

        let mut forwarder = Forwarder {
            dispatcher: &self.dispatcher,
            sink: &mut self.sink,
            timers: &mut self.timers,
            now,
        };
        if touch.change_context(TouchContext::SecondaryClick, &mut forwarder) {
            debug!(%id, "Long press promoted touch to secondary click");
        }
    }

    fn on_ping(&mut self, id: TouchId, now: Instant) {
        let threshold = self.settings.long_press_move_threshold();
        let count = self.touches.len();
        let Some(touch) = self.touches.get_mut(&id) else {
            return;
        };
        touch.ping_fired();
        if touch.context != TouchContext::SecondaryClick || touch.moved_beyond(threshold) || count >= 2 {
            return;
        }

        let event = HoldEvent {
            id,
            position: touch.current,
            world: self.camera.screen_to_world(touch.current),
            held_for: touch.held_for(now),
        };
        match self.hold_observer.as_mut() {
            Some(observer) => observer(event),
            None => debug!(%id, "Touch held, no observer"),
        }
    }

    fn gestures_allowed(&self) -> bool {
        self.gestures_enabled && !self.locked && self.settings.gesture_mode() != GestureMode::Off
    }

    fn run_gestures(&mut self) {
        let count = self.touches.len();
        match self.surface {
            SurfaceKind::Canvas => match (count, self.settings.gesture_mode()) {
                (2, GestureMode::Split) => self.zoom_only(),
                (2, _) => self.zoom_and_pan(),
                (3..=MAX_GESTURE_TOUCHES, _) => self.pan_only(),
                _ => {}
            },
            SurfaceKind::Window => {
                if (2..=MAX_GESTURE_TOUCHES).contains(&count) {
                    self.scroll();
                }
            }
        }
    }

    fn zoom_only(&mut self) {
        if let Some(zoom) = self.update_zoom() {
            self.camera.pan(PanRequest {
                center: None,
                zoom: Some(zoom),
            });
        }
    }

    fn zoom_and_pan(&mut self) {
        let zoom = self.update_zoom();
        let center = self.update_pan(zoom);
        if zoom.is_some() || center.is_some() {
            self.camera.pan(PanRequest { center, zoom });
        }
    }

    fn pan_only(&mut self) {
        if let Some(center) = self.update_pan(None) {
            self.camera.pan(PanRequest {
                center: Some(center),
                zoom: None,
            });
        }
    }

    /// Advance the zoom gesture; returns the zoom to apply while active
    fn update_zoom(&mut self) -> Option<f64> {
        if !self.camera.zoom_allowed() {
            return None;
        }
        let pair = self.first_two()?;
        self.zoom.initiate(pair);
        if self.zoom.status == GestureStatus::Waiting
            && self
                .zoom
                .exceeds_threshold(pair, gesture::zoom_threshold_px(self.zoom_sensitivity()))
        {
            self.zoom.activate(pair, &self.camera);
            debug!(zoom = self.camera.current_zoom(), "Zoom gesture active");
        }

        let pending = self.camera.clamp_zoom(self.zoom.target_zoom(pair)?);
        let current = self.camera.current_zoom();
        if self.camera.round_zoom(pending) == self.camera.round_zoom(current) {
            Some(current)
        } else {
            Some(pending)
        }
    }

    /// Advance the pan gesture; returns the new camera center while active
    ///
    /// `zoom` is the zoom about to be applied in the same update.
    fn update_pan(&mut self, zoom: Option<f64>) -> Option<DVec2> {
        if !self.camera.pan_allowed() {
            return None;
        }
        let reference = self.pan_reference()?;
        self.pan.initiate(reference);
        let threshold = gesture::pan_threshold_px(self.pan_sensitivity());
        if !self.pan.is_active() {
            if !self.pan.update(reference, threshold) {
                return None;
            }
            debug!("Pan gesture active");
        }

        let current = self.camera.current_zoom();
        let transform = match zoom {
            Some(zoom) if zoom != current => self.camera.transform_with_zoom(zoom),
            _ => self.camera.transform(),
        };
        let touches: Vec<(DVec2, DVec2)> = self
            .touches
            .values()
            .map(|t| (t.current, t.world))
            .collect();
        let correction = gesture::pan_correction(&transform, &touches, self.settings.pan_anchor())?;
        Some(gesture::pan_target(&self.camera, correction))
    }

    fn scroll(&mut self) {
        let Some(first) = self.touches.values().next() else {
            return;
        };
        let (target, delta) = (first.target, first.start.y - first.current.y);
        let Some(scrollable) = self.scroll_target.as_mut() else {
            return;
        };
        let start = match self.scroll_start {
            Some(start) => start,
            None => {
                let Some(top) = scrollable.scroll_top(target) else {
                    return;
                };
                self.scroll_start = Some(top);
                top
            }
        };
        scrollable.set_scroll_top(target, start + delta);
    }

    fn first_two(&self) -> Option<[DVec2; 2]> {
        let mut touches = self.touches.values();
        Some([touches.next()?.current, touches.next()?.current])
    }

    fn pan_reference(&self) -> Option<DVec2> {
        let currents: Vec<DVec2> = self.touches.values().map(|t| t.current).collect();
        gesture::pan_reference(&currents, self.settings.pan_anchor())
    }

    fn zoom_sensitivity(&self) -> f64 {
        self.forced_zoom_threshold
            .map_or_else(|| self.settings.zoom_sensitivity(), |s| s.clamp(0.0, 100.0))
    }

    fn pan_sensitivity(&self) -> f64 {
        self.forced_pan_threshold
            .map_or_else(|| self.settings.pan_sensitivity(), |s| s.clamp(0.0, 100.0))
    }

    fn reset_gestures(&mut self) {
        self.zoom.reset();
        self.pan.reset();
    }

    fn clock(&self) -> Instant {
        self.last_seen.unwrap_or_else(Instant::now)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::camera::Camera2D;
    use crate::input::dispatcher::ExpansionStep;
    use crate::input::events::{MouseButton, SyntheticEvent, SyntheticKind};
    use crate::settings::{DefaultSettings, SettingValue, names};

    type Registry = TouchRegistry<Camera2D, HashMap<String, SettingValue>, Vec<SyntheticEvent>>;

    struct Clock(Instant);

    impl Clock {
        fn at(&self, ms: u64) -> Instant {
            self.0 + Duration::from_millis(ms)
        }
    }

    fn registry() -> (Registry, Clock) {
        let registry = TouchRegistry::canvas(Camera2D::new(800.0, 600.0), HashMap::new(), Vec::new());
        (registry, Clock(Instant::now()))
    }

    fn sample(kind: RawEventKind, id: u64, x: f64, y: f64, at: Instant) -> Envelope {
        Envelope::platform(RawSample::new(kind, TouchId(id), DVec2::new(x, y), at))
    }

    fn pressed(events: &[SyntheticEvent]) -> Vec<(SyntheticKind, Option<MouseButton>)> {
        events
            .iter()
            .filter(|e| e.kind != SyntheticKind::PointerMove)
            .map(|e| (e.kind, e.button))
            .collect()
    }

    #[test]
    fn test_synthetic_envelopes_are_ignored() {
        let (mut registry, clock) = registry();
        let mut envelope = sample(RawEventKind::Down, 1, 10.0, 10.0, clock.at(0));
        envelope.source = crate::input::events::EventSource::Synthetic;

        assert!(!registry.handle(&envelope));
        assert_eq!(registry.active_count(), 0);
        assert!(registry.sink().is_empty());
    }

    #[test]
    fn test_mouse_only_updates_modality() {
        let (mut registry, clock) = registry();
        let mut envelope = sample(RawEventKind::Down, 1, 10.0, 10.0, clock.at(0));
        envelope.original.pointer = PointerKind::Mouse;

        assert!(!registry.handle(&envelope));
        assert_eq!(registry.modality(), InputModality::Mouse);
        assert_eq!(registry.active_count(), 0);

        registry.handle(&sample(RawEventKind::Down, 2, 10.0, 10.0, clock.at(5)));
        assert!(registry.modality().is_touch());
    }

    #[test]
    fn test_malformed_sample_is_dropped() {
        let (mut registry, clock) = registry();
        let envelope = Envelope::platform(RawSample::without_position(
            RawEventKind::Down,
            TouchId(1),
            clock.at(0),
        ));
        assert!(!registry.handle(&envelope));
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_move_before_down_creates_touch() {
        let (mut registry, clock) = registry();
        assert!(registry.handle(&sample(RawEventKind::Move, 3, 40.0, 50.0, clock.at(0))));
        assert_eq!(registry.active_count(), 1);
        assert_eq!(
            registry.touch(TouchId(3)).map(|t| t.context),
            Some(TouchContext::PrimaryClick)
        );
    }

    #[test]
    fn test_up_for_unknown_touch_is_rejected() {
        let (mut registry, clock) = registry();
        assert!(!registry.handle(&sample(RawEventKind::Up, 9, 0.0, 0.0, clock.at(0))));
        assert!(registry.sink().is_empty());
    }

    #[test]
    fn test_forward_unknown_touch() {
        let (mut registry, _) = registry();
        assert_eq!(
            registry.forward(TouchId(5), LogicalEventKind::Move),
            Err(InputError::UnknownTouch(TouchId(5)))
        );
    }

    #[test]
    fn test_movement_cancels_long_press() {
        let (mut registry, clock) = registry();
        registry.handle(&sample(RawEventKind::Down, 1, 100.0, 100.0, clock.at(0)));
        assert_eq!(registry.pending_timers(), 2);

        registry.handle(&sample(RawEventKind::Move, 1, 130.0, 100.0, clock.at(100)));
        assert_eq!(registry.pending_timers(), 0);

        registry.poll_timers(clock.at(2000));
        assert_eq!(
            registry.touch(TouchId(1)).map(|t| t.context),
            Some(TouchContext::PrimaryClick)
        );
    }

    #[test]
    fn test_second_touch_releases_primary_drag() {
        let (mut registry, clock) = registry();
        registry.handle(&sample(RawEventKind::Down, 1, 100.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Down, 2, 300.0, 100.0, clock.at(10)));

        assert_eq!(
            pressed(registry.sink()),
            vec![
                (SyntheticKind::PointerDown, Some(MouseButton::Left)),
                (SyntheticKind::PointerUp, Some(MouseButton::Left)),
            ]
        );
        for id in [1, 2] {
            assert_eq!(
                registry.touch(TouchId(id)).map(|t| t.context),
                Some(TouchContext::ZoomPanGesture)
            );
        }
        assert_eq!(registry.pending_timers(), 0);
        assert_eq!(registry.zoom_gesture().status, GestureStatus::Waiting);
    }

    #[test]
    fn test_ping_reaches_hold_observer() {
        let (mut registry, clock) = registry();
        let holds = Rc::new(RefCell::new(Vec::new()));
        let seen = holds.clone();
        registry.on_hold(move |event| seen.borrow_mut().push(event));

        registry.handle(&sample(RawEventKind::Down, 1, 100.0, 100.0, clock.at(0)));
        registry.poll_timers(clock.at(400));
        registry.poll_timers(clock.at(1000));

        let holds = holds.borrow();
        assert_eq!(holds.len(), 1);
        assert_eq!(holds[0].id, TouchId(1));
        assert_eq!(holds[0].position, DVec2::new(100.0, 100.0));
        assert_eq!(holds[0].held_for, Duration::from_millis(1000));
    }

    #[test]
    fn test_disabled_gestures_still_track() {
        let (mut registry, clock) = registry();
        registry.disable_gestures();
        registry.disable_gestures();

        registry.handle(&sample(RawEventKind::Down, 1, 100.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Down, 2, 300.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Move, 2, 400.0, 100.0, clock.at(20)));

        assert_eq!(registry.active_count(), 2);
        assert_eq!(registry.camera().zoom, 1.0);
        assert!(!registry.zoom_gesture().is_active());

        registry.enable_gestures();
        registry.handle(&sample(RawEventKind::Move, 2, 420.0, 100.0, clock.at(40)));
        assert!(registry.zoom_gesture().is_active());
    }

    #[test]
    fn test_release_locks_gestures_until_all_lift() {
        let (mut registry, clock) = registry();
        registry.handle(&sample(RawEventKind::Down, 1, 100.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Down, 2, 300.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Down, 3, 200.0, 300.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Up, 3, 200.0, 300.0, clock.at(50)));
        assert!(registry.is_locked());

        registry.handle(&sample(RawEventKind::Move, 2, 500.0, 100.0, clock.at(60)));
        assert_eq!(registry.camera().zoom, 1.0);

        registry.handle(&sample(RawEventKind::Up, 1, 100.0, 100.0, clock.at(70)));
        registry.handle(&sample(RawEventKind::Up, 2, 500.0, 100.0, clock.at(80)));
        assert!(!registry.is_locked());
        assert_eq!(registry.zoom_gesture().status, GestureStatus::None);
    }

    #[test]
    fn test_lockout_can_be_turned_off() {
        let (mut registry, clock) = registry();
        registry
            .settings_mut()
            .insert(names::LOCK_GESTURES_AFTER_RELEASE.to_string(), false.into());
        registry.handle(&sample(RawEventKind::Down, 1, 100.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Down, 2, 300.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Down, 3, 200.0, 300.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Up, 3, 200.0, 300.0, clock.at(50)));

        assert!(!registry.is_locked());
        registry.handle(&sample(RawEventKind::Move, 2, 500.0, 100.0, clock.at(60)));
        assert_eq!(registry.camera().zoom, 2.0);
    }

    #[test]
    fn test_gesture_mode_off() {
        let (mut registry, clock) = registry();
        registry
            .settings_mut()
            .insert(names::GESTURE_MODE.to_string(), "off".into());
        registry.handle(&sample(RawEventKind::Down, 1, 100.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Down, 2, 300.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Move, 2, 500.0, 100.0, clock.at(20)));

        assert_eq!(registry.camera().zoom, 1.0);
        assert_eq!(registry.camera().center, DVec2::new(400.0, 300.0));
    }

    #[test]
    fn test_forced_threshold_blocks_zoom() {
        let (mut registry, clock) = registry();
        registry.force_zoom_threshold(Some(0.0));
        registry
            .settings_mut()
            .insert(names::GESTURE_MODE.to_string(), "split".into());
        registry.handle(&sample(RawEventKind::Down, 1, 100.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Down, 2, 300.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Move, 2, 700.0, 100.0, clock.at(20)));
        assert_eq!(registry.zoom_gesture().status, GestureStatus::Waiting);

        registry.force_zoom_threshold(None);
        registry.handle(&sample(RawEventKind::Move, 2, 710.0, 100.0, clock.at(40)));
        assert!(registry.zoom_gesture().is_active());
    }

    #[test]
    fn test_tie_break_keeps_current_zoom() {
        let (mut registry, clock) = registry();
        registry
            .settings_mut()
            .insert(names::GESTURE_MODE.to_string(), "split".into());
        registry.handle(&sample(RawEventKind::Down, 1, 100.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Down, 2, 300.0, 100.0, clock.at(0)));
        // 200.5 / 200 rounds to the current 1.00
        registry.handle(&sample(RawEventKind::Move, 2, 300.5, 100.0, clock.at(20)));

        assert!(registry.zoom_gesture().is_active());
        assert_eq!(registry.camera().zoom, 1.0);
    }

    #[test]
    fn test_camera_lock_blocks_zoom() {
        let (mut registry, clock) = registry();
        registry.camera_mut().zoom_locked = true;
        registry.handle(&sample(RawEventKind::Down, 1, 100.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Down, 2, 300.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Move, 2, 500.0, 100.0, clock.at(20)));

        assert!(!registry.zoom_gesture().is_active());
        assert_eq!(registry.camera().zoom, 1.0);
    }

    #[test]
    fn test_activity_flag_follows_gestures() {
        let (mut registry, clock) = registry();
        let activity = registry.activity();
        registry.handle(&sample(RawEventKind::Down, 1, 100.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Down, 2, 300.0, 100.0, clock.at(0)));
        assert!(!activity.is_active());

        registry.handle(&sample(RawEventKind::Move, 2, 350.0, 100.0, clock.at(20)));
        assert!(activity.is_active());

        registry.cancel_all();
        assert!(!activity.is_active());
    }

    #[test]
    fn test_default_settings_provider() {
        let mut registry = TouchRegistry::canvas(Camera2D::default(), DefaultSettings, Vec::<SyntheticEvent>::new());
        let now = Instant::now();
        registry.handle(&sample(RawEventKind::Down, 1, 10.0, 10.0, now));
        registry.handle(&sample(RawEventKind::Up, 1, 10.0, 10.0, now));
        assert_eq!(pressed(registry.sink()).len(), 2);
    }

    fn delayed_press_map() -> EventMap {
        EventMap {
            start: vec![
                ExpansionStep::hover(),
                ExpansionStep::new(SyntheticKind::PointerDown).with_delay(Duration::from_millis(30)),
            ],
            ..EventMap::window()
        }
    }

    fn kinds(events: &[SyntheticEvent]) -> Vec<SyntheticKind> {
        events.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_release_drops_pending_press() {
        let (registry, clock) = registry();
        let mut registry = registry.with_event_map(delayed_press_map());
        registry.handle(&sample(RawEventKind::Down, 1, 100.0, 100.0, clock.at(0)));
        assert_eq!(registry.pending_timers(), 3);
        assert_eq!(registry.touch(TouchId(1)).map(|t| t.pending_deferred()), Some(1));

        registry.handle(&sample(RawEventKind::Up, 1, 100.0, 100.0, clock.at(10)));
        assert_eq!(registry.pending_timers(), 0);

        registry.poll_timers(clock.at(100));
        assert_eq!(
            kinds(registry.sink()),
            vec![SyntheticKind::PointerMove, SyntheticKind::PointerUp]
        );
    }

    #[test]
    fn test_delayed_press_lands_before_release() {
        let (registry, clock) = registry();
        let mut registry = registry.with_event_map(delayed_press_map());
        registry.handle(&sample(RawEventKind::Down, 1, 100.0, 100.0, clock.at(0)));
        assert_eq!(registry.next_deadline(), Some(clock.at(30)));

        assert_eq!(registry.poll_timers(clock.at(30)), 1);
        registry.handle(&sample(RawEventKind::Up, 1, 100.0, 100.0, clock.at(50)));
        assert_eq!(
            kinds(registry.sink()),
            vec![
                SyntheticKind::PointerMove,
                SyntheticKind::PointerDown,
                SyntheticKind::PointerUp
            ]
        );
        assert_eq!(registry.pending_timers(), 0);
    }

    #[test]
    fn test_second_touch_drops_pending_press() {
        let (registry, clock) = registry();
        let mut registry = registry.with_event_map(delayed_press_map());
        registry.handle(&sample(RawEventKind::Down, 1, 100.0, 100.0, clock.at(0)));
        registry.handle(&sample(RawEventKind::Down, 2, 300.0, 100.0, clock.at(10)));
        registry.poll_timers(clock.at(100));

        assert_eq!(
            kinds(registry.sink()),
            vec![SyntheticKind::PointerMove, SyntheticKind::PointerUp]
        );
    }
}
