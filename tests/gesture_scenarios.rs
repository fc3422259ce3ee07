//! End-to-end touch scenarios against the reference camera

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use glam::DVec2;
use touch_bridge::camera::{Camera2D, CameraAdapter};
use touch_bridge::input::{
    Envelope, GestureStatus, MouseButton, RawEventKind, RawSample, ScrollTarget, SurfaceKind, SyntheticEvent,
    SyntheticKind, TargetId, TouchContext, TouchId, TouchRegistry,
};
use touch_bridge::settings::{SettingValue, names};

type Settings = HashMap<String, SettingValue>;
type Registry = TouchRegistry<Camera2D, Settings, Vec<SyntheticEvent>>;

struct Script {
    registry: Registry,
    start: Instant,
}

impl Script {
    fn canvas(settings: &[(&str, SettingValue)]) -> Self {
        let settings: Settings = settings.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        Self {
            registry: TouchRegistry::canvas(Camera2D::new(800.0, 600.0), settings, Vec::new()),
            start: Instant::now(),
        }
    }

    fn at(&self, ms: u64) -> Instant {
        self.start + Duration::from_millis(ms)
    }

    fn send(&mut self, kind: RawEventKind, id: u64, ms: u64, x: f64, y: f64) -> bool {
        let sample = RawSample::new(kind, TouchId(id), DVec2::new(x, y), self.at(ms));
        self.registry.handle(&Envelope::platform(sample))
    }

    fn pressed(&self) -> Vec<(SyntheticKind, Option<MouseButton>)> {
        self.registry
            .sink()
            .iter()
            .filter(|e| e.kind != SyntheticKind::PointerMove)
            .map(|e| (e.kind, e.button))
            .collect()
    }

    fn context(&self, id: u64) -> Option<TouchContext> {
        self.registry.touch(TouchId(id)).map(|t| t.context)
    }

    fn pinch_out(&mut self) {
        self.send(RawEventKind::Down, 1, 0, 100.0, 100.0);
        self.send(RawEventKind::Down, 2, 0, 300.0, 100.0);
        self.send(RawEventKind::Move, 1, 16, 50.0, 100.0);
        self.send(RawEventKind::Move, 2, 16, 350.0, 100.0);
    }
}

fn close(a: DVec2, b: DVec2) -> bool {
    (a - b).length() < 1e-9
}

#[test]
fn test_tap_is_one_left_click() {
    let mut script = Script::canvas(&[]);
    script.send(RawEventKind::Down, 1, 0, 100.0, 100.0);
    script.send(RawEventKind::Up, 1, 50, 100.0, 100.0);

    assert_eq!(
        script.pressed(),
        vec![
            (SyntheticKind::PointerDown, Some(MouseButton::Left)),
            (SyntheticKind::PointerUp, Some(MouseButton::Left)),
        ]
    );
    let down = script
        .registry
        .sink()
        .iter()
        .find(|e| e.kind == SyntheticKind::PointerDown)
        .unwrap();
    assert_eq!(down.position, DVec2::new(100.0, 100.0));
    assert_eq!(down.pointer_id, TouchId(1));
    assert_eq!(down.buttons.bits(), 1);
    assert_eq!(script.registry.pending_timers(), 0);
}

#[test]
fn test_long_press_promotes_once() {
    let mut script = Script::canvas(&[(names::RIGHT_CLICK_TIMEOUT, 500.0.into())]);
    script.send(RawEventKind::Down, 1, 0, 100.0, 100.0);

    script.registry.poll_timers(script.at(499));
    assert_eq!(script.pressed().len(), 1);
    assert_eq!(script.context(1), Some(TouchContext::PrimaryClick));

    for ms in [500, 600, 700, 2000] {
        script.registry.poll_timers(script.at(ms));
    }
    assert_eq!(script.context(1), Some(TouchContext::SecondaryClick));
    assert_eq!(script.pressed().len(), 3);

    script.send(RawEventKind::Up, 1, 2100, 100.0, 100.0);
    let presses: Vec<_> = script
        .registry
        .sink()
        .iter()
        .filter(|e| e.kind != SyntheticKind::PointerMove)
        .map(|e| (e.kind, e.button, e.buttons.bits(), e.position, e.pointer_id))
        .collect();
    let at = DVec2::new(100.0, 100.0);
    assert_eq!(
        presses,
        vec![
            (SyntheticKind::PointerDown, Some(MouseButton::Left), 1, at, TouchId(1)),
            (SyntheticKind::PointerUp, Some(MouseButton::Left), 1, at, TouchId(1)),
            (SyntheticKind::PointerDown, Some(MouseButton::Right), 2, at, TouchId(1)),
            (SyntheticKind::PointerUp, Some(MouseButton::Right), 2, at, TouchId(1)),
        ]
    );
}

#[test]
fn test_pinch_past_max_zoom_keeps_anchor_under_finger() {
    let mut script = Script::canvas(&[]);
    script.send(RawEventKind::Down, 1, 0, 300.0, 300.0);
    script.send(RawEventKind::Down, 2, 0, 500.0, 300.0);
    let finger = DVec2::new(200.0, 300.0);
    let anchor = DVec2::new(300.0, 300.0);

    script.send(RawEventKind::Move, 1, 16, 200.0, 300.0);
    let camera = script.registry.camera();
    assert!((camera.current_zoom() - 1.5).abs() < 1e-9);
    assert!(close(camera.screen_to_world(finger), anchor));

    // 900 / 200 asks for 4.5, the camera stops at 3
    script.send(RawEventKind::Move, 2, 32, 1100.0, 300.0);
    let camera = script.registry.camera();
    assert_eq!(camera.current_zoom(), camera.max_zoom);
    assert!(close(camera.screen_to_world(finger), anchor));

    script.send(RawEventKind::Move, 2, 48, 1200.0, 300.0);
    let camera = script.registry.camera();
    assert_eq!(camera.current_zoom(), 3.0);
    assert!(close(camera.screen_to_world(finger), anchor));
}

#[test]
fn test_pinch_zooms_and_third_touch_keeps_anchor() {
    let mut script = Script::canvas(&[(names::GESTURE_MODE, "split".into())]);
    script.pinch_out();
    assert!((script.registry.camera().current_zoom() - 1.5).abs() < 1e-9);

    let before = script.registry.zoom_gesture().clone();
    assert_eq!(
        before.initiating,
        Some([DVec2::new(100.0, 100.0), DVec2::new(300.0, 100.0)])
    );

    script.send(RawEventKind::Down, 3, 32, 200.0, 300.0);
    let after = script.registry.zoom_gesture();
    assert_eq!(after.initiating, before.initiating);
    assert_eq!(after.activation_world, before.activation_world);
    assert_eq!(script.registry.pan_gesture().status, GestureStatus::Waiting);
}

#[test]
fn test_round_trip_restores_activation_zoom() {
    let mut script = Script::canvas(&[]);
    script.pinch_out();
    let base = script.registry.zoom_gesture().base_zoom;
    assert_eq!(base, Some(1.0));

    script.send(RawEventKind::Move, 1, 32, 100.0, 100.0);
    script.send(RawEventKind::Move, 2, 32, 300.0, 100.0);
    assert!((script.registry.camera().current_zoom() - 1.0).abs() < 1e-9);
}

#[test]
fn test_cancel_restores_fresh_state() {
    let mut script = Script::canvas(&[]);
    script.send(RawEventKind::Down, 1, 0, 100.0, 100.0);
    script.pinch_out();
    script.send(RawEventKind::Down, 5, 20, 500.0, 500.0);

    script.registry.handle(&Envelope::platform(RawSample::without_position(
        RawEventKind::Cancel,
        TouchId(1),
        script.at(40),
    )));

    assert_eq!(script.registry.active_count(), 0);
    assert_eq!(script.registry.zoom_gesture().status, GestureStatus::None);
    assert_eq!(script.registry.pan_gesture().status, GestureStatus::None);
    assert_eq!(script.registry.pending_timers(), 0);
    assert!(!script.registry.is_locked());
    assert!(!script.registry.is_gesture_active());
}

#[test]
fn test_pan_keeps_world_point_under_first_finger() {
    let mut script = Script::canvas(&[]);
    script.registry.force_zoom_threshold(Some(0.0));
    script.send(RawEventKind::Down, 1, 0, 100.0, 100.0);
    script.send(RawEventKind::Down, 2, 0, 300.0, 100.0);
    script.send(RawEventKind::Move, 1, 16, 150.0, 100.0);

    let camera = script.registry.camera();
    assert_eq!(camera.current_zoom(), 1.0);
    assert!(close(camera.screen_to_world(DVec2::new(150.0, 100.0)), DVec2::new(100.0, 100.0)));

    script.send(RawEventKind::Move, 2, 16, 350.0, 100.0);
    let camera = script.registry.camera();
    assert!(close(camera.screen_to_world(DVec2::new(150.0, 100.0)), DVec2::new(100.0, 100.0)));
    assert!(close(camera.center, DVec2::new(350.0, 300.0)));
}

#[derive(Clone, Default)]
struct Scroller(Rc<RefCell<HashMap<TargetId, f64>>>);

impl ScrollTarget for Scroller {
    fn scroll_top(&self, target: TargetId) -> Option<f64> {
        self.0.borrow().get(&target).copied()
    }

    fn set_scroll_top(&mut self, target: TargetId, value: f64) {
        self.0.borrow_mut().insert(target, value);
    }
}

#[test]
fn test_window_surface_scrolls_with_two_fingers() {
    let scroller = Scroller::default();
    scroller.0.borrow_mut().insert(TargetId(7), 120.0);
    let mut registry = TouchRegistry::window(Camera2D::new(800.0, 600.0), Settings::new(), Vec::new())
        .with_scroll_target(Box::new(scroller.clone()));
    assert_eq!(registry.surface(), SurfaceKind::Window);

    let start = Instant::now();
    let send = |registry: &mut Registry, kind, id, y: f64| {
        let sample = RawSample::new(kind, TouchId(id), DVec2::new(100.0 * id as f64, y), start)
            .with_target(TargetId(7));
        registry.handle(&Envelope::platform(sample));
    };

    send(&mut registry, RawEventKind::Down, 1, 300.0);
    send(&mut registry, RawEventKind::Down, 2, 300.0);
    send(&mut registry, RawEventKind::Move, 1, 260.0);
    assert_eq!(scroller.0.borrow()[&TargetId(7)], 160.0);

    send(&mut registry, RawEventKind::Move, 1, 200.0);
    assert_eq!(scroller.0.borrow()[&TargetId(7)], 220.0);
    assert_eq!(registry.camera().zoom, 1.0);

    send(&mut registry, RawEventKind::Up, 2, 300.0);
    send(&mut registry, RawEventKind::Up, 1, 200.0);
    assert!(!registry.is_gesture_active());
}

#[test]
fn test_synthetic_echo_is_not_tracked() {
    let mut script = Script::canvas(&[]);
    script.send(RawEventKind::Down, 1, 0, 100.0, 100.0);
    let echoes: Vec<Envelope> = script
        .registry
        .sink()
        .iter()
        .map(|e| e.to_envelope(script.at(1)))
        .collect();

    for echo in &echoes {
        assert!(!script.registry.handle(echo));
    }
    assert_eq!(script.registry.active_count(), 1);
}
