//! Gesture engine self-test
//!
//! Runs short scripted interactions against a fresh registry and compares
//! what comes out with what a host should see.

use std::time::{Duration, Instant};

use glam::DVec2;

use crate::camera::{Camera2D, CameraAdapter};
use crate::health::check::{CheckResult, SystemCheck};
use crate::input::{
    Envelope, MouseButton, RawEventKind, RawSample, SyntheticEvent, SyntheticKind, TouchId, TouchRegistry,
};
use crate::settings::DefaultSettings;

type Registry = TouchRegistry<Camera2D, DefaultSettings, Vec<SyntheticEvent>>;

/// Tap, long-press and pinch scripts against the reference camera
#[derive(Default)]
pub struct GestureCheck;

impl GestureCheck {
    pub fn new() -> Self {
        Self
    }
}

fn registry() -> Registry {
    TouchRegistry::canvas(Camera2D::new(800.0, 600.0), DefaultSettings, Vec::new())
}

fn sample(registry: &mut Registry, kind: RawEventKind, id: u64, at: Instant, x: f64, y: f64) {
    registry.handle(&Envelope::platform(RawSample::new(kind, TouchId(id), DVec2::new(x, y), at)));
}

fn buttons(events: &[SyntheticEvent]) -> Vec<(SyntheticKind, Option<MouseButton>)> {
    events
        .iter()
        .filter(|e| e.kind != SyntheticKind::PointerMove)
        .map(|e| (e.kind, e.button))
        .collect()
}

fn tap() -> Result<String, String> {
    let mut registry = registry();
    let start = Instant::now();
    sample(&mut registry, RawEventKind::Down, 1, start, 100.0, 100.0);
    sample(&mut registry, RawEventKind::Up, 1, start + Duration::from_millis(50), 100.0, 100.0);

    let expected = vec![
        (SyntheticKind::PointerDown, Some(MouseButton::Left)),
        (SyntheticKind::PointerUp, Some(MouseButton::Left)),
    ];
    let got = buttons(registry.sink());
    if got == expected {
        Ok("tap: one left click".to_string())
    } else {
        Err(format!("tap produced {got:?}"))
    }
}

fn long_press() -> Result<String, String> {
    let mut registry = registry();
    let start = Instant::now();
    sample(&mut registry, RawEventKind::Down, 1, start, 200.0, 200.0);
    registry.poll_timers(start + Duration::from_millis(600));
    sample(&mut registry, RawEventKind::Up, 1, start + Duration::from_millis(700), 200.0, 200.0);

    let expected = vec![
        (SyntheticKind::PointerDown, Some(MouseButton::Left)),
        (SyntheticKind::PointerUp, Some(MouseButton::Left)),
        (SyntheticKind::PointerDown, Some(MouseButton::Right)),
        (SyntheticKind::PointerUp, Some(MouseButton::Right)),
    ];
    let got = buttons(registry.sink());
    if got == expected {
        Ok("long press: promoted to right click".to_string())
    } else {
        Err(format!("long press produced {got:?}"))
    }
}

fn pinch() -> Result<String, String> {
    let mut registry = registry();
    let start = Instant::now();
    sample(&mut registry, RawEventKind::Down, 1, start, 100.0, 100.0);
    sample(&mut registry, RawEventKind::Down, 2, start, 300.0, 100.0);
    let later = start + Duration::from_millis(16);
    sample(&mut registry, RawEventKind::Move, 1, later, 50.0, 100.0);
    sample(&mut registry, RawEventKind::Move, 2, later, 350.0, 100.0);

    let zoom = registry.camera().current_zoom();
    if (zoom - 1.5).abs() < 1e-9 {
        Ok(format!("pinch: zoom {zoom:.2}"))
    } else {
        Err(format!("pinch gave zoom {zoom:.2}, expected 1.50"))
    }
}

impl SystemCheck for GestureCheck {
    fn name(&self) -> &'static str {
        "Gesture Engine"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Runs tap, long-press and pinch scripts through a touch registry")
    }

    fn check(&self) -> CheckResult {
        let outcomes = [tap(), long_press(), pinch()];
        let failures = outcomes.iter().filter(|o| o.is_err()).count();
        let details = outcomes.iter().map(|o| match o {
            Ok(line) => format!("✓ {line}"),
            Err(line) => format!("✗ {line}"),
        });

        if failures == 0 {
            CheckResult::pass(format!("{} scripts behaved", outcomes.len())).with_details(details)
        } else {
            CheckResult::fail(format!("{failures} of {} scripts misbehaved", outcomes.len())).with_details(details)
        }
    }
}
