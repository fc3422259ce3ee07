//! Recorded touch traces
//!
//! A trace is a TOML file listing raw samples with their offsets from the
//! start of the recording:
//!
//! ```toml
//! surface = "canvas"
//!
//! [camera]
//! width = 800.0
//! height = 600.0
//!
//! [[events]]
//! at_ms = 0
//! kind = "down"
//! id = 1
//! x = 100.0
//! y = 100.0
//! ```
//!
//! `[camera]`, `[gestures]` and `[timing]` sections replace the matching
//! sections of the loaded configuration for the duration of the replay.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use glam::DVec2;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::camera::Camera2D;
use crate::config::{BridgeConfig, CameraConfig, GestureConfig, TimingConfig};
use crate::input::{
    Envelope, EventMap, HoldEvent, InputError, PointerKind, RawEventKind, RawSample, SurfaceKind, SyntheticEvent,
    TargetId, TouchId, TouchRegistry,
};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse trace: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("event {index}: {source}")]
    Event { index: usize, source: InputError },

    #[error("event {index} at {at_ms}ms is earlier than the event before it")]
    OutOfOrder { index: usize, at_ms: u64 },
}

/// One recorded raw sample
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraceEvent {
    /// Offset from the start of the recording
    pub at_ms: u64,
    /// `down`, `move`, `up`, `cancel` or a pointer/touch event name
    pub kind: String,
    pub id: u64,
    /// Missing coordinates replay as a malformed sample
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub pointer: Option<String>,
    #[serde(default)]
    pub target: u64,
}

impl TraceEvent {
    fn to_envelope(&self, start: Instant) -> Result<Envelope, InputError> {
        let kind: RawEventKind = self.kind.parse()?;
        let pointer = match &self.pointer {
            Some(name) => name.parse()?,
            None => PointerKind::Touch,
        };
        let id = TouchId(self.id);
        let timestamp = start + Duration::from_millis(self.at_ms);
        let sample = match (self.x, self.y) {
            (Some(x), Some(y)) => RawSample::new(kind, id, DVec2::new(x, y), timestamp),
            _ => RawSample::without_position(kind, id, timestamp),
        };
        Ok(Envelope::platform(
            sample.with_pointer(pointer).with_target(TargetId(self.target)),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub surface: SurfaceKind,
    pub camera: Option<CameraConfig>,
    pub gestures: Option<GestureConfig>,
    pub timing: Option<TimingConfig>,
    /// Timers are run up to this offset after the last event
    pub end_ms: Option<u64>,
    #[serde(default)]
    pub events: Vec<TraceEvent>,
}

impl Trace {
    pub fn parse(text: &str) -> Result<Self, ReplayError> {
        let trace: Self = toml::from_str(text)?;
        if let Some(index) = trace.events.windows(2).position(|w| w[1].at_ms < w[0].at_ms) {
            return Err(ReplayError::OutOfOrder {
                index: index + 1,
                at_ms: trace.events[index + 1].at_ms,
            });
        }
        Ok(trace)
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Offset of the last timer poll
    pub fn duration_ms(&self) -> u64 {
        let last = self.events.last().map_or(0, |e| e.at_ms);
        self.end_ms.map_or(last, |end| end.max(last))
    }

    /// `config` with the trace's own sections swapped in
    pub fn apply_to(&self, config: &BridgeConfig) -> BridgeConfig {
        let mut config = config.clone();
        if let Some(camera) = &self.camera {
            config.camera = camera.clone();
        }
        if let Some(gestures) = &self.gestures {
            config.gestures = gestures.clone();
        }
        if let Some(timing) = &self.timing {
            config.timing = timing.clone();
        }
        config
    }
}

/// What a replay produced
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// Synthetic events in dispatch order
    pub events: Vec<SyntheticEvent>,
    pub holds: Vec<HoldEvent>,
    pub camera: Camera2D,
    /// Samples the registry tracked; the rest were dropped
    pub consumed: usize,
    /// Touches still down when the trace ended
    pub active_touches: usize,
}

/// Runs a trace through a fresh registry
///
/// Invalid event kinds abort the replay; samples the registry rejects are
/// only counted as not consumed.
pub fn replay(trace: &Trace, config: &BridgeConfig) -> Result<ReplayOutcome, ReplayError> {
    let config = trace.apply_to(config);
    let camera = config.camera.build();
    let map = match trace.surface {
        SurfaceKind::Canvas => EventMap::preset(config.dispatch.event_map),
        SurfaceKind::Window => EventMap::window(),
    };
    let mut registry =
        TouchRegistry::new(trace.surface, camera, config, Vec::<SyntheticEvent>::new()).with_event_map(map);

    let holds = Rc::new(RefCell::new(Vec::new()));
    let recorded = Rc::clone(&holds);
    registry.on_hold(move |hold| recorded.borrow_mut().push(hold));

    let start = Instant::now();
    let mut consumed = 0;
    for (index, event) in trace.events.iter().enumerate() {
        let envelope = event
            .to_envelope(start)
            .map_err(|source| ReplayError::Event { index, source })?;
        if registry.handle(&envelope) {
            consumed += 1;
        }
    }
    let fired = registry.poll_timers(start + Duration::from_millis(trace.duration_ms()));
    debug!(fired, "Settled trailing timers");

    let outcome = ReplayOutcome {
        events: std::mem::take(registry.sink_mut()),
        holds: holds.borrow().clone(),
        camera: registry.camera().clone(),
        consumed,
        active_touches: registry.active_count(),
    };
    info!(
        samples = trace.events.len(),
        consumed,
        dispatched = outcome.events.len(),
        zoom = outcome.camera.zoom,
        "Replay finished"
    );
    Ok(outcome)
}
