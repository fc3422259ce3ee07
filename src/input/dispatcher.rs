//! Synthetic event dispatcher
//!
//! Turns one logical event (start/move/end/cancel under some button) into the
//! ordered sequence of low-level pointer events the host expects, then hands
//! them to an [`EventSink`]. The expansion table is host-specific and lives
//! in an [`EventMap`].

use std::time::{Duration, Instant};

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::events::{
    Buttons, LogicalEventKind, MouseButton, SyntheticEvent, SyntheticKind, TargetId, TouchId,
};
use super::intent::TouchContext;
use super::state::Modifiers;
use super::timers::{TimerId, TimerQueue, TimerTask};

/// Offset of the hover-out move in [`EventMap::legacy`]
pub const HOVER_OUT_OFFSET: f64 = 200.0;

/// Receiver of synthetic events, usually the host's event path
pub trait EventSink {
    fn dispatch(&mut self, event: SyntheticEvent);
}

impl EventSink for Vec<SyntheticEvent> {
    fn dispatch(&mut self, event: SyntheticEvent) {
        self.push(event);
    }
}

impl<K: EventSink + ?Sized> EventSink for Box<K> {
    fn dispatch(&mut self, event: SyntheticEvent) {
        (**self).dispatch(event);
    }
}

/// Sink that only logs what it receives
#[derive(Debug, Default)]
pub struct TracingSink {
    dispatched: usize,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events seen so far
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }
}

impl EventSink for TracingSink {
    fn dispatch(&mut self, event: SyntheticEvent) {
        self.dispatched += 1;
        debug!(
            kind = event.kind.name(),
            pointer = %event.pointer_id,
            x = event.position.x,
            y = event.position.y,
            button = event.button_id(),
            buttons = event.buttons.bits(),
            target = %event.target,
            "Synthetic event"
        );
    }
}

/// One low-level event in an expansion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpansionStep {
    pub kind: SyntheticKind,
    /// Hover steps carry no button and an empty mask
    pub hover: bool,
    /// Added to both client and screen position
    pub offset: DVec2,
    /// Wait after the previous step before this one is sent
    pub delay: Duration,
}

impl ExpansionStep {
    /// A step carrying the touch's button
    pub fn new(kind: SyntheticKind) -> Self {
        Self {
            kind,
            hover: false,
            offset: DVec2::ZERO,
            delay: Duration::ZERO,
        }
    }

    /// A button-less pointer move
    pub fn hover() -> Self {
        Self {
            hover: true,
            ..Self::new(SyntheticKind::PointerMove)
        }
    }

    pub fn with_offset(mut self, offset: DVec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Named expansion tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventMapPreset {
    #[default]
    Canvas,
    Window,
    Legacy,
}

/// Expansion table: which steps each logical event becomes
#[derive(Debug, Clone, PartialEq)]
pub struct EventMap {
    pub start: Vec<ExpansionStep>,
    pub moved: Vec<ExpansionStep>,
    pub end: Vec<ExpansionStep>,
    pub cancel: Vec<ExpansionStep>,
}

impl EventMap {
    /// Main canvas: a start is preceded by a hover move so the host's hover
    /// detection has landed on the target before the press
    pub fn canvas() -> Self {
        Self {
            start: vec![
                ExpansionStep::hover(),
                ExpansionStep::new(SyntheticKind::PointerDown),
            ],
            ..Self::window()
        }
    }

    /// Floating windows: one step per logical event
    pub fn window() -> Self {
        Self {
            start: vec![ExpansionStep::new(SyntheticKind::PointerDown)],
            moved: vec![ExpansionStep::new(SyntheticKind::PointerMove)],
            end: vec![ExpansionStep::new(SyntheticKind::PointerUp)],
            cancel: vec![ExpansionStep::new(SyntheticKind::PointerCancel)],
        }
    }

    /// Older hosts: hover out of whatever was under the finger, hover back in,
    /// then press
    pub fn legacy() -> Self {
        Self {
            start: vec![
                ExpansionStep::hover().with_offset(DVec2::splat(HOVER_OUT_OFFSET)),
                ExpansionStep::hover(),
                ExpansionStep::new(SyntheticKind::PointerDown),
            ],
            ..Self::window()
        }
    }

    pub fn preset(preset: EventMapPreset) -> Self {
        match preset {
            EventMapPreset::Canvas => Self::canvas(),
            EventMapPreset::Window => Self::window(),
            EventMapPreset::Legacy => Self::legacy(),
        }
    }

    pub fn steps(&self, kind: LogicalEventKind) -> &[ExpansionStep] {
        match kind {
            LogicalEventKind::Start => &self.start,
            LogicalEventKind::Move => &self.moved,
            LogicalEventKind::End => &self.end,
            LogicalEventKind::Cancel => &self.cancel,
        }
    }
}

impl Default for EventMap {
    fn default() -> Self {
        Self::canvas()
    }
}

/// Per-touch data a synthetic event is built from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    pub id: TouchId,
    pub position: DVec2,
    pub screen: DVec2,
    pub modifiers: Modifiers,
    pub target: TargetId,
}

/// A synthetic event and how long after the logical event it is due
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent {
    pub delay: Duration,
    pub event: SyntheticEvent,
}

/// Builds synthetic event sequences from an [`EventMap`]
#[derive(Debug, Clone, Default)]
pub struct SyntheticDispatcher {
    map: EventMap,
}

impl SyntheticDispatcher {
    pub fn new(map: EventMap) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &EventMap {
        &self.map
    }

    /// Expand a logical event pressed with `button` at `origin`
    ///
    /// Delays accumulate, so the sequence keeps its order even when part of
    /// it is deferred.
    pub fn expand(
        &self,
        kind: LogicalEventKind,
        button: Option<MouseButton>,
        origin: &Origin,
    ) -> Vec<ScheduledEvent> {
        let mut delay = Duration::ZERO;
        self.map
            .steps(kind)
            .iter()
            .map(|step| {
                delay += step.delay;
                let (button, buttons) = if step.hover {
                    (None, Buttons::empty())
                } else {
                    (button, button.map_or(Buttons::empty(), MouseButton::mask))
                };
                ScheduledEvent {
                    delay,
                    event: SyntheticEvent {
                        kind: step.kind,
                        pointer_id: origin.id,
                        position: origin.position + step.offset,
                        screen_position: origin.screen + step.offset,
                        button,
                        buttons,
                        modifiers: origin.modifiers,
                        target: origin.target,
                    },
                }
            })
            .collect()
    }
}

/// What one forward call produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forwarded {
    /// Events dispatched right away
    pub sent: usize,
    /// Timers holding the delayed rest of the sequence
    pub deferred: Vec<TimerId>,
}

impl Forwarded {
    pub fn total(&self) -> usize {
        self.sent + self.deferred.len()
    }
}

/// Everything needed to forward a logical event right now
///
/// Borrowed from the registry for the duration of one call so touch points
/// can forward without owning the sink or the timer queue.
pub struct Forwarder<'a, K: EventSink + ?Sized> {
    pub dispatcher: &'a SyntheticDispatcher,
    pub sink: &'a mut K,
    pub timers: &'a mut TimerQueue<TimerTask>,
    pub now: Instant,
}

impl<K: EventSink + ?Sized> Forwarder<'_, K> {
    /// Forward `kind` for `origin` under `context`'s button
    ///
    /// Nothing is sent when the context does not forward this kind.
    pub fn forward(&mut self, context: TouchContext, origin: &Origin, kind: LogicalEventKind) -> Forwarded {
        let mut forwarded = Forwarded::default();
        if !context.forwards(kind) {
            trace!(id = %origin.id, context = context.name(), ?kind, "Not forwarded");
            return forwarded;
        }
        for ScheduledEvent { delay, event } in self.dispatcher.expand(kind, context.mouse_button(), origin) {
            if delay.is_zero() {
                self.sink.dispatch(event);
                forwarded.sent += 1;
            } else {
                let id = self.timers.schedule(self.now + delay, TimerTask::Deferred(event));
                forwarded.deferred.push(id);
            }
        }
        forwarded
    }
}
