//! A single active contact

use std::time::{Duration, Instant};

use glam::DVec2;
use tracing::debug;

use super::dispatcher::{EventSink, Forwarder, Origin};
use super::events::{LogicalEventKind, RawSample, TargetId, TouchId};
use super::intent::TouchContext;
use super::state::Modifiers;
use super::timers::{TimerId, TimerQueue, TimerTask};
use super::vectors;
use crate::camera::CameraAdapter;

/// Hold timers and the movement that invalidates them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldTiming {
    /// Delay before a held primary click becomes a secondary click
    pub long_press: Duration,
    /// Delay before a held secondary click is reported to the hold observer
    pub ping: Duration,
    /// Travel in pixels after which the touch no longer counts as held
    pub move_threshold: f64,
}

impl Default for HoldTiming {
    fn default() -> Self {
        Self {
            long_press: Duration::from_millis(400),
            ping: Duration::from_millis(1000),
            move_threshold: 10.0,
        }
    }
}

/// State of one contact from down to up
#[derive(Debug, Clone, PartialEq)]
pub struct TouchPoint {
    pub id: TouchId,
    /// Position at creation, never changes
    pub start: DVec2,
    pub last: DVec2,
    pub current: DVec2,
    /// Device-screen position of the latest sample
    pub screen: DVec2,
    /// World point under `start` when the touch began
    pub world: DVec2,
    /// Total distance travelled
    pub movement_distance: f64,
    /// Net displacement
    pub movement: DVec2,
    pub context: TouchContext,
    pub target: TargetId,
    pub modifiers: Modifiers,
    pub created_at: Instant,
    long_press: Option<TimerId>,
    ping: Option<TimerId>,
    /// Delayed steps of sequences started under the current context
    deferred: Vec<TimerId>,
}

impl TouchPoint {
    /// Start tracking a contact at `position`
    ///
    /// Hold timers are armed only while the context can still be promoted.
    pub fn create<C: CameraAdapter + ?Sized>(
        sample: &RawSample,
        position: DVec2,
        context: TouchContext,
        camera: &C,
        timers: &mut TimerQueue<TimerTask>,
        timing: &HoldTiming,
    ) -> Self {
        let created_at = sample.timestamp;
        let (long_press, ping) = if context.is_terminal() {
            (None, None)
        } else {
            (
                Some(timers.schedule(created_at + timing.long_press, TimerTask::LongPress(sample.id))),
                Some(timers.schedule(created_at + timing.ping, TimerTask::Ping(sample.id))),
            )
        };

        Self {
            id: sample.id,
            start: position,
            last: position,
            current: position,
            screen: sample.screen().unwrap_or(position),
            world: camera.screen_to_world(position),
            movement_distance: 0.0,
            movement: vectors::ZERO,
            context,
            target: sample.target,
            modifiers: sample.modifiers,
            created_at,
            long_press,
            ping,
            deferred: Vec::new(),
        }
    }

    /// Record a new position; bookkeeping only
    pub fn update(&mut self, position: DVec2, screen: Option<DVec2>, modifiers: Modifiers, target: TargetId) {
        self.last = self.current;
        self.current = position;
        self.screen = screen.unwrap_or(position);
        self.modifiers = modifiers;
        self.target = target;
        self.movement_distance += vectors::distance(self.last, self.current);
        self.movement += self.current - self.last;
    }

    /// Forward `kind` under the current context, keeping any delayed steps
    /// so they die with the touch
    pub fn forward<K: EventSink + ?Sized>(&mut self, forwarder: &mut Forwarder<'_, K>, kind: LogicalEventKind) -> usize {
        let forwarded = forwarder.forward(self.context, &self.origin(), kind);
        self.deferred.retain(|id| forwarder.timers.is_scheduled(*id));
        self.deferred.extend_from_slice(&forwarded.deferred);
        forwarded.total()
    }

    /// Send the end of the current context's sequence
    ///
    /// Steps still waiting from earlier sequences are dropped first so the
    /// host never sees a press after its release. Delayed steps of the end
    /// itself are left to run.
    pub fn end<K: EventSink + ?Sized>(&mut self, forwarder: &mut Forwarder<'_, K>, kind: LogicalEventKind) -> usize {
        self.cancel_deferred(forwarder.timers);
        forwarder.forward(self.context, &self.origin(), kind).total()
    }

    /// Reclassify the touch, releasing the old button before pressing the new one
    ///
    /// Returns false (and sends nothing) when the context is terminal or
    /// already `new`.
    pub fn change_context<K: EventSink + ?Sized>(
        &mut self,
        new: TouchContext,
        forwarder: &mut Forwarder<'_, K>,
    ) -> bool {
        if self.context.is_terminal() || self.context == new {
            return false;
        }
        self.end(forwarder, LogicalEventKind::End);
        debug!(id = %self.id, from = self.context.name(), to = new.name(), "Touch context changed");
        self.context = new;
        self.forward(forwarder, LogicalEventKind::Start);
        true
    }

    /// Returns true while neither hold timer is pending
    pub fn hold_timers_cancelled(&self) -> bool {
        self.long_press.is_none() && self.ping.is_none()
    }

    /// Returns true if the touch has moved too far to count as held
    pub fn moved_beyond(&self, threshold: f64) -> bool {
        self.movement_distance > threshold
    }

    /// Forget the long-press timer once it has fired
    pub(crate) fn long_press_fired(&mut self) {
        self.long_press = None;
    }

    pub(crate) fn ping_fired(&mut self) {
        self.ping = None;
    }

    pub fn cancel_hold_timers(&mut self, timers: &mut TimerQueue<TimerTask>) {
        for id in [self.long_press.take(), self.ping.take()].into_iter().flatten() {
            timers.cancel(id);
        }
    }

    fn cancel_deferred(&mut self, timers: &mut TimerQueue<TimerTask>) {
        for id in self.deferred.drain(..) {
            timers.cancel(id);
        }
    }

    /// Steps of this touch still waiting on the timer queue
    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    /// Release every resource held by the touch; safe to call twice
    pub fn destroy(&mut self, timers: &mut TimerQueue<TimerTask>) {
        self.cancel_hold_timers(timers);
        self.cancel_deferred(timers);
    }

    /// Data synthetic events for this touch are built from
    pub fn origin(&self) -> Origin {
        Origin {
            id: self.id,
            position: self.current,
            screen: self.screen,
            modifiers: self.modifiers,
            target: self.target,
        }
    }

    /// How long the touch has been down at `now`
    pub fn held_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }
}
