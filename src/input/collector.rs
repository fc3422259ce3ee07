//! Raw sample collection from winit events

use std::time::Instant;

use glam::DVec2;
use winit::event::{ElementState, TouchPhase, WindowEvent};

use super::events::{Envelope, PointerKind, RawEventKind, RawSample, TouchId};
use super::state::Modifiers;

/// Pointer id given to mouse samples; touch ids come from the platform
pub const MOUSE_POINTER_ID: TouchId = TouchId(u64::MAX);

/// Converts winit window events into platform envelopes
///
/// Keeps the little state winit spreads across events: held modifiers, the
/// last cursor position and the DPI scale.
pub struct InputCollector {
    modifiers: Modifiers,
    cursor: Option<DVec2>,
    scale_factor: f64,
}

impl InputCollector {
    pub fn new() -> Self {
        Self {
            modifiers: Modifiers::NONE,
            cursor: None,
            scale_factor: 1.0,
        }
    }

    /// Update scale factor (DPI scaling)
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Handle a winit window event, returning the sample it carries if any
    pub fn handle_window_event(&mut self, event: &WindowEvent, now: Instant) -> Option<Envelope> {
        match event {
            WindowEvent::Touch(touch) => {
                let kind = match touch.phase {
                    TouchPhase::Started => RawEventKind::Down,
                    TouchPhase::Moved => RawEventKind::Move,
                    TouchPhase::Ended => RawEventKind::Up,
                    TouchPhase::Cancelled => RawEventKind::Cancel,
                };
                let physical = DVec2::new(touch.location.x, touch.location.y);
                Some(self.sample(kind, TouchId(touch.id), PointerKind::Touch, physical, now))
            }

            WindowEvent::CursorMoved { position, .. } => {
                let physical = DVec2::new(position.x, position.y);
                self.cursor = Some(physical);
                Some(self.sample(RawEventKind::Move, MOUSE_POINTER_ID, PointerKind::Mouse, physical, now))
            }

            WindowEvent::MouseInput { state, .. } => {
                let physical = self.cursor?;
                let kind = match state {
                    ElementState::Pressed => RawEventKind::Down,
                    ElementState::Released => RawEventKind::Up,
                };
                Some(self.sample(kind, MOUSE_POINTER_ID, PointerKind::Mouse, physical, now))
            }

            WindowEvent::ModifiersChanged(modifiers_state) => {
                self.modifiers = Modifiers {
                    shift: modifiers_state.state().shift_key(),
                    ctrl: modifiers_state.state().control_key(),
                    alt: modifiers_state.state().alt_key(),
                    meta: modifiers_state.state().super_key(),
                };
                None
            }

            _ => None,
        }
    }

    fn sample(
        &self,
        kind: RawEventKind,
        id: TouchId,
        pointer: PointerKind,
        physical: DVec2,
        now: Instant,
    ) -> Envelope {
        let logical = physical / self.scale_factor;
        Envelope::platform(
            RawSample::new(kind, id, logical, now)
                .with_pointer(pointer)
                .with_screen_position(physical)
                .with_modifiers(self.modifiers),
        )
    }
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new()
    }
}
