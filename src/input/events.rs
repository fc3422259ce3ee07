//! Raw samples coming in and synthetic events going out

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use bitflags::bitflags;
use glam::DVec2;

use super::error::InputError;
use super::state::Modifiers;

/// Platform-assigned identity of one continuous contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TouchId(pub u64);

impl fmt::Display for TouchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host element a sample was delivered to; synthetic events go back to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw platform event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawEventKind {
    Down,
    Move,
    Up,
    Cancel,
}

impl FromStr for RawEventKind {
    type Err = InputError;

    /// Accepts pointer, touch and short names (`pointerdown`, `touchstart`, `down`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pointerdown" | "touchstart" | "down" => Ok(Self::Down),
            "pointermove" | "touchmove" | "move" => Ok(Self::Move),
            "pointerup" | "touchend" | "up" => Ok(Self::Up),
            "pointercancel" | "touchcancel" | "cancel" => Ok(Self::Cancel),
            other => Err(InputError::UnsupportedEventType(other.to_string())),
        }
    }
}

/// Device that produced a pointer sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerKind {
    #[default]
    Touch,
    Pen,
    Mouse,
}

impl FromStr for PointerKind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "touch" => Ok(Self::Touch),
            "pen" => Ok(Self::Pen),
            "mouse" => Ok(Self::Mouse),
            other => Err(InputError::UnsupportedEventType(other.to_string())),
        }
    }
}

/// One raw sample as delivered by the platform
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub id: TouchId,
    pub kind: RawEventKind,
    pub pointer: PointerKind,
    /// Client (surface) coordinates; `None` marks a malformed sample
    pub position: Option<DVec2>,
    /// Device-screen coordinates, defaults to `position` when absent
    pub screen_position: Option<DVec2>,
    pub modifiers: Modifiers,
    pub target: TargetId,
    pub timestamp: Instant,
}

impl RawSample {
    /// Creates a touch sample at `position`
    pub fn new(kind: RawEventKind, id: TouchId, position: DVec2, timestamp: Instant) -> Self {
        Self {
            id,
            kind,
            pointer: PointerKind::Touch,
            position: Some(position),
            screen_position: None,
            modifiers: Modifiers::NONE,
            target: TargetId::default(),
            timestamp,
        }
    }

    /// Creates a touch sample with no coordinates (e.g. a cancel)
    pub fn without_position(kind: RawEventKind, id: TouchId, timestamp: Instant) -> Self {
        Self {
            position: None,
            ..Self::new(kind, id, DVec2::ZERO, timestamp)
        }
    }

    pub fn with_pointer(mut self, pointer: PointerKind) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_target(mut self, target: TargetId) -> Self {
        self.target = target;
        self
    }

    pub fn with_screen_position(mut self, screen: DVec2) -> Self {
        self.screen_position = Some(screen);
        self
    }

    /// Client position, or the malformed-sample error
    pub fn require_position(&self) -> Result<DVec2, InputError> {
        self.position
            .ok_or(InputError::MissingCoordinates { id: self.id })
    }

    /// Screen position, falling back to the client position
    pub fn screen(&self) -> Option<DVec2> {
        self.screen_position.or(self.position)
    }
}

/// Where an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    /// Delivered by the platform (real user input)
    Platform,
    /// Produced by the dispatcher; trusted by the host, ignored by registries
    Synthetic,
}

/// A sample tagged with its origin
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub source: EventSource,
    pub original: RawSample,
}

impl Envelope {
    /// Wraps a sample that came from the platform
    pub fn platform(original: RawSample) -> Self {
        Self {
            source: EventSource::Platform,
            original,
        }
    }

    /// Wraps a sample produced by this crate
    pub fn synthetic(original: RawSample) -> Self {
        Self {
            source: EventSource::Synthetic,
            original,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == EventSource::Synthetic
    }
}

/// Logical interaction phase forwarded to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalEventKind {
    Start,
    Move,
    End,
    Cancel,
}

impl From<RawEventKind> for LogicalEventKind {
    fn from(kind: RawEventKind) -> Self {
        match kind {
            RawEventKind::Down => Self::Start,
            RawEventKind::Move => Self::Move,
            RawEventKind::Up => Self::End,
            RawEventKind::Cancel => Self::Cancel,
        }
    }
}

/// Logical mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Back,
    Forward,
}

impl MouseButton {
    /// Button number as reported by pointer events (`0` = left, `2` = right)
    pub fn id(self) -> i16 {
        match self {
            Self::Left => 0,
            Self::Middle => 1,
            Self::Right => 2,
            Self::Back => 3,
            Self::Forward => 4,
        }
    }

    /// The "buttons held" bit for this button
    pub fn mask(self) -> Buttons {
        match self {
            Self::Left => Buttons::PRIMARY,
            Self::Right => Buttons::SECONDARY,
            Self::Middle => Buttons::AUXILIARY,
            Self::Back => Buttons::BACK,
            Self::Forward => Buttons::FORWARD,
        }
    }
}

bitflags! {
    /// Bit-encoded set of held buttons
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u8 {
        const PRIMARY = 1;
        const SECONDARY = 2;
        const AUXILIARY = 4;
        const BACK = 8;
        const FORWARD = 16;
    }
}

/// Low-level synthetic event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticKind {
    PointerMove,
    PointerDown,
    PointerUp,
    PointerCancel,
}

impl SyntheticKind {
    /// Host event type name
    pub fn name(self) -> &'static str {
        match self {
            Self::PointerMove => "pointermove",
            Self::PointerDown => "pointerdown",
            Self::PointerUp => "pointerup",
            Self::PointerCancel => "pointercancel",
        }
    }

    fn raw_kind(self) -> RawEventKind {
        match self {
            Self::PointerMove => RawEventKind::Move,
            Self::PointerDown => RawEventKind::Down,
            Self::PointerUp => RawEventKind::Up,
            Self::PointerCancel => RawEventKind::Cancel,
        }
    }
}

/// An input event built to look like real mouse input to the host
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticEvent {
    pub kind: SyntheticKind,
    /// Same identity as the originating touch
    pub pointer_id: TouchId,
    pub position: DVec2,
    pub screen_position: DVec2,
    /// `None` for hover moves (reported as button `-1`)
    pub button: Option<MouseButton>,
    pub buttons: Buttons,
    pub modifiers: Modifiers,
    pub target: TargetId,
}

impl SyntheticEvent {
    /// Pointer-event button number, `-1` when no button changed
    pub fn button_id(&self) -> i16 {
        self.button.map_or(-1, MouseButton::id)
    }

    /// Wraps the event as a synthetic-source envelope for the host's event path
    pub fn to_envelope(&self, timestamp: Instant) -> Envelope {
        Envelope::synthetic(RawSample {
            id: self.pointer_id,
            kind: self.kind.raw_kind(),
            pointer: PointerKind::Mouse,
            position: Some(self.position),
            screen_position: Some(self.screen_position),
            modifiers: self.modifiers,
            target: self.target,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_event_kind_parsing() {
        assert_eq!("pointerdown".parse::<RawEventKind>(), Ok(RawEventKind::Down));
        assert_eq!("touchmove".parse::<RawEventKind>(), Ok(RawEventKind::Move));
        assert_eq!("up".parse::<RawEventKind>(), Ok(RawEventKind::Up));
        assert_eq!("pointercancel".parse::<RawEventKind>(), Ok(RawEventKind::Cancel));
        assert_eq!(
            "pointerover".parse::<RawEventKind>(),
            Err(InputError::UnsupportedEventType("pointerover".to_string()))
        );
    }

    #[test]
    fn test_button_masks() {
        assert_eq!(MouseButton::Left.mask().bits(), 1);
        assert_eq!(MouseButton::Middle.mask().bits(), 4);
        assert_eq!(MouseButton::Right.mask().bits(), 2);
        assert_eq!(MouseButton::Back.mask().bits(), 8);
        assert_eq!(MouseButton::Forward.mask().bits(), 16);
        assert_eq!(MouseButton::Right.id(), 2);
    }

    #[test]
    fn test_missing_position_is_malformed() {
        let sample = RawSample::without_position(RawEventKind::Move, TouchId(4), Instant::now());
        assert_eq!(
            sample.require_position(),
            Err(InputError::MissingCoordinates { id: TouchId(4) })
        );
    }

    #[test]
    fn test_screen_falls_back_to_client_position() {
        let now = Instant::now();
        let sample = RawSample::new(RawEventKind::Down, TouchId(1), DVec2::new(5.0, 6.0), now);
        assert_eq!(sample.screen(), Some(DVec2::new(5.0, 6.0)));

        let sample = sample.with_screen_position(DVec2::new(105.0, 206.0));
        assert_eq!(sample.screen(), Some(DVec2::new(105.0, 206.0)));
    }

    #[test]
    fn test_synthetic_envelope_is_tagged() {
        let event = SyntheticEvent {
            kind: SyntheticKind::PointerDown,
            pointer_id: TouchId(9),
            position: DVec2::new(1.0, 2.0),
            screen_position: DVec2::new(1.0, 2.0),
            button: Some(MouseButton::Left),
            buttons: Buttons::PRIMARY,
            modifiers: Modifiers::NONE,
            target: TargetId(3),
        };
        let envelope = event.to_envelope(Instant::now());

        assert!(envelope.is_synthetic());
        assert_eq!(envelope.original.kind, RawEventKind::Down);
        assert_eq!(envelope.original.pointer, PointerKind::Mouse);
        assert_eq!(envelope.original.target, TargetId(3));
    }

    #[test]
    fn test_hover_event_reports_no_button() {
        let event = SyntheticEvent {
            kind: SyntheticKind::PointerMove,
            pointer_id: TouchId(1),
            position: DVec2::ZERO,
            screen_position: DVec2::ZERO,
            button: None,
            buttons: Buttons::empty(),
            modifiers: Modifiers::NONE,
            target: TargetId::default(),
        };
        assert_eq!(event.button_id(), -1);
    }
}
