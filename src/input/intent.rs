//! What a touch currently means

use super::events::{LogicalEventKind, MouseButton};

/// Intent assigned to a touch point
///
/// Only [`TouchContext::PrimaryClick`] can be reclassified; the other two are
/// terminal for the life of the contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchContext {
    /// Left-button passthrough, promotable by a long press
    PrimaryClick,
    /// Right-button passthrough, reached only through long-press promotion
    SecondaryClick,
    /// Consumed by camera manipulation, nothing reaches the host
    ZoomPanGesture,
}

impl TouchContext {
    /// Context for a new contact given how many touches will be active
    pub fn classify(active_touches: usize) -> Self {
        if active_touches >= 2 {
            Self::ZoomPanGesture
        } else {
            Self::PrimaryClick
        }
    }

    /// Button synthetic events are sent with, if any
    pub fn mouse_button(self) -> Option<MouseButton> {
        match self {
            Self::PrimaryClick => Some(MouseButton::Left),
            Self::SecondaryClick => Some(MouseButton::Right),
            Self::ZoomPanGesture => None,
        }
    }

    /// Returns true if logical events of `kind` reach the host in this context
    pub fn forwards(self, _kind: LogicalEventKind) -> bool {
        match self {
            Self::PrimaryClick | Self::SecondaryClick => true,
            Self::ZoomPanGesture => false,
        }
    }

    /// Returns true if the context can no longer be reassigned
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::PrimaryClick)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::PrimaryClick => "primary-click",
            Self::SecondaryClick => "secondary-click",
            Self::ZoomPanGesture => "zoom-pan-gesture",
        }
    }
}
