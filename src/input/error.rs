//! Errors raised while tracking touches
//!
//! None of these escape [`TouchRegistry::handle`](super::TouchRegistry::handle):
//! the registry logs and drops the offending sample, then carries on with the
//! next one.

use thiserror::Error;

use super::events::TouchId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// A sample that should carry coordinates did not
    #[error("sample for touch {id} is missing coordinates")]
    MissingCoordinates { id: TouchId },

    /// A forward was requested for a touch the registry does not track
    #[error("no active touch {0} to forward for")]
    UnknownTouch(TouchId),

    /// Event name the registry does not understand
    #[error("unsupported raw event type `{0}`")]
    UnsupportedEventType(String),
}
