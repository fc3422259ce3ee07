//! Touch translation engine
//!
//! Turns raw touch samples into synthetic pointer events and camera
//! gestures:
//! - Tracks every active contact and classifies it (left click, right click
//!   or gesture member)
//! - Promotes held touches to right clicks and reports longer holds
//! - Drives pinch-zoom and multi-finger pan on a camera
//! - Expands logical events into host pointer sequences with optional delays
//!
//! # Architecture
//!
//! ```text
//! Raw Input (winit) → InputCollector → Envelope
//!                                         ↓
//!                                   TouchRegistry ←── TimerQueue (long press, ping, deferred)
//!                                   ↙          ↘
//!                          TouchPoint          ZoomGesture / PanGesture
//!                              ↓                        ↓
//!                    SyntheticDispatcher          CameraAdapter::pan
//!                              ↓
//!                          EventSink
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut registry = TouchRegistry::canvas(Camera2D::default(), settings, TracingSink::new());
//!
//! // In window_event()
//! if let Some(envelope) = collector.handle_window_event(&event, Instant::now()) {
//!     registry.handle(&envelope);
//! }
//!
//! // When the event loop wakes up with no input
//! registry.poll_timers(Instant::now());
//! ```

mod collector;
mod dispatcher;
mod error;
mod events;
mod gesture;
mod handler;
mod intent;
mod registry;
mod state;
mod timers;
mod touch;
pub mod vectors;

// Re-export public API
pub use collector::{InputCollector, MOUSE_POINTER_ID};
pub use dispatcher::{
    EventMap, EventMapPreset, EventSink, ExpansionStep, Forwarded, Forwarder, HOVER_OUT_OFFSET, Origin, ScheduledEvent,
    SyntheticDispatcher, TracingSink,
};
pub use error::InputError;
pub use events::{
    Buttons, Envelope, EventSource, LogicalEventKind, MouseButton, PointerKind, RawEventKind, RawSample,
    SyntheticEvent, SyntheticKind, TargetId, TouchId,
};
pub use gesture::{
    GestureMode, GestureStatus, PanAnchor, PanGesture, ZOOM_MIN_TOUCHES, ZoomGesture, pan_correction, pan_reference,
    pan_target, pan_threshold_px, zoom_factor, zoom_threshold_px,
};
pub use handler::{GestureActivity, GestureGuard, HookChain, HookOutcome, InterceptionPoint};
pub use intent::TouchContext;
pub use registry::{HoldEvent, ScrollTarget, SurfaceKind, TouchRegistry};
pub use state::{InputModality, Modifiers};
pub use timers::{TimerId, TimerQueue, TimerTask};
pub use touch::{HoldTiming, TouchPoint};
