//! Core types for the virtual on-screen NES controller.
//!
//! Everything here is plain data: pixel geometry, logical buttons, the sink
//! that receives presses, and the observability trait. Layout and gesture
//! logic live in the crates built on top of this one.

mod button;
mod geometry;
mod observable;
mod pointer;
mod sink;

pub use button::{BUTTONS, NesButton, PORT_COUNT, Port, SystemAction};
pub use geometry::{Insets, Orientation, Point, Rect, Size};
pub use observable::{Observable, Value};
pub use pointer::{PointerEvent, PointerId, PointerPhase};
pub use sink::{InputSink, PadMask, SinkEvent, TURBO_FRAMES_DEFAULT};
