//! Host touch → pointer event mapping.
//!
//! Converts winit `Touch` events into `PointerEvent`s in logical pixels,
//! the unit the layout works in.

use vpad_core::{Point, PointerEvent, PointerPhase};
use winit::dpi::PhysicalPosition;
use winit::event::{Touch, TouchPhase};

/// Map a winit touch phase to a pointer phase.
#[must_use]
pub fn map_phase(phase: TouchPhase) -> PointerPhase {
    match phase {
        TouchPhase::Started => PointerPhase::Down,
        TouchPhase::Moved => PointerPhase::Move,
        TouchPhase::Ended => PointerPhase::Up,
        TouchPhase::Cancelled => PointerPhase::Cancel,
    }
}

/// Convert a physical position to logical pixels for `scale_factor`.
#[must_use]
pub fn map_position(location: PhysicalPosition<f64>, scale_factor: f64) -> Point {
    let scale_factor = if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    };
    let logical = location.to_logical::<f32>(scale_factor);
    Point::new(logical.x, logical.y)
}

/// Convert a winit touch into a pointer event.
#[must_use]
pub fn map_touch(touch: &Touch, scale_factor: f64) -> PointerEvent {
    PointerEvent::new(
        touch.id,
        map_phase(touch.phase),
        map_position(touch.location, scale_factor),
    )
}
