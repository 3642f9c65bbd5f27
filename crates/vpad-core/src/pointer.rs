//! Raw pointer events as delivered by the platform.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Platform pointer (finger) identifier, stable for one contact.
pub type PointerId = u64;

/// Stage of a pointer contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A pointer event in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub id: PointerId,
    pub phase: PointerPhase,
    pub position: Point,
}

impl PointerEvent {
    #[must_use]
    pub const fn new(id: PointerId, phase: PointerPhase, position: Point) -> Self {
        Self {
            id,
            phase,
            position,
        }
    }

    #[must_use]
    pub const fn down(id: PointerId, position: Point) -> Self {
        Self::new(id, PointerPhase::Down, position)
    }

    #[must_use]
    pub const fn moved(id: PointerId, position: Point) -> Self {
        Self::new(id, PointerPhase::Move, position)
    }

    #[must_use]
    pub const fn up(id: PointerId, position: Point) -> Self {
        Self::new(id, PointerPhase::Up, position)
    }

    #[must_use]
    pub const fn cancel(id: PointerId, position: Point) -> Self {
        Self::new(id, PointerPhase::Cancel, position)
    }
}
