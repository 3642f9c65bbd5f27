//! Logical buttons the virtual pad can drive.
//!
//! `NesButton` values map to the bit layout of the NES controller shift
//! register (A first), so a set of held buttons is a single byte.

use serde::{Deserialize, Serialize};

/// Controller port index (0-based).
pub type Port = u8;

/// Number of controller ports the sink tracks.
pub const PORT_COUNT: usize = 4;

/// Logical button on the NES controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NesButton {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

/// All buttons in shift-register order.
pub const BUTTONS: [NesButton; 8] = [
    NesButton::A,
    NesButton::B,
    NesButton::Select,
    NesButton::Start,
    NesButton::Up,
    NesButton::Down,
    NesButton::Left,
    NesButton::Right,
];

impl NesButton {
    /// Return the bit position for this button.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::Select => 2,
            Self::Start => 3,
            Self::Up => 4,
            Self::Down => 5,
            Self::Left => 6,
            Self::Right => 7,
        }
    }

    /// Single-bit mask for this button.
    #[must_use]
    pub const fn mask(self) -> u8 {
        1 << self.bit()
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::Select => "Select",
            Self::Start => "Start",
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

/// Front-end actions on the system cluster that are not pad buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemAction {
    Rewind,
    FastForward,
}
