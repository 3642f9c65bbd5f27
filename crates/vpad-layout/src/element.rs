//! On-screen elements and the clusters they belong to.

use serde::{Deserialize, Serialize};
use vpad_core::{NesButton, SystemAction};

/// A group of elements positioned and scaled together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cluster {
    Dpad,
    Face,
    System,
}

impl Cluster {
    pub const ALL: [Cluster; 3] = [Cluster::Dpad, Cluster::Face, Cluster::System];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Dpad => 0,
            Self::Face => 1,
            Self::System => 2,
        }
    }

    /// Settings key segment.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Dpad => "dpad",
            Self::Face => "face",
            Self::System => "system",
        }
    }
}

/// One interactive on-screen element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlElement {
    Dpad,
    A,
    B,
    TurboA,
    TurboB,
    Select,
    Start,
    Rewind,
    FastForward,
}

impl ControlElement {
    /// Every element, in paint order (later elements are on top).
    pub const ALL: [ControlElement; 9] = [
        ControlElement::Dpad,
        ControlElement::A,
        ControlElement::B,
        ControlElement::TurboA,
        ControlElement::TurboB,
        ControlElement::Select,
        ControlElement::Start,
        ControlElement::Rewind,
        ControlElement::FastForward,
    ];

    /// Elements that sit inside a cluster with their own local transform.
    pub const NESTED: [ControlElement; 8] = [
        ControlElement::A,
        ControlElement::B,
        ControlElement::TurboA,
        ControlElement::TurboB,
        ControlElement::Select,
        ControlElement::Start,
        ControlElement::Rewind,
        ControlElement::FastForward,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Dpad => 0,
            Self::A => 1,
            Self::B => 2,
            Self::TurboA => 3,
            Self::TurboB => 4,
            Self::Select => 5,
            Self::Start => 6,
            Self::Rewind => 7,
            Self::FastForward => 8,
        }
    }

    /// Index into `NESTED`, `None` for the d-pad.
    #[must_use]
    pub const fn nested_index(self) -> Option<usize> {
        match self {
            Self::Dpad => None,
            other => Some(other.index() - 1),
        }
    }

    #[must_use]
    pub const fn cluster(self) -> Cluster {
        match self {
            Self::Dpad => Cluster::Dpad,
            Self::A | Self::B | Self::TurboA | Self::TurboB => Cluster::Face,
            Self::Select | Self::Start | Self::Rewind | Self::FastForward => Cluster::System,
        }
    }

    /// Settings key segment.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Dpad => "dpad",
            Self::A => "a",
            Self::B => "b",
            Self::TurboA => "turbo_a",
            Self::TurboB => "turbo_b",
            Self::Select => "select",
            Self::Start => "start",
            Self::Rewind => "rewind",
            Self::FastForward => "fast_forward",
        }
    }

    /// Pad button this element presses (or turbos), if any.
    #[must_use]
    pub const fn button(self) -> Option<NesButton> {
        match self {
            Self::A | Self::TurboA => Some(NesButton::A),
            Self::B | Self::TurboB => Some(NesButton::B),
            Self::Select => Some(NesButton::Select),
            Self::Start => Some(NesButton::Start),
            Self::Dpad | Self::Rewind | Self::FastForward => None,
        }
    }

    #[must_use]
    pub const fn action(self) -> Option<SystemAction> {
        match self {
            Self::Rewind => Some(SystemAction::Rewind),
            Self::FastForward => Some(SystemAction::FastForward),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_turbo(self) -> bool {
        matches!(self, Self::TurboA | Self::TurboB)
    }
}
