//! Pointer offset → direction set.
//!
//! The disc is split into a center deadzone and eight sectors. The width of
//! the diagonal sectors is set by the boundary ratio `b`: with `|dx|`,
//! `|dy|` the offset magnitudes,
//!
//! - `|dy| < b·|dx|` → horizontal only
//! - `|dx| < b·|dy|` → vertical only
//! - otherwise       → diagonal (both)
//!
//! Lower `b` widens the cardinal sectors and makes accidental diagonals
//! rarer. Comparisons are multiplicative so an on-axis offset never divides
//! by zero.

use bitflags::bitflags;
use vpad_core::{NesButton, Point};

pub const DEADZONE_RATIO_MIN: f32 = 0.0;
pub const DEADZONE_RATIO_MAX: f32 = 0.9;
pub const DEADZONE_RATIO_DEFAULT: f32 = 0.16;

pub const BOUNDARY_RATIO_MIN: f32 = 0.25;
pub const BOUNDARY_RATIO_MAX: f32 = 0.95;
pub const BOUNDARY_RATIO_DEFAULT: f32 = 0.5;

bitflags! {
    /// Active d-pad directions. At most one horizontal and one vertical bit
    /// are ever set together.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Directions: u8 {
        const UP = 0x01;
        const DOWN = 0x02;
        const LEFT = 0x04;
        const RIGHT = 0x08;
    }
}

impl Directions {
    const PAIRS: [(Directions, NesButton); 4] = [
        (Directions::UP, NesButton::Up),
        (Directions::DOWN, NesButton::Down),
        (Directions::LEFT, NesButton::Left),
        (Directions::RIGHT, NesButton::Right),
    ];

    /// The NES buttons held by this set.
    pub fn buttons(self) -> impl Iterator<Item = NesButton> {
        Self::PAIRS
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, button)| button)
    }

    /// Every direction button, held or not.
    pub fn all_buttons() -> impl Iterator<Item = NesButton> {
        Self::PAIRS.into_iter().map(|(_, button)| button)
    }

    /// Human-readable names, e.g. `["Up", "Right"]`.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        self.buttons().map(NesButton::name).collect()
    }
}

/// Deadzone and boundary ratios, clamped to their valid ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    deadzone_ratio: f32,
    boundary_ratio: f32,
}

impl ClassifierConfig {
    /// Build a config, clamping both ratios. Non-finite values fall back to
    /// the defaults.
    #[must_use]
    pub fn new(deadzone_ratio: f32, boundary_ratio: f32) -> Self {
        let deadzone_ratio = if deadzone_ratio.is_finite() {
            deadzone_ratio.clamp(DEADZONE_RATIO_MIN, DEADZONE_RATIO_MAX)
        } else {
            DEADZONE_RATIO_DEFAULT
        };
        let boundary_ratio = if boundary_ratio.is_finite() {
            boundary_ratio.clamp(BOUNDARY_RATIO_MIN, BOUNDARY_RATIO_MAX)
        } else {
            BOUNDARY_RATIO_DEFAULT
        };
        Self {
            deadzone_ratio,
            boundary_ratio,
        }
    }

    #[must_use]
    pub fn deadzone_ratio(&self) -> f32 {
        self.deadzone_ratio
    }

    #[must_use]
    pub fn boundary_ratio(&self) -> f32 {
        self.boundary_ratio
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::new(DEADZONE_RATIO_DEFAULT, BOUNDARY_RATIO_DEFAULT)
    }
}

/// Classify a pointer offset from the center of a disc of `diameter` px.
#[must_use]
pub fn classify(offset: Point, diameter: f32, config: ClassifierConfig) -> Directions {
    if offset.is_zero() || !offset.x.is_finite() || !offset.y.is_finite() {
        return Directions::empty();
    }

    let radius = if diameter.is_finite() {
        diameter.max(0.0) * 0.5
    } else {
        0.0
    };
    if offset.length() <= config.deadzone_ratio * radius {
        return Directions::empty();
    }

    let ax = offset.x.abs();
    let ay = offset.y.abs();
    let b = config.boundary_ratio;

    let horizontal = if offset.x >= 0.0 {
        Directions::RIGHT
    } else {
        Directions::LEFT
    };
    let vertical = if offset.y >= 0.0 {
        Directions::DOWN
    } else {
        Directions::UP
    };

    if ay < b * ax {
        horizontal
    } else if ax < b * ay {
        vertical
    } else {
        horizontal | vertical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIAMETER: f32 = 160.0;

    fn dirs(x: f32, y: f32) -> Directions {
        classify(Point::new(x, y), DIAMETER, ClassifierConfig::default())
    }

    #[test]
    fn zero_offset_is_empty_even_without_deadzone() {
        let cfg = ClassifierConfig::new(0.0, 0.5);
        assert!(classify(Point::ZERO, DIAMETER, cfg).is_empty());
    }

    #[test]
    fn inside_deadzone_is_empty() {
        // radius 80, deadzone 0.16 → 12.8 px
        assert!(dirs(12.0, 0.0).is_empty());
        assert!(dirs(-9.0, 9.0).is_empty());
        assert!(dirs(0.0, 12.0).is_empty());
    }

    #[test]
    fn cardinals() {
        assert_eq!(dirs(40.0, 0.0), Directions::RIGHT);
        assert_eq!(dirs(-40.0, 0.0), Directions::LEFT);
        assert_eq!(dirs(0.0, 40.0), Directions::DOWN);
        assert_eq!(dirs(0.0, -40.0), Directions::UP);
    }

    #[test]
    fn diagonals_at_45_degrees() {
        assert_eq!(dirs(30.0, 30.0), Directions::RIGHT | Directions::DOWN);
        assert_eq!(dirs(-30.0, -30.0), Directions::LEFT | Directions::UP);
        assert_eq!(dirs(30.0, -30.0), Directions::RIGHT | Directions::UP);
    }

    #[test]
    fn shallow_angle_stays_cardinal() {
        // |dy|/|dx| = 0.4 < 0.5
        assert_eq!(dirs(50.0, 20.0), Directions::RIGHT);
        // |dx|/|dy| = 0.4 < 0.5
        assert_eq!(dirs(-20.0, -50.0), Directions::UP);
    }

    #[test]
    fn boundary_ratio_widens_diagonals() {
        let narrow = ClassifierConfig::new(0.16, 0.3);
        assert_eq!(
            classify(Point::new(50.0, 20.0), DIAMETER, narrow),
            Directions::RIGHT | Directions::DOWN
        );
    }

    #[test]
    fn config_clamps_ratios() {
        let cfg = ClassifierConfig::new(2.0, 0.01);
        assert_eq!(cfg.deadzone_ratio(), DEADZONE_RATIO_MAX);
        assert_eq!(cfg.boundary_ratio(), BOUNDARY_RATIO_MIN);

        let cfg = ClassifierConfig::new(f32::NAN, f32::INFINITY);
        assert_eq!(cfg, ClassifierConfig::default());
    }

    #[test]
    fn non_finite_offset_is_empty() {
        assert!(dirs(f32::NAN, 10.0).is_empty());
    }

    #[test]
    fn buttons_follow_flags() {
        let d = Directions::UP | Directions::RIGHT;
        let buttons: Vec<NesButton> = d.buttons().collect();
        assert_eq!(buttons, vec![NesButton::Up, NesButton::Right]);
        assert_eq!(d.names(), vec!["Up", "Right"]);
    }
}
