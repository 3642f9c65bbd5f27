//! Virtual d-pad.
//!
//! A circular control that turns one continuous pointer into up to two
//! held directions. Classification is a pure function of the pointer offset
//! from the disc center; the tracker owns the pointer and turns changes in
//! the classified set into press/release edges on an `InputSink`.

mod classifier;
mod tracker;

pub use classifier::{
    BOUNDARY_RATIO_DEFAULT, BOUNDARY_RATIO_MAX, BOUNDARY_RATIO_MIN, ClassifierConfig,
    DEADZONE_RATIO_DEFAULT, DEADZONE_RATIO_MAX, DEADZONE_RATIO_MIN, Directions, classify,
};
pub use tracker::{DpadParams, DpadTracker};
