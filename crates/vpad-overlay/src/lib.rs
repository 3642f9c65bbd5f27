//! Touch front end of the virtual NES pad.
//!
//! `Overlay` routes pointer events against the current layout: d-pad
//! pointers go through the direction classifier, everything else is a
//! press held for as long as the pointer is down. In edit mode the same
//! pointers drive the layout editor instead.

mod overlay;
#[cfg(feature = "native")]
pub mod touch_map;

pub use overlay::{EditScope, HANDLE_RADIUS, Overlay, Region, RegionKind};
