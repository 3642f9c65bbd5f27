//! Layout of the virtual pad.
//!
//! Settings hold user customisation (per-orientation offsets and scales plus
//! shared appearance values). `compute_layout` turns settings, viewport and
//! safe-area insets into one clamped frame per on-screen element. In edit
//! mode the editor runs the transform backwards, turning dragged frames into
//! offsets and scales that reproduce them on the next pass.

mod editor;
mod element;
mod layout;
mod settings;
mod store;

pub use editor::{Corner, EditTarget, EditorState, GRID_SPACING_DEFAULT, GridSnap};
pub use element::{Cluster, ControlElement};
pub use layout::{
    ElementFrame, Layout, LayoutContext, OVERLAP_MARGIN, PADDING, cluster_offset_for,
    compute_layout, element_offset_for, local_scale_for,
};
pub use settings::{
    ControlsPatch, ControlsSettings, KEY_PREFIX, OrientationLayout, SCALE_MAX, SCALE_MIN,
    Transform, clamp_scale,
};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, SettingsStore, StoreError};
