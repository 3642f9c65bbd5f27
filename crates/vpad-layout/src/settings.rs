//! User-customisable pad settings.
//!
//! `ControlsSettings` is persisted as a flat map with one key per field
//! under `virtual_controls.`:
//!
//! ```text
//! virtual_controls.button_size                 64.0
//! virtual_controls.haptics                     true
//! virtual_controls.portrait.dpad.offset        [12.0, -4.0]
//! virtual_controls.portrait.dpad.scale         1.2
//! virtual_controls.landscape.turbo_a.offset    [0.0, 0.0]
//! ```
//!
//! Loading never fails: each missing or malformed value falls back to its
//! default on its own. Out-of-range numbers are clamped. Offsets are stored
//! unclamped; they are resolved against the viewport at layout time.

use std::collections::BTreeMap;

use log::debug;
use serde_json::{Value as JsonValue, json};
use vpad_core::{Orientation, Point, TURBO_FRAMES_DEFAULT};
use vpad_dpad::{BOUNDARY_RATIO_DEFAULT, ClassifierConfig, DEADZONE_RATIO_DEFAULT};

use crate::element::{Cluster, ControlElement};

/// Prefix of every persisted key.
pub const KEY_PREFIX: &str = "virtual_controls.";

/// Valid range for every cluster and element scale.
pub const SCALE_MIN: f32 = 0.6;
pub const SCALE_MAX: f32 = 1.8;

const BUTTON_SIZE_DEFAULT: f32 = 64.0;
const BUTTON_SIZE_RANGE: (f32, f32) = (40.0, 120.0);
const GAP_DEFAULT: f32 = 12.0;
const GAP_RANGE: (f32, f32) = (0.0, 48.0);
const OPACITY_DEFAULT: f32 = 0.65;
const OPACITY_RANGE: (f32, f32) = (0.1, 1.0);
const HITBOX_SCALE_DEFAULT: f32 = 1.25;
const HITBOX_SCALE_RANGE: (f32, f32) = (1.0, 1.6);
const TURBO_FRAMES_RANGE: (u8, u8) = (1, 30);

/// Clamp a scale into `[SCALE_MIN, SCALE_MAX]`; non-finite becomes 1.
#[must_use]
pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_finite() {
        scale.clamp(SCALE_MIN, SCALE_MAX)
    } else {
        1.0
    }
}

fn clamp_range(v: f32, (lo, hi): (f32, f32), default: f32) -> f32 {
    if v.is_finite() { v.clamp(lo, hi) } else { default }
}

/// Offset and scale of a cluster, or of an element relative to its cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub offset: Point,
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        offset: Point::ZERO,
        scale: 1.0,
    };

    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            offset: self.offset.finite_or_zero(),
            scale: clamp_scale(self.scale),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Customisation for one orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationLayout {
    clusters: [Transform; 3],
    /// Indexed by `ControlElement::nested_index`.
    elements: [Transform; 8],
}

impl OrientationLayout {
    #[must_use]
    pub fn cluster(&self, cluster: Cluster) -> Transform {
        self.clusters[cluster.index()]
    }

    pub fn cluster_mut(&mut self, cluster: Cluster) -> &mut Transform {
        &mut self.clusters[cluster.index()]
    }

    /// Local transform of a nested element. The d-pad has none and reports
    /// the identity.
    #[must_use]
    pub fn element(&self, element: ControlElement) -> Transform {
        element
            .nested_index()
            .map_or(Transform::IDENTITY, |i| self.elements[i])
    }

    /// `None` for the d-pad, whose transform is its cluster's.
    pub fn element_mut(&mut self, element: ControlElement) -> Option<&mut Transform> {
        element.nested_index().map(|i| &mut self.elements[i])
    }

    #[must_use]
    pub fn sanitized(mut self) -> Self {
        for t in self.clusters.iter_mut().chain(self.elements.iter_mut()) {
            *t = t.sanitized();
        }
        self
    }
}

/// All pad settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlsSettings {
    /// Base diameter of a face button in pixels; other sizes derive from it.
    pub button_size: f32,
    /// Spacing between buttons inside a cluster.
    pub gap: f32,
    pub opacity: f32,
    /// Hitbox size relative to the visual frame.
    pub hitbox_scale: f32,
    pub dpad_deadzone_ratio: f32,
    pub dpad_boundary_ratio: f32,
    pub haptics: bool,
    pub turbo_on_frames: u8,
    pub turbo_off_frames: u8,
    pub portrait: OrientationLayout,
    pub landscape: OrientationLayout,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            button_size: BUTTON_SIZE_DEFAULT,
            gap: GAP_DEFAULT,
            opacity: OPACITY_DEFAULT,
            hitbox_scale: HITBOX_SCALE_DEFAULT,
            dpad_deadzone_ratio: DEADZONE_RATIO_DEFAULT,
            dpad_boundary_ratio: BOUNDARY_RATIO_DEFAULT,
            haptics: true,
            turbo_on_frames: TURBO_FRAMES_DEFAULT,
            turbo_off_frames: TURBO_FRAMES_DEFAULT,
            portrait: OrientationLayout::default(),
            landscape: OrientationLayout::default(),
        }
    }
}

impl ControlsSettings {
    #[must_use]
    pub fn layout(&self, orientation: Orientation) -> &OrientationLayout {
        match orientation {
            Orientation::Portrait => &self.portrait,
            Orientation::Landscape => &self.landscape,
        }
    }

    pub fn layout_mut(&mut self, orientation: Orientation) -> &mut OrientationLayout {
        match orientation {
            Orientation::Portrait => &mut self.portrait,
            Orientation::Landscape => &mut self.landscape,
        }
    }

    /// D-pad classifier parameters.
    #[must_use]
    pub fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig::new(self.dpad_deadzone_ratio, self.dpad_boundary_ratio)
    }

    /// Copy with every field clamped into range.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let classifier = self.classifier();
        let frames = |v: u8| v.clamp(TURBO_FRAMES_RANGE.0, TURBO_FRAMES_RANGE.1);
        Self {
            button_size: clamp_range(self.button_size, BUTTON_SIZE_RANGE, BUTTON_SIZE_DEFAULT),
            gap: clamp_range(self.gap, GAP_RANGE, GAP_DEFAULT),
            opacity: clamp_range(self.opacity, OPACITY_RANGE, OPACITY_DEFAULT),
            hitbox_scale: clamp_range(self.hitbox_scale, HITBOX_SCALE_RANGE, HITBOX_SCALE_DEFAULT),
            dpad_deadzone_ratio: classifier.deadzone_ratio(),
            dpad_boundary_ratio: classifier.boundary_ratio(),
            haptics: self.haptics,
            turbo_on_frames: frames(self.turbo_on_frames),
            turbo_off_frames: frames(self.turbo_off_frames),
            portrait: self.portrait.sanitized(),
            landscape: self.landscape.sanitized(),
        }
    }

    /// Flatten to persisted keys and JSON values.
    #[must_use]
    pub fn to_entries(&self) -> BTreeMap<String, JsonValue> {
        let mut out = BTreeMap::new();
        let mut put = |key: &str, value: JsonValue| {
            out.insert(format!("{KEY_PREFIX}{key}"), value);
        };

        put("button_size", json!(self.button_size));
        put("gap", json!(self.gap));
        put("opacity", json!(self.opacity));
        put("hitbox_scale", json!(self.hitbox_scale));
        put("dpad_deadzone_ratio", json!(self.dpad_deadzone_ratio));
        put("dpad_boundary_ratio", json!(self.dpad_boundary_ratio));
        put("haptics", json!(self.haptics));
        put("turbo_on_frames", json!(self.turbo_on_frames));
        put("turbo_off_frames", json!(self.turbo_off_frames));

        for orientation in [Orientation::Portrait, Orientation::Landscape] {
            let layout = self.layout(orientation);
            let o = orientation.key();
            for cluster in Cluster::ALL {
                let t = layout.cluster(cluster);
                put(&format!("{o}.{}.offset", cluster.key()), point_json(t.offset));
                put(&format!("{o}.{}.scale", cluster.key()), json!(t.scale));
            }
            for element in ControlElement::NESTED {
                let t = layout.element(element);
                put(&format!("{o}.{}.offset", element.key()), point_json(t.offset));
                put(&format!("{o}.{}.scale", element.key()), json!(t.scale));
            }
        }
        out
    }

    /// Rebuild from persisted keys. `lookup` receives full keys (with the
    /// prefix). Every field falls back to its default independently.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<JsonValue>) -> Self {
        let d = Self::default();
        let get = |key: &str| lookup(&format!("{KEY_PREFIX}{key}"));

        let mut s = Self {
            button_size: read_f32(get("button_size"), "button_size", d.button_size),
            gap: read_f32(get("gap"), "gap", d.gap),
            opacity: read_f32(get("opacity"), "opacity", d.opacity),
            hitbox_scale: read_f32(get("hitbox_scale"), "hitbox_scale", d.hitbox_scale),
            dpad_deadzone_ratio: read_f32(
                get("dpad_deadzone_ratio"),
                "dpad_deadzone_ratio",
                d.dpad_deadzone_ratio,
            ),
            dpad_boundary_ratio: read_f32(
                get("dpad_boundary_ratio"),
                "dpad_boundary_ratio",
                d.dpad_boundary_ratio,
            ),
            haptics: read_bool(get("haptics"), "haptics", d.haptics),
            turbo_on_frames: read_u8(get("turbo_on_frames"), "turbo_on_frames", d.turbo_on_frames),
            turbo_off_frames: read_u8(
                get("turbo_off_frames"),
                "turbo_off_frames",
                d.turbo_off_frames,
            ),
            portrait: OrientationLayout::default(),
            landscape: OrientationLayout::default(),
        };

        for orientation in [Orientation::Portrait, Orientation::Landscape] {
            let o = orientation.key();
            let layout = s.layout_mut(orientation);
            let read = |segment: &str| {
                let offset_key = format!("{o}.{segment}.offset");
                let scale_key = format!("{o}.{segment}.scale");
                Transform {
                    offset: read_point(get(&offset_key), &offset_key, Point::ZERO),
                    scale: read_f32(get(&scale_key), &scale_key, 1.0),
                }
            };
            for cluster in Cluster::ALL {
                *layout.cluster_mut(cluster) = read(cluster.key());
            }
            for element in ControlElement::NESTED {
                if let Some(t) = layout.element_mut(element) {
                    *t = read(element.key());
                }
            }
        }

        s.sanitized()
    }
}

/// Partial update of the shared appearance fields. `None` leaves a field
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlsPatch {
    pub button_size: Option<f32>,
    pub gap: Option<f32>,
    pub opacity: Option<f32>,
    pub hitbox_scale: Option<f32>,
    pub dpad_deadzone_ratio: Option<f32>,
    pub dpad_boundary_ratio: Option<f32>,
    pub haptics: Option<bool>,
    pub turbo_on_frames: Option<u8>,
    pub turbo_off_frames: Option<u8>,
    /// `Some(o)` resets that orientation's offsets and scales.
    pub reset_layout: Option<Orientation>,
}

impl ControlsPatch {
    pub fn apply_to(&self, s: &mut ControlsSettings) {
        fn set<T: Copy>(field: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *field = v;
            }
        }
        set(&mut s.button_size, self.button_size);
        set(&mut s.gap, self.gap);
        set(&mut s.opacity, self.opacity);
        set(&mut s.hitbox_scale, self.hitbox_scale);
        set(&mut s.dpad_deadzone_ratio, self.dpad_deadzone_ratio);
        set(&mut s.dpad_boundary_ratio, self.dpad_boundary_ratio);
        set(&mut s.haptics, self.haptics);
        set(&mut s.turbo_on_frames, self.turbo_on_frames);
        set(&mut s.turbo_off_frames, self.turbo_off_frames);
        if let Some(orientation) = self.reset_layout {
            *s.layout_mut(orientation) = OrientationLayout::default();
        }
    }
}

fn point_json(p: Point) -> JsonValue {
    json!([p.x, p.y])
}

fn read_f32(value: Option<JsonValue>, key: &str, default: f32) -> f32 {
    match value.as_ref().and_then(JsonValue::as_f64) {
        Some(v) if v.is_finite() => v as f32,
        _ => fallback(value.as_ref(), key, default),
    }
}

fn read_bool(value: Option<JsonValue>, key: &str, default: bool) -> bool {
    match value.as_ref().and_then(JsonValue::as_bool) {
        Some(v) => v,
        None => fallback(value.as_ref(), key, default),
    }
}

fn read_u8(value: Option<JsonValue>, key: &str, default: u8) -> u8 {
    match value.as_ref().and_then(JsonValue::as_u64) {
        Some(v) => u8::try_from(v).unwrap_or(u8::MAX),
        None => fallback(value.as_ref(), key, default),
    }
}

fn read_point(value: Option<JsonValue>, key: &str, default: Point) -> Point {
    let parsed = value.as_ref().and_then(JsonValue::as_array).and_then(|a| match a.as_slice() {
        [x, y] => Some(Point::new(x.as_f64()? as f32, y.as_f64()? as f32)),
        _ => None,
    });
    match parsed {
        Some(p) if p.x.is_finite() && p.y.is_finite() => p,
        _ => fallback(value.as_ref(), key, default),
    }
}

fn fallback<T: std::fmt::Debug>(value: Option<&JsonValue>, key: &str, default: T) -> T {
    if let Some(v) = value {
        debug!("malformed setting {KEY_PREFIX}{key} = {v}, using {default:?}");
    }
    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpad_dpad::{
        BOUNDARY_RATIO_MAX, BOUNDARY_RATIO_MIN, DEADZONE_RATIO_MAX, DEADZONE_RATIO_MIN,
    };

    fn lookup_from(map: BTreeMap<String, JsonValue>) -> impl Fn(&str) -> Option<JsonValue> {
        move |k| map.get(k).cloned()
    }

    #[test]
    fn empty_store_gives_defaults() {
        let s = ControlsSettings::from_lookup(|_| None);
        assert_eq!(s, ControlsSettings::default());
    }

    #[test]
    fn entries_round_trip() {
        let mut s = ControlsSettings::default();
        s.button_size = 72.0;
        s.haptics = false;
        s.turbo_on_frames = 3;
        s.landscape.cluster_mut(Cluster::Face).offset = Point::new(-20.0, 14.5);
        s.portrait.cluster_mut(Cluster::Dpad).scale = 1.5;
        if let Some(t) = s.portrait.element_mut(ControlElement::TurboB) {
            t.scale = 0.75;
            t.offset = Point::new(3.0, -2.0);
        }

        let back = ControlsSettings::from_lookup(lookup_from(s.to_entries()));
        assert_eq!(back, s);
    }

    #[test]
    fn malformed_field_falls_back_alone() {
        let mut s = ControlsSettings::default();
        s.gap = 20.0;
        s.portrait.cluster_mut(Cluster::System).offset = Point::new(5.0, 6.0);
        let mut entries = s.to_entries();
        entries.insert(format!("{KEY_PREFIX}button_size"), json!("huge"));
        entries.insert(format!("{KEY_PREFIX}portrait.face.offset"), json!([1.0]));
        entries.insert(format!("{KEY_PREFIX}haptics"), json!(1));

        let back = ControlsSettings::from_lookup(lookup_from(entries));
        assert_eq!(back.button_size, BUTTON_SIZE_DEFAULT);
        assert_eq!(back.portrait.cluster(Cluster::Face).offset, Point::ZERO);
        assert!(back.haptics);
        assert_eq!(back.gap, 20.0);
        assert_eq!(
            back.portrait.cluster(Cluster::System).offset,
            Point::new(5.0, 6.0)
        );
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut entries = BTreeMap::new();
        entries.insert(format!("{KEY_PREFIX}portrait.dpad.scale"), json!(5.0));
        entries.insert(format!("{KEY_PREFIX}landscape.a.scale"), json!(0.1));
        entries.insert(format!("{KEY_PREFIX}dpad_deadzone_ratio"), json!(3.0));
        entries.insert(format!("{KEY_PREFIX}turbo_off_frames"), json!(0));

        let s = ControlsSettings::from_lookup(lookup_from(entries));
        assert_eq!(s.portrait.cluster(Cluster::Dpad).scale, SCALE_MAX);
        assert_eq!(s.landscape.element(ControlElement::A).scale, SCALE_MIN);
        assert_eq!(s.dpad_deadzone_ratio, DEADZONE_RATIO_MAX);
        assert_eq!(s.turbo_off_frames, 1);
    }

    #[test]
    fn offsets_are_not_clamped() {
        let mut s = ControlsSettings::default();
        s.portrait.cluster_mut(Cluster::Dpad).offset = Point::new(-5000.0, 9000.0);
        assert_eq!(
            s.sanitized().portrait.cluster(Cluster::Dpad).offset,
            Point::new(-5000.0, 9000.0)
        );
    }

    #[test]
    fn patch_touches_only_present_fields() {
        let mut s = ControlsSettings::default();
        s.portrait.cluster_mut(Cluster::Face).scale = 1.4;
        let patch = ControlsPatch {
            opacity: Some(0.3),
            reset_layout: Some(Orientation::Portrait),
            ..ControlsPatch::default()
        };
        patch.apply_to(&mut s);
        assert_eq!(s.opacity, 0.3);
        assert_eq!(s.gap, GAP_DEFAULT);
        assert_eq!(s.portrait, OrientationLayout::default());
    }

    #[test]
    fn dpad_has_no_element_transform() {
        let mut layout = OrientationLayout::default();
        assert!(layout.element_mut(ControlElement::Dpad).is_none());
        assert_eq!(layout.element(ControlElement::Dpad), Transform::IDENTITY);
    }

    #[test]
    fn ratio_bounds_match_classifier() {
        let mut s = ControlsSettings::default();
        s.dpad_boundary_ratio = 0.0;
        s.dpad_deadzone_ratio = -1.0;
        let s = s.sanitized();
        assert_eq!(s.dpad_boundary_ratio, BOUNDARY_RATIO_MIN);
        assert_eq!(s.dpad_deadzone_ratio, DEADZONE_RATIO_MIN);
        assert!(s.dpad_boundary_ratio <= BOUNDARY_RATIO_MAX);
    }
}
