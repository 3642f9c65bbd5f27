//! Interactive layout editor.
//!
//! While editing, all changes go to a draft copy of the settings. Drag and
//! resize gestures produce a new top-left and scale for their target every
//! update; the inverse transform turns those into the offset and scale that
//! reproduce them on the next layout pass. Leaving edit mode commits the
//! draft through the settings store in one update.

use log::debug;
use vpad_core::{Point, Rect, Size};

use crate::element::{Cluster, ControlElement};
use crate::layout::{
    LayoutContext, cluster_offset_for, compute_layout, element_offset_for, local_scale_for,
};
use crate::settings::{ControlsSettings, OrientationLayout, SCALE_MAX, SCALE_MIN, clamp_scale};
use crate::store::{KeyValueStore, SettingsStore};

/// Default grid spacing in pixels.
pub const GRID_SPACING_DEFAULT: f32 = 16.0;
const GRID_SPACING_RANGE: (f32, f32) = (4.0, 128.0);

const SNAP_FACTOR: f32 = 0.35;
const SNAP_THRESHOLD_RANGE: (f32, f32) = (6.0, 24.0);
/// A snapped axis is released only past this multiple of the threshold.
const SNAP_RELEASE_FACTOR: f32 = 1.25;

const EPSILON: f32 = 1e-6;

/// Per-axis grid snapping with hysteresis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSnap {
    spacing: f32,
    threshold: f32,
    line_x: Option<f32>,
    line_y: Option<f32>,
}

impl GridSnap {
    #[must_use]
    pub fn new(spacing: f32) -> Self {
        let spacing = if spacing.is_finite() {
            spacing.clamp(GRID_SPACING_RANGE.0, GRID_SPACING_RANGE.1)
        } else {
            GRID_SPACING_DEFAULT
        };
        let threshold = (spacing * SNAP_FACTOR).clamp(SNAP_THRESHOLD_RANGE.0, SNAP_THRESHOLD_RANGE.1);
        Self {
            spacing,
            threshold,
            line_x: None,
            line_y: None,
        }
    }

    /// Distance from a grid line within which a free axis snaps.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Distance from its line beyond which a snapped axis is released.
    #[must_use]
    pub fn release_distance(&self) -> f32 {
        self.threshold * SNAP_RELEASE_FACTOR
    }

    #[must_use]
    pub fn is_snapped(&self) -> (bool, bool) {
        (self.line_x.is_some(), self.line_y.is_some())
    }

    /// Snap a raw element center.
    pub fn apply(&mut self, center: Point) -> Point {
        Point::new(
            self.axis(center.x, Axis::X),
            self.axis(center.y, Axis::Y),
        )
    }

    fn axis(&mut self, v: f32, axis: Axis) -> f32 {
        let release = self.release_distance();
        let (spacing, threshold) = (self.spacing, self.threshold);
        let line = match axis {
            Axis::X => &mut self.line_x,
            Axis::Y => &mut self.line_y,
        };

        if let Some(l) = *line {
            if (v - l).abs() <= release {
                return l;
            }
            *line = None;
        }

        let nearest = (v / spacing).round() * spacing;
        if (v - nearest).abs() <= threshold {
            *line = Some(nearest);
            nearest
        } else {
            v
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// What a gesture moves: a whole cluster or one element inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditTarget {
    Cluster(Cluster),
    Element(ControlElement),
}

impl EditTarget {
    /// The d-pad element and the d-pad cluster are the same thing.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Element(ControlElement::Dpad) => Self::Cluster(Cluster::Dpad),
            other => other,
        }
    }
}

/// Corner handle used for resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Unit signs pointing from the opposite corner towards this one.
    #[must_use]
    pub fn direction(self) -> Point {
        match self {
            Self::TopLeft => Point::new(-1.0, -1.0),
            Self::TopRight => Point::new(1.0, -1.0),
            Self::BottomLeft => Point::new(-1.0, 1.0),
            Self::BottomRight => Point::new(1.0, 1.0),
        }
    }

    /// Position of this corner on `rect`.
    #[must_use]
    pub fn point(self, rect: &Rect) -> Point {
        let d = self.direction();
        Point::new(
            if d.x > 0.0 { rect.right() } else { rect.left() },
            if d.y > 0.0 { rect.bottom() } else { rect.top() },
        )
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::TopRight => Self::BottomLeft,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DragSession {
    target: EditTarget,
    pointer_start: Point,
    origin_start: Point,
    size: Size,
    /// Scale as stored in the draft. A drag writes it back untouched.
    stored_scale: f32,
    snap: Option<GridSnap>,
}

#[derive(Debug, Clone, Copy)]
struct ResizeSession {
    target: EditTarget,
    corner: Corner,
    pointer_start: Point,
    frame_start: Rect,
    scale_start: f32,
}

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Drag(DragSession),
    Resize(ResizeSession),
}

/// Edit-mode state. The draft exists exactly while editing.
#[derive(Debug, Clone)]
pub struct EditorState {
    draft: Option<ControlsSettings>,
    grid_snap: bool,
    grid_spacing: f32,
    gesture: Option<Gesture>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            draft: None,
            grid_snap: false,
            grid_spacing: GRID_SPACING_DEFAULT,
            gesture: None,
        }
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    #[must_use]
    pub fn draft(&self) -> Option<&ControlsSettings> {
        self.draft.as_ref()
    }

    /// Settings to lay out with: the draft while editing, else `current`.
    #[must_use]
    pub fn effective<'a>(&'a self, current: &'a ControlsSettings) -> &'a ControlsSettings {
        self.draft.as_ref().unwrap_or(current)
    }

    #[must_use]
    pub fn grid_snap(&self) -> bool {
        self.grid_snap
    }

    pub fn set_grid_snap(&mut self, enabled: bool) {
        self.grid_snap = enabled;
    }

    #[must_use]
    pub fn grid_spacing(&self) -> f32 {
        self.grid_spacing
    }

    pub fn set_grid_spacing(&mut self, spacing: f32) {
        self.grid_spacing = GridSnap::new(spacing).spacing;
    }

    /// Enter edit mode with a draft seeded from `current`. No-op if already
    /// editing.
    pub fn enter(&mut self, current: &ControlsSettings) {
        if self.draft.is_none() {
            debug!("layout editor: enter");
            self.draft = Some(current.clone());
        }
    }

    /// Leave edit mode, committing the draft to `store`.
    pub fn exit<S: KeyValueStore>(&mut self, store: &mut SettingsStore<S>) {
        self.gesture = None;
        if let Some(draft) = self.draft.take() {
            debug!("layout editor: commit");
            store.replace(draft);
        }
    }

    /// Leave edit mode, throwing the draft away.
    pub fn discard(&mut self) {
        self.gesture = None;
        if self.draft.take().is_some() {
            debug!("layout editor: discard");
        }
    }

    /// Reset the draft's layout for the context orientation.
    pub fn reset_orientation(&mut self, ctx: &LayoutContext) {
        if let Some(draft) = self.draft.as_mut() {
            *draft.layout_mut(ctx.orientation) = OrientationLayout::default();
        }
    }

    #[must_use]
    pub fn is_gesture_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Start dragging `target` from `pointer`. Returns `false` when not
    /// editing.
    pub fn begin_drag(&mut self, target: EditTarget, pointer: Point, ctx: &LayoutContext) -> bool {
        let Some(draft) = self.draft.as_ref() else {
            return false;
        };
        let target = target.normalized();
        let (frame, _) = target_frame(target, draft, ctx);
        self.gesture = Some(Gesture::Drag(DragSession {
            target,
            pointer_start: pointer,
            origin_start: frame.origin,
            size: frame.size,
            stored_scale: stored_scale(target, draft, ctx),
            snap: self.grid_snap.then(|| GridSnap::new(self.grid_spacing)),
        }));
        debug!("layout editor: drag {target:?}");
        true
    }

    /// Start resizing `target` from one of its corner handles.
    pub fn begin_resize(
        &mut self,
        target: EditTarget,
        corner: Corner,
        pointer: Point,
        ctx: &LayoutContext,
    ) -> bool {
        let Some(draft) = self.draft.as_ref() else {
            return false;
        };
        let target = target.normalized();
        let (frame, scale) = target_frame(target, draft, ctx);
        self.gesture = Some(Gesture::Resize(ResizeSession {
            target,
            corner,
            pointer_start: pointer,
            frame_start: frame,
            scale_start: scale,
        }));
        debug!("layout editor: resize {target:?} from {corner:?}");
        true
    }

    /// Feed a pointer position to the active gesture and write the result
    /// into the draft. Returns `false` if no gesture is active.
    pub fn update_gesture(&mut self, pointer: Point, ctx: &LayoutContext) -> bool {
        let (Some(draft), Some(gesture)) = (self.draft.as_mut(), self.gesture.as_mut()) else {
            return false;
        };
        match gesture {
            Gesture::Drag(drag) => {
                let mut origin = drag.origin_start + (pointer - drag.pointer_start);
                if let Some(snap) = drag.snap.as_mut() {
                    let half = drag.size.to_point() * 0.5;
                    origin = snap.apply(origin + half) - half;
                }
                let origin = ctx.clamp_origin(origin, drag.size);
                place_target(drag.target, draft, ctx, origin, drag.stored_scale);
            }
            Gesture::Resize(resize) => {
                let (origin, scale) = resize_step(resize, pointer, draft, ctx);
                let stored = match resize.target {
                    EditTarget::Cluster(_) => clamp_scale(scale),
                    EditTarget::Element(e) => local_scale_for(e, scale, draft, ctx.orientation),
                };
                place_target(resize.target, draft, ctx, origin, stored);
            }
        }
        true
    }

    /// Finish the active gesture. The draft keeps its result.
    pub fn end_gesture(&mut self) {
        self.gesture = None;
    }
}

/// Current clamped frame of `target` and its scale in target terms (cluster
/// scale for clusters, effective scale for elements).
fn target_frame(target: EditTarget, draft: &ControlsSettings, ctx: &LayoutContext) -> (Rect, f32) {
    let layout = compute_layout(draft, ctx, true);
    match target {
        EditTarget::Cluster(c) => (
            layout.cluster(c),
            clamp_scale(draft.layout(ctx.orientation).cluster(c).scale),
        ),
        EditTarget::Element(e) => {
            let f = layout.frame(e);
            (f.visual, f.scale)
        }
    }
}

/// Scale limits for `target`, in the same terms as `target_frame`.
fn scale_limits(target: EditTarget, draft: &ControlsSettings, ctx: &LayoutContext) -> (f32, f32) {
    match target {
        EditTarget::Cluster(_) | EditTarget::Element(ControlElement::Dpad) => {
            (SCALE_MIN, SCALE_MAX)
        }
        EditTarget::Element(e) => {
            let g = clamp_scale(draft.layout(ctx.orientation).cluster(e.cluster()).scale);
            (SCALE_MIN.max(SCALE_MIN * g), SCALE_MAX.min(SCALE_MAX * g))
        }
    }
}

/// Scale `target` carries in the draft: the cluster scale, or an element's
/// local scale.
fn stored_scale(target: EditTarget, draft: &ControlsSettings, ctx: &LayoutContext) -> f32 {
    let layout = draft.layout(ctx.orientation);
    match target {
        EditTarget::Cluster(c) => clamp_scale(layout.cluster(c).scale),
        EditTarget::Element(e) => clamp_scale(layout.element(e).scale),
    }
}

/// Inverse transform: store `origin` for `target` in the draft. `scale` is
/// in stored terms (cluster scale or local element scale).
fn place_target(
    target: EditTarget,
    draft: &mut ControlsSettings,
    ctx: &LayoutContext,
    origin: Point,
    scale: f32,
) {
    match target {
        EditTarget::Cluster(c) => {
            let offset = cluster_offset_for(c, origin, scale, draft, ctx);
            let t = draft.layout_mut(ctx.orientation).cluster_mut(c);
            t.scale = scale;
            t.offset = offset;
        }
        EditTarget::Element(e) => {
            let offset = element_offset_for(e, origin, scale, draft, ctx);
            if let Some(t) = draft.layout_mut(ctx.orientation).element_mut(e) {
                t.scale = scale;
                t.offset = offset;
            }
        }
    }
}

/// New origin and scale for a corner-handle resize.
///
/// The pointer delta is projected onto the diagonal running from the fixed
/// opposite corner to the dragged one; the frame scales uniformly by the
/// ratio of the new diagonal length to the old.
fn resize_step(
    resize: &ResizeSession,
    pointer: Point,
    draft: &ControlsSettings,
    ctx: &LayoutContext,
) -> (Point, f32) {
    let start = resize.frame_start;
    let dir = resize.corner.direction();
    let diag = start.size.diagonal().max(EPSILON);
    let unit = Point::new(
        dir.x * start.size.width / diag,
        dir.y * start.size.height / diag,
    );
    let delta = pointer - resize.pointer_start;
    let projected = delta.x * unit.x + delta.y * unit.y;
    let scale_start = resize.scale_start.max(EPSILON);
    let wanted = scale_start * (diag + projected) / diag;

    // Far edges may not leave the bounds.
    let anchor = resize.corner.opposite().point(&start);
    let b = ctx.bounds();
    let room_w = if dir.x > 0.0 {
        b.right() - anchor.x
    } else {
        anchor.x - b.left()
    };
    let room_h = if dir.y > 0.0 {
        b.bottom() - anchor.y
    } else {
        anchor.y - b.top()
    };
    let edge_max = scale_start
        * (room_w / start.size.width.max(EPSILON)).min(room_h / start.size.height.max(EPSILON));

    let (lo, hi) = scale_limits(resize.target, draft, ctx);
    let scale = wanted.min(hi.min(edge_max)).max(lo);

    let size = start.size.scaled(scale / scale_start);
    let origin = Point::new(
        if dir.x > 0.0 {
            anchor.x
        } else {
            anchor.x - size.width
        },
        if dir.y > 0.0 {
            anchor.y
        } else {
            anchor.y - size.height
        },
    );
    (origin, scale)
}
