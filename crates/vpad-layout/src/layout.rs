//! Forward and inverse layout transforms.
//!
//! Every frame is built from four parts:
//!
//! 1. a base anchor, fixed relative to the safe-area bounds (d-pad
//!    bottom-left, face cluster bottom-right, system cluster centered);
//! 2. the cluster scale applied to the base size;
//! 3. the cluster offset, plus for nested elements their slot position and
//!    their own offset, both in cluster-scaled units;
//! 4. a clamp of the *visual* frame into the bounds.
//!
//! Hitboxes are the visual frame inflated by `hitbox_scale` and are never
//! clamped, so an element can sit flush against the screen edge while its
//! touch area spills past it.

use serde::Serialize;
use vpad_core::{Insets, Orientation, Point, Rect, Size};

use crate::element::{Cluster, ControlElement};
use crate::settings::{ControlsSettings, SCALE_MAX, SCALE_MIN, clamp_scale};

/// Distance of every base anchor from the safe-area edges.
pub const PADDING: f32 = 8.0;

/// Extra lift applied when the system cluster has to dodge another cluster.
pub const OVERLAP_MARGIN: f32 = 8.0;

/// D-pad disc diameter relative to the button size.
const DPAD_SIZE_FACTOR: f32 = 2.5;
/// System pill height relative to the button size.
const SYSTEM_HEIGHT_FACTOR: f32 = 0.5;
/// Vertical center of the system cluster in landscape, as a fraction of the
/// usable height.
const LANDSCAPE_SYSTEM_Y: f32 = 0.92;

/// Substitute for zero-length divisors.
const EPSILON: f32 = 1e-6;

/// Viewport description for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutContext {
    pub viewport: Size,
    pub insets: Insets,
    pub orientation: Orientation,
}

impl LayoutContext {
    #[must_use]
    pub fn new(viewport: Size, insets: Insets, orientation: Orientation) -> Self {
        Self {
            viewport,
            insets: insets.sanitized(),
            orientation,
        }
    }

    /// Safe-area bounds every visual frame must stay inside.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.insets.sanitized().deflate(self.viewport)
    }

    /// Move `origin` so a frame of `size` stays inside the bounds. A frame
    /// larger than the bounds is pinned to the leading (left/top) edge.
    #[must_use]
    pub fn clamp_origin(&self, origin: Point, size: Size) -> Point {
        let b = self.bounds();
        let x = origin.x.min(b.right() - size.width).max(b.left());
        let y = origin.y.min(b.bottom() - size.height).max(b.top());
        Point::new(x, y)
    }
}

/// Resolved geometry for one element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElementFrame {
    pub element: ControlElement,
    /// Rendered bounds, clamped to the safe area.
    pub visual: Rect,
    /// Touch area, centered on the visual frame.
    pub hitbox: Rect,
    /// Effective scale (cluster scale × element scale).
    pub scale: f32,
}

/// Output of one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub context: LayoutContext,
    clusters: [Rect; 3],
    frames: [ElementFrame; 9],
    /// True when the system cluster was lifted to avoid an overlap.
    pub system_lifted: bool,
}

impl Layout {
    #[must_use]
    pub fn frame(&self, element: ControlElement) -> &ElementFrame {
        &self.frames[element.index()]
    }

    /// Clamped frame of a whole cluster.
    #[must_use]
    pub fn cluster(&self, cluster: Cluster) -> Rect {
        self.clusters[cluster.index()]
    }

    /// All frames in paint order.
    #[must_use]
    pub fn frames(&self) -> &[ElementFrame] {
        &self.frames
    }

    /// Topmost element whose hitbox contains `p`. The d-pad hitbox is the
    /// inscribed disc of its square.
    #[must_use]
    pub fn hit_test(&self, p: Point) -> Option<ControlElement> {
        self.frames
            .iter()
            .rev()
            .find(|f| match f.element {
                ControlElement::Dpad => {
                    (p - f.hitbox.center()).length() <= f.hitbox.size.width * 0.5
                }
                _ => f.hitbox.contains(p),
            })
            .map(|f| f.element)
    }
}

/// Base size of a cluster at scale 1.
#[must_use]
pub fn cluster_base_size(cluster: Cluster, settings: &ControlsSettings) -> Size {
    let bs = settings.button_size;
    let gap = settings.gap;
    match cluster {
        Cluster::Dpad => Size::square(bs * DPAD_SIZE_FACTOR),
        Cluster::Face => Size::square(bs * 2.0 + gap),
        Cluster::System => Size::new(bs * 4.0 + gap * 3.0, bs * SYSTEM_HEIGHT_FACTOR),
    }
}

/// Slot of a nested element inside its cluster at scale 1.
fn slot(element: ControlElement, settings: &ControlsSettings) -> Rect {
    let bs = settings.button_size;
    let step = bs + settings.gap;
    let face = Size::square(bs);
    let pill = Size::new(bs, bs * SYSTEM_HEIGHT_FACTOR);
    match element {
        ControlElement::Dpad => Rect::new(
            Point::ZERO,
            cluster_base_size(Cluster::Dpad, settings),
        ),
        ControlElement::TurboB => Rect::new(Point::new(0.0, 0.0), face),
        ControlElement::TurboA => Rect::new(Point::new(step, 0.0), face),
        ControlElement::B => Rect::new(Point::new(0.0, step), face),
        ControlElement::A => Rect::new(Point::new(step, step), face),
        ControlElement::Rewind => Rect::new(Point::new(0.0, 0.0), pill),
        ControlElement::Select => Rect::new(Point::new(step, 0.0), pill),
        ControlElement::Start => Rect::new(Point::new(step * 2.0, 0.0), pill),
        ControlElement::FastForward => Rect::new(Point::new(step * 3.0, 0.0), pill),
    }
}

/// Base top-left of a cluster whose scaled size is `size`.
fn cluster_anchor(cluster: Cluster, size: Size, ctx: &LayoutContext) -> Point {
    let b = ctx.bounds();
    match cluster {
        Cluster::Dpad => Point::new(b.left() + PADDING, b.bottom() - PADDING - size.height),
        Cluster::Face => Point::new(
            b.right() - PADDING - size.width,
            b.bottom() - PADDING - size.height,
        ),
        Cluster::System => {
            let x = b.left() + (b.size.width - size.width) * 0.5;
            let y = match ctx.orientation {
                Orientation::Portrait => b.bottom() - PADDING - size.height,
                Orientation::Landscape => {
                    b.top() + b.size.height * LANDSCAPE_SYSTEM_Y - size.height * 0.5
                }
            };
            Point::new(x, y)
        }
    }
}

/// Scale usable as a divisor.
fn divisor(scale: f32) -> f32 {
    if scale.abs() < EPSILON || !scale.is_finite() {
        1.0
    } else {
        scale
    }
}

/// Unclamped top-left of a nested element with local scale `local` inside a
/// cluster whose clamped origin is `group_origin`, before its own offset.
fn element_base(
    element: ControlElement,
    local: f32,
    group_origin: Point,
    group_scale: f32,
    settings: &ControlsSettings,
) -> Point {
    let slot = slot(element, settings);
    // Elements grow and shrink about their slot center.
    let inset = slot.size.to_point() * ((1.0 - local) * 0.5);
    group_origin + (slot.origin + inset) * group_scale
}

fn cluster_frame(cluster: Cluster, settings: &ControlsSettings, ctx: &LayoutContext) -> Rect {
    let t = settings.layout(ctx.orientation).cluster(cluster);
    let size = cluster_base_size(cluster, settings).scaled(clamp_scale(t.scale));
    let origin = cluster_anchor(cluster, size, ctx) + t.offset.finite_or_zero();
    Rect::new(ctx.clamp_origin(origin, size), size)
}

fn nested_frame(
    element: ControlElement,
    group: Rect,
    settings: &ControlsSettings,
    ctx: &LayoutContext,
) -> ElementFrame {
    let layout = settings.layout(ctx.orientation);
    let g = clamp_scale(layout.cluster(element.cluster()).scale);
    let t = layout.element(element);
    let local = clamp_scale(t.scale);

    let size = slot(element, settings).size.scaled(g * local);
    let origin =
        element_base(element, local, group.origin, g, settings) + t.offset.finite_or_zero() * g;
    let visual = Rect::new(ctx.clamp_origin(origin, size), size);
    ElementFrame {
        element,
        visual,
        hitbox: visual.scale_about_center(settings.hitbox_scale),
        scale: g * local,
    }
}

/// True once the user has moved the system cluster or any button in it.
fn system_repositioned(settings: &ControlsSettings, orientation: Orientation) -> bool {
    let layout = settings.layout(orientation);
    !layout.cluster(Cluster::System).offset.is_zero()
        || ControlElement::ALL
            .iter()
            .filter(|e| e.cluster() == Cluster::System)
            .any(|&e| !layout.element(e).offset.is_zero())
}

/// Resolve every element's frame.
///
/// While `editing`, the system cluster is never lifted out of the way so
/// the user sees exactly where they dropped it.
#[must_use]
pub fn compute_layout(settings: &ControlsSettings, ctx: &LayoutContext, editing: bool) -> Layout {
    let settings = settings.sanitized();
    let ctx = LayoutContext::new(ctx.viewport, ctx.insets, ctx.orientation);

    let dpad = cluster_frame(Cluster::Dpad, &settings, &ctx);
    let face = cluster_frame(Cluster::Face, &settings, &ctx);
    let mut system = cluster_frame(Cluster::System, &settings, &ctx);

    let mut system_lifted = false;
    if !editing
        && !system_repositioned(&settings, ctx.orientation)
        && (system.intersects(&dpad) || system.intersects(&face))
    {
        let lifted = system.translate(Point::new(0.0, -(system.size.height + OVERLAP_MARGIN)));
        system = Rect::new(ctx.clamp_origin(lifted.origin, lifted.size), lifted.size);
        system_lifted = true;
    }

    let clusters = [dpad, face, system];
    let frames = ControlElement::ALL.map(|element| match element {
        ControlElement::Dpad => ElementFrame {
            element,
            visual: dpad,
            hitbox: dpad.scale_about_center(settings.hitbox_scale),
            scale: clamp_scale(settings.layout(ctx.orientation).cluster(Cluster::Dpad).scale),
        },
        nested => nested_frame(
            nested,
            clusters[nested.cluster().index()],
            &settings,
            &ctx,
        ),
    });

    Layout {
        context: ctx,
        clusters,
        frames,
        system_lifted,
    }
}

/// Cluster offset that places the cluster's top-left at `top_left` when its
/// scale is `scale`.
#[must_use]
pub fn cluster_offset_for(
    cluster: Cluster,
    top_left: Point,
    scale: f32,
    settings: &ControlsSettings,
    ctx: &LayoutContext,
) -> Point {
    let size = cluster_base_size(cluster, settings).scaled(clamp_scale(scale));
    top_left - cluster_anchor(cluster, size, ctx)
}

/// Local scale to store for `element` so that its effective scale is as
/// close as possible to `effective`.
///
/// The effective scale is first limited so the stored local scale stays
/// inside the valid range for the current cluster scale.
#[must_use]
pub fn local_scale_for(
    element: ControlElement,
    effective: f32,
    settings: &ControlsSettings,
    orientation: Orientation,
) -> f32 {
    let g = divisor(clamp_scale(
        settings.layout(orientation).cluster(element.cluster()).scale,
    ));
    if element == ControlElement::Dpad {
        return clamp_scale(effective);
    }
    let lo = SCALE_MIN.max(SCALE_MIN * g);
    let hi = SCALE_MAX.min(SCALE_MAX * g);
    let effective = if effective.is_finite() { effective } else { g };
    clamp_scale(effective.min(hi).max(lo) / g)
}

/// Element offset (in cluster-scaled units) that places `element` at
/// `top_left` with local scale `local`. For the d-pad this is its cluster
/// offset.
#[must_use]
pub fn element_offset_for(
    element: ControlElement,
    top_left: Point,
    local: f32,
    settings: &ControlsSettings,
    ctx: &LayoutContext,
) -> Point {
    if element == ControlElement::Dpad {
        return cluster_offset_for(Cluster::Dpad, top_left, local, settings, ctx);
    }
    let settings = settings.sanitized();
    let ctx = LayoutContext::new(ctx.viewport, ctx.insets, ctx.orientation);
    let cluster = element.cluster();
    let group = cluster_frame(cluster, &settings, &ctx);
    let g = divisor(clamp_scale(
        settings.layout(ctx.orientation).cluster(cluster).scale,
    ));
    let base = element_base(element, clamp_scale(local), group.origin, g, &settings);
    (top_left - base) / g
}
