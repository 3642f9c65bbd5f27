//! Pixel geometry shared by layout, hit testing and gestures.
//!
//! All coordinates are logical pixels with the origin at the top-left of the
//! viewport, x growing right and y growing down.

use serde::{Deserialize, Serialize};

/// A 2-D point or displacement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length when treated as a vector.
    #[must_use]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Replace non-finite components with zero.
    #[must_use]
    pub fn finite_or_zero(self) -> Self {
        let fix = |v: f32| if v.is_finite() { v } else { 0.0 };
        Self::new(fix(self.x), fix(self.y))
    }
}

impl core::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl core::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl core::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl core::ops::Div<f32> for Point {
    type Output = Self;

    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

/// Width and height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn square(side: f32) -> Self {
        Self::new(side, side)
    }

    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    /// Length of the diagonal.
    #[must_use]
    pub fn diagonal(self) -> f32 {
        self.width.hypot(self.height)
    }

    /// The size as a displacement from a top-left corner.
    #[must_use]
    pub fn to_point(self) -> Point {
        Point::new(self.width, self.height)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    #[must_use]
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    #[must_use]
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(Point::new(left, top), Size::new(right - left, bottom - top))
    }

    #[must_use]
    pub fn left(&self) -> f32 {
        self.origin.x
    }

    #[must_use]
    pub fn top(&self) -> f32 {
        self.origin.y
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.origin + self.size.to_point() * 0.5
    }

    /// Half-open containment: the right and bottom edges are outside.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    /// True when the two rectangles share a non-empty area.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    #[must_use]
    pub fn translate(&self, by: Point) -> Self {
        Self::new(self.origin + by, self.size)
    }

    /// Scale the rectangle about its center.
    #[must_use]
    pub fn scale_about_center(&self, factor: f32) -> Self {
        let size = self.size.scaled(factor);
        let origin = self.center() - size.to_point() * 0.5;
        Self::new(origin, size)
    }
}

/// Device-reported margins that usable content must avoid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Insets {
    pub const ZERO: Self = Self::uniform(0.0);

    #[must_use]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[must_use]
    pub const fn uniform(v: f32) -> Self {
        Self::new(v, v, v, v)
    }

    /// Negative or non-finite insets are treated as zero.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let fix = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self::new(fix(self.left), fix(self.top), fix(self.right), fix(self.bottom))
    }

    /// The area of `viewport` left after removing the insets.
    #[must_use]
    pub fn deflate(self, viewport: Size) -> Rect {
        Rect::from_ltrb(
            self.left,
            self.top,
            viewport.width - self.right,
            viewport.height - self.bottom,
        )
    }
}

/// Screen orientation; each has its own stored layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Orientation implied by the viewport aspect ratio.
    #[must_use]
    pub fn from_viewport(viewport: Size) -> Self {
        if viewport.width > viewport.height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}
