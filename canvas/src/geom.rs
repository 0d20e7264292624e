//! Geometry generators: points, symmetry reflection, and the procedural
//! outlines used by the shape, stamp, spray and pattern tools.
//!
//! Everything here is a pure function of its inputs. The only exception is
//! [`spray_points`], which draws from the caller's random source so tests can
//! pass a seeded one.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use std::f64::consts::{PI, TAU};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{HEART_SAMPLES, PATTERN_CORE_RATIO, PATTERN_PETALS, PATTERN_PETAL_RATIO};

/// A point in canvas coordinates (CSS pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// Logical canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self { width: crate::consts::DEFAULT_CANVAS_WIDTH, height: crate::consts::DEFAULT_CANVAS_HEIGHT }
    }
}

impl CanvasSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

// =============================================================================
// Symmetry
// =============================================================================

/// Mirror mode applied to continuous tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symmetry {
    #[default]
    None,
    /// Mirror across the vertical center line.
    Horizontal,
    /// Mirror across the horizontal center line.
    Vertical,
    /// Mirror across both center lines.
    #[serde(alias = "quad")]
    Quadrant,
}

impl Symmetry {
    /// Parse a toolbar name. Unknown names yield `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "horizontal" => Some(Self::Horizontal),
            "vertical" => Some(Self::Vertical),
            "quad" | "quadrant" => Some(Self::Quadrant),
            _ => None,
        }
    }

    /// Number of points [`reflect`] produces in this mode.
    #[must_use]
    pub fn arms(self) -> usize {
        match self {
            Self::None => 1,
            Self::Horizontal | Self::Vertical => 2,
            Self::Quadrant => 4,
        }
    }
}

/// The symmetry reflection set of `pt`.
///
/// Output order is stable: the primary point, then its horizontal mirror,
/// then its vertical mirror, then the point mirrored through the center.
/// Engine code relies on this order to keep mirrored elements in lockstep.
#[must_use]
pub fn reflect(pt: Point, size: CanvasSize, mode: Symmetry) -> Vec<Point> {
    let mx = size.width - pt.x;
    let my = size.height - pt.y;
    let mut out = Vec::with_capacity(mode.arms());
    out.push(pt);
    if matches!(mode, Symmetry::Horizontal | Symmetry::Quadrant) {
        out.push(Point::new(mx, pt.y));
    }
    if matches!(mode, Symmetry::Vertical | Symmetry::Quadrant) {
        out.push(Point::new(pt.x, my));
    }
    if mode == Symmetry::Quadrant {
        out.push(Point::new(mx, my));
    }
    out
}

// =============================================================================
// Parametric curves
// =============================================================================

/// Heart silhouette around `center`, sampled at a constant angular step.
///
/// Returns `HEART_SAMPLES + 1` points; the last coincides with the first.
#[must_use]
pub fn heart_points(center: Point, scale: f64) -> Vec<Point> {
    #[allow(clippy::cast_precision_loss)]
    let step = TAU / HEART_SAMPLES as f64;
    (0..=HEART_SAMPLES)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = step * i as f64;
            let x = center.x + scale * t.sin().powi(3);
            let y = center.y
                - scale * (13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos()) / 16.0;
            Point::new(x, y)
        })
        .collect()
}

/// Vertices of a regular `sides`-gon of circumradius `radius`.
///
/// The first vertex points straight up before `rotation_deg` (clockwise) is
/// applied.
#[must_use]
pub fn regular_polygon(center: Point, sides: u32, radius: f64, rotation_deg: f64) -> Vec<Point> {
    let sides = sides.max(3);
    let rot = rotation_deg.to_radians();
    (0..sides)
        .map(|i| {
            let a = TAU * f64::from(i) / f64::from(sides) + rot;
            Point::new(center.x + radius * a.sin(), center.y - radius * a.cos())
        })
        .collect()
}

/// Vertices of a star with `points` tips, alternating outer and inner radius.
#[must_use]
pub fn star_points(center: Point, points: u32, inner: f64, outer: f64) -> Vec<Point> {
    let points = points.max(2);
    (0..points * 2)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = PI * f64::from(i) / f64::from(points);
            Point::new(center.x + r * a.sin(), center.y - r * a.cos())
        })
        .collect()
}

/// Triangle for an arrowhead whose tip sits at `to`.
///
/// Returns `[tip, left, right]`. A zero-length arrow points right.
#[must_use]
pub fn arrow_head(from: Point, to: Point, length: f64, width: f64) -> [Point; 3] {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = dx.hypot(dy);
    let (ux, uy) = if len > f64::EPSILON { (dx / len, dy / len) } else { (1.0, 0.0) };
    let base = Point::new(to.x - ux * length, to.y - uy * length);
    let half = width / 2.0;
    [to, Point::new(base.x - uy * half, base.y + ux * half), Point::new(base.x + uy * half, base.y - ux * half)]
}

// =============================================================================
// Particles and stamps
// =============================================================================

/// Sample `density` spray dots inside a disc.
///
/// Angle and distance are both uniform, so dots cluster toward the center.
pub fn spray_points<R: Rng + ?Sized>(rng: &mut R, center: Point, radius: f64, density: usize) -> Vec<Point> {
    (0..density)
        .map(|_| {
            let angle = rng.random::<f64>() * TAU;
            let dist = rng.random::<f64>() * radius;
            Point::new(center.x + angle.cos() * dist, center.y + angle.sin() * dist)
        })
        .collect()
}

/// One disc of a rosette.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disc {
    pub center: Point,
    pub radius: f64,
}

/// Petal discs and the core disc of a pattern-brush rosette.
#[must_use]
pub fn rosette(center: Point, size: f64) -> (Vec<Disc>, Disc) {
    #[allow(clippy::cast_precision_loss)]
    let petals = (0..PATTERN_PETALS)
        .map(|j| {
            let a = TAU * j as f64 / PATTERN_PETALS as f64;
            Disc { center: center.offset(a.cos() * size, a.sin() * size), radius: size * PATTERN_PETAL_RATIO }
        })
        .collect();
    (petals, Disc { center, radius: size * PATTERN_CORE_RATIO })
}

/// Axis-aligned bounds of a point set as `(min, max)`.
#[must_use]
pub fn bounds_of(points: &[Point]) -> Option<(Point, Point)> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(lo, hi), p| {
        (Point::new(lo.x.min(p.x), lo.y.min(p.y)), Point::new(hi.x.max(p.x), hi.y.max(p.y)))
    }))
}

/// Distance from `p` to the segment `a..b`.
#[must_use]
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}
