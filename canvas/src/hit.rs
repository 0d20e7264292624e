//! Hit-testing and bounding boxes for scene elements.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::TEXT_ADVANCE_RATIO;
use crate::doc::{Element, ElementId, Shape};
use crate::geom::{self, Point};

/// Extra slop, in canvas pixels, around thin outlines.
const HIT_TOLERANCE: f64 = 3.0;

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    /// Inside the element's area.
    Body,
    /// Near a line-like element's path.
    Outline,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    #[must_use]
    pub fn from_origin(origin: Point, width: f64, height: f64) -> Self {
        let far = origin.offset(width, height);
        Self {
            min: Point::new(origin.x.min(far.x), origin.y.min(far.y)),
            max: Point::new(origin.x.max(far.x), origin.y.max(far.y)),
        }
    }

    #[must_use]
    pub fn around(center: Point, rx: f64, ry: f64) -> Self {
        Self { min: center.offset(-rx.abs(), -ry.abs()), max: center.offset(rx.abs(), ry.abs()) }
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    #[must_use]
    pub fn inflate(self, by: f64) -> Self {
        Self { min: self.min.offset(-by, -by), max: self.max.offset(by, by) }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// The four corners, clockwise from top-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [self.min, Point::new(self.max.x, self.min.y), self.max, Point::new(self.min.x, self.max.y)]
    }
}

/// Bounding box of an element, including half its stroke width.
///
/// `None` for elements with no extent (empty point lists).
#[must_use]
pub fn bounds(el: &Element) -> Option<Bounds> {
    let pad = el.style.stroke.map_or(0.0, |_| el.style.stroke_width / 2.0);
    let raw = match &el.shape {
        Shape::Stroke { points, .. }
        | Shape::Rainbow { points, .. }
        | Shape::SimpleLine { points }
        | Shape::Heart { points } => {
            let (min, max) = geom::bounds_of(points)?;
            Bounds { min, max }
        }
        Shape::Spray { dots, dot_radius } => {
            let (min, max) = geom::bounds_of(dots)?;
            Bounds { min, max }.inflate(*dot_radius)
        }
        Shape::Arrow { from, to, head_width, .. } => {
            let (min, max) = geom::bounds_of(&[*from, *to])?;
            Bounds { min, max }.inflate(head_width / 2.0)
        }
        Shape::Rect { origin, width, height } | Shape::Image { origin, width, height, .. } => {
            Bounds::from_origin(*origin, *width, *height)
        }
        Shape::Ellipse { center, radius_x, radius_y } => Bounds::around(*center, *radius_x, *radius_y),
        Shape::Polygon { center, radius, .. } => Bounds::around(*center, *radius, *radius),
        Shape::Star { center, outer_radius, .. } => Bounds::around(*center, *outer_radius, *outer_radius),
        Shape::Text { origin, text, font_size } => {
            #[allow(clippy::cast_precision_loss)]
            let chars = text.chars().count() as f64;
            Bounds::from_origin(*origin, chars * font_size * TEXT_ADVANCE_RATIO, *font_size)
        }
        Shape::Pattern { center, size } => {
            let reach = size * (1.0 + crate::consts::PATTERN_PETAL_RATIO);
            Bounds::around(*center, reach, reach)
        }
        Shape::Fill { width, height } | Shape::Gradient { width, height } => {
            Bounds::from_origin(Point::default(), *width, *height)
        }
    };
    Some(raw.inflate(pad))
}

fn near_polyline(pt: Point, points: &[Point], reach: f64) -> bool {
    match points {
        [] => false,
        [only] => pt.distance(*only) <= reach,
        _ => points.windows(2).any(|w| geom::segment_distance(pt, w[0], w[1]) <= reach),
    }
}

/// Test a single element.
#[must_use]
pub fn hit_element(pt: Point, el: &Element) -> Option<HitPart> {
    if el.is_background() {
        return None;
    }
    let reach = el.style.stroke_width / 2.0 + HIT_TOLERANCE;
    match &el.shape {
        Shape::Stroke { points, .. } | Shape::Rainbow { points, .. } | Shape::SimpleLine { points } => {
            near_polyline(pt, points, reach).then_some(HitPart::Outline)
        }
        Shape::Arrow { from, to, .. } => near_polyline(pt, &[*from, *to], reach).then_some(HitPart::Outline),
        Shape::Spray { dots, dot_radius } => dots
            .iter()
            .any(|d| pt.distance(*d) <= dot_radius + HIT_TOLERANCE)
            .then_some(HitPart::Outline),
        _ => bounds(el).filter(|b| b.contains(pt)).map(|_| HitPart::Body),
    }
}

/// Topmost element under `pt`. Full-canvas fills never match.
#[must_use]
pub fn hit_test(pt: Point, elements: &[Element]) -> Option<Hit> {
    elements
        .iter()
        .rev()
        .find_map(|el| hit_element(pt, el).map(|part| Hit { element_id: el.id, part }))
}
