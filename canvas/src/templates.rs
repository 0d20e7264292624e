//! Outline templates: named drawings expanded into primitive elements around
//! the canvas center.

#[cfg(test)]
#[path = "templates_test.rs"]
mod templates_test;

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::consts::{TEMPLATE_STROKE, TEMPLATE_STROKE_WIDTH};
use crate::doc::{Element, Shape, Style};
use crate::geom::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    House,
    Tree,
    Car,
    Fish,
    Flower,
}

impl Template {
    pub const ALL: [Template; 5] = [Self::House, Self::Tree, Self::Car, Self::Fish, Self::Flower];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Tree => "tree",
            Self::Car => "car",
            Self::Fish => "fish",
            Self::Flower => "flower",
        }
    }

    /// Expand into provisional, non-draggable outline elements centered on `c`.
    #[must_use]
    pub fn expand(self, c: Point) -> Vec<Element> {
        let shapes = match self {
            Self::House => vec![
                rect(c.x - 60.0, c.y, 120.0, 100.0),
                Shape::SimpleLine {
                    points: vec![c.offset(-80.0, 0.0), c.offset(0.0, -60.0), c.offset(80.0, 0.0)],
                },
                rect(c.x - 20.0, c.y + 40.0, 40.0, 60.0),
            ],
            Self::Tree => vec![
                rect(c.x - 15.0, c.y + 20.0, 30.0, 80.0),
                Shape::Polygon { center: c.offset(0.0, -40.0), sides: 3, radius: 80.0, rotation: 0.0 },
            ],
            Self::Car => vec![
                rect(c.x - 80.0, c.y - 20.0, 160.0, 50.0),
                rect(c.x - 50.0, c.y - 50.0, 80.0, 30.0),
                circle(c.offset(-50.0, 30.0), 20.0),
                circle(c.offset(50.0, 30.0), 20.0),
            ],
            Self::Fish => vec![
                Shape::Ellipse { center: c, radius_x: 60.0, radius_y: 40.0 },
                Shape::Polygon { center: c.offset(80.0, 0.0), sides: 3, radius: 30.0, rotation: 90.0 },
            ],
            Self::Flower => {
                let mut petals: Vec<Shape> = (0..6)
                    .map(|i| {
                        let a = TAU * f64::from(i) / 6.0;
                        circle(c.offset(a.cos() * 40.0, a.sin() * 40.0), 25.0)
                    })
                    .collect();
                petals.push(circle(c, 20.0));
                petals
            }
        };
        let style = Style::outline(TEMPLATE_STROKE, TEMPLATE_STROKE_WIDTH);
        shapes.into_iter().map(|shape| Element::new(style, shape)).collect()
    }
}

fn rect(x: f64, y: f64, width: f64, height: f64) -> Shape {
    Shape::Rect { origin: Point::new(x, y), width, height }
}

fn circle(center: Point, r: f64) -> Shape {
    Shape::Ellipse { center, radius_x: r, radius_y: r }
}
