#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::ElementKind;

#[test]
fn names_round_trip() {
    for t in Template::ALL {
        assert_eq!(Template::from_name(t.name()), Some(t));
    }
    assert_eq!(Template::from_name("bird"), None);
}

#[test]
fn element_counts() {
    let c = Point::new(300.0, 250.0);
    let counts: Vec<usize> = Template::ALL.iter().map(|t| t.expand(c).len()).collect();
    assert_eq!(counts, vec![3, 2, 4, 2, 7]);
}

#[test]
fn house_is_anchored_on_center() {
    let els = Template::House.expand(Point::new(300.0, 250.0));
    assert_eq!(
        els[0].shape,
        Shape::Rect { origin: Point::new(240.0, 250.0), width: 120.0, height: 100.0 }
    );
    assert_eq!(els[1].kind(), ElementKind::SimpleLine);
}

#[test]
fn template_elements_are_gray_provisional_outlines() {
    for el in Template::Flower.expand(Point::new(0.0, 0.0)) {
        assert!(el.is_provisional());
        assert!(!el.draggable);
        assert_eq!(el.style.stroke, Some(TEMPLATE_STROKE));
        assert_eq!(el.style.stroke_width, 2.0);
        assert_eq!(el.style.fill, None);
    }
}

#[test]
fn fish_tail_is_rotated() {
    let els = Template::Fish.expand(Point::new(0.0, 0.0));
    assert_eq!(
        els[1].shape,
        Shape::Polygon { center: Point::new(80.0, 0.0), sides: 3, radius: 30.0, rotation: 90.0 }
    );
}
