#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::catalog;
use crate::doc::{ElementKind, PROVISIONAL_ID, RasterImage};
use crate::geom::Symmetry;

// =============================================================
// Helpers
// =============================================================

fn engine() -> EngineCore {
    EngineCore::with_seed(CanvasSize::new(600.0, 500.0), 42)
}

fn cfg(tool: Tool) -> ToolConfig {
    ToolConfig { tool, size: 10, color: Color::rgb(0x4D, 0xAB, 0xF7), ..ToolConfig::default() }
}

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn drag(core: &mut EngineCore, c: &ToolConfig, points: &[Point]) {
    let (first, rest) = points.split_first().unwrap();
    core.on_pointer_down(*first, c);
    for pt in rest {
        core.on_pointer_move(*pt);
    }
    core.on_pointer_up();
}

fn stroke_points(el: &Element) -> &[Point] {
    match &el.shape {
        Shape::Stroke { points, .. } | Shape::Rainbow { points, .. } => points,
        other => panic!("not a stroke: {other:?}"),
    }
}

fn created(actions: &[Action]) -> usize {
    actions.iter().filter(|a| matches!(a, Action::ElementCreated(_))).count()
}

// =============================================================
// Undo / redo through the engine
// =============================================================

#[test]
fn three_strokes_two_undos_one_redo() {
    let mut core = engine();
    let brush = cfg(Tool::Brush);
    for y in [10.0, 20.0, 30.0] {
        drag(&mut core, &brush, &[p(10.0, y), p(50.0, y)]);
    }
    core.undo();
    core.undo();
    core.redo();
    assert_eq!(core.object_count(), 2);
    assert!(core.can_redo());
}

#[test]
fn new_gesture_after_undo_clears_redo() {
    let mut core = engine();
    drag(&mut core, &cfg(Tool::Brush), &[p(0.0, 0.0), p(5.0, 5.0)]);
    core.undo();
    assert!(core.can_redo());
    core.on_pointer_down(p(1.0, 1.0), &cfg(Tool::Rect));
    assert!(!core.can_redo());
}

#[test]
fn undo_on_empty_scene_emits_nothing() {
    let mut core = engine();
    assert!(core.undo().is_empty());
    assert!(core.redo().is_empty());
    assert_eq!(core.object_count(), 0);
}

#[test]
fn clear_resets_count_redo_and_selection() {
    let mut core = engine();
    drag(&mut core, &cfg(Tool::Brush), &[p(0.0, 0.0), p(5.0, 5.0)]);
    drag(&mut core, &cfg(Tool::Brush), &[p(0.0, 9.0), p(5.0, 9.0)]);
    core.undo();
    core.clear();
    assert_eq!(core.object_count(), 0);
    assert!(!core.can_redo());
    assert_eq!(core.selection(), None);
    assert!(!core.is_drawing());
}

// =============================================================
// Freehand and symmetry
// =============================================================

#[test]
fn horizontal_symmetry_mirrors_strokes() {
    let mut core = engine();
    let c = ToolConfig { symmetry: Symmetry::Horizontal, ..cfg(Tool::Brush) };
    drag(&mut core, &c, &[p(100.0, 100.0), p(120.0, 110.0), p(140.0, 130.0)]);

    let els = core.scene.elements();
    assert_eq!(els.len(), 2);
    let a = stroke_points(&els[0]);
    let b = stroke_points(&els[1]);
    assert_eq!(a.len(), 3);
    assert_eq!(b.len(), 3);
    for (pa, pb) in a.iter().zip(b) {
        assert_eq!(pb.x, 600.0 - pa.x);
        assert_eq!(pb.y, pa.y);
    }
    assert_ne!(els[0].id, els[1].id);
    assert_eq!(els[0].style.stroke, Some(Color::rgb(0x4D, 0xAB, 0xF7)));
    assert_eq!(els[0].style.stroke_width, 10.0);
}

#[test]
fn quadrant_symmetry_creates_four_independent_undo_steps() {
    let mut core = engine();
    let c = ToolConfig { symmetry: Symmetry::Quadrant, ..cfg(Tool::Brush) };
    drag(&mut core, &c, &[p(100.0, 100.0), p(110.0, 110.0)]);
    assert_eq!(core.object_count(), 4);
    core.undo();
    assert_eq!(core.object_count(), 3);
}

#[test]
fn strokes_stay_in_gesture_until_pointer_up() {
    let mut core = engine();
    core.on_pointer_down(p(10.0, 10.0), &cfg(Tool::Brush));
    core.on_pointer_move(p(20.0, 20.0));
    assert_eq!(core.object_count(), 0);
    let visible = core.visible_elements();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, PROVISIONAL_ID);
    drop(visible);

    let actions = core.on_pointer_up();
    assert_eq!(created(&actions), 1);
    assert_ne!(core.scene.elements()[0].id, PROVISIONAL_ID);
}

#[test]
fn eraser_and_highlighter_styles() {
    let mut core = engine();
    drag(&mut core, &cfg(Tool::Eraser), &[p(0.0, 0.0), p(1.0, 1.0)]);
    drag(&mut core, &cfg(Tool::Highlighter), &[p(0.0, 0.0), p(1.0, 1.0)]);
    let els = core.scene.elements();
    assert_eq!(els[0].style.stroke, Some(Color::WHITE));
    assert_eq!(els[0].style.stroke_width, 20.0);
    assert!(matches!(els[0].shape, Shape::Stroke { brush: BrushKind::Eraser, .. }));
    assert_eq!(els[1].style.opacity, 0.4);
}

#[test]
fn move_while_idle_is_ignored() {
    let mut core = engine();
    assert!(core.on_pointer_move(p(5.0, 5.0)).is_empty());
    assert!(core.on_pointer_up().is_empty());
}

#[test]
fn pointer_down_commits_previous_gesture() {
    let mut core = engine();
    core.on_pointer_down(p(0.0, 0.0), &cfg(Tool::Brush));
    core.on_pointer_move(p(5.0, 5.0));
    let actions = core.on_pointer_down(p(50.0, 50.0), &cfg(Tool::Brush));
    assert_eq!(created(&actions), 1);
    assert_eq!(core.object_count(), 1);
    assert!(core.is_drawing());
}

// =============================================================
// Rainbow
// =============================================================

#[test]
fn rainbow_advances_one_color_per_move() {
    let mut core = engine();
    drag(&mut core, &cfg(Tool::Rainbow), &[p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)]);
    match &core.scene.elements()[0].shape {
        Shape::Rainbow { points, colors } => {
            assert_eq!(points.len(), 4);
            assert_eq!(colors.as_slice(), &RAINBOW[..4]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn rainbow_cursor_persists_across_gestures() {
    let mut core = engine();
    drag(&mut core, &cfg(Tool::Rainbow), &[p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)]);
    drag(&mut core, &cfg(Tool::Rainbow), &[p(0.0, 9.0), p(1.0, 9.0)]);
    match &core.scene.elements()[1].shape {
        Shape::Rainbow { colors, .. } => assert_eq!(colors.as_slice(), &[RAINBOW[2], RAINBOW[3]]),
        other => panic!("unexpected {other:?}"),
    }
}

// =============================================================
// Spray and pattern
// =============================================================

#[test]
fn spray_samples_twenty_then_ten_per_move() {
    let mut core = engine();
    core.on_pointer_down(p(100.0, 100.0), &cfg(Tool::Spray));
    core.on_pointer_move(p(110.0, 100.0));
    core.on_pointer_move(p(120.0, 100.0));
    core.on_pointer_up();
    match &core.scene.elements()[0].shape {
        Shape::Spray { dots, dot_radius } => {
            assert_eq!(dots.len(), 40);
            assert_eq!(*dot_radius, 2.0);
            assert!(dots[..20].iter().all(|d| d.distance(p(100.0, 100.0)) <= 20.0 + 1e-9));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn spray_dots_are_mirrored_per_arm() {
    let mut core = engine();
    let c = ToolConfig { symmetry: Symmetry::Vertical, ..cfg(Tool::Spray) };
    drag(&mut core, &c, &[p(100.0, 100.0)]);
    let els = core.scene.elements();
    assert_eq!(els.len(), 2);
    let (Shape::Spray { dots: a, .. }, Shape::Spray { dots: b, .. }) = (&els[0].shape, &els[1].shape) else {
        panic!("expected spray clouds");
    };
    assert_eq!(a.len(), 20);
    for (da, db) in a.iter().zip(b) {
        assert_eq!(db.x, da.x);
        assert!((db.y - (500.0 - da.y)).abs() < 1e-9);
    }
}

#[test]
fn pattern_stamps_only_past_spacing_threshold() {
    let mut core = engine();
    let c = cfg(Tool::Pattern);
    let actions = core.on_pointer_down(p(0.0, 0.0), &c);
    assert_eq!(created(&actions), 0);
    // size 10: threshold is a distance greater than 30
    assert_eq!(created(&core.on_pointer_move(p(30.0, 0.0))), 0);
    assert_eq!(created(&core.on_pointer_move(p(31.0, 0.0))), 1);
    assert_eq!(created(&core.on_pointer_move(p(50.0, 0.0))), 0);
    assert_eq!(created(&core.on_pointer_move(p(62.0, 0.0))), 1);
    core.on_pointer_up();
    assert_eq!(core.object_count(), 2);
    assert_eq!(core.scene.elements()[0].kind(), ElementKind::Pattern);
}

#[test]
fn pattern_respects_symmetry() {
    let mut core = engine();
    let c = ToolConfig { symmetry: Symmetry::Horizontal, ..cfg(Tool::Pattern) };
    drag(&mut core, &c, &[p(100.0, 100.0), p(200.0, 100.0)]);
    assert_eq!(core.object_count(), 2);
    assert_eq!(core.scene.elements()[1].shape, Shape::Pattern { center: p(400.0, 100.0), size: 10.0 });
}

// =============================================================
// Shapes
// =============================================================

#[test]
fn shape_without_move_creates_nothing() {
    let mut core = engine();
    drag(&mut core, &cfg(Tool::Rect), &[p(10.0, 10.0)]);
    assert_eq!(core.object_count(), 0);
}

#[test]
fn shape_preview_is_replaced_not_accumulated() {
    let mut core = engine();
    core.on_pointer_down(p(100.0, 100.0), &cfg(Tool::Rect));
    core.on_pointer_move(p(150.0, 150.0));
    core.on_pointer_move(p(60.0, 80.0));
    let visible = core.visible_elements();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].shape, Shape::Rect { origin: p(60.0, 80.0), width: 40.0, height: 20.0 });
    assert!(visible[0].is_provisional());
    drop(visible);
    core.on_pointer_up();
    assert_eq!(core.object_count(), 1);
    assert!(!core.scene.elements()[0].is_provisional());
}

#[test]
fn circle_triangle_star_heart_geometry() {
    let mut core = engine();
    drag(&mut core, &cfg(Tool::Circle), &[p(0.0, 0.0), p(60.0, -80.0)]);
    drag(&mut core, &cfg(Tool::Triangle), &[p(0.0, 0.0), p(60.0, 80.0)]);
    drag(&mut core, &cfg(Tool::Star), &[p(0.0, 0.0), p(60.0, 80.0)]);
    drag(&mut core, &cfg(Tool::Heart), &[p(0.0, 0.0), p(60.0, 80.0)]);
    let els = core.scene.elements();
    assert_eq!(els[0].shape, Shape::Ellipse { center: p(30.0, -40.0), radius_x: 30.0, radius_y: 40.0 });
    assert_eq!(els[1].shape, Shape::Polygon { center: p(30.0, 40.0), sides: 3, radius: 50.0, rotation: 0.0 });
    assert_eq!(
        els[2].shape,
        Shape::Star { center: p(30.0, 40.0), points: 5, inner_radius: 20.0, outer_radius: 50.0 }
    );
    assert_eq!(els[3].shape, Shape::Heart { points: geom::heart_points(p(30.0, 40.0), 25.0) });
    assert!(els.iter().all(|el| !el.draggable));
}

#[test]
fn arrow_head_scales_with_brush() {
    let mut core = engine();
    drag(&mut core, &cfg(Tool::Arrow), &[p(0.0, 0.0), p(100.0, 0.0)]);
    assert_eq!(
        core.scene.elements()[0].shape,
        Shape::Arrow { from: p(0.0, 0.0), to: p(100.0, 0.0), head_length: 20.0, head_width: 20.0 }
    );
}

#[test]
fn shapes_are_not_mirrored() {
    let mut core = engine();
    let c = ToolConfig { symmetry: Symmetry::Quadrant, ..cfg(Tool::Line) };
    drag(&mut core, &c, &[p(0.0, 0.0), p(10.0, 10.0)]);
    assert_eq!(core.object_count(), 1);
}

// =============================================================
// Stamping tools
// =============================================================

#[test]
fn sticker_without_selection_is_noop() {
    let mut core = engine();
    let actions = core.on_pointer_down(p(100.0, 100.0), &cfg(Tool::Sticker));
    assert_eq!(created(&actions), 0);
    assert_eq!(core.object_count(), 0);
    assert!(!core.is_drawing());
}

#[test]
fn sticker_places_offset_emoji() {
    let mut core = engine();
    let c = ToolConfig { sticker: catalog::sticker("rocket"), ..cfg(Tool::Sticker) };
    core.on_pointer_down(p(100.0, 100.0), &c);
    let el = &core.scene.elements()[0];
    assert!(el.draggable);
    assert_eq!(
        el.shape,
        Shape::Text { origin: p(80.0, 80.0), text: "\u{1F680}".into(), font_size: 40.0 }
    );
}

#[test]
fn stamps_use_brush_color_for_fill_and_stroke() {
    let mut core = engine();
    let c = ToolConfig { stamp: Some(Stamp::Circle), ..cfg(Tool::Stamp) };
    core.on_pointer_down(p(50.0, 50.0), &c);
    let el = &core.scene.elements()[0];
    assert_eq!(el.shape, Shape::Ellipse { center: p(50.0, 50.0), radius_x: 20.0, radius_y: 20.0 });
    assert_eq!(el.style.fill, Some(c.color));
    assert_eq!(el.style.stroke, Some(c.color));
    assert_eq!(el.style.stroke_width, 2.0);

    let hex = ToolConfig { stamp: Some(Stamp::Hexagon), ..cfg(Tool::Stamp) };
    core.on_pointer_down(p(50.0, 50.0), &hex);
    assert_eq!(
        core.scene.elements()[1].shape,
        Shape::Polygon { center: p(50.0, 50.0), sides: 6, radius: 20.0, rotation: 0.0 }
    );

    let star = ToolConfig { stamp: Some(Stamp::Star6), ..cfg(Tool::Stamp) };
    core.on_pointer_down(p(50.0, 50.0), &star);
    assert_eq!(
        core.scene.elements()[2].shape,
        Shape::Star { center: p(50.0, 50.0), points: 6, inner_radius: 10.0, outer_radius: 20.0 }
    );
}

#[test]
fn fill_and_gradient_cover_canvas() {
    let mut core = engine();
    core.on_pointer_down(p(1.0, 1.0), &cfg(Tool::Fill));
    core.on_pointer_down(p(1.0, 1.0), &cfg(Tool::Gradient));
    let els = core.scene.elements();
    assert_eq!(els[0].shape, Shape::Fill { width: 600.0, height: 500.0 });
    assert_eq!(els[0].style.fill, Some(Color::rgb(0x4D, 0xAB, 0xF7)));
    assert_eq!(els[1].kind(), ElementKind::Gradient);
}

// =============================================================
// Text entry
// =============================================================

#[test]
fn text_is_two_phase() {
    let mut core = engine();
    let c = cfg(Tool::Text);
    let actions = core.on_pointer_down(p(40.0, 60.0), &c);
    assert_eq!(actions, vec![Action::EditTextRequested { at: p(40.0, 60.0) }]);
    assert_eq!(core.object_count(), 0);

    let actions = core.submit_text("hello", &c);
    assert_eq!(created(&actions), 1);
    let el = &core.scene.elements()[0];
    assert_eq!(el.shape, Shape::Text { origin: p(40.0, 60.0), text: "hello".into(), font_size: 20.0 });
    assert_eq!(el.style.fill, Some(c.color));
    assert!(el.draggable);
    assert_eq!(core.text_entry(), None);
}

#[test]
fn blank_text_is_discarded() {
    let mut core = engine();
    let c = cfg(Tool::Text);
    core.on_pointer_down(p(40.0, 60.0), &c);
    core.submit_text("   ", &c);
    assert_eq!(core.object_count(), 0);
    assert!(core.submit_text("late", &c).is_empty());
}

#[test]
fn pointer_down_closes_open_entry() {
    let mut core = engine();
    core.on_pointer_down(p(40.0, 60.0), &cfg(Tool::Text));
    core.on_pointer_down(p(0.0, 0.0), &cfg(Tool::Brush));
    assert_eq!(core.text_entry(), None);
    assert!(core.cancel_text().is_empty());
}

// =============================================================
// Select and drag
// =============================================================

#[test]
fn select_drags_draggable_elements() {
    let mut core = engine();
    let c = ToolConfig { stamp: Some(Stamp::Square), ..cfg(Tool::Stamp) };
    core.on_pointer_down(p(100.0, 100.0), &c);
    let id = core.scene.elements()[0].id;

    let select = cfg(Tool::Select);
    let actions = core.on_pointer_down(p(100.0, 100.0), &select);
    assert!(actions.contains(&Action::SelectionChanged(Some(id))));
    core.on_pointer_move(p(130.0, 90.0));
    assert_eq!(core.visible_elements()[0].shape, Shape::Polygon {
        center: p(130.0, 90.0),
        sides: 4,
        radius: 20.0,
        rotation: 0.0
    });
    assert_eq!(core.scene.elements()[0].shape, Shape::Polygon {
        center: p(100.0, 100.0),
        sides: 4,
        radius: 20.0,
        rotation: 0.0
    });

    let actions = core.on_pointer_up();
    assert!(actions.contains(&Action::ElementUpdated(id)));
    assert_eq!(core.selection(), Some(id));
    assert!(matches!(core.scene.elements()[0].shape, Shape::Polygon { center, .. } if center == p(130.0, 90.0)));
}

#[test]
fn select_non_draggable_only_selects() {
    let mut core = engine();
    drag(&mut core, &cfg(Tool::Rect), &[p(0.0, 0.0), p(100.0, 100.0)]);
    let id = core.scene.elements()[0].id;
    core.on_pointer_down(p(50.0, 50.0), &cfg(Tool::Select));
    assert_eq!(core.selection(), Some(id));
    assert!(!core.is_drawing());
}

#[test]
fn select_on_empty_clears_selection() {
    let mut core = engine();
    drag(&mut core, &cfg(Tool::Rect), &[p(0.0, 0.0), p(100.0, 100.0)]);
    core.on_pointer_down(p(50.0, 50.0), &cfg(Tool::Select));
    let actions = core.on_pointer_down(p(400.0, 400.0), &cfg(Tool::Select));
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert_eq!(core.selection(), None);
}

#[test]
fn undo_of_selected_element_drops_selection() {
    let mut core = engine();
    drag(&mut core, &cfg(Tool::Rect), &[p(0.0, 0.0), p(100.0, 100.0)]);
    core.on_pointer_down(p(50.0, 50.0), &cfg(Tool::Select));
    let actions = core.undo();
    assert!(actions.contains(&Action::SelectionChanged(None)));
}

// =============================================================
// Host commands
// =============================================================

#[test]
fn templates_expand_around_center() {
    let mut core = engine();
    let actions = core.add_template(Template::Car);
    assert_eq!(created(&actions), 4);
    assert_eq!(
        core.scene.elements()[0].shape,
        Shape::Rect { origin: p(220.0, 230.0), width: 160.0, height: 50.0 }
    );
}

#[test]
fn placed_images_are_capped_and_draggable() {
    let mut core = engine();
    let raster = RasterImage { width: 800, height: 100, rgba: vec![0; 800 * 100 * 4] };
    let id = core.place_image(ImageRef::new(raster));
    let el = core.scene.get(&id).unwrap();
    assert!(el.draggable);
    match &el.shape {
        Shape::Image { origin, width, height, .. } => {
            assert_eq!(*origin, p(50.0, 50.0));
            assert_eq!(*width, 500.0);
            assert_eq!(*height, 100.0);
        }
        other => panic!("unexpected {other:?}"),
    }
}
