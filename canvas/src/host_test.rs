#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use base64::Engine as _;
use std::io::Cursor;

use crate::color::Color;
use crate::doc::Shape;
use crate::geom::CanvasSize;
use crate::input::Tool;
use crate::render::BackendKind;

// =============================================================
// Helpers
// =============================================================

fn spec() -> SurfaceSpec {
    SurfaceSpec::new(CanvasSize::new(600.0, 500.0))
}

fn pad(kind: BackendKind) -> Sketchpad {
    Sketchpad::with_engine(EngineCore::with_seed(CanvasSize::new(600.0, 500.0), 7), spec(), kind.create())
}

async fn started(kind: BackendKind) -> Sketchpad {
    let mut pad = pad(kind);
    assert_eq!(pad.start().await, BackendStatus::Ready);
    pad
}

fn tool(tool: Tool) -> ToolConfig {
    ToolConfig { tool, size: 10, color: Color::rgb(0xE0, 0x31, 0x31), ..ToolConfig::default() }
}

fn stroke(pad: &mut Sketchpad, y: f64) {
    pad.pointer_down(Point::new(50.0, y), &tool(Tool::Brush));
    pad.pointer_move(Point::new(150.0, y));
    pad.pointer_up();
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 128, 255, 255]));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png).unwrap();
    out
}

fn decode_data_url(url: &str) -> image::RgbaImage {
    let body = url.strip_prefix("data:image/png;base64,").unwrap();
    let bytes = general_purpose::STANDARD.decode(body).unwrap();
    image::load_from_memory(&bytes).unwrap().to_rgba8()
}

// =============================================================
// Export
// =============================================================

#[tokio::test]
async fn data_url_at_density_two_doubles_dimensions() {
    for kind in BackendKind::ALL {
        let mut pad = started(kind).await;
        stroke(&mut pad, 100.0);
        let url = pad.to_data_url(2.0).await.unwrap();
        assert_eq!(decode_data_url(&url).dimensions(), (1200, 1000), "{}", kind.name());
    }
}

#[tokio::test]
async fn export_includes_in_progress_gesture() {
    let mut pad = started(BackendKind::Raster).await;
    pad.pointer_down(Point::new(50.0, 100.0), &tool(Tool::Brush));
    pad.pointer_move(Point::new(150.0, 100.0));
    assert_eq!(pad.object_count(), 0);

    let img = decode_data_url(&pad.to_data_url(1.0).await.unwrap());
    assert_eq!(img.get_pixel(100, 100).0, [0xE0, 0x31, 0x31, 255]);
}

#[tokio::test]
async fn export_reflects_mutation_immediately() {
    let mut pad = started(BackendKind::Vector).await;
    pad.pointer_down(Point::new(10.0, 10.0), &tool(Tool::Fill));
    let img = decode_data_url(&pad.to_data_url(1.0).await.unwrap());
    assert_eq!(img.get_pixel(300, 250).0, [0xE0, 0x31, 0x31, 255]);

    pad.undo();
    let img = decode_data_url(&pad.to_data_url(1.0).await.unwrap());
    assert_eq!(img.get_pixel(300, 250).0, [255, 255, 255, 255]);
}

// =============================================================
// Lifecycle
// =============================================================

#[tokio::test]
async fn calls_before_start_mutate_scene_but_do_not_export() {
    let mut pad = pad(BackendKind::Vector);
    assert_eq!(pad.status(), BackendStatus::Uninitialized);
    stroke(&mut pad, 40.0);
    pad.add_template("house");
    assert_eq!(pad.object_count(), 4);
    assert!(pad.to_data_url(1.0).await.is_none());

    assert_eq!(pad.start().await, BackendStatus::Ready);
    assert!(pad.to_data_url(1.0).await.is_some());
}

#[tokio::test]
async fn failed_backend_is_terminal_and_harmless() {
    let mut pad = Sketchpad::new(SurfaceSpec::new(CanvasSize::new(0.0, 0.0)), BackendKind::Raster.create());
    assert_eq!(pad.start().await, BackendStatus::Error);
    stroke(&mut pad, 10.0);
    pad.undo();
    pad.redo();
    assert!(pad.to_data_url(1.0).await.is_none());
    assert_eq!(pad.start().await, BackendStatus::Error);
}

#[tokio::test]
async fn swapping_backends_keeps_the_scene() {
    let mut pad = started(BackendKind::Raster).await;
    pad.pointer_down(Point::new(10.0, 10.0), &tool(Tool::Fill));
    stroke(&mut pad, 200.0);
    let before = decode_data_url(&pad.to_data_url(1.0).await.unwrap());

    assert_eq!(pad.swap_backend(BackendKind::Vector.create()).await, BackendStatus::Ready);
    assert_eq!(pad.backend_name(), "vector");
    assert_eq!(pad.object_count(), 2);
    let after = decode_data_url(&pad.to_data_url(1.0).await.unwrap());
    assert_eq!(before.get_pixel(300, 400), after.get_pixel(300, 400));
    assert_eq!(before.get_pixel(100, 200), after.get_pixel(100, 200));
}

// =============================================================
// Facade commands
// =============================================================

#[tokio::test]
async fn undo_redo_clear() {
    let mut pad = started(BackendKind::Raster).await;
    for y in [10.0, 20.0, 30.0] {
        stroke(&mut pad, y);
    }
    pad.undo();
    pad.undo();
    pad.redo();
    assert_eq!(pad.object_count(), 2);
    assert!(pad.can_redo());

    pad.clear();
    assert_eq!(pad.object_count(), 0);
    assert!(!pad.can_redo());
    pad.undo();
    assert_eq!(pad.object_count(), 0);
}

#[tokio::test]
async fn templates_by_name() {
    let mut pad = started(BackendKind::Raster).await;
    pad.add_template("flower");
    assert_eq!(pad.object_count(), 7);
    pad.add_template("bird");
    pad.add_template("");
    assert_eq!(pad.object_count(), 7);
}

#[tokio::test]
async fn imported_image_is_placed_after_settling() {
    let mut pad = started(BackendKind::Raster).await;
    let url = format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png(800, 20)));
    pad.import_image(&url);
    assert_eq!(pad.settle_imports().await, 1);
    assert_eq!(pad.pending_imports(), 0);
    assert_eq!(pad.object_count(), 1);

    let el = &pad.engine().scene.elements()[0];
    assert!(el.draggable);
    match &el.shape {
        Shape::Image { origin, width, height, image } => {
            assert_eq!(*origin, Point::new(50.0, 50.0));
            assert_eq!((*width, *height), (500.0, 20.0));
            assert_eq!((image.width(), image.height()), (800, 20));
        }
        other => panic!("expected image, got {other:?}"),
    }

    let img = decode_data_url(&pad.to_data_url(1.0).await.unwrap());
    assert_eq!(img.get_pixel(60, 60).0, [0, 128, 255, 255]);
}

#[tokio::test]
async fn invalid_import_adds_nothing() {
    let mut pad = started(BackendKind::Raster).await;
    stroke(&mut pad, 10.0);
    pad.import_image("data:image/png;base64,!!!!");
    pad.import_image_bytes(b"GIF89a nope".to_vec());
    assert_eq!(pad.settle_imports().await, 0);
    assert_eq!(pad.object_count(), 1);
}

#[tokio::test]
async fn raw_bytes_import_is_committed_on_next_call() {
    let mut pad = started(BackendKind::Vector).await;
    pad.import_image_bytes(png(4, 4));
    pad.settle_imports().await;
    stroke(&mut pad, 300.0);
    assert_eq!(pad.object_count(), 2);
    assert!(matches!(pad.engine().scene.elements()[0].shape, Shape::Image { .. }));
}

#[tokio::test]
async fn text_entry_round_trip() {
    let mut pad = started(BackendKind::Raster).await;
    let text = tool(Tool::Text);
    pad.pointer_down(Point::new(30.0, 30.0), &text);
    assert!(pad.engine().text_entry().is_some());
    pad.submit_text("hi", &text);
    assert_eq!(pad.object_count(), 1);

    pad.pointer_down(Point::new(60.0, 60.0), &text);
    pad.cancel_text();
    assert_eq!(pad.object_count(), 1);
}
