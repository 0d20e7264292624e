//! Drawing core for a children's sketchpad.
//!
//! Pointer input goes in and PNG snapshots come out. The crate owns the tool
//! engine that turns pointer events into scene elements, the ordered scene with
//! its undo history, and two interchangeable render backends. Outside code
//! talks only to the [`host::Sketchpad`] facade.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`host`] | Host API facade: export, clear, undo, redo, import, templates |
//! | [`engine`] | Tool engine, [`engine::EngineCore`] |
//! | [`doc`] | Element model and the scene store with undo/redo |
//! | [`input`] | Tool enum, tool configuration and gesture state |
//! | [`geom`] | Geometry generators: symmetry, curves, polygons, spray |
//! | [`hit`] | Bounding boxes and hit-testing for the select tool |
//! | [`render`] | Backend contract plus the raster and vector backends |
//! | [`import`] | Asynchronous image decode queue |
//! | [`catalog`] | Sticker and stamp catalogs |
//! | [`templates`] | Outline templates |
//! | [`color`] | Hex color parsing |
//! | [`consts`] | Shared numeric constants and palettes |

pub mod catalog;
pub mod color;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geom;
pub mod hit;
pub mod host;
pub mod import;
pub mod input;
pub mod render;
pub mod templates;
