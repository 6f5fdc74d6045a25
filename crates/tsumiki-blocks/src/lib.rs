//! Block and model data, shape registry, and builtin mesh templates.
#![forbid(unsafe_code)]

pub mod chips;
pub mod config;
pub mod registry;
pub mod templates;
pub mod types;

pub use chips::{ChipAtlas, ChipRect};
pub use registry::{BlockShape, ModelShape, ShapeRegistry};
pub use templates::{ShapeMesh, TemplateKind};
pub use types::{
    Block, CHIP_SLOTS, Connection, Direction, Model, ModelShapeId, OBJECT_SLOT, ShapeId, Wall,
};
