//! Scene persistence: name-based TOML records for layers, blocks, models and routes.
#![forbid(unsafe_code)]

pub mod error;
pub mod records;
pub mod scene;

pub use error::SceneError;
pub use records::{BlockRecord, LayerRecord, ModelRecord, PathRecord, SCENE_VERSION, SceneFile, parse_tile};
pub use scene::{
    document_from_scene, from_toml_str, load_path, read_blocks, read_models, save_path,
    scene_from_document, to_toml_string, write_blocks, write_models,
};
