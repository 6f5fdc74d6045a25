//! CPU meshing crate: block merge, face culling, auto-placement and guide/route meshes.
#![forbid(unsafe_code)]

pub mod auto_place;
pub mod constants;
pub mod emit;
pub mod face;
pub mod group;
pub mod mesh_build;
pub mod models;
pub mod occlusion;

pub use auto_place::{QuadrantSample, mesh_offset, neighbor_pattern, quadrant_variants};
pub use emit::EmitContext;
pub use group::BlockGroup;
pub use mesh_build::{BucketKey, MergeParams, MeshBuild, MeshMergeBuffer};
pub use models::{ModelGroup, guide_box};
pub use occlusion::{face_occluded, is_combinable};
