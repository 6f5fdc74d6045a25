//! Shared constants for tsumiki-mesh-cpu. Centralizes the guide and route tables.

use tsumiki_geom::Vec3;

/// Corners of a one-block guide box (full width, half height).
pub const CUBE_VERTICES: [Vec3; 8] = [
    Vec3::new(-0.5, 0.25, 0.5),
    Vec3::new(0.5, 0.25, 0.5),
    Vec3::new(-0.5, 0.25, -0.5),
    Vec3::new(0.5, 0.25, -0.5),
    Vec3::new(-0.5, -0.25, 0.5),
    Vec3::new(0.5, -0.25, 0.5),
    Vec3::new(-0.5, -0.25, -0.5),
    Vec3::new(0.5, -0.25, -0.5),
];

/// Four corners per world face, in `Direction` order.
pub const CUBE_QUAD_INDICES: [u32; 24] = [
    0, 4, 5, 1, // Zplus
    3, 7, 6, 2, // Zminus
    1, 5, 7, 3, // Xplus
    2, 6, 4, 0, // Xminus
    2, 0, 1, 3, // Yplus
    4, 6, 7, 5, // Yminus
];

/// Corners of a walkable route panel, before the shape's height table applies.
pub const PANEL_VERTICES: [Vec3; 4] = [
    Vec3::new(-0.5, 0.0, 0.5),
    Vec3::new(0.5, 0.0, 0.5),
    Vec3::new(-0.5, 0.0, -0.5),
    Vec3::new(0.5, 0.0, -0.5),
];

/// Half-step cells that must be free above a block for it to be enterable.
pub const ENTERABLE_CLEARANCE: usize = 4;

/// Chip and face slot used for object meshes and auto-placement variants.
pub(crate) const OBJECT_FACE_SLOT: u8 = 6;
