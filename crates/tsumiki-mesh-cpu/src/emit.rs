use tsumiki_blocks::{Block, BlockShape, Direction, OBJECT_SLOT, ShapeRegistry};
use tsumiki_geom::Vec3;
use tsumiki_grid::SpatialIndex;

use crate::auto_place::{neighbor_pattern, quadrant_variants};
use crate::constants::{CUBE_VERTICES, ENTERABLE_CLEARANCE, OBJECT_FACE_SLOT, PANEL_VERTICES};
use crate::face::{cube_face_triangles, reverse_panel_vertex_index, route_panel_indices};
use crate::mesh_build::{MergeParams, MeshMergeBuffer};
use crate::occlusion::{face_occluded, is_combinable};

/// Read-only view of a block group used while emitting geometry.
#[derive(Copy, Clone)]
pub struct EmitContext<'a> {
    pub index: &'a SpatialIndex<Block>,
    pub registry: &'a ShapeRegistry,
}

impl<'a> EmitContext<'a> {
    #[inline]
    pub fn occluded(&self, block: &Block, face: Direction) -> bool {
        face_occluded(self.index, self.registry, block, face)
    }

    /// True when nothing occupies the four half-steps above `block`.
    pub fn is_enterable(&self, block: &Block) -> bool {
        (1..=ENTERABLE_CLEARANCE)
            .all(|k| !self.index.contains(block.position() + Vec3::UP * (0.5 * k as f32)))
    }

    /// Whether `lower` and the block above it share one double-height quad on `face`.
    pub fn combines_vertically(&self, lower: &Block, face: Direction) -> bool {
        if !face.is_horizontal() || is_upper_half(lower.position()) {
            return false;
        }
        let Some(upper) = self.index.get(lower.position() + Direction::Yplus.neighbor_offset())
        else {
            return false;
        };
        is_combinable(self.registry, lower, face)
            && is_combinable(self.registry, upper, face)
            && lower.texture_chip(lower.to_local(face)) == upper.texture_chip(upper.to_local(face))
            && !self.occluded(lower, face)
            && !self.occluded(upper, face)
    }
}

#[inline]
fn is_upper_half(p: Vec3) -> bool {
    p.y.rem_euclid(1.0) >= 0.5
}

/// Visual geometry of one block: auto-placement variants or occlusion-filtered faces.
pub fn emit_surface(ctx: &EmitContext, block: &Block, shape: &BlockShape, out: &mut MeshMergeBuffer) {
    let atlas = ctx.registry.atlas();
    if shape.auto_placement {
        let pattern = neighbor_pattern(ctx.index, block.position());
        for variant in quadrant_variants(pattern).into_iter().flatten() {
            if let Some(mesh) = shape.variant(variant) {
                let params = MergeParams {
                    position: block.position(),
                    direction: block.direction(),
                    texture_chip: block.texture_chip(OBJECT_SLOT),
                    face_slot: OBJECT_FACE_SLOT,
                    ..MergeParams::default()
                };
                out.merge(mesh, atlas, &params);
            }
        }
        return;
    }

    for face in Direction::ALL {
        let local = block.to_local(face);
        let Some(mesh) = shape.face(local) else {
            continue;
        };
        if ctx.occluded(block, face) {
            continue;
        }
        let mut params = MergeParams {
            position: block.position(),
            direction: block.direction(),
            divide_vertically: face.is_horizontal(),
            texture_chip: block.texture_chip(local),
            face_slot: face.index() as u8,
            ..MergeParams::default()
        };
        if face.is_horizontal() {
            if is_upper_half(block.position()) {
                let below = ctx.index.get(block.position() + Direction::Yminus.neighbor_offset());
                if below.is_some_and(|lower| ctx.combines_vertically(lower, face)) {
                    continue;
                }
            } else if ctx.combines_vertically(block, face) {
                params.position += Vec3::new(0.0, 0.25, 0.0);
                params.scale = Vec3::new(1.0, 2.0, 1.0);
                params.divide_vertically = false;
            }
        }
        out.merge(mesh, atlas, &params);
    }

    for mesh in &shape.objects {
        let params = MergeParams {
            position: block.position(),
            direction: block.direction(),
            texture_chip: block.texture_chip(OBJECT_SLOT),
            face_slot: OBJECT_FACE_SLOT,
            ..MergeParams::default()
        };
        out.merge(mesh, atlas, &params);
    }
}

/// Guide box faces that are visible and allowed by the shape's wall tier.
/// The eight corners are written once, on the first face emitted.
pub fn emit_guide(ctx: &EmitContext, block: &Block, shape: &BlockShape, out: &mut MeshMergeBuffer) {
    let mut base: Option<u32> = None;
    for face in Direction::ALL {
        if !shape.wall.allows(face) || ctx.occluded(block, face) {
            continue;
        }
        let b = *base.get_or_insert_with(|| {
            let first = out.vertex_count() as u32;
            for v in CUBE_VERTICES {
                out.push_vertex(block.position() + v);
            }
            first
        });
        let t = cube_face_triangles(face);
        out.push_triangle(b + t[0], b + t[1], b + t[2]);
        out.push_triangle(b + t[3], b + t[4], b + t[5]);
    }
}

/// Walkable panel on top of an enterable block, shaped by the panel height table.
pub fn emit_route(ctx: &EmitContext, block: &Block, shape: &BlockShape, out: &mut MeshMergeBuffer) {
    if !ctx.is_enterable(block) {
        return;
    }
    let dir = block.direction();
    let base = out.vertex_count() as u32;
    for j in 0..PANEL_VERTICES.len() {
        let local = reverse_panel_vertex_index(j, dir);
        let mut v = dir.rotate_position(PANEL_VERTICES[local]);
        v.y = shape.panel_vertices[local] as f32 * 0.5 - 0.25;
        out.push_vertex(block.position() + v);
    }
    let idx = route_panel_indices(dir);
    out.push_triangle(base + idx[0], base + idx[1], base + idx[2]);
    out.push_triangle(base + idx[3], base + idx[4], base + idx[5]);
}
