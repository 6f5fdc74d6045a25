use std::sync::Arc;

use tsumiki_blocks::{Block, ShapeRegistry};
use tsumiki_geom::Vec3;
use tsumiki_grid::SpatialIndex;

use crate::emit::{EmitContext, emit_guide, emit_route, emit_surface};
use crate::mesh_build::MeshMergeBuffer;

/// A set of blocks with lazily rebuilt surface, guide and route meshes.
///
/// Any structural change marks the group dirty; the next mesh query rebuilds
/// all three buffers in one pass.
#[derive(Clone, Debug)]
pub struct BlockGroup {
    registry: Arc<ShapeRegistry>,
    blocks: SpatialIndex<Block>,
    surface: MeshMergeBuffer,
    guide: MeshMergeBuffer,
    route: MeshMergeBuffer,
    dirty: bool,
}

impl BlockGroup {
    pub fn new(registry: Arc<ShapeRegistry>) -> Self {
        Self::with_bucket_size(registry, None)
    }

    /// Surface geometry is also split into render cells of `cell_size`.
    pub fn with_bucket_size(registry: Arc<ShapeRegistry>, cell_size: Option<f32>) -> Self {
        BlockGroup {
            registry,
            blocks: SpatialIndex::new(),
            surface: MeshMergeBuffer::with_bucket_size(cell_size),
            guide: MeshMergeBuffer::new(),
            route: MeshMergeBuffer::new(),
            dirty: false,
        }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ShapeRegistry> {
        &self.registry
    }

    /// Returns false and leaves the group untouched when the cell is taken.
    pub fn add_block(&mut self, block: Block) -> bool {
        let added = self.blocks.add(block);
        self.dirty |= added;
        added
    }

    pub fn remove_block(&mut self, position: Vec3) -> Option<Block> {
        let removed = self.blocks.remove(position);
        self.dirty |= removed.is_some();
        removed
    }

    #[inline]
    pub fn block(&self, position: Vec3) -> Option<&Block> {
        self.blocks.get(position)
    }

    /// Mutable access marks the group dirty, whether or not the caller writes.
    pub fn block_mut(&mut self, position: Vec3) -> Option<&mut Block> {
        let block = self.blocks.get_mut(position);
        self.dirty |= block.is_some();
        block
    }

    #[inline]
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn all_blocks(&self) -> Vec<Block> {
        self.blocks.snapshot()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn contains(&self, position: Vec3) -> bool {
        self.blocks.contains(position)
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn context(&self) -> EmitContext<'_> {
        EmitContext {
            index: &self.blocks,
            registry: &self.registry,
        }
    }

    pub fn is_enterable(&self, position: Vec3) -> bool {
        self.blocks
            .get(position)
            .is_some_and(|b| self.context().is_enterable(b))
    }

    pub fn enterable_blocks(&self) -> Vec<Block> {
        let ctx = self.context();
        self.blocks
            .iter()
            .filter(|b| ctx.is_enterable(b))
            .cloned()
            .collect()
    }

    /// Rebuilds every buffer from scratch and clears the dirty flag.
    pub fn update_mesh(&mut self) {
        self.surface.clear();
        self.guide.clear();
        self.route.clear();
        let ctx = EmitContext {
            index: &self.blocks,
            registry: &self.registry,
        };
        let mut missing = 0usize;
        for block in self.blocks.iter() {
            let Some(shape) = self.registry.get(block.shape()) else {
                missing += 1;
                continue;
            };
            emit_surface(&ctx, block, shape, &mut self.surface);
            emit_guide(&ctx, block, shape, &mut self.guide);
            emit_route(&ctx, block, shape, &mut self.route);
        }
        if missing > 0 {
            log::warn!(target: "mesh", "{} blocks reference unknown shapes", missing);
        }
        log::debug!(
            target: "mesh",
            "rebuilt {} blocks: surface {}v/{}i ({} cells), guide {}i, route {}i",
            self.blocks.len(),
            self.surface.vertex_count(),
            self.surface.index_count(),
            self.surface.bucket_count(),
            self.guide.index_count(),
            self.route.index_count()
        );
        self.dirty = false;
    }

    fn refresh(&mut self) {
        if self.dirty {
            self.update_mesh();
        }
    }

    pub fn surface_mesh(&mut self) -> &MeshMergeBuffer {
        self.refresh();
        &self.surface
    }

    pub fn guide_mesh(&mut self) -> &MeshMergeBuffer {
        self.refresh();
        &self.guide
    }

    pub fn route_mesh(&mut self) -> &MeshMergeBuffer {
        self.refresh();
        &self.route
    }

    /// Outline of the surface triangles as a line list, indexing the surface vertices.
    pub fn wire_indices(&mut self) -> Vec<u32> {
        self.surface_mesh().wire_indices()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsumiki_blocks::Direction;

    fn group() -> BlockGroup {
        BlockGroup::new(Arc::new(ShapeRegistry::builtin().unwrap()))
    }

    fn cube(g: &BlockGroup, p: Vec3) -> Block {
        Block::new(p, Direction::Zplus, g.registry().find("cube").unwrap())
    }

    #[test]
    fn changes_mark_dirty_and_queries_rebuild() {
        let mut g = group();
        assert!(!g.is_dirty());
        let b = cube(&g, Vec3::ZERO);
        assert!(g.add_block(b.clone()));
        assert!(g.is_dirty());
        assert_eq!(g.surface_mesh().index_count(), 36);
        assert!(!g.is_dirty());
        assert!(!g.add_block(b));
        assert!(!g.is_dirty());
    }

    #[test]
    fn block_mut_marks_dirty() {
        let mut g = group();
        g.add_block(cube(&g, Vec3::ZERO));
        g.update_mesh();
        g.block_mut(Vec3::ZERO).unwrap().set_object_chip(3);
        assert!(g.is_dirty());
        assert!(g.block_mut(Vec3::ONE).is_none());
    }

    #[test]
    fn stacked_block_is_not_enterable() {
        let mut g = group();
        g.add_block(cube(&g, Vec3::ZERO));
        g.add_block(cube(&g, Vec3::new(0.0, 2.0, 0.0)));
        assert!(g.is_enterable(Vec3::new(0.0, 2.0, 0.0)));
        assert!(!g.is_enterable(Vec3::ZERO));
        g.remove_block(Vec3::new(0.0, 2.0, 0.0));
        g.add_block(cube(&g, Vec3::new(0.0, 2.5, 0.0)));
        assert!(g.is_enterable(Vec3::ZERO));
        assert_eq!(g.enterable_blocks().len(), 2);
    }
}
