//! Face culling between adjacent blocks.

use tsumiki_blocks::{Block, BlockShape, Connection, Direction, ShapeRegistry};
use tsumiki_grid::SpatialIndex;

/// Whether the neighbor across `face` hides this block's face.
///
/// A neighbor declaring `Connection::None` on the touching face never hides anything.
/// A `Square` neighbor always does. Matching partial profiles hide each other only when
/// their connection directions agree in world space. The relation is not symmetric.
pub fn face_occluded(
    index: &SpatialIndex<Block>,
    registry: &ShapeRegistry,
    block: &Block,
    face: Direction,
) -> bool {
    let Some(neighbor) = index.get(block.position() + face.neighbor_offset()) else {
        return false;
    };
    match (registry.get(block.shape()), registry.get(neighbor.shape())) {
        (Some(shape), Some(nshape)) => connections_occlude(block, shape, neighbor, nshape, face),
        _ => false,
    }
}

pub fn connections_occlude(
    block: &Block,
    shape: &BlockShape,
    neighbor: &Block,
    nshape: &BlockShape,
    face: Direction,
) -> bool {
    let local = block.to_local(face);
    let nlocal = neighbor.to_local(face.opposite());
    let con1 = shape.connection[local];
    match nshape.connection[nlocal] {
        Connection::None => false,
        Connection::Square => true,
        con2 => {
            con1 == con2
                && block.to_world(shape.connection_dir[local])
                    == neighbor.to_world(nshape.connection_dir[nlocal])
        }
    }
}

/// Horizontal faces with a full square profile can be stacked into one double-height quad.
pub fn is_combinable(registry: &ShapeRegistry, block: &Block, face: Direction) -> bool {
    face.is_horizontal()
        && registry
            .get(block.shape())
            .is_some_and(|s| !s.auto_placement && s.connection[block.to_local(face)] == Connection::Square)
}
