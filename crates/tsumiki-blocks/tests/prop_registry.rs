use std::path::PathBuf;

use proptest::prelude::*;
use tsumiki_blocks::{Block, Connection, Direction, ShapeId, ShapeRegistry, Wall};
use tsumiki_geom::Vec3;

fn fixture() -> ShapeRegistry {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/tsumiki/shapes.toml");
    ShapeRegistry::load_from_path(path).expect("load shapes.toml")
}

#[test]
fn fixture_loads_every_shape() {
    let reg = fixture();
    for name in ["cube", "slope", "water", "fence", "floor", "empty"] {
        assert!(reg.find(name).is_some(), "missing {name}");
    }
    assert_eq!(reg.atlas().chip_count(), 64);
    let fence = reg.get(reg.find("fence").unwrap()).unwrap();
    assert_eq!(fence.wall, Wall::Sides);
    assert_eq!(fence.connection[Direction::Yplus.index()], Connection::Square);
    let lamp = reg.model(reg.find_model("lamp").unwrap()).unwrap();
    assert!(lamp.enterable);
    assert_eq!(lamp.scale, 0.5);
    assert_eq!(lamp.offset, Vec3::ZERO);
}

#[test]
fn shape_ids_index_the_arena() {
    let reg = fixture();
    for (i, shape) in reg.shapes.iter().enumerate() {
        assert_eq!(shape.id, ShapeId(i as u16));
        assert_eq!(reg.find(&shape.name), Some(shape.id));
    }
}

#[test]
fn unknown_names_fall_back_to_cube() {
    let reg = fixture();
    let id = reg.find_or_default("castle_gate");
    assert_eq!(reg.get(id).unwrap().name, "cube");
    assert!(reg.find_model("castle_gate").is_none());
}

fn horizontal() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::HORIZONTAL.to_vec())
}

fn any_direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

proptest! {
    // Painting a world face and reading it back through the block's own frame agree.
    #[test]
    fn paint_then_read_through_local_frame(dir in horizontal(), face in any_direction(), chip in 0i32..64) {
        let mut block = Block::new(Vec3::ZERO, dir, ShapeId(0));
        block.set_texture_chip(face, chip);
        prop_assert_eq!(block.texture_chip(block.to_local(face)), chip);
        let local = Direction::ALL[block.to_local(face)];
        prop_assert_eq!(block.to_world(local), face);
    }

    // Opposite world faces stay opposite after remapping into any block frame.
    #[test]
    fn remap_preserves_opposites(dir in horizontal(), face in any_direction()) {
        let local = dir.to_local_slot(face.index());
        let local_opp = dir.to_local_slot(face.opposite().index());
        prop_assert_eq!(local ^ 1, local_opp);
    }
}
