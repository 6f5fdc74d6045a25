use std::collections::HashSet;

use proptest::prelude::*;
use tsumiki_blocks::{Block, Direction, ShapeId};
use tsumiki_geom::Vec3;
use tsumiki_grid::SpatialIndex;

fn cell() -> impl Strategy<Value = (i32, i32, i32)> {
    (-32i32..32, -32i32..32, -32i32..32)
}

fn at((x, hy, z): (i32, i32, i32)) -> Vec3 {
    Vec3::new(x as f32, hy as f32 * 0.5, z as f32)
}

proptest! {
    // The index holds exactly one item per distinct supported cell.
    #[test]
    fn len_counts_distinct_cells(cells in prop::collection::vec(cell(), 0..64)) {
        let mut index = SpatialIndex::new();
        let mut distinct = HashSet::new();
        for c in &cells {
            let added = index.add(Block::new(at(*c), Direction::Zplus, ShapeId(0)));
            prop_assert_eq!(added, distinct.insert(*c));
        }
        prop_assert_eq!(index.len(), distinct.len());
        prop_assert_eq!(index.snapshot().len(), distinct.len());
        for c in &distinct {
            prop_assert_eq!(index.get(at(*c)).map(|b| b.position()), Some(at(*c)));
        }
    }

    // Removing everything that was added empties the index.
    #[test]
    fn remove_all_empties(cells in prop::collection::hash_set(cell(), 0..32)) {
        let mut index = SpatialIndex::new();
        for c in &cells {
            index.add(Block::new(at(*c), Direction::Xminus, ShapeId(1)));
        }
        for c in &cells {
            prop_assert!(index.remove(at(*c)).is_some());
            prop_assert!(!index.contains(at(*c)));
        }
        prop_assert!(index.is_empty());
    }
}
