//! Position-keyed storage for blocks and models.
#![forbid(unsafe_code)]

use hashbrown::HashMap;
use tsumiki_blocks::{Block, Model};
use tsumiki_geom::{GridKey, Vec3, lattice_key};

/// Anything that occupies one lattice cell.
pub trait Placed {
    fn position(&self) -> Vec3;

    #[inline]
    fn key(&self) -> GridKey {
        lattice_key(self.position())
    }
}

impl Placed for Block {
    #[inline]
    fn position(&self) -> Vec3 {
        Block::position(self)
    }
}

impl Placed for Model {
    #[inline]
    fn position(&self) -> Vec3 {
        Model::position(self)
    }
}

/// Hash index from lattice key to item. Iteration order is unspecified.
#[derive(Clone, Debug)]
pub struct SpatialIndex<T> {
    items: HashMap<GridKey, T>,
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
        }
    }
}

impl<T: Placed> SpatialIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts unless the cell is taken; returns whether the item was stored.
    pub fn add(&mut self, item: T) -> bool {
        let key = item.key();
        if self.items.contains_key(&key) {
            return false;
        }
        self.items.insert(key, item);
        true
    }

    /// Inserts, handing back whatever occupied the cell before.
    pub fn replace(&mut self, item: T) -> Option<T> {
        self.items.insert(item.key(), item)
    }

    pub fn remove(&mut self, position: Vec3) -> Option<T> {
        self.items.remove(&lattice_key(position))
    }

    #[inline]
    pub fn get(&self, position: Vec3) -> Option<&T> {
        self.items.get(&lattice_key(position))
    }

    /// Callers must not change the item's position through this reference.
    #[inline]
    pub fn get_mut(&mut self, position: Vec3) -> Option<&mut T> {
        self.items.get_mut(&lattice_key(position))
    }

    #[inline]
    pub fn contains(&self, position: Vec3) -> bool {
        self.items.contains_key(&lattice_key(position))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Placed + Clone> SpatialIndex<T> {
    pub fn snapshot(&self) -> Vec<T> {
        self.items.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsumiki_blocks::{Direction, ShapeId};

    fn cube(x: f32, y: f32, z: f32) -> Block {
        Block::new(Vec3::new(x, y, z), Direction::Zplus, ShapeId(0))
    }

    #[test]
    fn add_to_occupied_cell_is_a_no_op() {
        let mut index = SpatialIndex::new();
        assert!(index.add(cube(0.0, 0.0, 0.0)));
        let mut other = cube(0.0, 0.0, 0.0);
        other.set_meta_info(Some("second".into()));
        assert!(!index.add(other));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(Vec3::ZERO).unwrap().meta_info(), None);
    }

    #[test]
    fn replace_returns_previous() {
        let mut index = SpatialIndex::new();
        assert!(index.replace(cube(1.0, 0.5, 0.0)).is_none());
        let prev = index.replace(cube(1.0, 0.5, 0.0));
        assert!(prev.is_some());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn lookups_snap_free_positions() {
        let mut index = SpatialIndex::new();
        index.add(cube(2.0, 1.0, -3.0));
        assert!(index.contains(Vec3::new(2.2, 0.9, -3.1)));
        assert!(index.remove(Vec3::new(1.8, 1.1, -2.9)).is_some());
        assert!(index.is_empty());
    }
}
