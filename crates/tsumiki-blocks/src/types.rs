use serde::{Deserialize, Serialize};
use tsumiki_geom::{GridKey, Vec3, lattice_key, snap_to_lattice};

/// Texture chip slots per block: six local faces plus the object slot.
pub const CHIP_SLOTS: usize = 7;
/// Slot used by object meshes and auto-placement variants.
pub const OBJECT_SLOT: usize = 6;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Zplus = 0,
    Zminus = 1,
    Xplus = 2,
    Xminus = 3,
    Yplus = 4,
    Yminus = 5,
}

// Rows are indexed by the block's horizontal direction.
const TO_WORLD: [[usize; 6]; 4] = [
    [0, 1, 2, 3, 4, 5],
    [1, 0, 3, 2, 4, 5],
    [2, 3, 1, 0, 4, 5],
    [3, 2, 0, 1, 4, 5],
];
const TO_LOCAL: [[usize; 6]; 4] = [
    [0, 1, 2, 3, 4, 5],
    [1, 0, 3, 2, 4, 5],
    [3, 2, 0, 1, 4, 5],
    [2, 3, 1, 0, 4, 5],
];

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Zplus,
        Direction::Zminus,
        Direction::Xplus,
        Direction::Xminus,
        Direction::Yplus,
        Direction::Yminus,
    ];
    pub const HORIZONTAL: [Direction; 4] = [
        Direction::Zplus,
        Direction::Zminus,
        Direction::Xplus,
        Direction::Xminus,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> Option<Direction> {
        Direction::ALL.get(i).copied()
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        Direction::ALL[self.index() ^ 1]
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        self.index() < 4
    }

    /// Lattice step to the neighbor across this face (Y moves by half a unit).
    #[inline]
    pub fn neighbor_offset(self) -> Vec3 {
        match self {
            Direction::Zplus => Vec3::new(0.0, 0.0, 1.0),
            Direction::Zminus => Vec3::new(0.0, 0.0, -1.0),
            Direction::Xplus => Vec3::new(1.0, 0.0, 0.0),
            Direction::Xminus => Vec3::new(-1.0, 0.0, 0.0),
            Direction::Yplus => Vec3::new(0.0, 0.5, 0.0),
            Direction::Yminus => Vec3::new(0.0, -0.5, 0.0),
        }
    }

    #[inline]
    pub fn normal(self) -> Vec3 {
        match self {
            Direction::Yplus => Vec3::UP,
            Direction::Yminus => -Vec3::UP,
            d => d.neighbor_offset(),
        }
    }

    /// Rotates a local-frame position into the frame of a block facing `self`.
    #[inline]
    pub fn rotate_position(self, p: Vec3) -> Vec3 {
        match self {
            Direction::Zminus => Vec3::new(-p.x, p.y, -p.z),
            Direction::Xplus => Vec3::new(p.z, p.y, -p.x),
            Direction::Xminus => Vec3::new(-p.z, p.y, p.x),
            Direction::Zplus | Direction::Yplus | Direction::Yminus => p,
        }
    }

    /// Maps a local face slot of a block facing `self` to a world slot.
    /// Slots `>= 6` pass through unchanged.
    #[inline]
    pub fn to_world_slot(self, local: usize) -> usize {
        match TO_WORLD.get(self.index()) {
            Some(row) if local < 6 => row[local],
            _ => local,
        }
    }

    /// Maps a world face slot to the local slot of a block facing `self`.
    #[inline]
    pub fn to_local_slot(self, world: usize) -> usize {
        match TO_LOCAL.get(self.index()) {
            Some(row) if world < 6 => row[world],
            _ => world,
        }
    }
}

/// How a face meets its neighbor for occlusion purposes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connection {
    #[default]
    None,
    Square,
    Slope,
    Stairs,
    Half,
}

/// Which guide faces a shape contributes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wall {
    #[default]
    None,
    Sides,
    Top,
}

impl Wall {
    #[inline]
    pub fn allows(self, world_face: Direction) -> bool {
        match self {
            Wall::None => true,
            Wall::Sides => world_face.is_horizontal(),
            Wall::Top => world_face == Direction::Yplus,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u16);

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ModelShapeId(pub u16);

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    position: Vec3,
    direction: Direction,
    shape: ShapeId,
    texture_chips: [i32; CHIP_SLOTS],
    meta_info: Option<String>,
}

impl Block {
    pub fn new(position: Vec3, direction: Direction, shape: ShapeId) -> Self {
        let mut block = Block {
            position: snap_to_lattice(position),
            direction: Direction::Zplus,
            shape,
            texture_chips: [0; CHIP_SLOTS],
            meta_info: None,
        };
        block.set_direction(direction);
        block
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn key(&self) -> GridKey {
        lattice_key(self.position)
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = snap_to_lattice(position);
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns false and keeps the current facing when `direction` is vertical.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if !direction.is_horizontal() {
            log::warn!("block rotation {direction:?} is not horizontal; ignored");
            return false;
        }
        self.direction = direction;
        true
    }

    #[inline]
    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    pub fn set_shape(&mut self, shape: ShapeId) {
        self.shape = shape;
    }

    /// Raw chip stored at a local slot (`0..6` faces, `6` objects).
    #[inline]
    pub fn texture_chip(&self, local_slot: usize) -> i32 {
        self.texture_chips.get(local_slot).copied().unwrap_or(0)
    }

    #[inline]
    pub fn texture_chips(&self) -> &[i32; CHIP_SLOTS] {
        &self.texture_chips
    }

    /// Paints the face currently facing `world_face`.
    pub fn set_texture_chip(&mut self, world_face: Direction, chip: i32) {
        let slot = self.to_local(world_face);
        self.texture_chips[slot] = chip;
    }

    pub fn set_object_chip(&mut self, chip: i32) {
        self.texture_chips[OBJECT_SLOT] = chip;
    }

    pub fn set_texture_chips(&mut self, chips: [i32; CHIP_SLOTS]) {
        self.texture_chips = chips;
    }

    pub fn meta_info(&self) -> Option<&str> {
        self.meta_info.as_deref()
    }

    /// Empty text clears the meta info.
    pub fn set_meta_info(&mut self, meta: Option<String>) {
        self.meta_info = meta.filter(|m| !m.is_empty());
    }

    #[inline]
    pub fn to_local(&self, world_face: Direction) -> usize {
        self.direction.to_local_slot(world_face.index())
    }

    #[inline]
    pub fn to_world(&self, local: Direction) -> Direction {
        Direction::ALL[self.direction.to_world_slot(local.index())]
    }
}

pub const MODEL_OFFSET_LIMIT: Vec3 = Vec3::new(0.5, 0.25, 0.5);
pub const MODEL_SCALE_MIN: f32 = 0.1;
pub const MODEL_SCALE_MAX: f32 = 100.0;

/// A placed decoration. Setters clamp into the editor's legal ranges.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    shape: ModelShapeId,
    position: Vec3,
    offset: Vec3,
    rotation: f32,
    scale: f32,
}

impl Model {
    pub fn new(shape: ModelShapeId, position: Vec3) -> Self {
        Model {
            shape,
            position: snap_to_lattice(position),
            offset: Vec3::ZERO,
            rotation: 0.0,
            scale: 1.0,
        }
    }

    #[inline]
    pub fn shape(&self) -> ModelShapeId {
        self.shape
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn key(&self) -> GridKey {
        lattice_key(self.position)
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = snap_to_lattice(position);
    }

    #[inline]
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Vec3) {
        let l = MODEL_OFFSET_LIMIT;
        self.offset = Vec3::new(
            offset.x.clamp(-l.x, l.x),
            offset.y.clamp(-l.y, l.y),
            offset.z.clamp(-l.z, l.z),
        );
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        if !degrees.is_finite() {
            self.rotation = 0.0;
            return;
        }
        let mut r = degrees % 360.0;
        if r < -180.0 {
            r += 360.0;
        } else if r > 180.0 {
            r -= 360.0;
        }
        self.rotation = r;
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = if scale.is_nan() {
            1.0
        } else {
            scale.clamp(MODEL_SCALE_MIN, MODEL_SCALE_MAX)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remap_tables_are_inverse() {
        for dir in Direction::HORIZONTAL {
            for slot in 0..CHIP_SLOTS {
                assert_eq!(dir.to_local_slot(dir.to_world_slot(slot)), slot);
            }
        }
    }

    #[test]
    fn remap_agrees_with_rotate_position() {
        for dir in Direction::HORIZONTAL {
            for local in Direction::ALL {
                let world = Direction::ALL[dir.to_world_slot(local.index())];
                assert_eq!(dir.rotate_position(local.normal()), world.normal(), "{dir:?} {local:?}");
            }
        }
    }

    #[test]
    fn vertical_rotation_is_rejected() {
        let mut b = Block::new(Vec3::ZERO, Direction::Xplus, ShapeId(0));
        assert!(!b.set_direction(Direction::Yplus));
        assert_eq!(b.direction(), Direction::Xplus);
        let b = Block::new(Vec3::ZERO, Direction::Yminus, ShapeId(0));
        assert_eq!(b.direction(), Direction::Zplus);
    }

    #[test]
    fn paint_stores_at_local_slot() {
        let mut b = Block::new(Vec3::ZERO, Direction::Xplus, ShapeId(0));
        b.set_texture_chip(Direction::Zplus, 9);
        assert_eq!(b.texture_chip(Direction::Xminus.index()), 9);
        b.set_texture_chip(Direction::Yplus, 3);
        assert_eq!(b.texture_chip(Direction::Yplus.index()), 3);
    }

    #[test]
    fn model_setters_clamp() {
        let mut m = Model::new(ModelShapeId(0), Vec3::new(0.2, 0.3, -0.2));
        assert_eq!(m.position(), Vec3::new(0.0, 0.5, 0.0));
        m.set_offset(Vec3::new(2.0, -1.0, 0.1));
        assert_eq!(m.offset(), Vec3::new(0.5, -0.25, 0.1));
        m.set_rotation(270.0);
        assert_eq!(m.rotation(), -90.0);
        m.set_rotation(-190.0);
        assert_eq!(m.rotation(), 170.0);
        m.set_rotation(180.0);
        assert_eq!(m.rotation(), 180.0);
        m.set_scale(0.0);
        assert_eq!(m.scale(), MODEL_SCALE_MIN);
        m.set_scale(1e6);
        assert_eq!(m.scale(), MODEL_SCALE_MAX);
    }

    #[test]
    fn empty_meta_clears() {
        let mut b = Block::new(Vec3::ZERO, Direction::Zplus, ShapeId(0));
        b.set_meta_info(Some("door".into()));
        assert_eq!(b.meta_info(), Some("door"));
        b.set_meta_info(Some(String::new()));
        assert_eq!(b.meta_info(), None);
    }
}
