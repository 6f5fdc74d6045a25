//! Flat, name-based records for blocks, models and route paths.

use serde::{Deserialize, Serialize};
use tsumiki_blocks::{Block, CHIP_SLOTS, Direction, Model, ShapeRegistry};
use tsumiki_geom::Vec3;
use tsumiki_edit::RouteEdge;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BlockRecord {
    #[serde(rename = "type")]
    pub shape: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default)]
    pub dir: i32,
    /// Texture chips joined by commas, local face slots then the object slot.
    #[serde(default)]
    pub tile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
}

impl BlockRecord {
    pub fn from_block(block: &Block, registry: &ShapeRegistry) -> Self {
        let p = block.position();
        let shape = registry
            .get(block.shape())
            .map(|s| s.name.clone())
            .unwrap_or_else(|| {
                log::warn!("block at {:?} has unregistered shape {:?}", p, block.shape());
                String::new()
            });
        let tile = block
            .texture_chips()
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        BlockRecord {
            shape,
            x: p.x,
            y: p.y,
            z: p.z,
            dir: block.direction().index() as i32,
            tile,
            meta: block.meta_info().map(str::to_string),
        }
    }

    /// Unknown shape names fall back to the registry default.
    pub fn to_block(&self, registry: &ShapeRegistry) -> Block {
        let shape = registry.find_or_default(&self.shape);
        let direction = match usize::try_from(self.dir).ok().and_then(Direction::from_index) {
            Some(d) if d.is_horizontal() => d,
            _ => {
                log::warn!("block '{}' has invalid direction {}; using zplus", self.shape, self.dir);
                Direction::Zplus
            }
        };
        let mut block = Block::new(Vec3::new(self.x, self.y, self.z), direction, shape);
        block.set_texture_chips(parse_tile(&self.tile));
        block.set_meta_info(self.meta.clone());
        block
    }
}

/// Parses a comma-joined chip list, padding or truncating to the slot count.
pub fn parse_tile(tile: &str) -> [i32; CHIP_SLOTS] {
    let mut chips = [0; CHIP_SLOTS];
    if tile.trim().is_empty() {
        return chips;
    }
    let parts: Vec<&str> = tile.split(',').map(str::trim).collect();
    if parts.len() != CHIP_SLOTS {
        log::warn!("tile '{}' has {} entries, expected {}", tile, parts.len(), CHIP_SLOTS);
    }
    for (slot, part) in chips.iter_mut().zip(parts) {
        *slot = part.parse().unwrap_or_else(|_| {
            log::warn!("invalid chip '{}' in tile '{}'", part, tile);
            0
        });
    }
    chips
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelRecord {
    #[serde(rename = "type")]
    pub shape: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default)]
    pub offset_x: f32,
    #[serde(default)]
    pub offset_y: f32,
    #[serde(default)]
    pub offset_z: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "unit_scale")]
    pub scale: f32,
}

fn unit_scale() -> f32 {
    1.0
}

impl ModelRecord {
    pub fn from_model(model: &Model, registry: &ShapeRegistry) -> Self {
        let p = model.position();
        let o = model.offset();
        ModelRecord {
            shape: registry
                .model(model.shape())
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            x: p.x,
            y: p.y,
            z: p.z,
            offset_x: o.x,
            offset_y: o.y,
            offset_z: o.z,
            rotation: model.rotation(),
            scale: model.scale(),
        }
    }

    /// `None` (logged) when the model shape is unknown; models have no fallback.
    pub fn to_model(&self, registry: &ShapeRegistry) -> Option<Model> {
        let Some(shape) = registry.find_model(&self.shape) else {
            log::error!("unknown model shape '{}'; skipping", self.shape);
            return None;
        };
        let mut model = Model::new(shape, Vec3::new(self.x, self.y, self.z));
        model.set_offset(Vec3::new(self.offset_x, self.offset_y, self.offset_z));
        model.set_rotation(self.rotation);
        model.set_scale(self.scale);
        Some(model)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PathRecord {
    pub x1: f32,
    pub y1: f32,
    pub z1: f32,
    pub x2: f32,
    pub y2: f32,
    pub z2: f32,
}

impl From<&RouteEdge> for PathRecord {
    fn from(e: &RouteEdge) -> Self {
        PathRecord {
            x1: e.p1.x,
            y1: e.p1.y,
            z1: e.p1.z,
            x2: e.p2.x,
            y2: e.p2.y,
            z2: e.p2.z,
        }
    }
}

impl From<PathRecord> for RouteEdge {
    fn from(r: PathRecord) -> Self {
        RouteEdge::new(Vec3::new(r.x1, r.y1, r.z1), Vec3::new(r.x2, r.y2, r.z2))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LayerRecord {
    pub name: String,
    #[serde(default, rename = "block")]
    pub blocks: Vec<BlockRecord>,
    #[serde(default, rename = "model")]
    pub models: Vec<ModelRecord>,
}

pub const SCENE_VERSION: &str = "1.00";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SceneFile {
    #[serde(default = "scene_version")]
    pub version: String,
    #[serde(default, rename = "layer")]
    pub layers: Vec<LayerRecord>,
    #[serde(default, rename = "path")]
    pub paths: Vec<PathRecord>,
}

fn scene_version() -> String {
    SCENE_VERSION.to_string()
}

impl Default for SceneFile {
    fn default() -> Self {
        SceneFile {
            version: scene_version(),
            layers: Vec::new(),
            paths: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_bad_tiles_are_padded() {
        assert_eq!(parse_tile(""), [0; 7]);
        assert_eq!(parse_tile("1,2,3"), [1, 2, 3, 0, 0, 0, 0]);
        assert_eq!(parse_tile("1, x ,3,4,5,6,7,8"), [1, 0, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn unknown_names_fall_back_or_skip() {
        let reg = ShapeRegistry::builtin().unwrap();
        let rec = BlockRecord {
            shape: "castle_gate".into(),
            x: 1.0,
            y: 0.5,
            z: -2.0,
            dir: 4,
            tile: "3,3,3,3,3,3,9".into(),
            meta: None,
        };
        let block = rec.to_block(&reg);
        assert_eq!(block.shape(), reg.default_shape());
        assert_eq!(block.direction(), Direction::Zplus);
        assert_eq!(block.texture_chip(6), 9);

        let model = ModelRecord {
            shape: "windmill".into(),
            x: 0.0,
            y: 0.0,
            z: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            offset_z: 0.0,
            rotation: 0.0,
            scale: 1.0,
        };
        assert!(model.to_model(&reg).is_none());
    }
}
