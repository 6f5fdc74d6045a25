use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use tsumiki_geom::{Aabb, Vec3};

use super::chips::ChipAtlas;
use super::config::{ModelDef, ShapeDef, ShapesConfig};
use super::templates::{ShapeMesh, TemplateKind};
use super::types::{Connection, Direction, ModelShapeId, ShapeId, Wall};

/// Immutable block shape; blocks refer to it through a [`ShapeId`].
#[derive(Clone, Debug)]
pub struct BlockShape {
    pub id: ShapeId,
    pub name: String,
    pub display_name: String,
    pub template: TemplateKind,
    pub connection: [Connection; 6],
    pub connection_dir: [Direction; 6],
    /// Face meshes by local slot.
    pub faces: [Option<ShapeMesh>; 6],
    /// Always emitted with the object chip.
    pub objects: Vec<ShapeMesh>,
    pub variants: Vec<Option<ShapeMesh>>,
    pub auto_placement: bool,
    pub wall: Wall,
    pub panel_vertices: [i32; 4],
}

impl BlockShape {
    #[inline]
    pub fn face(&self, local_slot: usize) -> Option<&ShapeMesh> {
        self.faces.get(local_slot).and_then(Option::as_ref)
    }

    #[inline]
    pub fn variant(&self, index: usize) -> Option<&ShapeMesh> {
        self.variants.get(index).and_then(Option::as_ref)
    }
}

#[derive(Clone, Debug)]
pub struct ModelShape {
    pub id: ModelShapeId,
    pub name: String,
    pub display_name: String,
    pub scale: f32,
    pub offset: Vec3,
    pub enterable: bool,
    /// Local bounds of the model geometry, used for the guide box.
    pub bounds: Aabb,
}

#[derive(Clone, Debug)]
pub struct ShapeRegistry {
    pub atlas: ChipAtlas,
    pub shapes: Vec<BlockShape>,
    pub by_name: HashMap<String, ShapeId>,
    pub models: Vec<ModelShape>,
    pub models_by_name: HashMap<String, ModelShapeId>,
    default_shape: ShapeId,
}

impl ShapeRegistry {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: ShapesConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn builtin() -> Result<Self, Box<dyn Error>> {
        Self::from_config(ShapesConfig::builtin())
    }

    pub fn from_config(cfg: ShapesConfig) -> Result<Self, Box<dyn Error>> {
        let atlas = cfg
            .atlas
            .map(|a| ChipAtlas::new(a.columns, a.rows))
            .unwrap_or_default();
        let mut shapes = Vec::with_capacity(cfg.shapes.len());
        let mut by_name = HashMap::new();
        for def in cfg.shapes.into_iter() {
            let id = ShapeId(shapes.len() as u16);
            if by_name.insert(def.name.clone(), id).is_some() {
                return Err(format!("duplicate shape name '{}'", def.name).into());
            }
            shapes.push(compile_shape(id, def));
        }
        let mut models = Vec::with_capacity(cfg.models.len());
        let mut models_by_name = HashMap::new();
        for def in cfg.models.into_iter() {
            let id = ModelShapeId(models.len() as u16);
            if models_by_name.insert(def.name.clone(), id).is_some() {
                return Err(format!("duplicate model name '{}'", def.name).into());
            }
            models.push(compile_model(id, def));
        }
        let default_shape = *by_name
            .get(&cfg.default_shape)
            .ok_or_else(|| format!("default shape '{}' is not defined", cfg.default_shape))?;
        log::debug!(
            "shape registry: {} shapes, {} models, atlas {}x{}",
            shapes.len(),
            models.len(),
            atlas.columns,
            atlas.rows
        );
        Ok(ShapeRegistry {
            atlas,
            shapes,
            by_name,
            models,
            models_by_name,
            default_shape,
        })
    }

    #[inline]
    pub fn get(&self, id: ShapeId) -> Option<&BlockShape> {
        self.shapes.get(id.0 as usize)
    }

    pub fn find(&self, name: &str) -> Option<ShapeId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn default_shape(&self) -> ShapeId {
        self.default_shape
    }

    /// Resolves a shape name from saved data, falling back to the default shape.
    pub fn find_or_default(&self, name: &str) -> ShapeId {
        match self.find(name) {
            Some(id) => id,
            None => {
                let fallback = self.default_shape;
                log::warn!(
                    "unknown block shape '{}'; using '{}'",
                    name,
                    self.get(fallback).map(|s| s.name.as_str()).unwrap_or("?")
                );
                fallback
            }
        }
    }

    #[inline]
    pub fn model(&self, id: ModelShapeId) -> Option<&ModelShape> {
        self.models.get(id.0 as usize)
    }

    pub fn find_model(&self, name: &str) -> Option<ModelShapeId> {
        self.models_by_name.get(name).copied()
    }

    #[inline]
    pub fn atlas(&self) -> &ChipAtlas {
        &self.atlas
    }
}

fn compile_shape(id: ShapeId, def: ShapeDef) -> BlockShape {
    let parts = def.template.build();
    BlockShape {
        id,
        display_name: def.display_name.unwrap_or_else(|| def.name.clone()),
        name: def.name,
        template: def.template,
        connection: def.connection.unwrap_or(parts.connection),
        connection_dir: def.connection_dir.unwrap_or(parts.connection_dir),
        faces: parts.faces,
        objects: parts.objects,
        variants: parts.variants,
        auto_placement: parts.auto_placement,
        wall: def.wall.unwrap_or_default(),
        panel_vertices: def.panel_vertices.unwrap_or(parts.panel_vertices),
    }
}

fn compile_model(id: ModelShapeId, def: ModelDef) -> ModelShape {
    let v = |a: [f32; 3]| Vec3::new(a[0], a[1], a[2]);
    let bounds = def
        .bounds
        .map(|b| Aabb::from_corners(v(b.min), v(b.max)))
        .unwrap_or(Aabb::new(Vec3::new(-0.5, 0.0, -0.5), Vec3::new(0.5, 1.0, 0.5)));
    ModelShape {
        id,
        display_name: def.display_name.unwrap_or_else(|| def.name.clone()),
        name: def.name,
        scale: def.scale.unwrap_or(1.0),
        offset: def.offset.map(v).unwrap_or(Vec3::ZERO),
        enterable: def.enterable.unwrap_or(false),
        bounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_resolves_names() {
        let reg = ShapeRegistry::builtin().unwrap();
        let cube = reg.find("cube").unwrap();
        assert_eq!(reg.default_shape(), cube);
        assert_eq!(reg.find_or_default("no-such-shape"), cube);
        assert!(reg.get(reg.find("water").unwrap()).unwrap().auto_placement);
        assert!(reg.find_model("tree").is_some());
    }

    #[test]
    fn missing_default_shape_is_an_error() {
        let err = ShapeRegistry::from_toml_str(
            r#"
            default_shape = "brick"
            [[shapes]]
            name = "cube"
        "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn overrides_replace_template_defaults() {
        let reg = ShapeRegistry::from_toml_str(
            r#"
            [atlas]
            columns = 4
            rows = 2
            [[shapes]]
            name = "cube"
            [[shapes]]
            name = "fence"
            template = "cube"
            connection = ["none", "none", "none", "none", "square", "square"]
            wall = "sides"
            panel_vertices = [0, 0, 0, 0]
        "#,
        )
        .unwrap();
        let fence = reg.get(reg.find("fence").unwrap()).unwrap();
        assert_eq!(fence.connection[0], Connection::None);
        assert_eq!(fence.wall, Wall::Sides);
        assert_eq!(fence.panel_vertices, [0; 4]);
        assert_eq!(fence.display_name, "fence");
        assert_eq!(reg.atlas().columns, 4);
    }
}
