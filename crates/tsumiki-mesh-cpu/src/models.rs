use std::sync::Arc;

use tsumiki_blocks::{Direction, Model, ModelShape, ShapeRegistry};
use tsumiki_geom::Vec3;
use tsumiki_grid::SpatialIndex;

use crate::constants::CUBE_VERTICES;
use crate::face::cube_face_triangles;
use crate::mesh_build::MeshMergeBuffer;

/// The eight corners of a model's oriented guide box, in `CUBE_VERTICES` order.
pub fn guide_box(model: &Model, shape: &ModelShape) -> [Vec3; 8] {
    let total = shape.scale * model.scale();
    // Guide corners span half a unit vertically, the bounds a full unit.
    let local_scale = shape.bounds.size().scaled(Vec3::new(1.0, 2.0, 1.0)) * total;
    let yaw = 180.0 - model.rotation();
    let center = model.position()
        + shape.offset
        + model.offset()
        + (shape.bounds.center() * total).rotated_y(yaw);
    CUBE_VERTICES.map(|v| center + v.scaled(local_scale).rotated_y(yaw))
}

/// Placed models plus the guide mesh drawn around them.
#[derive(Clone, Debug)]
pub struct ModelGroup {
    registry: Arc<ShapeRegistry>,
    models: SpatialIndex<Model>,
    guide: MeshMergeBuffer,
    dirty: bool,
}

impl ModelGroup {
    pub fn new(registry: Arc<ShapeRegistry>) -> Self {
        ModelGroup {
            registry,
            models: SpatialIndex::new(),
            guide: MeshMergeBuffer::new(),
            dirty: false,
        }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ShapeRegistry> {
        &self.registry
    }

    /// Places `model`, returning whatever occupied its cell before.
    pub fn add_model(&mut self, model: Model) -> Option<Model> {
        self.dirty = true;
        self.models.replace(model)
    }

    pub fn remove_model(&mut self, position: Vec3) -> Option<Model> {
        let removed = self.models.remove(position);
        self.dirty |= removed.is_some();
        removed
    }

    #[inline]
    pub fn model(&self, position: Vec3) -> Option<&Model> {
        self.models.get(position)
    }

    pub fn model_mut(&mut self, position: Vec3) -> Option<&mut Model> {
        let model = self.models.get_mut(position);
        self.dirty |= model.is_some();
        model
    }

    #[inline]
    pub fn contains(&self, position: Vec3) -> bool {
        self.models.contains(position)
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    pub fn all_models(&self) -> Vec<Model> {
        self.models.snapshot()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn clear(&mut self) {
        self.models.clear();
        self.dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn update_mesh(&mut self) {
        self.guide.clear();
        for model in self.models.iter() {
            let Some(shape) = self.registry.model(model.shape()) else {
                log::warn!(target: "mesh", "model at {:?} has no shape {:?}", model.position(), model.shape());
                continue;
            };
            let base = self.guide.vertex_count() as u32;
            for v in guide_box(model, shape) {
                self.guide.push_vertex(v);
            }
            for face in Direction::ALL {
                let t = cube_face_triangles(face);
                self.guide.push_triangle(base + t[0], base + t[1], base + t[2]);
                self.guide.push_triangle(base + t[3], base + t[4], base + t[5]);
            }
        }
        log::debug!(target: "mesh", "rebuilt {} model guides", self.models.len());
        self.dirty = false;
    }

    pub fn guide_mesh(&mut self) -> &MeshMergeBuffer {
        if self.dirty {
            self.update_mesh();
        }
        &self.guide
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn unit_model_box_matches_bounds() {
        let reg = ShapeRegistry::from_toml_str(
            r#"
            [[shapes]]
            name = "cube"
            [[models]]
            name = "crate"
        "#,
        )
        .unwrap();
        let id = reg.find_model("crate").unwrap();
        let shape = reg.model(id).unwrap();
        let mut model = Model::new(id, Vec3::new(2.0, 1.0, 0.0));
        model.set_rotation(180.0);
        let corners = guide_box(&model, shape);
        // Default bounds: x,z in [-0.5, 0.5], y in [0, 1]; center lifted by half a unit.
        assert!(approx(corners[0], Vec3::new(1.5, 2.0, 0.5)));
        assert!(approx(corners[7], Vec3::new(2.5, 1.0, -0.5)));
    }

    #[test]
    fn add_model_replaces_occupant() {
        let reg = Arc::new(ShapeRegistry::builtin().unwrap());
        let tree = reg.find_model("tree").unwrap();
        let mut g = ModelGroup::new(reg);
        assert!(g.add_model(Model::new(tree, Vec3::ZERO)).is_none());
        let mut bigger = Model::new(tree, Vec3::ZERO);
        bigger.set_scale(2.0);
        let old = g.add_model(bigger).unwrap();
        assert_eq!(old.scale(), 1.0);
        assert_eq!(g.len(), 1);
        assert_eq!(g.guide_mesh().vertex_count(), 8);
        assert_eq!(g.guide_mesh().index_count(), 36);
    }
}
