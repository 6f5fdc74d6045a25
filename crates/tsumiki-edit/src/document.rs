use std::sync::Arc;

use tsumiki_blocks::{Model, ShapeRegistry};
use tsumiki_geom::Vec3;
use tsumiki_mesh_cpu::{BlockGroup, ModelGroup};

use crate::route::RoutePaths;

/// Name given to the layer a fresh document starts with.
pub const DEFAULT_LAYER_NAME: &str = "Layer01";

/// One named sheet of blocks and models.
#[derive(Clone, Debug)]
pub struct EditLayer {
    pub name: String,
    pub blocks: BlockGroup,
    pub models: ModelGroup,
}

impl EditLayer {
    pub fn new(name: impl Into<String>, registry: Arc<ShapeRegistry>, bucket_size: Option<f32>) -> Self {
        EditLayer {
            name: name.into(),
            blocks: BlockGroup::with_bucket_size(registry.clone(), bucket_size),
            models: ModelGroup::new(registry),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.models.is_empty()
    }
}

/// Offset, rotation and scale of a placed model.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModelTransform {
    pub offset: Vec3,
    pub rotation: f32,
    pub scale: f32,
}

impl ModelTransform {
    pub fn of(model: &Model) -> Self {
        ModelTransform {
            offset: model.offset(),
            rotation: model.rotation(),
            scale: model.scale(),
        }
    }

    /// Writes through the model's clamping setters.
    pub fn write_to(&self, model: &mut Model) {
        model.set_offset(self.offset);
        model.set_rotation(self.rotation);
        model.set_scale(self.scale);
    }
}

/// Everything the command stack mutates: layers plus the route graph.
#[derive(Clone, Debug)]
pub struct EditDocument {
    registry: Arc<ShapeRegistry>,
    bucket_size: Option<f32>,
    pub layers: Vec<EditLayer>,
    pub routes: RoutePaths,
}

impl EditDocument {
    /// An empty document holding a single default layer.
    pub fn new(registry: Arc<ShapeRegistry>) -> Self {
        Self::with_bucket_size(registry, None)
    }

    pub fn with_bucket_size(registry: Arc<ShapeRegistry>, bucket_size: Option<f32>) -> Self {
        let mut doc = EditDocument {
            registry,
            bucket_size,
            layers: Vec::new(),
            routes: RoutePaths::new(),
        };
        doc.add_layer(DEFAULT_LAYER_NAME);
        doc
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ShapeRegistry> {
        &self.registry
    }

    /// Appends an empty layer and returns its index.
    pub fn add_layer(&mut self, name: impl Into<String>) -> usize {
        let layer = EditLayer::new(name, self.registry.clone(), self.bucket_size);
        self.layers.push(layer);
        self.layers.len() - 1
    }

    pub fn remove_layer(&mut self, index: usize) -> Option<EditLayer> {
        (index < self.layers.len()).then(|| self.layers.remove(index))
    }

    #[inline]
    pub fn layer(&self, index: usize) -> Option<&EditLayer> {
        self.layers.get(index)
    }

    #[inline]
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut EditLayer> {
        self.layers.get_mut(index)
    }

    pub fn find_layer(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }

    /// Drops every layer and route.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.routes.clear();
    }

    /// Back to a single empty default layer.
    pub fn reset(&mut self) {
        self.clear();
        self.add_layer(DEFAULT_LAYER_NAME);
    }

    pub fn block_count(&self) -> usize {
        self.layers.iter().map(|l| l.blocks.len()).sum()
    }

    pub fn model_count(&self) -> usize {
        self.layers.iter().map(|l| l.models.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_default_layer() {
        let mut doc = EditDocument::new(Arc::new(ShapeRegistry::builtin().unwrap()));
        assert_eq!(doc.layers.len(), 1);
        assert_eq!(doc.find_layer(DEFAULT_LAYER_NAME), Some(0));
        let second = doc.add_layer("roof");
        assert_eq!(second, 1);
        assert!(doc.remove_layer(5).is_none());
        doc.reset();
        assert_eq!(doc.layers.len(), 1);
        assert!(doc.layers[0].is_empty());
    }

    #[test]
    fn transform_writes_through_clamps() {
        let reg = ShapeRegistry::builtin().unwrap();
        let mut model = Model::new(reg.find_model("tree").unwrap(), Vec3::ZERO);
        let t = ModelTransform {
            offset: Vec3::new(2.0, 0.1, -2.0),
            rotation: 270.0,
            scale: 500.0,
        };
        t.write_to(&mut model);
        let back = ModelTransform::of(&model);
        assert_eq!(back.offset, Vec3::new(0.5, 0.1, -0.5));
        assert_eq!(back.rotation, -90.0);
        assert_eq!(back.scale, 100.0);
    }
}
