use std::fs;
use std::path::Path;
use std::sync::Arc;

use tsumiki_blocks::ShapeRegistry;
use tsumiki_edit::{EditDocument, EditLayer, RouteEdge};
use tsumiki_mesh_cpu::{BlockGroup, ModelGroup};

use crate::error::SceneError;
use crate::records::{BlockRecord, LayerRecord, ModelRecord, PathRecord, SceneFile};

/// Block records sorted by lattice key so output is stable across runs.
pub fn write_blocks(group: &BlockGroup) -> Vec<BlockRecord> {
    let mut blocks: Vec<_> = group.blocks().collect();
    blocks.sort_by_key(|b| b.key());
    blocks
        .into_iter()
        .map(|b| BlockRecord::from_block(b, group.registry()))
        .collect()
}

/// Adds every record to `group`; returns how many landed in a free cell.
pub fn read_blocks(group: &mut BlockGroup, records: &[BlockRecord]) -> usize {
    let registry = group.registry().clone();
    let mut added = 0;
    for rec in records {
        if group.add_block(rec.to_block(&registry)) {
            added += 1;
        } else {
            log::warn!("duplicate block at ({}, {}, {}); keeping the first", rec.x, rec.y, rec.z);
        }
    }
    added
}

pub fn write_models(group: &ModelGroup) -> Vec<ModelRecord> {
    let mut models: Vec<_> = group.models().collect();
    models.sort_by_key(|m| m.key());
    models
        .into_iter()
        .map(|m| ModelRecord::from_model(m, group.registry()))
        .collect()
}

pub fn read_models(group: &mut ModelGroup, records: &[ModelRecord]) -> usize {
    let registry = group.registry().clone();
    let mut added = 0;
    for model in records.iter().filter_map(|r| r.to_model(&registry)) {
        group.add_model(model);
        added += 1;
    }
    added
}

pub fn scene_from_document(doc: &EditDocument) -> SceneFile {
    SceneFile {
        layers: doc
            .layers
            .iter()
            .map(|l| LayerRecord {
                name: l.name.clone(),
                blocks: write_blocks(&l.blocks),
                models: write_models(&l.models),
            })
            .collect(),
        paths: doc.routes.paths().iter().map(PathRecord::from).collect(),
        ..SceneFile::default()
    }
}

/// Builds a document from records. A scene with no layers yields the default layer.
pub fn document_from_scene(
    scene: &SceneFile,
    registry: Arc<ShapeRegistry>,
    bucket_size: Option<f32>,
) -> EditDocument {
    let mut doc = EditDocument::with_bucket_size(registry.clone(), bucket_size);
    if !scene.layers.is_empty() {
        doc.layers.clear();
    }
    for rec in &scene.layers {
        let mut layer = EditLayer::new(rec.name.clone(), registry.clone(), bucket_size);
        let blocks = read_blocks(&mut layer.blocks, &rec.blocks);
        let models = read_models(&mut layer.models, &rec.models);
        log::debug!("layer '{}': {} blocks, {} models", rec.name, blocks, models);
        doc.layers.push(layer);
    }
    for p in &scene.paths {
        if !doc.routes.add(RouteEdge::from(*p)) {
            log::warn!("duplicate route path {:?}", p);
        }
    }
    doc
}

pub fn to_toml_string(doc: &EditDocument) -> Result<String, SceneError> {
    Ok(toml::to_string(&scene_from_document(doc))?)
}

pub fn from_toml_str(
    text: &str,
    registry: Arc<ShapeRegistry>,
    bucket_size: Option<f32>,
) -> Result<EditDocument, SceneError> {
    let scene: SceneFile = toml::from_str(text)?;
    Ok(document_from_scene(&scene, registry, bucket_size))
}

pub fn save_path(doc: &EditDocument, path: impl AsRef<Path>) -> Result<(), SceneError> {
    let path = path.as_ref();
    fs::write(path, to_toml_string(doc)?)?;
    log::info!(
        "saved {} blocks, {} models to {}",
        doc.block_count(),
        doc.model_count(),
        path.display()
    );
    Ok(())
}

pub fn load_path(
    path: impl AsRef<Path>,
    registry: Arc<ShapeRegistry>,
    bucket_size: Option<f32>,
) -> Result<EditDocument, SceneError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let doc = from_toml_str(&text, registry, bucket_size)?;
    log::info!(
        "loaded {} layers, {} blocks from {}",
        doc.layers.len(),
        doc.block_count(),
        path.display()
    );
    Ok(doc)
}
