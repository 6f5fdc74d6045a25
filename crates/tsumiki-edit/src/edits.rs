//! Concrete document edits recorded on the undo stack.

use tsumiki_blocks::{Block, CHIP_SLOTS, Direction, Model};
use tsumiki_geom::Vec3;

use crate::command::Command;
use crate::document::{EditDocument, EditLayer, ModelTransform};
use crate::route::RouteEdge;

#[derive(Clone, Debug, PartialEq)]
pub enum EditCommand {
    AddBlock {
        layer: usize,
        block: Block,
    },
    RemoveBlock {
        layer: usize,
        block: Block,
    },
    RemoveBlocks {
        layer: usize,
        blocks: Vec<Block>,
    },
    PaintBlock {
        layer: usize,
        position: Vec3,
        before: [i32; CHIP_SLOTS],
        after: [i32; CHIP_SLOTS],
    },
    RotateBlock {
        layer: usize,
        position: Vec3,
        before: Direction,
        after: Direction,
    },
    SetMetaInfo {
        layer: usize,
        position: Vec3,
        before: Option<String>,
        after: Option<String>,
    },
    /// Moves blocks and models by `delta`. Occupants at the destinations are
    /// lifted out on apply and put back on revert.
    MoveObjects {
        layer: usize,
        blocks: Vec<Block>,
        models: Vec<Model>,
        delta: Vec3,
        displaced_blocks: Vec<Block>,
        displaced_models: Vec<Model>,
    },
    AddModel {
        layer: usize,
        model: Model,
        replaced: Option<Model>,
    },
    RemoveModel {
        layer: usize,
        model: Model,
    },
    SetModelTransform {
        layer: usize,
        position: Vec3,
        before: ModelTransform,
        after: ModelTransform,
    },
    AddRoutePath {
        edge: RouteEdge,
    },
    RemoveRoutePath {
        edge: RouteEdge,
    },
}

impl EditCommand {
    pub fn move_objects(layer: usize, blocks: Vec<Block>, models: Vec<Model>, delta: Vec3) -> Self {
        EditCommand::MoveObjects {
            layer,
            blocks,
            models,
            delta,
            displaced_blocks: Vec::new(),
            displaced_models: Vec::new(),
        }
    }

    /// Layer the command touches, if any.
    pub fn layer(&self) -> Option<usize> {
        match self {
            EditCommand::AddBlock { layer, .. }
            | EditCommand::RemoveBlock { layer, .. }
            | EditCommand::RemoveBlocks { layer, .. }
            | EditCommand::PaintBlock { layer, .. }
            | EditCommand::RotateBlock { layer, .. }
            | EditCommand::SetMetaInfo { layer, .. }
            | EditCommand::MoveObjects { layer, .. }
            | EditCommand::AddModel { layer, .. }
            | EditCommand::RemoveModel { layer, .. }
            | EditCommand::SetModelTransform { layer, .. } => Some(*layer),
            EditCommand::AddRoutePath { .. } | EditCommand::RemoveRoutePath { .. } => None,
        }
    }
}

fn layer_of(doc: &mut EditDocument, index: usize) -> Option<&mut EditLayer> {
    let layer = doc.layer_mut(index);
    if layer.is_none() {
        log::error!(target: "edit", "command targets missing layer {}", index);
    }
    layer
}

fn moved(block: &Block, delta: Vec3) -> Block {
    let mut b = block.clone();
    b.set_position(block.position() + delta);
    b
}

fn moved_model(model: &Model, delta: Vec3) -> Model {
    let mut m = model.clone();
    m.set_position(model.position() + delta);
    m
}

impl Command<EditDocument> for EditCommand {
    fn apply(&mut self, doc: &mut EditDocument) {
        match self {
            EditCommand::AddRoutePath { edge } => {
                doc.routes.add(*edge);
            }
            EditCommand::RemoveRoutePath { edge } => {
                doc.routes.remove(edge);
            }
            _ => {
                let Some(index) = self.layer() else { return };
                let Some(layer) = layer_of(doc, index) else { return };
                apply_to_layer(self, layer);
            }
        }
    }

    fn revert(&mut self, doc: &mut EditDocument) {
        match self {
            EditCommand::AddRoutePath { edge } => {
                doc.routes.remove(edge);
            }
            EditCommand::RemoveRoutePath { edge } => {
                doc.routes.add(*edge);
            }
            _ => {
                let Some(index) = self.layer() else { return };
                let Some(layer) = layer_of(doc, index) else { return };
                revert_on_layer(self, layer);
            }
        }
    }
}

fn apply_to_layer(cmd: &mut EditCommand, layer: &mut EditLayer) {
    match cmd {
        EditCommand::AddBlock { block, .. } => {
            layer.blocks.add_block(block.clone());
        }
        EditCommand::RemoveBlock { block, .. } => {
            layer.blocks.remove_block(block.position());
        }
        EditCommand::RemoveBlocks { blocks, .. } => {
            for b in blocks.iter() {
                layer.blocks.remove_block(b.position());
            }
        }
        EditCommand::PaintBlock { position, after, .. } => {
            if let Some(b) = layer.blocks.block_mut(*position) {
                b.set_texture_chips(*after);
            }
        }
        EditCommand::RotateBlock { position, after, .. } => {
            if let Some(b) = layer.blocks.block_mut(*position) {
                b.set_direction(*after);
            }
        }
        EditCommand::SetMetaInfo { position, after, .. } => {
            if let Some(b) = layer.blocks.block_mut(*position) {
                b.set_meta_info(after.clone());
            }
        }
        EditCommand::MoveObjects {
            blocks,
            models,
            delta,
            displaced_blocks,
            displaced_models,
            ..
        } => {
            displaced_blocks.clear();
            displaced_models.clear();
            for b in blocks.iter() {
                layer.blocks.remove_block(b.position());
            }
            for m in models.iter() {
                layer.models.remove_model(m.position());
            }
            for b in blocks.iter() {
                let dest = moved(b, *delta);
                if let Some(occupant) = layer.blocks.remove_block(dest.position()) {
                    displaced_blocks.push(occupant);
                }
                layer.blocks.add_block(dest);
            }
            for m in models.iter() {
                if let Some(occupant) = layer.models.add_model(moved_model(m, *delta)) {
                    displaced_models.push(occupant);
                }
            }
        }
        EditCommand::AddModel { model, replaced, .. } => {
            *replaced = layer.models.add_model(model.clone());
        }
        EditCommand::RemoveModel { model, .. } => {
            layer.models.remove_model(model.position());
        }
        EditCommand::SetModelTransform { position, after, .. } => {
            if let Some(m) = layer.models.model_mut(*position) {
                after.write_to(m);
            }
        }
        EditCommand::AddRoutePath { .. } | EditCommand::RemoveRoutePath { .. } => {}
    }
}

fn revert_on_layer(cmd: &mut EditCommand, layer: &mut EditLayer) {
    match cmd {
        EditCommand::AddBlock { block, .. } => {
            layer.blocks.remove_block(block.position());
        }
        EditCommand::RemoveBlock { block, .. } => {
            layer.blocks.add_block(block.clone());
        }
        EditCommand::RemoveBlocks { blocks, .. } => {
            for b in blocks.iter() {
                layer.blocks.add_block(b.clone());
            }
        }
        EditCommand::PaintBlock { position, before, .. } => {
            if let Some(b) = layer.blocks.block_mut(*position) {
                b.set_texture_chips(*before);
            }
        }
        EditCommand::RotateBlock { position, before, .. } => {
            if let Some(b) = layer.blocks.block_mut(*position) {
                b.set_direction(*before);
            }
        }
        EditCommand::SetMetaInfo { position, before, .. } => {
            if let Some(b) = layer.blocks.block_mut(*position) {
                b.set_meta_info(before.clone());
            }
        }
        EditCommand::MoveObjects {
            blocks,
            models,
            delta,
            displaced_blocks,
            displaced_models,
            ..
        } => {
            for b in blocks.iter() {
                layer.blocks.remove_block(moved(b, *delta).position());
            }
            for m in models.iter() {
                layer.models.remove_model(moved_model(m, *delta).position());
            }
            for b in displaced_blocks.drain(..) {
                layer.blocks.add_block(b);
            }
            for m in displaced_models.drain(..) {
                layer.models.add_model(m);
            }
            for b in blocks.iter() {
                layer.blocks.add_block(b.clone());
            }
            for m in models.iter() {
                layer.models.add_model(m.clone());
            }
        }
        EditCommand::AddModel { model, replaced, .. } => {
            layer.models.remove_model(model.position());
            if let Some(old) = replaced.take() {
                layer.models.add_model(old);
            }
        }
        EditCommand::RemoveModel { model, .. } => {
            layer.models.add_model(model.clone());
        }
        EditCommand::SetModelTransform { position, before, .. } => {
            if let Some(m) = layer.models.model_mut(*position) {
                before.write_to(m);
            }
        }
        EditCommand::AddRoutePath { .. } | EditCommand::RemoveRoutePath { .. } => {}
    }
}
