//! Editing entry points. Every mutation goes through the command stack.

use std::sync::Arc;

use tsumiki_blocks::{Block, Direction, Model, ModelShapeId, ShapeRegistry};
use tsumiki_geom::Vec3;
use tsumiki_mesh_cpu::BlockGroup;

use crate::command::CommandStack;
use crate::document::{EditDocument, EditLayer, ModelTransform};
use crate::edits::EditCommand;
use crate::route::{RouteEdge, RoutePaths};

/// Objects lifted out of a layer while a move gesture is in progress.
#[derive(Clone, Debug)]
pub struct MoveCapture {
    pub layer: usize,
    pub blocks: BlockGroup,
    pub models: Vec<Model>,
}

#[derive(Debug)]
pub struct EditSession {
    doc: EditDocument,
    history: CommandStack<EditCommand>,
    current_layer: usize,
    capture: Option<MoveCapture>,
}

impl EditSession {
    pub fn new(registry: Arc<ShapeRegistry>) -> Self {
        Self::with_document(EditDocument::new(registry))
    }

    /// Wraps a loaded document with an empty history.
    pub fn with_document(doc: EditDocument) -> Self {
        EditSession {
            doc,
            history: CommandStack::new(),
            current_layer: 0,
            capture: None,
        }
    }

    #[inline]
    pub fn document(&self) -> &EditDocument {
        &self.doc
    }

    /// Direct access for loaders and mesh queries. Edits made here are not undoable.
    #[inline]
    pub fn document_mut(&mut self) -> &mut EditDocument {
        &mut self.doc
    }

    pub fn into_document(self) -> EditDocument {
        self.doc
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ShapeRegistry> {
        self.doc.registry()
    }

    #[inline]
    pub fn history(&self) -> &CommandStack<EditCommand> {
        &self.history
    }

    // Layers

    #[inline]
    pub fn current_layer(&self) -> usize {
        self.current_layer
    }

    pub fn layer(&self) -> Option<&EditLayer> {
        self.doc.layer(self.current_layer)
    }

    pub fn set_current_layer(&mut self, index: usize) -> bool {
        if index >= self.doc.layers.len() {
            log::warn!(target: "edit", "no layer {} to select", index);
            return false;
        }
        self.current_layer = index;
        true
    }

    pub fn add_layer(&mut self, name: impl Into<String>) -> usize {
        self.doc.add_layer(name)
    }

    /// Removing a layer invalidates layer indices in the history, so it is cleared.
    /// The last remaining layer cannot be removed.
    pub fn remove_layer(&mut self, index: usize) -> bool {
        if self.doc.layers.len() <= 1 || index >= self.doc.layers.len() {
            log::warn!(target: "edit", "refusing to remove layer {}", index);
            return false;
        }
        self.cancel_move();
        self.doc.remove_layer(index);
        self.history.clear();
        if self.current_layer >= index && self.current_layer > 0 {
            self.current_layer -= 1;
        }
        true
    }

    /// Empty document with one default layer and no history.
    pub fn reset(&mut self) {
        self.capture = None;
        self.doc.reset();
        self.history.clear();
        self.current_layer = 0;
    }

    // History

    pub fn undo(&mut self) -> bool {
        if self.move_in_progress("undo") {
            return false;
        }
        self.history.undo(&mut self.doc)
    }

    pub fn redo(&mut self) -> bool {
        if self.move_in_progress("redo") {
            return false;
        }
        self.history.redo(&mut self.doc)
    }

    pub fn begin_group(&mut self) -> bool {
        self.history.begin_group()
    }

    pub fn end_group(&mut self) -> bool {
        self.history.end_group()
    }

    /// History and edits stay locked while captured objects are outside their layer.
    fn move_in_progress(&self, what: &str) -> bool {
        if self.capture.is_some() {
            log::warn!(target: "edit", "{} rejected: a move is in progress", what);
            return true;
        }
        false
    }

    fn execute(&mut self, cmd: EditCommand) {
        log::debug!(target: "edit", "{:?}", cmd);
        self.history.push_and_execute(cmd, &mut self.doc);
    }

    fn blocks(&self) -> Option<&BlockGroup> {
        self.layer().map(|l| &l.blocks)
    }

    // Blocks

    /// Places `block` on the current layer unless its cell is taken.
    pub fn add_block(&mut self, block: Block) -> bool {
        if self.move_in_progress("add_block") {
            return false;
        }
        match self.blocks() {
            Some(g) if !g.contains(block.position()) => {}
            _ => return false,
        }
        let layer = self.current_layer;
        self.execute(EditCommand::AddBlock { layer, block });
        true
    }

    pub fn remove_block(&mut self, position: Vec3) -> bool {
        if self.move_in_progress("remove_block") {
            return false;
        }
        let Some(block) = self.blocks().and_then(|g| g.block(position)).cloned() else {
            return false;
        };
        let layer = self.current_layer;
        self.execute(EditCommand::RemoveBlock { layer, block });
        true
    }

    /// Removes every listed block that exists as one undo step; returns how many.
    pub fn remove_blocks(&mut self, positions: &[Vec3]) -> usize {
        if self.move_in_progress("remove_blocks") {
            return 0;
        }
        let Some(group) = self.blocks() else {
            return 0;
        };
        let mut blocks: Vec<Block> = Vec::new();
        for p in positions {
            if let Some(b) = group.block(*p) {
                if !blocks.iter().any(|x| x.key() == b.key()) {
                    blocks.push(b.clone());
                }
            }
        }
        if blocks.is_empty() {
            return 0;
        }
        let count = blocks.len();
        let layer = self.current_layer;
        self.execute(EditCommand::RemoveBlocks { layer, blocks });
        count
    }

    /// Paints one world face, or the object slot when `face` is `None`.
    pub fn paint_block(&mut self, position: Vec3, face: Option<Direction>, chip: i32) -> bool {
        if self.move_in_progress("paint_block") {
            return false;
        }
        let Some(block) = self.blocks().and_then(|g| g.block(position)) else {
            return false;
        };
        let before = *block.texture_chips();
        let mut painted = block.clone();
        match face {
            Some(world) => painted.set_texture_chip(world, chip),
            None => painted.set_object_chip(chip),
        }
        let after = *painted.texture_chips();
        if after == before {
            return false;
        }
        let (layer, position) = (self.current_layer, block.position());
        self.execute(EditCommand::PaintBlock {
            layer,
            position,
            before,
            after,
        });
        true
    }

    pub fn rotate_block(&mut self, position: Vec3, direction: Direction) -> bool {
        if self.move_in_progress("rotate_block") {
            return false;
        }
        if !direction.is_horizontal() {
            log::warn!(target: "edit", "blocks cannot face {:?}", direction);
            return false;
        }
        let Some(block) = self.blocks().and_then(|g| g.block(position)) else {
            return false;
        };
        let before = block.direction();
        if before == direction {
            return false;
        }
        let (layer, position) = (self.current_layer, block.position());
        self.execute(EditCommand::RotateBlock {
            layer,
            position,
            before,
            after: direction,
        });
        true
    }

    /// An empty string clears the note.
    pub fn set_meta_info(&mut self, position: Vec3, meta: Option<String>) -> bool {
        if self.move_in_progress("set_meta_info") {
            return false;
        }
        let after = meta.filter(|m| !m.is_empty());
        let Some(block) = self.blocks().and_then(|g| g.block(position)) else {
            return false;
        };
        let before = block.meta_info().map(str::to_string);
        if before == after {
            return false;
        }
        let (layer, position) = (self.current_layer, block.position());
        self.execute(EditCommand::SetMetaInfo {
            layer,
            position,
            before,
            after,
        });
        true
    }

    /// Moves the blocks and models at `positions` by `delta` as one undo step.
    pub fn move_objects(&mut self, positions: &[Vec3], delta: Vec3) -> bool {
        if self.move_in_progress("move_objects") {
            return false;
        }
        let Some(layer) = self.layer() else {
            return false;
        };
        let mut blocks: Vec<Block> = Vec::new();
        let mut models: Vec<Model> = Vec::new();
        for p in positions {
            if let Some(b) = layer.blocks.block(*p) {
                if !blocks.iter().any(|x| x.key() == b.key()) {
                    blocks.push(b.clone());
                }
            }
            if let Some(m) = layer.models.model(*p) {
                if !models.iter().any(|x| x.key() == m.key()) {
                    models.push(m.clone());
                }
            }
        }
        self.push_move(blocks, models, delta)
    }

    fn push_move(&mut self, blocks: Vec<Block>, models: Vec<Model>, delta: Vec3) -> bool {
        if (blocks.is_empty() && models.is_empty()) || delta == Vec3::ZERO {
            return false;
        }
        let layer = self.current_layer;
        self.execute(EditCommand::move_objects(layer, blocks, models, delta));
        true
    }

    // Models

    pub fn add_model(&mut self, shape: ModelShapeId, position: Vec3) -> bool {
        if self.move_in_progress("add_model") {
            return false;
        }
        if self.registry().model(shape).is_none() {
            log::error!(target: "edit", "unknown model shape {:?}", shape);
            return false;
        }
        if self.layer().is_none() {
            return false;
        }
        let layer = self.current_layer;
        self.execute(EditCommand::AddModel {
            layer,
            model: Model::new(shape, position),
            replaced: None,
        });
        true
    }

    pub fn remove_model(&mut self, position: Vec3) -> bool {
        if self.move_in_progress("remove_model") {
            return false;
        }
        let Some(model) = self.layer().and_then(|l| l.models.model(position)).cloned() else {
            return false;
        };
        let layer = self.current_layer;
        self.execute(EditCommand::RemoveModel { layer, model });
        true
    }

    pub fn set_model_transform(&mut self, position: Vec3, transform: ModelTransform) -> bool {
        if self.move_in_progress("set_model_transform") {
            return false;
        }
        let Some(model) = self.layer().and_then(|l| l.models.model(position)) else {
            return false;
        };
        let before = ModelTransform::of(model);
        let mut probe = model.clone();
        transform.write_to(&mut probe);
        let after = ModelTransform::of(&probe);
        if after == before {
            return false;
        }
        let (layer, position) = (self.current_layer, model.position());
        self.execute(EditCommand::SetModelTransform {
            layer,
            position,
            before,
            after,
        });
        true
    }

    // Routes

    /// Connects two enterable blocks of the current layer.
    pub fn add_route_path(&mut self, p1: Vec3, p2: Vec3) -> bool {
        if self.move_in_progress("add_route_path") {
            return false;
        }
        let Some(blocks) = self.blocks() else {
            return false;
        };
        let edge = RouteEdge::new(p1, p2);
        if !RoutePaths::can_add(blocks, p1, p2) || self.doc.routes.contains(&edge) {
            return false;
        }
        self.execute(EditCommand::AddRoutePath { edge });
        true
    }

    pub fn remove_route_path(&mut self, p1: Vec3, p2: Vec3) -> bool {
        if self.move_in_progress("remove_route_path") {
            return false;
        }
        let edge = RouteEdge::new(p1, p2);
        if !self.doc.routes.contains(&edge) {
            return false;
        }
        self.execute(EditCommand::RemoveRoutePath { edge });
        true
    }

    // Move gesture

    /// Lifts the objects at `positions` out of the current layer for previewing a move.
    /// Returns how many were captured.
    pub fn begin_move(&mut self, positions: &[Vec3]) -> usize {
        if self.capture.is_some() {
            log::error!(target: "edit", "begin_move called while a move is already in progress");
            return 0;
        }
        let index = self.current_layer;
        let Some(layer) = self.doc.layer_mut(index) else {
            return 0;
        };
        let mut capture = MoveCapture {
            layer: index,
            blocks: BlockGroup::new(layer.blocks.registry().clone()),
            models: Vec::new(),
        };
        for p in positions {
            if let Some(b) = layer.blocks.remove_block(*p) {
                capture.blocks.add_block(b);
            }
            if let Some(m) = layer.models.remove_model(*p) {
                capture.models.push(m);
            }
        }
        let count = capture.blocks.len() + capture.models.len();
        if count > 0 {
            self.capture = Some(capture);
        }
        count
    }

    #[inline]
    pub fn capture(&self) -> Option<&MoveCapture> {
        self.capture.as_ref()
    }

    /// Mutable so preview meshes can be rebuilt.
    #[inline]
    pub fn capture_mut(&mut self) -> Option<&mut MoveCapture> {
        self.capture.as_mut()
    }

    // Puts captured objects back where they were taken from and returns those that fit.
    // A cell filled behind the session's back keeps its occupant; the captured object is dropped.
    fn restore_capture(&mut self) -> Option<(Vec<Block>, Vec<Model>)> {
        let capture = self.capture.take()?;
        let Some(layer) = self.doc.layer_mut(capture.layer) else {
            log::error!(target: "edit", "captured layer {} no longer exists", capture.layer);
            return None;
        };
        let mut blocks = Vec::with_capacity(capture.blocks.len());
        for b in capture.blocks.all_blocks() {
            if layer.blocks.add_block(b.clone()) {
                blocks.push(b);
            } else {
                log::error!(target: "edit", "cell {:?} was filled during the move; dropping captured block", b.position());
            }
        }
        let mut models = Vec::with_capacity(capture.models.len());
        for m in capture.models {
            if layer.models.contains(m.position()) {
                log::error!(target: "edit", "cell {:?} was filled during the move; dropping captured model", m.position());
                continue;
            }
            layer.models.add_model(m.clone());
            models.push(m);
        }
        Some((blocks, models))
    }

    /// Ends the gesture by moving the captured objects by `delta` as one undo step.
    pub fn commit_move(&mut self, delta: Vec3) -> bool {
        let layer = match &self.capture {
            Some(c) => c.layer,
            None => return false,
        };
        let Some((blocks, models)) = self.restore_capture() else {
            return false;
        };
        self.current_layer = layer;
        self.push_move(blocks, models, delta)
    }

    pub fn cancel_move(&mut self) -> bool {
        self.restore_capture().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> EditSession {
        EditSession::new(Arc::new(ShapeRegistry::builtin().unwrap()))
    }

    fn cube(s: &EditSession, p: Vec3) -> Block {
        Block::new(p, Direction::Zplus, s.registry().find("cube").unwrap())
    }

    #[test]
    fn occupied_cell_does_not_record_history() {
        let mut s = session();
        assert!(s.add_block(cube(&s, Vec3::ZERO)));
        assert!(!s.add_block(cube(&s, Vec3::ZERO)));
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn paint_targets_the_local_slot() {
        let mut s = session();
        let mut b = cube(&s, Vec3::ZERO);
        b.set_direction(Direction::Xplus);
        s.add_block(b);
        assert!(s.paint_block(Vec3::ZERO, Some(Direction::Zplus), 4));
        assert!(!s.paint_block(Vec3::ZERO, Some(Direction::Zplus), 4));
        let painted = s.layer().unwrap().blocks.block(Vec3::ZERO).unwrap();
        assert_eq!(painted.texture_chip(painted.to_local(Direction::Zplus)), 4);
        s.undo();
        let restored = s.layer().unwrap().blocks.block(Vec3::ZERO).unwrap();
        assert_eq!(restored.texture_chips(), &[0; 7]);
    }

    #[test]
    fn rotate_rejects_vertical() {
        let mut s = session();
        s.add_block(cube(&s, Vec3::ZERO));
        assert!(!s.rotate_block(Vec3::ZERO, Direction::Yplus));
        assert!(s.rotate_block(Vec3::ZERO, Direction::Xminus));
        s.undo();
        let b = s.layer().unwrap().blocks.block(Vec3::ZERO).unwrap();
        assert_eq!(b.direction(), Direction::Zplus);
    }

    #[test]
    fn capture_commit_is_one_undo_step() {
        let mut s = session();
        s.add_block(cube(&s, Vec3::ZERO));
        s.add_block(cube(&s, Vec3::new(1.0, 0.0, 0.0)));
        let before = s.history().len();
        assert_eq!(s.begin_move(&[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)]), 2);
        assert!(s.layer().unwrap().blocks.is_empty());
        assert_eq!(s.capture().unwrap().blocks.len(), 2);
        assert!(s.commit_move(Vec3::new(0.0, 0.0, 2.0)));
        assert_eq!(s.history().len(), before + 1);
        assert!(s.layer().unwrap().blocks.contains(Vec3::new(1.0, 0.0, 2.0)));
        s.undo();
        assert!(s.layer().unwrap().blocks.contains(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn edits_and_history_wait_for_the_move() {
        let mut s = session();
        let mut b = cube(&s, Vec3::ZERO);
        b.set_direction(Direction::Xplus);
        s.add_block(b);
        assert_eq!(s.begin_move(&[Vec3::ZERO]), 1);
        assert!(!s.add_block(cube(&s, Vec3::ZERO)));
        assert!(!s.undo());
        assert!(!s.redo());
        assert_eq!(s.remove_blocks(&[Vec3::ZERO]), 0);
        assert!(s.commit_move(Vec3::new(1.0, 0.0, 0.0)));

        let blocks = &s.layer().unwrap().blocks;
        assert!(!blocks.contains(Vec3::ZERO));
        assert_eq!(blocks.block(Vec3::new(1.0, 0.0, 0.0)).unwrap().direction(), Direction::Xplus);
        assert_eq!(blocks.len(), 1);
        assert!(s.undo());
        let blocks = &s.layer().unwrap().blocks;
        assert_eq!(blocks.block(Vec3::ZERO).unwrap().direction(), Direction::Xplus);
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn filled_cell_keeps_its_occupant_on_commit() {
        let mut s = session();
        let mut b = cube(&s, Vec3::ZERO);
        b.set_direction(Direction::Xplus);
        s.add_block(b);
        s.begin_move(&[Vec3::ZERO]);
        let intruder = cube(&s, Vec3::ZERO);
        assert!(s.document_mut().layers[0].blocks.add_block(intruder));
        let before = s.history().len();
        assert!(!s.commit_move(Vec3::new(1.0, 0.0, 0.0)));
        assert!(s.capture().is_none());
        assert_eq!(s.history().len(), before);
        let blocks = &s.layer().unwrap().blocks;
        assert_eq!(blocks.block(Vec3::ZERO).unwrap().direction(), Direction::Zplus);
        assert!(!blocks.contains(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn cancel_move_restores_in_place() {
        let mut s = session();
        s.add_block(cube(&s, Vec3::ZERO));
        s.begin_move(&[Vec3::ZERO]);
        assert!(s.cancel_move());
        assert!(!s.cancel_move());
        assert!(s.layer().unwrap().blocks.contains(Vec3::ZERO));
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn removing_a_layer_clears_history() {
        let mut s = session();
        s.add_block(cube(&s, Vec3::ZERO));
        let roof = s.add_layer("roof");
        assert!(s.set_current_layer(roof));
        assert!(s.remove_layer(roof));
        assert_eq!(s.current_layer(), 0);
        assert!(!s.undo());
        assert!(!s.remove_layer(0));
        s.reset();
        assert_eq!(s.document().block_count(), 0);
    }
}
