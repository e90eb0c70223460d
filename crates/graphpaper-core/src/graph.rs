//! Graph document: layers, view state and undo history.

use crate::drawables::Drawable;
use crate::history::{Command, History};
use crate::layer::Layer;
use crate::render::GraphView;
use crate::tools::ToolKind;
use crate::view::ViewTransform;
use chrono::{DateTime, Utc};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Index errors from direct graph mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("layer index {index} out of range (graph has {len} layers)")]
    LayerOutOfRange { index: usize, len: usize },
    #[error("drawable index {index} out of range in layer {layer} ({len} drawables)")]
    DrawableOutOfRange { layer: usize, index: usize, len: usize },
}

/// Which way a command is being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Undo,
    Redo,
}

/// A named drawing document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    pub id: Uuid,
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// Set by every edit, cleared by the store on save.
    #[serde(skip)]
    pub dirty: bool,
    /// Layers, bottom to top.
    pub content: Vec<Layer>,
    /// Layer that receives newly drawn drawables.
    #[serde(default)]
    pub active_layer: usize,
    #[serde(default)]
    pub active_tool: ToolKind,
    #[serde(default)]
    pub view: ViewTransform,
    #[serde(skip)]
    history: History,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl Graph {
    /// Create a graph with a single empty layer.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created: now,
            modified: now,
            dirty: false,
            content: vec![Layer::new("Layer 1")],
            active_layer: 0,
            active_tool: ToolKind::default(),
            view: ViewTransform::default(),
            history: History::default(),
        }
    }

    /// Mark the graph as modified now.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
        self.dirty = true;
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.content.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.content.get_mut(index)
    }

    /// The layer new drawables go to, if it exists.
    pub fn active_layer(&self) -> Option<&Layer> {
        self.content.get(self.active_layer)
    }

    pub fn drawable(&self, layer: usize, index: usize) -> Option<&Drawable> {
        self.content.get(layer)?.get(index)
    }

    pub fn drawable_mut(&mut self, layer: usize, index: usize) -> Option<&mut Drawable> {
        self.content.get_mut(layer)?.get_mut(index)
    }

    /// Total number of drawables across layers.
    pub fn drawable_count(&self) -> usize {
        self.content.iter().map(Layer::len).sum()
    }

    /// Union of every drawable boundary.
    pub fn bounds(&self) -> Option<Rect> {
        self.content
            .iter()
            .filter_map(Layer::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    fn check_layer(&self, index: usize) -> Result<(), ModelError> {
        if index < self.content.len() {
            Ok(())
        } else {
            Err(ModelError::LayerOutOfRange {
                index,
                len: self.content.len(),
            })
        }
    }

    fn check_drawable(&self, layer: usize, index: usize, inserting: bool) -> Result<(), ModelError> {
        self.check_layer(layer)?;
        let len = self.content[layer].len();
        let in_range = if inserting { index <= len } else { index < len };
        if in_range {
            Ok(())
        } else {
            Err(ModelError::DrawableOutOfRange { layer, index, len })
        }
    }

    /// Insert a drawable at `index` (may equal the layer length).
    pub fn insert_drawable(&mut self, layer: usize, index: usize, drawable: Drawable) -> Result<(), ModelError> {
        self.check_drawable(layer, index, true)?;
        self.content[layer].drawables.insert(index, drawable);
        self.touch();
        Ok(())
    }

    pub fn remove_drawable(&mut self, layer: usize, index: usize) -> Result<Drawable, ModelError> {
        self.check_drawable(layer, index, false)?;
        let removed = self.content[layer].drawables.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Swap in `drawable` and return the one it replaced.
    pub fn replace_drawable(&mut self, layer: usize, index: usize, drawable: Drawable) -> Result<Drawable, ModelError> {
        self.check_drawable(layer, index, false)?;
        let previous = std::mem::replace(&mut self.content[layer].drawables[index], drawable);
        self.touch();
        Ok(previous)
    }

    /// Insert a layer at `index` (may equal the layer count).
    pub fn insert_layer(&mut self, index: usize, layer: Layer) -> Result<(), ModelError> {
        if index > self.content.len() {
            return Err(ModelError::LayerOutOfRange {
                index,
                len: self.content.len(),
            });
        }
        self.content.insert(index, layer);
        self.touch();
        Ok(())
    }

    pub fn remove_layer(&mut self, index: usize) -> Result<Layer, ModelError> {
        self.check_layer(index)?;
        let removed = self.content.remove(index);
        if self.active_layer >= self.content.len() {
            self.active_layer = self.content.len().saturating_sub(1);
        }
        self.touch();
        Ok(removed)
    }

    pub fn replace_layer(&mut self, index: usize, layer: Layer) -> Result<Layer, ModelError> {
        self.check_layer(index)?;
        let previous = std::mem::replace(&mut self.content[index], layer);
        self.touch();
        Ok(previous)
    }

    /// Record a command for an edit that has already been applied.
    pub fn commit(&mut self, command: Command) {
        log::debug!("Commit {:?}", command.kind());
        self.history.commit(command);
        self.touch();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Revert the most recent command.
    ///
    /// Returns false when there is nothing to undo or the command no longer
    /// fits the graph; in the latter case the stacks are left untouched.
    pub fn undo(&mut self, view: &mut dyn GraphView) -> bool {
        let Some(command) = self.history.pop_undo() else {
            return false;
        };
        match self.apply(&command, Direction::Undo, view) {
            Ok(()) => {
                log::debug!("Undo {:?}", command.kind());
                self.history.push_undone(command);
                true
            }
            Err(e) => {
                log::error!("Undo of {:?} skipped: {}", command.kind(), e);
                self.history.push_redone(command);
                false
            }
        }
    }

    /// Re-apply the most recently undone command.
    pub fn redo(&mut self, view: &mut dyn GraphView) -> bool {
        let Some(command) = self.history.pop_redo() else {
            return false;
        };
        match self.apply(&command, Direction::Redo, view) {
            Ok(()) => {
                log::debug!("Redo {:?}", command.kind());
                self.history.push_redone(command);
                true
            }
            Err(e) => {
                log::error!("Redo of {:?} skipped: {}", command.kind(), e);
                self.history.push_undone(command);
                false
            }
        }
    }

    /// Mutate the model for one command, then sync the view.
    /// Swap a snapshot in, keeping the selection stamp of the drawable it replaces.
    fn restore_drawable(&mut self, layer: usize, index: usize, snapshot: &Drawable) -> Result<(), ModelError> {
        let mut drawable = snapshot.copy();
        if let Some(existing) = self.drawable(layer, index) {
            drawable.info_mut().last_selected = existing.info().last_selected;
        }
        self.replace_drawable(layer, index, drawable)?;
        Ok(())
    }

    fn apply(&mut self, command: &Command, direction: Direction, view: &mut dyn GraphView) -> Result<(), ModelError> {
        use Direction::{Redo, Undo};

        match (command, direction) {
            (Command::NoOp, _) => {}
            (Command::CreateDrawable { layer, index, .. }, Undo)
            | (Command::DeleteDrawable { layer, index, .. }, Redo) => {
                self.remove_drawable(*layer, *index)?;
                view.drawable_removed(*layer, *index);
            }
            (Command::CreateDrawable { layer, index, drawable }, Redo)
            | (Command::DeleteDrawable { layer, index, previous: drawable }, Undo) => {
                self.insert_drawable(*layer, *index, drawable.copy())?;
                view.drawable_inserted(*layer, *index, drawable);
            }
            (Command::UpdateDrawable { layer, index, previous, .. }, Undo) => {
                self.restore_drawable(*layer, *index, previous)?;
                if let Some(drawable) = self.drawable(*layer, *index) {
                    view.drawable_updated(*layer, *index, drawable);
                }
            }
            (Command::UpdateDrawable { layer, index, current, .. }, Redo) => {
                self.restore_drawable(*layer, *index, current)?;
                if let Some(drawable) = self.drawable(*layer, *index) {
                    view.drawable_updated(*layer, *index, drawable);
                }
            }
            (Command::CreateLayer { index, .. }, Undo) | (Command::DeleteLayer { index, .. }, Redo) => {
                self.remove_layer(*index)?;
                view.layer_removed(*index);
            }
            (Command::CreateLayer { index, layer }, Redo)
            | (Command::DeleteLayer { index, previous: layer }, Undo) => {
                self.insert_layer(*index, layer.clone())?;
                view.layer_inserted(*index, layer);
            }
            (Command::UpdateLayer { index, previous, .. }, Undo) => {
                self.replace_layer(*index, previous.clone())?;
                view.layer_updated(*index, previous);
            }
            (Command::UpdateLayer { index, current, .. }, Redo) => {
                self.replace_layer(*index, current.clone())?;
                view.layer_updated(*index, current);
            }
        }
        Ok(())
    }

    /// Serialize the graph to JSON. History is not persisted.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a graph from JSON with empty history.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Listing entry for saved-graph browsers.
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            id: self.id,
            name: self.name.clone(),
            created: self.created,
            modified: self.modified,
            layer_count: self.content.len(),
            drawable_count: self.drawable_count(),
        }
    }
}

/// Lightweight description of a stored graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub id: Uuid,
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub layer_count: usize,
    pub drawable_count: usize,
}
