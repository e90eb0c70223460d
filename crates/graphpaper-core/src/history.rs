//! Reversible edit commands and the undo/redo stacks.

use crate::drawables::Drawable;
use crate::layer::Layer;
use serde::{Deserialize, Serialize};

/// Default number of commands kept in the undo stack.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Discriminant of a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    NoOp,
    CreateDrawable,
    UpdateDrawable,
    DeleteDrawable,
    CreateLayer,
    UpdateLayer,
    DeleteLayer,
}

/// One reversible edit.
///
/// Each variant carries exactly the indices and snapshots its kind needs.
/// Snapshots are owned copies, so later in-place edits to the graph never
/// reach a command that is already on a stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    NoOp,
    CreateDrawable {
        layer: usize,
        index: usize,
        drawable: Drawable,
    },
    UpdateDrawable {
        layer: usize,
        index: usize,
        previous: Drawable,
        current: Drawable,
    },
    DeleteDrawable {
        layer: usize,
        index: usize,
        previous: Drawable,
    },
    CreateLayer {
        index: usize,
        layer: Layer,
    },
    UpdateLayer {
        index: usize,
        previous: Layer,
        current: Layer,
    },
    DeleteLayer {
        index: usize,
        previous: Layer,
    },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::NoOp => CommandKind::NoOp,
            Command::CreateDrawable { .. } => CommandKind::CreateDrawable,
            Command::UpdateDrawable { .. } => CommandKind::UpdateDrawable,
            Command::DeleteDrawable { .. } => CommandKind::DeleteDrawable,
            Command::CreateLayer { .. } => CommandKind::CreateLayer,
            Command::UpdateLayer { .. } => CommandKind::UpdateLayer,
            Command::DeleteLayer { .. } => CommandKind::DeleteLayer,
        }
    }

    /// Layer the command touches, if any.
    pub fn layer_index(&self) -> Option<usize> {
        match self {
            Command::NoOp => None,
            Command::CreateDrawable { layer, .. }
            | Command::UpdateDrawable { layer, .. }
            | Command::DeleteDrawable { layer, .. } => Some(*layer),
            Command::CreateLayer { index, .. }
            | Command::UpdateLayer { index, .. }
            | Command::DeleteLayer { index, .. } => Some(*index),
        }
    }

    /// Drawable position inside the layer, for drawable commands only.
    pub fn drawable_index(&self) -> Option<usize> {
        match self {
            Command::CreateDrawable { index, .. }
            | Command::UpdateDrawable { index, .. }
            | Command::DeleteDrawable { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Drawable state restored by undo.
    pub fn previous_drawable(&self) -> Option<&Drawable> {
        match self {
            Command::UpdateDrawable { previous, .. } | Command::DeleteDrawable { previous, .. } => {
                Some(previous)
            }
            _ => None,
        }
    }

    /// Drawable state restored by redo.
    pub fn current_drawable(&self) -> Option<&Drawable> {
        match self {
            Command::CreateDrawable { drawable: current, .. }
            | Command::UpdateDrawable { current, .. } => Some(current),
            _ => None,
        }
    }

    /// Layer state restored by undo.
    pub fn previous_layer(&self) -> Option<&Layer> {
        match self {
            Command::UpdateLayer { previous, .. } | Command::DeleteLayer { previous, .. } => Some(previous),
            _ => None,
        }
    }

    /// Layer state restored by redo.
    pub fn current_layer(&self) -> Option<&Layer> {
        match self {
            Command::CreateLayer { layer: current, .. } | Command::UpdateLayer { current, .. } => Some(current),
            _ => None,
        }
    }
}

/// Linear undo/redo history.
///
/// Committing always clears the redo stack; there is no branching.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    max_len: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    /// Create an empty history keeping at most `max_len` undo steps.
    pub fn new(max_len: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_len: max_len.max(1),
        }
    }

    /// Change the undo depth, dropping the oldest commands if needed.
    pub fn set_max_len(&mut self, max_len: usize) {
        self.max_len = max_len.max(1);
        self.trim();
    }

    /// Push a new command and invalidate everything that could be redone.
    pub fn commit(&mut self, command: Command) {
        self.redo_stack.clear();
        self.undo_stack.push(command);
        self.trim();
    }

    fn trim(&mut self) {
        if self.undo_stack.len() > self.max_len {
            let excess = self.undo_stack.len() - self.max_len;
            self.undo_stack.drain(..excess);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Commands that can be undone, oldest first.
    pub fn undo_commands(&self) -> &[Command] {
        &self.undo_stack
    }

    /// Commands that can be redone, most recently undone last.
    pub fn redo_commands(&self) -> &[Command] {
        &self.redo_stack
    }

    pub(crate) fn pop_undo(&mut self) -> Option<Command> {
        self.undo_stack.pop()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<Command> {
        self.redo_stack.pop()
    }

    pub(crate) fn push_undone(&mut self, command: Command) {
        self.redo_stack.push(command);
    }

    pub(crate) fn push_redone(&mut self, command: Command) {
        self.undo_stack.push(command);
    }

    /// Drop all commands.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
