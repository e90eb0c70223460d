//! Modification bracketing for in-place drawable edits.
//!
//! Any number of low-level mutations made between an outermost
//! `begin_modification` and its matching `end_modification` coalesce into a
//! single [`Command::UpdateDrawable`].

use crate::drawables::Drawable;
use crate::graph::Graph;
use crate::history::Command;
use crate::render::GraphView;

/// Snapshot copy without paper-only flags.
fn snapshot(drawable: &Drawable) -> Drawable {
    let mut copy = drawable.copy();
    let info = copy.info_mut();
    info.editing = false;
    info.selected = false;
    copy
}

/// Nesting counter plus "before" snapshot for one drawable.
#[derive(Debug, Clone)]
pub struct EditHandler {
    layer: usize,
    index: usize,
    depth: usize,
    before: Option<Drawable>,
}

impl EditHandler {
    pub fn new(layer: usize, index: usize) -> Self {
        Self {
            layer,
            index,
            depth: 0,
            before: None,
        }
    }

    /// `(layer, drawable)` indices of the edited drawable.
    pub fn target(&self) -> (usize, usize) {
        (self.layer, self.index)
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_modifying(&self) -> bool {
        self.depth > 0
    }

    /// Open a bracket. The outermost one captures the "before" snapshot.
    pub fn begin_modification(&mut self, graph: &Graph) {
        self.depth += 1;
        if self.depth == 1 {
            self.before = graph.drawable(self.layer, self.index).map(snapshot);
            if self.before.is_none() {
                log::warn!("Modification of missing drawable {}/{}", self.layer, self.index);
            }
        }
    }

    /// Close a bracket. Closing the outermost one yields the update command.
    ///
    /// Unbalanced calls are ignored.
    pub fn end_modification(&mut self, graph: &Graph) -> Option<Command> {
        if self.depth == 0 {
            log::debug!("end_modification without begin ignored");
            return None;
        }
        self.depth -= 1;
        if self.depth > 0 {
            return None;
        }
        let previous = self.before.take()?;
        let current = graph.drawable(self.layer, self.index).map(snapshot)?;
        Some(Command::UpdateDrawable {
            layer: self.layer,
            index: self.index,
            previous,
            current,
        })
    }

    /// Close a bracket without a command. Cancelling the outermost one puts
    /// the drawable back to its "before" snapshot.
    pub fn cancel_modification(&mut self, graph: &mut Graph, view: &mut dyn GraphView) {
        if self.depth == 0 {
            log::debug!("cancel_modification without begin ignored");
            return;
        }
        self.depth -= 1;
        if self.depth > 0 {
            return;
        }
        let Some(before) = self.before.take() else {
            return;
        };
        let Some(drawable) = graph.drawable_mut(self.layer, self.index) else {
            return;
        };
        if *drawable == before {
            return;
        }
        let (editing, selected) = (drawable.info().editing, drawable.info().selected);
        *drawable = before;
        drawable.info_mut().editing = editing;
        drawable.info_mut().selected = selected;
        view.drawable_updated(self.layer, self.index, drawable);
    }
}
