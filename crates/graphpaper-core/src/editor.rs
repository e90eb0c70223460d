//! Endpoint editing for a selected straight line.
//!
//! A session covers every handle drag made while the same line stays
//! selected. The first drag opens an outer modification bracket and each
//! drag nests its own, so the whole session lands in history as one
//! [`Command::UpdateDrawable`] when it is closed.

use crate::drawables::{Drawable, StraightLine};
use crate::edit::EditHandler;
use crate::graph::Graph;
use crate::history::Command;
use crate::render::GraphView;
use kurbo::Point;

/// Draggable endpoint of a straight line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineHandle {
    Start,
    End,
}

impl LineHandle {
    pub fn position(self, line: &StraightLine) -> Point {
        match self {
            LineHandle::Start => line.start,
            LineHandle::End => line.end,
        }
    }

    fn set(self, line: &mut StraightLine, point: Point) {
        match self {
            LineHandle::Start => line.start = point,
            LineHandle::End => line.end = point,
        }
    }
}

/// Handles of a line with their positions in content coordinates.
pub fn line_handles(line: &StraightLine) -> [(LineHandle, Point); 2] {
    [(LineHandle::Start, line.start), (LineHandle::End, line.end)]
}

/// Handle of `line` within `tolerance` (content units) of `point`, nearest first.
pub fn hit_handle(line: &StraightLine, point: Point, tolerance: f64) -> Option<LineHandle> {
    line_handles(line)
        .into_iter()
        .map(|(handle, pos)| (handle, (pos - point).hypot()))
        .filter(|(_, dist)| *dist <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(handle, _)| handle)
}

#[derive(Debug, Clone, Copy)]
struct HandleDrag {
    handle: LineHandle,
    /// Handle position and pivot when the drag began.
    origin: Point,
    pivot: Point,
}

/// Editor state for one straight line at a time.
#[derive(Debug, Default)]
pub struct StraightLineEditor {
    session: Option<EditHandler>,
    drag: Option<HandleDrag>,
}

impl StraightLineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(layer, drawable)` of the line being edited, if a session is open.
    pub fn target(&self) -> Option<(usize, usize)> {
        self.session.as_ref().map(EditHandler::target)
    }

    pub fn is_session_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn active_handle(&self) -> Option<LineHandle> {
        self.drag.map(|d| d.handle)
    }

    /// Start dragging `handle` of the line at `target`.
    ///
    /// A session open on another line is closed first; its command, if any,
    /// is returned.
    pub fn begin_handle_drag(
        &mut self,
        graph: &mut Graph,
        view: &mut dyn GraphView,
        target: (usize, usize),
        handle: LineHandle,
    ) -> Option<Command> {
        let mut closed = None;
        if self.target().is_some_and(|t| t != target) {
            closed = self.close(graph, view);
        }
        if self.drag.is_some() {
            self.cancel_handle_drag(graph, view);
        }

        let (layer, index) = target;
        let Some(line) = graph.drawable(layer, index).and_then(Drawable::as_straight_line) else {
            log::warn!("No straight line at {}/{} to edit", layer, index);
            return closed;
        };
        let drag = HandleDrag {
            handle,
            origin: handle.position(line),
            pivot: line.info.pivot,
        };

        let session = self.session.get_or_insert_with(|| {
            log::debug!("Edit session opened on {}/{}", layer, index);
            EditHandler::new(layer, index)
        });
        if !session.is_modifying() {
            session.begin_modification(graph);
            if let Some(drawable) = graph.drawable_mut(layer, index) {
                drawable.info_mut().editing = true;
            }
        }
        session.begin_modification(graph);
        self.drag = Some(drag);
        closed
    }

    /// Move the dragged handle to `point` (content coordinates).
    pub fn drag_handle(&mut self, graph: &mut Graph, view: &mut dyn GraphView, point: Point) {
        let (Some(drag), Some((layer, index))) = (self.drag, self.target()) else {
            return;
        };
        let Some(drawable) = graph.drawable_mut(layer, index) else {
            return;
        };
        if let Some(line) = drawable.as_straight_line_mut() {
            drag.handle.set(line, point);
            line.recenter_pivot();
        }
        view.drawable_updated(layer, index, drawable);
    }

    /// Finish the handle drag. The session stays open.
    pub fn end_handle_drag(&mut self, graph: &mut Graph, view: &mut dyn GraphView, point: Point) -> Option<Command> {
        if self.drag.is_none() {
            return None;
        }
        self.drag_handle(graph, view, point);
        self.drag = None;
        self.session.as_mut()?.end_modification(graph)
    }

    /// Put the dragged handle back where it was. The session stays open.
    pub fn cancel_handle_drag(&mut self, graph: &mut Graph, view: &mut dyn GraphView) {
        let (Some(drag), Some((layer, index))) = (self.drag.take(), self.target()) else {
            return;
        };
        if let Some(drawable) = graph.drawable_mut(layer, index) {
            if let Some(line) = drawable.as_straight_line_mut() {
                drag.handle.set(line, drag.origin);
                line.info.pivot = drag.pivot;
            }
            view.drawable_updated(layer, index, drawable);
        }
        if let Some(session) = self.session.as_mut() {
            session.cancel_modification(graph, view);
        }
    }

    /// Close the session and return its command.
    ///
    /// A session whose drags were all cancelled yields nothing.
    pub fn close(&mut self, graph: &mut Graph, view: &mut dyn GraphView) -> Option<Command> {
        if self.drag.is_some() {
            self.cancel_handle_drag(graph, view);
        }
        let mut session = self.session.take()?;
        let (layer, index) = session.target();
        log::debug!("Edit session on {}/{} closed", layer, index);
        if let Some(drawable) = graph.drawable_mut(layer, index) {
            drawable.info_mut().editing = false;
            view.drawable_updated(layer, index, drawable);
        }
        let command = session.end_modification(graph)?;
        if command.previous_drawable() == command.current_drawable() {
            return None;
        }
        Some(command)
    }

    /// Forget the session without touching any graph.
    pub fn reset(&mut self) {
        self.session = None;
        self.drag = None;
    }
}
