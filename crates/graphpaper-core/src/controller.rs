//! Drawing controller: owns the open graph and routes paper gestures.
//!
//! Single drags go to the active tool, or to the line editor when they start
//! on a handle of the selected line. Double drags pan and pinch-zoom the
//! view, and taps select. Commands emitted along the way are committed to
//! the graph's history after the callback that produced them returns.

use crate::config::EngineConfig;
use crate::drawables::Drawable;
use crate::editor::{StraightLineEditor, hit_handle};
use crate::graph::{Graph, ModelError};
use crate::history::Command;
use crate::layer::Layer;
use crate::paper::{Gesture, GesturePoint, Paper, PaperState, PointerEvent};
use crate::render::{GraphView, NullView};
use crate::tools::{ToolContext, ToolHandler, ToolKind, ToolRegistry, default_handlers};
use crate::view::ViewTransform;
use kurbo::{Point, Size};
use std::time::Duration;

/// Default viewport until the host reports one.
pub const DEFAULT_VIEWPORT: Size = Size::new(800.0, 600.0);

/// Padding (screen pixels) kept around content by [`DrawingController::fit_to_content`].
pub const FIT_PADDING: f64 = 50.0;

/// Receiver of the current single drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DragRoute {
    #[default]
    Idle,
    Tool(ToolKind),
    Handle,
}

#[derive(Debug, Clone, Copy)]
struct Pinch {
    begin_view: ViewTransform,
    /// Content point under the initial midpoint of the two pointers.
    begin_mid_content: Point,
    begin_distance: f64,
}

/// Orchestrates paper, tools, editor and history for one open graph.
pub struct DrawingController<V: GraphView = NullView> {
    config: EngineConfig,
    paper: Paper,
    handlers: ToolRegistry,
    view: V,
    graph: Option<Graph>,
    viewport: Size,
    selection: Option<(usize, usize)>,
    editor: StraightLineEditor,
    route: DragRoute,
    pinch: Option<Pinch>,
    pending: Vec<Command>,
}

impl Default for DrawingController<NullView> {
    fn default() -> Self {
        Self::new(EngineConfig::default(), NullView)
    }
}

impl<V: GraphView> DrawingController<V> {
    /// Create a controller with the built-in tool handlers and no open graph.
    pub fn new(config: EngineConfig, view: V) -> Self {
        Self {
            paper: Paper::new(&config),
            config,
            handlers: default_handlers(),
            view,
            graph: None,
            viewport: DEFAULT_VIEWPORT,
            selection: None,
            editor: StraightLineEditor::new(),
            route: DragRoute::Idle,
            pinch: None,
            pending: Vec::new(),
        }
    }

    /// Install or replace the handler for its tool.
    pub fn register_handler(&mut self, handler: Box<dyn ToolHandler>) {
        let kind = handler.kind();
        if self.route == DragRoute::Tool(kind) {
            self.cancel_active_drag();
        }
        if let Some(mut old) = self.handlers.insert(kind, handler) {
            old.reset();
        }
        if self.active_tool() == Some(kind) {
            self.with_tool(kind, |h, ctx| h.on_tool_selected(ctx));
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> Option<&Graph> {
        self.graph.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn paper_state(&self) -> PaperState {
        self.paper.state()
    }

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.graph.as_ref().map(|g| g.active_tool)
    }

    /// `(layer, drawable)` of the selected drawable.
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    pub fn selected_drawable(&self) -> Option<&Drawable> {
        let (layer, index) = self.selection?;
        self.graph.as_ref()?.drawable(layer, index)
    }

    /// Whether a line edit session is collecting changes.
    pub fn is_editing(&self) -> bool {
        self.editor.is_session_open()
    }

    /// Open `graph`, closing and returning the previously open one.
    pub fn open_graph(&mut self, mut graph: Graph) -> Option<Graph> {
        let previous = self.close_graph();

        graph.history_mut().set_max_len(self.config.max_history);
        if graph.view.is_valid() {
            graph.view.scale = self.config.clamp_zoom(graph.view.scale);
        } else {
            log::warn!("Graph {} has an unusable view transform {:?}, resetting", graph.id, graph.view);
            graph.view = ViewTransform::default();
        }
        log::info!("Opening graph {} ({})", graph.name, graph.id);
        self.view.load_graph(&graph);
        self.view.apply_view_transform(&graph.view);
        let tool = graph.active_tool;
        self.graph = Some(graph);
        self.with_tool(tool, |h, ctx| h.on_tool_selected(ctx));
        previous
    }

    /// Detach the open graph and hand it back for saving.
    ///
    /// An open edit session is committed first. Nothing is saved here.
    pub fn close_graph(&mut self) -> Option<Graph> {
        if self.graph.is_none() {
            return None;
        }
        self.cancel_active_drag();
        self.clear_selection();
        if let Some(tool) = self.active_tool() {
            self.with_tool(tool, |h, ctx| h.on_tool_deselected(ctx));
        }
        for handler in self.handlers.values_mut() {
            handler.reset();
        }
        self.editor.reset();
        self.paper.reset();
        self.pinch = None;
        self.pending.clear();
        self.view.clear();

        let graph = self.graph.take()?;
        log::info!("Closed graph {} ({})", graph.name, graph.id);
        Some(graph)
    }

    /// Feed one pointer event through the paper and dispatch the gestures.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<Gesture> {
        let Some(graph) = self.graph.as_ref() else {
            log::debug!("Pointer event without an open graph ignored");
            return Vec::new();
        };
        let view = graph.view;
        let gestures = self.paper.handle(event, &view);
        for gesture in &gestures {
            self.dispatch(*gesture);
        }
        gestures
    }

    /// Let time pass without input (frame tick).
    pub fn tick(&mut self, now: Duration) -> Vec<Gesture> {
        let Some(graph) = self.graph.as_ref() else {
            return Vec::new();
        };
        let view = graph.view;
        let gestures = self.paper.tick(now, &view);
        for gesture in &gestures {
            self.dispatch(*gesture);
        }
        gestures
    }

    fn dispatch(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::BeginDrag(point) => self.begin_drag(point),
            Gesture::Drag(point) => match self.route {
                DragRoute::Tool(kind) => self.with_tool(kind, |h, ctx| h.on_paper_drag(ctx, point)),
                DragRoute::Handle => {
                    if let Some(graph) = self.graph.as_mut() {
                        self.editor.drag_handle(graph, &mut self.view, point.content);
                    }
                }
                DragRoute::Idle => {}
            },
            Gesture::EndDrag(point) => match std::mem::take(&mut self.route) {
                DragRoute::Tool(kind) => self.with_tool(kind, |h, ctx| h.on_paper_end_drag(ctx, point)),
                DragRoute::Handle => {
                    if let Some(graph) = self.graph.as_mut() {
                        if let Some(command) = self.editor.end_handle_drag(graph, &mut self.view, point.content) {
                            graph.commit(command);
                        }
                    }
                }
                DragRoute::Idle => {}
            },
            Gesture::CancelDrag => self.cancel_active_drag(),
            Gesture::BeginDoubleDrag(a, b) => self.begin_pinch(a, b),
            Gesture::DoubleDrag(a, b) => self.update_pinch(a, b),
            Gesture::EndDoubleDrag => {
                if self.pinch.take().is_some() {
                    if let Some(graph) = self.graph.as_mut() {
                        graph.touch();
                    }
                }
            }
            Gesture::Tap { point, count } => {
                log::debug!("Tap x{} at {:?}", count, point.content);
                self.select_at(point.content);
            }
        }
    }

    fn begin_drag(&mut self, point: GesturePoint) {
        if self.route != DragRoute::Idle {
            self.cancel_active_drag();
        }
        let Some(graph) = self.graph.as_mut() else {
            return;
        };

        if let Some(target) = self.selection {
            let tolerance = self.config.handle_tolerance / graph.view.scale;
            let handle = graph
                .drawable(target.0, target.1)
                .and_then(Drawable::as_straight_line)
                .and_then(|line| hit_handle(line, point.content, tolerance));
            if let Some(handle) = handle {
                log::debug!("Dragging {:?} handle of {}/{}", handle, target.0, target.1);
                if let Some(command) = self.editor.begin_handle_drag(graph, &mut self.view, target, handle) {
                    graph.commit(command);
                }
                if self.editor.is_dragging() {
                    self.route = DragRoute::Handle;
                }
                return;
            }
        }

        let tool = graph.active_tool;
        self.route = DragRoute::Tool(tool);
        self.with_tool(tool, |h, ctx| h.on_paper_begin_drag(ctx, point));
    }

    /// Cancel whatever the current single drag is driving.
    fn cancel_active_drag(&mut self) {
        match std::mem::take(&mut self.route) {
            DragRoute::Tool(kind) => self.with_tool(kind, |h, ctx| h.on_paper_cancel_drag(ctx)),
            DragRoute::Handle => {
                if let Some(graph) = self.graph.as_mut() {
                    self.editor.cancel_handle_drag(graph, &mut self.view);
                }
            }
            DragRoute::Idle => {}
        }
    }

    fn begin_pinch(&mut self, a: GesturePoint, b: GesturePoint) {
        let Some(graph) = self.graph.as_ref() else {
            return;
        };
        let mid = a.screen.midpoint(b.screen);
        self.pinch = Some(Pinch {
            begin_view: graph.view,
            begin_mid_content: graph.view.screen_to_content(mid),
            begin_distance: (a.screen - b.screen).hypot(),
        });
    }

    fn update_pinch(&mut self, a: GesturePoint, b: GesturePoint) {
        let (Some(pinch), Some(graph)) = (self.pinch, self.graph.as_mut()) else {
            return;
        };
        let mid = a.screen.midpoint(b.screen);
        let distance = (a.screen - b.screen).hypot();
        let scale = if pinch.begin_distance > f64::EPSILON {
            self.config.clamp_zoom(pinch.begin_view.scale * distance / pinch.begin_distance)
        } else {
            pinch.begin_view.scale
        };
        graph.view.scale = scale;
        graph.view.position = mid.to_vec2() - pinch.begin_mid_content.to_vec2() * scale;
        self.view.apply_view_transform(&graph.view);
    }

    /// Switch the active tool, cancelling any drag of the old one.
    pub fn set_tool(&mut self, tool: ToolKind) {
        let Some(current) = self.active_tool() else {
            return;
        };
        if current == tool {
            return;
        }
        self.cancel_active_drag();
        self.close_edit_session();
        self.with_tool(current, |h, ctx| h.on_tool_deselected(ctx));
        if let Some(graph) = self.graph.as_mut() {
            graph.active_tool = tool;
            graph.touch();
        }
        log::info!("Tool changed: {:?} -> {:?}", current, tool);
        self.with_tool(tool, |h, ctx| h.on_tool_selected(ctx));
    }

    pub fn can_undo(&self) -> bool {
        self.graph.as_ref().is_some_and(Graph::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.graph.as_ref().is_some_and(Graph::can_redo)
    }

    /// Undo the last command. An open edit session is committed first so
    /// it is what gets undone.
    pub fn undo(&mut self) -> bool {
        self.cancel_active_drag();
        self.clear_selection();
        let Some(graph) = self.graph.as_mut() else {
            return false;
        };
        graph.undo(&mut self.view)
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_active_drag();
        self.clear_selection();
        let Some(graph) = self.graph.as_mut() else {
            return false;
        };
        graph.redo(&mut self.view)
    }

    /// Select the top-most pickable drawable at `point` (content
    /// coordinates), or clear the selection when nothing is hit.
    pub fn select_at(&mut self, point: Point) -> Option<(usize, usize)> {
        self.clear_selection();
        let graph = self.graph.as_mut()?;
        let tolerance = self.config.click_threshold / graph.view.scale;
        let hit = graph.content.iter().enumerate().rev().find_map(|(layer, l)| {
            if !l.is_pickable() {
                return None;
            }
            l.drawable_at(point, tolerance).map(|index| (layer, index))
        });
        let (layer, index) = hit?;
        let drawable = graph.drawable_mut(layer, index)?;
        drawable.select();
        self.view.drawable_updated(layer, index, drawable);
        log::debug!("Selected {}/{}", layer, index);
        self.selection = Some((layer, index));
        self.selection
    }

    /// Drop the selection, committing any edit session on it.
    pub fn clear_selection(&mut self) {
        self.close_edit_session();
        let Some((layer, index)) = self.selection.take() else {
            return;
        };
        if let Some(graph) = self.graph.as_mut() {
            if let Some(drawable) = graph.drawable_mut(layer, index) {
                drawable.deselect();
                self.view.drawable_updated(layer, index, drawable);
            }
        }
    }

    /// Delete the selected drawable as an undoable step.
    pub fn delete_selected(&mut self) -> Result<bool, ModelError> {
        self.cancel_active_drag();
        self.close_edit_session();
        let Some((layer, index)) = self.selection.take() else {
            return Ok(false);
        };
        let Some(graph) = self.graph.as_mut() else {
            return Ok(false);
        };
        let mut previous = graph.remove_drawable(layer, index)?;
        previous.deselect();
        self.view.drawable_removed(layer, index);
        graph.commit(Command::DeleteDrawable { layer, index, previous });
        Ok(true)
    }

    /// Append a new layer on top, make it active and return its index.
    pub fn add_layer(&mut self, name: impl Into<String>) -> Option<usize> {
        self.cancel_active_drag();
        self.clear_selection();
        let graph = self.graph.as_mut()?;
        let index = graph.content.len();
        let layer = Layer::new(name);
        graph.insert_layer(index, layer.clone()).ok()?;
        graph.active_layer = index;
        self.view.layer_inserted(index, &layer);
        graph.commit(Command::CreateLayer { index, layer });
        Some(index)
    }

    pub fn delete_layer(&mut self, index: usize) -> Result<(), ModelError> {
        self.cancel_active_drag();
        self.clear_selection();
        let Some(graph) = self.graph.as_mut() else {
            return Ok(());
        };
        let previous = graph.remove_layer(index)?;
        self.view.layer_removed(index);
        graph.commit(Command::DeleteLayer { index, previous });
        Ok(())
    }

    /// Change layer properties through `update` as one undoable step.
    /// Leaving the layer unchanged records nothing.
    pub fn update_layer(&mut self, index: usize, update: impl FnOnce(&mut Layer)) -> Result<(), ModelError> {
        self.cancel_active_drag();
        self.clear_selection();
        let Some(graph) = self.graph.as_mut() else {
            return Ok(());
        };
        let len = graph.content.len();
        let previous = graph
            .layer(index)
            .cloned()
            .ok_or(ModelError::LayerOutOfRange { index, len })?;
        let mut current = previous.clone();
        update(&mut current);
        if current == previous {
            return Ok(());
        }
        graph.replace_layer(index, current.clone())?;
        self.view.layer_updated(index, &current);
        graph.commit(Command::UpdateLayer { index, previous, current });
        Ok(())
    }

    /// Choose the layer new drawables are placed on.
    pub fn set_active_layer(&mut self, index: usize) -> Result<(), ModelError> {
        let Some(graph) = self.graph.as_mut() else {
            return Ok(());
        };
        if index >= graph.content.len() {
            return Err(ModelError::LayerOutOfRange {
                index,
                len: graph.content.len(),
            });
        }
        graph.active_layer = index;
        Ok(())
    }

    /// Fit all content into the viewport.
    pub fn fit_to_content(&mut self) {
        let Some(graph) = self.graph.as_mut() else {
            return;
        };
        let Some(bounds) = graph.bounds() else {
            return;
        };
        graph.view.fit_to_bounds(
            bounds,
            self.viewport,
            FIT_PADDING,
            self.config.min_zoom,
            self.config.max_zoom,
        );
        graph.touch();
        self.view.apply_view_transform(&graph.view);
    }

    fn close_edit_session(&mut self) {
        let Some(graph) = self.graph.as_mut() else {
            self.editor.reset();
            return;
        };
        if let Some(command) = self.editor.close(graph, &mut self.view) {
            graph.commit(command);
        }
    }

    /// Run one handler callback, then commit whatever it emitted.
    fn with_tool(&mut self, kind: ToolKind, f: impl FnOnce(&mut dyn ToolHandler, &mut ToolContext<'_>)) {
        let Some(graph) = self.graph.as_mut() else {
            return;
        };
        let Some(handler) = self.handlers.get_mut(&kind) else {
            log::warn!("No handler registered for {:?}", kind);
            return;
        };
        let mut ctx = ToolContext::new(graph, &mut self.view, &self.config, self.viewport, &mut self.pending);
        f(handler.as_mut(), &mut ctx);

        for command in self.pending.drain(..) {
            graph.commit(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawables::StraightLine;
    use crate::history::CommandKind;
    use crate::paper::PointerPhase;
    use crate::render::{RecordingView, ViewEvent};
    use kurbo::Vec2;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn ev(id: u64, phase: PointerPhase, x: f64, y: f64, t: u64) -> PointerEvent {
        PointerEvent::new(id, phase, Point::new(x, y), ms(t))
    }

    fn controller() -> DrawingController<RecordingView> {
        let mut c = DrawingController::new(EngineConfig::default(), RecordingView::new());
        c.open_graph(Graph::new("test"));
        c
    }

    fn drag(c: &mut DrawingController<RecordingView>, from: (f64, f64), to: (f64, f64), t: u64) {
        c.handle_pointer(ev(1, PointerPhase::Down, from.0, from.1, t));
        c.handle_pointer(ev(1, PointerPhase::Move, to.0, to.1, t + 200));
        c.handle_pointer(ev(1, PointerPhase::Up, to.0, to.1, t + 250));
    }

    fn tap(c: &mut DrawingController<RecordingView>, x: f64, y: f64, t: u64) {
        c.handle_pointer(ev(1, PointerPhase::Down, x, y, t));
        c.handle_pointer(ev(1, PointerPhase::Up, x, y, t + 50));
    }

    fn line_at(c: &DrawingController<RecordingView>, layer: usize, index: usize) -> StraightLine {
        c.graph()
            .and_then(|g| g.drawable(layer, index))
            .and_then(Drawable::as_straight_line)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_open_graph_loads_view_and_tool() {
        let mut graph = Graph::new("g");
        graph.view.scale = 3.0;
        graph.active_tool = ToolKind::Zoom;
        let mut c = DrawingController::new(EngineConfig::default(), RecordingView::new());
        assert!(c.open_graph(graph).is_none());

        let events = c.view_mut().drain();
        assert_eq!(events[0], ViewEvent::LoadGraph { layers: 1 });
        assert!(matches!(events[1], ViewEvent::ViewTransform(v) if (v.scale - 3.0).abs() < f64::EPSILON));
        assert_eq!(c.active_tool(), Some(ToolKind::Zoom));
    }

    #[test]
    fn test_open_graph_repairs_view_transform() {
        for scale in [0.0, -1.0, f64::NAN] {
            let mut graph = Graph::new("g");
            graph.view.scale = scale;
            graph.view.position = Vec2::new(30.0, 40.0);
            let mut c = DrawingController::new(EngineConfig::default(), RecordingView::new());
            c.open_graph(graph);
            assert_eq!(c.graph().unwrap().view, ViewTransform::default());

            c.set_tool(ToolKind::StraightLine);
            drag(&mut c, (0.0, 0.0), (10.0, 0.0), 0);
            assert_eq!(line_at(&c, 0, 0).start, Point::new(0.0, 0.0));
            assert_eq!(line_at(&c, 0, 0).end, Point::new(10.0, 0.0));
        }

        let mut graph = Graph::new("g");
        graph.view.scale = 1.0e6;
        let mut c = DrawingController::new(EngineConfig::default(), RecordingView::new());
        c.open_graph(graph);
        assert_eq!(c.graph().unwrap().view.scale, c.config().max_zoom);
    }

    #[test]
    fn test_open_graph_returns_previous() {
        let mut c = controller();
        let previous = c.open_graph(Graph::new("second"));
        assert_eq!(previous.map(|g| g.name), Some("test".to_string()));
        assert_eq!(c.graph().map(|g| g.name.as_str()), Some("second"));
    }

    #[test]
    fn test_line_drag_commits_after_end() {
        let mut c = controller();
        c.set_tool(ToolKind::StraightLine);
        c.handle_pointer(ev(1, PointerPhase::Down, 0.0, 0.0, 0));
        c.handle_pointer(ev(1, PointerPhase::Move, 5.0, 5.0, 150));
        assert!(!c.can_undo());
        c.handle_pointer(ev(1, PointerPhase::Up, 10.0, 0.0, 200));
        assert!(c.can_undo());
        assert_eq!(line_at(&c, 0, 0).end, Point::new(10.0, 0.0));
    }

    #[test]
    fn test_second_pointer_cancels_preview_and_pinches() {
        let mut c = controller();
        c.set_tool(ToolKind::StraightLine);
        c.handle_pointer(ev(1, PointerPhase::Down, 100.0, 100.0, 0));
        c.handle_pointer(ev(1, PointerPhase::Move, 120.0, 100.0, 20));
        assert!(c.view().preview.is_some());
        c.handle_pointer(ev(2, PointerPhase::Down, 200.0, 100.0, 50));

        assert!(c.view().preview.is_none());
        assert_eq!(c.paper_state(), PaperState::DoubleDragActive);

        // Spread the fingers to twice the distance around the same midpoint.
        c.handle_pointer(ev(2, PointerPhase::Move, 240.0, 100.0, 80));
        c.handle_pointer(ev(1, PointerPhase::Move, 80.0, 100.0, 90));
        let view = c.graph().unwrap().view;
        assert!((view.scale - 2.0).abs() < 1e-9);
        let mid = view.content_to_screen(Point::new(160.0, 100.0));
        assert!((mid.x - 160.0).abs() < 1e-9);
        assert!((mid.y - 100.0).abs() < 1e-9);

        c.handle_pointer(ev(1, PointerPhase::Up, 80.0, 100.0, 100));
        c.handle_pointer(ev(2, PointerPhase::Up, 240.0, 100.0, 110));
        assert!(c.graph().unwrap().content[0].is_empty());
        assert!(!c.can_undo());
        assert_eq!(c.paper_state(), PaperState::Idle);
    }

    #[test]
    fn test_pinch_scale_is_clamped() {
        let config = EngineConfig {
            max_zoom: 1.5,
            ..EngineConfig::default()
        };
        let mut c = DrawingController::new(config, RecordingView::new());
        c.open_graph(Graph::new("g"));
        c.handle_pointer(ev(1, PointerPhase::Down, 0.0, 0.0, 0));
        c.handle_pointer(ev(2, PointerPhase::Down, 10.0, 0.0, 10));
        c.handle_pointer(ev(2, PointerPhase::Move, 100.0, 0.0, 20));
        assert!((c.graph().unwrap().view.scale - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_tool_cancels_in_flight_drag() {
        let mut c = controller();
        c.set_tool(ToolKind::Pan);
        c.set_tool(ToolKind::StraightLine);
        c.handle_pointer(ev(1, PointerPhase::Down, 0.0, 0.0, 0));
        c.handle_pointer(ev(1, PointerPhase::Move, 40.0, 0.0, 200));
        c.set_tool(ToolKind::Pan);
        assert!(c.view().preview.is_none());

        c.handle_pointer(ev(1, PointerPhase::Move, 80.0, 0.0, 220));
        c.handle_pointer(ev(1, PointerPhase::Up, 80.0, 0.0, 240));
        assert!(c.graph().unwrap().content[0].is_empty());
        assert_eq!(c.graph().unwrap().view.position, Vec2::ZERO);
    }

    #[test]
    fn test_tap_selects_top_most_and_clears_on_empty() {
        let mut c = controller();
        c.set_tool(ToolKind::StraightLine);
        drag(&mut c, (0.0, 0.0), (100.0, 0.0), 0);
        drag(&mut c, (50.0, -50.0), (50.0, 50.0), 1000);

        tap(&mut c, 50.0, 0.0, 2000);
        assert_eq!(c.selection(), Some((0, 1)));
        assert!(c.selected_drawable().unwrap().info().selected);
        assert!(c.selected_drawable().unwrap().info().last_selected.is_some());

        tap(&mut c, 300.0, 300.0, 3000);
        assert_eq!(c.selection(), None);
        assert!(!c.graph().unwrap().content[0].drawables[1].info().selected);
    }

    #[test]
    fn test_tap_skips_hidden_layers() {
        let mut c = controller();
        c.set_tool(ToolKind::StraightLine);
        drag(&mut c, (0.0, 0.0), (100.0, 0.0), 0);
        c.add_layer("top");
        drag(&mut c, (0.0, 0.0), (100.0, 0.0), 1000);
        c.update_layer(1, |l| l.visible = false).unwrap();

        tap(&mut c, 50.0, 0.0, 2000);
        assert_eq!(c.selection(), Some((0, 0)));
    }

    #[test]
    fn test_handle_drags_form_one_edit_session() {
        let mut c = controller();
        c.set_tool(ToolKind::StraightLine);
        drag(&mut c, (0.0, 0.0), (100.0, 0.0), 0);
        tap(&mut c, 50.0, 0.0, 1000);
        assert_eq!(c.selection(), Some((0, 0)));

        drag(&mut c, (100.0, 0.0), (100.0, 50.0), 2000);
        drag(&mut c, (0.0, 0.0), (0.0, 50.0), 3000);
        assert!(c.is_editing());
        assert_eq!(c.graph().unwrap().history().undo_commands().len(), 1);
        assert_eq!(c.graph().unwrap().content[0].len(), 1);

        c.clear_selection();
        let history = c.graph().unwrap().history().undo_commands();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].kind(), CommandKind::UpdateDrawable);
        assert_eq!(line_at(&c, 0, 0).start, Point::new(0.0, 50.0));
        assert_eq!(line_at(&c, 0, 0).end, Point::new(100.0, 50.0));

        assert!(c.undo());
        assert_eq!(line_at(&c, 0, 0).start, Point::ZERO);
        assert_eq!(line_at(&c, 0, 0).end, Point::new(100.0, 0.0));
    }

    #[test]
    fn test_undo_closes_open_session_first() {
        let mut c = controller();
        c.set_tool(ToolKind::StraightLine);
        drag(&mut c, (0.0, 0.0), (100.0, 0.0), 0);
        tap(&mut c, 50.0, 0.0, 1000);
        drag(&mut c, (100.0, 0.0), (100.0, 50.0), 2000);

        assert!(c.undo());
        assert!(!c.is_editing());
        assert_eq!(line_at(&c, 0, 0).end, Point::new(100.0, 0.0));
        assert!(c.undo());
        assert!(c.graph().unwrap().content[0].is_empty());
    }

    #[test]
    fn test_delete_selected_is_undoable() {
        let mut c = controller();
        c.set_tool(ToolKind::StraightLine);
        drag(&mut c, (0.0, 0.0), (100.0, 0.0), 0);
        tap(&mut c, 50.0, 0.0, 1000);
        let before = c.graph().unwrap().content.clone();

        assert_eq!(c.delete_selected(), Ok(true));
        assert!(c.graph().unwrap().content[0].is_empty());
        assert_eq!(c.delete_selected(), Ok(false));

        assert!(c.undo());
        assert_eq!(c.graph().unwrap().content, before);
        assert!(!c.graph().unwrap().content[0].drawables[0].info().selected);
    }

    #[test]
    fn test_layer_operations_are_undoable() {
        let mut c = controller();
        assert_eq!(c.add_layer("Layer 2"), Some(1));
        assert_eq!(c.graph().unwrap().active_layer, 1);
        c.update_layer(1, |l| l.set_opacity(0.5)).unwrap();
        c.update_layer(1, |l| l.set_opacity(0.5)).unwrap();
        c.delete_layer(0).unwrap();
        assert_eq!(c.graph().unwrap().history().undo_commands().len(), 3);
        assert_eq!(c.graph().unwrap().content.len(), 1);

        assert!(c.undo());
        assert_eq!(c.graph().unwrap().content[0].name, "Layer 1");
        assert!(c.undo());
        assert!((c.graph().unwrap().content[1].opacity() - 1.0).abs() < f64::EPSILON);
        assert!(c.undo());
        assert_eq!(c.graph().unwrap().content.len(), 1);

        assert_eq!(c.delete_layer(5), Err(ModelError::LayerOutOfRange { index: 5, len: 1 }));
        assert!(c.set_active_layer(3).is_err());
    }

    #[test]
    fn test_lines_go_to_active_layer() {
        let mut c = controller();
        c.add_layer("Layer 2");
        c.set_active_layer(0).unwrap();
        c.set_tool(ToolKind::StraightLine);
        drag(&mut c, (0.0, 0.0), (10.0, 0.0), 0);
        assert_eq!(c.graph().unwrap().content[0].len(), 1);
        assert!(c.graph().unwrap().content[1].is_empty());
    }

    #[test]
    fn test_close_graph_commits_session_and_clears_view() {
        let mut c = controller();
        c.set_tool(ToolKind::StraightLine);
        drag(&mut c, (0.0, 0.0), (100.0, 0.0), 0);
        tap(&mut c, 50.0, 0.0, 1000);
        drag(&mut c, (100.0, 0.0), (100.0, 50.0), 2000);

        let graph = c.close_graph().unwrap();
        assert_eq!(graph.history().undo_commands().len(), 2);
        assert!(!graph.content[0].drawables[0].info().selected);
        assert!(!graph.content[0].drawables[0].info().editing);
        assert_eq!(c.view().events.last(), Some(&ViewEvent::Clear));
        assert!(c.graph().is_none());
        assert!(c.close_graph().is_none());
        assert!(c.handle_pointer(ev(1, PointerPhase::Down, 0.0, 0.0, 5000)).is_empty());
    }

    #[test]
    fn test_fit_to_content_frames_bounds() {
        let mut c = controller();
        c.set_tool(ToolKind::StraightLine);
        drag(&mut c, (0.0, 0.0), (100.0, 100.0), 0);
        c.fit_to_content();
        let view = c.graph().unwrap().view;
        let origin = view.content_to_screen(Point::ZERO);
        let corner = view.content_to_screen(Point::new(100.0, 100.0));
        assert!(origin.x >= FIT_PADDING - 1e-9 && origin.y >= FIT_PADDING - 1e-9);
        assert!(corner.x <= DEFAULT_VIEWPORT.width - FIT_PADDING + 1e-9);
        assert!(corner.y <= DEFAULT_VIEWPORT.height - FIT_PADDING + 1e-9);
    }
}
