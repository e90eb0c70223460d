//! Tool system for the paper.
//!
//! Each tool is a [`ToolHandler`] strategy. Exactly one handler is active at
//! a time, chosen by the graph's `active_tool`. Handlers never keep a
//! reference to the graph: everything they may touch is lent to them per
//! call through a [`ToolContext`].

mod pan;
mod straight_line;
mod zoom;

pub use pan::PanTool;
pub use straight_line::StraightLineTool;
pub use zoom::ZoomTool;

use crate::config::EngineConfig;
use crate::graph::Graph;
use crate::history::Command;
use crate::paper::GesturePoint;
use crate::render::GraphView;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Pan,
    Zoom,
    StraightLine,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [ToolKind::Pan, ToolKind::Zoom, ToolKind::StraightLine];
}

/// Everything a handler may touch while handling one callback.
pub struct ToolContext<'a> {
    pub graph: &'a mut Graph,
    pub view: &'a mut dyn GraphView,
    pub config: &'a EngineConfig,
    /// Size of the paper on screen.
    pub viewport: Size,
    commands: &'a mut Vec<Command>,
}

impl<'a> ToolContext<'a> {
    pub fn new(
        graph: &'a mut Graph,
        view: &'a mut dyn GraphView,
        config: &'a EngineConfig,
        viewport: Size,
        commands: &'a mut Vec<Command>,
    ) -> Self {
        Self {
            graph,
            view,
            config,
            viewport,
            commands,
        }
    }

    /// Hand a finished edit to the history. It is committed once the
    /// current callback returns.
    pub fn emit(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Push the graph's view transform to the renderer.
    pub fn sync_view_transform(&mut self) {
        self.view.apply_view_transform(&self.graph.view);
    }
}

/// Strategy for one tool.
///
/// Cancellation must be idempotent and leave the graph exactly as it was
/// before the matching begin.
pub trait ToolHandler {
    fn kind(&self) -> ToolKind;

    fn on_tool_selected(&mut self, _ctx: &mut ToolContext<'_>) {}

    /// Deselecting discards any in-flight drag.
    fn on_tool_deselected(&mut self, ctx: &mut ToolContext<'_>) {
        self.on_paper_cancel_drag(ctx);
    }

    fn on_paper_begin_drag(&mut self, ctx: &mut ToolContext<'_>, point: GesturePoint);

    fn on_paper_drag(&mut self, ctx: &mut ToolContext<'_>, point: GesturePoint);

    fn on_paper_end_drag(&mut self, ctx: &mut ToolContext<'_>, point: GesturePoint);

    fn on_paper_cancel_drag(&mut self, ctx: &mut ToolContext<'_>);

    /// Whether a drag is in flight.
    fn is_dragging(&self) -> bool;

    /// Drop in-flight state without touching any graph (graph swapped out).
    fn reset(&mut self);
}

/// Registry mapping each tool to its handler.
pub type ToolRegistry = HashMap<ToolKind, Box<dyn ToolHandler>>;

/// One handler per built-in tool.
pub fn default_handlers() -> ToolRegistry {
    let handlers: [Box<dyn ToolHandler>; 3] = [
        Box::new(PanTool::new()),
        Box::new(ZoomTool::new()),
        Box::new(StraightLineTool::new()),
    ];
    handlers.into_iter().map(|h| (h.kind(), h)).collect()
}
