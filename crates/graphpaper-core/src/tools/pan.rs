//! Pan tool: drags the content around the paper.

use super::{ToolContext, ToolHandler, ToolKind};
use crate::paper::GesturePoint;
use kurbo::{Point, Vec2};

#[derive(Debug, Clone, Copy)]
struct PanDrag {
    begin_position: Vec2,
    begin_screen: Point,
}

/// Delta-based panning.
///
/// The content position is always derived from the position captured at
/// begin plus the total screen delta, so repeated drags never jump.
#[derive(Debug, Default)]
pub struct PanTool {
    drag: Option<PanDrag>,
}

impl PanTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn follow(&self, ctx: &mut ToolContext<'_>, point: GesturePoint) {
        let Some(drag) = self.drag else {
            return;
        };
        let delta = point.screen - drag.begin_screen;
        let scale = ctx.graph.view.scale;
        ctx.graph.view.position = drag.begin_position + delta * scale;
        ctx.sync_view_transform();
    }
}

impl ToolHandler for PanTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Pan
    }

    fn on_paper_begin_drag(&mut self, ctx: &mut ToolContext<'_>, point: GesturePoint) {
        self.drag = Some(PanDrag {
            begin_position: ctx.graph.view.position,
            begin_screen: point.screen,
        });
    }

    fn on_paper_drag(&mut self, ctx: &mut ToolContext<'_>, point: GesturePoint) {
        self.follow(ctx, point);
    }

    fn on_paper_end_drag(&mut self, ctx: &mut ToolContext<'_>, point: GesturePoint) {
        if self.drag.is_none() {
            return;
        }
        self.follow(ctx, point);
        self.drag = None;
        ctx.graph.touch();
    }

    fn on_paper_cancel_drag(&mut self, ctx: &mut ToolContext<'_>) {
        if let Some(drag) = self.drag.take() {
            ctx.graph.view.position = drag.begin_position;
            ctx.sync_view_transform();
        }
    }

    fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn reset(&mut self) {
        self.drag = None;
    }
}
