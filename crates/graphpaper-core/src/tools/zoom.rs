//! Zoom tool: vertical drag distance scales the content.

use super::{ToolContext, ToolHandler, ToolKind};
use crate::paper::GesturePoint;
use crate::view::ViewTransform;
use kurbo::Point;

#[derive(Debug, Clone, Copy)]
struct ZoomDrag {
    begin_view: ViewTransform,
    begin_content: Point,
    begin_screen: Point,
}

/// Pin-to-point zoom.
///
/// Dragging down by one full viewport height doubles the scale, dragging up
/// shrinks it. The content point under the initial touch stays put on
/// screen.
#[derive(Debug, Default)]
pub struct ZoomTool {
    drag: Option<ZoomDrag>,
}

impl ZoomTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn follow(&self, ctx: &mut ToolContext<'_>, point: GesturePoint) {
        let Some(drag) = self.drag else {
            return;
        };
        let height = ctx.viewport.height.max(1.0);
        let dy = (point.screen.y - drag.begin_screen.y) / height;
        let begin_scale = drag.begin_view.scale;
        let scale = ctx.config.clamp_zoom(begin_scale * (1.0 + dy));
        // Growth actually applied once the clamp is taken into account
        let applied = scale / begin_scale - 1.0;

        ctx.graph.view.scale = scale;
        ctx.graph.view.position = drag.begin_view.position - drag.begin_content.to_vec2() * (applied * begin_scale);
        ctx.sync_view_transform();
    }
}

impl ToolHandler for ZoomTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Zoom
    }

    fn on_paper_begin_drag(&mut self, ctx: &mut ToolContext<'_>, point: GesturePoint) {
        self.drag = Some(ZoomDrag {
            begin_view: ctx.graph.view,
            begin_content: point.content,
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
            ctx.graph.view = drag.begin_view;
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
