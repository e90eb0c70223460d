//! Straight line tool: drag out a new line segment.

use super::{ToolContext, ToolHandler, ToolKind};
use crate::drawables::{Drawable, LineStyle, StraightLine};
use crate::history::Command;
use crate::paper::GesturePoint;

/// Creates a [`StraightLine`] per drag.
///
/// While dragging, the line only exists as a preview above every layer.
/// It joins the active layer, and the history, on end-drag.
#[derive(Debug, Default)]
pub struct StraightLineTool {
    /// Style applied to new lines.
    pub style: LineStyle,
    preview: Option<StraightLine>,
}

impl StraightLineTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: LineStyle) -> Self {
        Self {
            style,
            preview: None,
        }
    }

    /// Line currently being dragged out, if any.
    pub fn preview(&self) -> Option<&StraightLine> {
        self.preview.as_ref()
    }

    fn show(&self, ctx: &mut ToolContext<'_>) {
        if let Some(line) = &self.preview {
            ctx.view.show_preview(&Drawable::StraightLine(line.clone()));
        }
    }
}

impl ToolHandler for StraightLineTool {
    fn kind(&self) -> ToolKind {
        ToolKind::StraightLine
    }

    fn on_paper_begin_drag(&mut self, ctx: &mut ToolContext<'_>, point: GesturePoint) {
        if self.preview.is_some() {
            self.on_paper_cancel_drag(ctx);
        }
        let mut line = StraightLine::new(point.content, point.content);
        line.style = self.style;
        self.preview = Some(line);
        self.show(ctx);
    }

    fn on_paper_drag(&mut self, ctx: &mut ToolContext<'_>, point: GesturePoint) {
        if let Some(line) = &mut self.preview {
            line.end = point.content;
            self.show(ctx);
        }
    }

    fn on_paper_end_drag(&mut self, ctx: &mut ToolContext<'_>, point: GesturePoint) {
        let Some(mut line) = self.preview.take() else {
            return;
        };
        ctx.view.clear_preview();

        line.end = point.content;
        line.recenter_pivot();

        let layer = ctx.graph.active_layer;
        let Some(index) = ctx.graph.layer(layer).map(|l| l.len()) else {
            log::warn!("No active layer {} to place the line on, discarding it", layer);
            return;
        };
        let drawable = Drawable::StraightLine(line);
        if let Err(e) = ctx.graph.insert_drawable(layer, index, drawable.copy()) {
            log::error!("Failed to place line: {}", e);
            return;
        }
        ctx.view.drawable_inserted(layer, index, &drawable);
        ctx.emit(Command::CreateDrawable { layer, index, drawable });
    }

    fn on_paper_cancel_drag(&mut self, ctx: &mut ToolContext<'_>) {
        if self.preview.take().is_some() {
            ctx.view.clear_preview();
        }
    }

    fn is_dragging(&self) -> bool {
        self.preview.is_some()
    }

    fn reset(&mut self) {
        self.preview = None;
    }
}
