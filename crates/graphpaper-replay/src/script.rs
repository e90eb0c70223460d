//! Replay scripts: recorded input for the drawing engine.

use anyhow::{Context, Result};
use graphpaper_core::{
    DrawingController, Drawable, EngineConfig, Graph, GraphView, Layer, PointerEvent, PointerPhase, ToolKind,
    ViewTransform,
};
use kurbo::{Point, Size};
use serde::Deserialize;
use std::time::Duration;

/// A whole replay: optional engine config, paper size and ordered steps.
#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default)]
    pub viewport: Option<Size>,
    pub steps: Vec<Step>,
}

/// One pointer sample. `t` is in seconds since the start of the replay.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointerStep {
    pub id: u64,
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
    pub t: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Pointer(PointerStep),
    Tool(ToolKind),
    Undo,
    Redo,
    /// Frame tick at the given time in seconds.
    Tick(f64),
    AddLayer(String),
    DeleteLayer(usize),
    ActiveLayer(usize),
    DeleteSelected,
    Fit,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self> {
        let script: Self = serde_json::from_str(json).context("Invalid replay script")?;
        if let Some(config) = &script.config {
            config.validate().context("Invalid engine config in replay script")?;
        }
        Ok(script)
    }
}

fn seconds(t: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(t).with_context(|| format!("Invalid timestamp {}", t))
}

/// Renderer stand-in that logs what a real view would redraw.
#[derive(Debug, Default)]
pub struct LogView;

impl GraphView for LogView {
    fn load_graph(&mut self, graph: &Graph) {
        log::info!("view: load {} ({} layers)", graph.name, graph.content.len());
    }

    fn clear(&mut self) {
        log::info!("view: clear");
    }

    fn apply_view_transform(&mut self, view: &ViewTransform) {
        log::debug!("view: transform {:?} x{}", view.position, view.scale);
    }

    fn layer_inserted(&mut self, index: usize, layer: &Layer) {
        log::info!("view: layer {} inserted ({})", index, layer.name);
    }

    fn layer_removed(&mut self, index: usize) {
        log::info!("view: layer {} removed", index);
    }

    fn layer_updated(&mut self, index: usize, layer: &Layer) {
        log::info!("view: layer {} updated ({})", index, layer.name);
    }

    fn drawable_inserted(&mut self, layer: usize, index: usize, drawable: &Drawable) {
        log::info!("view: drawable {}/{} inserted {:?}", layer, index, drawable.points());
    }

    fn drawable_removed(&mut self, layer: usize, index: usize) {
        log::info!("view: drawable {}/{} removed", layer, index);
    }

    fn drawable_updated(&mut self, layer: usize, index: usize, drawable: &Drawable) {
        log::debug!("view: drawable {}/{} updated {:?}", layer, index, drawable.points());
    }

    fn show_preview(&mut self, drawable: &Drawable) {
        log::trace!("view: preview {:?}", drawable.points());
    }

    fn clear_preview(&mut self) {
        log::trace!("view: preview cleared");
    }
}

/// Drive a fresh graph through every step and return it closed.
pub fn run<V: GraphView>(script: &Script, view: V) -> Result<Graph> {
    let config = script.config.clone().unwrap_or_default();
    let mut controller = DrawingController::new(config, view);
    if let Some(viewport) = script.viewport {
        controller.set_viewport(viewport);
    }
    controller.open_graph(Graph::new(script.name.as_deref().unwrap_or("Replay")));

    for (i, step) in script.steps.iter().enumerate() {
        match step {
            Step::Pointer(p) => {
                let event = PointerEvent::new(p.id, p.phase, Point::new(p.x, p.y), seconds(p.t)?);
                let gestures = controller.handle_pointer(event);
                log::debug!("step {}: {:?} -> {:?}", i, p.phase, gestures);
            }
            Step::Tool(tool) => controller.set_tool(*tool),
            Step::Undo => {
                if !controller.undo() {
                    log::warn!("step {}: nothing to undo", i);
                }
            }
            Step::Redo => {
                if !controller.redo() {
                    log::warn!("step {}: nothing to redo", i);
                }
            }
            Step::Tick(t) => {
                controller.tick(seconds(*t)?);
            }
            Step::AddLayer(name) => {
                controller.add_layer(name.as_str());
            }
            Step::DeleteLayer(index) => controller
                .delete_layer(*index)
                .with_context(|| format!("step {}: delete layer", i))?,
            Step::ActiveLayer(index) => controller
                .set_active_layer(*index)
                .with_context(|| format!("step {}: set active layer", i))?,
            Step::DeleteSelected => {
                controller
                    .delete_selected()
                    .with_context(|| format!("step {}: delete selection", i))?;
            }
            Step::Fit => controller.fit_to_content(),
        }
    }

    controller.close_graph().context("Graph was not open at the end of the replay")
}
