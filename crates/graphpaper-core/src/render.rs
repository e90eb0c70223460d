//! Renderer boundary.
//!
//! The engine never reads render state back. It tells the view what changed
//! after the model has been mutated, and the view redraws from the model
//! values it is handed.

use crate::drawables::Drawable;
use crate::graph::Graph;
use crate::layer::Layer;
use crate::view::ViewTransform;

/// Receiver for model changes that need to become visible.
///
/// Every method has a no-op default so views only implement what they draw.
pub trait GraphView {
    /// Rebuild everything from a freshly opened graph.
    fn load_graph(&mut self, _graph: &Graph) {}

    /// Drop every visual (graph closed).
    fn clear(&mut self) {}

    fn apply_view_transform(&mut self, _view: &ViewTransform) {}

    fn layer_inserted(&mut self, _index: usize, _layer: &Layer) {}

    fn layer_removed(&mut self, _index: usize) {}

    fn layer_updated(&mut self, _index: usize, _layer: &Layer) {}

    fn drawable_inserted(&mut self, _layer: usize, _index: usize, _drawable: &Drawable) {}

    fn drawable_removed(&mut self, _layer: usize, _index: usize) {}

    fn drawable_updated(&mut self, _layer: usize, _index: usize, _drawable: &Drawable) {}

    /// Show or refresh the in-flight drawable above every real layer.
    fn show_preview(&mut self, _drawable: &Drawable) {}

    /// Remove the in-flight drawable, if any.
    fn clear_preview(&mut self) {}
}

/// View that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl GraphView for NullView {}

/// A single call received by a [`RecordingView`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    LoadGraph { layers: usize },
    Clear,
    ViewTransform(ViewTransform),
    LayerInserted(usize),
    LayerRemoved(usize),
    LayerUpdated(usize),
    DrawableInserted { layer: usize, index: usize },
    DrawableRemoved { layer: usize, index: usize },
    DrawableUpdated { layer: usize, index: usize },
    ShowPreview(Drawable),
    ClearPreview,
}

/// View that records every call, for tests and headless replay.
#[derive(Debug, Default, Clone)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
    /// Drawable currently shown as preview.
    pub preview: Option<Drawable>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the recorded events, leaving the log empty.
    pub fn drain(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }
}

impl GraphView for RecordingView {
    fn load_graph(&mut self, graph: &Graph) {
        self.events.push(ViewEvent::LoadGraph {
            layers: graph.content.len(),
        });
    }

    fn clear(&mut self) {
        self.preview = None;
        self.events.push(ViewEvent::Clear);
    }

    fn apply_view_transform(&mut self, view: &ViewTransform) {
        self.events.push(ViewEvent::ViewTransform(*view));
    }

    fn layer_inserted(&mut self, index: usize, _layer: &Layer) {
        self.events.push(ViewEvent::LayerInserted(index));
    }

    fn layer_removed(&mut self, index: usize) {
        self.events.push(ViewEvent::LayerRemoved(index));
    }

    fn layer_updated(&mut self, index: usize, _layer: &Layer) {
        self.events.push(ViewEvent::LayerUpdated(index));
    }

    fn drawable_inserted(&mut self, layer: usize, index: usize, _drawable: &Drawable) {
        self.events.push(ViewEvent::DrawableInserted { layer, index });
    }

    fn drawable_removed(&mut self, layer: usize, index: usize) {
        self.events.push(ViewEvent::DrawableRemoved { layer, index });
    }

    fn drawable_updated(&mut self, layer: usize, index: usize, _drawable: &Drawable) {
        self.events.push(ViewEvent::DrawableUpdated { layer, index });
    }

    fn show_preview(&mut self, drawable: &Drawable) {
        self.preview = Some(drawable.clone());
        self.events.push(ViewEvent::ShowPreview(drawable.clone()));
    }

    fn clear_preview(&mut self) {
        self.preview = None;
        self.events.push(ViewEvent::ClearPreview);
    }
}
