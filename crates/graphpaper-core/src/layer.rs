//! Layers: ordered stacks of drawables.

use crate::drawables::Drawable;
use kurbo::{Point, Rect};
use serde::{Deserialize, Deserializer, Serialize};

/// An ordered, independently displayed stack of drawables.
///
/// Order is z-order: later drawables render and hit-test on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(deserialize_with = "deserialize_opacity")]
    opacity: f64,
    pub visible: bool,
    /// Whether drawables on this layer can be selected from the paper.
    pub interactive: bool,
    pub drawables: Vec<Drawable>,
}

fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        1.0
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

fn deserialize_opacity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    f64::deserialize(deserializer).map(clamp_opacity)
}

impl Default for Layer {
    fn default() -> Self {
        Self::new("Layer")
    }
}

impl Layer {
    /// Create an empty, visible, interactive layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            opacity: 1.0,
            visible: true,
            interactive: true,
            drawables: Vec::new(),
        }
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Set opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = clamp_opacity(opacity);
    }

    /// Append a drawable on top and return its index.
    pub fn push(&mut self, drawable: Drawable) -> usize {
        self.drawables.push(drawable);
        self.drawables.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Drawable> {
        self.drawables.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Drawable> {
        self.drawables.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    /// Whether taps on the paper may pick drawables from this layer.
    pub fn is_pickable(&self) -> bool {
        self.visible && self.interactive
    }

    /// Index of the top-most drawable hit at `point`.
    pub fn drawable_at(&self, point: Point, tolerance: f64) -> Option<usize> {
        self.drawables
            .iter()
            .rposition(|d| d.hit_test(point, tolerance))
    }

    /// Union of all drawable boundaries.
    pub fn bounds(&self) -> Option<Rect> {
        self.drawables
            .iter()
            .map(Drawable::boundary)
            .reduce(|acc, b| acc.union(b))
    }
}
