//! Drawable definitions for graph content.

mod straight_line;

pub use straight_line::StraightLine;

use chrono::{DateTime, Utc};
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Stroke attributes shared by every line drawable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Color,
    /// Stroke width in content units.
    pub width: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::default(),
            width: 2.0,
        }
    }
}

/// State every drawable carries regardless of its geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawableInfo {
    pub name: String,
    /// When the drawable was last selected on the paper.
    #[serde(default)]
    pub last_selected: Option<DateTime<Utc>>,
    /// Anchor used for rotation and placement.
    pub pivot: Point,
    /// Accumulated rotation in radians.
    #[serde(default)]
    pub rotation: f64,
    #[serde(skip)]
    pub editing: bool,
    #[serde(skip)]
    pub selected: bool,
}

impl DrawableInfo {
    /// Fresh info with a unique name, pivoted at `pivot`.
    pub fn new(pivot: Point) -> Self {
        Self {
            name: Uuid::new_v4().to_string(),
            last_selected: None,
            pivot,
            rotation: 0.0,
            editing: false,
            selected: false,
        }
    }
}

// Editing, selection and the selection stamp are paper state, not content.
impl PartialEq for DrawableInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.pivot == other.pivot
            && self.rotation == other.rotation
    }
}

/// Common behaviour for all drawable geometry.
pub trait DrawableTrait {
    fn info(&self) -> &DrawableInfo;

    fn info_mut(&mut self) -> &mut DrawableInfo;

    /// Ordered control points in graph-local coordinates.
    fn points(&self) -> Vec<Point>;

    /// Apply an affine transform to the geometry and the pivot.
    fn transform(&mut self, affine: Affine);

    /// Check if a point is within `tolerance` of the geometry.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Axis-aligned bounds of the control points.
    fn boundary(&self) -> Rect {
        let points = self.points();
        let Some(first) = points.first() else {
            return Rect::ZERO;
        };
        points
            .iter()
            .fold(Rect::from_points(*first, *first), |rect, p| rect.union_pt(*p))
    }

    /// Translate every point by `delta`.
    fn offset(&mut self, delta: Vec2) {
        self.transform(Affine::translate(delta));
    }
}

/// Enum wrapper for all drawable kinds (for serialization and snapshots).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Drawable {
    StraightLine(StraightLine),
}

impl Drawable {
    fn as_dyn(&self) -> &dyn DrawableTrait {
        match self {
            Drawable::StraightLine(l) => l,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn DrawableTrait {
        match self {
            Drawable::StraightLine(l) => l,
        }
    }

    pub fn info(&self) -> &DrawableInfo {
        self.as_dyn().info()
    }

    pub fn info_mut(&mut self) -> &mut DrawableInfo {
        self.as_dyn_mut().info_mut()
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn points(&self) -> Vec<Point> {
        self.as_dyn().points()
    }

    pub fn offset(&mut self, delta: Vec2) {
        self.as_dyn_mut().offset(delta);
    }

    pub fn boundary(&self) -> Rect {
        self.as_dyn().boundary()
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_dyn().hit_test(point, tolerance)
    }

    pub fn transform(&mut self, affine: Affine) {
        self.as_dyn_mut().transform(affine);
    }

    /// Rotate about the pivot by `angle` radians.
    pub fn rotate(&mut self, angle: f64) {
        let pivot = self.info().pivot;
        self.transform(Affine::rotate_about(angle, pivot));
        self.info_mut().rotation += angle;
    }

    /// Deep copy used for undo snapshots. Keeps the name.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Mark as selected and stamp the selection time.
    pub fn select(&mut self) {
        let info = self.info_mut();
        info.selected = true;
        info.last_selected = Some(Utc::now());
    }

    /// Clear selection and editing flags.
    pub fn deselect(&mut self) {
        let info = self.info_mut();
        info.selected = false;
        info.editing = false;
    }

    pub fn as_straight_line(&self) -> Option<&StraightLine> {
        match self {
            Drawable::StraightLine(l) => Some(l),
        }
    }

    pub fn as_straight_line_mut(&mut self) -> Option<&mut StraightLine> {
        match self {
            Drawable::StraightLine(l) => Some(l),
        }
    }
}

impl From<StraightLine> for Drawable {
    fn from(line: StraightLine) -> Self {
        Drawable::StraightLine(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_is_independent() {
        let original: Drawable = StraightLine::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)).into();
        let mut copy = original.copy();
        copy.offset(Vec2::new(5.0, 5.0));
        assert_eq!(original.points(), vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        assert_eq!(copy.points(), vec![Point::new(5.0, 5.0), Point::new(15.0, 5.0)]);
        assert_eq!(original.name(), copy.name());
    }

    #[test]
    fn test_rotate_about_pivot() {
        let mut line: Drawable = StraightLine::new(Point::new(-10.0, 0.0), Point::new(10.0, 0.0)).into();
        line.rotate(std::f64::consts::FRAC_PI_2);
        let points = line.points();
        assert!(points[0].x.abs() < 1e-10);
        assert!((points[0].y + 10.0).abs() < 1e-10);
        assert!((points[1].y - 10.0).abs() < 1e-10);
        assert!((line.info().rotation - std::f64::consts::FRAC_PI_2).abs() < f64::EPSILON);
        assert_eq!(line.info().pivot, Point::ZERO);
    }

    #[test]
    fn test_select_stamps_time() {
        let mut line: Drawable = StraightLine::new(Point::ZERO, Point::new(1.0, 1.0)).into();
        assert!(line.info().last_selected.is_none());
        line.select();
        assert!(line.info().selected);
        assert!(line.info().last_selected.is_some());
        line.deselect();
        assert!(!line.info().selected);
    }

    #[test]
    fn test_selection_stamp_is_not_content() {
        let line: Drawable = StraightLine::new(Point::ZERO, Point::new(1.0, 1.0)).into();
        let mut selected = line.copy();
        selected.select();
        selected.deselect();
        assert!(selected.info().last_selected.is_some());
        assert_eq!(selected, line);
    }
}
