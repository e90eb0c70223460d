//! Straight line drawable.

use super::{DrawableInfo, DrawableTrait, LineStyle};
use kurbo::{Affine, Line as KurboLine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// A single segment between two points in graph-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StraightLine {
    pub info: DrawableInfo,
    pub start: Point,
    pub end: Point,
    #[serde(default)]
    pub style: LineStyle,
}

impl StraightLine {
    /// Create a new line pivoted at its midpoint.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            info: DrawableInfo::new(start.midpoint(end)),
            start,
            end,
            style: LineStyle::default(),
        }
    }

    /// Get the length of the line.
    pub fn length(&self) -> f64 {
        (self.end - self.start).hypot()
    }

    /// Get the midpoint of the line.
    pub fn midpoint(&self) -> Point {
        self.start.midpoint(self.end)
    }

    /// Move the pivot back to the segment midpoint.
    pub fn recenter_pivot(&mut self) {
        self.info.pivot = self.midpoint();
    }

    /// Get as a kurbo Line.
    pub fn as_kurbo(&self) -> KurboLine {
        KurboLine::new(self.start, self.end)
    }
}

impl DrawableTrait for StraightLine {
    fn info(&self) -> &DrawableInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DrawableInfo {
        &mut self.info
    }

    fn points(&self) -> Vec<Point> {
        vec![self.start, self.end]
    }

    fn transform(&mut self, affine: Affine) {
        self.start = affine * self.start;
        self.end = affine * self.end;
        self.info.pivot = affine * self.info.pivot;
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let line_vec = self.end - self.start;
        let point_vec = point - self.start;

        let line_len_sq = line_vec.hypot2();
        if line_len_sq < f64::EPSILON {
            return point_vec.hypot() <= tolerance;
        }

        // Project onto the segment
        let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
        let projection = self.start + line_vec * t;

        (point - projection).hypot() <= tolerance + self.style.width / 2.0
    }

    fn offset(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
        self.info.pivot += delta;
    }
}
