//! View transform for pan/zoom of the paper content.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Placement of the graph content inside the paper.
///
/// A content point `p` appears at `position + p * scale` in screen space.
/// The transform is persisted with the graph so a reopened graph shows the
/// same region it was closed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Anchored position of the content origin, in screen units.
    pub position: Vec2,
    /// Content scale (1.0 = 100%).
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    /// Create an identity view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Content to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.position) * Affine::scale(self.scale)
    }

    /// Screen to content transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.position)
    }

    /// Convert a screen point to content coordinates.
    pub fn screen_to_content(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a content point to screen coordinates.
    pub fn content_to_screen(&self, content_point: Point) -> Point {
        self.transform() * content_point
    }

    /// Whether the transform can be inverted and produces finite points.
    pub fn is_valid(&self) -> bool {
        self.scale.is_finite() && self.scale > 0.0 && self.position.x.is_finite() && self.position.y.is_finite()
    }

    /// Set the scale while keeping `content_point` at the same screen location.
    pub fn scale_about(&mut self, content_point: Point, new_scale: f64) {
        let before = self.content_to_screen(content_point);
        self.scale = new_scale;
        let after = self.content_to_screen(content_point);
        self.position += before - after;
    }

    /// Reset to the identity view.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fit the view so `bounds` fills the viewport, minus `padding` on each side.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64, min_scale: f64, max_scale: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let padded = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        self.scale = scale_x.min(scale_y).clamp(min_scale, max_scale);

        let bounds_center = bounds.center();
        let viewport_center = Point::new(viewport.width / 2.0, viewport.height / 2.0);

        self.position = Vec2::new(
            viewport_center.x - bounds_center.x * self.scale,
            viewport_center.y - bounds_center.y * self.scale,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view() {
        let view = ViewTransform::new();
        assert_eq!(view.position, Vec2::ZERO);
        assert!((view.scale - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_is_valid() {
        assert!(ViewTransform::new().is_valid());
        for scale in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let view = ViewTransform {
                position: Vec2::ZERO,
                scale,
            };
            assert!(!view.is_valid());
        }
        let view = ViewTransform {
            position: Vec2::new(f64::NAN, 0.0),
            scale: 1.0,
        };
        assert!(!view.is_valid());
    }

    #[test]
    fn test_screen_to_content_with_offset_and_scale() {
        let view = ViewTransform {
            position: Vec2::new(50.0, 100.0),
            scale: 2.0,
        };
        let content = view.screen_to_content(Point::new(150.0, 300.0));
        assert!((content.x - 50.0).abs() < f64::EPSILON);
        assert!((content.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let view = ViewTransform {
            position: Vec2::new(30.0, -20.0),
            scale: 1.5,
        };
        let original = Point::new(123.0, 456.0);
        let back = view.content_to_screen(view.screen_to_content(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_scale_about_pins_point() {
        let mut view = ViewTransform {
            position: Vec2::new(10.0, 10.0),
            scale: 1.0,
        };
        let pinned = Point::new(40.0, 60.0);
        let before = view.content_to_screen(pinned);
        view.scale_about(pinned, 3.0);
        let after = view.content_to_screen(pinned);
        assert!((before.x - after.x).abs() < 1e-10);
        assert!((before.y - after.y).abs() < 1e-10);
        assert!((view.scale - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_to_bounds_centers_content() {
        let mut view = ViewTransform::new();
        view.fit_to_bounds(
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Size::new(200.0, 200.0),
            0.0,
            0.001,
            1000.0,
        );
        assert!((view.scale - 2.0).abs() < f64::EPSILON);
        let center = view.content_to_screen(Point::new(50.0, 25.0));
        assert!((center.x - 100.0).abs() < 1e-10);
        assert!((center.y - 100.0).abs() < 1e-10);
    }
}
