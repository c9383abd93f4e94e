//! Rectangle and scale types for redaction regions
//!
//! Rectangles keep the two corner points the user dragged between, in
//! whichever order the drag produced them. Consumers normalize before use.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Axis-aligned rectangle between two corner points.
///
/// Serialized as `[x1, y1, x2, y2]`. The corners are not guaranteed to be
/// in min/max order: dragging up-left gives x1 > x2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    /// Create a new rectangle from two corner points
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Corner-normalized copy (x1 <= x2, y1 <= y2)
    pub fn normalized(&self) -> Rect {
        let (x1, x2) = if self.x1 < self.x2 {
            (self.x1, self.x2)
        } else {
            (self.x2, self.x1)
        };
        let (y1, y2) = if self.y1 < self.y2 {
            (self.y1, self.y2)
        } else {
            (self.y2, self.y1)
        };
        Rect { x1, y1, x2, y2 }
    }

    /// Get the width of the rectangle
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).abs()
    }

    /// Get the height of the rectangle
    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).abs()
    }

    /// Zero-area rectangles are valid but redact nothing
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    /// Check if this rectangle contains a point (exclusive bounds)
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let r = self.normalized();
        x > r.x1 && x < r.x2 && y > r.y1 && y < r.y2
    }

    /// Convert display-space coordinates to native document resolution
    pub fn to_native(&self, scale: Scale) -> Rect {
        let s = scale.get();
        Rect {
            x1: self.x1 / s,
            y1: self.y1 / s,
            x2: self.x2 / s,
            y2: self.y2 / s,
        }
    }

    /// Convert native-space coordinates back to display space
    pub fn to_display(&self, scale: Scale) -> Rect {
        let s = scale.get();
        Rect {
            x1: self.x1 * s,
            y1: self.y1 * s,
            x2: self.x2 * s,
            y2: self.y2 * s,
        }
    }
}

impl From<[f32; 4]> for Rect {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Rect { x1, y1, x2, y2 }
    }
}

impl From<Rect> for [f32; 4] {
    fn from(r: Rect) -> Self {
        [r.x1, r.y1, r.x2, r.y2]
    }
}

/// Displayed-pixel-size over native-pixel-size for one loaded document.
///
/// A property of a single load operation (one document's fit-to-canvas
/// ratio), never shared between documents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale(f32);

impl Scale {
    /// Native resolution shown 1:1
    pub const IDENTITY: Scale = Scale(1.0);

    /// Fails with `InvalidScale` unless the factor is positive and finite
    pub fn new(factor: f32) -> Result<Self> {
        if factor.is_finite() && factor > 0.0 {
            Ok(Scale(factor))
        } else {
            Err(Error::InvalidScale(factor))
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_identity_within_tolerance() {
        let rect = Rect::new(40.0, 40.0, 120.0, 100.0);
        for factor in [0.25_f32, 0.5, 1.0, 1.5, 3.0] {
            let scale = Scale::new(factor).unwrap();
            let back = rect.to_native(scale).to_display(scale);
            assert!((back.x1 - rect.x1).abs() < 1e-3);
            assert!((back.y1 - rect.y1).abs() < 1e-3);
            assert!((back.x2 - rect.x2).abs() < 1e-3);
            assert!((back.y2 - rect.y2).abs() < 1e-3);
        }
    }

    #[test]
    fn to_native_divides_by_the_scale() {
        let scale = Scale::new(0.5).unwrap();
        let native = Rect::new(40.0, 40.0, 120.0, 100.0).to_native(scale);
        assert_eq!(native, Rect::new(80.0, 80.0, 240.0, 200.0));
    }

    #[test]
    fn reversed_corners_normalize_to_the_same_rect() {
        let forward = Rect::new(10.0, 20.0, 50.0, 60.0);
        let reversed = Rect::new(50.0, 60.0, 10.0, 20.0);
        assert_eq!(forward.normalized(), reversed.normalized());
    }

    #[test]
    fn degenerate_rectangles_are_detected() {
        assert!(Rect::new(5.0, 5.0, 5.0, 9.0).is_degenerate());
        assert!(Rect::new(5.0, 5.0, 9.0, 5.0).is_degenerate());
        assert!(!Rect::new(5.0, 5.0, 9.0, 9.0).is_degenerate());
    }

    #[test]
    fn contains_point_works_on_unnormalized_corners() {
        let rect = Rect::new(50.0, 60.0, 10.0, 20.0);
        assert!(rect.contains_point(30.0, 40.0));
        assert!(!rect.contains_point(5.0, 40.0));
        // Bounds are exclusive, matching the editor's hit test
        assert!(!rect.contains_point(10.0, 40.0));
    }

    #[test]
    fn non_positive_or_non_finite_scales_are_rejected() {
        assert!(matches!(Scale::new(0.0), Err(Error::InvalidScale(_))));
        assert!(matches!(Scale::new(-1.0), Err(Error::InvalidScale(_))));
        assert!(matches!(Scale::new(f32::NAN), Err(Error::InvalidScale(_))));
        assert!(matches!(
            Scale::new(f32::INFINITY),
            Err(Error::InvalidScale(_))
        ));
        assert!(Scale::new(0.5).is_ok());
    }

    #[test]
    fn rect_serializes_as_a_four_element_array() {
        let rect = Rect::new(40.0, 40.0, 120.0, 100.0);
        let json = serde_json::to_string(&rect).unwrap();
        assert_eq!(json, "[40.0,40.0,120.0,100.0]");
        let back: Rect = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rect);
    }
}
