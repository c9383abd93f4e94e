//! Per-document region sets

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// One document's redaction rectangles plus the scale they were drawn
/// under.
///
/// Rectangles are display-space. Recording the scale factor alongside them
/// is what lets the masking engine reconstruct native coordinates no matter
/// what canvas size authored them, and keeping it per document is what
/// stops one document's save from corrupting another's coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRegions {
    pub scale_factor: f32,
    pub rectangles: Vec<Rect>,
}

impl Default for DocumentRegions {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            rectangles: Vec::new(),
        }
    }
}

impl DocumentRegions {
    pub fn new(scale_factor: f32, rectangles: Vec<Rect>) -> Self {
        Self {
            scale_factor,
            rectangles,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rectangles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_an_empty_set_at_identity_scale() {
        let regions = DocumentRegions::default();
        assert!(regions.is_empty());
        assert_eq!(regions.scale_factor, 1.0);
    }

    #[test]
    fn serializes_with_camel_case_scale_factor() {
        let regions = DocumentRegions::new(0.5, vec![Rect::new(40.0, 40.0, 120.0, 100.0)]);
        let json = serde_json::to_string(&regions).unwrap();
        assert_eq!(
            json,
            r#"{"scaleFactor":0.5,"rectangles":[[40.0,40.0,120.0,100.0]]}"#
        );
    }
}
