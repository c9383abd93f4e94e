//! Masking engine: opaque fills over native-resolution pages
//!
//! Rectangles arrive in display space together with the scale they were
//! drawn under; each fill is normalized, converted to native space, and
//! painted as solid white. Fills are idempotent and opaque, so application
//! order never matters.

use image::RgbaImage;
use tiny_skia::{Color, Paint, Pixmap, Transform};

use crate::domain::{Rect, Scale};

/// Convert an RgbaImage to a Pixmap, apply a drawing function, copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let Some(size) = tiny_skia::IntSize::from_wh(img.width(), img.height()) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    img.copy_from_slice(pixmap.data());
}

fn fill_regions(page: &mut RgbaImage, rects: &[Rect], scale: Scale) {
    if rects.is_empty() {
        return;
    }

    with_pixmap(page, |pixmap| {
        let mut paint = Paint::default();
        paint.set_color(Color::WHITE);

        for rect in rects {
            let r = rect.normalized().to_native(scale);
            // Degenerate rects produce no valid skia rect and fill nothing;
            // out-of-bounds rects are clipped by the fill itself.
            if let Some(area) = tiny_skia::Rect::from_xywh(r.x1, r.y1, r.x2 - r.x1, r.y2 - r.y1) {
                pixmap.fill_rect(area, &paint, Transform::identity(), None);
            }
        }
    });
}

/// Fill one rectangle's native-space area in place (editor preview path)
pub fn fill_region(page: &mut RgbaImage, rect: &Rect, scale: Scale) {
    fill_regions(page, std::slice::from_ref(rect), scale);
}

/// Masked copy of a page: every rectangle normalized, converted to native
/// space via the recorded scale, and filled opaque white. An empty region
/// set returns a pixel-identical copy.
pub fn mask_page(page: &RgbaImage, rects: &[Rect], scale: Scale) -> RgbaImage {
    let mut out = page.clone();
    fill_regions(&mut out, rects, scale);
    out
}
