//! Stateless rasterization of the image plus box overlays.
//!
//! Given the same (base image, collection, temporary box) inputs the
//! output buffer is identical; all cursor/gesture state lives in the
//! interaction controller, all selection state in the collection.

use image::{Rgba, RgbaImage};

use crate::constants::palette;
use crate::model::{BBox, BoxCollection};

/// Draws the base image with every box at or above the collection
/// threshold, highlighting the selected box, plus the in-progress
/// temporary box.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderSurface;

impl RenderSurface {
    pub fn new() -> Self {
        Self
    }

    /// Compose the overlay onto a copy of `base`.
    pub fn render(
        &self,
        base: &RgbaImage,
        collection: &BoxCollection,
        temp_box: Option<&BBox>,
    ) -> RgbaImage {
        let mut out = base.clone();
        let selection = collection.selection();

        for index in collection.visible_indices() {
            let Some(bbox) = collection.get(index) else {
                continue;
            };
            let color = if selection == Some(index) {
                palette::SELECTED
            } else if collection.crowd(index).unwrap_or(false) {
                palette::CROWD
            } else {
                palette::BOX
            };
            stroke_rect(&mut out, bbox, color, palette::STROKE);
        }

        if let Some(temp) = temp_box {
            stroke_rect(&mut out, temp, palette::TEMP, palette::STROKE);
        }

        out
    }
}

/// Stroke an axis-aligned rectangle outline, clamped to the buffer.
/// The stroke band extends inward from each edge.
fn stroke_rect(img: &mut RgbaImage, bbox: &BBox, color: [u8; 4], stroke: u32) {
    let (w, h) = img.dimensions();
    let x1 = bbox.x1.round().max(0.0) as u32;
    let y1 = bbox.y1.round().max(0.0) as u32;
    let x2 = (bbox.x2.round() as u32).min(w.saturating_sub(1));
    let y2 = (bbox.y2.round() as u32).min(h.saturating_sub(1));
    if x1 > x2 || y1 > y2 {
        return;
    }

    let px = Rgba(color);
    for x in x1..=x2 {
        for t in 0..stroke {
            if y1 + t <= y2 {
                img.put_pixel(x, y1 + t, px);
            }
            if y2 >= t && y2 - t >= y1 {
                img.put_pixel(x, y2 - t, px);
            }
        }
    }
    for y in y1..=y2 {
        for t in 0..stroke {
            if x1 + t <= x2 {
                img.put_pixel(x1 + t, y, px);
            }
            if x2 >= t && x2 - t >= x1 {
                img.put_pixel(x2 - t, y, px);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InboundState;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn base() -> RgbaImage {
        RgbaImage::from_pixel(100, 100, WHITE)
    }

    fn collection_from(json: &str, threshold: f32) -> BoxCollection {
        InboundState::from_json(json).into_collection(threshold)
    }

    #[test]
    fn test_visible_box_outlined_hidden_box_skipped() {
        let c = collection_from(
            r#"{"boxes": [[10,10,40,40], [60,60,90,90]], "scores": [90, 40]}"#,
            0.5,
        );
        let out = RenderSurface::new().render(&base(), &c, None);

        // Visible box border painted.
        assert_eq!(*out.get_pixel(10, 25), Rgba(palette::BOX));
        assert_eq!(*out.get_pixel(25, 10), Rgba(palette::BOX));
        // Interior untouched.
        assert_eq!(*out.get_pixel(25, 25), WHITE);
        // Below-threshold box not rendered at all.
        assert_eq!(*out.get_pixel(60, 75), WHITE);
    }

    #[test]
    fn test_selected_box_highlighted() {
        let mut c = collection_from(r#"{"boxes": [[10,10,40,40]], "scores": [90]}"#, 0.5);
        c.select(Some(0));
        let out = RenderSurface::new().render(&base(), &c, None);
        assert_eq!(*out.get_pixel(10, 25), Rgba(palette::SELECTED));
    }

    #[test]
    fn test_crowd_box_uses_crowd_color() {
        let c = collection_from(
            r#"{"boxes": [[10,10,40,40]], "scores": [90], "crowd_flags": [true]}"#,
            0.5,
        );
        let out = RenderSurface::new().render(&base(), &c, None);
        assert_eq!(*out.get_pixel(10, 25), Rgba(palette::CROWD));
    }

    #[test]
    fn test_temp_box_overlay() {
        let c = BoxCollection::new(0.5);
        let temp = BBox::new(20.0, 20.0, 50.0, 50.0);
        let out = RenderSurface::new().render(&base(), &c, Some(&temp));
        assert_eq!(*out.get_pixel(20, 35), Rgba(palette::TEMP));
    }

    #[test]
    fn test_render_is_deterministic_and_nonmutating() {
        let img = base();
        let mut c = collection_from(
            r#"{"boxes": [[10,10,40,40], [30,30,70,70]], "scores": [90, 90]}"#,
            0.5,
        );
        c.select(Some(1));
        let surface = RenderSurface::new();
        let a = surface.render(&img, &c, None);
        let b = surface.render(&img, &c, None);
        assert_eq!(a, b);
        assert_eq!(*img.get_pixel(10, 25), WHITE); // base untouched
    }

    #[test]
    fn test_out_of_bounds_box_clamped() {
        let c = collection_from(r#"{"boxes": [[90,90,150,150]], "scores": [90]}"#, 0.5);
        // Must not panic; border clamped to the buffer edge.
        let out = RenderSurface::new().render(&base(), &c, None);
        assert_eq!(*out.get_pixel(99, 95), Rgba(palette::BOX));
    }
}
