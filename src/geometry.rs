//! Coordinate-space transforms and hit-testing.
//!
//! Pure functions over a screen↔image transform, extracted for
//! testability: nothing here touches the collection or any UI state.

use crate::constants::tolerance;
use crate::model::{BBox, BoxCollection, Corner, Side};

/// Screen↔image transform: `screen = image * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl ViewTransform {
    /// Create a transform with the given scale and offsets.
    pub fn new(scale: f32, offset_x: f32, offset_y: f32) -> Self {
        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    /// Identity transform (scale=1, no offset).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Fit an image inside a container preserving aspect ratio, centering
    /// the shorter axis. Deterministic: identical inputs always yield
    /// identical outputs.
    pub fn fit(image_w: f32, image_h: f32, container_w: f32, container_h: f32) -> Self {
        let image_ratio = image_w / image_h;
        let container_ratio = container_w / container_h;

        if image_ratio > container_ratio {
            // Image is wider than the container: scale by width,
            // center vertically.
            let scale = container_w / image_w;
            Self::new(scale, 0.0, (container_h - image_h * scale) / 2.0)
        } else {
            // Image is taller: scale by height, center horizontally.
            let scale = container_h / image_h;
            Self::new(scale, (container_w - image_w * scale) / 2.0, 0.0)
        }
    }

    /// Convert a screen point to image space, clamped to
    /// `[0, image_w] × [0, image_h]`. Out-of-canvas input still yields an
    /// in-bounds image point.
    pub fn to_image(&self, screen: (f32, f32), image_w: f32, image_h: f32) -> (f32, f32) {
        (
            ((screen.0 - self.offset_x) / self.scale).clamp(0.0, image_w),
            ((screen.1 - self.offset_y) / self.scale).clamp(0.0, image_h),
        )
    }

    /// Convert an image point to screen space. Exact inverse of
    /// [`ViewTransform::to_image`] for points that clamping leaves alone.
    pub fn to_screen(&self, image: (f32, f32)) -> (f32, f32) {
        (
            image.0 * self.scale + self.offset_x,
            image.1 * self.scale + self.offset_y,
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// What part of a box a hit-test landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Corner(Corner),
    Border(Side),
}

/// A successful hit-test result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub index: usize,
    pub target: HitTarget,
}

/// Test a screen point against all four corners of a box in fixed
/// priority order (TL, TR, BL, BR); the first within-tolerance match
/// wins, so equidistant corners on a degenerate box resolve to TopLeft.
pub fn near_corner(
    screen: (f32, f32),
    bbox: &BBox,
    transform: &ViewTransform,
    tol: f32,
) -> Option<Corner> {
    for &corner in Corner::all() {
        let (cx, cy) = transform.to_screen(bbox.corner(corner));
        if (screen.0 - cx).abs() < tol && (screen.1 - cy).abs() < tol {
            return Some(corner);
        }
    }
    None
}

/// Test a screen point against the four borders of a box, excluding a
/// corner zone of `tol + CORNER_EXCLUSION` from each span so corner and
/// border hit-tests are mutually exclusive at the boundary.
pub fn near_border(
    screen: (f32, f32),
    bbox: &BBox,
    transform: &ViewTransform,
    tol: f32,
) -> Option<Side> {
    let (sx1, sy1) = transform.to_screen((bbox.x1, bbox.y1));
    let (sx2, sy2) = transform.to_screen((bbox.x2, bbox.y2));
    let corner_zone = tol + tolerance::CORNER_EXCLUSION;
    let (x, y) = screen;

    let in_vertical_span = y > sy1 + corner_zone && y < sy2 - corner_zone;
    let in_horizontal_span = x > sx1 + corner_zone && x < sx2 - corner_zone;

    if (x - sx1).abs() < tol && in_vertical_span {
        Some(Side::Left)
    } else if (x - sx2).abs() < tol && in_vertical_span {
        Some(Side::Right)
    } else if (y - sy1).abs() < tol && in_horizontal_span {
        Some(Side::Top)
    } else if (y - sy2).abs() < tol && in_horizontal_span {
        Some(Side::Bottom)
    } else {
        None
    }
}

/// Hit-test the visible boxes of a collection, topmost (highest index)
/// first so newer boxes occlude older ones. Interior clicks never match;
/// only borders and corners select, which avoids accidental
/// mis-selection in dense scenes.
pub fn hit_test(
    screen: (f32, f32),
    collection: &BoxCollection,
    transform: &ViewTransform,
    tol: f32,
) -> Option<Hit> {
    for index in collection.visible_indices().into_iter().rev() {
        let bbox = collection.get(index)?;
        if let Some(corner) = near_corner(screen, bbox, transform, tol) {
            return Some(Hit {
                index,
                target: HitTarget::Corner(corner),
            });
        }
        if let Some(side) = near_border(screen, bbox, transform, tol) {
            return Some(Hit {
                index,
                target: HitTarget::Border(side),
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InboundState;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn collection_from(json: &str, threshold: f32) -> BoxCollection {
        InboundState::from_json(json).into_collection(threshold)
    }

    #[test]
    fn test_fit_wide_image_centers_vertically() {
        // 200x100 image into 100x100 container: scale by width.
        let t = ViewTransform::fit(200.0, 100.0, 100.0, 100.0);
        assert!(approx_eq(t.scale, 0.5));
        assert!(approx_eq(t.offset_x, 0.0));
        assert!(approx_eq(t.offset_y, 25.0));
    }

    #[test]
    fn test_fit_tall_image_centers_horizontally() {
        let t = ViewTransform::fit(100.0, 200.0, 100.0, 100.0);
        assert!(approx_eq(t.scale, 0.5));
        assert!(approx_eq(t.offset_x, 25.0));
        assert!(approx_eq(t.offset_y, 0.0));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let a = ViewTransform::fit(640.0, 480.0, 333.0, 257.0);
        let b = ViewTransform::fit(640.0, 480.0, 333.0, 257.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_round_trip_inside_bounds() {
        let t = ViewTransform::new(0.5, 10.0, 25.0);
        for &p in &[(10.0, 25.0), (60.0, 50.0), (12.5, 33.75)] {
            let img = t.to_image(p, 200.0, 100.0);
            let back = t.to_screen(img);
            assert!(approx_eq(back.0, p.0), "x round trip for {:?}", p);
            assert!(approx_eq(back.1, p.1), "y round trip for {:?}", p);
        }
    }

    #[test]
    fn test_to_image_clamps_out_of_canvas_input() {
        let t = ViewTransform::new(1.0, 0.0, 0.0);
        assert_eq!(t.to_image((-50.0, 500.0), 100.0, 100.0), (0.0, 100.0));
        assert_eq!(t.to_image((150.0, -3.0), 100.0, 100.0), (100.0, 0.0));
    }

    #[test]
    fn test_near_corner_priority_order() {
        let t = ViewTransform::identity();
        let b = BBox::new(10.0, 10.0, 50.0, 50.0);
        assert_eq!(near_corner((11.0, 12.0), &b, &t, 10.0), Some(Corner::TopLeft));
        assert_eq!(near_corner((49.0, 49.0), &b, &t, 10.0), Some(Corner::BottomRight));
        assert_eq!(near_corner((30.0, 30.0), &b, &t, 10.0), None);
    }

    #[test]
    fn test_degenerate_box_ties_break_to_top_left() {
        // A 2x2 box: every corner is within tolerance of its center.
        let t = ViewTransform::identity();
        let b = BBox::new(20.0, 20.0, 22.0, 22.0);
        assert_eq!(near_corner((21.0, 21.0), &b, &t, 10.0), Some(Corner::TopLeft));
    }

    #[test]
    fn test_border_excludes_corner_zone() {
        let t = ViewTransform::identity();
        let b = BBox::new(0.0, 0.0, 100.0, 100.0);

        // Mid-left border hits.
        assert_eq!(near_border((1.0, 50.0), &b, &t, 10.0), Some(Side::Left));
        // Same x near the top-left corner: excluded from the border span
        // and claimed by the corner test instead.
        assert_eq!(near_border((1.0, 8.0), &b, &t, 10.0), None);
        assert_eq!(near_corner((1.0, 8.0), &b, &t, 10.0), Some(Corner::TopLeft));
    }

    #[test]
    fn test_border_sides() {
        let t = ViewTransform::identity();
        let b = BBox::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(near_border((99.0, 50.0), &b, &t, 10.0), Some(Side::Right));
        assert_eq!(near_border((50.0, 1.0), &b, &t, 10.0), Some(Side::Top));
        assert_eq!(near_border((50.0, 99.0), &b, &t, 10.0), Some(Side::Bottom));
    }

    #[test]
    fn test_hit_test_scales_with_transform() {
        // Box at image (100,100)-(200,200) drawn at half scale.
        let t = ViewTransform::new(0.5, 0.0, 0.0);
        let c = collection_from(r#"{"boxes": [[100,100,200,200]], "scores": [90]}"#, 0.5);
        let hit = hit_test((75.0, 50.0), &c, &t, 10.0).unwrap();
        assert_eq!(hit.index, 0);
        assert_eq!(hit.target, HitTarget::Border(Side::Top));
    }

    #[test]
    fn test_hit_test_topmost_wins() {
        // B (index 1) overlaps A (index 0); their left borders coincide
        // in the overlap region, so a click there must pick B.
        let c = collection_from(
            r#"{"boxes": [[10,10,60,60], [10,40,80,90]], "scores": [90, 90]}"#,
            0.5,
        );
        let t = ViewTransform::identity();
        let hit = hit_test((10.0, 55.0), &c, &t, 8.0).unwrap();
        assert_eq!(hit.index, 1);
    }

    #[test]
    fn test_hit_test_ignores_interior() {
        let c = collection_from(r#"{"boxes": [[0,0,100,100]], "scores": [90]}"#, 0.5);
        let t = ViewTransform::identity();
        assert_eq!(hit_test((50.0, 50.0), &c, &t, 10.0), None);
    }

    #[test]
    fn test_hit_test_skips_below_threshold() {
        let c = collection_from(r#"{"boxes": [[0,0,100,100]], "scores": [40]}"#, 0.5);
        let t = ViewTransform::identity();
        assert_eq!(hit_test((1.0, 50.0), &c, &t, 10.0), None);
    }
}
