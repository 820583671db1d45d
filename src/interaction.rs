//! Pointer gesture state machine.
//!
//! Raw pointer events are mapped to explicit state transitions
//! (`Idle → Drawing/Dragging/Resizing → Idle`) so the gesture logic is
//! testable without any UI host. All coordinates arriving here are screen
//! space; the controller converts to image space through its
//! [`ViewTransform`].

use crate::constants::{size, tolerance};
use crate::error::EditorError;
use crate::geometry::{self, HitTarget, ViewTransform};
use crate::model::{BBox, BoxCollection, Corner};

/// A raw pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
    /// Pointer left the surface mid-gesture: automatic rollback.
    Leave,
}

/// External collaborator that supplies the class id for newly drawn
/// boxes (e.g. a pre-selected class widget).
pub trait DefaultClass {
    fn default_class(&self) -> i32;
}

impl<F: Fn() -> i32> DefaultClass for F {
    fn default_class(&self) -> i32 {
        self()
    }
}

/// The current gesture. Baseline coordinates are captured at
/// pointer-down so pointer-leave can roll the box back.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    /// Drawing a new box from an image-space anchor point.
    Drawing { start: (f32, f32) },
    /// Moving the selected box; `start` is the image-space grab point.
    Dragging { baseline: BBox, start: (f32, f32) },
    /// Resizing the selected box by one corner.
    Resizing { corner: Corner, baseline: BBox },
}

/// Consumes pointer events, hit-tests through [`geometry`], and mutates
/// the collection. Owns the interaction mode and the in-progress
/// temporary box.
#[derive(Debug)]
pub struct InteractionController {
    gesture: Gesture,
    temp_box: Option<BBox>,
    transform: ViewTransform,
    image_w: f32,
    image_h: f32,
    /// Set when a gesture committed a persistence-eligible edit.
    edited: bool,
}

impl InteractionController {
    pub fn new(transform: ViewTransform, image_w: f32, image_h: f32) -> Self {
        Self {
            gesture: Gesture::Idle,
            temp_box: None,
            transform,
            image_w,
            image_h,
            edited: false,
        }
    }

    /// Replace the view transform (container resize, modal open).
    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    /// The in-progress temporary box, rendered as an overlay only.
    pub fn temp_box(&self) -> Option<&BBox> {
        self.temp_box.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    /// Whether a gesture has committed an edit since the last call.
    pub fn take_edited(&mut self) -> bool {
        std::mem::take(&mut self.edited)
    }

    fn to_image(&self, x: f32, y: f32) -> (f32, f32) {
        self.transform.to_image((x, y), self.image_w, self.image_h)
    }

    /// Feed one pointer event through the state machine.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        collection: &mut BoxCollection,
        default_class: &dyn DefaultClass,
    ) {
        match event {
            PointerEvent::Down { x, y } => self.pointer_down(x, y, collection),
            PointerEvent::Move { x, y } => self.pointer_move(x, y, collection),
            PointerEvent::Up => self.pointer_up(collection, default_class),
            PointerEvent::Leave => self.pointer_leave(collection),
        }
    }

    fn pointer_down(&mut self, x: f32, y: f32, collection: &mut BoxCollection) {
        if self.gesture != Gesture::Idle {
            return;
        }

        // The selected box gets resize/drag priority even when another
        // box's border is nearer.
        if let Some(sel) = collection.selection().filter(|&s| collection.is_visible(s)) {
            if let Some(bbox) = collection.get(sel).copied() {
                if let Some(corner) =
                    geometry::near_corner((x, y), &bbox, &self.transform, tolerance::CORNER)
                {
                    log::debug!("↘️ Resizing box {} by {:?}", sel, corner);
                    self.gesture = Gesture::Resizing {
                        corner,
                        baseline: bbox,
                    };
                    return;
                }
                if geometry::near_border((x, y), &bbox, &self.transform, tolerance::BORDER)
                    .is_some()
                {
                    log::debug!("✋ Dragging box {}", sel);
                    self.gesture = Gesture::Dragging {
                        baseline: bbox,
                        start: self.to_image(x, y),
                    };
                    return;
                }
            }
        }

        // Otherwise hit-test all visible boxes, topmost first. A hit
        // selects the box and immediately starts its gesture.
        if let Some(hit) =
            geometry::hit_test((x, y), collection, &self.transform, tolerance::SELECT)
        {
            collection.select(Some(hit.index));
            let Some(baseline) = collection.get(hit.index).copied() else {
                return;
            };
            self.gesture = match hit.target {
                HitTarget::Corner(corner) => {
                    log::debug!("↘️ Selected and resizing box {} by {:?}", hit.index, corner);
                    Gesture::Resizing { corner, baseline }
                }
                HitTarget::Border(_) => {
                    log::debug!("✋ Selected and dragging box {}", hit.index);
                    Gesture::Dragging {
                        baseline,
                        start: self.to_image(x, y),
                    }
                }
            };
            return;
        }

        // Empty space: start drawing. No box is created yet.
        let start = self.to_image(x, y);
        log::debug!("✏️ Drawing from ({:.1}, {:.1})", start.0, start.1);
        self.gesture = Gesture::Drawing { start };
    }

    fn pointer_move(&mut self, x: f32, y: f32, collection: &mut BoxCollection) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing { start } => {
                let cur = self.to_image(x, y);
                self.temp_box = Some(BBox::from_corners(start, cur));
            }
            Gesture::Dragging { baseline, start } => {
                let Some(sel) = collection.selection() else {
                    self.abort(collection);
                    return;
                };
                let cur = self.to_image(x, y);
                let (w, h) = (baseline.width(), baseline.height());
                // Clamp so the box never exits the image; size preserved
                // exactly. A box larger than the image pins to the origin
                // on that axis.
                let x1 = (baseline.x1 + cur.0 - start.0)
                    .min((self.image_w - w).max(0.0))
                    .max(0.0);
                let y1 = (baseline.y1 + cur.1 - start.1)
                    .min((self.image_h - h).max(0.0))
                    .max(0.0);
                let moved = BBox::new(x1, y1, x1 + w, y1 + h);
                if let Err(e) = collection.update_coords(sel, moved) {
                    self.recover(e, collection);
                }
            }
            Gesture::Resizing { corner, baseline } => {
                let Some(sel) = collection.selection() else {
                    self.abort(collection);
                    return;
                };
                let cur = self.to_image(x, y);
                let resized = resize_by_corner(&baseline, corner, cur, self.image_w, self.image_h);
                if let Err(e) = collection.update_coords(sel, resized) {
                    self.recover(e, collection);
                }
            }
        }
    }

    fn pointer_up(&mut self, collection: &mut BoxCollection, default_class: &dyn DefaultClass) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing { .. } => {
                if let Some(temp) = self.temp_box.take() {
                    if temp.width() > size::MIN_DRAW && temp.height() > size::MIN_DRAW {
                        let label = default_class.default_class();
                        match collection.add_box(temp, label, false) {
                            Ok(index) => {
                                collection.select(Some(index));
                                self.edited = true;
                            }
                            Err(e) => self.recover(e, collection),
                        }
                    } else {
                        // Below the minimum size: discard silently.
                        log::debug!(
                            "✏️ Discarded {:.0}x{:.0} box below minimum size",
                            temp.width(),
                            temp.height()
                        );
                    }
                }
            }
            Gesture::Dragging { .. } | Gesture::Resizing { .. } => {
                // The mutation was applied incrementally on pointer-move;
                // only the persistence eligibility remains to record.
                self.edited = true;
            }
        }
        self.gesture = Gesture::Idle;
        self.temp_box = None;
    }

    /// Mid-gesture cancellation: the only automatic-rollback path.
    fn pointer_leave(&mut self, collection: &mut BoxCollection) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing { .. } => {
                log::debug!("✏️ Drawing cancelled (pointer left surface)");
            }
            Gesture::Dragging { baseline, .. } | Gesture::Resizing { baseline, .. } => {
                if let Some(sel) = collection.selection() {
                    if let Err(e) = collection.update_coords(sel, baseline) {
                        self.recover(e, collection);
                    }
                    log::debug!("⏪ Rolled box {} back to {:?}", sel, baseline.coords());
                }
            }
        }
        self.gesture = Gesture::Idle;
        self.temp_box = None;
    }

    /// Local recovery for stale-index defects: reset selection, go idle.
    fn recover(&mut self, err: EditorError, collection: &mut BoxCollection) {
        log::warn!("⚠️ Gesture aborted: {}", err);
        self.abort(collection);
    }

    fn abort(&mut self, collection: &mut BoxCollection) {
        collection.select(None);
        self.gesture = Gesture::Idle;
        self.temp_box = None;
    }
}

/// Move one corner of `baseline` to the pointer position, keeping the
/// opposite corner fixed. The moving edges are clamped to the image and
/// to one pixel short of the fixed edges, so the box can never invert or
/// collapse.
fn resize_by_corner(
    baseline: &BBox,
    corner: Corner,
    cur: (f32, f32),
    image_w: f32,
    image_h: f32,
) -> BBox {
    let BBox {
        mut x1,
        mut y1,
        mut x2,
        mut y2,
    } = *baseline;
    match corner {
        Corner::TopLeft => {
            x1 = cur.0.max(0.0).min(x2 - size::MIN_EDGE);
            y1 = cur.1.max(0.0).min(y2 - size::MIN_EDGE);
        }
        Corner::TopRight => {
            x2 = cur.0.min(image_w).max(x1 + size::MIN_EDGE);
            y1 = cur.1.max(0.0).min(y2 - size::MIN_EDGE);
        }
        Corner::BottomLeft => {
            x1 = cur.0.max(0.0).min(x2 - size::MIN_EDGE);
            y2 = cur.1.min(image_h).max(y1 + size::MIN_EDGE);
        }
        Corner::BottomRight => {
            x2 = cur.0.min(image_w).max(x1 + size::MIN_EDGE);
            y2 = cur.1.min(image_h).max(y1 + size::MIN_EDGE);
        }
    }
    BBox::new(x1, y1, x2, y2)
}
