//! The shared box-collection data model.
//!
//! Four parallel arrays (boxes, scores, labels, crowd flags) keyed by
//! creation/import order. Every mutation keeps the arrays length-aligned;
//! an observer can never see a partial update because each operation
//! completes before control returns to the event loop.

use crate::constants::score;
use crate::error::{EditorError, Result};
use crate::model::BBox;

/// Ordered boxes with parallel score/label/crowd arrays, a visibility
/// threshold, and the single shared selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxCollection {
    boxes: Vec<BBox>,
    scores: Vec<f32>,
    labels: Vec<i32>,
    crowd_flags: Vec<bool>,
    /// Visibility threshold in `[0, 1]`; boxes with
    /// `score < threshold * 100` are hidden but not removed.
    threshold: f32,
    /// At most one selected box index, shared by all front-ends.
    selection: Option<usize>,
}

impl BoxCollection {
    /// Create an empty collection with the given threshold.
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Build a collection from already-aligned parts. Used by the
    /// inbound-state importer after normalization.
    pub(crate) fn from_parts(
        boxes: Vec<BBox>,
        scores: Vec<f32>,
        labels: Vec<i32>,
        crowd_flags: Vec<bool>,
        threshold: f32,
    ) -> Result<Self> {
        let n = boxes.len();
        if scores.len() != n || labels.len() != n || crowd_flags.len() != n {
            return Err(EditorError::invariant(format!(
                "parts misaligned: boxes={} scores={} labels={} crowd={}",
                n,
                scores.len(),
                labels.len(),
                crowd_flags.len()
            )));
        }
        Ok(Self {
            boxes,
            scores,
            labels,
            crowd_flags,
            threshold: threshold.clamp(0.0, 1.0),
            selection: None,
        })
    }

    /// Defensive check that the four arrays are still aligned.
    fn check_aligned(&self) -> Result<()> {
        let n = self.boxes.len();
        if self.scores.len() == n && self.labels.len() == n && self.crowd_flags.len() == n {
            Ok(())
        } else {
            let err = EditorError::invariant(format!(
                "boxes={} scores={} labels={} crowd={}",
                n,
                self.scores.len(),
                self.labels.len(),
                self.crowd_flags.len()
            ));
            log::error!("❗ {}", err);
            Err(err)
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.boxes.len() {
            Ok(())
        } else {
            Err(EditorError::IndexOutOfRange {
                index,
                len: self.boxes.len(),
            })
        }
    }

    /// Append a box to all four parallel arrays. Returns the new index.
    pub fn add_box(&mut self, coords: BBox, label: i32, crowd: bool) -> Result<usize> {
        self.check_aligned()?;
        self.boxes.push(coords);
        self.scores.push(score::USER_DRAWN);
        self.labels.push(label);
        self.crowd_flags.push(crowd);
        let index = self.boxes.len() - 1;
        log::debug!(
            "✏️ Added box {} at {:?} (label={}, crowd={})",
            index,
            coords.coords(),
            label,
            crowd
        );
        Ok(index)
    }

    /// Remove the entry at `index` from all four arrays. Indices of all
    /// later boxes shift down by one; any externally held index referring
    /// to a later box is invalidated.
    pub fn delete_box(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.check_aligned()?;
        self.boxes.remove(index);
        self.scores.remove(index);
        self.labels.remove(index);
        self.crowd_flags.remove(index);
        // Keep the selection coherent: the deleted box deselects, later
        // selections shift down with their boxes.
        self.selection = match self.selection {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        log::debug!("🗑️ Deleted box {} ({} remain)", index, self.boxes.len());
        Ok(())
    }

    /// Empty all four arrays and clear the selection.
    pub fn delete_all(&mut self) {
        let count = self.boxes.len();
        self.boxes.clear();
        self.scores.clear();
        self.labels.clear();
        self.crowd_flags.clear();
        self.selection = None;
        log::debug!("🗑️ Deleted all {} boxes", count);
    }

    /// Store new coordinates for a box. `coords` is renormalized before
    /// storage, so the stored value always satisfies the box invariant.
    pub fn update_coords(&mut self, index: usize, coords: BBox) -> Result<()> {
        self.check_index(index)?;
        self.boxes[index] = BBox::new(coords.x1, coords.y1, coords.x2, coords.y2);
        Ok(())
    }

    /// Pointwise label update.
    pub fn update_label(&mut self, index: usize, label: i32) -> Result<()> {
        self.check_index(index)?;
        self.labels[index] = label;
        log::debug!("🏷️ Box {} label -> {}", index, label);
        Ok(())
    }

    /// Pointwise crowd-flag update.
    pub fn update_crowd(&mut self, index: usize, flag: bool) -> Result<()> {
        self.check_index(index)?;
        self.crowd_flags[index] = flag;
        log::debug!("👥 Box {} crowd -> {}", index, flag);
        Ok(())
    }

    /// Indices of boxes at or above the threshold, ascending. Pure filter.
    pub fn visible_indices(&self) -> Vec<usize> {
        let cutoff = self.threshold * score::MAX;
        (0..self.boxes.len())
            .filter(|&i| self.scores[i] >= cutoff)
            .collect()
    }

    /// Whether the box at `index` is at or above the threshold.
    pub fn is_visible(&self, index: usize) -> bool {
        self.scores
            .get(index)
            .is_some_and(|s| *s >= self.threshold * score::MAX)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BBox> {
        self.boxes.get(index)
    }

    pub fn score(&self, index: usize) -> Option<f32> {
        self.scores.get(index).copied()
    }

    pub fn label(&self, index: usize) -> Option<i32> {
        self.labels.get(index).copied()
    }

    pub fn crowd(&self, index: usize) -> Option<bool> {
        self.crowd_flags.get(index).copied()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.clamp(0.0, 1.0);
    }

    /// Set or clear the shared selection.
    pub fn select(&mut self, index: Option<usize>) {
        self.selection = index.filter(|&i| i < self.boxes.len());
    }

    /// The currently selected box index, if any.
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }
}
