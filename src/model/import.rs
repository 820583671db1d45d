//! Inbound initial state, as supplied by the surrounding page.
//!
//! The legacy data shape is messy: labels may be absent or live under the
//! old `gt` key, crowd flags may be missing or short, and model scores may
//! be on a 0-1 scale while user scores are 0-100. All of that is
//! normalized exactly once here; downstream code never branches on which
//! field existed.

use serde::Deserialize;

use crate::constants::score;
use crate::error::EditorError;
use crate::model::{BBox, BoxCollection};

/// Machine-proposed boxes and their metadata, prior to normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundState {
    pub boxes: Option<Vec<BBox>>,
    pub scores: Option<Vec<f32>>,
    /// Canonical label array. Takes precedence over `gt` when both exist.
    pub labels: Option<Vec<i32>>,
    /// Legacy single ground-truth array with the same semantics as `labels`.
    pub gt: Option<Vec<i32>>,
    #[serde(alias = "crowdFlags")]
    pub crowd_flags: Option<Vec<bool>>,
}

impl InboundState {
    /// Parse inbound JSON. A malformed document is recovered as the empty
    /// state rather than an error; the defect is logged.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(state) => state,
            Err(e) => {
                log::warn!("⚠️ Unreadable inbound state, starting empty: {}", e);
                Self::default()
            }
        }
    }

    /// Normalize into a [`BoxCollection`], the single canonical model.
    ///
    /// Recovery rather than failure: missing `boxes`/`scores` yields an
    /// empty collection, ragged parallel arrays are padded or truncated to
    /// the box count, and 0-1 scale scores are rescaled to 0-100.
    pub fn into_collection(self, threshold: f32) -> BoxCollection {
        let (boxes, scores) = match (self.boxes, self.scores) {
            (Some(b), Some(s)) => (b, s),
            (b, s) => {
                let err = EditorError::malformed(format!(
                    "boxes present: {}, scores present: {}",
                    b.is_some(),
                    s.is_some()
                ));
                log::warn!("⚠️ {} - initializing empty collection", err);
                return BoxCollection::new(threshold);
            }
        };

        let n = boxes.len();
        let mut scores = resize_to(scores, n, 0.0);

        // Legacy inputs carry model confidences in [0, 1]; the stored
        // scale is 0-100.
        if !scores.is_empty() && scores.iter().all(|s| *s <= 1.0) {
            log::debug!("📊 Rescaling {} scores from 0-1 to 0-100", scores.len());
            for s in &mut scores {
                *s *= score::MAX;
            }
        }

        // `labels` wins over legacy `gt`; absent both, fill with class 0.
        let labels = match (self.labels, self.gt) {
            (Some(labels), _) => labels,
            (None, Some(gt)) => {
                log::debug!("🏷️ Using legacy 'gt' field as labels");
                gt
            }
            (None, None) => vec![0; n],
        };
        let labels = resize_to(labels, n, 0);
        let crowd_flags = resize_to(self.crowd_flags.unwrap_or_default(), n, false);

        // Alignment is guaranteed by the resize_to calls above.
        BoxCollection::from_parts(boxes, scores, labels, crowd_flags, threshold)
            .unwrap_or_else(|_| BoxCollection::new(threshold))
    }
}

fn resize_to<T: Clone>(mut v: Vec<T>, n: usize, fill: T) -> Vec<T> {
    if v.len() != n {
        log::debug!("📐 Repairing parallel array length {} -> {}", v.len(), n);
        v.resize(n, fill);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_take_precedence_over_gt() {
        let json = r#"{"boxes": [[0,0,10,10]], "scores": [90], "labels": [5], "gt": [9]}"#;
        let c = InboundState::from_json(json).into_collection(0.5);
        assert_eq!(c.label(0), Some(5));
    }

    #[test]
    fn test_gt_equivalent_to_labels() {
        let with_gt = r#"{"boxes": [[0,0,10,10]], "scores": [90], "gt": [5]}"#;
        let with_labels = r#"{"boxes": [[0,0,10,10]], "scores": [90], "labels": [5]}"#;
        let a = InboundState::from_json(with_gt).into_collection(0.5);
        let b = InboundState::from_json(with_labels).into_collection(0.5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_labels_filled_with_zero() {
        let json = r#"{"boxes": [[0,0,10,10], [5,5,20,20]], "scores": [90, 80]}"#;
        let c = InboundState::from_json(json).into_collection(0.5);
        assert_eq!(c.label(0), Some(0));
        assert_eq!(c.label(1), Some(0));
        assert_eq!(c.crowd(0), Some(false));
    }

    #[test]
    fn test_missing_boxes_recovers_empty() {
        let c = InboundState::from_json(r#"{"scores": [90]}"#).into_collection(0.5);
        assert!(c.is_empty());
        assert_eq!(c.threshold(), 0.5);
    }

    #[test]
    fn test_garbage_json_recovers_empty() {
        let c = InboundState::from_json("not json at all").into_collection(0.3);
        assert!(c.is_empty());
    }

    #[test]
    fn test_unit_scale_scores_rescaled() {
        let json = r#"{"boxes": [[0,0,10,10], [1,1,9,9]], "scores": [0.9, 0.4]}"#;
        let c = InboundState::from_json(json).into_collection(0.5);
        assert_eq!(c.score(0), Some(90.0));
        assert_eq!(c.score(1), Some(40.0));
        assert_eq!(c.visible_indices(), vec![0]);
    }

    #[test]
    fn test_ragged_arrays_repaired() {
        let json = r#"{
            "boxes": [[0,0,10,10], [5,5,20,20], [1,1,2,2]],
            "scores": [90, 80],
            "labels": [1, 2, 3, 4],
            "crowd_flags": [true]
        }"#;
        let c = InboundState::from_json(json).into_collection(0.0);
        assert_eq!(c.len(), 3);
        assert_eq!(c.score(2), Some(0.0));
        assert_eq!(c.label(2), Some(3));
        assert_eq!(c.crowd(0), Some(true));
        assert_eq!(c.crowd(2), Some(false));
    }

    #[test]
    fn test_camel_case_crowd_flags_accepted() {
        let json = r#"{"boxes": [[0,0,10,10]], "scores": [90], "crowdFlags": [true]}"#;
        let c = InboundState::from_json(json).into_collection(0.5);
        assert_eq!(c.crowd(0), Some(true));
    }

    #[test]
    fn test_boxes_normalized_on_import() {
        let json = r#"{"boxes": [[50,80,10,20]], "scores": [90]}"#;
        let c = InboundState::from_json(json).into_collection(0.5);
        assert_eq!(c.get(0).unwrap().coords(), [10.0, 20.0, 50.0, 80.0]);
    }
}
