//! Remote persistence: the save wire contract and its transport.
//!
//! One POST per save, no retry. The engine stays transport-agnostic
//! behind [`SaveTransport`]; the blocking HTTP implementation lives here
//! so hosts without special needs can use it directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::BoxCollection;

/// A single box in the save request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedBox {
    pub coordinates: [f32; 4],
    pub label: i32,
    pub crowd_flag: bool,
}

/// The save request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub image_name: String,
    pub bboxes: Vec<SavedBox>,
}

impl SavePayload {
    /// Serialize the boxes at or above the collection threshold, in
    /// ascending index order. Hidden boxes are not persisted.
    pub fn from_collection(image_name: impl Into<String>, collection: &BoxCollection) -> Self {
        let bboxes = collection
            .visible_indices()
            .into_iter()
            .filter_map(|i| {
                Some(SavedBox {
                    coordinates: collection.get(i)?.coords(),
                    label: collection.label(i)?,
                    crowd_flag: collection.crowd(i)?,
                })
            })
            .collect();
        Self {
            image_name: image_name.into(),
            bboxes,
        }
    }
}

/// Opaque acknowledgement body returned by the save endpoint.
#[derive(Debug, Clone, Default)]
pub struct SaveAck {
    pub body: String,
}

/// Transport-level save failures. Any non-success response is terminal
/// for the attempt; there is no automatic retry.
#[derive(Error, Debug)]
pub enum SaveError {
    /// The endpoint answered with a non-success status.
    #[error("save endpoint returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The request never produced a response (DNS, connect, timeout).
    #[error("save transport error: {0}")]
    Transport(String),

    /// The payload could not be serialized.
    #[error("payload serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The remote save collaborator. Implementations may complete
/// synchronously (blocking HTTP) or hand the result back later; either
/// way the caller pairs the result with its request sequence number.
pub trait SaveTransport {
    fn send(&self, payload: &SavePayload) -> Result<SaveAck, SaveError>;
}

/// Blocking HTTP transport posting JSON to a fixed endpoint.
pub struct HttpTransport {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            agent: ureq::Agent::new(),
        }
    }
}

impl SaveTransport for HttpTransport {
    fn send(&self, payload: &SavePayload) -> Result<SaveAck, SaveError> {
        log::info!(
            "💾 Saving {} boxes for '{}' to {}",
            payload.bboxes.len(),
            payload.image_name,
            self.endpoint
        );
        let response = self
            .agent
            .post(&self.endpoint)
            .send_json(serde_json::to_value(payload)?);

        match response {
            Ok(resp) => {
                let body = resp.into_string().unwrap_or_default();
                log::debug!("💾 Save acknowledged ({} bytes)", body.len());
                Ok(SaveAck { body })
            }
            Err(ureq::Error::Status(status, _)) => {
                log::error!("💾 Save rejected with status {}", status);
                Err(SaveError::Status { status })
            }
            Err(e) => {
                log::error!("💾 Save transport failed: {}", e);
                Err(SaveError::Transport(e.to_string()))
            }
        }
    }
}

/// Monotonic save-request sequencing.
///
/// A second save may be issued before the first resolves and the
/// completions may arrive out of order; only a completion newer than
/// everything already applied may refresh snapshot state.
#[derive(Debug, Clone, Default)]
pub struct SaveTracker {
    next_seq: u64,
    last_applied: Option<u64>,
}

impl SaveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the sequence number for a new save request.
    pub fn begin(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Record a successful completion. Returns `true` if `seq` is newer
    /// than every previously applied completion; a stale `seq` is
    /// discarded and must not overwrite fresher snapshot state.
    pub fn try_apply(&mut self, seq: u64) -> bool {
        if self.last_applied.is_some_and(|applied| seq <= applied) {
            log::debug!(
                "💾 Discarding stale save completion {} (applied {:?})",
                seq,
                self.last_applied
            );
            return false;
        }
        self.last_applied = Some(seq);
        true
    }

    /// The newest applied completion, if any.
    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InboundState;

    fn collection_from(json: &str, threshold: f32) -> BoxCollection {
        InboundState::from_json(json).into_collection(threshold)
    }

    #[test]
    fn test_payload_filters_hidden_and_keeps_order() {
        let c = collection_from(
            r#"{
                "boxes": [[0,0,10,10], [5,5,20,20], [1,1,9,9]],
                "scores": [90, 40, 70],
                "labels": [1, 2, 3],
                "crowd_flags": [false, false, true]
            }"#,
            0.5,
        );
        let payload = SavePayload::from_collection("img_001.jpg", &c);
        assert_eq!(payload.image_name, "img_001.jpg");
        assert_eq!(payload.bboxes.len(), 2);
        assert_eq!(payload.bboxes[0].coordinates, [0.0, 0.0, 10.0, 10.0]);
        assert_eq!(payload.bboxes[0].label, 1);
        assert_eq!(payload.bboxes[1].coordinates, [1.0, 1.0, 9.0, 9.0]);
        assert_eq!(payload.bboxes[1].crowd_flag, true);
    }

    #[test]
    fn test_payload_wire_shape() {
        let c = collection_from(
            r#"{"boxes": [[10,10,50,50]], "scores": [90], "labels": [3]}"#,
            0.5,
        );
        let json = serde_json::to_value(SavePayload::from_collection("a.jpg", &c)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "image_name": "a.jpg",
                "bboxes": [
                    { "coordinates": [10.0, 10.0, 50.0, 50.0], "label": 3, "crowd_flag": false }
                ]
            })
        );
    }

    #[test]
    fn test_tracker_sequences_are_monotonic() {
        let mut t = SaveTracker::new();
        let a = t.begin();
        let b = t.begin();
        assert!(b > a);
    }

    #[test]
    fn test_tracker_discards_stale_completion() {
        let mut t = SaveTracker::new();
        let first = t.begin();
        let second = t.begin();

        // Newer response lands first and wins.
        assert!(t.try_apply(second));
        // The older response completing afterwards is discarded.
        assert!(!t.try_apply(first));
        assert_eq!(t.last_applied(), Some(second));
    }

    #[test]
    fn test_tracker_in_order_completions() {
        let mut t = SaveTracker::new();
        let first = t.begin();
        let second = t.begin();
        assert!(t.try_apply(first));
        assert!(t.try_apply(second));
        assert_eq!(t.last_applied(), Some(second));
    }
}
