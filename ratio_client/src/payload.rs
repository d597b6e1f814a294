//! Submission payload: the request body sent to the ratio service.

use hand_pose::LandmarkSample;
use serde::{Deserialize, Serialize};

/// `{ "landmarks": [[tx, ty, tz, px, py, pz], ...] }`, one inner array per
/// recorded frame, in capture order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub landmarks: Vec<LandmarkSample>,
}

impl SubmissionPayload {
    pub fn new(landmarks: Vec<LandmarkSample>) -> Self {
        SubmissionPayload { landmarks }
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
