//! Notifications emitted by the controller for the UI layer.

use hand_pose::GateState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    /// The hand left the frame while recording.
    NoHandDetected,
}

impl AbortReason {
    pub fn message(&self) -> &'static str {
        match self {
            AbortReason::NoHandDetected => "No hand detected",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// Gate state differs from the previous frame's.
    GateChanged(GateState),
    RecordingStarted,
    /// Recording was forced back to idle; `discarded` samples were dropped.
    RecordingAborted { reason: AbortReason, discarded: usize },
    /// `stop()` ended the recording and handed `samples` to submission.
    RecordingStopped { samples: usize },
    /// Response text from the ratio service, verbatim.
    SubmissionSucceeded { response: String },
    SubmissionFailed { error: String, status: Option<u16> },
}
