//! The recording session: single authoritative state plus its buffer.

use hand_pose::{GateState, LandmarkSample};

use crate::buffer::LandmarkBuffer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordingState { Idle, Recording }

/// Mutable root of a capture.  Only the controller in this crate can
/// change it; everybody else sees a [`SessionSnapshot`].
#[derive(Debug)]
pub struct RecordingSession {
    state:  RecordingState,
    buffer: LandmarkBuffer,
}

impl RecordingSession {
    pub(crate) fn new() -> Self {
        RecordingSession {
            state:  RecordingState::Idle,
            buffer: LandmarkBuffer::new(),
        }
    }

    pub fn state(&self) -> RecordingState { self.state }
    pub fn sample_count(&self) -> usize  { self.buffer.len() }
    pub fn samples(&self) -> Vec<LandmarkSample> { self.buffer.snapshot() }

    pub(crate) fn begin(&mut self) {
        debug_assert!(self.buffer.is_empty());
        self.state = RecordingState::Recording;
    }

    pub(crate) fn record(&mut self, sample: LandmarkSample) {
        self.buffer.append(sample);
    }

    /// Back to `Idle`, returning what was recorded and leaving the buffer
    /// empty.
    pub(crate) fn finish(&mut self) -> Vec<LandmarkSample> {
        let samples = self.buffer.snapshot();
        self.buffer.clear();
        self.state = RecordingState::Idle;
        samples
    }
}

/// Read-only view for rendering layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub state:     RecordingState,
    pub samples:   usize,
    pub last_gate: GateState,
    /// Recordings that ended in `stop()`.
    pub completed: u32,
    /// Recordings that ended because the hand was lost.
    pub aborted:   u32,
}

impl SessionSnapshot {
    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle_and_empty() {
        let s = RecordingSession::new();
        assert_eq!(s.state(), RecordingState::Idle);
        assert_eq!(s.sample_count(), 0);
    }

    #[test]
    fn finish_returns_samples_and_clears() {
        let mut s = RecordingSession::new();
        s.begin();
        s.record(LandmarkSample([1.0; 6]));
        s.record(LandmarkSample([2.0; 6]));
        let out = s.finish();
        assert_eq!(out.len(), 2);
        assert_eq!(s.sample_count(), 0);
        assert_eq!(s.state(), RecordingState::Idle);
    }
}
