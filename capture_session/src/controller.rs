//! RecordingController: gates per-frame samples into the session.

use hand_pose::{classify, GateState, HandObservation, LandmarkSample};
use ratio_client::{SubmissionPayload, SubmitError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::event::{AbortReason, SessionEvent};
use crate::session::{RecordingSession, RecordingState, SessionSnapshot};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("a recording is already in progress")]
    AlreadyRecording,
}

// ════════════════════════════════════════════════════════════════════════════
// RecordingController
// ════════════════════════════════════════════════════════════════════════════

/// Owns the one [`RecordingSession`] and every transition on it.
///
/// All methods are called from the same scheduling thread: frame results
/// via [`on_observation`](Self::on_observation), user commands via
/// [`start`](Self::start) / [`stop`](Self::stop).
pub struct RecordingController {
    session:   RecordingSession,
    last_gate: GateState,
    events:    Vec<SessionEvent>,
    completed: u32,
    aborted:   u32,
}

impl Default for RecordingController {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingController {
    pub fn new() -> Self {
        RecordingController {
            session:   RecordingSession::new(),
            last_gate: GateState::NoHand,
            events:    Vec::new(),
            completed: 0,
            aborted:   0,
        }
    }

    // ── user commands ─────────────────────────────────────────────────────

    /// Begin buffering samples.  Only valid from `Idle`.
    pub fn start(&mut self) -> Result<(), ControllerError> {
        if self.session.state() == RecordingState::Recording {
            return Err(ControllerError::AlreadyRecording);
        }
        self.session.begin();
        self.events.push(SessionEvent::RecordingStarted);
        info!("recording started");
        Ok(())
    }

    /// End the recording and hand back its samples for submission.
    ///
    /// Returns `None` (and changes nothing) when no recording is running.
    pub fn stop(&mut self) -> Option<SubmissionPayload> {
        if self.session.state() != RecordingState::Recording {
            debug!("stop ignored: not recording");
            return None;
        }
        let samples = self.session.finish();
        self.completed += 1;
        self.events.push(SessionEvent::RecordingStopped { samples: samples.len() });
        info!(samples = samples.len(), "recording stopped");
        Some(SubmissionPayload::new(samples))
    }

    // ── per-frame input ───────────────────────────────────────────────────

    /// Apply one frame's estimation result.  Returns the gate state so the
    /// caller can display it.
    ///
    /// An observation with non-finite coordinates counts as no hand.
    pub fn on_observation(&mut self, observation: Option<&HandObservation>) -> GateState {
        let observation = observation.filter(|obs| obs.is_finite());
        let gate = classify(observation);
        if gate != self.last_gate {
            debug!(from = ?self.last_gate, to = ?gate, "gate changed");
            self.last_gate = gate;
            self.events.push(SessionEvent::GateChanged(gate));
        }

        if self.session.state() == RecordingState::Recording {
            match observation {
                Some(obs) => self.session.record(LandmarkSample::from_observation(obs)),
                None      => self.abort(AbortReason::NoHandDetected),
            }
        }
        gate
    }

    fn abort(&mut self, reason: AbortReason) {
        let discarded = self.session.finish().len();
        self.aborted += 1;
        warn!(discarded, "recording aborted: {}", reason.message());
        self.events.push(SessionEvent::RecordingAborted { reason, discarded });
    }

    // ── submission outcome ────────────────────────────────────────────────

    /// Turn a submission result into an event.  Never touches the state
    /// machine; a failed submission does not resume recording.
    pub fn record_submission(&mut self, result: Result<String, SubmitError>) {
        let event = match result {
            Ok(response) => SessionEvent::SubmissionSucceeded { response },
            Err(e) => SessionEvent::SubmissionFailed {
                status: e.status(),
                error:  e.to_string(),
            },
        };
        self.events.push(event);
    }

    // ── queries ───────────────────────────────────────────────────────────

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> RecordingState    { self.session.state() }
    pub fn sample_count(&self) -> usize       { self.session.sample_count() }
    pub fn session(&self) -> &RecordingSession { &self.session }
    pub fn last_gate(&self) -> GateState      { self.last_gate }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state:     self.session.state(),
            samples:   self.session.sample_count(),
            last_gate: self.last_gate,
            completed: self.completed,
            aborted:   self.aborted,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
