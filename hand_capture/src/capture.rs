//! CaptureLoop: camera → estimator → gate → controller, one frame at a time.
//!
//! Estimation runs on its own worker thread.  The loop keeps a single-slot
//! in-flight marker: a new frame is captured only after the previous
//! estimate has come back, so results are always applied in capture order
//! and a slow estimator throttles capture instead of piling up work.
//! Every frame also carries a sequence number; a result that is not newer
//! than the last one applied is dropped.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use capture_session::RecordingController;
use hand_pose::{GateState, HandObservation};
use tracing::{debug, error, info, warn};

use crate::source::{Camera, EstimationError, PoseEstimator};

// ════════════════════════════════════════════════════════════════════════════
// Worker messages
// ════════════════════════════════════════════════════════════════════════════

struct Job<F> {
    seq:   u64,
    frame: F,
}

struct Estimate {
    seq:    u64,
    result: Result<Option<HandObservation>, EstimationError>,
}

/// What one call to [`CaptureLoop::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No estimate ready yet (a frame may have been dispatched).
    Waiting,
    /// An estimate was applied to the controller.
    Processed(GateState),
    /// An out-of-order estimate was dropped.
    Stale,
    /// The loop has been shut down or its worker is gone.
    Stopped,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub captured:            u64,
    pub processed:           u64,
    pub capture_failures:    u64,
    pub estimation_failures: u64,
    pub stale:               u64,
}

// ════════════════════════════════════════════════════════════════════════════
// CaptureLoop
// ════════════════════════════════════════════════════════════════════════════

pub struct CaptureLoop<C: Camera> {
    camera:           C,
    job_tx:           Option<Sender<Job<C::Frame>>>,
    result_rx:        Receiver<Estimate>,
    worker:           Option<JoinHandle<()>>,
    in_flight:        Option<u64>,
    next_seq:         u64,
    min_seq:          u64,
    last_applied:     Option<u64>,
    last_observation: Option<HandObservation>,
    stats:            LoopStats,
}

impl<C: Camera> CaptureLoop<C> {
    /// Start the estimation worker.  `make_estimator` runs on the worker
    /// thread, so estimators holding thread-bound device handles are fine.
    pub fn spawn<E, F>(camera: C, make_estimator: F) -> Self
    where
        E: PoseEstimator<Frame = C::Frame> + 'static,
        F: FnOnce() -> Result<E, EstimationError> + Send + 'static,
    {
        let (job_tx, result_rx, worker) = spawn_worker(make_estimator);
        CaptureLoop {
            camera,
            job_tx:           Some(job_tx),
            result_rx,
            worker:           Some(worker),
            in_flight:        None,
            next_seq:         0,
            min_seq:          0,
            last_applied:     None,
            last_observation: None,
            stats:            LoopStats::default(),
        }
    }

    /// Run one scheduling step.
    ///
    /// Never fails: capture and estimation errors are logged, counted, and
    /// the next tick carries on.
    pub fn tick(&mut self, controller: &mut RecordingController) -> TickOutcome {
        if self.job_tx.is_none() {
            return TickOutcome::Stopped;
        }

        let outcome = match self.result_rx.try_recv() {
            Ok(estimate) => self.apply(estimate, controller),
            Err(TryRecvError::Empty) => TickOutcome::Waiting,
            Err(TryRecvError::Disconnected) => {
                error!("estimation worker exited; stopping capture");
                self.shutdown();
                return TickOutcome::Stopped;
            }
        };

        if self.in_flight.is_none() && !self.dispatch() {
            return TickOutcome::Stopped;
        }
        outcome
    }

    fn apply(&mut self, estimate: Estimate, controller: &mut RecordingController) -> TickOutcome {
        if self.in_flight == Some(estimate.seq) {
            self.in_flight = None;
        }
        if estimate.seq < self.min_seq {
            self.stats.stale += 1;
            debug!(seq = estimate.seq, min_seq = self.min_seq, "dropping estimate captured before start");
            return TickOutcome::Stale;
        }
        if self.last_applied.is_some_and(|last| estimate.seq <= last) {
            self.stats.stale += 1;
            debug!(seq = estimate.seq, "dropping out-of-order estimate");
            return TickOutcome::Stale;
        }
        self.last_applied = Some(estimate.seq);

        let observation = match estimate.result {
            Ok(obs) => obs,
            Err(e) => {
                self.stats.estimation_failures += 1;
                warn!(seq = estimate.seq, error = %e, "estimation failed; treating frame as empty");
                None
            }
        };

        let gate = controller.on_observation(observation.as_ref());
        self.last_observation = observation;
        self.stats.processed += 1;
        TickOutcome::Processed(gate)
    }

    /// Mark a recording start.  Estimates of frames captured before this
    /// call are dropped as stale, so nothing seen while idle can be recorded
    /// into (or abort) the new recording.
    pub fn mark_start(&mut self) {
        self.min_seq = self.next_seq;
    }

    /// Capture one frame and hand it to the worker.  Returns false when the
    /// worker is gone.
    fn dispatch(&mut self) -> bool {
        let frame = match self.camera.capture_frame() {
            Ok(f) => f,
            Err(e) => {
                self.stats.capture_failures += 1;
                warn!(error = %e, "skipping frame");
                return true;
            }
        };

        let seq = self.next_seq;
        let sent = match &self.job_tx {
            Some(tx) => tx.send(Job { seq, frame }).is_ok(),
            None     => false,
        };
        if !sent {
            error!("estimation worker is not accepting frames; stopping capture");
            self.shutdown();
            return false;
        }

        self.next_seq += 1;
        self.in_flight = Some(seq);
        self.stats.captured += 1;
        true
    }

    /// Stop scheduling, close the estimator, and join the worker.  Safe to
    /// call more than once.
    ///
    /// Blocks until an estimation already in progress returns.
    pub fn shutdown(&mut self) {
        let Some(job_tx) = self.job_tx.take() else { return };
        drop(job_tx);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("estimation worker panicked");
            }
        }
        self.in_flight = None;
        info!(
            captured  = self.stats.captured,
            processed = self.stats.processed,
            "capture loop stopped"
        );
    }

    pub fn is_running(&self) -> bool { self.job_tx.is_some() }
    pub fn in_flight(&self) -> bool  { self.in_flight.is_some() }
    pub fn stats(&self) -> LoopStats { self.stats }
    pub fn camera(&self) -> &C       { &self.camera }

    /// Most recently applied observation, for rendering.
    pub fn last_observation(&self) -> Option<&HandObservation> {
        self.last_observation.as_ref()
    }
}

impl<C: Camera> Drop for CaptureLoop<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Estimation worker
// ════════════════════════════════════════════════════════════════════════════

fn spawn_worker<E, F>(make_estimator: F)
    -> (Sender<Job<E::Frame>>, Receiver<Estimate>, JoinHandle<()>)
where
    E: PoseEstimator + 'static,
    F: FnOnce() -> Result<E, EstimationError> + Send + 'static,
{
    let (job_tx, job_rx) = mpsc::channel::<Job<E::Frame>>();
    let (result_tx, result_rx) = mpsc::channel::<Estimate>();
    let worker = thread::spawn(move || estimation_worker::<E, F>(make_estimator, job_rx, result_tx));
    (job_tx, result_rx, worker)
}

fn estimation_worker<E, F>(make_estimator: F, jobs: Receiver<Job<E::Frame>>, results: Sender<Estimate>)
where
    E: PoseEstimator,
    F: FnOnce() -> Result<E, EstimationError>,
{
    let mut estimator = match make_estimator() {
        Ok(e)  => e,
        Err(e) => {
            error!(error = %e, "could not create pose estimator");
            return;
        }
    };
    debug!("estimation worker running");

    for job in jobs {
        let result = estimator.estimate(&job.frame);
        if results.send(Estimate { seq: job.seq, result }).is_err() {
            break;
        }
    }

    estimator.close();
    debug!("estimation worker stopped");
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
