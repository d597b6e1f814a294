//! Frame sources and pose estimators.
//!
//! The capture loop only sees the [`Camera`] and [`PoseEstimator`] traits;
//! it doesn't need to know whether frames come from the keyboard-driven
//! simulator or from real hardware.

use std::sync::mpsc::Receiver;

use hand_pose::{HandObservation, Handedness, ObservationError, Point2D, KEYPOINT_COUNT};
use thiserror::Error;
use tracing::debug;

// ════════════════════════════════════════════════════════════════════════════
// Collaborator traits
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("frame acquisition failed: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum EstimationError {
    #[error("pose estimation failed: {0}")]
    Failed(String),
    #[error("pose estimator unavailable: {0}")]
    Unavailable(String),
}

/// Snapshot source, polled once per scheduled capture.
pub trait Camera {
    type Frame: Send + 'static;
    fn capture_frame(&mut self) -> Result<Self::Frame, CaptureError>;
}

/// Black-box hand pose estimation.
///
/// Constructed on, and only ever used from, the estimation worker thread,
/// so it may block as long as it needs; `Ok(None)` means no hand in the
/// frame.
pub trait PoseEstimator {
    type Frame: Send + 'static;

    fn estimate(&mut self, frame: &Self::Frame)
        -> Result<Option<HandObservation>, EstimationError>;

    /// Release model / device resources.  Called once, on teardown.
    fn close(&mut self);
}

// ════════════════════════════════════════════════════════════════════════════
// Simulated hand
// ════════════════════════════════════════════════════════════════════════════

const MIN_SPAN_PX: f64 = 20.0;
const MAX_SPAN_PX: f64 = 600.0;

/// Raw input for the simulator, sent by the window or the console.
#[derive(Clone, Debug, PartialEq)]
pub enum SimInput {
    ToggleHand,
    SetHandPresent(bool),
    /// Grow (positive) or shrink the thumb/pinky span in pixels.
    AdjustSpan(f64),
    SetSpan(f64),
    Move { dx: f64, dy: f64 },
    FlipHand,
}

/// The hand the simulator pretends to see.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimHand {
    pub centre:     Point2D,
    /// Pixel distance between thumb tip and pinky tip.
    pub span_px:    f64,
    pub present:    bool,
    pub handedness: Handedness,
}

impl SimHand {
    /// A comfortably framed right hand in the middle of the image.
    pub fn centred(width: u32, height: u32) -> Self {
        SimHand {
            centre:     Point2D::new(width as f64 / 2.0, height as f64 / 2.0),
            span_px:    180.0,
            present:    true,
            handedness: Handedness::Right,
        }
    }

    /// Apply one input.  Inputs carrying NaN or infinite values are ignored.
    pub fn apply(&mut self, input: SimInput, width: u32, height: u32) {
        let finite = match &input {
            SimInput::AdjustSpan(v) | SimInput::SetSpan(v) => v.is_finite(),
            SimInput::Move { dx, dy }                      => dx.is_finite() && dy.is_finite(),
            _                                              => true,
        };
        if !finite {
            debug!(?input, "ignoring non-finite simulator input");
            return;
        }
        match input {
            SimInput::ToggleHand          => self.present = !self.present,
            SimInput::SetHandPresent(p)   => self.present = p,
            SimInput::AdjustSpan(delta)   => self.span_px = (self.span_px + delta).clamp(MIN_SPAN_PX, MAX_SPAN_PX),
            SimInput::SetSpan(span)       => self.span_px = span.clamp(MIN_SPAN_PX, MAX_SPAN_PX),
            SimInput::Move { dx, dy }     => {
                self.centre.x = (self.centre.x + dx).clamp(0.0, width as f64);
                self.centre.y = (self.centre.y + dy).clamp(0.0, height as f64);
            }
            SimInput::FlipHand            => self.handedness = self.handedness.flipped(),
        }
    }
}

/// One simulated frame: image size plus the hand in view (if any).
#[derive(Clone, Debug, PartialEq)]
pub struct SimFrame {
    pub width:  u32,
    pub height: u32,
    pub hand:   Option<SimHand>,
}

// ── SimCamera ─────────────────────────────────────────────────────────────

/// Camera whose "image" is the current simulated hand.  Applies any
/// pending [`SimInput`]s before each snapshot.
pub struct SimCamera {
    rx:     Receiver<SimInput>,
    hand:   SimHand,
    width:  u32,
    height: u32,
}

impl SimCamera {
    pub fn new(rx: Receiver<SimInput>, width: u32, height: u32) -> Self {
        SimCamera { rx, hand: SimHand::centred(width, height), width, height }
    }

    pub fn hand(&self) -> &SimHand { &self.hand }
}

impl Camera for SimCamera {
    type Frame = SimFrame;

    fn capture_frame(&mut self) -> Result<SimFrame, CaptureError> {
        while let Ok(input) = self.rx.try_recv() {
            self.hand.apply(input, self.width, self.height);
        }
        Ok(SimFrame {
            width:  self.width,
            height: self.height,
            hand:   self.hand.present.then_some(self.hand),
        })
    }
}

// ── SimEstimator ──────────────────────────────────────────────────────────

/// Estimator that renders the simulated hand into a full 21-keypoint
/// observation.
#[derive(Default)]
pub struct SimEstimator;

impl PoseEstimator for SimEstimator {
    type Frame = SimFrame;

    fn estimate(&mut self, frame: &SimFrame)
        -> Result<Option<HandObservation>, EstimationError>
    {
        match frame.hand {
            Some(h) => synthesize(&h, frame.width, frame.height)
                .map(Some)
                .map_err(|e| EstimationError::Failed(e.to_string())),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        debug!("simulated estimator closed");
    }
}

/// Fingertip offsets in units of span, thumb first.  Thumb and pinky sit on
/// the same row so their distance is exactly the span.
const TIP_X: [f64; 5] = [-0.5, -0.25, 0.0, 0.25, 0.5];
const TIP_Y: [f64; 5] = [ 0.0, -0.35, -0.45, -0.35, 0.0];
/// Joint positions along wrist→tip for the four joints of each finger.
const JOINT_T: [f64; 4] = [0.35, 0.6, 0.8, 1.0];

fn synthesize(hand: &SimHand, width: u32, height: u32) -> Result<HandObservation, ObservationError> {
    let (w, h) = (width.max(1) as f64, height.max(1) as f64);
    let s = hand.span_px;
    let c = hand.centre;
    // Right hand facing the camera: thumb on the image's left.
    let dir = match hand.handedness {
        Handedness::Right =>  1.0,
        Handedness::Left  => -1.0,
    };

    let mut xy  = Vec::with_capacity(KEYPOINT_COUNT * 2);
    let mut xyz = Vec::with_capacity(KEYPOINT_COUNT * 3);
    let mut push = |x: f64, y: f64, z: f64| {
        xy.extend([x, y]);
        xyz.extend([(x - c.x) / w, (y - c.y) / h, z]);
    };

    let wrist = Point2D::new(c.x, c.y + 0.9 * s);
    push(wrist.x, wrist.y, 0.0);

    for finger in 0..5 {
        let tip = Point2D::new(c.x + dir * TIP_X[finger] * s, c.y + TIP_Y[finger] * s);
        for (j, t) in JOINT_T.iter().enumerate() {
            push(
                wrist.x + (tip.x - wrist.x) * t,
                wrist.y + (tip.y - wrist.y) * t,
                -0.02 * (j + 1) as f64,
            );
        }
    }

    HandObservation::from_flat(&xy, &xyz, hand.handedness)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_pose::{classify, GateState, PINKY_TIP, THUMB_TIP, WRIST};
    use std::sync::mpsc;

    #[test]
    fn synthesized_span_matches_sim_span() {
        for span in [80.0, 110.0, 180.0, 300.0] {
            let mut hand = SimHand::centred(640, 480);
            hand.span_px = span;
            let obs = synthesize(&hand, 640, 480).unwrap();
            assert!((obs.span_px() - span).abs() < 1e-9);
        }
    }

    #[test]
    fn default_sim_hand_passes_the_gate() {
        let obs = synthesize(&SimHand::centred(640, 480), 640, 480).unwrap();
        assert_eq!(classify(Some(&obs)), GateState::Ok);
    }

    #[test]
    fn left_hand_mirrors_thumb() {
        let mut hand = SimHand::centred(640, 480);
        let right = synthesize(&hand, 640, 480).unwrap();
        hand.handedness = Handedness::Left;
        let left = synthesize(&hand, 640, 480).unwrap();
        assert!(right.keypoints[THUMB_TIP].x < right.keypoints[PINKY_TIP].x);
        assert!(left.keypoints[THUMB_TIP].x > left.keypoints[PINKY_TIP].x);
        assert_eq!(left.handedness, Handedness::Left);
    }

    #[test]
    fn wrist_is_origin_depth() {
        let obs = synthesize(&SimHand::centred(640, 480), 640, 480).unwrap();
        assert_eq!(obs.keypoints_3d[WRIST].z, 0.0);
        assert!(obs.keypoints_3d[THUMB_TIP].z < 0.0);
    }

    #[test]
    fn camera_applies_pending_inputs() {
        let (tx, rx) = mpsc::channel();
        let mut cam = SimCamera::new(rx, 640, 480);
        tx.send(SimInput::AdjustSpan(50.0)).unwrap();
        tx.send(SimInput::Move { dx: -20.0, dy: 10.0 }).unwrap();

        let frame = cam.capture_frame().unwrap();
        let hand = frame.hand.unwrap();
        assert_eq!(hand.span_px, 230.0);
        assert_eq!(hand.centre, Point2D::new(300.0, 250.0));
    }

    #[test]
    fn hidden_hand_yields_no_observation() {
        let (tx, rx) = mpsc::channel();
        let mut cam = SimCamera::new(rx, 640, 480);
        tx.send(SimInput::ToggleHand).unwrap();

        let frame = cam.capture_frame().unwrap();
        assert!(frame.hand.is_none());
        assert_eq!(SimEstimator.estimate(&frame).unwrap(), None);
    }

    #[test]
    fn span_is_clamped() {
        let mut hand = SimHand::centred(640, 480);
        hand.apply(SimInput::SetSpan(5_000.0), 640, 480);
        assert_eq!(hand.span_px, MAX_SPAN_PX);
        hand.apply(SimInput::AdjustSpan(-10_000.0), 640, 480);
        assert_eq!(hand.span_px, MIN_SPAN_PX);
    }

    #[test]
    fn non_finite_inputs_are_ignored() {
        let mut hand = SimHand::centred(640, 480);
        let before = hand;
        hand.apply(SimInput::Move { dx: f64::NAN, dy: 0.0 }, 640, 480);
        hand.apply(SimInput::SetSpan(f64::INFINITY), 640, 480);
        hand.apply(SimInput::AdjustSpan(f64::NAN), 640, 480);
        assert_eq!(hand, before);

        let frame = SimFrame { width: 640, height: 480, hand: Some(hand) };
        assert!(SimEstimator.estimate(&frame).unwrap().unwrap().is_finite());
    }

    #[test]
    fn camera_survives_disconnected_input() {
        let (tx, rx) = mpsc::channel::<SimInput>();
        drop(tx);
        let mut cam = SimCamera::new(rx, 640, 480);
        assert!(cam.capture_frame().unwrap().hand.is_some());
    }
}
