//! LeapMotion hand tracking (feature = "leap").
//!
//! The Leap device is both camera and estimator: [`LeapCamera`] only paces
//! the loop, and [`LeapEstimator`] polls the tracking stream for the next
//! frame when asked to estimate.
//!
//! # Mapping
//!
//! Leap reports millimetres above the device.  Each digit contributes four
//! joints (metacarpal base, metacarpal end, distal base, distal tip) to the
//! matching slots of the 21-point topology; the palm stands in for the
//! wrist.  2D keypoints are a pinhole projection looking down the Y axis,
//! so the thumb/pinky pixel span grows as the hand approaches the device,
//! the same way it does in front of a camera.  3D keypoints are metres
//! relative to the palm.

use hand_pose::{HandObservation, Handedness, Point2D, KEYPOINT_COUNT};
use leaprs::*;
use tracing::{debug, info};

use crate::source::{Camera, CaptureError, EstimationError, PoseEstimator};

/// Pixels per millimetre at 1 mm height; divided by palm height.
const FOCAL_PX: f32 = 240.0;
/// Polls before giving up on a tracking frame.
const MAX_POLLS: u32 = 10;
const POLL_TIMEOUT_MS: u32 = 50;

/// Capture tick for the Leap device; carries no pixels.
#[derive(Clone, Copy, Debug)]
pub struct LeapTick;

#[derive(Default)]
pub struct LeapCamera;

impl Camera for LeapCamera {
    type Frame = LeapTick;

    fn capture_frame(&mut self) -> Result<LeapTick, CaptureError> {
        Ok(LeapTick)
    }
}

pub struct LeapEstimator {
    connection: Option<Connection>,
    width:      u32,
    height:     u32,
}

impl LeapEstimator {
    /// Connect to the first LeapMotion device.  Call this on the thread
    /// that will poll it.
    pub fn open(width: u32, height: u32) -> Result<Self, EstimationError> {
        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| EstimationError::Unavailable(format!("LeapC connection: {:?}", e)))?;
        connection.open()
            .map_err(|e| EstimationError::Unavailable(format!("LeapMotion device: {:?}", e)))?;
        info!("LeapMotion connection open");
        Ok(LeapEstimator { connection: Some(connection), width, height })
    }
}

fn project(width: u32, height: u32, x: f32, y: f32, z: f32) -> Point2D {
    let scale = FOCAL_PX / y.max(1.0);
    Point2D::new(
        (width  as f32 / 2.0 + x * scale) as f64,
        (height as f32 / 2.0 + z * scale) as f64,
    )
}

impl PoseEstimator for LeapEstimator {
    type Frame = LeapTick;

    fn estimate(&mut self, _tick: &LeapTick)
        -> Result<Option<HandObservation>, EstimationError>
    {
        let (width, height) = (self.width, self.height);
        let connection = self.connection.as_mut()
            .ok_or_else(|| EstimationError::Unavailable("connection closed".into()))?;

        for _ in 0..MAX_POLLS {
            let msg = match connection.poll(POLL_TIMEOUT_MS) {
                Ok(m)  => m,
                Err(_) => continue,
            };
            if let Event::Tracking(frame) = msg.event() {
                let hand = match frame.hands().next() {
                    Some(h) => h,
                    None    => return Ok(None),
                };

                let handedness = if hand.hand_type() == HandType::Left {
                    Handedness::Left
                } else {
                    Handedness::Right
                };

                let palm = hand.palm().position();
                let (px, py, pz) = (palm.x, palm.y, palm.z);
                let mut xy  = [0.0; KEYPOINT_COUNT * 2];
                let mut xyz = [0.0; KEYPOINT_COUNT * 3];
                let mut put = |slot: usize, x: f32, y: f32, z: f32| {
                    let p = project(width, height, x, y, z);
                    xy[slot * 2]     = p.x;
                    xy[slot * 2 + 1] = p.y;
                    xyz[slot * 3]     = ((x - px) / 1000.0) as f64;
                    xyz[slot * 3 + 1] = ((y - py) / 1000.0) as f64;
                    xyz[slot * 3 + 2] = ((z - pz) / 1000.0) as f64;
                };
                // Palm first in every slot; digits overwrite theirs.
                for slot in 0..KEYPOINT_COUNT {
                    put(slot, px, py, pz);
                }

                for (finger, digit) in hand.digits().enumerate().take(5) {
                    let base = 1 + finger * 4;
                    let joints = [
                        digit.metacarpal().prev_joint(),
                        digit.metacarpal().next_joint(),
                        digit.distal().prev_joint(),
                        digit.distal().next_joint(),
                    ];
                    for (j, v) in joints.iter().enumerate() {
                        put(base + j, v.x, v.y, v.z);
                    }
                }

                let obs = HandObservation::from_flat(&xy, &xyz, handedness)
                    .map_err(|e| EstimationError::Failed(format!("LeapMotion hand: {}", e)))?;
                return Ok(Some(obs));
            }
        }
        Err(EstimationError::Failed("no tracking frame from LeapMotion".into()))
    }

    fn close(&mut self) {
        if self.connection.take().is_some() {
            debug!("LeapMotion connection closed");
        }
    }
}
