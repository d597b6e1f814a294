//! # hand_pose
//!
//! The per-frame data a hand pose estimator reports, and the pure
//! functions the capture workflow applies to it:
//!
//! * [`HandObservation`]: 21 image-space keypoints plus 21 normalized 3D
//!   keypoints for one detected hand.  "No hand" is `Option::None`.
//! * [`LandmarkSample`]: the six values recorded per frame: thumb tip
//!   `(x, y, z)` followed by pinky tip `(x, y, z)`.
//! * [`classify`]: the distance gate.  Compares the pixel span between
//!   thumb tip and pinky tip against two fixed thresholds.
//!
//! ## Gate thresholds
//!
//! | Span (px) | [`GateState`] |
//! |---|---|
//! | no observation | `NoHand` |
//! | `> 260` | `TooClose` |
//! | `< 110` | `TooFar` |
//! | `110 ..= 260` | `Ok` |
//!
//! ```rust
//! use hand_pose::{classify, GateState};
//!
//! assert_eq!(classify(None), GateState::NoHand);
//! ```

pub mod geometry;
pub mod observation;
pub mod sample;
pub mod gate;

pub use geometry::{Point2D, Point3D};
pub use observation::{
    HandObservation, Handedness, ObservationError,
    KEYPOINT_COUNT, WRIST, THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP,
};
pub use sample::{LandmarkSample, SAMPLE_LEN};
pub use gate::{classify, classify_span, GateState, TOO_CLOSE_PX, TOO_FAR_PX};
