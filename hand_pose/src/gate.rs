//! Distance gate: classifies how well the hand is framed.
//!
//! Purely a function of the observation's 2D thumb/pinky span; it knows
//! nothing about recording state.

use crate::observation::HandObservation;

/// Span above this many pixels means the hand is too close to the camera.
pub const TOO_CLOSE_PX: f64 = 260.0;
/// Span below this many pixels means the hand is too far from the camera.
pub const TOO_FAR_PX: f64 = 110.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateState {
    NoHand,
    TooClose,
    TooFar,
    Ok,
}

impl GateState {
    /// Any detected hand, regardless of framing quality.
    pub fn is_hand_present(&self) -> bool {
        !matches!(self, GateState::NoHand)
    }

    /// Short upper-case label for status displays.
    pub fn label(&self) -> &'static str {
        match self {
            GateState::NoHand   => "NO HAND",
            GateState::TooClose => "TOO CLOSE",
            GateState::TooFar   => "TOO FAR",
            GateState::Ok       => "OK",
        }
    }

    /// User-facing guidance for this state.
    pub fn hint(&self) -> &'static str {
        match self {
            GateState::NoHand   => "Hold your hand up to the camera",
            GateState::TooClose => "Move your hand further from the camera",
            GateState::TooFar   => "Move your hand closer to the camera",
            GateState::Ok       => "Hand distance is good",
        }
    }
}

/// Classify a thumb/pinky span in pixels.  A non-finite span is `NoHand`.
pub fn classify_span(span_px: f64) -> GateState {
    if !span_px.is_finite() {
        GateState::NoHand
    } else if span_px > TOO_CLOSE_PX {
        GateState::TooClose
    } else if span_px < TOO_FAR_PX {
        GateState::TooFar
    } else {
        GateState::Ok
    }
}

/// Classify one frame's observation (or lack of one).
pub fn classify(observation: Option<&HandObservation>) -> GateState {
    match observation {
        None => GateState::NoHand,
        Some(obs) if !obs.is_finite() => GateState::NoHand,
        Some(obs) => classify_span(obs.span_px()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point2D, Point3D};
    use crate::observation::{Handedness, KEYPOINT_COUNT, PINKY_TIP, THUMB_TIP};

    fn with_span(span: f64) -> HandObservation {
        let mut kp = [Point2D::default(); KEYPOINT_COUNT];
        kp[THUMB_TIP] = Point2D::new(50.0, 200.0);
        kp[PINKY_TIP] = Point2D::new(50.0 + span, 200.0);
        HandObservation::new(kp, [Point3D::default(); KEYPOINT_COUNT], Handedness::Right)
    }

    #[test]
    fn absent_hand_is_no_hand() {
        assert_eq!(classify(None), GateState::NoHand);
        assert!(!GateState::NoHand.is_hand_present());
    }

    #[test]
    fn wide_span_is_too_close() {
        assert_eq!(classify(Some(&with_span(300.0))), GateState::TooClose);
    }

    #[test]
    fn narrow_span_is_too_far() {
        assert_eq!(classify(Some(&with_span(80.0))), GateState::TooFar);
    }

    #[test]
    fn mid_span_is_ok() {
        assert_eq!(classify(Some(&with_span(180.0))), GateState::Ok);
    }

    #[test]
    fn boundaries_are_strict() {
        assert_eq!(classify(Some(&with_span(260.0))), GateState::Ok);
        assert_eq!(classify(Some(&with_span(110.0))), GateState::Ok);
        assert_eq!(classify_span(260.0 + 1e-9), GateState::TooClose);
        assert_eq!(classify_span(110.0 - 1e-9), GateState::TooFar);
    }

    #[test]
    fn diagonal_span_measured_euclidean() {
        // 3-4-5 triangle scaled ×40 → 200 px
        let mut obs = with_span(0.0);
        obs.keypoints[THUMB_TIP] = Point2D::new(0.0, 0.0);
        obs.keypoints[PINKY_TIP] = Point2D::new(120.0, 160.0);
        assert_eq!(classify(Some(&obs)), GateState::Ok);
    }

    #[test]
    fn non_finite_coordinates_are_no_hand() {
        let mut obs = with_span(180.0);
        obs.keypoints[PINKY_TIP].x = f64::NAN;
        assert_eq!(classify(Some(&obs)), GateState::NoHand);
        assert_eq!(classify_span(f64::INFINITY), GateState::NoHand);

        let mut obs = with_span(180.0);
        obs.keypoints_3d[THUMB_TIP].y = f64::NAN;
        assert_eq!(classify(Some(&obs)), GateState::NoHand);
    }

    #[test]
    fn classification_is_deterministic() {
        let obs = with_span(259.5);
        let first = classify(Some(&obs));
        for _ in 0..10 {
            assert_eq!(classify(Some(&obs)), first);
        }
    }

    #[test]
    fn every_present_state_counts_as_hand() {
        for s in [GateState::TooClose, GateState::TooFar, GateState::Ok] {
            assert!(s.is_hand_present());
        }
    }
}
