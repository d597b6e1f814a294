//! The per-frame landmark sample that gets recorded and submitted.

use serde::{Deserialize, Serialize};

use crate::geometry::Point3D;
use crate::observation::{HandObservation, PINKY_TIP, THUMB_TIP};

/// Number of values in one sample.
pub const SAMPLE_LEN: usize = 6;

/// Thumb tip `(x, y, z)` followed by pinky tip `(x, y, z)`, taken from an
/// observation's 3D keypoints.
///
/// Serializes as a bare six-element array: `[tx, ty, tz, px, py, pz]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSample(pub [f64; SAMPLE_LEN]);

impl LandmarkSample {
    pub fn new(thumb: Point3D, pinky: Point3D) -> Self {
        LandmarkSample([thumb.x, thumb.y, thumb.z, pinky.x, pinky.y, pinky.z])
    }

    pub fn from_observation(obs: &HandObservation) -> Self {
        Self::new(obs.keypoints_3d[THUMB_TIP], obs.keypoints_3d[PINKY_TIP])
    }

    pub fn thumb(&self) -> Point3D {
        Point3D::new(self.0[0], self.0[1], self.0[2])
    }

    pub fn pinky(&self) -> Point3D {
        Point3D::new(self.0[3], self.0[4], self.0[5])
    }

    pub fn values(&self) -> &[f64; SAMPLE_LEN] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2D;
    use crate::observation::{Handedness, KEYPOINT_COUNT};

    fn observation() -> HandObservation {
        let mut kp3 = [Point3D::default(); KEYPOINT_COUNT];
        kp3[THUMB_TIP] = Point3D::new(0.1, 0.2, 0.3);
        kp3[PINKY_TIP] = Point3D::new(0.4, 0.5, 0.6);
        kp3[8] = Point3D::new(9.0, 9.0, 9.0);
        HandObservation::new([Point2D::default(); KEYPOINT_COUNT], kp3, Handedness::Right)
    }

    #[test]
    fn sample_takes_thumb_then_pinky() {
        let s = LandmarkSample::from_observation(&observation());
        assert_eq!(s.values(), &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        assert_eq!(s.thumb(), Point3D::new(0.1, 0.2, 0.3));
        assert_eq!(s.pinky(), Point3D::new(0.4, 0.5, 0.6));
    }

    #[test]
    fn sample_serializes_as_flat_array() {
        let s = LandmarkSample([1.0, 2.0, 3.0, 4.0, 5.0, 6.5]);
        assert_eq!(serde_json::to_string(&s).unwrap(), "[1.0,2.0,3.0,4.0,5.0,6.5]");
    }

    #[test]
    fn sample_rejects_wrong_arity() {
        assert!(serde_json::from_str::<LandmarkSample>("[1.0,2.0,3.0]").is_err());
    }
}
