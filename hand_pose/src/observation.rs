//! One frame's detected hand.

use thiserror::Error;

use crate::geometry::{Point2D, Point3D};

// ════════════════════════════════════════════════════════════════════════════
// Keypoint indices (21-point hand topology)
// ════════════════════════════════════════════════════════════════════════════

pub const KEYPOINT_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

// ════════════════════════════════════════════════════════════════════════════
// Handedness
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandObservation
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObservationError {
    #[error("{what}: expected {expected} coordinates, got {actual}")]
    BadLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{what}: coordinate {index} is not finite")]
    NonFinite { what: &'static str, index: usize },
}

/// Keypoints for a single detected hand.
///
/// `keypoints[i]` and `keypoints_3d[i]` describe the same joint; the
/// arrays are fixed-size, so an observation always carries all 21.
#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    /// Image-space pixel coordinates.
    pub keypoints: [Point2D; KEYPOINT_COUNT],
    /// Normalized hand-relative coordinates.
    pub keypoints_3d: [Point3D; KEYPOINT_COUNT],
    pub handedness: Handedness,
}

impl HandObservation {
    pub fn new(
        keypoints: [Point2D; KEYPOINT_COUNT],
        keypoints_3d: [Point3D; KEYPOINT_COUNT],
        handedness: Handedness,
    ) -> Self {
        HandObservation { keypoints, keypoints_3d, handedness }
    }

    /// Build from flat coordinate slices as estimators usually emit them:
    /// `[x0, y0, x1, y1, …]` (42 values) and `[x0, y0, z0, …]` (63 values).
    ///
    /// Every coordinate must be finite.
    pub fn from_flat(
        flat_2d: &[f64],
        flat_3d: &[f64],
        handedness: Handedness,
    ) -> Result<Self, ObservationError> {
        if flat_2d.len() != KEYPOINT_COUNT * 2 {
            return Err(ObservationError::BadLength {
                what: "2D keypoints",
                expected: KEYPOINT_COUNT * 2,
                actual: flat_2d.len(),
            });
        }
        if flat_3d.len() != KEYPOINT_COUNT * 3 {
            return Err(ObservationError::BadLength {
                what: "3D keypoints",
                expected: KEYPOINT_COUNT * 3,
                actual: flat_3d.len(),
            });
        }

        if let Some(index) = flat_2d.iter().position(|v| !v.is_finite()) {
            return Err(ObservationError::NonFinite { what: "2D keypoints", index });
        }
        if let Some(index) = flat_3d.iter().position(|v| !v.is_finite()) {
            return Err(ObservationError::NonFinite { what: "3D keypoints", index });
        }

        let mut keypoints = [Point2D::default(); KEYPOINT_COUNT];
        let mut keypoints_3d = [Point3D::default(); KEYPOINT_COUNT];
        for i in 0..KEYPOINT_COUNT {
            keypoints[i] = Point2D::new(flat_2d[i * 2], flat_2d[i * 2 + 1]);
            keypoints_3d[i] = Point3D::new(
                flat_3d[i * 3],
                flat_3d[i * 3 + 1],
                flat_3d[i * 3 + 2],
            );
        }
        Ok(HandObservation { keypoints, keypoints_3d, handedness })
    }

    /// All 2D and 3D coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.keypoints.iter().all(|p| p.x.is_finite() && p.y.is_finite())
            && self.keypoints_3d.iter().all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
    }

    pub fn thumb_tip(&self) -> Point2D {
        self.keypoints[THUMB_TIP]
    }

    pub fn pinky_tip(&self) -> Point2D {
        self.keypoints[PINKY_TIP]
    }

    /// Pixel distance between thumb tip and pinky tip.
    pub fn span_px(&self) -> f64 {
        self.thumb_tip().distance(&self.pinky_tip())
    }
}
