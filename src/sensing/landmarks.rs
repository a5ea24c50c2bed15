//! Lip landmark arithmetic
//!
//! The face-landmark capability returns a flat list of 3D points using a
//! fixed index scheme. Only the lip-related indices and the two face
//! reference points used for scale normalization matter here.

use serde::{Deserialize, Serialize};

/// A 3D landmark point in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// Euclidean distance to another point
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy)).sqrt()
    }
}

/// Landmark indices for the lip and face reference points
pub mod lip_indices {
    /// Inner upper lip midpoint
    pub const INNER_UPPER: usize = 13;
    /// Inner lower lip midpoint
    pub const INNER_LOWER: usize = 14;
    /// Outer upper lip midpoint
    pub const OUTER_UPPER: usize = 0;
    /// Outer lower lip midpoint
    pub const OUTER_LOWER: usize = 17;
    /// Left mouth corner
    pub const LEFT_CORNER: usize = 61;
    /// Right mouth corner
    pub const RIGHT_CORNER: usize = 291;
    /// Top of the face, forehead reference
    pub const FACE_TOP: usize = 10;
    /// Bottom of the face, chin reference
    pub const FACE_BOTTOM: usize = 152;
}

/// One detected face: a full landmark point set
pub type LandmarkSet = Vec<Point3>;

/// Inner-lip opening normalized by face height.
///
/// Returns `None` when the set is too short for the index scheme or the
/// face reference span is degenerate (coincident top/bottom points).
#[must_use]
pub fn normalized_aperture(landmarks: &LandmarkSet) -> Option<f64> {
    let upper = landmarks.get(lip_indices::INNER_UPPER)?;
    let lower = landmarks.get(lip_indices::INNER_LOWER)?;
    let top = landmarks.get(lip_indices::FACE_TOP)?;
    let bottom = landmarks.get(lip_indices::FACE_BOTTOM)?;

    let face_height = top.distance(bottom);
    if face_height <= f64::EPSILON {
        return None;
    }

    Some(upper.distance(lower) / face_height)
}
