//! Pose extraction from raw homogeneous transforms.
//!
//! Occurrence transforms arrive as 16-value flattened 4x4 matrices in
//! row-major layout: translation at flat offsets 3, 7 and 11, rotation
//! columns assembled from offsets {0, 4, 8}, {1, 5, 9} and {2, 6, 10}.

use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};

use crate::error::TransformError;

/// Maximum deviation of the rotation determinant from 1 before the
/// transform is rejected as non-orthonormal.
const DET_TOLERANCE: f64 = 1e-3;

/// Minimum rotation-column magnitude before the block counts as degenerate.
const COLUMN_EPSILON: f64 = 1e-6;

/// World-frame pose of one occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    /// Translation in world coordinates.
    pub position: Vector3<f64>,
    /// Orientation as a unit quaternion with non-negative scalar part.
    pub orientation: UnitQuaternion<f64>,
}

impl Pose {
    /// Identity pose at the world origin.
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }

    /// Quaternion components in (w, x, y, z) order.
    pub fn wxyz(&self) -> [f64; 4] {
        let q = self.orientation.quaternion();
        [q.w, q.i, q.j, q.k]
    }
}

/// Extract position and orientation from a flattened homogeneous transform.
///
/// Fails when the rotation block is not a rigid rotation: a determinant
/// deviating from 1 by more than `1e-3`, or a column of near-zero length.
pub fn pose_from_flat(flat: &[f64; 16]) -> Result<Pose, TransformError> {
    let position = Vector3::new(flat[3], flat[7], flat[11]);

    // Row-major 3x3 block; columns are {0,4,8}, {1,5,9}, {2,6,10}.
    let rot = Matrix3::new(
        flat[0], flat[1], flat[2], //
        flat[4], flat[5], flat[6], //
        flat[8], flat[9], flat[10],
    );

    for col in 0..3 {
        if rot.column(col).norm() < COLUMN_EPSILON {
            return Err(TransformError::DegenerateColumn(col));
        }
    }

    let det = rot.determinant();
    if (det - 1.0).abs() > DET_TOLERANCE {
        return Err(TransformError::Determinant(det));
    }

    Ok(Pose {
        position,
        orientation: quaternion_from_matrix(&rot),
    })
}

/// Convert an orthonormal rotation matrix to a unit quaternion.
///
/// Shepperd's method: branch on the largest of the trace and the three
/// diagonal terms so the square root (and hence the divisor) stays well
/// away from zero. The result is normalized and canonicalized to the
/// double-cover representative with non-negative scalar part.
pub fn quaternion_from_matrix(m: &Matrix3<f64>) -> UnitQuaternion<f64> {
    let trace = m[(0, 0)] + m[(1, 1)] + m[(2, 2)];

    let q = if trace > m[(0, 0)] && trace > m[(1, 1)] && trace > m[(2, 2)] {
        let s = (trace + 1.0).sqrt() * 2.0;
        Quaternion::new(
            0.25 * s,
            (m[(2, 1)] - m[(1, 2)]) / s,
            (m[(0, 2)] - m[(2, 0)]) / s,
            (m[(1, 0)] - m[(0, 1)]) / s,
        )
    } else if m[(0, 0)] > m[(1, 1)] && m[(0, 0)] > m[(2, 2)] {
        let s = (1.0 + m[(0, 0)] - m[(1, 1)] - m[(2, 2)]).sqrt() * 2.0;
        Quaternion::new(
            (m[(2, 1)] - m[(1, 2)]) / s,
            0.25 * s,
            (m[(0, 1)] + m[(1, 0)]) / s,
            (m[(0, 2)] + m[(2, 0)]) / s,
        )
    } else if m[(1, 1)] > m[(2, 2)] {
        let s = (1.0 + m[(1, 1)] - m[(0, 0)] - m[(2, 2)]).sqrt() * 2.0;
        Quaternion::new(
            (m[(0, 2)] - m[(2, 0)]) / s,
            (m[(0, 1)] + m[(1, 0)]) / s,
            0.25 * s,
            (m[(1, 2)] + m[(2, 1)]) / s,
        )
    } else {
        let s = (1.0 + m[(2, 2)] - m[(0, 0)] - m[(1, 1)]).sqrt() * 2.0;
        Quaternion::new(
            (m[(1, 0)] - m[(0, 1)]) / s,
            (m[(0, 2)] + m[(2, 0)]) / s,
            (m[(1, 2)] + m[(2, 1)]) / s,
            0.25 * s,
        )
    };

    canonicalize(UnitQuaternion::new_normalize(q))
}

/// Pick the double-cover representative with non-negative scalar part.
fn canonicalize(q: UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    if q.w < 0.0 {
        UnitQuaternion::new_unchecked(Quaternion::new(-q.w, -q.i, -q.j, -q.k))
    } else {
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Rotation3, Unit};
    use std::f64::consts::PI;

    fn flat_from(rot: &Matrix3<f64>, t: [f64; 3]) -> [f64; 16] {
        [
            rot[(0, 0)], rot[(0, 1)], rot[(0, 2)], t[0], //
            rot[(1, 0)], rot[(1, 1)], rot[(1, 2)], t[1], //
            rot[(2, 0)], rot[(2, 1)], rot[(2, 2)], t[2], //
            0.0, 0.0, 0.0, 1.0,
        ]
    }

    #[test]
    fn identity_pose() {
        let flat = flat_from(&Matrix3::identity(), [0.0, 0.0, 0.0]);
        let pose = pose_from_flat(&flat).unwrap();
        assert!(pose.position.norm() < 1e-12);
        assert_eq!(pose.wxyz(), [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn translation_offsets() {
        let flat = flat_from(&Matrix3::identity(), [0.1, -0.2, 0.3]);
        let pose = pose_from_flat(&flat).unwrap();
        assert!((pose.position.x - 0.1).abs() < 1e-12);
        assert!((pose.position.y + 0.2).abs() < 1e-12);
        assert!((pose.position.z - 0.3).abs() < 1e-12);
    }

    #[test]
    fn matrix_quaternion_roundtrip() {
        let cases = [
            (Vector3::new(0.0, 0.0, 1.0), PI / 2.0),
            (Vector3::new(1.0, 2.0, 3.0), 1.2),
            (Vector3::new(-1.0, 0.5, 0.25), 2.9),
            (Vector3::new(0.0, 1.0, 0.0), PI - 1e-4),
        ];

        for (axis, angle) in cases {
            let rot = Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle);
            let m = *rot.matrix();
            let q = quaternion_from_matrix(&m);
            let back = *q.to_rotation_matrix().matrix();

            for i in 0..3 {
                for j in 0..3 {
                    assert!(
                        (m[(i, j)] - back[(i, j)]).abs() < 1e-6,
                        "axis {axis:?} angle {angle}: entry ({i},{j}) drifted"
                    );
                }
            }
        }
    }

    #[test]
    fn scalar_part_is_canonical() {
        // Rotations near pi exercise the diagonal branches where the
        // naive trace formula would divide by a near-zero root.
        for angle in [0.1, PI / 2.0, PI - 1e-6, PI] {
            let rot = Rotation3::from_axis_angle(&Unit::new_normalize(Vector3::x()), angle);
            let q = quaternion_from_matrix(rot.matrix());
            assert!(q.w >= 0.0, "angle {angle}: scalar part {} is negative", q.w);
            assert!((q.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_scaled_rotation() {
        let m = Matrix3::identity() * 1.1;
        let flat = flat_from(&m, [0.0, 0.0, 0.0]);
        let err = pose_from_flat(&flat).unwrap_err();
        assert!(matches!(err, TransformError::Determinant(_)));
    }

    #[test]
    fn rejects_zero_column() {
        let mut m = Matrix3::identity();
        m[(0, 1)] = 0.0;
        m[(1, 1)] = 0.0;
        m[(2, 1)] = 0.0;
        let flat = flat_from(&m, [0.0, 0.0, 0.0]);
        let err = pose_from_flat(&flat).unwrap_err();
        assert!(matches!(err, TransformError::DegenerateColumn(1)));
    }
}
