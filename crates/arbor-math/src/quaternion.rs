//! Unit quaternions for 3D rotations.
//!
//! Convention: q = [w; x; y; z] with w the scalar part. Configuration vectors
//! store quaternions as (x, y, z, w), see [`Quat::from_xyzw`] and
//! [`Quat::write_xyzw`].

use crate::{Mat3, Vec3};

/// A quaternion, unit-norm when used as a rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quat {
    /// Scalar part (w).
    pub w: f64,
    /// Vector part (x, y, z).
    pub v: Vec3,
}

impl Quat {
    /// Create a new quaternion from scalar and vector parts.
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self {
            w,
            v: Vec3::new(x, y, z),
        }
    }

    /// Identity quaternion (no rotation).
    pub fn identity() -> Self {
        Self {
            w: 1.0,
            v: Vec3::zeros(),
        }
    }

    /// Read from an (x, y, z, w) slice of at least four entries.
    pub fn from_xyzw(s: &[f64]) -> Self {
        Self::new(s[3], s[0], s[1], s[2])
    }

    /// Write as (x, y, z, w) into the first four entries of `out`.
    pub fn write_xyzw(&self, out: &mut [f64]) {
        out[0] = self.v.x;
        out[1] = self.v.y;
        out[2] = self.v.z;
        out[3] = self.w;
    }

    /// Create quaternion from axis-angle; `axis` must be a unit vector.
    pub fn from_axis_angle(axis: &Vec3, angle: f64) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self { w: c, v: *axis * s }
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.v.norm_squared()).sqrt()
    }

    /// Normalize to unit length. Degenerate inputs map to identity.
    pub fn normalize(&self) -> Self {
        let norm = self.norm();
        if norm < 1e-12 {
            return Self::identity();
        }
        Self {
            w: self.w / norm,
            v: self.v / norm,
        }
    }

    /// Hamilton product: self * other.
    pub fn mul(&self, other: &Quat) -> Quat {
        Quat {
            w: self.w * other.w - self.v.dot(&other.v),
            v: self.v.cross(&other.v) + other.v * self.w + self.v * other.w,
        }
    }

    /// Conjugate (inverse for unit quaternions).
    pub fn conjugate(&self) -> Quat {
        Quat {
            w: self.w,
            v: -self.v,
        }
    }

    /// Convert to a 3x3 rotation matrix.
    pub fn to_matrix(&self) -> Mat3 {
        let (w, x, y, z) = (self.w, self.v.x, self.v.y, self.v.z);

        let x2 = x * x;
        let y2 = y * y;
        let z2 = z * z;
        let xy = x * y;
        let xz = x * z;
        let yz = y * z;
        let wx = w * x;
        let wy = w * y;
        let wz = w * z;

        Mat3::new(
            1.0 - 2.0 * (y2 + z2),
            2.0 * (xy - wz),
            2.0 * (xz + wy),
            2.0 * (xy + wz),
            1.0 - 2.0 * (x2 + z2),
            2.0 * (yz - wx),
            2.0 * (xz - wy),
            2.0 * (yz + wx),
            1.0 - 2.0 * (x2 + y2),
        )
    }

    /// Convert a rotation matrix to a quaternion (Shepperd's method).
    ///
    /// The result has a non-negative scalar part.
    pub fn from_matrix(m: &Mat3) -> Quat {
        let trace = m.trace();

        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Quat::new(
                0.25 * s,
                (m[(2, 1)] - m[(1, 2)]) / s,
                (m[(0, 2)] - m[(2, 0)]) / s,
                (m[(1, 0)] - m[(0, 1)]) / s,
            )
        } else if m[(0, 0)] > m[(1, 1)] && m[(0, 0)] > m[(2, 2)] {
            let s = (1.0 + m[(0, 0)] - m[(1, 1)] - m[(2, 2)]).sqrt() * 2.0;
            Quat::new(
                (m[(2, 1)] - m[(1, 2)]) / s,
                0.25 * s,
                (m[(0, 1)] + m[(1, 0)]) / s,
                (m[(0, 2)] + m[(2, 0)]) / s,
            )
        } else if m[(1, 1)] > m[(2, 2)] {
            let s = (1.0 + m[(1, 1)] - m[(0, 0)] - m[(2, 2)]).sqrt() * 2.0;
            Quat::new(
                (m[(0, 2)] - m[(2, 0)]) / s,
                (m[(0, 1)] + m[(1, 0)]) / s,
                0.25 * s,
                (m[(1, 2)] + m[(2, 1)]) / s,
            )
        } else {
            let s = (1.0 + m[(2, 2)] - m[(0, 0)] - m[(1, 1)]).sqrt() * 2.0;
            Quat::new(
                (m[(1, 0)] - m[(0, 1)]) / s,
                (m[(0, 2)] + m[(2, 0)]) / s,
                (m[(1, 2)] + m[(2, 1)]) / s,
                0.25 * s,
            )
        };

        if q.w < 0.0 {
            Quat { w: -q.w, v: -q.v }
        } else {
            q
        }
    }

    /// Exponential map of a rotation vector `θ u`.
    pub fn exp(w: &Vec3) -> Quat {
        let theta = w.norm();
        if theta < 1e-10 {
            Quat { w: 1.0, v: *w * 0.5 }.normalize()
        } else {
            let (s, c) = (theta * 0.5).sin_cos();
            Quat {
                w: c,
                v: *w * (s / theta),
            }
        }
    }

    /// Logarithmic map: the rotation vector of the shortest rotation.
    pub fn log(&self) -> Vec3 {
        let (w, v) = if self.w < 0.0 {
            (-self.w, -self.v)
        } else {
            (self.w, self.v)
        };
        let v_norm = v.norm();
        if v_norm < 1e-10 {
            // first order: 2 v / w
            return v * (2.0 / w);
        }
        let angle = 2.0 * v_norm.atan2(w);
        v * (angle / v_norm)
    }
}
