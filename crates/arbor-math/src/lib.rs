//! Spatial algebra primitives for arbor.
//!
//! Rigid transforms (`SE3`), 6D motion and force vectors, and rigid-body
//! inertias. Spatial vectors use Featherstone ordering, angular part first.
//! Transforms are active: `aMb` maps coordinates expressed in frame b into
//! frame a, `p_a = R p_b + t`.

pub mod inertia;
pub mod quaternion;
pub mod spatial;

pub use inertia::{Inertia, InertiaError, Symmetric3};
pub use quaternion::Quat;
pub use spatial::{Force, Motion, SE3};

use nalgebra as na;

/// 3D vector alias.
pub type Vec3 = na::Vector3<f64>;
/// 3x3 matrix alias.
pub type Mat3 = na::Matrix3<f64>;
/// 6D vector alias.
pub type Vec6 = na::Vector6<f64>;
/// 6x6 matrix alias.
pub type Mat6 = na::Matrix6<f64>;
/// Dynamic vector.
pub type DVec = na::DVector<f64>;
/// Dynamic matrix.
pub type DMat = na::DMatrix<f64>;

/// Cross-product matrix: [v]× such that [v]× w = v × w.
#[inline]
pub fn skew(v: &Vec3) -> Mat3 {
    Mat3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

/// Standard gravity (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Rodrigues rotation about a unit `axis` given the sine and cosine of the angle.
#[inline]
pub fn rotation_from_sin_cos(axis: &Vec3, s: f64, c: f64) -> Mat3 {
    let k = skew(axis);
    Mat3::identity() + k * s + k * k * (1.0 - c)
}

/// Rotation by `angle` radians about a unit `axis`.
#[inline]
pub fn rotation_about(axis: &Vec3, angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    rotation_from_sin_cos(axis, s, c)
}

/// SO(3) exponential of a rotation vector.
pub fn exp3(w: &Vec3) -> Mat3 {
    let theta = w.norm();
    if theta < 1e-12 {
        // second order keeps exp3/log3 consistent near identity
        let k = skew(w);
        return Mat3::identity() + k + k * k * 0.5;
    }
    rotation_about(&(w / theta), theta)
}

/// SO(3) logarithm: rotation vector `θ u` with `θ ∈ [0, π]`.
pub fn log3(r: &Mat3) -> Vec3 {
    let cos_theta = ((r.trace() - 1.0) * 0.5).clamp(-1.0, 1.0);
    let theta = cos_theta.acos();
    let axial = Vec3::new(r[(2, 1)] - r[(1, 2)], r[(0, 2)] - r[(2, 0)], r[(1, 0)] - r[(0, 1)]);

    if theta < 1e-8 {
        return axial * 0.5;
    }
    if std::f64::consts::PI - theta < 1e-6 {
        // near π the antisymmetric part vanishes; recover the axis from R + I
        let b = (r + Mat3::identity()) * 0.5;
        let mut axis = Vec3::new(
            b[(0, 0)].max(0.0).sqrt(),
            b[(1, 1)].max(0.0).sqrt(),
            b[(2, 2)].max(0.0).sqrt(),
        );
        // fix relative signs from the off-diagonal terms
        if axis.x >= axis.y && axis.x >= axis.z {
            axis.y = axis.y.copysign(b[(0, 1)]);
            axis.z = axis.z.copysign(b[(0, 2)]);
        } else if axis.y >= axis.z {
            axis.x = axis.x.copysign(b[(0, 1)]);
            axis.z = axis.z.copysign(b[(1, 2)]);
        } else {
            axis.x = axis.x.copysign(b[(0, 2)]);
            axis.y = axis.y.copysign(b[(1, 2)]);
        }
        return axis.normalize() * theta;
    }
    axial * (theta / (2.0 * theta.sin()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_skew_matches_cross() {
        let a = Vec3::new(1.0, -2.0, 0.5);
        let b = Vec3::new(0.3, 0.7, -1.1);
        assert_relative_eq!(skew(&a) * b, a.cross(&b), epsilon = 1e-15);
    }

    #[test]
    fn test_rotation_about_z() {
        let r = rotation_about(&Vec3::z(), std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(r * Vec3::x(), Vec3::y(), epsilon = 1e-15);
    }

    #[test]
    fn test_exp_log_so3() {
        let w = Vec3::new(0.4, -0.2, 0.9);
        assert_relative_eq!(log3(&exp3(&w)), w, epsilon = 1e-12);
    }

    #[test]
    fn test_log3_near_pi() {
        let w = Vec3::new(0.0, 1.0, 0.0) * (std::f64::consts::PI - 1e-9);
        let r = exp3(&w);
        let back = exp3(&log3(&r));
        assert_relative_eq!(back, r, epsilon = 1e-8);
    }

    #[test]
    fn test_log3_identity() {
        assert_relative_eq!(log3(&Mat3::identity()), Vec3::zeros(), epsilon = 1e-15);
    }
}
