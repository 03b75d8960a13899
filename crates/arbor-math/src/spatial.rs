//! 6D spatial algebra: rigid transforms, motion and force vectors.
//!
//! Convention: spatial vectors are [angular; linear] (Featherstone order).
//! A spatial motion vector (twist): [ω; v]
//! A spatial force vector (wrench): [n; f]
//!
//! `SE3` is an active transform `aMb`: it carries quantities expressed in
//! frame b into frame a. `act` goes b → a, `act_inv` goes a → b.

use crate::{exp3, log3, skew, Mat3, Mat6, Vec3, Vec6};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

macro_rules! spatial_vector {
    ($name:ident) => {
        impl $name {
            /// Create from angular and linear parts.
            #[inline]
            pub fn new(angular: Vec3, linear: Vec3) -> Self {
                Self {
                    data: Vec6::new(
                        angular.x, angular.y, angular.z, linear.x, linear.y, linear.z,
                    ),
                }
            }

            /// Wrap a raw [angular; linear] 6-vector.
            #[inline]
            pub fn from_vec6(data: Vec6) -> Self {
                Self { data }
            }

            /// Zero vector.
            #[inline]
            pub fn zero() -> Self {
                Self {
                    data: Vec6::zeros(),
                }
            }

            /// Angular (top 3) component.
            #[inline]
            pub fn angular(&self) -> Vec3 {
                self.data.fixed_rows::<3>(0).into_owned()
            }

            /// Linear (bottom 3) component.
            #[inline]
            pub fn linear(&self) -> Vec3 {
                self.data.fixed_rows::<3>(3).into_owned()
            }

            /// True when every component is finite.
            #[inline]
            pub fn is_finite(&self) -> bool {
                self.data.iter().all(|x| x.is_finite())
            }
        }

        impl Add for $name {
            type Output = $name;
            #[inline]
            fn add(self, rhs: $name) -> $name {
                $name {
                    data: self.data + rhs.data,
                }
            }
        }

        impl AddAssign for $name {
            #[inline]
            fn add_assign(&mut self, rhs: $name) {
                self.data += rhs.data;
            }
        }

        impl Sub for $name {
            type Output = $name;
            #[inline]
            fn sub(self, rhs: $name) -> $name {
                $name {
                    data: self.data - rhs.data,
                }
            }
        }

        impl SubAssign for $name {
            #[inline]
            fn sub_assign(&mut self, rhs: $name) {
                self.data -= rhs.data;
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;
            #[inline]
            fn mul(self, rhs: f64) -> $name {
                $name {
                    data: self.data * rhs,
                }
            }
        }

        impl Neg for $name {
            type Output = $name;
            #[inline]
            fn neg(self) -> $name {
                $name { data: -self.data }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::zero()
            }
        }
    };
}

/// Spatial motion vector (twist) [ω; v].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Motion {
    /// The underlying 6D vector [angular(3); linear(3)].
    pub data: Vec6,
}

/// Spatial force vector (wrench) [n; f].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Force {
    /// The underlying 6D vector [angular(3); linear(3)].
    pub data: Vec6,
}

spatial_vector!(Motion);
spatial_vector!(Force);

impl Motion {
    /// Spatial cross product for motion vectors: `self ×ₘ m`.
    pub fn cross_motion(&self, m: &Motion) -> Motion {
        let w = self.angular();
        let v = self.linear();
        let w2 = m.angular();
        let v2 = m.linear();
        Motion::new(w.cross(&w2), w.cross(&v2) + v.cross(&w2))
    }

    /// Spatial cross product for force vectors: `self ×* f`.
    pub fn cross_force(&self, f: &Force) -> Force {
        let w = self.angular();
        let v = self.linear();
        let n = f.angular();
        let lin = f.linear();
        Force::new(w.cross(&n) + v.cross(&lin), w.cross(&lin))
    }

    /// Power pairing ⟨m, f⟩.
    #[inline]
    pub fn dot(&self, f: &Force) -> f64 {
        self.data.dot(&f.data)
    }
}

impl Force {
    /// Power pairing ⟨f, m⟩.
    #[inline]
    pub fn dot(&self, m: &Motion) -> f64 {
        self.data.dot(&m.data)
    }
}

/// Rigid transform `aMb`: `p_a = rotation * p_b + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SE3 {
    /// Orientation of frame b expressed in frame a.
    pub rotation: Mat3,
    /// Origin of frame b expressed in frame a.
    pub translation: Vec3,
}

impl Default for SE3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl SE3 {
    /// Create from rotation matrix and translation.
    #[inline]
    pub fn from_parts(rotation: Mat3, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Identity transform.
    #[inline]
    pub fn identity() -> Self {
        Self {
            rotation: Mat3::identity(),
            translation: Vec3::zeros(),
        }
    }

    /// Pure translation.
    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            rotation: Mat3::identity(),
            translation,
        }
    }

    /// Pure rotation by `angle` about the unit `axis`.
    pub fn from_axis_angle(axis: &Vec3, angle: f64) -> Self {
        Self {
            rotation: crate::rotation_about(axis, angle),
            translation: Vec3::zeros(),
        }
    }

    /// Group multiplication: `aMb * bMc = aMc`.
    #[inline]
    pub fn compose(&self, other: &SE3) -> SE3 {
        SE3 {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Inverse transform `bMa`.
    #[inline]
    pub fn inverse(&self) -> SE3 {
        let rt = self.rotation.transpose();
        SE3 {
            rotation: rt,
            translation: -(rt * self.translation),
        }
    }

    /// Transform a point from frame b to frame a.
    #[inline]
    pub fn act_point(&self, p: &Vec3) -> Vec3 {
        self.rotation * p + self.translation
    }

    /// Transform a point from frame a to frame b.
    #[inline]
    pub fn act_inv_point(&self, p: &Vec3) -> Vec3 {
        self.rotation.transpose() * (p - self.translation)
    }

    /// Transform a motion vector from frame b to frame a.
    pub fn act_motion(&self, m: &Motion) -> Motion {
        let w = self.rotation * m.angular();
        let v = self.rotation * m.linear() + self.translation.cross(&w);
        Motion::new(w, v)
    }

    /// Transform a motion vector from frame a to frame b.
    pub fn act_inv_motion(&self, m: &Motion) -> Motion {
        let rt = self.rotation.transpose();
        let w = m.angular();
        let v = m.linear() - self.translation.cross(&w);
        Motion::new(rt * w, rt * v)
    }

    /// Transform a force vector from frame b to frame a.
    pub fn act_force(&self, f: &Force) -> Force {
        let lin = self.rotation * f.linear();
        let n = self.rotation * f.angular() + self.translation.cross(&lin);
        Force::new(n, lin)
    }

    /// Transform a force vector from frame a to frame b.
    pub fn act_inv_force(&self, f: &Force) -> Force {
        let rt = self.rotation.transpose();
        let lin = f.linear();
        let n = f.angular() - self.translation.cross(&lin);
        Force::new(rt * n, rt * lin)
    }

    /// Plücker matrix for motions, b → a.
    ///
    /// X = | R      0 |
    ///     | [t]×R  R |
    pub fn action_matrix(&self) -> Mat6 {
        let r = self.rotation;
        let mut m = Mat6::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
        m.fixed_view_mut::<3, 3>(3, 0)
            .copy_from(&(skew(&self.translation) * r));
        m.fixed_view_mut::<3, 3>(3, 3).copy_from(&r);
        m
    }

    /// Plücker matrix for forces, b → a. Equals `action_matrix()^{-T}`.
    ///
    /// X* = | R  [t]×R |
    ///      | 0    R   |
    pub fn dual_matrix(&self) -> Mat6 {
        let r = self.rotation;
        let mut m = Mat6::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
        m.fixed_view_mut::<3, 3>(0, 3)
            .copy_from(&(skew(&self.translation) * r));
        m.fixed_view_mut::<3, 3>(3, 3).copy_from(&r);
        m
    }

    /// Plücker matrix for motions, a → b. Equals `action_matrix()^{-1}`.
    ///
    /// X⁻¹ = | Rᵀ        0  |
    ///       | -Rᵀ[t]×   Rᵀ |
    pub fn inv_matrix(&self) -> Mat6 {
        let rt = self.rotation.transpose();
        let mut m = Mat6::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&rt);
        m.fixed_view_mut::<3, 3>(3, 0)
            .copy_from(&(-(rt * skew(&self.translation))));
        m.fixed_view_mut::<3, 3>(3, 3).copy_from(&rt);
        m
    }

    /// Carry a 6x6 spatial inertia expressed in frame b into frame a.
    ///
    /// Congruence `X* I X⁻¹`, which keeps the result symmetric.
    pub fn act_inertia_matrix(&self, inertia: &Mat6) -> Mat6 {
        let x_inv = self.inv_matrix();
        x_inv.transpose() * inertia * x_inv
    }

    /// SE3 exponential of a twist `[ω; v]`.
    pub fn exp6(twist: &Motion) -> SE3 {
        let w = twist.angular();
        let v = twist.linear();
        let theta2 = w.norm_squared();
        let k = skew(&w);

        let (a, b) = if theta2 < 1e-12 {
            (0.5 - theta2 / 24.0, 1.0 / 6.0 - theta2 / 120.0)
        } else {
            let theta = theta2.sqrt();
            let (s, c) = theta.sin_cos();
            ((1.0 - c) / theta2, (theta - s) / (theta2 * theta))
        };
        let jac = Mat3::identity() + k * a + k * k * b;

        SE3 {
            rotation: exp3(&w),
            translation: jac * v,
        }
    }

    /// SE3 logarithm: the twist `ξ` with `exp6(ξ) == self`.
    pub fn log6(&self) -> Motion {
        let w = log3(&self.rotation);
        let theta2 = w.norm_squared();
        let k = skew(&w);

        let coeff = if theta2 < 1e-12 {
            1.0 / 12.0 + theta2 / 720.0
        } else {
            let theta = theta2.sqrt();
            let (s, c) = theta.sin_cos();
            (1.0 - theta * s / (2.0 * (1.0 - c))) / theta2
        };
        let jac_inv = Mat3::identity() - k * 0.5 + k * k * coeff;

        Motion::new(w, jac_inv * self.translation)
    }

    /// Component-wise comparison within `tol`.
    pub fn is_approx(&self, other: &SE3, tol: f64) -> bool {
        (self.rotation - other.rotation).amax() <= tol
            && (self.translation - other.translation).amax() <= tol
    }

    /// True when rotation and translation are finite.
    pub fn is_finite(&self) -> bool {
        self.rotation.iter().all(|x| x.is_finite())
            && self.translation.iter().all(|x| x.is_finite())
    }
}

impl Mul for SE3 {
    type Output = SE3;
    #[inline]
    fn mul(self, rhs: SE3) -> SE3 {
        self.compose(&rhs)
    }
}

impl<'a> Mul<&'a SE3> for &'a SE3 {
    type Output = SE3;
    #[inline]
    fn mul(self, rhs: &SE3) -> SE3 {
        self.compose(rhs)
    }
}
