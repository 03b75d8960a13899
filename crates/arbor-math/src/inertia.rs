//! Rigid-body spatial inertia.
//!
//! An [`Inertia`] is stored compactly as mass, center of mass and the
//! rotational inertia about the center of mass. The 6x6 spatial form about
//! the frame origin is available through [`Inertia::matrix`].

use crate::{skew, Force, Mat3, Mat6, Motion, Vec3, SE3};
use std::ops::{Add, AddAssign, Mul};
use thiserror::Error;

/// Errors from inertia construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InertiaError {
    #[error("invalid inertia parameter {name} = {value}: must be positive")]
    InvalidParameter { name: &'static str, value: f64 },
}

fn positive(name: &'static str, value: f64) -> Result<f64, InertiaError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(InertiaError::InvalidParameter { name, value })
    }
}

/// Symmetric 3x3 matrix stored as (xx, xy, yy, xz, yz, zz).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Symmetric3 {
    pub data: [f64; 6],
}

impl Symmetric3 {
    /// From the six coefficients in `(xx, xy, yy, xz, yz, zz)` order.
    pub fn new(xx: f64, xy: f64, yy: f64, xz: f64, yz: f64, zz: f64) -> Self {
        Self {
            data: [xx, xy, yy, xz, yz, zz],
        }
    }

    /// Zero matrix.
    pub fn zeros() -> Self {
        Self { data: [0.0; 6] }
    }

    /// Identity matrix.
    pub fn identity() -> Self {
        Self::from_diagonal(&Vec3::new(1.0, 1.0, 1.0))
    }

    pub fn from_diagonal(d: &Vec3) -> Self {
        Self::new(d.x, 0.0, d.y, 0.0, 0.0, d.z)
    }

    /// Symmetric part of an arbitrary 3x3 matrix.
    pub fn from_matrix(m: &Mat3) -> Self {
        Self::new(
            m[(0, 0)],
            0.5 * (m[(0, 1)] + m[(1, 0)]),
            m[(1, 1)],
            0.5 * (m[(0, 2)] + m[(2, 0)]),
            0.5 * (m[(1, 2)] + m[(2, 1)]),
            m[(2, 2)],
        )
    }

    /// `-[d]×²`, i.e. `|d|² I - d dᵀ`. Parallel-axis term per unit mass.
    pub fn skew_square(d: &Vec3) -> Self {
        let (x, y, z) = (d.x, d.y, d.z);
        Self::new(
            y * y + z * z,
            -x * y,
            x * x + z * z,
            -x * z,
            -y * z,
            x * x + y * y,
        )
    }

    /// `I_xx`.
    pub fn xx(&self) -> f64 {
        self.data[0]
    }

    /// `I_yy`.
    pub fn yy(&self) -> f64 {
        self.data[2]
    }

    /// `I_zz`.
    pub fn zz(&self) -> f64 {
        self.data[5]
    }

    /// Expand to a full 3x3 matrix.
    pub fn matrix(&self) -> Mat3 {
        let [xx, xy, yy, xz, yz, zz] = self.data;
        Mat3::new(xx, xy, xz, xy, yy, yz, xz, yz, zz)
    }

    /// Matrix-vector product.
    pub fn mul_vec(&self, v: &Vec3) -> Vec3 {
        let [xx, xy, yy, xz, yz, zz] = self.data;
        Vec3::new(
            xx * v.x + xy * v.y + xz * v.z,
            xy * v.x + yy * v.y + yz * v.z,
            xz * v.x + yz * v.y + zz * v.z,
        )
    }

    /// `R S Rᵀ`.
    pub fn rotate(&self, r: &Mat3) -> Self {
        Self::from_matrix(&(r * self.matrix() * r.transpose()))
    }

    /// Eigenvalues in ascending order.
    pub fn eigenvalues(&self) -> Vec3 {
        let mut ev = self.matrix().symmetric_eigen().eigenvalues;
        ev.as_mut_slice()
            .sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        ev
    }

    /// Every coefficient multiplied by `s`.
    pub fn scale(&self, s: f64) -> Self {
        let mut out = *self;
        out.data.iter_mut().for_each(|x| *x *= s);
        out
    }
}

impl Add for Symmetric3 {
    type Output = Symmetric3;
    fn add(self, rhs: Symmetric3) -> Symmetric3 {
        let mut out = self;
        for (a, b) in out.data.iter_mut().zip(rhs.data.iter()) {
            *a += b;
        }
        out
    }
}

/// Spatial inertia of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inertia {
    /// Mass of the body.
    pub mass: f64,
    /// Center of mass in the body frame.
    pub com: Vec3,
    /// Rotational inertia about the center of mass.
    pub inertia: Symmetric3,
}

impl Default for Inertia {
    fn default() -> Self {
        Self::zeros()
    }
}

impl Inertia {
    /// Create from mass, CoM offset and rotational inertia about the CoM.
    pub fn new(mass: f64, com: Vec3, inertia: Symmetric3) -> Self {
        Self { mass, com, inertia }
    }

    /// Massless inertia.
    pub fn zeros() -> Self {
        Self {
            mass: 0.0,
            com: Vec3::zeros(),
            inertia: Symmetric3::zeros(),
        }
    }

    /// Point mass at `pos`.
    pub fn point_mass(mass: f64, pos: Vec3) -> Self {
        Self {
            mass,
            com: pos,
            inertia: Symmetric3::zeros(),
        }
    }

    /// Solid sphere centered at the origin.
    pub fn from_sphere(mass: f64, radius: f64) -> Result<Self, InertiaError> {
        let mass = positive("mass", mass)?;
        let radius = positive("radius", radius)?;
        let i = 2.0 / 5.0 * mass * radius * radius;
        Ok(Self::new(
            mass,
            Vec3::zeros(),
            Symmetric3::from_diagonal(&Vec3::new(i, i, i)),
        ))
    }

    /// Solid box with full side lengths `x`, `y`, `z`.
    pub fn from_box(mass: f64, x: f64, y: f64, z: f64) -> Result<Self, InertiaError> {
        let mass = positive("mass", mass)?;
        let (x2, y2, z2) = (
            positive("x", x)?.powi(2),
            positive("y", y)?.powi(2),
            positive("z", z)?.powi(2),
        );
        let k = mass / 12.0;
        Ok(Self::new(
            mass,
            Vec3::zeros(),
            Symmetric3::from_diagonal(&Vec3::new(k * (y2 + z2), k * (x2 + z2), k * (x2 + y2))),
        ))
    }

    /// Solid cylinder along the z axis.
    pub fn from_cylinder(mass: f64, radius: f64, length: f64) -> Result<Self, InertiaError> {
        let mass = positive("mass", mass)?;
        let r2 = positive("radius", radius)?.powi(2);
        let l2 = positive("length", length)?.powi(2);
        let lateral = mass * (3.0 * r2 + l2) / 12.0;
        Ok(Self::new(
            mass,
            Vec3::zeros(),
            Symmetric3::from_diagonal(&Vec3::new(lateral, lateral, 0.5 * mass * r2)),
        ))
    }

    /// Solid ellipsoid with semi-axes `a`, `b`, `c`.
    pub fn from_ellipsoid(mass: f64, a: f64, b: f64, c: f64) -> Result<Self, InertiaError> {
        let mass = positive("mass", mass)?;
        let (a2, b2, c2) = (
            positive("a", a)?.powi(2),
            positive("b", b)?.powi(2),
            positive("c", c)?.powi(2),
        );
        let k = mass / 5.0;
        Ok(Self::new(
            mass,
            Vec3::zeros(),
            Symmetric3::from_diagonal(&Vec3::new(k * (b2 + c2), k * (a2 + c2), k * (a2 + b2))),
        ))
    }

    /// Non-negative mass, non-negative principal moments and the triangle
    /// inequality between them.
    pub fn is_physical(&self) -> bool {
        const TOL: f64 = 1e-12;
        if self.mass.is_nan() || self.mass < 0.0 {
            return false;
        }
        let ev = self.inertia.eigenvalues();
        let scale = ev.amax().max(1.0);
        if ev[0] < -TOL * scale {
            return false;
        }
        // ev is sorted, so only the largest moment can break the inequality
        ev[0] + ev[1] >= ev[2] - TOL * scale
    }

    /// 6x6 spatial inertia about the frame origin.
    ///
    /// I = | I_c + m[c]×[c]×ᵀ   m[c]× |
    ///     | m[c]×ᵀ             mE    |
    pub fn matrix(&self) -> Mat6 {
        let cx = skew(&self.com);
        let m = self.mass;
        let mcx = cx * m;

        let mut mat = Mat6::zeros();
        mat.fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&(self.inertia.matrix() + mcx * cx.transpose()));
        mat.fixed_view_mut::<3, 3>(0, 3).copy_from(&mcx);
        mat.fixed_view_mut::<3, 3>(3, 0).copy_from(&mcx.transpose());
        mat.fixed_view_mut::<3, 3>(3, 3)
            .copy_from(&(Mat3::identity() * m));
        mat
    }

    /// Re-express the 6x6 form under `m`: `dual(M) · I · inv(M)`.
    pub fn transform_frame(&self, m: &SE3) -> Mat6 {
        m.dual_matrix() * self.matrix() * m.inv_matrix()
    }

    /// Inertia carried from frame b to frame a by `aMb`.
    pub fn se3_act(&self, m: &SE3) -> Inertia {
        Inertia {
            mass: self.mass,
            com: m.act_point(&self.com),
            inertia: self.inertia.rotate(&m.rotation),
        }
    }

    /// Inertia carried from frame a to frame b by `aMb`.
    pub fn se3_act_inv(&self, m: &SE3) -> Inertia {
        let rt = m.rotation.transpose();
        Inertia {
            mass: self.mass,
            com: m.act_inv_point(&self.com),
            inertia: self.inertia.rotate(&rt),
        }
    }

    /// Gyroscopic bias `v ×* (I v)`.
    pub fn bias_force(&self, v: &Motion) -> Force {
        v.cross_force(&(*self * *v))
    }
}

impl Mul<Motion> for Inertia {
    type Output = Force;

    fn mul(self, m: Motion) -> Force {
        let w = m.angular();
        let lin = (m.linear() - self.com.cross(&w)) * self.mass;
        let ang = self.inertia.mul_vec(&w) + self.com.cross(&lin);
        Force::new(ang, lin)
    }
}

impl Add for Inertia {
    type Output = Inertia;

    fn add(self, rhs: Inertia) -> Inertia {
        let mass = self.mass + rhs.mass;
        let com = if mass > 0.0 {
            (self.com * self.mass + rhs.com * rhs.mass) / mass
        } else {
            Vec3::zeros()
        };
        let shift_a = Symmetric3::skew_square(&(self.com - com)).scale(self.mass);
        let shift_b = Symmetric3::skew_square(&(rhs.com - com)).scale(rhs.mass);
        Inertia {
            mass,
            com,
            inertia: self.inertia + rhs.inertia + shift_a + shift_b,
        }
    }
}

impl AddAssign for Inertia {
    fn add_assign(&mut self, rhs: Inertia) {
        *self = *self + rhs;
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_vec3(r: f64) -> impl Strategy<Value = Vec3> {
        (-r..r, -r..r, -r..r).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    fn arb_se3() -> impl Strategy<Value = SE3> {
        (arb_vec3(1.0), arb_vec3(2.0)).prop_map(|(w, t)| SE3::from_parts(crate::exp3(&w), t))
    }

    fn arb_inertia() -> impl Strategy<Value = Inertia> {
        (0.1..10.0_f64, 0.05..1.0_f64, 0.05..1.0_f64, 0.05..1.0_f64, arb_vec3(1.0))
            .prop_map(|(m, x, y, z, c)| {
                let mut i = Inertia::from_box(m, x, y, z).unwrap_or_default();
                i.com = c;
                i
            })
    }

    proptest! {
        #[test]
        fn transform_frame_is_symmetric_psd(i in arb_inertia(), m in arb_se3()) {
            let t = i.transform_frame(&m);
            prop_assert!((t - t.transpose()).amax() < 1e-10);
            let ev = t.symmetric_eigen().eigenvalues;
            prop_assert!(ev.min() > -1e-9, "eigenvalues {:?}", ev);
        }

        #[test]
        fn kinetic_energy_is_frame_invariant(
            i in arb_inertia(),
            m in arb_se3(),
            w in arb_vec3(2.0),
            v in arb_vec3(2.0),
        ) {
            let vel = Motion::new(w, v);
            let e_body = vel.dot(&(i * vel));
            let moved = i.se3_act(&m);
            let vel_a = m.act_motion(&vel);
            let e_moved = vel_a.dot(&(moved * vel_a));
            prop_assert!((e_body - e_moved).abs() < 1e-9 * e_body.abs().max(1.0));
        }

        #[test]
        fn sum_commutes_with_matrix(a in arb_inertia(), b in arb_inertia()) {
            prop_assert!(((a + b).matrix() - (a.matrix() + b.matrix())).amax() < 1e-10);
        }
    }
}
