//! Joint kinds and their configuration manifolds.
//!
//! Every kind owns a slice of the configuration vector (`nq` entries) and a
//! slice of the tangent vector (`nv` entries). The methods here only ever see
//! their own slices, so tree topology never leaks into joint-local math.
//!
//! Configuration layouts:
//! - `Revolute`, `Prismatic`: `[q]`
//! - `Continuous`: `[cos θ, sin θ]`
//! - `Spherical`: quaternion `[x, y, z, w]`
//! - `Free`: `[px, py, pz, x, y, z, w]`, tangent `[ω; v]` in the joint frame

use crate::{ArborError, JointLimits, Result};
use arbor_math::{rotation_about, rotation_from_sin_cos, Force, Mat3, Mat6, Motion, Quat, Vec3, SE3};
use rand::Rng;
use std::f64::consts::PI;

/// Closed set of supported joint kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JointKind {
    /// 0 DOF rigid attachment. Also used for the universe root.
    Fixed,
    /// Rotation about a unit axis, angle stored directly.
    Revolute { axis: Vec3 },
    /// Unbounded rotation about a unit axis, stored as (cos, sin).
    Continuous { axis: Vec3 },
    /// Translation along a unit axis.
    Prismatic { axis: Vec3 },
    /// 3 DOF ball joint.
    Spherical,
    /// 6 DOF floating joint.
    Free,
}

fn unit_axis(axis: Vec3) -> Result<Vec3> {
    let n = axis.norm();
    if n > 1e-12 && n.is_finite() {
        Ok(axis / n)
    } else {
        Err(ArborError::InvalidAxis {
            axis: [axis.x, axis.y, axis.z],
        })
    }
}

#[inline]
fn is_zero(v: &[f64]) -> bool {
    v.iter().all(|x| *x == 0.0)
}

impl JointKind {
    /// Revolute joint about `axis` (normalized).
    pub fn revolute(axis: Vec3) -> Result<Self> {
        Ok(JointKind::Revolute {
            axis: unit_axis(axis)?,
        })
    }

    /// Continuous joint about `axis` (normalized).
    pub fn continuous(axis: Vec3) -> Result<Self> {
        Ok(JointKind::Continuous {
            axis: unit_axis(axis)?,
        })
    }

    /// Prismatic joint along `axis` (normalized).
    pub fn prismatic(axis: Vec3) -> Result<Self> {
        Ok(JointKind::Prismatic {
            axis: unit_axis(axis)?,
        })
    }

    /// Build a kind from a description-format joint type string.
    ///
    /// `axis` is ignored by kinds that have none.
    pub fn from_name(name: &str, axis: Vec3) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "revolute" | "hinge" => Self::revolute(axis),
            "continuous" => Self::continuous(axis),
            "prismatic" | "slide" => Self::prismatic(axis),
            "spherical" | "ball" => Ok(JointKind::Spherical),
            "free" | "floating" => Ok(JointKind::Free),
            "fixed" => Ok(JointKind::Fixed),
            _ => Err(ArborError::UnsupportedJointType(name.to_string())),
        }
    }

    /// Configuration dimension.
    pub fn nq(&self) -> usize {
        match self {
            JointKind::Fixed => 0,
            JointKind::Revolute { .. } | JointKind::Prismatic { .. } => 1,
            JointKind::Continuous { .. } => 2,
            JointKind::Spherical => 4,
            JointKind::Free => 7,
        }
    }

    /// Tangent dimension.
    pub fn nv(&self) -> usize {
        match self {
            JointKind::Fixed => 0,
            JointKind::Revolute { .. }
            | JointKind::Continuous { .. }
            | JointKind::Prismatic { .. } => 1,
            JointKind::Spherical => 3,
            JointKind::Free => 6,
        }
    }

    /// Lowercase kind name, accepted by [`JointKind::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            JointKind::Fixed => "fixed",
            JointKind::Revolute { .. } => "revolute",
            JointKind::Continuous { .. } => "continuous",
            JointKind::Prismatic { .. } => "prismatic",
            JointKind::Spherical => "spherical",
            JointKind::Free => "free",
        }
    }

    /// Write the neutral (zero-displacement) configuration into `out`.
    pub fn neutral(&self, out: &mut [f64]) {
        match self {
            JointKind::Fixed => {}
            JointKind::Revolute { .. } | JointKind::Prismatic { .. } => out[0] = 0.0,
            JointKind::Continuous { .. } => {
                out[0] = 1.0;
                out[1] = 0.0;
            }
            JointKind::Spherical => Quat::identity().write_xyzw(out),
            JointKind::Free => {
                out[..3].fill(0.0);
                Quat::identity().write_xyzw(&mut out[3..7]);
            }
        }
    }

    /// Placement of the joint's child frame in its parent frame for the
    /// configuration slice `q`.
    pub fn local_placement(&self, q: &[f64]) -> SE3 {
        match self {
            JointKind::Fixed => SE3::identity(),
            JointKind::Revolute { axis } => {
                SE3::from_parts(rotation_about(axis, q[0]), Vec3::zeros())
            }
            JointKind::Continuous { axis } => {
                SE3::from_parts(rotation_from_sin_cos(axis, q[1], q[0]), Vec3::zeros())
            }
            JointKind::Prismatic { axis } => SE3::from_translation(axis * q[0]),
            JointKind::Spherical => {
                SE3::from_parts(Quat::from_xyzw(q).to_matrix(), Vec3::zeros())
            }
            JointKind::Free => SE3::from_parts(
                Quat::from_xyzw(&q[3..7]).to_matrix(),
                Vec3::new(q[0], q[1], q[2]),
            ),
        }
    }

    /// Motion subspace, expressed in the joint's child frame.
    ///
    /// Constant for every supported kind in this frame.
    pub fn motion_subspace(&self) -> MotionSubspace {
        match self {
            JointKind::Fixed => MotionSubspace::Empty,
            JointKind::Revolute { axis } | JointKind::Continuous { axis } => {
                MotionSubspace::Angular(*axis)
            }
            JointKind::Prismatic { axis } => MotionSubspace::Linear(*axis),
            JointKind::Spherical => MotionSubspace::Rotation,
            JointKind::Free => MotionSubspace::Full,
        }
    }

    /// Joint bias acceleration `Ṡ v`. Zero since every subspace is constant.
    pub fn bias(&self) -> Motion {
        Motion::zero()
    }

    /// `out = q ⊕ v` on this joint's manifold.
    ///
    /// A zero increment copies `q` unchanged.
    pub fn integrate(&self, q: &[f64], v: &[f64], out: &mut [f64]) {
        let nq = self.nq();
        if is_zero(&v[..self.nv()]) {
            out[..nq].copy_from_slice(&q[..nq]);
            return;
        }
        match self {
            JointKind::Fixed => {}
            JointKind::Revolute { .. } | JointKind::Prismatic { .. } => out[0] = q[0] + v[0],
            JointKind::Continuous { .. } => {
                let (s, c) = v[0].sin_cos();
                let c1 = q[0] * c - q[1] * s;
                let s1 = q[1] * c + q[0] * s;
                let n = c1.hypot(s1);
                out[0] = c1 / n;
                out[1] = s1 / n;
            }
            JointKind::Spherical => {
                let w = Vec3::new(v[0], v[1], v[2]);
                Quat::from_xyzw(q)
                    .mul(&Quat::exp(&w))
                    .normalize()
                    .write_xyzw(out);
            }
            JointKind::Free => {
                let w = Vec3::new(v[0], v[1], v[2]);
                let step = SE3::exp6(&Motion::new(w, Vec3::new(v[3], v[4], v[5])));
                let m = self.local_placement(q);
                let t = m.rotation * step.translation + m.translation;
                out[..3].copy_from_slice(t.as_slice());
                Quat::from_xyzw(&q[3..7])
                    .mul(&Quat::exp(&w))
                    .normalize()
                    .write_xyzw(&mut out[3..7]);
            }
        }
    }

    /// Tangent `v` such that `integrate(q0, v) == q1`.
    pub fn difference(&self, q0: &[f64], q1: &[f64], out: &mut [f64]) {
        match self {
            JointKind::Fixed => {}
            JointKind::Revolute { .. } | JointKind::Prismatic { .. } => out[0] = q1[0] - q0[0],
            JointKind::Continuous { .. } => {
                let (c0, s0, c1, s1) = (q0[0], q0[1], q1[0], q1[1]);
                out[0] = (c0 * s1 - s0 * c1).atan2(c0 * c1 + s0 * s1);
            }
            JointKind::Spherical => {
                let dq = Quat::from_xyzw(q0).conjugate().mul(&Quat::from_xyzw(q1));
                out[..3].copy_from_slice(dq.log().as_slice());
            }
            JointKind::Free => {
                let m0 = self.local_placement(q0);
                let m1 = self.local_placement(q1);
                let xi = m0.inverse().compose(&m1).log6();
                out[..6].copy_from_slice(xi.data.as_slice());
            }
        }
    }

    /// Sample a configuration within `limits`.
    ///
    /// Euclidean coordinates (revolute angle, prismatic offset, free-flyer
    /// translation) are drawn from their own `[lower, upper]` range, with
    /// infinite sides falling back to `[-π, π]` for angles and `[-1, 1]` for
    /// translations. Unit-circle and quaternion coordinates are drawn
    /// uniformly on their manifold.
    pub fn random_configuration<R: Rng + ?Sized>(&self, rng: &mut R, limits: &JointLimits, out: &mut [f64]) {
        match self {
            JointKind::Fixed => {}
            JointKind::Revolute { .. } => {
                let [lo, hi] = limits.bounds_or(0, [-PI, PI]);
                out[0] = sample(rng, lo, hi);
            }
            JointKind::Prismatic { .. } => {
                let [lo, hi] = limits.bounds_or(0, [-1.0, 1.0]);
                out[0] = sample(rng, lo, hi);
            }
            JointKind::Continuous { .. } => {
                let (s, c) = sample(rng, -PI, PI).sin_cos();
                out[0] = c;
                out[1] = s;
            }
            JointKind::Spherical => uniform_quat(rng).write_xyzw(out),
            JointKind::Free => {
                for (i, x) in out[..3].iter_mut().enumerate() {
                    let [lo, hi] = limits.bounds_or(i, [-1.0, 1.0]);
                    *x = sample(rng, lo, hi);
                }
                uniform_quat(rng).write_xyzw(&mut out[3..7]);
            }
        }
    }

    /// Project `q` back onto the manifold (unit quaternion, unit circle).
    pub fn normalize(&self, q: &mut [f64]) {
        match self {
            JointKind::Continuous { .. } => {
                let n = q[0].hypot(q[1]);
                if n > 0.0 {
                    q[0] /= n;
                    q[1] /= n;
                }
            }
            JointKind::Spherical => Quat::from_xyzw(q).normalize().write_xyzw(q),
            JointKind::Free => Quat::from_xyzw(&q[3..7])
                .normalize()
                .write_xyzw(&mut q[3..7]),
            _ => {}
        }
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Uniform rotation (Shoemake).
fn uniform_quat<R: Rng + ?Sized>(rng: &mut R) -> Quat {
    let u1: f64 = rng.gen();
    let u2: f64 = rng.gen::<f64>() * 2.0 * PI;
    let u3: f64 = rng.gen::<f64>() * 2.0 * PI;
    let a = (1.0 - u1).sqrt();
    let b = u1.sqrt();
    Quat::new(b * u3.cos(), a * u2.sin(), a * u2.cos(), b * u3.sin()).normalize()
}

/// Motion subspace operator `S` of a joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionSubspace {
    /// 6 x 0.
    Empty,
    /// 6 x 1, rotation about the axis.
    Angular(Vec3),
    /// 6 x 1, translation along the axis.
    Linear(Vec3),
    /// 6 x 3, `[I₃; 0]`.
    Rotation,
    /// 6 x 6 identity.
    Full,
}

impl MotionSubspace {
    /// Number of columns.
    pub fn nv(&self) -> usize {
        match self {
            MotionSubspace::Empty => 0,
            MotionSubspace::Angular(_) | MotionSubspace::Linear(_) => 1,
            MotionSubspace::Rotation => 3,
            MotionSubspace::Full => 6,
        }
    }

    /// `S v`.
    pub fn apply(&self, v: &[f64]) -> Motion {
        match self {
            MotionSubspace::Empty => Motion::zero(),
            MotionSubspace::Angular(axis) => Motion::new(axis * v[0], Vec3::zeros()),
            MotionSubspace::Linear(axis) => Motion::new(Vec3::zeros(), axis * v[0]),
            MotionSubspace::Rotation => Motion::new(Vec3::new(v[0], v[1], v[2]), Vec3::zeros()),
            MotionSubspace::Full => Motion::new(
                Vec3::new(v[0], v[1], v[2]),
                Vec3::new(v[3], v[4], v[5]),
            ),
        }
    }

    /// `out = Sᵀ f`.
    pub fn transpose_mul(&self, f: &Force, out: &mut [f64]) {
        match self {
            MotionSubspace::Empty => {}
            MotionSubspace::Angular(axis) => out[0] = axis.dot(&f.angular()),
            MotionSubspace::Linear(axis) => out[0] = axis.dot(&f.linear()),
            MotionSubspace::Rotation => out[..3].copy_from_slice(&f.data.as_slice()[..3]),
            MotionSubspace::Full => out[..6].copy_from_slice(f.data.as_slice()),
        }
    }

    /// `S` as a 6x6 matrix whose first `nv` columns are the subspace.
    pub fn columns(&self) -> Mat6 {
        let mut s = Mat6::zeros();
        match self {
            MotionSubspace::Empty => {}
            MotionSubspace::Angular(axis) => s.fixed_view_mut::<3, 1>(0, 0).copy_from(axis),
            MotionSubspace::Linear(axis) => s.fixed_view_mut::<3, 1>(3, 0).copy_from(axis),
            MotionSubspace::Rotation => s
                .fixed_view_mut::<3, 3>(0, 0)
                .copy_from(&Mat3::identity()),
            MotionSubspace::Full => s = Mat6::identity(),
        }
        s
    }
}

/// A joint: its kind plus its limits.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Joint {
    pub kind: JointKind,
    pub limits: JointLimits,
}

impl Joint {
    /// Joint of `kind` with unbounded limits.
    pub fn new(kind: JointKind) -> Self {
        Self {
            kind,
            limits: JointLimits::unbounded(kind.nq()),
        }
    }

    /// Replace the limits. Their bound vectors are checked against `nq` when
    /// the joint is added to a model.
    pub fn with_limits(mut self, limits: JointLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Configuration dimension.
    pub fn nq(&self) -> usize {
        self.kind.nq()
    }

    /// Tangent dimension.
    pub fn nv(&self) -> usize {
        self.kind.nv()
    }
}

impl From<JointKind> for Joint {
    fn from(kind: JointKind) -> Self {
        Joint::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn all_kinds() -> Vec<JointKind> {
        vec![
            JointKind::Fixed,
            JointKind::revolute(Vec3::new(0.0, 0.0, 2.0)).unwrap(),
            JointKind::continuous(Vec3::new(1.0, 1.0, 0.0)).unwrap(),
            JointKind::prismatic(Vec3::new(0.0, 1.0, 0.0)).unwrap(),
            JointKind::Spherical,
            JointKind::Free,
        ]
    }

    fn tangent(nv: usize) -> Vec<f64> {
        [0.3, -0.2, 0.5, 0.1, 0.7, -0.4][..nv].to_vec()
    }

    #[test]
    fn test_dimensions() {
        let dims: Vec<_> = all_kinds().iter().map(|k| (k.nq(), k.nv())).collect();
        assert_eq!(dims, vec![(0, 0), (1, 1), (2, 1), (1, 1), (4, 3), (7, 6)]);
        for k in all_kinds() {
            assert_eq!(k.motion_subspace().nv(), k.nv());
        }
    }

    #[test]
    fn test_axis_is_normalized() {
        match JointKind::revolute(Vec3::new(0.0, 0.0, 2.0)).unwrap() {
            JointKind::Revolute { axis } => assert_relative_eq!(axis, Vec3::z()),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_zero_axis_rejected() {
        assert!(matches!(
            JointKind::prismatic(Vec3::zeros()),
            Err(ArborError::InvalidAxis { .. })
        ));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            JointKind::from_name("hinge", Vec3::x()).unwrap(),
            JointKind::Revolute { axis: Vec3::x() }
        );
        assert_eq!(JointKind::from_name("Ball", Vec3::zeros()).unwrap(), JointKind::Spherical);
        assert_eq!(JointKind::from_name("floating", Vec3::zeros()).unwrap(), JointKind::Free);
        assert_eq!(
            JointKind::from_name("planar", Vec3::x()),
            Err(ArborError::UnsupportedJointType("planar".to_string()))
        );
    }

    #[test]
    fn test_neutral_is_identity_placement() {
        for k in all_kinds() {
            let mut q = vec![f64::NAN; k.nq()];
            k.neutral(&mut q);
            assert!(k.local_placement(&q).is_approx(&SE3::identity(), 0.0), "{}", k.name());
        }
    }

    #[test]
    fn test_revolute_placement() {
        let k = JointKind::revolute(Vec3::z()).unwrap();
        let m = k.local_placement(&[0.3]);
        let (s, c) = 0.3_f64.sin_cos();
        let expected = Mat3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(m.rotation, expected, epsilon = 1e-15);
    }

    #[test]
    fn test_continuous_matches_revolute() {
        let axis = Vec3::new(1.0, 2.0, -1.0).normalize();
        let rev = JointKind::Revolute { axis };
        let cont = JointKind::Continuous { axis };
        let theta = 1.2_f64;
        assert!(cont
            .local_placement(&[theta.cos(), theta.sin()])
            .is_approx(&rev.local_placement(&[theta]), 1e-15));
    }

    #[test]
    fn test_zero_increment_is_exact() {
        for k in all_kinds() {
            let mut q = vec![0.0; k.nq()];
            k.random_configuration(&mut StdRng::seed_from_u64(3), &JointLimits::unbounded(k.nq()), &mut q);
            let mut out = vec![f64::NAN; k.nq()];
            k.integrate(&q, &vec![0.0; k.nv()], &mut out);
            assert_eq!(out, q, "{}", k.name());
        }
    }

    #[test]
    fn test_difference_inverts_integrate() {
        let mut rng = StdRng::seed_from_u64(7);
        for k in all_kinds() {
            let mut q0 = vec![0.0; k.nq()];
            k.random_configuration(&mut rng, &JointLimits::unbounded(k.nq()), &mut q0);
            let v = tangent(k.nv());
            let mut q1 = vec![0.0; k.nq()];
            k.integrate(&q0, &v, &mut q1);
            let mut back = vec![0.0; k.nv()];
            k.difference(&q0, &q1, &mut back);
            for (a, b) in back.iter().zip(v.iter()) {
                assert_relative_eq!(a, b, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_continuous_integrate_wraps() {
        let k = JointKind::continuous(Vec3::z()).unwrap();
        let mut q = [0.0; 2];
        k.neutral(&mut q);
        let mut out = [0.0; 2];
        k.integrate(&q, &[3.0 * PI], &mut out);
        assert_relative_eq!(out[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(out[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(out[0].hypot(out[1]), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_free_integrate_matches_exp6() {
        let k = JointKind::Free;
        let mut q = [0.0; 7];
        k.neutral(&mut q);
        let v = [0.0, 0.0, PI / 2.0, 1.0, 0.0, 0.0];
        let mut out = [0.0; 7];
        k.integrate(&q, &v, &mut out);
        let expected = SE3::exp6(&Motion::new(Vec3::new(0.0, 0.0, PI / 2.0), Vec3::x()));
        assert!(k.local_placement(&out).is_approx(&expected, 1e-14));
    }

    #[test]
    fn test_random_respects_limits() {
        let mut rng = StdRng::seed_from_u64(11);
        let k = JointKind::revolute(Vec3::x()).unwrap();
        let limits = JointLimits::position(&[-0.5], &[0.25]);
        for _ in 0..100 {
            let mut q = [0.0];
            k.random_configuration(&mut rng, &limits, &mut q);
            assert!((-0.5..0.25).contains(&q[0]));
        }
        let mut q = [0.0; 4];
        JointKind::Spherical.random_configuration(&mut rng, &JointLimits::unbounded(4), &mut q);
        assert_relative_eq!(Quat::from_xyzw(&q).norm(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_free_limits_are_per_coordinate() {
        let mut rng = StdRng::seed_from_u64(23);
        let inf = f64::INFINITY;
        let limits = JointLimits::position(
            &[0.0, -5.0, 10.0, -inf, -inf, -inf, -inf],
            &[1.0, -4.0, 10.5, inf, inf, inf, inf],
        );
        for _ in 0..200 {
            let mut q = [0.0; 7];
            JointKind::Free.random_configuration(&mut rng, &limits, &mut q);
            assert!((0.0..1.0).contains(&q[0]), "x = {}", q[0]);
            assert!((-5.0..-4.0).contains(&q[1]), "y = {}", q[1]);
            assert!((10.0..10.5).contains(&q[2]), "z = {}", q[2]);
            assert_relative_eq!(Quat::from_xyzw(&q[3..7]).norm(), 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_unbounded_sides_use_default_range() {
        let mut rng = StdRng::seed_from_u64(5);
        let k = JointKind::prismatic(Vec3::z()).unwrap();
        let limits = JointLimits::position(&[0.5], &[f64::INFINITY]);
        for _ in 0..100 {
            let mut q = [0.0];
            k.random_configuration(&mut rng, &limits, &mut q);
            assert!((0.5..1.0).contains(&q[0]));
        }
    }

    #[test]
    fn test_subspace_consistency() {
        let f = Force::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-4.0, 5.0, 0.5));
        for k in all_kinds() {
            let s = k.motion_subspace();
            let v = tangent(s.nv());
            let sv = s.apply(&v);
            let mut expected = Mat6::zeros().column(0).into_owned();
            for (j, x) in v.iter().enumerate() {
                expected += s.columns().column(j) * *x;
            }
            assert_relative_eq!(sv.data, expected, epsilon = 1e-15);

            let mut stf = vec![0.0; s.nv()];
            s.transpose_mul(&f, &mut stf);
            for (j, x) in stf.iter().enumerate() {
                assert_relative_eq!(*x, s.columns().column(j).dot(&f.data), epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn test_normalize() {
        let mut q = [0.0, 0.0, 0.0, 2.0];
        JointKind::Spherical.normalize(&mut q);
        assert_eq!(q, [0.0, 0.0, 0.0, 1.0]);
        let mut c = [3.0, 4.0];
        JointKind::Continuous { axis: Vec3::z() }.normalize(&mut c);
        assert_relative_eq!(c[0], 0.6);
        assert_relative_eq!(c[1], 0.8);
    }
}
