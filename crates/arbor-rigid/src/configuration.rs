//! Configuration-space operations over the whole tree.
//!
//! Each joint owns its slices of q and v, so these are plain loops over
//! the joints delegating to the per-joint manifold operations.

use crate::traversal::outward;
use arbor_math::DVec;
use arbor_model::{ArborError, Model, Result};
use rand::Rng;

fn check_len(name: &'static str, x: &DVec, expected: usize) -> Result<()> {
    if x.len() == expected {
        Ok(())
    } else {
        Err(ArborError::DimensionMismatch {
            name,
            expected,
            got: x.len(),
        })
    }
}

/// The neutral configuration: zero angles and translations, identity rotations.
pub fn neutral(model: &Model) -> DVec {
    let mut q = DVec::zeros(model.nq);
    for visit in outward(model) {
        model.joints[visit.joint]
            .kind
            .neutral(&mut q.as_mut_slice()[visit.q_range()]);
    }
    q
}

/// `q ⊕ v`: move from `q` along the tangent `v` for unit time.
pub fn integrate(model: &Model, q: &DVec, v: &DVec) -> Result<DVec> {
    let mut out = DVec::zeros(model.nq);
    integrate_into(model, q, v, &mut out)?;
    Ok(out)
}

/// [`integrate`] writing into a preallocated `out`.
pub fn integrate_into(model: &Model, q: &DVec, v: &DVec, out: &mut DVec) -> Result<()> {
    check_len("q", q, model.nq)?;
    check_len("v", v, model.nv)?;
    check_len("out", out, model.nq)?;
    for visit in outward(model) {
        model.joints[visit.joint].kind.integrate(
            &q.as_slice()[visit.q_range()],
            &v.as_slice()[visit.v_range()],
            &mut out.as_mut_slice()[visit.q_range()],
        );
    }
    Ok(())
}

/// `q1 ⊖ q0`: the tangent `v` with `integrate(q0, v) == q1`.
pub fn difference(model: &Model, q0: &DVec, q1: &DVec) -> Result<DVec> {
    check_len("q0", q0, model.nq)?;
    check_len("q1", q1, model.nq)?;
    let mut v = DVec::zeros(model.nv);
    for visit in outward(model) {
        model.joints[visit.joint].kind.difference(
            &q0.as_slice()[visit.q_range()],
            &q1.as_slice()[visit.q_range()],
            &mut v.as_mut_slice()[visit.v_range()],
        );
    }
    Ok(v)
}

/// Sample a configuration, honouring joint limits where set.
pub fn random_configuration<R: Rng + ?Sized>(model: &Model, rng: &mut R) -> DVec {
    let mut q = DVec::zeros(model.nq);
    for visit in outward(model) {
        let joint = &model.joints[visit.joint];
        joint
            .kind
            .random_configuration(rng, &joint.limits, &mut q.as_mut_slice()[visit.q_range()]);
    }
    q
}

/// Renormalize the quaternion and unit-circle parts of `q` in place.
pub fn normalize(model: &Model, q: &mut DVec) -> Result<()> {
    check_len("q", q, model.nq)?;
    for visit in outward(model) {
        model.joints[visit.joint]
            .kind
            .normalize(&mut q.as_mut_slice()[visit.q_range()]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use arbor_math::{Vec3, SE3};
    use arbor_model::{Joint, JointKind, JointLimits, ModelBuilder};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mixed() -> Model {
        ModelBuilder::new()
            .add_joint("base", 0, JointKind::Free, SE3::identity())
            .add_joint("ball", 1, JointKind::Spherical, SE3::identity())
            .add_joint("wheel", 2, JointKind::continuous(Vec3::y()).unwrap(), SE3::identity())
            .add_joint(
                "knee",
                2,
                Joint::new(JointKind::revolute(Vec3::x()).unwrap())
                    .with_limits(JointLimits::position(&[-0.5], &[0.25])),
                SE3::identity(),
            )
            .add_joint("slide", 4, JointKind::prismatic(Vec3::z()).unwrap(), SE3::identity())
            .add_joint("bolt", 5, JointKind::Fixed, SE3::identity())
            .build()
            .unwrap()
    }

    #[test]
    fn test_neutral_layout() {
        let model = mixed();
        let q = neutral(&model);
        assert_eq!(q.len(), 15);
        let expected = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0];
        assert_eq!(q.as_slice(), &expected);
    }

    #[test]
    fn test_difference_inverts_integrate() {
        let model = mixed();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let q = random_configuration(&model, &mut rng);
            let v = DVec::from_fn(model.nv, |_, _| rng.gen_range(-0.8..0.8));
            let q1 = integrate(&model, &q, &v).unwrap();
            let back = difference(&model, &q, &q1).unwrap();
            assert_relative_eq!(back, v, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_velocity_is_exact() {
        let model = mixed();
        let mut rng = StdRng::seed_from_u64(11);
        let q = random_configuration(&model, &mut rng);
        let q1 = integrate(&model, &q, &DVec::zeros(model.nv)).unwrap();
        assert_eq!(q1, q);
    }

    #[test]
    fn test_random_respects_limits() {
        let model = mixed();
        let knee = model.idx_q[model.joint_id("knee").unwrap()];
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let q = random_configuration(&model, &mut rng);
            assert!((-0.5..0.25).contains(&q[knee]));
            let quat = Vec3::new(q[3], q[4], q[5]).norm_squared() + q[6] * q[6];
            assert_relative_eq!(quat, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_normalize() {
        let model = mixed();
        let mut q = neutral(&model);
        q[6] = 2.0;
        q[11] = 3.0;
        q[12] = 4.0;
        normalize(&model, &mut q).unwrap();
        assert_relative_eq!(q[6], 1.0, epsilon = 1e-15);
        assert_relative_eq!(q[11], 0.6, epsilon = 1e-15);
        assert_relative_eq!(q[12], 0.8, epsilon = 1e-15);
    }

    #[test]
    fn test_length_errors() {
        let model = mixed();
        let q = neutral(&model);
        assert!(matches!(
            integrate(&model, &q, &DVec::zeros(3)),
            Err(ArborError::DimensionMismatch { name: "v", .. })
        ));
        assert!(matches!(
            difference(&model, &DVec::zeros(2), &q),
            Err(ArborError::DimensionMismatch { name: "q0", .. })
        ));
    }
}
