//! Tree traversal shared by every recursive algorithm.
//!
//! The model guarantees `parents[i] < i`, so ascending joint index is a
//! valid outward (root to leaves) order and its reverse a valid inward one.

use arbor_math::{DVec, Motion};
use arbor_model::{ArborError, Data, Model, Result};
use std::ops::Range;

/// One joint as seen during a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Joint index.
    pub joint: usize,
    /// Parent joint index.
    pub parent: usize,
    /// Offset in the configuration vector.
    pub idx_q: usize,
    /// Offset in the tangent vector.
    pub idx_v: usize,
    /// Configuration dimension.
    pub nq: usize,
    /// Tangent dimension.
    pub nv: usize,
}

impl Visit {
    /// This joint's slice of `q`.
    #[inline]
    pub fn q_range(&self) -> Range<usize> {
        self.idx_q..self.idx_q + self.nq
    }

    /// This joint's slice of `v`.
    #[inline]
    pub fn v_range(&self) -> Range<usize> {
        self.idx_v..self.idx_v + self.nv
    }
}

/// Non-root joints in outward order. Use `.rev()` for the inward order.
pub fn outward(model: &Model) -> impl DoubleEndedIterator<Item = Visit> + '_ {
    (1..model.njoints()).map(move |j| Visit {
        joint: j,
        parent: model.parents[j],
        idx_q: model.idx_q[j],
        idx_v: model.idx_v[j],
        nq: model.joints[j].nq(),
        nv: model.joints[j].nv(),
    })
}

/// Non-root joints in inward order.
pub fn inward(model: &Model) -> impl Iterator<Item = Visit> + '_ {
    outward(model).rev()
}

/// Length and, when enabled on `data`, finiteness checks for an input vector.
pub(crate) fn check_input(data: &Data, name: &'static str, x: &DVec, expected: usize) -> Result<()> {
    if x.len() != expected {
        return Err(ArborError::DimensionMismatch {
            name,
            expected,
            got: x.len(),
        });
    }
    if data.check_finite {
        if let Some(index) = x.iter().position(|v| !v.is_finite()) {
            return Err(ArborError::NonFiniteInput { name, index });
        }
    }
    Ok(())
}

pub(crate) fn check_data(model: &Model, data: &Data) -> Result<()> {
    if !data.matches(model) {
        return Err(ArborError::DimensionMismatch {
            name: "data",
            expected: model.njoints(),
            got: data.joint_placements.len(),
        });
    }
    Ok(())
}

/// Reset the root entries before an outward pass.
pub(crate) fn reset_root(data: &mut Data, root_acceleration: Motion) {
    data.local_placements[0] = Default::default();
    data.joint_placements[0] = Default::default();
    data.velocities[0] = Motion::zero();
    data.joint_velocities[0] = Motion::zero();
    data.accelerations[0] = root_acceleration;
}

/// Placement and, with `v`, velocity of one joint from its parent.
///
/// liMi = placement · local(q_i), oMi = oMi[parent] · liMi,
/// v_i = liMi⁻¹ · v_parent + S v̇_i.
#[inline]
pub(crate) fn kinematic_step(model: &Model, data: &mut Data, visit: &Visit, q: &DVec, v: Option<&DVec>) {
    let (j, p) = (visit.joint, visit.parent);
    let kind = &model.joints[j].kind;

    let li = model.placements[j].compose(&kind.local_placement(&q.as_slice()[visit.q_range()]));
    data.local_placements[j] = li;
    data.joint_placements[j] = data.joint_placements[p].compose(&li);

    match v {
        Some(v) => {
            let vj = kind.motion_subspace().apply(&v.as_slice()[visit.v_range()]);
            data.joint_velocities[j] = vj;
            data.velocities[j] = li.act_inv_motion(&data.velocities[p]) + vj;
        }
        None => {
            data.joint_velocities[j] = Motion::zero();
            data.velocities[j] = Motion::zero();
        }
    }
}

/// Acceleration of one joint from its parent.
///
/// a_i = liMi⁻¹ · a_parent + S a_i + c_J + v_i × v_J. Without `a` the joint
/// acceleration term is zero.
#[inline]
pub(crate) fn acceleration_step(model: &Model, data: &mut Data, visit: &Visit, a: Option<&DVec>) {
    let (j, p) = (visit.joint, visit.parent);
    let kind = &model.joints[j].kind;

    let bias = kind.bias() + data.velocities[j].cross_motion(&data.joint_velocities[j]);
    data.bias_accelerations[j] = bias;

    let mut acc = data.local_placements[j].act_inv_motion(&data.accelerations[p]) + bias;
    if let Some(a) = a {
        acc += kind.motion_subspace().apply(&a.as_slice()[visit.v_range()]);
    }
    data.accelerations[j] = acc;
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_math::{Vec3, SE3};
    use arbor_model::{JointKind, ModelBuilder};

    #[test]
    fn test_parents_before_children() {
        let rev = JointKind::revolute(Vec3::z()).unwrap();
        let model = ModelBuilder::new()
            .add_joint("a", 0, rev, SE3::identity())
            .add_joint("b", 1, JointKind::Spherical, SE3::identity())
            .add_joint("c", 1, rev, SE3::identity())
            .add_joint("d", 3, JointKind::Free, SE3::identity())
            .build()
            .unwrap();

        let order: Vec<_> = outward(&model).map(|v| v.joint).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
        let back: Vec<_> = inward(&model).map(|v| v.joint).collect();
        assert_eq!(back, vec![4, 3, 2, 1]);

        for visit in outward(&model) {
            assert!(visit.parent < visit.joint);
        }
        let d = outward(&model).last().unwrap();
        assert_eq!((d.q_range(), d.v_range()), (6..13, 4..10));
    }

    #[test]
    fn test_empty_model_has_no_visits() {
        let model = arbor_model::Model::empty();
        assert_eq!(outward(&model).count(), 0);
    }

    #[test]
    fn test_check_input() {
        let model = ModelBuilder::new()
            .add_joint("a", 0, JointKind::Spherical, SE3::identity())
            .build()
            .unwrap();
        let data = model.create_data().with_finite_checks();
        assert!(check_input(&data, "q", &DVec::zeros(4), model.nq).is_ok());
        assert_eq!(
            check_input(&data, "q", &DVec::zeros(3), model.nq),
            Err(ArborError::DimensionMismatch {
                name: "q",
                expected: 4,
                got: 3
            })
        );
        let mut q = DVec::zeros(4);
        q[2] = f64::NAN;
        assert_eq!(
            check_input(&data, "q", &q, model.nq),
            Err(ArborError::NonFiniteInput { name: "q", index: 2 })
        );
    }
}
