//! Recursive Newton-Euler Algorithm (RNEA) for inverse dynamics.
//!
//! Given (q, v, a), computes the generalized forces τ = M(q)a + b(q, v).

use crate::traversal::{acceleration_step, check_data, check_input, inward, kinematic_step, outward, reset_root};
use arbor_math::{DVec, Force, Motion, Vec3};
use arbor_model::{ArborError, Data, Model, Result};
use tracing::trace;

/// Inverse dynamics: `τ = M(q) a + C(q, v) v + g(q)`.
///
/// Gravity enters as a root acceleration of `-g`. After the call
/// `data.forces[0]` holds the wrench the base exerts on the tree, in the
/// world frame.
pub fn inverse_dynamics<'a>(
    model: &Model,
    data: &'a mut Data,
    q: &DVec,
    v: &DVec,
    a: &DVec,
) -> Result<&'a DVec> {
    run(model, data, q, v, a, None)?;
    Ok(&data.tau)
}

/// Inverse dynamics with an external force on each joint, expressed in
/// that joint's frame. `fext` has one entry per joint, the root's is ignored.
pub fn inverse_dynamics_with_external_forces<'a>(
    model: &Model,
    data: &'a mut Data,
    q: &DVec,
    v: &DVec,
    a: &DVec,
    fext: &[Force],
) -> Result<&'a DVec> {
    if fext.len() != model.njoints() {
        return Err(ArborError::DimensionMismatch {
            name: "fext",
            expected: model.njoints(),
            got: fext.len(),
        });
    }
    run(model, data, q, v, a, Some(fext))?;
    Ok(&data.tau)
}

/// Generalized gravity `g(q)`: RNEA with zero velocity and acceleration.
pub fn gravity_torques<'a>(model: &Model, data: &'a mut Data, q: &DVec) -> Result<&'a DVec> {
    let zero = DVec::zeros(model.nv);
    inverse_dynamics(model, data, q, &zero, &zero)
}

/// Nonlinear effects `b(q, v) = C(q, v) v + g(q)`: RNEA with zero acceleration.
pub fn nonlinear_effects<'a>(model: &Model, data: &'a mut Data, q: &DVec, v: &DVec) -> Result<&'a DVec> {
    let zero = DVec::zeros(model.nv);
    inverse_dynamics(model, data, q, v, &zero)
}

fn run(model: &Model, data: &mut Data, q: &DVec, v: &DVec, a: &DVec, fext: Option<&[Force]>) -> Result<()> {
    trace!(njoints = model.njoints(), "rnea");
    check_data(model, data)?;
    check_input(data, "q", q, model.nq)?;
    check_input(data, "v", v, model.nv)?;
    check_input(data, "a", a, model.nv)?;

    reset_root(data, Motion::new(Vec3::zeros(), -model.gravity));
    data.forces[0] = Force::zero();

    // Pass 1 (outward): velocities, accelerations, body forces
    for visit in outward(model) {
        kinematic_step(model, data, &visit, q, Some(v));
        acceleration_step(model, data, &visit, Some(a));

        let j = visit.joint;
        let inertia = &model.inertias[j];
        let mut f = *inertia * data.accelerations[j] + inertia.bias_force(&data.velocities[j]);
        if let Some(fext) = fext {
            f -= fext[j];
        }
        data.forces[j] = f;
    }

    // Pass 2 (inward): project onto joint axes, accumulate into parents
    for visit in inward(model) {
        let (j, p) = (visit.joint, visit.parent);
        model.joints[j]
            .kind
            .motion_subspace()
            .transpose_mul(&data.forces[j], &mut data.tau.as_mut_slice()[visit.v_range()]);
        let f_parent = data.local_placements[j].act_force(&data.forces[j]);
        data.forces[p] += f_parent;
    }

    Ok(())
}
