//! Articulated Body Algorithm (ABA) -- O(n) forward dynamics.
//!
//! Given (q, v, tau), compute ddq (joint accelerations).
//! Three passes over the kinematic tree:
//! 1. Outward: velocities, bias accelerations, rigid-body inertias and bias forces
//! 2. Inward: articulated inertias and bias forces
//! 3. Outward: accelerations
//!
//! Joint blocks are fixed-size (1, 3 or 6 columns) and live in `Data`, so a
//! call performs no heap allocation.

use crate::traversal::{check_data, check_input, inward, kinematic_step, outward, reset_root};
use arbor_math::{DVec, Force, Mat6, Motion, Vec3, Vec6};
use arbor_model::{ArborError, Data, Model, Result};
use nalgebra::{Cholesky, SMatrix, SVector};
use tracing::{trace, warn};

/// Forward dynamics: `ddq = M(q)⁻¹ (τ - b(q, v))`.
///
/// Fails with [`ArborError::SingularJointInertia`] when a joint's projected
/// inertia `Sᵀ IA S` is not positive definite (for example a massless leaf).
pub fn forward_dynamics<'a>(
    model: &Model,
    data: &'a mut Data,
    q: &DVec,
    v: &DVec,
    tau: &DVec,
) -> Result<&'a DVec> {
    run(model, data, q, v, tau, None)?;
    Ok(&data.ddq)
}

/// Forward dynamics with an external force on each joint, expressed in
/// that joint's frame. `fext` has one entry per joint, the root's is ignored.
pub fn forward_dynamics_with_external_forces<'a>(
    model: &Model,
    data: &'a mut Data,
    q: &DVec,
    v: &DVec,
    tau: &DVec,
    fext: &[Force],
) -> Result<&'a DVec> {
    if fext.len() != model.njoints() {
        return Err(ArborError::DimensionMismatch {
            name: "fext",
            expected: model.njoints(),
            got: fext.len(),
        });
    }
    run(model, data, q, v, tau, Some(fext))?;
    Ok(&data.ddq)
}

fn run(model: &Model, data: &mut Data, q: &DVec, v: &DVec, tau: &DVec, fext: Option<&[Force]>) -> Result<()> {
    trace!(njoints = model.njoints(), "aba");
    check_data(model, data)?;
    check_input(data, "q", q, model.nq)?;
    check_input(data, "v", v, model.nv)?;
    check_input(data, "tau", tau, model.nv)?;

    reset_root(data, Motion::new(Vec3::zeros(), -model.gravity));
    data.articulated_inertias[0] = Mat6::zeros();
    data.bias_forces[0] = Force::zero();

    // Pass 1 (outward)
    for visit in outward(model) {
        kinematic_step(model, data, &visit, q, Some(v));

        let j = visit.joint;
        let kind = &model.joints[j].kind;
        data.bias_accelerations[j] = kind.bias() + data.velocities[j].cross_motion(&data.joint_velocities[j]);

        let inertia = &model.inertias[j];
        data.articulated_inertias[j] = inertia.matrix();
        let mut pa = inertia.bias_force(&data.velocities[j]);
        if let Some(fext) = fext {
            pa -= fext[j];
        }
        data.bias_forces[j] = pa;
    }

    // Pass 2 (inward)
    for visit in inward(model) {
        let (j, p) = (visit.joint, visit.parent);
        let s = model.joints[j].kind.motion_subspace().columns();
        let ia = data.articulated_inertias[j];
        let pa = data.bias_forces[j];
        let c = data.bias_accelerations[j];
        let tau_j = &tau.as_slice()[visit.v_range()];

        let proj = match visit.nv {
            0 => Some(Projection::rigid(&ia, &pa, &c)),
            1 => project::<1>(&ia, &s, &pa, &c, tau_j),
            3 => project::<3>(&ia, &s, &pa, &c, tau_j),
            6 => project::<6>(&ia, &s, &pa, &c, tau_j),
            n => unreachable!("no joint kind has {n} degrees of freedom"),
        };
        let Some(proj) = proj else {
            warn!(joint = j, name = %model.names[j], "singular joint-space inertia");
            return Err(ArborError::SingularJointInertia {
                joint: j,
                name: model.names[j].clone(),
            });
        };

        data.u_blocks[j] = proj.u;
        data.d_inv_blocks[j] = proj.d_inv;
        data.u_terms[j] = proj.u_term;

        let li = &data.local_placements[j];
        let ia_parent = li.act_inertia_matrix(&proj.ia);
        let pa_parent = li.act_force(&proj.pa);
        data.articulated_inertias[p] += ia_parent;
        data.bias_forces[p] += pa_parent;
    }

    // Pass 3 (outward)
    for visit in outward(model) {
        let (j, p) = (visit.joint, visit.parent);
        let s = model.joints[j].kind.motion_subspace().columns();
        let a_prime = (data.local_placements[j].act_inv_motion(&data.accelerations[p]) + data.bias_accelerations[j]).data;

        let ddq = &mut data.ddq.as_mut_slice()[visit.v_range()];
        let (u, d_inv, u_term) = (&data.u_blocks[j], &data.d_inv_blocks[j], &data.u_terms[j]);
        let a = match visit.nv {
            0 => a_prime,
            1 => accelerate::<1>(u, d_inv, u_term, &s, a_prime, ddq),
            3 => accelerate::<3>(u, d_inv, u_term, &s, a_prime, ddq),
            6 => accelerate::<6>(u, d_inv, u_term, &s, a_prime, ddq),
            n => unreachable!("no joint kind has {n} degrees of freedom"),
        };
        data.accelerations[j] = Motion::from_vec6(a);
    }

    Ok(())
}

/// Result of eliminating one joint from its articulated body.
struct Projection {
    /// `U = IA S`, padded to 6 columns.
    u: Mat6,
    /// `D⁻¹`, padded to 6x6.
    d_inv: Mat6,
    /// `u = τ - Sᵀ pA`, padded to 6 entries.
    u_term: Vec6,
    /// Articulated inertia as seen through the joint.
    ia: Mat6,
    /// Bias force as seen through the joint.
    pa: Force,
}

impl Projection {
    /// A 0-DOF joint passes the whole articulated body to its parent.
    fn rigid(ia: &Mat6, pa: &Force, c: &Motion) -> Self {
        Self {
            u: Mat6::zeros(),
            d_inv: Mat6::zeros(),
            u_term: Vec6::zeros(),
            ia: *ia,
            pa: Force::from_vec6(pa.data + ia * c.data),
        }
    }
}

/// Project an articulated body through an N-DOF joint.
///
/// Returns `None` when `D = Sᵀ IA S` is not positive definite.
fn project<const N: usize>(ia: &Mat6, s6: &Mat6, pa: &Force, c: &Motion, tau: &[f64]) -> Option<Projection> {
    let s: SMatrix<f64, 6, N> = s6.fixed_columns::<N>(0).into_owned();
    let u = ia * s;
    let d = s.transpose() * u;
    let d_inv = Cholesky::new(d)?.inverse();
    if !d_inv.iter().all(|x| x.is_finite()) {
        return None;
    }
    let u_term = SVector::<f64, N>::from_column_slice(tau) - s.transpose() * pa.data;

    let u_d_inv = u * d_inv;
    let ia_out = ia - u_d_inv * u.transpose();
    let pa_out = pa.data + ia_out * c.data + u_d_inv * u_term;

    let mut proj = Projection {
        u: Mat6::zeros(),
        d_inv: Mat6::zeros(),
        u_term: Vec6::zeros(),
        ia: ia_out,
        pa: Force::from_vec6(pa_out),
    };
    proj.u.fixed_columns_mut::<N>(0).copy_from(&u);
    proj.d_inv.fixed_view_mut::<N, N>(0, 0).copy_from(&d_inv);
    proj.u_term.fixed_rows_mut::<N>(0).copy_from(&u_term);
    Some(proj)
}

/// `ddq = D⁻¹ (u - Uᵀ a')`, returns `a' + S ddq`.
fn accelerate<const N: usize>(
    u6: &Mat6,
    d_inv6: &Mat6,
    u_term6: &Vec6,
    s6: &Mat6,
    a_prime: Vec6,
    out: &mut [f64],
) -> Vec6 {
    let u = u6.fixed_columns::<N>(0);
    let d_inv = d_inv6.fixed_view::<N, N>(0, 0);
    let u_term = u_term6.fixed_rows::<N>(0);

    let ddq: SVector<f64, N> = d_inv * (u_term - u.transpose() * a_prime);
    out.copy_from_slice(ddq.as_slice());
    a_prime + s6.fixed_columns::<N>(0) * ddq
}
