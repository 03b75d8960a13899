//! Energy computation for rigid body systems.

use crate::crba::mass_matrix;
use crate::kinematics::forward_kinematics;
use crate::traversal::check_input;
use arbor_math::DVec;
use arbor_model::{Data, Model, Result};

/// Kinetic energy: 0.5 * v^T * M(q) * v
pub fn kinetic_energy(model: &Model, data: &mut Data, q: &DVec, v: &DVec) -> Result<f64> {
    check_input(data, "v", v, model.nv)?;
    let m = mass_matrix(model, data, q)?;
    Ok(0.5 * v.dot(&(m * v)))
}

/// Gravitational potential energy.
///
/// PE = -sum_i m_i * g^T * x_com_i, zero at the world origin.
pub fn potential_energy(model: &Model, data: &mut Data, q: &DVec) -> Result<f64> {
    forward_kinematics(model, data, q, None, None)?;
    let pe = model
        .inertias
        .iter()
        .zip(&data.joint_placements)
        .skip(1)
        .map(|(inertia, placement)| -inertia.mass * model.gravity.dot(&placement.act_point(&inertia.com)))
        .sum();
    Ok(pe)
}

/// Total mechanical energy (kinetic + potential).
pub fn total_energy(model: &Model, data: &mut Data, q: &DVec, v: &DVec) -> Result<f64> {
    Ok(kinetic_energy(model, data, q, v)? + potential_energy(model, data, q)?)
}
