//! Forward kinematics: joint, frame and geometry placements with velocities
//! and accelerations.

use crate::traversal::{acceleration_step, check_data, check_input, kinematic_step, outward, reset_root};
use arbor_math::{DVec, Motion};
use arbor_model::{ArborError, Data, GeometryData, GeometryModel, Model, Result};
use tracing::trace;

/// Compute joint placements and, optionally, velocities and accelerations.
///
/// Fills `data.local_placements` and `data.joint_placements`. With `v`,
/// fills `data.velocities` (each in its own joint frame); without it the
/// velocities are zero. With `a`, fills `data.accelerations` as well. The
/// root has zero velocity and zero acceleration: gravity is not included.
pub fn forward_kinematics(
    model: &Model,
    data: &mut Data,
    q: &DVec,
    v: Option<&DVec>,
    a: Option<&DVec>,
) -> Result<()> {
    trace!(njoints = model.njoints(), "forward kinematics");
    check_data(model, data)?;
    check_input(data, "q", q, model.nq)?;
    if let Some(v) = v {
        check_input(data, "v", v, model.nv)?;
    }
    if let Some(a) = a {
        check_input(data, "a", a, model.nv)?;
    }

    reset_root(data, Motion::zero());
    for visit in outward(model) {
        kinematic_step(model, data, &visit, q, v);
        if a.is_some() {
            acceleration_step(model, data, &visit, a);
        }
    }
    Ok(())
}

/// World placement of every frame from the current joint placements.
///
/// Requires a prior call to [`forward_kinematics`].
pub fn update_frame_placements(model: &Model, data: &mut Data) -> Result<()> {
    check_data(model, data)?;
    for (placement, frame) in data.frame_placements.iter_mut().zip(&model.frames) {
        *placement = data.joint_placements[frame.parent_joint].compose(&frame.placement);
    }
    Ok(())
}

/// Forward kinematics on `q` followed by [`update_frame_placements`].
pub fn frames_forward_kinematics(model: &Model, data: &mut Data, q: &DVec) -> Result<()> {
    forward_kinematics(model, data, q, None, None)?;
    update_frame_placements(model, data)
}

/// World placement of every geometry object from the current joint
/// placements.
pub fn update_geometry_placements(
    model: &Model,
    data: &Data,
    geom_model: &GeometryModel,
    geom_data: &mut GeometryData,
) -> Result<()> {
    check_data(model, data)?;
    if geom_data.placements.len() != geom_model.ngeoms() {
        return Err(ArborError::DimensionMismatch {
            name: "geometry data",
            expected: geom_model.ngeoms(),
            got: geom_data.placements.len(),
        });
    }
    for (placement, obj) in geom_data.placements.iter_mut().zip(&geom_model.objects) {
        let parent = data
            .joint_placements
            .get(obj.parent_joint)
            .ok_or(ArborError::InvalidJointIndex {
                index: obj.parent_joint,
                njoints: model.njoints(),
            })?;
        *placement = parent.compose(&obj.placement);
    }
    Ok(())
}
