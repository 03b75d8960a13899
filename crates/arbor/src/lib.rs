//! arbor: rigid-body kinematics and dynamics for articulated trees.
//!
//! This is the umbrella crate that provides the `Simulator` and `display`
//! entry points and re-exports core types from sub-crates.
//!
//! ```no_run
//! use arbor::{forward_dynamics, DVec, Inertia, JointKind, ModelBuilder, Vec3, SE3};
//!
//! let model = ModelBuilder::new()
//!     .add_body("hinge", 0, JointKind::revolute(Vec3::z())?, SE3::identity(), Inertia::from_sphere(1.0, 0.1)?)
//!     .build()?;
//! let mut data = model.create_data();
//! let ddq = forward_dynamics(&model, &mut data, &DVec::zeros(1), &DVec::zeros(1), &DVec::zeros(1))?;
//! assert_eq!(ddq.len(), 1);
//! # Ok::<(), arbor::ArborError>(())
//! ```

pub mod simulator;

pub use arbor_math::{self, DMat, DVec, Force, Inertia, Mat3, Mat6, Motion, Quat, Symmetric3, Vec3, Vec6, SE3, STANDARD_GRAVITY};
pub use arbor_model::{
    self, ArborError, Data, Frame, FrameKind, GeometryData, GeometryModel, GeometryObject, Joint, JointKind,
    JointLimits, Model, ModelBuilder, Result, Shape, WORLD_ID,
};
pub use arbor_rigid::{
    self, difference, forward_dynamics, forward_kinematics, frames_forward_kinematics, integrate, inverse_dynamics,
    mass_matrix, neutral, random_configuration, total_energy, update_frame_placements, update_geometry_placements,
};
pub use simulator::{ConfigError, Integrator, Rk4Solver, SemiImplicitEulerSolver, Simulator, SimulatorConfig, Solver, State};

/// Refresh every placement a renderer reads for configuration `q`.
///
/// Runs forward kinematics, then frame placements, then geometry
/// placements. Afterwards `data.joint_placements`, `data.frame_placements`
/// and `geom_data.placements` describe `q`.
pub fn display(
    model: &Model,
    data: &mut Data,
    geom_model: &GeometryModel,
    geom_data: &mut GeometryData,
    q: &DVec,
) -> Result<()> {
    forward_kinematics(model, data, q, None, None)?;
    update_frame_placements(model, data)?;
    update_geometry_placements(model, data, geom_model, geom_data)
}
