//! Recursive rigid-body algorithms over an arbor `Model`.
//!
//! Implements:
//! - Forward kinematics, frame and geometry placements
//! - Recursive Newton-Euler Algorithm (RNEA) for inverse dynamics
//! - Articulated Body Algorithm (ABA) for forward dynamics
//! - Composite Rigid Body Algorithm (CRBA) for the mass matrix
//! - Kinetic and potential energy
//! - Configuration-space integrate / difference / sampling
//!
//! Every algorithm writes into a caller-owned `Data` and returns a borrow of
//! its primary output.

pub mod aba;
pub mod configuration;
pub mod crba;
pub mod energy;
pub mod kinematics;
pub mod rnea;
pub mod traversal;

pub use aba::{forward_dynamics, forward_dynamics_with_external_forces};
pub use configuration::{difference, integrate, integrate_into, neutral, normalize, random_configuration};
pub use crba::mass_matrix;
pub use energy::{kinetic_energy, potential_energy, total_energy};
pub use kinematics::{forward_kinematics, frames_forward_kinematics, update_frame_placements, update_geometry_placements};
pub use rnea::{gravity_torques, inverse_dynamics, inverse_dynamics_with_external_forces, nonlinear_effects};
pub use traversal::{inward, outward, Visit};
