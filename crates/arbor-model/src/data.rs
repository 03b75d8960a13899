//! Per-model scratch buffers written by the algorithms.

use crate::Model;
use arbor_math::{DMat, DVec, Force, Mat6, Motion, Vec6, SE3};
use tracing::debug;

/// Mutable workspace bound to one [`Model`].
///
/// Every buffer is sized at construction so that algorithm calls never
/// allocate. One `Data` per computation context; share the `Model` instead.
#[derive(Debug, Clone)]
pub struct Data {
    /// World placement of each joint frame (oMi).
    pub joint_placements: Vec<SE3>,
    /// Placement of each joint frame in its parent joint frame (liMi).
    pub local_placements: Vec<SE3>,
    /// World placement of each frame (oMf).
    pub frame_placements: Vec<SE3>,
    /// Joint velocity `S v_i`, in the joint frame.
    pub joint_velocities: Vec<Motion>,
    /// Spatial velocity of each joint frame, in that frame.
    pub velocities: Vec<Motion>,
    /// Spatial acceleration of each joint frame, in that frame.
    pub accelerations: Vec<Motion>,
    /// Bias acceleration `c_J + v × v_J` of each joint.
    pub bias_accelerations: Vec<Motion>,
    /// Net spatial force of each subtree, in the joint frame.
    pub forces: Vec<Force>,
    /// Articulated-body inertias (IA).
    pub articulated_inertias: Vec<Mat6>,
    /// Articulated bias forces (pA).
    pub bias_forces: Vec<Force>,
    /// `U = IA S`, first `nv` columns used.
    pub u_blocks: Vec<Mat6>,
    /// `D⁻¹`, top-left `nv x nv` block used.
    pub d_inv_blocks: Vec<Mat6>,
    /// `u = τ - Sᵀ pA`, first `nv` entries used.
    pub u_terms: Vec<Vec6>,
    /// Composite rigid-body inertias.
    pub composite_inertias: Vec<Mat6>,
    /// Joint torques from inverse dynamics.
    pub tau: DVec,
    /// Joint accelerations from forward dynamics.
    pub ddq: DVec,
    /// Joint-space inertia matrix.
    pub mass_matrix: DMat,
    /// Reject NaN/Inf inputs when set.
    pub check_finite: bool,
    nq: usize,
}

impl Data {
    /// Allocate buffers for `model`.
    pub fn new(model: &Model) -> Self {
        let n = model.njoints();
        debug!(njoints = n, nframes = model.nframes(), nq = model.nq, nv = model.nv, "allocating data");
        Self {
            joint_placements: vec![SE3::identity(); n],
            local_placements: vec![SE3::identity(); n],
            frame_placements: vec![SE3::identity(); model.nframes()],
            joint_velocities: vec![Motion::zero(); n],
            velocities: vec![Motion::zero(); n],
            accelerations: vec![Motion::zero(); n],
            bias_accelerations: vec![Motion::zero(); n],
            forces: vec![Force::zero(); n],
            articulated_inertias: vec![Mat6::zeros(); n],
            bias_forces: vec![Force::zero(); n],
            u_blocks: vec![Mat6::zeros(); n],
            d_inv_blocks: vec![Mat6::zeros(); n],
            u_terms: vec![Vec6::zeros(); n],
            composite_inertias: vec![Mat6::zeros(); n],
            tau: DVec::zeros(model.nv),
            ddq: DVec::zeros(model.nv),
            mass_matrix: DMat::zeros(model.nv, model.nv),
            check_finite: false,
            nq: model.nq,
        }
    }

    /// Enable NaN/Inf checks on algorithm inputs.
    pub fn with_finite_checks(mut self) -> Self {
        self.check_finite = true;
        self
    }

    /// Whether the buffers are sized for `model`.
    pub fn matches(&self, model: &Model) -> bool {
        self.joint_placements.len() == model.njoints()
            && self.frame_placements.len() == model.nframes()
            && self.tau.len() == model.nv
            && self.nq == model.nq
    }
}
