//! Composite Rigid Body Algorithm (CRBA) -- mass matrix computation.

use crate::traversal::{check_data, check_input, inward, kinematic_step, outward, reset_root};
use arbor_math::{DMat, DVec, Mat6, Motion};
use arbor_model::{Data, Model, Result, WORLD_ID};
use tracing::trace;

/// Compute the joint-space mass matrix M(q).
///
/// Fills the whole of `data.mass_matrix`, an nv x nv symmetric
/// positive-definite matrix for a physically consistent model.
pub fn mass_matrix<'a>(model: &Model, data: &'a mut Data, q: &DVec) -> Result<&'a DMat> {
    trace!(njoints = model.njoints(), "crba");
    check_data(model, data)?;
    check_input(data, "q", q, model.nq)?;

    reset_root(data, Motion::zero());
    data.composite_inertias[0] = Mat6::zeros();
    for visit in outward(model) {
        kinematic_step(model, data, &visit, q, None);
        data.composite_inertias[visit.joint] = model.inertias[visit.joint].matrix();
    }

    data.mass_matrix.fill(0.0);
    for visit in inward(model) {
        let (j, p) = (visit.joint, visit.parent);
        let s = model.joints[j].kind.motion_subspace().columns();

        // F = Ic S, columns past nv stay zero
        let mut f = data.composite_inertias[j] * s;
        write_block(&mut data.mass_matrix, visit.idx_v, visit.nv, visit.idx_v, visit.nv, &(s.transpose() * f));

        let mut k = j;
        while model.parents[k] != WORLD_ID {
            f = data.local_placements[k].dual_matrix() * f;
            k = model.parents[k];
            let sk = model.joints[k].kind.motion_subspace().columns();
            write_block(
                &mut data.mass_matrix,
                model.idx_v[k],
                model.joints[k].nv(),
                visit.idx_v,
                visit.nv,
                &(sk.transpose() * f),
            );
        }

        let ic_parent = data.local_placements[j].act_inertia_matrix(&data.composite_inertias[j]);
        data.composite_inertias[p] += ic_parent;
    }

    Ok(&data.mass_matrix)
}

/// Write `block[..nrows, ..ncols]` at (row, col) and its transpose at (col, row).
fn write_block(m: &mut DMat, row: usize, nrows: usize, col: usize, ncols: usize, block: &Mat6) {
    for r in 0..nrows {
        for c in 0..ncols {
            m[(row + r, col + c)] = block[(r, c)];
            m[(col + c, row + r)] = block[(r, c)];
        }
    }
}
