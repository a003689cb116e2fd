//! Tri-diagonal streamfunction solver
//!
//! Solves `laplacian(psi_n) = omega_n` for every horizontal mode with
//! homogeneous Dirichlet walls. The operator of mode n is symmetric
//! tridiagonal with diagonal `-(2 * oodz2 + (n pi / a)^2)` and off-diagonals
//! `oodz2`; the two wall rows are identity rows, so psi at the walls is
//! exactly the (zero) wall vorticity.
//!
//! The forward Gaussian elimination depends only on the operator, never on
//! the right-hand side, so it is performed once at construction and each
//! solve is a single forward/backward sweep without allocation.
use crate::config::GridSpec;
use ndarray::{Array2, ArrayView1, ArrayViewMut1};

/// Precomputed Thomas factorisation, one tridiagonal system per mode.
#[derive(Debug, Clone)]
pub struct ThomasSolver {
    nz: usize,
    /// Off-diagonal entry oodz2 (zero on the wall rows)
    sub: f64,
    /// Modified superdiagonals c'_k, per mode
    sup_mod: Array2<f64>,
    /// Inverse pivots 1 / (b_k - a * c'_{k-1}), per mode
    inv_pivot: Array2<f64>,
}

impl ThomasSolver {
    /// Factorise the per-mode operators for `grid`.
    pub fn new(grid: &GridSpec) -> Self {
        let nz = grid.nz;
        let sub = grid.oodz2;
        let mut sup_mod = Array2::zeros((grid.nn, nz));
        let mut inv_pivot = Array2::zeros((grid.nn, nz));
        for n in 0..grid.nn {
            let diag = -(2.0 * grid.oodz2 + grid.wavenumber(n).powi(2));
            // wall row k = 0: identity
            sup_mod[[n, 0]] = 0.0;
            inv_pivot[[n, 0]] = 1.0;
            for k in 1..nz - 1 {
                let pivot = diag - sub * sup_mod[[n, k - 1]];
                inv_pivot[[n, k]] = 1.0 / pivot;
                sup_mod[[n, k]] = sub * inv_pivot[[n, k]];
            }
            // wall row k = nz - 1: identity
            sup_mod[[n, nz - 1]] = 0.0;
            inv_pivot[[n, nz - 1]] = 1.0;
        }
        ThomasSolver {
            nz,
            sub,
            sup_mod,
            inv_pivot,
        }
    }

    /// Solve mode `n`: forward substitution into `psi`, then back
    /// substitution in place.
    pub fn solve_mode(&self, n: usize, omega: &ArrayView1<f64>, psi: &mut ArrayViewMut1<f64>) {
        let nz = self.nz;
        let sup = self.sup_mod.row(n);
        let piv = self.inv_pivot.row(n);
        psi[0] = omega[0];
        for k in 1..nz - 1 {
            psi[k] = (omega[k] - self.sub * psi[k - 1]) * piv[k];
        }
        psi[nz - 1] = omega[nz - 1];
        for k in (0..nz - 1).rev() {
            let next = psi[k + 1];
            psi[k] -= sup[k] * next;
        }
    }
}
