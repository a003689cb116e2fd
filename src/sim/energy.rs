//! Kinetic-energy diagnostics
//!
//! The velocity of mode n is `(dpsi_n/dz, -n pi/a psi_n)` up to the
//! horizontal trigonometric factors, so the modal kinetic energy reduces to
//! a 1-D vertical integral evaluated with the trapezoidal rule.
use crate::config::GridSpec;
use crate::field::Field;
use crate::numerics::dfdz;
use crate::sim::Simulator;

/// Kinetic energy carried by horizontal mode `n`.
pub fn mode_kinetic_energy(psi: &Field, grid: &GridSpec, n: usize) -> f64 {
    let kn = grid.wavenumber(n);
    let row = psi.row(n);
    let mut ke = (kn * row[0]).powi(2) / 2.0;
    ke += (kn * row[grid.nz - 1]).powi(2) / 2.0;
    for k in 1..grid.nz - 1 {
        ke += dfdz(&row, k, grid.dz).powi(2) + (kn * row[k]).powi(2);
    }
    ke * grid.a as f64 / (4.0 * (grid.nz - 1) as f64)
}

/// Total kinetic energy, summed over every mode including the mean.
pub fn total_kinetic_energy(psi: &Field, grid: &GridSpec) -> f64 {
    (0..grid.nn)
        .map(|n| mode_kinetic_energy(psi, grid, n))
        .sum()
}

impl Simulator {
    /// Fill `per_mode` with the modal kinetic energies and roll the
    /// (previous, current) total pair in the state.
    ///
    /// `per_mode` must have length `nn`. Returns the new total.
    pub fn sample_kinetic_energy(&mut self, per_mode: &mut [f64]) -> f64 {
        for (n, slot) in per_mode.iter_mut().enumerate() {
            *slot = mode_kinetic_energy(&self.psi, &self.grid, n);
        }
        let total = per_mode.iter().sum();
        self.state.ke_prev = self.state.ke_current;
        self.state.ke_current = total;
        total
    }
}
