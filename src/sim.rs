//! # Direct numerical simulation core
//!
//! [`Simulator`] owns the spectral-vertical fields, the two-level tendency
//! buffers and the precomputed streamfunction solver, and advances them with
//! a second-order Adams-Bashforth step:
//!
//! 1. linear tendencies (diffusion, buoyancy),
//! 2. nonlinear triad couplings (nonlinear mode only),
//! 3. Adams-Bashforth update of temperature and vorticity (and the second
//!    scalar in double-diffusive runs),
//! 4. tridiagonal solve of `laplacian(psi) = omega` per mode,
//! 5. buffer rotation.
//!
//! The two run modes live in [`linear`] and [`nonlinear`]; energy
//! diagnostics in [`energy`].
//!
//! # Example
//! Measure the growth rate of the first mode just above onset:
//! ```
//! use rbdns::{GridSpec, IntegrationSpec, PhysicsSpec, Simulator};
//!
//! let grid = GridSpec::new(21, 3, 3);
//! let physics = PhysicsSpec::rayleigh_benard(2000.0, 1.0);
//! let integration = IntegrationSpec {
//!     dt: 2e-4,
//!     total_time: 0.5,
//!     probe_index: 10,
//!     ..IntegrationSpec::default()
//! };
//! let mut sim = Simulator::new(grid, physics, integration);
//! let growth = sim.run_linear(1);
//! assert!(growth >= 0.0);
//! ```
pub mod energy;
pub mod linear;
pub mod nonlinear;

use crate::config::{GridSpec, IntegrationSpec, PhysicsSpec};
use crate::field::{self, Field, TendencyPair};
use crate::numerics::{adams_bashforth, dfdz, dfdz2};
use crate::solver::ThomasSolver;
use ndarray::{s, Array2, Zip};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::PI;

/// Mutable scalar state of a run.
#[derive(Debug, Clone, Copy)]
pub struct SimState {
    /// Current simulation time
    pub t: f64,
    /// Time step size
    pub dt: f64,
    /// Target simulation time
    pub total_time: f64,
    /// Selector of the freshly written tendency slot, 0 or 1
    pub current: usize,
    /// Total kinetic energy at the second-to-last sample
    pub ke_prev: f64,
    /// Total kinetic energy at the last sample
    pub ke_current: f64,
}

impl SimState {
    fn new(integration: &IntegrationSpec) -> Self {
        SimState {
            t: 0.0,
            dt: integration.dt,
            total_time: integration.total_time,
            current: 0,
            ke_prev: 0.0,
            ke_current: 0.0,
        }
    }
}

/// Pseudo-spectral Boussinesq solver on a horizontally periodic slab.
///
/// All arrays are allocated once at construction and mutated in place; a
/// step performs no allocation.
pub struct Simulator {
    /// Grid description
    pub grid: GridSpec,
    /// Fluid parameters
    pub physics: PhysicsSpec,
    /// Schedule and tolerances
    pub integration: IntegrationSpec,
    /// Streamfunction
    pub psi: Field,
    /// Vorticity
    pub omg: Field,
    /// Temperature
    pub tmp: Field,
    /// Second scalar, present in double-diffusive runs
    pub xi: Option<Field>,
    /// Temperature tendencies (ping-pong)
    pub dtmpdt: TendencyPair,
    /// Vorticity tendencies (ping-pong)
    pub domgdt: TendencyPair,
    /// Second-scalar tendencies, present in double-diffusive runs
    pub dxidt: Option<TendencyPair>,
    /// Scalar run state
    pub state: SimState,
    solver: ThomasSolver,
}

impl Simulator {
    /// Allocate a quiescent simulator for the given specs.
    pub fn new(grid: GridSpec, physics: PhysicsSpec, integration: IntegrationSpec) -> Self {
        assert!(
            integration.probe_index < grid.nz,
            "probe row {} outside the vertical grid of {} points",
            integration.probe_index,
            grid.nz
        );
        let solver = ThomasSolver::new(&grid);
        let (xi, dxidt) = if physics.ddc.is_some() {
            (Some(field::zeros(&grid)), Some(TendencyPair::new(&grid)))
        } else {
            (None, None)
        };
        Simulator {
            grid,
            physics,
            integration,
            psi: field::zeros(&grid),
            omg: field::zeros(&grid),
            tmp: field::zeros(&grid),
            xi,
            dtmpdt: TendencyPair::new(&grid),
            domgdt: TendencyPair::new(&grid),
            dxidt,
            state: SimState::new(&integration),
            solver,
        }
    }

    /// Zero every field and both tendency slots.
    pub fn reinit(&mut self) {
        self.psi.fill(0.0);
        self.omg.fill(0.0);
        self.tmp.fill(0.0);
        self.dtmpdt.clear();
        self.domgdt.clear();
        if let Some(xi) = &mut self.xi {
            xi.fill(0.0);
        }
        if let Some(dxidt) = &mut self.dxidt {
            dxidt.clear();
        }
    }

    /// Write the conductive background into the mean modes.
    ///
    /// `tmp_grad = -1` gives the heated-from-below profile `1 - z`,
    /// `tmp_grad = +1` the profile `z`; likewise for the second scalar.
    pub fn set_conductive_profile(&mut self) {
        let dz = self.grid.dz;
        let tmp_grad = self.physics.tmp_grad;
        for k in 0..self.grid.nz {
            let z = k as f64 * dz;
            self.tmp[[0, k]] = if tmp_grad < 0.0 { 1.0 - z } else { z };
        }
        if let (Some(ddc), Some(xi)) = (self.physics.ddc, self.xi.as_mut()) {
            for k in 0..self.grid.nz {
                let z = k as f64 * dz;
                xi[[0, k]] = if ddc.xi_grad < 0.0 { 1.0 - z } else { z };
            }
        }
    }

    /// Perturb the interior of the fluctuation temperature modes with
    /// uniform noise in `[-amp, amp]`. Deterministic for a given seed.
    pub fn random_disturbance(&mut self, amp: f64, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Array2::random_using(
            (self.grid.nn, self.grid.nz),
            Uniform::new(-amp, amp),
            &mut rng,
        );
        for n in 1..self.grid.nn {
            for k in 1..self.grid.nz - 1 {
                self.tmp[[n, k]] += noise[[n, k]];
            }
        }
    }

    /// Diffusion and buoyancy tendencies for all modes `n >= n_start`.
    ///
    /// In linear mode (`linear_mode = true`) the mean mode is skipped and
    /// the background gradient couples to the perturbation streamfunction;
    /// in nonlinear mode the mean mode participates so that the triad
    /// kernel's mean-mode sink has a diffusive counterpart.
    ///
    /// Writes the `current` tendency slot at interior points; the nonlinear
    /// kernel adds on top, so this pass must run first.
    pub fn linear_tendencies(&mut self, linear_mode: bool) {
        let cur = self.state.current;
        let grid = self.grid;
        let pr = self.physics.pr;
        let ra = self.physics.ra;
        let n_start = if linear_mode { 1 } else { 0 };

        let dtmp = self.dtmpdt.current_mut(cur);
        let domg = self.domgdt.current_mut(cur);
        for n in n_start..grid.nn {
            let kn = grid.wavenumber(n);
            let tmp_row = self.tmp.row(n);
            let omg_row = self.omg.row(n);
            let psi_row = self.psi.row(n);
            for k in 1..grid.nz - 1 {
                let mut dtmp_nk = dfdz2(&tmp_row, k, grid.dz) - kn * kn * tmp_row[k];
                if linear_mode {
                    dtmp_nk += -self.physics.tmp_grad * kn * psi_row[k];
                }
                dtmp[[n, k]] = dtmp_nk;
                domg[[n, k]] = pr
                    * (dfdz2(&omg_row, k, grid.dz) - kn * kn * omg_row[k] + ra * kn * tmp_row[k]);
            }
        }

        if let (Some(ddc), Some(xi), Some(dxidt)) =
            (self.physics.ddc, self.xi.as_ref(), self.dxidt.as_mut())
        {
            let dxi = dxidt.current_mut(cur);
            for n in n_start..grid.nn {
                let kn = grid.wavenumber(n);
                let xi_row = xi.row(n);
                let psi_row = self.psi.row(n);
                for k in 1..grid.nz - 1 {
                    let mut dxi_nk = ddc.tau * (dfdz2(&xi_row, k, grid.dz) - kn * kn * xi_row[k]);
                    if linear_mode {
                        dxi_nk += -ddc.xi_grad * kn * psi_row[k];
                    }
                    dxi[[n, k]] = dxi_nk;
                    domg[[n, k]] += -ddc.ra_xi * ddc.tau * pr * kn * xi_row[k];
                }
            }
        }
    }

    /// Triad mode couplings of the quadratic advection terms.
    ///
    /// The mean-mode accumulation runs first and serially, because every
    /// fluctuation mode writes into row 0; the remaining work is
    /// independent per mode and fans out over the outer index.
    pub fn nonlinear_tendencies(&mut self) {
        let cur = self.state.current;
        let grid = self.grid;
        let dz = grid.dz;
        let half = PI / (2.0 * grid.a as f64);

        {
            let dtmp = self.dtmpdt.current_mut(cur);
            for n in 1..grid.nn {
                let psi_row = self.psi.row(n);
                let tmp_row = self.tmp.row(n);
                for k in 1..grid.nz - 1 {
                    dtmp[[0, k]] += -half
                        * n as f64
                        * (dfdz(&psi_row, k, dz) * tmp_row[k]
                            + dfdz(&tmp_row, k, dz) * psi_row[k]);
                }
            }
        }
        if grid.nn < 2 {
            return;
        }

        let psi = &self.psi;
        let tmp = &self.tmp;
        let omg = &self.omg;
        let dtmp = self.dtmpdt.current_mut(cur);
        let domg = self.domgdt.current_mut(cur);
        let mut dtmp_fluct = dtmp.slice_mut(s![1.., ..]);
        let mut domg_fluct = domg.slice_mut(s![1.., ..]);

        Zip::indexed(dtmp_fluct.rows_mut())
            .and(domg_fluct.rows_mut())
            .par_for_each(|i, mut dtmp_n, mut domg_n| {
                let n = i + 1;
                let psi_n = psi.row(n);
                let tmp_mean = tmp.row(0);

                // advection of the mean temperature profile
                let kn = grid.wavenumber(n);
                for k in 1..grid.nz - 1 {
                    dtmp_n[k] += -kn * psi_n[k] * dfdz(&tmp_mean, k, dz);
                }

                // n = m + o
                for m in 1..n {
                    let o = n - m;
                    let (mf, of) = (m as f64, o as f64);
                    let psi_o = psi.row(o);
                    let tmp_m = tmp.row(m);
                    let omg_m = omg.row(m);
                    for k in 1..grid.nz - 1 {
                        let dpsi_o = dfdz(&psi_o, k, dz);
                        dtmp_n[k] +=
                            -half * (-mf * dpsi_o * tmp_m[k] + of * dfdz(&tmp_m, k, dz) * psi_o[k]);
                        domg_n[k] +=
                            -half * (-mf * dpsi_o * omg_m[k] + of * dfdz(&omg_m, k, dz) * psi_o[k]);
                    }
                }
                // n = m - o
                for m in n + 1..grid.nn {
                    let o = m - n;
                    let (mf, of) = (m as f64, o as f64);
                    let psi_o = psi.row(o);
                    let tmp_m = tmp.row(m);
                    let omg_m = omg.row(m);
                    for k in 1..grid.nz - 1 {
                        let dpsi_o = dfdz(&psi_o, k, dz);
                        dtmp_n[k] +=
                            -half * (mf * dpsi_o * tmp_m[k] + of * dfdz(&tmp_m, k, dz) * psi_o[k]);
                        domg_n[k] +=
                            -half * (mf * dpsi_o * omg_m[k] + of * dfdz(&omg_m, k, dz) * psi_o[k]);
                    }
                }
                // n = o - m; the vorticity branch flips sign
                for m in 1..grid.nn - n {
                    let o = n + m;
                    let (mf, of) = (m as f64, o as f64);
                    let psi_o = psi.row(o);
                    let tmp_m = tmp.row(m);
                    let omg_m = omg.row(m);
                    for k in 1..grid.nz - 1 {
                        let dpsi_o = dfdz(&psi_o, k, dz);
                        dtmp_n[k] +=
                            -half * (mf * dpsi_o * tmp_m[k] + of * dfdz(&tmp_m, k, dz) * psi_o[k]);
                        domg_n[k] +=
                            half * (mf * dpsi_o * omg_m[k] + of * dfdz(&omg_m, k, dz) * psi_o[k]);
                    }
                }
            });
    }

    /// Adams-Bashforth update of temperature and vorticity.
    ///
    /// `f` is the step-rescaling factor from the CFL estimator; 1 when the
    /// step is unchanged. Wall rows of the tendency buffers are always
    /// zero, so the wall values of the fields are preserved bit for bit.
    pub fn update_tmp_and_omg(&mut self, f: f64) {
        let cur = self.state.current;
        let dt = self.state.dt;
        let (dnew, dold) = self.dtmpdt.pair(cur);
        Zip::from(&mut self.tmp)
            .and(dnew)
            .and(dold)
            .for_each(|v, &dn, &dold| *v += adams_bashforth(dn, dold, f, dt));
        let (dnew, dold) = self.domgdt.pair(cur);
        Zip::from(&mut self.omg)
            .and(dnew)
            .and(dold)
            .for_each(|v, &dn, &dold| *v += adams_bashforth(dn, dold, f, dt));
        self.assert_field_invariants();
    }

    /// Adams-Bashforth update of the second scalar.
    pub fn update_xi(&mut self, f: f64) {
        let cur = self.state.current;
        let dt = self.state.dt;
        if let (Some(xi), Some(dxidt)) = (self.xi.as_mut(), self.dxidt.as_ref()) {
            let (dnew, dold) = dxidt.pair(cur);
            Zip::from(xi)
                .and(dnew)
                .and(dold)
                .for_each(|v, &dn, &dold| *v += adams_bashforth(dn, dold, f, dt));
        }
    }

    /// Solve `laplacian(psi_n) = omega_n` for every mode.
    pub fn solve_psi(&mut self) {
        for n in 0..self.grid.nn {
            let omg_row = self.omg.row(n);
            let mut psi_row = self.psi.row_mut(n);
            self.solver.solve_mode(n, &omg_row, &mut psi_row);
        }
        #[cfg(debug_assertions)]
        for n in 0..self.grid.nn {
            assert!(self.psi[[n, 0]] == 0.0, "psi wall row leaked, mode {}", n);
            assert!(
                self.psi[[n, self.grid.nz - 1]] == 0.0,
                "psi wall row leaked, mode {}",
                n
            );
        }
    }

    /// One linear-mode step: diffusion and background coupling only.
    pub fn step_linear(&mut self) {
        self.linear_tendencies(true);
        self.advance(1.0);
    }

    /// One nonlinear-mode step with step-rescaling factor `f`.
    pub fn step_nonlinear(&mut self, f: f64) {
        self.linear_tendencies(false);
        self.nonlinear_tendencies();
        self.advance(f);
    }

    fn advance(&mut self, f: f64) {
        self.update_tmp_and_omg(f);
        self.update_xi(f);
        self.solve_psi();
        self.state.t += self.state.dt;
        self.state.current = (self.state.current + 1) % 2;
    }

    /// Log temperature, vorticity and streamfunction at the probe row for
    /// the leading modes.
    pub fn benchmark_rows(&self) {
        let probe = self.integration.probe_index;
        log::info!(
            "{:e} of {:e} ({:.2}%)",
            self.state.t,
            self.state.total_time,
            self.state.t / self.state.total_time * 100.0
        );
        for n in 0..self.grid.nn.min(21) {
            log::info!(
                "{} | {:e} | {:e} | {:e}",
                n,
                self.tmp[[n, probe]],
                self.omg[[n, probe]],
                self.psi[[n, probe]]
            );
        }
    }

    /// Wall and NaN invariants, checked after every field update in debug
    /// builds.
    fn assert_field_invariants(&self) {
        #[cfg(debug_assertions)]
        {
            let eps = self.integration.epsilon;
            let top = self.grid.nz - 1;
            let bottom_tmp = self.physics.bottom_temperature();
            assert!(
                (self.tmp[[0, 0]] - bottom_tmp).abs() < eps,
                "mean temperature bottom wall drifted"
            );
            assert!(
                (self.tmp[[0, top]] - (1.0 - bottom_tmp)).abs() < eps,
                "mean temperature top wall drifted"
            );
            for n in 0..self.grid.nn {
                if n > 0 {
                    assert!(self.tmp[[n, 0]].abs() < eps, "tmp wall leak, mode {}", n);
                    assert!(self.tmp[[n, top]].abs() < eps, "tmp wall leak, mode {}", n);
                }
                assert!(self.omg[[n, 0]].abs() < eps, "omg wall leak, mode {}", n);
                assert!(self.omg[[n, top]].abs() < eps, "omg wall leak, mode {}", n);
            }
            assert!(
                !self.tmp.iter().any(|v| v.is_nan()),
                "NaN in temperature field"
            );
            assert!(
                !self.omg.iter().any(|v| v.is_nan()),
                "NaN in vorticity field"
            );
        }
    }
}
