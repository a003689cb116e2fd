//! Linear run mode: growth-rate measurement
//!
//! Seeds the conductive background plus a sine perturbation in every
//! fluctuation mode, integrates the linearised equations, and tracks the
//! logarithmic growth of the tracked fields at a fixed vertical probe. When
//! the growth estimates of every tracked field stop changing, the flow has
//! settled onto the leading eigenmode and the temperature estimate is the
//! answer; sweeping the Rayleigh number for the zero crossing locates the
//! critical value.
use crate::sim::Simulator;
use std::f64::consts::PI;

/// Probe values of the tracked fields at one instant.
#[derive(Debug, Clone, Copy)]
struct Probes {
    tmp: f64,
    omg: f64,
    psi: f64,
    xi: Option<f64>,
}

impl Probes {
    fn sample(sim: &Simulator, n_crit: usize) -> Self {
        let k = sim.integration.probe_index;
        Probes {
            tmp: sim.tmp[[n_crit, k]],
            omg: sim.omg[[n_crit, k]],
            psi: sim.psi[[n_crit, k]],
            xi: sim.xi.as_ref().map(|xi| xi[[n_crit, k]]),
        }
    }

    /// Logarithmic growth over the window ending at `self`.
    fn log_growth(&self, earlier: &Probes) -> Growth {
        let ratio = |now: f64, then: f64| now.abs().ln() - then.abs().ln();
        Growth {
            tmp: ratio(self.tmp, earlier.tmp),
            omg: ratio(self.omg, earlier.omg),
            psi: ratio(self.psi, earlier.psi),
            xi: self.xi.zip(earlier.xi).map(|(a, b)| ratio(a, b)),
        }
    }
}

/// Per-field growth estimates over one check window.
#[derive(Debug, Clone, Copy)]
struct Growth {
    tmp: f64,
    omg: f64,
    psi: f64,
    xi: Option<f64>,
}

impl Growth {
    /// All estimates settled within `tol` of the previous window.
    ///
    /// Non-finite estimates (a probe still at zero, or one that crossed
    /// zero) never count as settled.
    fn settled(&self, earlier: &Growth, tol: f64) -> bool {
        let close = |a: f64, b: f64| a.is_finite() && (a - b).abs() < tol;
        close(self.tmp, earlier.tmp)
            && close(self.omg, earlier.omg)
            && close(self.psi, earlier.psi)
            && match (self.xi, earlier.xi) {
                (Some(a), Some(b)) => close(a, b),
                _ => true,
            }
    }
}

impl Simulator {
    /// Canonical linear-mode seed: conductive background in the mean modes,
    /// `sin(pi z)` in every fluctuation mode, everything else zero.
    ///
    /// The walls are left at exactly zero; a rounded `sin(pi)` there would
    /// never decay and floors the late-time growth estimates.
    pub fn initial_linear_conditions(&mut self) {
        self.reinit();
        self.set_conductive_profile();
        let dz = self.grid.dz;
        for n in 1..self.grid.nn {
            for k in 1..self.grid.nz - 1 {
                self.tmp[[n, k]] = (PI * k as f64 * dz).sin();
            }
        }
        if let Some(xi) = &mut self.xi {
            for n in 1..self.grid.nn {
                for k in 1..self.grid.nz - 1 {
                    xi[[n, k]] = (PI * k as f64 * dz).sin();
                }
            }
        }
    }

    /// Integrate the linearised equations and measure the growth rate of
    /// mode `n_crit`.
    ///
    /// Returns the converged temperature growth estimate (per check
    /// window), or 0 if the run hit `total_time` without settling.
    pub fn run_linear(&mut self, n_crit: usize) -> f64 {
        assert!(n_crit < self.grid.nn, "critical mode outside truncation");
        self.initial_linear_conditions();
        let check_every = self.integration.growth_check_steps.max(1);
        let tol = self.integration.growth_tolerance;

        let mut probes = Probes::sample(self, n_crit);
        let mut growth: Option<Growth> = None;
        let mut steps = 0usize;
        while self.state.t < self.state.total_time {
            if steps % check_every == 0 {
                let now = Probes::sample(self, n_crit);
                let estimate = now.log_growth(&probes);
                if let Some(prev) = &growth {
                    if estimate.settled(prev, tol) {
                        log::info!(
                            "growth settled after {} steps: {:e} per window",
                            steps,
                            estimate.tmp
                        );
                        return estimate.tmp;
                    }
                }
                growth = Some(estimate);
                probes = now;
            }
            steps += 1;
            self.step_linear();
        }
        log::info!("no convergence by t = {:e}", self.state.t);
        0.0
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{GridSpec, IntegrationSpec, PhysicsSpec};
    use crate::sim::Simulator;

    fn linear_sim(ra: f64) -> Simulator {
        let grid = GridSpec::new(21, 3, 3);
        let physics = PhysicsSpec::rayleigh_benard(ra, 1.0);
        let integration = IntegrationSpec {
            dt: 2e-4,
            total_time: 20.0,
            probe_index: 10,
            growth_tolerance: 1e-8,
            ..IntegrationSpec::default()
        };
        Simulator::new(grid, physics, integration)
    }

    #[test]
    fn seed_satisfies_the_boundary_conditions() {
        let mut sim = linear_sim(1e3);
        sim.initial_linear_conditions();
        let top = sim.grid.nz - 1;
        assert_eq!(sim.tmp[[0, 0]], 0.0);
        assert_eq!(sim.tmp[[0, top]], 1.0);
        for n in 1..sim.grid.nn {
            assert!(sim.tmp[[n, 0]].abs() < 1e-12);
            assert!(sim.tmp[[n, top]].abs() < 1e-12);
        }
        assert!(sim.psi.iter().all(|&v| v == 0.0));
        assert!(sim.omg.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn supercritical_mode_grows() {
        // Ra_c for n = 1 at a = 3 is (pi^2 (1 + 1/9))^3 / (pi^2 / 9),
        // about 1.2e3; 4e3 is comfortably above
        let mut sim = linear_sim(4e3);
        let growth = sim.run_linear(1);
        assert!(growth > 0.0, "expected growth, got {:e}", growth);
    }

    #[test]
    fn subcritical_mode_decays() {
        let mut sim = linear_sim(100.0);
        let growth = sim.run_linear(1);
        assert!(growth < 0.0, "expected decay, got {:e}", growth);
    }
}
