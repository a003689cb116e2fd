//! Nonlinear run mode: full coupled evolution
//!
//! Loads an initial condition, then alternates scheduled I/O with
//! integrator steps until `total_time`. Three schedulers fire between
//! steps: kinetic-energy sampling, CFL reassessment, and checkpointing.
//! I/O never interleaves with kernel work.
use crate::error::SimError;
use crate::io::{load_checkpoint, CheckpointWriter, EnergyStreams};
use crate::numerics::check_cfl;
use crate::sim::Simulator;
use std::path::Path;

/// Steps between CFL reassessments, as a multiple of dt.
const CFL_CHECK_STEPS: f64 = 1e4;

impl Simulator {
    /// Evolve the full coupled system from the checkpoint at `ic_file`,
    /// writing checkpoints and kinetic-energy streams into `out_dir`.
    ///
    /// A final checkpoint is written after the loop, so a completed run
    /// always ends with a loadable snapshot.
    pub fn run_nonlinear(&mut self, out_dir: &Path, ic_file: &Path) -> Result<(), SimError> {
        self.state.current = 0;
        load_checkpoint(self, ic_file)?;
        self.state.t = 0.0;

        let eps = self.integration.epsilon;
        let mut checkpoints = CheckpointWriter::new(out_dir);
        let mut energies = EnergyStreams::create(out_dir, self.grid.nn)?;
        let mut ke_modes = vec![0.0; self.grid.nn];

        let mut save_time = 0.0;
        let mut ke_time = 0.0;
        let mut cfl_time = 0.0;
        let mut f = 1.0;
        while self.state.total_time - self.state.t > eps {
            if ke_time - self.state.t < eps {
                let total = self.sample_kinetic_energy(&mut ke_modes);
                energies.append(total, &ke_modes)?;
                ke_time += self.integration.ke_interval;
            }
            if self.integration.cfl_adaptive && cfl_time - self.state.t < eps {
                cfl_time += CFL_CHECK_STEPS * self.state.dt;
                f = check_cfl(&self.psi, &self.grid, self.state.dt);
                if f < 1.0 {
                    log::info!("advective bound breached, rescaling step by {:.3}", f);
                }
                log::debug!(
                    "ke log growth {:e}",
                    self.state.ke_current.abs().ln() - self.state.ke_prev.abs().ln()
                );
            }
            if save_time - self.state.t < eps {
                log::info!(
                    "{:e} of {:e} ({:.1}%)",
                    self.state.t,
                    self.state.total_time,
                    self.state.t / self.state.total_time * 100.0
                );
                save_time += self.integration.save_interval;
                checkpoints.write(self)?;
            }
            self.step_nonlinear(f);
            f = 1.0;
        }
        log::info!(
            "{:e} of {:e} ({:.2}%)",
            self.state.t,
            self.state.total_time,
            self.state.t / self.state.total_time * 100.0
        );
        checkpoints.write(self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{GridSpec, IntegrationSpec, PhysicsSpec};
    use crate::io::save_checkpoint;
    use crate::sim::Simulator;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rbdns-run-{}-{}", tag, std::process::id()));
        fs::remove_dir_all(&dir).ok();
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn specs(total_time: f64) -> (GridSpec, PhysicsSpec, IntegrationSpec) {
        let grid = GridSpec::new(17, 5, 3);
        let physics = PhysicsSpec::rayleigh_benard(500.0, 1.0);
        let integration = IntegrationSpec {
            dt: 1e-4,
            total_time,
            save_interval: total_time / 2.0,
            ke_interval: 1e-3,
            cfl_adaptive: true,
            probe_index: 8,
            ..IntegrationSpec::default()
        };
        (grid, physics, integration)
    }

    #[test]
    fn driver_emits_checkpoints_and_energy_streams() {
        let dir = scratch_dir("outputs");
        let (grid, physics, integration) = specs(0.02);

        let ic = dir.join("ic.dat");
        let mut seed = Simulator::new(grid, physics, integration);
        seed.set_conductive_profile();
        seed.random_disturbance(1e-3, 42);
        save_checkpoint(&seed, &ic).unwrap();

        let mut sim = Simulator::new(grid, physics, integration);
        sim.run_nonlinear(&dir, &ic).unwrap();

        assert!(dir.join("vars0.dat").exists());
        // final checkpoint after the loop
        assert!(dir.join("vars2.dat").exists());
        let total = fs::read(dir.join("KineticEnergy.dat")).unwrap();
        // 0.02 / 1e-3 = 20 samples, plus the one at t = 0
        assert!(total.len() >= 20 * 8);
        assert!(dir.join("KineticEnergyMode1.dat").exists());
        assert!(dir.join("KineticEnergyMode4.dat").exists());
        assert!(!dir.join("KineticEnergyMode0.dat").exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_initial_condition_is_a_fatal_error() {
        let dir = scratch_dir("missing-ic");
        let (grid, physics, integration) = specs(0.01);
        let mut sim = Simulator::new(grid, physics, integration);
        let err = sim.run_nonlinear(&dir, &dir.join("nope.dat"));
        assert!(err.is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
