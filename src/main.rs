use rbdns::io::save_checkpoint;
use rbdns::{GridSpec, IntegrationSpec, PhysicsSpec, SimError, Simulator};
use std::fs;
use std::path::PathBuf;

fn main() -> Result<(), SimError> {
    env_logger::init();

    // Parameters
    let grid = GridSpec::new(101, 51, 3);
    let physics = PhysicsSpec::rayleigh_benard(1e6, 0.5);
    let integration = IntegrationSpec {
        dt: 3e-6,
        total_time: 0.5,
        save_interval: 1e-2,
        ..IntegrationSpec::default()
    };

    let out_dir = PathBuf::from("data");
    fs::create_dir_all(&out_dir).map_err(|e| SimError::io(&out_dir, e))?;

    // Initial condition: conductive background plus a small disturbance
    let ic_file = out_dir.join("ic.dat");
    let mut seed = Simulator::new(grid, physics, integration);
    seed.set_conductive_profile();
    seed.random_disturbance(1e-3, 0);
    save_checkpoint(&seed, &ic_file)?;

    let mut sim = Simulator::new(grid, physics, integration);
    sim.run_nonlinear(&out_dir, &ic_file)?;
    sim.benchmark_rows();
    Ok(())
}
