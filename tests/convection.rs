//! End-to-end behaviour of the two run modes.
use rbdns::io::{load_checkpoint, save_checkpoint};
use rbdns::sim::energy::total_kinetic_energy;
use rbdns::{GridSpec, IntegrationSpec, PhysicsSpec, Simulator};
use std::fs;
use std::path::PathBuf;

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rbdns-e2e-{}-{}", tag, std::process::id()));
    fs::remove_dir_all(&dir).ok();
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn nonlinear_sim(ra: f64) -> Simulator {
    let grid = GridSpec::new(17, 5, 3);
    let physics = PhysicsSpec::rayleigh_benard(ra, 1.0);
    let integration = IntegrationSpec {
        dt: 5e-5,
        total_time: 1.0,
        probe_index: 8,
        ..IntegrationSpec::default()
    };
    let mut sim = Simulator::new(grid, physics, integration);
    sim.set_conductive_profile();
    sim.random_disturbance(1e-4, 1234);
    sim
}

/// Below the critical Rayleigh number every disturbance decays, so once
/// the buoyancy-driven spin-up transient has passed the total kinetic
/// energy must fall monotonically.
#[test]
fn subcritical_kinetic_energy_decays() {
    let mut sim = nonlinear_sim(500.0);
    for _ in 0..2000 {
        sim.step_nonlinear(1.0);
    }
    let mut previous = total_kinetic_energy(&sim.psi, &sim.grid);
    assert!(previous > 0.0);
    for _ in 0..10 {
        for _ in 0..200 {
            sim.step_nonlinear(1.0);
        }
        let ke = total_kinetic_energy(&sim.psi, &sim.grid);
        assert!(ke < previous, "energy rose from {:e} to {:e}", previous, ke);
        previous = ke;
    }
}

/// Above the critical Rayleigh number the same disturbance extracts energy
/// from the background gradient.
#[test]
fn supercritical_kinetic_energy_grows() {
    let mut sim = nonlinear_sim(1e4);
    for _ in 0..50 {
        sim.step_nonlinear(1.0);
    }
    let early = total_kinetic_energy(&sim.psi, &sim.grid);
    for _ in 0..2000 {
        sim.step_nonlinear(1.0);
    }
    let late = total_kinetic_energy(&sim.psi, &sim.grid);
    assert!(
        late > 10.0 * early,
        "expected growth, got {:e} -> {:e}",
        early,
        late
    );
}

/// An interrupted-and-resumed run matches an uninterrupted one.
#[test]
fn checkpoint_resume_matches_straight_run() {
    let dir = scratch_dir("resume");
    let path = dir.join("mid.dat");

    let mut straight = nonlinear_sim(2e3);
    let mut resumed = nonlinear_sim(2e3);

    for _ in 0..100 {
        straight.step_nonlinear(1.0);
        resumed.step_nonlinear(1.0);
    }
    save_checkpoint(&resumed, &path).unwrap();

    let mut fresh = nonlinear_sim(2e3);
    fresh.reinit();
    fresh.state.current = resumed.state.current;
    load_checkpoint(&mut fresh, &path).unwrap();

    for _ in 0..100 {
        straight.step_nonlinear(1.0);
        fresh.step_nonlinear(1.0);
    }

    let mut max_diff = 0.0_f64;
    for (a, b) in straight.tmp.iter().zip(fresh.tmp.iter()) {
        max_diff = max_diff.max((a - b).abs());
    }
    for (a, b) in straight.psi.iter().zip(fresh.psi.iter()) {
        max_diff = max_diff.max((a - b).abs());
    }
    assert!(max_diff < 1e-12, "resumed run diverged by {:e}", max_diff);

    fs::remove_dir_all(&dir).ok();
}

/// The growth rate returned by the linear driver changes sign across the
/// critical Rayleigh number of the tracked mode.
#[test]
fn linear_growth_rate_brackets_the_critical_rayleigh_number() {
    let run = |ra: f64| {
        let grid = GridSpec::new(21, 3, 3);
        let physics = PhysicsSpec::rayleigh_benard(ra, 1.0);
        let integration = IntegrationSpec {
            dt: 2e-4,
            total_time: 20.0,
            probe_index: 10,
            growth_tolerance: 1e-8,
            ..IntegrationSpec::default()
        };
        Simulator::new(grid, physics, integration).run_linear(1)
    };
    // Ra_c(n = 1, a = 3) = (pi^2 + (pi/3)^2)^3 / (pi/3)^2, about 1.2e3
    assert!(run(3e3) > 0.0);
    assert!(run(300.0) < 0.0);
}

/// A double-diffusive checkpoint round-trips through the extended layout.
#[test]
fn ddc_checkpoint_round_trips() {
    use rbdns::DdcSpec;
    let dir = scratch_dir("ddc");
    let path = dir.join("ddc.dat");

    let grid = GridSpec::new(9, 3, 1);
    let physics = PhysicsSpec {
        pr: 7.0,
        ra: 1e3,
        tmp_grad: 1.0,
        ddc: Some(DdcSpec {
            ra_xi: 50.0,
            tau: 0.3,
            xi_grad: 1.0,
        }),
    };
    let integration = IntegrationSpec {
        dt: 1e-6,
        probe_index: 4,
        ..IntegrationSpec::default()
    };
    let mut sim = Simulator::new(grid, physics, integration);
    sim.set_conductive_profile();
    sim.xi.as_mut().unwrap()[[1, 4]] = 0.5;
    for _ in 0..10 {
        sim.step_linear();
    }
    save_checkpoint(&sim, &path).unwrap();

    let mut other = Simulator::new(grid, physics, integration);
    other.state.current = sim.state.current;
    load_checkpoint(&mut other, &path).unwrap();
    assert_eq!(sim.xi.as_ref().unwrap(), other.xi.as_ref().unwrap());
    assert_eq!(sim.tmp, other.tmp);

    fs::remove_dir_all(&dir).ok();
}
