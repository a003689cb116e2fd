use criterion::Criterion;
use criterion::{criterion_group, criterion_main};
use rbdns::{GridSpec, IntegrationSpec, PhysicsSpec, Simulator};

const SIZES: [(usize, usize); 3] = [(33, 9), (65, 17), (101, 51)];

fn perturbed(nz: usize, nn: usize) -> Simulator {
    let grid = GridSpec::new(nz, nn, 3);
    let physics = PhysicsSpec::rayleigh_benard(1e6, 0.5);
    let integration = IntegrationSpec {
        dt: 3e-6,
        probe_index: nz / 2,
        ..IntegrationSpec::default()
    };
    let mut sim = Simulator::new(grid, physics, integration);
    sim.set_conductive_profile();
    sim.random_disturbance(1e-3, 0);
    sim
}

pub fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("Simulator");
    group.significance_level(0.1).sample_size(10);
    for (nz, nn) in SIZES.iter() {
        let mut sim = perturbed(*nz, *nn);
        let name = format!("step {}x{}", nz, nn);
        group.bench_function(&name, |b| b.iter(|| sim.step_nonlinear(1.0)));
    }
    group.finish();
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
