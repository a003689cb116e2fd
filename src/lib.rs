//! # `rbdns`: pseudo-spectral DNS of Rayleigh-Benard convection
//!
//! # Details
//!
//! This library integrates the 2-D Boussinesq equations on a horizontally
//! periodic slab bounded by isothermal, stress-free walls. The horizontal
//! direction is a truncated sine/cosine Fourier series of N modes, the
//! vertical direction a uniform grid of Z points, and time advances with a
//! second-order Adams-Bashforth scheme. A second diffusing scalar can be
//! switched on in the configuration, turning the problem double-diffusive.
//!
//! ## Run modes
//!
//! - `Linear`: integrates the linearised equations and measures modal
//!   growth rates, used to bracket the critical Rayleigh number; see
//!   [`sim::linear`].
//! - `Nonlinear`: evolves the full triad-coupled system, periodically
//!   checkpointing the fields and streaming kinetic energies; see
//!   [`sim::nonlinear`].
//!
//! # Example
//! Evolve a supercritical disturbance
//! (run with `cargo run --release`):
//! ```ignore
//! use rbdns::{GridSpec, IntegrationSpec, PhysicsSpec, Simulator};
//! use std::path::Path;
//!
//! fn main() -> Result<(), rbdns::SimError> {
//!     let grid = GridSpec::new(65, 17, 3);
//!     let physics = PhysicsSpec::rayleigh_benard(1e4, 1.0);
//!     let integration = IntegrationSpec {
//!         dt: 3e-6,
//!         total_time: 1.0,
//!         ..IntegrationSpec::default()
//!     };
//!     let mut sim = Simulator::new(grid, physics, integration);
//!     sim.run_nonlinear(Path::new("data"), Path::new("data/ic.dat"))
//! }
//! ```
#![warn(missing_docs)]
pub mod config;
pub mod error;
pub mod field;
pub mod io;
pub mod numerics;
pub mod sim;
pub mod solver;
pub use config::{DdcSpec, GridSpec, IntegrationSpec, PhysicsSpec};
pub use error::SimError;
pub use field::{Field, TendencyPair};
pub use sim::{SimState, Simulator};
pub use solver::ThomasSolver;
