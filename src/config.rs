//! Simulation parameter sets
//!
//! Three immutable parameter sets describe a run: the grid, the fluid, and
//! the integration schedule. They are plain data with serde derives so an
//! outer configuration layer can ingest them; construction in code is the
//! normal path.
use serde::{Deserialize, Serialize};

/// Spectral-vertical grid description.
///
/// The horizontal direction is a truncated sine/cosine series of `nn` modes
/// on a periodic slab of aspect ratio `a`; the vertical direction is a
/// uniform grid of `nz` points on `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of vertical grid points Z
    pub nz: usize,
    /// Number of horizontal modes N
    pub nn: usize,
    /// Aspect ratio (integer)
    pub a: usize,
    /// Horizontal resolution X = Z * a
    pub nx: usize,
    /// Vertical grid spacing 1 / (Z - 1)
    pub dz: f64,
    /// Horizontal grid spacing a / (X - 1)
    pub dx: f64,
    /// Precomputed (1 / dz)^2
    pub oodz2: f64,
}

impl GridSpec {
    /// Derive the full grid from resolution and aspect ratio.
    ///
    /// `nz >= 3` so at least one interior point exists for the centred
    /// stencils; `nn >= 1` so the mean mode is always present.
    pub fn new(nz: usize, nn: usize, a: usize) -> Self {
        assert!(nz >= 3, "need at least one interior vertical point");
        assert!(nn >= 1, "need at least the mean mode");
        assert!(a >= 1, "aspect ratio must be positive");
        let nx = nz * a;
        let dz = 1.0 / (nz - 1) as f64;
        let dx = a as f64 / (nx - 1) as f64;
        GridSpec {
            nz,
            nn,
            a,
            nx,
            dz,
            dx,
            oodz2: (1.0 / dz).powi(2),
        }
    }

    /// Horizontal wavenumber n * pi / a of mode `n`.
    pub fn wavenumber(&self, n: usize) -> f64 {
        n as f64 * std::f64::consts::PI / self.a as f64
    }
}

/// Second-scalar (double-diffusive) parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DdcSpec {
    /// Rayleigh number of the second scalar
    pub ra_xi: f64,
    /// Ratio of the second scalar's diffusivity to the thermal one
    pub tau: f64,
    /// Background gradient sign of the second scalar, -1 or +1
    pub xi_grad: f64,
}

/// Fluid parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PhysicsSpec {
    /// Prandtl number
    pub pr: f64,
    /// Rayleigh number
    pub ra: f64,
    /// Background temperature gradient sign, -1 or +1.
    ///
    /// `-1` selects the conductive profile `1 - z`, `+1` the profile `z`.
    /// Under the sign conventions of the tendency kernel, `+1` is the
    /// destabilising orientation: it feeds the buoyancy loop that grows
    /// past the critical Rayleigh number.
    pub tmp_grad: f64,
    /// Second diffusing scalar; `None` runs plain Rayleigh-Benard
    pub ddc: Option<DdcSpec>,
}

impl PhysicsSpec {
    /// Plain Rayleigh-Benard with the destabilising background gradient.
    pub fn rayleigh_benard(ra: f64, pr: f64) -> Self {
        PhysicsSpec {
            pr,
            ra,
            tmp_grad: 1.0,
            ddc: None,
        }
    }

    /// Fixed wall value of the mean temperature mode at k = 0.
    pub fn bottom_temperature(&self) -> f64 {
        if self.tmp_grad < 0.0 {
            1.0
        } else {
            0.0
        }
    }
}

/// Time integration schedule and tolerances.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationSpec {
    /// Time step size
    pub dt: f64,
    /// Target simulation time
    pub total_time: f64,
    /// Time between checkpoint writes (nonlinear mode)
    pub save_interval: f64,
    /// Time between kinetic-energy samples
    pub ke_interval: f64,
    /// Reassess the CFL factor periodically (nonlinear mode)
    pub cfl_adaptive: bool,
    /// Tolerance for scheduler comparisons and invariant asserts
    pub epsilon: f64,
    /// Vertical probe row for growth tracking and benchmark reports
    pub probe_index: usize,
    /// Convergence tolerance on the change of growth estimates
    pub growth_tolerance: f64,
    /// Steps between growth-rate checks in the linear driver
    pub growth_check_steps: usize,
}

impl Default for IntegrationSpec {
    fn default() -> Self {
        IntegrationSpec {
            dt: 1e-5,
            total_time: 1.0,
            save_interval: 1e-1,
            ke_interval: 1e-4,
            cfl_adaptive: true,
            epsilon: 1e-10,
            probe_index: 32,
            growth_tolerance: 1e-10,
            growth_check_steps: 500,
        }
    }
}
