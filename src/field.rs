//! Spectral-vertical field storage
//!
//! A field holds one coefficient per (mode, grid point) pair. Row `n` of the
//! array is the vertical profile of horizontal mode `n`, so centred vertical
//! stencils walk along rows and the mode-coupling kernels combine whole rows.
use crate::config::GridSpec;
use ndarray::Array2;

/// A spectral-vertical field: shape `(nn, nz)`, `f64` everywhere.
pub type Field = Array2<f64>;

/// Allocate a zeroed field on `grid`.
pub fn zeros(grid: &GridSpec) -> Field {
    Array2::zeros((grid.nn, grid.nz))
}

/// Ping-pong pair of tendency fields.
///
/// At a step boundary the `current` slot holds the freshly computed
/// tendencies and the other slot the previous step's, consumed together by
/// the Adams-Bashforth combiner. The selector itself lives in
/// [`SimState`](crate::sim::SimState); rotating it swaps the roles without
/// copying.
#[derive(Debug, Clone)]
pub struct TendencyPair {
    slots: [Field; 2],
}

impl TendencyPair {
    /// Two zeroed slots on `grid`.
    pub fn new(grid: &GridSpec) -> Self {
        TendencyPair {
            slots: [zeros(grid), zeros(grid)],
        }
    }

    /// Slot being written this step.
    pub fn current(&self, current: usize) -> &Field {
        &self.slots[current]
    }

    /// Mutable slot being written this step.
    pub fn current_mut(&mut self, current: usize) -> &mut Field {
        &mut self.slots[current]
    }

    /// Slot holding the previous step's tendencies.
    pub fn previous(&self, current: usize) -> &Field {
        &self.slots[(current + 1) % 2]
    }

    /// Mutable slot holding the previous step's tendencies.
    pub fn previous_mut(&mut self, current: usize) -> &mut Field {
        &mut self.slots[(current + 1) % 2]
    }

    /// Both slots at once: `(current, previous)`.
    pub fn pair(&self, current: usize) -> (&Field, &Field) {
        if current == 0 {
            (&self.slots[0], &self.slots[1])
        } else {
            (&self.slots[1], &self.slots[0])
        }
    }

    /// Zero both slots.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.fill(0.0);
        }
    }
}
