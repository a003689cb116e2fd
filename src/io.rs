//! Checkpoint and kinetic-energy file I/O
//!
//! A checkpoint is a single binary blob of native-endian doubles written in
//! a fixed order: T, omega, psi, then the current and previous tendency
//! slots of T and omega (N * Z values each). Double-diffusive runs append
//! the second scalar and its two tendency slots in the same pattern;
//! loading such a file requires the same DDC configuration that wrote it.
//!
//! Kinetic-energy samples are appended to one stream for the total and one
//! per fluctuation mode, one double per sample.
use crate::error::SimError;
use crate::field::Field;
use crate::sim::Simulator;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Checkpoint file name for sequence number `seq`: `vars<seq>.dat`.
pub fn checkpoint_path(dir: &Path, seq: usize) -> PathBuf {
    dir.join(format!("vars{}.dat", seq))
}

fn write_field(w: &mut BufWriter<File>, field: &Field, path: &Path) -> Result<(), SimError> {
    let values = field.as_slice().expect("fields are stored contiguously");
    w.write_all(bytemuck::cast_slice(values))
        .map_err(|e| SimError::io(path, e))
}

fn read_field(r: &mut File, field: &mut Field, path: &Path) -> Result<(), SimError> {
    let values = field.as_slice_mut().expect("fields are stored contiguously");
    r.read_exact(bytemuck::cast_slice_mut(values))
        .map_err(|e| SimError::io(path, e))
}

/// Write the full state snapshot of `sim` to `path`.
pub fn save_checkpoint(sim: &Simulator, path: &Path) -> Result<(), SimError> {
    let file = File::create(path).map_err(|e| SimError::io(path, e))?;
    let mut w = BufWriter::new(file);
    let cur = sim.state.current;
    write_field(&mut w, &sim.tmp, path)?;
    write_field(&mut w, &sim.omg, path)?;
    write_field(&mut w, &sim.psi, path)?;
    write_field(&mut w, sim.dtmpdt.current(cur), path)?;
    write_field(&mut w, sim.dtmpdt.previous(cur), path)?;
    write_field(&mut w, sim.domgdt.current(cur), path)?;
    write_field(&mut w, sim.domgdt.previous(cur), path)?;
    if let (Some(xi), Some(dxidt)) = (sim.xi.as_ref(), sim.dxidt.as_ref()) {
        write_field(&mut w, xi, path)?;
        write_field(&mut w, dxidt.current(cur), path)?;
        write_field(&mut w, dxidt.previous(cur), path)?;
    }
    w.flush().map_err(|e| SimError::io(path, e))
}

/// Load a snapshot written by [`save_checkpoint`] into `sim`.
///
/// The file's current slot lands in `sim`'s current slot, so a reloaded
/// simulator continues exactly where the saved one stopped.
pub fn load_checkpoint(sim: &mut Simulator, path: &Path) -> Result<(), SimError> {
    let mut file = File::open(path).map_err(|e| SimError::io(path, e))?;
    let cur = sim.state.current;
    read_field(&mut file, &mut sim.tmp, path)?;
    read_field(&mut file, &mut sim.omg, path)?;
    read_field(&mut file, &mut sim.psi, path)?;
    read_field(&mut file, sim.dtmpdt.current_mut(cur), path)?;
    read_field(&mut file, sim.dtmpdt.previous_mut(cur), path)?;
    read_field(&mut file, sim.domgdt.current_mut(cur), path)?;
    read_field(&mut file, sim.domgdt.previous_mut(cur), path)?;
    if let Some(xi) = sim.xi.as_mut() {
        read_field(&mut file, xi, path)?;
    }
    if let Some(dxidt) = sim.dxidt.as_mut() {
        read_field(&mut file, dxidt.current_mut(cur), path)?;
        read_field(&mut file, dxidt.previous_mut(cur), path)?;
    }
    Ok(())
}

/// Sequentially numbered checkpoint writer for one run.
#[derive(Debug)]
pub struct CheckpointWriter {
    dir: PathBuf,
    seq: usize,
}

impl CheckpointWriter {
    /// Start numbering at `vars0.dat` in `dir`.
    pub fn new(dir: &Path) -> Self {
        CheckpointWriter {
            dir: dir.to_path_buf(),
            seq: 0,
        }
    }

    /// Write the next `vars<seq>.dat` and advance the counter.
    pub fn write(&mut self, sim: &Simulator) -> Result<PathBuf, SimError> {
        let path = checkpoint_path(&self.dir, self.seq);
        save_checkpoint(sim, &path)?;
        self.seq += 1;
        Ok(path)
    }
}

/// Append-only kinetic-energy streams of one run.
///
/// Index 0 is `KineticEnergy.dat` (the total); stream `n >= 1` is
/// `KineticEnergyMode<n>.dat`. Files are opened once and flushed after
/// every sample.
#[derive(Debug)]
pub struct EnergyStreams {
    files: Vec<(BufWriter<File>, PathBuf)>,
}

impl EnergyStreams {
    /// Open (or extend) the streams for `nn` modes in `dir`.
    pub fn create(dir: &Path, nn: usize) -> Result<Self, SimError> {
        let mut files = Vec::with_capacity(nn);
        let mut open = |path: PathBuf| -> Result<(BufWriter<File>, PathBuf), SimError> {
            let file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(&path)
                .map_err(|e| SimError::io(&path, e))?;
            Ok((BufWriter::new(file), path))
        };
        files.push(open(dir.join("KineticEnergy.dat"))?);
        for n in 1..nn {
            files.push(open(dir.join(format!("KineticEnergyMode{}.dat", n)))?);
        }
        Ok(EnergyStreams { files })
    }

    /// Append one sample: the total and the per-mode energies for
    /// `n ∈ [1, nn)`. `per_mode[0]` (the mean mode) feeds the total only.
    pub fn append(&mut self, total: f64, per_mode: &[f64]) -> Result<(), SimError> {
        let mut put = |idx: usize, value: f64| -> Result<(), SimError> {
            let (w, path) = &mut self.files[idx];
            w.write_all(&value.to_ne_bytes())
                .map_err(|e| SimError::io(path.clone(), e))?;
            w.flush().map_err(|e| SimError::io(path.clone(), e))
        };
        put(0, total)?;
        for (n, &ke) in per_mode.iter().enumerate().skip(1) {
            put(n, ke)?;
        }
        Ok(())
    }
}
