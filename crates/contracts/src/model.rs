//! Per-lap resampled models: time delta and driver input intensity

use serde::{Deserialize, Serialize};

use crate::LapDefinition;

/// Time-delta-to-reference curves, one fixed-length array per lap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaModel {
    pub lap_defs: Vec<LapDefinition>,
    /// Lap used as reference; its own curve is all zeros
    pub reference_lap_index: usize,
    /// Per lap, `delta_ms[i]` at fraction `i / (N - 1)`
    pub per_lap_deltas: Vec<Vec<f64>>,
}

impl DeltaModel {
    /// Delta curve of one lap
    pub fn lap(&self, lap_index: usize) -> Option<&[f64]> {
        self.per_lap_deltas.get(lap_index).map(Vec::as_slice)
    }
}

/// Normalized driver input intensities, each in `[0, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputPoint {
    pub throttle: f64,
    pub brake: f64,
    pub steer: f64,
}

/// Per-car normalization scales (m/s²)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputScales {
    pub throttle: f64,
    pub brake: f64,
    pub steer: f64,
}

/// Throttle/brake/steer curves, one fixed-length array per lap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputModel {
    pub lap_defs: Vec<LapDefinition>,
    pub scales: InputScales,
    pub per_lap_inputs: Vec<Vec<InputPoint>>,
}

impl InputModel {
    pub fn lap(&self, lap_index: usize) -> Option<&[InputPoint]> {
        self.per_lap_inputs.get(lap_index).map(Vec::as_slice)
    }
}
