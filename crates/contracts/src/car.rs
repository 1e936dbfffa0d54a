//! Car record: owned samples plus derived caches

use serde::{Deserialize, Serialize};

use crate::{CarId, DeltaModel, InputModel, LapAnalysisResult, RaceEvent, Sample};

/// One car in the session arena.
///
/// Derived fields are replaced wholesale on every recompute pass, never
/// patched in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarRecord {
    pub id: CarId,
    pub samples: Vec<Sample>,

    /// Sample indices where laps begin; `lap_starts[0] == 0`, strictly increasing
    pub lap_starts: Vec<usize>,

    /// Distance of the first completed lap (whole trajectory if only one)
    pub lap_length: f64,

    /// Playback cursor, owned by the playback collaborator
    pub data_index: usize,

    pub lap_analysis: Option<LapAnalysisResult>,
    pub delta_model: Option<DeltaModel>,
    pub input_model: Option<InputModel>,
    pub events: Vec<RaceEvent>,
}

impl CarRecord {
    pub fn new(id: CarId, samples: Vec<Sample>) -> Self {
        Self {
            id,
            samples,
            ..Default::default()
        }
    }

    /// Cars with fewer than two samples carry no trajectory
    #[inline]
    pub fn has_trajectory(&self) -> bool {
        self.samples.len() >= 2
    }

    pub fn first_timestamp_ms(&self) -> Option<f64> {
        self.samples.first().map(|s| s.timestamp_ms)
    }

    /// Elapsed time between first and last sample
    pub fn duration_ms(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => (last.timestamp_ms - first.timestamp_ms).max(0.0),
            _ => 0.0,
        }
    }

    /// Total reconstructed distance
    pub fn total_distance(&self) -> f64 {
        self.samples.last().map(|s| s.dist).unwrap_or(0.0)
    }

    /// Drop every derived cache
    pub fn clear_derived(&mut self) {
        self.lap_starts.clear();
        self.lap_length = 0.0;
        self.lap_analysis = None;
        self.delta_model = None;
        self.input_model = None;
        self.events.clear();
    }
}
