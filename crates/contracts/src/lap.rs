//! Lap segmentation and timing results

use serde::{Deserialize, Serialize};

/// Inclusive sample index range of one lap.
///
/// `end_index > start_index`; degenerate ranges are dropped before they
/// reach this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapDefinition {
    pub start_index: usize,
    pub end_index: usize,
}

impl LapDefinition {
    /// Number of samples covered by the lap
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index <= self.end_index
    }
}

/// Timing of a single lap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapTiming {
    pub start_index: usize,
    pub end_index: usize,
    pub lap_time_ms: f64,
    /// One entry per sector, each >= 0
    pub sector_times_ms: Vec<f64>,
}

/// Lap/sector analysis of one car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapAnalysisResult {
    pub sector_count: usize,
    pub laps: Vec<LapTiming>,
    /// Index into `laps` of the lowest lap time
    pub best_lap_index: usize,
    pub best_lap_time_ms: f64,
    /// Per-sector minimum across all laps (not necessarily one lap's sectors)
    pub best_sector_times_ms: Vec<f64>,
}

impl LapAnalysisResult {
    pub fn best_lap(&self) -> Option<&LapTiming> {
        self.laps.get(self.best_lap_index)
    }

    /// Sum of per-sector bests, the "theoretical" lap
    pub fn ideal_lap_time_ms(&self) -> f64 {
        self.best_sector_times_ms.iter().sum()
    }
}

/// Sector and lap deltas of one lap against a reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapSectorDeltas {
    pub lap_index: usize,
    pub sector_deltas_ms: Vec<f64>,
    /// Lap time minus best lap time
    pub lap_delta_ms: f64,
}

/// Reference used when comparing sector times
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaReference {
    /// Compare each sector to the best time ever set in that sector
    #[default]
    BestSector,
    /// Compare each sector to the same sector of the best lap
    BestLap,
}
