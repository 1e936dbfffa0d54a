//! Session summary consumed by observability and reports

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{CarId, EventKind, RaceType};

/// Per-car digest of one recompute pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarSummary {
    pub id: CarId,
    pub sample_count: usize,
    pub duration_ms: f64,
    pub distance: f64,
    pub lap_count: usize,
    pub lap_length: f64,
    /// 1-based lap number of the best lap
    pub best_lap_number: Option<usize>,
    pub best_lap_time_ms: Option<f64>,
    pub event_counts: BTreeMap<EventKind, usize>,
}

impl CarSummary {
    pub fn event_count(&self, kind: EventKind) -> usize {
        self.event_counts.get(&kind).copied().unwrap_or(0)
    }
}

/// Whole-session digest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub race_type: RaceType,
    pub cars: Vec<CarSummary>,
    pub master_points: usize,
    pub master_length: f64,
    pub master_mean_confidence: Option<f64>,
    pub timestamp_glitches: usize,
}

impl SessionSummary {
    pub fn total_laps(&self) -> usize {
        self.cars.iter().map(|c| c.lap_count).sum()
    }

    pub fn total_events(&self, kind: EventKind) -> usize {
        self.cars.iter().map(|c| c.event_count(kind)).sum()
    }
}
