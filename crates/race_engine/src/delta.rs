//! Time-delta-to-reference model.

use contracts::{DeltaModel, LapAnalysisResult, LapDefinition, Sample};
use tracing::instrument;

use crate::resample::{resample, SampleCurve};

/// Lap times relative to lap start at `count` evenly spaced fractions.
pub(crate) fn lap_time_curve(samples: &[Sample], def: &LapDefinition, count: usize) -> Vec<f64> {
    let lap = &samples[def.start_index..=def.end_index];
    let start_ts = lap[0].timestamp_ms;
    resample(&SampleCurve::new(lap, |s| s.timestamp_ms - start_ts), count)
}

/// Build per-lap delta curves against the best lap (lap 0 when no
/// analysis is available).
#[instrument(
    level = "debug",
    name = "build_delta_model",
    skip_all,
    fields(laps = lap_defs.len())
)]
pub fn build_delta_model(
    samples: &[Sample],
    lap_defs: &[LapDefinition],
    analysis: Option<&LapAnalysisResult>,
    count: usize,
) -> Option<DeltaModel> {
    if samples.len() < 2 || lap_defs.is_empty() || count == 0 {
        return None;
    }
    if lap_defs.iter().any(|def| def.end_index >= samples.len()) {
        return None;
    }

    let times: Vec<Vec<f64>> = lap_defs
        .iter()
        .map(|def| lap_time_curve(samples, def, count))
        .collect();

    let reference_lap_index = analysis
        .map(|a| a.best_lap_index)
        .filter(|&i| i < times.len())
        .unwrap_or(0);
    let reference = &times[reference_lap_index];

    let per_lap_deltas = times
        .iter()
        .map(|lap| {
            lap.iter()
                .zip(reference)
                .map(|(t, r)| {
                    let d = t - r;
                    if d.is_finite() {
                        d
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect();

    Some(DeltaModel {
        lap_defs: lap_defs.to_vec(),
        reference_lap_index,
        per_lap_deltas,
    })
}
