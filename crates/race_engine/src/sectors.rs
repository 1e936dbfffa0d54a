//! Lap and sector timing.

use contracts::{
    DeltaReference, LapAnalysisResult, LapDefinition, LapSectorDeltas, LapTiming, Sample,
};
use tracing::instrument;

use crate::resample::{ArcLengthCurve, Cursor, SampleCurve};

/// Time each lap and its equal arc-length sectors.
///
/// Returns `None` when there is nothing to analyze: no laps, fewer than
/// two samples, or a sector count of zero.
#[instrument(
    level = "debug",
    name = "analyze_laps",
    skip_all,
    fields(laps = lap_defs.len(), sector_count)
)]
pub fn analyze_laps(
    samples: &[Sample],
    lap_defs: &[LapDefinition],
    sector_count: usize,
) -> Option<LapAnalysisResult> {
    if sector_count == 0 || samples.len() < 2 || lap_defs.is_empty() {
        return None;
    }

    let laps: Vec<LapTiming> = lap_defs
        .iter()
        .filter(|def| def.end_index < samples.len())
        .map(|def| time_lap(samples, def, sector_count))
        .collect();
    if laps.is_empty() {
        return None;
    }

    let (best_lap_index, best_lap_time_ms) = laps
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, lap)| {
            if lap.lap_time_ms < best.1 {
                (i, lap.lap_time_ms)
            } else {
                best
            }
        });

    let best_sector_times_ms = (0..sector_count)
        .map(|s| {
            laps.iter()
                .map(|lap| lap.sector_times_ms[s])
                .fold(f64::INFINITY, f64::min)
        })
        .collect();

    Some(LapAnalysisResult {
        sector_count,
        laps,
        best_lap_index,
        best_lap_time_ms,
        best_sector_times_ms,
    })
}

fn time_lap(samples: &[Sample], def: &LapDefinition, sector_count: usize) -> LapTiming {
    let lap = &samples[def.start_index..=def.end_index];
    let curve = SampleCurve::new(lap, |s| s.timestamp_ms);
    let length = curve.length();
    let mut cursor = Cursor::new(&curve);

    let first_ts = lap[0].timestamp_ms;
    let boundaries: Vec<f64> = (0..=sector_count)
        .map(|s| {
            let target = length * s as f64 / sector_count as f64;
            cursor.value_at(target).unwrap_or(first_ts)
        })
        .collect();

    let sector_times_ms = boundaries
        .windows(2)
        .map(|w| (w[1] - w[0]).max(0.0))
        .collect();

    LapTiming {
        start_index: def.start_index,
        end_index: def.end_index,
        lap_time_ms: boundaries[sector_count] - boundaries[0],
        sector_times_ms,
    }
}

/// Per-lap sector deltas against the chosen reference, plus lap deltas
/// against the best lap.
pub fn sector_deltas(analysis: &LapAnalysisResult, reference: DeltaReference) -> Vec<LapSectorDeltas> {
    let reference_sectors: &[f64] = match (reference, analysis.best_lap()) {
        (DeltaReference::BestLap, Some(best)) => &best.sector_times_ms,
        _ => &analysis.best_sector_times_ms,
    };

    analysis
        .laps
        .iter()
        .enumerate()
        .map(|(lap_index, lap)| LapSectorDeltas {
            lap_index,
            sector_deltas_ms: lap
                .sector_times_ms
                .iter()
                .zip(reference_sectors)
                .map(|(t, r)| t - r)
                .collect(),
            lap_delta_ms: lap.lap_time_ms - analysis.best_lap_time_ms,
        })
        .collect()
}
