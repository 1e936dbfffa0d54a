//! Master track fusion.
//!
//! Every car's segment is resampled at the same N fractions of its own
//! length; the candidates at each fraction are gated around their median
//! and the supported ones averaged.

use contracts::{
    FusionConfig, HeatWindow, MasterTrack, MasterTrackPoint, RaceType, Sample, TrackOrigin,
};
use tracing::{debug, instrument, warn};

use crate::resample::{fraction, value_at, ArcLengthCurve, SampleCurve};

/// Fuse per-car segments into a fixed-length master track.
///
/// `reference` indexes the segment whose speed is projected as heat.
/// No segments yields an empty track.
#[instrument(
    level = "debug",
    name = "fuse_master_track",
    skip_all,
    fields(cars = segments.len(), race_type = %race_type)
)]
pub fn fuse_master_track(
    segments: &[&[Sample]],
    reference: usize,
    race_type: RaceType,
    config: &FusionConfig,
) -> MasterTrack {
    let curves: Vec<_> = segments
        .iter()
        .filter(|seg| !seg.is_empty())
        .map(|seg| SampleCurve::new(seg, |s| [s.pos_x, s.pos_y]))
        .collect();
    if curves.is_empty() || config.resample_count == 0 {
        warn!("no trajectories to fuse, master track left empty");
        return MasterTrack::default();
    }

    let count = config.resample_count;
    let mut points = Vec::with_capacity(count);
    let mut candidates = Vec::with_capacity(curves.len());
    for i in 0..count {
        let f = fraction(i, count);
        candidates.clear();
        candidates.extend(
            curves
                .iter()
                .filter_map(|curve| value_at(curve, f * curve.length())),
        );
        points.push(fuse_candidates(&candidates, config));
    }

    let mut track = MasterTrack::from_points(points, TrackOrigin::Fused);
    if race_type.is_lapped() && close_loop(&mut track.points, config) {
        track.recompute_geometry();
    }

    let reference = segments.get(reference).copied().unwrap_or(segments[0]);
    project_heat(&mut track, reference, config);
    track
}

/// Gate the candidates of one fraction around their median.
fn fuse_candidates(candidates: &[[f64; 2]], config: &FusionConfig) -> MasterTrackPoint {
    let total = candidates.len();
    if total == 1 {
        return MasterTrackPoint::new(candidates[0][0], candidates[0][1]);
    }

    let median_x = median(candidates.iter().map(|c| c[0]).collect());
    let median_y = median(candidates.iter().map(|c| c[1]).collect());
    let dists: Vec<f64> = candidates
        .iter()
        .map(|c| (c[0] - median_x).hypot(c[1] - median_y))
        .collect();
    let median_dist = median(dists.clone());
    let mad = median(dists.iter().map(|d| (d - median_dist).abs()).collect());

    let gate = if mad > 0.0 {
        median_dist + config.mad_k * config.mad_scale * mad
    } else {
        config.abs_gate
    };
    let gate = gate.min(config.abs_gate * 2.0);

    let supported: Vec<[f64; 2]> = candidates
        .iter()
        .zip(&dists)
        .filter(|(_, d)| **d <= gate)
        .map(|(c, _)| *c)
        .collect();
    let support_count = supported.len();
    let [x, y] = if supported.is_empty() {
        mean(candidates)
    } else {
        mean(&supported)
    };

    MasterTrackPoint {
        x,
        y,
        dist: 0.0,
        confidence: support_count as f64 / total as f64,
        support_count,
        support_total: total,
        heat_speed: None,
    }
}

fn mean(points: &[[f64; 2]]) -> [f64; 2] {
    let n = points.len().max(1) as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
    [sx / n, sy / n]
}

/// Median of a non-empty set, mean of the middle pair for even sizes.
fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Blend the last part of the polyline toward its first point.
///
/// Returns true when points moved.
pub fn close_loop(points: &mut [MasterTrackPoint], config: &FusionConfig) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    let gap_x = points[0].x - points[n - 1].x;
    let gap_y = points[0].y - points[n - 1].y;
    if gap_x.hypot(gap_y) < config.loop_min_gap {
        return false;
    }

    let last = n - 1;
    let start = ((n as f64 * config.loop_close_fraction).floor() as usize).min(last - 1);
    let span = (last - start) as f64;
    for (i, p) in points.iter_mut().enumerate().skip(start) {
        let t = (i - start) as f64 / span;
        p.x += gap_x * t;
        p.y += gap_y * t;
    }
    debug!(gap = gap_x.hypot(gap_y), start, "loop closed");
    true
}

/// Project the reference car's speed onto the master track and derive the
/// heat window.
pub(crate) fn project_heat(track: &mut MasterTrack, reference: &[Sample], config: &FusionConfig) {
    let curve = SampleCurve::new(reference, |s| s.speed);
    if curve.is_empty() {
        return;
    }
    let total = track.total_length();
    let count = track.points.len();
    let ref_length = curve.length();
    for (i, p) in track.points.iter_mut().enumerate() {
        let f = if total > 0.0 {
            p.dist / total
        } else {
            fraction(i, count)
        };
        p.heat_speed = value_at(&curve, f * ref_length);
    }
    track.heat = heat_window(
        track.points.iter().filter_map(|p| p.heat_speed),
        config.heat_low_percentile,
        config.heat_high_percentile,
    );
}

/// Percentile-clipped normalization window.
///
/// Percentile `p` is the sorted value at `floor(p * (n - 1))`.
pub fn heat_window(speeds: impl Iterator<Item = f64>, low: f64, high: f64) -> HeatWindow {
    let mut sorted: Vec<f64> = speeds.filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return HeatWindow::default();
    }
    sorted.sort_by(f64::total_cmp);
    let at = |p: f64| {
        let idx = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).floor() as usize;
        sorted[idx]
    };
    let min = at(low);
    let range = at(high) - min;
    HeatWindow {
        min,
        range: if range > 0.0 { range } else { 1.0 },
    }
}
