//! Throttle / brake / steer intensity model.
//!
//! Driver inputs are not in the telemetry; they are inferred from the
//! accelerations and normalized per car.

use contracts::{InputModel, InputModelConfig, InputPoint, InputScales, LapDefinition, Sample};
use tracing::instrument;

use crate::resample::{resample, SampleCurve};

const G: f64 = 9.81;

/// Normalization scales from the car's extreme accelerations.
///
/// Readings at or beyond `accel_outlier_limit` are ignored.
pub fn input_scales(samples: &[Sample], config: &InputModelConfig) -> InputScales {
    let limit = config.accel_outlier_limit;
    let (mut max_pos, mut max_neg, mut max_lat) = (0.0_f64, 0.0_f64, 0.0_f64);
    for s in samples {
        let ax = s.smoothed_accel_long;
        if ax > 0.0 && ax < limit {
            max_pos = max_pos.max(ax);
        }
        if ax < 0.0 && ax > -limit {
            max_neg = max_neg.min(ax);
        }
        if s.accel_lat.abs() < limit {
            max_lat = max_lat.max(s.accel_lat.abs());
        }
    }

    InputScales {
        throttle: config.throttle_floor.max(max_pos * config.scale_fraction),
        brake: config.brake_floor.max(-max_neg * config.scale_fraction),
        steer: config.steer_floor.max(max_lat * config.scale_fraction),
    }
}

/// Build per-lap input intensity curves.
#[instrument(
    level = "debug",
    name = "build_input_model",
    skip_all,
    fields(laps = lap_defs.len())
)]
pub fn build_input_model(
    samples: &[Sample],
    lap_defs: &[LapDefinition],
    count: usize,
    config: &InputModelConfig,
) -> Option<InputModel> {
    if samples.len() < 2 || lap_defs.is_empty() || count == 0 {
        return None;
    }
    if lap_defs.iter().any(|def| def.end_index >= samples.len()) {
        return None;
    }

    let scales = input_scales(samples, config);
    let per_lap_inputs = lap_defs
        .iter()
        .map(|def| {
            let lap = &samples[def.start_index..=def.end_index];
            let curve = SampleCurve::new(lap, |s| [s.smoothed_accel_long, s.accel_lat, s.speed]);
            lap_inputs(&resample(&curve, count), &scales, config)
        })
        .collect();

    Some(InputModel {
        lap_defs: lap_defs.to_vec(),
        scales,
        per_lap_inputs,
    })
}

/// Classify and filter one lap of resampled `[ax, ay, speed]` triples.
fn lap_inputs(
    points: &[[f64; 3]],
    scales: &InputScales,
    config: &InputModelConfig,
) -> Vec<InputPoint> {
    let keep = config.smoothing;
    let mut prev = InputPoint::default();
    points
        .iter()
        .map(|&[ax, ay, speed]| {
            let unstable = (ax / G).abs() > config.max_long_g
                || (ay / G).abs() > config.max_lat_g
                || speed < config.min_speed_mps;

            let next = if unstable {
                InputPoint {
                    throttle: prev.throttle * config.unstable_decay,
                    brake: prev.brake * config.unstable_decay,
                    steer: prev.steer * config.unstable_decay,
                }
            } else {
                let throttle = (ax.max(0.0) / scales.throttle).clamp(0.0, 1.0);
                let brake = ((-ax).max(0.0) / scales.brake).clamp(0.0, 1.0);
                let steer = (ay.abs() / scales.steer).clamp(0.0, 1.0);
                InputPoint {
                    throttle: prev.throttle * keep + throttle * (1.0 - keep),
                    brake: prev.brake * keep + brake * (1.0 - keep),
                    steer: prev.steer * keep + steer * (1.0 - keep),
                }
            };
            prev = next;
            next
        })
        .collect()
}
