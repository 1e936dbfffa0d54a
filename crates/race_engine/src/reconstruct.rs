//! Dead-reckoning position reconstruction.

use contracts::{RawSample, ReconstructionConfig, Sample};
use tracing::{debug, instrument};

/// Reconstructed trajectory of one car
#[derive(Debug, Clone, Default)]
pub struct Reconstruction {
    pub samples: Vec<Sample>,
    /// Steps whose timestamp delta was replaced by the minimum step
    pub timestamp_glitches: usize,
}

/// Integrate a raw sample sequence into a 2D trajectory.
///
/// The first sample is the origin. Heading is integrated before position,
/// and `dist` accumulates the length of every step.
#[instrument(
    level = "debug",
    name = "reconstruct",
    skip_all,
    fields(samples = raw.len())
)]
pub fn reconstruct(raw: &[RawSample], config: &ReconstructionConfig) -> Reconstruction {
    let mut samples: Vec<Sample> = raw.iter().map(Sample::from_raw).collect();
    let Some(first) = samples.first_mut() else {
        return Reconstruction::default();
    };

    let mut smoothed = first.accel_long;
    first.smoothed_accel_long = smoothed;

    let keep = config.accel_smoothing;
    let mut heading = 0.0_f64;
    let mut glitches = 0;

    for i in 1..samples.len() {
        let prev = samples[i - 1];
        let cur = &mut samples[i];

        let mut dt = (cur.timestamp_ms - prev.timestamp_ms) / 1000.0;
        if !dt.is_finite() || dt <= 0.0 || dt > config.max_dt_s {
            dt = config.min_dt_s;
            glitches += 1;
        }

        smoothed = smoothed * keep + cur.accel_long * (1.0 - keep);
        cur.smoothed_accel_long = smoothed;

        let speed = cur.speed.max(config.min_speed_mps);
        let yaw_rate = if cur.speed > config.yaw_min_speed_mps {
            smoothed / speed
        } else {
            0.0
        };
        heading += yaw_rate * dt;

        let dx = heading.cos() * speed * dt;
        let dy = heading.sin() * speed * dt;
        cur.pos_x = prev.pos_x + dx;
        cur.pos_y = prev.pos_y + dy;
        cur.dist = prev.dist + dx.hypot(dy);
    }

    if glitches > 0 {
        debug!(glitches, "timestamp steps replaced by minimum step");
    }

    Reconstruction {
        samples,
        timestamp_glitches: glitches,
    }
}
