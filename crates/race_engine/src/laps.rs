//! Lap boundary detection, lap segmentation and race type inference.

use contracts::{LapDefinition, LapDetectionConfig, MasterTrack, RaceType, Sample};
use tracing::instrument;

/// Output of lap boundary detection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LapDetection {
    /// Always starts with 0 for a non-empty car
    pub lap_starts: Vec<usize>,
    pub lap_length: f64,
}

/// Find the sample indices where the car passes its own start point.
///
/// A crossing needs the car within `start_radius` of the first position,
/// above `min_speed_mps`, and more than `min_gap_samples` after the
/// previous start.
#[instrument(
    level = "debug",
    name = "detect_laps",
    skip_all,
    fields(samples = samples.len())
)]
pub fn detect_laps(samples: &[Sample], config: &LapDetectionConfig) -> LapDetection {
    let Some(start) = samples.first() else {
        return LapDetection::default();
    };

    let mut lap_starts = vec![0];
    let mut last = 0;
    for (i, s) in samples.iter().enumerate().skip(1) {
        let to_start = (s.pos_x - start.pos_x).hypot(s.pos_y - start.pos_y);
        if to_start < config.start_radius
            && s.speed > config.min_speed_mps
            && i - last > config.min_gap_samples
        {
            lap_starts.push(i);
            last = i;
        }
    }

    let lap_length = match lap_starts.get(1) {
        Some(&next) => samples[next].dist - samples[0].dist,
        None => samples[samples.len() - 1].dist - samples[0].dist,
    };

    LapDetection {
        lap_starts,
        lap_length,
    }
}

/// Split a car's samples into laps.
///
/// Lapped races with at least two starts get one lap per start, each
/// ending one sample before the next start, plus a trailing partial lap
/// when it has at least `min_trailing_samples` samples. Anything else is
/// a single lap over the whole trajectory. Degenerate spans are dropped.
pub fn lap_definitions(
    sample_count: usize,
    lap_starts: &[usize],
    race_type: RaceType,
    min_trailing_samples: usize,
) -> Vec<LapDefinition> {
    if sample_count < 2 {
        return Vec::new();
    }

    let mut defs = Vec::new();
    if race_type.is_lapped() && lap_starts.len() >= 2 {
        for pair in lap_starts.windows(2) {
            let (start_index, end_index) = (pair[0], pair[1].saturating_sub(1));
            if end_index > start_index {
                defs.push(LapDefinition {
                    start_index,
                    end_index,
                });
            }
        }

        if let Some(&last_start) = lap_starts.last() {
            let end_index = sample_count - 1;
            if sample_count - last_start >= min_trailing_samples && end_index > last_start {
                defs.push(LapDefinition {
                    start_index: last_start,
                    end_index,
                });
            }
        }
    }

    if defs.is_empty() {
        defs.push(LapDefinition {
            start_index: 0,
            end_index: sample_count - 1,
        });
    }
    defs
}

/// Index range used for fusion: first lap of a lapped race, whole
/// trajectory otherwise.
pub fn fusion_segment<'a>(
    samples: &'a [Sample],
    lap_starts: &[usize],
    race_type: RaceType,
) -> &'a [Sample] {
    if samples.is_empty() {
        return samples;
    }
    let last = samples.len() - 1;
    if !race_type.is_lapped() {
        return samples;
    }
    let start = lap_starts.first().copied().unwrap_or(0).min(last);
    let end = lap_starts.get(1).copied().unwrap_or(last).min(last);
    &samples[start..=end.max(start)]
}

/// 1-based lap number containing `sample_index`
pub fn lap_number(lap_starts: &[usize], sample_index: usize) -> usize {
    lap_starts
        .partition_point(|&start| start <= sample_index)
        .max(1)
}

/// Race type from the first car: lapped when it has several laps or ends
/// near where it started.
pub fn infer_race_type(
    samples: &[Sample],
    lap_starts: &[usize],
    config: &LapDetectionConfig,
) -> RaceType {
    if lap_starts.len() > 1 {
        return RaceType::Lapped;
    }
    match (samples.first(), samples.last()) {
        (Some(first), Some(last))
            if (last.pos_x - first.pos_x).hypot(last.pos_y - first.pos_y)
                < config.loop_detect_gap =>
        {
            RaceType::Lapped
        }
        (Some(_), Some(_)) => RaceType::Sprint,
        _ => RaceType::default(),
    }
}

/// Race type of an externally supplied master track
pub fn race_type_from_track(track: &MasterTrack, config: &LapDetectionConfig) -> RaceType {
    match track.endpoint_gap() {
        Some(gap) if gap < config.loop_detect_gap => RaceType::Lapped,
        Some(_) => RaceType::Sprint,
        None => RaceType::default(),
    }
}
