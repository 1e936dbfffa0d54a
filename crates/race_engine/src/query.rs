//! Pure lookups for the playback and rendering side.

use contracts::{CarId, CarRecord, LapDefinition, MasterTrack, RaceEvent};

pub use crate::laps::lap_number as lap_for_sample;

/// Last sample at or before `first_ts + elapsed_ms`, clamped to the
/// sequence. `None` for a car without samples.
pub fn sample_index_at(car: &CarRecord, elapsed_ms: f64) -> Option<usize> {
    let first = car.first_timestamp_ms()?;
    let target = first + elapsed_ms;
    let after = car.samples.partition_point(|s| s.timestamp_ms <= target);
    Some(after.saturating_sub(1))
}

/// 0-based index of the lap definition containing `sample_index`.
///
/// Indices past the last lap map to the last lap.
pub fn lap_def_for_sample(lap_defs: &[LapDefinition], sample_index: usize) -> Option<usize> {
    if lap_defs.is_empty() {
        return None;
    }
    let pos = lap_defs
        .iter()
        .position(|def| def.contains(sample_index))
        .unwrap_or_else(|| {
            lap_defs
                .partition_point(|def| def.start_index <= sample_index)
                .saturating_sub(1)
        });
    Some(pos)
}

/// Master track index matching the car's progress through its current lap.
pub fn master_index_for_sample(
    car: &CarRecord,
    sample_index: usize,
    master: &MasterTrack,
) -> Option<usize> {
    if master.is_empty() || car.samples.is_empty() {
        return None;
    }
    let index = sample_index.min(car.samples.len() - 1);
    let lap = lap_for_sample(&car.lap_starts, index);
    let lap_start = car.lap_starts.get(lap - 1).copied().unwrap_or(0);
    let lap_start_dist = car.samples[lap_start].dist;
    let last = car.samples.len() - 1;
    let lap_end = car.lap_starts.get(lap).copied().unwrap_or(last).min(last);
    let lap_end_dist = car.samples[lap_end].dist;

    // Each lap is scaled by its own span
    let lap_length = (lap_end_dist - lap_start_dist).max(1e-6);
    let progress = ((car.samples[index].dist - lap_start_dist) / lap_length).clamp(0.0, 1.0);
    let target = progress * master.total_length();
    let after = master.points.partition_point(|p| p.dist < target);
    Some(after.min(master.len() - 1))
}

/// An event matched on the shared timeline
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEvent<'a> {
    pub car: &'a CarId,
    pub event: &'a RaceEvent,
    /// Event time relative to the car's first sample
    pub elapsed_ms: f64,
}

/// Event time on the shared timeline
fn event_time(car: &CarRecord, event: &RaceEvent) -> Option<f64> {
    let first = car.first_timestamp_ms()?;
    let sample = car.samples.get(event.sample_index)?;
    Some(sample.timestamp_ms - first)
}

/// Nearest event to `elapsed_ms` across all cars, if within `tolerance_ms`.
pub fn nearest_event<'a>(
    cars: &'a [CarRecord],
    elapsed_ms: f64,
    tolerance_ms: f64,
) -> Option<TimelineEvent<'a>> {
    cars.iter()
        .flat_map(|car| {
            car.events.iter().filter_map(move |event| {
                event_time(car, event).map(|t| TimelineEvent {
                    car: &car.id,
                    event,
                    elapsed_ms: t,
                })
            })
        })
        .filter(|hit| (hit.elapsed_ms - elapsed_ms).abs() <= tolerance_ms)
        .min_by(|x, y| {
            (x.elapsed_ms - elapsed_ms)
                .abs()
                .total_cmp(&(y.elapsed_ms - elapsed_ms).abs())
        })
}

/// Longest car duration, the extent of the shared timeline
pub fn max_duration_ms(cars: &[CarRecord]) -> f64 {
    cars.iter().map(CarRecord::duration_ms).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{EventKind, MasterTrackPoint, Sample, TrackOrigin};

    fn car(id: &str, first_ts: f64, count: usize) -> CarRecord {
        let samples = (0..count)
            .map(|i| Sample {
                timestamp_ms: first_ts + i as f64 * 100.0,
                dist: i as f64 * 2.0,
                ..Default::default()
            })
            .collect();
        CarRecord::new(id.into(), samples)
    }

    #[test]
    fn test_sample_index_at() {
        let c = car("a", 5_000.0, 10);
        assert_eq!(sample_index_at(&c, 0.0), Some(0));
        assert_eq!(sample_index_at(&c, 250.0), Some(2));
        assert_eq!(sample_index_at(&c, 300.0), Some(3));
        assert_eq!(sample_index_at(&c, -50.0), Some(0));
        assert_eq!(sample_index_at(&c, 1e9), Some(9));
        assert_eq!(sample_index_at(&CarRecord::default(), 10.0), None);
    }

    #[test]
    fn test_lap_def_for_sample() {
        let defs = [
            LapDefinition { start_index: 0, end_index: 99 },
            LapDefinition { start_index: 100, end_index: 199 },
        ];
        assert_eq!(lap_def_for_sample(&defs, 0), Some(0));
        assert_eq!(lap_def_for_sample(&defs, 150), Some(1));
        assert_eq!(lap_def_for_sample(&defs, 500), Some(1));
        assert_eq!(lap_def_for_sample(&[], 5), None);
    }

    #[test]
    fn test_master_index_tracks_lap_progress() {
        let mut c = car("a", 0.0, 201);
        c.lap_starts = vec![0, 100];
        c.lap_length = 200.0;
        let points = (0..101).map(|i| MasterTrackPoint::new(i as f64, 0.0)).collect();
        let master = MasterTrack::from_points(points, TrackOrigin::Fused);

        assert_eq!(master_index_for_sample(&c, 0, &master), Some(0));
        assert_eq!(master_index_for_sample(&c, 50, &master), Some(50));
        assert_eq!(master_index_for_sample(&c, 150, &master), Some(50), "second lap restarts");
        assert_eq!(master_index_for_sample(&c, 50, &MasterTrack::default()), None);
    }

    #[test]
    fn test_master_index_scales_each_lap_by_its_own_length() {
        let mut c = car("a", 0.0, 300);
        c.lap_starts = vec![0, 100];
        c.lap_length = 200.0;
        let points = (0..101).map(|i| MasterTrackPoint::new(i as f64, 0.0)).collect();
        let master = MasterTrack::from_points(points, TrackOrigin::Fused);

        // Lap 2 runs from dist 200 to 598, twice as long as lap 1
        assert_eq!(master_index_for_sample(&c, 199, &master), Some(50));
        assert_eq!(master_index_for_sample(&c, 299, &master), Some(100));
        assert_eq!(master_index_for_sample(&c, 100, &master), Some(0));
    }

    #[test]
    fn test_nearest_event_and_duration() {
        let mut a = car("a", 1_000.0, 50);
        a.events.push(RaceEvent::new(EventKind::Crash, 20, 1, "crash"));
        let mut b = car("b", 9_000.0, 80);
        b.events.push(RaceEvent::new(EventKind::Collision, 23, 1, "collision"));
        let cars = vec![a, b];

        let hit = nearest_event(&cars, 2_280.0, 200.0).unwrap();
        assert_eq!(hit.car.as_str(), "b");
        assert_eq!(hit.elapsed_ms, 2_300.0);
        assert!(nearest_event(&cars, 10_000.0, 200.0).is_none());
        assert_eq!(max_duration_ms(&cars), 7_900.0);
    }
}
