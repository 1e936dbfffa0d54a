//! Event detection.
//!
//! Stateless: every call rebuilds the full event list of every car.

use contracts::{
    CarId, EventConfig, EventKind, LapAnalysisResult, OvertakeRole, RaceEvent, Sample,
    MPH_PER_MPS,
};
use tracing::instrument;

use crate::format::format_lap_time;
use crate::laps::lap_number;

/// Read-only view of one car for event detection
#[derive(Debug, Clone, Copy)]
pub struct EventSource<'a> {
    pub id: &'a CarId,
    pub samples: &'a [Sample],
    pub lap_starts: &'a [usize],
    pub analysis: Option<&'a LapAnalysisResult>,
}

/// Detect events for all cars; the result is parallel to `cars`.
///
/// Cars with fewer than two samples get no events.
#[instrument(
    level = "debug",
    name = "detect_events",
    skip_all,
    fields(cars = cars.len())
)]
pub fn detect_events(cars: &[EventSource<'_>], config: &EventConfig) -> Vec<Vec<RaceEvent>> {
    let mut events: Vec<Vec<RaceEvent>> = cars
        .iter()
        .map(|car| {
            if car.samples.len() < 2 {
                return Vec::new();
            }
            let mut out = lap_events(car);
            out.extend(impact_events(car, config));
            out
        })
        .collect();

    for a in 0..cars.len() {
        for b in (a + 1)..cars.len() {
            if cars[a].samples.len() < 2 || cars[b].samples.len() < 2 {
                continue;
            }
            let (for_a, for_b) = overtake_events(&cars[a], &cars[b], config);
            events[a].extend(for_a);
            events[b].extend(for_b);
        }
    }

    for list in &mut events {
        list.sort_by_key(|e| e.sample_index);
    }
    events
}

/// Lap start and fastest lap markers
fn lap_events(car: &EventSource<'_>) -> Vec<RaceEvent> {
    let mut out: Vec<RaceEvent> = car
        .lap_starts
        .iter()
        .enumerate()
        .map(|(n, &index)| {
            RaceEvent::new(EventKind::LapStart, index, n + 1, format!("Lap {} start", n + 1))
        })
        .collect();

    if let Some(best) = car.analysis.and_then(|a| a.best_lap()) {
        let lap = car.analysis.map(|a| a.best_lap_index + 1).unwrap_or(1);
        out.push(RaceEvent::new(
            EventKind::FastestLap,
            best.start_index,
            lap,
            format!("Fastest lap: Lap {} ({})", lap, format_lap_time(best.lap_time_ms)),
        ));
    }
    out
}

/// Crash and collision scan over consecutive samples.
fn impact_events(car: &EventSource<'_>, config: &EventConfig) -> Vec<RaceEvent> {
    let mut out = Vec::new();
    let mut last_crash: Option<usize> = None;
    let mut last_collision: Option<usize> = None;
    let outside_window = |last: Option<usize>, i: usize| {
        last.map_or(true, |last| i - last > config.min_gap_samples)
    };

    for (i, pair) in car.samples.windows(2).enumerate() {
        let i = i + 1;
        let drop = pair[0].speed - pair[1].speed;
        let accel = pair[1].accel_magnitude();

        let kind = if drop > config.crash_speed_drop
            && accel > config.crash_accel
            && outside_window(last_crash, i)
        {
            last_crash = Some(i);
            EventKind::Crash
        } else if drop > config.collision_speed_drop_min
            && drop <= config.collision_speed_drop_max
            && accel > config.collision_accel
            && outside_window(last_collision, i)
        {
            last_collision = Some(i);
            EventKind::Collision
        } else {
            continue;
        };

        let lap = lap_number(car.lap_starts, i);
        let name = if kind == EventKind::Crash {
            "Crash"
        } else {
            "Collision"
        };
        let mut event = RaceEvent::new(
            kind,
            i,
            lap,
            format!("{} - Lap {}, Δv {:.1} mph", name, lap, drop * MPH_PER_MPS),
        );
        event.speed_drop = Some(drop);
        event.accel_magnitude = Some(accel);
        out.push(event);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leader {
    A,
    B,
}

fn leader_at(a: &[Sample], b: &[Sample], k: usize) -> Option<Leader> {
    let (da, db) = (a[k].dist, b[k].dist);
    if da > db {
        Some(Leader::A)
    } else if db > da {
        Some(Leader::B)
    } else {
        None
    }
}

/// Pairwise overtake scan over the shared index range.
///
/// An overtake is a change of the leading car; ties keep the previous
/// leader. Each side of the pair gets its own complementary event, both
/// numbered with the overtaking car's lap.
fn overtake_events(
    a: &EventSource<'_>,
    b: &EventSource<'_>,
    config: &EventConfig,
) -> (Vec<RaceEvent>, Vec<RaceEvent>) {
    let (mut for_a, mut for_b) = (Vec::new(), Vec::new());
    let shared = a.samples.len().min(b.samples.len());
    let mut leader = leader_at(a.samples, b.samples, 0);
    let mut last_pass: Option<usize> = None;

    for k in 1..shared {
        let Some(now) = leader_at(a.samples, b.samples, k) else {
            continue;
        };
        let passed = leader.is_some_and(|prev| prev != now);
        leader = Some(now);
        if !passed || last_pass.is_some_and(|last| k - last <= config.min_gap_samples) {
            continue;
        }
        last_pass = Some(k);

        let (winner, loser, winner_out, loser_out) = match now {
            Leader::A => (a, b, &mut for_a, &mut for_b),
            Leader::B => (b, a, &mut for_b, &mut for_a),
        };
        let lap = lap_number(winner.lap_starts, k);

        let mut pass = RaceEvent::new(
            EventKind::Overtake,
            k,
            lap,
            format!("Overtake {} → {} (Lap {})", winner.id, loser.id, lap),
        );
        pass.other_car = Some(loser.id.clone());
        pass.role = Some(OvertakeRole::Overtaking);
        winner_out.push(pass);

        let mut passed_by = RaceEvent::new(
            EventKind::Overtake,
            k,
            lap,
            format!("Got overtaken by {} (Lap {})", winner.id, lap),
        );
        passed_by.other_car = Some(winner.id.clone());
        passed_by.role = Some(OvertakeRole::Overtaken);
        loser_out.push(passed_by);
    }
    (for_a, for_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight(speeds: &[f64]) -> Vec<Sample> {
        let mut dist = 0.0;
        speeds
            .iter()
            .enumerate()
            .map(|(i, &speed)| {
                if i > 0 {
                    dist += speed * 0.05;
                }
                Sample {
                    timestamp_ms: i as f64 * 50.0,
                    speed,
                    dist,
                    pos_x: dist,
                    ..Default::default()
                }
            })
            .collect()
    }

    fn spiked(spikes: &[usize]) -> Vec<Sample> {
        let mut samples = straight(&vec![30.0; 200]);
        for &i in spikes {
            samples[i].speed = 15.0;
            samples[i].accel_long = -20.0;
        }
        samples
    }

    fn kinds(events: &[RaceEvent], kind: EventKind) -> Vec<&RaceEvent> {
        events.iter().filter(|e| e.kind == kind).collect()
    }

    fn single(samples: &[Sample], lap_starts: &[usize]) -> Vec<RaceEvent> {
        let id = CarId::from("solo");
        let car = EventSource {
            id: &id,
            samples,
            lap_starts,
            analysis: None,
        };
        detect_events(&[car], &EventConfig::default()).remove(0)
    }

    #[test]
    fn test_crash_debounce_within_window() {
        let events = single(&spiked(&[100, 105]), &[0]);
        let crashes = kinds(&events, EventKind::Crash);
        assert_eq!(crashes.len(), 1, "5 samples apart is one physical event");
        assert_eq!(crashes[0].sample_index, 100);
        assert_eq!(crashes[0].label, "Crash - Lap 1, Δv 33.6 mph");
        assert_eq!(crashes[0].speed_drop, Some(15.0));
    }

    #[test]
    fn test_crash_outside_window_fires_twice() {
        let events = single(&spiked(&[100, 140]), &[0]);
        assert_eq!(kinds(&events, EventKind::Crash).len(), 2);
    }

    #[test]
    fn test_collision_band() {
        let mut samples = straight(&vec![30.0; 100]);
        samples[50].speed = 25.0;
        samples[50].accel_lat = 7.0;
        // Hard accel but no speed loss is not an impact
        samples[70].accel_lat = 30.0;
        let events = single(&samples, &[0]);

        let collisions = kinds(&events, EventKind::Collision);
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].sample_index, 50);
        assert!(kinds(&events, EventKind::Crash).is_empty());
    }

    #[test]
    fn test_lap_start_and_fastest_lap() {
        use contracts::LapTiming;

        let samples = straight(&vec![30.0; 100]);
        let analysis = LapAnalysisResult {
            sector_count: 1,
            laps: vec![
                LapTiming {
                    start_index: 0,
                    end_index: 49,
                    lap_time_ms: 2450.0,
                    sector_times_ms: vec![2450.0],
                },
                LapTiming {
                    start_index: 50,
                    end_index: 99,
                    lap_time_ms: 2400.0,
                    sector_times_ms: vec![2400.0],
                },
            ],
            best_lap_index: 1,
            best_lap_time_ms: 2400.0,
            best_sector_times_ms: vec![2400.0],
        };
        let id = CarId::from("solo");
        let car = EventSource {
            id: &id,
            samples: &samples,
            lap_starts: &[0, 50],
            analysis: Some(&analysis),
        };
        let events = detect_events(&[car], &EventConfig::default()).remove(0);

        let starts = kinds(&events, EventKind::LapStart);
        assert_eq!(starts.len(), 2);
        assert_eq!(starts[1].label, "Lap 2 start");
        let fastest = kinds(&events, EventKind::FastestLap);
        assert_eq!(fastest.len(), 1);
        assert_eq!(fastest[0].sample_index, 50);
        assert_eq!(fastest[0].label, "Fastest lap: Lap 2 (0:02.400)");
    }

    #[test]
    fn test_single_overtake_pair() {
        let speeds_a: Vec<f64> = (0..200).map(|i| if i <= 33 { 10.0 } else { 40.0 }).collect();
        let a = straight(&speeds_a);
        let b = straight(&vec![20.0; 200]);
        let (id_a, id_b) = (CarId::from("A"), CarId::from("B"));
        let cars = [
            EventSource {
                id: &id_a,
                samples: &a,
                lap_starts: &[0],
                analysis: None,
            },
            EventSource {
                id: &id_b,
                samples: &b,
                lap_starts: &[0],
                analysis: None,
            },
        ];
        let events = detect_events(&cars, &EventConfig::default());

        let passes_a = kinds(&events[0], EventKind::Overtake);
        let passes_b = kinds(&events[1], EventKind::Overtake);
        assert_eq!(passes_a.len(), 1, "events: {:?}", events[0]);
        assert_eq!(passes_b.len(), 1);
        assert_eq!(passes_a[0].sample_index, 50);
        assert_eq!(passes_a[0].lap_number, 1);
        assert_eq!(passes_a[0].label, "Overtake A → B (Lap 1)");
        assert_eq!(passes_a[0].role, Some(OvertakeRole::Overtaking));
        assert_eq!(passes_b[0].label, "Got overtaken by A (Lap 1)");
        assert_eq!(passes_b[0].other_car.as_ref().map(|c| c.as_str()), Some("A"));
    }

    #[test]
    fn test_overtake_back_and_forth_is_debounced() {
        // B leads, A passes at 40, B re-passes 10 samples later
        let mut a = straight(&vec![20.0; 120]);
        let b = straight(&vec![20.0; 120]);
        for (k, s) in a.iter_mut().enumerate() {
            s.dist = match k {
                0 => 0.0,
                k if (40..50).contains(&k) => b[k].dist + 1.0,
                k => b[k].dist - 1.0,
            };
        }
        let (id_a, id_b) = (CarId::from("A"), CarId::from("B"));
        let cars = [
            EventSource { id: &id_a, samples: &a, lap_starts: &[0], analysis: None },
            EventSource { id: &id_b, samples: &b, lap_starts: &[0], analysis: None },
        ];
        let events = detect_events(&cars, &EventConfig::default());
        assert_eq!(kinds(&events[0], EventKind::Overtake).len(), 1);
        assert_eq!(kinds(&events[1], EventKind::Overtake).len(), 1);
    }

    #[test]
    fn test_overtake_pair_shares_the_overtaking_lap() {
        let speeds_a: Vec<f64> = (0..200).map(|i| if i <= 33 { 10.0 } else { 40.0 }).collect();
        let a = straight(&speeds_a);
        let b = straight(&vec![20.0; 200]);
        let (id_a, id_b) = (CarId::from("A"), CarId::from("B"));
        let cars = [
            EventSource { id: &id_a, samples: &a, lap_starts: &[0, 30], analysis: None },
            EventSource { id: &id_b, samples: &b, lap_starts: &[0], analysis: None },
        ];
        let events = detect_events(&cars, &EventConfig::default());

        let passes_a = kinds(&events[0], EventKind::Overtake);
        let passes_b = kinds(&events[1], EventKind::Overtake);
        assert_eq!(passes_a[0].lap_number, 2);
        assert_eq!(passes_b[0].lap_number, 2, "B is still on lap 1 but takes A's lap");
        assert_eq!(passes_b[0].label, "Got overtaken by A (Lap 2)");
    }

    #[test]
    fn test_short_car_has_no_events() {
        let samples = straight(&[30.0]);
        assert!(single(&samples, &[0]).is_empty());
    }
}
