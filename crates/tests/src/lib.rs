//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合成遥测数据生成 (圆形赛道 / 直线冲刺)
//! - 会话级场景测试：圈检测、赛道融合、分段计时、事件检测
//! - 配置与赛道持久化的跨 crate 测试

pub mod synthetic;

#[cfg(test)]
mod circuit_tests {
    use contracts::{EngineConfig, EventKind, RaceType, TrackOrigin};
    use race_engine::query::{lap_for_sample, master_index_for_sample, sample_index_at};
    use race_engine::RaceSession;

    use crate::synthetic::{bundle, circuit, CircuitProfile};

    const SPEEDS: [(&str, f64); 3] = [("alpha", 40.0), ("bravo", 38.0), ("charlie", 36.0)];

    fn profiles() -> Vec<(&'static str, CircuitProfile)> {
        SPEEDS
            .iter()
            .enumerate()
            .map(|(i, &(id, speed))| {
                let profile = CircuitProfile {
                    noise: 0.05,
                    seed: i as u64 + 1,
                    ..CircuitProfile::with_speed(speed)
                };
                (id, profile)
            })
            .collect()
    }

    fn session() -> RaceSession {
        let cars = profiles().iter().map(|(id, profile)| circuit(id, profile)).collect();
        let mut session = RaceSession::from_bundle(bundle(cars), EngineConfig::default());
        session.recompute();
        session
    }

    #[test]
    fn test_circuit_laps_and_timing() {
        let session = session();
        assert_eq!(session.race_type(), RaceType::Lapped);

        for (id, profile) in profiles() {
            let car = session.car(id).unwrap();
            assert_eq!(car.lap_starts.len(), 4, "{id}: 3 full laps plus a partial one");

            let analysis = car.lap_analysis.as_ref().unwrap();
            assert_eq!(analysis.laps.len(), 4, "{id}: trailing partial lap is kept");
            assert_eq!(analysis.sector_count, 4);

            for lap in &analysis.laps[1..3] {
                let error = (lap.lap_time_ms - profile.lap_time_ms()).abs() / profile.lap_time_ms();
                assert!(
                    error < 0.01,
                    "{id}: lap time {} vs expected {}",
                    lap.lap_time_ms,
                    profile.lap_time_ms()
                );
            }

            for lap in &analysis.laps {
                let sum: f64 = lap.sector_times_ms.iter().sum();
                assert!((sum - lap.lap_time_ms).abs() < 1e-6, "{id}: sectors sum to lap time");
                assert!(lap.sector_times_ms.iter().all(|t| *t > 0.0));
            }

            let fastest = analysis
                .laps
                .iter()
                .map(|l| l.lap_time_ms)
                .fold(f64::INFINITY, f64::min);
            assert_eq!(analysis.best_lap_time_ms, fastest);
        }
    }

    #[test]
    fn test_master_track_is_closed_and_supported() {
        let session = session();
        let master = session.master_track();

        assert_eq!(master.len(), 800);
        assert_eq!(master.origin, TrackOrigin::Fused);
        assert!(master.bounds.is_some());
        assert!(
            master.endpoint_gap().unwrap() < 1e-6,
            "lapped track must be closed"
        );

        for p in &master.points {
            assert_eq!(p.support_total, 3);
            // The two candidates nearest the median are always inside the gate
            assert!(p.confidence >= 2.0 / 3.0 - 1e-9 && p.confidence <= 1.0);
        }

        // Before the closure blend every point sits on the 200m circle
        for p in &master.points[..700] {
            let r = p.x.hypot(p.y - 200.0);
            assert!((r - 200.0).abs() < 3.0, "point ({}, {}) off the circle", p.x, p.y);
        }

        let heat = master.heat;
        assert!((heat.min - 40.0).abs() < 0.1, "heat follows the first car: {}", heat.min);
        assert!(master.points.iter().all(|p| p.heat_speed.is_some()));
    }

    #[test]
    fn test_delta_and_input_models() {
        let session = session();
        for (id, _) in profiles() {
            let car = session.car(id).unwrap();
            let analysis = car.lap_analysis.as_ref().unwrap();

            let delta = car.delta_model.as_ref().unwrap();
            assert_eq!(delta.per_lap_deltas.len(), 4);
            assert_eq!(delta.reference_lap_index, analysis.best_lap_index);
            let reference = delta.lap(delta.reference_lap_index).unwrap();
            assert_eq!(reference.len(), 800);
            assert!(reference.iter().all(|d| *d == 0.0));

            let inputs = car.input_model.as_ref().unwrap();
            assert_eq!(inputs.per_lap_inputs.len(), 4);
            let lap = inputs.lap(1).unwrap();
            assert_eq!(lap.len(), 800);
            for p in lap {
                assert!((0.0..=1.0).contains(&p.throttle));
                assert_eq!(p.brake, 0.0, "{id}: constant positive accel never brakes");
                assert_eq!(p.steer, 0.0);
            }
            assert!(lap[799].throttle > 0.99);
        }
    }

    #[test]
    fn test_circuit_events() {
        let session = session();
        assert_eq!(session.event_count(EventKind::Overtake), 0, "fastest car leads throughout");
        assert_eq!(session.event_count(EventKind::Crash), 0);
        assert_eq!(session.event_count(EventKind::Collision), 0);
        assert_eq!(session.event_count(EventKind::LapStart), 12);
        assert_eq!(session.event_count(EventKind::FastestLap), 3);

        for car in session.cars() {
            assert!(car.events.windows(2).all(|w| w[0].sample_index <= w[1].sample_index));
            let laps: Vec<usize> = car
                .events
                .iter()
                .filter(|e| e.kind == EventKind::LapStart)
                .map(|e| e.lap_number)
                .collect();
            assert_eq!(laps, vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_playback_queries() {
        let session = session();
        let car = session.car("alpha").unwrap();

        assert_eq!(lap_for_sample(&car.lap_starts, car.lap_starts[2]), 3);
        assert_eq!(lap_for_sample(&car.lap_starts, car.lap_starts[2] - 1), 2);
        assert_eq!(sample_index_at(car, 1000.0), Some(20));
        assert_eq!(
            master_index_for_sample(car, car.lap_starts[1], session.master_track()),
            Some(0),
            "a lap start maps to the start of the master track"
        );
    }

    #[test]
    fn test_summary_and_aggregator() {
        let session = session();
        let summary = session.summary();
        assert_eq!(summary.cars.len(), 3);
        assert_eq!(summary.total_laps(), 12);
        assert_eq!(summary.master_points, 800);
        assert_eq!(summary.timestamp_glitches, 0);

        let mut aggregator = observability::AnalysisMetricsAggregator::new();
        aggregator.update(&summary);
        let report = aggregator.summary();
        assert_eq!(report.cars, 3);
        assert_eq!(report.laps, 12);
        assert_eq!(report.best_lap_ms.count, 3);
        assert!(report.to_string().contains("=== Analysis Metrics Summary ==="));
    }
}

#[cfg(test)]
mod sprint_tests {
    use contracts::{EngineConfig, EventKind, OvertakeRole, RaceType};
    use race_engine::query::{max_duration_ms, nearest_event, sample_index_at};
    use race_engine::RaceSession;

    use crate::synthetic::{bundle, straight};

    fn overtake_session() -> RaceSession {
        let alpha = straight("alpha", 1000, |_| 30.0);
        let bravo = straight("bravo", 1000, |i| if i < 300 { 33.0 } else { 27.0 });
        let mut session = RaceSession::from_bundle(bundle(vec![alpha, bravo]), EngineConfig::default());
        session.recompute();
        session
    }

    #[test]
    fn test_sprint_is_single_open_lap() {
        let session = overtake_session();
        assert_eq!(session.race_type(), RaceType::Sprint);

        let master = session.master_track();
        assert_eq!(master.len(), 800);
        assert!(master.endpoint_gap().unwrap() > 1000.0, "sprint track stays open");

        let car = session.car("alpha").unwrap();
        assert_eq!(car.lap_starts, vec![0]);
        let analysis = car.lap_analysis.as_ref().unwrap();
        assert_eq!(analysis.laps.len(), 1);
        assert!((analysis.laps[0].lap_time_ms - 49_950.0).abs() < 1e-6);
    }

    #[test]
    fn test_single_overtake_after_slowdown() {
        let session = overtake_session();
        let alpha = session.car("alpha").unwrap();
        let bravo = session.car("bravo").unwrap();

        let passes: Vec<_> = alpha
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Overtake)
            .collect();
        assert_eq!(passes.len(), 1);
        let pass = passes[0];
        // Equal distance around sample 598
        assert!((595..=605).contains(&pass.sample_index), "pass at {}", pass.sample_index);
        assert_eq!(pass.role, Some(OvertakeRole::Overtaking));
        assert_eq!(pass.other_car.as_deref(), Some("bravo"));
        assert_eq!(pass.label, "Overtake alpha → bravo (Lap 1)");

        let passed: Vec<_> = bravo
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Overtake)
            .collect();
        assert_eq!(passed.len(), 1);
        assert_eq!(passed[0].sample_index, pass.sample_index);
        assert_eq!(passed[0].role, Some(OvertakeRole::Overtaken));
        assert_eq!(passed[0].label, "Got overtaken by alpha (Lap 1)");

        // The slowdown has no lateral or longitudinal load
        assert_eq!(session.event_count(EventKind::Collision), 0);
    }

    fn incident_session() -> RaceSession {
        let mut car = straight("solo", 1000, |i| match i {
            500 => 15.0,
            700 => 25.0,
            _ => 30.0,
        });
        car.samples[500].accel_long = -25.0;
        car.samples[700].accel_lat = 10.0;

        let mut session = RaceSession::new(EngineConfig::default());
        session.add_car(car);
        session.recompute();
        session
    }

    #[test]
    fn test_crash_and_collision_labels() {
        let session = incident_session();
        let car = session.car("solo").unwrap();

        let crashes: Vec<_> = car.events.iter().filter(|e| e.kind == EventKind::Crash).collect();
        assert_eq!(crashes.len(), 1);
        assert_eq!(crashes[0].sample_index, 500);
        assert_eq!(crashes[0].label, "Crash - Lap 1, Δv 33.6 mph");
        assert_eq!(crashes[0].speed_drop, Some(15.0));

        let collisions: Vec<_> = car
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Collision)
            .collect();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].sample_index, 700);
        assert_eq!(collisions[0].label, "Collision - Lap 1, Δv 11.2 mph");
    }

    #[test]
    fn test_timeline_lookup() {
        let session = incident_session();
        let cars = session.cars();

        assert_eq!(max_duration_ms(cars), 49_950.0);
        assert_eq!(sample_index_at(&cars[0], 25_010.0), Some(500));

        let hit = nearest_event(cars, 25_040.0, 100.0).unwrap();
        assert_eq!(hit.event.kind, EventKind::Crash);
        assert_eq!(hit.elapsed_ms, 25_000.0);
        assert_eq!(hit.car, "solo");

        assert!(nearest_event(cars, 10_000.0, 100.0).is_none());
    }
}

#[cfg(test)]
mod persistence_tests {
    use config_loader::{master_track_to_json, parse_master_track, ConfigFormat, ConfigLoader};
    use contracts::{EngineConfig, RaceType, TrackOrigin};
    use race_engine::RaceSession;

    use crate::synthetic::{bundle, circuit, straight, CircuitProfile};

    fn fused_circuit_track() -> contracts::MasterTrack {
        let mut session = RaceSession::from_bundle(
            bundle(vec![circuit("alpha", &CircuitProfile::default())]),
            EngineConfig::default(),
        );
        session.recompute();
        session.master_track().clone()
    }

    #[test]
    fn test_loaded_track_decides_race_type() {
        let fused = fused_circuit_track();
        let json = master_track_to_json(&fused).unwrap();
        let loaded = parse_master_track(&json).unwrap();
        assert_eq!(loaded.origin, TrackOrigin::Loaded);

        let mut session = RaceSession::new(EngineConfig::default());
        session.add_car(straight("solo", 400, |_| 30.0));
        session.load_master_track(loaded);
        session.recompute();

        assert_eq!(session.race_type(), RaceType::Lapped, "closed loaded track means lapped");
        let master = session.master_track();
        assert_eq!(master.origin, TrackOrigin::Loaded);
        assert_eq!(master.len(), fused.len());
        for (a, b) in master.points.iter().zip(&fused.points) {
            assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
        }
        assert!(
            master.points.iter().all(|p| p.heat_speed == Some(30.0)),
            "heat is re-projected from the solo car"
        );
        assert_eq!(master.heat.min, 30.0);
        assert_eq!(master.heat.range, 1.0, "flat speed falls back to unit range");

        session.clear_master_track();
        session.recompute();
        assert_eq!(session.race_type(), RaceType::Sprint);
        assert_eq!(session.master_track().origin, TrackOrigin::Fused);
    }

    #[test]
    fn test_config_override_drives_session() {
        let toml = r#"
race_type = "sprint"

[analysis]
sector_count = 3
"#;
        let config = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();
        let profile = CircuitProfile::default();
        let mut session = RaceSession::from_bundle(bundle(vec![circuit("alpha", &profile)]), config);
        session.recompute();

        assert_eq!(session.race_type(), RaceType::Sprint);
        let analysis = session.car("alpha").unwrap().lap_analysis.clone().unwrap();
        assert_eq!(analysis.laps.len(), 1, "sprint override is one lap");
        assert_eq!(analysis.laps[0].sector_times_ms.len(), 3);
        let expected = (profile.sample_count() - 1) as f64 * 50.0;
        assert!((analysis.laps[0].lap_time_ms - expected).abs() < 1e-6);

        session.set_sector_count(5);
        let analysis = session.car("alpha").unwrap().lap_analysis.clone().unwrap();
        assert_eq!(analysis.sector_count, 5);

        session.set_race_type_override(None);
        assert_eq!(session.race_type(), RaceType::Lapped);
        assert_eq!(session.car("alpha").unwrap().lap_analysis.as_ref().unwrap().laps.len(), 4);
    }

    #[test]
    fn test_invalid_track_file_is_load_error() {
        let err = parse_master_track(r#"{ "master": "oval" }"#).unwrap_err();
        assert!(matches!(err, contracts::ContractError::TrackLoad { .. }));
    }
}
