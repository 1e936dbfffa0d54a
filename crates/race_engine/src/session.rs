//! Race session: the car arena, the master track and the recompute pass.

use std::collections::BTreeMap;

use contracts::{
    CarId, CarRecord, CarSummary, CarTelemetry, ContractError, EngineConfig, EventKind,
    MasterTrack, RaceEvent, RaceType, Sample, SessionSummary, TelemetryBundle, TrackOrigin,
};
use tracing::{debug, info, instrument, warn};

use crate::delta::build_delta_model;
use crate::events::{detect_events, EventSource};
use crate::fusion::{fuse_master_track, heat_window, project_heat};
use crate::inputs::build_input_model;
use crate::laps::{
    detect_laps, fusion_segment, infer_race_type, lap_definitions, race_type_from_track,
};
use crate::reconstruct::reconstruct;
use crate::sectors::analyze_laps;

/// Owns every car and the shared master track.
///
/// Samples are reconstructed once when a car is added. Everything derived
/// from them is rebuilt by [`RaceSession::recompute`] and swapped in.
#[derive(Debug, Default)]
pub struct RaceSession {
    config: EngineConfig,
    cars: Vec<CarRecord>,
    master: MasterTrack,
    /// Externally supplied track, bypasses fusion while present
    loaded_master: Option<MasterTrack>,
    race_type: RaceType,
    timestamp_glitches: usize,
}

impl RaceSession {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Session with every car of the bundle added, not yet computed.
    pub fn from_bundle(bundle: TelemetryBundle, config: EngineConfig) -> Self {
        let mut session = Self::new(config);
        for car in bundle.cars {
            session.add_car(car);
        }
        session
    }

    /// Reconstruct and add a car, replacing any car with the same id.
    pub fn add_car(&mut self, telemetry: CarTelemetry) {
        let rec = reconstruct(&telemetry.samples, &self.config.reconstruction);
        self.timestamp_glitches += rec.timestamp_glitches;
        metrics::counter!("race_engine_timestamp_glitches_total")
            .increment(rec.timestamp_glitches as u64);

        let record = CarRecord::new(telemetry.id, rec.samples);
        match self.cars.iter_mut().find(|c| c.id == record.id) {
            Some(existing) => *existing = record,
            None => self.cars.push(record),
        }
    }

    /// Use an external master track instead of fusing one.
    pub fn load_master_track(&mut self, track: MasterTrack) {
        let mut track = track;
        track.origin = TrackOrigin::Loaded;
        if track.points.iter().any(|p| p.heat_speed.is_some()) {
            track.heat = heat_window(
                track.points.iter().filter_map(|p| p.heat_speed),
                self.config.fusion.heat_low_percentile,
                self.config.fusion.heat_high_percentile,
            );
        }
        self.loaded_master = Some(track);
    }

    /// Drop the external master track; the next pass fuses again.
    pub fn clear_master_track(&mut self) {
        self.loaded_master = None;
    }

    /// Override (or, with `None`, re-infer) the race type and recompute.
    pub fn set_race_type_override(&mut self, race_type: Option<RaceType>) {
        self.config.race_type = race_type;
        self.recompute();
    }

    /// Change the sector count and recompute.
    pub fn set_sector_count(&mut self, sector_count: usize) {
        self.config.analysis.sector_count = sector_count;
        self.recompute();
    }

    /// Move a car's playback cursor.
    pub fn set_data_index(&mut self, car_id: &str, index: usize) -> Result<(), ContractError> {
        let car = self
            .cars
            .iter_mut()
            .find(|c| c.id == car_id)
            .ok_or_else(|| ContractError::unknown_car(car_id))?;
        car.data_index = index.min(car.samples.len().saturating_sub(1));
        Ok(())
    }

    /// Rebuild lap segmentation, master track, models and events.
    #[instrument(
        level = "info",
        name = "race_session_recompute",
        skip_all,
        fields(cars = self.cars.len())
    )]
    pub fn recompute(&mut self) {
        for car in &mut self.cars {
            car.clear_derived();
            if !car.has_trajectory() {
                debug!(car_id = %car.id, samples = car.samples.len(), "car skipped, no trajectory");
                continue;
            }
            let laps = detect_laps(&car.samples, &self.config.laps);
            car.lap_starts = laps.lap_starts;
            car.lap_length = laps.lap_length;
        }

        self.race_type = self.resolve_race_type();
        self.master = self.build_master_track();

        let count = self.config.fusion.resample_count;
        for car in self.cars.iter_mut().filter(|c| c.has_trajectory()) {
            let defs = lap_definitions(
                car.samples.len(),
                &car.lap_starts,
                self.race_type,
                self.config.laps.min_trailing_samples,
            );
            let analysis = analyze_laps(&car.samples, &defs, self.config.analysis.sector_count);
            car.delta_model = build_delta_model(&car.samples, &defs, analysis.as_ref(), count);
            car.input_model = build_input_model(&car.samples, &defs, count, &self.config.inputs);
            car.lap_analysis = analysis;
        }

        let events = {
            let sources: Vec<EventSource<'_>> = self
                .cars
                .iter()
                .map(|car| EventSource {
                    id: &car.id,
                    samples: &car.samples,
                    lap_starts: &car.lap_starts,
                    analysis: car.lap_analysis.as_ref(),
                })
                .collect();
            detect_events(&sources, &self.config.events)
        };
        for (car, list) in self.cars.iter_mut().zip(events) {
            car.events = list;
        }

        let summary = self.summary();
        metrics::counter!("race_engine_recompute_total").increment(1);
        observability::metrics::record_session_metrics(&summary);
        info!(
            race_type = %self.race_type,
            laps = summary.total_laps(),
            master_points = self.master.len(),
            "recompute complete"
        );
    }

    fn resolve_race_type(&self) -> RaceType {
        if let Some(race_type) = self.config.race_type {
            return race_type;
        }
        if let Some(track) = self.loaded_master.as_ref().filter(|t| !t.is_empty()) {
            return race_type_from_track(track, &self.config.laps);
        }
        match self.cars.iter().find(|c| c.has_trajectory()) {
            Some(car) => infer_race_type(&car.samples, &car.lap_starts, &self.config.laps),
            None => RaceType::default(),
        }
    }

    fn build_master_track(&self) -> MasterTrack {
        let fused: Vec<&CarRecord> = self.cars.iter().filter(|c| c.has_trajectory()).collect();
        let reference = match &self.config.fusion.reference_car {
            Some(id) => fused.iter().position(|c| &c.id == id).unwrap_or_else(|| {
                warn!(car_id = %id, "reference car not found, using first car");
                0
            }),
            None => 0,
        };

        if let Some(loaded) = &self.loaded_master {
            let mut track = loaded.clone();
            // Persisted heat only survives when no car can replace it
            if let Some(car) = fused.get(reference).filter(|_| !track.is_empty()) {
                project_heat(&mut track, &car.samples, &self.config.fusion);
            }
            return track;
        }

        let segments: Vec<&[Sample]> = fused
            .iter()
            .map(|car| fusion_segment(&car.samples, &car.lap_starts, self.race_type))
            .collect();
        fuse_master_track(&segments, reference, self.race_type, &self.config.fusion)
    }

    /// Digest of the current state
    pub fn summary(&self) -> SessionSummary {
        let cars = self
            .cars
            .iter()
            .map(|car| {
                let mut event_counts = BTreeMap::new();
                for event in &car.events {
                    *event_counts.entry(event.kind).or_insert(0) += 1;
                }
                let best = car.lap_analysis.as_ref();
                CarSummary {
                    id: car.id.clone(),
                    sample_count: car.samples.len(),
                    duration_ms: car.duration_ms(),
                    distance: car.total_distance(),
                    lap_count: best.map(|a| a.laps.len()).unwrap_or(0),
                    lap_length: car.lap_length,
                    best_lap_number: best.map(|a| a.best_lap_index + 1),
                    best_lap_time_ms: best.map(|a| a.best_lap_time_ms),
                    event_counts,
                }
            })
            .collect();

        SessionSummary {
            race_type: self.race_type,
            cars,
            master_points: self.master.len(),
            master_length: self.master.total_length(),
            master_mean_confidence: self.master.mean_confidence(),
            timestamp_glitches: self.timestamp_glitches,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cars(&self) -> &[CarRecord] {
        &self.cars
    }

    pub fn car(&self, car_id: &str) -> Option<&CarRecord> {
        self.cars.iter().find(|c| c.id == car_id)
    }

    pub fn master_track(&self) -> &MasterTrack {
        &self.master
    }

    pub fn race_type(&self) -> RaceType {
        self.race_type
    }

    /// Events of every car, in car order
    pub fn events(&self) -> impl Iterator<Item = (&CarId, &RaceEvent)> {
        self.cars
            .iter()
            .flat_map(|car| car.events.iter().map(move |e| (&car.id, e)))
    }

    pub fn event_count(&self, kind: EventKind) -> usize {
        self.events().filter(|(_, e)| e.kind == kind).count()
    }
}
