//! # Race Engine
//!
//! Telemetry reconstruction and analysis core.
//!
//! Pipeline, leaf-first:
//! - [`reconstruct`]: dead-reckoning trajectory with cumulative arc-length
//! - [`detect_laps`]: lap starts from returns to the start point
//! - [`fuse_master_track`]: median/MAD gated fusion with loop closure
//! - [`analyze_laps`]: lap and sector timing
//! - [`build_delta_model`] / [`build_input_model`]: per-lap resampled curves
//! - [`detect_events`]: crashes, collisions, overtakes, lap markers
//!
//! [`resample`] is the arc-length primitive every stage shares.
//!
//! ## Usage
//!
//! ```ignore
//! use race_engine::{RaceSession, EngineConfig};
//!
//! let mut session = RaceSession::from_bundle(bundle, EngineConfig::default());
//! session.recompute();
//!
//! for car in session.cars() {
//!     println!("{}: {} laps", car.id, car.lap_starts.len());
//! }
//! ```

mod delta;
mod events;
mod format;
mod fusion;
mod inputs;
mod laps;
pub mod query;
mod reconstruct;
pub mod resample;
mod sectors;
mod session;

pub use delta::build_delta_model;
pub use events::{detect_events, EventSource};
pub use format::{format_delta, format_lap_time};
pub use fusion::{close_loop, fuse_master_track, heat_window};
pub use inputs::{build_input_model, input_scales};
pub use laps::{
    detect_laps, fusion_segment, infer_race_type, lap_definitions, lap_number,
    race_type_from_track, LapDetection,
};
pub use reconstruct::{reconstruct, Reconstruction};
pub use sectors::{analyze_laps, sector_deltas};
pub use session::RaceSession;

// Re-export contracts types
pub use contracts::{
    CarRecord, DeltaReference, EngineConfig, MasterTrack, RaceEvent, RaceType, TelemetryBundle,
};
