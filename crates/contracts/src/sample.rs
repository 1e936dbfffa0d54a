//! Telemetry samples
//!
//! `RawSample` is what the ingestion side hands over, `Sample` is the same
//! row after position reconstruction.

use serde::{Deserialize, Serialize};

use crate::CarId;

pub const KPH_PER_MPS: f64 = 3.6;
pub const MPH_PER_MPS: f64 = 2.23694;

/// One telemetry row as produced by ingestion.
///
/// Speed may arrive in any of three units; the first non-zero one wins
/// (m/s, then km/h, then mph).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Monotonic timestamp (milliseconds)
    #[serde(alias = "timestampMS")]
    pub timestamp_ms: f64,

    /// Speed in m/s
    #[serde(default)]
    pub speed_mps: Option<f64>,

    /// Speed in km/h
    #[serde(default)]
    pub speed_kph: Option<f64>,

    /// Speed in mph
    #[serde(default)]
    pub speed_mph: Option<f64>,

    /// Longitudinal acceleration (m/s²)
    #[serde(default, alias = "accel_x")]
    pub accel_long: f64,

    /// Lateral acceleration (m/s²)
    #[serde(default, alias = "accel_y")]
    pub accel_lat: f64,

    #[serde(default)]
    pub engine_rpm: Option<f64>,

    #[serde(default)]
    pub gear: Option<i32>,
}

impl RawSample {
    /// Speed normalised to m/s, 0 when no unit carries a usable value.
    pub fn speed(&self) -> f64 {
        let mps = self.speed_mps.filter(|v| v.is_finite() && *v != 0.0);
        let kph = self
            .speed_kph
            .map(|v| v / KPH_PER_MPS)
            .filter(|v| v.is_finite() && *v != 0.0);
        let mph = self
            .speed_mph
            .map(|v| v / MPH_PER_MPS)
            .filter(|v| v.is_finite() && *v != 0.0);
        mps.or(kph).or(mph).unwrap_or(0.0)
    }
}

/// Reconstructed sample.
///
/// Raw fields are copied in, the derived fields are written once by the
/// position reconstructor and never change afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp_ms: f64,
    /// Speed in m/s
    pub speed: f64,
    pub accel_long: f64,
    pub accel_lat: f64,
    pub engine_rpm: Option<f64>,
    pub gear: Option<i32>,

    // ===== Derived =====
    pub pos_x: f64,
    pub pos_y: f64,
    /// Cumulative arc-length from the first sample (non-decreasing)
    pub dist: f64,
    /// Exponentially smoothed longitudinal acceleration
    pub smoothed_accel_long: f64,
}

impl Sample {
    /// Copy the raw fields; derived fields start at zero.
    pub fn from_raw(raw: &RawSample) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            timestamp_ms: raw.timestamp_ms,
            speed: raw.speed(),
            accel_long: finite(raw.accel_long),
            accel_lat: finite(raw.accel_lat),
            engine_rpm: raw.engine_rpm,
            gear: raw.gear,
            ..Default::default()
        }
    }

    /// Combined planar acceleration magnitude
    #[inline]
    pub fn accel_magnitude(&self) -> f64 {
        self.accel_long.hypot(self.accel_lat)
    }
}

/// Raw telemetry for one car.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarTelemetry {
    pub id: CarId,
    pub samples: Vec<RawSample>,
}

/// Mapping from car id to raw sample sequence, in ingestion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryBundle {
    pub cars: Vec<CarTelemetry>,
}
