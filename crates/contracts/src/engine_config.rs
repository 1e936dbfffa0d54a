//! Engine configuration contracts that can be shared across crates.
//!
//! Every threshold the analysis pipeline uses lives here. Defaults are the
//! contract values; a config file only needs to name what it changes.

use serde::{Deserialize, Serialize};

use crate::{CarId, RaceType};

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// External race type override (inferred when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race_type: Option<RaceType>,

    /// Dead-reckoning parameters
    #[serde(default)]
    pub reconstruction: ReconstructionConfig,

    /// Lap boundary detection
    #[serde(default)]
    pub laps: LapDetectionConfig,

    /// Master track fusion
    #[serde(default)]
    pub fusion: FusionConfig,

    /// Lap/sector analysis
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Input intensity model
    #[serde(default)]
    pub inputs: InputModelConfig,

    /// Event detection thresholds
    #[serde(default)]
    pub events: EventConfig,
}

/// Position reconstruction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Step substituted for glitched timestamps (seconds)
    pub min_dt_s: f64,
    /// Largest plausible step between samples (seconds)
    pub max_dt_s: f64,
    /// Weight of the previous value in the accel smoothing filter
    pub accel_smoothing: f64,
    /// Below this speed the yaw rate is treated as zero (m/s)
    pub yaw_min_speed_mps: f64,
    /// Speed floor used for integration (m/s)
    pub min_speed_mps: f64,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            min_dt_s: 0.016,
            max_dt_s: 0.25,
            accel_smoothing: 0.85,
            yaw_min_speed_mps: 2.0,
            min_speed_mps: 0.1,
        }
    }
}

/// Lap boundary detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LapDetectionConfig {
    /// Distance to the start point that counts as a crossing
    pub start_radius: f64,
    /// Minimum speed for a crossing (m/s)
    pub min_speed_mps: f64,
    /// Minimum samples between two lap starts
    pub min_gap_samples: usize,
    /// Minimum samples for a trailing partial lap to be kept
    pub min_trailing_samples: usize,
    /// Start/end gap under which a trajectory is treated as a loop
    pub loop_detect_gap: f64,
}

impl Default for LapDetectionConfig {
    fn default() -> Self {
        Self {
            start_radius: 20.0,
            min_speed_mps: 8.0,
            min_gap_samples: 300,
            min_trailing_samples: 5,
            loop_detect_gap: 40.0,
        }
    }
}

/// Master track fusion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Points per resampled curve (N)
    pub resample_count: usize,
    /// MAD multiplier of the acceptance gate
    pub mad_k: f64,
    /// MAD to standard deviation scale
    pub mad_scale: f64,
    /// Gate used when MAD is zero; the gate is capped at twice this value
    pub abs_gate: f64,
    /// Index fraction where loop closure blending starts
    pub loop_close_fraction: f64,
    /// Endpoint gap below which no closure is applied
    pub loop_min_gap: f64,
    pub heat_low_percentile: f64,
    pub heat_high_percentile: f64,
    /// Car whose speed colors the track (first car when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_car: Option<CarId>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            resample_count: 800,
            mad_k: 2.5,
            mad_scale: 1.4826,
            abs_gate: 12.0,
            loop_close_fraction: 0.9,
            loop_min_gap: 0.5,
            heat_low_percentile: 0.10,
            heat_high_percentile: 0.90,
            reference_car: None,
        }
    }
}

/// Lap/sector analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub sector_count: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { sector_count: 4 }
    }
}

/// Input intensity model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputModelConfig {
    /// Weight of the previous value for stable points
    pub smoothing: f64,
    /// Decay applied to the previous value at unstable points
    pub unstable_decay: f64,
    /// Longitudinal g above which a point is unstable
    pub max_long_g: f64,
    /// Lateral g above which a point is unstable
    pub max_lat_g: f64,
    /// Speed below which a point is unstable (m/s)
    pub min_speed_mps: f64,
    /// Fraction of the extreme accel used as normalization scale
    pub scale_fraction: f64,
    pub throttle_floor: f64,
    pub brake_floor: f64,
    pub steer_floor: f64,
    /// Accelerations at or above this magnitude are ignored for scaling
    pub accel_outlier_limit: f64,
}

impl Default for InputModelConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.35,
            unstable_decay: 0.85,
            max_long_g: 1.7,
            max_lat_g: 2.0,
            min_speed_mps: 1.0,
            scale_fraction: 0.85,
            throttle_floor: 2.0,
            brake_floor: 3.0,
            steer_floor: 2.0,
            accel_outlier_limit: 40.0,
        }
    }
}

/// Event detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Speed drop above which a crash is considered (m/s)
    pub crash_speed_drop: f64,
    /// Accel magnitude above which a crash is considered (m/s²)
    pub crash_accel: f64,
    /// Collision band lower bound, exclusive (m/s)
    pub collision_speed_drop_min: f64,
    /// Collision band upper bound, inclusive (m/s)
    pub collision_speed_drop_max: f64,
    pub collision_accel: f64,
    /// Debounce window for crash, collision and overtake events
    pub min_gap_samples: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            crash_speed_drop: 9.0,
            crash_accel: 8.0,
            collision_speed_drop_min: 3.0,
            collision_speed_drop_max: 9.0,
            collision_accel: 6.0,
            min_gap_samples: 30,
        }
    }
}
