//! Discrete race events

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CarId;

/// Event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    LapStart,
    FastestLap,
    Crash,
    Collision,
    Overtake,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::LapStart,
        EventKind::FastestLap,
        EventKind::Crash,
        EventKind::Collision,
        EventKind::Overtake,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::LapStart => "lap_start",
            EventKind::FastestLap => "fastest_lap",
            EventKind::Crash => "crash",
            EventKind::Collision => "collision",
            EventKind::Overtake => "overtake",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of an overtake this event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertakeRole {
    /// Owner car passed `other_car`
    Overtaking,
    /// Owner car was passed by `other_car`
    Overtaken,
}

/// One derived event, owned by the car it is attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceEvent {
    pub kind: EventKind,
    /// Index into the owning car's samples
    pub sample_index: usize,
    /// 1-based lap number containing `sample_index`
    pub lap_number: usize,
    pub label: String,

    /// Speed lost at the triggering sample (m/s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_drop: Option<f64>,

    /// Combined accel magnitude at the triggering sample (m/s²)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accel_magnitude: Option<f64>,

    /// Other car of an overtake pair (by id, not by reference)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_car: Option<CarId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<OvertakeRole>,
}

impl RaceEvent {
    /// Event without auxiliary fields
    pub fn new(
        kind: EventKind,
        sample_index: usize,
        lap_number: usize,
        label: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            sample_index,
            lap_number,
            label: label.into(),
            speed_drop: None,
            accel_magnitude: None,
            other_car: None,
            role: None,
        }
    }
}
