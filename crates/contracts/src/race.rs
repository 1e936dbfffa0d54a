use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Race classification driving lap segmentation and loop closure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceType {
    /// Circuit: cars return to their start point
    #[default]
    Lapped,
    /// Point-to-point
    Sprint,
}

impl RaceType {
    #[inline]
    pub fn is_lapped(self) -> bool {
        matches!(self, RaceType::Lapped)
    }
}

impl fmt::Display for RaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceType::Lapped => write!(f, "lapped"),
            RaceType::Sprint => write!(f, "sprint"),
        }
    }
}

impl FromStr for RaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lapped" | "circuit" => Ok(RaceType::Lapped),
            "sprint" => Ok(RaceType::Sprint),
            other => Err(format!("unknown race type '{}'", other)),
        }
    }
}
