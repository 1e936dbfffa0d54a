//! Persisted master track loading.
//!
//! Format: `{ "master": [ { "x", "y", "confidence"?, "heatSpeed"? }, ... ] }`.
//! Point order is significant; distances and bounds are recomputed on load.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use contracts::{ContractError, MasterTrack, MasterTrackPoint, TrackOrigin};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedPoint {
    x: f64,
    y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    #[serde(
        default,
        rename = "heatSpeed",
        alias = "heat_speed",
        skip_serializing_if = "Option::is_none"
    )]
    heat_speed: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedTrack {
    master: Vec<PersistedPoint>,
}

/// Parse a persisted master track.
///
/// # Errors
/// `ContractError::TrackLoad` when the document is not JSON, has no
/// `master` array, or an entry is not a point.
pub fn parse_master_track(content: &str) -> Result<MasterTrack, ContractError> {
    let doc: Value = serde_json::from_str(content).map_err(|e| ContractError::TrackLoad {
        message: format!("invalid JSON: {e}"),
        source: Some(Box::new(e)),
    })?;

    let master = doc
        .get("master")
        .ok_or_else(|| ContractError::track_load("missing 'master' field"))?;
    let Value::Array(entries) = master else {
        return Err(ContractError::track_load("'master' is not an array of points"));
    };

    let mut points = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let p: PersistedPoint =
            serde_json::from_value(entry.clone()).map_err(|e| ContractError::TrackLoad {
                message: format!("master[{i}] is not a point: {e}"),
                source: Some(Box::new(e)),
            })?;
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(ContractError::track_load(format!(
                "master[{i}] has non-finite coordinates"
            )));
        }
        points.push(MasterTrackPoint {
            x: p.x,
            y: p.y,
            dist: 0.0,
            confidence: p.confidence.unwrap_or(1.0).clamp(0.0, 1.0),
            support_count: 1,
            support_total: 1,
            heat_speed: p.heat_speed.filter(|v| v.is_finite()),
        });
    }

    tracing::debug!(points = points.len(), "master track parsed");
    Ok(MasterTrack::from_points(points, TrackOrigin::Loaded))
}

/// Serialize a master track in the persisted format.
pub fn master_track_to_json(track: &MasterTrack) -> Result<String, ContractError> {
    let persisted = PersistedTrack {
        master: track
            .points
            .iter()
            .map(|p| PersistedPoint {
                x: p.x,
                y: p.y,
                confidence: Some(p.confidence),
                heat_speed: p.heat_speed,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&persisted)
        .map_err(|e| ContractError::track_load(format!("JSON serialize error: {e}")))
}
