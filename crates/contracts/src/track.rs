//! MasterTrack - fused reference line shared by all cars

use serde::{Deserialize, Serialize};

/// One point of the fused reference line
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterTrackPoint {
    pub x: f64,
    pub y: f64,

    /// Cumulative arc-length along the master track (`dist[0] = 0`)
    pub dist: f64,

    /// Fraction of candidates inside the fusion gate, 0-1
    pub confidence: f64,

    /// Candidates inside the gate
    pub support_count: usize,

    /// Candidates considered at this fraction
    pub support_total: usize,

    /// Reference car speed projected onto this point (m/s)
    pub heat_speed: Option<f64>,
}

impl MasterTrackPoint {
    /// Point with full confidence from a single source
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            confidence: 1.0,
            support_count: 1,
            support_total: 1,
            ..Default::default()
        }
    }
}

/// Axis-aligned bounds of the master track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// Normalization window for heat coloring (percentile clipped)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatWindow {
    pub min: f64,
    pub range: f64,
}

impl Default for HeatWindow {
    fn default() -> Self {
        Self {
            min: 0.0,
            range: 1.0,
        }
    }
}

impl HeatWindow {
    /// Map a speed into `[0, 1]` within the window
    pub fn normalize(&self, speed: f64) -> f64 {
        let range = if self.range > 0.0 { self.range } else { 1.0 };
        ((speed - self.min) / range).clamp(0.0, 1.0)
    }
}

/// Where the master track came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackOrigin {
    /// Fused from the session's telemetry
    #[default]
    Fused,
    /// Supplied externally, bypasses fusion
    Loaded,
}

/// Fixed-length reference polyline.
///
/// An empty track means "no track yet", which is a valid state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterTrack {
    pub points: Vec<MasterTrackPoint>,
    pub bounds: Option<Bounds>,
    pub heat: HeatWindow,
    pub origin: TrackOrigin,
}

impl MasterTrack {
    /// Build a track from points, recomputing distances and bounds.
    pub fn from_points(points: Vec<MasterTrackPoint>, origin: TrackOrigin) -> Self {
        let mut track = Self {
            points,
            bounds: None,
            heat: HeatWindow::default(),
            origin,
        };
        track.recompute_geometry();
        track
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Total arc-length, 0 for an empty track
    pub fn total_length(&self) -> f64 {
        self.points.last().map(|p| p.dist).unwrap_or(0.0)
    }

    /// Straight-line distance between first and last point
    pub fn endpoint_gap(&self) -> Option<f64> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some((last.x - first.x).hypot(last.y - first.y))
    }

    /// Mean fusion confidence across points
    pub fn mean_confidence(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        let sum: f64 = self.points.iter().map(|p| p.confidence).sum();
        Some(sum / self.points.len() as f64)
    }

    /// Recompute cumulative distances and bounds after the points moved.
    pub fn recompute_geometry(&mut self) {
        let mut acc = 0.0;
        for i in 0..self.points.len() {
            if i > 0 {
                let prev = self.points[i - 1];
                let cur = self.points[i];
                acc += (cur.x - prev.x).hypot(cur.y - prev.y);
            }
            self.points[i].dist = acc;
        }
        self.bounds = compute_bounds(&self.points);
    }
}

/// Bounds of a point set; a degenerate axis is widened by ±1.
fn compute_bounds(points: &[MasterTrackPoint]) -> Option<Bounds> {
    if points.is_empty() {
        return None;
    }
    let mut bounds = Bounds {
        min_x: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        min_y: f64::INFINITY,
        max_y: f64::NEG_INFINITY,
    };
    for p in points {
        bounds.min_x = bounds.min_x.min(p.x);
        bounds.max_x = bounds.max_x.max(p.x);
        bounds.min_y = bounds.min_y.min(p.y);
        bounds.max_y = bounds.max_y.max(p.y);
    }
    if bounds.min_x == bounds.max_x {
        bounds.min_x -= 1.0;
        bounds.max_x += 1.0;
    }
    if bounds.min_y == bounds.max_y {
        bounds.min_y -= 1.0;
        bounds.max_y += 1.0;
    }
    Some(bounds)
}
