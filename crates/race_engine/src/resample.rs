//! Arc-length resampling shared by fusion, sector timing, delta/input
//! models and heat projection.
//!
//! A curve is a sequence of points with non-decreasing cumulative distance
//! and a carried value per point. Lookups clamp at both ends and guard
//! zero-length spans with [`SPAN_EPSILON`].

use std::marker::PhantomData;

use contracts::Sample;

/// Divisor used for zero-length spans
pub const SPAN_EPSILON: f64 = 1e-6;

/// Values that can be linearly interpolated
pub trait Lerp: Copy {
    fn lerp(a: Self, b: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    #[inline]
    fn lerp(a: Self, b: Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl<const N: usize> Lerp for [f64; N] {
    #[inline]
    fn lerp(a: Self, b: Self, t: f64) -> Self {
        let mut out = a;
        for k in 0..N {
            out[k] = a[k] + (b[k] - a[k]) * t;
        }
        out
    }
}

/// Polyline parameterized by arc-length
pub trait ArcLengthCurve {
    type Value: Lerp;

    fn len(&self) -> usize;

    /// Cumulative distance of point `i`, relative to the first point
    fn dist(&self, i: usize) -> f64;

    fn value(&self, i: usize) -> Self::Value;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total arc-length
    fn length(&self) -> f64 {
        match self.len() {
            0 => 0.0,
            n => self.dist(n - 1),
        }
    }
}

/// A slice of reconstructed samples carrying a projected value.
pub struct SampleCurve<'a, V, F> {
    samples: &'a [Sample],
    base: f64,
    project: F,
    _value: PhantomData<fn() -> V>,
}

impl<'a, V, F> SampleCurve<'a, V, F>
where
    V: Lerp,
    F: Fn(&Sample) -> V,
{
    pub fn new(samples: &'a [Sample], project: F) -> Self {
        let base = samples.first().map(|s| s.dist).unwrap_or(0.0);
        Self {
            samples,
            base,
            project,
            _value: PhantomData,
        }
    }
}

impl<V, F> ArcLengthCurve for SampleCurve<'_, V, F>
where
    V: Lerp,
    F: Fn(&Sample) -> V,
{
    type Value = V;

    #[inline]
    fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    fn dist(&self, i: usize) -> f64 {
        self.samples[i].dist - self.base
    }

    #[inline]
    fn value(&self, i: usize) -> V {
        (self.project)(&self.samples[i])
    }
}

/// Evenly spaced fraction `i / (count - 1)`
#[inline]
pub fn fraction(i: usize, count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        i as f64 / (count - 1) as f64
    }
}

/// Interpolate between points `j - 1` and `j`
#[inline]
fn interpolate<C: ArcLengthCurve>(curve: &C, j: usize, target: f64) -> C::Value {
    let d0 = curve.dist(j - 1);
    let mut span = curve.dist(j) - d0;
    if span.abs() < SPAN_EPSILON {
        span = SPAN_EPSILON;
    }
    let t = ((target - d0) / span).clamp(0.0, 1.0);
    C::Value::lerp(curve.value(j - 1), curve.value(j), t)
}

/// Clamp `target` to the curve ends; `Err` carries a target strictly inside.
#[inline]
fn clamp_ends<C: ArcLengthCurve>(curve: &C, target: f64) -> Result<C::Value, f64> {
    let n = curve.len();
    if target <= curve.dist(0) || n == 1 {
        return Ok(curve.value(0));
    }
    if target >= curve.dist(n - 1) {
        return Ok(curve.value(n - 1));
    }
    Err(target)
}

/// Value at arc-length `target`, by binary search.
///
/// Valid for targets in any order. `None` for an empty curve.
pub fn value_at<C: ArcLengthCurve>(curve: &C, target: f64) -> Option<C::Value> {
    if curve.is_empty() {
        return None;
    }
    let target = match clamp_ends(curve, target) {
        Ok(value) => return Some(value),
        Err(target) => target,
    };

    // First index in [1, n-1] with dist >= target
    let (mut lo, mut hi) = (1, curve.len() - 1);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if curve.dist(mid) < target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    Some(interpolate(curve, lo, target))
}

/// Forward-only lookup over one curve.
///
/// Targets must be non-decreasing; the cursor never moves backwards, so a
/// full sweep costs O(points + targets).
pub struct Cursor<'c, C> {
    curve: &'c C,
    index: usize,
}

impl<'c, C: ArcLengthCurve> Cursor<'c, C> {
    pub fn new(curve: &'c C) -> Self {
        Self { curve, index: 1 }
    }

    /// Value at arc-length `target`. `None` for an empty curve.
    pub fn value_at(&mut self, target: f64) -> Option<C::Value> {
        if self.curve.is_empty() {
            return None;
        }
        let target = match clamp_ends(self.curve, target) {
            Ok(value) => return Some(value),
            Err(target) => target,
        };

        let last = self.curve.len() - 1;
        while self.index < last && self.curve.dist(self.index) < target {
            self.index += 1;
        }
        Some(interpolate(self.curve, self.index, target))
    }
}

/// `count` values at evenly spaced fractions of the curve length.
///
/// Empty when the curve is empty.
pub fn resample<C: ArcLengthCurve>(curve: &C, count: usize) -> Vec<C::Value> {
    let length = curve.length();
    let mut cursor = Cursor::new(curve);
    (0..count)
        .filter_map(|i| cursor.value_at(fraction(i, count) * length))
        .collect()
}
