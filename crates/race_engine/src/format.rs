//! Display helpers for lap times and deltas.

/// `m:ss.mmm`, truncated to whole milliseconds
pub fn format_lap_time(ms: f64) -> String {
    if !ms.is_finite() {
        return "-".to_string();
    }
    let total_ms = ms.max(0.0).floor() as u64;
    let millis = total_ms % 1000;
    let secs = total_ms / 1000;
    format!("{}:{:02}.{:03}", secs / 60, secs % 60, millis)
}

/// Signed seconds with millisecond precision, `+0.000s` for zero
pub fn format_delta(ms: f64) -> String {
    if !ms.is_finite() {
        return "-".to_string();
    }
    let sign = if ms >= 0.0 { '+' } else { '-' };
    format!("{}{:.3}s", sign, (ms / 1000.0).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_lap_time() {
        assert_eq!(format_lap_time(0.0), "0:00.000");
        assert_eq!(format_lap_time(83_456.9), "1:23.456");
        assert_eq!(format_lap_time(605_001.0), "10:05.001");
        assert_eq!(format_lap_time(f64::NAN), "-");
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(0.0), "+0.000s");
        assert_eq!(format_delta(1234.0), "+1.234s");
        assert_eq!(format_delta(-250.0), "-0.250s");
    }
}
