//! 分析指标模块
//!
//! 基于 SessionSummary 记录和汇总每次重算的结果。

use std::collections::BTreeMap;

use contracts::{EventKind, SessionSummary};
use metrics::{counter, gauge, histogram};

/// 从 SessionSummary 记录指标
///
/// 每次 recompute 结束时调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_session_metrics;
///
/// session.recompute();
/// record_session_metrics(&session.summary());
/// ```
pub fn record_session_metrics(summary: &SessionSummary) {
    gauge!("race_engine_cars").set(summary.cars.len() as f64);
    gauge!("race_engine_master_points").set(summary.master_points as f64);

    let laps = summary.total_laps();
    if laps > 0 {
        counter!("race_engine_laps_total").increment(laps as u64);
    }

    for kind in EventKind::ALL {
        let n = summary.total_events(kind);
        if n > 0 {
            counter!("race_engine_events_total", "kind" => kind.as_str()).increment(n as u64);
        }
    }

    if let Some(confidence) = summary.master_mean_confidence {
        histogram!("race_engine_master_confidence").record(confidence);
    }

    // 每辆车的最佳圈速
    for car in &summary.cars {
        if let Some(best) = car.best_lap_time_ms {
            gauge!("race_engine_best_lap_ms", "car_id" => car.id.to_string()).set(best);
        }
    }
}

/// 记录单次重算耗时
pub fn record_recompute_duration_ms(duration_ms: f64) {
    histogram!("race_engine_recompute_duration_ms").record(duration_ms);
}

/// 分析指标聚合器
///
/// 在内存中汇总多次重算（或多个会话）的结果，便于输出摘要。
#[derive(Debug, Clone, Default)]
pub struct AnalysisMetricsAggregator {
    /// 汇总的会话数
    pub sessions: u64,

    pub cars: u64,

    pub laps: u64,

    /// 时间戳异常次数
    pub timestamp_glitches: u64,

    /// 最佳圈速统计 (ms)
    pub best_lap_stats: RunningStats,

    /// 车辆时长统计 (ms)
    pub duration_stats: RunningStats,

    /// 主赛道平均置信度统计
    pub confidence_stats: RunningStats,

    pub event_counts: BTreeMap<EventKind, u64>,
}

impl AnalysisMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并一次会话摘要
    pub fn update(&mut self, summary: &SessionSummary) {
        self.sessions += 1;
        self.cars += summary.cars.len() as u64;
        self.laps += summary.total_laps() as u64;
        self.timestamp_glitches += summary.timestamp_glitches as u64;

        for car in &summary.cars {
            if car.sample_count >= 2 {
                self.duration_stats.push(car.duration_ms);
            }
            if let Some(best) = car.best_lap_time_ms {
                self.best_lap_stats.push(best);
            }
            for (kind, n) in &car.event_counts {
                *self.event_counts.entry(*kind).or_insert(0) += *n as u64;
            }
        }

        if let Some(confidence) = summary.master_mean_confidence {
            self.confidence_stats.push(confidence);
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            sessions: self.sessions,
            cars: self.cars,
            laps: self.laps,
            timestamp_glitches: self.timestamp_glitches,
            best_lap_ms: StatsSummary::from(&self.best_lap_stats),
            car_duration_ms: StatsSummary::from(&self.duration_stats),
            master_confidence: StatsSummary::from(&self.confidence_stats),
            event_counts: self.event_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub sessions: u64,
    pub cars: u64,
    pub laps: u64,
    pub timestamp_glitches: u64,
    pub best_lap_ms: StatsSummary,
    pub car_duration_ms: StatsSummary,
    pub master_confidence: StatsSummary,
    pub event_counts: BTreeMap<EventKind, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Analysis Metrics Summary ===")?;
        writeln!(f, "Sessions: {}", self.sessions)?;
        writeln!(f, "Cars: {}", self.cars)?;
        writeln!(f, "Laps: {}", self.laps)?;
        writeln!(f, "Timestamp glitches: {}", self.timestamp_glitches)?;
        writeln!(f, "Best lap (ms): {}", self.best_lap_ms)?;
        writeln!(f, "Car duration (ms): {}", self.car_duration_ms)?;
        writeln!(f, "Master confidence: {}", self.master_confidence)?;

        if !self.event_counts.is_empty() {
            writeln!(f, "Events:")?;
            for (kind, count) in &self.event_counts {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            return write!(f, "N/A");
        }
        write!(
            f,
            "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
            self.min, self.max, self.mean, self.std_dev, self.count
        )
    }
}

/// 在线统计 (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CarSummary, RaceType};

    fn car_summary(id: &str, best: Option<f64>, crashes: usize) -> CarSummary {
        let mut event_counts = BTreeMap::new();
        event_counts.insert(EventKind::LapStart, 2);
        if crashes > 0 {
            event_counts.insert(EventKind::Crash, crashes);
        }
        CarSummary {
            id: id.into(),
            sample_count: 1200,
            duration_ms: 60_000.0,
            distance: 2_500.0,
            lap_count: 2,
            lap_length: 1_250.0,
            best_lap_number: best.map(|_| 1),
            best_lap_time_ms: best,
            event_counts,
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0, f64::NAN] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5, "non-finite values are skipped");
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let summary = SessionSummary {
            race_type: RaceType::Lapped,
            cars: vec![
                car_summary("a", Some(29_000.0), 1),
                car_summary("b", Some(31_000.0), 0),
            ],
            master_points: 800,
            master_length: 1_250.0,
            master_mean_confidence: Some(0.9),
            timestamp_glitches: 3,
        };

        let mut aggregator = AnalysisMetricsAggregator::new();
        aggregator.update(&summary);
        aggregator.update(&summary);

        assert_eq!(aggregator.sessions, 2);
        assert_eq!(aggregator.cars, 4);
        assert_eq!(aggregator.laps, 8);
        assert_eq!(aggregator.timestamp_glitches, 6);
        assert_eq!(aggregator.event_counts.get(&EventKind::Crash), Some(&2));
        assert_eq!(aggregator.event_counts.get(&EventKind::LapStart), Some(&8));
        assert!((aggregator.best_lap_stats.mean() - 30_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = AnalysisMetricsAggregator::new();
        aggregator.best_lap_stats.push(30_000.0);
        aggregator.event_counts.insert(EventKind::Overtake, 4);
        aggregator.laps = 12;

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Laps: 12"));
        assert!(output.contains("overtake: 4"));
        assert!(output.contains("mean=30000.000"));
        assert!(output.contains("Master confidence: N/A"));
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        let summary = SessionSummary {
            race_type: RaceType::Sprint,
            cars: vec![car_summary("a", None, 0)],
            master_points: 0,
            master_length: 0.0,
            master_mean_confidence: None,
            timestamp_glitches: 0,
        };
        record_session_metrics(&summary);
        record_recompute_duration_ms(1.5);
    }
}
