//! 合成遥测数据
//!
//! 圆形赛道与直线冲刺两种生成器。噪声由固定种子的 `StdRng` 产生，
//! 保证测试结果可复现。

use std::f64::consts::TAU;

use contracts::{CarTelemetry, RawSample, TelemetryBundle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 采样间隔 (ms)
pub const SAMPLE_INTERVAL_MS: f64 = 50.0;

/// 圆形赛道参数
///
/// 航位推算以纵向加速度作为转向输入，所以恒定 `v²/R` 即可画出半径为 `R` 的圆。
#[derive(Debug, Clone)]
pub struct CircuitProfile {
    pub radius: f64,
    /// m/s
    pub speed: f64,
    pub laps: f64,
    /// 速度与加速度的均匀噪声幅度
    pub noise: f64,
    pub seed: u64,
}

impl Default for CircuitProfile {
    fn default() -> Self {
        Self {
            radius: 200.0,
            speed: 40.0,
            laps: 3.2,
            noise: 0.0,
            seed: 7,
        }
    }
}

impl CircuitProfile {
    pub fn with_speed(speed: f64) -> Self {
        Self {
            speed,
            ..Default::default()
        }
    }

    pub fn lap_length(&self) -> f64 {
        TAU * self.radius
    }

    /// 理论单圈时间 (ms)
    pub fn lap_time_ms(&self) -> f64 {
        self.lap_length() / self.speed * 1000.0
    }

    pub fn sample_count(&self) -> usize {
        (self.laps * self.lap_time_ms() / SAMPLE_INTERVAL_MS).round() as usize + 1
    }
}

/// 圆形赛道上匀速行驶的车辆
pub fn circuit(id: &str, profile: &CircuitProfile) -> CarTelemetry {
    let mut rng = StdRng::seed_from_u64(profile.seed);
    let turn = profile.speed * profile.speed / profile.radius;
    let samples = (0..profile.sample_count())
        .map(|i| {
            let (dv, da) = if profile.noise > 0.0 {
                (
                    rng.random_range(-profile.noise..profile.noise),
                    rng.random_range(-profile.noise..profile.noise),
                )
            } else {
                (0.0, 0.0)
            };
            RawSample {
                timestamp_ms: i as f64 * SAMPLE_INTERVAL_MS,
                speed_mps: Some(profile.speed + dv),
                accel_long: turn + da,
                ..Default::default()
            }
        })
        .collect();

    CarTelemetry {
        id: id.into(),
        samples,
    }
}

/// 直线冲刺，速度由 `speed_at(i)` 给出
pub fn straight(id: &str, count: usize, speed_at: impl Fn(usize) -> f64) -> CarTelemetry {
    let samples = (0..count)
        .map(|i| RawSample {
            timestamp_ms: i as f64 * SAMPLE_INTERVAL_MS,
            speed_mps: Some(speed_at(i)),
            ..Default::default()
        })
        .collect();

    CarTelemetry {
        id: id.into(),
        samples,
    }
}

pub fn bundle(cars: Vec<CarTelemetry>) -> TelemetryBundle {
    TelemetryBundle { cars }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_is_deterministic() {
        let profile = CircuitProfile {
            noise: 0.1,
            ..Default::default()
        };
        let a = circuit("a", &profile);
        let b = circuit("a", &profile);
        assert_eq!(a.samples, b.samples);
        assert_eq!(a.samples.len(), profile.sample_count());
    }

    #[test]
    fn test_circuit_sample_count() {
        let profile = CircuitProfile::default();
        // 2π·200 / 40 = 31.4s per lap, 3.2 laps at 20 Hz
        assert_eq!(profile.sample_count(), 2012);
    }
}
