//! 配置校验模块
//!
//! 校验规则：
//! - resample_count >= 2, sector_count >= 1
//! - 半径、间隔、阈值为正
//! - min_dt_s <= max_dt_s
//! - 平滑系数在 [0, 1) 内
//! - 热力图分位数有序且在 [0, 1] 内
//! - 碰撞速度区间有序

use contracts::{
    ContractError, EngineConfig, EventConfig, FusionConfig, InputModelConfig, LapDetectionConfig,
    ReconstructionConfig,
};

/// 校验 EngineConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &EngineConfig) -> Result<(), ContractError> {
    validate_reconstruction(&config.reconstruction)?;
    validate_laps(&config.laps)?;
    validate_fusion(&config.fusion)?;
    validate_analysis(config)?;
    validate_inputs(&config.inputs)?;
    validate_events(&config.events)?;
    Ok(())
}

fn positive(field: &str, value: f64) -> Result<(), ContractError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ContractError::config_validation(
            field,
            format!("must be > 0, got {value}"),
        ))
    }
}

fn unit_interval(field: &str, value: f64) -> Result<(), ContractError> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(ContractError::config_validation(
            field,
            format!("must be in [0, 1), got {value}"),
        ))
    }
}

/// 校验航位推算配置
fn validate_reconstruction(c: &ReconstructionConfig) -> Result<(), ContractError> {
    positive("reconstruction.min_dt_s", c.min_dt_s)?;
    positive("reconstruction.max_dt_s", c.max_dt_s)?;
    if c.min_dt_s > c.max_dt_s {
        return Err(ContractError::config_validation(
            "reconstruction.min_dt_s",
            format!(
                "min_dt_s ({}) must be <= max_dt_s ({})",
                c.min_dt_s, c.max_dt_s
            ),
        ));
    }
    unit_interval("reconstruction.accel_smoothing", c.accel_smoothing)?;
    positive("reconstruction.min_speed_mps", c.min_speed_mps)?;
    if c.yaw_min_speed_mps < 0.0 {
        return Err(ContractError::config_validation(
            "reconstruction.yaw_min_speed_mps",
            "must be >= 0",
        ));
    }
    Ok(())
}

/// 校验圈检测配置
fn validate_laps(c: &LapDetectionConfig) -> Result<(), ContractError> {
    positive("laps.start_radius", c.start_radius)?;
    positive("laps.loop_detect_gap", c.loop_detect_gap)?;
    if c.min_speed_mps < 0.0 {
        return Err(ContractError::config_validation(
            "laps.min_speed_mps",
            "must be >= 0",
        ));
    }
    if c.min_gap_samples == 0 {
        return Err(ContractError::config_validation(
            "laps.min_gap_samples",
            "must be >= 1",
        ));
    }
    Ok(())
}

/// 校验赛道融合配置
fn validate_fusion(c: &FusionConfig) -> Result<(), ContractError> {
    if c.resample_count < 2 {
        return Err(ContractError::config_validation(
            "fusion.resample_count",
            format!("must be >= 2, got {}", c.resample_count),
        ));
    }
    positive("fusion.mad_k", c.mad_k)?;
    positive("fusion.mad_scale", c.mad_scale)?;
    positive("fusion.abs_gate", c.abs_gate)?;
    unit_interval("fusion.loop_close_fraction", c.loop_close_fraction)?;
    positive("fusion.loop_min_gap", c.loop_min_gap)?;

    let (low, high) = (c.heat_low_percentile, c.heat_high_percentile);
    if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low > high {
        return Err(ContractError::config_validation(
            "fusion.heat_low_percentile",
            format!("percentiles must satisfy 0 <= low <= high <= 1, got {low} / {high}"),
        ));
    }
    if matches!(&c.reference_car, Some(id) if id.is_empty()) {
        return Err(ContractError::config_validation(
            "fusion.reference_car",
            "must not be empty",
        ));
    }
    Ok(())
}

fn validate_analysis(config: &EngineConfig) -> Result<(), ContractError> {
    if config.analysis.sector_count == 0 {
        return Err(ContractError::config_validation(
            "analysis.sector_count",
            "must be >= 1",
        ));
    }
    Ok(())
}

/// 校验输入模型配置
fn validate_inputs(c: &InputModelConfig) -> Result<(), ContractError> {
    unit_interval("inputs.smoothing", c.smoothing)?;
    unit_interval("inputs.unstable_decay", c.unstable_decay)?;
    positive("inputs.max_long_g", c.max_long_g)?;
    positive("inputs.max_lat_g", c.max_lat_g)?;
    positive("inputs.scale_fraction", c.scale_fraction)?;
    positive("inputs.throttle_floor", c.throttle_floor)?;
    positive("inputs.brake_floor", c.brake_floor)?;
    positive("inputs.steer_floor", c.steer_floor)?;
    positive("inputs.accel_outlier_limit", c.accel_outlier_limit)?;
    Ok(())
}

/// 校验事件检测配置
fn validate_events(c: &EventConfig) -> Result<(), ContractError> {
    positive("events.crash_speed_drop", c.crash_speed_drop)?;
    positive("events.crash_accel", c.crash_accel)?;
    positive("events.collision_accel", c.collision_accel)?;
    if c.collision_speed_drop_min < 0.0
        || c.collision_speed_drop_min >= c.collision_speed_drop_max
    {
        return Err(ContractError::config_validation(
            "events.collision_speed_drop_min",
            format!(
                "collision band must satisfy 0 <= min < max, got {} / {}",
                c.collision_speed_drop_min, c.collision_speed_drop_max
            ),
        ));
    }
    Ok(())
}
