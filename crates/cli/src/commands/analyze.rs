//! `analyze` command implementation.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use config_loader::ConfigLoader;
use contracts::{CarRecord, EngineConfig, SessionSummary, TelemetryBundle};
use observability::AnalysisMetricsAggregator;
use race_engine::{format_delta, format_lap_time, sector_deltas, DeltaReference, RaceSession};

use crate::cli::AnalyzeArgs;
use crate::error::CliError;

/// Full analysis report for JSON output
#[derive(Serialize)]
struct AnalysisReport {
    telemetry: String,
    summary: SessionSummary,
    cars: Vec<CarReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    events: Vec<EventReport>,
}

#[derive(Serialize)]
struct CarReport {
    id: String,
    lap_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    best_lap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ideal_lap: Option<String>,
    laps: Vec<LapReport>,
}

#[derive(Serialize)]
struct LapReport {
    lap_number: usize,
    lap_time_ms: f64,
    lap_time: String,
    delta_to_best: String,
    sector_times: Vec<String>,
    sector_deltas: Vec<String>,
}

#[derive(Serialize)]
struct EventReport {
    car: String,
    kind: String,
    lap_number: usize,
    elapsed: String,
    label: String,
}

/// Execute the `analyze` command
pub async fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let config = load_config(args)?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    info!(telemetry = %args.telemetry.display(), "Loading telemetry");

    let bundle = tokio::select! {
        result = load_bundle(&args.telemetry) => result
            .with_context(|| format!("Failed to load telemetry from {}", args.telemetry.display()))?,
        _ = shutdown_signal() => {
            warn!("Received shutdown signal while loading telemetry");
            return Err(CliError::interrupted(&args.telemetry).into());
        }
    };

    info!(cars = bundle.cars.len(), "Telemetry loaded");

    let mut session = RaceSession::from_bundle(bundle, config);

    if let Some(ref path) = args.master_track {
        let track = ConfigLoader::load_master_track(path)
            .with_context(|| format!("Failed to load master track from {}", path.display()))?;
        info!(points = track.len(), "Using persisted master track");
        session.load_master_track(track);
    }

    let started = Instant::now();
    let session = tokio::task::spawn_blocking(move || {
        session.recompute();
        session
    })
    .await
    .context("Analysis task failed")?;
    observability::record_recompute_duration_ms(started.elapsed().as_secs_f64() * 1000.0);

    let report = build_report(&session, args);

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        print_report(&report, &session);
    }

    info!("Analysis finished");
    Ok(())
}

/// Configuration from file (or defaults) with command-line overrides applied
fn load_config(args: &AnalyzeArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::input_not_found(path).into());
            }
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if let Some(race_type) = args.race_type {
        info!(race_type = ?race_type, "Overriding race type from CLI");
        config.race_type = Some(race_type.into());
    }
    if let Some(sectors) = args.sectors {
        config.analysis.sector_count = sectors;
    }
    if let Some(ref car) = args.reference_car {
        config.fusion.reference_car = Some(car.as_str().into());
    }

    ConfigLoader::validate(&config).context("Invalid command-line override")?;
    Ok(config)
}

/// Read and decode a telemetry bundle
pub(crate) async fn load_bundle(path: &Path) -> crate::error::Result<TelemetryBundle> {
    if !path.exists() {
        return Err(CliError::input_not_found(path));
    }
    let bytes = tokio::fs::read(path).await?;
    serde_json::from_slice(&bytes).map_err(|e| CliError::telemetry_decode(path, e))
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn build_report(session: &RaceSession, args: &AnalyzeArgs) -> AnalysisReport {
    let cars = session.cars().iter().map(car_report).collect();

    let events = if args.events {
        session
            .cars()
            .iter()
            .flat_map(|car| car.events.iter().map(move |e| (car, e)))
            .map(|(car, event)| {
                let first = car.first_timestamp_ms().unwrap_or(0.0);
                let ts = car
                    .samples
                    .get(event.sample_index)
                    .map(|s| s.timestamp_ms)
                    .unwrap_or(first);
                EventReport {
                    car: car.id.to_string(),
                    kind: event.kind.to_string(),
                    lap_number: event.lap_number,
                    elapsed: format_lap_time(ts - first),
                    label: event.label.clone(),
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    AnalysisReport {
        telemetry: args.telemetry.display().to_string(),
        summary: session.summary(),
        cars,
        events,
    }
}

fn car_report(car: &CarRecord) -> CarReport {
    let Some(analysis) = &car.lap_analysis else {
        return CarReport {
            id: car.id.to_string(),
            lap_count: 0,
            best_lap: None,
            ideal_lap: None,
            laps: Vec::new(),
        };
    };

    let deltas = sector_deltas(analysis, DeltaReference::BestSector);
    let laps = analysis
        .laps
        .iter()
        .zip(&deltas)
        .enumerate()
        .map(|(i, (lap, delta))| LapReport {
            lap_number: i + 1,
            lap_time_ms: lap.lap_time_ms,
            lap_time: format_lap_time(lap.lap_time_ms),
            delta_to_best: format_delta(delta.lap_delta_ms),
            sector_times: lap.sector_times_ms.iter().map(|t| format_lap_time(*t)).collect(),
            sector_deltas: delta.sector_deltas_ms.iter().map(|d| format_delta(*d)).collect(),
        })
        .collect();

    CarReport {
        id: car.id.to_string(),
        lap_count: analysis.laps.len(),
        best_lap: Some(format!(
            "Lap {} ({})",
            analysis.best_lap_index + 1,
            format_lap_time(analysis.best_lap_time_ms)
        )),
        ideal_lap: Some(format_lap_time(analysis.ideal_lap_time_ms())),
        laps,
    }
}

fn print_report(report: &AnalysisReport, session: &RaceSession) {
    let summary = &report.summary;
    let master = session.master_track();

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Race Telemetry Analysis                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🏁 Session");
    println!("   ├─ Telemetry: {}", report.telemetry);
    println!("   ├─ Race type: {}", summary.race_type);
    println!(
        "   ├─ Master track: {} points, {:.1} m ({:?})",
        summary.master_points, summary.master_length, master.origin
    );
    match summary.master_mean_confidence {
        Some(confidence) => println!("   └─ Mean confidence: {:.3}", confidence),
        None => println!("   └─ Mean confidence: N/A"),
    }

    println!("\n🚗 Cars ({})", report.cars.len());
    for (i, car) in report.cars.iter().enumerate() {
        let is_last = i == report.cars.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!("   {} {} ({} laps)", prefix, car.id, car.lap_count);
        if let Some(ref best) = car.best_lap {
            println!("   {}  ├─ Best: {}", child_prefix, best);
        }
        if let Some(ref ideal) = car.ideal_lap {
            println!("   {}  ├─ Ideal: {}", child_prefix, ideal);
        }
        for (j, lap) in car.laps.iter().enumerate() {
            let lap_prefix = if j == car.laps.len() - 1 { "└─" } else { "├─" };
            println!(
                "   {}  {} Lap {:>2}  {}  {:>8}  [{}]",
                child_prefix,
                lap_prefix,
                lap.lap_number,
                lap.lap_time,
                lap.delta_to_best,
                lap.sector_deltas.join(" ")
            );
        }
    }

    if !report.events.is_empty() {
        println!("\n⚠️  Events ({})", report.events.len());
        for event in &report.events {
            println!("   {} [{}] {}", event.elapsed, event.car, event.label);
        }
    }

    let mut aggregator = AnalysisMetricsAggregator::new();
    aggregator.update(summary);
    println!("\n{}", aggregator.summary());
}
