// src/main.rs

mod analysis;
mod config;
mod pipeline;
mod track_log;
mod types;

use analysis::OccupancyReport;
use anyhow::Result;
use pipeline::{PresenceEvent, TickContext, TickPipeline};
use std::path::Path;
use track_log::LogTicks;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use types::Config;

fn main() -> Result<()> {
    let config = Config::load("config.yaml")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("footfall={}", config.logging.level)))
        .init();

    info!("🎥 Footfall Occupancy Tracker Starting");
    info!("✓ Configuration loaded");
    info!(
        "Replay settings: input_dir={}, min_confidence={:.2}, classes={:?}",
        config.replay.input_dir, config.replay.min_confidence, config.replay.person_class_ids
    );

    let logs = track_log::find_log_files(&config.replay.input_dir)?;
    if logs.is_empty() {
        error!("No track logs found in {}", config.replay.input_dir);
        return Ok(());
    }

    info!("Found {} track log(s) to replay", logs.len());

    for (idx, path) in logs.iter().enumerate() {
        info!("\n========================================");
        info!("Replaying log {}/{}: {}", idx + 1, logs.len(), path.display());
        info!("========================================\n");

        if let Err(err) = replay_log(path, &config) {
            error!("Failed to replay {}: {:#}", path.display(), err);
        }
    }

    Ok(())
}

/// Run every tick of one recorded log through a fresh pipeline,
/// strictly one tick at a time, then log the session summary.
fn replay_log(path: &Path, config: &Config) -> Result<()> {
    let mut ticks = LogTicks::open(path)?;
    let mut pipeline = TickPipeline::new(config);
    let mut completed_visits = 0u64;
    let mut completed_stay_s = 0.0f64;

    while let Some(raw) = ticks.next_tick()? {
        let tick_id = raw.frame_id;
        let ctx = match TickContext::from_raw(raw, &config.replay) {
            Ok(ctx) => ctx,
            Err(err) => {
                pipeline.record_rejected(&err, tick_id);
                continue;
            }
        };

        // A rejected tick is already counted and logged; keep replaying.
        let _ = pipeline.process(&ctx);

        for event in pipeline.drain_events() {
            if let PresenceEvent::PersonDeparted { stay_s, .. } = event {
                completed_visits += 1;
                completed_stay_s += stay_s;
            }
        }
    }

    if ticks.skipped_lines() > 0 {
        warn!(
            "⚠️  {} malformed line(s) skipped in {}",
            ticks.skipped_lines(),
            path.display()
        );
    }

    let summary = pipeline.metrics().summary();
    info!("\n✓ Replay complete!");
    info!(
        "  Ticks: {} applied, {} rejected ({:.0} ticks/s)",
        summary.ticks_processed,
        summary.ticks_rejected,
        pipeline.metrics().ticks_per_sec()
    );
    info!(
        "  Transitions: {} arrivals, {} reappearances, {} departures",
        summary.arrivals, summary.reappearances, summary.departures
    );
    info!("  Peak simultaneous visitors: {}", summary.peak_present);
    if summary.evictions > 0 {
        info!("  Records evicted by retention: {}", summary.evictions);
    }

    if completed_visits > 0 {
        info!(
            "  Completed visits: {} (average stay {:.1}s)",
            completed_visits,
            completed_stay_s / completed_visits as f64
        );
    }

    let report = OccupancyReport::new(pipeline.registry(), config.report.utc_offset_hours);
    info!("  🔢 Total Visitors Detected: {}", report.total_count());
    for row in report.recent(config.report.recent_count) {
        info!("  {}", row.line());
    }

    Ok(())
}
