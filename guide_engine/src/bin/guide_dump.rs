//! Guide dump tool
//!
//! Loads a JSON guide fixture into the in-memory provider, lays it out for
//! one window and prints the resulting guide snapshot as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin guide-dump -- fixtures/sample_guide.json 2023111507
//! # single-channel week view
//! GUIDE_CHANNEL=1 cargo run --bin guide-dump -- fixtures/sample_guide.json 23111507
//! ```
//!
//! # Environment Variables
//!
//! - `GUIDE_CONFIG`: Path to a guide TOML file (default: searched in the usual locations)
//! - `GUIDE_CHANNEL`: Channel id for a single-channel layout
//! - `GUIDE_MODE`: Overrides the configured guide mode (`all`, `sequential`, `minimum`)
//! - `VIEWPORT`: `WIDTHxHEIGHT` of the simulated viewport in pixels (default: 1280x720)
//! - `GUIDE_WATCH`: When set, keep refreshing reservations at the configured
//!   interval until Ctrl-C, then print the snapshot again
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use epg_guide::config::GuideConfig;
use epg_guide::layout::Viewport;
use epg_guide::models::{parse_start_time, GuideRequest};
use epg_guide::providers::{ConfigSettings, LocalProvider};
use epg_guide::services::{run_configured_refresh, GuideOrchestrator};
use tokio::sync::{watch, Mutex};

const COLUMN_WIDTH: f64 = 150.0;
const MINUTE_HEIGHT: f64 = 3.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let fixture_path = args
        .next()
        .ok_or_else(|| anyhow!("usage: guide-dump <fixture.json> [YYMMDDhh|YYYYMMDDhh]"))?;
    let start_arg = args.next();

    let config = match env::var("GUIDE_CONFIG") {
        Ok(path) => GuideConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        Err(_) => GuideConfig::from_default_location().unwrap_or_else(|e| {
            warn!("Using default guide configuration: {}", e);
            GuideConfig::default()
        }),
    };

    let json = std::fs::read_to_string(&fixture_path)
        .with_context(|| format!("failed to read fixture {}", fixture_path))?;
    let provider = LocalProvider::from_json_str(&json)?;
    info!(
        "Loaded {} channels from {}",
        provider.channel_count(),
        fixture_path
    );

    let start = match start_arg {
        Some(value) => parse_start_time(&value, config.utc_offset()?)?,
        None => chrono::Utc::now().timestamp_millis(),
    };

    let request = match env::var("GUIDE_CHANNEL") {
        Ok(id) => {
            let channel_id: i64 = id
                .parse()
                .with_context(|| format!("GUIDE_CHANNEL is not a channel id: {}", id))?;
            GuideRequest::single_channel(channel_id, start, config.guide.single_channel_days)
        }
        Err(_) => GuideRequest::multi_channel(start, config.guide.default_length_hours),
    };

    let (max_width, max_height) = viewport_size()?;
    let settings = Arc::new(ConfigSettings::new(&config));
    let mut guide = GuideOrchestrator::new(config, Arc::new(provider), settings)?;

    guide.load(request).await?;
    guide.update_viewport(Viewport {
        offset_width: 0.0,
        offset_height: 0.0,
        base_column_width: COLUMN_WIDTH,
        base_row_height_per_minute: MINUTE_HEIGHT,
        max_width,
        max_height,
    });

    info!(
        "Laid out {} cells, {} visible (mode={})",
        guide.cells().len(),
        guide.cells().iter().filter(|c| c.is_visible()).count(),
        guide.guide_mode()
    );

    println!("{}", serde_json::to_string_pretty(&guide.snapshot()?)?);

    if env::var("GUIDE_WATCH").is_err() {
        return Ok(());
    }

    let guide = Arc::new(Mutex::new(guide));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher = tokio::spawn(run_configured_refresh(Arc::clone(&guide), shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    info!("Shutting down reservation refresh");
    let _ = shutdown_tx.send(true);
    let applied = refresher.await?;
    info!("{} reservation refreshes applied", applied);

    let guide = guide.lock().await;
    println!("{}", serde_json::to_string_pretty(&guide.snapshot()?)?);
    Ok(())
}

fn viewport_size() -> anyhow::Result<(f64, f64)> {
    let Ok(value) = env::var("VIEWPORT") else {
        return Ok((1280.0, 720.0));
    };
    let Some((w, h)) = value.split_once('x') else {
        bail!("VIEWPORT must look like 1280x720, got {}", value);
    };
    Ok((w.trim().parse()?, h.trim().parse()?))
}
