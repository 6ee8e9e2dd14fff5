//! vigild - motion incident daemon
//!
//! 1. Builds frame sources from the configured camera URLs
//! 2. Runs the per-tick pipeline (background update, motion check, clip
//!    bookkeeping) until every camera is exhausted or Ctrl-C arrives
//! 3. Force-flushes open incidents on shutdown
//! 4. Prints the incident log, optionally exporting it as JSON

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use vigil::{
    ClipStorage, FrameSource, IncidentLog, IncidentManager, MjpegClipWriter, Recording,
    SyntheticSource, TickStatus, VigilConfig,
};

#[derive(Parser, Debug)]
#[command(name = "vigild", about = "Per-camera motion incident daemon")]
struct Args {
    /// Path to a JSON config file (also read from VIGIL_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera source URL; repeat for multiple cameras. Overrides the
    /// configured list.
    #[arg(long = "camera")]
    cameras: Vec<String>,

    /// Record incident clips to disk
    #[arg(long)]
    record: bool,

    /// Output subdirectory name under Out/
    #[arg(long)]
    output_dir: Option<String>,

    /// Write the incident log to this file as JSON at end of run
    #[arg(long)]
    export_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = VigilConfig::load(args.config.as_deref())?;
    if !args.cameras.is_empty() {
        cfg.cameras = args.cameras.clone();
    }
    if args.record {
        cfg.record_incidents = true;
    }
    if args.output_dir.is_some() {
        cfg.output_directory = args.output_dir.clone();
    }

    let sources = build_sources(&cfg)?;
    let recording = if cfg.record_incidents {
        let root = ClipStorage::resolve_root(cfg.output_directory.as_deref());
        let storage = ClipStorage::create(root, sources.len())?;
        log::info!("recording incident clips under {}", storage.root().display());
        Some(Recording {
            storage,
            writer: Box::new(MjpegClipWriter::new()),
        })
    } else {
        None
    };

    let mut manager = IncidentManager::new(&cfg, sources, IncidentLog::new(), recording);
    log::info!(
        "vigild running: {} camera(s), recording {}",
        manager.active_camera_count(),
        if cfg.record_incidents { "on" } else { "off" }
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::SeqCst);
        })
        .context("error setting Ctrl-C handler")?;
    }

    loop {
        if shutdown.load(Ordering::SeqCst) {
            log::info!("shutdown signal received, flushing open incidents");
            manager.force_flush_all();
            break;
        }
        match manager.tick() {
            TickStatus::Running => {}
            TickStatus::Exhausted => {
                log::info!("all cameras exhausted, stopping");
                break;
            }
        }
    }

    let incidents = manager.into_incident_log();
    println!("{incidents}");

    if let Some(path) = args.export_json {
        std::fs::write(&path, incidents.to_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("incident log exported to {}", path.display());
    }

    Ok(())
}

fn build_sources(cfg: &VigilConfig) -> Result<Vec<Box<dyn FrameSource>>> {
    cfg.cameras
        .iter()
        .map(|url| {
            if url.starts_with("stub://") {
                let source = SyntheticSource::from_url(url)?;
                log::info!("camera source: {} (synthetic)", source.name());
                Ok(Box::new(source) as Box<dyn FrameSource>)
            } else {
                Err(anyhow!(
                    "unsupported camera source '{url}': only stub:// sources are built in"
                ))
            }
        })
        .collect()
}
