//! Scan command: drive a full achievement scan.
//!
//! The scan loop runs on the main thread; a consumer thread drains progress
//! events into per-tab tallies and the Ctrl+C handler flips the shared
//! cancellation flag, which the loop observes at the next row boundary.

use std::fs::{self, File};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use tracing::{error, info, warn};

use chivescan_core::config::timing;
use chivescan_core::{
    GameWindow, KeyNavigator, OcrBackend, ScanConfig, ScanEvent, ScanOutcome, ScanStrategy,
    Scanner, TesseractExtractor,
};

use crate::cli::ScanArgs;
use crate::commands::catalog::load_catalog;

pub fn run(args: ScanArgs) -> Result<()> {
    let strategy: ScanStrategy = args.strategy.parse().map_err(|_| {
        anyhow!(
            "Invalid strategy: {}. Use sequential or batched",
            args.strategy
        )
    })?;
    let ocr_backend: OcrBackend = args
        .ocr
        .parse()
        .map_err(|_| anyhow!("Invalid OCR backend: {}. Use tesseract", args.ocr))?;

    let config = ScanConfig {
        row_settle_ms: timing::ROW_SETTLE_MS + args.scan_delay,
        page_settle_ms: timing::PAGE_SETTLE_MS + args.nav_delay,
        debug_captures: args.debug_captures.clone(),
        ocr_backend,
        language: args.lang.clone(),
        strategy,
        match_floor: args.match_floor,
        ..Default::default()
    };

    if let Some(dir) = &config.debug_captures {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create debug capture directory {:?}", dir))?;
        info!("Debug captures will be saved to {}", dir.display());
    }

    // Load the catalog before touching the game; no catalog, no scan.
    let catalog = load_catalog(args.catalog_file.as_deref(), &args.catalog_url)?;
    info!("Loaded {} achievement records", catalog.len());

    let game = GameWindow::find()?;
    if !game.is_english() {
        error!("Non-English game client detected. The scanner only reads English text");
    }
    game.ensure_supported()?;
    info!("Found game window (aspect ratio {})", game.aspect_ratio());

    let capture = game.capturer(config.debug_captures.clone());
    let extractor = TesseractExtractor::new(config.ocr_backend, &config.language)?;
    let nav = KeyNavigator::new();

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            cancel.store(true, Ordering::SeqCst);
        })
        .context("Failed to install Ctrl+C handler")?;
    }

    let (events_tx, events_rx) = mpsc::channel();
    let tally_thread = thread::spawn(move || consume_events(events_rx));

    info!("Scanning starting... (Ctrl+C stops and keeps partial results)");
    let mut scanner = Scanner::new(catalog, config, capture, extractor, nav, events_tx)?;
    let result = scanner.run(&cancel);
    drop(scanner); // closes the event channel

    if let Err(e) = tally_thread.join() {
        warn!("Progress thread panicked: {:?}", e);
    }

    let summary = result.map_err(|e| {
        anyhow!(
            "Scan aborted: {e}. Try increasing --scan-delay/--nav-delay, or run the game \
             windowed at a 16:9 resolution"
        )
    })?;

    // Persist the result list; everything else about the run is transient.
    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory {:?}", args.output))?;
    let file_name = format!("ScanData_{}.json", Local::now().format("%Y%m%d_%H%M%S"));
    let path = args.output.join(file_name);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create result file {:?}", path))?;
    serde_json::to_writer_pretty(
        file,
        &serde_json::json!({ "achievements": summary.achievements }),
    )?;
    info!(
        "{} achievements saved to {}",
        summary.achievements.len(),
        path.display()
    );

    match summary.outcome {
        ScanOutcome::Finished => info!("Scanning complete!"),
        ScanOutcome::Interrupted => warn!("Scan interrupted; partial results were saved"),
    }
    Ok(())
}

/// Drain progress events into per-tab tallies until the channel closes.
fn consume_events(events: Receiver<ScanEvent>) {
    let mut tallies = [0u32; 9];

    for event in events {
        match event {
            ScanEvent::Started => {}
            ScanEvent::Confirmed { page, id, title } => {
                match tallies.get_mut((page as usize).wrapping_sub(1)) {
                    Some(slot) => *slot += 1,
                    None => error!("Progress event with tab {} outside 1-9", page),
                }
                info!("[tab {}] {} (id {})", page, title, id);
            }
            ScanEvent::Unidentified { page, row } => {
                warn!("[tab {}] row {} could not be identified", page, row);
            }
            ScanEvent::PageCompleted {
                page,
                newly_completed,
            } => {
                info!("{} completed achievements in tab {}", newly_completed, page);
            }
            ScanEvent::PageAdvanced { page } => info!("Switching to tab {}", page),
            ScanEvent::Finished { total } => info!("Scan finished: {} achievements", total),
            ScanEvent::Interrupted { total } => {
                warn!("Scan interrupted: {} achievements confirmed", total);
            }
        }
    }

    info!(
        "Per-tab tallies: {}",
        tallies
            .iter()
            .enumerate()
            .map(|(i, count)| format!("{}:{}", i + 1, count))
            .collect::<Vec<_>>()
            .join(" ")
    );
}
