//! Scan controller: walks the paginated achievement UI.
//!
//! The controller enumerates rows tab by tab, classifies each row as
//! completed or not, identifies completed rows through the catalog matcher,
//! and infers scroll position from repeated matches (the UI does not report
//! its own). One logical thread runs the loop; cancellation is a flag polled
//! at row boundaries, so a stop request is observed at most one row late.

mod state;

pub use state::{ScanPhase, ScanState};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::capture::{CaptureRegion, layout, sample_fill_color};
use crate::catalog::{Catalog, MatchResult, similarity};
use crate::config::{ScanConfig, ScanStrategy};
use crate::error::Result;
use crate::input::Navigate;
use crate::ocr::{COMPLETED_LABEL, ExtractText, TextPurpose};

/// Progress notifications emitted while a scan runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Started,
    /// A new achievement was confirmed on the given tab (1..=9).
    Confirmed { page: u8, id: u32, title: Arc<str> },
    /// A completed row could not be identified; it was skipped.
    Unidentified { page: u8, row: u32 },
    /// Tally of achievements confirmed on a tab once it was exhausted.
    PageCompleted { page: u8, newly_completed: u32 },
    /// The controller switched to the given tab.
    PageAdvanced { page: u8 },
    Finished { total: u32 },
    Interrupted { total: u32 },
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Finished,
    Interrupted,
}

/// Result of a completed or interrupted run.
///
/// `achievements` holds confirmed ids in discovery order; it never contains
/// duplicates. Interrupted runs keep whatever was confirmed before the stop.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub achievements: Vec<u32>,
    pub outcome: ScanOutcome,
    pub pages_scanned: u8,
}

/// The scan controller.
pub struct Scanner<C, X, N> {
    catalog: Catalog,
    config: ScanConfig,
    capture: C,
    extractor: X,
    nav: N,
    events: Sender<ScanEvent>,
}

impl<C, X, N> Scanner<C, X, N>
where
    C: CaptureRegion,
    X: ExtractText,
    N: Navigate,
{
    pub fn new(
        catalog: Catalog,
        config: ScanConfig,
        capture: C,
        extractor: X,
        nav: N,
        events: Sender<ScanEvent>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            catalog,
            config,
            capture,
            extractor,
            nav,
            events,
        })
    }

    /// Run the scan to completion or interruption.
    ///
    /// `cancel` is polled at the top of every row iteration. Focus loss and
    /// stop requests end the run gracefully with partial results; capture or
    /// extraction faults abort it with an error and no results.
    pub fn run(&mut self, cancel: &AtomicBool) -> Result<ScanSummary> {
        let mut state = ScanState::new();
        state.phase = ScanPhase::Running;

        self.nav.wake()?;
        info!("Scan started ({} mode)", self.config.strategy);
        self.emit(ScanEvent::Started);

        match self.config.strategy {
            ScanStrategy::Sequential => self.run_sequential(&mut state, cancel)?,
            ScanStrategy::Batched => self.run_batched(&mut state, cancel)?,
        }

        let outcome = match state.phase {
            ScanPhase::Interrupted => ScanOutcome::Interrupted,
            _ => ScanOutcome::Finished,
        };
        let total = state.completed_count;
        match outcome {
            ScanOutcome::Finished => {
                info!("Scan finished: {} achievements confirmed", total);
                self.emit(ScanEvent::Finished { total });
            }
            ScanOutcome::Interrupted => {
                info!("Scan interrupted: {} achievements confirmed so far", total);
                self.emit(ScanEvent::Interrupted { total });
            }
        }

        Ok(ScanSummary {
            achievements: state.confirmed,
            outcome,
            pages_scanned: state.page,
        })
    }

    /// Sequential mode: step one row at a time and treat a repeated match as
    /// the bottom of the page.
    fn run_sequential(&mut self, state: &mut ScanState, cancel: &AtomicBool) -> Result<()> {
        while state.rows_scanned < self.config.row_budget {
            if self.should_stop(cancel) {
                state.phase = ScanPhase::Interrupted;
                return Ok(());
            }

            let slot = layout::visible_slot(state.row_index);

            if !self.row_completed(slot)? {
                debug!("Row {} on tab {} not completed", state.row_index, state.page);
                self.step_row(state)?;
                continue;
            }

            let name = self.read_row_text(slot, TextPurpose::Name)?;
            let Some(matched) = self.resolve_row(&name, slot)? else {
                warn!(
                    "Completed row {} on tab {} could not be identified (ocr: {:?})",
                    state.row_index, state.page, name
                );
                self.emit(ScanEvent::Unidentified {
                    page: state.page,
                    row: state.row_index,
                });
                self.step_row(state)?;
                continue;
            };

            if state.last_id == Some(matched.id) {
                // The cursor re-read the same row: scrolling has stalled at
                // the bottom of this tab's list.
                state.rows_scanned += 1;
                if !self.finish_page(state)? {
                    return Ok(());
                }
                continue;
            }

            self.record_match(state, &matched);
            state.last_id = Some(matched.id);
            self.step_row(state)?;
        }

        warn!(
            "Row budget ({}) exhausted on tab {}; ending scan",
            self.config.row_budget, state.page
        );
        state.phase = ScanPhase::Finished;
        Ok(())
    }

    /// Batched mode: read fixed windows of rows without scroll confirmation
    /// and treat a window with no newly confirmed ids as page exhaustion.
    fn run_batched(&mut self, state: &mut ScanState, cancel: &AtomicBool) -> Result<()> {
        loop {
            let mut newly_confirmed = 0u32;

            for _ in 0..self.config.batch_window {
                if state.rows_scanned >= self.config.row_budget {
                    warn!(
                        "Row budget ({}) exhausted on tab {}; ending scan",
                        self.config.row_budget, state.page
                    );
                    state.phase = ScanPhase::Finished;
                    return Ok(());
                }
                if self.should_stop(cancel) {
                    state.phase = ScanPhase::Interrupted;
                    return Ok(());
                }

                let slot = layout::visible_slot(state.row_index);
                if self.row_completed(slot)? {
                    let name = self.read_row_text(slot, TextPurpose::Name)?;
                    match self.resolve_row(&name, slot)? {
                        Some(matched) => {
                            if self.record_match(state, &matched) {
                                newly_confirmed += 1;
                            }
                        }
                        None => {
                            warn!(
                                "Completed row {} on tab {} could not be identified (ocr: {:?})",
                                state.row_index, state.page, name
                            );
                            self.emit(ScanEvent::Unidentified {
                                page: state.page,
                                row: state.row_index,
                            });
                        }
                    }
                }
                self.step_row(state)?;
            }

            if newly_confirmed == 0 && !self.finish_page(state)? {
                return Ok(());
            }
        }
    }

    /// Close out the current page. Returns false when the scan is over.
    fn finish_page(&mut self, state: &mut ScanState) -> Result<bool> {
        let delta = state.page_delta();
        info!("{} completed achievements in tab {}", delta, state.page);
        self.emit(ScanEvent::PageCompleted {
            page: state.page,
            newly_completed: delta,
        });

        if state.page >= self.config.page_count {
            info!("Scanned all achievement tabs");
            state.phase = ScanPhase::Finished;
            return Ok(false);
        }

        info!("Hit the bottom of tab {}, switching tabs", state.page);
        self.nav.advance_page()?;
        self.nav.reset_row_cursor()?;
        state.start_next_page();
        self.emit(ScanEvent::PageAdvanced { page: state.page });
        self.settle(self.config.page_settle_ms + self.config.tab_load_ms);
        Ok(true)
    }

    /// Advance the cursor one row and account for it.
    fn step_row(&mut self, state: &mut ScanState) -> Result<()> {
        self.nav.advance_row()?;
        state.row_index += 1;
        state.rows_scanned += 1;
        self.settle(self.config.row_settle_ms);
        Ok(())
    }

    fn record_match(&mut self, state: &mut ScanState, matched: &MatchResult) -> bool {
        if !state.confirm(matched.id) {
            debug!("Achievement {} already recorded, skipping", matched.id);
            return false;
        }
        info!(
            "Achievement: {} | with id: {} is completed",
            matched.title, matched.id
        );
        self.emit(ScanEvent::Confirmed {
            page: state.page,
            id: matched.id,
            title: matched.title.clone(),
        });
        true
    }

    fn should_stop(&self, cancel: &AtomicBool) -> bool {
        if cancel.load(Ordering::SeqCst) {
            info!("Stop requested, interrupting scan");
            return true;
        }
        if !self.nav.is_focused() {
            warn!("Game window lost focus, interrupting scan");
            return true;
        }
        false
    }

    /// Completion check for the row in the given slot.
    ///
    /// The claim-color sample short-circuits the check so the expensive OCR
    /// path only runs for rows without a claimed badge.
    fn row_completed(&self, slot: usize) -> Result<bool> {
        let frame = self.capture.capture(&layout::completion_region(slot))?;

        let fill = sample_fill_color(&frame, &layout::CLAIM_SWATCH);
        if fill.distance(self.config.claimed_color) <= self.config.claim_color_tolerance {
            return Ok(true);
        }

        let label = self.extractor.extract(&frame, TextPurpose::CompletionLabel)?;
        Ok(similarity(label.trim(), COMPLETED_LABEL) >= self.config.completion_label_floor)
    }

    fn read_row_text(&self, slot: usize, purpose: TextPurpose) -> Result<String> {
        let region = match purpose {
            TextPurpose::Name => layout::name_region(slot),
            TextPurpose::Description => layout::description_region(slot),
            TextPurpose::CompletionLabel => layout::completion_region(slot),
        };
        let frame = self.capture.capture(&region)?;
        self.extractor.extract(&frame, purpose)
    }

    fn resolve_row(&self, name: &str, slot: usize) -> Result<Option<MatchResult>> {
        let capture = &self.capture;
        let extractor = &self.extractor;
        self.catalog.resolve(
            name,
            || {
                let frame = capture.capture(&layout::description_region(slot))?;
                extractor.extract(&frame, TextPurpose::Description)
            },
            self.config.match_floor,
        )
    }

    fn emit(&self, event: ScanEvent) {
        // A dropped receiver only loses progress display, never the scan.
        let _ = self.events.send(event);
    }

    fn settle(&self, ms: u64) {
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }
}
