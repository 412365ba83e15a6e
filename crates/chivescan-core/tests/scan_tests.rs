//! Integration tests for the scan controller.
//!
//! These drive full scans against the scripted mock game. Matcher-level
//! behavior is covered by unit tests inside the crate.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc;

use chivescan_core::mock::{MockGame, ScriptedRow, mock_collaborators};
use chivescan_core::{
    AchievementRecord, Catalog, Error, Result, Rgb, ScanConfig, ScanEvent, ScanOutcome,
    ScanStrategy, ScanSummary, Scanner,
};

fn catalog(entries: &[(u32, &str, &str)]) -> Catalog {
    Catalog::from_records(
        entries
            .iter()
            .map(|(id, title, desc)| AchievementRecord::new(*id, title, desc))
            .collect(),
    )
    .unwrap()
}

/// Config with no settle delays so tests run instantly.
fn test_config(page_count: u8) -> ScanConfig {
    ScanConfig {
        row_settle_ms: 0,
        page_settle_ms: 0,
        tab_load_ms: 0,
        page_count,
        ..Default::default()
    }
}

fn run_scan(
    game: &Rc<RefCell<MockGame>>,
    catalog: Catalog,
    config: ScanConfig,
) -> (Result<ScanSummary>, Vec<ScanEvent>) {
    let (capture, extractor, nav) = mock_collaborators(game);
    let (tx, rx) = mpsc::channel();
    let mut scanner = Scanner::new(catalog, config, capture, extractor, nav, tx).unwrap();
    let cancel = AtomicBool::new(false);
    let result = scanner.run(&cancel);
    drop(scanner);
    (result, rx.try_iter().collect())
}

mod sequential_mode {
    use super::*;

    #[test]
    fn repeated_match_marks_the_page_boundary() {
        // Three completed rows; the fourth read repeats the third because the
        // list cannot scroll further.
        let game = MockGame::new(vec![vec![
            ScriptedRow::claimed("Endure", "survive"),
            ScriptedRow::claimed("Brave", "charge"),
            ScriptedRow::claimed("Clever", "think"),
        ]]);
        let catalog = catalog(&[
            (1, "Endure", "survive"),
            (2, "Brave", "charge"),
            (3, "Clever", "think"),
        ]);

        let (result, events) = run_scan(&game, catalog, test_config(1));
        let summary = result.unwrap();

        assert_eq!(summary.achievements, vec![1, 2, 3]);
        assert_eq!(summary.outcome, ScanOutcome::Finished);
        assert!(events.contains(&ScanEvent::PageCompleted {
            page: 1,
            newly_completed: 3
        }));
        assert!(events.contains(&ScanEvent::Finished { total: 3 }));
    }

    #[test]
    fn walks_every_tab_and_finishes() {
        let game = MockGame::new(vec![
            vec![
                ScriptedRow::claimed("Endure", "survive"),
                ScriptedRow::claimed("Brave", "charge"),
            ],
            vec![ScriptedRow::claimed("Clever", "think")],
        ]);
        let catalog = catalog(&[
            (1, "Endure", "survive"),
            (2, "Brave", "charge"),
            (3, "Clever", "think"),
        ]);

        let (result, events) = run_scan(&game, catalog, test_config(2));
        let summary = result.unwrap();

        assert_eq!(summary.achievements, vec![1, 2, 3]);
        assert_eq!(summary.pages_scanned, 2);
        assert!(events.contains(&ScanEvent::PageAdvanced { page: 2 }));

        let state = game.borrow();
        assert_eq!(state.wake_calls, 1);
        assert_eq!(state.page_switches, 1);
        assert_eq!(state.cursor_resets, 1);

        // Confirmation events carry the tab they were found on.
        let pages: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::Confirmed { page, .. } => Some(*page),
                _ => None,
            })
            .collect();
        assert_eq!(pages, vec![1, 1, 2]);
    }

    #[test]
    fn uncompleted_rows_never_reach_the_matcher() {
        let game = MockGame::new(vec![vec![
            ScriptedRow::uncompleted("Hidden"),
            ScriptedRow::claimed("Endure", "survive"),
            ScriptedRow::claimed("Brave", "charge"),
        ]]);
        let catalog = catalog(&[(1, "Endure", "survive"), (2, "Brave", "charge")]);

        let (result, _) = run_scan(&game, catalog, test_config(1));
        let summary = result.unwrap();

        assert_eq!(summary.achievements, vec![1, 2]);
        let state = game.borrow();
        // Names were read for the two completed rows plus the boundary
        // re-read; the uncompleted row cost no name extraction.
        assert_eq!(state.name_extractions, 3);
        // Only the uncompleted row needed the OCR completion label.
        assert_eq!(state.label_extractions, 1);
    }

    #[test]
    fn claim_color_short_circuits_the_label_ocr() {
        let game = MockGame::new(vec![vec![
            ScriptedRow::claimed("Endure", "survive"),
            ScriptedRow::claimed("Brave", "charge"),
        ]]);
        let catalog = catalog(&[(1, "Endure", "survive"), (2, "Brave", "charge")]);

        let (result, _) = run_scan(&game, catalog, test_config(1));
        assert_eq!(result.unwrap().achievements, vec![1, 2]);
        assert_eq!(game.borrow().label_extractions, 0);
    }

    #[test]
    fn claim_color_matches_within_the_distance_tolerance() {
        // The mock paints (158, 109, 95); a reference a few units away must
        // still short-circuit.
        let game = MockGame::new(vec![vec![ScriptedRow::claimed("Endure", "survive")]]);
        let config = ScanConfig {
            claimed_color: Rgb::new(160, 110, 97),
            ..test_config(1)
        };

        let (result, _) = run_scan(&game, catalog(&[(1, "Endure", "survive")]), config);
        assert_eq!(result.unwrap().achievements, vec![1]);
        assert_eq!(game.borrow().label_extractions, 0);
    }

    #[test]
    fn completed_label_text_is_recognized_without_claim_color() {
        let game = MockGame::new(vec![vec![ScriptedRow::completed("Endure", "survive")]]);
        let catalog = catalog(&[(1, "Endure", "survive")]);

        let (result, _) = run_scan(&game, catalog, test_config(1));
        assert_eq!(result.unwrap().achievements, vec![1]);
        assert!(game.borrow().label_extractions >= 1);
    }

    #[test]
    fn unidentified_rows_are_skipped_not_fatal() {
        let game = MockGame::new(vec![vec![
            ScriptedRow::claimed("Xyzzyx", "gibberish"),
            ScriptedRow::claimed("Endure", "survive"),
        ]]);
        let catalog = catalog(&[(1, "Endure", "survive")]);

        let (result, events) = run_scan(&game, catalog, test_config(1));
        let summary = result.unwrap();

        assert_eq!(summary.achievements, vec![1]);
        assert!(events.contains(&ScanEvent::Unidentified { page: 1, row: 0 }));
    }

    #[test]
    fn output_never_contains_a_repeated_id() {
        // The same achievement is visible on both tabs.
        let game = MockGame::new(vec![
            vec![ScriptedRow::claimed("Endure", "survive")],
            vec![
                ScriptedRow::claimed("Endure", "survive"),
                ScriptedRow::claimed("Brave", "charge"),
            ],
        ]);
        let catalog = catalog(&[(1, "Endure", "survive"), (2, "Brave", "charge")]);

        let (result, _) = run_scan(&game, catalog, test_config(2));
        let summary = result.unwrap();

        assert_eq!(summary.achievements, vec![1, 2]);
        let mut deduped = summary.achievements.clone();
        deduped.dedup();
        assert_eq!(deduped, summary.achievements);
    }
}

mod interruption {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn preset_cancel_flag_stops_before_the_first_row() {
        let game = MockGame::new(vec![vec![ScriptedRow::claimed("Endure", "survive")]]);
        let (capture, extractor, nav) = mock_collaborators(&game);
        let (tx, rx) = mpsc::channel();
        let mut scanner = Scanner::new(
            catalog(&[(1, "Endure", "survive")]),
            test_config(1),
            capture,
            extractor,
            nav,
            tx,
        )
        .unwrap();

        let cancel = AtomicBool::new(false);
        cancel.store(true, Ordering::SeqCst);
        let summary = scanner.run(&cancel).unwrap();
        drop(scanner);

        assert_eq!(summary.outcome, ScanOutcome::Interrupted);
        assert!(summary.achievements.is_empty());
        let events: Vec<_> = rx.try_iter().collect();
        assert!(events.contains(&ScanEvent::Interrupted { total: 0 }));
    }

    #[test]
    fn focus_loss_keeps_partial_results() {
        let game = MockGame::new(vec![vec![
            ScriptedRow::claimed("Endure", "survive"),
            ScriptedRow::claimed("Brave", "charge"),
            ScriptedRow::claimed("Clever", "think"),
        ]]);
        game.borrow_mut().lose_focus_after = Some(2);
        let catalog = catalog(&[
            (1, "Endure", "survive"),
            (2, "Brave", "charge"),
            (3, "Clever", "think"),
        ]);

        let (result, _) = run_scan(&game, catalog, test_config(1));
        let summary = result.unwrap();

        assert_eq!(summary.outcome, ScanOutcome::Interrupted);
        assert_eq!(summary.achievements, vec![1, 2]);
    }

    #[test]
    fn capture_fault_aborts_without_partial_results() {
        let game = MockGame::new(vec![vec![
            ScriptedRow::claimed("Endure", "survive"),
            ScriptedRow::claimed("Brave", "charge"),
        ]]);
        game.borrow_mut().fail_capture_after = Some(3);
        let catalog = catalog(&[(1, "Endure", "survive"), (2, "Brave", "charge")]);

        let (result, _) = run_scan(&game, catalog, test_config(1));
        assert!(matches!(result, Err(Error::Capture { .. })));
    }
}

mod termination {
    use super::*;

    #[test]
    fn budget_bounds_a_stalled_scan() {
        // A single uncompleted row that never matches: the cursor stalls and
        // nothing ever confirms, so only the budget can end the run.
        let game = MockGame::new(vec![vec![ScriptedRow::uncompleted("Hidden")]]);
        let config = ScanConfig {
            row_budget: 10,
            ..test_config(1)
        };

        let (result, _) = run_scan(&game, catalog(&[(1, "Endure", "survive")]), config);
        let summary = result.unwrap();

        assert_eq!(summary.outcome, ScanOutcome::Finished);
        assert!(summary.achievements.is_empty());
        assert_eq!(game.borrow().row_steps, 10);
    }

    #[test]
    fn budget_bounds_a_batched_scan() {
        // Every window keeps confirming fresh rows, so only the budget can
        // end the run.
        let rows: Vec<ScriptedRow> = (0..20)
            .map(|i| ScriptedRow::claimed(&format!("Feat {i:02}"), "d"))
            .collect();
        let game = MockGame::new(vec![rows]);
        let records = (0..20u32)
            .map(|i| AchievementRecord::new(i + 1, &format!("Feat {i:02}"), "d"))
            .collect();
        let catalog = Catalog::from_records(records).unwrap();
        let config = ScanConfig {
            strategy: ScanStrategy::Batched,
            row_budget: 12,
            ..test_config(1)
        };

        let (result, _) = run_scan(&game, catalog, config);
        let summary = result.unwrap();
        assert_eq!(summary.outcome, ScanOutcome::Finished);
        assert_eq!(summary.achievements.len(), 12);
        assert_eq!(game.borrow().row_steps, 12);
    }
}

mod batched_mode {
    use super::*;

    #[test]
    fn empty_window_marks_the_page_boundary() {
        let game = MockGame::new(vec![
            vec![
                ScriptedRow::claimed("Endure", "survive"),
                ScriptedRow::claimed("Brave", "charge"),
                ScriptedRow::uncompleted("Hidden"),
            ],
            vec![ScriptedRow::claimed("Clever", "think")],
        ]);
        let catalog = catalog(&[
            (1, "Endure", "survive"),
            (2, "Brave", "charge"),
            (3, "Clever", "think"),
        ]);
        let config = ScanConfig {
            strategy: ScanStrategy::Batched,
            ..test_config(2)
        };

        let (result, events) = run_scan(&game, catalog, config);
        let summary = result.unwrap();

        assert_eq!(summary.achievements, vec![1, 2, 3]);
        assert_eq!(summary.outcome, ScanOutcome::Finished);
        assert!(events.contains(&ScanEvent::PageCompleted {
            page: 1,
            newly_completed: 2
        }));
        assert!(events.contains(&ScanEvent::PageAdvanced { page: 2 }));
    }

    #[test]
    fn window_rereads_do_not_duplicate_ids() {
        // One completed row re-read across the whole window.
        let game = MockGame::new(vec![vec![ScriptedRow::claimed("Endure", "survive")]]);
        let config = ScanConfig {
            strategy: ScanStrategy::Batched,
            ..test_config(1)
        };

        let (result, _) = run_scan(&game, catalog(&[(1, "Endure", "survive")]), config);
        assert_eq!(result.unwrap().achievements, vec![1]);
    }
}
