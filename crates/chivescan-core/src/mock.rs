//! Scripted fake game for exercising the scan loop without a real window.
//!
//! `MockGame` models the achievement UI as pages of scripted rows with a
//! cursor that saturates at the bottom of each list, which is exactly the
//! behavior the sequential boundary detection relies on. The three
//! collaborator handles share one game behind `Rc<RefCell<..>>` and count
//! every interaction so tests can assert on call patterns.

use std::cell::RefCell;
use std::rc::Rc;

use image::{Rgba, RgbaImage};

use crate::capture::{CaptureRegion, Region, layout};
use crate::config::DEFAULT_CLAIMED_COLOR;
use crate::error::{Error, Result};
use crate::input::Navigate;
use crate::ocr::{ExtractText, TextPurpose};

/// How a scripted row presents its completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    /// Badge filled with the claimed reward color.
    Claimed,
    /// Plain "Completed" badge text, no claim color.
    CompletedLabel,
    Uncompleted,
}

/// One row of the scripted achievement list.
#[derive(Debug, Clone)]
pub struct ScriptedRow {
    pub name: String,
    pub description: String,
    pub status: RowStatus,
}

impl ScriptedRow {
    pub fn claimed(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            status: RowStatus::Claimed,
        }
    }

    pub fn completed(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            status: RowStatus::CompletedLabel,
        }
    }

    pub fn uncompleted(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            status: RowStatus::Uncompleted,
        }
    }
}

/// Scripted game state shared by the mock collaborators.
#[derive(Debug)]
pub struct MockGame {
    pages: Vec<Vec<ScriptedRow>>,
    page: usize,
    cursor: usize,
    /// Focus reported while `lose_focus_after` is unset.
    pub focused: bool,
    /// Report focus lost once this many row steps have happened.
    pub lose_focus_after: Option<u32>,
    /// Fail every capture after this many have succeeded.
    pub fail_capture_after: Option<u32>,
    pub captures: u32,
    pub wake_calls: u32,
    pub row_steps: u32,
    pub page_switches: u32,
    pub cursor_resets: u32,
    pub name_extractions: u32,
    pub label_extractions: u32,
    pub description_fetches: u32,
}

impl MockGame {
    pub fn new(pages: Vec<Vec<ScriptedRow>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            pages,
            page: 0,
            cursor: 0,
            focused: true,
            lose_focus_after: None,
            fail_capture_after: None,
            captures: 0,
            wake_calls: 0,
            row_steps: 0,
            page_switches: 0,
            cursor_resets: 0,
            name_extractions: 0,
            label_extractions: 0,
            description_fetches: 0,
        }))
    }

    /// The row currently under the cursor, if any.
    fn current_row(&self) -> Option<&ScriptedRow> {
        let rows = self.pages.get(self.page)?;
        rows.get(self.cursor.min(rows.len().saturating_sub(1)))
    }

    fn reports_focus(&self) -> bool {
        match self.lose_focus_after {
            Some(threshold) => self.row_steps < threshold,
            None => self.focused,
        }
    }
}

/// Build the three collaborator handles over a shared game.
pub fn mock_collaborators(
    game: &Rc<RefCell<MockGame>>,
) -> (MockCapture, MockExtractor, MockNavigator) {
    (
        MockCapture(Rc::clone(game)),
        MockExtractor(Rc::clone(game)),
        MockNavigator(Rc::clone(game)),
    )
}

/// Capture handle: paints solid frames, claimed rows in the claim color.
pub struct MockCapture(Rc<RefCell<MockGame>>);

impl CaptureRegion for MockCapture {
    fn capture(&self, region: &Region) -> Result<RgbaImage> {
        let mut game = self.0.borrow_mut();
        game.captures += 1;
        if let Some(after) = game.fail_capture_after
            && game.captures > after
        {
            return Err(Error::Capture {
                context: "mock frame".to_string(),
                message: "scripted capture failure".to_string(),
            });
        }

        let is_completion_region =
            (0..layout::VISIBLE_ROW_SLOTS).any(|slot| layout::completion_region(slot) == *region);

        let fill = match game.current_row() {
            Some(row) if is_completion_region && row.status == RowStatus::Claimed => Rgba([
                DEFAULT_CLAIMED_COLOR.r,
                DEFAULT_CLAIMED_COLOR.g,
                DEFAULT_CLAIMED_COLOR.b,
                255,
            ]),
            _ => Rgba([16, 16, 16, 255]),
        };
        Ok(RgbaImage::from_pixel(16, 16, fill))
    }
}

/// Extraction handle: answers from the scripted row under the cursor.
pub struct MockExtractor(Rc<RefCell<MockGame>>);

impl ExtractText for MockExtractor {
    fn extract(&self, _image: &RgbaImage, purpose: TextPurpose) -> Result<String> {
        let mut game = self.0.borrow_mut();
        let row = game.current_row().cloned();
        match purpose {
            TextPurpose::Name => {
                game.name_extractions += 1;
                Ok(row.map(|r| r.name).unwrap_or_default())
            }
            TextPurpose::Description => {
                game.description_fetches += 1;
                Ok(row.map(|r| r.description).unwrap_or_default())
            }
            TextPurpose::CompletionLabel => {
                game.label_extractions += 1;
                Ok(match row {
                    Some(r) if r.status == RowStatus::CompletedLabel => "Completed".to_string(),
                    _ => String::new(),
                })
            }
        }
    }
}

/// Navigation handle: moves the scripted cursor.
pub struct MockNavigator(Rc<RefCell<MockGame>>);

impl Navigate for MockNavigator {
    fn wake(&mut self) -> Result<()> {
        self.0.borrow_mut().wake_calls += 1;
        Ok(())
    }

    fn advance_row(&mut self) -> Result<()> {
        let mut game = self.0.borrow_mut();
        game.row_steps += 1;
        let len = game.pages.get(game.page).map(Vec::len).unwrap_or(0);
        // The cursor saturates at the bottom of the list, like the real UI.
        game.cursor = (game.cursor + 1).min(len.saturating_sub(1));
        Ok(())
    }

    fn advance_page(&mut self) -> Result<()> {
        let mut game = self.0.borrow_mut();
        game.page_switches += 1;
        game.page += 1;
        game.cursor = 0;
        Ok(())
    }

    fn reset_row_cursor(&mut self) -> Result<()> {
        let mut game = self.0.borrow_mut();
        game.cursor_resets += 1;
        game.cursor = 0;
        Ok(())
    }

    fn is_focused(&self) -> bool {
        self.0.borrow().reports_focus()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_saturates_at_the_bottom() {
        let game = MockGame::new(vec![vec![
            ScriptedRow::claimed("A", "a"),
            ScriptedRow::claimed("B", "b"),
        ]]);
        let (_, _, mut nav) = mock_collaborators(&game);

        nav.advance_row().unwrap();
        nav.advance_row().unwrap();
        nav.advance_row().unwrap();
        assert_eq!(game.borrow().cursor, 1);
        assert_eq!(game.borrow().row_steps, 3);
    }

    #[test]
    fn page_switch_resets_the_cursor() {
        let game = MockGame::new(vec![
            vec![ScriptedRow::claimed("A", "a"), ScriptedRow::claimed("B", "b")],
            vec![ScriptedRow::claimed("C", "c")],
        ]);
        let (_, extractor, mut nav) = mock_collaborators(&game);

        nav.advance_row().unwrap();
        nav.advance_page().unwrap();

        let frame = RgbaImage::new(1, 1);
        let name = extractor.extract(&frame, TextPurpose::Name).unwrap();
        assert_eq!(name, "C");
    }

    #[test]
    fn claimed_rows_paint_the_claim_color() {
        let game = MockGame::new(vec![vec![ScriptedRow::claimed("A", "a")]]);
        let (capture, _, _) = mock_collaborators(&game);

        let frame = capture.capture(&layout::completion_region(0)).unwrap();
        let pixel = frame.get_pixel(0, 0);
        assert_eq!(pixel[0], DEFAULT_CLAIMED_COLOR.r);

        // Name regions stay dark even for claimed rows.
        let frame = capture.capture(&layout::name_region(0)).unwrap();
        assert_ne!(frame.get_pixel(0, 0)[0], DEFAULT_CLAIMED_COLOR.r);
    }
}
