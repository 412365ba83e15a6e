//! Screen-space layout of the achievement list.
//!
//! Coordinates are fractions of a 16:9 client area, measured on 1920x1080
//! captures. The list shows five row slots at a time; once the cursor passes
//! the fifth slot the list scrolls under it, so every later row is read from
//! the bottom slot.

use super::Region;

/// Number of row slots visible at once.
pub const VISIBLE_ROW_SLOTS: usize = 5;

/// Top edge of each visible row slot.
const ROW_SLOT_Y: [f64; VISIBLE_ROW_SLOTS] = [0.2676, 0.3991, 0.5306, 0.6621, 0.7936];

/// Height of one line of row text.
const FONT_HEIGHT: f64 = 0.0259;

const NAME_X: f64 = 0.3365;
const NAME_WIDTH: f64 = 0.2875;

/// Vertical offset from a row's name line to its description line.
const DESC_OFFSET_Y: f64 = 0.0296;

const COMPLETED_X: f64 = 0.7880;
const COMPLETED_WIDTH: f64 = 0.0740;

/// Sub-region inside the completion badge frame sampled for the claim color.
pub const CLAIM_SWATCH: Region = Region::new(0.10, 0.25, 0.20, 0.50);

/// Map a row index to the slot it is displayed in.
pub fn visible_slot(row_index: u32) -> usize {
    (row_index as usize).min(VISIBLE_ROW_SLOTS - 1)
}

/// Region of a row's name line.
pub fn name_region(slot: usize) -> Region {
    let slot = slot.min(VISIBLE_ROW_SLOTS - 1);
    Region::new(NAME_X, ROW_SLOT_Y[slot], NAME_WIDTH, FONT_HEIGHT)
}

/// Region of a row's description line.
pub fn description_region(slot: usize) -> Region {
    let slot = slot.min(VISIBLE_ROW_SLOTS - 1);
    Region::new(
        NAME_X,
        ROW_SLOT_Y[slot] + DESC_OFFSET_Y,
        NAME_WIDTH,
        FONT_HEIGHT,
    )
}

/// Region of a row's completion badge ("Completed" text or claim button).
pub fn completion_region(slot: usize) -> Region {
    let slot = slot.min(VISIBLE_ROW_SLOTS - 1);
    Region::new(COMPLETED_X, ROW_SLOT_Y[slot], COMPLETED_WIDTH, FONT_HEIGHT)
}
