//! Integer slot math for the 9-wide chest grid.

use smallvec::SmallVec;

/// Chest inventories are nine columns wide.
pub const ROW_SIZE: usize = 9;
/// A single chest page holds six rows.
pub const PAGE_ROWS: usize = 6;
/// Highest slot index inside one page.
pub const MAX_INVENTORY_SLOT: usize = PAGE_ROWS * ROW_SIZE - 1;

#[must_use]
pub fn row(slot: usize) -> usize {
    slot / ROW_SIZE
}

#[must_use]
pub fn col(slot: usize) -> usize {
    slot % ROW_SIZE
}

#[must_use]
pub fn slot_at(row: usize, col: usize) -> usize {
    row * ROW_SIZE + col
}

/// Ordered neighbor candidates for a marker: down, left, right, up.
///
/// `max_row` is inferred from the record's highest occupied slot so that
/// merged multi-page exports (rows beyond a single 6-row page) keep
/// their lower rows reachable.
#[must_use]
pub fn neighbor_slots(slot: usize, max_row: usize) -> SmallVec<[usize; 4]> {
    let r = row(slot) as isize;
    let c = col(slot) as isize;
    let candidates = [(r + 1, c), (r, c - 1), (r, c + 1), (r - 1, c)];
    let mut out = SmallVec::new();
    for (nr, nc) in candidates {
        if nr >= 0 && nr <= max_row as isize && nc >= 0 && nc < ROW_SIZE as isize {
            out.push(slot_at(nr as usize, nc as usize));
        }
    }
    out
}
