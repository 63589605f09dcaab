//! Lane macro recognition.
//!
//! Two row-wide GUI layouts expand a single marker into many argument
//! slots: the repeated lane (variadic inputs of one mode, three rows of
//! slots below the lane) and the concat lane (an 8/9-way text join).
//! Both run before ordinary per-marker binding and claim their slots.

use std::collections::BTreeMap;

use super::{
    geometry::{MAX_INVENTORY_SLOT, ROW_SIZE, row, slot_at},
    mode::{Mode, determine_mode, is_marker_glass},
    record::{ActionRecord, SlotItem},
};
use crate::text::{normalize, strip_colors};

/// What one lane cell expands to: the slots it binds and the marker
/// metadata the bindings inherit.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneSpec {
    pub arg_slots: Vec<usize>,
    pub glass_meta: u8,
    pub glass_name: String,
    pub mode: Mode,
    pub key_norm: String,
}

/// Lane cells keyed by the marker slot, sorted for row-major flushing.
pub type LaneMap = BTreeMap<usize, LaneSpec>;

/// Repeated-lane modes, in the order their maps are flushed.
pub const REPEATED_LANE_MODES: [Mode; 6] = [Mode::Number, Mode::Text, Mode::Item, Mode::Location, Mode::Array, Mode::Any];

fn plural_tokens(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Number => &["число(а)", "числа", "numbers"],
        Mode::Text => &["текст(ы)", "тексты", "texts"],
        Mode::Item => &["предмет(ы)", "предметы", "items"],
        Mode::Location => &["местоположение(я)", "местоположения", "местополож", "locations"],
        Mode::Array => &["массив(ы)", "массивы", "arrays"],
        Mode::Vector => &["вектор(ы)", "векторы", "вектор", "vectors"],
        Mode::Any => &["значение(я)", "значения", "values"],
        Mode::Variable | Mode::Block => &[],
    }
}

/// A lane marker of mode `mode`: right glass, right mode, and either a
/// plural token in the name or a directional hint in the lore.
#[must_use]
pub fn is_repeated_marker(items: &BTreeMap<usize, SlotItem>, slot: usize, item: &SlotItem, mode: Mode) -> bool {
    if !is_marker_glass(item) {
        return false;
    }
    if determine_mode(items, slot, item.meta, &item.name) != Some(mode) {
        return false;
    }
    let name_n = normalize(&item.name);
    let lore_n = normalize(&item.lore);
    let has_plural_hint = plural_tokens(mode).iter().any(|t| name_n.contains(t));
    let has_arrow_hint = ["ниже", "выше", "below", "above"].iter().any(|t| lore_n.contains(t))
        || item.lore.contains('⇩')
        || item.lore.contains('⇧');
    has_plural_hint || has_arrow_hint
}

fn nearest_marker<'a>(
    items: &'a BTreeMap<usize, SlotItem>,
    lane_row: usize,
    col: usize,
    candidate_cols: &[usize],
    accept: impl Fn(usize, &SlotItem) -> bool,
) -> Option<&'a SlotItem> {
    let mut best: Option<(&SlotItem, usize)> = None;
    for &c in candidate_cols {
        if c == col {
            continue;
        }
        let slot = slot_at(lane_row, c);
        let Some(item) = items.get(&slot) else { continue };
        if !accept(slot, item) {
            continue;
        }
        let dist = c.abs_diff(col);
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((item, dist));
        }
    }
    best.map(|(item, _)| item)
}

fn lane_spec_from(item: &SlotItem, mode: Mode, arg_slots: Vec<usize>) -> LaneSpec {
    let glass_name = strip_colors(&item.name).trim().to_owned();
    let key_norm = if item.meta == 0 { String::new() } else { normalize(&item.name) };
    LaneSpec { arg_slots, glass_meta: item.meta, glass_name, mode, key_norm }
}

/// Finds the single winning repeated lane for `mode`, if any.
///
/// A row qualifies with at least seven lane markers and one consecutive
/// run of three; the lane spans from the first to the last marker
/// column, gap columns borrow the nearest marker. Every lane cell needs
/// three empty slots straight below. Ties break toward more columns,
/// fewer gaps, the lower row index, then the smaller start column.
#[must_use]
pub fn find_repeated_lane(items: &BTreeMap<usize, SlotItem>, mode: Mode) -> LaneMap {
    const MIN_TOTAL_MARKERS: usize = 7;
    const MIN_CONSECUTIVE: usize = 3;
    const REQUIRED_EMPTY_ROWS: usize = 3;

    let (Some(&min_slot), Some(&max_slot)) = (items.keys().next(), items.keys().next_back()) else {
        return LaneMap::new();
    };
    // (columns, gaps, row, start col, map)
    let mut candidates: Vec<(usize, usize, usize, usize, LaneMap)> = Vec::new();

    for lane_row in row(min_slot)..=row(max_slot) {
        let marker_cols: Vec<usize> = (0..ROW_SIZE)
            .filter(|&c| {
                let slot = slot_at(lane_row, c);
                items.get(&slot).is_some_and(|it| is_repeated_marker(items, slot, it, mode))
            })
            .collect();
        if marker_cols.len() < MIN_TOTAL_MARKERS {
            continue;
        }
        let has_consecutive = marker_cols
            .windows(MIN_CONSECUTIVE)
            .any(|w| w[MIN_CONSECUTIVE - 1] - w[0] == MIN_CONSECUTIVE - 1);
        if !has_consecutive {
            continue;
        }

        let lane_start = marker_cols[0];
        let lane_end = *marker_cols.last().expect("non-empty marker cols");
        let mut local = LaneMap::new();
        let mut lane_valid = true;
        for c in lane_start..=lane_end {
            let lane_slot = slot_at(lane_row, c);
            let src = items
                .get(&lane_slot)
                .filter(|it| is_repeated_marker(items, lane_slot, it, mode))
                .or_else(|| {
                    nearest_marker(items, lane_row, c, &marker_cols, |slot, it| {
                        is_repeated_marker(items, slot, it, mode)
                    })
                });
            let Some(src) = src else {
                lane_valid = false;
                break;
            };
            let mut arg_slots = Vec::with_capacity(REQUIRED_EMPTY_ROWS);
            let mut s = lane_slot + ROW_SIZE;
            for _ in 0..REQUIRED_EMPTY_ROWS {
                if s > MAX_INVENTORY_SLOT || items.contains_key(&s) {
                    lane_valid = false;
                    break;
                }
                arg_slots.push(s);
                s += ROW_SIZE;
            }
            if !lane_valid {
                break;
            }
            local.insert(lane_slot, lane_spec_from(src, mode, arg_slots));
        }
        if lane_valid && !local.is_empty() {
            let columns = local.len();
            let gaps = (lane_end - lane_start + 1).saturating_sub(marker_cols.len());
            candidates.push((columns, gaps, lane_row, lane_start, local));
        }
    }

    candidates
        .into_iter()
        .min_by_key(|&(columns, gaps, lane_row, start, _)| (std::cmp::Reverse(columns), gaps, lane_row, start))
        .map(|(_, _, _, _, map)| map)
        .unwrap_or_default()
}

/// Text cues (sign/gui/menu mention concat or the `=` label) or the
/// structural fallback (a text-heavy pane layout) mark a record as a
/// concat-lane candidate.
#[must_use]
pub fn looks_like_concat_action(record: &ActionRecord) -> bool {
    let candidates = [
        record.signs[0].as_str(),
        record.signs[1].as_str(),
        record.signs[2].as_str(),
        record.gui.as_str(),
        record.subitem.as_str(),
    ];
    for raw in candidates {
        if raw.is_empty() {
            continue;
        }
        let n = normalize(raw);
        if n == "=" {
            return true;
        }
        if (n.contains("объедин") && n.contains("текст"))
            || (n.contains("concat") && n.contains("text"))
            || (n.contains("combine") && n.contains("text"))
        {
            return true;
        }
    }

    let mut text_markers = 0usize;
    let mut variable_markers = 0usize;
    for (&slot, item) in &record.items {
        if !is_marker_glass(item) {
            continue;
        }
        match determine_mode(&record.items, slot, item.meta, &item.name) {
            Some(Mode::Text) => text_markers += 1,
            Some(Mode::Variable) => variable_markers += 1,
            _ => {}
        }
    }
    text_markers >= 8 && variable_markers >= 1
}

/// Runs of consecutive marker glass in a row, as `(start, end)` column
/// pairs.
fn glass_runs_in_row(items: &BTreeMap<usize, SlotItem>, lane_row: usize) -> Vec<(usize, usize)> {
    let cols: Vec<bool> = (0..ROW_SIZE)
        .map(|c| {
            let slot = slot_at(lane_row, c);
            items.get(&slot).is_some_and(|it| {
                is_marker_glass(it) && determine_mode(items, slot, it.meta, &it.name).is_some()
            })
        })
        .collect();
    let mut runs = Vec::new();
    let mut i = 0;
    while i < ROW_SIZE {
        if !cols[i] {
            i += 1;
            continue;
        }
        let mut j = i;
        while j + 1 < ROW_SIZE && cols[j + 1] {
            j += 1;
        }
        runs.push((i, j));
        i = j + 1;
    }
    runs
}

/// Finds the concat lane: a row of marker runs in one of the accepted
/// gap patterns, every lane column with at least three empty slots
/// straight below. Occupied slots anywhere below a lane column reject
/// the whole lane. The first qualifying row wins.
#[must_use]
pub fn find_concat_lane(record: &ActionRecord) -> LaneMap {
    if !looks_like_concat_action(record) {
        return LaneMap::new();
    }
    let items = &record.items;
    let (Some(&min_slot), Some(&max_slot)) = (items.keys().next(), items.keys().next_back()) else {
        return LaneMap::new();
    };

    for lane_row in row(min_slot)..=row(max_slot) {
        let runs = glass_runs_in_row(items, lane_row);
        let Some(lane_cols) = pick_concat_span(&runs) else { continue };

        // Exports can omit fully empty bottom rows; the downward scan
        // still needs three rows, so extend the virtual bound.
        let row_last = slot_at(lane_row, ROW_SIZE - 1);
        let local_max = MAX_INVENTORY_SLOT.min(max_slot.max(row_last + 3 * ROW_SIZE));
        let marker_cols: Vec<usize> = lane_cols.clone().collect();
        let mut local = LaneMap::new();
        let mut valid = true;
        for c in marker_cols.clone() {
            let lane_slot = slot_at(lane_row, c);
            let mut empties = Vec::new();
            let mut s = lane_slot + ROW_SIZE;
            while s <= local_max {
                if items.contains_key(&s) {
                    // Slots below the concat lane must stay empty.
                    valid = false;
                    break;
                }
                empties.push(s);
                s += ROW_SIZE;
            }
            if !valid || empties.len() < 3 {
                valid = false;
                break;
            }
            let src = items
                .get(&lane_slot)
                .filter(|it| is_marker_glass(it))
                .or_else(|| nearest_marker(items, lane_row, c, &marker_cols, |_, it| is_marker_glass(it)));
            let Some(src) = src else {
                valid = false;
                break;
            };
            let Some(src_mode) = determine_mode(items, lane_slot, src.meta, &src.name) else {
                valid = false;
                break;
            };
            local.insert(lane_slot, lane_spec_from(src, src_mode, empties));
        }
        if valid {
            return local;
        }
    }
    LaneMap::new()
}

fn pick_concat_span(runs: &[(usize, usize)]) -> Option<std::ops::RangeInclusive<usize>> {
    for pair in runs.windows(2) {
        let (a0, a1) = pair[0];
        let (b0, b1) = pair[1];
        let len_a = a1 - a0 + 1;
        let len_b = b1 - b0 + 1;
        let gap = b0 - a1 - 1;
        if len_a >= 3 && len_b >= 3 && gap == 1 && len_a + len_b >= 7 {
            return Some(a0..=b1);
        }
    }
    // Two single-column gaps around a center run: 3+ gap 1+ gap 3+.
    for triple in runs.windows(3) {
        let (a0, a1) = triple[0];
        let (b0, b1) = triple[1];
        let (c0, c1) = triple[2];
        let len_a = a1 - a0 + 1;
        let len_b = b1 - b0 + 1;
        let len_c = c1 - c0 + 1;
        if len_a >= 3
            && len_b >= 1
            && len_c >= 3
            && b0 - a1 - 1 == 1
            && c0 - b1 - 1 == 1
            && len_a + len_b + len_c >= 7
        {
            return Some(a0..=c1);
        }
    }
    None
}
