//! Ordered, geometry-aware slot binding.

use ahash::AHashSet;

use super::{
    geometry::neighbor_slots,
    lanes::{self, LaneMap, REPEATED_LANE_MODES},
    lore::parse_variant_info,
    mode::{GLASS_ID, Mode, determine_mode, input_item_id, is_marker_glass},
    record::{ActionRecord, ArgBinding},
};
use crate::text::{normalize, strip_colors};

/// Picks the slot the UI would edit or fill for one glass marker.
///
/// Order mirrors the in-mod behavior: a neighbor already holding the
/// expected input item wins (edit binding), then the first empty
/// neighbor, and for ITEM/BLOCK only the first occupied non-glass
/// neighbor. A generic occupied fallback is deliberately absent for the
/// other modes: it would bind enum items living in the GUI layout.
fn find_candidate_slot(record: &ActionRecord, base_slot: usize, reserved: &AHashSet<usize>, mode: Mode) -> Option<usize> {
    let items = &record.items;
    let max_row = record.max_row();

    if let Some(expected) = input_item_id(mode) {
        for s in neighbor_slots(base_slot, max_row) {
            if reserved.contains(&s) {
                continue;
            }
            if items.get(&s).is_some_and(|it| it.id == expected) {
                return Some(s);
            }
        }
    }

    for s in neighbor_slots(base_slot, max_row) {
        if reserved.contains(&s) || items.contains_key(&s) {
            continue;
        }
        return Some(s);
    }

    if matches!(mode, Mode::Item | Mode::Block) {
        for s in neighbor_slots(base_slot, max_row) {
            if reserved.contains(&s) {
                continue;
            }
            if items.get(&s).is_some_and(|it| it.id != GLASS_ID) {
                return Some(s);
            }
        }
    }

    None
}

fn push_binding(
    record: &ActionRecord,
    args: &mut Vec<ArgBinding>,
    glass_slot: usize,
    glass_meta: u8,
    glass_name: &str,
    key_norm: &str,
    mode: Mode,
    arg_slot: usize,
) {
    let item = record.items.get(&arg_slot);
    args.push(ArgBinding {
        glass_slot,
        glass_meta,
        glass_meta_filter: (glass_meta != 0).then_some(glass_meta),
        glass_name: glass_name.to_owned(),
        key_norm: key_norm.to_owned(),
        mode,
        arg_slot,
        arg_has_item: item.is_some(),
        variant: item.and_then(|it| parse_variant_info(&it.lore)),
    });
}

/// Extracts the ordered argument bindings for one record.
///
/// Lane detection runs first; lane-claimed marker slots are excluded
/// from the ordinary per-marker pass, and every chosen slot goes into a
/// reserved set so bindings stay pairwise disjoint. Lane maps flush
/// last, in strict row-major order, so the argument order is
/// deterministic regardless of detection order.
#[must_use]
pub fn extract_args(record: &ActionRecord) -> Vec<ArgBinding> {
    let items = &record.items;
    let mut reserved: AHashSet<usize> = AHashSet::new();
    let mut args = Vec::new();

    let concat_lane = lanes::find_concat_lane(record);
    let repeated_lanes: Vec<(Mode, LaneMap)> = REPEATED_LANE_MODES
        .iter()
        .map(|&mode| (mode, lanes::find_repeated_lane(items, mode)))
        .collect();

    let mut lane_slots: AHashSet<usize> = concat_lane.keys().copied().collect();
    for (_, map) in &repeated_lanes {
        lane_slots.extend(map.keys().copied());
    }

    for (&slot, item) in items {
        if !is_marker_glass(item) {
            continue;
        }
        let Some(mode) = determine_mode(items, slot, item.meta, &item.name) else {
            continue;
        };
        // A recognized lane absorbs every lane marker of its mode; stray
        // markers of the same mode outside the lane are dropped.
        if repeated_lanes.iter().any(|(lane_mode, map)| {
            !map.is_empty() && lanes::is_repeated_marker(items, slot, item, *lane_mode) && !map.contains_key(&slot)
        }) {
            continue;
        }
        // Lane layouts are flushed in one strict row-major pass below.
        if lane_slots.contains(&slot) {
            continue;
        }

        let Some(arg_slot) = find_candidate_slot(record, slot, &reserved, mode) else {
            continue;
        };
        if reserved.contains(&arg_slot) {
            continue;
        }
        reserved.insert(arg_slot);
        let glass_name = strip_colors(&item.name);
        let key_norm = if item.meta == 0 { String::new() } else { normalize(&item.name) };
        push_binding(record, &mut args, slot, item.meta, glass_name.trim(), &key_norm, mode, arg_slot);
    }

    flush_lane_row_major(record, &mut args, &mut reserved, &concat_lane);
    for (_, map) in &repeated_lanes {
        flush_lane_row_major(record, &mut args, &mut reserved, map);
    }

    args
}

/// Emits one lane map depth-first across columns: every lane cell's
/// first slot, then every second slot, then every third.
fn flush_lane_row_major(record: &ActionRecord, args: &mut Vec<ArgBinding>, reserved: &mut AHashSet<usize>, lane: &LaneMap) {
    if lane.is_empty() {
        return;
    }
    let max_depth = lane.values().map(|spec| spec.arg_slots.len()).max().unwrap_or(0);
    for depth in 0..max_depth {
        for (&lane_slot, spec) in lane {
            let Some(&arg_slot) = spec.arg_slots.get(depth) else { continue };
            if reserved.contains(&arg_slot) {
                continue;
            }
            reserved.insert(arg_slot);
            push_binding(record, args, lane_slot, spec.glass_meta, &spec.glass_name, &spec.key_norm, spec.mode, arg_slot);
        }
    }
}
