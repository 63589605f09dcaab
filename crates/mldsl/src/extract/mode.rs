//! Marker-pane classification: colored glass meta + display name to a
//! semantic input mode.

use std::collections::BTreeMap;

use super::record::SlotItem;
use crate::text::strip_colors;

/// Item id of the colored glass panes used as input markers.
pub const GLASS_ID: &str = "minecraft:stained_glass_pane";
/// Gray glass (meta 15) is structural decor and never an input marker.
pub const DECOR_META: u8 = 15;

/// Semantic input type of a chest slot.
///
/// `Any` is late-bound: the concrete mode is decided at emit time from
/// the value (or item id) that actually lands in the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Mode {
    #[serde(alias = "ANY_ARRAY")]
    Any,
    Text,
    Number,
    Variable,
    Item,
    Block,
    Location,
    Array,
    Vector,
}

/// Item id the server UI pre-fills into an editable slot, per mode.
/// Used both for edit-binding and for late-binding `Any` values.
#[must_use]
pub fn input_item_id(mode: Mode) -> Option<&'static str> {
    match mode {
        Mode::Text => Some("minecraft:book"),
        Mode::Number => Some("minecraft:slime_ball"),
        Mode::Variable => Some("minecraft:magma_cream"),
        Mode::Array => Some("minecraft:item_frame"),
        Mode::Location => Some("minecraft:paper"),
        _ => None,
    }
}

/// Classifies a glass pane into an input mode.
///
/// Pane display names are frequently garbled by the export encoding, so
/// the classifier leans on the glass meta and touches the name only
/// where the meta alone is ambiguous (vector/block overrides, meta 5,
/// meta 13).
#[must_use]
pub fn determine_mode(items: &BTreeMap<usize, SlotItem>, glass_slot: usize, glass_meta: u8, glass_name: &str) -> Option<Mode> {
    let name = strip_colors(glass_name).to_lowercase();
    if name.starts_with("вектор") || name.starts_with("vector") {
        return Some(Mode::Vector);
    }
    if name.contains("блок") || name.contains("block") {
        return Some(Mode::Block);
    }
    match glass_meta {
        9 => Some(Mode::Vector),
        0 => Some(Mode::Any),
        3 => Some(Mode::Text),
        14 => Some(Mode::Number),
        1 => Some(Mode::Variable),
        // Yellow glass is the "item input" marker in most GUIs.
        4 => Some(Mode::Item),
        5 => {
            // Meta 5 means either ARRAY or LOCATION. A readable name wins;
            // otherwise the pre-filled neighbor item decides.
            if name.contains("местополож") || name.contains("location") {
                return Some(Mode::Location);
            }
            let max_row = items.keys().next_back().map_or(super::geometry::PAGE_ROWS - 1, |&s| super::geometry::row(s));
            for s in super::geometry::neighbor_slots(glass_slot, max_row) {
                match items.get(&s).map(|it| it.id.as_str()) {
                    Some("minecraft:paper") => return Some(Mode::Location),
                    Some("minecraft:item_frame") => return Some(Mode::Array),
                    _ => {}
                }
            }
            Some(Mode::Array)
        }
        // Some GUIs use meta 13 panes as a block/item input marker, but the
        // same meta also labels non-arg "output" panes. The display name is
        // the only signal left.
        13 => {
            if ["предмет", "item"].iter().any(|t| name.contains(t)) {
                Some(Mode::Item)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// True for a glass pane that can carry a marker (decor excluded).
#[must_use]
pub fn is_marker_glass(item: &SlotItem) -> bool {
    item.id == GLASS_ID && item.meta != DECOR_META
}
