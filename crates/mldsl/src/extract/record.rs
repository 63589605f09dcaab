//! Data model of the raw catalog.

use std::collections::BTreeMap;

use super::mode::Mode;

/// One stack in a chest snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SlotItem {
    pub id: String,
    pub meta: u8,
    pub name: String,
    pub lore: String,
}

/// One `# record` section of the GUI dump, as parsed.
///
/// Owned exclusively by the extractor until it is folded into a
/// [`RawAction`]; slots are kept in a sorted map because ascending slot
/// order is load-bearing for binding.
#[derive(Debug, Clone, Default)]
pub struct ActionRecord {
    pub path: String,
    pub category: String,
    pub subitem: String,
    pub gui: String,
    pub signs: [String; 4],
    pub has_chest: bool,
    pub items: BTreeMap<usize, SlotItem>,
}

impl ActionRecord {
    /// A record with no header text and no items carries no information
    /// and is dropped by the dump reader.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
            && self.category.is_empty()
            && self.subitem.is_empty()
            && self.gui.is_empty()
            && self.signs.iter().all(String::is_empty)
            && self.items.is_empty()
    }

    /// Highest occupied row, defaulting to the last row of one page.
    #[must_use]
    pub fn max_row(&self) -> usize {
        self.items
            .keys()
            .next_back()
            .map_or(super::geometry::PAGE_ROWS - 1, |&s| super::geometry::row(s))
    }
}

/// An enumerated-choice list recovered from item lore bullets.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInfo {
    pub options: Vec<String>,
    pub selected_index: usize,
    /// Clicks needed to reach the selected option from the default.
    pub clicks: usize,
}

/// A resolved link between a marker pane and the slot it controls.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgBinding {
    pub glass_slot: usize,
    pub glass_meta: u8,
    /// `None` for meta 0 markers, which match any pane color downstream.
    pub glass_meta_filter: Option<u8>,
    pub glass_name: String,
    /// Normalized pane name, empty for meta 0 markers.
    pub key_norm: String,
    pub mode: Mode,
    pub arg_slot: usize,
    pub arg_has_item: bool,
    pub variant: Option<VariantInfo>,
}

/// A non-glass slot whose lore encodes an option list.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnumSlot {
    pub slot: usize,
    pub id: String,
    pub meta: u8,
    pub name: String,
    pub variant: VariantInfo,
}

/// One finished catalog row: record identity plus extracted bindings.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawAction {
    pub id: String,
    pub path: String,
    pub category: String,
    pub subitem: String,
    pub gui: String,
    pub signs: [String; 4],
    pub args: Vec<ArgBinding>,
    pub enums: Vec<EnumSlot>,
}

/// The extractor's output: catalog rows in dump order.
pub type Catalog = Vec<RawAction>;

/// Counters surfaced by the extractor's diagnostic path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExtractDiagnostics {
    /// `item=` lines that failed the fixed regex and were skipped.
    pub skipped_item_lines: usize,
    /// Fully empty records dropped by the reader.
    pub empty_records: usize,
}
