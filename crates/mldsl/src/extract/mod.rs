//! The extractor: GUI dump in, raw action catalog out.

mod binding;
mod dump;
mod geometry;
mod lanes;
mod lore;
mod mode;
mod record;

use std::collections::HashMap;

pub use self::{
    binding::extract_args,
    dump::{parse_dump, read_dump_file},
    lore::parse_variant_info,
    mode::{GLASS_ID, Mode, determine_mode, input_item_id},
    record::{ActionRecord, ArgBinding, Catalog, EnumSlot, ExtractDiagnostics, RawAction, SlotItem, VariantInfo},
};
use crate::text::{normalize, strip_colors};

/// Stable record identifier: the eight header fields, normalized and
/// joined with `|`. Sign lines get the optional alias substitution
/// before normalization so renamed categories keep their identity.
#[must_use]
pub fn build_key(record: &ActionRecord, sign1_aliases: &HashMap<String, String>) -> String {
    let apply = |line: &str| -> String {
        let raw = strip_colors(line);
        let raw = raw.trim();
        sign1_aliases.get(raw).cloned().unwrap_or_else(|| raw.to_owned())
    };
    let signs: Vec<String> = record.signs.iter().map(|s| apply(s)).collect();
    [
        normalize(&record.path),
        normalize(&record.category),
        normalize(&record.subitem),
        normalize(&record.gui),
        normalize(&signs[0]),
        normalize(&signs[1]),
        normalize(&signs[2]),
        normalize(&signs[3]),
    ]
    .join("|")
}

/// Walks the non-glass slots and collects every bullet-list lore as an
/// enumerated choice attached to its slot.
#[must_use]
pub fn extract_enums(record: &ActionRecord) -> Vec<EnumSlot> {
    let mut enums = Vec::new();
    for (&slot, item) in &record.items {
        if item.id == GLASS_ID {
            continue;
        }
        let Some(variant) = parse_variant_info(&item.lore) else { continue };
        enums.push(EnumSlot {
            slot,
            id: item.id.clone(),
            meta: item.meta,
            name: strip_colors(&item.name).trim().to_owned(),
            variant,
        });
    }
    enums
}

/// Folds parsed records into the raw catalog: one [`RawAction`] per
/// record, args and enums extracted, identity frozen.
#[must_use]
pub fn extract_catalog(records: &[ActionRecord], sign1_aliases: &HashMap<String, String>) -> Catalog {
    records
        .iter()
        .map(|record| RawAction {
            id: build_key(record, sign1_aliases),
            path: record.path.clone(),
            category: record.category.clone(),
            subitem: record.subitem.clone(),
            gui: record.gui.clone(),
            signs: record.signs.clone(),
            args: extract_args(record),
            enums: extract_enums(record),
        })
        .collect()
}
