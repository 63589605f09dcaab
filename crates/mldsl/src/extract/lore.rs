//! Bullet-list lore parsing for enumerated choices.

use super::record::VariantInfo;
use crate::text::strip_colors;

/// Filled/empty bullet pairs: the clean export forms plus the shapes
/// they collapse to in encoding-damaged dumps.
const SELECTED_BULLETS: [char; 2] = ['●', '?'];
const UNSELECTED_BULLETS: [char; 2] = ['○', '\t'];

/// Parses an item's lore into an ordered option list.
///
/// Lore lines arrive joined with the literal ` \n ` escape. Lines
/// carrying a bullet contribute one option; the first filled bullet
/// marks the selected index (0 when none survives the encoding).
/// Bullets are matched on the raw line: color stripping would eat the
/// TAB fallback bullet along with the control characters.
#[must_use]
pub fn parse_variant_info(lore: &str) -> Option<VariantInfo> {
    if lore.is_empty() {
        return None;
    }
    let mut options: Vec<String> = Vec::new();
    let mut selected: Option<usize> = None;
    for line in lore.split(" \\n ") {
        let filled = SELECTED_BULLETS.iter().copied().find(|&b| line.contains(b));
        let empty = UNSELECTED_BULLETS.iter().copied().find(|&b| line.contains(b));
        let (bullet, is_selected) = match (filled, empty) {
            (Some(b), _) => (b, true),
            (None, Some(b)) => (b, false),
            (None, None) => continue,
        };
        let rest = line.split_once(bullet).map(|(_, rest)| rest).unwrap_or("");
        let text = strip_colors(rest);
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        options.push(text.to_owned());
        if is_selected && selected.is_none() {
            selected = Some(options.len() - 1);
        }
    }
    if options.is_empty() {
        return None;
    }
    let selected = selected.unwrap_or(0);
    Some(VariantInfo { options, selected_index: selected, clicks: selected })
}
