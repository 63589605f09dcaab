//! Alias derivation for canonical API functions.

use std::collections::BTreeSet;

use crate::text::{clean_display, rus_ident, snake, strip_page_suffix};

/// Crude keyword-level English rendering of a Russian action label,
/// snaked afterwards. Only meant to produce memorable extra aliases.
#[must_use]
pub fn englishish_alias(text: &str) -> String {
    const REPLACEMENTS: &[(&str, &str)] = &[
        ("сообщение", "message"),
        ("выдать", "give"),
        ("установить", "set"),
        ("присв", "set"),
        ("удалить", "remove"),
        ("телепорт", "teleport"),
        ("урон", "damage"),
        ("исцел", "heal"),
        ("предмет", "item"),
        ("инвентарь", "inventory"),
        ("брон", "armor"),
        ("функц", "function"),
    ];
    let mut s = clean_display(text).trim().to_lowercase();
    for (from, to) in REPLACEMENTS {
        s = s.replace(from, to);
    }
    snake(&s)
}

/// Extracts the clickable menu name from a catalog `subitem` line:
/// `[minecraft:quartz_stairs meta=0] §cСравнить числа | §7…` yields
/// `Сравнить числа`.
#[must_use]
pub fn parse_item_display_name(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let s = clean_display(raw);
    let s = s.split_once(']').map_or(s.as_str(), |(_, rest)| rest);
    let s = s.trim();
    let s = s.split_once('|').map_or(s, |(left, _)| left);
    s.trim().to_owned()
}

/// Short aliases from the menu item name: the identifier forms of the
/// whole name and, for `a/b` names, of the part before the slash.
#[must_use]
pub fn menu_short_aliases(menu: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let base = strip_page_suffix(menu);
    if base.is_empty() {
        return out;
    }
    out.insert(rus_ident(&base));
    out.insert(englishish_alias(&base));
    if let Some((left, _)) = base.split_once('/') {
        let left = left.trim();
        if !left.is_empty() {
            out.insert(rus_ident(left));
            out.insert(englishish_alias(left));
        }
    }
    out.retain(|a| !a.is_empty());
    out
}
