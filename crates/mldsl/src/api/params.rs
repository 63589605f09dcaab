//! Parameter list construction and normalization.

use super::{Param, router::select_scope_from_sign2};
use crate::{
    extract::{ArgBinding, Mode, RawAction},
    text::{normalize, strip_colors},
};

/// Per-mode canonical base name for parameters.
#[must_use]
pub fn canonical_base_for_mode(mode: Mode) -> &'static str {
    match mode {
        Mode::Variable => "var",
        Mode::Text => "text",
        Mode::Number => "num",
        Mode::Location => "loc",
        Mode::Array => "arr",
        Mode::Item => "item",
        Mode::Any => "value",
        Mode::Block | Mode::Vector => "arg",
    }
}

fn guess_param_base(arg: &ArgBinding) -> &'static str {
    let name = strip_colors(&arg.glass_name).to_lowercase();
    if name.contains("динамическ") || name.contains("переменн") || name.contains("variable") {
        return "var";
    }
    if name.contains("текст") || name.contains("text") {
        return "text";
    }
    if name.contains("числ") || name.contains("number") {
        return "num";
    }
    match arg.mode {
        Mode::Location => "loc",
        Mode::Array => "arr",
        Mode::Item => "item",
        Mode::Any => "value",
        Mode::Number => "num",
        Mode::Text => "text",
        Mode::Variable => "var",
        Mode::Block | Mode::Vector => "arg",
    }
}

/// Human-readable label from the marker pane text:
/// `"Число* - Шанс выпадения"` keeps the part after the structural
/// type prefix; anything else passes through.
#[must_use]
pub fn extract_param_label(glass_name: &str) -> String {
    let raw = strip_colors(glass_name).trim().replace('*', "");
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Some((left, right)) = raw.split_once(" - ") {
        const TYPE_PREFIXES: &[&str] = &[
            "число",
            "текст",
            "предмет",
            "массив",
            "местоположение",
            "местоположение(я)",
            "переменная",
            "number",
            "text",
            "item",
            "array",
            "location",
            "variable",
        ];
        if TYPE_PREFIXES.contains(&left.trim().to_lowercase().as_str()) {
            let label = right.trim();
            if !label.is_empty() {
                return label.to_owned();
            }
        }
    }
    raw.to_owned()
}

/// Raw params straight from the extracted bindings, named by pane text
/// with numeric suffixes for repeats.
#[must_use]
pub fn build_params(action: &RawAction) -> Vec<Param> {
    let mut used: ahash::AHashMap<&str, usize> = ahash::AHashMap::new();
    action
        .args
        .iter()
        .map(|arg| {
            let base = guess_param_base(arg);
            let n = used.entry(base).or_insert(0);
            *n += 1;
            let name = if *n == 1 { base.to_owned() } else { format!("{base}{n}") };
            Param { name, mode: arg.mode, slot: arg.arg_slot, label: extract_param_label(&arg.glass_name) }
        })
        .collect()
}

/// Pragmatic fallback slot maps for a short allow-list of actions whose
/// exported chest snapshots are known to be unreliable.
#[must_use]
pub fn build_params_fallback(sign1: &str, sign2: &str) -> Option<Vec<Param>> {
    let s1 = normalize(sign1);
    let s2 = normalize(sign2);

    // "Send message": the canonical 8-slot text ring around the center.
    if (s1 == "действие игрока" && s2 == "сообщение") || (s1 == "player action" && s2 == "send message") {
        let slots = [27usize, 28, 29, 30, 32, 33, 34, 35];
        return Some(
            slots
                .iter()
                .enumerate()
                .map(|(i, &slot)| Param {
                    name: if i == 0 { "text".to_owned() } else { format!("text{}", i + 1) },
                    mode: Mode::Text,
                    slot,
                    label: "Текст сообщения".to_owned(),
                })
                .collect(),
        );
    }

    // "Fill region": some exports drop the yellow block/item input.
    if (s1 == "игровое действие" && s2 == "заполнить область") || (s1 == "game action" && s2 == "fill region") {
        return Some(vec![
            Param { name: "value".to_owned(), mode: Mode::Any, slot: 13, label: "Значение/блок".to_owned() },
            Param { name: "loc".to_owned(), mode: Mode::Location, slot: 19, label: "Первая точка области".to_owned() },
            Param { name: "loc2".to_owned(), mode: Mode::Location, slot: 25, label: "Вторая точка области".to_owned() },
            Param { name: "num".to_owned(), mode: Mode::Number, slot: 40, label: "Режим заполнения".to_owned() },
        ]);
    }

    None
}

/// Merges fallback params into the raw list without clobbering slots
/// that are already present.
#[must_use]
pub fn merge_params(primary: Vec<Param>, extra: Option<Vec<Param>>) -> Vec<Param> {
    let mut out = primary;
    let Some(extra) = extra else { return out };
    let mut seen: ahash::AHashSet<usize> = out.iter().map(|p| p.slot).collect();
    for p in extra {
        if seen.insert(p.slot) {
            out.push(p);
        }
    }
    out
}

/// Renames every param to its mode-canonical base with numeric
/// suffixes. Returns true if any name changed.
fn canonicalize_param_names(params: &mut [Param]) -> bool {
    let mut counters: ahash::AHashMap<&'static str, usize> = ahash::AHashMap::new();
    let mut changed = false;
    for p in params {
        let base = canonical_base_for_mode(p.mode);
        let n = counters.entry(base).or_insert(0);
        *n += 1;
        let name = if *n == 1 { base.to_owned() } else { format!("{base}{n}") };
        if p.name != name {
            p.name = name;
            changed = true;
        }
    }
    changed
}

fn is_var_exists_context(sign1: &str, sign2: &str, gui: &str, menu: &str) -> bool {
    let s1 = normalize(sign1);
    let s2 = normalize(sign2);
    let gui = normalize(gui);
    let menu = normalize(menu);
    let exists = |s: &str| s == "переменная существует" || s == "variable exists";
    if (s1 == "если переменная" || s1 == "if variable") && exists(&s2) {
        return true;
    }
    select_scope_from_sign2(sign2).is_some() && (exists(&gui) || exists(&menu) || exists(&s2))
}

/// Semantic dedup plus canonical naming.
///
/// The "variable exists" family keeps exactly one VARIABLE input (the
/// lowest slot, renamed `var`); everything else only gets the canonical
/// mode-based names. Returns the new list and whether anything changed.
#[must_use]
pub fn normalize_semantic_params(
    sign1: &str,
    sign2: &str,
    gui: &str,
    menu: &str,
    params: Vec<Param>,
) -> (Vec<Param>, bool) {
    let mut out = params;
    let mut changed = false;

    if is_var_exists_context(sign1, sign2, gui, menu) {
        let var_slots: Vec<usize> =
            out.iter().filter(|p| p.mode == Mode::Variable).map(|p| p.slot).collect();
        if var_slots.len() > 1 {
            let keep_slot = *var_slots.iter().min().expect("non-empty");
            out.retain(|p| p.mode != Mode::Variable || p.slot == keep_slot);
            for p in &mut out {
                if p.mode == Mode::Variable {
                    p.name = "var".to_owned();
                }
            }
            changed = true;
        }
    }

    if canonicalize_param_names(&mut out) {
        changed = true;
    }
    (out, changed)
}
