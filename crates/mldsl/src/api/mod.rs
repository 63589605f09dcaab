//! The API normalizer: raw catalog in, stable alias-indexed surface out.

mod aliases;
mod contract;
mod json;
mod params;
pub mod router;

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;

pub use self::{
    aliases::{englishish_alias, menu_short_aliases, parse_item_display_name},
    contract::validate_api_contract,
    json::{parse_api_json, render_api_json},
    params::{build_params, build_params_fallback, merge_params, normalize_semantic_params},
    router::{SelectScope, module_for_sign1, select_scope_from_sign2, var_operator_func},
};
use crate::{
    extract::{Catalog, Mode, RawAction},
    text::{clean_display, rus_ident, snake, strip_page_suffix},
};

/// One normalized parameter of an [`ApiFunc`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Param {
    pub name: String,
    pub mode: Mode,
    pub slot: usize,
    #[serde(default)]
    pub label: String,
}

/// A named option list bound to a chest slot.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ApiEnum {
    pub name: String,
    pub slot: usize,
    /// Label → click index, in lore order.
    pub options: IndexMap<String, usize>,
}

/// Where the parameter list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamSource {
    Raw,
    Normalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FuncMeta {
    #[serde(rename = "paramSource")]
    pub param_source: ParamSource,
}

/// The normalized unit: one canonical function per action.
///
/// Field order is the emitted JSON key order and must not change.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ApiFunc {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub sign1: String,
    #[serde(default)]
    pub sign2: String,
    #[serde(default)]
    pub gui: String,
    #[serde(default)]
    pub menu: String,
    pub aliases: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "descriptionRaw")]
    pub description_raw: String,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub enums: Vec<ApiEnum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<FuncMeta>,
}

/// `{module: {canonical_name: spec}}`, insertion-ordered throughout.
pub type ApiMap = IndexMap<String, IndexMap<String, ApiFunc>>;

/// Optional per-action canonical-name override.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct NameOverride {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Module names a user-supplied override must not shadow.
const RESERVED_NAMES: &[&str] =
    &["player", "event", "game", "var", "array", "misc", "if_player", "if_game", "if_value"];

fn extract_description(action: &RawAction, keep_colors: bool) -> String {
    let raw = if action.subitem.is_empty() { &action.category } else { &action.subitem };
    let raw = if keep_colors { raw.clone() } else { clean_display(raw) };
    let raw = raw.replace("\\n", "\n");
    let raw = raw.split_once(" | ").map_or(raw.as_str(), |(_, rest)| rest);
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0usize;
    // Collapse runs of three or more newlines down to a blank line.
    for line in raw.trim().split('\n') {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
    }
    out
}

fn guess_enum_name(name: &str) -> String {
    let n = clean_display(name).to_lowercase();
    if n.contains("синхрон") || n.contains("асинхрон") || (n.contains("запуск") && n.contains("функц")) {
        return "async".to_owned();
    }
    if n.contains("раздел") {
        return "separator".to_owned();
    }
    if n.contains("учитывать") && n.contains("пуст") {
        return "include_empty".to_owned();
    }
    snake(name).chars().take(32).collect()
}

fn build_enums(action: &RawAction) -> Vec<ApiEnum> {
    action
        .enums
        .iter()
        .map(|e| ApiEnum {
            name: guess_enum_name(&e.name),
            slot: e.slot,
            options: e
                .variant
                .options
                .iter()
                .enumerate()
                .map(|(i, o)| (clean_display(o).trim().to_owned(), i))
                .collect(),
        })
        .collect()
}

/// Folds the raw catalog into the canonical API surface.
///
/// Deterministic over the catalog order: modules and functions appear
/// in discovery order, aliases sorted, collisions suffixed numerically.
#[must_use]
pub fn build_api(catalog: &Catalog, overrides: &HashMap<String, NameOverride>) -> ApiMap {
    let mut api: ApiMap = ApiMap::new();
    let mut collisions: HashMap<String, usize> = HashMap::new();

    for action in catalog {
        let sign1 = clean_display(&action.signs[0]).trim().to_owned();
        let sign2 = clean_display(&action.signs[1]).trim().to_owned();
        let gui = clean_display(&action.gui).trim().to_owned();
        // The clickable menu name is more descriptive than sign2 (which
        // is often shortened to fit the physical sign), so canonical
        // naming prefers it.
        let menu_source = if action.subitem.is_empty() { &action.category } else { &action.subitem };
        let menu = parse_item_display_name(menu_source);

        let module = module_for_sign1(&sign1);
        let scope = if module == "select" { select_scope_from_sign2(&sign2) } else { None };

        let sign2_or_gui = if sign2.is_empty() { gui.as_str() } else { sign2.as_str() };
        let func = match var_operator_func(&sign2) {
            Some(name) if module == "var" => name.to_owned(),
            _ => {
                let base = [menu.as_str(), sign2.as_str(), gui.as_str()]
                    .into_iter()
                    .find(|s| !s.is_empty())
                    .unwrap_or_default();
                snake(base)
            }
        };
        let legacy_func = snake(sign2_or_gui);

        let canonical = overrides
            .get(&action.id)
            .or_else(|| overrides.get(&format!("{module}.{func}")));
        let mut name_override = canonical.and_then(|c| c.name.clone());
        if name_override
            .as_deref()
            .is_some_and(|n| RESERVED_NAMES.contains(&n.trim().to_lowercase().as_str()))
        {
            name_override = None;
        }
        let alias_override: Vec<String> = canonical.map(|c| c.aliases.clone()).unwrap_or_default();

        let mut final_name = match scope {
            Some(scope) => format!("{}_{}", scope.prefix(), func),
            None => name_override.clone().unwrap_or_else(|| func.clone()),
        };
        let module_funcs = api.entry(module.clone()).or_default();
        if module_funcs.contains_key(&final_name) {
            let counter = collisions.entry(format!("{module}.{final_name}")).or_insert(0);
            *counter += 1;
            final_name = format!("{final_name}_{counter}");
        }

        let merged_params = merge_params(build_params(action), build_params_fallback(&sign1, &sign2));
        let (normalized_params, params_changed) =
            normalize_semantic_params(&sign1, &sign2, &gui, &menu, merged_params);

        let gui_clean = strip_page_suffix(&gui);
        let mut alias_set: BTreeSet<String> = BTreeSet::new();
        alias_set.insert(final_name.clone());
        alias_set.extend(alias_override);
        alias_set.insert(legacy_func.clone());
        alias_set.insert(englishish_alias(sign2_or_gui));
        alias_set.insert(rus_ident(sign2_or_gui));
        alias_set.insert(rus_ident(&gui_clean));
        alias_set.insert(englishish_alias(&gui_clean));
        alias_set.extend(menu_short_aliases(&menu));
        if let Some(name) = name_override.filter(|n| *n != final_name) {
            alias_set.insert(name);
        }
        if scope.is_some() {
            // Historical names stay as a bridge for completion compatibility.
            alias_set.insert(func);
            alias_set.insert(legacy_func);
        }
        alias_set.retain(|a| !a.is_empty());

        module_funcs.insert(
            final_name,
            ApiFunc {
                id: action.id.clone(),
                sign1,
                sign2,
                gui,
                menu,
                aliases: alias_set.into_iter().collect(),
                description: extract_description(action, false),
                description_raw: extract_description(action, true),
                params: normalized_params,
                enums: build_enums(action),
                meta: Some(FuncMeta {
                    param_source: if params_changed { ParamSource::Normalized } else { ParamSource::Raw },
                }),
            },
        );
    }

    api
}

impl ApiFunc {
    /// True when the function is a condition (opens a nested scope,
    /// accepts `NOT`).
    #[must_use]
    pub fn is_conditional(&self, module: &str) -> bool {
        module.starts_with("if") || select_scope_from_sign2(&self.sign2).is_some()
    }

    /// Display name of a plan entry for this function:
    /// `{menu-or-sign2}||{sign2}`.
    #[must_use]
    pub fn entry_name(&self) -> String {
        let left = if self.menu.is_empty() { self.sign2.as_str() } else { self.menu.as_str() };
        format!("{left}||{}", self.sign2)
    }
}
