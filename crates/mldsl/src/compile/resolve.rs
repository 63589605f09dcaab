//! Call resolution: alias-indexed lookup over the ApiMap, with the
//! select-domain scoping and bridge rules.

use ahash::AHashMap;

use crate::{
    api::{ApiFunc, ApiMap, SelectScope, select_scope_from_sign2},
    text::normalize,
};

/// Identifier comparison key: lowercased, whitespace folded to single
/// underscores.
#[must_use]
pub fn norm_ident(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_sep = false;
    for ch in s.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() || ch == '_' {
            if !prev_sep {
                out.push('_');
            }
            prev_sep = true;
        } else {
            out.push(ch);
            prev_sep = false;
        }
    }
    out
}

/// Outcome of a select-domain resolution attempt.
pub enum SelectLookup<'a> {
    Found { module: &'a str, name: &'a str, func: &'a ApiFunc },
    Ambiguous(Vec<String>),
    Unknown,
}

/// Two-table lookup over the API: canonical `(module, name)` plus an
/// alias table `(module, alias) → name`. Both lookups are O(1).
pub struct ActionIndex<'a> {
    api: &'a ApiMap,
    alias: AHashMap<(String, String), String>,
}

impl<'a> ActionIndex<'a> {
    #[must_use]
    pub fn new(api: &'a ApiMap) -> Self {
        let mut alias = AHashMap::new();
        for (module, funcs) in api {
            for (name, func) in funcs {
                for a in &func.aliases {
                    let key = (module.clone(), norm_ident(a));
                    alias.entry(key).or_insert_with(|| name.clone());
                }
            }
        }
        Self { api, alias }
    }

    /// Canonical-or-alias lookup inside one module.
    #[must_use]
    pub fn get(&self, module: &str, name: &str) -> Option<(&'a str, &'a ApiFunc)> {
        let funcs = self.api.get(module)?;
        if let Some((key, func)) = funcs.get_key_value(name) {
            return Some((key.as_str(), func));
        }
        let name_n = norm_ident(name);
        if let Some((key, func)) = funcs.get_key_value(name_n.as_str()) {
            return Some((key.as_str(), func));
        }
        let canonical = self.alias.get(&(module.to_owned(), name_n))?;
        funcs.get_key_value(canonical.as_str()).map(|(k, f)| (k.as_str(), f))
    }

    fn iter_all(&self) -> impl Iterator<Item = (&'a str, &'a str, &'a ApiFunc)> + '_ {
        self.api
            .iter()
            .flat_map(|(m, funcs)| funcs.iter().map(move |(n, f)| (m.as_str(), n.as_str(), f)))
    }

    fn leaf_matches(name: &str, func: &ApiFunc, scope: Option<SelectScope>, leaf_n: &str) -> bool {
        if norm_ident(name) == leaf_n {
            return true;
        }
        if let Some(scope) = scope {
            let prefix = format!("{}_", scope.prefix());
            if name.strip_prefix(&prefix).is_some_and(|base| norm_ident(base) == leaf_n) {
                return true;
            }
        }
        if !func.menu.is_empty() && norm_ident(&func.menu) == leaf_n {
            return true;
        }
        func.aliases.iter().any(|a| norm_ident(a) == leaf_n)
    }

    fn in_scope(name: &str, func: &ApiFunc, scope: SelectScope) -> bool {
        name.starts_with(&format!("{}_", scope.prefix())) || select_scope_from_sign2(&func.sign2) == Some(scope)
    }

    fn is_selectish(module: &str, func: &ApiFunc) -> bool {
        module == "select" || {
            let s1 = normalize(&func.sign1);
            s1.contains("выбрать объект") || s1.contains("выбрать обьект") || s1.contains("select object")
        }
    }

    /// Resolves `select.<scope>.<leaf>` (or unscoped `select.<leaf>`).
    ///
    /// Scoped lookups fall back to the bridge modules
    /// (`if_player`/`if_mob`/`if_entity`): the leaf is canonicalized
    /// through their alias sets, then re-matched against the domain.
    /// Unscoped lookups fail loudly when more than one domain matches.
    #[must_use]
    pub fn resolve_select(&self, scope: Option<SelectScope>, leaf: &str) -> SelectLookup<'a> {
        let leaf_n = norm_ident(leaf);
        match scope {
            Some(scope) => {
                if let Some(found) = self.scoped_select(scope, &leaf_n) {
                    return found;
                }
                // Bridge: canonicalize the leaf through the plain if-module.
                if let Some((bridge_name, bridge_func)) = self.get(scope.bridge_module(), leaf) {
                    let mut names: Vec<String> = vec![norm_ident(bridge_name)];
                    if !bridge_func.menu.is_empty() {
                        names.push(norm_ident(&bridge_func.menu));
                    }
                    names.extend(bridge_func.aliases.iter().map(|a| norm_ident(a)));
                    for name in names {
                        if let Some(found) = self.scoped_select(scope, &name) {
                            return found;
                        }
                    }
                }
                SelectLookup::Unknown
            }
            None => {
                let mut matches: Vec<(&'a str, &'a str, &'a ApiFunc)> = Vec::new();
                for (module, name, func) in self.iter_all() {
                    if Self::is_selectish(module, func) && Self::leaf_matches(name, func, None, &leaf_n) {
                        matches.push((module, name, func));
                    }
                }
                match matches.len() {
                    0 => SelectLookup::Unknown,
                    1 => {
                        let (module, name, func) = matches[0];
                        SelectLookup::Found { module, name, func }
                    }
                    _ => SelectLookup::Ambiguous(
                        matches.iter().map(|(m, n, _)| format!("{m}.{n}")).collect(),
                    ),
                }
            }
        }
    }

    fn scoped_select(&self, scope: SelectScope, leaf_n: &str) -> Option<SelectLookup<'a>> {
        for (module, name, func) in self.iter_all() {
            if Self::in_scope(name, func, scope) && Self::leaf_matches(name, func, Some(scope), leaf_n) {
                return Some(SelectLookup::Found { module, name, func });
            }
        }
        None
    }

    /// The function-call action used by `call(...)` and the trampoline
    /// splitter.
    #[must_use]
    pub fn call_function(&self) -> Option<(&'a str, &'a ApiFunc)> {
        for (_, name, func) in self.iter_all() {
            let s2 = normalize(&func.sign2);
            if s2 == "вызвать функцию"
                || s2 == "call function"
                || name == "call_function"
                || func.aliases.iter().any(|a| norm_ident(a) == "call_function" || norm_ident(a) == "вызвать_функцию")
            {
                return Some((name, func));
            }
        }
        None
    }

    /// The "select everything" action for a multiselect scope.
    #[must_use]
    pub fn select_all(&self, scope: SelectScope) -> Option<&'a ApiFunc> {
        let (aliases, sign2): (&[&str], &[&str]) = match scope {
            SelectScope::IfPlayer => (&["все_игроки", "allplayers", "vse_igroki"], &["все игроки", "all players"]),
            SelectScope::IfMob => (&["все_мобы", "allmobs", "vse_moby"], &["все мобы", "all mobs"]),
            SelectScope::IfEntity => {
                (&["все_сущности", "allentities", "vse_suschnosti"], &["все сущности", "all entities"])
            }
        };
        for (_, name, func) in self.iter_all() {
            if sign2.contains(&normalize(&func.sign2).as_str())
                || aliases.contains(&norm_ident(name).as_str())
                || func.aliases.iter().any(|a| aliases.contains(&norm_ident(a).as_str()))
            {
                return Some(func);
            }
        }
        None
    }

    /// The scope-appropriate "compare numbers (simple)" condition the
    /// multiselect expansion ends with.
    #[must_use]
    pub fn compare_simple(&self, scope: SelectScope) -> Option<&'a ApiFunc> {
        for (_, name, func) in self.iter_all() {
            if !Self::in_scope(name, func, scope) {
                continue;
            }
            let menu = normalize(&func.menu);
            if menu.contains("сравнить числ") || menu.contains("compare number") {
                return Some(func);
            }
        }
        None
    }

    /// Recovers an event's sign pair from the optional `event` module.
    #[must_use]
    pub fn event_signs(&self, event_name: &str) -> Option<(String, String)> {
        let funcs = self.api.get("event")?;
        let wanted = norm_ident(event_name);
        for func in funcs.values() {
            if norm_ident(&func.sign2) == wanted
                || norm_ident(&func.menu) == wanted
                || func.aliases.iter().any(|a| norm_ident(a) == wanted)
            {
                let sign1 = if func.sign1.is_empty() { "Событие игрока".to_owned() } else { func.sign1.clone() };
                let sign2 = if func.sign2.is_empty() { event_name.to_owned() } else { func.sign2.clone() };
                return Some((sign1, sign2));
            }
        }
        None
    }
}
