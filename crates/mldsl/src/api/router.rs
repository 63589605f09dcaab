//! Sign-header routing: which module an action belongs to, and how the
//! `select` module partitions into condition domains.

use crate::text::clean_display;

/// The three condition-scoped select domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectScope {
    IfPlayer,
    IfMob,
    IfEntity,
}

impl SelectScope {
    /// Canonical-name prefix inside the `select` module.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::IfPlayer => "ifplayer",
            Self::IfMob => "ifmob",
            Self::IfEntity => "ifentity",
        }
    }

    /// The plain `if_*` module that bridges leaf aliases for this scope.
    #[must_use]
    pub fn bridge_module(self) -> &'static str {
        match self {
            Self::IfPlayer => "if_player",
            Self::IfMob => "if_mob",
            Self::IfEntity => "if_entity",
        }
    }

    /// Parses both spellings accepted in DSL source
    /// (`if_player`/`ifplayer`, …).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "if_player" | "ifplayer" => Some(Self::IfPlayer),
            "if_mob" | "ifmob" => Some(Self::IfMob),
            "if_entity" | "ifentity" => Some(Self::IfEntity),
            _ => None,
        }
    }

    #[must_use]
    pub fn all() -> [Self; 3] {
        [Self::IfPlayer, Self::IfMob, Self::IfEntity]
    }
}

/// Chooses the module for an action from its first sign line.
#[must_use]
pub fn module_for_sign1(sign1: &str) -> String {
    let s = clean_display(sign1).trim().to_lowercase();
    if s.contains("действие игрока") || s.contains("player action") {
        return "player".to_owned();
    }
    if s.contains("игровое действие") || s.contains("game action") {
        return "game".to_owned();
    }
    // Both orthographic variants of the select header occur in dumps.
    if s.contains("выбрать объект") || s.contains("выбрать обьект") || s.contains("select object") {
        return "select".to_owned();
    }
    if s.contains("массив") || s.contains("array") {
        return "array".to_owned();
    }
    if s.contains("присв")
        || s.contains("установить переменную")
        || s == "переменную"
        || s.contains("set variable")
        || s.contains("assign variable")
    {
        return "var".to_owned();
    }
    if let Some(rest) = s.strip_prefix("если ").or_else(|| s.strip_prefix("if ")) {
        if rest.contains("игра") || rest.contains("game") {
            return "if_game".to_owned();
        }
        if rest.contains("игрок") || rest.contains("player") {
            return "if_player".to_owned();
        }
        if rest.contains("сущ") || rest.contains("моб") || rest.contains("entity") || rest.contains("mob") {
            return "if_entity".to_owned();
        }
        if rest.contains("значен") || rest.contains("перемен") || rest.contains("value") || rest.contains("variable") {
            return "if_value".to_owned();
        }
        return "if".to_owned();
    }
    "misc".to_owned()
}

/// Maps the five arithmetic sign2 tokens of the `var` module to fixed
/// canonical names.
#[must_use]
pub fn var_operator_func(sign2: &str) -> Option<&'static str> {
    match sign2 {
        "=" => Some("set_value"),
        "+" => Some("set_sum"),
        "-" => Some("set_difference"),
        "*" => Some("set_product"),
        "/" => Some("set_quotient"),
        _ => None,
    }
}

/// Recognizes the "<kind> by condition" sign2 of the select module.
#[must_use]
pub fn select_scope_from_sign2(sign2: &str) -> Option<SelectScope> {
    let s = clean_display(sign2).trim().to_lowercase();
    let conditional = s.contains("по условию") || s.contains("by condition");
    if !conditional {
        return None;
    }
    if s.contains("игрок") || s.contains("player") {
        return Some(SelectScope::IfPlayer);
    }
    if s.contains("моб") || s.contains("mob") {
        return Some(SelectScope::IfMob);
    }
    if s.contains("сущност") || s.contains("entity") {
        return Some(SelectScope::IfEntity);
    }
    None
}
