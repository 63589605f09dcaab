//! Call-expression parsing and value classification.
//!
//! Everything here is quote-aware: double-quoted string literals with
//! backslash escapes are opaque to the structural scans.

use super::ast::CallArg;

/// Classification of one argument value, raw text preserved.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    /// `"…"` — the inner text, escapes still raw.
    Quoted(String),
    /// A plain numeric literal, verbatim.
    Number(String),
    /// `item(…)` literal, inner argument text.
    ItemCall(String),
    /// `loc(…)` literal, inner argument text.
    LocCall(String),
    /// `arr_save(name)` save-mode array reference.
    ArrSave(String),
    /// `var_save(name)` saved-variable reference.
    VarSave(String),
    /// Identifier or placeholder reference.
    Ident(String),
    /// Anything with arithmetic in it.
    Expr(String),
    Empty,
}

/// Splits on `sep` at paren depth zero, outside string literals.
#[must_use]
pub fn split_top_level(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for ch in s.chars() {
        if in_string {
            current.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                current.push(ch);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            c if c == sep && depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    parts.push(current);
    parts
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c == '_' || c.is_alphanumeric())
}

/// Parses the text between a call's parentheses into arguments.
///
/// `name=value` pieces become named arguments when the left side is a
/// plain word; empty named values (`text=`) are dropped entirely.
#[must_use]
pub fn parse_call_args(inner: &str) -> Vec<CallArg> {
    let inner = inner.trim();
    if inner.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for piece in split_top_level(inner, ',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        if let Some(eq) = find_named_eq(piece) {
            let (name, value) = piece.split_at(eq);
            let value = value[1..].trim();
            if value.is_empty() {
                continue;
            }
            out.push(CallArg { name: Some(name.trim().to_owned()), value: value.to_owned() });
        } else {
            out.push(CallArg { name: None, value: piece.to_owned() });
        }
    }
    out
}

/// Byte offset of the `=` introducing a named argument, if the piece is
/// shaped like one.
fn find_named_eq(piece: &str) -> Option<usize> {
    let bytes = piece.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in piece.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => {
                if bytes.get(i + 1) == Some(&b'=') {
                    return None;
                }
                return is_word(piece[..i].trim()).then_some(i);
            }
            _ => {}
        }
    }
    None
}

fn callish(raw: &str, head: &str) -> Option<String> {
    let rest = raw.strip_prefix(head)?;
    let rest = rest.trim_start();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner.to_owned())
}

fn quoted_inner(raw: &str) -> Option<String> {
    if !raw.starts_with('"') || raw.len() < 2 {
        return None;
    }
    // The closing quote must be the final character of the token.
    let mut escaped = false;
    for (i, ch) in raw.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == '"' {
            return (i == raw.len() - 1).then(|| raw[1..i].to_owned());
        }
    }
    None
}

fn is_plain_number(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    if s.is_empty() {
        return false;
    }
    let mut dots = 0;
    for ch in s.chars() {
        if ch == '.' {
            dots += 1;
            if dots > 1 {
                return false;
            }
        } else if !ch.is_ascii_digit() {
            return false;
        }
    }
    s.chars().any(|c| c.is_ascii_digit())
}

/// Classifies one raw argument value.
#[must_use]
pub fn classify_value(raw: &str) -> ValueKind {
    let raw = raw.trim();
    if raw.is_empty() {
        return ValueKind::Empty;
    }
    if let Some(inner) = quoted_inner(raw) {
        return ValueKind::Quoted(inner);
    }
    if let Some(inner) = callish(raw, "item") {
        return ValueKind::ItemCall(inner);
    }
    if let Some(inner) = callish(raw, "loc") {
        return ValueKind::LocCall(inner);
    }
    if let Some(inner) = callish(raw, "arr_save") {
        return ValueKind::ArrSave(inner.trim().to_owned());
    }
    if let Some(inner) = callish(raw, "var_save") {
        return ValueKind::VarSave(inner.trim().to_owned());
    }
    if is_plain_number(raw) {
        return ValueKind::Number(raw.to_owned());
    }
    match super::expr::parse_num_expr(raw) {
        Some(expr) if expr.is_simple() => ValueKind::Ident(raw.to_owned()),
        Some(_) => ValueKind::Expr(raw.to_owned()),
        None => ValueKind::Ident(raw.to_owned()),
    }
}

/// Processes a quoted text payload: backslash escapes are resolved and
/// unescaped `&x` color codes become `§x`.
#[must_use]
pub fn process_text_literal(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            },
            '&' if chars.peek().is_some() => out.push('§'),
            _ => out.push(ch),
        }
    }
    out
}

/// Quotes a string for embedding inside an emitted value token.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Normalizes an `item(…)` literal: a `type=<id>` keyword becomes the
/// positional id, `count` and `name` pass through (color codes resolved
/// inside the display name), everything is re-emitted in fixed order.
#[must_use]
pub fn normalize_item_literal(inner: &str) -> String {
    let mut id: Option<String> = None;
    let mut count: Option<String> = None;
    let mut name: Option<String> = None;
    for arg in parse_call_args(inner) {
        match arg.name.as_deref() {
            Some("type") => id = Some(arg.value),
            Some("count") => count = Some(arg.value),
            Some("name") => name = Some(arg.value),
            Some(_) => {}
            None => {
                if id.is_none() {
                    id = Some(arg.value);
                }
            }
        }
    }
    let mut parts: Vec<String> = Vec::new();
    parts.push(id.unwrap_or_else(|| quote("minecraft:stone")));
    if let Some(count) = count {
        parts.push(format!("count={count}"));
    }
    if let Some(name) = name {
        let rendered = match classify_value(&name) {
            ValueKind::Quoted(inner) => quote(&process_text_literal(&inner)),
            _ => name,
        };
        parts.push(format!("name={rendered}"));
    }
    format!("item({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_args_split_and_empty_values_drop() {
        let args = parse_call_args(r#"text="Привет", text2=, text3="#);
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].name.as_deref(), Some("text"));
        assert_eq!(args[0].value, "\"Привет\"");
    }

    #[test]
    fn equals_inside_strings_is_not_a_named_marker() {
        let args = parse_call_args(r#""[mnist] sum=%var(a)%", 5"#);
        assert_eq!(args.len(), 2);
        assert_eq!(args[0].name, None);
    }

    #[test]
    fn enum_comparison_values_stay_values() {
        let args = parse_call_args(r#"tip_proverki="==""#);
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].name.as_deref(), Some("tip_proverki"));
        assert_eq!(args[0].value, "\"==\"");
    }

    #[test]
    fn values_classify_by_shape() {
        assert!(matches!(classify_value("\"abc\""), ValueKind::Quoted(s) if s == "abc"));
        assert!(matches!(classify_value("-1.483046211"), ValueKind::Number(_)));
        assert!(matches!(classify_value("myVar"), ValueKind::Ident(_)));
        assert!(matches!(classify_value("%selected%idx"), ValueKind::Ident(_)));
        assert!(matches!(classify_value("%selected%idx+1"), ValueKind::Expr(_)));
        assert!(matches!(classify_value("item(type=stone)"), ValueKind::ItemCall(_)));
        assert!(matches!(classify_value("loc(\"1 2 3\")"), ValueKind::LocCall(_)));
        assert!(matches!(classify_value("arr_save(scores)"), ValueKind::ArrSave(s) if s == "scores"));
    }

    #[test]
    fn color_codes_substitute_unless_escaped() {
        assert_eq!(process_text_literal(r"&aok \&bkeep_amp"), "§aok &bkeep_amp");
        assert_eq!(process_text_literal(r#"say \"hi\""#), "say \"hi\"");
    }

    #[test]
    fn item_literals_normalize_type_keyword() {
        assert_eq!(
            normalize_item_literal(r#"type=prismarine_shard, name="1 2 3""#),
            r#"item(prismarine_shard, name="1 2 3")"#
        );
        assert_eq!(
            normalize_item_literal(r#""minecraft:magma_cream", name="&atest&btest""#),
            r#"item("minecraft:magma_cream", name="§atest§btest")"#
        );
        assert_eq!(normalize_item_literal(r#""minecraft:stick", count=5"#), r#"item("minecraft:stick", count=5)"#);
    }
}
