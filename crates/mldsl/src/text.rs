//! Layered string normalization for encoding-fragile GUI text.
//!
//! Every stage is a pure function; callers compose exactly the stages
//! they need. The dump pipeline applies color/control stripping, the
//! API layer additionally applies the mojibake rescue and the
//! transliteration passes, and the record-id builder applies the full
//! normalization.

use std::sync::LazyLock;

use regex::Regex;

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("\u{00a7}.").expect("valid regex"));
static CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("[\\x00-\\x1f]").expect("valid regex"));
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static SNAKE_SQUASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("[^a-z0-9]+").expect("valid regex"));
static IDENT_SQUASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").expect("valid regex"));
static UNDERSCORE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("_+").expect("valid regex"));
static PAGE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\s*\d+\s+(?:из|of)\s+\d+\s*\)\s*$").expect("valid regex"));

/// Removes `§x` color escapes and raw control characters.
#[must_use]
pub fn strip_colors(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = COLOR_RE.replace_all(text, "");
    CONTROL_RE.replace_all(&text, "").into_owned()
}

/// Case/whitespace-folded comparison key: colors stripped, NBSP mapped
/// to space, runs of whitespace collapsed, trimmed, lowercased.
#[must_use]
pub fn normalize(text: &str) -> String {
    let text = strip_colors(text).replace('\u{00a0}', " ");
    SPACE_RE.replace_all(&text, " ").trim().to_lowercase()
}

/// True if the string contains any native Cyrillic letter.
#[must_use]
pub fn has_cyrillic(text: &str) -> bool {
    text.chars().any(|ch| ('\u{0400}'..='\u{04ff}').contains(&ch))
}

/// cp1251 bytes misdecoded as Latin-1 land in this fixed character set.
/// The pairs map the damaged form back to the intended Cyrillic letter.
const MOJIBAKE_PAIRS: &[(char, char)] = &[
    ('à', 'а'),
    ('á', 'б'),
    ('â', 'в'),
    ('ã', 'г'),
    ('ä', 'д'),
    ('å', 'е'),
    ('¸', 'ё'),
    ('æ', 'ж'),
    ('ç', 'з'),
    ('è', 'и'),
    ('é', 'й'),
    ('ê', 'к'),
    ('ë', 'л'),
    ('ì', 'м'),
    ('í', 'н'),
    ('î', 'о'),
    ('ï', 'п'),
    ('ð', 'р'),
    ('ñ', 'с'),
    ('ò', 'т'),
    ('ó', 'у'),
    ('ô', 'ф'),
    ('õ', 'х'),
    ('ö', 'ц'),
    ('ø', 'ш'),
    ('ù', 'щ'),
    ('ú', 'ъ'),
    ('û', 'ы'),
    ('ü', 'ь'),
    ('ý', 'э'),
    ('þ', 'ю'),
    ('ÿ', 'я'),
    ('À', 'А'),
    ('Á', 'Б'),
    ('Â', 'В'),
    ('Ã', 'Г'),
    ('Ä', 'Д'),
    ('Å', 'Е'),
    ('¨', 'Ё'),
    ('Æ', 'Ж'),
    ('Ç', 'З'),
    ('È', 'И'),
    ('É', 'Й'),
    ('Ê', 'К'),
    ('Ë', 'Л'),
    ('Ì', 'М'),
    ('Í', 'Н'),
    ('Î', 'О'),
    ('Ï', 'П'),
    ('Ð', 'Р'),
    ('Ñ', 'С'),
    ('Ò', 'Т'),
    ('Ó', 'У'),
    ('Ô', 'Ф'),
    ('Õ', 'Х'),
    ('Ö', 'Ц'),
    ('×', 'Ч'),
    ('Ø', 'Ш'),
    ('Ù', 'Щ'),
    ('Ú', 'Ъ'),
    ('Û', 'Ы'),
    ('Ü', 'Ь'),
    ('Ý', 'Э'),
    ('Þ', 'Ю'),
    ('ß', 'Я'),
];

fn mojibake_target(ch: char) -> Option<char> {
    MOJIBAKE_PAIRS.iter().find(|(from, _)| *from == ch).map(|&(_, to)| to)
}

/// Fixed two-condition heuristic: at least two characters from the
/// damaged set and no native Cyrillic already present. `÷` shows up in
/// legitimate math labels, so its presence vetoes the rescue.
#[must_use]
pub fn looks_like_mojibake(text: &str) -> bool {
    if text.is_empty() || text.contains('÷') || has_cyrillic(text) {
        return false;
    }
    text.chars().filter(|&ch| mojibake_target(ch).is_some()).count() >= 2
}

/// Translates the fixed Latin-1-from-cp1251 set back to Cyrillic when
/// the heuristic fires; otherwise returns the input unchanged.
#[must_use]
pub fn rescue_mojibake(text: &str) -> String {
    if !looks_like_mojibake(text) {
        return text.to_owned();
    }
    text.chars().map(|ch| mojibake_target(ch).unwrap_or(ch)).collect()
}

/// Color strip plus mojibake rescue, the display-text cleanup the API
/// layer applies before any naming decision.
#[must_use]
pub fn clean_display(text: &str) -> String {
    rescue_mojibake(&strip_colors(text))
}

const TRANSLIT: &[(char, &str)] = &[
    ('а', "a"),
    ('б', "b"),
    ('в', "v"),
    ('г', "g"),
    ('д', "d"),
    ('е', "e"),
    ('ё', "e"),
    ('ж', "zh"),
    ('з', "z"),
    ('и', "i"),
    ('й', "y"),
    ('к', "k"),
    ('л', "l"),
    ('м', "m"),
    ('н', "n"),
    ('о', "o"),
    ('п', "p"),
    ('р', "r"),
    ('с', "s"),
    ('т', "t"),
    ('у', "u"),
    ('ф', "f"),
    ('х', "h"),
    ('ц', "ts"),
    ('ч', "ch"),
    ('ш', "sh"),
    ('щ', "sch"),
    ('ъ', ""),
    ('ы', "y"),
    ('ь', ""),
    ('э', "e"),
    ('ю', "yu"),
    ('я', "ya"),
];

/// Lowercases and transliterates Cyrillic letters to ASCII.
#[must_use]
pub fn translit(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars().flat_map(char::to_lowercase) {
        match TRANSLIT.iter().find(|(from, _)| *from == ch) {
            Some((_, to)) => out.push_str(to),
            None => out.push(ch),
        }
    }
    out
}

/// ASCII snake-case identifier: transliterated, parens opened up,
/// non-alphanumeric runs collapsed to `_`. Never empty and never
/// digit-leading.
#[must_use]
pub fn snake(text: &str) -> String {
    let t = translit(&clean_display(text)).replace(['(', ')'], " ");
    let t = SNAKE_SQUASH_RE.replace_all(&t, "_");
    let t = t.trim_matches('_');
    if t.is_empty() {
        return "unnamed".to_owned();
    }
    if t.starts_with(|ch: char| ch.is_ascii_digit()) {
        return format!("a_{t}");
    }
    t.to_owned()
}

/// Identifier form that keeps native letters: lowercased, parens opened
/// up, non-identifier runs collapsed to `_`.
#[must_use]
pub fn rus_ident(text: &str) -> String {
    let t = clean_display(text).trim().to_lowercase().replace(['(', ')'], " ");
    let t = IDENT_SQUASH_RE.replace_all(&t, "_");
    let t = UNDERSCORE_RUN_RE.replace_all(&t, "_");
    let t = t.trim_matches('_');
    if t.is_empty() { "unnamed".to_owned() } else { t.to_owned() }
}

/// Removes a trailing GUI pagination suffix like `(5 из 5)` so that
/// multi-page titles produce one stable alias.
#[must_use]
pub fn strip_page_suffix(text: &str) -> String {
    let t = clean_display(text);
    PAGE_SUFFIX_RE.replace(t.trim(), "").trim().to_owned()
}

/// Enum option labels compare with case, whitespace and separators
/// folded away entirely.
#[must_use]
pub fn norm_enum_label(text: &str) -> String {
    normalize(text).replace(' ', "")
}
