//! GUI dump reading: byte cleanup, record splitting, key=value parsing.

use std::{fs, path::Path, sync::LazyLock};

use regex::Regex;

use super::record::{ActionRecord, ExtractDiagnostics, SlotItem};
use crate::error::{Error, Result};

static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^item=slot\s+(\d+):\s+\[(\S+)\s+meta=(\d+)\]\s+(.*)$").expect("valid regex"));

/// Reads the dump file, strips NUL bytes and decodes as UTF-8 with
/// lossy fallback. Absence of the file is a missing-input error.
pub fn read_dump_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }
    let mut data = fs::read(path)?;
    data.retain(|&b| b != 0);
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Splits the dump into records on `# record` separators.
///
/// Item lines that fail the fixed regex are skipped (counted in the
/// diagnostics); fully empty records are dropped. The reader never
/// invents records.
#[must_use]
pub fn parse_dump(text: &str) -> (Vec<ActionRecord>, ExtractDiagnostics) {
    let mut diagnostics = ExtractDiagnostics::default();
    let mut records = Vec::new();
    let mut chunk: Vec<&str> = Vec::new();
    let mut flush = |chunk: &mut Vec<&str>, diagnostics: &mut ExtractDiagnostics, records: &mut Vec<ActionRecord>| {
        if chunk.is_empty() {
            return;
        }
        let record = parse_record_lines(chunk, diagnostics);
        if record.is_empty() {
            diagnostics.empty_records += 1;
        } else {
            records.push(record);
        }
        chunk.clear();
    };
    for line in text.lines() {
        if line.starts_with("# record") {
            flush(&mut chunk, &mut diagnostics, &mut records);
        } else if line.starts_with("records=") {
            continue;
        } else {
            chunk.push(line);
        }
    }
    flush(&mut chunk, &mut diagnostics, &mut records);
    (records, diagnostics)
}

fn parse_record_lines(lines: &[&str], diagnostics: &mut ExtractDiagnostics) -> ActionRecord {
    let mut record = ActionRecord::default();
    for line in lines {
        if let Some(rest) = line.strip_prefix("path=") {
            record.path = rest.to_owned();
        } else if let Some(rest) = line.strip_prefix("category=") {
            record.category = rest.to_owned();
        } else if let Some(rest) = line.strip_prefix("subitem=") {
            record.subitem = rest.to_owned();
        } else if let Some(rest) = line.strip_prefix("gui=") {
            record.gui = rest.to_owned();
        } else if let Some(rest) = line.strip_prefix("sign1=") {
            record.signs[0] = rest.to_owned();
        } else if let Some(rest) = line.strip_prefix("sign2=") {
            record.signs[1] = rest.to_owned();
        } else if let Some(rest) = line.strip_prefix("sign3=") {
            record.signs[2] = rest.to_owned();
        } else if let Some(rest) = line.strip_prefix("sign4=") {
            record.signs[3] = rest.to_owned();
        } else if let Some(rest) = line.strip_prefix("hasChest=") {
            record.has_chest = rest.trim().eq_ignore_ascii_case("true");
        } else if line.starts_with("item=") {
            match parse_item_line(line) {
                Some((slot, item)) => {
                    record.items.insert(slot, item);
                }
                None => diagnostics.skipped_item_lines += 1,
            }
        }
    }
    record
}

fn parse_item_line(line: &str) -> Option<(usize, SlotItem)> {
    let caps = ITEM_RE.captures(line)?;
    let slot: usize = caps[1].parse().ok()?;
    let meta: u8 = caps[3].parse().ok()?;
    let rest = &caps[4];
    let (name, lore) = match rest.split_once(" | ") {
        Some((name, lore)) => (name.trim(), lore.trim()),
        None => (rest.trim(), ""),
    };
    Some((
        slot,
        SlotItem { id: caps[2].trim().to_owned(), meta, name: name.to_owned(), lore: lore.to_owned() },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "records=2\n\
# record 1\n\
path=events/join\n\
category=События\n\
subitem=[minecraft:diamond meta=0] Вход | §7Срабатывает при входе\n\
gui=Вход\n\
sign1=Событие игрока\n\
sign2=Вход\n\
hasChest=false\n\
# record 2\n\
path=actions/msg\n\
sign1=Действие игрока\n\
sign2=Сообщение\n\
hasChest=true\n\
item=slot 9: [minecraft:stained_glass_pane meta=3] Текст* | Введите текст\n\
item=slot 10: [minecraft:book meta=0] Любой\n\
item=garbage that does not match\n\
# record 3\n\
";

    #[test]
    fn records_split_on_separator_lines() {
        let (records, diagnostics) = parse_dump(DUMP);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].signs[1], "Вход");
        assert!(!records[0].has_chest);
        assert!(records[1].has_chest);
        assert_eq!(diagnostics.skipped_item_lines, 1);
        assert_eq!(diagnostics.empty_records, 0);
    }

    #[test]
    fn item_lines_parse_slot_id_meta_name_and_lore() {
        let (records, _) = parse_dump(DUMP);
        let item = &records[1].items[&9];
        assert_eq!(item.id, "minecraft:stained_glass_pane");
        assert_eq!(item.meta, 3);
        assert_eq!(item.name, "Текст*");
        assert_eq!(item.lore, "Введите текст");
        let plain = &records[1].items[&10];
        assert_eq!(plain.lore, "");
    }

    #[test]
    fn missing_file_is_a_missing_input_error() {
        let err = read_dump_file(Path::new("/nonexistent/regallactions_export.txt")).unwrap_err();
        assert!(matches!(err, Error::MissingInput(_)));
    }
}
