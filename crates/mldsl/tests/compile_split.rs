//! Row auto-splitting: budget enforcement, trampolines, newline
//! continuations, and the collapse/promote post-passes.

mod common;

use common::{base_api, compile, compile_err};
use mldsl::{Block, Config, NO_ARGS, PlanEntry, collapse_autosplit_trampolines, promote_autosplit_targets};
use pretty_assertions::assert_eq;

fn many_msgs(count: usize) -> Vec<String> {
    let mut lines = vec!["event(\"Вход\") {".to_owned()];
    for i in 0..count {
        lines.push(format!("    player.msg(text=\"m{i}\")"));
    }
    lines.push("}".to_owned());
    lines
}

fn row_action_counts(entries: &[PlanEntry]) -> Vec<usize> {
    let mut counts = vec![0usize];
    for e in entries {
        match e.block {
            Block::Newline => counts.push(0),
            Block::DiamondBlock | Block::LapisBlock | Block::EmeraldBlock | Block::Skip => {}
            _ => *counts.last_mut().expect("non-empty") += 1,
        }
    }
    counts
}

#[test]
fn overflowing_row_splits_through_a_trampoline_function() {
    let lines = many_msgs(44);
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let plan = compile(&refs);

    let blocks: Vec<Block> = plan.entries.iter().map(|e| e.block).collect();
    assert!(blocks.contains(&Block::LapisBlock));
    assert!(
        plan.entries.iter().any(|e| e.args.contains("slot(13)=text(__autosplit_row_")),
        "expected a trampoline call entry"
    );
    assert!(plan.entries.iter().any(|e| e.block == Block::LapisBlock && e.name.starts_with("__autosplit_row_")));
}

#[test]
fn no_row_exceeds_the_effective_budget() {
    let lines = many_msgs(130);
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let plan = compile(&refs);
    for count in row_action_counts(&plan.entries) {
        assert!(count <= 42, "row with {count} actions exceeds the budget");
    }
    // Every emitted message survives the splitting.
    let msgs = plan.entries.iter().filter(|e| e.name == "Сообщение||Сообщение").count();
    assert_eq!(msgs, 130);
}

#[test]
fn nested_condition_overflow_falls_back_to_newline_split() {
    let mut lines = vec!["event(\"Вход\") {".to_owned(), "    if_value.переменная_существует(var=x) {".to_owned()];
    for i in 0..60 {
        lines.push(format!("        player.msg(text=\"m{i}\")"));
    }
    lines.push("    }".to_owned());
    lines.push("}".to_owned());
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let plan = compile(&refs);
    assert!(plan.entries.iter().any(|e| e.block == Block::Newline));
}

#[test]
fn continuation_rows_repeat_the_leading_headers() {
    let mut lines = vec!["event(\"Вход\") {".to_owned(), "    if_value.переменная_существует(var=x) {".to_owned()];
    for i in 0..70 {
        lines.push(format!("        player.msg(text=\"m{i}\")"));
    }
    lines.push("    }".to_owned());
    lines.push("}".to_owned());
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let plan = compile(&refs);

    let mut after_newline = true;
    for e in &plan.entries {
        if e.block == Block::Newline {
            after_newline = true;
            continue;
        }
        if after_newline {
            assert!(e.is_header(), "row starts with {:?} instead of a header", e.block);
        }
        after_newline = false;
    }
}

#[test]
fn mixed_split_keeps_trampoline_targets_resolvable() {
    let mut lines = vec!["event(\"Вход\") {".to_owned()];
    for i in 0..42 {
        lines.push(format!("    player.msg(text=\"a{i}\")"));
    }
    lines.push("    if_value.переменная_существует(var=x) {".to_owned());
    for i in 0..60 {
        lines.push(format!("        player.msg(text=\"b{i}\")"));
    }
    lines.push("    }".to_owned());
    lines.push("}".to_owned());
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let plan = compile(&refs);

    let mut targets = Vec::new();
    for e in &plan.entries {
        if let Some(rest) = e.args.strip_prefix("slot(13)=text(__autosplit_row_") {
            let id: String = rest.chars().take_while(char::is_ascii_digit).collect();
            targets.push(format!("__autosplit_row_{id}"));
        }
    }
    assert!(!targets.is_empty());
    let func_names: Vec<&str> = plan
        .entries
        .iter()
        .filter(|e| e.block == Block::LapisBlock)
        .map(|e| e.name.as_str())
        .collect();
    for target in &targets {
        assert!(func_names.contains(&target.as_str()), "unresolved trampoline target {target}");
    }
}

#[test]
fn func_overflow_does_not_duplicate_the_named_header() {
    let mut lines = vec!["func heavy {".to_owned()];
    for i in 0..43 {
        lines.push(format!("    player.msg(text=\"m{i}\")"));
    }
    lines.push("}".to_owned());
    lines.push("event(\"Вход\") {".to_owned());
    lines.push("    call(heavy)".to_owned());
    lines.push("}".to_owned());
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let plan = compile(&refs);

    let heavy_headers =
        plan.entries.iter().filter(|e| e.block == Block::LapisBlock && e.name == "heavy").count();
    assert_eq!(heavy_headers, 1);
    assert!(plan.entries.iter().any(|e| e.name == "Вызвать функцию||Вызвать функцию"
        && e.args.contains("__autosplit_row_")));
}

#[test]
fn tiny_call_limit_cannot_reserve_the_closing_brace() {
    let config = Config { call_limit: 1, ..Config::default() };
    let err = compile_err(&["event(\"Вход\") {", "player.msg(text=\"x\")", "}"], &base_api(), &config);
    assert!(err.to_string().contains("reserved for closing '}'"), "got: {err}");
}

fn call_entry(target: &str) -> PlanEntry {
    PlanEntry::action(Block::NetherBrick, "Вызвать функцию||Вызвать функцию", format!("slot(13)=text({target})"))
}

fn collapse_fixture() -> Vec<PlanEntry> {
    vec![
        PlanEntry::action(Block::DiamondBlock, "Событие игрока||Вход", NO_ARGS),
        call_entry("__autosplit_row_1"),
        PlanEntry::layout(Block::Newline),
        PlanEntry::action(Block::LapisBlock, "__autosplit_row_1", NO_ARGS),
        call_entry("__autosplit_row_2"),
        PlanEntry::layout(Block::Newline),
        PlanEntry::action(Block::LapisBlock, "__autosplit_row_2", NO_ARGS),
        PlanEntry::action(Block::IronBlock, "=||=", "slot(13)=var(x),slot(27)=num(1)"),
    ]
}

#[test]
fn collapse_drops_single_call_trampolines() {
    let (compact, collapsed) = collapse_autosplit_trampolines(&collapse_fixture());
    assert_eq!(collapsed, 1);
    assert!(compact.iter().any(|e| e.block == Block::LapisBlock && e.name == "__autosplit_row_2"));
    assert!(!compact.iter().any(|e| e.block == Block::LapisBlock && e.name == "__autosplit_row_1"));
    assert!(compact.iter().any(|e| e.args == "slot(13)=text(__autosplit_row_2)"));
}

#[test]
fn promote_moves_trampoline_body_into_named_wrapper() {
    let entries = vec![
        PlanEntry::action(Block::DiamondBlock, "Событие игрока||Вход", NO_ARGS),
        call_entry("foo"),
        PlanEntry::layout(Block::Newline),
        PlanEntry::action(Block::LapisBlock, "foo", NO_ARGS),
        call_entry("__autosplit_row_1"),
        PlanEntry::layout(Block::Newline),
        PlanEntry::action(Block::LapisBlock, "__autosplit_row_1", NO_ARGS),
        PlanEntry::action(Block::IronBlock, "=||=", "slot(13)=var(x),slot(27)=num(1)"),
    ];
    let (compact, promoted) = promote_autosplit_targets(&entries);
    assert_eq!(promoted, 1);
    assert!(!compact.iter().any(|e| e.block == Block::LapisBlock && e.name == "__autosplit_row_1"));
    assert!(compact.iter().any(|e| e.block == Block::LapisBlock && e.name == "foo"));
    assert!(compact.iter().any(|e| e.args == "slot(13)=text(foo)"));
    assert!(compact.iter().any(|e| e.name == "=||=" && e.args.contains("slot(27)=num(1)")));
}

#[test]
fn post_passes_are_idempotent() {
    let (once, _) = collapse_autosplit_trampolines(&collapse_fixture());
    let (twice, second_count) = collapse_autosplit_trampolines(&once);
    assert_eq!(once, twice);
    assert_eq!(second_count, 0);

    let lines = many_msgs(100);
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let plan = compile(&refs);
    let (again, collapsed) = collapse_autosplit_trampolines(&plan.entries);
    let (again, promoted) = promote_autosplit_targets(&again);
    assert_eq!(collapsed, 0);
    assert_eq!(promoted, 0);
    assert_eq!(again, plan.entries);
}
