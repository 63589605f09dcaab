//! Call-statement parsing: multi-line folding, empty named args,
//! unresolved-line handling.

mod common;

use common::{base_api, compile, compile_err, compile_with};
use mldsl::Config;
use pretty_assertions::assert_eq;

#[test]
fn multiline_call_folds_into_a_single_action() {
    let plan = compile(&["event(\"Вход\") {", "    player.msg(", "        text=\"Привет\"", "    )", "}"]);
    assert_eq!(plan.entries.len(), 2);
    assert_eq!(plan.entries[1].name, "Сообщение||Сообщение");
    assert_eq!(plan.entries[1].args, "slot(9)=text(Привет)");
}

#[test]
fn empty_named_argument_is_omitted() {
    let plan = compile(&["event(\"Вход\") {", "    if_value.переменная_существует(var=)", "}"]);
    assert_eq!(plan.entries.len(), 2);
    assert_eq!(plan.entries[1].name, "Переменная существует||Переменная существует");
    assert_eq!(plan.entries[1].args, "no");
}

#[test]
fn multiline_call_with_many_empty_named_args_is_compact() {
    let plan = compile(&[
        "event(\"Вход\") {",
        "    player.msg(",
        "        text=\"Привет\", text2=, text3=",
        "    )",
        "}",
    ]);
    assert_eq!(plan.entries.len(), 2);
    assert_eq!(plan.entries[1].args, "slot(9)=text(Привет)");
}

#[test]
fn comments_are_stripped_outside_strings() {
    let plan = compile(&[
        "# leading comment",
        "event(\"Вход\") { # trailing comment",
        "    player.msg(text=\"a # not a comment\")",
        "}",
    ]);
    assert_eq!(plan.entries.len(), 2);
    assert_eq!(plan.entries[1].args, "slot(9)=text(a # not a comment)");
}

#[test]
fn unresolved_line_is_skipped_by_default() {
    let plan = compile(&["event(\"Событие чата\") {", "  aervaeR()", "}"]);
    assert_eq!(plan.entries.len(), 1);
    assert!(plan.entries[0].name.contains("Событие чата"));
}

#[test]
fn unresolved_line_fails_in_strict_mode() {
    let config = Config { strict_unknown: true, ..Config::default() };
    let err = compile_err(&["event(\"Событие чата\") {", "  aervaeR()", "}"], &base_api(), &config);
    assert!(err.to_string().contains("unresolved line"), "got: {err}");
    assert!(err.to_string().contains("aervaeR()"), "got: {err}");
}

#[test]
fn unresolved_call_with_named_args_fails_in_strict_mode() {
    let config = Config { strict_unknown: true, ..Config::default() };
    let err = compile_err(&["event(\"Событие чата\") {", "  aervaeR(num=\"@#2\")", "}"], &base_api(), &config);
    assert!(err.to_string().contains("aervaeR"), "got: {err}");
}

#[test]
fn unknown_module_call_is_an_unresolved_line() {
    let config = Config { strict_unknown: true, ..Config::default() };
    let err = compile_err(&["event(\"Вход\") {", "  nosuch.action(1)", "}"], &base_api(), &config);
    assert!(err.to_string().contains("unresolved line"), "got: {err}");
}

#[test]
fn loop_header_carries_name_and_ticks() {
    let plan = compile(&["loop(ticker, 40) {", "    player.msg(text=\"tick\")", "}"]);
    assert_eq!(plan.entries[0].block, mldsl::Block::EmeraldBlock);
    assert_eq!(plan.entries[0].name, "ticker||40");
    assert_eq!(plan.entries[0].args, "no");

    let plan = compile(&["loop(ticker) {", "}"]);
    assert_eq!(plan.entries[0].name, "ticker||20", "ticks default to 20");
}

#[test]
fn event_names_resolve_through_the_event_module() {
    let mut api = base_api();
    let mut events = indexmap::IndexMap::new();
    events.insert(
        "soobshchenie_chata".to_owned(),
        common::func("Событие игрока", "Событие чата", "Событие чата", &["chat", "Событие чата"], vec![], vec![]),
    );
    api.insert("event".to_owned(), events);
    let plan = compile_with(&["event(\"chat\") {", "}"], &api, &Config::default());
    assert_eq!(plan.entries[0].name, "Событие игрока||Событие чата");
}

#[test]
fn call_builtin_emits_the_function_call_action() {
    let plan = compile_with(
        &["event(\"Вход\") {", "    call(heavy)", "}"],
        &base_api(),
        &Config::default(),
    );
    assert_eq!(plan.entries[1].name, "Вызвать функцию||Вызвать функцию");
    assert_eq!(plan.entries[1].args, "slot(13)=text(heavy)");
}
