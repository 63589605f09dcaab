//! multiselect macro expansion.

mod common;

use common::{compile_err, compile_with, multiselect_api};
use mldsl::Config;

#[test]
fn multiselect_expands_the_canonical_sequence() {
    let plan = compile_with(
        &[
            "event(\"Вход\") {",
            "    multiselect ifplayer %selected%sel 1",
            "        select.ifplayer.держит(item=item(\"minecraft:stick\"))+",
            "        select.ifplayer.переменная_существует(var=%selected%apiversion)-2",
            "}",
        ],
        &multiselect_api(),
        &Config::default(),
    );
    let names: Vec<&str> = plan.entries.iter().map(|e| e.name.as_str()).collect();
    assert!(names.contains(&"Все игроки||Все игроки"));
    assert!(names.contains(&"Держит предмет||Игрок по условию"));
    assert!(names.contains(&"Переменная существует||Игрок по условию"));
    assert!(names.contains(&"+||+"));
    assert!(names.contains(&"-||-"));
    assert!(names.contains(&"Сравнить числа (Облегчённая версия)||Игрок по условию"));
}

#[test]
fn multiselect_supports_all_weight_operators() {
    let plan = compile_with(
        &[
            "event(\"Вход\") {",
            "    multiselect ifmob %selected%score 2",
            "        select.ifmob.переменная_существует(var=%selected%v)+",
            "        select.ifmob.переменная_существует(var=%selected%v)-3",
            "        select.ifmob.переменная_существует(var=%selected%v)*2",
            "        select.ifmob.переменная_существует(var=%selected%v)/=%selected%specvar",
            "}",
        ],
        &multiselect_api(),
        &Config::default(),
    );
    let names: Vec<&str> = plan.entries.iter().map(|e| e.name.as_str()).collect();
    for op in ["+||+", "-||-", "*||*", "/||/"] {
        assert!(names.contains(&op), "missing {op} in {names:?}");
    }
    assert!(names.contains(&"Сравнить числа (Облегчённая версия)||Моб по условию"));
}

#[test]
fn multiselect_ends_with_the_cutoff_comparison() {
    let plan = compile_with(
        &[
            "event(\"Вход\") {",
            "    multiselect ifplayer %selected%sel 1",
            "        select.ifplayer.переменная_существует(var=x)+",
            "}",
        ],
        &multiselect_api(),
        &Config::default(),
    );
    let compare = plan
        .entries
        .iter()
        .find(|e| e.name == "Сравнить числа (Облегчённая версия)||Игрок по условию")
        .expect("comparison entry");
    assert!(compare.args.contains("slot(10)=var(%selected%sel)"));
    assert!(compare.args.contains("slot(16)=num(1)"));
    assert!(compare.args.contains("slot(28)=text(≥ (Больше или равно))"));
}

#[test]
fn multiselect_scope_mismatch_fails_fast() {
    let err = compile_err(
        &[
            "event(\"Вход\") {",
            "    multiselect ifmob %selected%score 1",
            "        select.ifplayer.переменная_существует(var=x)+",
            "}",
        ],
        &multiselect_api(),
        &Config::default(),
    );
    assert!(err.to_string().contains("scope mismatch"), "got: {err}");
}
