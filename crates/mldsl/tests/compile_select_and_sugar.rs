//! Select-domain scoping, assignment sugars, and per-mode coercions.

mod common;

use common::{base_api, compile, compile_err, compile_with, enum_def};
use mldsl::{Block, Config};
use pretty_assertions::assert_eq;

#[test]
fn select_if_player_var_exists_resolves_to_scoped_action() {
    let plan = compile(&["event(\"Вход\") {", "select.if_player.переменная_существует(var=x)", "}"]);
    assert_eq!(plan.entries[1].name, "Переменная существует||Игрок по условию");
    assert_eq!(plan.entries[1].args, "slot(13)=var(x)");
}

#[test]
fn select_if_mob_and_if_entity_scopes_resolve() {
    let plan = compile(&["event(\"Вход\") {", "select.if_mob.переменная_существует(var=x)", "}"]);
    assert_eq!(plan.entries[1].name, "Переменная существует||Моб по условию");
    assert_eq!(plan.entries[1].args, "slot(13)=var(x)");

    let plan = compile(&["event(\"Вход\") {", "select.if_entity.переменная_существует(var=x)", "}"]);
    assert_eq!(plan.entries[1].name, "Переменная существует||Сущность по условию");
}

#[test]
fn select_bridges_leaf_aliases_through_the_if_module() {
    let plan = compile(&["event(\"Вход\") {", "select.if_player.держит(item=item(\"minecraft:stick\"))", "}"]);
    assert_eq!(plan.entries[1].name, "Держит предмет||Игрок по условию");
}

#[test]
fn select_unknown_leaf_fails_fast() {
    let err = compile_err(
        &["event(\"Вход\") {", "select.if_player.unknown_leaf(var=x)", "}"],
        &base_api(),
        &Config::default(),
    );
    assert!(err.to_string().contains("unknown selector"), "got: {err}");
}

#[test]
fn select_ambiguous_without_domain_fails_fast() {
    let err = compile_err(
        &["event(\"Вход\") {", "select.переменная_существует(var=x)", "}"],
        &base_api(),
        &Config::default(),
    );
    assert!(err.to_string().contains("ambiguous"), "got: {err}");
}

#[test]
fn assignment_sugars_lower_to_the_arithmetic_actions() {
    let plan = compile(&["event(\"Вход\") {", "a += 1", "a -= 1", "a *= 2", "a /= 2", "}"]);
    let names: Vec<&str> = plan.entries[1..].iter().map(|e| e.name.as_str()).collect();
    assert!(names.contains(&"+||+"));
    assert!(names.contains(&"-||-"));
    assert!(names.contains(&"*||*"));
    assert!(names.contains(&"/||/"));
}

#[test]
fn equals_inside_a_string_is_not_an_assignment() {
    let plan = compile(&["event(\"Вход\") {", "player.msg(\"[mnist] sum=%var(a)% pred=%var(b)%\")", "}"]);
    assert_eq!(plan.entries[1].name, "Сообщение||Сообщение");
    assert_eq!(plan.entries[1].args, "slot(9)=text([mnist] sum=%var(a)% pred=%var(b)%)");
}

#[test]
fn loc_assignment_normalizes_to_paper_item() {
    let plan = compile(&["event(\"Вход\") {", "base = loc(\"180.30 4.00 181.30 -36.15 -7.20\")", "}"]);
    assert_eq!(plan.entries[1].name, "=||=");
    assert_eq!(
        plan.entries[1].args,
        "slot(9)=var(base),slot(10)=item(minecraft:paper, name=\"180.30 4.00 181.30 -36.15 -7.20\")"
    );
}

#[test]
fn variable_param_tolerates_item_literal() {
    let plan = compile(&[
        "event(\"Вход\") {",
        "var.set_value(var=item(\"minecraft:magma_cream\", name=\"&atest&btest\"), value=1)",
        "}",
    ]);
    assert_eq!(plan.entries[1].name, "=||=");
    assert_eq!(
        plan.entries[1].args,
        "slot(9)=item(\"minecraft:magma_cream\", name=\"§atest§btest\"),slot(10)=1"
    );
}

#[test]
fn unknown_named_enum_argument_fails_fast() {
    let mut api = base_api();
    api.get_mut("if_value").expect("module")["number"].enums = vec![enum_def("tip_proverki", 13, &["==", ">"])];
    let err = compile_err(
        &["event(\"Вход\") {", "if_value.сравнить_число_легко(num=1, num2=2, tip_proverki2=\"==\")", "}"],
        &api,
        &Config::default(),
    );
    assert!(err.to_string().contains("unknown named arguments/enum"), "got: {err}");
}

#[test]
fn valid_enum_value_is_emitted_after_params() {
    let mut api = base_api();
    api.get_mut("if_value").expect("module")["number"].enums = vec![enum_def("tip_proverki", 13, &["==", ">"])];
    let plan = compile_with(
        &["event(\"Вход\") {", "if_value.сравнить_число_легко(num=1, num2=2, tip_proverki=\"==\")", "}"],
        &api,
        &Config::default(),
    );
    assert_eq!(plan.entries[1].args, "slot(10)=num(1),slot(16)=num(2),slot(13)=text(==)");
}

#[test]
fn ampersand_color_codes_substitute_unless_escaped() {
    let plan = compile(&["event(\"Вход\") {", r#"player.msg("&aok \&bkeep_amp")"#, "}"]);
    assert_eq!(plan.entries[1].args, "slot(9)=text(§aok &bkeep_amp)");
}

#[test]
fn placeholder_lhs_compound_assignment_compiles() {
    let plan = compile(&["event(\"Вход\") {", "__mn_row_%var(__mn_z)% += __mn_pix", "}"]);
    let all_args: String = plan.entries.iter().map(|e| e.args.clone()).collect::<Vec<_>>().join("\n");
    assert!(all_args.contains("__mn_row_%var(__mn_z)%"), "got: {all_args}");
}

#[test]
fn compound_assignment_rejects_non_numeric_rhs() {
    let err = compile_err(&["event(\"Вход\") {", "a += \"txt\"", "}"], &base_api(), &Config::default());
    assert!(err.to_string().contains("supports numeric expressions only"), "got: {err}");
}

#[test]
fn negative_literal_assignment_does_not_become_a_product() {
    let plan = compile(&["event(\"Вход\") {", "a = -1.483046211", "}"]);
    let names: Vec<&str> = plan.entries[1..].iter().map(|e| e.name.as_str()).collect();
    assert!(!names.contains(&"*||*"));
    assert!(names.contains(&"=||="));
    assert!(plan.entries.iter().any(|e| e.args.contains("slot(10)=num(-1.483046211)")));
}

#[test]
fn constant_unary_minus_folds_to_single_assignments() {
    let plan = compile(&["event(\"Вход\") {", "a = -(1 + 2)", "b = -(-3.5)", "}"]);
    let names: Vec<&str> = plan.entries[1..].iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names.iter().filter(|n| **n == "=||=").count(), 2);
    for helper in ["+||+", "-||-", "*||*", "/||/"] {
        assert!(!names.contains(&helper), "unexpected helper action {helper}");
    }
    assert!(plan.entries.iter().any(|e| e.args.contains("slot(10)=num(-3)")));
    assert!(plan.entries.iter().any(|e| e.args.contains("slot(10)=num(3.5)")));
}

#[test]
fn inline_condition_blocks_match_multiline_form() {
    let inline = compile(&[
        "event(\"Вход\") {",
        "if_value.сравнить_число_легко(__mn_x, 28) { __mn_x = 0 __mn_z += 1 }",
        "if_value.сравнить_число_легко(__mn_z, 28) { __mn_done = 1 }",
        "}",
    ]);
    let multiline = compile(&[
        "event(\"Вход\") {",
        "if_value.сравнить_число_легко(__mn_x, 28) {",
        "    __mn_x = 0",
        "    __mn_z += 1",
        "}",
        "if_value.сравнить_число_легко(__mn_z, 28) {",
        "    __mn_done = 1",
        "}",
        "}",
    ]);
    assert_eq!(inline.entries, multiline.entries);
}

#[test]
fn text_param_bare_identifier_wraps_to_var() {
    let plan = compile(&["event(\"Вход\") {", "player.msg(text=myVar)", "}"]);
    assert_eq!(plan.entries[1].args, "slot(9)=var(myVar)");
}

#[test]
fn text_param_quoted_literal_emits_text() {
    let plan = compile(&["event(\"Вход\") {", "player.msg(text=\"abc\")", "}"]);
    assert_eq!(plan.entries[1].args, "slot(9)=text(abc)");
}

#[test]
fn if_value_var_exists_mirrors_single_variable() {
    let plan = compile(&["event(\"Вход\") {", "if_value.переменная_существует(var=x)", "}"]);
    assert_eq!(plan.entries[1].args, "slot(13)=var(x),slot(31)=var(x)");
}

#[test]
fn if_value_block_form_opens_a_condition_scope() {
    let plan = compile(&[
        "event(\"Вход\") {",
        "    if_value.переменная_существует(var=x) {",
        "        player.msg(text=\"ok\")",
        "    }",
        "}",
    ]);
    assert_eq!(plan.entries[1].name, "Переменная существует||Переменная существует");
    assert_eq!(plan.entries[2].name, "Сообщение||Сообщение");
    assert!(plan.entries.iter().any(|e| e.block == Block::Skip));
}

#[test]
fn number_params_accept_bare_identifiers() {
    let plan = compile(&["event(\"Вход\") {", "if_value.сравнить_число_легко(a, b)", "}"]);
    assert_eq!(plan.entries[1].args, "slot(10)=var(a),slot(16)=var(b)");
}

#[test]
fn number_param_quoted_placeholder_wraps_to_var() {
    let plan = compile(&["event(\"Вход\") {", "if_value.сравнить_число_легко(\"%selected%idx\", 1)", "}"]);
    assert_eq!(plan.entries[1].args, "slot(10)=var(%selected%idx),slot(16)=num(1)");
}

#[test]
fn number_param_expression_hoists_to_temp_variable() {
    let plan = compile(&["event(\"Вход\") {", "if_value.сравнить_число_легко(%selected%idx+1, 1)", "}"]);
    let pre: Vec<&str> = plan.entries[..plan.entries.len() - 1].iter().map(|e| e.args.as_str()).collect();
    assert!(pre.iter().any(|a| a.contains("__mldsl_tmpargf")), "got: {pre:?}");
    let last = plan.entries.last().expect("entries");
    assert!(last.args.contains("slot(10)=var(__mldsl_tmpargf"), "got: {}", last.args);
}

#[test]
fn any_param_placeholder_wraps_to_var() {
    let plan = compile(&["event(\"Вход\") {", "var.set_value(var=a, value=%selected%vartest)", "}"]);
    assert_eq!(plan.entries[1].args, "slot(9)=var(a),slot(10)=var(%selected%vartest)");
}

#[test]
fn text_param_formula_compiles_through_temp_variable() {
    let plan = compile(&["event(\"Вход\") {", "player.msg(text=%player%money + 5)", "}"]);
    assert!(plan.entries.len() >= 3);
    assert!(plan.entries[..plan.entries.len() - 1].iter().any(|e| e.args.contains("__mldsl_tmpargf")));
    let last = plan.entries.last().expect("entries");
    assert!(last.args.contains("slot(9)=var(__mldsl_tmpargf"), "got: {}", last.args);
}

#[test]
fn text_param_formula_without_spaces_compiles_too() {
    let plan = compile(&["event(\"Вход\") {", "player.msg(text=%player%money+5)", "}"]);
    let last = plan.entries.last().expect("entries");
    assert!(last.args.contains("slot(9)=var(__mldsl_tmpargf"), "got: {}", last.args);
}

#[test]
fn item_param_placeholder_wraps_to_var() {
    let plan = compile(&["event(\"Вход\") {", "select.if_player.держит(item=%selected%tool)", "}"]);
    assert_eq!(plan.entries[1].args, "slot(9)=var(%selected%tool)");
}
