//! API normalization: routing, naming, aliasing, param dedup.

use std::collections::{BTreeMap, HashMap};

use mldsl::{ActionRecord, Mode, SlotItem, build_api, extract_catalog, validate_api_contract};
use pretty_assertions::assert_eq;

const GLASS: &str = "minecraft:stained_glass_pane";

fn glass(meta: u8, name: &str) -> SlotItem {
    SlotItem { id: GLASS.to_owned(), meta, name: name.to_owned(), lore: String::new() }
}

fn record(sign1: &str, sign2: &str, subitem: &str, gui: &str, items: Vec<(usize, SlotItem)>) -> ActionRecord {
    let mut record = ActionRecord::default();
    record.signs[0] = sign1.to_owned();
    record.signs[1] = sign2.to_owned();
    record.subitem = subitem.to_owned();
    record.gui = gui.to_owned();
    record.items = items.into_iter().collect::<BTreeMap<_, _>>();
    record.has_chest = !record.items.is_empty();
    record
}

/// A "variable exists" chest: two mirrored VARIABLE markers.
fn var_exists_items() -> Vec<(usize, SlotItem)> {
    vec![(4, glass(1, "Динамическая переменная")), (22, glass(1, "Динамическая переменная"))]
}

fn build(records: &[ActionRecord]) -> mldsl::ApiMap {
    let catalog = extract_catalog(records, &HashMap::new());
    build_api(&catalog, &HashMap::new())
}

fn select_domains() -> Vec<ActionRecord> {
    vec![
        record(
            "Выбрать обьект",
            "Игрок по условию",
            "[minecraft:book meta=0] Переменная существует | §7Проверяет переменную",
            "Переменная существует",
            var_exists_items(),
        ),
        record(
            "Выбрать обьект",
            "Моб по условию",
            "[minecraft:book meta=0] Переменная существует | §7Проверяет переменную",
            "Переменная существует",
            var_exists_items(),
        ),
        record(
            "Выбрать обьект",
            "Сущность по условию",
            "[minecraft:book meta=0] Переменная существует | §7Проверяет переменную",
            "Переменная существует",
            var_exists_items(),
        ),
    ]
}

#[test]
fn select_domains_get_scope_prefixed_canonical_names() {
    let api = build(&select_domains());
    let select = &api["select"];
    assert!(select.contains_key("ifplayer_peremennaya_suschestvuet"), "keys: {:?}", select.keys().collect::<Vec<_>>());
    assert!(select.contains_key("ifmob_peremennaya_suschestvuet"));
    assert!(select.contains_key("ifentity_peremennaya_suschestvuet"));
    assert!(validate_api_contract(&api).is_ok());
}

#[test]
fn var_exists_family_dedupes_to_single_variable_param() {
    let api = build(&select_domains());
    for key in ["ifplayer_peremennaya_suschestvuet", "ifmob_peremennaya_suschestvuet"] {
        let func = &api["select"][key];
        let params: Vec<(&str, Mode, usize)> =
            func.params.iter().map(|p| (p.name.as_str(), p.mode, p.slot)).collect();
        assert_eq!(params, vec![("var", Mode::Variable, 13)], "params of {key}");
        assert_eq!(
            serde_json::to_value(func.meta.expect("meta")).expect("serializes")["paramSource"],
            "normalized"
        );
    }
}

#[test]
fn distinct_variable_slots_outside_the_family_are_kept_raw() {
    let api = build(&[record(
        "Если переменная",
        "Значение равно",
        "[minecraft:book meta=0] Значение равно | §7Сравнивает",
        "Значение равно",
        var_exists_items(),
    )]);
    let func = &api["if_value"]["znachenie_ravno"];
    assert_eq!(func.params.len(), 2);
    assert_eq!(func.params[0].name, "var");
    assert_eq!(func.params[1].name, "var2");
    assert_eq!(
        serde_json::to_value(func.meta.expect("meta")).expect("serializes")["paramSource"],
        "raw"
    );
}

#[test]
fn aliases_contain_the_canonical_name_and_are_identifier_shaped() {
    let api = build(&select_domains());
    for (module, funcs) in &api {
        for (name, func) in funcs {
            assert!(func.aliases.contains(name), "{module}.{name} missing canonical alias: {:?}", func.aliases);
            for alias in &func.aliases {
                assert!(!alias.is_empty(), "{module}.{name} has an empty alias");
                assert!(!alias.contains(' '), "{module}.{name} alias with spaces: {alias}");
            }
        }
    }
}

#[test]
fn var_operator_signs_map_to_fixed_canonical_names() {
    let records: Vec<ActionRecord> = [("=", "set_value"), ("+", "set_sum"), ("-", "set_difference"), ("*", "set_product"), ("/", "set_quotient")]
        .iter()
        .map(|(sign2, _)| {
            record(
                "Присв. переменную",
                sign2,
                "",
                "Установить значение",
                vec![(4, glass(1, "Динамическая переменная")), (13, glass(0, ""))],
            )
        })
        .collect();
    let api = build(&records);
    let var = &api["var"];
    for (_, canonical) in
        [("=", "set_value"), ("+", "set_sum"), ("-", "set_difference"), ("*", "set_product"), ("/", "set_quotient")]
    {
        assert!(var.contains_key(canonical), "missing {canonical}: {:?}", var.keys().collect::<Vec<_>>());
    }
}

#[test]
fn name_collisions_get_numeric_suffixes_in_discovery_order() {
    let twice = vec![
        record("Действие игрока", "Сообщение", "[x meta=0] Сообщение | desc", "Сообщение", vec![]),
        record("Действие игрока", "Сообщение", "[x meta=0] Сообщение | desc", "Сообщение", vec![]),
        record("Действие игрока", "Сообщение", "[x meta=0] Сообщение | desc", "Сообщение", vec![]),
    ];
    let api = build(&twice);
    let player = &api["player"];
    let keys: Vec<&String> = player.keys().collect();
    assert_eq!(keys, vec!["soobschenie", "soobschenie_1", "soobschenie_2"]);
}

#[test]
fn menu_name_wins_over_sign2_for_canonical_naming() {
    let api = build(&[record(
        "Действие игрока",
        "Правый клик",
        "[minecraft:stick meta=0] Игрок кликает правой кнопкой | §7Срабатывает на ПКМ",
        "Правый клик",
        vec![],
    )]);
    let player = &api["player"];
    assert!(player.contains_key("igrok_klikaet_pravoy_knopkoy"), "keys: {:?}", player.keys().collect::<Vec<_>>());
    let func = &player["igrok_klikaet_pravoy_knopkoy"];
    assert!(func.aliases.iter().any(|a| a == "pravyy_klik"), "aliases: {:?}", func.aliases);
}

#[test]
fn send_message_fallback_slots_merge_into_params() {
    let api = build(&[record("Действие игрока", "Сообщение", "", "Сообщение", vec![])]);
    let func = &api["player"]["soobschenie"];
    let slots: Vec<usize> = func.params.iter().map(|p| p.slot).collect();
    assert_eq!(slots, vec![27, 28, 29, 30, 32, 33, 34, 35]);
    assert!(func.params.iter().all(|p| p.mode == Mode::Text));
}

#[test]
fn page_suffix_does_not_leak_into_aliases() {
    let api = build(&[record(
        "Действие игрока",
        "Сообщение",
        "[x meta=0] Сообщение | desc",
        "Сообщение (2 из 3)",
        vec![],
    )]);
    let func = &api["player"]["soobschenie"];
    assert!(!func.aliases.iter().any(|a| a.contains('2') && a.contains('3')), "aliases: {:?}", func.aliases);
}
