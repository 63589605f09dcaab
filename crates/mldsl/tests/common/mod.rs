//! Shared API fixtures for the compiler tests, mirroring a small but
//! realistic slice of a built `api_aliases.json`.

use indexmap::IndexMap;
use mldsl::{ApiEnum, ApiFunc, ApiMap, Config, FuncMeta, Mode, Param, ParamSource, Plan, compile_source};

#[must_use]
pub fn param(name: &str, mode: Mode, slot: usize) -> Param {
    Param { name: name.to_owned(), mode, slot, label: String::new() }
}

#[must_use]
pub fn func(
    sign1: &str,
    sign2: &str,
    menu: &str,
    aliases: &[&str],
    params: Vec<Param>,
    enums: Vec<ApiEnum>,
) -> ApiFunc {
    ApiFunc {
        id: String::new(),
        sign1: sign1.to_owned(),
        sign2: sign2.to_owned(),
        gui: String::new(),
        menu: menu.to_owned(),
        aliases: aliases.iter().map(|s| (*s).to_owned()).collect(),
        description: String::new(),
        description_raw: String::new(),
        params,
        enums,
        meta: Some(FuncMeta { param_source: ParamSource::Raw }),
    }
}

#[must_use]
pub fn enum_def(name: &str, slot: usize, options: &[&str]) -> ApiEnum {
    ApiEnum {
        name: name.to_owned(),
        slot,
        options: options.iter().enumerate().map(|(i, o)| ((*o).to_owned(), i)).collect(),
    }
}

/// The base fixture: select domains (housed in `misc`, as the builder
/// leaves them when sign1 routing falls through), bridge modules, the
/// var operators, and a couple of plain actions.
#[must_use]
pub fn base_api() -> ApiMap {
    let mut api = ApiMap::new();

    let mut misc = IndexMap::new();
    misc.insert(
        "ifplayer_peremennaya_suschestvuet".to_owned(),
        func(
            "Выбрать обьект",
            "Игрок по условию",
            "Переменная существует",
            &["переменная_существует"],
            vec![param("var", Mode::Variable, 13)],
            vec![],
        ),
    );
    misc.insert(
        "ifmob_peremennaya_suschestvuet".to_owned(),
        func(
            "Выбрать обьект",
            "Моб по условию",
            "Переменная существует",
            &["переменная_существует"],
            vec![param("var", Mode::Variable, 13)],
            vec![],
        ),
    );
    misc.insert(
        "ifentity_peremennaya_suschestvuet".to_owned(),
        func(
            "Выбрать обьект",
            "Сущность по условию",
            "Переменная существует",
            &["переменная_существует"],
            vec![param("var", Mode::Variable, 13)],
            vec![],
        ),
    );
    misc.insert(
        "ifplayer_derzhit_predmet".to_owned(),
        func(
            "Выбрать обьект",
            "Игрок по условию",
            "Держит предмет",
            &["держит_предмет"],
            vec![param("item", Mode::Item, 9)],
            vec![],
        ),
    );
    api.insert("misc".to_owned(), misc);

    let mut if_player = IndexMap::new();
    if_player.insert(
        "peremennaya_suschestvuet".to_owned(),
        func("", "", "Переменная существует", &["переменная_существует"], vec![param("var", Mode::Variable, 13)], vec![]),
    );
    if_player.insert(
        "derzhit_predmet".to_owned(),
        func("", "", "Держит предмет", &["держит_предмет", "держит"], vec![param("item", Mode::Item, 9)], vec![]),
    );
    api.insert("if_player".to_owned(), if_player);

    let mut if_value = IndexMap::new();
    if_value.insert(
        "peremennaya_suschestvuet".to_owned(),
        func(
            "Если переменная",
            "Переменная существует",
            "",
            &["переменная_существует"],
            vec![param("var", Mode::Variable, 13), param("var2", Mode::Variable, 31)],
            vec![],
        ),
    );
    if_value.insert(
        "number".to_owned(),
        func(
            "Если переменная",
            "Сравнить число (Легко)",
            "",
            &["сравнить_число_легко"],
            vec![param("num", Mode::Number, 10), param("num2", Mode::Number, 16)],
            vec![],
        ),
    );
    api.insert("if_value".to_owned(), if_value);

    let mut var = IndexMap::new();
    var.insert(
        "set_value".to_owned(),
        func(
            "Присв. переменную",
            "=",
            "",
            &["set_value"],
            vec![param("var", Mode::Variable, 9), param("value", Mode::Any, 10)],
            vec![],
        ),
    );
    var.insert(
        "set_sum".to_owned(),
        func(
            "Присв. переменную",
            "+",
            "",
            &["set_sum"],
            vec![param("var", Mode::Variable, 9), param("values", Mode::Any, 10)],
            vec![],
        ),
    );
    var.insert(
        "set_difference".to_owned(),
        func(
            "Присв. переменную",
            "-",
            "",
            &["set_difference"],
            vec![param("var", Mode::Variable, 9), param("value1", Mode::Any, 10), param("value2", Mode::Any, 11)],
            vec![],
        ),
    );
    var.insert(
        "set_product".to_owned(),
        func(
            "Присв. переменную",
            "*",
            "",
            &["set_product"],
            vec![param("var", Mode::Variable, 9), param("values", Mode::Any, 10)],
            vec![],
        ),
    );
    var.insert(
        "set_quotient".to_owned(),
        func(
            "Присв. переменную",
            "/",
            "",
            &["set_quotient"],
            vec![param("var", Mode::Variable, 9), param("value1", Mode::Any, 10), param("value2", Mode::Any, 11)],
            vec![],
        ),
    );
    api.insert("var".to_owned(), var);

    let mut player = IndexMap::new();
    player.insert(
        "msg".to_owned(),
        func("Действие игрока", "Сообщение", "", &["msg"], vec![param("text", Mode::Text, 9)], vec![]),
    );
    api.insert("player".to_owned(), player);

    let mut game = IndexMap::new();
    game.insert(
        "call_function".to_owned(),
        func(
            "Игровое действие",
            "Вызвать функцию",
            "",
            &["call_function", "вызвать_функцию"],
            vec![param("text", Mode::Text, 13)],
            vec![],
        ),
    );
    api.insert("game".to_owned(), game);

    let mut array = IndexMap::new();
    array.insert(
        "vstavit_v_massiv".to_owned(),
        func(
            "Массив",
            "Вставить в массив",
            "",
            &["vstavit_v_massiv"],
            vec![param("arr", Mode::Array, 10), param("num", Mode::Number, 13), param("value", Mode::Any, 16)],
            vec![],
        ),
    );
    api.insert("array".to_owned(), array);

    api.insert("if_game".to_owned(), IndexMap::new());
    api.insert("select".to_owned(), IndexMap::new());
    api
}

/// Adds the select-all actions and the scoped number comparisons the
/// multiselect expansion needs.
#[must_use]
pub fn multiselect_api() -> ApiMap {
    let mut api = base_api();
    let misc = api.get_mut("misc").expect("base misc module");
    misc.insert(
        "vse_igroki".to_owned(),
        func("Выбрать объект", "Все игроки", "Все игроки", &["allplayers", "все_игроки"], vec![], vec![]),
    );
    misc.insert(
        "vse_moby".to_owned(),
        func("Выбрать объект", "Все мобы", "Все мобы", &["allmobs", "все_мобы"], vec![], vec![]),
    );
    misc.insert(
        "vse_suschnosti".to_owned(),
        func("Выбрать объект", "Все сущности", "Все сущности", &["allentities", "все_сущности"], vec![], vec![]),
    );
    misc.insert(
        "ifplayer_number".to_owned(),
        func(
            "Выбрать объект",
            "Игрок по условию",
            "Сравнить числа (Облегчённая версия)",
            &["сравнить_число_облегчённо"],
            vec![param("num", Mode::Number, 10), param("num2", Mode::Number, 16)],
            vec![enum_def("тип_проверки", 28, &["≥ (Больше или равно)"])],
        ),
    );
    misc.insert(
        "ifmob_number".to_owned(),
        func(
            "Выбрать объект",
            "Моб по условию",
            "Сравнить числа (Облегчённая версия)",
            &["сравнить_число_облегчённо"],
            vec![param("num", Mode::Number, 10), param("num2", Mode::Number, 16)],
            vec![enum_def("тип_проверки", 28, &["≥ (Больше или равно)"])],
        ),
    );
    api
}

/// Compiles source lines against the base fixture with defaults.
pub fn compile(lines: &[&str]) -> Plan {
    compile_with(lines, &base_api(), &Config::default())
}

pub fn compile_with(lines: &[&str], api: &ApiMap, config: &Config) -> Plan {
    let source = lines.join("\n") + "\n";
    compile_source(&source, api, config).expect("source compiles")
}

pub fn compile_err(lines: &[&str], api: &ApiMap, config: &Config) -> mldsl::Error {
    let source = lines.join("\n") + "\n";
    compile_source(&source, api, config).expect_err("compilation must fail")
}
