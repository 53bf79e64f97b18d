extern crate textpp as tpp;

use tpp::{Category, Config};

fn config_with(name: &str, text: &str) -> Config {
    let mut config = Config::default();
    config.sources.insert(name.to_owned(), text.to_owned());
    config
}

fn run_one(text: &str) -> String {
    let output = tpp::process(&config_with("main", text)).expect("preprocessing failed");
    output.sources["main"].clone()
}

#[test]
fn single_underscores_never_trigger() {
    assert_eq!(run_one("IM_AM_NOT_A_MACRO"), "IM_AM_NOT_A_MACRO");
    assert_eq!(run_one("snake_case and _x_ y_z"), "snake_case and _x_ y_z");
}

#[test]
fn undefined_macro_is_an_error() {
    let err = tpp::process(&config_with("main", "__NOPE__"))
        .expect_err("preprocessing should have failed");
    assert_eq!(err.category(), Category::Parse);
    assert_eq!(
        err.to_string(),
        "Error processing main(0,0): Parse error: Cannot expand macro __NOPE__, it is undefined."
    );
}

#[test]
fn time_builtins_match_the_output_fields() {
    let output = tpp::process(&config_with("main", "__DATE__|__TIME__|__TIMESTAMP__"))
        .expect("preprocessing failed");
    assert_eq!(
        output.sources["main"],
        format!("{}|{}|{}", output.date, output.time, output.timestamp)
    );
    assert!(!output.date.is_empty());
    assert!(!output.time.is_empty());
    assert!(!output.timestamp.is_empty());
}

#[test]
fn line_expands_to_the_current_line() {
    assert_eq!(
        run_one("zero\none __LINE__\n__LINE__ two"),
        "zero\none 1\n2 two"
    );
}

#[test]
fn file_expands_to_the_source_name() {
    let output =
        tpp::process(&config_with("alpha.txt", "__FILE__")).expect("preprocessing failed");
    assert_eq!(output.sources["alpha.txt"], "alpha.txt");
}

#[test]
fn user_macros_expand() {
    let mut config = config_with("main", "Hello __NAME__!");
    config
        .macros
        .insert("NAME".to_owned(), Some("World".to_owned()));
    let output = tpp::process(&config).expect("preprocessing failed");
    assert_eq!(output.sources["main"], "Hello World!");
}

#[test]
fn null_valued_macros_expand_to_nothing() {
    let mut config = config_with("main", "a__NIL__b");
    config.macros.insert("NIL".to_owned(), None);
    let output = tpp::process(&config).expect("preprocessing failed");
    assert_eq!(output.sources["main"], "ab");
}

#[test]
fn spliced_values_are_not_re_expanded() {
    assert_eq!(run_one("#define A __B__\n__A__"), "__B__");
}

#[test]
fn expansion_can_be_disabled() {
    let mut config = config_with("main", "__DATE__ stays");
    config.expand_macros = false;
    let output = tpp::process(&config).expect("preprocessing failed");
    assert_eq!(output.sources["main"], "__DATE__ stays");
}
