extern crate textpp as tpp;

use tpp::{Config, Directives};

fn build(sources: &[(&str, &str)]) -> Config {
    let mut config = Config::default();
    for &(name, text) in sources {
        config.sources.insert(name.to_owned(), text.to_owned());
    }
    config
}

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.inclusion_limit, 4000);
    assert!(!config.ignore_unmatched_conditional_directives);
    assert_eq!(config.directives, Directives::all());
    assert!(config.expand_macros);
    assert!(config.sources.is_empty());
    assert!(config.main_sources.is_empty());
}

#[test]
fn main_sources_filter_the_result() {
    let mut config = build(&[("lib", "L"), ("app", "#include <lib>")]);
    config
        .main_sources
        .insert("app".to_owned(), "#include <lib>".to_owned());
    let output = tpp::process(&config).expect("preprocessing failed");
    let names: Vec<&str> = output.sources.keys().map(String::as_str).collect();
    assert_eq!(names, ["app"]);
    assert_eq!(output.sources["app"], "L");
}

#[test]
fn macro_stores_do_not_leak_between_top_level_sources() {
    let output = tpp::process(&build(&[
        ("a", "#define X 1\n__X__"),
        ("b", "#ifdef X\nleak\n#endif\nclean"),
    ]))
    .expect("preprocessing failed");
    assert_eq!(output.sources["a"], "1");
    assert_eq!(output.sources["b"], "clean");
}

#[test]
fn disabled_directives_stay_in_the_text() {
    let text = "#define A 1\n#include <x>\n#error \"e\"\n#pragma once";
    let mut config = build(&[("main", text)]);
    config.disable_all_directives();
    let output = tpp::process(&config).expect("preprocessing failed");
    assert_eq!(output.sources["main"], text);

    config.enable_all_directives();
    assert_eq!(config.directives, Directives::all());
}

#[test]
fn directive_flags_are_independent() {
    let mut config = build(&[("main", "#define KEEP me\n#ifdef NOPE\nx\n#endif")]);
    config.directives.remove(Directives::DEFINE);
    let output = tpp::process(&config).expect("preprocessing failed");
    assert_eq!(output.sources["main"], "#define KEEP me\n");
}

#[test]
fn from_toml_str_reads_every_section() {
    let config = Config::from_toml_str(
        r##"
inclusion_limit = 8
ignore_unmatched_conditional_directives = true
expand_macros = false

[sources]
"main.c" = "#endif"

[macros]
MOON = "false"

[directives]
error = false
"##,
    )
    .expect("TOML should parse");

    assert_eq!(config.inclusion_limit, 8);
    assert!(config.ignore_unmatched_conditional_directives);
    assert!(!config.expand_macros);
    assert!(!config.directives.contains(Directives::ERROR));
    assert!(config.directives.contains(Directives::INCLUDE));
    assert_eq!(config.sources["main.c"], "#endif");
    assert_eq!(config.macros["MOON"], Some("false".to_owned()));

    let output = tpp::process(&config).expect("preprocessing failed");
    assert_eq!(output.sources["main.c"], "#endif");
}

#[test]
fn from_toml_str_defaults_match_default() {
    let config = Config::from_toml_str("").expect("TOML should parse");
    assert_eq!(config.inclusion_limit, 4000);
    assert_eq!(config.directives, Directives::all());
    assert!(config.expand_macros);
}

#[test]
fn errors_render_without_color() {
    let err = tpp::process(&build(&[("main", "#include <nope>")]))
        .expect_err("preprocessing should have failed");

    let mut rendered = Vec::new();
    tpp::pretty_print_error_nocolor(&mut rendered, &err).expect("rendering failed");
    let rendered = String::from_utf8(rendered).expect("rendering produced invalid UTF-8");
    assert!(rendered.starts_with("main, line 0, column 0:\n"));
    assert!(rendered.contains("error: Failed to include 'nope': It does not exist."));
}
