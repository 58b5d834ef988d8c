// tests/resolver.rs

mod common;

use taskdag::dag::{is_glob, resolve_dependencies, resolve_specifier, NameResolver};
use taskdag::errors::TaskdagError;

const NAMES: [&str; 4] = ["foo", "bar", "baz", "qux"];

fn specs(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn detects_glob_metacharacters() {
    assert!(is_glob("b*"));
    assert!(is_glob("ba?"));
    assert!(is_glob("ba[rz]"));
    assert!(is_glob("{foo,bar}"));
    assert!(!is_glob("build:css"));
    assert!(!is_glob("default"));
}

#[test]
fn star_matches_registered_names_in_registry_order() {
    let resolved = resolve_specifier("b*", NAMES).unwrap();
    assert_eq!(resolved, ["bar", "baz"]);
}

#[test]
fn character_classes_and_alternation() {
    assert_eq!(resolve_specifier("ba[rz]", NAMES).unwrap(), ["bar", "baz"]);
    assert_eq!(resolve_specifier("?ar", NAMES).unwrap(), ["bar"]);
    // Alternation still follows registry order, not pattern order.
    assert_eq!(resolve_specifier("{qux,foo}", NAMES).unwrap(), ["foo", "qux"]);
}

#[test]
fn glob_without_matches_resolves_to_nothing() {
    assert!(resolve_specifier("z*", NAMES).unwrap().is_empty());
}

#[test]
fn literal_resolves_to_itself_even_if_unregistered() {
    assert_eq!(resolve_specifier("nope", NAMES).unwrap(), ["nope"]);
    assert_eq!(resolve_specifier("foo", NAMES).unwrap(), ["foo"]);
}

#[test]
fn dependency_lists_are_deduplicated_first_seen_wins() {
    let resolved = resolve_dependencies(&specs(&["b*", "bar", "foo", "baz"]), NAMES).unwrap();
    assert_eq!(resolved, ["bar", "baz", "foo"]);
}

#[test]
fn malformed_pattern_is_reported() {
    let err = resolve_specifier("ba[", NAMES).unwrap_err();
    match err {
        TaskdagError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "ba["),
        other => panic!("expected InvalidPattern, got {other:?}"),
    }
}

#[test]
fn glob_includes_every_matching_name_even_the_declaring_task() {
    let names = ["build:css", "build:js", "build"];
    let mut resolver = NameResolver::new(names);

    let resolved = resolver.resolve_all(&specs(&["build*"])).unwrap();
    assert_eq!(resolved, ["build:css", "build:js", "build"]);

    // Cached matchers give the same answer on reuse.
    let again = resolver.resolve_all(&specs(&["build*", "build"])).unwrap();
    assert_eq!(again, ["build:css", "build:js", "build"]);
}
