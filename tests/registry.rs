// tests/registry.rs

mod common;

use std::sync::Arc;

use taskdag::engine::Engine;
use taskdag::task::{Done, TaskBody, TaskRegistry, TaskSpec};

fn noop_body() -> Arc<dyn TaskBody> {
    Arc::new(|done: Done| -> anyhow::Result<()> {
        done.ok();
        Ok(())
    })
}

#[test]
fn registered_task_exposes_its_body() {
    let engine = Engine::new();
    let body = noop_body();

    engine.register(TaskSpec::new("default").shared_body(Arc::clone(&body)));

    let task = engine.task("default").expect("task should be registered");
    assert_eq!(task.name(), "default");
    assert!(task.deps().is_empty());
    let stored = task.body().expect("body should be stored");
    assert!(Arc::ptr_eq(stored, &body));
}

#[test]
fn dependency_array_is_stored_unchanged() {
    let engine = Engine::new();
    engine.register(
        TaskSpec::new("default")
            .deps(["foo", "bar"])
            .shared_body(noop_body()),
    );

    let task = engine.task("default").unwrap();
    assert_eq!(task.deps(), ["foo", "bar"]);
}

#[test]
fn variadic_dependencies_normalize_to_the_same_list() {
    let engine = Engine::new();
    engine.register(
        TaskSpec::new("default")
            .dep("foo")
            .dep("bar")
            .body(|done| {
                done.ok();
                Ok(())
            }),
    );

    let task = engine.task("default").unwrap();
    assert_eq!(task.deps(), ["foo", "bar"]);
    assert!(task.has_body());
}

#[test]
fn task_without_body_is_a_grouping_task() {
    let engine = Engine::new();
    engine.register(TaskSpec::new("all").deps(["a", "b"]));

    let task = engine.task("all").unwrap();
    assert!(!task.has_body());
    assert!(task.body().is_none());
}

#[test]
fn reregistering_replaces_definition_and_keeps_position() {
    let mut registry = TaskRegistry::new();

    assert!(registry.register(TaskSpec::new("foo")).is_none());
    registry.register(TaskSpec::new("bar"));
    let previous = registry.register(TaskSpec::new("foo").dep("bar"));

    let previous = previous.expect("replacing should hand back the old task");
    assert!(previous.deps().is_empty());

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.names().collect::<Vec<_>>(), ["foo", "bar"]);
    assert_eq!(registry.get("foo").unwrap().deps(), ["bar"]);
}

#[test]
fn registry_enumerates_in_registration_order() {
    let mut registry = TaskRegistry::new();
    assert!(registry.is_empty());

    for name in ["qux", "foo", "bar"] {
        registry.register(TaskSpec::new(name));
    }

    let names: Vec<&str> = registry.iter().map(|t| t.name()).collect();
    assert_eq!(names, ["qux", "foo", "bar"]);
    assert!(registry.contains("foo"));
    assert!(!registry.contains("baz"));
}

#[test]
fn unknown_dependencies_are_accepted_at_registration() {
    let engine = Engine::new();
    engine.register(TaskSpec::new("default").deps(["missing", "also-missing"]));

    assert_eq!(engine.task_names(), ["default"]);
    assert!(engine.task("missing").is_none());
}
