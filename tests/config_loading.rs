// tests/config_loading.rs

mod common;

use std::fs;
use std::path::Path;

use common::builders::{TaskConfigBuilder, TaskfileBuilder};
use common::TestResult;
use taskdag::config::{load_and_validate, load_from_path, Taskfile};
use taskdag::engine::Engine;
use taskdag::errors::TaskdagError;

fn write_taskfile(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("Taskdag.toml");
    fs::write(&path, contents).expect("write task file");
    path
}

#[test]
fn loads_and_registers_tasks_in_name_order() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_taskfile(
        dir.path(),
        r#"
[engine]
max_concurrency = 2

[task.test]
cmd = "cargo test"

[task.lint]
cmd = "cargo clippy"
cwd = "crates"

[task.default]
deps = ["lint", "test"]
"#,
    );

    let taskfile = load_and_validate(&path)?;
    assert_eq!(taskfile.engine_options().max_concurrency.map(|n| n.get()), Some(2));

    let engine = Engine::with_options(taskfile.engine_options());
    taskfile.register_into(&engine, dir.path());

    assert_eq!(engine.task_names(), ["default", "lint", "test"]);

    let default = engine.task("default").unwrap();
    assert_eq!(default.deps(), ["lint", "test"]);
    assert!(!default.has_body());
    assert!(engine.task("lint").unwrap().has_body());
    Ok(())
}

#[test]
fn missing_sections_default_to_empty() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_taskfile(dir.path(), "");

    let raw = load_from_path(&path)?;
    assert!(raw.task.is_empty());
    assert_eq!(raw.engine.max_concurrency, None);

    let err = Taskfile::try_from(raw).unwrap_err();
    assert!(matches!(err, TaskdagError::ConfigError(_)));
    Ok(())
}

#[test]
fn malformed_toml_is_reported() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_taskfile(dir.path(), "[task.default\ncmd = ");

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, TaskdagError::TomlError(_)));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_and_validate(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, TaskdagError::IoError(_)));
}

#[test]
fn zero_max_concurrency_is_rejected() {
    let raw = TaskfileBuilder::new()
        .with_max_concurrency(0)
        .with_task("default", TaskConfigBuilder::group().build())
        .raw();

    let err = Taskfile::try_from(raw).unwrap_err();
    assert!(err.to_string().contains("max_concurrency"));
}

#[test]
fn malformed_glob_is_rejected() {
    let raw = TaskfileBuilder::new()
        .with_task("default", TaskConfigBuilder::group().dep("build[").build())
        .raw();

    let err = Taskfile::try_from(raw).unwrap_err();
    assert!(matches!(err, TaskdagError::InvalidPattern { .. }));
}

#[test]
fn exact_self_dependency_is_rejected() {
    let raw = TaskfileBuilder::new()
        .with_task("default", TaskConfigBuilder::group().dep("default").build())
        .raw();

    let err = Taskfile::try_from(raw).unwrap_err();
    assert!(err.to_string().contains("cannot depend on itself"));
}

#[test]
fn exact_cycle_is_rejected() {
    let raw = TaskfileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").dep("b").build())
        .with_task("b", TaskConfigBuilder::new("true").dep("a").build())
        .raw();

    let err = Taskfile::try_from(raw).unwrap_err();
    match err {
        TaskdagError::CyclicDependency(msg) => assert!(msg.contains("cycle detected")),
        other => panic!("expected CyclicDependency, got {other:?}"),
    }
}

#[tokio::test]
async fn glob_cycles_load_but_fail_the_build() {
    let taskfile = TaskfileBuilder::new()
        .with_task("build", TaskConfigBuilder::group().dep("build*").build())
        .with_task("build:css", TaskConfigBuilder::new("true").build())
        .build();
    assert_eq!(taskfile.task.len(), 2);

    let engine = Engine::new();
    taskfile.register_into(&engine, Path::new("."));

    let err = common::with_timeout(engine.build("build")).await.unwrap_err();
    match err {
        TaskdagError::CyclicDependency(path) => assert_eq!(path, "build -> build"),
        other => panic!("expected CyclicDependency, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_dependency_loads_but_fails_the_build() {
    let taskfile = TaskfileBuilder::new()
        .with_task("default", TaskConfigBuilder::group().dep("ghost").build())
        .build();

    let engine = Engine::new();
    taskfile.register_into(&engine, Path::new("."));

    let err = common::with_timeout(engine.build("default")).await.unwrap_err();
    assert!(matches!(err, TaskdagError::UnregisteredDependency { .. }));
}
