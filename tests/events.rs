// tests/events.rs

mod common;

use std::sync::{Arc, Mutex};

use common::bodies::{failing, new_log, recording};
use common::{init_tracing, with_timeout, EventRecorder};
use taskdag::engine::{Engine, EventKind, TaskDescriptor};
use taskdag::task::TaskSpec;
use taskdag::types::BuildId;

fn chain(engine: &Engine) {
    let log = new_log();
    engine.register(TaskSpec::new("foo").body(recording(&log, "foo")));
    engine.register(TaskSpec::new("bar").dep("foo").body(recording(&log, "bar")));
    engine.register(TaskSpec::new("default").dep("bar").body(recording(&log, "default")));
}

#[tokio::test]
async fn lifecycle_events_follow_activation_then_completion() {
    init_tracing();
    let engine = Engine::new();
    chain(&engine);
    let recorder = EventRecorder::attach(&engine);

    with_timeout(engine.build("default")).await.unwrap();

    assert_eq!(
        recorder.events(),
        [
            "starting.default",
            "starting.bar",
            "starting.foo",
            "finished.foo",
            "finished.bar",
            "finished.default",
        ]
    );
}

#[tokio::test]
async fn failure_via_completion_handle_reaches_error_listener() {
    init_tracing();
    let engine = Engine::new();
    engine.register(TaskSpec::new("default").body(failing("x")));

    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&messages);
    engine.on(EventKind::Error, move |event| {
        let err = event.error().expect("error events carry an error");
        sink.lock().unwrap().push(err.to_string());
    });

    let err = with_timeout(engine.build("default")).await.unwrap_err();

    assert_eq!(*messages.lock().unwrap(), ["x"]);
    assert_eq!(err.to_string(), "x");
    assert_eq!(err.task(), Some("default"));
}

#[tokio::test]
async fn error_returned_from_body_is_reported() {
    init_tracing();
    let engine = Engine::new();
    engine.register(
        TaskSpec::new("default").body(|_done| Err(anyhow::anyhow!("This is an error"))),
    );
    let recorder = EventRecorder::attach(&engine);

    let err = with_timeout(engine.build("default")).await.unwrap_err();

    assert_eq!(err.task_error().unwrap().to_string(), "This is an error");
    assert_eq!(recorder.lifecycle(), ["starting.default", "error.default"]);
    assert_eq!(recorder.errors(), ["This is an error"]);
}

#[tokio::test]
async fn panicking_body_is_reported_as_task_error() {
    init_tracing();
    let engine = Engine::new();
    engine.register(TaskSpec::new("default").body(|_done| panic!("boom")));
    let recorder = EventRecorder::attach(&engine);

    let err = with_timeout(engine.build("default")).await.unwrap_err();

    assert_eq!(err.task(), Some("default"));
    assert_eq!(err.task_error().unwrap().to_string(), "boom");
    assert_eq!(recorder.errors().len(), 1);
}

#[tokio::test]
async fn task_error_carries_the_failing_task() {
    init_tracing();
    let engine = Engine::new();
    engine.register(TaskSpec::new("foo").body(failing("bad foo")));
    engine.register(TaskSpec::new("default").dep("foo"));

    let seen: Arc<Mutex<Vec<TaskDescriptor>>> = Arc::default();
    let sink = Arc::clone(&seen);
    engine.on(EventKind::TaskError, move |event| {
        sink.lock().unwrap().push(event.task().unwrap().clone());
        assert!(event.error().is_some());
    });

    with_timeout(engine.build("default")).await.unwrap_err();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].name, "foo");
    assert!(seen[0].deps.is_empty());
}

#[tokio::test]
async fn plan_errors_are_emitted_on_the_error_channel() {
    init_tracing();
    let engine = Engine::new();
    engine.register(TaskSpec::new("a").dep("b"));
    engine.register(TaskSpec::new("b").dep("a"));
    let recorder = EventRecorder::attach(&engine);

    with_timeout(engine.build("a")).await.unwrap_err();

    assert!(recorder.lifecycle().is_empty());
    assert_eq!(recorder.errors().len(), 1);
    assert!(recorder.errors()[0].contains("a -> b -> a"));
}

#[tokio::test]
async fn descriptor_lists_resolved_dependencies() {
    init_tracing();
    let engine = Engine::new();
    let log = new_log();
    for name in ["foo", "bar", "baz"] {
        engine.register(TaskSpec::new(name).body(recording(&log, name)));
    }
    engine.register(TaskSpec::new("default").dep("b*"));

    let deps = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&deps);
    engine.on(EventKind::TaskStarting, move |event| {
        let task = event.task().unwrap();
        if task.name == "default" {
            *sink.lock().unwrap() = task.deps.clone();
        }
    });

    with_timeout(engine.build("default")).await.unwrap();

    assert_eq!(*deps.lock().unwrap(), ["bar", "baz"]);
}

#[tokio::test]
async fn listeners_run_in_registration_order_and_can_be_removed() {
    init_tracing();
    let engine = Engine::new();
    engine.register(TaskSpec::new("default"));

    let calls = Arc::new(Mutex::new(Vec::new()));
    let first = {
        let calls = Arc::clone(&calls);
        engine.on(EventKind::TaskFinished, move |_| calls.lock().unwrap().push(1))
    };
    {
        let calls = Arc::clone(&calls);
        engine.on(EventKind::TaskFinished, move |_| calls.lock().unwrap().push(2));
    }
    assert_eq!(engine.events().listener_count(EventKind::TaskFinished), 2);

    with_timeout(engine.build("default")).await.unwrap();
    assert_eq!(*calls.lock().unwrap(), [1, 2]);

    assert!(engine.off(first));
    assert!(!engine.off(first));

    with_timeout(engine.build("default")).await.unwrap();
    assert_eq!(*calls.lock().unwrap(), [1, 2, 2]);
}

#[tokio::test]
async fn each_build_gets_its_own_id() {
    init_tracing();
    let engine = Engine::new();
    engine.register(TaskSpec::new("default"));

    let ids: Arc<Mutex<Vec<BuildId>>> = Arc::default();
    let sink = Arc::clone(&ids);
    engine.on(EventKind::TaskStarting, move |event| {
        sink.lock().unwrap().push(event.task().unwrap().build_id);
    });

    with_timeout(engine.build("default")).await.unwrap();
    with_timeout(engine.build("default")).await.unwrap();

    let ids = ids.lock().unwrap();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[test]
fn event_kinds_use_wire_names() {
    let names: Vec<&str> = EventKind::ALL.iter().map(|k| k.as_str()).collect();
    assert_eq!(names, ["task:starting", "task:finished", "task:error", "error"]);

    for kind in EventKind::ALL {
        assert_eq!(kind.to_string().parse::<EventKind>().unwrap(), kind);
    }
    assert!("task:bogus".parse::<EventKind>().is_err());
}
