use std::sync::{Arc, Mutex};

use taskdag::engine::{Engine, Event, EventKind};

/// Records engine events as short strings:
///
/// - `starting.<task>` / `finished.<task>` / `error.<task>`
/// - `error: <message>` for the generic `error` event
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventRecorder {
    /// Subscribe to every event kind on `engine`.
    pub fn attach(engine: &Engine) -> Self {
        let recorder = Self::default();
        for kind in EventKind::ALL {
            let events = Arc::clone(&recorder.events);
            engine.on(kind, move |event| {
                events.lock().unwrap().push(describe(event));
            });
        }
        recorder
    }

    /// Everything recorded so far.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Only the `task:*` lifecycle entries.
    pub fn lifecycle(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| !e.starts_with("error: "))
            .collect()
    }

    /// Messages of generic `error` events.
    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("error: ").map(str::to_string))
            .collect()
    }
}

fn describe(event: &Event<'_>) -> String {
    match event {
        Event::TaskStarting(task) => format!("starting.{}", task.name),
        Event::TaskFinished(task) => format!("finished.{}", task.name),
        Event::TaskError { task, .. } => format!("error.{}", task.name),
        Event::Error(err) => format!("error: {err}"),
    }
}
