//! Canned task bodies for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskdag::task::{Done, TaskBody};

/// Shared, ordered log that bodies append to.
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Appends `label` to `log`, then succeeds synchronously.
pub fn recording(log: &Log, label: &str) -> impl Fn(Done) -> anyhow::Result<()> + Send + Sync + 'static {
    let log = Arc::clone(log);
    let label = label.to_string();
    move |done| {
        log.lock().unwrap().push(label.clone());
        done.ok();
        Ok(())
    }
}

/// Increments `counter`, then succeeds synchronously.
pub fn counting(counter: &Arc<AtomicUsize>) -> impl Fn(Done) -> anyhow::Result<()> + Send + Sync + 'static {
    let counter = Arc::clone(counter);
    move |done| {
        counter.fetch_add(1, Ordering::SeqCst);
        done.ok();
        Ok(())
    }
}

/// Reports `message` as a failure through the completion handle.
pub fn failing(message: &'static str) -> impl Fn(Done) -> anyhow::Result<()> + Send + Sync + 'static {
    move |done| {
        done.fail(anyhow::anyhow!(message));
        Ok(())
    }
}

/// Logs `start:<label>` when started, then after `delay` logs `end:<label>`
/// and succeeds (or fails with `fail_with`, if set).
pub struct DelayedBody {
    log: Log,
    label: String,
    delay: Duration,
    fail_with: Option<&'static str>,
}

impl DelayedBody {
    pub fn failing(mut self, message: &'static str) -> Self {
        self.fail_with = Some(message);
        self
    }
}

pub fn delayed(log: &Log, label: &str, delay: Duration) -> DelayedBody {
    DelayedBody {
        log: Arc::clone(log),
        label: label.to_string(),
        delay,
        fail_with: None,
    }
}

impl TaskBody for DelayedBody {
    fn run(&self, done: Done) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(format!("start:{}", self.label));

        let log = Arc::clone(&self.log);
        let label = self.label.clone();
        let delay = self.delay;
        let fail_with = self.fail_with;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            log.lock().unwrap().push(format!("end:{label}"));
            match fail_with {
                Some(message) => done.fail(anyhow::anyhow!(message)),
                None => done.ok(),
            }
        });
        Ok(())
    }
}
