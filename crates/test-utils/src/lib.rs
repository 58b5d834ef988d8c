//! Shared helpers for taskdag's integration tests.

pub mod bodies;
pub mod builders;
pub mod recorder;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

pub use recorder::EventRecorder;

/// Upper bound for any single awaited build in tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Output is captured by the harness and shown for failing tests only.
/// Filter with `TASKDAG_LOG`, e.g. `TASKDAG_LOG=taskdag::engine=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env("TASKDAG_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        // Another harness may already have installed one.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Await `f`, panicking if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("test future did not complete within {TEST_TIMEOUT:?}"),
    }
}
