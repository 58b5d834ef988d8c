#![allow(dead_code, unused_imports)]

pub use taskdag_test_utils::bodies;
pub use taskdag_test_utils::builders;
pub use taskdag_test_utils::{init_tracing, with_timeout, EventRecorder};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
