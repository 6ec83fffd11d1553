#![allow(dead_code)]

// tests/common/mod.rs
use std::future::Future;
use std::time::Duration;


// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Poll `check` until it holds or `timeout` passes.
///
/// Match teardown happens on the match's own task, so tests that only
/// fire a command need to wait for its effects.
pub async fn eventually<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = tokio::time::Instant::now();
    loop {
        if check() {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Await `fut`, failing the test instead of hanging when it stalls.
pub async fn within<T>(timeout: Duration, fut: impl Future<Output = T>) -> T {
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or_else(|_| panic!("operation did not finish within {timeout:?}"))
}
