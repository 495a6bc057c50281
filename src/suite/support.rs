//! Waiting and substitution helpers for check bodies.

use crate::games::chessblitz::GameHost;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Suspends for `delay`, then lets the host's timed effects catch up with
/// the time that actually passed.
#[instrument(skip(host))]
pub async fn settle<H: GameHost + ?Sized>(host: &mut H, delay: Duration) {
    let started = Instant::now();
    tokio::time::sleep(delay).await;
    host.advance(started.elapsed());
}

/// Polls `condition` every `poll` until it holds or `timeout` passes.
/// Returns whether it held.
#[instrument(skip(host, condition))]
pub async fn wait_until<H, F>(host: &mut H, poll: Duration, timeout: Duration, condition: F) -> bool
where
    H: GameHost + ?Sized,
    F: Fn(&H) -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition(&*host) {
            return true;
        }
        if Instant::now() >= deadline {
            debug!("Condition not met before timeout");
            return false;
        }
        settle(host, poll).await;
    }
}

/// Installs `replacement` through `swap`, runs `body`, and puts the
/// original back whether the body succeeds, errors or panics.
pub async fn with_substitute<H, T, S, B, R>(host: &mut H, replacement: T, swap: S, body: B) -> anyhow::Result<R>
where
    H: ?Sized,
    S: Fn(&mut H, T) -> T,
    B: for<'a> FnOnce(&'a mut H) -> LocalBoxFuture<'a, anyhow::Result<R>>,
{
    let original = swap(host, replacement);
    let outcome = AssertUnwindSafe(body(host)).catch_unwind().await;
    swap(host, original);
    match outcome {
        Ok(result) => result,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}
