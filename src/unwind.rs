//! Failure capture for futures: errors and panics alike become messages.

use futures::FutureExt;
use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// Drives `fut` to completion, turning an `Err` or a panic into its message.
pub async fn catch_failure<T, E, Fut>(fut: Fut) -> Result<T, String>
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

/// Extracts the message from a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        let caught = std::panic::catch_unwind(|| panic!("plain")).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "plain");

        let caught = std::panic::catch_unwind(|| panic!("formatted {}", 7)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "formatted 7");

        let caught = std::panic::catch_unwind(|| std::panic::panic_any(42_u8)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "panic with non-string payload");
    }

    #[tokio::test]
    async fn test_catch_failure_maps_err_and_panic() {
        let ok: Result<u8, String> = catch_failure(async { Ok::<_, String>(3) }).await;
        assert_eq!(ok, Ok(3));

        let err: Result<u8, String> = catch_failure(async { Err::<u8, _>("nope") }).await;
        assert_eq!(err, Err("nope".to_string()));

        let panicked: Result<u8, String> = catch_failure(async {
            if true {
                panic!("exploded");
            }
            Ok::<u8, String>(1)
        })
        .await;
        assert_eq!(panicked, Err("exploded".to_string()));
    }
}
