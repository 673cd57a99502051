//! Timer helpers shared by the export paths.

/// Suspend for `ms` milliseconds. Zero returns immediately.
///
/// Natively this uses the Tokio timer when a runtime is current and a helper
/// thread otherwise, so plain executors such as `futures::executor` work too.
pub async fn sleep_ms(ms: u64) {
    if ms == 0 {
        return;
    }

    #[cfg(target_arch = "wasm32")]
    {
        gloo_timers::future::TimeoutFuture::new(ms.min(u32::MAX as u64) as u32).await;
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let duration = std::time::Duration::from_millis(ms);
        if tokio::runtime::Handle::try_current().is_ok() {
            tokio::time::sleep(duration).await;
            return;
        }

        let (tx, rx) = futures_channel::oneshot::channel::<()>();
        std::thread::spawn(move || {
            std::thread::sleep(duration);
            let _ = tx.send(());
        });
        if rx.await.is_err() {
            tracing::warn!(ms, "timer thread exited early");
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn waits_without_a_tokio_runtime() {
        let started = Instant::now();
        futures::executor::block_on(sleep_ms(15));
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[tokio::test]
    async fn waits_on_the_tokio_timer() {
        let started = Instant::now();
        sleep_ms(15).await;
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn zero_is_immediate() {
        futures::executor::block_on(sleep_ms(0));
    }
}
