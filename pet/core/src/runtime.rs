//! Headless Runtime
//!
//! Drives a [`PetController`] on the current tokio task until `shutdown`
//! resolves. Used by the `--headless` mode and by tests; the terminal UI
//! folds the same two calls into its own event loop instead.

use std::future::Future;

use crate::controller::PetController;

/// Run the decay loop and timers until `shutdown` completes
///
/// Starts the controller, sleeps until each deadline it reports, and stops
/// it (with a final save) on the way out. Must run on a current-thread
/// runtime or inside a `LocalSet`: the controller is not `Send`.
pub async fn drive<F>(controller: &PetController, shutdown: F)
where
    F: Future<Output = ()>,
{
    controller.start();
    tokio::pin!(shutdown);

    loop {
        let deadline = controller.next_deadline();
        tokio::select! {
            biased;
            () = &mut shutdown => break,
            () = sleep_until(deadline) => {
                let fired = controller.poll_timers();
                tracing::trace!(fired, "Timers polled");
            }
        }
    }

    controller.stop();
}

async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
