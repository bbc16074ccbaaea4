// Graceful shutdown module
// Waits for in-flight connections after the listener is closed

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::logger;

/// How long in-flight connections get after shutdown is requested
pub const DRAIN_GRACE: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Wait until `conn_counter` reaches zero or `DRAIN_GRACE` elapses.
///
/// Returns the number of connections still open at the end.
pub async fn drain_connections(conn_counter: &AtomicUsize) -> usize {
    drain_connections_within(conn_counter, DRAIN_GRACE).await
}

pub async fn drain_connections_within(conn_counter: &AtomicUsize, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let remaining = conn_counter.load(Ordering::SeqCst);
        if remaining == 0 {
            return 0;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown grace period elapsed with {remaining} connection(s) still open"
            ));
            return remaining;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
