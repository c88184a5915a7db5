//! Ctrl-C and `--timeout-secs` both cancel through one token.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Token cancelled on Ctrl-C or, if given, after `timeout`. Cancelling the
/// token yourself stops the watcher.
pub fn cancel_token(timeout: Option<Duration>) -> CancellationToken {
    let token = CancellationToken::new();
    let watcher = token.clone();
    tokio::spawn(async move {
        let deadline = async {
            match timeout {
                Some(t) => tokio::time::sleep(t).await,
                None => std::future::pending::<()>().await,
            }
        };
        let interrupt = async {
            // Without a signal handler only the deadline can fire.
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        tokio::select! {
            _ = watcher.cancelled() => return,
            _ = interrupt => tracing::warn!("interrupted, cancelling in-flight parts"),
            _ = deadline => tracing::warn!("timeout reached, cancelling"),
        }
        watcher.cancel();
    });
    token
}
