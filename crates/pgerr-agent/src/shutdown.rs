//! Process shutdown signals.

use std::future::Future;

/// Wait for SIGINT, or SIGTERM on unix, and name the one received.
pub async fn signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => first_of(tokio::signal::ctrl_c(), term.recv()).await,
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM, waiting for SIGINT only");
                let _ = tokio::signal::ctrl_c().await;
                "SIGINT"
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "SIGINT"
    }
}

async fn first_of<I, T>(sigint: I, sigterm: T) -> &'static str
where
    I: Future,
    T: Future,
{
    tokio::select! {
        _ = sigint => "SIGINT",
        _ = sigterm => "SIGTERM",
    }
}
