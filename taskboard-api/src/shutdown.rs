/// Shutdown signal for graceful server shutdown
///
/// Resolves on Ctrl-C, or SIGTERM on Unix. A signal whose handler cannot
/// be installed is logged and then never fires, so a registration failure
/// does not stop the server.

use std::future::Future;
use std::io;

/// Waits for `signal`; on error logs and stays pending forever
pub async fn listen<F>(name: &'static str, signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(signal = name, error = %e, "Failed to listen for signal");
        std::future::pending::<()>().await;
    }
}

/// Resolves once the process is asked to stop
pub async fn shutdown_signal() {
    let ctrl_c = listen("ctrl-c", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = listen("SIGTERM", async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?
            .recv()
            .await;
        Ok::<(), io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
