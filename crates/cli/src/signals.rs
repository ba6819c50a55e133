use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Cancel `token` on the first SIGINT or SIGTERM.
///
/// Returns once the token is cancelled, whether by a signal or elsewhere.
pub async fn wait_for_signal(token: CancellationToken) -> anyhow::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => {
            warn!("SIGINT received, stopping scans");
            token.cancel();
        }
        _ = sigterm.recv() => {
            warn!("SIGTERM received, stopping scans");
            token.cancel();
        }
        _ = token.cancelled() => {
            debug!("signal handler no longer needed");
        }
    }
    Ok(())
}
