use {super::*, tokio::signal::ctrl_c};

/// Cancels the returned token on the first SIGINT or SIGTERM.
pub(crate) fn setup_signal_handler() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c() => info!("Received SIGINT, shutting down"),
                        _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                    }
                }
                Err(err) => {
                    warn!("Failed to install SIGTERM handler: {err}");
                    ctrl_c().await.ok();
                    info!("Received SIGINT, shutting down");
                }
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c().await.ok();
            info!("Received Ctrl-C, shutting down");
        }

        trigger.cancel();
    });

    cancel
}
