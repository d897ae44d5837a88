//! Verwatch - deployed-version watch and refresh service
//!
//! Periodically fetches a small version descriptor, compares it against the
//! baseline observed in this session, and triggers a refresh of the hosting
//! environment when the deployed version changes.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod io;
pub mod notifier;
pub mod reload;
pub mod store;
pub mod watcher;

pub use config::{load_config, Config};
pub use error::{Result, WatchError};
pub use watcher::{CheckOutcome, VersionWatcher};

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::io::ReqwestHttpClient;
use crate::notifier::{LogNotifier, Notifier};
use crate::reload::CommandReloader;
use crate::store::MemoryStore;

/// Build a watcher with production collaborators from the configuration
pub fn build_watcher(config: &Config) -> Arc<VersionWatcher> {
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::default());
    let store: Arc<dyn store::SessionStore> = Arc::new(MemoryStore::new());
    let notifier: Option<Arc<dyn Notifier>> = if config.notice.enabled {
        Some(Arc::new(LogNotifier))
    } else {
        None
    };
    let reloader: Arc<dyn reload::Reloader> =
        Arc::new(CommandReloader::new(config.reload.command.clone()));

    // With no notice surface the refresh happens immediately.
    let notice_delay = Duration::from_secs(config.notice.delay_seconds);

    Arc::new(VersionWatcher::new(
        &config.watch,
        notice_delay,
        http,
        store,
        notifier,
        reloader,
    ))
}

/// Run the watcher service with the given configuration.
/// Returns when a shutdown signal is received.
pub async fn run(config: Config) -> Result<()> {
    let watcher = build_watcher(&config);
    let cancel = CancellationToken::new();

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl-c");
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    let interval = Duration::from_secs(config.watch.check_interval_seconds);
    tracing::info!(
        "Watching {} every {}s",
        config.watch.version_url,
        config.watch.check_interval_seconds
    );

    let handle = watcher.spawn(interval, cancel);
    let _ = handle.await;

    tracing::info!("Version watcher stopped");
    Ok(())
}
