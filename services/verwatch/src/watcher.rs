//! The poll-compare-refresh core

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::descriptor::{cache_busted_url, current_epoch_ms, VersionDescriptor};
use crate::io::HttpClient;
use crate::notifier::{Notice, Notifier};
use crate::reload::Reloader;
use crate::store::SessionStore;

/// Fixed key for the observed-version baseline in the session store
pub const VERSION_KEY: &str = "site_version";

/// Notice shown before the refresh is triggered
pub const UPDATE_NOTICE: &str = "Updating site to the latest version...";

/// Outcome of a single version check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// First successful fetch of the session; fetched version stored as the
    /// baseline, never a refresh
    BaselineStored,
    /// Fetched version equals the baseline
    Unchanged,
    /// New version observed; baseline updated and refresh issued
    Refreshed,
    /// The cycle was abandoned (transport, parse, or storage failure)
    Skipped,
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckOutcome::BaselineStored => write!(f, "baseline stored"),
            CheckOutcome::Unchanged => write!(f, "unchanged"),
            CheckOutcome::Refreshed => write!(f, "refreshed"),
            CheckOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// Detects that the deployed version descriptor has changed since this
/// session began and triggers a refresh of the hosting environment.
///
/// All collaborators are injected, so the watcher is testable without a
/// network or a real host. A check never fails outward: every error
/// degrades to [`CheckOutcome::Skipped`] and the polling interval acts as
/// the retry mechanism.
pub struct VersionWatcher {
    version_url: String,
    notice_delay: Duration,
    failure_warn_threshold: u32,
    http: Arc<dyn HttpClient>,
    store: Arc<dyn SessionStore>,
    notifier: Option<Arc<dyn Notifier>>,
    reloader: Arc<dyn Reloader>,
    consecutive_failures: AtomicU32,
}

impl std::fmt::Debug for VersionWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionWatcher")
            .field("version_url", &self.version_url)
            .finish()
    }
}

impl VersionWatcher {
    pub fn new(
        config: &WatchConfig,
        notice_delay: Duration,
        http: Arc<dyn HttpClient>,
        store: Arc<dyn SessionStore>,
        notifier: Option<Arc<dyn Notifier>>,
        reloader: Arc<dyn Reloader>,
    ) -> Self {
        Self {
            version_url: config.version_url.clone(),
            notice_delay,
            failure_warn_threshold: config.failure_warn_threshold,
            http,
            store,
            notifier,
            reloader,
            consecutive_failures: AtomicU32::new(0),
        }
    }

    /// Run one check cycle
    pub async fn check(&self) -> CheckOutcome {
        match self.try_check().await {
            Ok(outcome) => {
                self.consecutive_failures.store(0, Ordering::Relaxed);
                outcome
            }
            Err(e) => {
                let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
                debug!("Version check failed: {}", e);
                if failures == self.failure_warn_threshold {
                    warn!(
                        "Version check has failed {} times in a row (last error: {})",
                        failures, e
                    );
                }
                CheckOutcome::Skipped
            }
        }
    }

    async fn try_check(&self) -> crate::Result<CheckOutcome> {
        let url = cache_busted_url(&self.version_url, current_epoch_ms());
        let response = self.http.get(&url).await?;
        if !response.is_success() {
            return Err(crate::WatchError::Status(response.status));
        }

        let descriptor = VersionDescriptor::parse(&response.body)?;

        match self.store.get(VERSION_KEY).await? {
            None => {
                self.store.put(VERSION_KEY, &descriptor.version).await?;
                debug!("Stored baseline version '{}'", descriptor.version);
                Ok(CheckOutcome::BaselineStored)
            }
            Some(baseline) if baseline == descriptor.version => Ok(CheckOutcome::Unchanged),
            Some(baseline) => {
                info!(
                    "New version detected: '{}' -> '{}'",
                    baseline, descriptor.version
                );

                // The baseline must reflect the new version before the
                // refresh is issued, so the refresh cannot re-trigger this
                // transition.
                self.store.put(VERSION_KEY, &descriptor.version).await?;

                if let Some(notifier) = &self.notifier {
                    if let Err(e) = notifier.notify(&Notice::info(UPDATE_NOTICE)).await {
                        warn!("Failed to surface update notice: {}", e);
                    }
                    tokio::time::sleep(self.notice_delay).await;
                }

                if let Err(e) = self.reloader.reload().await {
                    warn!("Refresh failed: {}", e);
                }

                Ok(CheckOutcome::Refreshed)
            }
        }
    }

    /// Run the check loop: once immediately, then on a fixed interval
    /// until the token is cancelled
    pub async fn run(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        loop {
            let outcome = self.check().await;
            debug!("Version check: {}", outcome);

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = cancel.cancelled() => {
                    debug!("Version watcher cancelled");
                    break;
                }
            }
        }
    }

    /// Spawn the check loop as a background task
    pub fn spawn(
        self: Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run(interval, cancel))
    }
}
