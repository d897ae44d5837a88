//! Reload primitive: the watcher's only outward side effect

use async_trait::async_trait;
use tokio::process::Command;

/// Trait for triggering a full refresh of the hosting environment
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait Reloader: Send + Sync {
    /// Trigger the refresh
    async fn reload(&self) -> crate::Result<()>;
}

/// Runs a configured refresh hook command, e.g. a script that tells a
/// kiosk browser to reload the page. With no command configured the
/// version change is only logged.
#[derive(Debug)]
pub struct CommandReloader {
    command: Option<String>,
}

impl CommandReloader {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl Reloader for CommandReloader {
    async fn reload(&self) -> crate::Result<()> {
        let Some(command) = &self.command else {
            tracing::info!("New version detected; no reload hook configured");
            return Ok(());
        };

        tracing::debug!("Running reload hook: {}", command);
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .status()
            .await
            .map_err(|e| crate::WatchError::Reload(format!("Failed to run hook: {}", e)))?;

        if !status.success() {
            return Err(crate::WatchError::Reload(format!(
                "Hook exited with {}",
                status
            )));
        }

        tracing::debug!("Reload hook finished");
        Ok(())
    }
}
