//! Notification surface for transient user-visible notices

use async_trait::async_trait;
use std::fmt;

/// Severity styling of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::Info => write!(f, "info"),
            NoticeKind::Success => write!(f, "success"),
            NoticeKind::Error => write!(f, "error"),
        }
    }
}

/// A transient message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Info,
        }
    }
}

/// Trait for surfacing transient notices
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Show a transient notice
    async fn notify(&self, notice: &Notice) -> crate::Result<()>;
}

/// Surfaces notices through the service log when no richer surface exists
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: &Notice) -> crate::Result<()> {
        match notice.kind {
            NoticeKind::Error => tracing::error!("{}", notice.message),
            _ => tracing::info!("{}", notice.message),
        }
        Ok(())
    }
}
