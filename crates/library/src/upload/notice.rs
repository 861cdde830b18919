use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;
use tokio::time::Instant;

pub const SUCCESS_MESSAGE: &str = "file uploaded successfully!";
pub const FAILURE_MESSAGE: &str = "upload failed, please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// The banner shown under the upload area.
///
/// Success notices expire on their own; error notices stay until dismissed
/// or replaced by the next selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    expires_at: Option<Instant>,
}

impl Notice {
    pub(crate) fn success(ttl: Duration) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: SUCCESS_MESSAGE.to_string(),
            expires_at: Some(Instant::now() + ttl),
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            expires_at: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }

    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.message)
    }
}
