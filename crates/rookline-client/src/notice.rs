//! Transient, auto-dismissed user notices.

use std::time::{Duration, Instant};

/// How long a notice stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The game has ended.
    Terminal,
    /// The authority refused this client's move.
    Rejected,
    /// A snapshot failed to load; a fresh one has been requested.
    Desync,
    /// The server reported a protocol error.
    Error,
}

/// A message for the user. Notices never block the session; a renderer
/// shows one and hides it again after [`Notice::ttl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub ttl: Duration,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            ttl: NOTICE_TTL,
        }
    }

    /// Whether a notice first shown at `shown_at` should be gone by `now`.
    pub fn is_expired(&self, shown_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(shown_at) >= self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_expires_after_ttl() {
        let notice = Notice::new(NoticeKind::Rejected, "Invalid move!");
        let shown = Instant::now();

        assert_eq!(notice.ttl, Duration::from_secs(5));
        assert!(!notice.is_expired(shown, shown + Duration::from_secs(4)));
        assert!(notice.is_expired(shown, shown + NOTICE_TTL));
    }
}
