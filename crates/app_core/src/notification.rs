//! Transient toast notifications

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// A message for the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }
}

/// A notification on screen
#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    pub shown_at: Instant,
}

/// Toast stack with a fixed lifetime per toast
#[derive(Debug)]
pub struct NotificationCenter {
    toasts: Vec<Toast>,
    lifetime: Duration,
}

impl NotificationCenter {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            lifetime,
        }
    }

    pub fn push(&mut self, notification: Notification, now: Instant) {
        match notification.kind {
            NotificationKind::Error => tracing::warn!("{}", notification.message),
            _ => tracing::debug!("{}", notification.message),
        }
        self.toasts.push(Toast {
            notification,
            shown_at: now,
        });
    }

    /// Drop toasts older than the lifetime
    pub fn expire(&mut self, now: Instant) {
        let lifetime = self.lifetime;
        self.toasts
            .retain(|t| now.saturating_duration_since(t.shown_at) < lifetime);
    }

    /// Toasts currently on screen, oldest first
    pub fn active(&self) -> &[Toast] {
        &self.toasts
    }

    /// Time until the oldest toast expires, for scheduling a repaint
    pub fn next_expiry(&self, now: Instant) -> Option<Duration> {
        self.toasts
            .iter()
            .map(|t| (t.shown_at + self.lifetime).saturating_duration_since(now))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire_after_lifetime() {
        let start = Instant::now();
        let mut center = NotificationCenter::new(Duration::from_millis(2000));

        center.push(Notification::info("Adding image..."), start);
        center.push(
            Notification::success("Image added!"),
            start + Duration::from_millis(500),
        );
        assert_eq!(center.active().len(), 2);

        center.expire(start + Duration::from_millis(1999));
        assert_eq!(center.active().len(), 2);

        center.expire(start + Duration::from_millis(2000));
        assert_eq!(center.active().len(), 1);
        assert_eq!(center.active()[0].notification.message, "Image added!");
        assert_eq!(
            center.next_expiry(start + Duration::from_millis(2000)),
            Some(Duration::from_millis(500))
        );

        center.expire(start + Duration::from_millis(2500));
        assert!(center.active().is_empty());
        assert_eq!(center.next_expiry(start), None);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Notification::error("x").kind, NotificationKind::Error);
        assert_eq!(Notification::success("x").kind, NotificationKind::Success);
    }
}
