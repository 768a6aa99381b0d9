// src/notify.rs
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Danger,
        }
    }
}

/// Transient toast surface: holds the latest notification until it expires.
/// A new notification replaces the one on display.
#[derive(Debug)]
pub struct Toaster {
    duration: Duration,
    current: Option<(Notification, Instant)>,
}

impl Toaster {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            current: None,
        }
    }

    pub fn show(&mut self, notification: Notification) {
        self.show_at(notification, Instant::now());
    }

    fn show_at(&mut self, notification: Notification, at: Instant) {
        match notification.severity {
            Severity::Success => log::info!("Toast: {}", notification.message),
            Severity::Danger => log::warn!("Toast: {}", notification.message),
        }
        self.current = Some((notification, at));
    }

    pub fn visible(&self) -> Option<&Notification> {
        self.visible_at(Instant::now())
    }

    fn visible_at(&self, now: Instant) -> Option<&Notification> {
        match &self.current {
            Some((notification, shown_at)) if now.saturating_duration_since(*shown_at) < self.duration => {
                Some(notification)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_expires() {
        let mut toaster = Toaster::new(Duration::from_millis(500));
        let start = Instant::now();
        toaster.show_at(Notification::success("saved"), start);

        assert_eq!(toaster.visible_at(start).map(|n| n.message.as_str()), Some("saved"));
        assert!(toaster.visible_at(start + Duration::from_millis(499)).is_some());
        assert!(toaster.visible_at(start + Duration::from_millis(500)).is_none());
    }

    #[test]
    fn test_newer_toast_replaces_older() {
        let mut toaster = Toaster::new(Duration::from_secs(5));
        toaster.show(Notification::success("first"));
        toaster.show(Notification::danger("second"));
        let visible = toaster.visible().unwrap();
        assert_eq!(visible.message, "second");
        assert_eq!(visible.severity, Severity::Danger);
    }
}
