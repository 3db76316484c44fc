//! Transient pop-up notifications.
//!
//! Toasts are short-lived, non-blocking messages drawn over the home
//! screen. Each one expires on its own after its display duration; the
//! queue shows at most `max_visible` at once and holds the rest back.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::ToastConfig;

/// How long a toast stays on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastDuration {
    Short,
    Long,
}

/// Visual flavor of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub duration: ToastDuration,
    /// Set when the toast becomes visible
    shown_at: Option<Instant>,
}

impl Toast {
    pub fn new(message: impl Into<String>, duration: ToastDuration) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Info,
            duration,
            shown_at: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            ..Self::new(message, ToastDuration::Short)
        }
    }
}

/// Queue of pending and visible toasts
#[derive(Debug)]
pub struct ToastQueue {
    visible: Vec<Toast>,
    pending: VecDeque<Toast>,
    short: Duration,
    long: Duration,
    max_visible: usize,
    /// Total toasts ever pushed
    #[allow(dead_code)] // Read in tests
    shown_total: usize,
}

impl ToastQueue {
    pub fn new(config: &ToastConfig) -> Self {
        Self {
            visible: Vec::new(),
            pending: VecDeque::new(),
            short: Duration::from_millis(config.short_millis),
            long: Duration::from_millis(config.long_millis),
            max_visible: config.max_visible.max(1),
            shown_total: 0,
        }
    }

    /// Queue a toast. It becomes visible on the next `update`.
    pub fn push(&mut self, toast: Toast) {
        tracing::debug!("Toast: {:?}", toast.message);
        self.shown_total += 1;
        self.pending.push_back(toast);
    }

    /// Expire old toasts and promote pending ones
    pub fn update(&mut self, now: Instant) {
        let (short, long) = (self.short, self.long);
        self.visible.retain(|toast| match toast.shown_at {
            Some(at) => {
                let ttl = match toast.duration {
                    ToastDuration::Short => short,
                    ToastDuration::Long => long,
                };
                now.saturating_duration_since(at) < ttl
            }
            None => true,
        });

        while self.visible.len() < self.max_visible {
            let Some(mut toast) = self.pending.pop_front() else {
                break;
            };
            toast.shown_at = Some(now);
            self.visible.push(toast);
        }
    }

    /// Toasts currently on screen, oldest first
    pub fn visible(&self) -> &[Toast] {
        &self.visible
    }

    /// Every toast not yet expired, visible ones first
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.visible.iter().chain(self.pending.iter())
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty() && self.pending.is_empty()
    }

    #[cfg(test)]
    pub fn total_shown(&self) -> usize {
        self.shown_total
    }

    /// Drop everything (screen teardown)
    pub fn clear(&mut self) {
        self.visible.clear();
        self.pending.clear();
    }
}
