//! Cooperative single-threaded timer scheduling.
//!
//! The event loop owns a [`Scheduler`] and asks it for due timers each
//! time it wakes up. Nothing runs in the background: a timer only fires
//! when the loop calls [`Scheduler::next_due`].
//!
//! # Cancellation
//!
//! Every timer carries a [`CancellationToken`]. The token is checked at
//! each tick boundary, so a timer cancelled while handling one tick never
//! fires again, even if more ticks were already overdue.
//!
//! # Catch-up
//!
//! When the loop was blocked (e.g. during a screen handover) several
//! intervals may have elapsed. Each elapsed interval fires once, in order,
//! keeping repeating timers aligned with wall-clock time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared cancellation flag for a scheduled timer
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Handle identifying a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer {
    id: TimerId,
    interval: Duration,
    next_deadline: Instant,
    token: CancellationToken,
}

/// Repeating timer scheduler driven by the event loop
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer that first fires one `interval` after `now`, then
    /// every `interval` after that until cancelled.
    pub fn schedule_repeating(
        &mut self,
        now: Instant,
        interval: Duration,
    ) -> (TimerId, CancellationToken) {
        let interval = interval.max(Duration::from_millis(1));
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let token = CancellationToken::new();
        self.timers.push(Timer {
            id,
            interval,
            next_deadline: now + interval,
            token: token.clone(),
        });

        tracing::debug!("Scheduled timer {:?} every {:?}", id, interval);
        (id, token)
    }

    /// Cancel a timer by id
    pub fn cancel(&mut self, id: TimerId) {
        if let Some(timer) = self.timers.iter().find(|t| t.id == id) {
            timer.token.cancel();
        }
        self.prune();
    }

    /// Cancel every timer
    pub fn cancel_all(&mut self) {
        for timer in &self.timers {
            timer.token.cancel();
        }
        self.timers.clear();
    }

    /// Pop the next due tick, if any.
    ///
    /// Returns timers in deadline order. Call repeatedly until `None`.
    pub fn next_due(&mut self, now: Instant) -> Option<TimerId> {
        self.prune();

        let timer = self
            .timers
            .iter_mut()
            .filter(|t| t.next_deadline <= now)
            .min_by_key(|t| t.next_deadline)?;

        timer.next_deadline += timer.interval;
        Some(timer.id)
    }

    /// Earliest deadline among live timers
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers
            .iter()
            .filter(|t| !t.token.is_cancelled())
            .map(|t| t.next_deadline)
            .min()
    }

    /// Time left until the next deadline (zero if overdue)
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Number of live timers
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.timers
            .iter()
            .filter(|t| !t.token.is_cancelled())
            .count()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop timers whose token was cancelled
    fn prune(&mut self) {
        self.timers.retain(|t| !t.token.is_cancelled());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_nothing_due_before_interval() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule_repeating(start, SECOND);

        assert_eq!(scheduler.next_due(start), None);
        assert_eq!(scheduler.next_due(start + Duration::from_millis(999)), None);
    }

    #[test]
    fn test_fires_once_per_interval() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let (id, _token) = scheduler.schedule_repeating(start, SECOND);

        let now = start + SECOND;
        assert_eq!(scheduler.next_due(now), Some(id));
        assert_eq!(scheduler.next_due(now), None);

        let now = start + 2 * SECOND;
        assert_eq!(scheduler.next_due(now), Some(id));
        assert_eq!(scheduler.next_due(now), None);
    }

    #[test]
    fn test_catch_up_after_stall() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let (id, _token) = scheduler.schedule_repeating(start, SECOND);

        // Loop was blocked for 3.5 seconds
        let now = start + Duration::from_millis(3500);
        let mut fired = 0;
        while let Some(due) = scheduler.next_due(now) {
            assert_eq!(due, id);
            fired += 1;
        }
        assert_eq!(fired, 3);
        assert_eq!(scheduler.next_deadline(), Some(start + 4 * SECOND));
    }

    #[test]
    fn test_token_checked_at_tick_boundary() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let (id, token) = scheduler.schedule_repeating(start, SECOND);

        let now = start + 5 * SECOND;
        assert_eq!(scheduler.next_due(now), Some(id));

        // Cancelled while handling the first overdue tick
        token.cancel();
        assert_eq!(scheduler.next_due(now), None);
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn test_cancel_by_id() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let (a, token_a) = scheduler.schedule_repeating(start, SECOND);
        let (b, _token_b) = scheduler.schedule_repeating(start, 2 * SECOND);

        scheduler.cancel(a);
        assert!(token_a.is_cancelled());
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.next_due(start + 2 * SECOND), Some(b));
    }

    #[test]
    fn test_deadline_order() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let (slow, _) = scheduler.schedule_repeating(start, 3 * SECOND);
        let (fast, _) = scheduler.schedule_repeating(start, SECOND);

        let now = start + 3 * SECOND;
        let order: Vec<_> = std::iter::from_fn(|| scheduler.next_due(now)).collect();
        // Both due at 3s: ties go to the timer scheduled first
        assert_eq!(order, vec![fast, fast, slow, fast]);
    }

    #[test]
    fn test_time_until_next() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.time_until_next(start), None);

        scheduler.schedule_repeating(start, SECOND);
        assert_eq!(
            scheduler.time_until_next(start + Duration::from_millis(400)),
            Some(Duration::from_millis(600))
        );
        assert_eq!(
            scheduler.time_until_next(start + 2 * SECOND),
            Some(Duration::ZERO)
        );
    }
}
