//! Study countdown state machine.
//!
//! A countdown runs linearly from its starting duration down to zero, one
//! step per tick. The visible label follows the remaining time while
//! running and falls back to the idle text once finished.
//!
//! ```text
//! Running(300000) --tick--> Running(299000) --tick--> ... --tick--> Finished
//! ```
//!
//! Ticks are delivered by the [`Scheduler`](crate::scheduler::Scheduler);
//! this type only tracks state and never looks at the clock.

/// Default countdown length (5 minutes)
pub const DEFAULT_DURATION_MS: u64 = 5 * 60 * 1000;
/// Default tick interval
pub const DEFAULT_TICK_MS: u64 = 1000;
/// Label shown while no countdown is running
pub const IDLE_LABEL: &str = "Start Study Timer";

/// Countdown state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Running { remaining_ms: u64 },
    Finished,
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Remaining time decreased, label updated
    Progress { remaining_ms: u64 },
    /// Countdown reached zero on this tick
    Finished,
    /// Nothing happened (already finished or cancelled)
    Idle,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    state: CountdownState,
    step_ms: u64,
    cancelled: bool,
    label: String,
}

impl Countdown {
    /// Start a countdown with the default 5 minute duration and 1s steps
    #[allow(dead_code)] // Used in tests
    pub fn start() -> Self {
        Self::with_duration(DEFAULT_DURATION_MS, DEFAULT_TICK_MS)
    }

    /// Start a countdown with a custom duration and step.
    ///
    /// The duration is rounded down to a whole number of steps so the
    /// countdown always lands exactly on zero.
    pub fn with_duration(duration_ms: u64, step_ms: u64) -> Self {
        let step_ms = step_ms.max(1);
        let remaining_ms = duration_ms - duration_ms % step_ms;

        if remaining_ms == 0 {
            return Self {
                state: CountdownState::Finished,
                step_ms,
                cancelled: false,
                label: IDLE_LABEL.to_string(),
            };
        }

        Self {
            state: CountdownState::Running { remaining_ms },
            step_ms,
            cancelled: false,
            label: running_label(remaining_ms),
        }
    }

    /// Advance by one step
    pub fn tick(&mut self) -> Tick {
        if self.cancelled {
            return Tick::Idle;
        }

        let CountdownState::Running { remaining_ms } = self.state else {
            return Tick::Idle;
        };

        let remaining_ms = remaining_ms.saturating_sub(self.step_ms);
        if remaining_ms == 0 {
            self.state = CountdownState::Finished;
            self.label = IDLE_LABEL.to_string();
            Tick::Finished
        } else {
            self.state = CountdownState::Running { remaining_ms };
            self.label = running_label(remaining_ms);
            Tick::Progress { remaining_ms }
        }
    }

    /// Stop the countdown. The label keeps its last value.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn current_label(&self) -> &str {
        &self.label
    }

    #[allow(dead_code)] // Used in tests
    pub fn state(&self) -> CountdownState {
        self.state
    }

    /// Remaining time in milliseconds (0 once finished)
    #[allow(dead_code)] // Used in tests
    pub fn remaining_ms(&self) -> u64 {
        match self.state {
            CountdownState::Running { remaining_ms } => remaining_ms,
            CountdownState::Finished => 0,
        }
    }

    pub fn step_ms(&self) -> u64 {
        self.step_ms
    }

    /// Running and not cancelled
    pub fn is_running(&self) -> bool {
        !self.cancelled && matches!(self.state, CountdownState::Running { .. })
    }

    pub fn is_finished(&self) -> bool {
        self.state == CountdownState::Finished
    }
}

/// Format milliseconds as `MM:SS`
pub fn format_remaining(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    format!("{:02}:{:02}", minutes, seconds)
}

fn running_label(remaining_ms: u64) -> String {
    format!("Time Left: {}", format_remaining(remaining_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_five_minutes() {
        let countdown = Countdown::start();
        assert_eq!(
            countdown.state(),
            CountdownState::Running { remaining_ms: 300_000 }
        );
        assert_eq!(countdown.current_label(), "Time Left: 05:00");
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(125_000), "02:05");
        assert_eq!(format_remaining(300_000), "05:00");
        assert_eq!(format_remaining(59_999), "00:59");
        assert_eq!(format_remaining(0), "00:00");
    }

    #[test]
    fn test_finishes_after_exactly_300_ticks() {
        let mut countdown = Countdown::start();
        let mut last = countdown.remaining_ms();

        for i in 1..300 {
            let tick = countdown.tick();
            assert_eq!(tick, Tick::Progress { remaining_ms: 300_000 - i * 1000 });
            // Strictly decreasing
            assert!(countdown.remaining_ms() < last);
            last = countdown.remaining_ms();
        }

        assert!(!countdown.is_finished());
        assert_eq!(countdown.tick(), Tick::Finished);
        assert!(countdown.is_finished());
        assert_eq!(countdown.remaining_ms(), 0);
    }

    #[test]
    fn test_label_resets_on_finish() {
        let mut countdown = Countdown::start();
        for _ in 0..300 {
            countdown.tick();
        }
        assert_eq!(countdown.current_label(), IDLE_LABEL);
    }

    #[test]
    fn test_label_at_125_seconds() {
        let mut countdown = Countdown::start();
        // 300s - 175 ticks = 125s
        for _ in 0..175 {
            countdown.tick();
        }
        assert_eq!(countdown.remaining_ms(), 125_000);
        assert_eq!(countdown.current_label(), "Time Left: 02:05");
    }

    #[test]
    fn test_finished_emits_once() {
        let mut countdown = Countdown::with_duration(3000, 1000);
        assert!(matches!(countdown.tick(), Tick::Progress { .. }));
        assert!(matches!(countdown.tick(), Tick::Progress { .. }));
        assert_eq!(countdown.tick(), Tick::Finished);
        assert_eq!(countdown.tick(), Tick::Idle);
        assert_eq!(countdown.tick(), Tick::Idle);
        assert_eq!(countdown.remaining_ms(), 0);
    }

    #[test]
    fn test_cancel_freezes_label() {
        let mut countdown = Countdown::start();
        for _ in 0..150 {
            countdown.tick();
        }
        assert_eq!(countdown.remaining_ms(), 150_000);

        countdown.cancel();
        assert!(!countdown.is_running());
        for _ in 0..10 {
            assert_eq!(countdown.tick(), Tick::Idle);
        }
        assert_eq!(countdown.remaining_ms(), 150_000);
        assert_eq!(countdown.current_label(), "Time Left: 02:30");
    }

    #[test]
    fn test_duration_rounded_to_step() {
        let countdown = Countdown::with_duration(2500, 1000);
        assert_eq!(countdown.remaining_ms(), 2000);

        let empty = Countdown::with_duration(500, 1000);
        assert!(empty.is_finished());
        assert_eq!(empty.current_label(), IDLE_LABEL);
    }
}
