use std::time::{Duration, Instant};

use crate::config::Config;
use crate::countdown::{Countdown, Tick, IDLE_LABEL};
use crate::navigator::{normalize_mood, Navigator, Screen};
use crate::quotes::pick_quote;
use crate::scheduler::{CancellationToken, Scheduler, TimerId};
use crate::toast::{Toast, ToastDuration, ToastQueue};
use crate::ui::theme::Theme;

/// Upper bound on how long the event loop sleeps waiting for input
const MAX_POLL: Duration = Duration::from_millis(100);

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Home screen visible and interactive
    Home,
    /// An external screen has the terminal
    Away,
    /// Screen destroyed, event loop should stop
    Exit,
}

/// The four buttons on the home screen, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    StartTimer,
    DetectMood,
    VoiceMood,
    TypingMood,
}

impl Button {
    pub const ALL: [Button; 4] = [
        Button::StartTimer,
        Button::DetectMood,
        Button::VoiceMood,
        Button::TypingMood,
    ];

    /// Screen this button navigates to (none for the timer)
    pub fn screen(&self) -> Option<Screen> {
        match self {
            Button::StartTimer => None,
            Button::DetectMood => Some(Screen::FaceDetection),
            Button::VoiceMood => Some(Screen::VoiceMood),
            Button::TypingMood => Some(Screen::TypingMood),
        }
    }

    /// Keyboard shortcut
    pub fn shortcut(&self) -> char {
        match self {
            Button::StartTimer => 't',
            Button::DetectMood => 'f',
            Button::VoiceMood => 'v',
            Button::TypingMood => 'y',
        }
    }

    pub fn from_shortcut(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.shortcut() == c)
    }
}

/// A running countdown and the timer driving it
struct ActiveTimer {
    countdown: Countdown,
    id: TimerId,
    token: CancellationToken,
}

/// Home screen state
pub struct App {
    mode: AppMode,
    config: Config,
    theme: Theme,
    /// Index into `Button::ALL`
    focused: usize,
    timer: Option<ActiveTimer>,
    scheduler: Scheduler,
    toasts: ToastQueue,
    navigator: Navigator,
}

impl App {
    pub fn new(config: Config, theme: Theme, navigator: Navigator) -> Self {
        let toasts = ToastQueue::new(&config.toasts);
        Self {
            mode: AppMode::Home,
            config,
            theme,
            focused: 0,
            timer: None,
            scheduler: Scheduler::new(),
            toasts,
            navigator,
        }
    }

    /// Screen creation: greet with a quote and echo the mood passed in at
    /// launch, if any.
    pub fn create(&mut self, detected_mood: Option<&str>) {
        tracing::info!("Home screen created");
        self.toasts.push(Toast::new(pick_quote(), ToastDuration::Long));
        self.echo_mood(detected_mood);
    }

    /// Screen becomes visible again after an external screen returned
    pub async fn resume(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.mode = AppMode::Home;

        let handoff = self.navigator.take_handoff().await;
        match handoff {
            Ok(Some(handoff)) => self.echo_mood(handoff.mood()),
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring hand-off payload: {}", e),
        }
    }

    /// Tear the screen down. Pending ticks and toasts are dropped; the
    /// timer label keeps whatever it last showed.
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        tracing::info!("Home screen destroyed");

        if let Some(active) = self.timer.as_mut() {
            active.token.cancel();
            active.countdown.cancel();
        }
        self.scheduler.cancel_all();
        self.toasts.clear();
        self.mode = AppMode::Exit;
    }

    pub fn is_destroyed(&self) -> bool {
        self.mode == AppMode::Exit
    }

    #[allow(dead_code)] // Used in tests
    pub fn mode(&self) -> AppMode {
        self.mode
    }

    /// Press a button
    pub async fn activate(&mut self, button: Button, now: Instant) {
        if self.is_destroyed() {
            return;
        }
        tracing::debug!("Activated {:?}", button);

        match button.screen() {
            None => self.start_timer(now),
            Some(screen) => self.navigate_to(screen).await,
        }
    }

    /// Press the focused button
    pub async fn activate_focused(&mut self, now: Instant) {
        let button = self.focused_button();
        self.activate(button, now).await;
    }

    /// Start the study countdown. Ignored while one is already running.
    pub fn start_timer(&mut self, now: Instant) {
        if self.is_destroyed() {
            return;
        }
        if self.timer.as_ref().is_some_and(|t| t.countdown.is_running()) {
            tracing::debug!("Timer already running, ignoring start");
            return;
        }

        let timer_config = &self.config.timer;
        let countdown = Countdown::with_duration(timer_config.duration_ms(), timer_config.tick_millis);
        if countdown.is_finished() {
            tracing::warn!("Timer duration is shorter than one tick, not starting");
            return;
        }

        let interval = Duration::from_millis(countdown.step_ms());
        let (id, token) = self.scheduler.schedule_repeating(now, interval);
        tracing::info!("Study timer started: {}", countdown.current_label());
        self.timer = Some(ActiveTimer { countdown, id, token });
    }

    /// Hand control to an external screen, then resume
    pub async fn navigate_to(&mut self, screen: Screen) {
        if self.is_destroyed() {
            return;
        }
        self.mode = AppMode::Away;

        if let Err(e) = self.navigator.navigate_to(screen).await {
            tracing::warn!("Navigation to {} failed: {}", screen, e);
            self.toasts.push(Toast::error(format!("Could not open {}: {}", screen, e)));
        }

        self.resume().await;
    }

    /// Run everything due at `now`: timer ticks, then toast expiry
    pub fn update(&mut self, now: Instant) {
        if self.is_destroyed() {
            return;
        }
        self.pump_timers(now);
        self.toasts.update(now);
    }

    fn pump_timers(&mut self, now: Instant) {
        while let Some(id) = self.scheduler.next_due(now) {
            let Some(active) = self.timer.as_mut().filter(|t| t.id == id) else {
                continue;
            };

            match active.countdown.tick() {
                Tick::Progress { remaining_ms } => {
                    tracing::debug!("Tick: {} ms left", remaining_ms);
                }
                Tick::Finished => {
                    self.timer = None;
                    self.scheduler.cancel(id);
                    tracing::info!("Study session complete");
                    self.toasts.push(Toast::new(
                        format!("Session complete!\n{}", pick_quote()),
                        ToastDuration::Long,
                    ));
                }
                Tick::Idle => {
                    active.token.cancel();
                }
            }
        }
    }

    /// How long the event loop may wait for input before calling `update`
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.scheduler
            .time_until_next(now)
            .map_or(MAX_POLL, |d| d.min(MAX_POLL))
    }

    /// Label of the start-timer button
    pub fn timer_label(&self) -> &str {
        self.timer
            .as_ref()
            .map_or(IDLE_LABEL, |t| t.countdown.current_label())
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| t.countdown.is_running())
    }

    /// Label for any button
    pub fn button_label(&self, button: Button) -> &str {
        match button {
            Button::StartTimer => self.timer_label(),
            Button::DetectMood => "Detect Mood",
            Button::VoiceMood => "Voice Mood",
            Button::TypingMood => "Typing Mood",
        }
    }

    pub fn focused_index(&self) -> usize {
        self.focused
    }

    pub fn focused_button(&self) -> Button {
        Button::ALL[self.focused]
    }

    pub fn focus(&mut self, index: usize) {
        if index < Button::ALL.len() {
            self.focused = index;
        }
    }

    /// Move focus down (wraps)
    pub fn next(&mut self) {
        self.focused = (self.focused + 1) % Button::ALL.len();
    }

    /// Move focus up (wraps)
    pub fn previous(&mut self) {
        let len = Button::ALL.len();
        self.focused = (self.focused + len - 1) % len;
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    fn echo_mood(&mut self, mood: Option<&str>) {
        match normalize_mood(mood) {
            Some(mood) => {
                tracing::info!("Last detected mood: {}", mood);
                self.toasts
                    .push(Toast::new(format!("🧠 Last mood: {}", mood), ToastDuration::Short));
            }
            None if mood.is_some() => tracing::debug!("Blank detected mood, not shown"),
            None => {}
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.destroy();
    }
}
