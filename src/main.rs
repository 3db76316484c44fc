mod app;
mod config;
mod countdown;
mod navigator;
mod quotes;
mod scheduler;
mod toast;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Button};
use config::Config;
use navigator::{CommandLauncher, Handoff, Navigator};
use ui::HomeLayout;

#[derive(Parser, Debug)]
#[command(name = "emotistudy")]
#[command(about = "Study home screen with a countdown timer and mood screen launcher")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "~/.config/emotistudy/config.toml")]
    config: String,

    /// Mood handed over by the screen that launched us
    #[arg(long)]
    detected_mood: Option<String>,

    /// Theme preset (overrides config)
    #[arg(long)]
    theme: Option<String>,

    /// Log file path (stderr is owned by the TUI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Leave a detected mood for the home screen to show when it resumes.
    /// Meant to be called by the external mood screens before they exit.
    ReportMood {
        /// Mood to report, e.g. "Happy"
        mood: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(&log_path)?;

    // Load config
    let mut config = Config::load(&cli.config)?;
    if let Some(theme) = &cli.theme {
        config.appearance.theme = theme.clone();
    }

    if let Some(Command::ReportMood { mood }) = &cli.command {
        return report_mood(&config.handoff.path, mood);
    }

    let theme = config.resolve_theme();
    let launcher = CommandLauncher::new(config.screens.clone());
    let navigator = Navigator::new(Box::new(launcher), config.handoff.path.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create the home screen
    let mut app = App::new(config, theme, navigator);
    app.create(cli.detected_mood.as_deref());

    // Run main loop
    let result = run_app(&mut terminal, &mut app).await;
    app.destroy();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Leave `mood` in the hand-off file for the home screen to pick up
fn report_mood(path: &Path, mood: &str) -> Result<()> {
    Handoff::with_mood(mood)
        .write_to(path)
        .context("Failed to write hand-off payload")?;
    tracing::info!("Reported mood {:?} to {}", mood, path.display());
    Ok(())
}

fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("emotistudy")
        .join("emotistudy.log")
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emotistudy=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.update(Instant::now());
        if app.is_destroyed() {
            return Ok(());
        }

        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(app.poll_timeout(Instant::now()))? {
            continue;
        }

        let handed_over = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key).await,
            Event::Mouse(mouse) => {
                let size = terminal.size()?;
                let area = Rect::new(0, 0, size.width, size.height);
                handle_mouse(app, mouse, area).await
            }
            _ => false,
        };

        // Another program drew over us
        if handed_over {
            terminal.clear()?;
        }
    }
}

/// Handle a key press. Returns true if an external screen ran.
async fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.destroy();
            false
        }
        KeyCode::Esc | KeyCode::Char('q') => {
            app.destroy();
            false
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => {
            app.previous();
            false
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
            app.next();
            false
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.activate_focused(Instant::now()).await;
            app.focused_button().screen().is_some()
        }
        KeyCode::Char(c) => match Button::from_shortcut(c) {
            Some(button) => press(app, button).await,
            None => false,
        },
        _ => false,
    }
}

/// Handle a mouse event. Left click on a button focuses and presses it.
async fn handle_mouse(app: &mut App, mouse: MouseEvent, area: Rect) -> bool {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return false;
    }

    let layout = HomeLayout::compute(area, Button::ALL.len());
    let Some(index) = layout.button_at(mouse.column, mouse.row) else {
        return false;
    };

    app.focus(index);
    press(app, Button::ALL[index]).await
}

async fn press(app: &mut App, button: Button) -> bool {
    app.activate(button, Instant::now()).await;
    button.screen().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::tests::RecordingLauncher;
    use crate::navigator::Screen;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct Harness {
        app: App,
        launched: Rc<RefCell<Vec<Screen>>>,
        _dir: TempDir,
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let launcher = RecordingLauncher::default();
        let launched = launcher.launched.clone();
        let navigator = Navigator::new(Box::new(launcher), dir.path().join("handoff.json"));
        let app = App::new(Config::default(), Default::default(), navigator);
        Harness {
            app,
            launched,
            _dir: dir,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[tokio::test]
    async fn test_focus_keys() {
        let mut h = harness();
        assert_eq!(h.app.focused_index(), 0);

        for code in [KeyCode::Down, KeyCode::Char('j'), KeyCode::Tab] {
            let before = h.app.focused_index();
            assert!(!handle_key(&mut h.app, key(code)).await);
            assert_eq!(h.app.focused_index(), before + 1);
        }

        for code in [KeyCode::Up, KeyCode::Char('k'), KeyCode::BackTab] {
            let before = h.app.focused_index();
            assert!(!handle_key(&mut h.app, key(code)).await);
            assert_eq!(h.app.focused_index(), before - 1);
        }
        assert!(h.launched.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_enter_on_timer_starts_countdown() {
        let mut h = harness();
        assert!(!handle_key(&mut h.app, key(KeyCode::Enter)).await);
        assert!(h.app.is_timer_running());
        assert!(h.launched.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_space_on_screen_button_hands_over() {
        let mut h = harness();
        h.app.focus(2);
        assert!(handle_key(&mut h.app, key(KeyCode::Char(' '))).await);
        assert_eq!(*h.launched.borrow(), vec![Screen::VoiceMood]);
    }

    #[tokio::test]
    async fn test_shortcut_keys() {
        let mut h = harness();
        assert!(!handle_key(&mut h.app, key(KeyCode::Char('t'))).await);
        assert!(h.app.is_timer_running());

        for c in ['f', 'v', 'y'] {
            assert!(handle_key(&mut h.app, key(KeyCode::Char(c))).await);
        }
        assert_eq!(
            *h.launched.borrow(),
            vec![Screen::FaceDetection, Screen::VoiceMood, Screen::TypingMood]
        );

        // Unbound letters do nothing
        assert!(!handle_key(&mut h.app, key(KeyCode::Char('x'))).await);
        assert_eq!(h.launched.borrow().len(), 3);
    }

    #[tokio::test]
    async fn test_quit_keys_destroy() {
        for event in [
            key(KeyCode::Char('q')),
            key(KeyCode::Esc),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut h = harness();
            h.app.start_timer(Instant::now());
            assert!(!handle_key(&mut h.app, event).await);
            assert!(h.app.is_destroyed());
            assert!(!h.app.is_timer_running());
        }
    }

    #[tokio::test]
    async fn test_click_activates_button_under_cursor() {
        let mut h = harness();
        let area = Rect::new(0, 0, 80, 24);
        let layout = HomeLayout::compute(area, Button::ALL.len());

        let typing = layout.buttons[3];
        let hit = handle_mouse(&mut h.app, click(typing.x + 1, typing.y), area).await;
        assert!(hit);
        assert_eq!(h.app.focused_index(), 3);
        assert_eq!(*h.launched.borrow(), vec![Screen::TypingMood]);

        let timer = layout.buttons[0];
        let hit = handle_mouse(&mut h.app, click(timer.x + 1, timer.y), area).await;
        assert!(!hit);
        assert_eq!(h.app.focused_index(), 0);
        assert!(h.app.is_timer_running());
    }

    #[tokio::test]
    async fn test_click_outside_buttons_ignored() {
        let mut h = harness();
        let area = Rect::new(0, 0, 80, 24);
        assert!(!handle_mouse(&mut h.app, click(0, 0), area).await);

        let layout = HomeLayout::compute(area, Button::ALL.len());
        let voice = layout.buttons[2];
        let release = MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            ..click(voice.x + 1, voice.y)
        };
        assert!(!handle_mouse(&mut h.app, release, area).await);

        assert!(h.launched.borrow().is_empty());
        assert_eq!(h.app.focused_index(), 0);
    }

    #[tokio::test]
    async fn test_report_mood_read_back_by_navigator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emotistudy").join("handoff.json");
        report_mood(&path, "Calm").unwrap();

        let navigator = Navigator::new(Box::new(RecordingLauncher::default()), path.clone());
        let handoff = navigator.take_handoff().await.unwrap().unwrap();
        assert_eq!(handoff.mood(), Some("Calm"));
        assert!(!path.exists());
    }
}
