//! Navigation to the external mood screens.
//!
//! # Handover
//!
//! Each mood screen is a separate program. Navigating to one is a one-way
//! hand-off: the TUI gives up the terminal, runs the configured command
//! with no arguments, and takes the terminal back when it exits.
//!
//! # Hand-off payload
//!
//! A screen may report a detected mood back by writing a small JSON file
//! before exiting:
//!
//! ```text
//! {"detected_mood": "Happy"}
//! ```
//!
//! The home screen reads the file when it becomes visible again and
//! removes it, so each report is echoed once. `emotistudy report-mood`
//! writes this file for screens implemented as shell scripts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::ScreensConfig;

/// External screens reachable from the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    FaceDetection,
    VoiceMood,
    TypingMood,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::FaceDetection, Screen::VoiceMood, Screen::TypingMood];

    pub fn name(&self) -> &'static str {
        match self {
            Screen::FaceDetection => "face detection",
            Screen::VoiceMood => "voice mood",
            Screen::TypingMood => "typing mood",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload an external screen leaves behind for the home screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Handoff {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_mood: Option<String>,
}

impl Handoff {
    pub fn with_mood(mood: impl Into<String>) -> Self {
        Self {
            detected_mood: Some(mood.into()),
        }
    }

    /// The reported mood. Blank values count as absent.
    pub fn mood(&self) -> Option<&str> {
        normalize_mood(self.detected_mood.as_deref())
    }

    /// Write the payload, creating parent directories as needed
    pub fn write_to(&self, path: &Path) -> Result<(), LaunchError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LaunchError::Handoff {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string(self).map_err(|source| LaunchError::Payload {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| LaunchError::Handoff {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Trim a mood string; blank counts as absent
pub fn normalize_mood(mood: Option<&str>) -> Option<&str> {
    mood.map(str::trim).filter(|m| !m.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("no command configured for {0}")]
    NoCommand(Screen),

    #[error("failed to start {screen}: {source}")]
    Spawn {
        screen: Screen,
        #[source]
        source: io::Error,
    },

    #[error("terminal handover failed: {0}")]
    Terminal(#[source] io::Error),

    #[error("hand-off file {path}: {source}")]
    Handoff {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed hand-off payload at {path}: {source}")]
    Payload {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Something that can hand control to an external screen
pub trait ScreenLauncher {
    /// Run the screen to completion. No parameters are passed to it.
    fn launch(&mut self, screen: Screen) -> Result<(), LaunchError>;
}

/// Launches screens as shell commands with full terminal handover
pub struct CommandLauncher {
    screens: ScreensConfig,
}

impl CommandLauncher {
    pub fn new(screens: ScreensConfig) -> Self {
        for screen in Screen::ALL {
            if screens.command_for(screen).trim().is_empty() {
                tracing::warn!("No command configured for {} screen", screen);
            }
        }
        Self { screens }
    }
}

impl ScreenLauncher for CommandLauncher {
    fn launch(&mut self, screen: Screen) -> Result<(), LaunchError> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        };

        let cmd = self.screens.command_for(screen).trim();
        if cmd.is_empty() {
            return Err(LaunchError::NoCommand(screen));
        }

        tracing::info!("Handing over to {}: {}", screen, cmd);

        let status = with_terminal_released(
            || {
                disable_raw_mode()?;
                execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)
            },
            || {
                enable_raw_mode()?;
                execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)
            },
            || std::process::Command::new("sh").arg("-c").arg(cmd).status(),
        )?;

        let status = status.map_err(|source| LaunchError::Spawn { screen, source })?;
        tracing::info!("{} exited with {:?}", screen, status.code());
        Ok(())
    }
}

/// Release the terminal, run `run`, then take the terminal back.
///
/// A release that fails part way is rolled back before the error is
/// returned, so the caller never keeps drawing in cooked mode.
fn with_terminal_released<T>(
    release: impl FnOnce() -> io::Result<()>,
    restore: impl FnOnce() -> io::Result<()>,
    run: impl FnOnce() -> T,
) -> Result<T, LaunchError> {
    if let Err(e) = release() {
        if let Err(restore_err) = restore() {
            tracing::warn!("Failed to reclaim terminal: {}", restore_err);
        }
        return Err(LaunchError::Terminal(e));
    }

    let out = run();
    restore().map_err(LaunchError::Terminal)?;
    Ok(out)
}

/// Routes button presses to screens and collects what they hand back
pub struct Navigator {
    launcher: Box<dyn ScreenLauncher>,
    handoff_path: PathBuf,
}

impl Navigator {
    pub fn new(launcher: Box<dyn ScreenLauncher>, handoff_path: PathBuf) -> Self {
        Self {
            launcher,
            handoff_path,
        }
    }

    /// Transfer control to `screen`.
    ///
    /// A stale payload from an earlier run is discarded first so whatever
    /// is read back afterwards came from this screen.
    pub async fn navigate_to(&mut self, screen: Screen) -> Result<(), LaunchError> {
        self.discard_handoff().await;
        self.launcher.launch(screen)
    }

    /// Read and consume the hand-off payload, if one was left behind
    pub async fn take_handoff(&self) -> Result<Option<Handoff>, LaunchError> {
        let path = &self.handoff_path;
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(LaunchError::Handoff {
                    path: path.clone(),
                    source,
                })
            }
        };

        // Consume before parsing so a bad payload is not retried forever
        self.discard_handoff().await;

        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| LaunchError::Payload {
                path: path.clone(),
                source,
            })
    }

    async fn discard_handoff(&self) {
        match tokio::fs::remove_file(&self.handoff_path).await {
            Ok(()) => tracing::debug!("Removed hand-off file {}", self.handoff_path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "Failed to remove hand-off file {}: {}",
                self.handoff_path.display(),
                e
            ),
        }
    }
}
