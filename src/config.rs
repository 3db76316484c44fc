use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::countdown::{DEFAULT_DURATION_MS, DEFAULT_TICK_MS};
use crate::navigator::Screen;
use crate::ui::theme::{parse_hex_color, Theme};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub appearance: AppearanceConfig,
    pub timer: TimerConfig,
    pub screens: ScreensConfig,
    pub handoff: HandoffConfig,
    pub toasts: ToastConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Title shown in the header block
    pub title: String,
    /// Theme preset: "darkwall", "catppuccin-mocha", "nord", "gruvbox"
    pub theme: String,
    /// Optional accent override, e.g. "#89b4fa"
    pub accent: Option<String>,
    pub focused_prefix: String,
    pub unfocused_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Study session length in seconds
    pub duration_secs: u64,
    /// Label refresh interval in milliseconds
    pub tick_millis: u64,
}

/// Commands run for each external mood screen
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScreensConfig {
    pub face_detection: String,
    pub voice_mood: String,
    pub typing_mood: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HandoffConfig {
    /// JSON file external screens write `{"detected_mood": "..."}` to
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    pub short_millis: u64,
    pub long_millis: u64,
    /// Maximum toasts on screen at once
    pub max_visible: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            appearance: AppearanceConfig::default(),
            timer: TimerConfig::default(),
            screens: ScreensConfig::default(),
            handoff: HandoffConfig::default(),
            toasts: ToastConfig::default(),
        }
    }
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            title: "EmotiStudy".to_string(),
            theme: "darkwall".to_string(),
            accent: None,
            focused_prefix: "● ".to_string(),
            unfocused_prefix: "  ".to_string(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_MS / 1000,
            tick_millis: DEFAULT_TICK_MS,
        }
    }
}

impl Default for ScreensConfig {
    fn default() -> Self {
        Self {
            face_detection: "emotistudy-face".to_string(),
            voice_mood: "emotistudy-voice".to_string(),
            typing_mood: "emotistudy-typing".to_string(),
        }
    }
}

impl Default for HandoffConfig {
    fn default() -> Self {
        let base = dirs::runtime_dir()
            .or_else(dirs::cache_dir)
            .unwrap_or_else(std::env::temp_dir);
        Self {
            path: base.join("emotistudy").join("handoff.json"),
        }
    }
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            short_millis: 2000,
            long_millis: 3500,
            max_visible: 3,
        }
    }
}

impl ScreensConfig {
    /// Command configured for a screen
    pub fn command_for(&self, screen: Screen) -> &str {
        match screen {
            Screen::FaceDetection => &self.face_detection,
            Screen::VoiceMood => &self.voice_mood,
            Screen::TypingMood => &self.typing_mood,
        }
    }
}

impl TimerConfig {
    pub fn duration_ms(&self) -> u64 {
        self.duration_secs.saturating_mul(1000)
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let path = Path::new(expanded.as_ref());

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            tracing::info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        let expanded = shellexpand::tilde(&config.handoff.path.to_string_lossy()).into_owned();
        config.handoff.path = PathBuf::from(expanded);
        Ok(config)
    }

    /// Resolve the configured theme, falling back to the default preset
    pub fn resolve_theme(&self) -> Theme {
        let theme = Theme::from_preset(&self.appearance.theme).unwrap_or_else(|| {
            tracing::warn!("Unknown theme '{}', using default", self.appearance.theme);
            Theme::default()
        });

        match self.appearance.accent.as_deref().map(parse_hex_color) {
            Some(Ok(accent)) => theme.with_accent(accent),
            Some(Err(e)) => {
                tracing::warn!("Ignoring accent color: {}", e);
                theme
            }
            None => theme,
        }
    }
}
