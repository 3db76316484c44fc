//! Color themes for the home screen
//!
//! Provides:
//! - Theme struct with all UI colors
//! - Built-in presets (darkwall, catppuccin, nord, gruvbox)
//! - Hex color parsing for accent overrides

use ratatui::style::Color;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Main background color
    pub background: Color,
    /// Primary text color
    pub foreground: Color,
    /// Background of the focused button
    pub focus_bg: Color,
    /// Text of the focused button
    pub focus_fg: Color,
    /// Accent color (borders, title)
    pub accent: Color,
    /// Dimmed text (status bar, hints)
    pub dimmed: Color,
    /// Unfocused button borders
    pub dimmed_alt: Color,
    /// Timer button text while a countdown runs
    pub timer_active: Color,
    /// Toast background
    pub toast_bg: Color,
    /// Toast text
    pub toast_fg: Color,
    /// Error toast border
    pub toast_error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::darkwall()
    }
}

impl Theme {
    /// Darkwall theme - default
    pub fn darkwall() -> Self {
        Self {
            background: Color::Rgb(13, 17, 22),    // #0d1116
            foreground: Color::Rgb(229, 234, 241), // #e5eaf1
            focus_bg: Color::Rgb(20, 28, 42),      // #141c2a
            focus_fg: Color::Rgb(229, 234, 241),   // #e5eaf1
            accent: Color::Rgb(180, 83, 9),        // #b45309 (amber)
            dimmed: Color::Rgb(156, 163, 175),     // #9ca3af
            dimmed_alt: Color::Rgb(107, 114, 128), // #6b7280
            timer_active: Color::Rgb(34, 197, 94), // #22c55e
            toast_bg: Color::Rgb(31, 41, 55),      // #1f2937
            toast_fg: Color::Rgb(229, 234, 241),   // #e5eaf1
            toast_error: Color::Rgb(239, 68, 68),  // #ef4444
        }
    }

    /// Catppuccin Mocha theme
    pub fn catppuccin_mocha() -> Self {
        Self {
            background: Color::Rgb(30, 30, 46),       // #1e1e2e (base)
            foreground: Color::Rgb(205, 214, 244),    // #cdd6f4 (text)
            focus_bg: Color::Rgb(49, 50, 68),         // #313244 (surface0)
            focus_fg: Color::Rgb(205, 214, 244),      // #cdd6f4 (text)
            accent: Color::Rgb(137, 180, 250),        // #89b4fa (blue)
            dimmed: Color::Rgb(166, 173, 200),        // #a6adc8 (subtext0)
            dimmed_alt: Color::Rgb(147, 153, 178),    // #9399b2 (overlay2)
            timer_active: Color::Rgb(166, 227, 161),  // #a6e3a1 (green)
            toast_bg: Color::Rgb(69, 71, 90),         // #45475a (surface1)
            toast_fg: Color::Rgb(205, 214, 244),      // #cdd6f4 (text)
            toast_error: Color::Rgb(243, 139, 168),   // #f38ba8 (red)
        }
    }

    /// Nord theme
    pub fn nord() -> Self {
        Self {
            background: Color::Rgb(46, 52, 64),      // #2e3440 (nord0)
            foreground: Color::Rgb(236, 239, 244),   // #eceff4 (nord6)
            focus_bg: Color::Rgb(67, 76, 94),        // #434c5e (nord2)
            focus_fg: Color::Rgb(236, 239, 244),     // #eceff4 (nord6)
            accent: Color::Rgb(136, 192, 208),       // #88c0d0 (nord8)
            dimmed: Color::Rgb(216, 222, 233),       // #d8dee9 (nord4)
            dimmed_alt: Color::Rgb(76, 86, 106),     // #4c566a (nord3)
            timer_active: Color::Rgb(163, 190, 140), // #a3be8c (nord14)
            toast_bg: Color::Rgb(59, 66, 82),        // #3b4252 (nord1)
            toast_fg: Color::Rgb(236, 239, 244),     // #eceff4 (nord6)
            toast_error: Color::Rgb(191, 97, 106),   // #bf616a (nord11)
        }
    }

    /// Gruvbox dark theme
    pub fn gruvbox() -> Self {
        Self {
            background: Color::Rgb(40, 40, 40),      // #282828 (bg)
            foreground: Color::Rgb(235, 219, 178),   // #ebdbb2 (fg)
            focus_bg: Color::Rgb(60, 56, 54),        // #3c3836 (bg1)
            focus_fg: Color::Rgb(235, 219, 178),     // #ebdbb2 (fg)
            accent: Color::Rgb(215, 153, 33),        // #d79921 (yellow)
            dimmed: Color::Rgb(168, 153, 132),       // #a89984 (gray)
            dimmed_alt: Color::Rgb(146, 131, 116),   // #928374 (gray)
            timer_active: Color::Rgb(152, 151, 26),  // #98971a (green)
            toast_bg: Color::Rgb(80, 73, 69),        // #504945 (bg2)
            toast_fg: Color::Rgb(235, 219, 178),     // #ebdbb2 (fg)
            toast_error: Color::Rgb(204, 36, 29),    // #cc241d (red)
        }
    }

    /// Load theme from preset name
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "darkwall" | "default" => Some(Self::darkwall()),
            "catppuccin-mocha" | "catppuccin_mocha" | "catppuccin" => Some(Self::catppuccin_mocha()),
            "nord" => Some(Self::nord()),
            "gruvbox" | "gruvbox-dark" | "gruvbox_dark" => Some(Self::gruvbox()),
            _ => None,
        }
    }

    /// Replace the accent color
    pub fn with_accent(mut self, accent: Color) -> Self {
        self.accent = accent;
        self
    }
}

/// Parse hex color string to Color
/// Supports: #rrggbb, #rgb, rrggbb, rgb
pub fn parse_hex_color(s: &str) -> Result<Color, ColorError> {
    let s = s.trim().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&s[range], 16).map_err(|_| ColorError::InvalidHex)
    };

    if !s.is_ascii() {
        return Err(ColorError::InvalidHex);
    }

    match s.len() {
        // #rgb -> #rrggbb
        3 => Ok(Color::Rgb(channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17)),
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        _ => Err(ColorError::InvalidLength),
    }
}

/// Color parsing error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid color length (expected 3 or 6 hex chars)")]
    InvalidLength,
    #[error("invalid hex character")]
    InvalidHex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        assert_eq!(parse_hex_color("#ff0000"), Ok(Color::Rgb(255, 0, 0)));
        assert_eq!(parse_hex_color("00ff00"), Ok(Color::Rgb(0, 255, 0)));
        assert_eq!(parse_hex_color("#0d1116"), Ok(Color::Rgb(13, 17, 22)));
    }

    #[test]
    fn test_parse_hex_3() {
        assert_eq!(parse_hex_color("#f00"), Ok(Color::Rgb(255, 0, 0)));
        assert_eq!(parse_hex_color("0f0"), Ok(Color::Rgb(0, 255, 0)));
    }

    #[test]
    fn test_parse_hex_invalid() {
        assert_eq!(parse_hex_color("invalid"), Err(ColorError::InvalidLength));
        assert_eq!(parse_hex_color("#gg0000"), Err(ColorError::InvalidHex));
        assert_eq!(parse_hex_color("#ff00"), Err(ColorError::InvalidLength));
        assert_eq!(parse_hex_color("#ééé"), Err(ColorError::InvalidHex));
    }

    #[test]
    fn test_presets() {
        assert!(Theme::from_preset("darkwall").is_some());
        assert!(Theme::from_preset("Catppuccin-Mocha").is_some());
        assert!(Theme::from_preset("nord").is_some());
        assert!(Theme::from_preset("gruvbox").is_some());
        assert!(Theme::from_preset("nonexistent").is_none());
    }

    #[test]
    fn test_with_accent() {
        let theme = Theme::nord().with_accent(Color::Rgb(1, 2, 3));
        assert_eq!(theme.accent, Color::Rgb(1, 2, 3));
        assert_eq!(theme.background, Theme::nord().background);
    }
}
