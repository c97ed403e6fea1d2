//! Centralized theme and styling for the TUI
//!
//! Every color and reusable style lives here so the screens never hardcode
//! their own. The palette is a dark scheme with a single blue accent.
//!
//! # Usage
//! ```rust
//! use devsetup::theme::{Colors, Styles, Theme};
//! use ratatui::style::Style;
//!
//! let style = Style::default().fg(Colors::ACCENT);
//! let title_style = Styles::title();
//! let line_style = Theme::log_line_style("[10:00:00] Installation failed with code 2");
//! ```

use ratatui::style::{Color, Modifier, Style};

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Core color palette for the application
pub struct Colors;

impl Colors {
    // -------------------------------------------------------------------------
    // Backgrounds
    // -------------------------------------------------------------------------

    /// Main window background
    pub const BG_PRIMARY: Color = Color::Rgb(0x1e, 0x1e, 0x1e);

    /// Panels and dialogs
    pub const BG_SECONDARY: Color = Color::Rgb(0x2d, 0x2d, 0x2d);

    /// Inputs and highlighted rows
    pub const BG_TERTIARY: Color = Color::Rgb(0x3c, 0x3c, 0x3c);

    // -------------------------------------------------------------------------
    // Foregrounds
    // -------------------------------------------------------------------------

    pub const FG_PRIMARY: Color = Color::Rgb(0xff, 0xff, 0xff);

    pub const FG_SECONDARY: Color = Color::Rgb(0xcc, 0xcc, 0xcc);

    /// Disabled text, hints, timestamps
    pub const FG_MUTED: Color = Color::Rgb(0x99, 0x99, 0x99);

    // -------------------------------------------------------------------------
    // Accent and semantic colors
    // -------------------------------------------------------------------------

    /// Brand accent: titles, active tab, focused borders
    pub const ACCENT: Color = Color::Rgb(0x00, 0x78, 0xd4);

    pub const SUCCESS: Color = Color::Rgb(0x00, 0xd0, 0x84);

    pub const WARNING: Color = Color::Rgb(0xff, 0x8c, 0x00);

    pub const ERROR: Color = Color::Rgb(0xd1, 0x34, 0x38);

    // -------------------------------------------------------------------------
    // UI elements
    // -------------------------------------------------------------------------

    pub const BORDER: Color = Color::Rgb(0x40, 0x40, 0x40);

    pub const BORDER_ACTIVE: Color = Self::ACCENT;

    /// Selected row background
    pub const SELECTED_BG: Color = Self::ACCENT;

    pub const SELECTED_FG: Color = Self::FG_PRIMARY;

    /// Category headings on the tools tab
    pub const CATEGORY: Color = Self::WARNING;
}

// =============================================================================
// PRE-BUILT STYLES
// =============================================================================

/// Pre-built styles for common UI patterns
pub struct Styles;

impl Styles {
    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    pub fn text_secondary() -> Style {
        Style::default().fg(Colors::FG_SECONDARY)
    }

    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    /// Main title (accent, bold)
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Category heading on the tools tab
    pub fn category() -> Style {
        Style::default()
            .fg(Colors::CATEGORY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_active() -> Style {
        Style::default().fg(Colors::BORDER_ACTIVE)
    }

    pub fn border_inactive() -> Style {
        Style::default().fg(Colors::BORDER)
    }

    pub fn panel_bg() -> Style {
        Style::default().bg(Colors::BG_PRIMARY).fg(Colors::FG_PRIMARY)
    }

    pub fn panel_bg_alt() -> Style {
        Style::default().bg(Colors::BG_SECONDARY).fg(Colors::FG_PRIMARY)
    }

    /// Highlighted list row
    pub fn selected() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_active() -> Style {
        Style::default()
            .fg(Colors::FG_PRIMARY)
            .bg(Colors::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_inactive() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    pub fn success() -> Style {
        Style::default().fg(Colors::SUCCESS)
    }

    pub fn warning() -> Style {
        Style::default().fg(Colors::WARNING)
    }

    pub fn error() -> Style {
        Style::default().fg(Colors::ERROR)
    }

    /// Selected button in a confirmation dialog
    pub fn button_active() -> Style {
        Style::default()
            .fg(Colors::FG_PRIMARY)
            .bg(Colors::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn button_inactive() -> Style {
        Style::default().fg(Colors::FG_SECONDARY).bg(Colors::BG_TERTIARY)
    }

    /// Key label in the navigation bar and help overlay
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Colors::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn nav_hint() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }
}

// =============================================================================
// THEME CONTEXT
// =============================================================================

/// Coarse classification of a log line, for coloring only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Guess the level of a rendered log line from its text
    pub fn classify(line: &str) -> Self {
        let lower = line.to_ascii_lowercase();
        if lower.contains("error") || lower.contains("failed") {
            Self::Error
        } else if lower.contains("warning") || lower.contains("warn:") {
            Self::Warning
        } else if lower.contains("successfully") || lower.contains("completed") {
            Self::Success
        } else {
            Self::Info
        }
    }
}

/// Semantic style lookups
pub struct Theme;

impl Theme {
    pub fn log_style(level: LogLevel) -> Style {
        match level {
            LogLevel::Info => Style::default().fg(Colors::FG_SECONDARY),
            LogLevel::Success => Styles::success(),
            LogLevel::Warning => Styles::warning(),
            LogLevel::Error => Styles::error().add_modifier(Modifier::BOLD),
        }
    }

    pub fn log_line_style(line: &str) -> Style {
        Self::log_style(LogLevel::classify(line))
    }

    /// Status bar indicator for the installation state
    pub fn activity_style(installing: bool) -> Style {
        if installing {
            Style::default()
                .fg(Colors::WARNING)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Colors::SUCCESS)
        }
    }

    /// Checkbox glyph for toggles and selections
    pub fn checkbox(checked: bool) -> &'static str {
        if checked { "[x]" } else { "[ ]" }
    }

    /// Radio glyph for the package-manager choice
    pub fn radio(selected: bool) -> &'static str {
        if selected { "(*)" } else { "( )" }
    }
}

// =============================================================================
// UI CONSTANTS
// =============================================================================

/// Layout constants
pub struct UiConstants;

impl UiConstants {
    /// Title and subtitle
    pub const HEADER_HEIGHT: u16 = 3;

    pub const TAB_BAR_HEIGHT: u16 = 3;

    pub const STATUS_BAR_HEIGHT: u16 = 3;

    pub const NAV_BAR_HEIGHT: u16 = 1;

    pub const DIALOG_WIDTH_PCT: u16 = 60;

    pub const DIALOG_MIN_WIDTH: u16 = 40;

    pub const DIALOG_MAX_WIDTH: u16 = 80;

    /// Lines moved by PageUp/PageDown in the log
    pub const PAGE_SCROLL_SIZE: usize = 10;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_matches_dark_scheme() {
        assert_eq!(Colors::BG_PRIMARY, Color::Rgb(30, 30, 30));
        assert_eq!(Colors::ACCENT, Color::Rgb(0, 120, 212));
        assert_eq!(Styles::selected().bg, Some(Colors::ACCENT));
    }

    #[test]
    fn test_log_classification() {
        assert_eq!(LogLevel::classify("[10:00:00] Installation failed with code 2"), LogLevel::Error);
        assert_eq!(LogLevel::classify("[10:00:00] Error during installation: x"), LogLevel::Error);
        assert_eq!(
            LogLevel::classify("[10:00:00] Installation completed successfully!"),
            LogLevel::Success
        );
        assert_eq!(LogLevel::classify("[10:00:00] WARNING: reboot required"), LogLevel::Warning);
        assert_eq!(LogLevel::classify("[10:00:00] Starting installation..."), LogLevel::Info);
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(Theme::checkbox(true), "[x]");
        assert_eq!(Theme::radio(false), "( )");
    }
}
