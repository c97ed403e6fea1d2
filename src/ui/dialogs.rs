//! Dialog rendering module
//!
//! Confirmation dialog, save-log prompt and the help overlay. Each is drawn
//! on top of the current tab after clearing its area.

use crate::app::{ConfirmDialogState, TextPrompt};
use crate::components::centered_rect;
use crate::components::help_overlay::HelpOverlay;
use crate::components::keybindings::{KeyScope, KeybindingContext};
use crate::theme::{Styles, UiConstants};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Render the Yes/No confirmation dialog
pub fn render_confirm_dialog(f: &mut Frame, dialog: &ConfirmDialogState) {
    let area = centered_rect(UiConstants::DIALOG_WIDTH_PCT, 8, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", dialog.action.title()))
        .border_style(Styles::warning())
        .style(Styles::panel_bg_alt());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    f.render_widget(
        Paragraph::new(dialog.action.message())
            .style(Styles::text())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        chunks[0],
    );

    // No on the left, Yes on the right
    let (no_style, yes_style) = if dialog.is_confirmed() {
        (Styles::button_inactive(), Styles::button_active())
    } else {
        (Styles::button_active(), Styles::button_inactive())
    };
    let buttons = Line::from(vec![
        Span::styled("[ No ]", no_style),
        Span::raw("    "),
        Span::styled("[ Yes ]", yes_style),
    ]);
    f.render_widget(Paragraph::new(buttons).alignment(Alignment::Center), chunks[1]);
    f.render_widget(
        Paragraph::new("Y/N or Left/Right + Enter, Esc to cancel")
            .style(Styles::nav_hint())
            .alignment(Alignment::Center),
        chunks[2],
    );
}

/// Render the save-log path prompt
pub fn render_save_prompt(f: &mut Frame, prompt: &TextPrompt) {
    let area = centered_rect(UiConstants::DIALOG_WIDTH_PCT, 7, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", prompt.title))
        .border_style(Styles::border_active())
        .style(Styles::panel_bg_alt());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(inner);

    let input = Paragraph::new(format!("{}_", prompt.value)).style(Styles::success()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("File")
            .border_style(Styles::border_inactive()),
    );
    f.render_widget(input, chunks[0]);
    f.render_widget(
        Paragraph::new("Enter: Save | Esc: Cancel")
            .style(Styles::nav_hint())
            .alignment(Alignment::Center),
        chunks[1],
    );
}

/// Render the help overlay for `scope`
pub fn render_help_overlay(f: &mut Frame, scope: &KeyScope, keybinding_ctx: &KeybindingContext) {
    let overlay = HelpOverlay::new(scope, keybinding_ctx);
    overlay.render(f, f.area());
}
