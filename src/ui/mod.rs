//! User interface rendering module
//!
//! Submodules:
//! - `header` - Title, tab bar, status bar and navigation bar
//! - `tabs` - One renderer per tab
//! - `dialogs` - Confirmation, save prompt and help overlays

mod dialogs;
mod header;
mod tabs;

use crate::app::AppState;
use crate::components::keybindings::{KeyScope, KeybindingContext};
use crate::session::Session;
use crate::theme::{Styles, UiConstants};
use crate::types::Tab;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Block,
};
use std::rc::Rc;

pub use header::HeaderRenderer;

/// Header, tab bar, content, status bar and nav bar, top to bottom
fn screen_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(UiConstants::HEADER_HEIGHT),
            Constraint::Length(UiConstants::TAB_BAR_HEIGHT),
            Constraint::Min(5),
            Constraint::Length(UiConstants::STATUS_BAR_HEIGHT),
            Constraint::Length(UiConstants::NAV_BAR_HEIGHT),
        ])
        .split(area)
}

/// Lines of log text visible inside the bordered log panel
pub fn log_viewport_height(area: Rect) -> usize {
    screen_layout(area)[2].height.saturating_sub(2) as usize
}

/// Draws the whole screen from view state and session state
pub struct UiRenderer {
    header: HeaderRenderer,
}

impl Default for UiRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl UiRenderer {
    pub fn new() -> Self {
        Self {
            header: HeaderRenderer::new(),
        }
    }

    pub fn render(
        &self,
        f: &mut Frame,
        state: &AppState,
        session: &Session,
        keybinding_ctx: &KeybindingContext,
    ) {
        let area = f.area();
        f.render_widget(Block::default().style(Styles::panel_bg()), area);

        let chunks = screen_layout(area);

        self.header.render_header(f, chunks[0]);
        self.header.render_tabs(f, chunks[1], state.tab);

        match state.tab {
            Tab::Setup => tabs::render_setup_tab(f, chunks[2], state, session),
            Tab::Stacks => tabs::render_stacks_tab(f, chunks[2], state, session),
            Tab::Tools => tabs::render_tools_tab(f, chunks[2], state, session),
            Tab::Settings => tabs::render_settings_tab(f, chunks[2], state, session),
            Tab::Log => tabs::render_log_tab(f, chunks[2], session),
        }

        self.header.render_status_bar(f, chunks[3], session);
        header::render_nav_bar(f, chunks[4], &keybinding_ctx.get_nav_items(&state.scope()));

        if state.help_visible {
            dialogs::render_help_overlay(f, &KeyScope::Tab(state.tab), keybinding_ctx);
        }
        if let Some(prompt) = &state.save_prompt {
            dialogs::render_save_prompt(f, prompt);
        }
        if let Some(dialog) = &state.confirm_dialog {
            dialogs::render_confirm_dialog(f, dialog);
        }
    }
}
