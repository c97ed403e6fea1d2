//! Application module
//!
//! Owns the `Session`, turns key presses into session operations and drives the
//! render loop.
//!
//! # Module Structure
//! - `state` - View state types (AppState, dialogs, Quick Setup rows)
//! - Main module - App struct and event loop

mod state;

pub use state::{
    AppState, ConfirmAction, ConfirmDialogState, DEFAULT_LOG_FILE, InputResult, SetupAction,
    SetupRow, TextPrompt, setup_rows,
};

use crate::components::keybindings::{KeyAction, KeyScope, KeybindingContext};
use crate::error::Result;
use crate::session::{Session, StartOutcome};
use crate::theme::UiConstants;
use crate::types::{Setting, Tab, tool_rows};
use crate::ui::{UiRenderer, log_viewport_height};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::Backend, layout::Rect};
use std::path::Path;
use std::time::Duration;
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

/// Main application struct
pub struct App {
    session: Session,
    state: AppState,
    ui_renderer: UiRenderer,
    keybinding_context: KeybindingContext,
}

impl App {
    pub fn new(session: Session) -> Self {
        info!("Creating new App instance");
        Self {
            session,
            state: AppState::default(),
            ui_renderer: UiRenderer::new(),
            keybinding_context: KeybindingContext::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn keybinding_context(&self) -> &KeybindingContext {
        &self.keybinding_context
    }

    /// Drain worker messages; called once per tick
    pub fn tick(&mut self) -> usize {
        self.session.poll_events()
    }

    /// Size the log view to the log pane of a `width` x `height` screen
    pub fn resize(&mut self, width: u16, height: u16) {
        let viewport = log_viewport_height(Rect::new(0, 0, width, height));
        debug!("Log viewport is {} lines", viewport);
        self.session.log_view_mut().set_viewport(viewport);
    }

    /// Run the main application loop until the user quits
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!("Starting main application loop");

        let size = terminal.size()?;
        self.resize(size.width, size.height);

        loop {
            self.tick();

            if crossterm::event::poll(Duration::from_millis(50))? {
                match crossterm::event::read()? {
                    Event::Key(key_event) => {
                        if self.handle_key_event(key_event)? {
                            break;
                        }
                    }
                    Event::Resize(width, height) => {
                        debug!("Terminal resized to {}x{}", width, height);
                        self.resize(width, height);
                    }
                    _ => {}
                }
            }

            terminal.draw(|f| {
                self.ui_renderer
                    .render(f, &self.state, &self.session, &self.keybinding_context)
            })?;
        }

        if self.session.is_installing() {
            warn!("Exiting while an installation is still running; the script continues detached");
        }
        info!("Main application loop finished");
        Ok(())
    }

    /// Handle one key press. Returns `true` when the app should exit.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> Result<bool> {
        // Windows terminals report releases as well
        if key_event.kind == KeyEventKind::Release {
            return Ok(false);
        }

        let scope = self.state.scope();

        if scope == KeyScope::SavePath {
            self.handle_save_prompt(key_event);
            return Ok(false);
        }

        let Some(action) = self.keybinding_context.action_for(&scope, &key_event) else {
            return Ok(false);
        };
        debug!("Key {:?} in {:?} -> {:?}", key_event.code, scope, action);

        match scope {
            KeyScope::Confirm => {
                self.handle_confirm_dialog(action, key_event);
                Ok(false)
            }
            KeyScope::Help => {
                if action == KeyAction::Cancel {
                    self.state.help_visible = false;
                }
                Ok(false)
            }
            KeyScope::Tab(tab) => self.handle_tab_action(tab, action),
            KeyScope::SavePath => Ok(false),
        }
    }

    fn handle_tab_action(&mut self, tab: Tab, action: KeyAction) -> Result<bool> {
        match action {
            KeyAction::Quit => return Ok(true),
            KeyAction::Help => self.state.help_visible = true,
            KeyAction::NextTab => self.state.next_tab(),
            KeyAction::PrevTab => self.state.prev_tab(),
            KeyAction::NavigateUp => self.move_selection(|sel, _| sel.saturating_sub(1)),
            KeyAction::NavigateDown => self.move_selection(|sel, len| (sel + 1).min(len - 1)),
            KeyAction::Home if tab == Tab::Log => {
                self.session.log_view_mut().scroll_up(usize::MAX);
            }
            KeyAction::End if tab == Tab::Log => self.session.log_view_mut().scroll_to_bottom(),
            KeyAction::Home => self.move_selection(|_, _| 0),
            KeyAction::End => self.move_selection(|_, len| len - 1),
            KeyAction::Select => self.handle_select(tab),
            KeyAction::Toggle => self.handle_toggle(tab),
            KeyAction::StartInstall => self.start_installation(),
            KeyAction::DryRun => {
                self.session.dry_run();
                self.state.tab = Tab::Log;
            }
            KeyAction::Reset => self.open_confirm(ConfirmAction::Reset),
            KeyAction::Rescan => self.session.rescan_managers(),
            KeyAction::ScrollUp => self.session.log_view_mut().scroll_up(1),
            KeyAction::ScrollDown => self.session.log_view_mut().scroll_down(1),
            KeyAction::PageUp => self
                .session
                .log_view_mut()
                .scroll_up(UiConstants::PAGE_SCROLL_SIZE),
            KeyAction::PageDown => self
                .session
                .log_view_mut()
                .scroll_down(UiConstants::PAGE_SCROLL_SIZE),
            KeyAction::ClearLog => self.open_confirm(ConfirmAction::ClearLog),
            KeyAction::SaveLog => {
                self.state.save_prompt = Some(TextPrompt::new("Save Log As", DEFAULT_LOG_FILE));
            }
            KeyAction::RefreshLog => self.session.refresh_log(),
            KeyAction::ToggleChoice | KeyAction::Confirm | KeyAction::Cancel => {}
        }
        Ok(false)
    }

    /// Number of rows in the list shown on `tab`
    fn list_len(&self, tab: Tab) -> usize {
        match tab {
            Tab::Setup => setup_rows(&self.session.stack_names()).len(),
            Tab::Stacks => self.session.stack_names().len(),
            Tab::Tools => tool_rows().len(),
            Tab::Settings => Setting::iter().count(),
            Tab::Log => 0,
        }
    }

    /// Apply `f(current, len)` to the current tab's cursor; `len` is never 0
    fn move_selection<F>(&mut self, f: F)
    where
        F: Fn(usize, usize) -> usize,
    {
        let len = self.list_len(self.state.tab);
        if len == 0 {
            return;
        }
        if let Some(sel) = self.state.selection_mut() {
            *sel = f((*sel).min(len - 1), len);
        }
    }

    fn handle_select(&mut self, tab: Tab) {
        match tab {
            Tab::Setup => {
                let rows = setup_rows(&self.session.stack_names());
                let Some(row) = rows.get(self.state.setup_selection).cloned() else {
                    return;
                };
                match row {
                    SetupRow::Manager(choice) => {
                        self.session.choice = choice;
                        self.session
                            .set_status(format!("Package manager: {}", choice.label()));
                    }
                    SetupRow::Stack(name) => {
                        self.session.setup_stack(&name);
                    }
                    SetupRow::Action(SetupAction::Install) => self.start_installation(),
                    SetupRow::Action(SetupAction::DryRun) => {
                        self.session.dry_run();
                        self.state.tab = Tab::Log;
                    }
                    SetupRow::Action(SetupAction::Reset) => self.open_confirm(ConfirmAction::Reset),
                    SetupRow::Action(SetupAction::Rescan) => self.session.rescan_managers(),
                }
            }
            Tab::Stacks => {
                let name = self
                    .session
                    .stack_names()
                    .get(self.state.stack_selection)
                    .map(|s| s.to_string());
                if let Some(name) = name {
                    self.session.setup_stack(&name);
                }
            }
            _ => {}
        }
    }

    fn handle_toggle(&mut self, tab: Tab) {
        match tab {
            Tab::Tools => {
                if let Some((_, tool)) = tool_rows().get(self.state.tool_selection) {
                    self.session.toggle_tool(tool);
                }
            }
            Tab::Settings => {
                if let Some(setting) = Setting::iter().nth(self.state.setting_selection) {
                    self.session.options.toggle(setting);
                }
            }
            _ => {}
        }
    }

    fn start_installation(&mut self) {
        match self.session.start_installation() {
            StartOutcome::Started(manager) => {
                info!("Installation started with {}", manager);
                self.state.tab = Tab::Log;
            }
            StartOutcome::AlreadyRunning => {
                debug!("Start ignored: installation already running");
            }
        }
    }

    fn open_confirm(&mut self, action: ConfirmAction) {
        self.state.confirm_dialog = Some(ConfirmDialogState::new(action));
    }

    fn handle_confirm_dialog(&mut self, action: KeyAction, key_event: KeyEvent) {
        let Some(dialog) = self.state.confirm_dialog.as_mut() else {
            return;
        };
        match action {
            KeyAction::ToggleChoice => dialog.toggle(),
            KeyAction::Confirm => {
                let confirmed =
                    matches!(key_event.code, KeyCode::Char('y')) || dialog.is_confirmed();
                let confirm_action = dialog.action;
                self.state.confirm_dialog = None;
                if confirmed {
                    info!("Executing confirmed action: {:?}", confirm_action);
                    self.execute_confirmed_action(confirm_action);
                } else {
                    debug!("Action {:?} declined", confirm_action);
                }
            }
            KeyAction::Cancel => self.state.confirm_dialog = None,
            _ => {}
        }
    }

    fn execute_confirmed_action(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::ClearLog => self.session.clear_log(),
            ConfirmAction::Reset => {
                self.session.reset();
                self.state.setup_selection = 0;
                self.state.stack_selection = 0;
                self.state.tool_selection = 0;
                self.state.setting_selection = 0;
            }
        }
    }

    fn handle_save_prompt(&mut self, key_event: KeyEvent) {
        let Some(prompt) = self.state.save_prompt.as_mut() else {
            return;
        };
        match prompt.handle_input(key_event) {
            InputResult::Confirm(path) => {
                self.state.save_prompt = None;
                // Failures are already logged and shown in the status bar
                if let Err(e) = self.session.save_log(Path::new(&path)) {
                    debug!("Save log failed: {:#}", e);
                }
            }
            InputResult::Cancel => self.state.save_prompt = None,
            InputResult::Continue => {}
        }
    }
}
