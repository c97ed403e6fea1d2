//! Application state definitions
//!
//! View state only: which tab is showing, where each list's cursor sits and
//! which dialog is open. Domain state lives in `Session`.

use crate::components::keybindings::KeyScope;
use crate::types::{ManagerChoice, Tab};
use crossterm::event::{KeyCode, KeyEvent};
use strum::IntoEnumIterator;

/// Default file name offered by the save-log prompt
pub const DEFAULT_LOG_FILE: &str = "devsetup-log.txt";

/// Actions that ask before they run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    ClearLog,
    Reset,
}

impl ConfirmAction {
    pub fn title(&self) -> &'static str {
        match self {
            Self::ClearLog => "Clear Log",
            Self::Reset => "Reset Setup",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::ClearLog => "Are you sure you want to clear the log?",
            Self::Reset => "Reset all selections and settings to their defaults?",
        }
    }
}

/// Yes/No dialog state; `selected` is 0 for No, 1 for Yes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialogState {
    pub action: ConfirmAction,
    pub selected: usize,
}

impl ConfirmDialogState {
    /// New dialog with "No" preselected
    pub fn new(action: ConfirmAction) -> Self {
        Self { action, selected: 0 }
    }

    pub fn toggle(&mut self) {
        self.selected = if self.selected == 0 { 1 } else { 0 };
    }

    pub fn is_confirmed(&self) -> bool {
        self.selected == 1
    }
}

/// Result of feeding a key to a text prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    Confirm(String),
    Cancel,
    Continue,
}

/// Single-line text prompt, used for the save-log path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPrompt {
    pub title: String,
    pub value: String,
}

impl TextPrompt {
    pub fn new(title: impl Into<String>, initial: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: initial.into(),
        }
    }

    pub fn handle_input(&mut self, key_event: KeyEvent) -> InputResult {
        match key_event.code {
            KeyCode::Enter => {
                let value = self.value.trim();
                if value.is_empty() {
                    InputResult::Continue
                } else {
                    InputResult::Confirm(value.to_string())
                }
            }
            KeyCode::Esc => InputResult::Cancel,
            KeyCode::Backspace => {
                self.value.pop();
                InputResult::Continue
            }
            KeyCode::Char(c) => {
                self.value.push(c);
                InputResult::Continue
            }
            _ => InputResult::Continue,
        }
    }
}

/// Row on the Quick Setup tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupRow {
    Manager(ManagerChoice),
    Stack(String),
    Action(SetupAction),
}

/// Buttons at the bottom of the Quick Setup tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupAction {
    Install,
    DryRun,
    Reset,
    Rescan,
}

impl SetupAction {
    pub const ALL: [SetupAction; 4] = [Self::Install, Self::DryRun, Self::Reset, Self::Rescan];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Install => "Start Installation",
            Self::DryRun => "Dry Run",
            Self::Reset => "Reset",
            Self::Rescan => "Re-detect Package Managers",
        }
    }
}

/// Build the Quick Setup rows for the given stack names
pub fn setup_rows(stack_names: &[&str]) -> Vec<SetupRow> {
    ManagerChoice::all()
        .into_iter()
        .map(SetupRow::Manager)
        .chain(stack_names.iter().map(|s| SetupRow::Stack(s.to_string())))
        .chain(SetupAction::ALL.into_iter().map(SetupRow::Action))
        .collect()
}

/// Main application view state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub tab: Tab,
    pub setup_selection: usize,
    pub stack_selection: usize,
    pub tool_selection: usize,
    pub setting_selection: usize,
    pub help_visible: bool,
    pub confirm_dialog: Option<ConfirmDialogState>,
    pub save_prompt: Option<TextPrompt>,
}

impl AppState {
    /// Where key presses go right now. Dialogs take priority over help.
    pub fn scope(&self) -> KeyScope {
        if self.confirm_dialog.is_some() {
            KeyScope::Confirm
        } else if self.save_prompt.is_some() {
            KeyScope::SavePath
        } else if self.help_visible {
            KeyScope::Help
        } else {
            KeyScope::Tab(self.tab)
        }
    }

    pub fn next_tab(&mut self) {
        let tabs: Vec<Tab> = Tab::iter().collect();
        let idx = tabs.iter().position(|t| *t == self.tab).unwrap_or(0);
        self.tab = tabs[(idx + 1) % tabs.len()];
    }

    pub fn prev_tab(&mut self) {
        let tabs: Vec<Tab> = Tab::iter().collect();
        let idx = tabs.iter().position(|t| *t == self.tab).unwrap_or(0);
        self.tab = tabs[(idx + tabs.len() - 1) % tabs.len()];
    }

    /// Cursor for the list on the current tab, if it has one
    pub fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.tab {
            Tab::Setup => Some(&mut self.setup_selection),
            Tab::Stacks => Some(&mut self.stack_selection),
            Tab::Tools => Some(&mut self.tool_selection),
            Tab::Settings => Some(&mut self.setting_selection),
            Tab::Log => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_tab_cycling_wraps() {
        let mut state = AppState::default();
        state.prev_tab();
        assert_eq!(state.tab, Tab::Log);
        state.next_tab();
        assert_eq!(state.tab, Tab::Setup);
        state.next_tab();
        assert_eq!(state.tab, Tab::Stacks);
    }

    #[test]
    fn test_scope_priority() {
        let mut state = AppState::default();
        assert_eq!(state.scope(), KeyScope::Tab(Tab::Setup));
        state.help_visible = true;
        assert_eq!(state.scope(), KeyScope::Help);
        state.save_prompt = Some(TextPrompt::new("Save", ""));
        assert_eq!(state.scope(), KeyScope::SavePath);
        state.confirm_dialog = Some(ConfirmDialogState::new(ConfirmAction::Reset));
        assert_eq!(state.scope(), KeyScope::Confirm);
    }

    #[test]
    fn test_confirm_dialog_defaults_to_no() {
        let mut dialog = ConfirmDialogState::new(ConfirmAction::ClearLog);
        assert!(!dialog.is_confirmed());
        dialog.toggle();
        assert!(dialog.is_confirmed());
    }

    #[test]
    fn test_text_prompt_editing() {
        let mut prompt = TextPrompt::new("Save log", "log.tx");
        assert_eq!(prompt.handle_input(key(KeyCode::Char('t'))), InputResult::Continue);
        assert_eq!(
            prompt.handle_input(key(KeyCode::Enter)),
            InputResult::Confirm("log.txt".to_string())
        );

        let mut empty = TextPrompt::new("Save log", "x");
        empty.handle_input(key(KeyCode::Backspace));
        assert_eq!(empty.handle_input(key(KeyCode::Enter)), InputResult::Continue);
        assert_eq!(empty.handle_input(key(KeyCode::Esc)), InputResult::Cancel);
    }

    #[test]
    fn test_setup_rows_layout() {
        let rows = setup_rows(&["web-dev", "data-science"]);
        assert_eq!(rows.len(), 4 + 2 + SetupAction::ALL.len());
        assert_eq!(rows[0], SetupRow::Manager(ManagerChoice::Auto));
        assert_eq!(rows[4], SetupRow::Stack("web-dev".to_string()));
        assert_eq!(rows.last(), Some(&SetupRow::Action(SetupAction::Rescan)));
    }
}
