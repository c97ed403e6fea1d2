//! Keybinding system for context-aware keyboard shortcuts
//!
//! The registry maps keys to actions per `KeyScope` (one scope per tab plus the
//! modal dialogs). The app resolves every key press through it, and the
//! navigation bar and help overlay are generated from the same table.

use crate::types::Tab;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Where keyboard input is currently routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyScope {
    Tab(Tab),
    /// Yes/No confirmation dialog
    Confirm,
    /// Save-log path prompt
    SavePath,
    /// Help overlay
    Help,
}

impl KeyScope {
    pub fn title(&self) -> String {
        match self {
            Self::Tab(tab) => tab.to_string(),
            Self::Confirm => "Confirmation".to_string(),
            Self::SavePath => "Save Log".to_string(),
            Self::Help => "Help".to_string(),
        }
    }

    /// Global bindings apply on the tabs only
    fn accepts_globals(&self) -> bool {
        matches!(self, Self::Tab(_))
    }
}

/// Actions that can be triggered by keybindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    NavigateUp,
    NavigateDown,
    NextTab,
    PrevTab,
    Select,
    Toggle,
    StartInstall,
    DryRun,
    Reset,
    Rescan,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Home,
    End,
    ClearLog,
    SaveLog,
    RefreshLog,
    ToggleChoice,
    Confirm,
    Cancel,
    Help,
    Quit,
}

/// A keybinding definition
#[derive(Debug, Clone)]
pub struct Keybinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub action: KeyAction,
    pub display: String,
    pub description: String,
}

impl Keybinding {
    pub fn new(key: KeyCode, action: KeyAction, display: &str, description: &str) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::NONE,
            action,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    pub fn with_modifiers(
        key: KeyCode,
        modifiers: KeyModifiers,
        action: KeyAction,
        display: &str,
        description: &str,
    ) -> Self {
        Self {
            key,
            modifiers,
            action,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    /// Does this binding fire for `event`? Shift is ignored for printable keys
    /// and BackTab, whose shifted form depends on the keyboard layout.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if self.key != event.code {
            return false;
        }
        let mods = match event.code {
            KeyCode::Char(_) | KeyCode::BackTab => event.modifiers.difference(KeyModifiers::SHIFT),
            _ => event.modifiers,
        };
        mods == self.modifiers
    }
}

/// Context-aware keybinding registry
pub struct KeybindingContext {
    scope_bindings: HashMap<KeyScope, Vec<Keybinding>>,
    global_bindings: Vec<Keybinding>,
}

impl Default for KeybindingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl KeybindingContext {
    pub fn new() -> Self {
        let mut ctx = Self {
            scope_bindings: HashMap::new(),
            global_bindings: Vec::new(),
        };
        ctx.register_defaults();
        ctx
    }

    fn register_defaults(&mut self) {
        self.global_bindings = vec![
            Keybinding::new(KeyCode::Tab, KeyAction::NextTab, "Tab", "Next tab"),
            Keybinding::new(KeyCode::Right, KeyAction::NextTab, "Right", "Next tab"),
            Keybinding::new(KeyCode::BackTab, KeyAction::PrevTab, "S-Tab", "Previous tab"),
            Keybinding::new(KeyCode::Left, KeyAction::PrevTab, "Left", "Previous tab"),
            Keybinding::new(KeyCode::Char('i'), KeyAction::StartInstall, "I", "Start installation"),
            Keybinding::new(KeyCode::Char('d'), KeyAction::DryRun, "D", "Dry run"),
            Keybinding::new(KeyCode::Char('?'), KeyAction::Help, "?", "Help"),
            Keybinding::new(KeyCode::Char('q'), KeyAction::Quit, "Q", "Quit"),
            Keybinding::with_modifiers(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
                KeyAction::Quit,
                "Ctrl+C",
                "Quit",
            ),
        ];

        let list_nav = || {
            vec![
                Keybinding::new(KeyCode::Up, KeyAction::NavigateUp, "Up", "Navigate up"),
                Keybinding::new(KeyCode::Down, KeyAction::NavigateDown, "Down", "Navigate down"),
                Keybinding::new(KeyCode::Char('k'), KeyAction::NavigateUp, "K", "Navigate up"),
                Keybinding::new(KeyCode::Char('j'), KeyAction::NavigateDown, "J", "Navigate down"),
                Keybinding::new(KeyCode::Home, KeyAction::Home, "Home", "Go to first"),
                Keybinding::new(KeyCode::End, KeyAction::End, "End", "Go to last"),
            ]
        };

        // Quick Setup
        let mut setup = list_nav();
        setup.extend([
            Keybinding::new(KeyCode::Enter, KeyAction::Select, "Enter", "Choose / run"),
            Keybinding::new(KeyCode::Char(' '), KeyAction::Select, "Space", "Choose / run"),
            Keybinding::new(KeyCode::Char('r'), KeyAction::Reset, "R", "Reset setup"),
            Keybinding::new(KeyCode::Char('p'), KeyAction::Rescan, "P", "Re-detect managers"),
        ]);
        self.scope_bindings.insert(KeyScope::Tab(Tab::Setup), setup);

        // Stacks
        let mut stacks = list_nav();
        stacks.push(Keybinding::new(KeyCode::Enter, KeyAction::Select, "Enter", "Set up stack"));
        self.scope_bindings.insert(KeyScope::Tab(Tab::Stacks), stacks);

        // Tools and Settings share toggle semantics
        let mut toggles = list_nav();
        toggles.extend([
            Keybinding::new(KeyCode::Char(' '), KeyAction::Toggle, "Space", "Toggle"),
            Keybinding::new(KeyCode::Enter, KeyAction::Toggle, "Enter", "Toggle"),
        ]);
        self.scope_bindings
            .insert(KeyScope::Tab(Tab::Tools), toggles.clone());
        self.scope_bindings.insert(KeyScope::Tab(Tab::Settings), toggles);

        // Log
        self.scope_bindings.insert(
            KeyScope::Tab(Tab::Log),
            vec![
                Keybinding::new(KeyCode::Up, KeyAction::ScrollUp, "Up", "Scroll up"),
                Keybinding::new(KeyCode::Down, KeyAction::ScrollDown, "Down", "Scroll down"),
                Keybinding::new(KeyCode::PageUp, KeyAction::PageUp, "PgUp", "Page up"),
                Keybinding::new(KeyCode::PageDown, KeyAction::PageDown, "PgDn", "Page down"),
                Keybinding::new(KeyCode::Home, KeyAction::Home, "Home", "Oldest line"),
                Keybinding::new(KeyCode::End, KeyAction::End, "End", "Follow newest"),
                Keybinding::new(KeyCode::Char('c'), KeyAction::ClearLog, "C", "Clear log"),
                Keybinding::new(KeyCode::Char('s'), KeyAction::SaveLog, "S", "Save log"),
                Keybinding::new(KeyCode::Char('r'), KeyAction::RefreshLog, "R", "Refresh"),
            ],
        );

        // Confirm Dialog
        self.scope_bindings.insert(
            KeyScope::Confirm,
            vec![
                Keybinding::new(KeyCode::Left, KeyAction::ToggleChoice, "Left", "Select No"),
                Keybinding::new(KeyCode::Right, KeyAction::ToggleChoice, "Right", "Select Yes"),
                Keybinding::new(KeyCode::Tab, KeyAction::ToggleChoice, "Tab", "Toggle selection"),
                Keybinding::new(KeyCode::Enter, KeyAction::Confirm, "Enter", "Confirm"),
                Keybinding::new(KeyCode::Char('y'), KeyAction::Confirm, "Y", "Yes"),
                Keybinding::new(KeyCode::Char('n'), KeyAction::Cancel, "N", "No"),
                Keybinding::new(KeyCode::Esc, KeyAction::Cancel, "Esc", "Cancel"),
            ],
        );

        // Save path prompt; printable keys go to the text field
        self.scope_bindings.insert(
            KeyScope::SavePath,
            vec![
                Keybinding::new(KeyCode::Enter, KeyAction::Confirm, "Enter", "Save"),
                Keybinding::new(KeyCode::Esc, KeyAction::Cancel, "Esc", "Cancel"),
            ],
        );

        self.scope_bindings.insert(
            KeyScope::Help,
            vec![
                Keybinding::new(KeyCode::Char('?'), KeyAction::Cancel, "?", "Close help"),
                Keybinding::new(KeyCode::Esc, KeyAction::Cancel, "Esc", "Close help"),
            ],
        );
    }

    /// Bindings for `scope`, scope-specific first, then globals
    pub fn get_bindings(&self, scope: &KeyScope) -> Vec<&Keybinding> {
        let mut bindings: Vec<&Keybinding> = Vec::new();
        if let Some(scoped) = self.scope_bindings.get(scope) {
            bindings.extend(scoped.iter());
        }
        if scope.accepts_globals() {
            bindings.extend(self.global_bindings.iter());
        }
        bindings
    }

    /// Resolve a key press. Scope bindings win over globals.
    pub fn action_for(&self, scope: &KeyScope, event: &KeyEvent) -> Option<KeyAction> {
        self.get_bindings(scope)
            .into_iter()
            .find(|b| b.matches(event))
            .map(|b| b.action)
    }

    /// Navigation bar items for display
    pub fn get_nav_items(&self, scope: &KeyScope) -> Vec<NavBarItem> {
        let bindings = self.get_bindings(scope);

        let priority_actions = match scope {
            KeyScope::Tab(Tab::Setup) => vec![
                KeyAction::NavigateUp,
                KeyAction::Select,
                KeyAction::StartInstall,
                KeyAction::DryRun,
                KeyAction::Reset,
                KeyAction::NextTab,
                KeyAction::Help,
                KeyAction::Quit,
            ],
            KeyScope::Tab(Tab::Stacks) => vec![
                KeyAction::NavigateUp,
                KeyAction::Select,
                KeyAction::StartInstall,
                KeyAction::NextTab,
                KeyAction::Help,
                KeyAction::Quit,
            ],
            KeyScope::Tab(Tab::Tools) | KeyScope::Tab(Tab::Settings) => vec![
                KeyAction::NavigateUp,
                KeyAction::Toggle,
                KeyAction::StartInstall,
                KeyAction::NextTab,
                KeyAction::Help,
                KeyAction::Quit,
            ],
            KeyScope::Tab(Tab::Log) => vec![
                KeyAction::ScrollUp,
                KeyAction::ClearLog,
                KeyAction::SaveLog,
                KeyAction::RefreshLog,
                KeyAction::NextTab,
                KeyAction::Help,
                KeyAction::Quit,
            ],
            KeyScope::Confirm => vec![
                KeyAction::ToggleChoice,
                KeyAction::Confirm,
                KeyAction::Cancel,
            ],
            KeyScope::SavePath => vec![KeyAction::Confirm, KeyAction::Cancel],
            KeyScope::Help => vec![KeyAction::Cancel],
        };

        let mut items: Vec<NavBarItem> = Vec::new();
        for action in priority_actions {
            let Some(binding) = bindings.iter().find(|b| b.action == action) else {
                continue;
            };
            let item = match action {
                KeyAction::NavigateUp | KeyAction::NavigateDown => NavBarItem {
                    key_display: "Up/Dn".to_string(),
                    action_label: "Navigate".to_string(),
                },
                KeyAction::ScrollUp | KeyAction::ScrollDown => NavBarItem {
                    key_display: "Up/Dn".to_string(),
                    action_label: "Scroll".to_string(),
                },
                KeyAction::NextTab | KeyAction::PrevTab => NavBarItem {
                    key_display: "Tab".to_string(),
                    action_label: "Switch tab".to_string(),
                },
                _ => NavBarItem {
                    key_display: binding.display.clone(),
                    action_label: binding.description.clone(),
                },
            };
            if !items.iter().any(|i| i.action_label == item.action_label) {
                items.push(item);
            }
        }
        items
    }

    /// Full help content for `scope`, grouped into sections
    pub fn get_help_content(&self, scope: &KeyScope) -> Vec<HelpSection> {
        let groups: [(&str, fn(KeyAction) -> bool); 3] = [
            ("Navigation", |a| {
                matches!(
                    a,
                    KeyAction::NavigateUp
                        | KeyAction::NavigateDown
                        | KeyAction::NextTab
                        | KeyAction::PrevTab
                        | KeyAction::ScrollUp
                        | KeyAction::ScrollDown
                        | KeyAction::PageUp
                        | KeyAction::PageDown
                        | KeyAction::Home
                        | KeyAction::End
                )
            }),
            ("Actions", |a| {
                !matches!(
                    a,
                    KeyAction::NavigateUp
                        | KeyAction::NavigateDown
                        | KeyAction::NextTab
                        | KeyAction::PrevTab
                        | KeyAction::ScrollUp
                        | KeyAction::ScrollDown
                        | KeyAction::PageUp
                        | KeyAction::PageDown
                        | KeyAction::Home
                        | KeyAction::End
                        | KeyAction::Help
                        | KeyAction::Quit
                )
            }),
            ("General", |a| matches!(a, KeyAction::Help | KeyAction::Quit)),
        ];

        let bindings = self.get_bindings(scope);
        groups
            .iter()
            .filter_map(|(title, belongs)| {
                let items: Vec<(String, String)> = bindings
                    .iter()
                    .filter(|b| belongs(b.action))
                    .map(|b| (b.display.clone(), b.description.clone()))
                    .collect();
                (!items.is_empty()).then(|| HelpSection {
                    title: title.to_string(),
                    items,
                })
            })
            .collect()
    }
}

/// Navigation bar item for display
#[derive(Debug, Clone)]
pub struct NavBarItem {
    pub key_display: String,
    pub action_label: String,
}

/// Help section for the help overlay
#[derive(Debug, Clone)]
pub struct HelpSection {
    pub title: String,
    pub items: Vec<(String, String)>,
}
