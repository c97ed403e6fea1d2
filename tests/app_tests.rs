//! Tests for key handling and rendering of the TUI
//!
//! These tests verify:
//! - Tab navigation and list cursors
//! - Confirmation before clearing the log or resetting
//! - The save-log prompt
//! - Rendering into an in-memory backend

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use devsetup::app::{App, ConfirmAction, DEFAULT_LOG_FILE};
use devsetup::config_file::SetupConfig;
use devsetup::detect::ManagerRegistry;
use devsetup::launcher::ProvisioningScript;
use devsetup::session::Session;
use devsetup::types::{ManagerChoice, PackageManager, Setting, Tab};
use devsetup::ui::UiRenderer;
use ratatui::{Terminal, backend::TestBackend};

const STACKS: &str = r#"{"stacks": {
    "web-dev": {"packages": ["nodejs", "git"]},
    "data-science": {"packages": ["python"], "pythonPackages": ["numpy"]}
}}"#;

fn test_app() -> App {
    let session = Session::new(
        SetupConfig::from_json(STACKS).unwrap(),
        ManagerRegistry::from_entries([(PackageManager::Scoop, "0.5.2".to_string())]),
        ProvisioningScript::default(),
    );
    App::new(session)
}

fn press(app: &mut App, code: KeyCode) -> bool {
    app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
        .unwrap()
}

fn press_char(app: &mut App, c: char) -> bool {
    press(app, KeyCode::Char(c))
}

fn last_message(app: &App) -> String {
    app.session()
        .log()
        .entries()
        .last()
        .map(|e| e.message.clone())
        .unwrap_or_default()
}

fn render_to_string(app: &App, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    let renderer = UiRenderer::new();
    terminal
        .draw(|f| renderer.render(f, app.state(), app.session(), app.keybinding_context()))
        .unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

// =============================================================================
// Navigation
// =============================================================================

#[test]
fn test_tabs_cycle_both_ways() {
    let mut app = test_app();
    assert_eq!(app.state().tab, Tab::Setup);

    press(&mut app, KeyCode::Tab);
    assert_eq!(app.state().tab, Tab::Stacks);
    press(&mut app, KeyCode::Right);
    assert_eq!(app.state().tab, Tab::Tools);

    press(&mut app, KeyCode::Left);
    press(&mut app, KeyCode::Left);
    assert_eq!(app.state().tab, Tab::Setup);
    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.state().tab, Tab::Log);
}

#[test]
fn test_quit_keys() {
    let mut app = test_app();
    assert!(press_char(&mut app, 'q'));
    assert!(
        app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .unwrap()
    );
}

#[test]
fn test_key_release_is_ignored() {
    let mut app = test_app();
    let mut release = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
    release.kind = KeyEventKind::Release;
    assert!(!app.handle_key_event(release).unwrap());
    assert_eq!(app.state().tab, Tab::Setup);
}

#[test]
fn test_selecting_manager_on_setup_tab() {
    let mut app = test_app();
    // Auto, choco, scoop, winget
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert_eq!(
        app.session().choice,
        ManagerChoice::Manager(PackageManager::Scoop)
    );

    press(&mut app, KeyCode::Home);
    press_char(&mut app, ' ');
    assert_eq!(app.session().choice, ManagerChoice::Auto);
    assert_eq!(app.session().selected_manager(), PackageManager::Scoop);
}

#[test]
fn test_cursor_stays_in_bounds() {
    let mut app = test_app();
    press(&mut app, KeyCode::Up);
    assert_eq!(app.state().setup_selection, 0);

    press(&mut app, KeyCode::End);
    // 4 managers + 2 stacks + 4 actions
    assert_eq!(app.state().setup_selection, 9);
    press(&mut app, KeyCode::Down);
    assert_eq!(app.state().setup_selection, 9);
}

#[test]
fn test_stack_tab_sets_up_highlighted_stack() {
    let mut app = test_app();
    press(&mut app, KeyCode::Tab);
    press_char(&mut app, 'j');
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.session().selected_stacks(), ["data-science".to_string()]);
    assert_eq!(last_message(&app), "Setting up data-science stack...");
}

#[test]
fn test_settings_toggle() {
    let mut app = test_app();
    for _ in 0..3 {
        press(&mut app, KeyCode::Tab);
    }
    assert_eq!(app.state().tab, Tab::Settings);

    press(&mut app, KeyCode::End);
    press_char(&mut app, ' ');
    assert!(app.session().options.get(Setting::DebugMode));
    assert!(app.session().install_request().debug);
}

#[test]
fn test_dry_run_switches_to_log() {
    let mut app = test_app();
    press_char(&mut app, 'd');
    assert_eq!(app.state().tab, Tab::Log);
    assert!(!app.session().is_installing());
    assert_eq!(app.session().status(), "Dry run complete");
}

// =============================================================================
// Confirmation dialogs
// =============================================================================

#[test]
fn test_clear_log_requires_confirmation() {
    let mut app = test_app();
    app.session_mut().log_message("first");
    app.session_mut().log_message("second");
    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.state().tab, Tab::Log);

    press_char(&mut app, 'c');
    let dialog = app.state().confirm_dialog.as_ref().unwrap();
    assert_eq!(dialog.action, ConfirmAction::ClearLog);
    assert!(!dialog.is_confirmed());

    // 'q' does not quit while the dialog is open
    assert!(!press_char(&mut app, 'q'));

    press_char(&mut app, 'n');
    assert!(app.state().confirm_dialog.is_none());
    assert_eq!(app.session().log().len(), 2);

    press_char(&mut app, 'c');
    press_char(&mut app, 'y');
    assert_eq!(app.session().log().len(), 1);
    assert_eq!(last_message(&app), "Log cleared");
}

#[test]
fn test_enter_on_default_choice_declines() {
    let mut app = test_app();
    press(&mut app, KeyCode::BackTab);
    app.session_mut().log_message("keep me");

    press_char(&mut app, 'c');
    press(&mut app, KeyCode::Enter);
    assert_eq!(last_message(&app), "keep me");

    press_char(&mut app, 'c');
    press(&mut app, KeyCode::Right);
    press(&mut app, KeyCode::Enter);
    assert_eq!(last_message(&app), "Log cleared");
}

#[test]
fn test_reset_after_confirmation() {
    let mut app = test_app();
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert_ne!(app.session().choice, ManagerChoice::Auto);

    press_char(&mut app, 'r');
    press_char(&mut app, 'y');
    assert_eq!(app.session().choice, ManagerChoice::Auto);
    assert_eq!(app.state().setup_selection, 0);
    assert_eq!(last_message(&app), "Setup reset");
}

// =============================================================================
// Save prompt
// =============================================================================

#[test]
fn test_save_prompt_writes_log() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("saved.txt");

    let mut app = test_app();
    app.session_mut().log_message("hello");
    press(&mut app, KeyCode::BackTab);
    press_char(&mut app, 's');
    let prompt = app.state().save_prompt.as_ref().unwrap();
    assert_eq!(prompt.value, DEFAULT_LOG_FILE);

    for _ in 0..DEFAULT_LOG_FILE.len() {
        press(&mut app, KeyCode::Backspace);
    }
    // Typed characters go to the prompt, not the key map
    for c in target.display().to_string().chars() {
        assert!(!press_char(&mut app, c));
    }
    press(&mut app, KeyCode::Enter);

    assert!(app.state().save_prompt.is_none());
    let saved = std::fs::read_to_string(&target).unwrap();
    assert!(saved.lines().next().unwrap().ends_with("] hello"));
    assert_eq!(app.session().status(), "Log saved");
}

#[test]
fn test_save_prompt_escape_cancels() {
    let mut app = test_app();
    press(&mut app, KeyCode::BackTab);
    press_char(&mut app, 's');
    press(&mut app, KeyCode::Esc);
    assert!(app.state().save_prompt.is_none());
    assert!(app.session().log().is_empty());
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_render_setup_tab() {
    let app = test_app();
    let screen = render_to_string(&app, 120, 40);
    assert!(screen.contains("Quick Setup"));
    assert!(screen.contains("web-dev"));
    assert!(screen.contains("scoop: 0.5.2"));
}

#[test]
fn test_render_stack_details() {
    let mut app = test_app();
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Down);
    let screen = render_to_string(&app, 120, 40);
    assert!(screen.contains("Python Packages: numpy"));
}

#[test]
fn test_render_dialog_and_help() {
    let mut app = test_app();
    press(&mut app, KeyCode::BackTab);
    press_char(&mut app, 'c');
    let screen = render_to_string(&app, 120, 40);
    assert!(screen.contains("[ Yes ]"));

    press(&mut app, KeyCode::Esc);
    press_char(&mut app, '?');
    assert!(app.state().help_visible);
    let screen = render_to_string(&app, 120, 40);
    assert!(screen.contains("Navigation"));
}

#[test]
fn test_render_small_terminal_does_not_panic() {
    let mut app = test_app();
    for _ in 0..5 {
        render_to_string(&app, 20, 8);
        press(&mut app, KeyCode::Tab);
    }
}

#[test]
fn test_page_up_moves_visible_log_by_one_page() {
    let mut app = test_app();
    app.resize(100, 40);
    for i in 1..=100 {
        app.session_mut().log_message(format!("line-{:03}", i));
    }
    press(&mut app, KeyCode::BackTab);

    let screen = render_to_string(&app, 100, 40);
    assert!(screen.contains("line-100"));
    assert!(screen.contains("line-073"));
    assert!(!screen.contains("line-072"));

    press(&mut app, KeyCode::PageUp);
    assert!(!app.session().log_view().follow);
    let screen = render_to_string(&app, 100, 40);
    assert!(screen.contains("line-063"));
    assert!(screen.contains("line-090"));
    assert!(!screen.contains("line-062"));
    assert!(!screen.contains("line-091"));

    // One page down is back at the bottom and following again
    press(&mut app, KeyCode::PageDown);
    assert!(app.session().log_view().follow);
    let screen = render_to_string(&app, 100, 40);
    assert!(screen.contains("line-100"));

    press(&mut app, KeyCode::Home);
    press(&mut app, KeyCode::End);
    assert!(app.session().log_view().follow);
    assert_eq!(app.session().log_view().scroll_offset, 72);
}

#[test]
fn test_help_overlay_on_very_wide_terminal() {
    let mut app = test_app();
    press_char(&mut app, '?');
    let screen = render_to_string(&app, 1200, 40);
    assert!(screen.contains("Navigation"));
}
