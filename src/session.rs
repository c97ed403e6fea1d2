//! Setup session
//!
//! Everything a run of the front-end mutates lives here: the loaded stacks, the
//! detected package managers, the installation log and its view, the run state
//! and the user's selections. The TUI and the headless commands both drive a
//! `Session`; background workers talk to it only through channels drained by
//! `poll_events()` on the foreground thread.

use crate::config_file::SetupConfig;
use crate::detect::{CommandProbe, ManagerRegistry, VersionProbe};
use crate::install_log::{InstallLog, LogEntry, LogView};
use crate::launcher::{
    self, InstallEvent, InstallOutcome, InstallRequest, ProvisioningScript, RunState,
};
use crate::types::{InstallOptions, ManagerChoice, PackageManager, Setting, tool_rows};
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use strum::IntoEnumIterator;

/// What `start_installation` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A worker was spawned for this manager
    Started(PackageManager),
    /// A run was already in progress; nothing happened
    AlreadyRunning,
}

/// State shared by every front-end for one run of the program
pub struct Session {
    config: SetupConfig,
    registry: ManagerRegistry,
    probe: Arc<dyn VersionProbe + Send + Sync>,
    script: ProvisioningScript,
    log: InstallLog,
    log_view: LogView,
    run_state: RunState,
    install_tx: Sender<InstallEvent>,
    install_rx: Receiver<InstallEvent>,
    probe_rx: Option<Receiver<ManagerRegistry>>,
    /// Installation worker whose `Finished` event has not been handled yet
    worker: Option<JoinHandle<()>>,
    status: String,
    last_outcome: Option<InstallOutcome>,
    /// Package-manager selection from the setup tab
    pub choice: ManagerChoice,
    /// Settings tab values
    pub options: InstallOptions,
    selected_stacks: Vec<String>,
    selected_tools: Vec<&'static str>,
}

impl Session {
    pub fn new(config: SetupConfig, registry: ManagerRegistry, script: ProvisioningScript) -> Self {
        let (install_tx, install_rx) = mpsc::channel();
        Self {
            config,
            registry,
            probe: Arc::new(CommandProbe::default()),
            script,
            log: InstallLog::new(),
            log_view: LogView::default(),
            run_state: RunState::new(),
            install_tx,
            install_rx,
            probe_rx: None,
            worker: None,
            status: "Ready to setup your development environment".to_string(),
            last_outcome: None,
            choice: ManagerChoice::Auto,
            options: InstallOptions::default(),
            selected_stacks: Vec::new(),
            selected_tools: Vec::new(),
        }
    }

    /// Replace the probe used by `rescan_managers`
    pub fn with_probe(mut self, probe: Arc<dyn VersionProbe + Send + Sync>) -> Self {
        self.probe = probe;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &SetupConfig {
        &self.config
    }

    pub fn registry(&self) -> &ManagerRegistry {
        &self.registry
    }

    pub fn script(&self) -> &ProvisioningScript {
        &self.script
    }

    pub fn log(&self) -> &InstallLog {
        &self.log
    }

    pub fn log_view(&self) -> &LogView {
        &self.log_view
    }

    pub fn log_view_mut(&mut self) -> &mut LogView {
        &mut self.log_view
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn is_installing(&self) -> bool {
        self.run_state.is_running()
    }

    pub fn is_rescanning(&self) -> bool {
        self.probe_rx.is_some()
    }

    pub fn last_outcome(&self) -> Option<&InstallOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn selected_stacks(&self) -> &[String] {
        &self.selected_stacks
    }

    pub fn selected_tools(&self) -> &[&'static str] {
        &self.selected_tools
    }

    // ------------------------------------------------------------------
    // Log
    // ------------------------------------------------------------------

    /// Append a timestamped message to the log and the live view
    pub fn log_message(&mut self, message: impl Into<String>) {
        self.push_entry(LogEntry::now(message));
    }

    fn push_entry(&mut self, entry: LogEntry) {
        self.log_view.append(&entry);
        self.log.push(entry);
    }

    /// Rebuild the view from the in-memory log
    pub fn refresh_log(&mut self) {
        self.log_view.refresh(&self.log);
    }

    /// Empty the log. The TUI only calls this after the user confirms.
    pub fn clear_log(&mut self) {
        self.log.clear();
        self.log_view.clear();
        self.log_message("Log cleared");
    }

    /// Save every log line to `path`, overwriting it.
    ///
    /// Failures are logged and shown in the status bar as well as returned.
    pub fn save_log(&mut self, path: &Path) -> anyhow::Result<()> {
        match self.log.save_to(path) {
            Ok(()) => {
                tracing::info!("Saved installation log to {}", path.display());
                self.log_message(format!("Log saved to {}", path.display()));
                self.status = "Log saved".to_string();
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to save log: {:#}", e);
                self.log_message(format!("Failed to save log: {:#}", e));
                self.status = "Log save failed".to_string();
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Stacks and selections
    // ------------------------------------------------------------------

    /// Names of enabled stacks, in config order
    pub fn stack_names(&self) -> Vec<&str> {
        self.config.enabled_stack_names()
    }

    /// Detail text for `name`, if the stack exists
    pub fn stack_details(&self, name: &str) -> Option<String> {
        self.config.stack(name).map(|s| s.details())
    }

    /// Mark a stack for setup. Returns false for unknown stacks.
    pub fn setup_stack(&mut self, name: &str) -> bool {
        if self.config.stack(name).is_none() {
            self.log_message(format!("Unknown stack: {}", name));
            return false;
        }
        self.log_message(format!("Setting up {} stack...", name));
        if !self.selected_stacks.iter().any(|s| s == name) {
            self.selected_stacks.push(name.to_string());
        }
        true
    }

    pub fn is_stack_selected(&self, name: &str) -> bool {
        self.selected_stacks.iter().any(|s| s == name)
    }

    /// Tick or untick a tool from the catalog. Unknown tools are ignored.
    pub fn toggle_tool(&mut self, tool: &str) {
        if let Some(pos) = self.selected_tools.iter().position(|t| *t == tool) {
            self.selected_tools.remove(pos);
            return;
        }
        if let Some((_, known)) = tool_rows().into_iter().find(|(_, t)| *t == tool) {
            self.selected_tools.push(known);
        }
    }

    pub fn is_tool_selected(&self, tool: &str) -> bool {
        self.selected_tools.contains(&tool)
    }

    /// Restore choice, settings and selections to their defaults
    pub fn reset(&mut self) {
        self.choice = ManagerChoice::Auto;
        self.options = InstallOptions::default();
        self.selected_stacks.clear();
        self.selected_tools.clear();
        self.log_message("Setup reset");
    }

    // ------------------------------------------------------------------
    // Installation
    // ------------------------------------------------------------------

    /// The manager an installation would use right now
    pub fn selected_manager(&self) -> PackageManager {
        self.registry.resolve(self.choice)
    }

    pub fn install_request(&self) -> InstallRequest {
        InstallRequest {
            manager: self.selected_manager(),
            verbose: self.options.detailed_logging,
            debug: self.options.debug_mode,
        }
    }

    /// Launch the provisioning script on a worker thread.
    ///
    /// A second call while a run is in progress does nothing.
    pub fn start_installation(&mut self) -> StartOutcome {
        let Some(guard) = self.run_state.try_begin() else {
            tracing::debug!("Installation already in progress, ignoring start request");
            return StartOutcome::AlreadyRunning;
        };

        let request = self.install_request();
        self.last_outcome = None;
        self.log_message("Starting installation...");
        self.status = "Installing packages...".to_string();
        tracing::info!(
            "Starting installation with {} (verbose={}, debug={})",
            request.manager,
            request.verbose,
            request.debug
        );

        self.worker = Some(launcher::spawn_installation(
            self.script.clone(),
            request,
            guard,
            self.install_tx.clone(),
        ));
        StartOutcome::Started(request.manager)
    }

    /// Describe what an installation would do without running anything
    pub fn dry_run(&mut self) {
        self.log_message("Performing dry run...");

        let request = self.install_request();
        let command = self.script.command_line(&request).join(" ");
        self.log_message(format!("Would run: {}", command));

        let stacks: Vec<(String, String)> = self
            .selected_stacks
            .iter()
            .filter_map(|name| {
                self.config
                    .stack(name)
                    .map(|s| (s.name.clone(), s.config.packages.join(", ")))
            })
            .collect();
        if stacks.is_empty() {
            self.log_message("No stacks selected");
        }
        for (name, packages) in stacks {
            self.log_message(format!("Stack {}: {}", name, packages));
        }

        if !self.selected_tools.is_empty() {
            let tools = self.selected_tools.join(", ");
            self.log_message(format!("Tools: {}", tools));
        }

        let enabled: Vec<String> = Setting::iter()
            .filter(|s| self.options.get(*s))
            .map(|s| s.to_string())
            .collect();
        self.log_message(format!("Settings: {}", enabled.join(", ")));
        self.status = "Dry run complete".to_string();
    }

    // ------------------------------------------------------------------
    // Package managers
    // ------------------------------------------------------------------

    /// Re-probe package managers on a background thread
    pub fn rescan_managers(&mut self) {
        if self.probe_rx.is_some() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        let probe = Arc::clone(&self.probe);
        thread::spawn(move || {
            let registry = ManagerRegistry::detect_with(probe.as_ref());
            let _ = tx.send(registry);
        });
        self.probe_rx = Some(rx);
        self.status = "Detecting package managers...".to_string();
    }

    // ------------------------------------------------------------------
    // Worker events
    // ------------------------------------------------------------------

    /// Drain pending worker messages. Returns the number handled.
    pub fn poll_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.install_rx.try_recv() {
                Ok(event) => {
                    self.handle_install_event(event);
                    handled += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if let Some(rx) = self.probe_rx.take() {
            match rx.try_recv() {
                Ok(registry) => {
                    self.registry = registry;
                    self.log_message(format!("Package managers: {}", self.registry.summary()));
                    self.status = "Package managers re-detected".to_string();
                    handled += 1;
                }
                Err(TryRecvError::Empty) => self.probe_rx = Some(rx),
                Err(TryRecvError::Disconnected) => {
                    self.status = "Package manager detection failed".to_string();
                }
            }
        }
        handled
    }

    /// Block until the current installation finishes, passing each new log
    /// entry to `on_entry`. Returns `None` if nothing was running.
    pub fn run_to_completion<F>(&mut self, mut on_entry: F) -> Option<InstallOutcome>
    where
        F: FnMut(&LogEntry),
    {
        if self.worker.is_none() {
            return None;
        }
        loop {
            let event = match self.install_rx.recv_timeout(Duration::from_millis(100)) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => match &self.worker {
                    Some(worker) if !worker.is_finished() => continue,
                    _ => {
                        // Joining makes everything the worker sent visible
                        if let Some(worker) = self.worker.take() {
                            let _ = worker.join();
                        }
                        match self.install_rx.try_recv() {
                            Ok(event) => event,
                            Err(_) => {
                                tracing::warn!("Installation worker exited without a result");
                                return None;
                            }
                        }
                    }
                },
                Err(RecvTimeoutError::Disconnected) => return None,
            };

            let finished = matches!(event, InstallEvent::Finished(_));
            let before = self.log.len();
            self.handle_install_event(event);
            for entry in &self.log.entries()[before..] {
                on_entry(entry);
            }
            if finished {
                return self.last_outcome.clone();
            }
        }
    }

    fn handle_install_event(&mut self, event: InstallEvent) {
        match event {
            InstallEvent::Log(entry) => self.push_entry(entry),
            InstallEvent::Finished(outcome) => {
                self.log_message(outcome.log_message());
                self.status = outcome.status_text().to_string();
                self.last_outcome = Some(outcome);
                self.worker = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_file::SetupConfig;

    fn session_with(json: &str) -> Session {
        Session::new(
            SetupConfig::from_json(json).unwrap(),
            ManagerRegistry::default(),
            ProvisioningScript::default(),
        )
    }

    #[test]
    fn test_stack_listing_and_details() {
        let session = session_with(r#"{"stacks": {"x": {"packages": ["a","b"]}}}"#);
        assert_eq!(session.stack_names(), vec!["x"]);
        assert!(session.stack_details("x").unwrap().contains("Packages: a, b"));
        assert!(session.stack_details("y").is_none());
    }

    #[test]
    fn test_log_message_updates_log_and_view() {
        let mut session = session_with("{}");
        session.log_message("one");
        session.log_message("two");
        assert_eq!(session.log().len(), 2);
        assert_eq!(session.log_view().lines(), session.log().lines().as_slice());
    }

    #[test]
    fn test_clear_log_leaves_single_marker() {
        let mut session = session_with("{}");
        session.log_message("one");
        session.log_message("two");
        session.clear_log();
        assert_eq!(session.log().len(), 1);
        assert_eq!(session.log().entries()[0].message, "Log cleared");
        assert_eq!(session.log_view().lines().len(), 1);
    }

    #[test]
    fn test_setup_stack_records_selection_once() {
        let mut session = session_with(r#"{"stacks": {"web-dev": {"packages": ["nodejs"]}}}"#);
        assert!(session.setup_stack("web-dev"));
        assert!(session.setup_stack("web-dev"));
        assert_eq!(session.selected_stacks(), ["web-dev".to_string()]);
        assert_eq!(session.log().entries()[0].message, "Setting up web-dev stack...");

        assert!(!session.setup_stack("mobile-dev"));
    }

    #[test]
    fn test_toggle_tool() {
        let mut session = session_with("{}");
        session.toggle_tool("git");
        session.toggle_tool("not-a-tool");
        assert_eq!(session.selected_tools(), ["git"]);
        session.toggle_tool("git");
        assert!(session.selected_tools().is_empty());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut session = session_with(r#"{"stacks": {"x": {}}}"#);
        session.choice = ManagerChoice::Manager(PackageManager::Scoop);
        session.options.toggle(Setting::DebugMode);
        session.setup_stack("x");
        session.toggle_tool("go");

        session.reset();
        assert_eq!(session.choice, ManagerChoice::Auto);
        assert_eq!(session.options, InstallOptions::default());
        assert!(session.selected_stacks().is_empty());
        assert!(session.selected_tools().is_empty());
        assert_eq!(session.log().entries().last().unwrap().message, "Setup reset");
    }

    #[test]
    fn test_install_request_follows_settings() {
        let mut session = session_with("{}");
        let request = session.install_request();
        assert_eq!(request.manager, PackageManager::Winget);
        assert!(request.verbose);
        assert!(!request.debug);

        session.options.toggle(Setting::DebugMode);
        session.choice = ManagerChoice::Manager(PackageManager::Choco);
        let request = session.install_request();
        assert_eq!(request.manager, PackageManager::Choco);
        assert!(request.debug);
    }

    #[test]
    fn test_dry_run_spawns_nothing() {
        let mut session = session_with(r#"{"stacks": {"x": {"packages": ["a","b"]}}}"#);
        session.setup_stack("x");
        session.dry_run();

        assert!(!session.is_installing());
        let messages: Vec<&str> = session.log().entries().iter().map(|e| e.message.as_str()).collect();
        assert!(messages.contains(&"Performing dry run..."));
        assert!(messages.contains(&"Stack x: a, b"));
        assert!(messages.iter().any(|m| m.starts_with("Would run: powershell")));
    }

    #[test]
    fn test_save_log_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_with("{}");
        session.log_message("something");

        let result = session.save_log(&dir.path().join("missing").join("log.txt"));
        assert!(result.is_err());
        assert_eq!(session.status(), "Log save failed");
        assert!(session.log().entries().last().unwrap().message.starts_with("Failed to save log"));
    }

    #[test]
    fn test_waits_for_result_sent_after_run_state_release() {
        let mut session = session_with("{}");
        let guard = session.run_state.try_begin().unwrap();
        let tx = session.install_tx.clone();
        session.worker = Some(thread::spawn(move || {
            // Same order as the real worker: release first, then report
            drop(guard);
            thread::sleep(Duration::from_millis(300));
            let _ = tx.send(InstallEvent::Finished(InstallOutcome::Succeeded));
        }));
        thread::sleep(Duration::from_millis(50));
        assert!(!session.is_installing());

        let outcome = session.run_to_completion(|_| {});
        assert_eq!(outcome, Some(InstallOutcome::Succeeded));
        assert_eq!(session.last_outcome(), Some(&InstallOutcome::Succeeded));
    }

    #[test]
    fn test_worker_without_result_ends_the_wait() {
        let mut session = session_with("{}");
        session.worker = Some(thread::spawn(|| {}));
        assert_eq!(session.run_to_completion(|_| {}), None);
        assert!(session.worker.is_none());
    }
}
