//! Installation launcher
//!
//! Builds the provisioning script command line, runs the script as a child
//! process and streams its output back as timestamped log entries.
//!
//! # Concurrency
//!
//! At most one installation runs at a time. `RunState` is the only guard: the
//! foreground claims it with `try_begin()` before spawning the worker, and the
//! worker's `RunGuard` releases it when the run ends on any path. The worker is
//! detached and never cancelled; the child runs to completion without a timeout.

use crate::error::{DevSetupError, Result};
use crate::install_log::LogEntry;
use crate::script_traits::ScriptArgs;
use crate::types::PackageManager;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

/// Default interpreter for the provisioning script
pub const DEFAULT_SHELL: &str = "powershell";

/// Default provisioning script, resolved against the working directory
pub const DEFAULT_SCRIPT: &str = "setup.ps1";

/// Arguments handed to the provisioning script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallRequest {
    pub manager: PackageManager,
    /// `-Verbose`, from the "detailed logging" setting
    pub verbose: bool,
    /// `-Debug`, from the "debug mode" setting
    pub debug: bool,
}

impl ScriptArgs for InstallRequest {
    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec!["-PackageManager".to_string(), self.manager.to_string()];
        if self.debug {
            args.push("-Debug".to_string());
        }
        if self.verbose {
            args.push("-Verbose".to_string());
        }
        args
    }
}

/// How to invoke the provisioning script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningScript {
    /// Interpreter executable
    pub program: String,
    /// Interpreter arguments placed before the script path
    pub program_args: Vec<String>,
    /// Script path
    pub script: PathBuf,
}

impl Default for ProvisioningScript {
    fn default() -> Self {
        Self::powershell(DEFAULT_SCRIPT)
    }
}

impl ProvisioningScript {
    /// `powershell -ExecutionPolicy Bypass -File <script>`
    pub fn powershell(script: impl Into<PathBuf>) -> Self {
        Self {
            program: DEFAULT_SHELL.to_string(),
            program_args: vec![
                "-ExecutionPolicy".to_string(),
                "Bypass".to_string(),
                "-File".to_string(),
            ],
            script: script.into(),
        }
    }

    /// Run `script` directly with `program` and no interpreter arguments
    pub fn with_program(program: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            program_args: Vec::new(),
            script: script.into(),
        }
    }

    /// Pick the invocation style for an interpreter name.
    ///
    /// `None`, `powershell` and `pwsh` (with or without a directory or `.exe`)
    /// get the PowerShell arguments; anything else runs the script directly.
    pub fn for_shell(shell: Option<&str>, script: impl Into<PathBuf>) -> Self {
        let Some(shell) = shell else {
            return Self::powershell(script);
        };
        let stem = std::path::Path::new(shell)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(shell)
            .to_ascii_lowercase();
        if stem == "powershell" || stem == "pwsh" {
            Self {
                program: shell.to_string(),
                ..Self::powershell(script)
            }
        } else {
            Self::with_program(shell, script)
        }
    }

    /// Full command line, for logging and dry runs
    pub fn command_line<A: ScriptArgs>(&self, args: &A) -> Vec<String> {
        let mut line = Vec::with_capacity(self.program_args.len() + 4);
        line.push(self.program.clone());
        line.extend(self.program_args.iter().cloned());
        line.push(self.script.display().to_string());
        line.extend(args.to_cli_args());
        line
    }

    /// Build the child command; stdin is closed, stdout and stderr are piped
    pub fn command<A: ScriptArgs>(&self, args: &A) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.program_args)
            .arg(&self.script)
            .args(args.to_cli_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

/// How an installation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Script exited with code 0
    Succeeded,
    /// Script exited non-zero, or was killed by a signal (`None`)
    Failed { exit_code: Option<i32> },
    /// Spawning, reading or waiting failed
    Errored(String),
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Terminal log entry text
    pub fn log_message(&self) -> String {
        match self {
            Self::Succeeded => "Installation completed successfully!".to_string(),
            Self::Failed { exit_code } => {
                format!("Installation failed with code {}", exit_code.unwrap_or(-1))
            }
            Self::Errored(msg) => format!("Error during installation: {}", msg),
        }
    }

    /// Status bar text
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::Succeeded => "Installation completed",
            Self::Failed { .. } => "Installation failed",
            Self::Errored(_) => "Installation error",
        }
    }
}

/// Messages sent from the installer worker to the foreground
#[derive(Debug, Clone)]
pub enum InstallEvent {
    /// One line of script output (stdout or stderr)
    Log(LogEntry),
    /// The run is over; the run state is already released
    Finished(InstallOutcome),
}

/// Shared "installation in progress" flag
#[derive(Debug, Clone, Default)]
pub struct RunState {
    running: Arc<AtomicBool>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Claim the flag. Returns `None` if a run is already in progress.
    pub fn try_begin(&self) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| RunGuard {
                running: Arc::clone(&self.running),
            })
    }
}

/// Holds the run state; dropping it clears the flag
#[derive(Debug)]
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Run the provisioning script to completion on the current thread.
///
/// Every output line, from either stream, is passed to `on_line` as soon as it
/// is read. Never returns an error: failures become `InstallOutcome::Errored`.
pub fn run_installation<A, F>(script: &ProvisioningScript, args: &A, on_line: F) -> InstallOutcome
where
    A: ScriptArgs,
    F: FnMut(LogEntry),
{
    tracing::info!("Launching provisioning script: {:?}", script.command_line(args));

    match execute(script, args, on_line) {
        Ok(status) if status.success() => {
            tracing::info!("Provisioning script finished successfully");
            InstallOutcome::Succeeded
        }
        Ok(status) => {
            tracing::warn!("Provisioning script failed with {:?}", status.code());
            InstallOutcome::Failed {
                exit_code: status.code(),
            }
        }
        Err(e) => {
            tracing::error!("{}", e);
            InstallOutcome::Errored(e.to_string())
        }
    }
}

/// Spawn the child, stream both pipes into `on_line` and wait for exit
fn execute<A, F>(script: &ProvisioningScript, args: &A, mut on_line: F) -> Result<ExitStatus>
where
    A: ScriptArgs,
    F: FnMut(LogEntry),
{
    let mut child = script.command(args).spawn().map_err(|e| {
        DevSetupError::script(format!("failed to start {}: {}", script.program, e))
    })?;

    let (line_tx, line_rx) = mpsc::channel::<std::io::Result<String>>();
    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_line_reader(stdout, line_tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_line_reader(stderr, line_tx.clone()));
    }
    drop(line_tx);

    let mut read_error = None;
    for line in line_rx {
        match line {
            Ok(line) => on_line(LogEntry::now(line)),
            Err(e) => {
                tracing::warn!("Error reading script output: {}", e);
                read_error.get_or_insert_with(|| e.to_string());
            }
        }
    }
    for reader in readers {
        let _ = reader.join();
    }

    let status = child
        .wait()
        .map_err(|e| DevSetupError::script(format!("failed to wait for script: {}", e)))?;

    match read_error {
        Some(e) => Err(DevSetupError::script(format!(
            "failed to read script output: {}",
            e
        ))),
        None => Ok(status),
    }
}

/// Run the installation on a detached worker thread.
///
/// Lines arrive as `InstallEvent::Log`; the last message is always
/// `InstallEvent::Finished`, sent after `guard` has released the run state.
pub fn spawn_installation<A>(
    script: ProvisioningScript,
    args: A,
    guard: RunGuard,
    tx: Sender<InstallEvent>,
) -> JoinHandle<()>
where
    A: ScriptArgs + Send + 'static,
{
    thread::spawn(move || {
        let outcome = run_installation(&script, &args, |entry| {
            // Receiver gone means the UI exited; keep draining so the child can finish
            let _ = tx.send(InstallEvent::Log(entry));
        });
        drop(guard);
        let _ = tx.send(InstallEvent::Finished(outcome));
    })
}

/// Forward lines from `pipe` until EOF. Invalid UTF-8 is replaced, not fatal.
fn spawn_line_reader<R>(pipe: R, tx: Sender<std::io::Result<String>>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                    if tx.send(Ok(line)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(manager: PackageManager, verbose: bool, debug: bool) -> InstallRequest {
        InstallRequest {
            manager,
            verbose,
            debug,
        }
    }

    #[test]
    fn test_cli_args_flags() {
        assert_eq!(
            request(PackageManager::Winget, false, false).to_cli_args(),
            vec!["-PackageManager", "winget"]
        );
        assert_eq!(
            request(PackageManager::Choco, true, true).to_cli_args(),
            vec!["-PackageManager", "choco", "-Debug", "-Verbose"]
        );
    }

    #[test]
    fn test_for_shell_keeps_powershell_arguments() {
        let pwsh = ProvisioningScript::for_shell(Some("/usr/bin/pwsh"), "setup.ps1");
        assert_eq!(pwsh.program, "/usr/bin/pwsh");
        assert_eq!(pwsh.program_args, vec!["-ExecutionPolicy", "Bypass", "-File"]);

        let exe = ProvisioningScript::for_shell(Some("PowerShell.exe"), "setup.ps1");
        assert_eq!(exe.program_args.len(), 3);

        let sh = ProvisioningScript::for_shell(Some("sh"), "setup.sh");
        assert_eq!(sh, ProvisioningScript::with_program("sh", "setup.sh"));

        assert_eq!(
            ProvisioningScript::for_shell(None, DEFAULT_SCRIPT),
            ProvisioningScript::default()
        );
    }

    #[test]
    fn test_default_command_line() {
        let line = ProvisioningScript::default()
            .command_line(&request(PackageManager::Scoop, true, false));
        assert_eq!(
            line,
            vec![
                "powershell",
                "-ExecutionPolicy",
                "Bypass",
                "-File",
                "setup.ps1",
                "-PackageManager",
                "scoop",
                "-Verbose"
            ]
        );
    }

    #[test]
    fn test_run_state_rejects_second_begin() {
        let state = RunState::new();
        let guard = state.try_begin().expect("first begin");
        assert!(state.is_running());
        assert!(state.try_begin().is_none());
        assert!(state.is_running());

        drop(guard);
        assert!(!state.is_running());
        assert!(state.try_begin().is_some());
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            InstallOutcome::Failed { exit_code: Some(2) }.log_message(),
            "Installation failed with code 2"
        );
        assert_eq!(
            InstallOutcome::Errored("boom".into()).log_message(),
            "Error during installation: boom"
        );
        assert_eq!(InstallOutcome::Succeeded.status_text(), "Installation completed");
    }

    #[test]
    fn test_spawn_failure_is_an_outcome() {
        let script = ProvisioningScript::with_program("devsetup-missing-shell", "setup.ps1");
        let mut lines = Vec::new();
        let outcome = run_installation(
            &script,
            &request(PackageManager::Winget, false, false),
            |e| lines.push(e),
        );
        match outcome {
            InstallOutcome::Errored(msg) => {
                assert!(msg.starts_with(
                    "Script execution failed: failed to start devsetup-missing-shell"
                ));
            }
            other => panic!("Expected Errored, got {:?}", other),
        }
        assert!(lines.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_streams_both_pipes_and_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.sh");
        std::fs::write(&path, "echo \"pm=$2\"\necho oops >&2\nexit 4\n").unwrap();

        let script = ProvisioningScript::with_program("sh", &path);
        let mut lines = Vec::new();
        let outcome = run_installation(
            &script,
            &request(PackageManager::Choco, false, false),
            |e| lines.push(e.message),
        );

        assert_eq!(outcome, InstallOutcome::Failed { exit_code: Some(4) });
        lines.sort();
        assert_eq!(lines, vec!["oops".to_string(), "pm=choco".to_string()]);
    }
}
