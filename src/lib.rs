//! devsetup library
//!
//! Core of a terminal front-end that provisions a developer workstation: stack
//! configuration, package-manager detection, the provisioning-script launcher
//! and the installation log, plus the TUI built on top of them.

pub mod app;
pub mod cli;
pub mod components;
pub mod config_file;
pub mod detect;
pub mod error;
pub mod install_log;
pub mod launcher;
pub mod script_traits;
pub mod session;
pub mod theme;
pub mod types;
pub mod ui;

// Re-export main types for convenience
pub use config_file::{SetupConfig, Stack, StackConfig};
pub use detect::{CommandProbe, ManagerRegistry, VersionProbe};
pub use error::DevSetupError;
pub use install_log::{InstallLog, LogEntry, LogView};
pub use launcher::{InstallEvent, InstallOutcome, InstallRequest, ProvisioningScript, RunState};
pub use script_traits::ScriptArgs;
pub use session::{Session, StartOutcome};
pub use types::{InstallOptions, ManagerChoice, PackageManager, Setting, Tab};
