//! Type-safe domain types for devsetup
//!
//! Package managers, the user's manager choice, TUI tabs, settings toggles and
//! the individual tool catalog. Strings only appear at the edges (CLI args,
//! script arguments, config files).

use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// Package managers the front-end knows how to probe and hand to the script.
///
/// Declaration order is the probe and display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Display, EnumString, EnumIter)]
pub enum PackageManager {
    #[strum(serialize = "choco")]
    Choco,
    #[strum(serialize = "scoop")]
    Scoop,
    #[strum(serialize = "winget")]
    Winget,
}

impl PackageManager {
    /// Executable name used for the version probe
    pub fn executable(self) -> &'static str {
        match self {
            Self::Choco => "choco",
            Self::Scoop => "scoop",
            Self::Winget => "winget",
        }
    }

    /// Human-readable name for the TUI
    pub fn label(self) -> &'static str {
        match self {
            Self::Choco => "Chocolatey",
            Self::Scoop => "Scoop",
            Self::Winget => "Winget",
        }
    }
}

/// The user's package-manager selection: a concrete manager or "auto".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManagerChoice {
    #[default]
    Auto,
    Manager(PackageManager),
}

impl ManagerChoice {
    /// All choices in the order the setup tab lists them
    pub fn all() -> [ManagerChoice; 4] {
        [
            Self::Auto,
            Self::Manager(PackageManager::Choco),
            Self::Manager(PackageManager::Scoop),
            Self::Manager(PackageManager::Winget),
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Auto => "Auto-detect (Recommended)",
            Self::Manager(pm) => pm.label(),
        }
    }
}

impl fmt::Display for ManagerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Manager(pm) => write!(f, "{}", pm),
        }
    }
}

impl FromStr for ManagerChoice {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            PackageManager::from_str(&s.to_ascii_lowercase()).map(Self::Manager)
        }
    }
}

/// Top-level tabs of the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Display, EnumIter)]
pub enum Tab {
    #[default]
    #[strum(serialize = "Quick Setup")]
    Setup,
    #[strum(serialize = "Stacks")]
    Stacks,
    #[strum(serialize = "Tools")]
    Tools,
    #[strum(serialize = "Settings")]
    Settings,
    #[strum(serialize = "Log")]
    Log,
}

/// Toggles on the settings tab
///
/// Only `DetailedLogging` and `DebugMode` change the provisioning command line;
/// the rest are shown in the dry-run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumIter)]
pub enum Setting {
    #[strum(serialize = "Auto-detect existing installations")]
    AutoDetectExisting,
    #[strum(serialize = "Skip if already installed")]
    SkipInstalled,
    #[strum(serialize = "Create desktop shortcuts")]
    DesktopShortcuts,
    #[strum(serialize = "Setup PATH environment variables")]
    SetupPath,
    #[strum(serialize = "Configure Git editor")]
    ConfigureGit,
    #[strum(serialize = "Enable detailed logging")]
    DetailedLogging,
    #[strum(serialize = "Debug mode")]
    DebugMode,
}

/// Settings-tab values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOptions {
    pub auto_detect_existing: bool,
    pub skip_installed: bool,
    pub desktop_shortcuts: bool,
    pub setup_path: bool,
    pub configure_git: bool,
    pub detailed_logging: bool,
    pub debug_mode: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            auto_detect_existing: true,
            skip_installed: true,
            desktop_shortcuts: false,
            setup_path: true,
            configure_git: true,
            detailed_logging: true,
            debug_mode: false,
        }
    }
}

impl InstallOptions {
    pub fn get(&self, setting: Setting) -> bool {
        match setting {
            Setting::AutoDetectExisting => self.auto_detect_existing,
            Setting::SkipInstalled => self.skip_installed,
            Setting::DesktopShortcuts => self.desktop_shortcuts,
            Setting::SetupPath => self.setup_path,
            Setting::ConfigureGit => self.configure_git,
            Setting::DetailedLogging => self.detailed_logging,
            Setting::DebugMode => self.debug_mode,
        }
    }

    pub fn toggle(&mut self, setting: Setting) {
        let slot = match setting {
            Setting::AutoDetectExisting => &mut self.auto_detect_existing,
            Setting::SkipInstalled => &mut self.skip_installed,
            Setting::DesktopShortcuts => &mut self.desktop_shortcuts,
            Setting::SetupPath => &mut self.setup_path,
            Setting::ConfigureGit => &mut self.configure_git,
            Setting::DetailedLogging => &mut self.detailed_logging,
            Setting::DebugMode => &mut self.debug_mode,
        };
        *slot = !*slot;
    }
}

/// Individual tools offered on the tools tab, grouped by category
pub const TOOL_CATALOG: &[(&str, &[&str])] = &[
    ("Code Editors", &["vscode", "cursor", "sublime-text", "atom"]),
    ("Version Control", &["git", "github-desktop", "sourcetree"]),
    ("Languages", &["python", "nodejs", "java", "go", "rust"]),
    ("Databases", &["mysql", "postgresql", "mongodb", "redis"]),
    ("Containers", &["docker-desktop", "kubernetes-cli"]),
    ("Cloud Tools", &["azure-cli", "aws-cli", "terraform"]),
    ("Utilities", &["7zip", "winscp", "putty", "wireshark"]),
];

/// Flatten the catalog into `(category, tool)` rows in display order
pub fn tool_rows() -> Vec<(&'static str, &'static str)> {
    TOOL_CATALOG
        .iter()
        .flat_map(|(category, tools)| tools.iter().map(move |tool| (*category, *tool)))
        .collect()
}
