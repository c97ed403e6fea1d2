//! Package-manager detection and selection
//!
//! Probes each known package manager with `<manager> --version` under a short
//! timeout and records the ones that answer. Detection never fails as a whole:
//! a manager that is missing, exits non-zero or hangs is simply left out of the
//! registry.
//!
//! # Integration
//!
//! Call `ManagerRegistry::detect()` at startup before presenting the TUI. The
//! registry is point-in-time; it goes stale if a manager is installed mid-session
//! until the user asks for a re-probe.

use crate::error::{DevSetupError, Result};
use crate::types::{ManagerChoice, PackageManager};
use std::collections::BTreeMap;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use strum::IntoEnumIterator;

/// Timeout applied to each version probe
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Auto-selection priority, highest first
pub const AUTO_PRIORITY: [PackageManager; 3] = [
    PackageManager::Choco,
    PackageManager::Winget,
    PackageManager::Scoop,
];

/// Manager used when auto-selection finds nothing installed
pub const FALLBACK_MANAGER: PackageManager = PackageManager::Winget;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Source of package-manager version strings.
///
/// `CommandProbe` asks the real executables; tests substitute a table.
pub trait VersionProbe {
    /// Return the reported version, or an error if the manager is unusable.
    fn probe(&self, manager: PackageManager) -> Result<String>;
}

/// Probe that runs `<executable> --version` with a timeout
#[derive(Debug, Clone)]
pub struct CommandProbe {
    pub timeout: Duration,
}

impl Default for CommandProbe {
    fn default() -> Self {
        Self {
            timeout: PROBE_TIMEOUT,
        }
    }
}

impl VersionProbe for CommandProbe {
    fn probe(&self, manager: PackageManager) -> Result<String> {
        run_version_query(manager.executable(), &["--version"], self.timeout)
    }
}

/// Run `program args…` and return its trimmed stdout if it exits 0 within `timeout`.
///
/// A process still running at the deadline is killed and reaped.
pub fn run_version_query(program: &str, args: &[&str], timeout: Duration) -> Result<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| DevSetupError::probe(format!("{}: {}", program, e)))?;

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(DevSetupError::probe(format!(
                    "{} did not answer within {:?}",
                    program, timeout
                )));
            }
            None => std::thread::sleep(POLL_INTERVAL),
        }
    };

    if !status.success() {
        return Err(DevSetupError::probe(format!(
            "{} exited with code {}",
            program,
            status.code().unwrap_or(-1)
        )));
    }

    let mut stdout = String::new();
    if let Some(mut pipe) = child.stdout.take() {
        pipe.read_to_string(&mut stdout)?;
    }

    Ok(stdout.trim().to_string())
}

/// Detected package managers and their versions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerRegistry {
    versions: BTreeMap<PackageManager, String>,
}

impl ManagerRegistry {
    /// Probe all known managers with the real executables
    pub fn detect() -> Self {
        Self::detect_with(&CommandProbe::default())
    }

    /// Probe all known managers through `probe`
    pub fn detect_with<P: VersionProbe + ?Sized>(probe: &P) -> Self {
        let mut versions = BTreeMap::new();
        for manager in PackageManager::iter() {
            match probe.probe(manager) {
                Ok(version) => {
                    tracing::info!("Detected {} {}", manager, version);
                    versions.insert(manager, version);
                }
                Err(e) => tracing::debug!("{} not available: {}", manager, e),
            }
        }
        Self { versions }
    }

    /// Build a registry from known entries
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (PackageManager, String)>,
    {
        Self {
            versions: entries.into_iter().collect(),
        }
    }

    pub fn contains(&self, manager: PackageManager) -> bool {
        self.versions.contains_key(&manager)
    }

    pub fn version(&self, manager: PackageManager) -> Option<&str> {
        self.versions.get(&manager).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PackageManager, &str)> {
        self.versions.iter().map(|(pm, v)| (*pm, v.as_str()))
    }

    /// Best detected manager, or the fallback when none was detected.
    ///
    /// The fallback is returned even if it is not installed; the provisioning
    /// script then reports the failure.
    pub fn best_available(&self) -> PackageManager {
        AUTO_PRIORITY
            .into_iter()
            .find(|pm| self.contains(*pm))
            .unwrap_or(FALLBACK_MANAGER)
    }

    /// Resolve the user's choice to a concrete manager
    pub fn resolve(&self, choice: ManagerChoice) -> PackageManager {
        match choice {
            ManagerChoice::Auto => self.best_available(),
            ManagerChoice::Manager(pm) => pm,
        }
    }

    /// One-line summary for the status bar
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "No package managers detected".to_string();
        }
        self.iter()
            .map(|(pm, version)| format!("{}: {}", pm, version))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct TableProbe(HashMap<PackageManager, Result<String>>);

    impl VersionProbe for TableProbe {
        fn probe(&self, manager: PackageManager) -> Result<String> {
            match self.0.get(&manager) {
                Some(Ok(v)) => Ok(v.clone()),
                Some(Err(e)) => Err(DevSetupError::probe(e.to_string())),
                None => Err(DevSetupError::probe("not found")),
            }
        }
    }

    #[test]
    fn test_failed_probes_are_omitted() {
        let mut table = HashMap::new();
        table.insert(PackageManager::Choco, Ok("2.2.2".to_string()));
        table.insert(PackageManager::Scoop, Err(DevSetupError::probe("exited with code 1")));
        let registry = ManagerRegistry::detect_with(&TableProbe(table));

        assert!(registry.contains(PackageManager::Choco));
        assert!(!registry.contains(PackageManager::Scoop));
        assert!(!registry.contains(PackageManager::Winget));
        assert_eq!(registry.version(PackageManager::Choco), Some("2.2.2"));
    }

    #[test]
    fn test_auto_prefers_choco_then_winget_then_scoop() {
        let all = ManagerRegistry::from_entries([
            (PackageManager::Scoop, "0.5".to_string()),
            (PackageManager::Winget, "v1.7".to_string()),
            (PackageManager::Choco, "2.2".to_string()),
        ]);
        assert_eq!(all.best_available(), PackageManager::Choco);

        let no_choco = ManagerRegistry::from_entries([
            (PackageManager::Scoop, "0.5".to_string()),
            (PackageManager::Winget, "v1.7".to_string()),
        ]);
        assert_eq!(no_choco.best_available(), PackageManager::Winget);

        let scoop_only = ManagerRegistry::from_entries([(PackageManager::Scoop, "0.5".to_string())]);
        assert_eq!(scoop_only.best_available(), PackageManager::Scoop);
    }

    #[test]
    fn test_auto_falls_back_when_nothing_detected() {
        let empty = ManagerRegistry::default();
        assert_eq!(empty.best_available(), FALLBACK_MANAGER);
        assert_eq!(empty.resolve(ManagerChoice::Auto), PackageManager::Winget);
    }

    #[test]
    fn test_explicit_choice_ignores_registry() {
        let registry = ManagerRegistry::from_entries([(PackageManager::Choco, "2.2".to_string())]);
        assert_eq!(
            registry.resolve(ManagerChoice::Manager(PackageManager::Scoop)),
            PackageManager::Scoop
        );
    }

    #[test]
    fn test_summary() {
        assert_eq!(ManagerRegistry::default().summary(), "No package managers detected");
        let registry = ManagerRegistry::from_entries([
            (PackageManager::Winget, "v1.7".to_string()),
            (PackageManager::Choco, "2.2".to_string()),
        ]);
        assert_eq!(registry.summary(), "choco: 2.2 | winget: v1.7");
    }

    #[test]
    fn test_version_query_missing_executable() {
        let result = run_version_query(
            "devsetup-no-such-manager",
            &["--version"],
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(DevSetupError::Probe(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_version_query_success_is_trimmed() {
        let version =
            run_version_query("sh", &["-c", "echo '  1.2.3  '"], Duration::from_secs(5)).unwrap();
        assert_eq!(version, "1.2.3");
    }

    #[cfg(unix)]
    #[test]
    fn test_version_query_nonzero_exit() {
        let result = run_version_query("sh", &["-c", "echo 1.0; exit 3"], Duration::from_secs(5));
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_version_query_timeout_kills_probe() {
        let start = Instant::now();
        let result = run_version_query("sh", &["-c", "sleep 30"], Duration::from_millis(200));
        assert!(result.is_err());
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
