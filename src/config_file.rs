//! Stack configuration file handling.
//!
//! The file maps stack names to package lists:
//!
//! ```json
//! { "stacks": { "web-dev": { "packages": ["nodejs", "git"], "vscodeExtensions": ["esbenp.prettier-vscode"] } } }
//! ```
//!
//! A missing or unparsable file is not an error: the loader logs a warning and
//! returns an empty configuration so the front-end still starts.

use crate::error::{DevSetupError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default config file name, resolved against the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

fn default_enabled() -> bool {
    true
}

/// One stack entry as it appears in the config file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub python_packages: Option<Vec<String>>,
    #[serde(default)]
    pub vscode_extensions: Option<Vec<String>>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            packages: Vec::new(),
            python_packages: None,
            vscode_extensions: None,
        }
    }
}

/// A named stack. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    pub name: String,
    pub config: StackConfig,
}

impl Stack {
    /// Render the stack as the detail text shown on the stacks tab
    pub fn details(&self) -> String {
        let mut details = format!("Stack: {}\n\n", self.name);
        details.push_str(&format!("Packages: {}\n\n", self.config.packages.join(", ")));

        if let Some(ref python) = self.config.python_packages {
            details.push_str(&format!("Python Packages: {}\n\n", python.join(", ")));
        }

        if let Some(ref extensions) = self.config.vscode_extensions {
            details.push_str(&format!("VS Code Extensions: {}\n\n", extensions.join(", ")));
        }

        details
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    stacks: serde_json::Value,
}

/// The loaded configuration: stacks in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupConfig {
    stacks: Vec<Stack>,
}

impl SetupConfig {
    /// Build a configuration directly from stacks
    pub fn from_stacks(stacks: Vec<Stack>) -> Self {
        Self { stacks }
    }

    /// Load from `path`, falling back to an empty configuration
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("No config file at {}, starting with no stacks", path.display());
            return Self::default();
        }

        match Self::load_from_file(path) {
            Ok(config) => {
                tracing::info!(
                    "Loaded {} stack(s) from {}",
                    config.stacks.len(),
                    path.display()
                );
                config
            }
            Err(e) => {
                tracing::warn!("Error loading config: {}", e);
                Self::default()
            }
        }
    }

    /// Load from `path`, failing on unreadable or malformed files
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            DevSetupError::config(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parse configuration JSON
    ///
    /// A stack entry that does not match the schema is skipped with a warning;
    /// the rest of the file still loads.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(content)?;
        let entries = match raw.stacks {
            serde_json::Value::Null => serde_json::Map::new(),
            serde_json::Value::Object(entries) => entries,
            _ => return Err(DevSetupError::config("\"stacks\" must be an object")),
        };

        let mut stacks = Vec::with_capacity(entries.len());
        for (name, value) in entries {
            match serde_json::from_value::<StackConfig>(value) {
                Ok(config) => stacks.push(Stack { name, config }),
                Err(e) => tracing::warn!("Skipping malformed stack '{}': {}", name, e),
            }
        }

        Ok(Self { stacks })
    }

    /// All stacks, including disabled ones
    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    /// Names of enabled stacks, in file order
    pub fn enabled_stack_names(&self) -> Vec<&str> {
        self.stacks
            .iter()
            .filter(|s| s.config.enabled)
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Look up a stack by name
    pub fn stack(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}
