// Command-line interface for devsetup.
//
// This file is also pulled into build.rs with include!, so it must only
// reference clap, clap_complete and std.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Values accepted by `install --manager`
pub const MANAGER_VALUES: [&str; 4] = ["auto", "choco", "scoop", "winget"];

/// devsetup - set up a development environment from predefined tool stacks
#[derive(Parser, Debug)]
#[command(name = "devsetup")]
#[command(about = "Set up a development environment from predefined tool stacks")]
#[command(version)]
pub struct Cli {
    /// Stack configuration file
    #[arg(long, global = true, value_name = "FILE", default_value = "config.json")]
    pub config: PathBuf,

    /// Provisioning script handed to the shell
    #[arg(long, global = true, value_name = "FILE", default_value = "setup.ps1")]
    pub script: PathBuf,

    /// Interpreter for the script (default: powershell).
    ///
    /// `powershell` and `pwsh` get `-ExecutionPolicy Bypass -File`; any other
    /// program is run as `<program> <script> ...`.
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub shell: Option<String>,

    /// Skip package-manager detection at startup
    #[arg(long, global = true)]
    pub no_probe: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe the supported package managers and print their versions
    Detect,
    /// List the stacks defined in the configuration file
    Stacks {
        /// Include stacks marked as disabled
        #[arg(long)]
        all: bool,
    },
    /// Print the packages of one stack
    Show {
        /// Stack name
        stack: String,
    },
    /// Run the provisioning script without the TUI
    Install {
        /// Package manager to use
        #[arg(short, long, default_value = "auto", value_parser = MANAGER_VALUES)]
        manager: String,
        /// Stack to set up (repeatable)
        #[arg(short, long = "stack", value_name = "NAME")]
        stacks: Vec<String>,
        /// Pass -Debug to the script
        #[arg(long)]
        debug: bool,
        /// Do not pass -Verbose to the script
        #[arg(short, long)]
        quiet: bool,
        /// Print what would run without starting the script
        #[arg(long)]
        dry_run: bool,
    },
    /// Generate shell completions on stdout
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_no_args() {
        // No subcommand means TUI mode
        let cli = Cli::try_parse_from(["devsetup"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert_eq!(cli.script, PathBuf::from("setup.ps1"));
        assert!(cli.shell.is_none());
        assert!(!cli.no_probe);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "devsetup",
            "stacks",
            "--config",
            "/tmp/stacks.json",
            "--no-probe",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/tmp/stacks.json"));
        assert!(cli.no_probe);
        assert!(matches!(cli.command, Some(Commands::Stacks { all: false })));
    }

    #[test]
    fn test_cli_install_options() {
        let cli = Cli::try_parse_from([
            "devsetup",
            "install",
            "--manager",
            "scoop",
            "--stack",
            "web-dev",
            "-s",
            "data-science",
            "--debug",
            "--quiet",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Install {
                manager,
                stacks,
                debug,
                quiet,
                dry_run,
            }) => {
                assert_eq!(manager, "scoop");
                assert_eq!(stacks, vec!["web-dev", "data-science"]);
                assert!(debug);
                assert!(quiet);
                assert!(!dry_run);
            }
            other => panic!("Expected Install command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_manager() {
        assert!(Cli::try_parse_from(["devsetup", "install", "--manager", "apt"]).is_err());
    }

    #[test]
    fn test_cli_show_requires_stack() {
        assert!(Cli::try_parse_from(["devsetup", "show"]).is_err());
        let cli = Cli::try_parse_from(["devsetup", "show", "web-dev"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Show { stack }) if stack == "web-dev"));
    }

    #[test]
    fn test_cli_completions_shell() {
        let cli = Cli::try_parse_from(["devsetup", "completions", "zsh"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Completions { shell: Shell::Zsh })));
    }
}
