//! devsetup - main entry point
//!
//! Without a subcommand the interactive TUI starts; the subcommands expose the
//! same session operations for scripting.

use anyhow::{Context, Result};
use clap::CommandFactory;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::File;
use std::io::stdout;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use devsetup::app::App;
use devsetup::cli::{Cli, Commands};
use devsetup::config_file::SetupConfig;
use devsetup::detect::ManagerRegistry;
use devsetup::error::DevSetupError;
use devsetup::launcher::ProvisioningScript;
use devsetup::session::{Session, StartOutcome};
use devsetup::types::ManagerChoice;

const TUI_LOG_FILE: &str = "devsetup-tui.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Subcommands log to stderr
fn init_cli_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// The TUI owns the screen, so its logs go to a file in the temp directory
fn init_tui_logging() {
    let path = std::env::temp_dir().join(TUI_LOG_FILE);
    match File::create(&path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        // Without a log file, stay silent rather than draw over the TUI
        Err(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("off"))
            .init(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    if cli.command.is_some() {
        init_cli_logging();
    } else {
        init_tui_logging();
    }
    info!("devsetup {} starting up", env!("CARGO_PKG_VERSION"));

    if let Some(Commands::Completions { shell }) = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "devsetup", &mut stdout());
        return Ok(());
    }

    let config = SetupConfig::load_or_default(&cli.config);
    let registry = if cli.no_probe {
        debug!("Skipping package manager detection");
        ManagerRegistry::default()
    } else {
        ManagerRegistry::detect()
    };
    let script = ProvisioningScript::for_shell(cli.shell.as_deref(), cli.script.clone());
    let session = Session::new(config, registry, script);

    match cli.command {
        None => run_tui(session),
        Some(Commands::Detect) => {
            print_managers(&session);
            Ok(())
        }
        Some(Commands::Stacks { all }) => {
            print_stacks(&session, all);
            Ok(())
        }
        Some(Commands::Show { stack }) => match session.stack_details(&stack) {
            Some(details) => {
                print!("{}", details);
                Ok(())
            }
            None => {
                error!("Unknown stack: {}", stack);
                eprintln!("Unknown stack: {}", stack);
                std::process::exit(1);
            }
        },
        Some(Commands::Install {
            manager,
            stacks,
            debug,
            quiet,
            dry_run,
        }) => run_install(session, &manager, &stacks, debug, quiet, dry_run),
        Some(Commands::Completions { .. }) => Ok(()),
    }
}

fn print_managers(session: &Session) {
    let registry = session.registry();
    if registry.is_empty() {
        println!("No package managers detected");
        return;
    }
    for (manager, version) in registry.iter() {
        println!("{:<8} {}", manager, version);
    }
}

fn print_stacks(session: &Session, all: bool) {
    let config = session.config();
    if config.is_empty() {
        println!("No stacks available in the configuration file");
        return;
    }
    for stack in config.stacks() {
        if stack.config.enabled {
            println!("{}", stack.name);
        } else if all {
            println!("{} (disabled)", stack.name);
        }
    }
}

fn run_install(
    mut session: Session,
    manager: &str,
    stacks: &[String],
    debug: bool,
    quiet: bool,
    dry_run: bool,
) -> Result<()> {
    session.choice = ManagerChoice::from_str(manager)
        .with_context(|| format!("Unknown package manager: {}", manager))?;
    session.options.detailed_logging = !quiet;
    session.options.debug_mode = debug;

    for stack in stacks {
        if !session.setup_stack(stack) {
            warn!("Stack '{}' is not defined in the configuration file", stack);
        }
    }

    if dry_run {
        session.dry_run();
        for line in session.log().lines() {
            println!("{}", line);
        }
        return Ok(());
    }

    for line in session.log().lines() {
        println!("{}", line);
    }

    match session.start_installation() {
        StartOutcome::Started(pm) => info!("Installing with {}", pm),
        StartOutcome::AlreadyRunning => return Ok(()),
    }

    let outcome = session.run_to_completion(|entry| println!("{}", entry));
    match outcome {
        Some(outcome) if outcome.is_success() => Ok(()),
        Some(outcome) => {
            error!("{}", outcome.log_message());
            std::process::exit(1);
        }
        None => anyhow::bail!("Installation worker stopped without reporting a result"),
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(stdout(), LeaveAlternateScreen);
}

/// Restore the terminal before exiting on SIGTERM/SIGHUP
#[cfg(unix)]
fn init_signal_handlers() -> std::io::Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGTERM, SIGHUP])?;
    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            let name = if sig == SIGTERM { "SIGTERM" } else { "SIGHUP" };
            info!("Received {}, restoring terminal", name);
            restore_terminal();
            std::process::exit(128 + sig);
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn init_signal_handlers() -> std::io::Result<()> {
    Ok(())
}

fn run_tui(session: Session) -> Result<()> {
    debug!("Initializing terminal for TUI mode");

    if let Err(e) = init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }

    enable_raw_mode()
        .map_err(|e| DevSetupError::terminal(format!("Failed to enable raw mode: {}", e)))?;
    if let Err(e) = crossterm::execute!(stdout(), EnterAlternateScreen) {
        restore_terminal();
        let err = DevSetupError::terminal(format!("Failed to enter alternate screen: {}", e));
        return Err(err.into());
    }

    let result = match Terminal::new(CrosstermBackend::new(stdout())) {
        Ok(mut terminal) => {
            let mut app = App::new(session);
            app.run(&mut terminal).map_err(anyhow::Error::from)
        }
        Err(e) => {
            Err(DevSetupError::terminal(format!("Failed to create terminal: {}", e)).into())
        }
    };

    // Always attempt cleanup, even if the app failed
    restore_terminal();

    if let Err(ref e) = result {
        error!("TUI exited with error: {:#}", e);
    }
    result
}
