use clap::CommandFactory;
use clap_complete::generate_to;
use std::env;
use std::fs;

// Brings in `Cli` along with its `Shell` and `PathBuf` imports
include!("src/cli.rs");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").ok_or("OUT_DIR not set")?);
    let mut cmd = Cli::command();

    // Man page
    let man = clap_mangen::Man::new(cmd.clone());
    let mut buffer: Vec<u8> = Vec::new();
    man.render(&mut buffer)?;
    fs::write(out_dir.join("devsetup.1"), buffer)?;

    // Shell completions
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell] {
        generate_to(shell, &mut cmd, "devsetup", &out_dir)?;
    }

    Ok(())
}
