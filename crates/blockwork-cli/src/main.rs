//! Blockwork CLI - discover, register, and scaffold blocks.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config_bridge;
mod theme;

use commands::verify::Toggle;
use commands::{create, init, setup, verify};
use config_bridge::SetupOverrides;
use theme::Theme;

/// Blockwork - block discovery and composition
#[derive(Parser, Debug)]
#[command(name = "blockwork")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover blocks and update the registry
    Setup {
        /// Blocks folder, relative to the working directory
        #[arg(long)]
        folder: Option<String>,

        /// Install new block requirements
        #[arg(short = 'A', long)]
        auto_install: bool,

        /// Record a content hash for every block
        #[arg(short = 'S', long)]
        save_hashes: bool,

        /// Check block hashes when the application starts
        #[arg(short = 'V', long)]
        verify_blocks: bool,
    },

    /// Scaffold a new block
    Create {
        /// Block name (3-32 letters, digits, or underscores)
        name: String,

        /// Run setup after creating the block
        #[arg(long)]
        setup: bool,
    },

    /// Scaffold a starter project with a homepage block
    Init,

    /// Turn activation-time integrity checks on or off
    Verify {
        /// `on` or `off`
        #[arg(value_enum)]
        state: Toggle,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", Theme::error(&format!("{e:#}")));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let working_dir = std::env::current_dir()?;

    let cfg = match blockwork_config::load(&working_dir, None) {
        Ok(resolved) => resolved.config,
        Err(e) => {
            eprintln!("{}", Theme::warning(&format!("Using default configuration: {e}")));
            blockwork_config::defaults()?
        },
    };

    let mut log_config = config_bridge::to_log_config(&cfg);
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = blockwork_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match cli.command {
        Commands::Setup {
            folder,
            auto_install,
            save_hashes,
            verify_blocks,
        } => {
            let overrides = SetupOverrides {
                folder,
                auto_install,
                save_hashes,
                verify_blocks,
            };
            setup::run_setup(&working_dir, &cfg, &overrides)?;
        },
        Commands::Create { name, setup: then_setup } => {
            create::run_create(&working_dir, &cfg.blocks.folder, &name)?;
            if then_setup {
                setup::run_setup(&working_dir, &cfg, &SetupOverrides::default())?;
            }
        },
        Commands::Init => init::run_init(&working_dir, &cfg.blocks.folder)?,
        Commands::Verify { state } => verify::run_verify(&working_dir, state)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_short_flags() {
        let cli = Cli::try_parse_from(["blockwork", "setup", "-A", "-S", "--folder", "plugins"]).unwrap();
        match cli.command {
            Commands::Setup {
                folder,
                auto_install,
                save_hashes,
                verify_blocks,
            } => {
                assert_eq!(folder.as_deref(), Some("plugins"));
                assert!(auto_install);
                assert!(save_hashes);
                assert!(!verify_blocks);
            },
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn create_with_setup() {
        let cli = Cli::try_parse_from(["blockwork", "create", "blog", "--setup"]).unwrap();
        assert!(matches!(cli.command, Commands::Create { ref name, setup: true } if name == "blog"));
    }

    #[test]
    fn verify_accepts_on_and_off_only() {
        let cli = Cli::try_parse_from(["blockwork", "verify", "on"]).unwrap();
        assert!(matches!(cli.command, Commands::Verify { state: Toggle::On }));
        assert!(Cli::try_parse_from(["blockwork", "verify", "maybe"]).is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["blockwork"]).is_err());
    }
}
