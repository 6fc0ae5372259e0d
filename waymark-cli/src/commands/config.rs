//! Configuration management CLI commands.
//!
//! Provides `config init`, `config path` and `config show` for creating and
//! inspecting the INI configuration file.

use std::path::PathBuf;

use clap::Subcommand;
use waymark::config::{config_file_path, ConfigFile};

use crate::error::CliError;
use crate::runner::GlobalOptions;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the configuration file path
    Path,

    /// Print the effective configuration
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, options: &GlobalOptions) -> Result<(), CliError> {
    let path = options.config.clone().unwrap_or_else(config_file_path);
    match command {
        ConfigCommands::Init { force } => run_init(path, force),
        ConfigCommands::Path => run_path(path),
        ConfigCommands::Show => run_show(path),
    }
}

/// Create the configuration file with default values.
fn run_init(path: PathBuf, force: bool) -> Result<(), CliError> {
    if force {
        ConfigFile::default().save_to(&path)?;
        println!("Wrote default configuration to {}", path.display());
    } else if ConfigFile::ensure_exists_at(&path)? {
        println!("Created {}", path.display());
    } else {
        println!("{} already exists (use --force to overwrite)", path.display());
    }
    Ok(())
}

/// Show the configuration file path.
fn run_path(path: PathBuf) -> Result<(), CliError> {
    println!("{}", path.display());
    Ok(())
}

/// Print the loaded configuration, defaults filled in.
fn run_show(path: PathBuf) -> Result<(), CliError> {
    let config = ConfigFile::load_from(&path)?;
    if !path.exists() {
        println!("# {} not found, showing defaults", path.display());
    }
    print!("{}", config.to_ini_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_then_keeps_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        run_init(path.clone(), false).unwrap();
        assert!(path.exists());

        std::fs::write(&path, "[viewport]\nzoom = 12\n").unwrap();
        run_init(path.clone(), false).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[viewport]\nzoom = 12\n"
        );

        run_init(path.clone(), true).unwrap();
        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_show_reports_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[viewport]\nmode = sideways\n").unwrap();

        let err = run_show(path).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
