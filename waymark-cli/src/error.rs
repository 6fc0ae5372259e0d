//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use waymark::config::ConfigFileError;
use waymark::coord::CoordError;
use waymark::source::TileError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Invalid command-line input
    InvalidInput(String),
    /// Coordinates that cannot be mapped to a tile
    Coordinates(CoordError),
    /// Failed to read, decode or render a tile
    Tile(TileError),
    /// Failed to read an input file
    FileRead { path: PathBuf, error: std::io::Error },
    /// Failed to write an output file
    FileWrite { path: PathBuf, error: String },
    /// Failed to start the background worker runtime
    Runtime(std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidInput(_) | CliError::Coordinates(_) => 2,
            CliError::Config(_) => 3,
            CliError::Tile(e) if e.is_absent() => 4,
            CliError::Tile(_) => 5,
            CliError::LoggingInit(_)
            | CliError::FileRead { .. }
            | CliError::FileWrite { .. }
            | CliError::Runtime(_) => 1,
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Tile(e) if e.is_absent() => {
                eprintln!();
                eprintln!("Check that [map] root in the config file points at the map directory,");
                eprintln!("or pass --map <DIR>. Run 'waymark config path' to locate the file.");
            }
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Run 'waymark config init --force' to write a fresh default file.");
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Coordinates(e) => write!(f, "Invalid coordinates: {}", e),
            CliError::Tile(e) => write!(f, "Tile error: {}", e),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path.display(), error)
            }
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path.display(), error)
            }
            CliError::Runtime(e) => write!(f, "Failed to start worker runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Coordinates(e) => Some(e),
            CliError::Tile(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coordinates(e)
    }
}

impl From<TileError> for CliError {
    fn from(e: TileError) -> Self {
        CliError::Tile(e)
    }
}
