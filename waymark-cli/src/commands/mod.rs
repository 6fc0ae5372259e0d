//! CLI command implementations.
//!
//! Each subcommand lives in its own module with an `Args` struct and a
//! `run` function that takes the parsed arguments and the global options.

pub mod common;
pub mod config;
pub mod inspect;
pub mod navigate;
pub mod render;
pub mod view;
