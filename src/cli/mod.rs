//! CLI module for pddlsmith - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
