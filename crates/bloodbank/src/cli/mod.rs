//! Command-line interface for bloodbank.
//!
//! This module provides the CLI structure for the `bbank` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AnswerArg, ConfigCommand, ContactArgs, ContactCommand, DonorCommand, EligibilityCommand,
    FormKind, InventoryCommand, OutputFormat, QuestionnaireArgs, RecipientCommand,
    RegisterDonorArgs, RegisterRecipientArgs, RequestCommand, SearchArgs, StatusCommand,
    SubmitRequestArgs, ThemeArg, ThemeCommand, UrgencyArg, ValidateCommand,
};

/// bbank - Blood bank records on the command line
///
/// Register donors and recipients, file blood requests, screen donor
/// eligibility and track blood inventory.
#[derive(Debug, Parser)]
#[command(name = "bbank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Seed starter data into an empty store
    Init,

    /// Browse and register donors
    #[command(subcommand)]
    Donors(DonorCommand),

    /// Browse and register recipients
    #[command(subcommand)]
    Recipients(RecipientCommand),

    /// File and list blood requests
    #[command(subcommand)]
    Requests(RequestCommand),

    /// Send a contact message
    #[command(subcommand)]
    Contact(ContactCommand),

    /// Inspect and adjust blood inventory
    #[command(subcommand)]
    Inventory(InventoryCommand),

    /// Screen donor eligibility
    #[command(subcommand)]
    Eligibility(EligibilityCommand),

    /// Check field values against a form's rules
    Validate(ValidateCommand),

    /// Show or change the stored theme
    #[command(subcommand)]
    Theme(ThemeCommand),

    /// Show store summary
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
