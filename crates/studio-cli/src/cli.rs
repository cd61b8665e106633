//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::auth::AuthCommand;
use crate::commands::image::ImageCommand;
use crate::commands::password::PasswordCommand;
use crate::commands::payment::PaymentCommand;

/// Backend used when neither `--api` nor `STUDIO_API_URL` is given.
pub const DEFAULT_API: &str = "http://localhost:8000/api";

/// Command-line client for the studio image-generation API.
#[derive(Parser, Debug)]
#[command(name = "studio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL
    #[arg(long, global = true, env = "STUDIO_API_URL", default_value = DEFAULT_API)]
    pub api: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in, sign out and inspect the account
    Auth(AuthCommand),

    /// Request and redeem password resets
    Password(PasswordCommand),

    /// Generate and inspect images
    Image(ImageCommand),

    /// Buy credits and verify payments
    Payment(PaymentCommand),
}
