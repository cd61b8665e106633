//! studio - command-line client for the studio image-generation API.
//!
//! A thin wrapper over `studio-http`: every command maps onto one or two
//! request client calls, and the session is persisted between runs.

mod cli;
mod commands;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{auth, image, password, payment};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Auth(cmd) => auth::handle(cmd, &cli.api).await,
        Commands::Password(cmd) => password::handle(cmd, &cli.api).await,
        Commands::Image(cmd) => image::handle(cmd, &cli.api).await,
        Commands::Payment(cmd) => payment::handle(cmd, &cli.api).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
