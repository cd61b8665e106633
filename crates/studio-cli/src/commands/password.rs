//! Password reset subcommands.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};

use studio_core::OperationState;
use studio_core::model::{ForgotPassword, ResetPassword};

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct PasswordCommand {
    #[command(subcommand)]
    pub command: PasswordSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PasswordSubcommand {
    /// Email a password reset link
    Forgot(ForgotArgs),

    /// Check whether a reset token is still valid
    Check(CheckArgs),

    /// Set a new password using a reset token
    Reset(ResetArgs),
}

#[derive(Args, Debug)]
pub struct ForgotArgs {
    #[arg(long)]
    pub email: String,

    /// Print the reset link if the backend returns one (development only)
    #[arg(long)]
    pub show_reset_url: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    pub token: String,
}

#[derive(Args, Debug)]
pub struct ResetArgs {
    pub token: String,

    /// New password
    #[arg(long)]
    pub password: String,

    /// New password, repeated
    #[arg(long)]
    pub confirm: String,
}

pub async fn handle(cmd: PasswordCommand, api: &str) -> Result<()> {
    match cmd.command {
        PasswordSubcommand::Forgot(args) => forgot(args, api).await,
        PasswordSubcommand::Check(args) => check(args, api).await,
        PasswordSubcommand::Reset(args) => reset(args, api).await,
    }
}

async fn forgot(args: ForgotArgs, api: &str) -> Result<()> {
    let request = ForgotPassword::new(args.email)?;
    let client = session::open_client(api)?;

    let response = client
        .forgot_password(&request)
        .await
        .context("Failed to request password reset")?;

    output::success(&response.message);
    if args.show_reset_url
        && let Some(url) = &response.reset_url
    {
        println!();
        output::field("Reset URL", url);
    }

    Ok(())
}

async fn check(args: CheckArgs, api: &str) -> Result<()> {
    let client = session::open_client(api)?;

    match client.verify_reset_token(&args.token).await {
        OperationState::Succeeded(_) => {
            output::success("Reset token is valid");
            Ok(())
        }
        OperationState::Failed(failure) => bail!("{failure}"),
        OperationState::Pending(_) => bail!("Reset token check did not complete"),
    }
}

async fn reset(args: ResetArgs, api: &str) -> Result<()> {
    // Validated before any request is sent.
    let reset = ResetPassword::new(&args.token, &args.password, &args.confirm)?;
    let client = session::open_client(api)?;

    if let OperationState::Failed(failure) = client.verify_reset_token(reset.token()).await {
        bail!("{failure}");
    }

    let message = client
        .reset_password(&reset)
        .await
        .context("Failed to reset password")?;

    output::success(&message);
    eprintln!();
    output::note("Run 'studio auth login' with your new password.");

    Ok(())
}
