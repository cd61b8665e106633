//! Account subcommands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use studio_core::Credentials;
use studio_core::model::{RegisterRequest, SocialLogin};

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Sign in with a username and password
    Login(LoginArgs),

    /// Sign in with a social provider token
    Social(SocialArgs),

    /// Create a new account
    Register(RegisterArgs),

    /// Forget the stored session
    Logout,

    /// Display the signed-in account
    Whoami,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct SocialArgs {
    /// Provider name, e.g. google
    #[arg(long)]
    pub provider: String,

    /// Access token issued by the provider
    #[arg(long)]
    pub token: String,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,

    #[arg(long)]
    pub email: Option<String>,
}

pub async fn handle(cmd: AuthCommand, api: &str) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Login(args) => login(args, api).await,
        AuthSubcommand::Social(args) => social(args, api).await,
        AuthSubcommand::Register(args) => register(args, api).await,
        AuthSubcommand::Logout => logout(api),
        AuthSubcommand::Whoami => whoami(api).await,
    }
}

async fn login(args: LoginArgs, api: &str) -> Result<()> {
    let client = session::open_client(api)?;
    let credentials = Credentials::new(&args.username, &args.password);

    output::note("Logging in...");

    client
        .login(&credentials)
        .await
        .context("Failed to login")?;
    session::persist(&client)?;

    output::success("Logged in successfully");
    println!();
    output::field("User", &args.username);
    output::field("API", client.base_url().as_str());

    Ok(())
}

async fn social(args: SocialArgs, api: &str) -> Result<()> {
    let client = session::open_client(api)?;
    let login = SocialLogin {
        provider: args.provider,
        access_token: args.token,
    };

    let user = client
        .social_login(&login)
        .await
        .context("Social login failed")?;
    session::persist(&client)?;

    output::success(&format!("Logged in with {}", login.provider));
    if let Some(user) = user {
        println!();
        output::field("User", &user.username);
        if !user.email.is_empty() {
            output::field("Email", &user.email);
        }
    }

    Ok(())
}

async fn register(args: RegisterArgs, api: &str) -> Result<()> {
    let client = session::open_client(api)?;
    let account = RegisterRequest {
        username: args.username,
        email: args.email.filter(|e| !e.trim().is_empty()),
        password: args.password,
    };

    let created = client
        .register(&account)
        .await
        .context("Registration failed")?;

    output::success("Account created");
    println!();
    output::field("User", &created.username);
    if !created.email.is_empty() {
        output::field("Email", &created.email);
    }
    eprintln!();
    eprintln!("{}", "Run 'studio auth login' to sign in.".dimmed());

    Ok(())
}

fn logout(api: &str) -> Result<()> {
    let client = session::open_client(api)?;
    client.logout();

    if session::forget(&client)? {
        output::success("Logged out");
    } else {
        output::note(&format!("No session stored for {}", client.base_url()));
    }
    Ok(())
}

async fn whoami(api: &str) -> Result<()> {
    let client = session::open_client(api)?;
    session::require_login(&client)?;

    let profile = match client.me().await {
        Ok(profile) => profile,
        Err(e) if e.is_unauthorized() => {
            return Err(e).context("Session is no longer valid. Run 'studio auth login' again.");
        }
        Err(e) => return Err(e).context("Failed to fetch profile"),
    };

    output::field("User", &profile.username);
    if !profile.email.is_empty() {
        output::field("Email", &profile.email);
    }
    output::field("Credits", &profile.profile.credits.to_string());
    output::field(
        "Images generated",
        &profile.profile.total_images_generated.to_string(),
    );
    output::field("API", client.base_url().as_str());

    Ok(())
}
