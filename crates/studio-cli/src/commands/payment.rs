//! Credit purchase subcommands.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use colored::Colorize;

use studio_core::OperationState;
use studio_core::model::{CreditPackage, Gateway, PaymentNext, PaymentRequest};

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct PaymentCommand {
    #[command(subcommand)]
    pub command: PaymentSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PaymentSubcommand {
    /// List credit packages and gateways
    Packages,

    /// Start a credit purchase
    Buy(BuyArgs),

    /// Verify a payment from the gateway's return URL
    Verify(VerifyArgs),

    /// List your payment transactions
    List,
}

#[derive(Args, Debug)]
pub struct BuyArgs {
    /// khalti, esewa, stripe, razorpay or binance
    #[arg(long)]
    pub gateway: Gateway,

    /// Package price, see `studio payment packages`
    #[arg(long)]
    pub amount: u32,

    /// Where the gateway sends the payer afterwards
    #[arg(long)]
    pub return_url: String,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Full return URL, or just its query string
    pub callback_url: String,
}

pub async fn handle(cmd: PaymentCommand, api: &str) -> Result<()> {
    match cmd.command {
        PaymentSubcommand::Packages => {
            packages();
            Ok(())
        }
        PaymentSubcommand::Buy(args) => buy(args, api).await,
        PaymentSubcommand::Verify(args) => verify(args, api).await,
        PaymentSubcommand::List => list(api).await,
    }
}

fn packages() {
    println!("{}", "Packages".bold());
    for package in CreditPackage::CATALOGUE {
        println!("  {:>4}  {:>5} credits", package.amount, package.credits);
    }
    println!();
    println!("{}", "Gateways".bold());
    for gateway in Gateway::ALL {
        println!("  {:<10} {}", gateway.as_str(), gateway.display_name().dimmed());
    }
}

async fn buy(args: BuyArgs, api: &str) -> Result<()> {
    let package = CreditPackage::find(args.amount).with_context(|| {
        format!(
            "No package costs {}. Run 'studio payment packages' to see the options.",
            args.amount
        )
    })?;
    let request = PaymentRequest::for_package(args.gateway, package, args.return_url);
    request.validate()?;

    let client = session::open_client(api)?;
    session::require_login(&client)?;

    let receipt = client
        .create_payment(&request)
        .await
        .context("Failed to create payment")?;

    output::field("Transaction", &receipt.transaction_id);
    output::field("Gateway", args.gateway.display_name());
    output::field("Credits", &package.credits.to_string());

    match receipt.next()? {
        PaymentNext::Redirect(url) => {
            println!();
            output::field("Pay at", &url);
        }
        PaymentNext::Gateway(data) => {
            println!();
            output::note("Gateway checkout data:");
            output::json_pretty(&data)?;
        }
    }

    eprintln!();
    output::note("After paying, run 'studio payment verify <RETURN_URL>'.");
    Ok(())
}

async fn verify(args: VerifyArgs, api: &str) -> Result<()> {
    let client = session::open_client(api)?;
    session::require_login(&client)?;

    let state = client
        .tracker()
        .verify_payment_callback(&args.callback_url)
        .await;
    output::field("Status", &output::state_label(&state));

    match state {
        OperationState::Succeeded(result) => {
            output::success("Payment completed");
            if let Some(added) = result.credits_added {
                output::field("Credits added", &added.to_string());
            }
            if let Some(total) = result.total_credits {
                output::field("Total credits", &total.to_string());
            }
            Ok(())
        }
        OperationState::Pending(result) => {
            let status = result
                .map(|r| r.status.to_string())
                .unwrap_or_else(|| "pending".to_string());
            output::note(&format!(
                "Payment is {status}. Run this command again to re-check."
            ));
            Ok(())
        }
        OperationState::Failed(failure) => bail!("Payment verification failed: {failure}"),
    }
}

async fn list(api: &str) -> Result<()> {
    let client = session::open_client(api)?;
    session::require_login(&client)?;

    let payments = client
        .payments()
        .await
        .context("Failed to list payments")?;

    if payments.is_empty() {
        output::note("No payments found.");
        return Ok(());
    }

    for payment in &payments {
        println!(
            "{:<24}  {:<10}  {:>8}  {:>6}  {}",
            payment.transaction_id,
            payment.status.to_string(),
            payment.amount.to_string(),
            payment
                .credits
                .map(|c| c.to_string())
                .unwrap_or_default(),
            payment.gateway.dimmed()
        );
    }

    Ok(())
}
