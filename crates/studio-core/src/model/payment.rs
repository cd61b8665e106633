//! Credit purchases through payment gateways.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::Result;
use crate::error::{ProtocolError, ValidationError};

/// A third-party payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gateway {
    Khalti,
    Esewa,
    Stripe,
    Razorpay,
    Binance,
}

impl Gateway {
    pub const ALL: [Gateway; 5] = [
        Gateway::Khalti,
        Gateway::Esewa,
        Gateway::Stripe,
        Gateway::Razorpay,
        Gateway::Binance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gateway::Khalti => "khalti",
            Gateway::Esewa => "esewa",
            Gateway::Stripe => "stripe",
            Gateway::Razorpay => "razorpay",
            Gateway::Binance => "binance",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Gateway::Khalti => "Khalti",
            Gateway::Esewa => "eSewa",
            Gateway::Stripe => "Stripe",
            Gateway::Razorpay => "Razorpay",
            Gateway::Binance => "Binance Pay",
        }
    }
}

impl fmt::Display for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gateway {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Gateway::ALL
            .into_iter()
            .find(|g| g.as_str() == lower)
            .ok_or_else(|| format!("unknown gateway '{s}'"))
    }
}

/// A purchasable bundle of credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditPackage {
    /// Price in whole currency units.
    pub amount: u32,
    pub credits: u32,
}

impl CreditPackage {
    pub const CATALOGUE: [CreditPackage; 5] = [
        CreditPackage { amount: 5, credits: 50 },
        CreditPackage { amount: 10, credits: 100 },
        CreditPackage { amount: 25, credits: 250 },
        CreditPackage { amount: 50, credits: 500 },
        CreditPackage { amount: 100, credits: 1000 },
    ];

    /// Look up the catalogue entry priced at `amount`.
    pub fn find(amount: u32) -> Option<CreditPackage> {
        Self::CATALOGUE.into_iter().find(|p| p.amount == amount)
    }
}

/// Body of a payment creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    pub gateway: Gateway,
    pub amount: Decimal,
    pub credits: u32,
    pub return_url: String,
}

impl PaymentRequest {
    /// Build a request for a catalogue package.
    pub fn for_package(gateway: Gateway, package: CreditPackage, return_url: impl Into<String>) -> Self {
        Self {
            gateway,
            amount: Decimal::from(package.amount),
            credits: package.credits,
            return_url: return_url.into(),
        }
    }

    /// Local checks run before the request is sent.
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidAmount {
                reason: "amount must be positive".to_string(),
            }
            .into());
        }
        if self.credits == 0 {
            return Err(ValidationError::InvalidAmount {
                reason: "credits must be at least 1".to_string(),
            }
            .into());
        }
        Url::parse(&self.return_url).map_err(|e| ValidationError::InvalidUrl {
            value: self.return_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

/// Response to payment creation.
///
/// Exactly one of `payment_url` and `gateway_data` is expected.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(default)]
    pub gateway_data: Option<Value>,
}

/// What the payer has to do after a payment was created.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentNext {
    /// Open the gateway's hosted page.
    Redirect(String),
    /// Hand the gateway-specific payload to an embedded checkout.
    Gateway(Value),
}

impl PaymentReceipt {
    /// Classify the next step. A redirect URL takes precedence.
    pub fn next(&self) -> Result<PaymentNext> {
        if let Some(url) = self.payment_url.as_deref().filter(|u| !u.is_empty()) {
            return Ok(PaymentNext::Redirect(url.to_string()));
        }
        match &self.gateway_data {
            Some(data) if !data.is_null() => Ok(PaymentNext::Gateway(data.clone())),
            _ => Err(ProtocolError::UnexpectedResponse {
                message: "no payment URL or gateway data received".to_string(),
            }
            .into()),
        }
    }
}

/// Payment transaction status. `pending` and `processing` are non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending | PaymentStatus::Processing)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Verification key for a payment: the transaction id plus whatever the
/// gateway appended to the return URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyPayment {
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_data: Option<Value>,
}

impl VerifyPayment {
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            gateway_data: None,
        }
    }

    /// Parse the gateway's return URL (or a bare query string).
    ///
    /// Requires a non-empty `transaction_id`; `gateway_data`, when present,
    /// must be JSON.
    pub fn from_callback(callback: &str) -> Result<Self> {
        let query = match Url::parse(callback) {
            Ok(url) => url.query().unwrap_or_default().to_string(),
            Err(_) => callback.trim_start_matches('?').to_string(),
        };

        let mut transaction_id = None;
        let mut gateway_data = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "transaction_id" if transaction_id.is_none() => {
                    transaction_id = Some(value.into_owned())
                }
                "gateway_data" if gateway_data.is_none() => gateway_data = Some(value.into_owned()),
                _ => {}
            }
        }

        let transaction_id = transaction_id
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ValidationError::InvalidCallback {
                reason: "no transaction ID found".to_string(),
            })?;

        let gateway_data = gateway_data
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                serde_json::from_str::<Value>(&raw).map_err(|e| ValidationError::InvalidCallback {
                    reason: format!("gateway_data is not valid JSON: {e}"),
                })
            })
            .transpose()?;

        Ok(Self {
            transaction_id,
            gateway_data,
        })
    }
}

/// Authoritative result of a payment verification.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentVerification {
    pub status: PaymentStatus,
    #[serde(default)]
    pub credits_added: Option<u32>,
    #[serde(default)]
    pub total_credits: Option<u32>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl PaymentVerification {
    /// Message the gateway attached to the outcome, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }
}

impl From<&PaymentRecord> for PaymentVerification {
    /// Outcome of a transaction the backend no longer re-verifies.
    fn from(record: &PaymentRecord) -> Self {
        Self {
            status: record.status,
            credits_added: record
                .credits
                .filter(|_| record.status == PaymentStatus::Completed),
            total_credits: None,
            message: None,
            error: None,
        }
    }
}

/// A payment transaction from the history endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRecord {
    #[serde(default)]
    pub id: Option<u64>,
    pub gateway: String,
    pub transaction_id: String,
    pub amount: Decimal,
    #[serde(default, alias = "credits_purchased")]
    pub credits: Option<u32>,
    pub status: PaymentStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}
