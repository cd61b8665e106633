//! The submit-then-verify protocol shared by image jobs, payments and
//! password resets.
//!
//! Each feature is an [`Operation`]: a tagged kind plus the shapes of its
//! submission and verification requests. A [`Tracker`] drives any operation
//! through a [`Dispatch`](crate::traits::Dispatch) implementation and lands
//! every verification in one of three [`OperationState`]s.
//!
//! A submission response is never taken as confirmation. Only a verification
//! call yields an authoritative status, and verification is idempotent: it
//! may be repeated and returns the same terminal result once settled.

mod kinds;
mod tracker;

use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorCategory};
use crate::request::RequestIntent;
use crate::Result;

pub use kinds::{CreditPurchase, ImageGeneration, PasswordReset};
pub use tracker::Tracker;

/// Which feature an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    ImageJob,
    PaymentTransaction,
    PasswordReset,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationKind::ImageJob => "image_job",
            OperationKind::PaymentTransaction => "payment_transaction",
            OperationKind::PasswordReset => "password_reset",
        };
        f.write_str(s)
    }
}

/// A server-side action whose outcome is confirmed by a separate call.
pub trait Operation: Send + Sync + 'static {
    const KIND: OperationKind;

    /// Caller input for the submission phase.
    type Input: Send + Sync;
    /// Decoded submission response. Never a confirmation.
    type Receipt: DeserializeOwned + Send;
    /// Identifier the verification call is keyed by.
    type Key: fmt::Debug + Send + Sync;
    /// Decoded verification response.
    type Status: DeserializeOwned + Send;

    /// Build the submission request, validating input locally.
    fn submission(input: &Self::Input) -> Result<RequestIntent>;

    /// Build the verification request. Fails locally on a missing key.
    fn verification(key: &Self::Key) -> Result<RequestIntent>;

    /// Classify a verification response.
    fn resolve(status: &Self::Status) -> Resolution;
}

/// Classification of one verification response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Pending,
    Success,
    Failure(String),
}

/// Why an operation resolved to failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub category: ErrorCategory,
    pub message: String,
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        Self {
            category: err.category(),
            message: err.user_message(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The three states every consumer of the protocol models.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationState<T> {
    /// Verification in flight (`None`) or last observed status not terminal.
    Pending(Option<T>),
    Succeeded(T),
    Failed(Failure),
}

impl<T> OperationState<T> {
    /// The state before any verification has completed.
    pub fn pending() -> Self {
        OperationState::Pending(None)
    }

    pub(crate) fn failed(err: &Error) -> Self {
        OperationState::Failed(Failure::from(err))
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationState::Pending(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationState::Succeeded(_))
    }

    /// Short state label, identical in shape across all operation kinds.
    pub fn label(&self) -> &'static str {
        match self {
            OperationState::Pending(_) => "pending",
            OperationState::Succeeded(_) => "succeeded",
            OperationState::Failed(_) => "failed",
        }
    }

    /// Latest status record, if one was received.
    pub fn status(&self) -> Option<&T> {
        match self {
            OperationState::Pending(status) => status.as_ref(),
            OperationState::Succeeded(status) => Some(status),
            OperationState::Failed(_) => None,
        }
    }

    /// Failure message, if the operation failed.
    pub fn message(&self) -> Option<&str> {
        self.failure().map(|f| f.message.as_str())
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            OperationState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}
