use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::Result;
use crate::endpoints;
use crate::error::ErrorCategory;
use crate::model::{PaymentRecord, PaymentVerification, VerifyPayment};
use crate::request::{RequestIntent, Response};
use crate::traits::Dispatch;

use super::{CreditPurchase, Failure, Operation, OperationState, Resolution};

/// Drives operations through a dispatcher.
///
/// The tracker holds no per-operation state. Every call derives its result
/// from the server response alone, so repeating a verification is safe.
#[derive(Debug, Clone)]
pub struct Tracker<D> {
    dispatcher: D,
}

impl<D: Dispatch> Tracker<D> {
    pub fn new(dispatcher: D) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Submit an operation and decode the receipt.
    ///
    /// Invalid input fails before any request is sent.
    #[instrument(skip_all, fields(kind = %O::KIND))]
    pub async fn submit<O: Operation>(&self, input: &O::Input) -> Result<O::Receipt> {
        let request = O::submission(input)?;
        debug!(path = %request.path(), "Submitting operation");
        self.dispatcher.dispatch(request).await?.json()
    }

    /// Ask the server for the authoritative status of an operation.
    ///
    /// Never returns an error: every failure mode lands in
    /// [`OperationState::Failed`] with its category.
    #[instrument(skip_all, fields(kind = %O::KIND))]
    pub async fn verify<O: Operation>(&self, key: &O::Key) -> OperationState<O::Status> {
        let request = match O::verification(key) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Verification rejected locally");
                return OperationState::failed(&e);
            }
        };

        let status = match self
            .dispatcher
            .dispatch(request)
            .await
            .and_then(Response::json::<O::Status>)
        {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, category = %e.category(), "Verification failed");
                return OperationState::failed(&e);
            }
        };

        Self::settle::<O>(status)
    }

    fn settle<O: Operation>(status: O::Status) -> OperationState<O::Status> {
        match O::resolve(&status) {
            Resolution::Pending => {
                debug!("Operation still pending");
                OperationState::Pending(Some(status))
            }
            Resolution::Success => {
                debug!("Operation succeeded");
                OperationState::Succeeded(status)
            }
            Resolution::Failure(message) => {
                debug!(%message, "Operation failed");
                OperationState::Failed(Failure {
                    category: ErrorCategory::Protocol,
                    message,
                })
            }
        }
    }

    /// Verify repeatedly until the operation settles.
    ///
    /// Cancelled by dropping the returned future.
    pub async fn poll<O: Operation>(
        &self,
        key: &O::Key,
        interval: Duration,
    ) -> OperationState<O::Status> {
        self.poll_with::<O, _>(key, interval, |_| {}).await
    }

    /// Like [`poll`](Self::poll), reporting every intermediate state.
    pub async fn poll_with<O, F>(
        &self,
        key: &O::Key,
        interval: Duration,
        mut on_update: F,
    ) -> OperationState<O::Status>
    where
        O: Operation,
        F: FnMut(&OperationState<O::Status>),
    {
        loop {
            let state = self.verify::<O>(key).await;
            on_update(&state);
            if state.is_terminal() {
                return state;
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Verify a payment, falling back to the stored transaction once the
    /// backend refuses to verify it again.
    ///
    /// The verify endpoint answers only the first call for a transaction.
    /// When it rejects a later call, a terminal transaction record settles
    /// the payment instead, so repeated verification keeps its outcome. A
    /// record that is missing or still pending leaves the rejection as is.
    #[instrument(skip_all, fields(transaction_id = %key.transaction_id))]
    pub async fn verify_payment(&self, key: &VerifyPayment) -> OperationState<PaymentVerification> {
        let state = self.verify::<CreditPurchase>(key).await;
        let rejected = state
            .failure()
            .is_some_and(|f| f.category == ErrorCategory::Http);
        if !rejected {
            return state;
        }

        match self.settled_payment(&key.transaction_id).await {
            Some(record) => {
                debug!(status = %record.status, "Payment settled from transaction record");
                Self::settle::<CreditPurchase>(PaymentVerification::from(&record))
            }
            None => state,
        }
    }

    async fn settled_payment(&self, transaction_id: &str) -> Option<PaymentRecord> {
        let request = RequestIntent::get(endpoints::payment(transaction_id));
        match self
            .dispatcher
            .dispatch(request)
            .await
            .and_then(Response::json::<PaymentRecord>)
        {
            Ok(record) if record.status.is_terminal() => Some(record),
            Ok(record) => {
                debug!(status = %record.status, "Transaction record not settled");
                None
            }
            Err(e) => {
                debug!(error = %e, "Transaction record unavailable");
                None
            }
        }
    }

    /// Verify a payment from the URL the gateway redirected back to.
    ///
    /// A callback without a transaction id fails without a request.
    pub async fn verify_payment_callback(
        &self,
        callback: &str,
    ) -> OperationState<PaymentVerification> {
        match VerifyPayment::from_callback(callback) {
            Ok(key) => self.verify_payment(&key).await,
            Err(e) => {
                warn!(error = %e, "Payment callback rejected");
                OperationState::failed(&e)
            }
        }
    }
}
