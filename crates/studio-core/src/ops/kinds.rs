//! The three concrete operations.

use crate::Result;
use crate::endpoints;
use crate::error::ValidationError;
use crate::model::{
    ForgotPassword, ForgotPasswordResponse, ImageJob, ImageRequest, JobStatus, PaymentReceipt,
    PaymentRequest, PaymentStatus, PaymentVerification, ResetTokenCheck, VerifyPayment,
};
use crate::request::RequestIntent;

use super::{Operation, OperationKind, Resolution};

/// Image generation: multipart submission, then fetch the job by id.
#[derive(Debug)]
pub struct ImageGeneration;

impl Operation for ImageGeneration {
    const KIND: OperationKind = OperationKind::ImageJob;

    type Input = ImageRequest;
    type Receipt = ImageJob;
    type Key = u64;
    type Status = ImageJob;

    fn submission(input: &ImageRequest) -> Result<RequestIntent> {
        let form = input.to_form()?;
        Ok(RequestIntent::post_multipart(endpoints::image_jobs(), form))
    }

    fn verification(key: &u64) -> Result<RequestIntent> {
        Ok(RequestIntent::get(endpoints::image_job(*key)))
    }

    fn resolve(job: &ImageJob) -> Resolution {
        match job.status {
            JobStatus::Completed => Resolution::Success,
            JobStatus::Failed => Resolution::Failure("Image generation failed".to_string()),
            JobStatus::Queued | JobStatus::Processing => Resolution::Pending,
        }
    }
}

/// Credit purchase: create a gateway payment, then verify by transaction id.
#[derive(Debug)]
pub struct CreditPurchase;

impl Operation for CreditPurchase {
    const KIND: OperationKind = OperationKind::PaymentTransaction;

    type Input = PaymentRequest;
    type Receipt = PaymentReceipt;
    type Key = VerifyPayment;
    type Status = PaymentVerification;

    fn submission(input: &PaymentRequest) -> Result<RequestIntent> {
        input.validate()?;
        RequestIntent::post_json(endpoints::create_payment(), input)
    }

    fn verification(key: &VerifyPayment) -> Result<RequestIntent> {
        if key.transaction_id.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "transaction_id",
            }
            .into());
        }
        RequestIntent::post_json(endpoints::verify_payment(), key)
    }

    fn resolve(verification: &PaymentVerification) -> Resolution {
        let message = |fallback: &str| {
            verification
                .message()
                .unwrap_or(fallback)
                .to_string()
        };
        match verification.status {
            PaymentStatus::Completed => Resolution::Success,
            PaymentStatus::Failed => Resolution::Failure(message("Payment verification failed")),
            PaymentStatus::Cancelled => Resolution::Failure(message("Payment was cancelled")),
            PaymentStatus::Pending | PaymentStatus::Processing => Resolution::Pending,
        }
    }
}

/// Password reset: request a token by email, then check the token.
#[derive(Debug)]
pub struct PasswordReset;

impl Operation for PasswordReset {
    const KIND: OperationKind = OperationKind::PasswordReset;

    type Input = ForgotPassword;
    type Receipt = ForgotPasswordResponse;
    type Key = String;
    type Status = ResetTokenCheck;

    fn submission(input: &ForgotPassword) -> Result<RequestIntent> {
        RequestIntent::post_json(endpoints::forgot_password(), input)
    }

    fn verification(token: &String) -> Result<RequestIntent> {
        if token.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "token" }.into());
        }
        let path = endpoints::verify_reset_token(token);
        path.check()?;
        Ok(RequestIntent::get(path))
    }

    fn resolve(check: &ResetTokenCheck) -> Resolution {
        if check.valid {
            Resolution::Success
        } else {
            Resolution::Failure(
                check
                    .error
                    .clone()
                    .unwrap_or_else(|| "Invalid or expired token".to_string()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Provider;
    use crate::request::{Method, RequestBody};

    #[test]
    fn image_submission_is_multipart() {
        let request = ImageGeneration::submission(&ImageRequest::new(Provider::OpenAi, "a cat"))
            .unwrap();
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.path().to_string(), "/image-jobs/");
        assert!(matches!(request.body(), RequestBody::Multipart(_)));
    }

    #[test]
    fn empty_prompt_never_builds_a_request() {
        assert!(ImageGeneration::submission(&ImageRequest::new(Provider::OpenAi, "")).is_err());
    }

    #[test]
    fn payment_verification_requires_transaction_id() {
        assert!(CreditPurchase::verification(&VerifyPayment::new("  ")).is_err());
        let request = CreditPurchase::verification(&VerifyPayment::new("tx-1")).unwrap();
        assert_eq!(request.path().to_string(), "/payments/verify/");
        assert_eq!(
            request.body(),
            &RequestBody::Json(serde_json::json!({"transaction_id": "tx-1"}))
        );
    }

    #[test]
    fn dot_reset_token_never_builds_a_request() {
        for token in [".", ".."] {
            let err = PasswordReset::verification(&token.to_string()).unwrap_err();
            assert_eq!(err.category(), crate::ErrorCategory::Validation);
        }
    }

    #[test]
    fn reset_token_resolution() {
        let ok = ResetTokenCheck {
            valid: true,
            error: None,
        };
        assert_eq!(PasswordReset::resolve(&ok), Resolution::Success);

        let bad = ResetTokenCheck {
            valid: false,
            error: None,
        };
        assert_eq!(
            PasswordReset::resolve(&bad),
            Resolution::Failure("Invalid or expired token".into())
        );
    }
}
