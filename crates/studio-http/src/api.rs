//! Typed endpoint methods.

use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use studio_core::endpoints;
use studio_core::model::{
    ChatMessage, ChatThread, ForgotPassword, ForgotPasswordResponse, ImageJob, ImageRequest,
    MessageResponse, NewMessage, NewThread, PaymentReceipt, PaymentRecord, PaymentRequest,
    PaymentVerification, Profile, RegisterRequest, RegisteredUser, ResetPassword,
    ResetTokenCheck, SocialLogin, SocialLoginResponse, TokenPair, UserSummary, VerifyPayment,
};
use studio_core::ops::{CreditPurchase, ImageGeneration, OperationState, PasswordReset};
use studio_core::{Credentials, RequestIntent, Result};

use crate::client::ApiClient;

impl ApiClient {
    async fn fetch<T: DeserializeOwned>(&self, request: RequestIntent) -> Result<T> {
        self.send(request).await?.json()
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// Log in with a username and password and store the issued pair.
    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        let request = RequestIntent::post_json(endpoints::login(), credentials)?;
        let tokens: TokenPair = self.fetch(request).await?;
        self.session().save(tokens.access, tokens.refresh);
        info!("Logged in");
        Ok(())
    }

    /// Exchange a provider token for a session.
    #[instrument(skip(self, login), fields(provider = %login.provider))]
    pub async fn social_login(&self, login: &SocialLogin) -> Result<Option<UserSummary>> {
        let request = RequestIntent::post_json(endpoints::social_callback(), login)?;
        let response: SocialLoginResponse = self.fetch(request).await?;
        self.session()
            .save(response.tokens.access, response.tokens.refresh);
        info!("Logged in via social provider");
        Ok(response.user)
    }

    #[instrument(skip(self, account), fields(username = %account.username))]
    pub async fn register(&self, account: &RegisterRequest) -> Result<RegisteredUser> {
        let request = RequestIntent::post_json(endpoints::register(), account)?;
        self.fetch(request).await
    }

    /// Forget the local session. The backend keeps no server-side state.
    pub fn logout(&self) {
        self.session().clear();
        info!("Logged out");
    }

    /// Request a password reset email.
    #[instrument(skip(self, input))]
    pub async fn forgot_password(&self, input: &ForgotPassword) -> Result<ForgotPasswordResponse> {
        self.tracker().submit::<PasswordReset>(input).await
    }

    /// Check whether a reset token is still redeemable.
    pub async fn verify_reset_token(&self, token: &str) -> OperationState<ResetTokenCheck> {
        self.tracker()
            .verify::<PasswordReset>(&token.to_string())
            .await
    }

    /// Redeem a reset token. Returns the server's confirmation message.
    #[instrument(skip(self, reset))]
    pub async fn reset_password(&self, reset: &ResetPassword) -> Result<String> {
        let request = RequestIntent::post_json(endpoints::reset_password(), reset)?;
        let response: MessageResponse = self.fetch(request).await?;
        Ok(response
            .message
            .unwrap_or_else(|| "Password has been reset".to_string()))
    }

    // ========================================================================
    // Profile and chat
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<Profile> {
        self.fetch(RequestIntent::get(endpoints::me())).await
    }

    #[instrument(skip(self))]
    pub async fn threads(&self) -> Result<Vec<ChatThread>> {
        self.fetch(RequestIntent::get(endpoints::threads())).await
    }

    #[instrument(skip(self))]
    pub async fn thread(&self, id: u64) -> Result<ChatThread> {
        self.fetch(RequestIntent::get(endpoints::thread(id))).await
    }

    #[instrument(skip(self))]
    pub async fn create_thread(&self, title: &str) -> Result<ChatThread> {
        let body = NewThread {
            title: title.to_string(),
        };
        self.fetch(RequestIntent::post_json(endpoints::threads(), &body)?)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_thread(&self, id: u64) -> Result<()> {
        self.send(RequestIntent::delete(endpoints::thread(id)))
            .await?;
        debug!("Thread deleted");
        Ok(())
    }

    #[instrument(skip(self, message))]
    pub async fn post_message(&self, thread: u64, message: &NewMessage) -> Result<ChatMessage> {
        let request = RequestIntent::post_json(endpoints::thread_messages(thread), message)?;
        self.fetch(request).await
    }

    // ========================================================================
    // Image jobs
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn image_jobs(&self) -> Result<Vec<ImageJob>> {
        self.fetch(RequestIntent::get(endpoints::image_jobs())).await
    }

    #[instrument(skip(self))]
    pub async fn image_job(&self, id: u64) -> Result<ImageJob> {
        self.fetch(RequestIntent::get(endpoints::image_job(id))).await
    }

    /// Submit an image job. The returned record is not a confirmation.
    #[instrument(skip(self, job), fields(provider = %job.provider))]
    pub async fn submit_image(&self, job: &ImageRequest) -> Result<ImageJob> {
        self.tracker().submit::<ImageGeneration>(job).await
    }

    // ========================================================================
    // Payments
    // ========================================================================

    #[instrument(skip(self, payment), fields(gateway = %payment.gateway))]
    pub async fn create_payment(&self, payment: &PaymentRequest) -> Result<PaymentReceipt> {
        self.tracker().submit::<CreditPurchase>(payment).await
    }

    /// Verify a payment. Repeating the call after it settled keeps the outcome.
    pub async fn verify_payment(&self, key: &VerifyPayment) -> OperationState<PaymentVerification> {
        self.tracker().verify_payment(key).await
    }

    #[instrument(skip(self))]
    pub async fn payments(&self) -> Result<Vec<PaymentRecord>> {
        self.fetch(RequestIntent::get(endpoints::payments())).await
    }

    #[instrument(skip(self))]
    pub async fn payment(&self, transaction_id: &str) -> Result<PaymentRecord> {
        self.fetch(RequestIntent::get(endpoints::payment(transaction_id)))
            .await
    }
}
