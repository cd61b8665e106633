//! Backend records and request bodies.
//!
//! The endpoints that produce and consume these live on the request client;
//! the submit/verify flows are described in [`ops`](crate::ops).

mod auth;
mod chat;
mod image;
mod payment;
mod profile;

pub use auth::{
    ForgotPassword, ForgotPasswordResponse, MIN_PASSWORD_LEN, MessageResponse, RegisterRequest,
    RegisteredUser, ResetPassword, ResetTokenCheck, SocialLogin, SocialLoginResponse, TokenPair,
};
pub use chat::{ChatMessage, ChatThread, NewMessage, NewThread, Role};
pub use image::{ImageJob, ImageRequest, ImageUpload, JobStatus, OutputImage, Provider};
pub use payment::{
    CreditPackage, Gateway, PaymentNext, PaymentReceipt, PaymentRecord, PaymentRequest,
    PaymentStatus, PaymentVerification, VerifyPayment,
};
pub use profile::{Credits, Profile, UserSummary};
