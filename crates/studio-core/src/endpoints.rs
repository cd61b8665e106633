//! Backend endpoint paths, relative to the API base URL.

use crate::request::ApiPath;

// ============================================================================
// Auth
// ============================================================================

pub fn login() -> ApiPath {
    ApiPath::new(["auth", "login"])
}

pub fn register() -> ApiPath {
    ApiPath::new(["auth", "register"])
}

pub fn social_callback() -> ApiPath {
    ApiPath::new(["social", "callback"])
}

pub fn forgot_password() -> ApiPath {
    ApiPath::new(["auth", "forgot-password"])
}

pub fn verify_reset_token(token: &str) -> ApiPath {
    ApiPath::new(["auth", "verify-reset-token", token])
}

pub fn reset_password() -> ApiPath {
    ApiPath::new(["auth", "reset-password"])
}

// ============================================================================
// Profile and chat
// ============================================================================

pub fn me() -> ApiPath {
    ApiPath::new(["me"])
}

pub fn threads() -> ApiPath {
    ApiPath::new(["chat", "threads"])
}

pub fn thread(id: u64) -> ApiPath {
    ApiPath::new(["chat".to_string(), "threads".to_string(), id.to_string()])
}

pub fn thread_messages(id: u64) -> ApiPath {
    ApiPath::new([
        "chat".to_string(),
        "threads".to_string(),
        id.to_string(),
        "messages".to_string(),
    ])
}

// ============================================================================
// Image jobs
// ============================================================================

pub fn image_jobs() -> ApiPath {
    ApiPath::new(["image-jobs"])
}

pub fn image_job(id: u64) -> ApiPath {
    ApiPath::new(["image-jobs".to_string(), id.to_string()])
}

// ============================================================================
// Payments
// ============================================================================

pub fn payments() -> ApiPath {
    ApiPath::new(["payments"])
}

pub fn create_payment() -> ApiPath {
    ApiPath::new(["payments", "create"])
}

pub fn verify_payment() -> ApiPath {
    ApiPath::new(["payments", "verify"])
}

pub fn payment(transaction_id: &str) -> ApiPath {
    ApiPath::new(["payments", transaction_id])
}
