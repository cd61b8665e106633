//! CLI tests against a mock backend.
//!
//! Each test runs the `studio` binary with an isolated HOME so the persisted
//! session never touches the real user data directory.

mod common;

use base64::Engine as _;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "A1",
            "refresh": "R1"
        })))
        .mount(server)
        .await;
}

async fn login(home: &std::path::Path, api: &str) {
    run_cli_success(
        &["auth", "login", "--username", "alice", "--password", "secret123"],
        home,
        api,
    )
    .await;
}

#[tokio::test]
async fn test_login_persists_session_for_whoami() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    let api = api_url(&server);
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/me/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "username": "alice",
            "email": "alice@example.com",
            "profile": {"credits": 42, "total_images_generated": 7}
        })))
        .expect(1)
        .mount(&server)
        .await;

    login(home.path(), &api).await;

    let session = session_file(home.path());
    assert!(session.exists());
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&session).unwrap()).unwrap();
    assert_eq!(stored["access_token"], "A1");
    assert_eq!(stored["refresh_token"], "R1");
    assert_eq!(stored["api"], api);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&session).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    let stdout = run_cli_success(&["auth", "whoami"], home.path(), &api).await;
    assert!(stdout.contains("alice"));
    assert!(stdout.contains("42"));
}

#[tokio::test]
async fn test_logout_removes_session() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    let api = api_url(&server);
    mount_login(&server).await;

    login(home.path(), &api).await;
    assert!(session_file(home.path()).exists());

    run_cli_success(&["auth", "logout"], home.path(), &api).await;
    assert!(!session_file(home.path()).exists());

    let stderr = run_cli_failure(&["auth", "whoami"], home.path(), &api).await;
    assert!(stderr.contains("No active session"));
}

#[tokio::test]
async fn test_session_for_other_api_is_ignored() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    let api = api_url(&server);
    mount_login(&server).await;

    login(home.path(), &api).await;

    let stderr = run_cli_failure(
        &["image", "list", "--api", "https://studio.example/api"],
        home.path(),
        &api,
    )
    .await;
    assert!(stderr.contains("No active session"));
}

#[tokio::test]
async fn test_empty_prompt_sends_nothing() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    let api = api_url(&server);
    mount_login(&server).await;

    login(home.path(), &api).await;
    let before = server.received_requests().await.unwrap().len();

    let stderr =
        run_cli_failure(&["image", "generate", "--prompt", "   "], home.path(), &api).await;
    assert!(stderr.contains("prompt must not be empty"));
    assert_eq!(server.received_requests().await.unwrap().len(), before);
}

#[tokio::test]
async fn test_generate_waits_and_saves_inline_output() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let api = api_url(&server);
    mount_login(&server).await;

    let job = |status: &str, outputs: serde_json::Value| {
        json!({
            "id": 5,
            "provider": "openai",
            "model": "dall-e-3",
            "prompt": "a red fox",
            "output_images": outputs,
            "status": status,
            "credits_spent": 1
        })
    };

    Mock::given(method("POST"))
        .and(path("/api/image-jobs/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(201).set_body_json(job("queued", json!([]))))
        .mount(&server)
        .await;

    let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a];
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    Mock::given(method("GET"))
        .and(path("/api/image-jobs/5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job("processing", json!([]))))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/image-jobs/5/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(job("completed", json!([encoded]))),
        )
        .mount(&server)
        .await;

    login(home.path(), &api).await;

    let out_dir = out.path().to_str().unwrap();
    let stdout = run_cli_success(
        &[
            "image",
            "generate",
            "--prompt",
            "a red fox",
            "--interval-ms",
            "10",
            "--out",
            out_dir,
        ],
        home.path(),
        &api,
    )
    .await;

    assert!(stdout.contains("completed"));
    let saved = std::fs::read(out.path().join("job-5-1.png")).unwrap();
    assert_eq!(saved, png);
}

#[tokio::test]
async fn test_logout_keeps_session_of_other_api() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    let api = api_url(&server);
    mount_login(&server).await;

    login(home.path(), &api).await;

    let stdout = run_cli_success(
        &["auth", "logout", "--api", "https://studio.example/api"],
        home.path(),
        &api,
    )
    .await;
    assert!(!stdout.contains("Logged out"));
    assert!(session_file(home.path()).exists());

    run_cli_success(&["auth", "logout"], home.path(), &api).await;
    assert!(!session_file(home.path()).exists());
}

#[tokio::test]
async fn test_payment_verify_requires_login() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    let api = api_url(&server);

    let stderr = run_cli_failure(
        &["payment", "verify", "?transaction_id=tx-7"],
        home.path(),
        &api,
    )
    .await;

    assert!(stderr.contains("No active session"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_callback_without_transaction_sends_nothing() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    let api = api_url(&server);
    mount_login(&server).await;

    login(home.path(), &api).await;
    let before = server.received_requests().await.unwrap().len();

    let stderr = run_cli_failure(
        &[
            "payment",
            "verify",
            "https://app.example/payment/success?status=done",
        ],
        home.path(),
        &api,
    )
    .await;

    assert!(stderr.contains("no transaction ID found"));
    assert_eq!(server.received_requests().await.unwrap().len(), before);
}

#[tokio::test]
async fn test_failed_payment_reports_gateway_message() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    let api = api_url(&server);
    mount_login(&server).await;
    login(home.path(), &api).await;

    Mock::given(method("POST"))
        .and(path("/api/payments/verify/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "failed",
            "message": "Card declined by issuer"
        })))
        .mount(&server)
        .await;

    let stderr = run_cli_failure(
        &["payment", "verify", "?transaction_id=tx-7"],
        home.path(),
        &api,
    )
    .await;

    assert!(stderr.contains("Card declined by issuer"));
}

#[tokio::test]
async fn test_completed_payment_reports_credits() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    let api = api_url(&server);
    mount_login(&server).await;
    login(home.path(), &api).await;

    Mock::given(method("POST"))
        .and(path("/api/payments/verify/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "credits_added": 100,
            "total_credits": 142
        })))
        .mount(&server)
        .await;

    let stdout = run_cli_success(
        &[
            "payment",
            "verify",
            "https://app.example/payment/success?transaction_id=tx-7",
        ],
        home.path(),
        &api,
    )
    .await;

    assert!(stdout.contains("Payment completed"));
    assert!(stdout.contains("142"));
}

#[tokio::test]
async fn test_reset_url_only_shown_on_request() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    let api = api_url(&server);

    Mock::given(method("POST"))
        .and(path("/api/auth/forgot-password/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "If an account with that email exists, a reset link has been sent.",
            "reset_url": "http://localhost:3000/auth/reset-password?token=tok-1"
        })))
        .mount(&server)
        .await;

    let args = ["password", "forgot", "--email", "alice@example.com"];
    let stdout = run_cli_success(&args, home.path(), &api).await;
    assert!(stdout.contains("reset link has been sent"));
    assert!(!stdout.contains("token=tok-1"));

    let mut with_url = args.to_vec();
    with_url.push("--show-reset-url");
    let stdout = run_cli_success(&with_url, home.path(), &api).await;
    assert!(stdout.contains("token=tok-1"));
}

#[tokio::test]
async fn test_password_mismatch_fails_locally() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    let api = api_url(&server);

    let stderr = run_cli_failure(
        &[
            "password",
            "reset",
            "tok-1",
            "--password",
            "new-password",
            "--confirm",
            "other-password",
        ],
        home.path(),
        &api,
    )
    .await;

    assert!(stderr.contains("Passwords don't match"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_reset_token_reports_server_error() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    let api = api_url(&server);

    Mock::given(method("GET"))
        .and(path("/api/auth/verify-reset-token/expired/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": false,
            "error": "Token has expired"
        })))
        .mount(&server)
        .await;

    let stderr = run_cli_failure(&["password", "check", "expired"], home.path(), &api).await;
    assert!(stderr.contains("Token has expired"));
}
