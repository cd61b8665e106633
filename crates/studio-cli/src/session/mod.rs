//! Client construction around the persisted session.

pub mod storage;

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

use studio_core::{AccessToken, ApiUrl, RefreshToken, SessionStore};
use studio_http::{ApiClient, ClientConfig};

/// Build a client for `api`, seeded with the stored session for that API.
///
/// A session stored for a different API is ignored, not deleted.
pub fn open_client(api: &str) -> Result<ApiClient> {
    let api = ApiUrl::new(api).context("Invalid API URL")?;
    let store = SessionStore::new();

    match storage::load_session() {
        Ok(Some(stored)) if stored.api == api.as_str() => {
            store.restore(
                AccessToken::new(stored.access_token),
                RefreshToken::new(stored.refresh_token),
            );
        }
        Ok(Some(stored)) => {
            debug!(stored = %stored.api, "Stored session belongs to another API");
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Failed to load session, continuing signed out"),
    }

    ApiClient::new(ClientConfig::new(api), store).context("Failed to create API client")
}

/// Persist the client's current session.
pub fn persist(client: &ApiClient) -> Result<()> {
    storage::save_session(client.base_url().as_str(), client.session())
        .context("Failed to save session")
}

/// Remove the stored session if it belongs to the client's API.
///
/// An unreadable session file is removed as well. Returns whether a file
/// was removed.
pub fn forget(client: &ApiClient) -> Result<bool> {
    match storage::load_session() {
        Ok(Some(stored)) if stored.api != client.base_url().as_str() => {
            debug!(stored = %stored.api, "Keeping session stored for another API");
            Ok(false)
        }
        Ok(Some(_)) => {
            storage::clear_session()?;
            Ok(true)
        }
        Ok(None) => Ok(false),
        Err(e) => {
            warn!(error = %e, "Removing unreadable session file");
            storage::clear_session()?;
            Ok(true)
        }
    }
}

/// Fail unless the client holds a session.
pub fn require_login(client: &ApiClient) -> Result<()> {
    if !client.session().is_authenticated() {
        bail!("No active session. Run 'studio auth login' first.");
    }
    Ok(())
}
