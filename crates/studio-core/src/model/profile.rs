//! Account profile types.

use serde::{Deserialize, Serialize};

/// The signed-in user with their credit balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub profile: Credits,
}

/// Credit balance and usage counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Credits {
    pub credits: u32,
    #[serde(default)]
    pub total_images_generated: u32,
}

/// Minimal user record returned alongside tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}
