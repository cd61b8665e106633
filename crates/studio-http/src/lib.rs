//! studio-http - reqwest-backed request client for the studio API.

mod api;
mod client;

pub use client::{ApiClient, ClientConfig};
