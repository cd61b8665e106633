//! Subcommand implementations.

pub mod auth;
pub mod image;
pub mod password;
pub mod payment;
