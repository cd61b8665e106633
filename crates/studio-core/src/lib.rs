//! studio-core - Session state, request intents and the async operation
//! protocol for the studio image-generation backend.

pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod model;
pub mod ops;
pub mod request;
pub mod session;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::{Error, ErrorCategory};
pub use ops::{Operation, OperationKind, OperationState, Tracker};
pub use request::{ApiPath, Method, MultipartForm, RequestBody, RequestIntent, Response};
pub use session::SessionStore;
pub use tokens::{AccessToken, RefreshToken};
pub use traits::Dispatch;
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
