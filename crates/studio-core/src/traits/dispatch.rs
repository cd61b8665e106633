//! Request dispatch trait.

use async_trait::async_trait;

use crate::Result;
use crate::request::{RequestIntent, Response};

/// Sends a [`RequestIntent`] to the backend and decodes the reply.
///
/// Implementations attach the current session credential, choose the wire
/// encoding from the body variant and normalize failures into
/// [`Error`](crate::Error). They never retry.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Send one request and return the decoded success body.
    async fn dispatch(&self, request: RequestIntent) -> Result<Response>;
}

#[async_trait]
impl<D: Dispatch + ?Sized> Dispatch for &D {
    async fn dispatch(&self, request: RequestIntent) -> Result<Response> {
        (**self).dispatch(request).await
    }
}
