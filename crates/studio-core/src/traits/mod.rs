//! Core traits shared by the request client and the operation protocol.

mod dispatch;

pub use dispatch::Dispatch;
