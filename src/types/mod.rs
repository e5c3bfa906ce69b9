//! HTTP payload types
//!
//! Response bodies returned by the server endpoints.

pub mod response;

pub use response::{ErrorResponse, PingResponse};
