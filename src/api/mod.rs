//! HTTP API: router, server lifecycle, middleware, endpoints.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_server, ApiServer, ServerError};
pub use types::{ApiContext, CurrentUser, Envelope};
