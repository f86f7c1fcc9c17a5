pub mod cors;
pub mod logging;
pub mod security;

pub use cors::*;
pub use logging::*;
pub use security::*;

/// Request/response header carrying the request correlation id
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";
