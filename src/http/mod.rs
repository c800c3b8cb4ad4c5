//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, content type, body decoding)
//!     → products.rs (method dispatch)
//!     → path.rs (collection / item scope)
//!     → [ProductService does the work]
//!     → response.rs / error.rs (JSON body or error envelope)
//!     → Send to client
//! ```

pub mod error;
pub mod path;
pub mod products;
pub mod request;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use path::PathScope;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
