//! Product CRUD service library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod products;
pub mod store;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use products::{Product, ProductService};
