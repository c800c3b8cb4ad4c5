//! Storage subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     DatabaseConfig
//!     → provision.rs (parse target, ensure database + table)
//!     → SqlProductStore (pool + prepared statement text)
//!
//! Per request:
//!     ProductService
//!     → locks.rs (per-id or global guard)
//!     → gateway.rs (parameterized query)
//!     → Result<_, StoreError>
//! ```
//!
//! # Design Decisions
//! - One pool shared by all requests; the pool is the only shared connection
//!   state
//! - Gateway behind the `ProductStore` trait so the service takes its store
//!   by injection
//! - Concurrency control is a separate component, not ambient handler state

pub mod error;
pub mod gateway;
pub mod locks;
pub mod provision;

pub use error::StoreError;
pub use gateway::{ProductStore, SqlProductStore};
pub use locks::{LockGuard, LockMode, Locks};
pub use provision::{provision, ConnectionTarget, Identifier, ProvisionError};
