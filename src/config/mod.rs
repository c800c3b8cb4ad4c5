//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, or defaults)
//!     → DB_URL environment override
//!     → command-line overrides
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_with, ConfigError};
pub use schema::{
    DatabaseConfig, ListenerConfig, LockingConfig, ObservabilityConfig, ProvisioningConfig,
    SecurityConfig, ServiceConfig, TimeoutConfig,
};
pub use validation::ValidationError;
