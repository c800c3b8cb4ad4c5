//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, pool size > 0)
//! - Validate addresses and identifiers before anything binds or connects
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::store::Identifier;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("database.url is empty (set it in the config file or via DB_URL)")]
    MissingDatabaseUrl,

    #[error("database.table {0:?} is not a valid identifier")]
    InvalidTable(String),

    #[error("database.max_connections must be greater than 0")]
    ZeroConnections,

    #[error("timeouts.request_secs must be greater than 0")]
    ZeroRequestTimeout,

    #[error("provisioning.max_attempts must be greater than 0")]
    ZeroAttempts,

    #[error("provisioning.base_delay_ms exceeds max_delay_ms")]
    InvertedBackoff,

    #[error("{field} {value:?} is not a socket address")]
    InvalidAddress { field: &'static str, value: String },
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.database.url.trim().is_empty() {
        errors.push(ValidationError::MissingDatabaseUrl);
    }
    if Identifier::parse(&config.database.table).is_err() {
        errors.push(ValidationError::InvalidTable(config.database.table.clone()));
    }
    if config.database.max_connections == 0 {
        errors.push(ValidationError::ZeroConnections);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.provisioning.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }
    if config.provisioning.base_delay_ms > config.provisioning.max_delay_ms {
        errors.push(ValidationError::InvertedBackoff);
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
