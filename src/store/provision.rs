//! Schema provisioning.
//!
//! # Responsibilities
//! - Parse the `<host:port>/<database>` connection target
//! - Make sure the database exists (MySQL only)
//! - Probe the product table and create it when the probe fails
//!
//! # Design Decisions
//! - Identifiers cannot be bound as parameters, so database and table names
//!   are validated and backtick-quoted before they reach any statement
//! - Failures are classified as retryable or fatal; the caller decides
//!   whether to try again
//! - The serving pool is opened against the target database directly, so
//!   no pooled connection depends on a session-level `USE`

use std::fmt;
use std::time::Duration;

use sqlx::any::AnyPoolOptions;
use sqlx::{AnyConnection, AnyPool, Connection};
use thiserror::Error;
use url::Url;

use crate::config::DatabaseConfig;
use crate::store::gateway::SqlProductStore;

const MAX_IDENTIFIER_LEN: usize = 64;

/// Startup failure while preparing the backing store.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("invalid connection target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: &'static str },

    #[error("invalid identifier {0:?}: expected 1-64 characters of [A-Za-z0-9_]")]
    InvalidIdentifier(String),

    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to create database {name}: {source}")]
    CreateDatabase {
        name: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to create table {name}: {source}")]
    CreateTable {
        name: String,
        #[source]
        source: sqlx::Error,
    },
}

impl ProvisionError {
    /// Whether a later attempt could succeed without operator action.
    ///
    /// Only transport-level failures qualify; a malformed target or a
    /// rejected statement will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProvisionError::InvalidTarget { .. } | ProvisionError::InvalidIdentifier(_) => false,
            ProvisionError::Connect { source, .. }
            | ProvisionError::CreateDatabase { source, .. }
            | ProvisionError::CreateTable { source, .. } => is_transient(source),
        }
    }
}

fn is_transient(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

/// A validated SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier(String);

impl Identifier {
    pub fn parse(raw: &str) -> Result<Self, ProvisionError> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_IDENTIFIER_LEN
            && raw.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(ProvisionError::InvalidIdentifier(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Backtick-quoted form, accepted by both MySQL and SQLite.
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SQL flavour of the backing store. Only DDL differs between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

impl Dialect {
    fn create_table(self, table: &Identifier) -> String {
        match self {
            Dialect::MySql => format!(
                "CREATE TABLE IF NOT EXISTS {} (\
                 id BIGINT NOT NULL AUTO_INCREMENT, \
                 name VARCHAR(255) NOT NULL DEFAULT '', \
                 price DOUBLE NOT NULL DEFAULT 0, \
                 PRIMARY KEY (id))",
                table.quoted()
            ),
            Dialect::Sqlite => format!(
                "CREATE TABLE IF NOT EXISTS {} (\
                 id INTEGER PRIMARY KEY AUTOINCREMENT, \
                 name TEXT NOT NULL DEFAULT '', \
                 price REAL NOT NULL DEFAULT 0)",
                table.quoted()
            ),
        }
    }
}

/// Where the store lives.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionTarget {
    /// A MySQL server plus the database to select on it.
    MySql { server: Url, database: Identifier },
    /// A SQLite URL, passed to the driver untouched.
    Sqlite { url: String },
}

impl ConnectionTarget {
    /// Parse a connection target.
    ///
    /// Accepted forms:
    /// - `host:port/database`
    /// - `user:password@host:port/database`
    /// - `user:password@tcp(host:port)/database`
    /// - any of the above prefixed with `mysql://`
    /// - `sqlite:...` URLs
    pub fn parse(raw: &str) -> Result<Self, ProvisionError> {
        let raw = raw.trim();
        let invalid = |reason| ProvisionError::InvalidTarget {
            target: raw.to_string(),
            reason,
        };

        if raw.starts_with("sqlite:") {
            return Ok(ConnectionTarget::Sqlite {
                url: raw.to_string(),
            });
        }

        let rest = raw.strip_prefix("mysql://").unwrap_or(raw);
        let (server, database) = rest
            .rsplit_once('/')
            .ok_or_else(|| invalid("expected <host:port>/<database>"))?;
        if database.is_empty() {
            return Err(invalid("database name is empty"));
        }
        let database = Identifier::parse(database)?;

        let (credentials, host) = match server.rsplit_once('@') {
            Some((credentials, host)) => (Some(credentials), host),
            None => (None, server),
        };
        let host = host
            .strip_prefix("tcp(")
            .and_then(|h| h.strip_suffix(')'))
            .unwrap_or(host);
        if host.is_empty() {
            return Err(invalid("host is empty"));
        }

        let server_url = match credentials {
            Some(credentials) => format!("mysql://{credentials}@{host}"),
            None => format!("mysql://{host}"),
        };
        let server = Url::parse(&server_url).map_err(|_| invalid("malformed host"))?;
        if server.host_str().map_or(true, str::is_empty) {
            return Err(invalid("malformed host"));
        }

        Ok(ConnectionTarget::MySql { server, database })
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            ConnectionTarget::MySql { .. } => Dialect::MySql,
            ConnectionTarget::Sqlite { .. } => Dialect::Sqlite,
        }
    }

    /// True for SQLite databases that live only inside their connection.
    pub fn is_in_memory(&self) -> bool {
        match self {
            ConnectionTarget::Sqlite { url } => {
                url.contains(":memory:") || url.contains("mode=memory")
            }
            ConnectionTarget::MySql { .. } => false,
        }
    }

    /// URL the serving pool connects to.
    pub fn pool_url(&self) -> String {
        match self {
            ConnectionTarget::MySql { server, database } => {
                let mut url = server.clone();
                url.set_path(&format!("/{}", database));
                url.to_string()
            }
            ConnectionTarget::Sqlite { url } => url.clone(),
        }
    }

    /// Printable form with any password masked.
    pub fn redacted(&self) -> String {
        match self {
            ConnectionTarget::MySql { server, database } => {
                let mut url = server.clone();
                if url.password().is_some() {
                    let _ = url.set_password(Some("***"));
                }
                url.set_path(&format!("/{}", database));
                url.to_string()
            }
            ConnectionTarget::Sqlite { url } => url.clone(),
        }
    }
}

/// Prepare the database and table, then hand back a ready store.
pub async fn provision(config: &DatabaseConfig) -> Result<SqlProductStore, ProvisionError> {
    sqlx::any::install_default_drivers();

    let target = ConnectionTarget::parse(&config.url)?;
    let table = Identifier::parse(&config.table)?;

    tracing::info!(
        target = %target.redacted(),
        table = %table,
        "Provisioning product store"
    );

    if let ConnectionTarget::MySql { server, database } = &target {
        ensure_database(server, database).await?;
    }

    let mut options = AnyPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));
    if target.is_in_memory() {
        // Recycling the connection would drop every stored row.
        options = options.idle_timeout(None).max_lifetime(None);
    }

    let pool = options
        .connect(&target.pool_url())
        .await
        .map_err(|source| ProvisionError::Connect {
            target: target.redacted(),
            source,
        })?;

    ensure_table(&pool, target.dialect(), &table).await?;

    Ok(SqlProductStore::new(pool, target.dialect(), &table))
}

async fn ensure_database(server: &Url, database: &Identifier) -> Result<(), ProvisionError> {
    let mut conn = AnyConnection::connect(server.as_str())
        .await
        .map_err(|source| ProvisionError::Connect {
            target: server.host_str().unwrap_or_default().to_string(),
            source,
        })?;

    let use_db = format!("USE {}", database.quoted());
    // USE is not allowed over the prepared-statement protocol.
    if let Err(e) = sqlx::raw_sql(&use_db).execute(&mut conn).await {
        tracing::warn!(database = %database, error = %e, "Database missing, creating it");

        let create_db = format!("CREATE DATABASE {}", database.quoted());
        let create_err = |source| ProvisionError::CreateDatabase {
            name: database.to_string(),
            source,
        };
        sqlx::raw_sql(&create_db)
            .execute(&mut conn)
            .await
            .map_err(create_err)?;
        sqlx::raw_sql(&use_db)
            .execute(&mut conn)
            .await
            .map_err(create_err)?;

        tracing::info!(database = %database, "Database created");
    } else {
        tracing::info!(database = %database, "Database found");
    }

    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "Bootstrap connection did not close cleanly");
    }
    Ok(())
}

/// Probe the table and create it if the probe fails.
pub(crate) async fn ensure_table(
    pool: &AnyPool,
    dialect: Dialect,
    table: &Identifier,
) -> Result<(), ProvisionError> {
    let probe = format!("SELECT 1 FROM {} LIMIT 1", table.quoted());
    match sqlx::query(&probe).fetch_optional(pool).await {
        Ok(_) => {
            tracing::info!(table = %table, "Table found");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(table = %table, error = %e, "Table probe failed, creating table");
            sqlx::raw_sql(&dialect.create_table(table))
                .execute(pool)
                .await
                .map_err(|source| ProvisionError::CreateTable {
                    name: table.to_string(),
                    source,
                })?;
            tracing::info!(table = %table, "Table created");
            Ok(())
        }
    }
}
