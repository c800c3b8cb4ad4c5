//! Resource store gateway.
//!
//! Every statement binds ids, names and prices as parameters. The table name
//! is the only interpolated part and is validated before the statements are
//! built.

use std::future::Future;
use std::sync::Arc;

use sqlx::AnyPool;

use crate::products::Product;
use crate::store::error::StoreError;
use crate::store::provision::{Dialect, Identifier};

/// CRUD access to the product table.
///
/// Uses return-position `impl Future` so implementors can write plain
/// `async fn`s.
pub trait ProductStore: Send + Sync + 'static {
    /// All products, ascending by id.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Product>, StoreError>> + Send;

    fn get_by_id(&self, id: i64) -> impl Future<Output = Result<Product, StoreError>> + Send;

    /// Insert a row and return the id the store assigned to it.
    fn insert(&self, name: &str, price: f64) -> impl Future<Output = Result<i64, StoreError>> + Send;

    fn update_full(
        &self,
        id: i64,
        name: &str,
        price: f64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete_by_id(&self, id: i64) -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[derive(Debug)]
struct Statements {
    list: String,
    get: String,
    exists: String,
    insert: String,
    insert_returns_id: bool,
    update: String,
    delete: String,
}

impl Statements {
    fn for_table(dialect: Dialect, table: &Identifier) -> Self {
        let t = table.quoted();
        // The SQLite driver does not report the inserted rowid, so the
        // statement hands it back as a row instead.
        let insert_returns_id = dialect == Dialect::Sqlite;
        let insert = if insert_returns_id {
            format!("INSERT INTO {t} (name, price) VALUES (?, ?) RETURNING id")
        } else {
            format!("INSERT INTO {t} (name, price) VALUES (?, ?)")
        };
        Self {
            list: format!("SELECT id, name, price FROM {t} ORDER BY id ASC"),
            get: format!("SELECT id, name, price FROM {t} WHERE id = ?"),
            exists: format!("SELECT 1 FROM {t} WHERE id = ?"),
            insert,
            insert_returns_id,
            update: format!("UPDATE {t} SET name = ?, price = ? WHERE id = ?"),
            delete: format!("DELETE FROM {t} WHERE id = ?"),
        }
    }
}

/// [`ProductStore`] over an sqlx connection pool (MySQL or SQLite).
#[derive(Debug, Clone)]
pub struct SqlProductStore {
    pool: AnyPool,
    statements: Arc<Statements>,
}

impl SqlProductStore {
    pub fn new(pool: AnyPool, dialect: Dialect, table: &Identifier) -> Self {
        Self {
            pool,
            statements: Arc::new(Statements::for_table(dialect, table)),
        }
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl ProductStore for SqlProductStore {
    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        let products = sqlx::query_as::<_, Product>(&self.statements.list)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn get_by_id(&self, id: i64) -> Result<Product, StoreError> {
        sqlx::query_as::<_, Product>(&self.statements.get)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn insert(&self, name: &str, price: f64) -> Result<i64, StoreError> {
        if self.statements.insert_returns_id {
            let id = sqlx::query_scalar::<_, i64>(&self.statements.insert)
                .bind(name)
                .bind(price)
                .fetch_one(&self.pool)
                .await?;
            return Ok(id);
        }

        let result = sqlx::query(&self.statements.insert)
            .bind(name)
            .bind(price)
            .execute(&self.pool)
            .await?;
        result.last_insert_id().ok_or_else(|| {
            StoreError::Database(sqlx::Error::Protocol(
                "driver did not report an inserted id".into(),
            ))
        })
    }

    async fn update_full(&self, id: i64, name: &str, price: f64) -> Result<(), StoreError> {
        // MySQL reports zero affected rows when the values are unchanged, so
        // existence is probed explicitly rather than read off the result.
        let mut tx = self.pool.begin().await?;
        let exists = sqlx::query(&self.statements.exists)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound(id));
        }
        sqlx::query(&self.statements.update)
            .bind(name)
            .bind(price)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(&self.statements.delete)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
