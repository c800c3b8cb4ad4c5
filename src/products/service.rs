//! Product CRUD operations.
//!
//! Built once at startup with its store and lock provider injected. Each
//! operation takes the lock matching its scope, talks to the store, and
//! releases the lock on return.

use crate::products::model::{NewProduct, Product, ProductPatch};
use crate::store::{Locks, ProductStore, StoreError};

pub struct ProductService<S> {
    store: S,
    locks: Locks,
}

impl<S: ProductStore> ProductService<S> {
    pub fn new(store: S, locks: Locks) -> Self {
        Self { store, locks }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn locks(&self) -> &Locks {
        &self.locks
    }

    pub async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let _guard = self.locks.collection().await;
        self.store.list_all().await
    }

    pub async fn get(&self, id: i64) -> Result<Product, StoreError> {
        let _guard = self.locks.item(id).await;
        self.store.get_by_id(id).await
    }

    pub async fn create(&self, new: NewProduct) -> Result<Product, StoreError> {
        let _guard = self.locks.collection().await;
        let id = self.store.insert(&new.name, new.price).await?;
        let product = Product {
            id,
            name: new.name,
            price: new.price,
        };
        tracing::info!(id = product.id, name = %product.name, price = product.price, "Product created");
        Ok(product)
    }

    /// Read-merge-write under the item lock.
    pub async fn update(&self, id: i64, patch: ProductPatch) -> Result<Product, StoreError> {
        let _guard = self.locks.item(id).await;
        let existing = self.store.get_by_id(id).await?;
        if patch.is_empty() {
            tracing::debug!(id, "Empty patch, product unchanged");
        }
        let merged = patch.apply(existing);
        self.store
            .update_full(merged.id, &merged.name, merged.price)
            .await?;
        tracing::info!(id = merged.id, name = %merged.name, price = merged.price, "Product updated");
        Ok(merged)
    }

    /// Delete and return the removed product.
    pub async fn delete(&self, id: i64) -> Result<Product, StoreError> {
        let _guard = self.locks.item(id).await;
        let existing = self.store.get_by_id(id).await?;
        self.store.delete_by_id(id).await?;
        tracing::info!(id = existing.id, name = %existing.name, "Product deleted");
        Ok(existing)
    }
}
