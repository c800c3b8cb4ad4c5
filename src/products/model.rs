//! Product resource and its request payloads.

use serde::{Deserialize, Serialize};

/// A stored product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Store-assigned identifier. Never changes once set.
    pub id: i64,
    pub name: String,
    pub price: f64,
}

/// Body of a create request.
///
/// Missing fields default to `""` and `0.0`. Any client-supplied `id` is
/// dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
}

/// Body of a partial update.
///
/// A key that is absent or `null` leaves the stored value alone. A present
/// key is applied as-is, so `{"price": 0}` really sets the price to zero.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl ProductPatch {
    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none()
    }

    /// Merge this patch over an existing product. The id is never touched.
    pub fn apply(self, mut product: Product) -> Product {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        product
    }
}
