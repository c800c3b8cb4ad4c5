//! Product resource: data model and CRUD operations.

pub mod model;
pub mod service;

pub use model::{NewProduct, Product, ProductPatch};
pub use service::ProductService;
