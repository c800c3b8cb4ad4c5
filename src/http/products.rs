//! Product request dispatcher.
//!
//! # Data Flow
//! ```text
//! /products, /products/, /products/{*rest}
//!     → dispatch (match on method)
//!     → PathScope::parse (collection / item / invalid)
//!     → ProductService (lock, query, release)
//!     → response.rs (JSON body or error envelope)
//! ```
//!
//! # Design Decisions
//! - One handler owns method dispatch so unsupported verbs get the JSON
//!   envelope instead of the router's empty 405
//! - Write requests check, in order: id, content type, body, existence

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};

use crate::http::error::ApiError;
use crate::http::path::PathScope;
use crate::http::request::{parse_json, require_json};
use crate::http::response;
use crate::products::{NewProduct, ProductPatch, ProductService};
use crate::store::ProductStore;

type SharedService<S> = Arc<ProductService<S>>;

/// Routes for the product resource.
pub fn routes<S: ProductStore>(service: SharedService<S>) -> Router {
    Router::new()
        .route("/products", any(dispatch::<S>))
        .route("/products/", any(dispatch::<S>))
        .route("/products/{*rest}", any(dispatch::<S>))
        .with_state(service)
}

async fn dispatch<S: ProductStore>(
    State(service): State<SharedService<S>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let scope = PathScope::parse(uri.path());
    tracing::debug!(method = %method, path = %uri.path(), scope = ?scope, "Dispatching product request");

    let result = match method {
        Method::GET => read(&service, scope).await,
        Method::POST => create(&service, scope, &headers, &body).await,
        Method::PUT | Method::PATCH => update(&service, scope, &headers, &body).await,
        Method::DELETE => remove(&service, scope).await,
        other => Err(ApiError::MethodNotAllowed(other.to_string())),
    };

    result.unwrap_or_else(IntoResponse::into_response)
}

async fn read<S: ProductStore>(
    service: &ProductService<S>,
    scope: PathScope,
) -> Result<Response, ApiError> {
    match scope {
        PathScope::Collection => {
            let products = service.list().await?;
            Ok(response::json(StatusCode::OK, &products))
        }
        PathScope::Item(id) => {
            let product = service.get(id).await?;
            Ok(response::json(StatusCode::OK, &product))
        }
        PathScope::Invalid => Err(ApiError::NotFound("not found".into())),
    }
}

async fn create<S: ProductStore>(
    service: &ProductService<S>,
    scope: PathScope,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, ApiError> {
    match scope {
        PathScope::Collection => {}
        PathScope::Item(_) => return Err(ApiError::MethodNotAllowed(Method::POST.to_string())),
        PathScope::Invalid => return Err(ApiError::NotFound("not found".into())),
    }
    require_json(headers)?;
    let new: NewProduct = parse_json(body)?;

    let product = service.create(new).await?;
    Ok(response::json(StatusCode::CREATED, &product))
}

async fn update<S: ProductStore>(
    service: &ProductService<S>,
    scope: PathScope,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, ApiError> {
    let id = require_id(scope)?;
    require_json(headers)?;
    let patch: ProductPatch = parse_json(body)?;

    let product = service.update(id, patch).await?;
    Ok(response::json(StatusCode::OK, &product))
}

async fn remove<S: ProductStore>(
    service: &ProductService<S>,
    scope: PathScope,
) -> Result<Response, ApiError> {
    let id = require_id(scope)?;
    service.delete(id).await?;
    Ok(response::no_content())
}

fn require_id(scope: PathScope) -> Result<i64, ApiError> {
    scope
        .id()
        .ok_or_else(|| ApiError::BadRequest("a numeric product id is required in the path".into()))
}
