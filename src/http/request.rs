//! Request handling helpers.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Enforce the JSON content type on write requests
//! - Decode JSON bodies into typed payloads
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Content type compared on its media type only; parameters such as
//!   `charset` are accepted

use axum::http::{header, HeaderMap, HeaderValue, Request};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::error::ApiError;

/// Header carrying the request ID in both directions.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a UUID v4 request ID for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Read the request ID set by the request-id layer.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Reject anything but `application/json`.
pub fn require_json(headers: &HeaderMap) -> Result<(), ApiError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false);

    if is_json {
        Ok(())
    } else {
        Err(ApiError::UnsupportedMediaType)
    }
}

/// Decode a JSON object body, mapping failures to 400.
///
/// Payload types derive `Deserialize`, which would also accept the sequence
/// form (`["Widget", 9.99]`). Only objects are payloads here.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let object: Map<String, Value> = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("request body must be a JSON object: {e}")))?;
    serde_json::from_value(Value::Object(object)).map_err(|e| ApiError::BadRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::{NewProduct, ProductPatch};

    fn with_content_type(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_json_content_types_accepted() {
        assert!(require_json(&with_content_type("application/json")).is_ok());
        assert!(require_json(&with_content_type("application/json; charset=utf-8")).is_ok());
        assert!(require_json(&with_content_type("Application/JSON")).is_ok());
    }

    #[test]
    fn test_other_content_types_rejected() {
        assert!(matches!(
            require_json(&with_content_type("text/plain")),
            Err(ApiError::UnsupportedMediaType)
        ));
        assert!(require_json(&with_content_type("application/jsonx")).is_err());
        assert!(require_json(&HeaderMap::new()).is_err());
    }

    #[test]
    fn test_parse_json_errors_are_bad_request() {
        let err = parse_json::<NewProduct>(b"{not json").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let ok: NewProduct = parse_json(br#"{"name":"Widget","price":9.99}"#).unwrap();
        assert_eq!(ok.name, "Widget");
    }

    #[test]
    fn test_parse_json_requires_an_object() {
        let bodies: [&[u8]; 5] = [b"[]", br#"["Widget", 9.99]"#, b"42", b"\"Widget\"", b"null"];
        for body in bodies {
            assert!(
                matches!(parse_json::<NewProduct>(body), Err(ApiError::BadRequest(_))),
                "{:?} should be rejected",
                String::from_utf8_lossy(body)
            );
        }
        assert!(matches!(
            parse_json::<ProductPatch>(br#"["Renamed", null]"#),
            Err(ApiError::BadRequest(_))
        ));

        let patch: ProductPatch = parse_json(br#"{"name":null,"price":0}"#).unwrap();
        assert_eq!(patch.name, None);
        assert_eq!(patch.price, Some(0.0));
    }

    #[test]
    fn test_generated_request_ids_are_uuids() {
        let request = Request::new(());
        let id = UuidRequestId.make_request_id(&request).unwrap();
        let text = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(text).is_ok());
    }
}
