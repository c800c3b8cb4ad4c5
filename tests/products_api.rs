//! End-to-end tests for the product HTTP surface.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use product_service::store::LockMode;

mod common;

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    let svc = common::start_service(LockMode::PerId).await;

    let res = svc
        .client
        .post(svc.url("/products"))
        .header(CONTENT_TYPE, "application/json")
        .body(r#"{"name":"Widget","price":9.99}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created, json!({"id": 1, "name": "Widget", "price": 9.99}));

    let res = svc.client.get(svc.url("/products/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), created);

    let res = svc
        .client
        .patch(svc.url("/products/1"))
        .header(CONTENT_TYPE, "application/json")
        .body(r#"{"price":12.5}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"id": 1, "name": "Widget", "price": 12.5})
    );

    let res = svc.client.delete(svc.url("/products/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.bytes().await.unwrap().is_empty());

    let res = svc.client.get(svc.url("/products/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_list_starts_empty_and_is_ordered() {
    let svc = common::start_service(LockMode::PerId).await;

    let res = svc.client.get(svc.url("/products")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!([]));

    for name in ["a", "b", "c"] {
        let res = svc
            .client
            .post(svc.url("/products"))
            .json(&json!({"name": name, "price": 1.0}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = svc.client.get(svc.url("/products/")).send().await.unwrap();
    let list: Vec<Value> = res.json().await.unwrap();
    let ids: Vec<i64> = list.iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_unsupported_method_gets_envelope() {
    let svc = common::start_service(LockMode::PerId).await;

    let res = svc
        .client
        .request(Method::OPTIONS, svc.url("/products"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"error": "method OPTIONS not allowed"}));
}

#[tokio::test]
async fn test_wrong_content_type_is_415() {
    let svc = common::start_service(LockMode::PerId).await;

    let res = svc
        .client
        .post(svc.url("/products"))
        .header(CONTENT_TYPE, "text/plain")
        .body(r#"{"name":"Widget","price":9.99}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "content type 'application/json' required");
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let svc = common::start_service(LockMode::PerId).await;

    let res = svc
        .client
        .post(svc.url("/products"))
        .header(CONTENT_TYPE, "application/json")
        .body("{oops")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = svc
        .client
        .post(svc.url("/products"))
        .json(&json!({"name": "Widget", "price": "cheap"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_array_bodies_are_400_and_store_nothing() {
    let svc = common::start_service(LockMode::PerId).await;

    for body in ["[]", r#"["Widget", 9.99]"#] {
        let res = svc
            .client
            .post(svc.url("/products"))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "POST {body}");
        let envelope: Value = res.json().await.unwrap();
        assert!(envelope["error"].is_string());
    }

    let res = svc
        .client
        .post(svc.url("/products"))
        .json(&json!({"name": "Widget", "price": 9.99}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = svc
        .client
        .put(svc.url("/products/1"))
        .header(CONTENT_TYPE, "application/json")
        .body(r#"["Renamed", null]"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = svc.client.get(svc.url("/products")).send().await.unwrap();
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!([{"id": 1, "name": "Widget", "price": 9.99}])
    );
}

#[tokio::test]
async fn test_store_failure_is_500_envelope() {
    let svc = common::start_service(LockMode::PerId).await;
    svc.store.close().await;

    let res = svc.client.get(svc.url("/products")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    let envelope: Value = res.json().await.unwrap();
    assert!(envelope["error"].as_str().unwrap().contains("closed pool"));

    let res = svc
        .client
        .post(svc.url("/products"))
        .json(&json!({"name": "Widget", "price": 9.99}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_client_id_is_ignored_on_create() {
    let svc = common::start_service(LockMode::PerId).await;

    let res = svc
        .client
        .post(svc.url("/products"))
        .json(&json!({"id": 77, "name": "Widget", "price": 1.0}))
        .send()
        .await
        .unwrap();
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["id"], 1);
}

#[tokio::test]
async fn test_write_requests_need_an_id() {
    let svc = common::start_service(LockMode::PerId).await;

    for method in [Method::PUT, Method::PATCH, Method::DELETE] {
        for path in ["/products", "/products/abc"] {
            let res = svc
                .client
                .request(method.clone(), svc.url(path))
                .json(&json!({}))
                .send()
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{method} {path}");
        }
    }
}

#[tokio::test]
async fn test_invalid_paths() {
    let svc = common::start_service(LockMode::PerId).await;

    let res = svc.client.get(svc.url("/products/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = svc.client.get(svc.url("/products/1/extra")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = svc
        .client
        .post(svc.url("/products/1"))
        .json(&json!({"name": "x", "price": 1.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_update_and_delete_missing_are_404() {
    let svc = common::start_service(LockMode::Global).await;

    let res = svc
        .client
        .put(svc.url("/products/9"))
        .json(&json!({"name": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = svc.client.delete(svc.url("/products/9")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_partial_update_semantics() {
    let svc = common::start_service(LockMode::PerId).await;
    svc.client
        .post(svc.url("/products"))
        .json(&json!({"name": "Widget", "price": 9.99}))
        .send()
        .await
        .unwrap();

    // Empty payload changes nothing.
    let res = svc
        .client
        .put(svc.url("/products/1"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"id": 1, "name": "Widget", "price": 9.99})
    );

    // Name only.
    let res = svc
        .client
        .put(svc.url("/products/1"))
        .json(&json!({"name": "Gadget"}))
        .send()
        .await
        .unwrap();
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"id": 1, "name": "Gadget", "price": 9.99})
    );

    // An explicit zero is a real value.
    let res = svc
        .client
        .patch(svc.url("/products/1"))
        .json(&json!({"price": 0.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.json::<Value>().await.unwrap()["price"], json!(0.0));

    let res = svc.client.get(svc.url("/products/1")).send().await.unwrap();
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"id": 1, "name": "Gadget", "price": 0.0})
    );
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let svc = common::start_service(LockMode::PerId).await;

    let res = svc.client.get(svc.url("/products")).send().await.unwrap();
    let generated = res.headers()["x-request-id"].to_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&generated).is_ok());

    let res = svc
        .client
        .get(svc.url("/products"))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_root_says_hello() {
    let svc = common::start_service(LockMode::PerId).await;

    let res = svc.client.get(svc.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Hello World");
}

#[tokio::test]
async fn test_concurrent_patches_are_all_applied() {
    let svc = common::start_service(LockMode::PerId).await;
    svc.client
        .post(svc.url("/products"))
        .json(&json!({"name": "Widget", "price": 9.99}))
        .send()
        .await
        .unwrap();

    let rename = svc
        .client
        .patch(svc.url("/products/1"))
        .json(&json!({"name": "Renamed"}))
        .send();
    let reprice = svc
        .client
        .patch(svc.url("/products/1"))
        .json(&json!({"price": 3.5}))
        .send();
    let (a, b) = tokio::join!(rename, reprice);
    assert_eq!(a.unwrap().status(), StatusCode::OK);
    assert_eq!(b.unwrap().status(), StatusCode::OK);

    let res = svc.client.get(svc.url("/products/1")).send().await.unwrap();
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"id": 1, "name": "Renamed", "price": 3.5})
    );
}
