//! End-to-end router tests: real routes + bearer guard, MemoryStore as
//! the document store, signed-token scheme as the authenticator.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use mongodb::bson::oid::ObjectId;
use serde_json::{Value, json};
use tower::ServiceExt;

use smart_deals_server::api;
use smart_deals_server::repos::MemoryStore;
use smart_deals_server::services::auth::{SignedTokenAuthenticator, TokenCodec};
use smart_deals_server::state::AppState;

fn test_app() -> (Router, Arc<TokenCodec>) {
    let codec = Arc::new(TokenCodec::new(b"integration-test-secret"));
    let store = Arc::new(MemoryStore::new());
    let authenticator = Arc::new(SignedTokenAuthenticator::new(codec.clone()));
    let state = AppState::new(
        store,
        authenticator,
        codec.clone(),
        chrono::Duration::hours(1),
    );
    (api::routes(state), codec)
}

fn bearer(codec: &TokenCodec, email: &str) -> String {
    let token = codec
        .issue(&json!({ "email": email }), chrono::Duration::hours(1))
        .unwrap();
    format!("Bearer {token}")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_auth(uri: &str, authorization: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap()
}

fn json_req(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_req_auth(method: &str, uri: &str, authorization: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Insert a product through the API and return its id as a hex string.
async fn create_product(app: &Router, codec: &TokenCodec, product: Value) -> String {
    let resp = app
        .clone()
        .oneshot(json_req_auth(
            "POST",
            "/products",
            &bearer(codec, "seller@example.com"),
            &product,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ack = body_json(resp).await;
    assert_eq!(ack["acknowledged"], json!(true));
    ack["insertedId"]["$oid"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn liveness_route_is_open() {
    let (app, _) = test_app();
    let resp = app.oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_route_without_header_is_401_with_message() {
    let (app, _) = test_app();
    let resp = app.oneshot(get("/bids")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(resp).await;
    assert_eq!(body["message"], json!("unauthorized access"));
}

#[tokio::test]
async fn header_without_token_segment_is_401() {
    let (app, _) = test_app();
    let resp = app.oneshot(get_auth("/bids", "Bearer")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_401_and_never_reaches_the_handler() {
    let (app, _) = test_app();
    let resp = app
        .oneshot(get_auth("/bids?email=a@b.com", "Bearer not-a-token"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(resp).await;
    assert_eq!(body["message"], json!("unauthorized access"));
}

#[tokio::test]
async fn expired_token_is_401() {
    let (app, codec) = test_app();
    let token = codec
        .issue(
            &json!({ "email": "a@b.com" }),
            chrono::Duration::seconds(-30),
        )
        .unwrap();
    let resp = app
        .oneshot(get_auth("/bids?email=a@b.com", &format!("Bearer {token}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bids_for_another_buyer_are_forbidden() {
    let (app, codec) = test_app();

    // Seed a bid owned by the victim.
    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/bids",
            &json!({ "product": "p1", "buyer_email": "victim@example.com", "bid_price": 100 }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(get_auth(
            "/bids?email=victim@example.com",
            &bearer(&codec, "attacker@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body = body_json(resp).await;
    assert_eq!(body["message"], json!("forbidden access"));
}

#[tokio::test]
async fn bids_without_email_param_are_forbidden() {
    let (app, codec) = test_app();
    let resp = app
        .oneshot(get_auth("/bids", &bearer(&codec, "a@b.com")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn own_bids_are_returned_exactly() {
    let (app, codec) = test_app();

    for (buyer, price) in [
        ("me@example.com", 10),
        ("other@example.com", 20),
        ("me@example.com", 30),
    ] {
        let resp = app
            .clone()
            .oneshot(json_req(
                "POST",
                "/bids",
                &json!({ "product": "p1", "buyer_email": buyer, "bid_price": price }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .oneshot(get_auth(
            "/bids?email=me@example.com",
            &bearer(&codec, "me@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bids = body_json(resp).await;
    let bids = bids.as_array().unwrap();
    assert_eq!(bids.len(), 2);
    assert!(
        bids.iter()
            .all(|b| b["buyer_email"] == json!("me@example.com"))
    );
}

#[tokio::test]
async fn product_bids_are_sorted_by_bid_price_descending() {
    let (app, codec) = test_app();

    for price in [50, 200, 125] {
        let resp = app
            .clone()
            .oneshot(json_req(
                "POST",
                "/bids",
                &json!({ "product": "prod-9", "buyer_email": "b@example.com", "bid_price": price }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .oneshot(get_auth(
            "/products/bids/prod-9",
            &bearer(&codec, "anyone@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bids = body_json(resp).await;
    let prices: Vec<i64> = bids
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["bid_price"].as_i64().unwrap())
        .collect();
    assert_eq!(prices, vec![200, 125, 50]);
}

#[tokio::test]
async fn create_product_requires_bearer() {
    let (app, _) = test_app();
    let resp = app
        .oneshot(json_req("POST", "/products", &json!({ "name": "x" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn patch_only_changes_name_and_price() {
    let (app, codec) = test_app();
    let id = create_product(
        &app,
        &codec,
        json!({
            "name": "old name",
            "price": 100,
            "price_min": 80,
            "seller_email": "seller@example.com"
        }),
    )
    .await;

    let resp = app
        .clone()
        .oneshot(json_req(
            "PATCH",
            &format!("/products/{id}"),
            &json!({
                "name": "new name",
                "price": 250,
                "price_min": 1,
                "seller_email": "hijack@example.com"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ack = body_json(resp).await;
    assert_eq!(ack["matchedCount"], json!(1));

    let resp = app
        .oneshot(get(&format!("/products/{id}")))
        .await
        .unwrap();
    let product = body_json(resp).await;
    assert_eq!(product["name"], json!("new name"));
    assert_eq!(product["price"], json!(250));
    // Everything outside {name, price} is untouched.
    assert_eq!(product["price_min"], json!(80));
    assert_eq!(product["seller_email"], json!("seller@example.com"));
}

#[tokio::test]
async fn get_product_with_malformed_id_is_400() {
    let (app, _) = test_app();
    let resp = app.oneshot(get("/products/not-an-object-id")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_missing_product_returns_null() {
    let (app, _) = test_app();
    let resp = app
        .oneshot(get(&format!("/products/{}", ObjectId::new())))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, Value::Null);
}

#[tokio::test]
async fn deleting_nonexistent_ids_reports_zero_and_succeeds() {
    let (app, _) = test_app();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/products/{}", ObjectId::new()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["deletedCount"], json!(0));

    let resp = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/bids/{}", ObjectId::new()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["deletedCount"], json!(0));
}

#[tokio::test]
async fn latest_products_caps_at_six_newest_first() {
    let (app, codec) = test_app();

    for created_at in 1..=8 {
        create_product(
            &app,
            &codec,
            json!({ "name": format!("p{created_at}"), "price_min": 10, "created_at": created_at }),
        )
        .await;
    }

    let resp = app.oneshot(get("/latest-products")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let products = body_json(resp).await;
    let created: Vec<i64> = products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["created_at"].as_i64().unwrap())
        .collect();
    assert_eq!(created, vec![8, 7, 6, 5, 4, 3]);
}

#[tokio::test]
async fn duplicate_signup_gets_a_conflict_response() {
    let (app, _) = test_app();
    let user = json!({ "email": "dup@example.com", "name": "first" });

    let resp = app
        .clone()
        .oneshot(json_req("POST", "/users", &user))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["acknowledged"], json!(true));

    let resp = app
        .oneshot(json_req("POST", "/users", &user))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(resp).await["message"],
        json!("user already exists")
    );
}

#[tokio::test]
async fn concurrent_duplicate_signups_yield_one_success() {
    let (app, _) = test_app();
    let user = json!({ "email": "race@example.com" });

    let (a, b) = tokio::join!(
        app.clone().oneshot(json_req("POST", "/users", &user)),
        app.clone().oneshot(json_req("POST", "/users", &user)),
    );
    let mut statuses = vec![a.unwrap().status(), b.unwrap().status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn issued_token_authenticates_with_the_claim_email() {
    let (app, _) = test_app();

    // Get a token for this identity from the API itself.
    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/getToken",
            &json!({ "email": "tokenuser@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let token = body_json(resp).await["token"].as_str().unwrap().to_string();

    // The ownership check sees exactly the claim email: the matching
    // query passes, any other is forbidden.
    let resp = app
        .clone()
        .oneshot(get_auth(
            "/bids?email=tokenuser@example.com",
            &format!("Bearer {token}"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(get_auth(
            "/bids?email=someone-else@example.com",
            &format!("Bearer {token}"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn get_token_rejects_non_object_claims() {
    let (app, _) = test_app();
    let resp = app
        .oneshot(json_req("POST", "/getToken", &json!("just a string")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
