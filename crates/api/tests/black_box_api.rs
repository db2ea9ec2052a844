//! Black-box tests: the real router on an ephemeral port, in-memory store.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

use vendora_api::app::{build_app, AppState};
use vendora_auth::{TokenConfig, TokenService};
use vendora_infra::MemoryStore;

const SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let tokens = Arc::new(TokenService::new(TokenConfig::new(SECRET)));
        let state = AppState::new(Arc::new(MemoryStore::new()), tokens);
        let app = build_app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Register a user and return `(token, user)`.
async fn register(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    role: &str,
) -> (String, Value) {
    let res = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "secret-pass",
            "role": role,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED, "registration failed");
    let body: Value = res.json().await.unwrap();
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"].clone(),
    )
}

async fn create_supplier(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    name: &str,
) -> i64 {
    let res = client
        .post(format!("{base_url}/api/suppliers"))
        .bearer_auth(token)
        .json(&json!({ "name": name, "email": format!("{name}@suppliers.test") }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

async fn create_product(client: &reqwest::Client, base_url: &str, token: &str, name: &str) -> i64 {
    let res = client
        .post(format!("{base_url}/api/products"))
        .bearer_auth(token)
        .json(&json!({ "name": name, "unitOfMeasure": "kg" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn landing_route_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/api", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "SRM API is running!");
}

#[tokio::test]
async fn missing_authorization_header_is_401() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/api/suppliers", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Authorization header missing");
}

#[tokio::test]
async fn empty_bearer_token_is_401() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/api/suppliers", srv.base_url))
        .header("Authorization", "Bearer ")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Token missing");
}

#[tokio::test]
async fn garbage_token_is_403() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/api/suppliers", srv.base_url))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn token_signed_with_wrong_secret_is_403() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let now = Utc::now();
    let claims = json!({
        "sub": 1,
        "role": "admin",
        "iat": now.timestamp(),
        "exp": (now + Duration::hours(8)).timestamp(),
    });
    let forged = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();

    let res = client
        .get(format!("{}/api/suppliers", srv.base_url))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn register_login_me_round_trip() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (_, user) = register(&client, &srv.base_url, "alice", "user").await;
    assert_eq!(user["role"], "user");

    let res = client
        .post(format!("{}/api/auth/login", srv.base_url))
        .json(&json!({ "username": "alice", "password": "secret-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Login successful");
    let token = body["token"].as_str().unwrap();

    let res = client
        .get(format!("{}/api/auth/me", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me: Value = res.json().await.unwrap();
    assert_eq!(me["username"], "alice");
    assert!(me.get("passwordHash").is_none());
    assert!(me.get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv.base_url, "bob", "user").await;

    let res = client
        .post(format!("{}/api/auth/register", srv.base_url))
        .json(&json!({
            "username": "bob",
            "email": "bob2@example.com",
            "password": "secret-pass",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Username or email already exists");
}

#[tokio::test]
async fn bad_credentials_are_401() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv.base_url, "carol", "user").await;

    let res = client
        .post(format!("{}/api/auth/login", srv.base_url))
        .json(&json!({ "username": "carol", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn deactivated_user_cannot_log_in() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (admin_token, _) = register(&client, &srv.base_url, "root", "admin").await;
    let (_, victim) = register(&client, &srv.base_url, "dave", "user").await;

    let res = client
        .put(format!(
            "{}/api/admin/users/{}",
            srv.base_url,
            victim["id"].as_i64().unwrap()
        ))
        .bearer_auth(&admin_token)
        .json(&json!({ "isActive": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/api/auth/login", srv.base_url))
        .json(&json!({ "username": "dave", "password": "secret-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Account is deactivated");
}

#[tokio::test]
async fn user_role_cannot_create_suppliers() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (token, _) = register(&client, &srv.base_url, "erin", "user").await;

    let res = client
        .post(format!("{}/api/suppliers", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Acme", "email": "acme@suppliers.test" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Insufficient permissions");
}

#[tokio::test]
async fn manager_can_create_but_not_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (token, _) = register(&client, &srv.base_url, "mgr", "manager").await;

    let supplier_id = create_supplier(&client, &srv.base_url, &token, "Northwind").await;

    let res = client
        .delete(format!("{}/api/suppliers/{}", srv.base_url, supplier_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Insufficient permissions");
}

#[tokio::test]
async fn contact_with_unknown_supplier_is_rejected_and_not_persisted() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (token, _) = register(&client, &srv.base_url, "root", "admin").await;

    let res = client
        .post(format!("{}/api/contacts", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "firstName": "Mara",
            "lastName": "Voss",
            "email": "mara@example.com",
            "supplierId": 9999,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Supplier with ID 9999 not found.");
    assert_eq!(body["error"], "supplierId");

    let res = client
        .get(format!("{}/api/contacts", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let contacts: Value = res.json().await.unwrap();
    assert_eq!(contacts.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn sole_admin_cannot_be_deactivated() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (token, admin) = register(&client, &srv.base_url, "root", "admin").await;
    let admin_id = admin["id"].as_i64().unwrap();

    let res = client
        .put(format!("{}/api/admin/users/{}", srv.base_url, admin_id))
        .bearer_auth(&token)
        .json(&json!({ "isActive": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Cannot deactivate the only active admin user");

    // Still active.
    let res = client
        .get(format!("{}/api/auth/me", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let me: Value = res.json().await.unwrap();
    assert_eq!(me["isActive"], true);
}

#[tokio::test]
async fn sole_admin_cannot_be_deleted() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (token, admin) = register(&client, &srv.base_url, "root", "admin").await;
    let admin_id = admin["id"].as_i64().unwrap();

    let res = client
        .delete(format!("{}/api/admin/users/{}", srv.base_url, admin_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Cannot delete the only admin user");
}

#[tokio::test]
async fn deleting_non_admin_user_returns_message() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (token, _) = register(&client, &srv.base_url, "root", "admin").await;
    let (_, plain) = register(&client, &srv.base_url, "frank", "user").await;

    let res = client
        .delete(format!(
            "{}/api/admin/users/{}",
            srv.base_url,
            plain["id"].as_i64().unwrap()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "User deleted successfully");
}

#[tokio::test]
async fn supplier_delete_cascades_to_contacts_and_offers() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (token, _) = register(&client, &srv.base_url, "root", "admin").await;

    let supplier_id = create_supplier(&client, &srv.base_url, &token, "Cascade Co").await;
    let product_id = create_product(&client, &srv.base_url, &token, "Steel Rod").await;

    let res = client
        .post(format!("{}/api/contacts", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "firstName": "Mara",
            "lastName": "Voss",
            "email": "mara@example.com",
            "supplierId": supplier_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let contact: Value = res.json().await.unwrap();
    assert_eq!(contact["supplier"]["name"], "Cascade Co");

    let today = Utc::now().date_naive();
    let res = client
        .post(format!("{}/api/offers", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "priceCents": 1500,
            "validFrom": (today - Duration::days(10)).format("%Y-%m-%d").to_string(),
            "validTo": (today + Duration::days(10)).format("%Y-%m-%d").to_string(),
            "supplierId": supplier_id,
            "productId": product_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let offer: Value = res.json().await.unwrap();
    let offer_id = offer["id"].as_i64().unwrap();

    let res = client
        .delete(format!("{}/api/suppliers/{}", srv.base_url, supplier_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!(
            "{}/api/contacts/{}",
            srv.base_url,
            contact["id"].as_i64().unwrap()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/api/offers/{}", srv.base_url, offer_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The product survives.
    let res = client
        .get(format!("{}/api/products/{}", srv.base_url, product_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn offer_listing_filters_on_active_window() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (token, _) = register(&client, &srv.base_url, "root", "admin").await;

    let supplier_id = create_supplier(&client, &srv.base_url, &token, "Windowed").await;
    let product_id = create_product(&client, &srv.base_url, &token, "Copper Wire").await;

    let today = Utc::now().date_naive();
    for (from, to) in [
        (today - Duration::days(5), today + Duration::days(5)),
        (today - Duration::days(90), today - Duration::days(30)),
    ] {
        let res = client
            .post(format!("{}/api/offers", srv.base_url))
            .bearer_auth(&token)
            .json(&json!({
                "priceCents": 999,
                "validFrom": from.format("%Y-%m-%d").to_string(),
                "validTo": to.format("%Y-%m-%d").to_string(),
                "supplierId": supplier_id,
                "productId": product_id,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(format!("{}/api/offers?active=true", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let offers: Value = res.json().await.unwrap();
    assert_eq!(offers.as_array().unwrap().len(), 1);
    assert_eq!(offers[0]["product"]["name"], "Copper Wire");
}

#[tokio::test]
async fn admin_stats_count_entities() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (token, _) = register(&client, &srv.base_url, "root", "admin").await;
    register(&client, &srv.base_url, "mgr", "manager").await;
    register(&client, &srv.base_url, "joe", "user").await;

    create_supplier(&client, &srv.base_url, &token, "Statful").await;
    create_product(&client, &srv.base_url, &token, "Widget").await;

    let res = client
        .get(format!("{}/api/admin/stats", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let stats: Value = res.json().await.unwrap();
    assert_eq!(stats["users"]["total"], 3);
    assert_eq!(stats["users"]["admins"], 1);
    assert_eq!(stats["users"]["managers"], 1);
    assert_eq!(stats["users"]["regularUsers"], 1);
    assert_eq!(stats["suppliers"], 1);
    assert_eq!(stats["products"], 1);
    assert_eq!(stats["offers"]["total"], 0);
}

#[tokio::test]
async fn stats_are_admin_only() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (token, _) = register(&client, &srv.base_url, "mgr", "manager").await;

    let res = client
        .get(format!("{}/api/admin/stats", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Insufficient permissions");
}

#[tokio::test]
async fn summary_report_counts_and_ranks() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (token, _) = register(&client, &srv.base_url, "root", "admin").await;

    let busy = create_supplier(&client, &srv.base_url, &token, "Busy").await;
    create_supplier(&client, &srv.base_url, &token, "Idle").await;
    let product_id = create_product(&client, &srv.base_url, &token, "Bolt").await;

    let today = Utc::now().date_naive();
    let res = client
        .post(format!("{}/api/offers", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "priceCents": 250,
            "validFrom": today.format("%Y-%m-%d").to_string(),
            "validTo": (today + Duration::days(30)).format("%Y-%m-%d").to_string(),
            "supplierId": busy,
            "productId": product_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(format!("{}/api/reports/summary", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let report: Value = res.json().await.unwrap();
    assert_eq!(report["counts"]["suppliers"], 2);
    assert_eq!(report["counts"]["offers"], 1);
    assert_eq!(report["counts"]["activeOffers"], 1);
    assert_eq!(report["topSuppliers"][0]["name"], "Busy");
    assert_eq!(report["offersByMonth"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn offers_report_filters_by_status() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let (token, _) = register(&client, &srv.base_url, "root", "admin").await;

    let supplier_id = create_supplier(&client, &srv.base_url, &token, "Mixed").await;
    let product_id = create_product(&client, &srv.base_url, &token, "Pipe").await;

    let today = Utc::now().date_naive();
    for (from, to) in [
        (today - Duration::days(5), today + Duration::days(5)),
        (today - Duration::days(90), today - Duration::days(30)),
    ] {
        let res = client
            .post(format!("{}/api/offers", srv.base_url))
            .bearer_auth(&token)
            .json(&json!({
                "priceCents": 500,
                "validFrom": from.format("%Y-%m-%d").to_string(),
                "validTo": to.format("%Y-%m-%d").to_string(),
                "supplierId": supplier_id,
                "productId": product_id,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(format!(
            "{}/api/reports/offers?status=expired",
            srv.base_url
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let offers: Value = res.json().await.unwrap();
    assert_eq!(offers.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn validation_errors_list_every_failed_field() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/register", srv.base_url))
        .json(&json!({
            "username": "ab",
            "email": "not-an-email",
            "password": "pw",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Validation Error");
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_role_in_register_body_is_enveloped() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/register", srv.base_url))
        .json(&json!({
            "username": "poser",
            "email": "poser@example.com",
            "password": "secret-pass",
            "role": "superuser",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Validation Error");
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_json_body_is_enveloped() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/register", srv.base_url))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Validation Error");
}
