use anyhow::Result;
use landingpage::{
    store::{StoreError, StoreResult, Subscription, SubscriptionStore},
    web::types::ValidEmail,
};
use reqwest::{multipart, StatusCode};
use serde_json::{json, Value};
use tokio::task::JoinSet;

use crate::helpers::{TestApp, SUBSCRIBE_PATH};

/// Every call fails the way an exhausted connection pool would.
struct FailingStore;

impl SubscriptionStore for FailingStore {
    async fn find_by_email(&self, _: &ValidEmail) -> StoreResult<Option<Subscription>> {
        Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut))
    }
    async fn create(&self, _: &ValidEmail) -> StoreResult<Option<Subscription>> {
        Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut))
    }
}

fn invalid_request() -> Value {
    json!({
        "success": false,
        "errors": { "__all__": "Invalid request" }
    })
}

#[tokio::test]
async fn subscribe_valid_email_returns_success_and_stores_it() -> Result<()> {
    let app = TestApp::spawn().await?;

    let body = app.subscribe_json("alice@example.com").await?;

    assert_eq!(body, json!({ "success": true }));
    assert_eq!(app.store_len(), 1);

    Ok(())
}

#[tokio::test]
async fn subscribe_same_email_repeatedly_keeps_a_single_record() -> Result<()> {
    let app = TestApp::spawn().await?;

    for _ in 0..5 {
        let body = app.subscribe_json("alice@example.com").await?;
        assert_eq!(body, json!({ "success": true }));
    }

    assert_eq!(app.store_len(), 1);

    Ok(())
}

#[tokio::test]
async fn subscribe_distinct_emails_are_stored_separately() -> Result<()> {
    let app = TestApp::spawn().await?;

    app.subscribe_json("alice@example.com").await?;
    app.subscribe_json("bob@example.com").await?;
    // Only surrounding whitespace gets stripped, so this one matches alice.
    app.subscribe_json("  alice@example.com ").await?;

    assert_eq!(app.store_len(), 2);

    Ok(())
}

#[tokio::test]
async fn subscribe_invalid_email_returns_field_error() -> Result<()> {
    let app = TestApp::spawn().await?;

    let cases = [
        ("not-an-email", "Enter a valid email address."),
        ("ursuladomain.com", "Enter a valid email address."),
        ("@domain.com", "Enter a valid email address."),
        ("a@b", "Enter a valid email address."),
        ("user@example", "Enter a valid email address."),
        ("", "This field is required."),
        ("   ", "This field is required."),
    ];

    for (email, message) in cases {
        let body = app.subscribe_json(email).await?;
        assert_eq!(
            body,
            json!({
                "success": false,
                "errors": { "email": [message] }
            }),
            "Unexpected response for email: '{email}'"
        );
    }

    assert_eq!(app.store_len(), 0);

    Ok(())
}

#[tokio::test]
async fn subscribe_too_long_email_returns_field_error() -> Result<()> {
    let app = TestApp::spawn().await?;
    let email = format!("{}@example.com", "a".repeat(250));

    let body = app.subscribe_json(&email).await?;

    assert_eq!(
        body,
        json!({
            "success": false,
            "errors": {
                "email": ["Ensure this value has at most 254 characters (it has 262)."]
            }
        })
    );
    assert_eq!(app.store_len(), 0);

    Ok(())
}

#[tokio::test]
async fn subscribe_form_without_email_field_returns_required_error() -> Result<()> {
    let app = TestApp::spawn().await?;

    let body: Value = app
        .http_client
        .post(app.url(SUBSCRIBE_PATH))
        .form(&[("name", "Ursula")])
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(
        body,
        json!({
            "success": false,
            "errors": { "email": ["This field is required."] }
        })
    );
    assert_eq!(app.store_len(), 0);

    Ok(())
}

#[tokio::test]
async fn subscribe_non_post_methods_return_invalid_request() -> Result<()> {
    let app = TestApp::spawn().await?;
    let url = app.url(SUBSCRIBE_PATH);

    let requests = [
        ("GET", app.http_client.get(&url)),
        ("PUT", app.http_client.put(&url).form(&[("email", "a@b.com")])),
        ("DELETE", app.http_client.delete(&url)),
        ("PATCH", app.http_client.patch(&url).form(&[("email", "a@b.com")])),
    ];

    for (method, request) in requests {
        let res = request.send().await?;
        assert_eq!(res.status(), StatusCode::OK, "Wrong status for {method}");

        let body: Value = res.json().await?;
        assert_eq!(body, invalid_request(), "Wrong body for {method}");
    }

    assert_eq!(app.store_len(), 0);

    Ok(())
}

#[tokio::test]
async fn subscribe_non_form_payload_returns_invalid_request() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .http_client
        .post(app.url(SUBSCRIBE_PATH))
        .json(&json!({ "email": "alice@example.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body, invalid_request());
    assert_eq!(app.store_len(), 0);

    Ok(())
}

#[tokio::test]
async fn subscribe_multipart_form_returns_success_and_stores_it() -> Result<()> {
    let app = TestApp::spawn().await?;

    let form = multipart::Form::new()
        .text("name", "Alice")
        .text("email", "alice@example.com");
    let res = app
        .http_client
        .post(app.url(SUBSCRIBE_PATH))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(app.store_len(), 1);

    Ok(())
}

#[tokio::test]
async fn subscribe_multipart_form_with_invalid_email_returns_field_error() -> Result<()> {
    let app = TestApp::spawn().await?;

    let form = multipart::Form::new().text("email", "user@example");
    let body: Value = app
        .http_client
        .post(app.url(SUBSCRIBE_PATH))
        .multipart(form)
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(
        body,
        json!({
            "success": false,
            "errors": { "email": ["Enter a valid email address."] }
        })
    );
    assert_eq!(app.store_len(), 0);

    Ok(())
}

#[tokio::test]
async fn subscribe_store_failure_returns_service_error_with_request_id() -> Result<()> {
    let app = TestApp::spawn_with_store(FailingStore).await?;

    let res = app.subscribe_post("alice@example.com").await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let header_req_id = res
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .map(str::to_owned)
        .expect("error response should carry the x-request-id header");

    let body: Value = res.json().await?;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["errors"], json!({ "__all__": "Service error" }));
    assert_eq!(body["req_id"], json!(header_req_id));

    Ok(())
}

#[tokio::test]
async fn subscribe_invalid_request_has_no_request_id_in_body() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.http_client.get(app.url(SUBSCRIBE_PATH)).send().await?;
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = res.json().await?;
    assert_eq!(body, invalid_request());

    Ok(())
}

#[tokio::test]
async fn subscribe_route_without_trailing_slash_works() -> Result<()> {
    let app = TestApp::spawn().await?;

    let body: Value = app
        .http_client
        .post(app.url(SUBSCRIBE_PATH.trim_end_matches('/')))
        .form(&[("email", "alice@example.com")])
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body, json!({ "success": true }));
    assert_eq!(app.store_len(), 1);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_subscriptions_of_the_same_email_store_one_record() -> Result<()> {
    let app = TestApp::spawn().await?;

    let mut requests = JoinSet::new();
    for _ in 0..20 {
        let http_client = app.http_client.clone();
        let url = app.url(SUBSCRIBE_PATH);
        requests.spawn(async move {
            http_client
                .post(url)
                .form(&[("email", "race@example.com")])
                .send()
                .await?
                .json::<Value>()
                .await
        });
    }

    while let Some(res) = requests.join_next().await {
        let body = res??;
        assert_eq!(body, json!({ "success": true }));
    }

    assert_eq!(app.store_len(), 1);

    Ok(())
}
