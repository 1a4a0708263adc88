use merchant_console::config::{AllowedOrigins, Config};
use merchant_console::{create_app, AppState};
use mockito::ServerGuard;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

const BEARER: &str = "Bearer test-session-token";

async fn setup_test_app() -> (String, ServerGuard) {
    let server = mockito::Server::new_async().await;

    let config = Config {
        server_port: 0,
        backoffice_api_url: server.url(),
        service_token: None,
        collection_grace_days: 7,
        allowed_origins: AllowedOrigins::Any,
    };

    let app = create_app(AppState::new(config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), server)
}

#[tokio::test]
async fn test_invalid_payment_never_reaches_the_backoffice() {
    let (base_url, mut server) = setup_test_app().await;
    let client = reqwest::Client::new();

    let order_id = Uuid::new_v4();
    let untouched = server
        .mock("POST", format!("/api/orders/{}/payments", order_id).as_str())
        .expect(0)
        .create_async()
        .await;

    let payload = json!({
        "amount": "-50",
        "balanceAmount": "1000.00",
        "paymentMethod": "BITCOIN"
    });

    let res = client
        .post(format!("{}/orders/{}/payment", base_url, order_id))
        .header("Authorization", BEARER)
        .json(&payload)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"]["amount"], "must be greater than zero");
    assert_eq!(
        body["errors"]["paymentMethod"],
        "must be one of: CASH, CARD, BANK_TRANSFER, MOBILE_MONEY, MIXED"
    );
    assert_eq!(body["values"], payload);
    assert!(body["revalidated"].is_null());

    untouched.assert_async().await;
}

#[tokio::test]
async fn test_payment_above_posted_balance_is_rejected() {
    let (base_url, mut server) = setup_test_app().await;
    let client = reqwest::Client::new();

    let order_id = Uuid::new_v4();
    let untouched = server
        .mock("POST", format!("/api/orders/{}/payments", order_id).as_str())
        .expect(0)
        .create_async()
        .await;

    let res = client
        .post(format!("{}/orders/{}/payment", base_url, order_id))
        .header("Authorization", BEARER)
        .json(&json!({
            "amount": "1500.00",
            "balanceAmount": "1000.00",
            "paymentMethod": "CASH"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errors"]["amount"], "must not exceed the outstanding balance");
    assert_eq!(body["values"]["amount"], "1500.00");

    untouched.assert_async().await;
}

#[tokio::test]
async fn test_empty_payment_collects_every_field_error() {
    let (base_url, _server) = setup_test_app().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders/{}/payment", base_url, Uuid::new_v4()))
        .header("Authorization", BEARER)
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();

    let errors = body["errors"].as_object().unwrap();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors["amount"], "must not be empty");
    assert_eq!(errors["balanceAmount"], "must not be empty");
    assert_eq!(errors["paymentMethod"], "must not be empty");
    assert_eq!(body["values"], json!({}));
}

#[tokio::test]
async fn test_non_object_payload_is_rejected_with_payload_error() {
    let (base_url, _server) = setup_test_app().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders/{}/payment", base_url, Uuid::new_v4()))
        .header("Authorization", BEARER)
        .json(&json!([1, 2, 3]))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errors"]["payload"], "must be a JSON object with text fields");
    assert_eq!(body["values"], json!([1, 2, 3]));
}

#[tokio::test]
async fn test_backoffice_rejection_passes_message_through_verbatim() {
    let (base_url, mut server) = setup_test_app().await;
    let client = reqwest::Client::new();

    let order_id = Uuid::new_v4();
    let rejection = server
        .mock("POST", format!("/api/orders/{}/payments", order_id).as_str())
        .with_status(409)
        .with_header("content-type", "application/json")
        .with_body(json!({"message": "Order is already fully paid"}).to_string())
        .create_async()
        .await;

    let payload = json!({
        "amount": "200.00",
        "balanceAmount": "1000.00",
        "paymentMethod": "CASH"
    });

    let res = client
        .post(format!("{}/orders/{}/payment", base_url, order_id))
        .header("Authorization", BEARER)
        .json(&payload)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Order is already fully paid");
    assert!(body["errors"].is_null());
    assert_eq!(body["values"], payload);
    assert!(body["revalidated"].is_null());

    rejection.assert_async().await;

    // Nothing was revalidated on the failed action.
    let res = client.get(format!("{}/revalidations", base_url)).send().await.unwrap();
    let revisions: Value = res.json().await.unwrap();
    assert_eq!(revisions, json!({}));
}

#[tokio::test]
async fn test_create_order_collects_errors_across_all_fields() {
    let (base_url, mut server) = setup_test_app().await;
    let client = reqwest::Client::new();

    let untouched = server
        .mock("POST", "/api/orders")
        .expect(0)
        .create_async()
        .await;

    let res = client
        .post(format!("{}/orders", base_url))
        .header("Authorization", BEARER)
        .json(&json!({
            "customerId": "not-a-uuid",
            "orderType": "LAYAWAY",
            "items": [],
            "planMonths": "0"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();

    let errors = body["errors"].as_object().unwrap();
    assert_eq!(errors["customerId"], "must be a valid id");
    assert_eq!(errors["branchId"], "must not be empty");
    assert_eq!(errors["items"], "must contain at least one item");
    assert_eq!(errors["planMonths"], "must be between 1 and 36 for layaway orders");
    assert_eq!(body["values"]["customerId"], "not-a-uuid");

    untouched.assert_async().await;
}

#[tokio::test]
async fn test_order_item_errors_carry_their_position() {
    let (base_url, _server) = setup_test_app().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders", base_url))
        .header("Authorization", BEARER)
        .header("x-console-branch", Uuid::new_v4().to_string())
        .json(&json!({
            "customerId": Uuid::new_v4().to_string(),
            "orderType": "IMMEDIATE_SALE",
            "items": [
                {"productId": Uuid::new_v4().to_string(), "quantity": "2"},
                {"productId": Uuid::new_v4().to_string(), "quantity": "0"}
            ]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body["errors"]["items"],
        "item 2: quantity must be a positive whole number"
    );
}
