use chrono::{Duration, Utc};
use merchant_console::config::{AllowedOrigins, Config};
use merchant_console::{create_app, AppState};
use mockito::{Matcher, ServerGuard};
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

fn order_json(id: Uuid, order_type: &str, status: &str, balance: &str, next_due: Option<String>) -> Value {
    let total = 1500.0_f64;
    let balance_value: f64 = balance.parse().unwrap();
    let paid = format!("{:.2}", total - balance_value);

    json!({
        "id": id.to_string(),
        "orderNumber": "ORD-1001",
        "orderType": order_type,
        "status": status,
        "totalAmount": "1500.00",
        "paidAmount": paid,
        "balanceAmount": balance,
        "customer": {
            "id": Uuid::new_v4().to_string(),
            "name": "Jane Mwangi",
            "phone": "+254712345678"
        },
        "branch": {"id": Uuid::new_v4().to_string(), "name": "Westlands"},
        "createdDate": "2026-03-01T08:30:00Z",
        "nextDueDate": next_due,
        "notes": null
    })
}

fn page_json(items: Vec<Value>) -> Value {
    let total = items.len();
    json!({"items": items, "total": total, "limit": 20, "offset": 0})
}

#[tokio::test]
async fn test_order_list_flags_overdue_and_offers_actions_per_status() {
    let (base_url, mut server) = setup_test_app().await;
    let client = reqwest::Client::new();

    let past_due = (Utc::now() - Duration::days(10)).to_rfc3339();
    let quotation = order_json(Uuid::new_v4(), "QUOTATION", "PENDING", "1500.00", None);
    let layaway = order_json(Uuid::new_v4(), "LAYAWAY", "PARTIALLY_PAID", "400.00", Some(past_due));
    let collectable = order_json(Uuid::new_v4(), "FUTURE_COLLECTION", "FULLY_PAID", "0.00", None);

    let _list = server
        .mock("GET", "/api/orders")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page_json(vec![quotation, layaway, collectable]).to_string())
        .create_async()
        .await;

    let res = client
        .get(format!("{}/orders", base_url))
        .header("Authorization", BEARER)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("x-console-revision").unwrap().to_str().unwrap(),
        "0"
    );

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["total"], 3);

    let items = body["items"].as_array().unwrap();
    assert_eq!(items[0]["availableActions"], json!(["CONVERT_TO_ORDER"]));
    assert_eq!(items[0]["overdue"], false);

    assert_eq!(items[1]["availableActions"], json!(["PROCESS_PAYMENT"]));
    assert_eq!(items[1]["overdue"], true);

    assert_eq!(
        items[2]["availableActions"],
        json!(["MARK_READY_FOR_COLLECTION"])
    );
    assert_eq!(items[2]["overdue"], false);
}

#[tokio::test]
async fn test_order_list_overdue_filter_drops_current_orders() {
    let (base_url, mut server) = setup_test_app().await;
    let client = reqwest::Client::new();

    let past_due = (Utc::now() - Duration::days(5)).to_rfc3339();
    let future_due = (Utc::now() + Duration::days(5)).to_rfc3339();
    let overdue_id = Uuid::new_v4();
    let overdue = order_json(overdue_id, "LAYAWAY", "PARTIALLY_PAID", "400.00", Some(past_due));
    let current = order_json(Uuid::new_v4(), "LAYAWAY", "PARTIALLY_PAID", "900.00", Some(future_due));

    let _list = server
        .mock("GET", "/api/orders")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page_json(vec![overdue, current]).to_string())
        .create_async()
        .await;

    let res = client
        .get(format!("{}/orders?overdue=true", base_url))
        .header("Authorization", BEARER)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], overdue_id.to_string());
    assert_eq!(items[0]["overdue"], true);
}

#[tokio::test]
async fn test_layaway_detail_recomputes_schedule_overdue_flags() {
    let (base_url, mut server) = setup_test_app().await;
    let client = reqwest::Client::new();

    let order_id = Uuid::new_v4();
    let three_days_ago = (Utc::now() - Duration::days(3)).to_rfc3339();
    let thirty_days_ago = (Utc::now() - Duration::days(30)).to_rfc3339();

    let _order = server
        .mock("GET", format!("/api/orders/{}", order_id).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            order_json(order_id, "LAYAWAY", "PARTIALLY_PAID", "1000.00", Some(three_days_ago.clone()))
                .to_string(),
        )
        .create_async()
        .await;

    let _payments = server
        .mock("GET", format!("/api/orders/{}/payments", order_id).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([{
                "id": Uuid::new_v4().to_string(),
                "amount": "500.00",
                "paymentMethod": "MOBILE_MONEY",
                "paymentDate": thirty_days_ago,
                "reference": "MPESA-8Q2F1",
                "receivedBy": "cashier-01"
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let _summary = server
        .mock("GET", format!("/api/orders/{}/layaway", order_id).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "orderId": order_id.to_string(),
                "totalAmount": "1500.00",
                "paidAmount": "500.00",
                "balanceAmount": "1000.00",
                "installmentCount": 3,
                "installmentsPaid": 1,
                "nextDueDate": three_days_ago,
                "planMonths": 3
            })
            .to_string(),
        )
        .create_async()
        .await;

    let _schedule = server
        .mock("GET", format!("/api/orders/{}/layaway/schedule", order_id).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                {
                    "installmentNumber": 1,
                    "expectedAmount": "500.00",
                    "dueDate": (Utc::now() - Duration::days(33)).to_rfc3339(),
                    "paid": true,
                    "paidAmount": "500.00",
                    "paidDate": (Utc::now() - Duration::days(30)).to_rfc3339()
                },
                {
                    "installmentNumber": 2,
                    "expectedAmount": "500.00",
                    "dueDate": (Utc::now() - Duration::days(3)).to_rfc3339(),
                    "paid": false
                },
                {
                    "installmentNumber": 3,
                    "expectedAmount": "500.00",
                    "dueDate": (Utc::now() + Duration::days(20)).to_rfc3339(),
                    "paid": false
                }
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let res = client
        .get(format!("{}/orders/{}", base_url, order_id))
        .header("Authorization", BEARER)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();

    assert_eq!(body["order"]["id"], order_id.to_string());
    assert_eq!(body["order"]["balanceAmount"], "1000.00");
    assert_eq!(body["overdue"], true);
    assert_eq!(body["availableActions"], json!(["PROCESS_PAYMENT"]));
    assert_eq!(body["payments"][0]["paymentMethod"], "MOBILE_MONEY");
    assert_eq!(body["layaway"]["summary"]["installmentsPaid"], 1);

    let schedule = body["layaway"]["schedule"].as_array().unwrap();
    assert_eq!(schedule.len(), 3);
    assert_eq!(schedule[0]["overdue"], false);
    assert_eq!(schedule[1]["overdue"], true);
    assert_eq!(schedule[2]["overdue"], false);
}

#[tokio::test]
async fn test_payment_page_renders_balance_and_next_installment() {
    let (base_url, mut server) = setup_test_app().await;
    let client = reqwest::Client::new();

    let order_id = Uuid::new_v4();
    let next_due = (Utc::now() + Duration::days(12)).to_rfc3339();

    let _order = server
        .mock("GET", format!("/api/orders/{}", order_id).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            order_json(order_id, "LAYAWAY", "PARTIALLY_PAID", "1000.00", Some(next_due.clone()))
                .to_string(),
        )
        .create_async()
        .await;

    let _schedule = server
        .mock("GET", format!("/api/orders/{}/layaway/schedule", order_id).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                {
                    "installmentNumber": 1,
                    "expectedAmount": "500.00",
                    "dueDate": (Utc::now() - Duration::days(20)).to_rfc3339(),
                    "paid": true,
                    "paidAmount": "500.00",
                    "paidDate": (Utc::now() - Duration::days(18)).to_rfc3339()
                },
                {
                    "installmentNumber": 2,
                    "expectedAmount": "500.00",
                    "dueDate": next_due,
                    "paid": false
                }
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let res = client
        .get(format!("{}/orders/{}/payment", base_url, order_id))
        .header("Authorization", BEARER)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();

    assert_eq!(body["balanceAmount"], "1000.00");
    assert_eq!(
        body["acceptedMethods"],
        json!(["CASH", "CARD", "BANK_TRANSFER", "MOBILE_MONEY", "MIXED"])
    );
    assert_eq!(body["nextInstallment"]["installmentNumber"], 2);
    assert_eq!(body["order"]["id"], order_id.to_string());
}

#[tokio::test]
async fn test_successful_payment_revalidates_and_bumps_revision() {
    let (base_url, mut server) = setup_test_app().await;
    let client = reqwest::Client::new();

    let order_id = Uuid::new_v4();
    let payment_id = Uuid::new_v4();

    // The posted balance is a form guard, not payment data: the forwarded
    // body must carry only the payment fields.
    let payment_mock = server
        .mock("POST", format!("/api/orders/{}/payments", order_id).as_str())
        .match_body(Matcher::Json(json!({
            "amount": "500.00",
            "paymentMethod": "MOBILE_MONEY",
            "reference": "MPESA-8Q2F1"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": payment_id.to_string(),
                "amount": "500.00",
                "paymentMethod": "MOBILE_MONEY",
                "paymentDate": Utc::now().to_rfc3339(),
                "reference": "MPESA-8Q2F1",
                "receivedBy": "cashier-01"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let _list = server
        .mock("GET", "/api/orders")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page_json(vec![]).to_string())
        .create_async()
        .await;

    let res = client
        .post(format!("{}/orders/{}/payment", base_url, order_id))
        .header("Authorization", BEARER)
        .json(&json!({
            "amount": "500.00",
            "balanceAmount": "1000.00",
            "paymentMethod": "MOBILE_MONEY",
            "reference": "MPESA-8Q2F1"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Payment recorded");
    assert_eq!(body["data"]["id"], payment_id.to_string());
    assert!(body["errors"].is_null());
    assert!(body["values"].is_null());
    assert_eq!(
        body["revalidated"],
        json!([
            "/orders",
            format!("/orders/{}", order_id),
            "/reports/sales"
        ])
    );

    payment_mock.assert_async().await;

    let res = client
        .get(format!("{}/orders", base_url))
        .header("Authorization", BEARER)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("x-console-revision").unwrap().to_str().unwrap(),
        "1"
    );

    let res = client.get(format!("{}/revalidations", base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let revisions: Value = res.json().await.unwrap();
    assert_eq!(revisions["/orders"], 1);
    assert_eq!(revisions[format!("/orders/{}", order_id)], 1);
    assert_eq!(revisions["/reports/sales"], 1);
}

#[tokio::test]
async fn test_convert_quotation_reports_new_status() {
    let (base_url, mut server) = setup_test_app().await;
    let client = reqwest::Client::new();

    let order_id = Uuid::new_v4();
    let converted = order_json(order_id, "QUOTATION", "CONFIRMED", "1500.00", None);

    let convert_mock = server
        .mock("POST", format!("/api/orders/{}/convert", order_id).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(converted.to_string())
        .create_async()
        .await;

    let res = client
        .post(format!("{}/orders/{}/convert", base_url, order_id))
        .header("Authorization", BEARER)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Quotation converted to order");
    assert_eq!(body["data"]["status"], "CONFIRMED");
    assert_eq!(
        body["revalidated"],
        json!(["/orders", format!("/orders/{}", order_id)])
    );

    convert_mock.assert_async().await;
}
