//! Integration tests for the invoice creation/totals flow, driven through
//! the real router against an in-memory database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use shopkeep_api::{ApiConfig, AppState};
use shopkeep_db::{Database, DbConfig};

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    shopkeep_api::router(AppState::new(db, ApiConfig::default()))
}

async fn request(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Seeds a customer and returns its id.
async fn seed_customer(app: &Router, name: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/customers",
        Some(json!({ "name": name, "phone": "0300-1234567" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

/// Seeds a product and returns its id.
async fn seed_product(app: &Router, sku: &str, name: &str, price: i64) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/products",
        Some(json!({ "sku": sku, "name": name, "price": price })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

/// Standard two-item creation payload: 500 + 700, gst 100, discount 50.
fn worked_payload(customer: &str, p1: &str, p2: &str) -> Value {
    json!({
        "customer": customer,
        "items": [
            { "productId": p1, "name": "Shirt", "finalSoldPrice": 500 },
            { "productId": p2, "name": "Pants", "finalSoldPrice": 700 }
        ],
        "gstTotalAmount": 100,
        "totalDiscount": 50,
        "paymentMethod": "cash",
        "soldBy": "staff-1"
    })
}

#[tokio::test]
async fn test_worked_example_totals() {
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;
    let p2 = seed_product(&app, "PANTS-001", "Pants", 700).await;

    let (status, body) =
        request(&app, "POST", "/invoices", Some(worked_payload(&customer, &p1, &p2))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["intialTotalPrice"], 1200);
    assert_eq!(data["gstTotalAmount"], 100);
    assert_eq!(data["totalDiscount"], 50);
    assert_eq!(data["totalFinalPrice"], 1250);

    let number = data["invoiceNumber"].as_str().unwrap();
    assert!(number.starts_with("INV-"));
    assert_eq!(number.len(), "INV-".len() + 10);

    // Flattened projection: product fields plus finalSoldPrice, product name
    // superseding the item name, no separate name snapshot field.
    let items = data["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["sku"], "SHIRT-001");
    assert_eq!(items[0]["name"], "Shirt");
    assert_eq!(items[0]["price"], 500);
    assert_eq!(items[0]["finalSoldPrice"], 500);
    assert_eq!(items[1]["finalSoldPrice"], 700);
}

#[tokio::test]
async fn test_totals_default_to_zero() {
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;

    let (status, body) = request(
        &app,
        "POST",
        "/invoices",
        Some(json!({
            "customer": customer,
            "items": [{ "productId": p1, "name": "Shirt", "finalSoldPrice": 500 }],
            "paymentMethod": "card",
            "soldBy": "staff-1"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["gstTotalAmount"], 0);
    assert_eq!(body["data"]["totalDiscount"], 0);
    assert_eq!(body["data"]["totalFinalPrice"], 500);
}

#[tokio::test]
async fn test_missing_required_fields_persist_nothing() {
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;
    let full = worked_payload(&customer, &p1, &p1);

    for field in ["customer", "items", "paymentMethod", "soldBy"] {
        let mut payload = full.clone();
        payload.as_object_mut().unwrap().remove(field);

        let (status, body) = request(&app, "POST", "/invoices", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "dropping {field}");
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains(field));
    }

    // None of the rejected requests left an invoice behind.
    let (_, body) = request(&app, "GET", "/invoices", None).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_empty_items_rejected() {
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;

    let (status, body) = request(
        &app,
        "POST",
        "/invoices",
        Some(json!({
            "customer": customer,
            "items": [],
            "paymentMethod": "cash",
            "soldBy": "staff-1"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "items is required");
}

#[tokio::test]
async fn test_item_missing_field_names_it() {
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;

    let (status, body) = request(
        &app,
        "POST",
        "/invoices",
        Some(json!({
            "customer": customer,
            "items": [
                { "productId": p1, "name": "Shirt", "finalSoldPrice": 500 },
                { "productId": p1, "name": "Pants" }
            ],
            "paymentMethod": "cash",
            "soldBy": "staff-1"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "items[1].finalSoldPrice is required");
}

#[tokio::test]
async fn test_unknown_customer_is_400() {
    let app = app().await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;

    let (status, body) =
        request(&app, "POST", "/invoices", Some(worked_payload("ghost", &p1, &p1))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn test_unknown_product_aborts_whole_creation() {
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;

    let (status, body) = request(
        &app,
        "POST",
        "/invoices",
        Some(worked_payload(&customer, &p1, "no-such-product")),
    )
    .await;

    // 400 naming the missing id, nothing persisted, aggregate untouched.
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("no-such-product"));

    let (_, invoices) = request(&app, "GET", "/invoices", None).await;
    assert_eq!(invoices["pagination"]["total"], 0);

    let (_, cust) = request(&app, "GET", &format!("/customers/{customer}"), None).await;
    assert_eq!(cust["data"]["totalPurchases"], 0);
    assert!(cust["data"]["lastPurchaseDate"].is_null());
}

#[tokio::test]
async fn test_soft_deleted_product_rejected_on_create() {
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;
    let p2 = seed_product(&app, "PANTS-001", "Pants", 700).await;

    let (status, _) = request(&app, "DELETE", &format!("/products/{p1}"), None).await;
    assert_eq!(status, StatusCode::OK);

    // A deactivated product counts as gone: creation fails outright rather
    // than charging for an item the projection would hide.
    let (status, body) =
        request(&app, "POST", "/invoices", Some(worked_payload(&customer, &p1, &p2))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains(&p1));

    let (_, invoices) = request(&app, "GET", "/invoices", None).await;
    assert_eq!(invoices["pagination"]["total"], 0);

    let (_, cust) = request(&app, "GET", &format!("/customers/{customer}"), None).await;
    assert_eq!(cust["data"]["totalPurchases"], 0);
}

#[tokio::test]
async fn test_soft_deleted_customer_rejected_on_create() {
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;
    let p2 = seed_product(&app, "PANTS-001", "Pants", 700).await;

    let (status, _) = request(&app, "DELETE", &format!("/customers/{customer}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        request(&app, "POST", "/invoices", Some(worked_payload(&customer, &p1, &p2))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains(&customer));
}

#[tokio::test]
async fn test_malformed_body_gets_failure_envelope() {
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;

    // Unknown enum value: rejected at deserialization, but still wrapped in
    // the standard failure envelope.
    let mut payload = worked_payload(&customer, &p1, &p1);
    payload["paymentMethod"] = json!("bitcoin");

    let (status, body) = request(&app, "POST", "/invoices", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let (_, invoices) = request(&app, "GET", "/invoices", None).await;
    assert_eq!(invoices["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_update_null_keeps_stored_value() {
    // Merge semantics: explicit null reads as "leave alone", so notes can
    // be set through PUT but never cleared.
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;
    let p2 = seed_product(&app, "PANTS-001", "Pants", 700).await;

    let (_, created) =
        request(&app, "POST", "/invoices", Some(worked_payload(&customer, &p1, &p2))).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (_, _) = request(
        &app,
        "PUT",
        &format!("/invoices/{id}"),
        Some(json!({ "notes": "called ahead" })),
    )
    .await;

    let (status, updated) = request(
        &app,
        "PUT",
        &format!("/invoices/{id}"),
        Some(json!({ "notes": null, "paymentStatus": "paid" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["notes"], "called ahead");
    assert_eq!(updated["data"]["paymentStatus"], "paid");
}

#[tokio::test]
async fn test_customer_aggregate_accumulates() {
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;
    let p2 = seed_product(&app, "PANTS-001", "Pants", 700).await;

    let payload = worked_payload(&customer, &p1, &p2);
    let (status, _) = request(&app, "POST", "/invoices", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = request(&app, "POST", "/invoices", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);

    // Two grand totals of 1250 each.
    let (_, cust) = request(&app, "GET", &format!("/customers/{customer}"), None).await;
    assert_eq!(cust["data"]["totalPurchases"], 2500);
    assert!(cust["data"]["lastPurchaseDate"].is_string());
}

#[tokio::test]
async fn test_identical_payloads_get_distinct_numbers() {
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;
    let p2 = seed_product(&app, "PANTS-001", "Pants", 700).await;

    let payload = worked_payload(&customer, &p1, &p2);
    let (_, first) = request(&app, "POST", "/invoices", Some(payload.clone())).await;
    let (_, second) = request(&app, "POST", "/invoices", Some(payload)).await;

    assert_ne!(first["data"]["invoiceNumber"], second["data"]["invoiceNumber"]);
}

#[tokio::test]
async fn test_soft_delete_keeps_invoice_retrievable() {
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;
    let p2 = seed_product(&app, "PANTS-001", "Pants", 700).await;

    let (_, created) =
        request(&app, "POST", "/invoices", Some(worked_payload(&customer, &p1, &p2))).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = request(&app, "DELETE", &format!("/invoices/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(&app, "GET", &format!("/invoices/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["purchaseStatus"], "cancelled");
    assert_eq!(body["data"]["paymentStatus"], "failed");

    // Cancellation does not reverse the customer aggregate.
    let (_, cust) = request(&app, "GET", &format!("/customers/{customer}"), None).await;
    assert_eq!(cust["data"]["totalPurchases"], 1250);
}

#[tokio::test]
async fn test_update_into_paid_stamps_paid_at() {
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;
    let p2 = seed_product(&app, "PANTS-001", "Pants", 700).await;

    let (_, created) =
        request(&app, "POST", "/invoices", Some(worked_payload(&customer, &p1, &p2))).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert!(created["data"]["paidAt"].is_null());

    let (status, updated) = request(
        &app,
        "PUT",
        &format!("/invoices/{id}"),
        Some(json!({ "paymentStatus": "paid" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["paymentStatus"], "paid");
    assert!(updated["data"]["paidAt"].is_string());
}

#[tokio::test]
async fn test_update_rejects_nothing_but_allowed_fields() {
    // Totals are immutable: an update carrying them simply ignores them.
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;
    let p2 = seed_product(&app, "PANTS-001", "Pants", 700).await;

    let (_, created) =
        request(&app, "POST", "/invoices", Some(worked_payload(&customer, &p1, &p2))).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, updated) = request(
        &app,
        "PUT",
        &format!("/invoices/{id}"),
        Some(json!({ "totalFinalPrice": 1, "notes": "called ahead" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["totalFinalPrice"], 1250);
    assert_eq!(updated["data"]["notes"], "called ahead");
}

#[tokio::test]
async fn test_missing_invoice_is_404() {
    let app = app().await;

    for method in ["GET", "PUT", "DELETE"] {
        let body = (method == "PUT").then(|| json!({ "notes": "x" }));
        let (status, payload) = request(&app, method, "/invoices/no-such-id", body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(payload["success"], false);
    }
}

#[tokio::test]
async fn test_list_filters_and_pagination() {
    let app = app().await;
    let customer_a = seed_customer(&app, "Ali Traders").await;
    let customer_b = seed_customer(&app, "Beta Mart").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;
    let p2 = seed_product(&app, "PANTS-001", "Pants", 700).await;

    for customer in [&customer_a, &customer_a, &customer_b] {
        let (status, _) =
            request(&app, "POST", "/invoices", Some(worked_payload(customer, &p1, &p2))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = request(&app, "GET", "/invoices?page=1&limit=2", None).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);
    assert_eq!(all["pagination"]["total"], 3);
    assert_eq!(all["pagination"]["totalPages"], 2);

    let (_, filtered) = request(
        &app,
        "GET",
        &format!("/invoices?customerId={customer_b}"),
        None,
    )
    .await;
    assert_eq!(filtered["pagination"]["total"], 1);

    let (_, none) = request(&app, "GET", "/invoices?paymentStatus=paid", None).await;
    assert_eq!(none["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_projection_drops_items_of_deleted_product() {
    let app = app().await;
    let customer = seed_customer(&app, "Ali Traders").await;
    let p1 = seed_product(&app, "SHIRT-001", "Shirt", 500).await;
    let p2 = seed_product(&app, "PANTS-001", "Pants", 700).await;

    let (_, created) =
        request(&app, "POST", "/invoices", Some(worked_payload(&customer, &p1, &p2))).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = request(&app, "DELETE", &format!("/products/{p2}"), None).await;
    assert_eq!(status, StatusCode::OK);

    // Flattened list projection drops the now-unresolvable item, silently.
    let (_, listed) = request(&app, "GET", "/invoices", None).await;
    let items = listed["data"][0]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["sku"], "SHIRT-001");

    // Totals are untouched: the projection is display-only.
    assert_eq!(listed["data"][0]["totalFinalPrice"], 1250);

    // The expanded detail keeps the frozen snapshot of both items.
    let (_, detail) = request(&app, "GET", &format!("/invoices/{id}"), None).await;
    assert_eq!(detail["data"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = request(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}
