//! 订单接口集成测试: 下单金额、库存、取消、状态流转、权限

mod common;

use common::{TestApp, money, order_body};
use http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_cod_order_at_threshold_ships_free() {
    let app = TestApp::new();
    let pen = app.add_product("Fountain Pen", 500, 10);
    let token = app.customer_token();

    let (status, body) = app
        .post("/api/orders", &token, order_body(&[(&pen.id, 2)], "cod"))
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(money(&body["subtotal"]), 1000.0);
    assert_eq!(money(&body["tax"]), 180.0);
    assert_eq!(money(&body["shippingCost"]), 0.0);
    assert_eq!(money(&body["total"]), 1180.0);
    assert_eq!(body["orderStatus"], "pending");
    assert_eq!(body["paymentInfo"]["status"], "pending");
    assert_eq!(body["items"][0]["name"], "Fountain Pen");
    assert_eq!(app.stock_of(&pen.id).await, 8);
}

#[tokio::test]
async fn test_below_threshold_pays_flat_shipping() {
    let app = TestApp::new();
    let pad = app.add_product("Sketch Pad", 300, 10);

    let (status, body) = app
        .post("/api/orders", &app.customer_token(), order_body(&[(&pad.id, 3)], "cod"))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(money(&body["subtotal"]), 900.0);
    assert_eq!(money(&body["tax"]), 162.0);
    assert_eq!(money(&body["shippingCost"]), 100.0);
    assert_eq!(money(&body["total"]), 1162.0);
}

#[tokio::test]
async fn test_client_supplied_amounts_are_ignored() {
    let app = TestApp::new();
    let pen = app.add_product("Fountain Pen", 500, 10);

    let mut body = order_body(&[(&pen.id, 2)], "cod");
    body["total"] = json!(1);
    body["items"][0]["price"] = json!(0.01);

    let (status, order) = app.post("/api/orders", &app.customer_token(), body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(money(&order["items"][0]["unitPrice"]), 500.0);
    assert_eq!(money(&order["total"]), 1180.0);
}

#[tokio::test]
async fn test_insufficient_stock_reserves_nothing() {
    let app = TestApp::new();
    let pen = app.add_product("Fountain Pen", 500, 5);
    let ink = app.add_product("Ink Bottle", 150, 1);

    let (status, body) = app
        .post(
            "/api/orders",
            &app.customer_token(),
            order_body(&[(&pen.id, 2), (&ink.id, 3)], "cod"),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E4001");
    assert_eq!(app.stock_of(&pen.id).await, 5);
    assert_eq!(app.stock_of(&ink.id).await, 1);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/api/orders", &app.customer_token(), order_body(&[("missing", 1)], "cod"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");
}

#[tokio::test]
async fn test_validation_errors_carry_field_details() {
    let app = TestApp::new();
    let pen = app.add_product("Fountain Pen", 500, 5);
    let token = app.customer_token();

    let (status, body) = app.post("/api/orders", &token, order_body(&[], "cod")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"items"), "{body}");

    let (status, body) = app
        .post("/api/orders", &token, order_body(&[(&pen.id, 0)], "cod"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["details"]
            .as_array()
            .unwrap()
            .iter()
            .any(|d| d["field"] == "items[0].quantity"),
        "{body}"
    );

    let mut bad_address = order_body(&[(&pen.id, 1)], "cod");
    bad_address["shippingAddress"]["city"] = json!("   ");
    let (status, _) = app.post("/api/orders", &token, bad_address).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/orders", &token, order_body(&[(&pen.id, 1)], "bitcoin"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stock_of(&pen.id).await, 5);
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .request(Method::POST, "/api/orders", None, Some(order_body(&[], "cod")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");

    let (status, body) = app.get("/api/orders/my-orders", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3002");
}

#[tokio::test]
async fn test_cancel_restores_stock_once() {
    let app = TestApp::new();
    let pen = app.add_product("Fountain Pen", 500, 10);
    let token = app.customer_token();

    let (_, order) = app
        .post("/api/orders", &token, order_body(&[(&pen.id, 3)], "cod"))
        .await;
    let id = order["id"].as_str().unwrap();
    assert_eq!(app.stock_of(&pen.id).await, 7);

    let uri = format!("/api/orders/{id}/cancel");
    let (status, body) = app.put(&uri, &token, json!({ "reason": "ordered twice" })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["orderStatus"], "cancelled");
    assert_eq!(body["cancellationReason"], "ordered twice");
    assert_eq!(app.stock_of(&pen.id).await, 10);

    let (status, body) = app.request(Method::PUT, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E4003");
    assert_eq!(app.stock_of(&pen.id).await, 10);
}

#[tokio::test]
async fn test_foreign_orders_are_protected() {
    let app = TestApp::new();
    let pen = app.add_product("Fountain Pen", 500, 10);
    let owner = app.customer_token();
    let stranger = app.token("user-2", "user");

    let (_, order) = app
        .post("/api/orders", &owner, order_body(&[(&pen.id, 1)], "cod"))
        .await;
    let id = order["id"].as_str().unwrap();

    let (status, _) = app.get(&format!("/api/orders/{id}"), Some(&stranger)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .put(&format!("/api/orders/{id}/cancel"), &stranger, json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E2001");
    assert_eq!(app.stock_of(&pen.id).await, 9);

    let (status, body) = app.get(&format!("/api/orders/{id}"), Some(&app.admin_token())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orderStatus"], "pending");
}

#[tokio::test]
async fn test_status_transitions_are_admin_only_and_ordered() {
    let app = TestApp::new();
    let pen = app.add_product("Fountain Pen", 500, 10);
    let customer = app.customer_token();
    let admin = app.admin_token();

    let (_, order) = app
        .post("/api/orders", &customer, order_body(&[(&pen.id, 1)], "cod"))
        .await;
    let uri = format!("/api/orders/{}/status", order["id"].as_str().unwrap());

    let (status, _) = app.put(&uri, &customer, json!({ "orderStatus": "processing" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.put(&uri, &admin, json!({ "orderStatus": "delivered" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E4002");

    let (status, _) = app.put(&uri, &admin, json!({ "orderStatus": "processing" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .put(
            &uri,
            &admin,
            json!({ "orderStatus": "shipped", "carrier": "BlueDart", "trackingNumber": "BD123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trackingInfo"]["trackingNumber"], "BD123");

    let (status, body) = app.put(&uri, &admin, json!({ "orderStatus": "delivered" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["deliveredAt"].is_string());

    let (status, _) = app.put(&uri, &admin, json!({ "orderStatus": "cancelled" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, report) = app.get("/api/admin/sales-report", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report.as_array().unwrap().len(), 1);
    assert_eq!(report[0]["orderCount"], 1);
}

#[tokio::test]
async fn test_order_listings() {
    let app = TestApp::new();
    let pen = app.add_product("Fountain Pen", 100, 50);
    let customer = app.customer_token();
    let other = app.token("user-2", "user");
    let admin = app.admin_token();

    for _ in 0..3 {
        app.post("/api/orders", &customer, order_body(&[(&pen.id, 1)], "cod")).await;
    }
    app.post("/api/orders", &other, order_body(&[(&pen.id, 1)], "cod")).await;

    let (status, page) = app.get("/api/orders/my-orders?limit=2", Some(&customer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["orders"].as_array().unwrap().len(), 2);
    assert_eq!(page["totalOrders"], 3);
    assert_eq!(page["totalPages"], 2);

    let (status, _) = app.get("/api/orders", Some(&customer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, page) = app.get("/api/orders?status=pending", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalOrders"], 4);

    let (status, dashboard) = app.get("/api/admin/dashboard", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["statistics"]["totalOrders"], 4);
    assert_eq!(dashboard["statistics"]["totalProducts"], 1);
    assert_eq!(dashboard["statistics"]["totalCustomers"], 2);
    assert_eq!(dashboard["statistics"]["ordersByStatus"]["pending"], 4);
}

#[tokio::test]
async fn test_cart_quote_does_not_reserve() {
    let app = TestApp::new();
    let pen = app.add_product("Fountain Pen", 500, 3);

    let (status, quote) = app
        .post(
            "/api/cart/calculate",
            &app.customer_token(),
            json!({ "items": [{ "product": pen.id, "quantity": 2 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{quote}");
    assert_eq!(money(&quote["total"]), 1180.0);
    assert_eq!(app.stock_of(&pen.id).await, 3);
}
