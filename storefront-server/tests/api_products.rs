//! 商品接口集成测试: 公开浏览、管理员维护、评价

mod common;

use common::TestApp;
use http::{Method, StatusCode};
use serde_json::json;

fn product_body(name: &str, category: &str, price: f64) -> serde_json::Value {
    json!({
        "name": name,
        "description": "Handmade",
        "price": price,
        "category": category,
        "subcategory": "Misc",
        "stock": 5,
        "tags": ["handmade"]
    })
}

#[tokio::test]
async fn test_health_and_browsing_are_public() {
    let app = TestApp::new();
    let pen = app.add_product("Fountain Pen", 500, 10);

    let (status, body) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.get("/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let (status, body) = app.get(&format!("/api/products/{}", pen.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Fountain Pen");

    let (status, _) = app.get("/api/products/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_management_requires_admin() {
    let app = TestApp::new();
    let admin = app.admin_token();

    let (status, _) = app
        .request(
            Method::POST,
            "/api/products",
            None,
            Some(product_body("Card", "Greeting Cards", 99.0)),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post("/api/products", &app.customer_token(), product_body("Card", "Greeting Cards", 99.0))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = app
        .post("/api/products", &admin, product_body("Card", "Greeting Cards", 99.0))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["category"], "Greeting Cards");
    let id = created["id"].as_str().unwrap();

    let (status, updated) = app
        .put(&format!("/api/products/{id}"), &admin, json!({ "stock": 42 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["stock"], 42);
    assert_eq!(updated["name"], "Card");

    let (status, _) = app
        .post("/api/products", &admin, product_body("", "Gifts", -1.0))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/products/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_filters() {
    let app = TestApp::new();
    let admin = app.admin_token();
    for (name, category, price) in [
        ("Birthday Card", "Greeting Cards", 50.0),
        ("Gift Box", "Gifts", 800.0),
        ("Notebook", "Stationery", 120.0),
    ] {
        let (status, _) = app
            .post("/api/products", &admin, product_body(name, category, price))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app.get("/api/products?category=Gifts", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["products"][0]["name"], "Gift Box");

    let (_, body) = app.get("/api/products?search=note", None).await;
    assert_eq!(body["total"], 1);

    let (_, body) = app.get("/api/products?sort=price:asc&limit=2", None).await;
    assert_eq!(body["products"][0]["name"], "Birthday Card");
    assert_eq!(body["products"].as_array().unwrap().len(), 2);
    assert_eq!(body["totalPages"], 2);
}

#[tokio::test]
async fn test_reviews_once_per_user() {
    let app = TestApp::new();
    let pen = app.add_product("Fountain Pen", 500, 10);
    let token = app.customer_token();
    let uri = format!("/api/products/{}/reviews", pen.id);

    let (status, body) = app
        .post(&uri, &token, json!({ "rating": 4, "comment": "Writes smoothly" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["numReviews"], 1);

    let (status, _) = app
        .post(&uri, &token, json!({ "rating": 5, "comment": "Still great" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(&uri, &app.token("user-2", "user"), json!({ "rating": 6, "comment": "Too good" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, reviews) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviews.as_array().unwrap().len(), 1);
    assert_eq!(reviews[0]["rating"], 4);
}
