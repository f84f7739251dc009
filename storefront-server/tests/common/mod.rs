//! 集成测试公共工具
//!
//! 每个 TestApp 使用独立的临时目录 (redb 文件)，通过 oneshot 驱动完整路由

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use storefront_server::db::models::{Category, Product, ProductCreate};
use storefront_server::services::build_router;
use storefront_server::{Config, ServerState};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub state: ServerState,
    pub router: Router,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// 指向本地假支付平台
    pub fn with_payment_api(api_url: &str) -> Self {
        Self::build(Some(api_url))
    }

    fn build(payment_api: Option<&str>) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config::with_overrides(dir.path().to_string_lossy(), 0).expect("config");
        config.payment.key_id = "key_test_123".into();
        config.payment.key_secret = "test_payment_secret".into();
        if let Some(url) = payment_api {
            config.payment.api_url = url.to_string();
        }
        let state = ServerState::initialize(&config).expect("state");
        let router = build_router(state.clone());
        Self {
            state,
            router,
            _dir: dir,
        }
    }

    pub fn token(&self, user_id: &str, role: &str) -> String {
        self.state
            .jwt_service
            .generate_token(user_id, &format!("{user_id}-name"), role)
            .expect("token")
    }

    pub fn customer_token(&self) -> String {
        self.token("user-1", "user")
    }

    pub fn admin_token(&self) -> String {
        self.token("admin-1", "admin")
    }

    pub fn add_product(&self, name: &str, price: i64, stock: u32) -> Product {
        self.state
            .catalog
            .create(ProductCreate {
                name: name.into(),
                description: format!("{name} description"),
                price: Decimal::from(price),
                category: Category::Stationery,
                subcategory: "Notebooks".into(),
                images: vec![],
                stock,
                discount: 0,
                tags: vec![],
                featured: false,
            })
            .expect("create product")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("oneshot");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn stock_of(&self, product_id: &str) -> u64 {
        let (status, body) = self.get(&format!("/api/products/{product_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        body["stock"].as_u64().expect("stock")
    }
}

pub fn address() -> Value {
    json!({
        "street": "12 MG Road",
        "city": "Bengaluru",
        "state": "KA",
        "postalCode": "560001",
        "country": "India"
    })
}

pub fn order_body(items: &[(&str, u32)], method: &str) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|(product, quantity)| json!({ "product": product, "quantity": quantity }))
        .collect();
    json!({
        "items": items,
        "shippingAddress": address(),
        "paymentInfo": { "method": method }
    })
}

pub fn money(value: &Value) -> f64 {
    value.as_f64().expect("numeric amount")
}
