//! Order Model
//!
//! 订单及其内嵌的行项目、收货地址、支付信息。状态流转规则见
//! [`crate::orders::lifecycle`]。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::product::ProductId;
use crate::utils::validation::not_blank;

pub type OrderId = String;

/// 订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 支付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Razorpay,
    /// Cash on delivery
    Cod,
}

impl PaymentMethod {
    /// 在线支付需要支付平台确认
    pub fn is_online(&self) -> bool {
        !matches!(self, PaymentMethod::Cod)
    }
}

/// 支付状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// 行项目，单价在下单时定格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl LineItem {
    /// `None` on overflow
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

fn default_country() -> String {
    "India".to_string()
}

/// 收货地址
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(length(max = 500), custom(function = "not_blank"))]
    pub street: String,
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub city: String,
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub state: String,
    #[validate(length(max = 20), custom(function = "not_blank"))]
    pub postal_code: String,
    #[serde(default = "default_country")]
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    /// 支付平台侧订单号 (在线支付创建后关联)
    pub provider_order_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl PaymentInfo {
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            method,
            status: PaymentStatus::Pending,
            transaction_id: None,
            provider_order_id: None,
            paid_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Order model
///
/// `total == subtotal + tax + shipping_cost` always holds; the amounts are
/// only ever written by [`crate::orders::OrderTotals`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: String,
    pub items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub payment_info: PaymentInfo,
    pub order_status: OrderStatus,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub tracking_info: Option<TrackingInfo>,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

// ========== Request DTOs ==========

/// 下单行项目 (只接受商品 ID 和数量，价格由服务端读取)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[validate(length(min = 1, max = 100))]
    pub product: ProductId,
    #[validate(range(min = 1, max = 10000))]
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfoRequest {
    pub method: PaymentMethod,
}

/// 创建订单请求
///
/// Client-sent totals are not part of this shape and are dropped on
/// deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 100, message = "cart must not be empty"), nested)]
    pub items: Vec<OrderItemRequest>,
    #[validate(nested)]
    pub shipping_address: ShippingAddress,
    pub payment_info: PaymentInfoRequest,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// 更新订单状态请求 (管理员)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub order_status: OrderStatus,
    #[validate(length(min = 1, max = 100))]
    pub tracking_number: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub carrier: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl UpdateStatusRequest {
    pub fn tracking(&self) -> Option<TrackingInfo> {
        if self.tracking_number.is_none() && self.carrier.is_none() && self.estimated_delivery.is_none() {
            return None;
        }
        Some(TrackingInfo {
            carrier: self.carrier.clone(),
            tracking_number: self.tracking_number.clone(),
            estimated_delivery: self.estimated_delivery,
        })
    }
}

/// 取消订单请求
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_request_shape() {
        let json = r#"{
            "items": [{"product": "p1", "quantity": 2}],
            "shippingAddress": {"street": "1 MG Road", "city": "Pune", "state": "MH", "postalCode": "411001"},
            "paymentInfo": {"method": "cod"},
            "total": 1
        }"#;
        let req: CreateOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.items[0].quantity, 2);
        assert_eq!(req.shipping_address.country, "India");
        assert_eq!(req.payment_info.method, PaymentMethod::Cod);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_cart_and_zero_quantity_rejected() {
        let address = ShippingAddress {
            street: "s".into(),
            city: "c".into(),
            state: "st".into(),
            postal_code: "1".into(),
            country: "India".into(),
        };
        let empty = CreateOrderRequest {
            items: vec![],
            shipping_address: address.clone(),
            payment_info: PaymentInfoRequest { method: PaymentMethod::Card },
            notes: None,
        };
        assert!(empty.validate().is_err());

        let zero = CreateOrderRequest {
            items: vec![OrderItemRequest { product: "p1".into(), quantity: 0 }],
            shipping_address: address,
            payment_info: PaymentInfoRequest { method: PaymentMethod::Card },
            notes: None,
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_status_wire_names() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!(PaymentMethod::Razorpay.is_online());
        assert!(!PaymentMethod::Cod.is_online());
    }
}
