//! PaymentBridge - 支付确认与订单对账
//!
//! # Verify Flow
//!
//! ```text
//! verify(request, actor)
//!     ├─ 1. Recompute HMAC, constant-time compare (fail → InvalidSignature, nothing touched)
//!     ├─ 2. Order linked to provider order id?
//!     │     ├─ yes → confirm payment on it
//!     │     └─ no, orderDetails present → create order (stock reserved), link, confirm
//!     │           (link taken by a concurrent replay → cancel the new order, Conflict)
//!     └─ 3. Neither → NotFound
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::gateway::{PaymentGateway, to_minor_units};
use super::{PaymentConfig, PaymentError, signature};
use crate::db::models::{CreateOrderRequest, Order, OrderStatus, PaymentStatus};
use crate::orders::{Actor, ManagerError, OrdersManager};
use crate::security_log;

/// 支付确认请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VerifyPaymentRequest {
    #[serde(alias = "razorpay_order_id")]
    #[validate(length(min = 1, max = 100))]
    pub provider_order_id: String,
    #[serde(alias = "razorpay_payment_id")]
    #[validate(length(min = 1, max = 100))]
    pub provider_payment_id: String,
    #[serde(alias = "razorpay_signature")]
    #[validate(length(min = 1, max = 256))]
    pub signature: String,
    /// Order to create when no local order is linked to the provider order yet
    #[serde(alias = "order_details")]
    #[validate(nested)]
    pub order_details: Option<CreateOrderRequest>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub message: String,
    pub order_id: String,
    pub order: Order,
}

/// 创建平台订单的响应 (前端用于拉起支付)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOrderResponse {
    pub order_id: String,
    pub provider_order_id: String,
    /// Minor units
    pub amount: u64,
    pub currency: String,
    pub key_id: String,
}

pub struct PaymentBridge {
    gateway: PaymentGateway,
    orders: Arc<OrdersManager>,
}

impl std::fmt::Debug for PaymentBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentBridge")
            .field("config", self.gateway.config())
            .finish()
    }
}

impl PaymentBridge {
    pub fn new(config: PaymentConfig, orders: Arc<OrdersManager>) -> Result<Self, PaymentError> {
        Ok(Self {
            gateway: PaymentGateway::new(config)?,
            orders,
        })
    }

    fn config(&self) -> &PaymentConfig {
        self.gateway.config()
    }

    /// Check the provider signature for `order_id|payment_id`
    pub fn verify_signature(&self, provider_order_id: &str, provider_payment_id: &str, sig: &str) -> bool {
        signature::verify(
            provider_order_id,
            provider_payment_id,
            sig,
            &self.config().key_secret,
        )
    }

    /// Reconcile a provider payment confirmation with a local order
    pub fn verify(
        &self,
        request: VerifyPaymentRequest,
        actor: &Actor,
    ) -> Result<VerifyPaymentResponse, PaymentError> {
        if !self.verify_signature(
            &request.provider_order_id,
            &request.provider_payment_id,
            &request.signature,
        ) {
            security_log!(
                "WARN",
                "payment_signature_mismatch",
                provider_order_id = request.provider_order_id.as_str(),
                user_id = actor.user_id.as_str()
            );
            return Err(PaymentError::InvalidSignature);
        }

        let order_id = match self.orders.find_by_provider_order(&request.provider_order_id)? {
            Some(order) => {
                if !actor.is_admin && !order.is_owned_by(&actor.user_id) {
                    return Err(ManagerError::Forbidden(
                        "Payment belongs to another user's order".into(),
                    )
                    .into());
                }
                order.id
            }
            None => {
                let Some(details) = request.order_details else {
                    return Err(ManagerError::OrderNotFound(request.provider_order_id).into());
                };
                if !details.payment_info.method.is_online() {
                    return Err(ManagerError::Validation(
                        "orderDetails must use an online payment method".into(),
                    )
                    .into());
                }
                let created = self.orders.create_order(actor, details)?;
                if let Err(e) = self
                    .orders
                    .link_provider_order(&created.id, &request.provider_order_id)
                {
                    self.abandon_order(&created.id, actor);
                    return Err(e.into());
                }
                created.id
            }
        };

        let order = self
            .orders
            .confirm_payment(&order_id, &request.provider_payment_id)?;

        tracing::info!(
            order_id = %order.id,
            provider_order_id = %request.provider_order_id,
            "Payment verified"
        );

        Ok(VerifyPaymentResponse {
            message: "Payment verified successfully".into(),
            order_id: order.id.clone(),
            order,
        })
    }

    /// Cancel an order created for a confirmation that could not be linked,
    /// returning its reserved stock
    fn abandon_order(&self, order_id: &str, actor: &Actor) {
        let reason = Some("Payment confirmation could not be linked".to_string());
        match self.orders.cancel(order_id, actor, reason) {
            Ok(_) => tracing::warn!(target: "payment", order_id = %order_id, "Unlinked order cancelled"),
            Err(e) => tracing::error!(
                target: "payment",
                order_id = %order_id,
                error = %e,
                "Failed to cancel unlinked order, stock stays reserved"
            ),
        }
    }

    /// Create the provider-side order for an online order awaiting payment
    pub async fn create_provider_order(
        &self,
        order_id: &str,
        actor: &Actor,
    ) -> Result<ProviderOrderResponse, PaymentError> {
        let order = self.orders.get_order(order_id, actor)?;
        if !order.payment_info.method.is_online() {
            return Err(ManagerError::PaymentRejected(
                "Cash on delivery orders are not paid online".into(),
            )
            .into());
        }
        if order.payment_info.status == PaymentStatus::Paid {
            return Err(ManagerError::AlreadyPaid(order.id).into());
        }
        if !matches!(order.order_status, OrderStatus::Pending | OrderStatus::Processing) {
            return Err(
                ManagerError::PaymentRejected(format!("Order is {}", order.order_status)).into(),
            );
        }

        let amount = to_minor_units(order.total)?;
        let provider_order = self.gateway.create_order(amount, &order.id).await?;
        self.orders
            .link_provider_order(&order.id, &provider_order.id)?;

        tracing::info!(
            order_id = %order.id,
            provider_order_id = %provider_order.id,
            amount,
            "Provider order created"
        );

        Ok(ProviderOrderResponse {
            order_id: order.id,
            provider_order_id: provider_order.id,
            amount: provider_order.amount,
            currency: provider_order.currency,
            key_id: self.config().key_id.clone(),
        })
    }
}
