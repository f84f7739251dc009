//! Payment provider REST client (no SDK dependency)
//!
//! Only one call is made: creating a provider-side order before checkout.
//! Calls are bounded by the configured timeout and are never retried here;
//! the client may retry the whole request.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::{PaymentConfig, PaymentError};

/// Provider-side order
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderOrder {
    pub id: String,
    /// Amount in minor units (paise)
    pub amount: u64,
    pub currency: String,
}

#[derive(Debug, Serialize)]
struct CreateProviderOrder<'a> {
    amount: u64,
    currency: &'a str,
    receipt: &'a str,
}

/// Convert a major-unit amount to minor units (× 100, rounded)
pub fn to_minor_units(amount: Decimal) -> Result<u64, PaymentError> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| minor.round().to_u64())
        .ok_or_else(|| PaymentError::Internal(format!("amount {amount} out of range")))
}

#[derive(Clone)]
pub struct PaymentGateway {
    client: reqwest::Client,
    config: PaymentConfig,
}

impl PaymentGateway {
    pub fn new(config: PaymentConfig) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::Gateway(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &PaymentConfig {
        &self.config
    }

    /// `POST {api_url}/v1/orders`
    pub async fn create_order(
        &self,
        amount_minor: u64,
        receipt: &str,
    ) -> Result<ProviderOrder, PaymentError> {
        let url = format!("{}/v1/orders", self.config.api_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&CreateProviderOrder {
                amount: amount_minor,
                currency: &self.config.currency,
                receipt,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PaymentError::Gateway("payment provider timed out".into())
                } else {
                    PaymentError::Gateway(format!("payment provider unreachable: {e}"))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PaymentError::Gateway(format!(
                "payment provider returned {status}: {body}"
            )));
        }

        resp.json::<ProviderOrder>()
            .await
            .map_err(|e| PaymentError::Gateway(format!("invalid provider response: {e}")))
    }
}
