//! 支付回调签名 (HMAC-SHA256)
//!
//! The provider signs `"{order_id}|{payment_id}"` with the shared key secret
//! and sends the lowercase hex digest.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::PaymentError;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(order_id: &str, payment_id: &str, secret: &str) -> Result<HmacSha256, PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| PaymentError::Internal("HMAC key error".into()))?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(mac)
}

/// Hex-encoded HMAC-SHA256 over `order_id|payment_id`
pub fn sign(order_id: &str, payment_id: &str, secret: &str) -> Result<String, PaymentError> {
    let mac = mac_for(order_id, payment_id, secret)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a provider signature.
///
/// Malformed hex is simply invalid.
pub fn verify(order_id: &str, payment_id: &str, signature: &str, secret: &str) -> bool {
    let Ok(sig_bytes) = hex::decode(signature.trim()) else {
        return false;
    };
    match mac_for(order_id, payment_id, secret) {
        Ok(mac) => mac.verify_slice(&sig_bytes).is_ok(),
        Err(_) => false,
    }
}
