//! WooCommerce webhook signature check.
//!
//! WooCommerce signs every delivery with
//! `X-WC-Webhook-Signature: base64(HMAC-SHA256(body, secret))`.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::constant_time_compare;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "x-wc-webhook-signature";

type HmacSha256 = Hmac<Sha256>;

/// Base64 HMAC-SHA256 of `body` keyed with `secret`.
#[must_use]
pub fn sign_webhook(body: &[u8], secret: &str) -> String {
    // HMAC accepts keys of any length
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Whether `signature` is the valid signature of `body`.
#[must_use]
pub fn verify_webhook_signature(body: &[u8], signature: &str, secret: &str) -> bool {
    if signature.is_empty() {
        return false;
    }
    constant_time_compare(&sign_webhook(body, secret), signature.trim())
}
