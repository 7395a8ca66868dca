//! IPN signature algorithm and verification.
//!
//! NOWPayments signs every IPN delivery and sends the result in a header:
//!
//! ```text
//! x-nowpayments-sig: hex(HMAC-SHA512(canonical_json(body), ipn_secret))
//! ```
//!
//! `canonical_json` sorts the **top-level** keys of the body byte-wise and
//! serializes the result as compact JSON. Nested objects are serialized in
//! the order they arrived; they are not sorted. The remote signer works
//! this way and any deviation makes every verification fail.

use ring::hmac;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::config::IpnSecret;
use crate::objects::Payload;

/// Header name carrying the IPN signature.
pub const IPN_SIGNATURE_HEADER: &str = "x-nowpayments-sig";

/// Length of a hex-encoded HMAC-SHA512 digest.
pub const SIGNATURE_HEX_LEN: usize = 128;

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("failed to canonicalize payload: {0}")]
    Canonicalize(#[from] serde_json::Error),
}

/// Top-level entries of a payload in signing order.
struct SortedTopLevel<'a>(Vec<(&'a str, &'a Value)>);

impl Serialize for SortedTopLevel<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Map a payload to the exact bytes that get signed.
pub fn canonicalize(payload: &Payload) -> Result<Vec<u8>, SignatureError> {
    let mut entries: Vec<(&str, &Value)> = payload
        .iter()
        .map(|(key, value)| (key.as_str(), value))
        .collect();
    // Keys are unique in a `Payload`, so an unstable sort is deterministic.
    entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    Ok(serde_json::to_vec(&SortedTopLevel(entries))?)
}

/// Compute `hex(HMAC-SHA512(data, key))` in lowercase.
pub fn digest_hex(key: &hmac::Key, data: &[u8]) -> String {
    hex::encode(hmac::sign(key, data).as_ref())
}

/// Compute the signature NOWPayments would send for `payload`.
pub fn sign_payload(secret: &IpnSecret, payload: &Payload) -> Result<String, SignatureError> {
    SignatureVerifier::new(secret).sign(payload)
}

/// Signs and verifies payloads with one IPN secret.
///
/// Holds only the derived HMAC key, so it is cheap to clone and safe to
/// share between concurrent deliveries.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: hmac::Key,
}

impl SignatureVerifier {
    pub fn new(secret: &IpnSecret) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA512, secret.as_bytes()),
        }
    }

    /// Lowercase hex HMAC-SHA512 of the canonical form of `payload`.
    pub fn sign(&self, payload: &Payload) -> Result<String, SignatureError> {
        let canonical = canonicalize(payload)?;
        Ok(digest_hex(&self.key, &canonical))
    }

    /// Check a header-supplied signature against `payload`.
    ///
    /// The comparison runs in constant time. A signature that is not hex
    /// or has the wrong length is a plain mismatch, not an error.
    pub fn verify(&self, payload: &Payload, signature: &str) -> Result<bool, SignatureError> {
        let Ok(claimed) = hex::decode(signature) else {
            return Ok(false);
        };
        let canonical = canonicalize(payload)?;
        Ok(hmac::verify(&self.key, &canonical, &claimed).is_ok())
    }
}
