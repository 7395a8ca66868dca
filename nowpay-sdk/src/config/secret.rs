//! IPN shared secret.

use std::fmt;

use super::ConfigurationError;

/// The IPN secret shared with NOWPayments out of band.
///
/// The bytes are never exposed through `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct IpnSecret(Box<[u8]>);

impl IpnSecret {
    /// Wrap a secret, rejecting an empty one.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigurationError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigurationError::EmptySecret);
        }
        Ok(Self(secret.into_boxed_slice()))
    }

    /// Get the secret key bytes for HMAC signing.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for IpnSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IpnSecret(<redacted>)")
    }
}
