//! IPN receiver.
//!
//! Bridges one inbound delivery (raw body plus the `x-nowpayments-sig`
//! header) to the [`SignatureVerifier`] and, when the signature matches,
//! to the caller's [`IpnCallback`].
//!
//! Each delivery is independent:
//!
//! ```text
//! body, signature ─► parse ─► verify ─┬─ match ──► callback(payload) ─► Dispatched
//!                                     └─ no match ───────────────────► Rejected
//! ```
//!
//! A signature mismatch is an expected, attacker-reachable outcome and is
//! reported as [`Delivery::Rejected`], never as an error. Whether the host
//! acknowledges or refuses a rejected delivery is up to the host.

mod callback;

pub use callback::IpnCallback;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::config::{ConfigurationError, IpnSecret};
use crate::objects::{Payload, PayloadError};
use crate::signature::{SignatureError, SignatureVerifier};

/// Default upper bound on how long `receive` waits for the callback.
pub const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while handling a delivery.
///
/// None of these is a signature mismatch; see [`Delivery::Rejected`].
#[derive(Debug, thiserror::Error)]
pub enum IpnError {
    /// The body is not valid JSON.
    #[error("malformed payload: {0}")]
    MalformedPayload(serde_json::Error),
    /// The body is JSON but not an object with unique top-level keys.
    #[error("invalid payload: {0}")]
    InvalidPayload(serde_json::Error),
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl From<PayloadError> for IpnError {
    fn from(err: PayloadError) -> Self {
        match err {
            PayloadError::Malformed(e) => Self::MalformedPayload(e),
            PayloadError::Invalid(e) => Self::InvalidPayload(e),
        }
    }
}

/// Outcome of a delivery that was well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The signature matched and the callback was invoked.
    Dispatched,
    /// The signature was missing or did not match; the callback was not
    /// invoked.
    Rejected,
}

/// Authenticates IPN deliveries and hands them to an [`IpnCallback`].
///
/// Cloning is cheap and every clone shares the same secret and callback,
/// so one receiver can serve any number of concurrent requests.
#[derive(Clone)]
pub struct IpnReceiver {
    verifier: SignatureVerifier,
    callback: Arc<dyn IpnCallback>,
    callback_timeout: Duration,
}

impl std::fmt::Debug for IpnReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpnReceiver")
            .field("callback_timeout", &self.callback_timeout)
            .finish_non_exhaustive()
    }
}

impl IpnReceiver {
    /// Create a receiver for an already validated secret.
    pub fn new(secret: IpnSecret, callback: impl IpnCallback) -> Self {
        Self {
            verifier: SignatureVerifier::new(&secret),
            callback: Arc::new(callback),
            callback_timeout: DEFAULT_CALLBACK_TIMEOUT,
        }
    }

    /// Create a receiver from raw secret bytes.
    ///
    /// Fails with [`ConfigurationError::EmptySecret`] for an empty secret.
    pub fn from_secret(
        secret: impl Into<Vec<u8>>,
        callback: impl IpnCallback,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::new(IpnSecret::new(secret)?, callback))
    }

    /// Bound how long [`receive`](Self::receive) waits for the callback.
    ///
    /// A callback that runs longer keeps running in the background.
    pub fn with_callback_timeout(mut self, timeout: Duration) -> Self {
        self.callback_timeout = timeout;
        self
    }

    pub fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    /// Parse and authenticate a delivery without dispatching it.
    ///
    /// Returns `Ok(None)` when the signature is missing or does not match.
    pub fn authenticate(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<Option<Payload>, IpnError> {
        let payload = Payload::from_slice(body)?;

        let Some(signature) = signature else {
            debug!("IPN delivery without signature header dropped");
            return Ok(None);
        };

        if self.verifier.verify(&payload, signature)? {
            Ok(Some(payload))
        } else {
            debug!("IPN delivery with mismatched signature dropped");
            Ok(None)
        }
    }

    /// Handle one delivery end to end.
    ///
    /// The callback runs at most once, and only for a verified payload.
    pub async fn receive(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<Delivery, IpnError> {
        match self.authenticate(body, signature)? {
            Some(payload) => {
                self.dispatch(payload).await;
                Ok(Delivery::Dispatched)
            }
            None => Ok(Delivery::Rejected),
        }
    }

    async fn dispatch(&self, payload: Payload) {
        let callback = Arc::clone(&self.callback);
        let task = tokio::spawn(async move { callback.on_verified(payload).await });

        match tokio::time::timeout(self.callback_timeout, task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.is_panic() => {
                error!("IPN callback panicked");
            }
            Ok(Err(e)) => {
                error!("IPN callback task failed: {}", e);
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.callback_timeout.as_millis() as u64,
                    "IPN callback still running after timeout, continuing in background"
                );
            }
        }
    }
}
