//! HTTP client for the NOWPayments REST API.
//!
//! Gated behind the `client` cargo feature so hosts that only verify IPN
//! deliveries do not pull in `reqwest`.

mod payments;

pub use payments::{Endpoint, PaymentsClient};

use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::ConfigurationError;
use crate::objects::PaymentOptionsError;

/// Header carrying the merchant API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Errors produced by [`PaymentsClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Error {}: {message}", .status.as_u16())]
    Api { status: StatusCode, message: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// An option name `create_payment` does not know. Raised before any
    /// request is sent.
    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),

    /// An option had the wrong type or a required option was missing.
    #[error("invalid argument: {0}")]
    InvalidArgument(serde_json::Error),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl From<PaymentOptionsError> for ClientError {
    fn from(err: PaymentOptionsError) -> Self {
        match err {
            PaymentOptionsError::UnexpectedArgument(name) => Self::UnexpectedArgument(name),
            PaymentOptionsError::Invalid(e) => Self::InvalidArgument(e),
        }
    }
}

/// Error body shape used by the API, e.g.
/// `{"statusCode":400,"code":"INVALID_REQUEST_PARAMS","message":"..."}`.
#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        return Err(ClientError::Api { status, message });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
