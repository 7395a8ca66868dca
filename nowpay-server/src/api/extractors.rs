//! Custom Axum extractor for IPN deliveries.
//!
//! Provides `IpnDelivery`, the raw body plus the claimed signature from the
//! `x-nowpayments-sig` header. The body is kept as bytes: it is parsed and
//! verified by [`nowpay_sdk::ipn::IpnReceiver`], not by the framework.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nowpay_sdk::signature::IPN_SIGNATURE_HEADER;

/// Largest IPN body accepted.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// An inbound IPN delivery.
///
/// A missing or non-ASCII signature header is carried as `None`; the
/// receiver treats it like any other unauthenticated delivery.
#[derive(Debug)]
pub struct IpnDelivery {
    pub signature: Option<String>,
    pub body: Bytes,
}

/// Errors returned by the [`IpnDelivery`] extractor.
#[derive(Debug, thiserror::Error)]
pub enum IpnDeliveryError {
    #[error("failed to read request body")]
    BodyReadError,
}

impl IntoResponse for IpnDeliveryError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            IpnDeliveryError::BodyReadError => {
                (StatusCode::BAD_REQUEST, "failed to read request body")
            }
        };
        (status, message).into_response()
    }
}

impl<S: Send + Sync> FromRequest<S> for IpnDelivery {
    type Rejection = IpnDeliveryError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let signature = req
            .headers()
            .get(IPN_SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|_| IpnDeliveryError::BodyReadError)?;

        Ok(IpnDelivery { signature, body })
    }
}
