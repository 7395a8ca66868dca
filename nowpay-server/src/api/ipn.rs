//! `POST {path}` – IPN delivery endpoint.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nowpay_sdk::ipn::{Delivery, IpnError};

use crate::api::extractors::IpnDelivery;
use crate::state::AppState;

/// Rejection for deliveries the receiver could not process.
#[derive(Debug)]
pub struct IpnRejection(IpnError);

impl IntoResponse for IpnRejection {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            IpnError::MalformedPayload(_) => (StatusCode::BAD_REQUEST, "malformed payload"),
            IpnError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, "invalid payload"),
            IpnError::Signature(e) => {
                tracing::error!("Failed to compute IPN signature: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        };
        (status, message).into_response()
    }
}

/// Hand the delivery to the receiver.
///
/// Verified deliveries are acknowledged with 200 once the callback has run
/// (or timed out). Unverified ones get 200 as well unless
/// `reject_unverified` is set, so the processor does not keep retrying.
pub async fn receive_ipn(
    State(state): State<AppState>,
    delivery: IpnDelivery,
) -> Result<Response, IpnRejection> {
    let outcome = state
        .receiver
        .receive(&delivery.body, delivery.signature.as_deref())
        .await
        .map_err(|e| {
            tracing::debug!("Rejected IPN delivery: {}", e);
            IpnRejection(e)
        })?;

    let response = match outcome {
        Delivery::Dispatched => (StatusCode::OK, "OK").into_response(),
        Delivery::Rejected if state.reject_unverified => {
            (StatusCode::UNAUTHORIZED, "signature verification failed").into_response()
        }
        Delivery::Rejected => (StatusCode::OK, "OK").into_response(),
    };
    Ok(response)
}
