//! Default success callback: log verified notifications.

use async_trait::async_trait;
use nowpay_sdk::ipn::IpnCallback;
use nowpay_sdk::objects::{IpnNotification, Payload, PaymentStatus};

/// Logs every verified IPN delivery and highlights finished payments.
///
/// Replace this with business logic (crediting a balance, marking an order
/// paid, …) when embedding the receiver.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotification;

#[async_trait]
impl IpnCallback for LogNotification {
    async fn on_verified(&self, payload: Payload) {
        let notification: IpnNotification = match payload.deserialize_into() {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("Verified IPN does not look like a payment notification: {}", e);
                return;
            }
        };

        let order_id = notification.order_id.as_deref().unwrap_or("-");
        if notification.payment_status == PaymentStatus::Finished {
            tracing::info!(
                payment_id = %notification.payment_id,
                order_id,
                "Payment finished"
            );
        } else {
            tracing::info!(
                payment_id = %notification.payment_id,
                order_id,
                status = %notification.payment_status,
                "Payment status changed"
            );
        }
    }
}
