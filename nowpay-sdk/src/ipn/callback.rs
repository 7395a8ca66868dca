//! Business-logic hook for verified IPN deliveries.

use std::future::Future;

use async_trait::async_trait;

use crate::objects::Payload;

/// Handler invoked once for every authenticated IPN delivery.
///
/// The receiver runs it on its own task, so a panic is contained and
/// logged rather than propagated. Implementations should still handle
/// their own errors; the receiver has nothing to report them to.
///
/// Any `Fn(Payload) -> impl Future<Output = ()>` closure is a callback:
///
/// ```ignore
/// let receiver = IpnReceiver::new(secret, |payload: Payload| async move {
///     if payload.get_str("payment_status") == Some("finished") {
///         // credit the order
///     }
/// });
/// ```
#[async_trait]
pub trait IpnCallback: Send + Sync + 'static {
    async fn on_verified(&self, payload: Payload);
}

#[async_trait]
impl<F, Fut> IpnCallback for F
where
    F: Fn(Payload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn on_verified(&self, payload: Payload) {
        (self)(payload).await
    }
}
