//! Application state shared across all request handlers.

use nowpay_sdk::ipn::IpnReceiver;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (the receiver shares its
/// secret and callback behind `Arc`).
#[derive(Clone, Debug)]
pub struct AppState {
    /// Authenticates deliveries and runs the success callback.
    pub receiver: IpnReceiver,
    /// Answer unverified deliveries with 401 instead of 200.
    pub reject_unverified: bool,
}

impl AppState {
    /// Create a new AppState around a configured receiver.
    pub fn new(receiver: IpnReceiver, reject_unverified: bool) -> Self {
        Self {
            receiver,
            reject_unverified,
        }
    }
}
