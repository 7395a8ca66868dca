pub mod market;
pub mod payload;
pub mod payment;

pub use market::{ApiStatus, Currencies, Estimate, MerchantCoins};
pub use payload::{Payload, PayloadError};
pub use payment::{
    CreatePaymentRequest, IpnNotification, PaymentId, PaymentOptionsError, PaymentResponse,
    PaymentStatus,
};
