//! Payment objects: creation requests, status responses and the typed view
//! of an IPN delivery.

use std::fmt;

use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use url::Url;

/// Numeric payment identifier.
///
/// NOWPayments sends it as a JSON number in IPN bodies and as a string in
/// some REST responses; both forms are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PaymentId(pub u64);

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for PaymentId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for PaymentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PaymentIdVisitor;

        impl Visitor<'_> for PaymentIdVisitor {
            type Value = PaymentId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a payment id as an unsigned integer or numeric string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<PaymentId, E> {
                Ok(PaymentId(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<PaymentId, E> {
                u64::try_from(v)
                    .map(PaymentId)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<PaymentId, E> {
                v.parse()
                    .map(PaymentId)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(PaymentIdVisitor)
    }
}

/// Lifecycle state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Waiting,
    Confirming,
    Confirmed,
    Sending,
    PartiallyPaid,
    Finished,
    Failed,
    Refunded,
    Expired,
    /// A status this SDK does not know about yet.
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// No further IPN deliveries are expected once a payment reaches one of
    /// these states.
    pub fn is_final(self) -> bool {
        matches!(
            self,
            PaymentStatus::Finished
                | PaymentStatus::Failed
                | PaymentStatus::Refunded
                | PaymentStatus::Expired
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Waiting => "waiting",
            PaymentStatus::Confirming => "confirming",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Sending => "sending",
            PaymentStatus::PartiallyPaid => "partially_paid",
            PaymentStatus::Finished => "finished",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Typed view of an IPN body.
///
/// Obtained with [`Payload::deserialize_into`](super::Payload::deserialize_into)
/// after the delivery was authenticated. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IpnNotification {
    pub payment_id: PaymentId,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub pay_address: Option<String>,
    #[serde(default)]
    pub price_amount: Option<Decimal>,
    #[serde(default)]
    pub price_currency: Option<String>,
    #[serde(default)]
    pub pay_amount: Option<Decimal>,
    #[serde(default)]
    pub actually_paid: Option<Decimal>,
    #[serde(default)]
    pub pay_currency: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub order_description: Option<String>,
    #[serde(default)]
    pub purchase_id: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub outcome_amount: Option<Decimal>,
    #[serde(default)]
    pub outcome_currency: Option<String>,
}

/// Response of `POST payment` and `GET payment/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentResponse {
    pub payment_id: PaymentId,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub pay_address: Option<String>,
    pub price_amount: Decimal,
    pub price_currency: String,
    #[serde(default)]
    pub pay_amount: Option<Decimal>,
    #[serde(default)]
    pub actually_paid: Option<Decimal>,
    pub pay_currency: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub order_description: Option<String>,
    #[serde(default)]
    pub ipn_callback_url: Option<String>,
    #[serde(default)]
    pub purchase_id: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub outcome_amount: Option<Decimal>,
    #[serde(default)]
    pub outcome_currency: Option<String>,
}

/// Errors from [`CreatePaymentRequest::from_options`].
#[derive(Debug, thiserror::Error)]
pub enum PaymentOptionsError {
    #[error("create_payment got an unexpected argument `{0}`")]
    UnexpectedArgument(String),
    #[error("invalid payment option: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Request body for `POST payment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePaymentRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub price_amount: Decimal,
    pub price_currency: String,
    pub pay_currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipn_callback_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_extra_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_rate: Option<bool>,
}

impl CreatePaymentRequest {
    /// Every option name `POST payment` accepts.
    pub const FIELDS: &'static [&'static str] = &[
        "price_amount",
        "price_currency",
        "pay_currency",
        "ipn_callback_url",
        "order_id",
        "order_description",
        "purchase_id",
        "payout_address",
        "payout_currency",
        "payout_extra_id",
        "fixed_rate",
    ];

    pub fn new(
        price_amount: Decimal,
        price_currency: impl Into<String>,
        pay_currency: impl Into<String>,
    ) -> Self {
        Self {
            price_amount,
            price_currency: price_currency.into(),
            pay_currency: pay_currency.into(),
            ipn_callback_url: None,
            order_id: None,
            order_description: None,
            purchase_id: None,
            payout_address: None,
            payout_currency: None,
            payout_extra_id: None,
            fixed_rate: None,
        }
    }

    /// Build a request from loosely typed options.
    ///
    /// Unknown option names are rejected before anything else is looked at.
    pub fn from_options(options: Map<String, Value>) -> Result<Self, PaymentOptionsError> {
        if let Some(unknown) = options
            .keys()
            .find(|key| !Self::FIELDS.contains(&key.as_str()))
        {
            return Err(PaymentOptionsError::UnexpectedArgument(unknown.clone()));
        }
        Ok(serde_json::from_value(Value::Object(options))?)
    }

    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn with_order_description(mut self, description: impl Into<String>) -> Self {
        self.order_description = Some(description.into());
        self
    }

    pub fn with_ipn_callback_url(mut self, url: Url) -> Self {
        self.ipn_callback_url = Some(url);
        self
    }
}
