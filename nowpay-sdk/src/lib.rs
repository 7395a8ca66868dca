//! NOWPayments SDK.
//!
//! * [`signature`] – canonicalization and HMAC-SHA512 verification of IPN
//!   (instant payment notification) deliveries.
//! * [`ipn`] – the receiver that authenticates deliveries and dispatches
//!   them to business logic.
//! * [`client`] – typed REST client for the NOWPayments API (behind the
//!   `client` feature).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod config;
pub mod ipn;
pub mod objects;
pub mod signature;

#[cfg(feature = "client")]
pub mod client;
