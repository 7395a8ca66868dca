//! Read-only market data returned by the NOWPayments API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `GET status` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus {
    pub message: String,
}

impl ApiStatus {
    /// The API reports `"OK"` when it is up.
    pub fn is_ok(&self) -> bool {
        self.message.eq_ignore_ascii_case("ok")
    }
}

/// `GET currencies` response: every currency the processor supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currencies {
    pub currencies: Vec<String>,
}

/// `GET merchant/coins` response: currencies enabled in the merchant
/// dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantCoins {
    #[serde(rename = "selectedCurrencies")]
    pub selected_currencies: Vec<String>,
}

/// `GET estimate` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    pub currency_from: String,
    pub amount_from: Decimal,
    pub currency_to: String,
    pub estimated_amount: Decimal,
}
