//! NOWPayments REST API client.
//!
//! Every request carries the merchant API key in the `x-api-key` header.
//! Endpoints are templated against the production or the sandbox root,
//! chosen once at construction.

use std::fmt;

use reqwest::{Client, Method, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

use super::{API_KEY_HEADER, ClientError, parse_response};
use crate::config::ClientConfig;
use crate::objects::{
    ApiStatus, CreatePaymentRequest, Currencies, Estimate, MerchantCoins, PaymentId,
    PaymentResponse,
};

/// The API endpoints this client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Status,
    Currencies,
    MerchantCoins,
    Estimate,
    CreatePayment,
    PaymentStatus(PaymentId),
}

impl Endpoint {
    /// Path relative to the API root (no leading slash).
    pub fn path(&self) -> String {
        match self {
            Endpoint::Status => "status".to_owned(),
            Endpoint::Currencies => "currencies".to_owned(),
            Endpoint::MerchantCoins => "merchant/coins".to_owned(),
            Endpoint::Estimate => "estimate".to_owned(),
            Endpoint::CreatePayment => "payment".to_owned(),
            Endpoint::PaymentStatus(id) => format!("payment/{id}"),
        }
    }
}

/// Typed HTTP client for the NOWPayments API.
///
/// Stateless apart from its configuration; clone it freely. Non-2xx
/// responses come back as [`ClientError::Api`] with the status and the
/// server's message intact. Nothing is retried.
#[derive(Clone)]
pub struct PaymentsClient {
    http: Client,
    base_url: Url,
    api_key: String,
    debug: bool,
}

impl fmt::Debug for PaymentsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentsClient")
            .field("base_url", &self.base_url.as_str())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl PaymentsClient {
    /// Create a client for the environment selected by `config`.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(config.environment().base_url())?;
        Ok(Self {
            http: Client::new(),
            base_url,
            api_key: config.api_key().to_owned(),
            debug: config.debug,
        })
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Point the client at a different API root, e.g. a local mock.
    pub fn with_base_url(mut self, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        self.base_url = base_url;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL of `endpoint` under this client's API root.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, ClientError> {
        Ok(self.base_url.join(&endpoint.path())?)
    }

    /// `GET status` – API health.
    pub async fn status(&self) -> Result<ApiStatus, ClientError> {
        self.get(Endpoint::Status).await
    }

    /// `GET currencies` – every currency the processor supports.
    pub async fn currencies(&self) -> Result<Currencies, ClientError> {
        self.get(Endpoint::Currencies).await
    }

    /// `GET merchant/coins` – currencies enabled for this merchant.
    pub async fn merchant_coins(&self) -> Result<MerchantCoins, ClientError> {
        self.get(Endpoint::MerchantCoins).await
    }

    /// `GET estimate` – price of `amount` `currency_from` in `currency_to`.
    pub async fn estimate(
        &self,
        amount: Decimal,
        currency_from: &str,
        currency_to: &str,
    ) -> Result<Estimate, ClientError> {
        let url = self.endpoint_url(Endpoint::Estimate)?;
        let amount = amount.to_string();
        let request = self.http.get(url).query(&[
            ("amount", amount.as_str()),
            ("currency_from", currency_from),
            ("currency_to", currency_to),
        ]);
        self.execute(request).await
    }

    /// `POST payment` – create a payment.
    pub async fn create_payment(
        &self,
        request: &CreatePaymentRequest,
    ) -> Result<PaymentResponse, ClientError> {
        let url = self.endpoint_url(Endpoint::CreatePayment)?;
        self.execute(self.http.post(url).json(request)).await
    }

    /// `POST payment` from loosely typed options.
    ///
    /// Option names outside [`CreatePaymentRequest::FIELDS`] fail with
    /// [`ClientError::UnexpectedArgument`] before any request is sent.
    pub async fn create_payment_from_options(
        &self,
        options: Map<String, Value>,
    ) -> Result<PaymentResponse, ClientError> {
        let request = CreatePaymentRequest::from_options(options)?;
        self.create_payment(&request).await
    }

    /// `GET payment/{id}` – current state of a payment.
    pub async fn payment_status(
        &self,
        payment_id: impl Into<PaymentId>,
    ) -> Result<PaymentResponse, ClientError> {
        self.get(Endpoint::PaymentStatus(payment_id.into())).await
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ClientError> {
        let url = self.endpoint_url(endpoint)?;
        self.execute(self.http.get(url)).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = request.header(API_KEY_HEADER, &self.api_key).build()?;
        self.log_request(request.method(), request.url());

        let resp = self.http.execute(request).await?;
        self.log_response(resp.status(), resp.url());

        parse_response(resp).await
    }

    fn log_request(&self, method: &Method, url: &Url) {
        if self.debug {
            info!(%method, %url, "NOWPayments request");
        } else {
            debug!(%method, %url, "NOWPayments request");
        }
    }

    fn log_response(&self, status: reqwest::StatusCode, url: &Url) {
        if self.debug {
            info!(%status, %url, "NOWPayments response");
        } else {
            debug!(%status, %url, "NOWPayments response");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use reqwest::StatusCode;
    use serde_json::json;

    const ALL_ENDPOINTS: [Endpoint; 6] = [
        Endpoint::Status,
        Endpoint::Currencies,
        Endpoint::MerchantCoins,
        Endpoint::Estimate,
        Endpoint::CreatePayment,
        Endpoint::PaymentStatus(PaymentId(5077125051)),
    ];

    fn mock_client(server: &Server) -> PaymentsClient {
        let config = ClientConfig::new("test-key").unwrap();
        PaymentsClient::new(config)
            .unwrap()
            .with_base_url(Url::parse(&server.url()).unwrap())
    }

    fn payment_body() -> Value {
        json!({
            "payment_id": "5745459419",
            "payment_status": "waiting",
            "pay_address": "3EZ2uTdVDAMFXTfc6uLDDKR6o8qKBZXVkj",
            "price_amount": 100,
            "price_currency": "usd",
            "pay_amount": 0.00153,
            "pay_currency": "btc",
            "order_id": "2",
            "order_description": "My order",
            "ipn_callback_url": "https://nowpayments.io",
            "created_at": "2020-12-22T15:00:22.742Z",
            "updated_at": "2020-12-22T15:00:22.742Z",
            "purchase_id": "5837122679"
        })
    }

    #[test]
    fn test_production_urls() {
        let client = PaymentsClient::new(ClientConfig::new("key").unwrap()).unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.nowpayments.io/v1/");
        assert_eq!(
            client.endpoint_url(Endpoint::Status).unwrap().as_str(),
            "https://api.nowpayments.io/v1/status"
        );
    }

    #[test]
    fn test_sandbox_urls_never_mix_with_production() {
        let config = ClientConfig::new("key").unwrap().sandbox(true).debug(true);
        let client = PaymentsClient::new(config).unwrap();
        assert_eq!(
            client.base_url().as_str(),
            "https://api-sandbox.nowpayments.io/v1/"
        );
        for endpoint in ALL_ENDPOINTS {
            let url = client.endpoint_url(endpoint).unwrap();
            assert_eq!(url.host_str(), Some("api-sandbox.nowpayments.io"));
            assert!(url.path().starts_with("/v1/"), "{url}");
        }
        assert_eq!(
            client.endpoint_url(Endpoint::Status).unwrap().as_str(),
            "https://api-sandbox.nowpayments.io/v1/status"
        );
        assert_eq!(
            client
                .endpoint_url(Endpoint::PaymentStatus(PaymentId(42)))
                .unwrap()
                .as_str(),
            "https://api-sandbox.nowpayments.io/v1/payment/42"
        );
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ClientConfig::new("key").unwrap();
        let client = PaymentsClient::new(config)
            .unwrap()
            .with_base_url(Url::parse("http://localhost:9000/v1").unwrap());
        assert_eq!(
            client.endpoint_url(Endpoint::MerchantCoins).unwrap().as_str(),
            "http://localhost:9000/v1/merchant/coins"
        );
    }

    #[tokio::test]
    async fn test_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/status")
            .match_header("x-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"OK"}"#)
            .create_async()
            .await;

        let status = mock_client(&server).status().await.unwrap();
        assert!(status.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_currencies_and_merchant_coins() {
        let mut server = Server::new_async().await;
        let _currencies = server
            .mock("GET", "/currencies")
            .with_status(200)
            .with_body(r#"{"currencies":["btc","eth","trx"]}"#)
            .create_async()
            .await;
        let _coins = server
            .mock("GET", "/merchant/coins")
            .with_status(200)
            .with_body(r#"{"selectedCurrencies":["BTC","ETH"]}"#)
            .create_async()
            .await;

        let client = mock_client(&server);
        assert_eq!(
            client.currencies().await.unwrap().currencies,
            ["btc", "eth", "trx"]
        );
        assert_eq!(
            client.merchant_coins().await.unwrap().selected_currencies,
            ["BTC", "ETH"]
        );
    }

    #[tokio::test]
    async fn test_estimate_sends_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/estimate")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("amount".into(), "100".into()),
                Matcher::UrlEncoded("currency_from".into(), "usd".into()),
                Matcher::UrlEncoded("currency_to".into(), "btc".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "currency_from": "usd",
                    "amount_from": 100,
                    "currency_to": "btc",
                    "estimated_amount": 0.00153
                })
                .to_string(),
            )
            .create_async()
            .await;

        let estimate = mock_client(&server)
            .estimate(Decimal::from(100), "usd", "btc")
            .await
            .unwrap();
        assert_eq!(estimate.currency_to, "btc");
        assert!(estimate.estimated_amount > Decimal::ZERO);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upstream_error_is_surfaced() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/payment")
            .with_status(500)
            .with_body(
                json!({
                    "statusCode": 500,
                    "code": "INTERNAL_ERROR",
                    "message": "This currency is currently unavailable. Try it in 2 hours"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let request = CreatePaymentRequest::new(Decimal::from(100), "usd", "cup");
        let err = mock_client(&server)
            .create_payment(&request)
            .await
            .unwrap_err();

        match &err {
            ClientError::Api { status, message } => {
                assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(
                    message,
                    "This currency is currently unavailable. Try it in 2 hours"
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Error 500: This currency is currently unavailable. Try it in 2 hours"
        );
    }

    #[tokio::test]
    async fn test_upstream_error_with_plain_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/estimate")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body("bad request")
            .create_async()
            .await;

        let err = mock_client(&server)
            .estimate(Decimal::from(100), "nowpay", "btc")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Api { status, ref message }
                if status == StatusCode::BAD_REQUEST && message == "bad request"
        ));
    }

    #[tokio::test]
    async fn test_create_payment() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/payment")
            .match_header("x-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "price_amount": 100.0,
                "price_currency": "usd",
                "pay_currency": "btc",
                "order_description": "My order"
            })))
            .with_status(201)
            .with_body(payment_body().to_string())
            .create_async()
            .await;

        let request = CreatePaymentRequest::new(Decimal::from(100), "usd", "btc")
            .with_order_description("My order");
        let payment = mock_client(&server).create_payment(&request).await.unwrap();

        assert_eq!(payment.payment_id, PaymentId(5745459419));
        assert_eq!(payment.order_description.as_deref(), Some("My order"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_payment_unexpected_argument_sends_nothing() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/payment")
            .expect(0)
            .create_async()
            .await;

        let options = json!({
            "price_amount": 100,
            "price_currency": "usd",
            "pay_currency": "btc",
            "unexpected": "argument"
        });
        let Value::Object(options) = options else {
            unreachable!()
        };
        let err = mock_client(&server)
            .create_payment_from_options(options)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::UnexpectedArgument(ref name) if name == "unexpected"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_payment_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/payment/5745459419")
            .with_status(200)
            .with_body(payment_body().to_string())
            .create_async()
            .await;

        let payment = mock_client(&server)
            .payment_status(5745459419u64)
            .await
            .unwrap();
        assert_eq!(payment.payment_status, crate::objects::PaymentStatus::Waiting);
        assert_eq!(payment.price_amount, Decimal::from(100));
    }
}
