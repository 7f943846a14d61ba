//! Payment processor HTTP client.
//!
//! Talks to a Stripe-style payment-intents API: one call to create an
//! intent for a booking's total, one to read back what was captured.

use async_trait::async_trait;
use reqwest::Response;
use tracing::{debug, info};

use super::error::PaymentError;
use super::types::{ApiErrorResponse, IntentResponse, PaymentIntent, PaymentSignal};
use super::PaymentProcessor;

/// Default base URL for the processor API.
const DEFAULT_BASE_URL: &str = "https://api.stripe.com";

/// Configuration for the payment client.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Secret API key
    pub secret_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// ISO currency code, lowercase
    pub currency: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl PaymentConfig {
    /// Create a new config with the given secret key.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            currency: "inr".to_string(),
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into().to_lowercase();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Payment processor API client.
#[derive(Debug, Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
    currency: String,
}

impl StripeClient {
    pub fn new(config: PaymentConfig) -> Result<Self, PaymentError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            secret_key: config.secret_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            currency: config.currency,
        })
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Read an API response, mapping error statuses.
    async fn parse_intent(response: Response, intent_id: Option<&str>) -> Result<IntentResponse, PaymentError> {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PaymentError::Unauthorized);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(id) = intent_id {
                return Err(PaymentError::IntentNotFound(id.to_string()));
            }
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error.message.or(e.error.code))
                .unwrap_or(body);
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| PaymentError::Json(e.to_string()))
    }
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_intent(
        &self,
        booking_id: &str,
        amount_minor: u64,
    ) -> Result<PaymentIntent, PaymentError> {
        let url = format!("{}/v1/payment_intents", self.base_url);
        let form = [
            ("amount", amount_minor.to_string()),
            ("currency", self.currency.clone()),
            ("metadata[booking_id]", booking_id.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;
        let intent = Self::parse_intent(response, None).await?;

        info!(booking_id, intent_id = %intent.id, amount_minor, "created payment intent");

        let client_secret = intent
            .client_secret
            .ok_or_else(|| PaymentError::Json("payment intent has no client_secret".to_string()))?;

        Ok(PaymentIntent {
            id: intent.id,
            client_secret,
            amount_minor: intent.amount,
        })
    }

    async fn retrieve_signal(&self, intent_id: &str) -> Result<PaymentSignal, PaymentError> {
        let url = format!("{}/v1/payment_intents/{}", self.base_url, intent_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        let intent = Self::parse_intent(response, Some(intent_id)).await?;

        debug!(intent_id, status = %intent.status, "retrieved payment intent");
        Ok(intent.into_signal())
    }
}
