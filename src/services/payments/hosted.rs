use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::PaymentGateway;

/// Reqwest-backed client for the hosted payment gateway's REST API.
pub struct HostedGateway {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HostedGateway {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct CheckoutSessionResponse {
    url: String,
}

#[async_trait]
impl PaymentGateway for HostedGateway {
    async fn create_checkout_session(
        &self,
        booking_id: &str,
        listing_id: &str,
        amount_cents: i64,
        delivery_fee_cents: i64,
        deposit_cents: i64,
    ) -> anyhow::Result<String> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);

        let response: CheckoutSessionResponse = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "booking_id": booking_id,
                "listing_id": listing_id,
                "amount_cents": amount_cents,
                "delivery_fee_cents": delivery_fee_cents,
                "deposit_cents": deposit_cents,
            }))
            .send()
            .await
            .context("failed to reach payment gateway")?
            .error_for_status()
            .context("gateway rejected checkout session")?
            .json()
            .await
            .context("malformed checkout session response")?;

        Ok(response.url)
    }

    async fn issue_refund(&self, booking_id: &str, amount_cents: i64) -> anyhow::Result<()> {
        let url = format!("{}/v1/refunds", self.base_url);

        self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "booking_id": booking_id,
                "amount_cents": amount_cents,
            }))
            .send()
            .await
            .context("failed to reach payment gateway")?
            .error_for_status()
            .context("gateway rejected refund")?;

        Ok(())
    }

    async fn release_funds(&self, booking_id: &str) -> anyhow::Result<()> {
        let url = format!("{}/v1/escrow/{booking_id}/release", self.base_url);

        self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("failed to reach payment gateway")?
            .error_for_status()
            .context("gateway rejected fund release")?;

        Ok(())
    }

    async fn release_deposit(&self, booking_id: &str) -> anyhow::Result<()> {
        let url = format!("{}/v1/deposits/{booking_id}/release", self.base_url);

        self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("failed to reach payment gateway")?
            .error_for_status()
            .context("gateway rejected deposit release")?;

        Ok(())
    }
}
