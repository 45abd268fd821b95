pub mod hosted;

use async_trait::async_trait;

/// External payment gateway boundary. Checkout is a fire-and-forget handoff
/// to a hosted page; the gateway reports the outcome later through the
/// payments webhook.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Returns the hosted checkout URL for the full charge: customer total
    /// plus delivery plus any deposit line item.
    async fn create_checkout_session(
        &self,
        booking_id: &str,
        listing_id: &str,
        amount_cents: i64,
        delivery_fee_cents: i64,
        deposit_cents: i64,
    ) -> anyhow::Result<String>;

    async fn issue_refund(&self, booking_id: &str, amount_cents: i64) -> anyhow::Result<()>;

    /// Transfers escrowed rental funds to the host. Must be invoked exactly
    /// once per booking, when it completes.
    async fn release_funds(&self, booking_id: &str) -> anyhow::Result<()>;

    /// Transfers a forfeited deposit to the host.
    async fn release_deposit(&self, booking_id: &str) -> anyhow::Result<()>;
}
