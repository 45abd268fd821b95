use anyhow::Context;
use async_trait::async_trait;

use super::Notifier;

/// Posts notification events to the external dispatch service. When no URL
/// is configured (dev mode) events are logged and dropped.
pub struct PushNotifier {
    endpoint: String,
    client: reqwest::Client,
}

impl PushNotifier {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for PushNotifier {
    async fn notify(&self, recipient_id: &str, event: &str, message: &str) -> anyhow::Result<()> {
        if self.endpoint.is_empty() {
            tracing::info!(recipient = %recipient_id, event = %event, "notification (no dispatch endpoint configured)");
            return Ok(());
        }

        self.client
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "recipient_id": recipient_id,
                "event": event,
                "message": message,
            }))
            .send()
            .await
            .context("failed to reach notification dispatch")?
            .error_for_status()
            .context("notification dispatch returned error")?;

        Ok(())
    }
}
