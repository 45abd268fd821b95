pub mod push;

use std::sync::Arc;

use async_trait::async_trait;

use crate::state::AppState;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient_id: &str, event: &str, message: &str) -> anyhow::Result<()>;
}

/// Fire-and-forget notification dispatch. Core transitions never wait on
/// this and never roll back when it fails; failures are logged and dropped.
pub fn notify_detached(state: &Arc<AppState>, recipient_id: &str, event: &str, message: &str) {
    let state = Arc::clone(state);
    let recipient_id = recipient_id.to_string();
    let event = event.to_string();
    let message = message.to_string();

    tokio::spawn(async move {
        if let Err(e) = state.notifier.notify(&recipient_id, &event, &message).await {
            tracing::error!(error = %e, recipient = %recipient_id, event = %event, "notification dispatch failed");
        }
    });
}
