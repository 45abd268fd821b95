use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tracing_subscriber::EnvFilter;

use streetfare::config::AppConfig;
use streetfare::db;
use streetfare::services::confirmation;
use streetfare::services::notifications::push::PushNotifier;
use streetfare::services::payments::hosted::HostedGateway;
use streetfare::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    tracing::info!(path = %config.database_url, "database ready");

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        gateway: Box::new(HostedGateway::new(
            config.gateway_url.clone(),
            config.gateway_api_key.clone(),
        )),
        notifier: Box::new(PushNotifier::new(config.notify_url.clone())),
        config: config.clone(),
    });

    // Grace-window sweep: force-completes paid bookings that neither party
    // confirmed in time.
    let sweep_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(sweep_state.config.sweep_interval_secs));
        loop {
            ticker.tick().await;
            match confirmation::sweep_auto_close(&sweep_state, Utc::now().naive_utc()).await {
                Ok(0) => {}
                Ok(n) => tracing::info!(count = n, "auto-closed bookings"),
                Err(e) => tracing::error!(error = %e, "auto-close sweep failed"),
            }
        }
    });

    let app = streetfare::app(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
