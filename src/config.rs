use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub gateway_url: String,
    pub gateway_api_key: String,
    pub gateway_webhook_secret: String,
    /// Shared secret for staff-only routes. Empty disables them entirely.
    pub admin_api_key: String,
    pub notify_url: String,
    /// Seconds between auto-close sweep runs.
    pub sweep_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "streetfare.db".to_string()),
            gateway_url: env::var("GATEWAY_URL")
                .unwrap_or_else(|_| "http://localhost:4242".to_string()),
            gateway_api_key: env::var("GATEWAY_API_KEY").unwrap_or_default(),
            gateway_webhook_secret: env::var("GATEWAY_WEBHOOK_SECRET").unwrap_or_default(),
            admin_api_key: env::var("ADMIN_API_KEY").unwrap_or_default(),
            notify_url: env::var("NOTIFY_URL").unwrap_or_default(),
            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        }
    }
}
