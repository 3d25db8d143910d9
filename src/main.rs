use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use forms_api::{
    app_state::AppState,
    config::AppConfig,
    routes,
    services::{
        client_logos::ClientLogoFeed,
        mailer::ResendMailer,
        rate_limit::{RateLimitPolicy, RateLimiter},
        sheets::{GoogleSheetsClient, ServiceAccount, SheetAppender},
    },
};

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    // Initialize structured logging: JSON in production, readable locally
    let default_level = if config.is_production() { "info" } else { "debug" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(env = ?config.app_env, "Initializing forms-api server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);
    routes::metrics::describe_metrics();

    // Google Sheets client (optional: form routes answer 500 without it)
    let sheets = build_sheets_client(&config);

    // Resend mailer; skips sending when no API key is configured
    let mailer = ResendMailer::new(
        config.resend_api_key.clone(),
        config.email_from.clone(),
        config.is_production(),
    );
    if !mailer.is_configured() {
        tracing::warn!("RESEND_API_KEY not set, notification emails disabled");
    }

    let client_logos = ClientLogoFeed::new(config.client_logos_csv_url.clone())
        .expect("Failed to initialize client logo feed");

    let window_ms = i64::try_from(config.rate_limit_window_ms).unwrap_or(i64::MAX);
    let rate_limiter = RateLimiter::in_memory(RateLimitPolicy {
        window_ms,
        max_requests: config.rate_limit_max_requests,
    });
    tracing::info!(
        window_ms,
        max_requests = config.rate_limit_max_requests,
        "Rate limiter initialized"
    );

    spawn_rate_limit_sweeper(
        rate_limiter.clone(),
        Duration::from_millis(config.rate_limit_window_ms.max(1_000)),
    );

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(
        config,
        rate_limiter,
        sheets,
        Arc::new(mailer),
        client_logos,
    );

    let app = routes::router(state).route(
        "/metrics",
        get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}

fn build_sheets_client(config: &AppConfig) -> Option<Arc<dyn SheetAppender>> {
    if !config.sheets_configured() {
        tracing::warn!("Google Sheets is not fully configured, form submissions will be rejected");
        return None;
    }

    let account = ServiceAccount::new(
        config.google_service_account_email.as_deref(),
        config.google_private_key.as_deref(),
    )
    .and_then(GoogleSheetsClient::new);

    match account {
        Ok(client) => {
            tracing::info!("Google Sheets client initialized");
            let client: Arc<dyn SheetAppender> = Arc::new(client);
            Some(client)
        }
        Err(e) => {
            tracing::error!(error = %e, "Google Sheets client unavailable");
            None
        }
    }
}

/// Periodically drop expired rate-limit entries so the table does not grow
/// with every distinct client IP.
fn spawn_rate_limit_sweeper(rate_limiter: RateLimiter, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = rate_limiter.sweep();
            if removed > 0 {
                tracing::debug!(removed, "Swept expired rate limit entries");
            }
        }
    });
}
