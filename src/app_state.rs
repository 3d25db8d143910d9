use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{
    client_logos::ClientLogoFeed, mailer::Notifier, rate_limit::RateLimiter, sheets::SheetAppender,
};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub rate_limiter: RateLimiter,
    /// `None` when the Google credentials are not configured.
    pub sheets: Option<Arc<dyn SheetAppender>>,
    pub notifier: Arc<dyn Notifier>,
    pub client_logos: Arc<ClientLogoFeed>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        rate_limiter: RateLimiter,
        sheets: Option<Arc<dyn SheetAppender>>,
        notifier: Arc<dyn Notifier>,
        client_logos: ClientLogoFeed,
    ) -> Self {
        Self {
            config: Arc::new(config),
            rate_limiter,
            sheets,
            notifier,
            client_logos: Arc::new(client_logos),
        }
    }
}
