use serde::Deserialize;

/// Deployment environment. Controls log format and verbosity.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default)]
    pub app_env: AppEnv,

    /// Public site URL, allowed as CORS origin
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Google spreadsheet identifier
    pub google_sheet_id: Option<String>,

    /// Service account client email
    pub google_service_account_email: Option<String>,

    /// Service account private key (PEM, may contain literal `\n` escapes)
    pub google_private_key: Option<String>,

    /// Resend API key. Notifications are skipped when absent.
    pub resend_api_key: Option<String>,

    #[serde(default = "default_email_from")]
    pub email_from: String,

    /// Recipient of submission notifications
    #[serde(default = "default_notification_email")]
    pub notification_email: String,

    /// Rate limit window length in milliseconds
    #[serde(default = "default_rate_limit_window_ms")]
    pub rate_limit_window_ms: u64,

    /// Max requests per IP within one window
    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,

    /// Public CSV feed listing client logos
    pub client_logos_csv_url: Option<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_email_from() -> String {
    "Hygiène Pro <noreply@hygiene-pro.fr>".to_string()
}

fn default_notification_email() -> String {
    "contact@hygiene-pro.fr".to_string()
}

fn default_rate_limit_window_ms() -> u64 {
    900_000
}

fn default_rate_limit_max_requests() -> u32 {
    5
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn is_production(&self) -> bool {
        self.app_env == AppEnv::Production
    }

    /// True when sheet id, service account email and private key are all set.
    pub fn sheets_configured(&self) -> bool {
        self.google_sheet_id.is_some()
            && self.google_service_account_email.is_some()
            && self.google_private_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            app_env: AppEnv::default(),
            site_url: default_site_url(),
            google_sheet_id: None,
            google_service_account_email: None,
            google_private_key: None,
            resend_api_key: None,
            email_from: default_email_from(),
            notification_email: default_notification_email(),
            rate_limit_window_ms: default_rate_limit_window_ms(),
            rate_limit_max_requests: default_rate_limit_max_requests(),
            client_logos_csv_url: None,
        }
    }
}
