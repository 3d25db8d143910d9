use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// A fully rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub reply_to: Option<String>,
}

/// What a delivery attempt did. Returned by value so callers can log or
/// ignore it; it never turns into a request failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// No email provider configured.
    Skipped,
    Failed(String),
}

impl NotifyOutcome {
    pub fn metric_label(&self) -> &'static str {
        match self {
            NotifyOutcome::Sent => "sent",
            NotifyOutcome::Skipped => "skipped",
            NotifyOutcome::Failed(_) => "failed",
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `email`. `Ok(false)` means delivery was skipped because the
    /// provider is not configured.
    async fn send(&self, email: &OutgoingEmail) -> Result<bool, MailError>;
}

/// Send through `notifier` and fold the result into a [`NotifyOutcome`].
pub async fn notify_best_effort(notifier: &dyn Notifier, email: &OutgoingEmail) -> NotifyOutcome {
    match notifier.send(email).await {
        Ok(true) => NotifyOutcome::Sent,
        Ok(false) => NotifyOutcome::Skipped,
        Err(e) => {
            tracing::error!(error = %e, subject = %email.subject, "Notification email failed");
            NotifyOutcome::Failed(e.to_string())
        }
    }
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

/// Resend transactional email client.
pub struct ResendMailer {
    http: Client,
    api_key: Option<String>,
    from: String,
    warn_when_unconfigured: bool,
}

impl ResendMailer {
    pub fn new(api_key: Option<String>, from: String, warn_when_unconfigured: bool) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            from,
            warn_when_unconfigured,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl Notifier for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<bool, MailError> {
        let Some(api_key) = self.api_key.as_deref() else {
            if self.warn_when_unconfigured {
                tracing::warn!(subject = %email.subject, "RESEND_API_KEY not set, email not sent");
            }
            return Ok(false);
        };

        let body = ResendRequest {
            from: &self.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
            reply_to: email.reply_to.as_deref(),
        };

        let response = self
            .http
            .post(RESEND_API_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Api(format!("HTTP {status} - {body}")));
        }

        tracing::info!(subject = %email.subject, "Notification email sent");
        Ok(true)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("HTTP request to email provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Email provider rejected the message: {0}")]
    Api(String),
}
