use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::Json;
use chrono::{SecondsFormat, Utc};

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::routes::MAX_BODY_BYTES;
use crate::models::submission::{MessageResponse, Submission};
use crate::services::email_template::render_submission_email;
use crate::services::mailer::{notify_best_effort, NotifyOutcome, OutgoingEmail};
use crate::services::rate_limit::{client_ip, Decision};
use crate::services::validation::{self, ValidationError};

/// POST /api/contact: contact form submission.
pub async fn submit_contact(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<MessageResponse>, ApiError> {
    process_submission(&state, request, validation::validate_contact).await
}

/// POST /api/quote: quote request submission.
pub async fn submit_quote(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<MessageResponse>, ApiError> {
    process_submission(&state, request, validation::validate_quote).await
}

/// Any other method on a form route.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn record_submission<S: Submission>(outcome: &'static str) {
    metrics::counter!(
        "form_submissions_total",
        "form" => S::KIND.metric_label(),
        "outcome" => outcome
    )
    .increment(1);
}

/// A 400 for an unreadable or invalid body, counted as `invalid`.
fn reject<S: Submission>(ip: &str, message: String) -> ApiError {
    tracing::info!(form = S::KIND.metric_label(), ip, errors = %message, "Submission rejected");
    record_submission::<S>("invalid");
    ApiError::Validation(message)
}

/// Configuration check, rate limit, validation, append, then best-effort
/// notification. Stops at the first failing step.
async fn process_submission<S: Submission>(
    state: &AppState,
    request: Request,
    validate: fn(&[u8]) -> Result<S, ValidationError>,
) -> Result<Json<MessageResponse>, ApiError> {
    let form = S::KIND.metric_label();

    let (Some(sheets), Some(sheet_id)) = (
        state.sheets.as_ref(),
        state.config.google_sheet_id.as_deref(),
    ) else {
        record_submission::<S>("misconfigured");
        return Err(ApiError::Configuration(
            "Configuration Google Sheets manquante".to_string(),
        ));
    };

    let (parts, body) = request.into_parts();
    let remote = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(&parts.headers, remote);

    if let Decision::Deny { retry_after_ms } = state.rate_limiter.check(&ip) {
        tracing::warn!(form, ip = %ip, "Rate limit exceeded");
        record_submission::<S>("rate_limited");
        let retry_after_secs = u64::try_from(retry_after_ms).unwrap_or(0).div_ceil(1000);
        return Err(ApiError::RateLimited { retry_after_secs });
    }

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| reject::<S>(&ip, format!("body: {e}")))?;

    let submission = validate(&bytes).map_err(|e| reject::<S>(&ip, e.to_string()))?;

    let now = Utc::now();
    let row = submission.to_row(&now.to_rfc3339_opts(SecondsFormat::Millis, true));

    let started = Instant::now();
    let appended = sheets
        .append(sheet_id, &S::KIND.to_string(), &row, S::KIND.range())
        .await;
    metrics::histogram!("sheets_append_seconds", "form" => form)
        .record(started.elapsed().as_secs_f64());

    if let Err(e) = appended {
        record_submission::<S>("persist_failed");
        return Err(ApiError::Persistence(e.to_string()));
    }

    let outcome = notify(state, &submission, now).await;
    metrics::counter!(
        "form_notifications_total",
        "form" => form,
        "outcome" => outcome.metric_label()
    )
    .increment(1);

    record_submission::<S>("accepted");
    tracing::info!(form, ip = %ip, notification = outcome.metric_label(), "Submission accepted");

    Ok(Json(MessageResponse::new(S::KIND.success_message())))
}

async fn notify<S: Submission>(
    state: &AppState,
    submission: &S,
    received_at: chrono::DateTime<Utc>,
) -> NotifyOutcome {
    let html = match render_submission_email(
        S::KIND,
        &submission.email_fields(),
        received_at,
        &state.config.site_url,
    ) {
        Ok(html) => html,
        Err(e) => {
            tracing::error!(error = %e, "Failed to render notification email");
            return NotifyOutcome::Failed(e.to_string());
        }
    };

    let email = OutgoingEmail {
        to: state.config.notification_email.clone(),
        subject: submission.subject(),
        html,
        reply_to: Some(submission.reply_to().to_string()),
    };

    notify_best_effort(state.notifier.as_ref(), &email).await
}
