//! Test helper utilities: in-process app with recording upstream fakes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use parking_lot::Mutex;
use tower::ServiceExt;

use forms_api::{
    app_state::AppState,
    config::AppConfig,
    routes,
    services::{
        client_logos::ClientLogoFeed,
        mailer::{MailError, Notifier, OutgoingEmail},
        rate_limit::{RateLimitPolicy, RateLimiter},
        sheets::{SheetAppender, SheetsError},
    },
};

pub const TEST_SHEET_ID: &str = "test-sheet-id";

/// One call made to the spreadsheet fake.
#[derive(Debug, Clone)]
pub struct AppendCall {
    pub sheet_id: String,
    pub sheet_name: String,
    pub range: String,
    pub row: Vec<String>,
}

#[derive(Default)]
pub struct RecordingSheets {
    pub calls: Mutex<Vec<AppendCall>>,
    pub fail: bool,
}

#[async_trait]
impl SheetAppender for RecordingSheets {
    async fn append(
        &self,
        sheet_id: &str,
        sheet_name: &str,
        row: &[String],
        range: &str,
    ) -> Result<(), SheetsError> {
        if self.fail {
            return Err(SheetsError::Api("HTTP 503 - backend unavailable".to_string()));
        }
        self.calls.lock().push(AppendCall {
            sheet_id: sheet_id.to_string(),
            sheet_name: sheet_name.to_string(),
            range: range.to_string(),
            row: row.to_vec(),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    /// Every email the handler tried to send, including failed attempts.
    pub attempts: Mutex<Vec<OutgoingEmail>>,
    pub fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: &OutgoingEmail) -> Result<bool, MailError> {
        self.attempts.lock().push(email.clone());
        if self.fail {
            return Err(MailError::Api("HTTP 422 - invalid from address".to_string()));
        }
        Ok(true)
    }
}

pub struct TestApp {
    pub router: Router,
    pub sheets: Arc<RecordingSheets>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Options for building a [`TestApp`].
#[derive(Default)]
pub struct TestAppOptions {
    pub sheets_fail: bool,
    pub notifier_fail: bool,
    pub without_sheets: bool,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        google_sheet_id: Some(TEST_SHEET_ID.to_string()),
        site_url: "https://hygiene-pro.fr".to_string(),
        ..AppConfig::default()
    }
}

pub fn build_app(options: TestAppOptions) -> TestApp {
    let sheets = Arc::new(RecordingSheets {
        fail: options.sheets_fail,
        ..Default::default()
    });
    let notifier = Arc::new(RecordingNotifier {
        fail: options.notifier_fail,
        ..Default::default()
    });

    let appender: Option<Arc<dyn SheetAppender>> = if options.without_sheets {
        None
    } else {
        Some(sheets.clone())
    };

    let state = AppState::new(
        test_config(),
        RateLimiter::in_memory(RateLimitPolicy::default()),
        appender,
        notifier.clone(),
        ClientLogoFeed::new(None).expect("client logo feed"),
    );

    TestApp {
        router: routes::router(state),
        sheets,
        notifier,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

/// POST a JSON body from the given client IP (sent as `x-forwarded-for`).
pub async fn post_json(
    router: &Router,
    path: &str,
    body: &serde_json::Value,
    ip: &str,
) -> TestResponse {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(body.to_string()))
        .expect("valid request");

    send(router, request).await
}

pub async fn get(router: &Router, path: &str) -> TestResponse {
    let request = Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("valid request");

    send(router, request).await
}
