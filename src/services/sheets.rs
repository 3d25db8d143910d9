use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Append-only access to a spreadsheet.
#[async_trait]
pub trait SheetAppender: Send + Sync {
    /// Append `row` as one new line after the data in `{sheet_name}!{range}`.
    async fn append(
        &self,
        sheet_id: &str,
        sheet_name: &str,
        row: &[String],
        range: &str,
    ) -> Result<(), SheetsError>;
}

/// Google service account identity.
#[derive(Clone)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
}

impl ServiceAccount {
    /// Build from configured values. Literal `\n` sequences in the key, as
    /// stored in most env files, become real newlines.
    pub fn new(
        client_email: Option<&str>,
        private_key: Option<&str>,
    ) -> Result<Self, SheetsError> {
        let client_email = client_email
            .filter(|v| !v.is_empty())
            .ok_or(SheetsError::MissingCredentials)?;
        let private_key = private_key
            .filter(|v| !v.is_empty())
            .ok_or(SheetsError::MissingCredentials)?;

        Ok(Self {
            client_email: client_email.to_string(),
            private_key: private_key.replace("\\n", "\n"),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

impl Claims {
    fn new(client_email: &str, issued_at: i64) -> Self {
        Self {
            iss: client_email.to_string(),
            scope: SHEETS_SCOPE.to_string(),
            aud: TOKEN_URL.to_string(),
            iat: issued_at,
            exp: issued_at + 3600,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_in: Duration,
    fetched_at: Instant,
}

#[derive(Serialize)]
struct ValueRange<'a> {
    values: [&'a [String]; 1],
}

/// Google Sheets v4 client authenticated with a service account.
pub struct GoogleSheetsClient {
    http: Client,
    account: ServiceAccount,
    encoding_key: EncodingKey,
    cache: RwLock<Option<CachedToken>>,
    refresh_margin: Duration,
}

impl GoogleSheetsClient {
    pub fn new(account: ServiceAccount) -> Result<Self, SheetsError> {
        let encoding_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(SheetsError::Signing)?;

        Ok(Self {
            http: Client::new(),
            account,
            encoding_key,
            cache: RwLock::new(None),
            refresh_margin: Duration::from_secs(60),
        })
    }

    async fn access_token(&self) -> Result<String, SheetsError> {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.fetched_at.elapsed() + self.refresh_margin < cached.expires_in {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        self.fetch_token().await
    }

    async fn fetch_token(&self) -> Result<String, SheetsError> {
        let claims = Claims::new(&self.account.client_email, chrono::Utc::now().timestamp());
        let assertion = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )
        .map_err(SheetsError::Signing)?;

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Auth(format!("HTTP {status} - {body}")));
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!(expires_in = token.expires_in, "Fetched Google access token");

        let mut cache = self.cache.write().await;
        *cache = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_in: Duration::from_secs(token.expires_in),
            fetched_at: Instant::now(),
        });

        Ok(token.access_token)
    }
}

/// `.../spreadsheets/{id}/values/{sheet}!{range}:append` with append options.
fn append_url(sheet_id: &str, sheet_name: &str, range: &str) -> Result<Url, SheetsError> {
    let mut url = Url::parse(SHEETS_API_BASE).map_err(|e| SheetsError::Url(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| SheetsError::Url("base URL cannot have path segments".to_string()))?
        .push(sheet_id)
        .push("values")
        .push(&format!("{sheet_name}!{range}:append"));
    url.query_pairs_mut()
        .append_pair("valueInputOption", "USER_ENTERED")
        .append_pair("insertDataOption", "INSERT_ROWS");
    Ok(url)
}

#[async_trait]
impl SheetAppender for GoogleSheetsClient {
    async fn append(
        &self,
        sheet_id: &str,
        sheet_name: &str,
        row: &[String],
        range: &str,
    ) -> Result<(), SheetsError> {
        let token = self.access_token().await?;
        let url = append_url(sheet_id, sheet_name, range)?;

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&ValueRange { values: [row] })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api(format!("HTTP {status} - {body}")));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("Google service account credentials are not configured")]
    MissingCredentials,

    #[error("Failed to sign service account assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Google token exchange failed: {0}")]
    Auth(String),

    #[error("HTTP request to Google Sheets failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Google Sheets append failed: {0}")]
    Api(String),

    #[error("Invalid Google Sheets URL: {0}")]
    Url(String),
}
