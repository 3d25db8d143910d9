//! Client logo feed published as CSV (typically a shared spreadsheet export).
//!
//! Expected header: `name,logoUrl,websiteUrl`. Header names are matched
//! ignoring case, spaces and underscores; column order is free.

use reqwest::Client;

use crate::models::client_logo::ClientLogo;

pub struct ClientLogoFeed {
    http: Client,
    url: Option<String>,
}

impl ClientLogoFeed {
    pub fn new(url: Option<String>) -> Result<Self, ClientLogoError> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            url: url.filter(|u| !u.is_empty()),
        })
    }

    /// Fetch and parse the feed. An unconfigured feed yields no logos.
    pub async fn fetch(&self) -> Result<Vec<ClientLogo>, ClientLogoError> {
        let Some(url) = self.url.as_deref() else {
            return Ok(Vec::new());
        };

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ClientLogoError::Unavailable(format!(
                "feed returned HTTP {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        parse_client_logos(&body)
    }
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse the CSV body, keeping rows with a non-empty name and logo URL.
pub fn parse_client_logos(body: &str) -> Result<Vec<ClientLogo>, ClientLogoError> {
    let mut records = parse_csv(body).into_iter();

    let header = records
        .next()
        .ok_or_else(|| ClientLogoError::Parse("missing header row".to_string()))?;
    let position = |wanted: &str| header.iter().position(|h| normalize_header(h) == wanted);

    let name_idx = position("name")
        .ok_or_else(|| ClientLogoError::Parse("missing `name` column".to_string()))?;
    let logo_idx = position("logourl")
        .ok_or_else(|| ClientLogoError::Parse("missing `logoUrl` column".to_string()))?;
    let website_idx = position("websiteurl");

    let logos = records
        .filter_map(|record| {
            let get = |idx: usize| record.get(idx).map(|v| v.trim()).unwrap_or_default();

            let name = get(name_idx);
            let logo_url = get(logo_idx);
            if name.is_empty() || logo_url.is_empty() {
                return None;
            }

            let website_url = website_idx
                .map(get)
                .filter(|v| !v.is_empty())
                .map(str::to_string);

            Some(ClientLogo {
                name: name.to_string(),
                logo_url: logo_url.to_string(),
                website_url,
            })
        })
        .collect();

    Ok(logos)
}

/// Minimal RFC 4180 reader: quoted fields, doubled quotes, CRLF or LF.
fn parse_csv(body: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = body.trim_start_matches('\u{feff}').chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
        .into_iter()
        .filter(|r| !(r.len() == 1 && r[0].trim().is_empty()))
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ClientLogoError {
    #[error("HTTP request to client logo feed failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Client logo feed unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to parse client logo feed: {0}")]
    Parse(String),
}
