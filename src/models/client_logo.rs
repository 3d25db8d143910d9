use serde::{Deserialize, Serialize};

/// A client reference displayed on the marketing site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientLogo {
    pub name: String,
    pub logo_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
}
